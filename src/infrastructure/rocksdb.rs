use crate::domain::ports::SimulationStore;
use crate::domain::simulation::{AuditOutcome, NewSimulation, SimulationId, SimulationRecord};
use crate::error::{LoanError, Result};
use async_trait::async_trait;
use chrono::Utc;
use rocksdb::{ColumnFamily, ColumnFamilyDescriptor, DB, Options, WriteBatch};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Column Family for storing simulation records.
pub const CF_SIMULATIONS: &str = "simulations";
/// Column Family for store metadata such as the id sequence.
pub const CF_META: &str = "meta";

const LAST_ID_KEY: &[u8] = b"last_id";

/// A persistent store implementation using RocksDB.
///
/// Records are stored as JSON under their big-endian id, so a record's status
/// and error are always written together. Writes go through a shared mutex to
/// keep id allocation and audit read-check-write sequences serialized.
///
/// This struct is thread-safe (`Clone` shares the underlying `Arc<DB>`).
#[derive(Clone)]
pub struct RocksDBStore {
    db: Arc<DB>,
    write_lock: Arc<Mutex<()>>,
}

impl RocksDBStore {
    /// Opens or creates a RocksDB instance at the specified path.
    ///
    /// Ensures that the required column families ("simulations" and "meta") exist.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_simulations = ColumnFamilyDescriptor::new(CF_SIMULATIONS, Options::default());
        let cf_meta = ColumnFamilyDescriptor::new(CF_META, Options::default());

        let db = DB::open_cf_descriptors(&opts, path, vec![cf_simulations, cf_meta])?;

        Ok(Self {
            db: Arc::new(db),
            write_lock: Arc::new(Mutex::new(())),
        })
    }

    fn cf(&self, name: &str) -> Result<&ColumnFamily> {
        self.db.cf_handle(name).ok_or_else(|| {
            LoanError::InternalError(Box::new(std::io::Error::other(format!(
                "{name} column family not found"
            ))))
        })
    }

    fn read_record(&self, id: SimulationId) -> Result<Option<SimulationRecord>> {
        let cf = self.cf(CF_SIMULATIONS)?;
        match self.db.get_cf(cf, id.to_be_bytes())? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    fn write_record(&self, record: &SimulationRecord) -> Result<()> {
        let cf = self.cf(CF_SIMULATIONS)?;
        let value = serde_json::to_vec(record)?;
        self.db.put_cf(cf, record.id.to_be_bytes(), value)?;
        Ok(())
    }

    fn last_id(&self) -> Result<SimulationId> {
        let cf = self.cf(CF_META)?;
        match self.db.get_cf(cf, LAST_ID_KEY)? {
            Some(bytes) => {
                let raw: [u8; 8] = bytes.as_slice().try_into().map_err(|_| {
                    LoanError::InternalError(Box::new(std::io::Error::new(
                        std::io::ErrorKind::InvalidData,
                        "Corrupt id sequence",
                    )))
                })?;
                Ok(SimulationId::from_be_bytes(raw))
            }
            None => Ok(0),
        }
    }

    /// Removes a simulation, returning whether it existed.
    pub async fn delete(&self, id: SimulationId) -> Result<bool> {
        let _guard = self.write_lock.lock().await;
        let existed = self.read_record(id)?.is_some();
        if existed {
            let cf = self.cf(CF_SIMULATIONS)?;
            self.db.delete_cf(cf, id.to_be_bytes())?;
        }
        Ok(existed)
    }
}

#[async_trait]
impl SimulationStore for RocksDBStore {
    async fn create(&self, simulation: NewSimulation) -> Result<SimulationId> {
        let _guard = self.write_lock.lock().await;
        let id = self.last_id()? + 1;
        let record = simulation.into_record(id, Utc::now());

        // The sequence only advances together with the record it names.
        let mut batch = WriteBatch::default();
        batch.put_cf(self.cf(CF_META)?, LAST_ID_KEY, id.to_be_bytes());
        batch.put_cf(
            self.cf(CF_SIMULATIONS)?,
            id.to_be_bytes(),
            serde_json::to_vec(&record)?,
        );
        self.db.write(batch)?;
        Ok(id)
    }

    async fn get(&self, id: SimulationId) -> Result<Option<SimulationRecord>> {
        self.read_record(id)
    }

    async fn update_audit(&self, id: SimulationId, outcome: AuditOutcome) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut record = self
            .read_record(id)?
            .ok_or(LoanError::RecordNotFound(id))?;
        record.complete_audit(outcome)?;
        self.write_record(&record)
    }
}
