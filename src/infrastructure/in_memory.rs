use crate::domain::ports::SimulationStore;
use crate::domain::simulation::{AuditOutcome, NewSimulation, SimulationId, SimulationRecord};
use crate::error::{LoanError, Result};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Default)]
struct Simulations {
    last_id: SimulationId,
    records: HashMap<SimulationId, SimulationRecord>,
}

/// A thread-safe in-memory store for simulations.
///
/// Uses `Arc<RwLock<..>>` so clones share the same records; every clone is a
/// handle onto one store. Status and error are always read and written under
/// the same lock.
#[derive(Default, Clone)]
pub struct InMemorySimulationStore {
    inner: Arc<RwLock<Simulations>>,
}

impl InMemorySimulationStore {
    /// Creates a new, empty in-memory simulation store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes a simulation, returning whether it existed.
    pub async fn delete(&self, id: SimulationId) -> bool {
        self.inner.write().await.records.remove(&id).is_some()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.records.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl SimulationStore for InMemorySimulationStore {
    async fn create(&self, simulation: NewSimulation) -> Result<SimulationId> {
        let mut inner = self.inner.write().await;
        inner.last_id += 1;
        let id = inner.last_id;
        inner
            .records
            .insert(id, simulation.into_record(id, Utc::now()));
        Ok(id)
    }

    async fn get(&self, id: SimulationId) -> Result<Option<SimulationRecord>> {
        let inner = self.inner.read().await;
        Ok(inner.records.get(&id).cloned())
    }

    async fn update_audit(&self, id: SimulationId, outcome: AuditOutcome) -> Result<()> {
        let mut inner = self.inner.write().await;
        let record = inner
            .records
            .get_mut(&id)
            .ok_or(LoanError::RecordNotFound(id))?;
        record.complete_audit(outcome)
    }
}
