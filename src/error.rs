use crate::domain::simulation::SimulationId;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoanError {
    #[error("Invalid {field}: {reason}")]
    InvalidInput { field: &'static str, reason: String },
    #[error("{0}")]
    ScoringFailed(String),
    #[error("Simulation {0} not found")]
    RecordNotFound(SimulationId),
    #[error("Audit for simulation {0} is already resolved")]
    AuditAlreadyResolved(SimulationId),
    #[error("Arithmetic error: {0}")]
    Arithmetic(String),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[cfg(feature = "storage-rocksdb")]
    #[error("RocksDB error: {0}")]
    RocksDB(#[from] rocksdb::Error),
    #[error("Internal error: {0}")]
    InternalError(Box<dyn std::error::Error + Send + Sync>),
}

impl LoanError {
    pub fn invalid_input(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            field,
            reason: reason.into(),
        }
    }

    /// The human-readable part of a validation failure, without the field prefix.
    pub fn detail(&self) -> String {
        match self {
            Self::InvalidInput { reason, .. } => reason.clone(),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, LoanError>;
