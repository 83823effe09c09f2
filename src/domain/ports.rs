use super::simulation::{AuditOutcome, NewSimulation, SimulationId, SimulationRecord};
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Persistence collaborator for simulations.
#[async_trait]
pub trait SimulationStore: Send + Sync {
    /// Persists a new simulation with a `PENDING` audit and returns its id.
    async fn create(&self, simulation: NewSimulation) -> Result<SimulationId>;
    async fn get(&self, id: SimulationId) -> Result<Option<SimulationRecord>>;
    /// Commits the audit verdict of a pending simulation.
    ///
    /// Returns `RecordNotFound` when the id is unknown and `AuditAlreadyResolved`
    /// when the audit already reached a terminal state.
    async fn update_audit(&self, id: SimulationId, outcome: AuditOutcome) -> Result<()>;
}

/// Request sent to a risk scoring service for one simulation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AuditJob {
    pub simulation_id: SimulationId,
    pub amount: f64,
    pub rate: f64,
    pub months: u32,
}

/// External risk scoring capability consulted by the audit.
///
/// `Ok(())` approves the simulation; any error fails it with the error's message.
#[async_trait]
pub trait ScoringProvider: Send + Sync {
    async fn score(&self, job: &AuditJob) -> Result<()>;
}

pub type SimulationStoreBox = Box<dyn SimulationStore>;
pub type SimulationStoreFactory = Arc<dyn Fn() -> SimulationStoreBox + Send + Sync>;
pub type ScoringProviderRef = Arc<dyn ScoringProvider>;
