use super::audit::AuditQueue;
use crate::domain::amortization::amortize;
use crate::domain::loan::{AmortizationResult, LoanRequest};
use crate::domain::ports::{
    AuditJob, ScoringProviderRef, SimulationStoreBox, SimulationStoreFactory,
};
use crate::domain::simulation::{AuditStatus, NewSimulation, SimulationId, SimulationRecord};
use crate::error::Result;

/// What a caller gets back as soon as a simulation is accepted.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationReceipt {
    pub simulation_id: SimulationId,
    /// Always `Pending`: the audit has not been awaited.
    pub audit_status: AuditStatus,
    pub result: AmortizationResult,
}

/// The main entry point for loan simulations.
///
/// `LoanSimulator` validates the request, computes the schedule, persists it
/// and hands the audit to a background queue. The caller's response never
/// waits on the audit.
pub struct LoanSimulator {
    store: SimulationStoreBox,
    audits: AuditQueue,
}

impl LoanSimulator {
    /// Creates a new `LoanSimulator` and starts its audit worker.
    ///
    /// # Arguments
    ///
    /// * `stores` - Yields store handles; one for the simulator, one per audit.
    /// * `provider` - The risk scoring service audits consult.
    pub fn new(stores: SimulationStoreFactory, provider: ScoringProviderRef) -> Self {
        let store = stores();
        Self {
            store,
            audits: AuditQueue::start(stores, provider),
        }
    }

    /// Runs a simulation and schedules its audit.
    ///
    /// Invalid input is rejected before anything is stored or scheduled.
    pub async fn simulate(&self, request: LoanRequest) -> Result<SimulationReceipt> {
        let terms = request.validate()?;
        let result = amortize(&terms)?;

        let simulation_id = self
            .store
            .create(NewSimulation::from_result(&terms, &result)?)
            .await?;
        tracing::info!(simulation_id, months = terms.term_months, "simulation created");

        let job = AuditJob {
            simulation_id,
            amount: terms.amount,
            rate: terms.annual_rate_percent,
            months: terms.term_months,
        };
        if let Err(err) = self.audits.enqueue(job) {
            tracing::error!(simulation_id, error = %err, "could not schedule audit");
        }

        Ok(SimulationReceipt {
            simulation_id,
            audit_status: AuditStatus::Pending,
            result,
        })
    }

    /// Current state of a simulation, including its audit status.
    pub async fn simulation(&self, id: SimulationId) -> Result<Option<SimulationRecord>> {
        self.store.get(id).await
    }

    /// Waits for every scheduled audit to finish.
    pub async fn shutdown(self) -> Result<()> {
        self.audits.shutdown().await
    }
}
