use crate::domain::ports::{
    AuditJob, ScoringProviderRef, SimulationStore, SimulationStoreBox, SimulationStoreFactory,
};
use crate::domain::simulation::{AuditOutcome, SimulationId};
use crate::error::{LoanError, Result};
use std::any::Any;
use tokio::sync::mpsc;
use tokio::task::{JoinError, JoinHandle, JoinSet};

/// What happened to an audit once it finished.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuditReport {
    /// The verdict was written to the simulation.
    Committed(AuditOutcome),
    /// The simulation was gone or already resolved; nothing was written.
    Dropped,
    /// The store refused the write.
    StoreFailed(String),
}

/// Scores a pending simulation and commits exactly one terminal status.
///
/// The store handle is owned by the audit and released when it returns,
/// whichever way it ends. Scoring runs in its own task, so a panicking provider
/// is reported as a failed audit instead of tearing down the caller.
pub async fn run_audit(
    store: SimulationStoreBox,
    provider: ScoringProviderRef,
    job: AuditJob,
) -> AuditReport {
    let scoring = tokio::spawn(async move { provider.score(&job).await });

    let outcome = match scoring.await {
        Ok(Ok(())) => AuditOutcome::Success,
        Ok(Err(err)) => AuditOutcome::Failed(failure_message(err.to_string())),
        Err(err) => AuditOutcome::Failed(failure_message(join_error_message(err))),
    };

    commit(store.as_ref(), job.simulation_id, outcome).await
}

async fn commit(
    store: &dyn SimulationStore,
    simulation_id: SimulationId,
    outcome: AuditOutcome,
) -> AuditReport {
    match store.update_audit(simulation_id, outcome.clone()).await {
        Ok(()) => {
            match &outcome {
                AuditOutcome::Success => {
                    tracing::info!(simulation_id, status = "SUCCESS", "audit committed")
                }
                AuditOutcome::Failed(error) => {
                    tracing::warn!(simulation_id, status = "FAILED", %error, "audit committed")
                }
            }
            AuditReport::Committed(outcome)
        }
        Err(LoanError::RecordNotFound(_)) => {
            tracing::debug!(simulation_id, "simulation gone before audit commit, dropping");
            AuditReport::Dropped
        }
        Err(LoanError::AuditAlreadyResolved(_)) => {
            tracing::warn!(simulation_id, "audit already resolved, dropping");
            AuditReport::Dropped
        }
        Err(err) => {
            tracing::error!(simulation_id, error = %err, "failed to commit audit");
            AuditReport::StoreFailed(err.to_string())
        }
    }
}

fn failure_message(message: String) -> String {
    if message.trim().is_empty() {
        "audit failed".to_string()
    } else {
        message
    }
}

fn join_error_message(err: JoinError) -> String {
    if err.is_panic() {
        let payload = err.into_panic();
        format!("scoring panicked: {}", panic_payload(payload.as_ref()))
    } else {
        "scoring task was cancelled".to_string()
    }
}

fn panic_payload(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        *message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.as_str()
    } else {
        "unknown panic"
    }
}

/// Background worker that runs audits out of band.
///
/// Jobs are received over an unbounded channel so enqueueing never waits.
/// Each job runs as its own task with a store handle from the factory, so
/// audits for different simulations proceed concurrently and in no
/// particular order.
pub struct AuditQueue {
    sender: mpsc::UnboundedSender<AuditJob>,
    dispatcher: JoinHandle<()>,
}

impl AuditQueue {
    /// Spawns the dispatcher on the current tokio runtime.
    pub fn start(stores: SimulationStoreFactory, provider: ScoringProviderRef) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        let dispatcher = tokio::spawn(dispatch(receiver, stores, provider));
        Self { sender, dispatcher }
    }

    pub fn enqueue(&self, job: AuditJob) -> Result<()> {
        self.sender.send(job).map_err(|_| {
            LoanError::InternalError(Box::new(std::io::Error::other("audit queue is closed")))
        })
    }

    /// Stops accepting jobs and waits for every audit already queued.
    ///
    /// In-flight audits are never cancelled.
    pub async fn shutdown(self) -> Result<()> {
        drop(self.sender);
        self.dispatcher
            .await
            .map_err(|e| LoanError::InternalError(Box::new(e)))
    }
}

async fn dispatch(
    mut receiver: mpsc::UnboundedReceiver<AuditJob>,
    stores: SimulationStoreFactory,
    provider: ScoringProviderRef,
) {
    let mut in_flight = JoinSet::new();

    loop {
        tokio::select! {
            job = receiver.recv() => match job {
                Some(job) => {
                    in_flight.spawn(run_audit(stores(), provider.clone(), job));
                }
                None => break,
            },
            Some(finished) = in_flight.join_next(), if !in_flight.is_empty() => {
                reap(finished);
            }
        }
    }

    while let Some(finished) = in_flight.join_next().await {
        reap(finished);
    }
}

fn reap(finished: std::result::Result<AuditReport, JoinError>) {
    if let Err(err) = finished {
        tracing::error!(error = %err, "audit task aborted");
    }
}
