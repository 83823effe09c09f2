use crate::config::AuditConfig;
use crate::domain::ports::{AuditJob, ScoringProvider};
use crate::error::{LoanError, Result};
use async_trait::async_trait;
use rand::Rng;
use std::time::Duration;

pub const SIMULATED_FAILURE: &str = "Scoring service failed (simulated)";

/// Stand-in for an external risk scoring service.
///
/// Waits a uniformly random latency, then fails with a fixed probability.
#[derive(Debug, Clone)]
pub struct RandomScoringProvider {
    min_delay: Duration,
    max_delay: Duration,
    failure_rate: f64,
}

impl RandomScoringProvider {
    pub fn new(config: &AuditConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            min_delay: config.min_delay(),
            max_delay: config.max_delay(),
            failure_rate: config.failure_rate,
        })
    }

    // ThreadRng is not Send, so draw everything before the first await.
    fn draw(&self) -> (Duration, bool) {
        let mut rng = rand::thread_rng();
        let delay = if self.max_delay > self.min_delay {
            rng.gen_range(self.min_delay..=self.max_delay)
        } else {
            self.min_delay
        };
        (delay, rng.gen_bool(self.failure_rate))
    }
}

#[async_trait]
impl ScoringProvider for RandomScoringProvider {
    async fn score(&self, job: &AuditJob) -> Result<()> {
        let (delay, fails) = self.draw();
        tracing::debug!(
            simulation_id = job.simulation_id,
            delay_ms = delay.as_millis() as u64,
            "scoring simulation"
        );
        tokio::time::sleep(delay).await;

        if fails {
            return Err(LoanError::ScoringFailed(SIMULATED_FAILURE.to_string()));
        }
        Ok(())
    }
}
