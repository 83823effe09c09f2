//! Runtime configuration, read from command-line flags with environment fallbacks.

use crate::error::{LoanError, Result};
use clap::Args;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Settings of the simulated risk scoring step.
#[derive(Args, Debug, Clone, PartialEq)]
pub struct AuditConfig {
    /// Shortest simulated scoring latency, in milliseconds.
    #[arg(long = "audit-min-delay-ms", env = "LOANSIM_AUDIT_MIN_DELAY_MS", default_value_t = 1000)]
    pub min_delay_ms: u64,

    /// Longest simulated scoring latency, in milliseconds.
    #[arg(long = "audit-max-delay-ms", env = "LOANSIM_AUDIT_MAX_DELAY_MS", default_value_t = 3000)]
    pub max_delay_ms: u64,

    /// Probability in [0, 1] that the simulated scoring service fails.
    #[arg(long = "audit-failure-rate", env = "LOANSIM_AUDIT_FAILURE_RATE", default_value_t = 0.10)]
    pub failure_rate: f64,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            min_delay_ms: 1000,
            max_delay_ms: 3000,
            failure_rate: 0.10,
        }
    }
}

impl AuditConfig {
    pub fn validate(&self) -> Result<()> {
        if self.min_delay_ms > self.max_delay_ms {
            return Err(LoanError::InvalidConfig(format!(
                "audit min delay ({} ms) exceeds max delay ({} ms)",
                self.min_delay_ms, self.max_delay_ms
            )));
        }
        if !(0.0..=1.0).contains(&self.failure_rate) {
            return Err(LoanError::InvalidConfig(format!(
                "audit failure rate must be within [0, 1], got {}",
                self.failure_rate
            )));
        }
        Ok(())
    }

    pub fn min_delay(&self) -> Duration {
        Duration::from_millis(self.min_delay_ms)
    }

    pub fn max_delay(&self) -> Duration {
        Duration::from_millis(self.max_delay_ms)
    }
}

/// Storage selection shared by every subcommand that persists simulations.
#[derive(Args, Debug, Clone, Default, PartialEq)]
pub struct StorageConfig {
    /// Path to persistent database (optional). If provided, uses RocksDB.
    #[arg(long, env = "LOANSIM_DB_PATH")]
    pub db_path: Option<PathBuf>,
}

#[derive(Args, Debug, Clone, PartialEq)]
pub struct ServerConfig {
    /// Address the HTTP server listens on.
    #[arg(long, env = "LOANSIM_BIND", default_value = "127.0.0.1:8080")]
    pub bind: SocketAddr,
}
