use super::loan::{AmortizationResult, AmortizationRow, LoanTerms};
use crate::error::{LoanError, Result};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

pub type SimulationId = u64;

/// Lifecycle of the risk audit attached to a simulation.
///
/// `Pending` is the only initial state; `Success` and `Failed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AuditStatus {
    #[default]
    Pending,
    Success,
    Failed,
}

impl AuditStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Pending)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Success => "SUCCESS",
            Self::Failed => "FAILED",
        }
    }
}

impl fmt::Display for AuditStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Terminal verdict of an audit. A failure always carries its message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuditOutcome {
    Success,
    Failed(String),
}

impl AuditOutcome {
    pub fn status(&self) -> AuditStatus {
        match self {
            Self::Success => AuditStatus::Success,
            Self::Failed(_) => AuditStatus::Failed,
        }
    }
}

/// Fields of a simulation at the moment it is accepted, before it has an id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewSimulation {
    pub amount: f64,
    pub rate: f64,
    pub months: u32,
    #[serde(with = "crate::domain::money::as_number")]
    pub monthly_payment: Decimal,
    #[serde(with = "crate::domain::money::as_number")]
    pub total_paid: Decimal,
    #[serde(with = "crate::domain::money::as_number")]
    pub total_interest: Decimal,
    /// Schedule rows encoded as a JSON array, in month order.
    pub schedule_json: String,
}

impl NewSimulation {
    pub fn from_result(terms: &LoanTerms, result: &AmortizationResult) -> Result<Self> {
        Ok(Self {
            amount: terms.amount,
            rate: terms.annual_rate_percent,
            months: terms.term_months,
            monthly_payment: result.monthly_payment,
            total_paid: result.total_paid,
            total_interest: result.total_interest,
            schedule_json: serde_json::to_string(&result.schedule)?,
        })
    }

    /// Turns the accepted fields into a stored record, awaiting its audit.
    pub fn into_record(self, id: SimulationId, created_at: DateTime<Utc>) -> SimulationRecord {
        SimulationRecord {
            id,
            amount: self.amount,
            rate: self.rate,
            months: self.months,
            monthly_payment: self.monthly_payment,
            total_paid: self.total_paid,
            total_interest: self.total_interest,
            schedule_json: self.schedule_json,
            audit_status: AuditStatus::Pending,
            audit_error: None,
            created_at,
        }
    }
}

/// A persisted simulation. Only the audit fields change after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationRecord {
    pub id: SimulationId,
    pub amount: f64,
    pub rate: f64,
    pub months: u32,
    #[serde(with = "crate::domain::money::as_number")]
    pub monthly_payment: Decimal,
    #[serde(with = "crate::domain::money::as_number")]
    pub total_paid: Decimal,
    #[serde(with = "crate::domain::money::as_number")]
    pub total_interest: Decimal,
    pub schedule_json: String,
    pub audit_status: AuditStatus,
    pub audit_error: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl SimulationRecord {
    /// Moves a pending audit to its terminal state.
    ///
    /// Fails without touching the record when the audit is already resolved.
    pub fn complete_audit(&mut self, outcome: AuditOutcome) -> Result<()> {
        if self.audit_status.is_terminal() {
            return Err(LoanError::AuditAlreadyResolved(self.id));
        }
        self.audit_status = outcome.status();
        self.audit_error = match outcome {
            AuditOutcome::Success => None,
            AuditOutcome::Failed(message) => Some(message),
        };
        Ok(())
    }

    pub fn schedule(&self) -> Result<Vec<AmortizationRow>> {
        Ok(serde_json::from_str(&self.schedule_json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::amortization::compute_schedule;
    use rust_decimal_macros::dec;

    fn record() -> SimulationRecord {
        let terms = LoanTerms::new(1000.0, 12.0, 12).unwrap();
        let result = compute_schedule(1000.0, 12.0, 12).unwrap();
        NewSimulation::from_result(&terms, &result)
            .unwrap()
            .into_record(1, Utc::now())
    }

    #[test]
    fn test_new_record_is_pending() {
        let record = record();
        assert_eq!(record.audit_status, AuditStatus::Pending);
        assert!(record.audit_error.is_none());
        assert_eq!(record.monthly_payment, dec!(88.85));
    }

    #[test]
    fn test_success_transition() {
        let mut record = record();
        record.complete_audit(AuditOutcome::Success).unwrap();
        assert_eq!(record.audit_status, AuditStatus::Success);
        assert!(record.audit_error.is_none());
    }

    #[test]
    fn test_failed_transition_keeps_message() {
        let mut record = record();
        record
            .complete_audit(AuditOutcome::Failed("scoring timed out".to_string()))
            .unwrap();
        assert_eq!(record.audit_status, AuditStatus::Failed);
        assert_eq!(record.audit_error.as_deref(), Some("scoring timed out"));
    }

    #[test]
    fn test_terminal_states_are_final() {
        let mut record = record();
        record
            .complete_audit(AuditOutcome::Failed("boom".to_string()))
            .unwrap();

        let result = record.complete_audit(AuditOutcome::Success);
        assert!(matches!(result, Err(LoanError::AuditAlreadyResolved(1))));
        assert_eq!(record.audit_status, AuditStatus::Failed);
        assert_eq!(record.audit_error.as_deref(), Some("boom"));
    }

    #[test]
    fn test_schedule_blob_preserves_rows() {
        let result = compute_schedule(1000.0, 12.0, 12).unwrap();
        let record = record();

        let decoded = record.schedule().unwrap();
        assert_eq!(decoded, result.schedule);
        assert_eq!(decoded[0].principal, dec!(78.85));
        assert_eq!(decoded[11].month, 12);
    }

    #[test]
    fn test_schedule_blob_uses_plain_numbers() {
        let record = record();
        let value: serde_json::Value = serde_json::from_str(&record.schedule_json).unwrap();
        let first = &value[0];
        assert_eq!(first["month"], 1);
        assert_eq!(first["payment"].as_f64(), Some(88.85));
        assert_eq!(first["balance"].as_f64(), Some(921.15));
    }

    #[test]
    fn test_status_wire_names() {
        assert_eq!(
            serde_json::to_string(&AuditStatus::Pending).unwrap(),
            "\"PENDING\""
        );
        assert_eq!(AuditStatus::Failed.to_string(), "FAILED");
        assert!(!AuditStatus::Pending.is_terminal());
        assert!(AuditStatus::Success.is_terminal());
    }
}
