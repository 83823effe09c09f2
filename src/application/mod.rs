//! Application layer containing the simulation orchestration.
//!
//! `LoanSimulator` is the primary entry point. Audits run out of band on an
//! `AuditQueue`, a tokio worker fed through a channel, so they never hold up
//! the caller that created the simulation.

pub mod audit;
pub mod simulator;
