//! Domain layer: loan terms, the amortization engine, simulation records and
//! the ports the application layer talks through.

pub mod amortization;
pub mod loan;
pub mod money;
pub mod ports;
pub mod simulation;
