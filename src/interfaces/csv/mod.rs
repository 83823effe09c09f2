pub mod loan_reader;
pub mod schedule_writer;
pub mod simulation_writer;
