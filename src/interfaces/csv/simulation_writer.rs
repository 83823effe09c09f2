use super::schedule_writer::cents;
use crate::domain::simulation::SimulationRecord;
use crate::error::Result;
use std::io::Write;

/// Writes one summary line per simulation, audit status included.
pub struct SimulationWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> SimulationWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
        }
    }

    pub fn write_simulations(&mut self, records: &[SimulationRecord]) -> Result<()> {
        self.writer.write_record([
            "simulation_id",
            "amount",
            "rate",
            "months",
            "monthly_payment",
            "total_paid",
            "total_interest",
            "audit_status",
            "audit_error",
        ])?;
        for record in records {
            self.writer.write_record([
                record.id.to_string(),
                record.amount.to_string(),
                record.rate.to_string(),
                record.months.to_string(),
                cents(record.monthly_payment),
                cents(record.total_paid),
                cents(record.total_interest),
                record.audit_status.to_string(),
                record.audit_error.clone().unwrap_or_default(),
            ])?;
        }
        self.writer.flush()?;
        Ok(())
    }
}
