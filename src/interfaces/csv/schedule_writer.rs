use crate::domain::loan::AmortizationRow;
use crate::error::Result;
use rust_decimal::Decimal;
use std::io::Write;

pub(crate) fn cents(value: Decimal) -> String {
    format!("{value:.2}")
}

/// Writes an amortization schedule as CSV, one row per month.
pub struct ScheduleWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> ScheduleWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
        }
    }

    /// Writes the header and every row with amounts fixed at two decimals.
    pub fn write_schedule(&mut self, rows: &[AmortizationRow]) -> Result<()> {
        self.writer
            .write_record(["month", "payment", "interest", "principal", "balance"])?;
        for row in rows {
            self.writer.write_record([
                row.month.to_string(),
                cents(row.payment),
                cents(row.interest),
                cents(row.principal),
                cents(row.balance),
            ])?;
        }
        self.writer.flush()?;
        Ok(())
    }
}
