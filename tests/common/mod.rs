#![allow(dead_code)]

use std::io::{Error, Write};
use std::path::Path;
use tempfile::NamedTempFile;

/// Audit flags that make the scoring step instant and deterministic.
pub fn instant_audit(failure_rate: &str) -> [&str; 6] {
    [
        "--audit-min-delay-ms",
        "0",
        "--audit-max-delay-ms",
        "0",
        "--audit-failure-rate",
        failure_rate,
    ]
}

/// Writes a loan CSV with the given `(amount, rate, months)` rows.
pub fn loan_csv(rows: &[(&str, &str, &str)]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "amount, rate, months").unwrap();
    for (amount, rate, months) in rows {
        writeln!(file, "{amount}, {rate}, {months}").unwrap();
    }
    file.flush().unwrap();
    file
}

pub fn generate_loans(path: &Path, rows: usize) -> Result<(), Error> {
    let mut wtr = csv::WriterBuilder::new().from_path(path)?;
    wtr.write_record(["amount", "rate", "months"])?;

    for i in 1..=rows {
        let amount = (1000 + i * 25).to_string();
        let rate = (i % 30).to_string();
        let months = (1 + i % 360).to_string();
        wtr.write_record([amount.as_str(), rate.as_str(), months.as_str()])?;
    }

    wtr.flush()?;
    Ok(())
}
