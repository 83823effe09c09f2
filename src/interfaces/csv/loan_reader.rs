use crate::domain::loan::LoanRequest;
use crate::error::{LoanError, Result};
use std::io::Read;

/// Streams `amount,rate,months` rows out of a batch file.
///
/// Columns are matched by header name and padding around values is ignored.
/// A short or non-numeric row yields an `Err` for that row only, so one bad
/// loan does not stop the batch.
pub struct LoanRequestReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> LoanRequestReader<R> {
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    /// Rows are only parsed here; range checks happen when a simulation is run.
    pub fn requests(self) -> impl Iterator<Item = Result<LoanRequest>> {
        self.reader
            .into_deserialize()
            .map(|result| result.map_err(LoanError::from))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reader_valid_stream() {
        let data = "amount, rate, months\n1000, 12, 12\n1200.50, 0, 24";
        let reader = LoanRequestReader::new(data.as_bytes());
        let results: Vec<Result<LoanRequest>> = reader.requests().collect();

        assert_eq!(results.len(), 2);
        let first = results[0].as_ref().unwrap();
        assert_eq!(*first, LoanRequest::new(1000.0, 12.0, 12.0));
        let second = results[1].as_ref().unwrap();
        assert_eq!(second.amount, 1200.5);
        assert_eq!(second.months, 24.0);
    }

    #[test]
    fn test_reader_malformed_line() {
        let data = "amount, rate, months\nlots, 12, 12\n500, 5, 6";
        let reader = LoanRequestReader::new(data.as_bytes());
        let results: Vec<Result<LoanRequest>> = reader.requests().collect();

        assert!(matches!(results[0], Err(LoanError::Csv(_))));
        assert!(results[1].is_ok());
    }

    #[test]
    fn test_reader_short_row_fails_alone() {
        let data = "amount, rate, months\n1000, 12\n500, 5, 6";
        let reader = LoanRequestReader::new(data.as_bytes());
        let results: Vec<Result<LoanRequest>> = reader.requests().collect();

        assert_eq!(results.len(), 2);
        assert!(matches!(results[0], Err(LoanError::Csv(_))));
        assert_eq!(*results[1].as_ref().unwrap(), LoanRequest::new(500.0, 5.0, 6.0));
    }

    #[test]
    fn test_reader_keeps_out_of_range_values_for_validation() {
        let data = "amount, rate, months\n-5, 150, 1.5";
        let reader = LoanRequestReader::new(data.as_bytes());
        let request = reader.requests().next().unwrap().unwrap();

        assert!(matches!(
            request.validate(),
            Err(LoanError::InvalidInput { field: "amount", .. })
        ));
    }
}
