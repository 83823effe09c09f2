use crate::error::{LoanError, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Loan parameters as supplied by a caller, before validation.
///
/// `months` is carried as a raw number so a fractional term can be rejected
/// with a proper validation message instead of a deserialization failure.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LoanRequest {
    pub amount: f64,
    pub rate: f64,
    pub months: f64,
}

/// Largest principal accepted, so every reported amount keeps its cents.
pub const MAX_AMOUNT: f64 = 1e12;
/// Longest term accepted, one hundred years of monthly payments.
pub const MAX_TERM_MONTHS: u32 = 1200;

/// Validated loan parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LoanTerms {
    /// Principal borrowed, in `(0, MAX_AMOUNT]`.
    pub amount: f64,
    /// Annual interest rate in percent, within `[0, 100]`.
    pub annual_rate_percent: f64,
    /// Number of monthly payments, in `[1, MAX_TERM_MONTHS]`.
    pub term_months: u32,
}

impl LoanTerms {
    pub fn new(amount: f64, annual_rate_percent: f64, term_months: u32) -> Result<Self> {
        if !amount.is_finite() || amount <= 0.0 {
            return Err(LoanError::invalid_input(
                "amount",
                "Amount must be a number greater than 0",
            ));
        }
        if amount > MAX_AMOUNT {
            return Err(LoanError::invalid_input(
                "amount",
                "Amount must not exceed 1000000000000",
            ));
        }
        if !(0.0..=100.0).contains(&annual_rate_percent) {
            return Err(LoanError::invalid_input(
                "rate",
                "The annual rate must be a number between 0 and 100",
            ));
        }
        if term_months == 0 {
            return Err(months_error());
        }
        if term_months > MAX_TERM_MONTHS {
            return Err(term_too_long());
        }

        Ok(Self {
            amount,
            annual_rate_percent,
            term_months,
        })
    }
}

fn months_error() -> LoanError {
    LoanError::invalid_input(
        "months",
        "Payment periods must be an integer greater than 0",
    )
}

fn term_too_long() -> LoanError {
    LoanError::invalid_input("months", "Payment periods must not exceed 1200")
}

impl LoanRequest {
    pub fn new(amount: f64, rate: f64, months: f64) -> Self {
        Self {
            amount,
            rate,
            months,
        }
    }

    /// Checks every constraint and yields the terms the engine works with.
    pub fn validate(&self) -> Result<LoanTerms> {
        let months = self.months;
        if !months.is_finite() || months.fract() != 0.0 || months < 1.0 {
            // Surface an amount/rate problem first, matching field order.
            LoanTerms::new(self.amount, self.rate, 1)?;
            return Err(months_error());
        }
        if months > f64::from(MAX_TERM_MONTHS) {
            LoanTerms::new(self.amount, self.rate, 1)?;
            return Err(term_too_long());
        }
        LoanTerms::new(self.amount, self.rate, months as u32)
    }
}

impl TryFrom<LoanRequest> for LoanTerms {
    type Error = LoanError;

    fn try_from(request: LoanRequest) -> Result<Self> {
        request.validate()
    }
}

/// One period of an amortization schedule. All amounts are rounded to cents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmortizationRow {
    pub month: u32,
    #[serde(with = "crate::domain::money::as_number")]
    pub payment: Decimal,
    #[serde(with = "crate::domain::money::as_number")]
    pub interest: Decimal,
    #[serde(with = "crate::domain::money::as_number")]
    pub principal: Decimal,
    #[serde(with = "crate::domain::money::as_number")]
    pub balance: Decimal,
}

/// Outcome of the amortization engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmortizationResult {
    #[serde(with = "crate::domain::money::as_number")]
    pub monthly_payment: Decimal,
    #[serde(with = "crate::domain::money::as_number")]
    pub total_paid: Decimal,
    #[serde(with = "crate::domain::money::as_number")]
    pub total_interest: Decimal,
    pub schedule: Vec<AmortizationRow>,
}
