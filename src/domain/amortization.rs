//! French (annuity) amortization engine.
//!
//! The installment is constant over the whole term; each period's interest is
//! charged on the outstanding balance and the remainder of the installment
//! repays principal.

use super::loan::{AmortizationResult, AmortizationRow, LoanTerms};
use super::money::round_money;
use crate::error::Result;

/// Computes the fixed installment, totals and per-month breakdown of a loan.
///
/// Inputs are validated first; nothing is computed when any of them is out of
/// range. The computation runs in `f64` and only the reported values are
/// rounded. `total_interest` is accumulated from the unrounded per-month
/// interest and rounded once at the end, so it can differ by a cent from the
/// sum of the rounded `interest` column.
pub fn compute_schedule(
    amount: f64,
    annual_rate_percent: f64,
    term_months: u32,
) -> Result<AmortizationResult> {
    let terms = LoanTerms::new(amount, annual_rate_percent, term_months)?;
    amortize(&terms)
}

/// Same as [`compute_schedule`] for terms that have already been validated.
pub fn amortize(terms: &LoanTerms) -> Result<AmortizationResult> {
    let amount = terms.amount;
    let months = terms.term_months;
    let month_rate = (terms.annual_rate_percent / 100.0) / 12.0;

    let monthly_payment = if month_rate == 0.0 {
        amount / f64::from(months)
    } else {
        amount * (month_rate / (1.0 - (1.0 + month_rate).powf(-f64::from(months))))
    };
    let total_paid = monthly_payment * f64::from(months);

    let payment = round_money(monthly_payment)?;
    let mut schedule = Vec::with_capacity(months as usize);
    let mut balance = amount;
    let mut total_interest = 0.0;

    for month in 1..=months {
        let interest = balance * month_rate;
        let principal = monthly_payment - interest;
        schedule.push(AmortizationRow {
            month,
            payment,
            interest: round_money(interest)?,
            principal: round_money(principal)?,
            balance: round_money(balance - principal)?,
        });
        balance -= principal;
        total_interest += interest;
    }

    Ok(AmortizationResult {
        monthly_payment: payment,
        total_paid: round_money(total_paid)?,
        total_interest: round_money(total_interest)?,
        schedule,
    })
}
