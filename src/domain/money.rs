use crate::error::{LoanError, Result};
use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;

/// Number of decimal places every currency amount is reported with.
pub const CENTS: u32 = 2;

/// Rounds a computed amount to cents, half-up.
///
/// The value is first taken at its shortest decimal representation (the digits
/// `f64`'s `Display` prints), then rounded as an exact decimal. Going through the
/// decimal form is what makes `10.125` land on `10.13`: rounding the binary value
/// directly would see `10.12499999...` and drop the cent.
pub fn round_money(value: f64) -> Result<Decimal> {
    if !value.is_finite() {
        return Err(LoanError::Arithmetic(format!(
            "cannot round non-finite amount {value}"
        )));
    }

    // Anything below a tenth of a cent rounds to zero.
    if value.abs() < 0.001 {
        return Ok(Decimal::ZERO);
    }

    let exact = Decimal::from_str(&value.to_string())
        .map_err(|e| LoanError::Arithmetic(format!("amount {value} out of range: {e}")))?;

    Ok(exact.round_dp_with_strategy(CENTS, RoundingStrategy::MidpointAwayFromZero))
}

/// Serde adapter writing amounts as plain JSON numbers.
///
/// Both directions go through the shortest decimal text of the float, so a
/// cent amount reads back as exactly the same `Decimal`.
pub mod as_number {
    use rust_decimal::Decimal;
    use serde::{Deserialize, Deserializer, Serializer, de, ser};
    use std::str::FromStr;

    pub fn serialize<S>(value: &Decimal, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let number: f64 = value.to_string().parse().map_err(ser::Error::custom)?;
        serializer.serialize_f64(number)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
    where
        D: Deserializer<'de>,
    {
        let number = f64::deserialize(deserializer)?;
        Decimal::from_str(&number.to_string()).map_err(de::Error::custom)
    }
}
