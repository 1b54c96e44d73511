//! Validation utilities for monetary input
//!
//! Amounts are validated before anything reaches the ledger; the engine never
//! stores a negative cost or revenue figure, nor one above [`MAX_AMOUNT`].

use std::str::FromStr;

use rust_decimal::Decimal;

/// Largest accepted amount: 10^15 currency units.
///
/// Sums of many amounts at this ceiling still fit in a `Decimal`, so totals
/// built from validated figures cannot overflow.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(0xA4C6_8000, 0x0003_8D7E, 0, false, 0);

/// Validate a ledger amount (zero allowed, negative or above [`MAX_AMOUNT`] rejected)
pub fn validate_amount(amount: Decimal) -> Result<(), &'static str> {
    if amount < Decimal::ZERO {
        return Err("Amount cannot be negative");
    }
    if amount > MAX_AMOUNT {
        return Err("Amount is too large");
    }
    Ok(())
}

/// Parse and validate a user-entered amount
pub fn parse_amount(raw: &str) -> Result<Decimal, &'static str> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err("Amount is required");
    }
    let amount = Decimal::from_str(trimmed).map_err(|_| "Amount must be numeric")?;
    validate_amount(amount)?;
    Ok(amount)
}

/// Convert a floating point amount coming from a loosely typed caller
pub fn amount_from_f64(value: f64) -> Result<Decimal, &'static str> {
    if !value.is_finite() {
        return Err("Amount must be a finite number");
    }
    let amount = Decimal::try_from(value).map_err(|_| "Amount is out of range")?;
    validate_amount(amount)?;
    Ok(amount)
}

/// `validator` hook for amount fields
pub fn validate_non_negative_amount(amount: &Decimal) -> Result<(), validator::ValidationError> {
    validate_amount(*amount).map_err(|msg| {
        let mut error = validator::ValidationError::new("amount");
        error.message = Some(msg.into());
        error
    })
}
