//! Conversion between decimal token amounts and smallest-unit integers

use std::str::FromStr;

use alloy_primitives::U256;
use bigdecimal::{
    num_bigint::{BigInt, Sign},
    BigDecimal,
};

use crate::errors::UnitsError;

/// The number of decimal digits in `U256::MAX`
const U256_MAX_DIGITS: i64 = 78;

/// Convert a decimal amount string into the token's smallest unit
///
/// Rejects empty, non-numeric, zero and negative amounts, and amounts with
/// more fractional digits than the token has decimals
pub fn parse_amount(amount: &str, decimals: u8) -> Result<U256, UnitsError> {
    let trimmed = amount.trim();
    if trimmed.is_empty() {
        return Err(UnitsError::InvalidAmount(amount.to_string()));
    }

    let value = BigDecimal::from_str(trimmed)
        .map_err(|_| UnitsError::InvalidAmount(amount.to_string()))?;
    if value.sign() != Sign::Plus {
        return Err(UnitsError::NonPositive(amount.to_string()));
    }

    // Bound the magnitude before scaling; exponent notation can describe
    // integers far too large to materialize
    let value = value.normalized();
    let (_, exponent) = value.as_bigint_and_exponent();
    if exponent > i64::from(decimals) {
        return Err(UnitsError::TooManyDecimals { amount: amount.to_string(), decimals });
    }

    let whole_digits = i64::try_from(value.digits()).unwrap_or(i64::MAX).saturating_sub(exponent);
    if whole_digits.saturating_add(i64::from(decimals)) > U256_MAX_DIGITS {
        return Err(UnitsError::Overflow(amount.to_string()));
    }

    let scale: BigDecimal = BigInt::from(10).pow(decimals as u32).into();
    let scaled = value * scale;
    if !scaled.is_integer() {
        return Err(UnitsError::TooManyDecimals { amount: amount.to_string(), decimals });
    }

    let (atoms, _) = scaled.with_scale(0).into_bigint_and_exponent();
    U256::from_str_radix(&atoms.to_string(), 10)
        .map_err(|_| UnitsError::Overflow(amount.to_string()))
}

/// Render a smallest-unit amount as a decimal string, trimming trailing
/// fractional zeros
pub fn format_amount(amount: U256, decimals: u8) -> String {
    let digits = amount.to_string();
    let decimals = decimals as usize;
    if decimals == 0 {
        return digits;
    }

    let padded = format!("{digits:0>width$}", width = decimals + 1);
    let (whole, fraction) = padded.split_at(padded.len() - decimals);
    let fraction = fraction.trim_end_matches('0');

    if fraction.is_empty() {
        whole.to_string()
    } else {
        format!("{whole}.{fraction}")
    }
}
