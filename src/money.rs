//! Money Module
//!
//! Exact decimal arithmetic for account balances and transfer amounts.
//! All balance math MUST go through this module.
//!
//! ## Design Principles
//! 1. No binary floating point anywhere on the money path
//! 2. Minor unit is the cent: every stored value has at most 2 fractional digits
//! 3. Explicit Error Handling: client input with extra precision is rejected,
//!    never silently truncated
//!
//! ## Usage
//! ```rust
//! use bank_ledger::money::{add, subtract, validate_amount, format_amount};
//! use rust_decimal::Decimal;
//! use std::str::FromStr;
//!
//! let a = Decimal::from_str("10.10").unwrap();
//! let b = Decimal::from_str("0.05").unwrap();
//! assert_eq!(format_amount(add(a, b)), "10.15");
//! assert_eq!(format_amount(subtract(a, b)), "10.05");
//!
//! let amount = validate_amount(Decimal::from_str("1.5").unwrap()).unwrap();
//! assert_eq!(format_amount(amount), "1.50");
//! assert!(validate_amount(Decimal::from_str("0.001").unwrap()).is_err());
//! ```

use rust_decimal::prelude::*;
use thiserror::Error;

/// Fractional digits of the currency minor unit (cents)
pub const MINOR_UNIT_DECIMALS: u32 = 2;

// ============================================================================
// Error Types
// ============================================================================

/// Transfer amount errors
#[derive(Debug, Error, PartialEq)]
pub enum MoneyError {
    #[error("Precision overflow: provided {provided} decimals, max allowed {max}")]
    PrecisionOverflow { provided: u32, max: u32 },

    #[error("Amount must be positive")]
    InvalidAmount,
}

// ============================================================================
// Arithmetic
// ============================================================================

/// Add two amounts, result truncated to the minor unit
pub fn add(a: Decimal, b: Decimal) -> Decimal {
    to_minor_unit(a + b)
}

/// Subtract `b` from `a`, result truncated to the minor unit
///
/// Callers check sufficiency first; this function does not clamp at zero.
pub fn subtract(a: Decimal, b: Decimal) -> Decimal {
    to_minor_unit(a - b)
}

/// Truncate toward zero to 2 fractional digits and normalize the scale
fn to_minor_unit(value: Decimal) -> Decimal {
    let mut v = value.round_dp_with_strategy(MINOR_UNIT_DECIMALS, RoundingStrategy::ToZero);
    v.rescale(MINOR_UNIT_DECIMALS);
    v
}

/// Check that a value is representable in minor units without loss
pub fn has_valid_precision(value: Decimal) -> bool {
    value.normalize().scale() <= MINOR_UNIT_DECIMALS
}

// ============================================================================
// Validate: Client → Internal
// ============================================================================

/// Validate an already-parsed Decimal as a transfer amount
///
/// # Errors
/// * `InvalidAmount` - zero or negative
/// * `PrecisionOverflow` - more than 2 significant fractional digits
pub fn validate_amount(amount: Decimal) -> Result<Decimal, MoneyError> {
    if amount.is_sign_negative() || amount.is_zero() {
        return Err(MoneyError::InvalidAmount);
    }
    if !has_valid_precision(amount) {
        return Err(MoneyError::PrecisionOverflow {
            provided: amount.normalize().scale(),
            max: MINOR_UNIT_DECIMALS,
        });
    }
    let mut amount = amount;
    amount.rescale(MINOR_UNIT_DECIMALS);
    Ok(amount)
}

// ============================================================================
// Format: Internal → Client
// ============================================================================

/// Render an amount with exactly 2 fractional digits
pub fn format_amount(value: Decimal) -> String {
    format!("{:.prec$}", value, prec = MINOR_UNIT_DECIMALS as usize)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_add_exact() {
        assert_eq!(add(d("10.10"), d("0.05")), d("10.15"));
        assert_eq!(format_amount(add(d("10.10"), d("0.05"))), "10.15");
    }

    #[test]
    fn test_subtract_exact() {
        assert_eq!(subtract(d("10.10"), d("0.05")), d("10.05"));
        assert_eq!(subtract(d("100.00"), d("100.00")), Decimal::ZERO);
    }

    #[test]
    fn test_float_drift_case_is_exact() {
        // 0.1 + 0.2 drifts in binary floating point
        assert_eq!(add(d("0.1"), d("0.2")), d("0.30"));

        let mut total = Decimal::ZERO;
        for _ in 0..1000 {
            total = add(total, d("0.01"));
        }
        assert_eq!(total, d("10.00"));
    }

    #[test]
    fn test_result_truncated_to_minor_unit() {
        // Not reachable through validated inputs, but the output contract holds
        assert_eq!(add(d("1.005"), d("0")), d("1.00"));
        assert_eq!(subtract(d("1.009"), d("0")), d("1.00"));
        assert_eq!(add(d("1"), d("2")).scale(), 2);
    }

    #[test]
    fn test_validate_amount() {
        assert_eq!(validate_amount(d("50.1")).unwrap(), d("50.10"));
        assert_eq!(validate_amount(d("50.100")).unwrap(), d("50.10"));
        assert_eq!(validate_amount(d("0")), Err(MoneyError::InvalidAmount));
        assert_eq!(validate_amount(d("-3")), Err(MoneyError::InvalidAmount));
        assert!(matches!(
            validate_amount(d("0.005")),
            Err(MoneyError::PrecisionOverflow { .. })
        ));
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(Decimal::ZERO), "0.00");
        assert_eq!(format_amount(d("100")), "100.00");
        assert_eq!(format_amount(d("7.5")), "7.50");
    }
}
