//! Money types for API boundary enforcement
//!
//! - `StrictDecimal`: Format-validated input type

use rust_decimal::prelude::*;
use serde::Deserialize;
use std::fmt;

// ============================================================================
// StrictDecimal: Format-Validated Decimal at Serde Layer
// ============================================================================

/// Strict format Decimal - validates format during deserialization
///
/// This type provides format validation at the Serde layer:
/// - Rejects `.5` (must be `0.5`)
/// - Rejects `5.` (must be `5.0` or `5`)
/// - Rejects empty strings
/// - Rejects scientific notation
///
/// JSON numbers are accepted and read through their shortest decimal
/// rendering, so `10.1` becomes exactly `10.1`. Numbers at or above
/// [`MAX_JSON_NUMBER_AMOUNT`] are rejected; such amounts must be sent as
/// strings.
///
/// Business validation (sign, zero, precision) happens later in the
/// transfer engine.
#[derive(Debug, Clone, Copy)]
pub struct StrictDecimal(Decimal);

impl StrictDecimal {
    /// Get the inner Decimal value
    pub fn inner(self) -> Decimal {
        self.0
    }
}

impl std::ops::Deref for StrictDecimal {
    type Target = Decimal;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Exclusive bound on JSON-number amounts. Below it a value with 2 fractional
/// digits has at most 15 significant digits, which f64 round-trips exactly.
pub const MAX_JSON_NUMBER_AMOUNT: f64 = 10_000_000_000_000.0;

fn parse_strict(s: &str) -> Result<Decimal, String> {
    if s.is_empty() {
        return Err("Amount cannot be empty".to_string());
    }

    // Reject .5 format (must be 0.5)
    if s.starts_with('.') || s.starts_with("-.") {
        return Err("Invalid format: use 0.5 not .5".to_string());
    }

    // Reject 5. format (must be 5.0 or 5)
    if s.ends_with('.') {
        return Err("Invalid format: use 5.0 not 5.".to_string());
    }

    // Reject scientific notation (1.5e8, 1E10, etc.); other letters are plain garbage
    if is_exponent_form(s) {
        return Err("Invalid format: scientific notation not allowed".to_string());
    }

    // Reject + prefix (should be implicit)
    if s.starts_with('+') {
        return Err("Invalid format: + prefix not allowed".to_string());
    }

    Decimal::from_str(s).map_err(|e| format!("Invalid decimal: {}", e))
}

/// Digits, sign and point around exactly one `e`/`E` with digits on both sides
fn is_exponent_form(s: &str) -> bool {
    let Some((mantissa, exponent)) = s.split_once(['e', 'E']) else {
        return false;
    };
    let exponent = exponent.strip_prefix(['+', '-']).unwrap_or(exponent);
    mantissa.bytes().any(|b| b.is_ascii_digit())
        && mantissa
            .bytes()
            .all(|b| b.is_ascii_digit() || b == b'.' || b == b'-' || b == b'+')
        && !exponent.is_empty()
        && exponent.bytes().all(|b| b.is_ascii_digit())
}

struct StrictDecimalVisitor;

impl<'de> serde::de::Visitor<'de> for StrictDecimalVisitor {
    type Value = StrictDecimal;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a decimal amount as a string or number")
    }

    fn visit_str<E: serde::de::Error>(self, v: &str) -> Result<Self::Value, E> {
        parse_strict(v).map(StrictDecimal).map_err(E::custom)
    }

    fn visit_u64<E: serde::de::Error>(self, v: u64) -> Result<Self::Value, E> {
        Ok(StrictDecimal(Decimal::from(v)))
    }

    fn visit_i64<E: serde::de::Error>(self, v: i64) -> Result<Self::Value, E> {
        Ok(StrictDecimal(Decimal::from(v)))
    }

    fn visit_f64<E: serde::de::Error>(self, v: f64) -> Result<Self::Value, E> {
        if !v.is_finite() {
            return Err(E::custom("Amount must be finite"));
        }
        if v.abs() >= MAX_JSON_NUMBER_AMOUNT {
            return Err(E::custom(
                "Amount too large for a JSON number: send it as a string",
            ));
        }
        // `{}` on f64 never uses exponent notation
        Decimal::from_str(&format!("{}", v))
            .map(StrictDecimal)
            .map_err(|e| E::custom(format!("Invalid decimal: {}", e)))
    }
}

impl<'de> Deserialize<'de> for StrictDecimal {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        deserializer.deserialize_any(StrictDecimalVisitor)
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
