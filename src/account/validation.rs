//! Input validation for account fields
//!
//! `TaxId` is a validated CPF (Brazilian individual tax id). Its field is
//! private to force validation through [`TaxId::parse`].

use std::fmt;

/// Secret length bounds (characters)
pub const SECRET_MIN_LEN: usize = 6;
pub const SECRET_MAX_LEN: usize = 12;

/// CPF length in digits
pub const TAX_ID_LEN: usize = 11;

// ============================================================================
// Validation Errors
// ============================================================================

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ValidationError {
    #[error("Invalid length for {field}: expected {min}-{max}, got {actual}")]
    InvalidLength {
        field: &'static str,
        min: usize,
        max: usize,
        actual: usize,
    },

    #[error("Invalid format for {field}: '{value}' (expected: {expected})")]
    InvalidFormat {
        field: &'static str,
        value: String,
        expected: &'static str,
    },

    #[error("Invalid cpf check digits: '{0}'")]
    InvalidChecksum(String),
}

// ============================================================================
// TaxId
// ============================================================================

/// Validated CPF: exactly 11 ASCII digits with both check digits correct
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TaxId(String);

impl TaxId {
    /// # Examples
    /// ```
    /// use bank_ledger::account::TaxId;
    ///
    /// assert!(TaxId::parse("52998224725").is_ok());
    /// assert!(TaxId::parse("52998224726").is_err()); // wrong check digit
    /// assert!(TaxId::parse("529.982.247-25").is_err()); // digits only
    /// ```
    pub fn parse(value: &str) -> Result<Self, ValidationError> {
        if value.len() != TAX_ID_LEN {
            return Err(ValidationError::InvalidLength {
                field: "cpf",
                min: TAX_ID_LEN,
                max: TAX_ID_LEN,
                actual: value.len(),
            });
        }

        if !value.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ValidationError::InvalidFormat {
                field: "cpf",
                value: value.to_string(),
                expected: "11 digits",
            });
        }

        let digits: Vec<u32> = value.bytes().map(|b| (b - b'0') as u32).collect();
        let d1 = check_digit(&digits[..9]);
        let d2 = check_digit(&digits[..10]);
        if digits[9] != d1 || digits[10] != d2 {
            return Err(ValidationError::InvalidChecksum(value.to_string()));
        }

        Ok(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Wrap a value already validated on insert (rows read back from the store)
    pub(crate) fn from_trusted(value: String) -> Self {
        Self(value)
    }
}

/// Mod-11 check digit over `digits` with weights `len+1` down to 2
fn check_digit(digits: &[u32]) -> u32 {
    let top = digits.len() as u32 + 1;
    let sum: u32 = digits
        .iter()
        .enumerate()
        .map(|(i, d)| d * (top - i as u32))
        .sum();
    let remainder = sum % 11;
    if remainder < 2 { 0 } else { 11 - remainder }
}

impl fmt::Display for TaxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for TaxId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl serde::Serialize for TaxId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

// ============================================================================
// Plain field checks
// ============================================================================

/// Account display name: non-empty after trimming
pub fn validate_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::InvalidLength {
            field: "name",
            min: 1,
            max: usize::MAX,
            actual: 0,
        });
    }
    Ok(())
}

/// Secret: 6-12 characters
pub fn validate_secret(secret: &str) -> Result<(), ValidationError> {
    let len = secret.chars().count();
    if !(SECRET_MIN_LEN..=SECRET_MAX_LEN).contains(&len) {
        return Err(ValidationError::InvalidLength {
            field: "secret",
            min: SECRET_MIN_LEN,
            max: SECRET_MAX_LEN,
            actual: len,
        });
    }
    Ok(())
}

/// Adapter for `#[validate(custom(function = "validate_cpf"))]` on request DTOs
pub fn validate_cpf(value: &str) -> Result<(), validator::ValidationError> {
    TaxId::parse(value).map(|_| ()).map_err(|e| {
        let mut err = validator::ValidationError::new("cpf");
        err.message = Some(e.to_string().into());
        err
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_tax_ids() {
        for cpf in ["52998224725", "11144477735", "39053344705", "12345678909"] {
            let tax_id = TaxId::parse(cpf).unwrap();
            assert_eq!(tax_id.as_str(), cpf);
        }
    }

    #[test]
    fn test_tax_id_wrong_check_digits() {
        assert_eq!(
            TaxId::parse("52998224724"),
            Err(ValidationError::InvalidChecksum("52998224724".to_string()))
        );
        assert!(TaxId::parse("11144477736").is_err());
        assert!(TaxId::parse("12345678900").is_err());
    }

    #[test]
    fn test_tax_id_length() {
        assert!(matches!(
            TaxId::parse("5299822472"),
            Err(ValidationError::InvalidLength { actual: 10, .. })
        ));
        assert!(matches!(
            TaxId::parse("529982247250"),
            Err(ValidationError::InvalidLength { actual: 12, .. })
        ));
        assert!(TaxId::parse("").is_err());
    }

    #[test]
    fn test_tax_id_non_digits() {
        assert!(matches!(
            TaxId::parse("5299822472a"),
            Err(ValidationError::InvalidFormat { .. })
        ));
    }

    #[test]
    fn test_check_digit_remainder_below_two_is_zero() {
        // 98765432100: both check digits come from remainders < 2
        assert!(TaxId::parse("98765432100").is_ok());
    }

    #[test]
    fn test_name_and_secret() {
        assert!(validate_name("Alice").is_ok());
        assert!(validate_name("   ").is_err());
        assert!(validate_secret("123456").is_ok());
        assert!(validate_secret("123456789012").is_ok());
        assert!(validate_secret("12345").is_err());
        assert!(validate_secret("1234567890123").is_err());
    }

    #[test]
    fn test_validator_adapter() {
        assert!(validate_cpf("52998224725").is_ok());
        let err = validate_cpf("00000000001").unwrap_err();
        assert_eq!(err.code, "cpf");
    }
}
