//! Data models for account management

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;

use super::validation::TaxId;

/// Balance every new account starts with (100.00)
pub const INITIAL_BALANCE: Decimal = Decimal::from_parts(10_000, 0, 0, false, 2);

/// Ledger account
///
/// `balance` is only ever changed by the ledger commit; `secret_hash` never
/// leaves the process.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Account {
    #[schema(example = 1)]
    pub id: i64,
    #[schema(example = "Maria Silva")]
    pub name: String,
    #[serde(rename = "cpf")]
    #[schema(value_type = String, example = "52998224725")]
    pub tax_id: TaxId,
    #[serde(skip)]
    pub secret_hash: String,
    #[schema(value_type = String, example = "100.00")]
    pub balance: Decimal,
    pub created_at: DateTime<Utc>,
}

/// Validated, hashed input for account creation
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub name: String,
    pub tax_id: TaxId,
    pub secret_hash: String,
    pub balance: Decimal,
}

/// Explicit account queries supported by every store
#[derive(Debug, Clone)]
pub enum AccountLookup {
    Id(i64),
    TaxId(TaxId),
    /// Login lookup: tax id match plus secret verified against the stored hash
    Credentials { tax_id: TaxId, secret: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_initial_balance() {
        assert_eq!(INITIAL_BALANCE, Decimal::from_str("100.00").unwrap());
        assert_eq!(INITIAL_BALANCE.to_string(), "100.00");
    }

    #[test]
    fn test_secret_hash_not_serialized() {
        let account = Account {
            id: 7,
            name: "Maria".to_string(),
            tax_id: TaxId::parse("52998224725").unwrap(),
            secret_hash: "$argon2id$secret".to_string(),
            balance: INITIAL_BALANCE,
            created_at: Utc::now(),
        };
        let json = serde_json::to_value(&account).unwrap();
        assert_eq!(json["cpf"], "52998224725");
        assert_eq!(json["balance"], "100.00");
        assert!(json.get("secret_hash").is_none());
    }
}
