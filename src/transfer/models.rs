//! Ledger entry types

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;

use crate::account::Account;

/// Append-only ledger entry
///
/// Its existence proves both balance mutations it implies were applied.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct Transfer {
    #[schema(example = 1)]
    pub id: i64,
    #[serde(rename = "account_origin_id")]
    pub origin_account_id: i64,
    #[serde(rename = "account_destination_id")]
    pub destination_account_id: i64,
    #[schema(value_type = String, example = "25.00")]
    pub amount: Decimal,
    pub created_at: DateTime<Utc>,
}

/// Transfer being computed for one request (no id yet)
///
/// Carries the account snapshots the new balances were derived from; the
/// store uses `origin.balance` / `destination.balance` as the expected
/// current values when committing.
#[derive(Debug, Clone)]
pub struct PendingTransfer {
    pub origin: Account,
    pub destination: Account,
    pub amount: Decimal,
}

impl PendingTransfer {
    pub fn origin_id(&self) -> i64 {
        self.origin.id
    }

    pub fn destination_id(&self) -> i64 {
        self.destination.id
    }
}

/// Query filter for listing transfers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferFilter {
    pub origin_account_id: i64,
}

impl TransferFilter {
    pub fn by_origin(origin_account_id: i64) -> Self {
        Self { origin_account_id }
    }
}
