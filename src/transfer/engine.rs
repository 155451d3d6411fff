//! Transfer Engine
//!
//! Validates a transfer request, computes the new balances and hands the
//! result to the ledger store. A commit that loses an optimistic race is
//! retried from a fresh read, bounded by `TransferConfig::max_attempts`.
//!
//! Every failed attempt is caused by a different commit on one of the two
//! accounts landing between its read and its write. N concurrent transfers
//! touching an account therefore need at most N attempts each, provided the
//! reads come from the primary (see [`LedgerStore::load_account`]).

use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use rust_decimal::Decimal;
use tracing::{debug, error, info, warn};

use super::error::TransferError;
use super::models::{PendingTransfer, Transfer, TransferFilter};
use super::store::{CommitError, LedgerStore};
use crate::account::Account;
use crate::config::TransferConfig;
use crate::money;

pub struct TransferEngine {
    ledger: Arc<dyn LedgerStore>,
    config: TransferConfig,
}

/// Outcome of a single read-compute-commit pass
enum Attempt {
    Done(Transfer),
    Conflict(i64),
}

impl TransferEngine {
    pub fn new(ledger: Arc<dyn LedgerStore>, config: TransferConfig) -> Self {
        Self { ledger, config }
    }

    pub async fn list_transfers(
        &self,
        filter: &TransferFilter,
    ) -> Result<Vec<Transfer>, TransferError> {
        self.ledger
            .list_transfers(filter)
            .await
            .map_err(|e| persistence("list transfers", e))
    }

    /// Move `amount` from `origin_id` to `destination_id`
    ///
    /// Returns the recorded transfer. Rejections never touch the store
    /// beyond the reads needed to decide them.
    pub async fn create_transfer(
        &self,
        origin_id: i64,
        destination_id: i64,
        amount: Decimal,
    ) -> Result<Transfer, TransferError> {
        if origin_id == destination_id {
            debug!(origin_id, "Transfer rejected: self transfer");
            return Err(TransferError::SelfTransfer);
        }
        let amount = money::validate_amount(amount)?;

        let max_attempts = self.config.max_attempts.max(1);
        for attempt in 1..=max_attempts {
            match self.attempt(origin_id, destination_id, amount).await? {
                Attempt::Done(transfer) => {
                    info!(
                        transfer_id = transfer.id,
                        origin_id,
                        destination_id,
                        amount = %transfer.amount,
                        attempt,
                        "Transfer committed"
                    );
                    return Ok(transfer);
                }
                Attempt::Conflict(account_id) => {
                    warn!(
                        origin_id,
                        destination_id,
                        account_id,
                        attempt,
                        max_attempts,
                        "Transfer commit conflict"
                    );
                    if attempt < max_attempts {
                        tokio::time::sleep(self.backoff(attempt)).await;
                    }
                }
            }
        }

        error!(
            origin_id,
            destination_id,
            max_attempts,
            "Transfer aborted: retry budget exhausted"
        );
        Err(TransferError::PersistenceFailure(format!(
            "commit conflict persisted after {} attempts",
            max_attempts
        )))
    }

    async fn attempt(
        &self,
        origin_id: i64,
        destination_id: i64,
        amount: Decimal,
    ) -> Result<Attempt, TransferError> {
        let origin = self
            .load(origin_id)
            .await?
            .ok_or(TransferError::OriginNotFound)?;
        let destination = self
            .load(destination_id)
            .await?
            .ok_or(TransferError::DestinationNotFound)?;

        if amount > origin.balance {
            debug!(
                origin_id,
                balance = %origin.balance,
                amount = %amount,
                "Transfer rejected: insufficient funds"
            );
            return Err(TransferError::InsufficientFunds);
        }

        let origin_new = money::subtract(origin.balance, amount);
        let destination_new = money::add(destination.balance, amount);
        let pending = PendingTransfer {
            origin,
            destination,
            amount,
        };

        match self
            .ledger
            .commit(&pending, origin_new, destination_new)
            .await
        {
            Ok(transfer) => Ok(Attempt::Done(transfer)),
            Err(CommitError::Conflict(account_id)) => Ok(Attempt::Conflict(account_id)),
            Err(CommitError::AccountMissing(id)) if id == origin_id => {
                Err(TransferError::OriginNotFound)
            }
            Err(CommitError::AccountMissing(_)) => Err(TransferError::DestinationNotFound),
            Err(e) => Err(persistence("commit transfer", e)),
        }
    }

    async fn load(&self, account_id: i64) -> Result<Option<Account>, TransferError> {
        self.ledger
            .load_account(account_id)
            .await
            .map_err(|e| persistence("load account", e))
    }

    /// Full-jitter exponential backoff: uniform in `[0, min(base * 2^(n-1), max)]`
    fn backoff(&self, attempt: u32) -> Duration {
        Duration::from_millis(rand::thread_rng().gen_range(0..=self.backoff_ceiling_ms(attempt)))
    }

    fn backoff_ceiling_ms(&self, attempt: u32) -> u64 {
        let doubling = 1u64 << attempt.saturating_sub(1).min(20);
        self.config
            .retry_backoff_ms
            .saturating_mul(doubling)
            .min(self.config.max_backoff_ms)
    }
}

fn persistence(op: &str, e: impl std::fmt::Display) -> TransferError {
    error!(op, error = %e, "Ledger store failure");
    TransferError::PersistenceFailure(format!("{}: {}", op, e))
}
