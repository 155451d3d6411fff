//! Ledger store: atomic transfer commit
//!
//! `commit` is the only path that mutates balances. It uses optimistic
//! concurrency: each balance write is conditioned on the balance the engine
//! read, so a concurrent writer makes the whole unit fail with
//! [`CommitError::Conflict`] instead of being overwritten.
//!
//! The balances a commit is conditioned on come from `load_account`, which
//! reads the primary. A lagging replica would fail every retry the same way.

use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::Row;
use sqlx::postgres::PgRow;
use tracing::debug;

use super::models::{PendingTransfer, Transfer, TransferFilter};
use crate::account::repository::{ACCOUNT_COLUMNS, row_to_account};
use crate::account::{Account, StoreError};
use crate::db::{Database, is_concurrency_failure};

#[derive(Debug, thiserror::Error)]
pub enum CommitError {
    /// Stored balance no longer equals the value the engine read
    #[error("balance of account {0} changed since it was read")]
    Conflict(i64),

    #[error("account {0} no longer exists")]
    AccountMissing(i64),

    #[error("commit aborted: {0}")]
    Aborted(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Durable append-only record of transfers plus the balance writes they imply
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Current state of one account, read from the primary for a commit
    async fn load_account(&self, account_id: i64) -> Result<Option<Account>, StoreError>;

    async fn list_transfers(&self, filter: &TransferFilter) -> Result<Vec<Transfer>, StoreError>;

    /// Insert the transfer and set both balances as one atomic unit
    ///
    /// Succeeds only if both accounts still hold the balances captured in
    /// `pending`; on any error nothing is visible to other readers.
    async fn commit(
        &self,
        pending: &PendingTransfer,
        origin_new_balance: Decimal,
        destination_new_balance: Decimal,
    ) -> Result<Transfer, CommitError>;
}

/// One conditional balance write inside a commit
#[derive(Debug, Clone, Copy)]
pub(crate) struct BalanceWrite {
    pub account_id: i64,
    pub expected: Decimal,
    pub new_balance: Decimal,
}

/// Both writes in ascending account id order, so concurrent commits on the
/// same pair of accounts always lock rows in the same order.
pub(crate) fn ordered_writes(
    pending: &PendingTransfer,
    origin_new_balance: Decimal,
    destination_new_balance: Decimal,
) -> [BalanceWrite; 2] {
    let origin = BalanceWrite {
        account_id: pending.origin.id,
        expected: pending.origin.balance,
        new_balance: origin_new_balance,
    };
    let destination = BalanceWrite {
        account_id: pending.destination.id,
        expected: pending.destination.balance,
        new_balance: destination_new_balance,
    };
    if origin.account_id <= destination.account_id {
        [origin, destination]
    } else {
        [destination, origin]
    }
}

const TRANSFER_COLUMNS: &str =
    "id, account_origin_id, account_destination_id, amount, created_at";

/// PostgreSQL-backed ledger store
pub struct PgLedgerStore {
    db: Database,
}

impl PgLedgerStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl LedgerStore for PgLedgerStore {
    async fn load_account(&self, account_id: i64) -> Result<Option<Account>, StoreError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM accounts WHERE id = $1",
            ACCOUNT_COLUMNS
        ))
        .bind(account_id)
        .fetch_optional(self.db.pool())
        .await?;

        row.as_ref().map(row_to_account).transpose()
    }

    async fn list_transfers(&self, filter: &TransferFilter) -> Result<Vec<Transfer>, StoreError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM transfers WHERE account_origin_id = $1 ORDER BY id",
            TRANSFER_COLUMNS
        ))
        .bind(filter.origin_account_id)
        .fetch_all(self.db.read_pool())
        .await?;

        rows.iter()
            .map(|row| row_to_transfer(row).map_err(StoreError::from))
            .collect()
    }

    async fn commit(
        &self,
        pending: &PendingTransfer,
        origin_new_balance: Decimal,
        destination_new_balance: Decimal,
    ) -> Result<Transfer, CommitError> {
        // Dropping `tx` on any early return rolls the whole unit back
        let mut tx = self.db.pool().begin().await?;

        for write in ordered_writes(pending, origin_new_balance, destination_new_balance) {
            let updated = sqlx::query(
                r#"
                UPDATE accounts
                SET balance = $1
                WHERE id = $2 AND balance = $3
                "#,
            )
            .bind(write.new_balance)
            .bind(write.account_id)
            .bind(write.expected)
            .execute(&mut *tx)
            .await
            .map_err(|e| concurrency_or_db(e, write.account_id))?;

            if updated.rows_affected() == 0 {
                let exists = sqlx::query_scalar::<_, i64>("SELECT id FROM accounts WHERE id = $1")
                    .bind(write.account_id)
                    .fetch_optional(&mut *tx)
                    .await?;
                tx.rollback().await?;

                debug!(
                    account_id = write.account_id,
                    expected = %write.expected,
                    "Conditional balance update matched no row"
                );
                return Err(match exists {
                    Some(_) => CommitError::Conflict(write.account_id),
                    None => CommitError::AccountMissing(write.account_id),
                });
            }
        }

        let row = sqlx::query(&format!(
            r#"INSERT INTO transfers (account_origin_id, account_destination_id, amount)
               VALUES ($1, $2, $3)
               RETURNING {}"#,
            TRANSFER_COLUMNS
        ))
        .bind(pending.origin_id())
        .bind(pending.destination_id())
        .bind(pending.amount)
        .fetch_one(&mut *tx)
        .await?;
        let transfer = row_to_transfer(&row)?;

        tx.commit()
            .await
            .map_err(|e| concurrency_or_db(e, pending.origin_id()))?;

        Ok(transfer)
    }
}

/// Serialization failures and deadlocks are conflicts; the engine retries them
fn concurrency_or_db(e: sqlx::Error, account_id: i64) -> CommitError {
    if is_concurrency_failure(&e) {
        CommitError::Conflict(account_id)
    } else {
        CommitError::Database(e)
    }
}

fn row_to_transfer(row: &PgRow) -> Result<Transfer, sqlx::Error> {
    Ok(Transfer {
        id: row.try_get("id")?,
        origin_account_id: row.try_get("account_origin_id")?,
        destination_account_id: row.try_get("account_destination_id")?,
        amount: row.try_get("amount")?,
        created_at: row.try_get("created_at")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::TaxId;
    use chrono::Utc;
    use std::str::FromStr;

    fn account(id: i64, balance: &str) -> Account {
        Account {
            id,
            name: format!("acc{}", id),
            tax_id: TaxId::parse("52998224725").unwrap(),
            secret_hash: String::new(),
            balance: Decimal::from_str(balance).unwrap(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_ordered_writes_ascending_by_id() {
        let pending = PendingTransfer {
            origin: account(9, "50.00"),
            destination: account(3, "10.00"),
            amount: Decimal::from_str("5.00").unwrap(),
        };
        let writes = ordered_writes(
            &pending,
            Decimal::from_str("45.00").unwrap(),
            Decimal::from_str("15.00").unwrap(),
        );
        assert_eq!(writes[0].account_id, 3);
        assert_eq!(writes[0].expected, Decimal::from_str("10.00").unwrap());
        assert_eq!(writes[0].new_balance, Decimal::from_str("15.00").unwrap());
        assert_eq!(writes[1].account_id, 9);
        assert_eq!(writes[1].new_balance, Decimal::from_str("45.00").unwrap());
    }

    #[test]
    fn test_plain_db_error_is_not_conflict() {
        let err = concurrency_or_db(sqlx::Error::PoolTimedOut, 1);
        assert!(matches!(err, CommitError::Database(_)));
    }

    mod postgres {
        use super::*;
        use crate::account::{AccountLookup, AccountStore, NewAccount, PgAccountStore};
        use crate::config::TransferConfig;
        use crate::db::test_support::connect_clean;
        use crate::transfer::TransferEngine;
        use std::sync::Arc;

        async fn seed(db: &Database, cpf: &str, balance: &str) -> Account {
            PgAccountStore::new(db.clone())
                .create(NewAccount {
                    name: "holder".to_string(),
                    tax_id: TaxId::parse(cpf).unwrap(),
                    secret_hash: String::new(),
                    balance: Decimal::from_str(balance).unwrap(),
                })
                .await
                .unwrap()
        }

        async fn reload(db: &Database, id: i64) -> Account {
            PgAccountStore::new(db.clone())
                .find_by(&AccountLookup::Id(id))
                .await
                .unwrap()
        }

        #[tokio::test]
        #[ignore = "requires PostgreSQL database"]
        async fn test_commit_applies_all_three_writes() {
            let (_guard, db) = connect_clean().await;
            let a = seed(&db, "52998224725", "100.00").await;
            let b = seed(&db, "11144477735", "0.00").await;
            let store = PgLedgerStore::new(db.clone());

            let pending = PendingTransfer {
                origin: a.clone(),
                destination: b.clone(),
                amount: Decimal::from_str("40.00").unwrap(),
            };
            let transfer = store
                .commit(
                    &pending,
                    Decimal::from_str("60.00").unwrap(),
                    Decimal::from_str("40.00").unwrap(),
                )
                .await
                .unwrap();

            assert_eq!(transfer.origin_account_id, a.id);
            assert_eq!(reload(&db, a.id).await.balance, Decimal::from_str("60.00").unwrap());
            assert_eq!(reload(&db, b.id).await.balance, Decimal::from_str("40.00").unwrap());
            let listed = store
                .list_transfers(&TransferFilter::by_origin(a.id))
                .await
                .unwrap();
            assert_eq!(listed, vec![transfer]);
        }

        #[tokio::test]
        #[ignore = "requires PostgreSQL database"]
        async fn test_stale_snapshot_is_conflict_and_rolls_back() {
            let (_guard, db) = connect_clean().await;
            let a = seed(&db, "52998224725", "100.00").await;
            let b = seed(&db, "11144477735", "0.00").await;
            let store = PgLedgerStore::new(db.clone());

            // Destination balance changed after the snapshot was taken
            let mut stale_b = b.clone();
            stale_b.balance = Decimal::from_str("5.00").unwrap();
            let pending = PendingTransfer {
                origin: a.clone(),
                destination: stale_b,
                amount: Decimal::from_str("10.00").unwrap(),
            };
            let result = store
                .commit(
                    &pending,
                    Decimal::from_str("90.00").unwrap(),
                    Decimal::from_str("15.00").unwrap(),
                )
                .await;

            assert!(matches!(result, Err(CommitError::Conflict(id)) if id == b.id));
            // Origin was written first (lower id) and must be rolled back
            assert_eq!(reload(&db, a.id).await.balance, Decimal::from_str("100.00").unwrap());
            assert!(
                store
                    .list_transfers(&TransferFilter::by_origin(a.id))
                    .await
                    .unwrap()
                    .is_empty()
            );
        }

        #[tokio::test]
        #[ignore = "requires PostgreSQL database"]
        async fn test_missing_account_reported() {
            let (_guard, db) = connect_clean().await;
            let a = seed(&db, "52998224725", "100.00").await;
            let mut ghost = a.clone();
            ghost.id = a.id + 1000;
            let store = PgLedgerStore::new(db.clone());

            let pending = PendingTransfer {
                origin: a,
                destination: ghost.clone(),
                amount: Decimal::from_str("1.00").unwrap(),
            };
            let result = store
                .commit(
                    &pending,
                    Decimal::from_str("99.00").unwrap(),
                    Decimal::from_str("101.00").unwrap(),
                )
                .await;
            assert!(matches!(result, Err(CommitError::AccountMissing(id)) if id == ghost.id));
        }

        #[tokio::test]
        #[ignore = "requires PostgreSQL database"]
        async fn test_load_account_reads_primary() {
            let (_guard, db) = connect_clean().await;
            let a = seed(&db, "52998224725", "12.34").await;
            let store = PgLedgerStore::new(db.clone());

            let loaded = store.load_account(a.id).await.unwrap().unwrap();
            assert_eq!(loaded.balance, Decimal::from_str("12.34").unwrap());
            assert_eq!(loaded.tax_id, a.tax_id);
            assert!(store.load_account(a.id + 1000).await.unwrap().is_none());
        }

        #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
        #[ignore = "requires PostgreSQL database"]
        async fn test_concurrent_funded_transfers_all_commit() {
            const N: usize = 40;
            let (_guard, db) = connect_clean().await;
            let a = seed(&db, "52998224725", "100.00").await;
            let b = seed(&db, "11144477735", "0.00").await;
            let engine = Arc::new(TransferEngine::new(
                Arc::new(PgLedgerStore::new(db.clone())),
                TransferConfig::default(),
            ));

            let mut handles = Vec::new();
            for _ in 0..N {
                let engine = engine.clone();
                let (origin, destination) = (a.id, b.id);
                handles.push(tokio::spawn(async move {
                    engine
                        .create_transfer(origin, destination, Decimal::from_str("1.25").unwrap())
                        .await
                }));
            }
            for handle in handles {
                handle.await.unwrap().unwrap();
            }

            // 100.00 - 40 * 1.25
            assert_eq!(reload(&db, a.id).await.balance, Decimal::from_str("50.00").unwrap());
            assert_eq!(reload(&db, b.id).await.balance, Decimal::from_str("50.00").unwrap());
            let recorded = PgLedgerStore::new(db.clone())
                .list_transfers(&TransferFilter::by_origin(a.id))
                .await
                .unwrap();
            assert_eq!(recorded.len(), N);
        }
    }
}
