//! In-memory account and ledger store
//!
//! Implements [`AccountStore`] and [`LedgerStore`] over a single mutex, so a
//! commit is one critical section. Used by `--memory` mode and by tests,
//! which can also inject commit conflicts and failures.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;

use crate::account::secret::verify_secret;
use crate::account::{Account, AccountLookup, AccountStore, NewAccount, StoreError};
use crate::transfer::store::ordered_writes;
use crate::transfer::{CommitError, LedgerStore, PendingTransfer, Transfer, TransferFilter};

#[derive(Default)]
struct Inner {
    accounts: BTreeMap<i64, Account>,
    transfers: Vec<Transfer>,
    next_account_id: i64,
    next_transfer_id: i64,
    injected_conflicts: u32,
    fail_next_commit: bool,
}

#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Make the next `n` commits report a conflict
    pub fn inject_conflicts(&self, n: u32) {
        self.lock().injected_conflicts = n;
    }

    /// Abort the next commit after its balance writes are staged
    pub fn fail_next_commit(&self) {
        self.lock().fail_next_commit = true;
    }

    /// Sum of all balances
    pub fn total_balance(&self) -> Decimal {
        self.lock().accounts.values().map(|a| a.balance).sum()
    }

    pub fn transfer_count(&self) -> usize {
        self.lock().transfers.len()
    }
}

#[async_trait]
impl AccountStore for MemoryStore {
    async fn list_all(&self) -> Result<Vec<Account>, StoreError> {
        Ok(self.lock().accounts.values().cloned().collect())
    }

    async fn find_by(&self, lookup: &AccountLookup) -> Result<Account, StoreError> {
        let inner = self.lock();
        let found = match lookup {
            AccountLookup::Id(id) => inner.accounts.get(id),
            AccountLookup::TaxId(tax_id) => {
                inner.accounts.values().find(|a| &a.tax_id == tax_id)
            }
            AccountLookup::Credentials { tax_id, secret } => inner
                .accounts
                .values()
                .find(|a| &a.tax_id == tax_id)
                .filter(|a| verify_secret(secret, &a.secret_hash)),
        };
        found.cloned().ok_or(StoreError::NotFound)
    }

    async fn create(&self, account: NewAccount) -> Result<Account, StoreError> {
        let mut inner = self.lock();
        if inner.accounts.values().any(|a| a.tax_id == account.tax_id) {
            return Err(StoreError::AlreadyExists);
        }

        inner.next_account_id += 1;
        let created = Account {
            id: inner.next_account_id,
            name: account.name,
            tax_id: account.tax_id,
            secret_hash: account.secret_hash,
            balance: account.balance,
            created_at: Utc::now(),
        };
        inner.accounts.insert(created.id, created.clone());
        Ok(created)
    }
}

#[async_trait]
impl LedgerStore for MemoryStore {
    async fn load_account(&self, account_id: i64) -> Result<Option<Account>, StoreError> {
        Ok(self.lock().accounts.get(&account_id).cloned())
    }

    async fn list_transfers(&self, filter: &TransferFilter) -> Result<Vec<Transfer>, StoreError> {
        Ok(self
            .lock()
            .transfers
            .iter()
            .filter(|t| t.origin_account_id == filter.origin_account_id)
            .cloned()
            .collect())
    }

    async fn commit(
        &self,
        pending: &PendingTransfer,
        origin_new_balance: Decimal,
        destination_new_balance: Decimal,
    ) -> Result<Transfer, CommitError> {
        let mut inner = self.lock();

        if inner.injected_conflicts > 0 {
            inner.injected_conflicts -= 1;
            return Err(CommitError::Conflict(pending.origin_id()));
        }

        // Stage on copies; nothing is published until every write succeeds
        let mut staged = Vec::with_capacity(2);
        for write in ordered_writes(pending, origin_new_balance, destination_new_balance) {
            let current = inner
                .accounts
                .get(&write.account_id)
                .ok_or(CommitError::AccountMissing(write.account_id))?;
            if current.balance != write.expected {
                return Err(CommitError::Conflict(write.account_id));
            }
            let mut updated = current.clone();
            updated.balance = write.new_balance;
            staged.push(updated);
        }

        if inner.fail_next_commit {
            inner.fail_next_commit = false;
            return Err(CommitError::Aborted("injected commit failure".to_string()));
        }

        inner.next_transfer_id += 1;
        let transfer = Transfer {
            id: inner.next_transfer_id,
            origin_account_id: pending.origin_id(),
            destination_account_id: pending.destination_id(),
            amount: pending.amount,
            created_at: Utc::now(),
        };
        for account in staged {
            inner.accounts.insert(account.id, account);
        }
        inner.transfers.push(transfer.clone());
        Ok(transfer)
    }
}
