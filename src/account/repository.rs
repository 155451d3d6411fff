//! Account store: trait plus PostgreSQL implementation

use async_trait::async_trait;
use sqlx::Row;
use sqlx::postgres::PgRow;

use super::models::{Account, AccountLookup, NewAccount};
use super::secret::verify_secret;
use super::validation::TaxId;
use crate::db::{Database, error_code, sqlstate};

/// Store-level outcomes shared by the account and ledger stores
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,

    #[error("record already exists")]
    AlreadyExists,

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Durable record of accounts
///
/// "No match" is `StoreError::NotFound`, never a driver fault.
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Every account, ordered by id
    async fn list_all(&self) -> Result<Vec<Account>, StoreError>;

    /// Exactly one account for the given query
    async fn find_by(&self, lookup: &AccountLookup) -> Result<Account, StoreError>;

    /// Insert; `AlreadyExists` when the tax id is taken
    async fn create(&self, account: NewAccount) -> Result<Account, StoreError>;
}

pub(crate) const ACCOUNT_COLUMNS: &str = "id, name, cpf, secret_hash, balance, created_at";

/// PostgreSQL-backed account store
pub struct PgAccountStore {
    db: Database,
}

impl PgAccountStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    async fn fetch_by_tax_id(&self, tax_id: &TaxId) -> Result<Option<Account>, StoreError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM accounts WHERE cpf = $1",
            ACCOUNT_COLUMNS
        ))
        .bind(tax_id.as_str())
        .fetch_optional(self.db.read_pool())
        .await?;

        row.as_ref().map(row_to_account).transpose()
    }
}

#[async_trait]
impl AccountStore for PgAccountStore {
    async fn list_all(&self) -> Result<Vec<Account>, StoreError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM accounts ORDER BY id",
            ACCOUNT_COLUMNS
        ))
        .fetch_all(self.db.read_pool())
        .await?;

        rows.iter().map(row_to_account).collect()
    }

    async fn find_by(&self, lookup: &AccountLookup) -> Result<Account, StoreError> {
        let found = match lookup {
            AccountLookup::Id(id) => {
                let row = sqlx::query(&format!(
                    "SELECT {} FROM accounts WHERE id = $1",
                    ACCOUNT_COLUMNS
                ))
                .bind(id)
                .fetch_optional(self.db.read_pool())
                .await?;
                row.as_ref().map(row_to_account).transpose()?
            }
            AccountLookup::TaxId(tax_id) => self.fetch_by_tax_id(tax_id).await?,
            AccountLookup::Credentials { tax_id, secret } => self
                .fetch_by_tax_id(tax_id)
                .await?
                .filter(|account| verify_secret(secret, &account.secret_hash)),
        };

        found.ok_or(StoreError::NotFound)
    }

    async fn create(&self, account: NewAccount) -> Result<Account, StoreError> {
        // The UNIQUE(cpf) constraint is the arbiter; no check-then-insert
        let result = sqlx::query(&format!(
            r#"INSERT INTO accounts (name, cpf, secret_hash, balance)
               VALUES ($1, $2, $3, $4)
               RETURNING {}"#,
            ACCOUNT_COLUMNS
        ))
        .bind(&account.name)
        .bind(account.tax_id.as_str())
        .bind(&account.secret_hash)
        .bind(account.balance)
        .fetch_one(self.db.pool())
        .await;

        match result {
            Ok(row) => row_to_account(&row),
            Err(e) if error_code(&e).as_deref() == Some(sqlstate::UNIQUE_VIOLATION) => {
                Err(StoreError::AlreadyExists)
            }
            Err(e) => Err(e.into()),
        }
    }
}

pub(crate) fn row_to_account(row: &PgRow) -> Result<Account, StoreError> {
    Ok(Account {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        tax_id: TaxId::from_trusted(row.try_get("cpf")?),
        secret_hash: row.try_get("secret_hash")?,
        balance: row.try_get("balance")?,
        created_at: row.try_get("created_at")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::models::INITIAL_BALANCE;
    use crate::account::secret::hash_secret;
    use crate::db::test_support::connect_clean;

    fn new_account(cpf: &str, secret: &str) -> NewAccount {
        NewAccount {
            name: "Test".to_string(),
            tax_id: TaxId::parse(cpf).unwrap(),
            secret_hash: hash_secret(secret).unwrap(),
            balance: INITIAL_BALANCE,
        }
    }

    #[tokio::test]
    #[ignore = "requires PostgreSQL database"]
    async fn test_create_and_find() {
        let (_guard, db) = connect_clean().await;
        let store = PgAccountStore::new(db);

        let created = store
            .create(new_account("52998224725", "abc123"))
            .await
            .expect("Should create account");
        assert!(created.id > 0);
        assert_eq!(created.balance, INITIAL_BALANCE);

        let by_id = store.find_by(&AccountLookup::Id(created.id)).await.unwrap();
        assert_eq!(by_id.tax_id, created.tax_id);

        let by_tax_id = store
            .find_by(&AccountLookup::TaxId(created.tax_id.clone()))
            .await
            .unwrap();
        assert_eq!(by_tax_id.id, created.id);

        let all = store.list_all().await.unwrap();
        assert_eq!(all.len(), 1);
    }

    #[tokio::test]
    #[ignore = "requires PostgreSQL database"]
    async fn test_duplicate_tax_id_rejected() {
        let (_guard, db) = connect_clean().await;
        let store = PgAccountStore::new(db);
        store.create(new_account("11144477735", "abc123")).await.unwrap();

        let dup = store.create(new_account("11144477735", "zzz999")).await;
        assert!(matches!(dup, Err(StoreError::AlreadyExists)));
    }

    #[tokio::test]
    #[ignore = "requires PostgreSQL database"]
    async fn test_credentials_lookup() {
        let (_guard, db) = connect_clean().await;
        let store = PgAccountStore::new(db);
        let created = store.create(new_account("39053344705", "abc123")).await.unwrap();
        let tax_id = created.tax_id.clone();

        let ok = store
            .find_by(&AccountLookup::Credentials {
                tax_id: tax_id.clone(),
                secret: "abc123".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(ok.id, created.id);

        let wrong = store
            .find_by(&AccountLookup::Credentials {
                tax_id,
                secret: "wrong1".to_string(),
            })
            .await;
        assert!(matches!(wrong, Err(StoreError::NotFound)));
    }

    #[tokio::test]
    #[ignore = "requires PostgreSQL database"]
    async fn test_find_missing_is_not_found() {
        let (_guard, db) = connect_clean().await;
        let store = PgAccountStore::new(db);
        let result = store.find_by(&AccountLookup::Id(99999)).await;
        assert!(matches!(result, Err(StoreError::NotFound)));
    }
}
