//! Account use cases: listing, balance lookup, creation and login

use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::{info, warn};

use super::models::{Account, AccountLookup, INITIAL_BALANCE, NewAccount};
use super::repository::{AccountStore, StoreError};
use super::secret::hash_secret;
use super::validation::{TaxId, ValidationError, validate_name, validate_secret};
use crate::user_auth::{AuthError, IdentityGate};

#[derive(Debug, thiserror::Error)]
pub enum AccountError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("account not found")]
    NotFound,

    #[error("account already exists")]
    AlreadyExists,

    #[error("persistence failure: {0}")]
    Persistence(String),
}

impl AccountError {
    pub fn http_status(&self) -> u16 {
        match self {
            AccountError::Validation(_) => 400,
            AccountError::NotFound => 404,
            AccountError::AlreadyExists => 409,
            AccountError::Persistence(_) => 500,
        }
    }
}

impl From<StoreError> for AccountError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound => AccountError::NotFound,
            StoreError::AlreadyExists => AccountError::AlreadyExists,
            StoreError::Database(e) => AccountError::Persistence(e.to_string()),
        }
    }
}

impl From<AuthError> for AccountError {
    fn from(e: AuthError) -> Self {
        AccountError::Persistence(e.to_string())
    }
}

pub struct AccountService {
    store: Arc<dyn AccountStore>,
    gate: Arc<dyn IdentityGate>,
}

impl AccountService {
    pub fn new(store: Arc<dyn AccountStore>, gate: Arc<dyn IdentityGate>) -> Self {
        Self { store, gate }
    }

    pub async fn list_all(&self) -> Result<Vec<Account>, AccountError> {
        Ok(self.store.list_all().await?)
    }

    pub async fn get(&self, account_id: i64) -> Result<Account, AccountError> {
        Ok(self.store.find_by(&AccountLookup::Id(account_id)).await?)
    }

    pub async fn get_balance(&self, account_id: i64) -> Result<Decimal, AccountError> {
        Ok(self.get(account_id).await?.balance)
    }

    /// Create an account with the starting balance
    pub async fn create(
        &self,
        name: &str,
        tax_id: &str,
        secret: &str,
    ) -> Result<Account, AccountError> {
        validate_name(name)?;
        validate_secret(secret)?;
        let tax_id = TaxId::parse(tax_id)?;

        let secret_hash =
            hash_secret(secret).map_err(|e| AccountError::Persistence(e.to_string()))?;

        let account = self
            .store
            .create(NewAccount {
                name: name.trim().to_string(),
                tax_id,
                secret_hash,
                balance: INITIAL_BALANCE,
            })
            .await?;

        info!(account_id = account.id, "Account created");
        Ok(account)
    }

    /// Verify credentials and mint a bearer token for the account
    pub async fn authenticate(&self, tax_id: &str, secret: &str) -> Result<String, AccountError> {
        let tax_id = TaxId::parse(tax_id)?;
        let account = match self
            .store
            .find_by(&AccountLookup::Credentials {
                tax_id,
                secret: secret.to_string(),
            })
            .await
        {
            Ok(account) => account,
            Err(StoreError::NotFound) => {
                warn!("Login rejected: unknown cpf or wrong secret");
                return Err(AccountError::NotFound);
            }
            Err(e) => return Err(e.into()),
        };

        Ok(self.gate.issue(account.id)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;
    use crate::user_auth::JwtGate;

    fn service() -> (AccountService, Arc<JwtGate>) {
        let store = Arc::new(MemoryStore::new());
        let gate = Arc::new(JwtGate::new("test-secret", 1));
        (AccountService::new(store, gate.clone()), gate)
    }

    #[tokio::test]
    async fn test_create_sets_initial_balance() {
        let (svc, _) = service();
        let account = svc.create("Maria", "52998224725", "abc123").await.unwrap();
        assert_eq!(account.balance, INITIAL_BALANCE);
        assert_ne!(account.secret_hash, "abc123");
        assert_eq!(svc.get_balance(account.id).await.unwrap(), INITIAL_BALANCE);
    }

    #[tokio::test]
    async fn test_create_validates_input() {
        let (svc, _) = service();
        assert!(matches!(
            svc.create("", "52998224725", "abc123").await,
            Err(AccountError::Validation(_))
        ));
        assert!(matches!(
            svc.create("Maria", "52998224724", "abc123").await,
            Err(AccountError::Validation(_))
        ));
        assert!(matches!(
            svc.create("Maria", "52998224725", "abc").await,
            Err(AccountError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_duplicate_tax_id() {
        let (svc, _) = service();
        svc.create("Maria", "52998224725", "abc123").await.unwrap();
        let dup = svc.create("Joao", "52998224725", "xyz789").await;
        assert!(matches!(dup, Err(AccountError::AlreadyExists)));
    }

    #[tokio::test]
    async fn test_authenticate_issues_token_for_account() {
        let (svc, gate) = service();
        let account = svc.create("Maria", "52998224725", "abc123").await.unwrap();

        let token = svc.authenticate("52998224725", "abc123").await.unwrap();
        assert_eq!(gate.verify(&token).unwrap(), account.id);
    }

    #[tokio::test]
    async fn test_authenticate_wrong_secret_is_not_found() {
        let (svc, _) = service();
        svc.create("Maria", "52998224725", "abc123").await.unwrap();

        let result = svc.authenticate("52998224725", "abc999").await;
        assert!(matches!(result, Err(AccountError::NotFound)));
        let result = svc.authenticate("11144477735", "abc123").await;
        assert!(matches!(result, Err(AccountError::NotFound)));
    }

    #[tokio::test]
    async fn test_get_balance_missing_account() {
        let (svc, _) = service();
        assert!(matches!(
            svc.get_balance(42).await,
            Err(AccountError::NotFound)
        ));
    }
}
