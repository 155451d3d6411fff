//! Account management module
//!
//! Accounts, their validated inputs, the `AccountStore` abstraction and the
//! account use cases (list, balance, create, login).

pub mod models;
pub mod repository;
pub mod secret;
pub mod service;
pub mod validation;

// Re-export commonly used types
pub use models::{Account, AccountLookup, INITIAL_BALANCE, NewAccount};
pub use repository::{AccountStore, PgAccountStore, StoreError};
pub use service::{AccountError, AccountService};
pub use validation::{TaxId, ValidationError};

// Re-export Database from top-level db module
pub use crate::db::Database;
