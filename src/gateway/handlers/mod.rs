//! HTTP handlers
//!
//! - [`health`]: liveness / database ping
//! - [`account`]: account listing, balance and creation
//! - [`transfer`]: transfers of the authenticated caller

pub mod account;
pub mod health;
pub mod transfer;

pub use account::{create_account, get_account_balance, list_accounts};
pub use health::{HealthResponse, health_check};
pub use transfer::{create_transfer, list_transfers};
