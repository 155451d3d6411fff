//! Bank Ledger - accounts, balances and atomic transfers
//!
//! # Modules
//!
//! - [`money`] - Two-decimal monetary arithmetic and amount parsing
//! - [`account`] - Accounts, validation, the `AccountStore` and account use cases
//! - [`transfer`] - Ledger store with atomic commit and the transfer engine
//! - [`memory`] - In-memory store implementing both store traits
//! - [`user_auth`] - Identity gate (JWT) and login
//! - [`gateway`] - HTTP API (axum) and OpenAPI docs
//! - [`db`] - PostgreSQL pools and schema
//! - [`config`] / [`logging`] - Startup configuration and tracing setup

pub mod config;
pub mod logging;

// Storage
pub mod db;
pub mod memory;

// Domain
pub mod account;
pub mod money;
pub mod transfer;

// Edges
pub mod gateway;
pub mod user_auth;

// Convenient re-exports at crate root
pub use account::{Account, AccountService, AccountStore, PgAccountStore, TaxId};
pub use config::AppConfig;
pub use db::Database;
pub use memory::MemoryStore;
pub use transfer::{LedgerStore, PgLedgerStore, Transfer, TransferEngine, TransferError};
pub use user_auth::{IdentityGate, JwtGate};
