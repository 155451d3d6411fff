//! Transfers between accounts
//!
//! # Architecture
//!
//! ```text
//! create_transfer ─► validate ─► load origin/destination ─► compute balances
//!                                       ▲                         │
//!                                       └──── Conflict (retry) ◄── commit
//! ```
//!
//! # Safety Invariants
//!
//! 1. **Conservation**: a committed transfer moves exactly `amount`; the sum of
//!    all balances never changes
//! 2. **Non-negativity**: a commit is built only from a read where
//!    `amount <= origin.balance`
//! 3. **Atomicity**: the ledger row and both balance writes land together or
//!    not at all
//! 4. **No lost updates**: every balance write is conditioned on the balance it
//!    was computed from

pub mod engine;
pub mod error;
pub mod models;
pub mod store;

// Re-exports for convenience
pub use engine::TransferEngine;
pub use error::TransferError;
pub use models::{PendingTransfer, Transfer, TransferFilter};
pub use store::{CommitError, LedgerStore, PgLedgerStore};
