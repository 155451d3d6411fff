use std::sync::Arc;

use crate::account::{AccountService, Database};
use crate::transfer::TransferEngine;
use crate::user_auth::IdentityGate;

/// Gateway application state (shared)
#[derive(Clone)]
pub struct AppState {
    /// Account use cases (list, balance, create, login)
    pub account_service: Arc<AccountService>,
    /// Transfer engine
    pub transfer_engine: Arc<TransferEngine>,
    /// Bearer token issuer / verifier
    pub gate: Arc<dyn IdentityGate>,
    /// PostgreSQL (absent in memory mode)
    pub pg_db: Option<Database>,
}

impl AppState {
    pub fn new(
        account_service: Arc<AccountService>,
        transfer_engine: Arc<TransferEngine>,
        gate: Arc<dyn IdentityGate>,
        pg_db: Option<Database>,
    ) -> Self {
        Self {
            account_service,
            transfer_engine,
            gate,
            pg_db,
        }
    }
}
