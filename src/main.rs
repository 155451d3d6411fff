//! Bank Ledger - HTTP server entry point
//!
//! ```text
//! ┌──────────┐    ┌──────────┐    ┌──────────────┐    ┌──────────┐
//! │  Config  │───▶│  Stores  │───▶│   Services   │───▶│ Gateway  │
//! │  (YAML)  │    │(PG / mem)│    │(acct, xfer)  │    │  (axum)  │
//! └──────────┘    └──────────┘    └──────────────┘    └──────────┘
//! ```

use std::sync::Arc;

use anyhow::{Context, Result};

use bank_ledger::account::{AccountService, AccountStore, PgAccountStore};
use bank_ledger::config::AppConfig;
use bank_ledger::db::{Database, schema};
use bank_ledger::gateway::{self, state::AppState};
use bank_ledger::memory::MemoryStore;
use bank_ledger::transfer::{LedgerStore, PgLedgerStore, TransferEngine};
use bank_ledger::user_auth::{IdentityGate, JwtGate};

fn get_env() -> String {
    let args: Vec<String> = std::env::args().collect();
    for i in 0..args.len() {
        if (args[i] == "--env" || args[i] == "-e") && i + 1 < args.len() {
            return args[i + 1].clone();
        }
    }
    "dev".to_string()
}

/// Get port override from command line (--port argument)
fn get_port_override() -> Option<u16> {
    let args: Vec<String> = std::env::args().collect();
    for i in 0..args.len() {
        if args[i] == "--port" && i + 1 < args.len() {
            return args[i + 1].parse().ok();
        }
    }
    None
}

fn use_memory_mode() -> bool {
    std::env::args().any(|a| a == "--memory")
}

#[tokio::main]
async fn main() -> Result<()> {
    let env = get_env();
    let app_config = AppConfig::load(&env);
    let _log_guard = bank_ledger::logging::init_logging(&app_config);

    tracing::info!(
        "Starting Bank Ledger in {} mode (build {})",
        env,
        env!("GIT_HASH")
    );

    let (accounts, ledger, pg_db): (Arc<dyn AccountStore>, Arc<dyn LedgerStore>, _) =
        if use_memory_mode() {
            tracing::warn!("Running with in-memory store; data is lost on exit");
            let store = Arc::new(MemoryStore::new());
            (store.clone(), store, None)
        } else {
            let url = app_config
                .postgres_url
                .as_deref()
                .context("postgres_url is not configured (set it or pass --memory)")?;
            let db = Database::connect(url, app_config.postgres_read_url.as_deref())
                .await
                .context("Failed to connect to PostgreSQL")?;
            schema::ensure_schema(db.pool())
                .await
                .context("Failed to create schema")?;
            (
                Arc::new(PgAccountStore::new(db.clone())),
                Arc::new(PgLedgerStore::new(db.clone())),
                Some(db),
            )
        };

    if app_config.auth.jwt_secret.is_empty() {
        anyhow::bail!("jwt_secret is empty; set LEDGER_JWT_SECRET");
    }
    if app_config.auth.jwt_secret == "change-me" {
        tracing::warn!("Using the default JWT secret; set LEDGER_JWT_SECRET");
    }
    let gate: Arc<dyn IdentityGate> = Arc::new(JwtGate::new(
        &app_config.auth.jwt_secret,
        app_config.auth.token_ttl_hours,
    ));

    let account_service = Arc::new(AccountService::new(accounts, gate.clone()));
    let transfer_engine = Arc::new(TransferEngine::new(ledger, app_config.transfer.clone()));
    let state = Arc::new(AppState::new(account_service, transfer_engine, gate, pg_db));

    let port = get_port_override().unwrap_or(app_config.gateway.port);
    gateway::run_server(&app_config.gateway.host, port, state)
        .await
        .with_context(|| format!("Gateway failed on port {}", port))
}
