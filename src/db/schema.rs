//! Idempotent schema bootstrap for the accounts and transfers relations

use sqlx::PgPool;

const CREATE_ACCOUNTS: &str = r#"
CREATE TABLE IF NOT EXISTS accounts (
    id          BIGSERIAL PRIMARY KEY,
    name        TEXT NOT NULL,
    cpf         VARCHAR(11) NOT NULL UNIQUE,
    secret_hash TEXT NOT NULL,
    balance     NUMERIC(20, 2) NOT NULL CHECK (balance >= 0),
    created_at  TIMESTAMPTZ NOT NULL DEFAULT NOW()
)
"#;

const CREATE_TRANSFERS: &str = r#"
CREATE TABLE IF NOT EXISTS transfers (
    id                     BIGSERIAL PRIMARY KEY,
    account_origin_id      BIGINT NOT NULL REFERENCES accounts (id),
    account_destination_id BIGINT NOT NULL REFERENCES accounts (id),
    amount                 NUMERIC(20, 2) NOT NULL CHECK (amount > 0),
    created_at             TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    CHECK (account_origin_id <> account_destination_id)
)
"#;

const CREATE_TRANSFERS_ORIGIN_INDEX: &str = r#"
CREATE INDEX IF NOT EXISTS transfers_origin_idx ON transfers (account_origin_id)
"#;

/// Create tables and indexes if they do not exist yet
pub async fn ensure_schema(pool: &PgPool) -> Result<(), sqlx::Error> {
    let mut tx = pool.begin().await?;
    for statement in [CREATE_ACCOUNTS, CREATE_TRANSFERS, CREATE_TRANSFERS_ORIGIN_INDEX] {
        sqlx::query(statement).execute(&mut *tx).await?;
    }
    tx.commit().await?;

    tracing::info!("Database schema ready");
    Ok(())
}
