use serde::{Deserialize, Serialize};
use std::fs;

/// Environment variables that override file values (deploy-time secrets)
pub const ENV_POSTGRES_URL: &str = "LEDGER_POSTGRES_URL";
pub const ENV_POSTGRES_READ_URL: &str = "LEDGER_POSTGRES_READ_URL";
pub const ENV_JWT_SECRET: &str = "LEDGER_JWT_SECRET";

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AppConfig {
    pub log_level: String,
    pub log_dir: String,
    pub log_file: String,
    pub use_json: bool,
    pub rotation: String,
    pub gateway: GatewayConfig,
    /// PostgreSQL connection URL used for writes (and reads when no replica is set)
    #[serde(default)]
    pub postgres_url: Option<String>,
    /// Optional read-only connection URL for list/lookup queries
    #[serde(default)]
    pub postgres_read_url: Option<String>,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub transfer: TransferConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct GatewayConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub token_ttl_hours: i64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "change-me".to_string(),
            token_ttl_hours: 24,
        }
    }
}

/// Optimistic-commit retry policy for the transfer engine
///
/// A transfer racing N others on the same account needs at most N attempts,
/// so `max_attempts` is the number of concurrent transfers per account that
/// are guaranteed to go through.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct TransferConfig {
    /// Total commit attempts per transfer (first try included)
    pub max_attempts: u32,
    /// Base of the jittered exponential backoff between attempts
    pub retry_backoff_ms: u64,
    /// Cap on a single backoff
    pub max_backoff_ms: u64,
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            max_attempts: 64,
            retry_backoff_ms: 2,
            max_backoff_ms: 50,
        }
    }
}

impl AppConfig {
    pub fn load(env: &str) -> Self {
        let config_path = format!("config/{}.yaml", env);
        let content = fs::read_to_string(&config_path)
            .unwrap_or_else(|_| panic!("Failed to read config file: {}", config_path));
        let mut config: AppConfig =
            serde_yaml::from_str(&content).expect("Failed to parse config yaml");
        config.apply_env_overrides(|key| std::env::var(key).ok());
        config
    }

    /// Apply environment overrides through a lookup function
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_POSTGRES_URL) {
            self.postgres_url = Some(url);
        }
        if let Some(url) = lookup(ENV_POSTGRES_READ_URL) {
            self.postgres_read_url = Some(url);
        }
        if let Some(secret) = lookup(ENV_JWT_SECRET) {
            self.auth.jwt_secret = secret;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL_YAML: &str = r#"
log_level: info
log_dir: ./logs
log_file: ledger.log
use_json: false
rotation: daily
gateway:
  host: 0.0.0.0
  port: 8080
"#;

    #[test]
    fn test_defaults_applied_for_optional_sections() {
        let config: AppConfig = serde_yaml::from_str(MINIMAL_YAML).unwrap();
        assert_eq!(config.gateway.port, 8080);
        assert!(config.postgres_url.is_none());
        assert_eq!(config.auth.token_ttl_hours, 24);
        assert_eq!(config.transfer.max_attempts, 64);
        assert_eq!(config.transfer.max_backoff_ms, 50);
    }

    #[test]
    fn test_partial_transfer_section_keeps_defaults() {
        let yaml = format!("{}transfer:\n  max_attempts: 10\n", MINIMAL_YAML);
        let config: AppConfig = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(config.transfer.max_attempts, 10);
        assert_eq!(config.transfer.retry_backoff_ms, 2);
        assert_eq!(config.transfer.max_backoff_ms, 50);
    }

    #[test]
    fn test_env_overrides() {
        let mut config: AppConfig = serde_yaml::from_str(MINIMAL_YAML).unwrap();
        config.apply_env_overrides(|key| match key {
            ENV_POSTGRES_URL => Some("postgres://w".to_string()),
            ENV_JWT_SECRET => Some("s3cret".to_string()),
            _ => None,
        });
        assert_eq!(config.postgres_url.as_deref(), Some("postgres://w"));
        assert!(config.postgres_read_url.is_none());
        assert_eq!(config.auth.jwt_secret, "s3cret");
    }
}
