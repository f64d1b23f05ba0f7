//! PostgreSQL pool for the registrant and content repositories.
//!
//! `DatabaseConfig` is deserialized straight from the `[database]` section
//! of the api config, so the pool settings live in one place.

use serde::Deserialize;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Required when `storage.backend = "postgres"`.
    #[serde(default)]
    pub url: String,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    #[serde(default = "default_min_connections")]
    pub min_connections: u32,

    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            max_connections: default_max_connections(),
            min_connections: default_min_connections(),
            connect_timeout_secs: default_connect_timeout(),
            idle_timeout_secs: default_idle_timeout(),
        }
    }
}

impl DatabaseConfig {
    /// Default pool sizing against the given URL.
    pub fn with_url(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }
}

fn default_max_connections() -> u32 {
    20
}
fn default_min_connections() -> u32 {
    2
}
fn default_connect_timeout() -> u64 {
    10
}
fn default_idle_timeout() -> u64 {
    600
}

/// Opens the pool. Fails if the first connection cannot be established
/// within `connect_timeout_secs`.
pub async fn create_pool(config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.connect_timeout_secs))
        .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
        .connect(&config.url)
        .await?;

    tracing::info!(
        max_connections = config.max_connections,
        min_connections = config.min_connections,
        "Database pool ready"
    );
    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_url_keeps_default_sizing() {
        let cfg = DatabaseConfig::with_url("postgres://localhost/events");
        assert_eq!(cfg.url, "postgres://localhost/events");
        assert_eq!(cfg.max_connections, 20);
        assert_eq!(cfg.min_connections, 2);
        assert_eq!(cfg.connect_timeout_secs, 10);
        assert_eq!(cfg.idle_timeout_secs, 600);
    }

    #[test]
    fn test_deserialize_partial_section() {
        let cfg: DatabaseConfig =
            serde_json::from_value(serde_json::json!({ "max_connections": 5 })).unwrap();
        assert!(cfg.url.is_empty());
        assert_eq!(cfg.max_connections, 5);
        assert_eq!(cfg.idle_timeout_secs, 600);
    }
}
