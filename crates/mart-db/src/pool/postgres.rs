//! PostgreSQL connection pool and schema migrations

use std::path::{Path, PathBuf};
use std::time::Duration;

use mart_common::DatabaseConfig;
use sqlx::migrate::{MigrateError, Migrator};
use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::info;

/// Pool sizing and timeouts
#[derive(Debug, Clone)]
pub struct PoolConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    /// Maximum time to wait for a free connection
    pub acquire_timeout: Duration,
    pub idle_timeout: Duration,
    pub max_lifetime: Duration,
}

impl From<&DatabaseConfig> for PoolConfig {
    fn from(config: &DatabaseConfig) -> Self {
        Self {
            url: config.url.clone(),
            max_connections: config.max_connections,
            min_connections: config.min_connections.min(config.max_connections),
            acquire_timeout: Duration::from_secs(10),
            idle_timeout: Duration::from_secs(300),
            max_lifetime: Duration::from_secs(1800),
        }
    }
}

pub async fn create_pool(config: &PoolConfig) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(config.acquire_timeout)
        .idle_timeout(config.idle_timeout)
        .max_lifetime(config.max_lifetime)
        .connect(&config.url)
        .await
}

/// `MIGRATIONS_DIR` when set, otherwise this crate's `migrations/` directory
fn migrations_dir() -> PathBuf {
    std::env::var_os("MIGRATIONS_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|| Path::new(env!("CARGO_MANIFEST_DIR")).join("migrations"))
}

/// Apply pending migrations
pub async fn run_migrations(pool: &PgPool) -> Result<(), MigrateError> {
    let dir = migrations_dir();
    let migrator = Migrator::new(dir.as_path()).await?;
    migrator.run(pool).await?;
    info!(dir = %dir.display(), "Database migrations applied");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pool_config_from_app_config() {
        let config = PoolConfig::from(&DatabaseConfig {
            url: "postgres://localhost/mart".into(),
            max_connections: 4,
            min_connections: 10,
        });
        assert_eq!(config.max_connections, 4);
        assert_eq!(config.min_connections, 4);
        assert_eq!(config.acquire_timeout, Duration::from_secs(10));
    }

    #[test]
    fn bundled_migrations_exist() {
        let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("migrations");
        assert!(dir.read_dir().map(|mut d| d.next().is_some()).unwrap_or(false));
    }
}
