//! Connection pool handle.

use crate::error::Result;
use sqlx::mysql::{MySqlConnectOptions, MySqlPool, MySqlPoolOptions};
use std::time::Duration;
use tubescope_common::config::DatabaseConfig;

/// Main database handle. Cloning shares the underlying pool.
#[derive(Clone)]
pub struct Database {
    pool: MySqlPool,
}

impl Database {
    /// Build the pool without opening a connection. Connections are created
    /// on first use, so this never fails on an unreachable server.
    pub fn connect_lazy(config: &DatabaseConfig) -> Self {
        let pool = Self::pool_options(config).connect_lazy_with(Self::connect_options(config));
        Self { pool }
    }

    /// Build the pool and open `min_connections` connections up front.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        let pool = Self::pool_options(config)
            .connect_with(Self::connect_options(config))
            .await?;
        Ok(Self { pool })
    }

    /// Get the underlying pool.
    pub fn pool(&self) -> &MySqlPool {
        &self.pool
    }

    /// Round-trip a trivial query to prove the pool can reach the server.
    pub async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    /// Log whether the database is reachable. Never fails; the server keeps
    /// running and individual requests report their own errors.
    pub async fn log_connection_check(&self, target: &str) -> bool {
        match self.ping().await {
            Ok(()) => {
                tracing::info!(database = %target, "Database connection successful");
                true
            }
            Err(e) => {
                tracing::error!(database = %target, error = %e, "Database connection failed");
                false
            }
        }
    }

    fn connect_options(config: &DatabaseConfig) -> MySqlConnectOptions {
        let mut options = MySqlConnectOptions::new()
            .host(&config.host)
            .port(config.port)
            .username(&config.user)
            .database(&config.name)
            .charset("utf8mb4");
        if !config.password.is_empty() {
            options = options.password(&config.password);
        }
        options
    }

    fn pool_options(config: &DatabaseConfig) -> MySqlPoolOptions {
        MySqlPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(Duration::from_secs(10))
    }
}
