//! PostgreSQL warehouse adapter implementation

pub mod config;
mod scores;

pub use config::{ConfigError, PoolConfig, PostgresConfig, TableConfig};

use bioscore_core::error::{BioscoreError, Result};
use sqlx::{postgres::PgPoolOptions, PgPool};

/// PostgreSQL warehouse adapter
pub struct PostgresWarehouse {
    pool: PgPool,
    config: PostgresConfig,
}

impl PostgresWarehouse {
    /// Connect to the warehouse with the given configuration
    pub async fn new(config: PostgresConfig) -> Result<Self> {
        config.validate().map_err(|e| BioscoreError::ConfigInvalid {
            key: "database_url".to_string(),
            reason: e.to_string(),
        })?;

        let pool = PgPoolOptions::new()
            .min_connections(config.pool.min_connections)
            .max_connections(config.pool.max_connections)
            .acquire_timeout(config.pool.acquire_timeout)
            .idle_timeout(config.pool.idle_timeout)
            .max_lifetime(config.pool.max_lifetime)
            .connect(&config.database_url)
            .await
            .map_err(|e| BioscoreError::Warehouse(format!("Failed to connect to database: {}", e)))?;

        let warehouse = Self { pool, config };
        warehouse.health_check().await?;
        Ok(warehouse)
    }

    /// Get a reference to the connection pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Get a reference to the configuration
    pub fn config(&self) -> &PostgresConfig {
        &self.config
    }

    /// Perform a health check on the database connection
    pub async fn health_check(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| BioscoreError::Warehouse(format!("Health check failed: {}", e)))?;
        Ok(())
    }

    async fn table_exists(&self, table: &str) -> Result<bool> {
        sqlx::query_scalar("SELECT to_regclass($1) IS NOT NULL")
            .bind(table)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| BioscoreError::Warehouse(format!("Failed to look up table {}: {}", table, e)))
    }
}
