use anyhow::{Context, Result};
use sqlx::{postgres::PgPoolOptions, PgPool};
use tracing::info;

use hedgebot_core::DatabaseConfig;

/// Pooled `PostgreSQL` connection with the hedge schema applied.
#[derive(Debug, Clone)]
pub struct DatabaseClient {
    pool: PgPool,
}

impl DatabaseClient {
    /// Connects to `database_url` and runs pending migrations.
    ///
    /// # Errors
    /// Returns an error if the connection cannot be established or a migration fails.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .context("failed to connect to database")?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .context("failed to run migrations")?;

        info!(max_connections, "Database ready");
        Ok(Self { pool })
    }

    /// Connects using the `[database]` section of the application config.
    ///
    /// # Errors
    /// See [`DatabaseClient::connect`].
    pub async fn from_config(config: &DatabaseConfig) -> Result<Self> {
        Self::connect(&config.url, config.max_connections).await
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}
