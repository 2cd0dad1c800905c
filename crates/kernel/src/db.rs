//! Database connection pool management.

use anyhow::{Context, Result};
use sqlx::postgres::{PgPool, PgPoolOptions};

use crate::config::Config;

/// Create the PostgreSQL pool backing table fetches.
///
/// Connection acquisition shares the statement timeout, so a saturated pool
/// fails a fetch instead of queueing it indefinitely.
pub async fn create_pool(config: &Config) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .acquire_timeout(config.table_statement_timeout)
        .connect(&config.database_url)
        .await
        .context("failed to connect to PostgreSQL")?;

    tracing::info!(
        max_connections = config.database_max_connections,
        "database pool ready"
    );

    Ok(pool)
}
