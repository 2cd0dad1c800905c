//! Application state shared across all handlers.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use crate::config::Config;
use crate::db;
use crate::models;
use crate::table::{PgPersistence, TableService};

/// Shared application state.
///
/// Wrapped in Arc internally so Clone is cheap.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    /// Table query engine over the lucky draw entities.
    table: TableService,
}

impl AppState {
    /// Connect to PostgreSQL and build the entity registry.
    pub async fn new(config: &Config) -> Result<Self> {
        let pool = db::create_pool(config).await?;

        let registry = models::registry().context("failed to build type registry")?;
        info!(object_types = registry.len(), "type registry built");

        let persistence = PgPersistence::new(pool, config.table_statement_timeout);
        let table = TableService::new(
            Arc::new(registry),
            Arc::new(persistence),
            config.page_limits(),
        );

        Ok(Self::with_table_service(table))
    }

    /// State around an already-built table service.
    pub fn with_table_service(table: TableService) -> Self {
        Self {
            inner: Arc::new(AppStateInner { table }),
        }
    }

    pub fn table(&self) -> &TableService {
        &self.inner.table
    }
}
