//! Configuration loaded from environment variables.

use std::env;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::table::PageLimits;

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port (default: 3000).
    pub port: u16,

    /// PostgreSQL connection URL.
    pub database_url: String,

    /// Maximum database connections in pool (default: 10).
    pub database_max_connections: u32,

    /// Page size used when a request sends none (default: 10).
    pub table_default_page_size: u64,

    /// Hard ceiling on page size (default: 100).
    pub table_max_page_size: u64,

    /// Per-fetch statement timeout (default: 10s).
    pub table_statement_timeout: Duration,

    /// Whole-request timeout applied by the HTTP layer (default: 30s).
    pub request_timeout: Duration,

    /// CORS allowed origins (comma-separated, default: "*").
    pub cors_allowed_origins: Vec<String>,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port = lookup("PORT")
            .unwrap_or_else(|| "3000".to_string())
            .parse()
            .context("PORT must be a valid u16")?;

        let database_url =
            lookup("DATABASE_URL").context("DATABASE_URL environment variable is required")?;

        let database_max_connections = lookup("DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|| "10".to_string())
            .parse()
            .context("DATABASE_MAX_CONNECTIONS must be a valid u32")?;

        let table_default_page_size: u64 = lookup("TABLE_DEFAULT_PAGE_SIZE")
            .unwrap_or_else(|| "10".to_string())
            .parse()
            .context("TABLE_DEFAULT_PAGE_SIZE must be a valid u64")?;

        let table_max_page_size: u64 = lookup("TABLE_MAX_PAGE_SIZE")
            .unwrap_or_else(|| "100".to_string())
            .parse()
            .context("TABLE_MAX_PAGE_SIZE must be a valid u64")?;

        if table_default_page_size == 0 || table_max_page_size == 0 {
            anyhow::bail!("table page sizes must be positive");
        }

        let table_statement_timeout = lookup("TABLE_STATEMENT_TIMEOUT_SECS")
            .unwrap_or_else(|| "10".to_string())
            .parse()
            .map(Duration::from_secs)
            .context("TABLE_STATEMENT_TIMEOUT_SECS must be a valid u64")?;

        let request_timeout: Duration = lookup("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|| "30".to_string())
            .parse()
            .map(Duration::from_secs)
            .context("REQUEST_TIMEOUT_SECS must be a valid u64")?;

        if request_timeout < table_statement_timeout {
            anyhow::bail!("REQUEST_TIMEOUT_SECS must not be shorter than TABLE_STATEMENT_TIMEOUT_SECS");
        }

        let cors_allowed_origins = lookup("CORS_ALLOWED_ORIGINS")
            .map(|v| {
                v.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_else(|| vec!["*".to_string()]);

        Ok(Self {
            port,
            database_url,
            database_max_connections,
            table_default_page_size,
            table_max_page_size,
            table_statement_timeout,
            request_timeout,
            cors_allowed_origins,
        })
    }

    /// Page size bounds for the table service.
    pub fn page_limits(&self) -> PageLimits {
        PageLimits {
            default_size: self.table_default_page_size,
            max_size: self.table_max_page_size,
        }
    }
}
