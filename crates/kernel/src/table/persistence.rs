//! Persistence boundary of the table engine.
//!
//! The engine only sees [`Persistence`], which hands out one scoped
//! [`Session`] per fetch. The PostgreSQL implementation backs a session with a
//! read-only, repeatable-read transaction, so the count and data queries
//! observe one snapshot. Dropping a session without [`Session::finish`]
//! rolls the transaction back.

use std::time::Duration;

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};

use super::error::FetchResult;
use super::query_builder::ROW_ORDINAL;

/// One projection tuple keyed by alias, as produced by `row_to_json`.
pub type Tuple = serde_json::Map<String, serde_json::Value>;

/// Page window applied to a data query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub limit: u64,
    pub offset: u64,
}

/// Source of query sessions.
#[async_trait]
pub trait Persistence: Send + Sync {
    /// Acquire a session for one fetch.
    async fn session(&self) -> FetchResult<Box<dyn Session>>;
}

/// Scoped access to the database for one fetch.
#[async_trait]
pub trait Session: Send {
    /// Run a single-value count query.
    async fn count(&mut self, sql: &str) -> FetchResult<u64>;

    /// Run a data query, returning tuples in the query's order.
    ///
    /// `sql` already carries `window`; it is passed along for implementations
    /// that page in memory.
    async fn tuples(&mut self, sql: &str, window: Window) -> FetchResult<Vec<Tuple>>;

    /// Release the session after a successful fetch.
    async fn finish(self: Box<Self>) -> FetchResult<()>;
}

/// PostgreSQL-backed persistence.
#[derive(Clone)]
pub struct PgPersistence {
    pool: PgPool,
    statement_timeout: Duration,
}

impl PgPersistence {
    pub fn new(pool: PgPool, statement_timeout: Duration) -> Self {
        Self {
            pool,
            statement_timeout,
        }
    }
}

#[async_trait]
impl Persistence for PgPersistence {
    async fn session(&self) -> FetchResult<Box<dyn Session>> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ, READ ONLY")
            .execute(&mut *tx)
            .await?;

        // SET LOCAL resets on commit/rollback.
        sqlx::query(&format!(
            "SET LOCAL statement_timeout = '{}ms'",
            self.statement_timeout.as_millis()
        ))
        .execute(&mut *tx)
        .await?;

        Ok(Box::new(PgSession { tx }))
    }
}

struct PgSession {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl Session for PgSession {
    async fn count(&mut self, sql: &str) -> FetchResult<u64> {
        let total: i64 = sqlx::query_scalar(sql).fetch_one(&mut *self.tx).await?;
        Ok(u64::try_from(total).unwrap_or(0))
    }

    async fn tuples(&mut self, sql: &str, _window: Window) -> FetchResult<Vec<Tuple>> {
        let rows: Vec<serde_json::Value> = sqlx::query_scalar(&tuple_sql(sql))
            .fetch_all(&mut *self.tx)
            .await?;

        Ok(rows
            .into_iter()
            .filter_map(|row| match row {
                serde_json::Value::Object(tuple) => Some(tuple),
                _ => None,
            })
            .collect())
    }

    async fn finish(self: Box<Self>) -> FetchResult<()> {
        self.tx.commit().await?;
        Ok(())
    }
}

/// Wrap a data query so each row comes back as one JSON object.
///
/// A derived table carries no order of its own, so the outer query sorts on
/// the ordinal the planner projects.
fn tuple_sql(sql: &str) -> String {
    format!("SELECT row_to_json(t) FROM ({sql}) t ORDER BY t.\"{ROW_ORDINAL}\"")
}
