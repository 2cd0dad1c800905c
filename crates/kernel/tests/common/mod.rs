#![allow(clippy::unwrap_used, clippy::expect_used)]
//! Common test utilities for table engine tests.
//!
//! [`RecordingPersistence`] stands in for PostgreSQL: it serves a canned
//! dataset, pages it by the window the service asks for, and records every
//! session and statement so tests can assert what reached the database.
//! Everything above the persistence boundary is the real kernel code.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::Request;
use axum::response::Response;
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use luckydraw_kernel::models;
use luckydraw_kernel::routes;
use luckydraw_kernel::state::AppState;
use luckydraw_kernel::table::{
    ColumnDescriptor, FetchError, FetchRequest, FetchResult, FilterOperator, FilterSpec,
    FilterValue, PageLimits, Persistence, Session, SortDirection, SortSpec, TableService, Tuple,
    Window,
};

/// What the fake database saw.
#[derive(Debug, Default)]
pub struct Recorded {
    pub sessions: usize,
    pub finished: usize,
    pub count_sql: Vec<String>,
    pub data_sql: Vec<(String, Window)>,
}

/// In-memory persistence that records every call.
#[derive(Clone, Default)]
pub struct RecordingPersistence {
    rows: Arc<Vec<Tuple>>,
    log: Arc<Mutex<Recorded>>,
    unavailable: bool,
}

impl RecordingPersistence {
    /// Serve `rows` as the full result set of every query.
    pub fn with_rows(rows: Vec<Tuple>) -> Self {
        Self {
            rows: Arc::new(rows),
            ..Default::default()
        }
    }

    /// Fail every session with a pool timeout.
    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Default::default()
        }
    }

    pub fn sessions(&self) -> usize {
        self.log.lock().unwrap().sessions
    }

    pub fn finished(&self) -> usize {
        self.log.lock().unwrap().finished
    }

    pub fn count_sql(&self) -> Vec<String> {
        self.log.lock().unwrap().count_sql.clone()
    }

    pub fn data_sql(&self) -> Vec<(String, Window)> {
        self.log.lock().unwrap().data_sql.clone()
    }
}

#[async_trait]
impl Persistence for RecordingPersistence {
    async fn session(&self) -> FetchResult<Box<dyn Session>> {
        if self.unavailable {
            return Err(FetchError::PersistenceUnavailable(sqlx::Error::PoolTimedOut));
        }
        self.log.lock().unwrap().sessions += 1;
        Ok(Box::new(RecordingSession {
            rows: self.rows.clone(),
            log: self.log.clone(),
        }))
    }
}

struct RecordingSession {
    rows: Arc<Vec<Tuple>>,
    log: Arc<Mutex<Recorded>>,
}

#[async_trait]
impl Session for RecordingSession {
    async fn count(&mut self, sql: &str) -> FetchResult<u64> {
        self.log.lock().unwrap().count_sql.push(sql.to_string());
        Ok(self.rows.len() as u64)
    }

    async fn tuples(&mut self, sql: &str, window: Window) -> FetchResult<Vec<Tuple>> {
        self.log
            .lock()
            .unwrap()
            .data_sql
            .push((sql.to_string(), window));
        Ok(self
            .rows
            .iter()
            .skip(window.offset as usize)
            .take(window.limit as usize)
            .cloned()
            .collect())
    }

    async fn finish(self: Box<Self>) -> FetchResult<()> {
        self.log.lock().unwrap().finished += 1;
        Ok(())
    }
}

/// `count` event tuples with ids 1..=count.
pub fn event_rows(count: usize) -> Vec<Tuple> {
    (1..=count)
        .map(|i| {
            let row = json!({
                "id": i,
                "name": format!("Event {i}"),
                "status": "ACTIVE",
                "startDate": "2026-01-28",
                "locations_region_name": "North, South",
            });
            match row {
                Value::Object(map) => map,
                _ => unreachable!(),
            }
        })
        .collect()
}

/// Table service over the real registry and the given persistence.
pub fn service(persistence: &RecordingPersistence) -> TableService {
    TableService::new(
        Arc::new(models::registry().expect("registry")),
        Arc::new(persistence.clone()),
        PageLimits::default(),
    )
}

/// The real router around a table service.
pub fn router(persistence: &RecordingPersistence) -> Router {
    routes::router().with_state(AppState::with_table_service(service(persistence)))
}

/// Send one request through the router.
pub async fn send(router: Router, request: Request<Body>) -> Response {
    router.oneshot(request).await.expect("Failed to send request")
}

pub async fn response_json(response: Response) -> Value {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap_or_else(|_| {
        let text = String::from_utf8_lossy(&body);
        panic!("Failed to parse JSON: {text}");
    })
}

// -------------------------------------------------------------------------
// Request builders
// -------------------------------------------------------------------------

pub fn request(object_type: &str) -> FetchRequest {
    FetchRequest {
        object_type: Some(object_type.to_string()),
        ..Default::default()
    }
}

pub fn paged(mut request: FetchRequest, page: i64, size: i64) -> FetchRequest {
    request.page = page;
    request.size = size;
    request
}

pub fn column(field: &str) -> ColumnDescriptor {
    ColumnDescriptor {
        field: field.to_string(),
        field_type: None,
        sort: None,
    }
}

pub fn sort(field: &str, direction: SortDirection) -> SortSpec {
    SortSpec {
        field: field.to_string(),
        direction,
    }
}

pub fn filter(field: &str, operator: FilterOperator, value: FilterValue) -> FilterSpec {
    FilterSpec {
        field: field.to_string(),
        operator,
        min_value: Some(value),
        max_value: None,
    }
}

pub fn text(value: &str) -> FilterValue {
    FilterValue::String(value.to_string())
}
