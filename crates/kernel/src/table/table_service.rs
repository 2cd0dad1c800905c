//! Table fetch service.
//!
//! Entry point for every "table data" caller: resolves the root type, plans
//! the queries, runs count then data inside one persistence session, and
//! wraps the outcome in a [`FetchResponse`].

use std::sync::Arc;

use super::error::{FetchError, FetchResult};
use super::materialize::materialize;
use super::object_type::ObjectType;
use super::persistence::{Persistence, Window};
use super::query_builder::QueryPlan;
use super::type_registry::{EntityCatalog, TypeRegistry};
use super::types::{
    ColumnDescriptor, FetchRequest, FetchResponse, FilterOperator, FilterSpec, FilterValue,
    TableRow, total_pages,
};

/// Default page size when a request sends none.
pub const DEFAULT_PAGE_SIZE: u64 = 10;

/// Hard ceiling on page size.
pub const MAX_PAGE_SIZE: u64 = 100;

/// Page size bounds applied to every request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageLimits {
    pub default_size: u64,
    pub max_size: u64,
}

impl Default for PageLimits {
    fn default() -> Self {
        Self {
            default_size: DEFAULT_PAGE_SIZE,
            max_size: MAX_PAGE_SIZE,
        }
    }
}

impl PageLimits {
    /// Effective page size: non-positive falls back to the default, oversize is capped.
    pub fn clamp_size(&self, requested: i64) -> u64 {
        if requested <= 0 {
            tracing::warn!(
                requested = requested,
                default = self.default_size,
                "page size not positive, using default"
            );
            return self.default_size.min(self.max_size);
        }

        let requested = requested.unsigned_abs();
        if requested > self.max_size {
            tracing::warn!(
                requested = requested,
                capped = self.max_size,
                "page size exceeds maximum, capping"
            );
            return self.max_size;
        }
        requested
    }

    /// Effective page index before the total is known.
    pub fn clamp_page(&self, requested: i64) -> u64 {
        if requested < 0 {
            tracing::warn!(requested = requested, "negative page index, using 0");
            return 0;
        }
        requested.unsigned_abs()
    }
}

/// One fetched page, before it is wrapped in the response envelope.
#[derive(Debug, Clone, Default)]
pub struct FetchPage {
    pub rows: Vec<TableRow>,
    pub total: u64,
    pub page: u64,
    pub page_size: u64,
}

/// Generic table query service shared by every table endpoint.
#[derive(Clone)]
pub struct TableService {
    registry: Arc<TypeRegistry>,
    persistence: Arc<dyn Persistence>,
    limits: PageLimits,
}

impl TableService {
    pub fn new(
        registry: Arc<TypeRegistry>,
        persistence: Arc<dyn Persistence>,
        limits: PageLimits,
    ) -> Self {
        Self {
            registry,
            persistence,
            limits,
        }
    }

    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    pub fn limits(&self) -> PageLimits {
        self.limits
    }

    /// Fetch one page. Never fails: errors become an `ERROR` envelope.
    pub async fn fetch(&self, request: FetchRequest) -> FetchResponse {
        self.fetch_outcome(request).await.0
    }

    /// Like [`fetch`](Self::fetch), also handing back the error behind an
    /// `ERROR` envelope so callers can classify it.
    pub async fn fetch_outcome(&self, request: FetchRequest) -> (FetchResponse, Option<FetchError>) {
        match self.try_fetch(&request).await {
            Ok(page) => (
                FetchResponse::page(page.rows, page.total, page.page, page.page_size, request),
                None,
            ),
            Err(e) => {
                if e.is_client_error() {
                    tracing::warn!(kind = e.kind(), error = %e, "table fetch rejected");
                } else {
                    tracing::error!(kind = e.kind(), error = %e, "table fetch failed");
                }
                (FetchResponse::error(request, &e), Some(e))
            }
        }
    }

    /// Fetch one page, surfacing errors.
    ///
    /// Every path, operator and value is validated before a session is
    /// acquired, so a rejected request never touches the database.
    pub async fn try_fetch(&self, request: &FetchRequest) -> FetchResult<FetchPage> {
        let root = self.registry.resolve_root(request)?;
        let page_size = self.limits.clamp_size(request.size);
        let mut page = self.limits.clamp_page(request.page);

        let plan = QueryPlan::build(&self.registry, root, request)?;

        let mut session = self.persistence.session().await?;

        let count_sql = plan.count_sql();
        tracing::debug!(object_type = %root.object_type, sql = %count_sql, "table count query");
        let total = session.count(count_sql).await?;

        if total == 0 {
            session.finish().await?;
            tracing::debug!(object_type = %root.object_type, "table fetch found no rows");
            return Ok(FetchPage {
                rows: Vec::new(),
                total: 0,
                page: 0,
                page_size,
            });
        }

        let last_page = total_pages(total, page_size).saturating_sub(1);
        if page > last_page {
            tracing::warn!(
                requested = page,
                last = last_page,
                "page index beyond last page, clamping"
            );
            page = last_page;
        }

        let window = Window {
            limit: page_size,
            offset: page * page_size,
        };
        let data_sql = plan.data_sql(window.limit, window.offset);
        tracing::debug!(object_type = %root.object_type, sql = %data_sql, "table data query");
        let tuples = session.tuples(&data_sql, window).await?;
        session.finish().await?;

        let rows = materialize(plan.projections(), tuples);
        tracing::debug!(
            object_type = %root.object_type,
            total = total,
            page = page,
            rows = rows.len(),
            "table fetch complete"
        );

        Ok(FetchPage {
            rows,
            total,
            page,
            page_size,
        })
    }

    /// Whether an entity with `id` exists, answered through the fetch path.
    pub async fn exists(&self, object_type: ObjectType, id: i64) -> FetchResult<bool> {
        let request = FetchRequest {
            object_type: Some(object_type.to_string()),
            size: 1,
            filters: vec![FilterSpec {
                field: "id".to_string(),
                operator: FilterOperator::Equals,
                min_value: Some(FilterValue::Integer(id)),
                max_value: None,
            }],
            view_columns: vec![ColumnDescriptor {
                field: "id".to_string(),
                field_type: None,
                sort: None,
            }],
            ..Default::default()
        };

        Ok(self.try_fetch(&request).await?.total > 0)
    }

    /// Open and release a session to prove the database is reachable.
    pub async fn health(&self) -> FetchResult<()> {
        self.persistence.session().await?.finish().await
    }

    /// Column catalog for a wire tag.
    pub fn describe(&self, tag: &str) -> FetchResult<EntityCatalog> {
        let descriptor = self.registry.resolve_tag(tag)?;
        self.registry.describe(descriptor.object_type)
    }
}
