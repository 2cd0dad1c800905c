//! Table query planner using SeaQuery.
//!
//! Turns one [`FetchRequest`] into a frozen pair of rendered statements:
//! - a data query: projection, predicates, ordering (pagination added later)
//! - a count query: `COUNT(DISTINCT root.id)` over the same predicates
//!
//! Statements are rendered to SQL while planning, so a plan is plain owned
//! data and can be held across awaits by the service.
//!
//! Both share one join cache and one predicate list, so they always agree on
//! which root rows match. When any join is to-many the data query groups by
//! the root identifier, aggregating multi-valued columns, so each root entity
//! appears on exactly one row.

use std::collections::HashSet;

use sea_query::{
    Alias, Expr, Func, JoinType, Order, PostgresQueryBuilder, Query, SelectStatement, SimpleExpr,
    WindowStatement,
};

use super::error::FetchResult;
use super::join_cache::{JoinCache, JoinNode, ROOT_ALIAS, ResolvedField};
use super::metadata::ScalarType;
use super::predicate;
use super::type_registry::{EntityDescriptor, TypeRegistry};
use super::types::{FetchRequest, FieldType, SortDirection};

/// Extra data column holding each row's position under the requested order.
/// Persistence sorts the wrapped data query on it.
pub const ROW_ORDINAL: &str = "__row";

/// One projected column, in output order.
#[derive(Debug, Clone)]
pub struct Projection {
    /// Underscored path alias, also the row key.
    pub alias: String,
    /// Rendering type: the declared column type or the field's default.
    pub field_type: FieldType,
    pub scalar: ScalarType,
    /// Rendered as a `string_agg` of distinct values.
    pub aggregated: bool,
}

/// Frozen data and count SQL for one request.
#[derive(Debug, Clone)]
pub struct QueryPlan {
    data: String,
    count: String,
    projections: Vec<Projection>,
    join_count: usize,
    grouped: bool,
}

impl QueryPlan {
    /// Resolve every path in the request and build both statements.
    ///
    /// Fails before producing any SQL when a path, value or operator is invalid.
    pub fn build(
        registry: &TypeRegistry,
        root: &EntityDescriptor,
        request: &FetchRequest,
    ) -> FetchResult<Self> {
        let mut cache = JoinCache::new(registry, root);

        // Predicates first: the joins they need form a prefix of the join list.
        let predicates = predicate::build(&request.filters, &request.search, &mut cache)?;
        let predicate_joins = cache.joins().len();

        let id = cache.resolve_field(root.repository.id_column)?;
        let columns = resolve_columns(&mut cache, request, &id)?;
        let sorts = resolve_sorts(&mut cache, request, &id)?;

        let grouped = cache.has_to_many();
        let joins = cache.joins();

        let mut data = Query::select();
        data.from_as(Alias::new(&root.repository.table), Alias::new(ROOT_ALIAS));
        add_joins(&mut data, joins);

        let mut projections = Vec::with_capacity(columns.len());
        for (field, alias, field_type) in &columns {
            let aggregated = grouped && field.multi;
            let expr = if aggregated {
                string_agg(field)
            } else {
                field.expr().into()
            };
            data.expr_as(expr, Alias::new(alias));
            projections.push(Projection {
                alias: alias.clone(),
                field_type: *field_type,
                scalar: field.scalar,
                aggregated,
            });
        }

        for predicate in &predicates {
            data.and_where(predicate.clone());
        }

        if grouped {
            let mut grouped_on = HashSet::new();
            let single_valued = std::iter::once(&id)
                .chain(columns.iter().map(|(field, _, _)| field))
                .chain(sorts.iter().map(|(field, _)| field))
                .filter(|field| !field.multi);
            for field in single_valued {
                if grouped_on.insert(field.key()) {
                    data.group_by_col((Alias::new(&field.table_alias), Alias::new(&field.column)));
                }
            }
        }

        let mut ordinal = WindowStatement::new();
        for (field, direction) in &sorts {
            let order = match direction {
                SortDirection::Descending => Order::Desc,
                _ => Order::Asc,
            };
            let expr: SimpleExpr = match (grouped && field.multi, &order) {
                (true, Order::Desc) => Func::max(field.expr()).into(),
                (true, _) => Func::min(field.expr()).into(),
                (false, _) => field.expr().into(),
            };
            ordinal.order_by_expr(expr.clone(), order.clone());
            data.order_by_expr(expr, order);
        }
        data.expr_window_as(Expr::cust("ROW_NUMBER()"), ordinal, Alias::new(ROW_ORDINAL));

        let mut count = Query::select();
        count
            .expr(Func::count_distinct(id.expr()))
            .from_as(Alias::new(&root.repository.table), Alias::new(ROOT_ALIAS));
        add_joins(&mut count, &joins[..predicate_joins]);
        for predicate in predicates {
            count.and_where(predicate);
        }

        Ok(Self {
            data: data.to_string(PostgresQueryBuilder),
            count: count.to_string(PostgresQueryBuilder),
            projections,
            join_count: joins.len(),
            grouped,
        })
    }

    /// Data query for one page.
    pub fn data_sql(&self, limit: u64, offset: u64) -> String {
        format!("{} LIMIT {limit} OFFSET {offset}", self.data)
    }

    /// Distinct root count sharing the data query's predicates.
    pub fn count_sql(&self) -> &str {
        &self.count
    }

    /// Projected columns; the root identifier is always first.
    pub fn projections(&self) -> &[Projection] {
        &self.projections
    }

    /// Number of joins in the data query.
    pub fn join_count(&self) -> usize {
        self.join_count
    }

    /// Whether the data query groups by the root identifier.
    pub fn is_grouped(&self) -> bool {
        self.grouped
    }
}

/// Root id first, then the requested columns (all root fields when none are
/// requested). Duplicate aliases are emitted once.
fn resolve_columns(
    cache: &mut JoinCache<'_>,
    request: &FetchRequest,
    id: &ResolvedField,
) -> FetchResult<Vec<(ResolvedField, String, FieldType)>> {
    let mut columns = vec![(id.clone(), "id".to_string(), FieldType::Number)];
    let mut seen: HashSet<String> = HashSet::from(["id".to_string()]);

    let requested: Vec<(String, Option<FieldType>)> = if request.view_columns.is_empty() {
        cache
            .root()
            .schema
            .fields
            .iter()
            .map(|f| (f.name.to_string(), None))
            .collect()
    } else {
        request
            .view_columns
            .iter()
            .map(|c| (c.field.clone(), c.field_type))
            .collect()
    };

    for (path, declared) in requested {
        let field = cache.resolve_field(&path)?;
        let alias = field.path.alias();
        if !seen.insert(alias.clone()) {
            continue;
        }
        let field_type = declared.unwrap_or_else(|| field.scalar.default_field_type());
        columns.push((field, alias, field_type));
    }

    Ok(columns)
}

/// `sorts` first, then column sorts; `NONE` skipped, repeated fields ignored,
/// root id ascending appended as the final tie-break.
fn resolve_sorts(
    cache: &mut JoinCache<'_>,
    request: &FetchRequest,
    id: &ResolvedField,
) -> FetchResult<Vec<(ResolvedField, SortDirection)>> {
    let requested = request
        .sorts
        .iter()
        .map(|s| (&s.field, s.direction))
        .chain(
            request
                .view_columns
                .iter()
                .filter_map(|c| c.sort.map(|direction| (&c.field, direction))),
        )
        .filter(|(_, direction)| *direction != SortDirection::None);

    let mut sorts: Vec<(ResolvedField, SortDirection)> = Vec::new();
    for (path, direction) in requested {
        let field = cache.resolve_field(path)?;
        if sorts.iter().any(|(f, _)| f.key() == field.key()) {
            continue;
        }
        sorts.push((field, direction));
    }

    if !sorts.iter().any(|(f, _)| f.key() == id.key()) {
        sorts.push((id.clone(), SortDirection::Ascending));
    }

    Ok(sorts)
}

fn add_joins(query: &mut SelectStatement, joins: &[JoinNode]) {
    for join in joins {
        let on_condition = Expr::col((Alias::new(&join.parent_alias), Alias::new(&join.parent_column)))
            .equals((Alias::new(&join.alias), Alias::new(&join.child_column)));

        query.join_as(
            JoinType::LeftJoin,
            Alias::new(&join.table),
            Alias::new(&join.alias),
            on_condition,
        );
    }
}

/// `string_agg(DISTINCT "alias"."column"::text, ', ')`
fn string_agg(field: &ResolvedField) -> SimpleExpr {
    Expr::cust(format!(
        "string_agg(DISTINCT {}.{}::text, ', ')",
        quote_ident(&field.table_alias),
        quote_ident(&field.column)
    ))
}

fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}
