//! Predicate construction from filters and nested search constraints.
//!
//! Every raw value is coerced against the resolved field's scalar type before
//! an expression is produced. Any failure aborts the whole build, so a query
//! never runs with a filter silently dropped.

use std::collections::BTreeMap;

use sea_query::{Expr, Func, SimpleExpr, Value};

use super::coerce::{ScalarValue, coerce, coerce_list};
use super::error::{FetchError, FetchResult};
use super::join_cache::{JoinCache, ResolvedField};
use super::types::{FilterOperator, FilterSpec, FilterValue, SearchConstraint};

/// Build every predicate of a request. The caller ANDs them together.
///
/// Search constraints are resolved first, then filters in request order.
pub fn build(
    filters: &[FilterSpec],
    search: &BTreeMap<String, SearchConstraint>,
    cache: &mut JoinCache<'_>,
) -> FetchResult<Vec<SimpleExpr>> {
    let mut predicates = Vec::new();

    for (tag, constraint) in search {
        predicates.extend(search_predicates(tag, constraint, cache)?);
    }

    for filter in filters {
        let field = cache.resolve_field(&filter.field)?;
        predicates.push(filter_predicate(&field, filter)?);
    }

    Ok(predicates)
}

/// Equality predicates for one `search` entry, scoped to the joined target type.
fn search_predicates(
    tag: &str,
    constraint: &SearchConstraint,
    cache: &mut JoinCache<'_>,
) -> FetchResult<Vec<SimpleExpr>> {
    let registry = cache.registry();
    let target = registry.resolve_tag(tag)?;
    let prefix = registry.search_path(cache.root().object_type, target.object_type)?;

    let mut predicates = Vec::new();
    for (name, value) in constraint {
        // JSON null means "not constrained".
        let Some(value) = value else { continue };

        let path = match &prefix {
            Some(prefix) => format!("{prefix}.{name}"),
            None => name.clone(),
        };
        let field = cache.resolve_field(&path)?;
        let coerced = coerce(field.scalar, value, &path)?;
        predicates.push(field.expr().eq(Value::from(coerced)));
    }

    Ok(predicates)
}

/// Operator-specific predicate for one filter.
pub fn filter_predicate(field: &ResolvedField, filter: &FilterSpec) -> FetchResult<SimpleExpr> {
    let path = filter.field.as_str();
    let operator = filter.operator;
    check_operator(field, operator, path)?;

    let column = field.expr();
    let expr = match operator {
        FilterOperator::IsNull => column.is_null(),
        FilterOperator::IsNotNull => column.is_not_null(),
        FilterOperator::Equals => column.eq(single(field, filter, path)?),
        FilterOperator::NotEquals => column.ne(single(field, filter, path)?),
        FilterOperator::GreaterThan => column.gt(single(field, filter, path)?),
        FilterOperator::LessThan => column.lt(single(field, filter, path)?),
        FilterOperator::GreaterOrEqual => column.gte(single(field, filter, path)?),
        FilterOperator::LessOrEqual => column.lte(single(field, filter, path)?),
        FilterOperator::Between => {
            let (Some(min), Some(max)) = (&filter.min_value, &filter.max_value) else {
                return Err(FetchError::invalid_value(
                    path,
                    "null",
                    "BETWEEN requires both minValue and maxValue",
                ));
            };
            let min = coerce(field.scalar, min, path)?;
            let max = coerce(field.scalar, max, path)?;
            column.between(Value::from(min), Value::from(max))
        }
        FilterOperator::In | FilterOperator::NotIn => {
            let raw = required(filter, path)?;
            let values: Vec<Value> = coerce_list(field.scalar, raw, path)?
                .into_iter()
                .map(Value::from)
                .collect();
            if operator == FilterOperator::In {
                column.is_in(values)
            } else {
                column.is_not_in(values)
            }
        }
        FilterOperator::Contains | FilterOperator::StartsWith | FilterOperator::EndsWith => {
            let needle = match coerce(field.scalar, required(filter, path)?, path)? {
                ScalarValue::Text(text) => escape_like_wildcards(&text.to_lowercase()),
                other => {
                    return Err(FetchError::invalid_value(
                        path,
                        format!("{other:?}"),
                        "expected text",
                    ));
                }
            };
            let pattern = match operator {
                FilterOperator::Contains => format!("%{needle}%"),
                FilterOperator::StartsWith => format!("{needle}%"),
                _ => format!("%{needle}"),
            };
            Expr::expr(Func::lower(column)).like(pattern)
        }
    };

    Ok(expr)
}

fn check_operator(field: &ResolvedField, operator: FilterOperator, path: &str) -> FetchResult<()> {
    let supported = match operator {
        FilterOperator::Contains | FilterOperator::StartsWith | FilterOperator::EndsWith => {
            field.scalar.is_textual()
        }
        FilterOperator::GreaterThan
        | FilterOperator::LessThan
        | FilterOperator::GreaterOrEqual
        | FilterOperator::LessOrEqual
        | FilterOperator::Between => field.scalar.is_ordered(),
        _ => true,
    };

    if supported {
        Ok(())
    } else {
        Err(FetchError::UnsupportedOperatorForType {
            path: path.to_string(),
            operator: operator.to_string(),
            field_type: field.scalar.name().to_string(),
        })
    }
}

fn required<'f>(filter: &'f FilterSpec, path: &str) -> FetchResult<&'f FilterValue> {
    filter.min_value.as_ref().ok_or_else(|| {
        FetchError::invalid_value(path, "null", format!("{} requires minValue", filter.operator))
    })
}

fn single(field: &ResolvedField, filter: &FilterSpec, path: &str) -> FetchResult<Value> {
    coerce(field.scalar, required(filter, path)?, path).map(Value::from)
}

/// Escape SQL LIKE wildcard characters (`%`, `_`, `\`) in a value.
fn escape_like_wildcards(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}
