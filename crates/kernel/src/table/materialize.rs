//! Flattening of result tuples into ordered table rows.

use chrono::{NaiveDate, NaiveDateTime};
use serde_json::Value;

use super::metadata::ScalarType;
use super::persistence::Tuple;
use super::query_builder::Projection;
use super::types::{FieldType, TableRow};

/// Map each tuple to a row keyed by projection alias, in projection order.
///
/// Aliases missing from a tuple become `null`.
pub fn materialize(projections: &[Projection], tuples: Vec<Tuple>) -> Vec<TableRow> {
    tuples
        .into_iter()
        .map(|mut tuple| {
            let mut row = TableRow::new();
            for projection in projections {
                let raw = tuple.remove(&projection.alias).unwrap_or(Value::Null);
                row.insert(projection.alias.clone(), render(projection, raw));
            }
            row
        })
        .collect()
}

/// Render one raw value according to the column's declared type.
pub fn render(projection: &Projection, raw: Value) -> Value {
    if raw.is_null() || projection.aggregated {
        return raw;
    }

    match projection.field_type {
        FieldType::String | FieldType::Enum => match raw {
            Value::String(_) => raw,
            other => Value::String(other.to_string()),
        },
        FieldType::Number => match &raw {
            Value::String(s) => s
                .trim()
                .parse::<i64>()
                .map(Value::from)
                .or_else(|_| s.trim().parse::<f64>().map(Value::from))
                .unwrap_or(raw),
            Value::Bool(b) => Value::from(i64::from(*b)),
            _ => raw,
        },
        FieldType::Boolean => match &raw {
            Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
                "true" | "t" | "1" => Value::Bool(true),
                "false" | "f" | "0" => Value::Bool(false),
                _ => raw,
            },
            Value::Number(n) => n.as_i64().map(|n| Value::Bool(n != 0)).unwrap_or(raw),
            _ => raw,
        },
        FieldType::Date => match &raw {
            Value::String(s) => render_date(projection.scalar, s).map(Value::String).unwrap_or(raw),
            _ => raw,
        },
    }
}

fn render_date(scalar: ScalarType, s: &str) -> Option<String> {
    let timestamp = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f"))
        .ok();

    match (scalar, timestamp) {
        (ScalarType::Timestamp, Some(t)) => Some(t.format("%Y-%m-%d %H:%M:%S").to_string()),
        (_, Some(t)) => Some(t.date().format("%Y-%m-%d").to_string()),
        (_, None) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .ok()
            .map(|d| d.format("%Y-%m-%d").to_string()),
    }
}
