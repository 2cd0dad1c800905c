//! Coercion of raw filter values to a field's declared scalar type.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

use super::error::{FetchError, FetchResult};
use super::metadata::ScalarType;
use super::types::FilterValue;

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y"];

const TIMESTAMP_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// A filter value after coercion, ready to bind into a predicate.
#[derive(Debug, Clone, PartialEq)]
pub enum ScalarValue {
    Text(String),
    Integer(i64),
    Decimal(f64),
    Boolean(bool),
    Date(NaiveDate),
    Timestamp(NaiveDateTime),
}

impl From<ScalarValue> for sea_query::Value {
    fn from(value: ScalarValue) -> Self {
        match value {
            ScalarValue::Text(s) => s.into(),
            ScalarValue::Integer(i) => i.into(),
            ScalarValue::Decimal(d) => d.into(),
            ScalarValue::Boolean(b) => b.into(),
            ScalarValue::Date(d) => d.into(),
            ScalarValue::Timestamp(t) => t.into(),
        }
    }
}

/// Coerce a single raw value for the field at `path`.
pub fn coerce(scalar: ScalarType, raw: &FilterValue, path: &str) -> FetchResult<ScalarValue> {
    if let FilterValue::List(_) = raw {
        return Err(FetchError::invalid_value(path, raw, "expected a single value, got a list"));
    }

    match scalar {
        ScalarType::Text => Ok(ScalarValue::Text(raw_text(raw))),
        ScalarType::Integer => coerce_integer(raw, path).map(ScalarValue::Integer),
        ScalarType::Decimal => coerce_decimal(raw, path).map(ScalarValue::Decimal),
        ScalarType::Boolean => coerce_boolean(raw, path).map(ScalarValue::Boolean),
        ScalarType::Date => coerce_date(raw, path).map(ScalarValue::Date),
        ScalarType::Timestamp => coerce_timestamp(raw, path).map(ScalarValue::Timestamp),
        ScalarType::Enum(variants) => {
            let text = match raw {
                FilterValue::String(s) => s.trim(),
                _ => return Err(FetchError::invalid_value(path, raw, "expected an enum name")),
            };
            if variants.contains(&text) {
                Ok(ScalarValue::Text(text.to_string()))
            } else {
                Err(FetchError::invalid_value(
                    path,
                    raw,
                    format!("expected one of {}", variants.join(", ")),
                ))
            }
        }
    }
}

/// Coerce a list value for `IN`/`NOT IN`.
///
/// Accepts a JSON array or a comma-delimited string. An empty list is an error.
pub fn coerce_list(scalar: ScalarType, raw: &FilterValue, path: &str) -> FetchResult<Vec<ScalarValue>> {
    let items: Vec<FilterValue> = match raw {
        FilterValue::List(items) => items.clone(),
        FilterValue::String(s) => s
            .split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(|part| FilterValue::String(part.to_string()))
            .collect(),
        other => vec![other.clone()],
    };

    if items.is_empty() {
        return Err(FetchError::invalid_value(path, raw, "value list is empty"));
    }

    items.iter().map(|item| coerce(scalar, item, path)).collect()
}

fn raw_text(raw: &FilterValue) -> String {
    match raw {
        FilterValue::String(s) => s.clone(),
        FilterValue::Integer(i) => i.to_string(),
        FilterValue::Float(f) => f.to_string(),
        FilterValue::Boolean(b) => b.to_string(),
        FilterValue::List(_) => String::new(),
    }
}

/// Floats `i64` can hold exactly; the upper bound `2^63` is itself out of range.
const I64_RANGE: std::ops::Range<f64> = i64::MIN as f64..i64::MAX as f64;

fn coerce_integer(raw: &FilterValue, path: &str) -> FetchResult<i64> {
    match raw {
        FilterValue::Integer(i) => Ok(*i),
        FilterValue::Float(f) if f.fract() == 0.0 => {
            if I64_RANGE.contains(f) {
                Ok(*f as i64)
            } else {
                Err(FetchError::invalid_value(path, raw, "integer out of range"))
            }
        }
        FilterValue::String(s) => s
            .trim()
            .parse()
            .map_err(|_| FetchError::invalid_value(path, raw, "expected an integer")),
        _ => Err(FetchError::invalid_value(path, raw, "expected an integer")),
    }
}

fn coerce_decimal(raw: &FilterValue, path: &str) -> FetchResult<f64> {
    let parsed = match raw {
        FilterValue::Integer(i) => Some(*i as f64),
        FilterValue::Float(f) => Some(*f),
        FilterValue::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed
        .filter(|f| f.is_finite())
        .ok_or_else(|| FetchError::invalid_value(path, raw, "expected a number"))
}

fn coerce_boolean(raw: &FilterValue, path: &str) -> FetchResult<bool> {
    match raw {
        FilterValue::Boolean(b) => Ok(*b),
        FilterValue::Integer(0) => Ok(false),
        FilterValue::Integer(1) => Ok(true),
        FilterValue::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "1" => Ok(true),
            "false" | "0" => Ok(false),
            _ => Err(FetchError::invalid_value(path, raw, "expected true or false")),
        },
        _ => Err(FetchError::invalid_value(path, raw, "expected true or false")),
    }
}

fn coerce_date(raw: &FilterValue, path: &str) -> FetchResult<NaiveDate> {
    match raw {
        FilterValue::Integer(millis) => from_epoch_millis(*millis)
            .map(|t| t.date())
            .ok_or_else(|| FetchError::invalid_value(path, raw, "epoch milliseconds out of range")),
        FilterValue::String(s) => parse_date(s.trim())
            .ok_or_else(|| FetchError::invalid_value(path, raw, "expected a date (YYYY-MM-DD)")),
        _ => Err(FetchError::invalid_value(path, raw, "expected a date (YYYY-MM-DD)")),
    }
}

fn coerce_timestamp(raw: &FilterValue, path: &str) -> FetchResult<NaiveDateTime> {
    match raw {
        FilterValue::Integer(millis) => from_epoch_millis(*millis)
            .ok_or_else(|| FetchError::invalid_value(path, raw, "epoch milliseconds out of range")),
        FilterValue::String(s) => parse_timestamp(s.trim()).ok_or_else(|| {
            FetchError::invalid_value(path, raw, "expected a timestamp (YYYY-MM-DDTHH:MM:SS)")
        }),
        _ => Err(FetchError::invalid_value(
            path,
            raw,
            "expected a timestamp (YYYY-MM-DDTHH:MM:SS)",
        )),
    }
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        .or_else(|| DateTime::parse_from_rfc3339(s).ok().map(|t| t.date_naive()))
}

fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    if let Ok(t) = DateTime::parse_from_rfc3339(s) {
        return Some(t.naive_utc());
    }
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .or_else(|| parse_date(s).and_then(|d| d.and_hms_opt(0, 0, 0)))
}

fn from_epoch_millis(millis: i64) -> Option<NaiveDateTime> {
    DateTime::from_timestamp_millis(millis).map(|t| t.naive_utc())
}
