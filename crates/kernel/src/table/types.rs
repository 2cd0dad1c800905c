//! Table fetch envelope types.
//!
//! Provides the request/response DTOs carried through the boundary:
//! - FetchRequest: root type, paging, columns, filters, sorts, nested search
//! - FetchResponse: rows plus pagination metadata and the echoed request
//! - TableRow: one flattened result keyed by underscored path aliases

use std::collections::BTreeMap;
use std::fmt;

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

use super::error::FetchError;

/// Declared column type, controls rendering of materialized values.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FieldType {
    String,
    Number,
    Boolean,
    Date,
    Enum,
}

/// Sort direction.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
    /// Column is not sorted.
    None,
}

/// Comparison operators for filtering.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FilterOperator {
    /// Exact match.
    Equals,
    /// Not equal.
    NotEquals,
    /// Case-insensitive substring match.
    Contains,
    /// Case-insensitive prefix match.
    StartsWith,
    /// Case-insensitive suffix match.
    EndsWith,
    GreaterThan,
    LessThan,
    GreaterOrEqual,
    LessOrEqual,
    /// Inclusive range between `minValue` and `maxValue`.
    Between,
    /// Value in a list (JSON array or comma-delimited string).
    In,
    NotIn,
    IsNull,
    IsNotNull,
}

impl fmt::Display for FilterOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FilterOperator::Equals => "EQUALS",
            FilterOperator::NotEquals => "NOT_EQUALS",
            FilterOperator::Contains => "CONTAINS",
            FilterOperator::StartsWith => "STARTS_WITH",
            FilterOperator::EndsWith => "ENDS_WITH",
            FilterOperator::GreaterThan => "GREATER_THAN",
            FilterOperator::LessThan => "LESS_THAN",
            FilterOperator::GreaterOrEqual => "GREATER_OR_EQUAL",
            FilterOperator::LessOrEqual => "LESS_OR_EQUAL",
            FilterOperator::Between => "BETWEEN",
            FilterOperator::In => "IN",
            FilterOperator::NotIn => "NOT_IN",
            FilterOperator::IsNull => "IS_NULL",
            FilterOperator::IsNotNull => "IS_NOT_NULL",
        };
        f.write_str(name)
    }
}

/// Raw filter value as sent by the client, coerced later by field type.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum FilterValue {
    Boolean(bool),
    Integer(i64),
    Float(f64),
    String(String),
    /// List of values (for In/NotIn operators).
    List(Vec<FilterValue>),
}

impl fmt::Display for FilterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterValue::Boolean(b) => write!(f, "{b}"),
            FilterValue::Integer(i) => write!(f, "{i}"),
            FilterValue::Float(x) => write!(f, "{x}"),
            FilterValue::String(s) => write!(f, "\"{s}\""),
            FilterValue::List(items) => {
                let parts: Vec<String> = items.iter().map(ToString::to_string).collect();
                write!(f, "[{}]", parts.join(", "))
            }
        }
    }
}

/// Sort specification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SortSpec {
    /// Dot-separated property path.
    pub field: String,

    #[serde(default)]
    pub direction: SortDirection,
}

/// Filter condition.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterSpec {
    /// Dot-separated property path.
    pub field: String,

    #[serde(rename = "type")]
    pub operator: FilterOperator,

    /// Comparison value, or lower bound for `BETWEEN`.
    #[serde(default)]
    pub min_value: Option<FilterValue>,

    /// Upper bound for `BETWEEN`.
    #[serde(default)]
    pub max_value: Option<FilterValue>,
}

/// Column to project into each row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    /// Dot-separated property path.
    pub field: String,

    /// Declared rendering type; falls back to the field's storage type.
    #[serde(rename = "type", default)]
    pub field_type: Option<FieldType>,

    #[serde(default)]
    pub sort: Option<SortDirection>,
}

/// Field/value equality pairs against one related object type.
pub type SearchConstraint = BTreeMap<String, Option<FilterValue>>;

/// Table data request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchRequest {
    /// Root object type tag (`EVENT`).
    #[serde(default)]
    pub object_type: Option<String>,

    /// Legacy free-text entity name, used when `objectType` is absent.
    #[serde(default)]
    pub entity_name: Option<String>,

    /// 0-based page index.
    #[serde(default)]
    pub page: i64,

    /// Page size; non-positive values fall back to the configured default.
    #[serde(default)]
    pub size: i64,

    #[serde(default)]
    pub sorts: Vec<SortSpec>,

    #[serde(default)]
    pub filters: Vec<FilterSpec>,

    /// Object type tag -> equality constraints on that type.
    #[serde(default)]
    pub search: BTreeMap<String, SearchConstraint>,

    #[serde(default)]
    pub view_columns: Vec<ColumnDescriptor>,
}

/// Parsed dot-separated property path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PropertyPath {
    segments: Vec<String>,
}

impl PropertyPath {
    /// Split a dot-separated path. Empty segments are rejected.
    pub fn parse(raw: &str, object_type: &str) -> Result<Self, FetchError> {
        let segments: Vec<String> = raw.split('.').map(|s| s.trim().to_string()).collect();
        if segments.iter().any(String::is_empty) {
            return Err(FetchError::UnknownField {
                object_type: object_type.to_string(),
                path: raw.to_string(),
                segment: String::new(),
            });
        }
        Ok(Self { segments })
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Projection alias: segments joined by underscores.
    pub fn alias(&self) -> String {
        self.segments.join("_")
    }
}

impl fmt::Display for PropertyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("."))
    }
}

/// One flattened result row; keys keep projection order and `id` comes first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableRow(Vec<(String, serde_json::Value)>);

impl TableRow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a value, keeping the original position on replace.
    pub fn insert(&mut self, key: impl Into<String>, value: serde_json::Value) {
        let key = key.into();
        if let Some(slot) = self.0.iter_mut().find(|(k, _)| *k == key) {
            slot.1 = value;
        } else {
            self.0.push((key, value));
        }
    }

    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for TableRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (k, v) in &self.0 {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

/// Outcome of a fetch.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FetchStatus {
    Success,
    Error,
    NoData,
}

/// Table data response.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchResponse {
    pub status: FetchStatus,

    pub rows: Vec<TableRow>,

    /// Total matching root entities (before paging).
    pub total_elements: u64,

    /// Effective 0-based page after clamping.
    pub current_page: u64,

    /// Effective page size after clamping.
    pub page_size: u64,

    /// `ceil(totalElements / pageSize)`.
    pub total_page: u64,

    pub original_request: FetchRequest,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<String>,
}

impl FetchResponse {
    /// Create a response with paging calculations.
    pub fn page(
        rows: Vec<TableRow>,
        total: u64,
        page: u64,
        page_size: u64,
        original_request: FetchRequest,
    ) -> Self {
        let status = if total == 0 {
            FetchStatus::NoData
        } else {
            FetchStatus::Success
        };

        Self {
            status,
            rows,
            total_elements: total,
            current_page: page,
            page_size,
            total_page: total_pages(total, page_size),
            original_request,
            message: None,
            error_kind: None,
        }
    }

    /// Create an error response echoing the request.
    pub fn error(original_request: FetchRequest, error: &FetchError) -> Self {
        Self {
            status: FetchStatus::Error,
            rows: Vec::new(),
            total_elements: 0,
            current_page: 0,
            page_size: 0,
            total_page: 0,
            original_request,
            message: Some(error.to_string()),
            error_kind: Some(error.kind().to_string()),
        }
    }
}

/// `ceil(total / page_size)`, zero when `page_size` is zero.
pub fn total_pages(total: u64, page_size: u64) -> u64 {
    if page_size == 0 {
        return 0;
    }
    total.div_ceil(page_size)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_deserializes_wire_names() {
        let json = r#"{
            "objectType": "EVENT",
            "page": 1,
            "size": 20,
            "sorts": [{"field": "name", "direction": "DESCENDING"}],
            "filters": [{"field": "status", "type": "IN", "minValue": "ACTIVE,DRAFT"}],
            "search": {"EVENT_LOCATION": {"status": "ACTIVE", "name": null}},
            "viewColumns": [{"field": "locations.region.name", "type": "STRING", "sort": "NONE"}]
        }"#;
        let req: FetchRequest = serde_json::from_str(json).unwrap();

        assert_eq!(req.object_type.as_deref(), Some("EVENT"));
        assert_eq!(req.size, 20);
        assert_eq!(req.sorts[0].direction, SortDirection::Descending);
        assert_eq!(req.filters[0].operator, FilterOperator::In);
        assert_eq!(
            req.filters[0].min_value,
            Some(FilterValue::String("ACTIVE,DRAFT".to_string()))
        );
        assert_eq!(req.search["EVENT_LOCATION"]["name"], None);
        assert_eq!(req.view_columns[0].field_type, Some(FieldType::String));
        assert_eq!(req.view_columns[0].sort, Some(SortDirection::None));
    }

    #[test]
    fn request_defaults() {
        let req: FetchRequest = serde_json::from_str("{}").unwrap();
        assert!(req.object_type.is_none());
        assert_eq!(req.page, 0);
        assert_eq!(req.size, 0);
        assert!(req.filters.is_empty());
        assert!(req.search.is_empty());
    }

    #[test]
    fn filter_value_untagged_forms() {
        let v: FilterValue = serde_json::from_str("42").unwrap();
        assert_eq!(v, FilterValue::Integer(42));
        let v: FilterValue = serde_json::from_str("4.5").unwrap();
        assert_eq!(v, FilterValue::Float(4.5));
        let v: FilterValue = serde_json::from_str("true").unwrap();
        assert_eq!(v, FilterValue::Boolean(true));
        let v: FilterValue = serde_json::from_str(r#"["A", 1]"#).unwrap();
        assert_eq!(
            v,
            FilterValue::List(vec![FilterValue::String("A".into()), FilterValue::Integer(1)])
        );
    }

    #[test]
    fn property_path_parsing() {
        let path = PropertyPath::parse("locations.region.name", "EVENT").unwrap();
        assert_eq!(path.len(), 3);
        assert_eq!(path.alias(), "locations_region_name");
        assert_eq!(path.to_string(), "locations.region.name");

        let err = PropertyPath::parse("locations..name", "EVENT").unwrap_err();
        assert_eq!(err.kind(), "UNKNOWN_FIELD");
        assert!(PropertyPath::parse("", "EVENT").is_err());
    }

    #[test]
    fn table_row_keeps_insertion_order() {
        let mut row = TableRow::new();
        row.insert("id", serde_json::json!(7));
        row.insert("name", serde_json::json!("Tet"));
        row.insert("locations_region_name", serde_json::json!("North"));
        row.insert("name", serde_json::json!("Tet 2026"));

        let keys: Vec<&str> = row.keys().collect();
        assert_eq!(keys, ["id", "name", "locations_region_name"]);
        assert_eq!(
            serde_json::to_string(&row).unwrap(),
            r#"{"id":7,"name":"Tet 2026","locations_region_name":"North"}"#
        );
    }

    #[test]
    fn response_paging() {
        let resp = FetchResponse::page(vec![], 25, 2, 10, FetchRequest::default());
        assert_eq!(resp.status, FetchStatus::Success);
        assert_eq!(resp.total_page, 3);

        let empty = FetchResponse::page(vec![], 0, 0, 10, FetchRequest::default());
        assert_eq!(empty.status, FetchStatus::NoData);
        assert_eq!(empty.total_page, 0);
    }

    #[test]
    fn error_response_carries_kind_and_message() {
        let resp = FetchResponse::error(
            FetchRequest::default(),
            &FetchError::UnknownObjectType("NOT_REAL".into()),
        );
        assert_eq!(resp.status, FetchStatus::Error);
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["errorKind"], "UNKNOWN_OBJECT_TYPE");
        assert!(json["message"].as_str().unwrap().contains("NOT_REAL"));
        assert_eq!(json["totalPage"], 0);
    }

    #[test]
    fn total_pages_rounds_up() {
        assert_eq!(total_pages(25, 10), 3);
        assert_eq!(total_pages(30, 10), 3);
        assert_eq!(total_pages(1, 10), 1);
        assert_eq!(total_pages(0, 10), 0);
        assert_eq!(total_pages(5, 0), 0);
    }
}
