//! Table query engine errors.

use thiserror::Error;

/// Errors raised while resolving, planning, or executing a table fetch.
///
/// Everything except [`FetchError::PersistenceUnavailable`] is caused by the
/// request itself and is detected before any query reaches the database.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("malformed fetch request: {0}")]
    InvalidRequestBody(String),

    #[error("request names neither an object type nor an entity name")]
    MissingObjectType,

    #[error("unknown object type '{0}'")]
    UnknownObjectType(String),

    #[error("unknown field '{segment}' in path '{path}' on {object_type}")]
    UnknownField {
        object_type: String,
        path: String,
        segment: String,
    },

    #[error("path '{path}' exceeds the maximum depth of {max} segments")]
    PathTooDeep { path: String, max: usize },

    #[error("invalid value {value} for '{path}': {reason}")]
    InvalidFilterValue {
        path: String,
        value: String,
        reason: String,
    },

    #[error("operator {operator} is not supported for {field_type} field '{path}'")]
    UnsupportedOperatorForType {
        path: String,
        operator: String,
        field_type: String,
    },

    #[error("cannot search {target} from {root}: {reason}")]
    UnresolvableSearchTarget {
        root: String,
        target: String,
        reason: String,
    },

    #[error("persistence unavailable: {0}")]
    PersistenceUnavailable(#[from] sqlx::Error),
}

impl FetchError {
    /// Stable machine-readable code for the error envelope.
    pub fn kind(&self) -> &'static str {
        match self {
            FetchError::InvalidRequestBody(_) => "INVALID_REQUEST_BODY",
            FetchError::MissingObjectType => "MISSING_OBJECT_TYPE",
            FetchError::UnknownObjectType(_) => "UNKNOWN_OBJECT_TYPE",
            FetchError::UnknownField { .. } => "UNKNOWN_FIELD",
            FetchError::PathTooDeep { .. } => "PATH_TOO_DEEP",
            FetchError::InvalidFilterValue { .. } => "INVALID_FILTER_VALUE",
            FetchError::UnsupportedOperatorForType { .. } => "UNSUPPORTED_OPERATOR_FOR_TYPE",
            FetchError::UnresolvableSearchTarget { .. } => "UNRESOLVABLE_SEARCH_TARGET",
            FetchError::PersistenceUnavailable(_) => "PERSISTENCE_UNAVAILABLE",
        }
    }

    /// Whether the caller can fix the error by changing the request.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, FetchError::PersistenceUnavailable(_))
    }

    pub(crate) fn invalid_value(
        path: &str,
        value: impl std::fmt::Display,
        reason: impl Into<String>,
    ) -> Self {
        FetchError::InvalidFilterValue {
            path: path.to_string(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

/// Result type alias using FetchError.
pub type FetchResult<T> = Result<T, FetchError>;
