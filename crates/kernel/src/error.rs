//! Application error types.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

use crate::table::FetchError;

/// Application errors.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("internal server error")]
    Internal(#[from] anyhow::Error),

    #[error(transparent)]
    Fetch(#[from] FetchError),
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorResponse {
    error_kind: &'static str,
    message: String,
}

/// HTTP status for a table engine error: request faults are 400, database faults 503.
pub fn fetch_status(error: &FetchError) -> StatusCode {
    if error.is_client_error() {
        StatusCode::BAD_REQUEST
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Internal(e) => {
                tracing::error!(error = %e, "internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal server error").into_response()
            }
            AppError::Fetch(e) => {
                let body = ErrorResponse {
                    error_kind: e.kind(),
                    message: e.to_string(),
                };
                (fetch_status(&e), Json(body)).into_response()
            }
        }
    }
}

/// Result type alias using AppError.
pub type AppResult<T> = Result<T, AppError>;
