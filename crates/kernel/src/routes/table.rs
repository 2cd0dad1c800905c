//! Table data API routes.
//!
//! Thin wrappers over the table service: the fetch contract and the column
//! catalog table UIs build their column pickers from.

use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    routing::{get, post},
};

use crate::error::{AppResult, fetch_status};
use crate::state::AppState;
use crate::table::{EntityCatalog, FetchError, FetchRequest, FetchResponse};

/// Create the table router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/table/fetch", post(fetch_table))
        .route("/api/table/{object_type}/schema", get(describe_table))
}

/// Fetch one page of table data.
///
/// The body is always a fetch envelope, including for bodies that fail to
/// deserialize; the status code classifies errors.
async fn fetch_table(
    State(state): State<AppState>,
    payload: Result<Json<FetchRequest>, JsonRejection>,
) -> (StatusCode, Json<FetchResponse>) {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            let error = FetchError::InvalidRequestBody(rejection.body_text());
            tracing::warn!(kind = error.kind(), error = %error, "table fetch body rejected");
            let response = FetchResponse::error(FetchRequest::default(), &error);
            return (fetch_status(&error), Json(response));
        }
    };

    let (response, error) = state.table().fetch_outcome(request).await;
    let status = error.as_ref().map_or(StatusCode::OK, fetch_status);
    (status, Json(response))
}

/// Column catalog for one object type.
async fn describe_table(
    State(state): State<AppState>,
    Path(object_type): Path<String>,
) -> AppResult<Json<EntityCatalog>> {
    Ok(Json(state.table().describe(&object_type)?))
}
