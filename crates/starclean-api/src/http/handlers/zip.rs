//! Zip-code lookup handler.

use std::time::Instant;

use axum::Json;
use axum::extract::{Path, State};
use tracing::Instrument;

use starclean_observe::lead_attrs;

use crate::http::error::AppError;
use crate::http::handlers::to_json;
use crate::http::response::ApiResponse;
use crate::state::AppState;

/// GET /api/v1/zip/{zip} - Resolve a zip code and check the service area.
///
/// Lookup failures are not errors: the city is simply `null`.
pub async fn lookup_zip(
    State(state): State<AppState>,
    Path(zip): Path<String>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let start = Instant::now();
    let request_id = uuid::Uuid::now_v7().to_string();

    let span = tracing::info_span!(lead_attrs::OP_ZIP_LOOKUP, { lead_attrs::ZIP_CODE } = %zip);
    let info = state.engine.lookup_zip(&zip).instrument(span).await;
    let elapsed = start.elapsed().as_millis() as u64;

    Ok(Json(ApiResponse::success(to_json(&info)?, request_id, elapsed)))
}
