//! Short-form lead capture handler.

use std::time::Instant;

use axum::Json;
use axum::extract::State;
use tracing::Instrument;

use starclean_observe::lead_attrs;
use starclean_types::quote::LeadCapture;

use crate::http::error::AppError;
use crate::http::handlers::to_json;
use crate::http::response::ApiResponse;
use crate::state::AppState;

/// POST /api/v1/leads - Submit a hero or main booking form.
///
/// Returns the payload that was delivered and a link to start a wizard
/// session seeded from the same capture.
pub async fn capture_lead(
    State(state): State<AppState>,
    Json(body): Json<LeadCapture>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let start = Instant::now();
    let request_id = uuid::Uuid::now_v7().to_string();

    let span = tracing::info_span!(
        lead_attrs::OP_CAPTURE_LEAD,
        { lead_attrs::LEAD_FORM_SOURCE } = %body.form_source,
        { lead_attrs::LEAD_STAGE } = "Lead Captured",
    );
    let payload = state.engine.capture(&body).instrument(span).await?;
    let elapsed = start.elapsed().as_millis() as u64;

    let resp = ApiResponse::success(to_json(&payload)?, request_id, elapsed)
        .with_link("sessions", "/api/v1/sessions");

    Ok(Json(resp))
}
