//! Price quote handler.

use std::time::Instant;

use axum::Json;
use axum::extract::State;
use serde::Deserialize;

use starclean_observe::lead_attrs;
use starclean_types::quote::{Frequency, HomeProfile, ServiceSelection, ServiceType};

use crate::http::error::AppError;
use crate::http::handlers::to_json;
use crate::http::response::ApiResponse;
use crate::state::AppState;

/// Request body for `POST /api/v1/quotes/price`.
#[derive(Debug, Deserialize)]
pub struct PriceRequest {
    pub bedrooms: u8,
    pub bathrooms: u8,
    #[serde(default)]
    pub has_dog: bool,
    #[serde(default)]
    pub has_cat: bool,
    #[serde(default)]
    pub service: ServiceType,
    #[serde(default)]
    pub frequency: Frequency,
}

/// POST /api/v1/quotes/price - Price a home profile and plan.
pub async fn price_quote(
    State(state): State<AppState>,
    Json(body): Json<PriceRequest>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let start = Instant::now();
    let request_id = uuid::Uuid::now_v7().to_string();
    let _span = tracing::debug_span!(lead_attrs::OP_PRICE_QUOTE).entered();

    let home = HomeProfile::new(body.bedrooms, body.bathrooms).with_pets(body.has_dog, body.has_cat);
    let selection = ServiceSelection {
        service: body.service,
        frequency: body.frequency,
    };
    let quote = state.engine.quote(&home, &selection);

    tracing::debug!(
        { lead_attrs::QUOTE_INITIAL_MIN } = %quote.initial.min,
        { lead_attrs::QUOTE_VERSION } = %quote.version,
        "price quote computed"
    );

    let data = serde_json::json!({
        "home": to_json(&home)?,
        "selection": to_json(&selection)?,
        "quote": to_json(&quote)?,
    });
    let elapsed = start.elapsed().as_millis() as u64;

    Ok(Json(ApiResponse::success(data, request_id, elapsed)))
}
