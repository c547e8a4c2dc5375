//! Appointment availability handler.

use std::time::Instant;

use axum::Json;
use axum::extract::{Query, State};
use chrono::NaiveDate;
use serde::Deserialize;

use crate::http::error::AppError;
use crate::http::handlers::to_json;
use crate::http::response::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AvailabilityQuery {
    /// When set, list the arrival windows of this date instead of the dates.
    pub date: Option<NaiveDate>,
}

/// GET /api/v1/availability - Upcoming dates, or the slots of one date.
pub async fn get_availability(
    State(state): State<AppState>,
    Query(query): Query<AvailabilityQuery>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let start = Instant::now();
    let request_id = uuid::Uuid::now_v7().to_string();
    let today = state.today();

    let data = match query.date {
        Some(date) => {
            if !state.engine.availability().is_offered(today, date) {
                return Err(AppError::Validation(format!(
                    "{date} is not an available appointment date"
                )));
            }
            serde_json::json!({
                "date": date,
                "slots": to_json(&state.engine.slots_for(date))?,
            })
        }
        None => serde_json::json!({
            "today": today,
            "dates": state.engine.dates(today),
        }),
    };
    let elapsed = start.elapsed().as_millis() as u64;

    Ok(Json(
        ApiResponse::success(data, request_id, elapsed).with_link("self", "/api/v1/availability"),
    ))
}
