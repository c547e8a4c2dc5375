//! Booking wizard session handlers.
//!
//! Sessions live in memory only. Each request locks its session for the
//! whole operation, so a session never runs two submissions at once.

use std::sync::Arc;
use std::time::Instant;

use axum::Json;
use axum::body::Bytes;
use axum::extract::{Path, State};
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::Instrument;
use uuid::Uuid;

use starclean_observe::lead_attrs;
use starclean_types::quote::LeadCapture;
use starclean_types::wizard::{WizardAction, WizardInput};

use crate::http::error::AppError;
use crate::http::handlers::to_json;
use crate::http::response::ApiResponse;
use crate::state::{AppState, ConcreteSession};

#[derive(Debug, Deserialize)]
pub struct ActionRequest {
    pub action: WizardAction,
}

#[derive(Debug, Deserialize)]
pub struct ExitIntentRequest {
    /// Vertical pointer position when it left the page.
    pub pointer_y: i32,
}

fn parse_session_id(id: &str) -> Result<Uuid, AppError> {
    id.parse()
        .map_err(|_| AppError::SessionNotFound(id.to_string()))
}

fn find_session(state: &AppState, id: &str) -> Result<Arc<Mutex<ConcreteSession>>, AppError> {
    let uuid = parse_session_id(id)?;
    state
        .touch_session(&uuid)
        .ok_or_else(|| AppError::SessionNotFound(id.to_string()))
}

fn session_response(
    id: &str,
    session: &ConcreteSession,
    request_id: String,
    start: Instant,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let mut data = to_json(&session.snapshot())?;
    Ok(session_response_from(id, &mut data, request_id, start))
}

fn session_response_from(
    id: &str,
    data: &mut serde_json::Value,
    request_id: String,
    start: Instant,
) -> Json<ApiResponse<serde_json::Value>> {
    if let Some(obj) = data.as_object_mut() {
        obj.insert("id".to_string(), serde_json::Value::String(id.to_string()));
    }
    let elapsed = start.elapsed().as_millis() as u64;

    Json(
        ApiResponse::success(data.take(), request_id, elapsed)
            .with_link("self", &format!("/api/v1/sessions/{id}"))
            .with_link("input", &format!("/api/v1/sessions/{id}/input"))
            .with_link("action", &format!("/api/v1/sessions/{id}/action")),
    )
}

/// POST /api/v1/sessions - Start a wizard session.
///
/// The body is optional; when present it is a short-form capture that
/// pre-fills the request.
pub async fn create_session(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let seed: Option<LeadCapture> = if body.iter().all(u8::is_ascii_whitespace) {
        None
    } else {
        Some(
            serde_json::from_slice(&body)
                .map_err(|e| AppError::Validation(format!("invalid capture: {e}")))?,
        )
    };

    let session = state.engine.start_session(state.today(), seed.as_ref()).await;
    let mut data = to_json(&session.snapshot())?;
    let id = state.insert_session(session);
    let response = session_response_from(&id.to_string(), &mut data, request_id, start);

    tracing::info!(
        { lead_attrs::SESSION_ID } = %id,
        seeded = seed.is_some(),
        "wizard session started"
    );
    Ok(response)
}

/// GET /api/v1/sessions/{id} - Current step, request and pricing.
pub async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let session = find_session(&state, &id)?;
    let session = session.lock().await;
    session_response(&id, &session, request_id, start)
}

/// POST /api/v1/sessions/{id}/input - Apply a field edit.
pub async fn apply_input(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<WizardInput>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let session = find_session(&state, &id)?;
    let mut session = session.lock().await;

    let span = tracing::info_span!(
        lead_attrs::OP_WIZARD_INPUT,
        { lead_attrs::SESSION_ID } = %id,
        { lead_attrs::WIZARD_STEP } = %session.step(),
    );
    session.input(input).instrument(span).await?;

    session_response(&id, &session, request_id, start)
}

/// POST /api/v1/sessions/{id}/action - Navigate the wizard.
///
/// Steps with a submission only move when the webhook accepted it; on
/// failure the response is a 502 carrying the fallback phone number.
pub async fn apply_action(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<ActionRequest>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let session = find_session(&state, &id)?;
    let mut session = session.lock().await;

    let span = tracing::info_span!(
        lead_attrs::OP_WIZARD_ACTION,
        { lead_attrs::SESSION_ID } = %id,
        { lead_attrs::WIZARD_STEP } = %session.step(),
        { lead_attrs::WIZARD_ACTION } = %body.action,
    );
    session.act(body.action).instrument(span).await?;

    session_response(&id, &session, request_id, start)
}

/// DELETE /api/v1/sessions/{id} - End a session and discard its request.
///
/// Sessions that are never ended are dropped once idle for
/// [`SESSION_IDLE_TIMEOUT`](crate::state::SESSION_IDLE_TIMEOUT).
pub async fn delete_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let uuid = parse_session_id(&id)?;
    if !state.end_session(&uuid) {
        return Err(AppError::SessionNotFound(id));
    }
    tracing::info!({ lead_attrs::SESSION_ID } = %id, "wizard session ended");
    let elapsed = start.elapsed().as_millis() as u64;

    Ok(Json(ApiResponse::success(
        serde_json::json!({ "deleted": true }),
        request_id,
        elapsed,
    )))
}

/// POST /api/v1/sessions/{id}/exit-intent - Ask whether to show the exit offer.
pub async fn exit_intent(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<ExitIntentRequest>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let session = find_session(&state, &id)?;
    let show_offer = session.lock().await.offer_exit_intent(body.pointer_y);
    let elapsed = start.elapsed().as_millis() as u64;

    Ok(Json(ApiResponse::success(
        serde_json::json!({ "show_offer": show_offer }),
        request_id,
        elapsed,
    )))
}
