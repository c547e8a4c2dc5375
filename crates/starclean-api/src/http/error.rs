//! Application error type mapping to HTTP status codes and envelope format.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use starclean_types::error::{BookingError, WizardError};

use crate::http::response::ApiResponse;

/// Application-level error that maps to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    /// Wizard validation or webhook delivery failure.
    Booking(BookingError),
    /// No live session with this ID.
    SessionNotFound(String),
    /// Malformed request.
    Validation(String),
    /// Generic internal error.
    Internal(String),
}

impl From<BookingError> for AppError {
    fn from(e: BookingError) -> Self {
        AppError::Booking(e)
    }
}

impl From<WizardError> for AppError {
    fn from(e: WizardError) -> Self {
        AppError::Booking(BookingError::Wizard(e))
    }
}

impl AppError {
    fn parts(&self) -> (StatusCode, &'static str, String, Option<serde_json::Value>) {
        match self {
            AppError::Booking(BookingError::Wizard(e)) => match e {
                WizardError::MissingContactFields(fields) => (
                    StatusCode::BAD_REQUEST,
                    "VALIDATION_ERROR",
                    e.to_string(),
                    Some(json!({ "missing": fields })),
                ),
                WizardError::InvalidTransition { .. } | WizardError::Completed => {
                    (StatusCode::CONFLICT, "INVALID_TRANSITION", e.to_string(), None)
                }
                WizardError::SlotUnavailable => {
                    (StatusCode::CONFLICT, "SLOT_UNAVAILABLE", e.to_string(), None)
                }
                WizardError::ScheduleIncomplete | WizardError::DateUnavailable(_) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", e.to_string(), None)
                }
            },
            AppError::Booking(e) => {
                let fallback_phone = match e {
                    BookingError::Submission { fallback_phone, .. } => Some(fallback_phone),
                    BookingError::Wizard(_) => None,
                };
                (
                    StatusCode::BAD_GATEWAY,
                    "SUBMISSION_FAILED",
                    e.to_string(),
                    fallback_phone.map(|phone| json!({ "fallback_phone": phone })),
                )
            }
            AppError::SessionNotFound(id) => (
                StatusCode::NOT_FOUND,
                "SESSION_NOT_FOUND",
                format!("Session '{id}' not found"),
                None,
            ),
            AppError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone(), None)
            }
            AppError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                msg.clone(),
                None,
            ),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message, details) = self.parts();
        let request_id = uuid::Uuid::now_v7().to_string();
        let body = ApiResponse::error(code, &message, details, request_id);

        let body = serde_json::to_string(&body).unwrap_or_else(|_| {
            r#"{"errors":[{"code":"SERIALIZATION_ERROR","message":"Failed to serialize response"}]}"#.to_string()
        });

        (
            status,
            [(axum::http::header::CONTENT_TYPE, "application/json")],
            body,
        )
            .into_response()
    }
}
