//! REST API handler modules.

pub mod availability;
pub mod lead;
pub mod quote;
pub mod session;
pub mod zip;

use serde::Serialize;

use crate::http::error::AppError;

/// Serialize a domain value for the envelope.
pub(crate) fn to_json<T: Serialize>(value: &T) -> Result<serde_json::Value, AppError> {
    serde_json::to_value(value).map_err(|e| AppError::Internal(e.to_string()))
}
