//! Observability for the quote engine: tracing subscriber setup with optional
//! OpenTelemetry export, and the span attribute names shared by the CLI and
//! the REST API.

pub mod lead_attrs;
pub mod tracing_setup;
