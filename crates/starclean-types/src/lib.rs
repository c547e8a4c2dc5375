//! Shared domain types for the Star Cleaning quote engine.
//!
//! This crate contains the types used across the workspace: the quote
//! request and its pricing breakdown, wizard steps and inputs, lead payloads
//! and their stages, scheduling windows, global configuration and the error
//! enums.
//!
//! Zero infrastructure dependencies -- only serde, chrono, rust_decimal, thiserror.

pub mod config;
pub mod error;
pub mod lead;
pub mod quote;
pub mod schedule;
pub mod wizard;
