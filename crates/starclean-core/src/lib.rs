//! Business logic and port trait definitions for the quote engine.
//!
//! This crate defines the "ports" (`LeadSink`, `ZipLookup`) that the
//! infrastructure layer implements, plus the pure pieces: pricing, the
//! booking wizard, availability and visitor session state. It depends only
//! on `starclean-types` -- never on `starclean-infra` or any HTTP crate.

pub mod area;
pub mod availability;
pub mod engine;
pub mod lead;
pub mod pricing;
pub mod session;
pub mod wizard;
