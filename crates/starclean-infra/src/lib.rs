//! Infrastructure layer for the Star Cleaning quote engine.
//!
//! Contains implementations of the port traits defined in `starclean-core`:
//! the reqwest webhook sink and zip-code geocoder, plus the `config.toml`
//! loader and data-directory resolution.

pub mod config;
pub mod filesystem;
pub mod geocode;
pub mod webhook;
