//! Lead delivery and zip-code lookup ports.
//!
//! `LeadSink` and `ZipLookup` are implemented in starclean-infra (reqwest
//! clients). Both use native async fn in traits (Rust 2024 edition, no
//! async_trait macro).

pub mod dispatcher;

pub use dispatcher::{Delivery, LeadDispatcher};

use starclean_types::error::SubmissionError;
use starclean_types::lead::LeadPayload;

/// Posts a lead payload to a webhook endpoint.
///
/// One attempt per call. Implementations must not retry; callers decide what
/// to do with a failure.
pub trait LeadSink: Send + Sync {
    fn post(
        &self,
        endpoint: &str,
        payload: &LeadPayload,
    ) -> impl std::future::Future<Output = Result<(), SubmissionError>> + Send;
}

/// Resolves a US zip code to a city name.
///
/// Every failure (bad input, transport, unexpected body) resolves to `None`.
pub trait ZipLookup: Send + Sync {
    fn lookup_city(&self, zip: &str) -> impl std::future::Future<Output = Option<String>> + Send;
}

/// Exactly five ASCII digits.
pub fn is_valid_zip(zip: &str) -> bool {
    zip.len() == 5 && zip.bytes().all(|b| b.is_ascii_digit())
}
