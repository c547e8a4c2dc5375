//! Zip-code geocoder client.
//!
//! Implements `ZipLookup` against a zippopotam.us style API:
//! `GET {base_url}/{zip}` answering `{"places": [{"place name": "..."}]}`.

use serde::Deserialize;
use tracing::debug;

use starclean_core::lead::{ZipLookup, is_valid_zip};

const DEFAULT_BASE_URL: &str = "https://api.zippopotam.us/us";

#[derive(Debug, Deserialize)]
struct ZipResponse {
    #[serde(default)]
    places: Vec<Place>,
}

#[derive(Debug, Deserialize)]
struct Place {
    #[serde(rename = "place name")]
    place_name: String,
}

/// Resolves zip codes to city names over HTTP.
#[derive(Debug, Clone)]
pub struct ZippopotamClient {
    base_url: String,
    http: reqwest::Client,
}

impl ZippopotamClient {
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Point the client at another host (tests, mirrors).
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        let http = reqwest::Client::builder()
            .user_agent(concat!("starclean-quote-engine/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_default();
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http,
        }
    }

    async fn fetch(&self, zip: &str) -> anyhow::Result<Option<String>> {
        use anyhow::Context;

        let url = format!("{}/{zip}", self.base_url);
        let response: ZipResponse = self
            .http
            .get(&url)
            .send()
            .await
            .with_context(|| format!("failed to reach geocoder at {url}"))?
            .error_for_status()
            .context("geocoder returned an error status")?
            .json()
            .await
            .context("failed to parse geocoder response")?;

        Ok(response
            .places
            .into_iter()
            .next()
            .map(|p| p.place_name.trim().to_string())
            .filter(|name| !name.is_empty()))
    }
}

impl Default for ZippopotamClient {
    fn default() -> Self {
        Self::new()
    }
}

impl ZipLookup for ZippopotamClient {
    async fn lookup_city(&self, zip: &str) -> Option<String> {
        let zip = zip.trim();
        if !is_valid_zip(zip) {
            return None;
        }
        match self.fetch(zip).await {
            Ok(city) => city,
            Err(e) => {
                debug!(zip, error = %format!("{e:#}"), "zip lookup failed");
                None
            }
        }
    }
}
