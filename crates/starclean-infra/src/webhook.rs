//! Webhook lead sink.
//!
//! Implements `LeadSink` with a plain JSON `POST`. The endpoint decides
//! success by status code only; the response body is never read.

use tracing::debug;

use starclean_core::lead::LeadSink;
use starclean_types::error::SubmissionError;
use starclean_types::lead::LeadPayload;

/// Posts lead payloads with reqwest.
#[derive(Debug, Clone)]
pub struct HttpLeadSink {
    http: reqwest::Client,
}

impl HttpLeadSink {
    pub fn new() -> Self {
        let http = reqwest::Client::builder()
            .user_agent(concat!("starclean-quote-engine/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_default();
        Self { http }
    }

    /// Use an existing client (shared connection pool).
    pub fn with_client(http: reqwest::Client) -> Self {
        Self { http }
    }
}

impl Default for HttpLeadSink {
    fn default() -> Self {
        Self::new()
    }
}

impl LeadSink for HttpLeadSink {
    async fn post(&self, endpoint: &str, payload: &LeadPayload) -> Result<(), SubmissionError> {
        let response = self
            .http
            .post(endpoint)
            .json(payload)
            .send()
            .await
            .map_err(|e| {
                if e.is_builder() {
                    SubmissionError::Request(e.to_string())
                } else {
                    SubmissionError::Transport(e.to_string())
                }
            })?;

        let status = response.status();
        debug!(endpoint, status = status.as_u16(), stage = %payload.stage, "webhook responded");

        if status.is_success() {
            Ok(())
        } else {
            Err(SubmissionError::Status(status.as_u16()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::{Arc, Mutex};

    use axum::Json;
    use axum::Router;
    use axum::extract::State;
    use axum::http::StatusCode;
    use axum::routing::post;
    use chrono::Utc;
    use starclean_types::lead::Stage;
    use starclean_types::quote::QuoteRequest;

    type Received = Arc<Mutex<Vec<serde_json::Value>>>;

    /// Start a local webhook receiver. `/ok` accepts, `/fail` answers 500.
    async fn spawn_receiver() -> (String, Received) {
        let received: Received = Arc::default();

        async fn accept(
            State(received): State<Received>,
            Json(body): Json<serde_json::Value>,
        ) -> StatusCode {
            received.lock().unwrap().push(body);
            StatusCode::OK
        }

        async fn reject() -> StatusCode {
            StatusCode::INTERNAL_SERVER_ERROR
        }

        let app = Router::new()
            .route("/ok", post(accept))
            .route("/fail", post(reject))
            .with_state(received.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        (format!("http://{addr}"), received)
    }

    fn payload() -> LeadPayload {
        let mut request = QuoteRequest::default();
        request.contact.full_name = "Jane Doe".to_string();
        request.contact.zip = "29401".to_string();
        LeadPayload::from_request(&request, Stage::QuoteRangeGenerated, Utc::now())
    }

    #[tokio::test]
    async fn test_post_sends_camel_case_json() {
        let (base, received) = spawn_receiver().await;
        let sink = HttpLeadSink::new();

        sink.post(&format!("{base}/ok"), &payload()).await.unwrap();

        let bodies = received.lock().unwrap().clone();
        assert_eq!(bodies.len(), 1);
        assert_eq!(bodies[0]["fullName"], "Jane Doe");
        assert_eq!(bodies[0]["zipCode"], "29401");
        assert_eq!(bodies[0]["stage"], "Quote Range Generated");
    }

    #[tokio::test]
    async fn test_non_success_status_is_an_error() {
        let (base, _received) = spawn_receiver().await;
        let sink = HttpLeadSink::new();

        let err = sink.post(&format!("{base}/fail"), &payload()).await.unwrap_err();
        assert_eq!(err, SubmissionError::Status(500));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_transport_error() {
        // Bind then drop to get a port nobody listens on.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let sink = HttpLeadSink::new();
        let err = sink
            .post(&format!("http://{addr}/ok"), &payload())
            .await
            .unwrap_err();
        assert!(matches!(err, SubmissionError::Transport(_)));
    }

    #[tokio::test]
    async fn test_malformed_endpoint_is_request_error() {
        let sink = HttpLeadSink::new();
        let err = sink.post("not a url", &payload()).await.unwrap_err();
        assert!(matches!(err, SubmissionError::Request(_)));
    }
}
