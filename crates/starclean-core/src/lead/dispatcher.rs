//! Stage-based routing of lead payloads to webhook endpoints.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};

use starclean_types::config::WebhookConfig;
use starclean_types::error::{BookingError, WizardError};
use starclean_types::lead::{LeadPayload, Stage};
use starclean_types::quote::LeadCapture;

use super::LeadSink;

/// Outcome of a labelled submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    /// Posted to this endpoint.
    Sent { endpoint: String },
    /// The stage label matched no route; nothing was sent.
    Skipped,
}

/// Picks the endpoint for a payload's stage and posts it through a
/// [`LeadSink`].
///
/// Failures are logged and turned into [`BookingError::Submission`] carrying
/// the fallback phone number shown to the visitor.
pub struct LeadDispatcher<S: LeadSink> {
    sink: Arc<S>,
    webhooks: WebhookConfig,
    fallback_phone: String,
}

impl<S: LeadSink> Clone for LeadDispatcher<S> {
    fn clone(&self) -> Self {
        Self {
            sink: Arc::clone(&self.sink),
            webhooks: self.webhooks.clone(),
            fallback_phone: self.fallback_phone.clone(),
        }
    }
}

impl<S: LeadSink> LeadDispatcher<S> {
    pub fn new(sink: Arc<S>, webhooks: WebhookConfig, fallback_phone: impl Into<String>) -> Self {
        Self {
            sink,
            webhooks,
            fallback_phone: fallback_phone.into(),
        }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn fallback_phone(&self) -> &str {
        &self.fallback_phone
    }

    pub fn endpoint_for(&self, stage: Stage) -> &str {
        match stage {
            Stage::LeadCaptured => &self.webhooks.lead_url,
            Stage::QuoteRangeGenerated => &self.webhooks.quote_url,
            Stage::WalkthroughScheduled | Stage::WalkthroughSkipped => {
                &self.webhooks.scheduling_url
            }
        }
    }

    /// Post the payload to the endpoint of its stage. Returns the endpoint.
    pub async fn submit(&self, payload: &LeadPayload) -> Result<String, BookingError> {
        let endpoint = self.endpoint_for(payload.stage).to_string();
        debug!(stage = %payload.stage, endpoint = %endpoint, "submitting lead");

        match self.sink.post(&endpoint, payload).await {
            Ok(()) => {
                info!(stage = %payload.stage, endpoint = %endpoint, "lead delivered");
                Ok(endpoint)
            }
            Err(source) => {
                warn!(
                    stage = %payload.stage,
                    endpoint = %endpoint,
                    error = %source,
                    "lead submission failed"
                );
                Err(BookingError::Submission {
                    source,
                    fallback_phone: self.fallback_phone.clone(),
                })
            }
        }
    }

    /// Submit under a free-form stage label.
    ///
    /// An unknown label makes no network call and yields [`Delivery::Skipped`].
    pub async fn submit_as(
        &self,
        label: &str,
        mut payload: LeadPayload,
    ) -> Result<Delivery, BookingError> {
        let Ok(stage) = label.parse::<Stage>() else {
            debug!(label, "no route for stage label, skipping submission");
            return Ok(Delivery::Skipped);
        };
        payload.stage = stage;
        let endpoint = self.submit(&payload).await?;
        Ok(Delivery::Sent { endpoint })
    }

    /// Validate and submit a short-form capture with stage `Lead Captured`.
    pub async fn capture(&self, capture: &LeadCapture) -> Result<LeadPayload, BookingError> {
        let missing = capture.missing();
        if !missing.is_empty() {
            return Err(WizardError::MissingContactFields(missing).into());
        }
        let payload = LeadPayload::from_capture(capture, Utc::now());
        self.submit(&payload).await?;
        Ok(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lead::testing::RecordingSink;
    use starclean_types::error::SubmissionError;
    use starclean_types::quote::{ContactField, QuoteRequest};

    fn dispatcher(sink: RecordingSink) -> LeadDispatcher<RecordingSink> {
        LeadDispatcher::new(
            Arc::new(sink),
            WebhookConfig {
                lead_url: "https://hooks.test/lead".to_string(),
                quote_url: "https://hooks.test/quote".to_string(),
                scheduling_url: "https://hooks.test/schedule".to_string(),
            },
            "(843) 297-9935",
        )
    }

    fn payload(stage: Stage) -> LeadPayload {
        let mut request = QuoteRequest::default();
        request.contact.full_name = "Jane Doe".to_string();
        LeadPayload::from_request(&request, stage, Utc::now())
    }

    #[tokio::test]
    async fn test_quote_stage_posts_only_to_quote_endpoint() {
        let dispatcher = dispatcher(RecordingSink::default());
        let endpoint = dispatcher
            .submit(&payload(Stage::QuoteRangeGenerated))
            .await
            .unwrap();

        assert_eq!(endpoint, "https://hooks.test/quote");
        assert_eq!(dispatcher.sink().endpoints(), vec!["https://hooks.test/quote"]);
    }

    #[tokio::test]
    async fn test_scheduled_stage_posts_only_to_scheduling_endpoint() {
        let dispatcher = dispatcher(RecordingSink::default());
        dispatcher
            .submit(&payload(Stage::WalkthroughScheduled))
            .await
            .unwrap();

        let calls = dispatcher.sink().calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "https://hooks.test/schedule");
        assert_eq!(calls[0].1.stage, Stage::WalkthroughScheduled);
    }

    #[tokio::test]
    async fn test_skipped_stage_shares_scheduling_endpoint() {
        let dispatcher = dispatcher(RecordingSink::default());
        assert_eq!(
            dispatcher.endpoint_for(Stage::WalkthroughSkipped),
            dispatcher.endpoint_for(Stage::WalkthroughScheduled)
        );
        assert_eq!(
            dispatcher.endpoint_for(Stage::LeadCaptured),
            "https://hooks.test/lead"
        );
    }

    #[tokio::test]
    async fn test_unknown_label_makes_no_call() {
        let dispatcher = dispatcher(RecordingSink::default());
        let delivery = dispatcher
            .submit_as("Price Locked", payload(Stage::LeadCaptured))
            .await
            .unwrap();

        assert_eq!(delivery, Delivery::Skipped);
        assert!(dispatcher.sink().calls().is_empty());
    }

    #[tokio::test]
    async fn test_known_label_overrides_payload_stage() {
        let dispatcher = dispatcher(RecordingSink::default());
        let delivery = dispatcher
            .submit_as("Quote Range Generated", payload(Stage::LeadCaptured))
            .await
            .unwrap();

        assert_eq!(
            delivery,
            Delivery::Sent {
                endpoint: "https://hooks.test/quote".to_string()
            }
        );
        assert_eq!(
            dispatcher.sink().calls()[0].1.stage,
            Stage::QuoteRangeGenerated
        );
    }

    #[tokio::test]
    async fn test_failure_carries_fallback_phone() {
        let dispatcher = dispatcher(RecordingSink::failing());
        let err = dispatcher
            .submit(&payload(Stage::QuoteRangeGenerated))
            .await
            .unwrap_err();

        match err {
            BookingError::Submission {
                source,
                fallback_phone,
            } => {
                assert_eq!(source, SubmissionError::Status(503));
                assert_eq!(fallback_phone, "(843) 297-9935");
            }
            other => panic!("expected submission error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_capture_requires_fields() {
        let dispatcher = dispatcher(RecordingSink::default());
        let capture = LeadCapture {
            first_name: "Jane".to_string(),
            last_name: "Doe".to_string(),
            email: String::new(),
            phone: "(843) 555-0100".to_string(),
            zip_code: "29401".to_string(),
            service: None,
            frequency: None,
            form_source: "Hero Section Quote".to_string(),
        };

        let err = dispatcher.capture(&capture).await.unwrap_err();
        assert_eq!(
            err,
            BookingError::Wizard(WizardError::MissingContactFields(vec![ContactField::Email]))
        );
        assert!(dispatcher.sink().calls().is_empty());

        let capture = LeadCapture {
            email: "jane@example.com".to_string(),
            ..capture
        };
        let payload = dispatcher.capture(&capture).await.unwrap();
        assert_eq!(payload.stage, Stage::LeadCaptured);
        assert_eq!(dispatcher.sink().endpoints(), vec!["https://hooks.test/lead"]);
    }
}
