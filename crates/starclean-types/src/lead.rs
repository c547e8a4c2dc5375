//! Lead payloads posted to the external webhooks.
//!
//! Every submission carries a [`Stage`] that decides which endpoint receives
//! it. Field names are camelCase on the wire to match what the ingestion
//! workflow already expects from the landing page.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use std::fmt;
use std::str::FromStr;

use crate::quote::{LeadCapture, QuoteRequest};

/// Funnel checkpoint a submission belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Short form from the hero section or main booking form.
    LeadCaptured,
    /// Visitor reached the price-locked step.
    QuoteRangeGenerated,
    /// Visitor picked a date and window for the walkthrough.
    WalkthroughScheduled,
    /// Visitor finished without scheduling.
    WalkthroughSkipped,
}

impl Stage {
    pub fn label(&self) -> &'static str {
        match self {
            Stage::LeadCaptured => "Lead Captured",
            Stage::QuoteRangeGenerated => "Quote Range Generated",
            Stage::WalkthroughScheduled => "Walkthrough Scheduled",
            Stage::WalkthroughSkipped => "Walkthrough Skipped",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Stage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "lead captured" | "lead_captured" => Ok(Stage::LeadCaptured),
            "quote range generated" | "quote_range_generated" => Ok(Stage::QuoteRangeGenerated),
            "walkthrough scheduled" | "walkthrough_scheduled" => Ok(Stage::WalkthroughScheduled),
            "walkthrough skipped" | "walkthrough_skipped" => Ok(Stage::WalkthroughSkipped),
            other => Err(format!("unknown stage: '{other}'")),
        }
    }
}

impl Serialize for Stage {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

impl<'de> Deserialize<'de> for Stage {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        label.parse().map_err(serde::de::Error::custom)
    }
}

/// JSON body posted to a webhook.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadPayload {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub zip_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frequency: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bedrooms: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bathrooms: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_dog: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_cat: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_price: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initial_price_min: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initial_price_max: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recurring_price_min: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recurring_price_max: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub savings: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pricing_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub appointment_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub appointment_window: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub form_source: Option<String>,
    pub stage: Stage,
    pub submitted_at: DateTime<Utc>,
}

impl LeadPayload {
    /// Snapshot a wizard request for the given stage.
    pub fn from_request(request: &QuoteRequest, stage: Stage, submitted_at: DateTime<Utc>) -> Self {
        let pricing = request.pricing.as_ref();
        Self {
            full_name: request.contact.full_name.trim().to_string(),
            email: request.contact.email.trim().to_string(),
            phone: request.contact.phone.trim().to_string(),
            zip_code: request.contact.zip.trim().to_string(),
            city: request.city.clone(),
            service_type: Some(request.selection.service.label().to_string()),
            frequency: Some(request.selection.frequency.label().to_string()),
            bedrooms: Some(request.home.bedrooms()),
            bathrooms: Some(request.home.bathrooms()),
            has_dog: Some(request.home.has_dog),
            has_cat: Some(request.home.has_cat),
            base_price: pricing.map(|p| p.base),
            initial_price_min: pricing.map(|p| p.initial.min),
            initial_price_max: pricing.map(|p| p.initial.max),
            recurring_price_min: pricing.and_then(|p| p.recurring.map(|r| r.min)),
            recurring_price_max: pricing.and_then(|p| p.recurring.map(|r| r.max)),
            savings: pricing.map(|p| p.savings),
            pricing_version: pricing.map(|p| p.version.clone()),
            appointment_date: request.appointment_date(),
            appointment_window: request.appointment_window().map(|w| w.label()),
            form_source: request.form_source.clone(),
            stage,
            submitted_at,
        }
    }

    /// Payload for a short-form capture (stage `Lead Captured`).
    pub fn from_capture(capture: &LeadCapture, submitted_at: DateTime<Utc>) -> Self {
        Self {
            full_name: capture.full_name(),
            email: capture.email.trim().to_string(),
            phone: capture.phone.trim().to_string(),
            zip_code: capture.zip_code.trim().to_string(),
            city: None,
            service_type: capture.service.map(|s| s.label().to_string()),
            frequency: capture.frequency.map(|f| f.label().to_string()),
            bedrooms: None,
            bathrooms: None,
            has_dog: None,
            has_cat: None,
            base_price: None,
            initial_price_min: None,
            initial_price_max: None,
            recurring_price_min: None,
            recurring_price_max: None,
            savings: None,
            pricing_version: None,
            appointment_date: None,
            appointment_window: None,
            form_source: Some(capture.form_source.clone()),
            stage: Stage::LeadCaptured,
            submitted_at,
        }
    }
}
