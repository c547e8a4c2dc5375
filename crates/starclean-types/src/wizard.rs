//! Booking wizard steps, actions and inputs.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use std::fmt;
use std::str::FromStr;

use crate::quote::{Frequency, ServiceType};
use crate::schedule::ArrivalWindow;

/// Ordered steps of the booking wizard.
///
/// - Contact: name, email, phone, zip
/// - HomeDetails: bedrooms, bathrooms, pets
/// - PlanReview: service type, frequency and the live price
/// - PriceLocked: quote submitted, visitor chooses to schedule or finish
/// - Scheduling: date and arrival window for the walkthrough
/// - Confirmed: booking acknowledged (terminal)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WizardStep {
    Contact,
    HomeDetails,
    PlanReview,
    PriceLocked,
    Scheduling,
    Confirmed,
}

impl WizardStep {
    /// Zero-based position in the step sequence.
    pub fn index(&self) -> usize {
        match self {
            WizardStep::Contact => 0,
            WizardStep::HomeDetails => 1,
            WizardStep::PlanReview => 2,
            WizardStep::PriceLocked => 3,
            WizardStep::Scheduling => 4,
            WizardStep::Confirmed => 5,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            WizardStep::Contact => "Your contact info",
            WizardStep::HomeDetails => "Tell us about your home",
            WizardStep::PlanReview => "Pick your plan",
            WizardStep::PriceLocked => "Your price is locked in",
            WizardStep::Scheduling => "Schedule your walkthrough",
            WizardStep::Confirmed => "You're all set",
        }
    }
}

impl fmt::Display for WizardStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WizardStep::Contact => write!(f, "contact"),
            WizardStep::HomeDetails => write!(f, "home_details"),
            WizardStep::PlanReview => write!(f, "plan_review"),
            WizardStep::PriceLocked => write!(f, "price_locked"),
            WizardStep::Scheduling => write!(f, "scheduling"),
            WizardStep::Confirmed => write!(f, "confirmed"),
        }
    }
}

/// Navigation requested by the visitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WizardAction {
    Next,
    Back,
    SkipScheduling,
    Dismiss,
}

impl fmt::Display for WizardAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WizardAction::Next => write!(f, "next"),
            WizardAction::Back => write!(f, "back"),
            WizardAction::SkipScheduling => write!(f, "skip_scheduling"),
            WizardAction::Dismiss => write!(f, "dismiss"),
        }
    }
}

impl FromStr for WizardAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "next" => Ok(WizardAction::Next),
            "back" => Ok(WizardAction::Back),
            "skip" | "skip_scheduling" => Ok(WizardAction::SkipScheduling),
            "dismiss" => Ok(WizardAction::Dismiss),
            other => Err(format!("invalid wizard action: '{other}'")),
        }
    }
}

/// A single field edit coming from the form.
///
/// JSON shape: `{"field": "bedrooms", "value": 3}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "field", content = "value", rename_all = "snake_case")]
pub enum WizardInput {
    FullName(String),
    Email(String),
    Phone(String),
    Zip(String),
    Bedrooms(u8),
    Bathrooms(u8),
    HasDog(bool),
    HasCat(bool),
    Service(ServiceType),
    Frequency(Frequency),
    Date(NaiveDate),
    Window(ArrivalWindow),
}

impl WizardInput {
    /// Whether this input changes a pricing input.
    pub fn affects_pricing(&self) -> bool {
        matches!(
            self,
            WizardInput::Bedrooms(_)
                | WizardInput::Bathrooms(_)
                | WizardInput::HasDog(_)
                | WizardInput::HasCat(_)
                | WizardInput::Service(_)
                | WizardInput::Frequency(_)
        )
    }
}
