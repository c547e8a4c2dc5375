use thiserror::Error;

use crate::quote::ContactField;
use crate::wizard::{WizardAction, WizardStep};

/// Validation and navigation errors raised by the booking wizard.
///
/// The wizard never changes step when it returns one of these.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WizardError {
    #[error("please fill in: {}", join_fields(.0))]
    MissingContactFields(Vec<ContactField>),

    #[error("please pick both a date and an arrival time")]
    ScheduleIncomplete,

    #[error("that arrival time is already booked, please pick another")]
    SlotUnavailable,

    #[error("date {0} is not an available appointment date")]
    DateUnavailable(chrono::NaiveDate),

    #[error("cannot {action} from the {step} step")]
    InvalidTransition {
        step: WizardStep,
        action: WizardAction,
    },

    #[error("this booking is already confirmed")]
    Completed,
}

fn join_fields(fields: &[ContactField]) -> String {
    fields
        .iter()
        .map(|f| f.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Errors from posting a lead to a webhook.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmissionError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("webhook responded with status {0}")]
    Status(u16),

    /// The request could not be built (bad endpoint URL or body encoding).
    #[error("invalid webhook request: {0}")]
    Request(String),
}

/// Errors from the booking flow, combining validation and delivery failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BookingError {
    #[error(transparent)]
    Wizard(#[from] WizardError),

    /// Delivery failed; the visitor is asked to call instead.
    #[error("we couldn't send your request, please call us directly at {fallback_phone}")]
    Submission {
        source: SubmissionError,
        fallback_phone: String,
    },
}

/// Errors in a loaded configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("invalid pricing config: {0}")]
    InvalidPricing(String),

    #[error("invalid availability config: {0}")]
    InvalidAvailability(String),
}
