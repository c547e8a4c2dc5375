//! Booking wizard state machine.
//!
//! [`BookingWizard`] is pure: it validates inputs and plans transitions but
//! never talks to the network. Planning and committing are separate so the
//! caller can run the transition's side effect (a webhook submission) first
//! and only move the wizard when that succeeds. [`BookingSession`] does
//! exactly that.

pub mod session;

pub use session::{BookingSession, SessionSnapshot};

use chrono::{DateTime, Utc};
use serde::Serialize;

use starclean_types::config::WizardConfig;
use starclean_types::error::WizardError;
use starclean_types::lead::{LeadPayload, Stage};
use starclean_types::quote::QuoteRequest;
use starclean_types::wizard::{WizardAction, WizardInput, WizardStep};

use crate::pricing::PriceCalculator;

/// A validated move between two steps, not yet applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Transition {
    pub action: WizardAction,
    pub from: WizardStep,
    pub to: WizardStep,
    /// Submission that must succeed before the move is committed.
    pub stage: Option<Stage>,
    /// Start over with a blank request when committed.
    pub reset: bool,
}

/// The multi-step quote and booking form.
#[derive(Debug, Clone)]
pub struct BookingWizard {
    config: WizardConfig,
    calculator: PriceCalculator,
    step: WizardStep,
    request: QuoteRequest,
    popup_shown: bool,
}

impl BookingWizard {
    /// A fresh wizard at the contact step with a blank request.
    pub fn new(config: WizardConfig, calculator: PriceCalculator) -> Self {
        Self::seeded(config, calculator, QuoteRequest::default())
    }

    /// A wizard at the contact step with a pre-filled request.
    pub fn seeded(config: WizardConfig, calculator: PriceCalculator, request: QuoteRequest) -> Self {
        let mut wizard = Self {
            config,
            calculator,
            step: WizardStep::Contact,
            request,
            popup_shown: false,
        };
        wizard.reprice();
        wizard
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn request(&self) -> &QuoteRequest {
        &self.request
    }

    pub fn config(&self) -> &WizardConfig {
        &self.config
    }

    /// The completion acknowledgment is on screen.
    pub fn popup_shown(&self) -> bool {
        self.popup_shown
    }

    /// Apply a single field edit. Pricing is recomputed after every edit
    /// that touches a pricing input.
    pub fn apply(&mut self, input: WizardInput) -> Result<(), WizardError> {
        if self.step == WizardStep::Confirmed {
            return Err(WizardError::Completed);
        }

        let reprice = input.affects_pricing();
        let request = &mut self.request;
        match input {
            WizardInput::FullName(v) => request.contact.full_name = v,
            WizardInput::Email(v) => request.contact.email = v,
            WizardInput::Phone(v) => request.contact.phone = v,
            WizardInput::Zip(v) => {
                request.contact.zip = v;
                // A stale city must not outlive the zip it came from.
                request.city = None;
                request.in_service_area = false;
            }
            WizardInput::Bedrooms(n) => request.home.set_bedrooms(n),
            WizardInput::Bathrooms(n) => request.home.set_bathrooms(n),
            WizardInput::HasDog(v) => request.home.has_dog = v,
            WizardInput::HasCat(v) => request.home.has_cat = v,
            WizardInput::Service(s) => request.selection.service = s,
            WizardInput::Frequency(f) => request.selection.frequency = f,
            WizardInput::Date(d) => request.select_date(d),
            WizardInput::Window(w) => {
                if request.appointment_date().is_none() {
                    return Err(WizardError::ScheduleIncomplete);
                }
                request.select_window(w);
            }
        }

        if reprice {
            self.reprice();
        }
        Ok(())
    }

    /// Record the outcome of a zip lookup.
    pub fn set_location(&mut self, city: Option<String>, in_service_area: bool) {
        self.request.in_service_area = city.is_some() && in_service_area;
        self.request.city = city;
    }

    /// Validate `action` against the current step and its guards.
    ///
    /// Never changes the wizard.
    pub fn plan(&self, action: WizardAction) -> Result<Transition, WizardError> {
        use WizardStep::*;

        let invalid = || WizardError::InvalidTransition {
            step: self.step,
            action,
        };
        let to = |to: WizardStep, stage: Option<Stage>| Transition {
            action,
            from: self.step,
            to,
            stage,
            reset: false,
        };

        match (action, self.step) {
            (WizardAction::Next, Contact) => {
                let missing = self.request.contact.missing(&self.config.required_fields);
                if !missing.is_empty() {
                    return Err(WizardError::MissingContactFields(missing));
                }
                Ok(to(HomeDetails, None))
            }
            (WizardAction::Next, HomeDetails) => Ok(to(PlanReview, None)),
            (WizardAction::Next, PlanReview) => Ok(to(PriceLocked, Some(Stage::QuoteRangeGenerated))),
            (WizardAction::Next, PriceLocked) if self.config.offer_scheduling => {
                Ok(to(Scheduling, None))
            }
            (WizardAction::Next, PriceLocked) | (WizardAction::SkipScheduling, PriceLocked) => {
                Ok(to(Confirmed, Some(Stage::WalkthroughSkipped)))
            }
            (WizardAction::Next, Scheduling) => {
                if !self.request.has_schedule() {
                    return Err(WizardError::ScheduleIncomplete);
                }
                Ok(to(Confirmed, Some(Stage::WalkthroughScheduled)))
            }
            (WizardAction::SkipScheduling, Scheduling) => {
                Ok(to(Confirmed, Some(Stage::WalkthroughSkipped)))
            }

            (WizardAction::Back, HomeDetails) => Ok(to(Contact, None)),
            (WizardAction::Back, PlanReview) => Ok(to(HomeDetails, None)),
            (WizardAction::Back, PriceLocked) => Ok(to(PlanReview, None)),
            (WizardAction::Back, Scheduling) => Ok(to(PriceLocked, None)),

            (WizardAction::Dismiss, Confirmed) if self.popup_shown => {
                let reset = self.config.reset_on_dismiss;
                Ok(Transition {
                    to: if reset { Contact } else { Confirmed },
                    reset,
                    ..to(Confirmed, None)
                })
            }

            _ => Err(invalid()),
        }
    }

    /// Apply a planned transition.
    ///
    /// The transition must come from [`plan`](Self::plan) on this wizard in
    /// its current state.
    pub fn commit(&mut self, transition: Transition) {
        debug_assert_eq!(transition.from, self.step);

        if transition.stage == Some(Stage::WalkthroughSkipped) {
            self.request.clear_schedule();
        }

        match transition.action {
            WizardAction::Dismiss => {
                self.popup_shown = false;
                if transition.reset {
                    self.request = QuoteRequest::default();
                    self.reprice();
                }
            }
            _ => {
                if transition.to == WizardStep::Confirmed {
                    self.popup_shown = true;
                }
            }
        }

        self.step = transition.to;
    }

    /// Plan and commit in one go, for transitions without a side effect.
    ///
    /// Transitions that carry a stage are rejected with the planned
    /// transition's error so callers cannot skip a submission by accident.
    pub fn advance(&mut self, action: WizardAction) -> Result<WizardStep, WizardError> {
        let transition = self.plan(action)?;
        if transition.stage.is_some() {
            return Err(WizardError::InvalidTransition {
                step: self.step,
                action,
            });
        }
        self.commit(transition);
        Ok(self.step)
    }

    /// Payload describing the request at `stage`.
    ///
    /// A skipped walkthrough never carries an appointment, even if one was
    /// picked before skipping.
    pub fn payload(&self, stage: Stage, submitted_at: DateTime<Utc>) -> LeadPayload {
        let mut payload = LeadPayload::from_request(&self.request, stage, submitted_at);
        if stage == Stage::WalkthroughSkipped {
            payload.appointment_date = None;
            payload.appointment_window = None;
        }
        payload
    }

    fn reprice(&mut self) {
        let quote = self
            .calculator
            .quote(&self.request.home, &self.request.selection);
        self.request.pricing = Some(quote);
    }
}
