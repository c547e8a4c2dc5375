//! Quote engine service.
//!
//! `BookingEngine` is generic over the two ports so the api crate can pin it
//! to the reqwest adapters while tests use in-memory ones. It is cheap to
//! clone; the slot book and both adapters are shared between clones.

use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::debug;

use starclean_types::config::{GlobalConfig, WizardConfig};
use starclean_types::error::BookingError;
use starclean_types::lead::LeadPayload;
use starclean_types::quote::{HomeProfile, LeadCapture, PriceQuote, QuoteRequest, ServiceSelection};
use starclean_types::schedule::Slot;

use crate::area::ServiceAreas;
use crate::availability::Availability;
use crate::lead::{LeadDispatcher, LeadSink, ZipLookup, is_valid_zip};
use crate::pricing::PriceCalculator;
use crate::wizard::{BookingSession, BookingWizard};

/// Result of a standalone zip lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ZipInfo {
    pub zip: String,
    pub city: Option<String>,
    /// The city is one of the configured service areas.
    pub served: bool,
}

/// Entry point for pricing, availability, lead capture and wizard sessions.
pub struct BookingEngine<S: LeadSink, Z: ZipLookup> {
    calculator: PriceCalculator,
    availability: Availability,
    areas: ServiceAreas,
    dispatcher: LeadDispatcher<S>,
    zip_lookup: Arc<Z>,
    wizard_config: WizardConfig,
}

impl<S: LeadSink, Z: ZipLookup> Clone for BookingEngine<S, Z> {
    fn clone(&self) -> Self {
        Self {
            calculator: self.calculator.clone(),
            availability: self.availability.clone(),
            areas: self.areas.clone(),
            dispatcher: self.dispatcher.clone(),
            zip_lookup: Arc::clone(&self.zip_lookup),
            wizard_config: self.wizard_config.clone(),
        }
    }
}

impl<S: LeadSink, Z: ZipLookup> BookingEngine<S, Z> {
    pub fn new(config: &GlobalConfig, sink: S, zip_lookup: Z) -> Self {
        Self {
            calculator: PriceCalculator::new(config.pricing.clone()),
            availability: Availability::new(&config.availability),
            areas: ServiceAreas::new(&config.business.service_areas),
            dispatcher: LeadDispatcher::new(
                Arc::new(sink),
                config.webhooks.clone(),
                config.business.fallback_phone.clone(),
            ),
            zip_lookup: Arc::new(zip_lookup),
            wizard_config: config.wizard.clone(),
        }
    }

    pub fn calculator(&self) -> &PriceCalculator {
        &self.calculator
    }

    pub fn availability(&self) -> &Availability {
        &self.availability
    }

    pub fn dispatcher(&self) -> &LeadDispatcher<S> {
        &self.dispatcher
    }

    pub fn quote(&self, home: &HomeProfile, selection: &ServiceSelection) -> PriceQuote {
        self.calculator.quote(home, selection)
    }

    pub fn dates(&self, today: NaiveDate) -> Vec<NaiveDate> {
        self.availability.dates(today)
    }

    pub fn slots_for(&self, date: NaiveDate) -> Vec<Slot> {
        self.availability.slots_for(date)
    }

    /// Resolve a zip code to a city and check it against the service areas.
    ///
    /// Malformed input never reaches the lookup.
    pub async fn lookup_zip(&self, zip: &str) -> ZipInfo {
        let zip = zip.trim();
        let city = if is_valid_zip(zip) {
            self.zip_lookup.lookup_city(zip).await
        } else {
            debug!(zip, "not a five digit zip, skipping lookup");
            None
        };
        let served = city.as_deref().is_some_and(|c| self.areas.serves(c));
        ZipInfo {
            zip: zip.to_string(),
            city,
            served,
        }
    }

    /// Submit a short-form lead (stage `Lead Captured`).
    pub async fn capture(&self, capture: &LeadCapture) -> Result<LeadPayload, BookingError> {
        self.dispatcher.capture(capture).await
    }

    /// Start a wizard session for a visitor arriving on `today`.
    ///
    /// With a seed, the request is pre-filled from the short form and its zip
    /// is resolved right away.
    pub async fn start_session(
        &self,
        today: NaiveDate,
        seed: Option<&LeadCapture>,
    ) -> BookingSession<S, Z> {
        let request = seed.map(QuoteRequest::from_capture).unwrap_or_default();
        let zip = request.contact.zip.clone();

        let mut wizard =
            BookingWizard::seeded(self.wizard_config.clone(), self.calculator.clone(), request);
        if seed.is_some() && is_valid_zip(&zip) {
            let info = self.lookup_zip(&zip).await;
            wizard.set_location(info.city, info.served);
        }

        BookingSession::new(
            wizard,
            self.dispatcher.clone(),
            Arc::clone(&self.zip_lookup),
            self.availability.clone(),
            self.areas.clone(),
            today,
        )
    }
}
