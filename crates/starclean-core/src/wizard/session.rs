//! A wizard bound to its collaborators: lead dispatch, zip lookup and the
//! shared slot book.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use serde::Serialize;
use tracing::{debug, info};

use starclean_types::error::{BookingError, WizardError};
use starclean_types::lead::Stage;
use starclean_types::quote::QuoteRequest;
use starclean_types::schedule::{Slot, SlotKey};
use starclean_types::wizard::{WizardAction, WizardInput, WizardStep};

use crate::area::ServiceAreas;
use crate::availability::Availability;
use crate::lead::{LeadDispatcher, LeadSink, ZipLookup, is_valid_zip};
use crate::session::VisitorSession;

use super::BookingWizard;

/// Serializable view of a session, as shown to the front end.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub step: WizardStep,
    pub step_index: usize,
    pub step_title: &'static str,
    pub request: QuoteRequest,
    pub popup_shown: bool,
    /// Appointment dates on offer, only while scheduling.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub dates: Vec<NaiveDate>,
    /// Windows for the selected date, only while scheduling.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub slots: Vec<Slot>,
}

/// One visitor's run through the booking wizard.
///
/// Inputs are validated against availability and the zip lookup; actions
/// submit their stage first and only move the wizard once the submission
/// succeeded. A failed submission leaves the step unchanged, so re-issuing
/// the same action retries it.
pub struct BookingSession<S: LeadSink, Z: ZipLookup> {
    wizard: BookingWizard,
    visitor: VisitorSession,
    dispatcher: LeadDispatcher<S>,
    zip_lookup: Arc<Z>,
    availability: Availability,
    areas: ServiceAreas,
    today: NaiveDate,
}

impl<S: LeadSink, Z: ZipLookup> BookingSession<S, Z> {
    pub fn new(
        wizard: BookingWizard,
        dispatcher: LeadDispatcher<S>,
        zip_lookup: Arc<Z>,
        availability: Availability,
        areas: ServiceAreas,
        today: NaiveDate,
    ) -> Self {
        Self {
            wizard,
            visitor: VisitorSession::new(),
            dispatcher,
            zip_lookup,
            availability,
            areas,
            today,
        }
    }

    pub fn step(&self) -> WizardStep {
        self.wizard.step()
    }

    pub fn request(&self) -> &QuoteRequest {
        self.wizard.request()
    }

    pub fn popup_shown(&self) -> bool {
        self.wizard.popup_shown()
    }

    pub fn wizard(&self) -> &BookingWizard {
        &self.wizard
    }

    /// Dates the visitor can pick from.
    pub fn dates(&self) -> Vec<NaiveDate> {
        self.availability.dates(self.today)
    }

    /// Windows for the currently selected date, empty without a date.
    pub fn slots(&self) -> Vec<Slot> {
        self.request()
            .appointment_date()
            .map(|date| self.availability.slots_for(date))
            .unwrap_or_default()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let scheduling = self.step() == WizardStep::Scheduling;
        SessionSnapshot {
            step: self.step(),
            step_index: self.step().index(),
            step_title: self.step().title(),
            request: self.request().clone(),
            popup_shown: self.popup_shown(),
            dates: if scheduling { self.dates() } else { Vec::new() },
            slots: if scheduling { self.slots() } else { Vec::new() },
        }
    }

    /// Apply a field edit.
    ///
    /// A zip edit triggers a city lookup when it looks like a zip code; the
    /// result replaces whatever the previous lookup found.
    pub async fn input(&mut self, input: WizardInput) -> Result<(), BookingError> {
        match &input {
            WizardInput::Date(date) if !self.availability.is_offered(self.today, *date) => {
                return Err(WizardError::DateUnavailable(*date).into());
            }
            WizardInput::Window(window) => {
                if let Some(date) = self.request().appointment_date() {
                    let key = SlotKey {
                        date,
                        window: *window,
                    };
                    if !self.availability.is_free(&key) {
                        return Err(WizardError::SlotUnavailable.into());
                    }
                }
            }
            _ => {}
        }

        let zip = match &input {
            WizardInput::Zip(zip) => Some(zip.trim().to_string()),
            _ => None,
        };

        self.wizard.apply(input)?;

        if let Some(zip) = zip.filter(|z| is_valid_zip(z)) {
            let city = self.zip_lookup.lookup_city(&zip).await;
            let served = city.as_deref().is_some_and(|c| self.areas.serves(c));
            debug!(zip = %zip, city = ?city, served, "zip lookup finished");
            self.wizard.set_location(city, served);
        }
        Ok(())
    }

    /// Perform a navigation action, running its submission first.
    pub async fn act(&mut self, action: WizardAction) -> Result<WizardStep, BookingError> {
        let transition = self.wizard.plan(action)?;

        let slot = if transition.stage == Some(Stage::WalkthroughScheduled) {
            let request = self.request();
            match (request.appointment_date(), request.appointment_window()) {
                (Some(date), Some(window)) => Some(SlotKey { date, window }),
                _ => return Err(WizardError::ScheduleIncomplete.into()),
            }
        } else {
            None
        };

        // Held while the submission is in flight; any early return
        // releases it.
        let claim = match slot {
            Some(key) => Some(
                self.availability
                    .claim(key)
                    .ok_or(WizardError::SlotUnavailable)?,
            ),
            None => None,
        };

        if let Some(stage) = transition.stage {
            let payload = self.wizard.payload(stage, Utc::now());
            self.dispatcher.submit(&payload).await?;
        }

        if let Some(claim) = claim {
            claim.keep();
        }

        self.wizard.commit(transition);
        info!(
            action = %action,
            from = %transition.from,
            to = %transition.to,
            "wizard step changed"
        );
        Ok(self.step())
    }

    /// See [`VisitorSession::offer_exit_intent`].
    pub fn offer_exit_intent(&mut self, pointer_y: i32) -> bool {
        self.visitor.offer_exit_intent(pointer_y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lead::testing::{RecordingSink, StaticZipLookup};
    use crate::pricing::PriceCalculator;
    use starclean_types::config::{BusinessConfig, WebhookConfig, WizardConfig};
    use starclean_types::schedule::ArrivalWindow;

    fn today() -> NaiveDate {
        // Monday
        NaiveDate::from_ymd_opt(2026, 3, 2).unwrap()
    }

    fn session_with(
        sink: RecordingSink,
        availability: Availability,
    ) -> BookingSession<RecordingSink, StaticZipLookup> {
        BookingSession::new(
            BookingWizard::new(WizardConfig::default(), PriceCalculator::default()),
            LeadDispatcher::new(Arc::new(sink), WebhookConfig::default(), "(843) 297-9935"),
            Arc::new(StaticZipLookup::with(&[("29401", "Charleston"), ("29201", "Columbia")])),
            availability,
            ServiceAreas::new(BusinessConfig::default().service_areas),
            today(),
        )
    }

    fn session() -> BookingSession<RecordingSink, StaticZipLookup> {
        session_with(RecordingSink::default(), Availability::default())
    }

    async fn fill_contact(session: &mut BookingSession<RecordingSink, StaticZipLookup>) {
        session.input(WizardInput::FullName("Jane Doe".into())).await.unwrap();
        session.input(WizardInput::Email("jane@example.com".into())).await.unwrap();
        session.input(WizardInput::Phone("(843) 555-0100".into())).await.unwrap();
        session.input(WizardInput::Zip("29401".into())).await.unwrap();
    }

    async fn to_scheduling(session: &mut BookingSession<RecordingSink, StaticZipLookup>) {
        fill_contact(session).await;
        session.act(WizardAction::Next).await.unwrap();
        session.act(WizardAction::Next).await.unwrap();
        session.act(WizardAction::Next).await.unwrap();
        session.act(WizardAction::Next).await.unwrap();
        assert_eq!(session.step(), WizardStep::Scheduling);
    }

    #[tokio::test]
    async fn test_zip_lookup_sets_city_and_area() {
        let mut session = session();
        session.input(WizardInput::Zip("29401".into())).await.unwrap();
        assert_eq!(session.request().city.as_deref(), Some("Charleston"));
        assert!(session.request().in_service_area);

        session.input(WizardInput::Zip("29201".into())).await.unwrap();
        assert_eq!(session.request().city.as_deref(), Some("Columbia"));
        assert!(!session.request().in_service_area);

        session.input(WizardInput::Zip("00000".into())).await.unwrap();
        assert!(session.request().city.is_none());
    }

    #[tokio::test]
    async fn test_malformed_zip_skips_lookup() {
        let mut session = session();
        session.input(WizardInput::Zip("294".into())).await.unwrap();
        assert!(session.request().city.is_none());
        assert_eq!(session.zip_lookup.calls(), 0);
    }

    #[tokio::test]
    async fn test_price_locked_submits_quote_stage() {
        let mut session = session();
        fill_contact(&mut session).await;
        session.act(WizardAction::Next).await.unwrap();
        session.act(WizardAction::Next).await.unwrap();
        let step = session.act(WizardAction::Next).await.unwrap();

        assert_eq!(step, WizardStep::PriceLocked);
        let calls = session.dispatcher.sink().calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, WebhookConfig::default().quote_url);
        assert_eq!(calls[0].1.stage, Stage::QuoteRangeGenerated);
        assert_eq!(calls[0].1.city.as_deref(), Some("Charleston"));
        assert!(calls[0].1.initial_price_min.is_some());
    }

    #[tokio::test]
    async fn test_failed_submission_keeps_step_and_retries() {
        let mut session = session();
        fill_contact(&mut session).await;
        session.act(WizardAction::Next).await.unwrap();
        session.act(WizardAction::Next).await.unwrap();

        session.dispatcher.sink().set_failing(true);
        let err = session.act(WizardAction::Next).await.unwrap_err();
        assert!(err.to_string().contains("(843) 297-9935"));
        assert_eq!(session.step(), WizardStep::PlanReview);

        session.dispatcher.sink().set_failing(false);
        assert_eq!(
            session.act(WizardAction::Next).await.unwrap(),
            WizardStep::PriceLocked
        );
        assert_eq!(session.dispatcher.sink().calls().len(), 1);
    }

    #[tokio::test]
    async fn test_date_must_be_offered() {
        let mut session = session();
        to_scheduling(&mut session).await;

        let err = session.input(WizardInput::Date(today())).await.unwrap_err();
        assert_eq!(err, BookingError::Wizard(WizardError::DateUnavailable(today())));

        // 2026-03-08 is a Sunday.
        let sunday = NaiveDate::from_ymd_opt(2026, 3, 8).unwrap();
        assert!(session.input(WizardInput::Date(sunday)).await.is_err());
        assert!(session.request().appointment_date().is_none());
    }

    #[tokio::test]
    async fn test_cannot_confirm_without_date_and_window() {
        let mut session = session();
        to_scheduling(&mut session).await;

        let err = session.act(WizardAction::Next).await.unwrap_err();
        assert_eq!(err, BookingError::Wizard(WizardError::ScheduleIncomplete));
        assert_eq!(session.step(), WizardStep::Scheduling);

        let date = session.dates()[0];
        session.input(WizardInput::Date(date)).await.unwrap();
        assert!(session.act(WizardAction::Next).await.is_err());
        assert_eq!(session.step(), WizardStep::Scheduling);
    }

    #[tokio::test]
    async fn test_scheduled_booking_reserves_slot() {
        let availability = Availability::default();
        let mut session = session_with(RecordingSink::default(), availability.clone());
        to_scheduling(&mut session).await;

        let date = session.dates()[0];
        let window = ArrivalWindow::from_hours(10, 12).unwrap();
        session.input(WizardInput::Date(date)).await.unwrap();
        session.input(WizardInput::Window(window)).await.unwrap();

        let step = session.act(WizardAction::Next).await.unwrap();
        assert_eq!(step, WizardStep::Confirmed);
        assert!(session.popup_shown());
        assert!(availability.book().is_booked(&SlotKey { date, window }));

        let calls = session.dispatcher.sink().calls();
        let (endpoint, payload) = calls.last().unwrap();
        assert_eq!(endpoint, &WebhookConfig::default().scheduling_url);
        assert_eq!(payload.stage, Stage::WalkthroughScheduled);
        assert_eq!(payload.appointment_date, Some(date));
        assert_eq!(payload.appointment_window.as_deref(), Some("10:00 AM - 12:00 PM"));

        // A second visitor sees the slot as booked.
        let mut other = session_with(RecordingSink::default(), availability.clone());
        to_scheduling(&mut other).await;
        other.input(WizardInput::Date(date)).await.unwrap();
        assert!(other.slots().iter().any(|s| s.window == window && s.booked));
        assert_eq!(
            other.input(WizardInput::Window(window)).await,
            Err(BookingError::Wizard(WizardError::SlotUnavailable))
        );
    }

    #[tokio::test]
    async fn test_slot_taken_while_deciding_blocks_confirmation() {
        let availability = Availability::default();
        let mut session = session_with(RecordingSink::default(), availability.clone());
        to_scheduling(&mut session).await;

        let date = session.dates()[1];
        let window = ArrivalWindow::from_hours(8, 10).unwrap();
        session.input(WizardInput::Date(date)).await.unwrap();
        session.input(WizardInput::Window(window)).await.unwrap();

        availability.book().reserve(SlotKey { date, window });
        let err = session.act(WizardAction::Next).await.unwrap_err();
        assert_eq!(err, BookingError::Wizard(WizardError::SlotUnavailable));
        assert_eq!(session.step(), WizardStep::Scheduling);
    }

    #[tokio::test]
    async fn test_concurrent_sessions_cannot_confirm_same_slot() {
        let availability = Availability::default();
        let mut first = session_with(RecordingSink::default(), availability.clone());
        let mut second = session_with(RecordingSink::default(), availability.clone());
        to_scheduling(&mut first).await;
        to_scheduling(&mut second).await;

        let date = first.dates()[0];
        let window = ArrivalWindow::from_hours(8, 10).unwrap();
        for session in [&mut first, &mut second] {
            session.input(WizardInput::Date(date)).await.unwrap();
            session.input(WizardInput::Window(window)).await.unwrap();
        }

        // The sink yields before recording, so both submissions interleave.
        let (a, b) = tokio::join!(
            first.act(WizardAction::Next),
            second.act(WizardAction::Next)
        );

        let results = [a, b];
        let confirmed = results
            .iter()
            .filter(|r| **r == Ok(WizardStep::Confirmed))
            .count();
        assert_eq!(confirmed, 1);
        assert!(
            results
                .iter()
                .any(|r| *r == Err(BookingError::Wizard(WizardError::SlotUnavailable)))
        );

        let steps = [first.step(), second.step()];
        assert!(steps.contains(&WizardStep::Confirmed));
        assert!(steps.contains(&WizardStep::Scheduling));

        let scheduled = [first.dispatcher.sink(), second.dispatcher.sink()]
            .iter()
            .flat_map(|sink| sink.calls())
            .filter(|(_, payload)| payload.stage == Stage::WalkthroughScheduled)
            .count();
        assert_eq!(scheduled, 1);
        assert_eq!(availability.book().len(), 1);
    }

    #[tokio::test]
    async fn test_failed_scheduled_submission_releases_slot() {
        let availability = Availability::default();
        let mut session = session_with(RecordingSink::default(), availability.clone());
        to_scheduling(&mut session).await;

        let date = session.dates()[0];
        let window = ArrivalWindow::from_hours(12, 14).unwrap();
        session.input(WizardInput::Date(date)).await.unwrap();
        session.input(WizardInput::Window(window)).await.unwrap();

        session.dispatcher.sink().set_failing(true);
        assert!(matches!(
            session.act(WizardAction::Next).await,
            Err(BookingError::Submission { .. })
        ));
        assert_eq!(session.step(), WizardStep::Scheduling);
        assert!(availability.is_free(&SlotKey { date, window }));

        session.dispatcher.sink().set_failing(false);
        assert_eq!(
            session.act(WizardAction::Next).await.unwrap(),
            WizardStep::Confirmed
        );
        assert!(!availability.is_free(&SlotKey { date, window }));
    }

    #[tokio::test]
    async fn test_skip_posts_skipped_stage_and_dismiss_resets() {
        let mut session = session();
        fill_contact(&mut session).await;
        session.act(WizardAction::Next).await.unwrap();
        session.act(WizardAction::Next).await.unwrap();
        session.act(WizardAction::Next).await.unwrap();

        let step = session.act(WizardAction::SkipScheduling).await.unwrap();
        assert_eq!(step, WizardStep::Confirmed);
        let calls = session.dispatcher.sink().calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[1].0, WebhookConfig::default().scheduling_url);
        assert_eq!(calls[1].1.stage, Stage::WalkthroughSkipped);

        let step = session.act(WizardAction::Dismiss).await.unwrap();
        assert_eq!(step, WizardStep::Contact);
        assert!(session.request().contact.full_name.is_empty());
        assert_eq!(session.dispatcher.sink().calls().len(), 2);
    }

    #[tokio::test]
    async fn test_snapshot_lists_dates_only_while_scheduling() {
        let mut session = session();
        assert!(session.snapshot().dates.is_empty());

        to_scheduling(&mut session).await;
        let snapshot = session.snapshot();
        assert_eq!(snapshot.step, WizardStep::Scheduling);
        assert_eq!(snapshot.dates.len(), 10);
        assert!(snapshot.slots.is_empty());
    }

    #[tokio::test]
    async fn test_exit_intent_once_per_session() {
        let mut session = session();
        assert!(session.offer_exit_intent(0));
        assert!(!session.offer_exit_intent(0));
    }
}
