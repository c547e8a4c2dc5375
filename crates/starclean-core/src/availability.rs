//! Appointment availability.
//!
//! Dates are generated from "today" and a weekday rule; every date offers the
//! same fixed arrival windows. Booked slots live in an in-memory [`SlotBook`]
//! shared by every session of the process. Nothing here is persisted.

use std::sync::Arc;

use chrono::{Datelike, NaiveDate};
use dashmap::DashSet;

use starclean_types::config::AvailabilityConfig;
use starclean_types::schedule::{ArrivalWindow, Slot, SlotKey, WeekdayRule};

/// The next `count` dates strictly after `today` that the rule allows.
///
/// Returns an empty list when the rule allows no weekday at all.
pub fn upcoming_dates(today: NaiveDate, rule: &WeekdayRule, count: usize) -> Vec<NaiveDate> {
    if rule.is_empty() {
        return Vec::new();
    }
    today
        .iter_days()
        .skip(1)
        .filter(|date| rule.allows(date.weekday()))
        .take(count)
        .collect()
}

/// In-memory set of reserved `(date, window)` keys.
///
/// Cloning shares the underlying set.
#[derive(Debug, Clone, Default)]
pub struct SlotBook {
    reserved: Arc<DashSet<SlotKey>>,
}

impl SlotBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_reserved(keys: impl IntoIterator<Item = SlotKey>) -> Self {
        let book = Self::new();
        for key in keys {
            book.reserved.insert(key);
        }
        book
    }

    pub fn is_booked(&self, key: &SlotKey) -> bool {
        self.reserved.contains(key)
    }

    /// Mark a slot as taken. Returns `false` if it already was.
    pub fn reserve(&self, key: SlotKey) -> bool {
        self.reserved.insert(key)
    }

    /// Free a slot again. Returns `false` if it was not taken.
    pub fn release(&self, key: &SlotKey) -> bool {
        self.reserved.remove(key).is_some()
    }

    /// Take a slot atomically, handing back a claim that frees it again on
    /// drop unless [`SlotClaim::keep`] is called. `None` if already taken.
    pub fn claim(&self, key: SlotKey) -> Option<SlotClaim> {
        self.reserve(key).then(|| SlotClaim {
            book: self.clone(),
            key,
            kept: false,
        })
    }

    pub fn len(&self) -> usize {
        self.reserved.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reserved.is_empty()
    }
}

/// A provisional hold on one slot.
///
/// Dropping the claim releases the slot; this also covers a booking future
/// that is cancelled while its submission is in flight.
#[derive(Debug)]
#[must_use = "dropping a claim releases the slot"]
pub struct SlotClaim {
    book: SlotBook,
    key: SlotKey,
    kept: bool,
}

impl SlotClaim {
    pub fn key(&self) -> SlotKey {
        self.key
    }

    /// Make the reservation permanent.
    pub fn keep(mut self) {
        self.kept = true;
    }
}

impl Drop for SlotClaim {
    fn drop(&mut self) {
        if !self.kept {
            self.book.release(&self.key);
        }
    }
}

/// Dates, windows and bookings for the scheduling step.
#[derive(Debug, Clone)]
pub struct Availability {
    rule: WeekdayRule,
    days_shown: usize,
    windows: Vec<ArrivalWindow>,
    book: SlotBook,
}

impl Availability {
    pub fn new(config: &AvailabilityConfig) -> Self {
        Self {
            rule: config.weekday_rule.clone(),
            days_shown: config.days_shown,
            windows: config.windows.clone(),
            book: SlotBook::with_reserved(config.reserved.iter().copied()),
        }
    }

    pub fn windows(&self) -> &[ArrivalWindow] {
        &self.windows
    }

    pub fn book(&self) -> &SlotBook {
        &self.book
    }

    /// Dates offered to a visitor arriving on `today`.
    pub fn dates(&self, today: NaiveDate) -> Vec<NaiveDate> {
        upcoming_dates(today, &self.rule, self.days_shown)
    }

    pub fn is_offered(&self, today: NaiveDate, date: NaiveDate) -> bool {
        self.dates(today).contains(&date)
    }

    /// Every window of `date` with its booked flag.
    pub fn slots_for(&self, date: NaiveDate) -> Vec<Slot> {
        self.windows
            .iter()
            .map(|window| Slot {
                window: *window,
                booked: self.book.is_booked(&SlotKey {
                    date,
                    window: *window,
                }),
            })
            .collect()
    }

    /// The window is part of the daily schedule and not yet booked.
    pub fn is_free(&self, key: &SlotKey) -> bool {
        self.windows.contains(&key.window) && !self.book.is_booked(key)
    }

    /// Claim a scheduled window. `None` when the window is not part of the
    /// daily schedule or someone else holds it.
    pub fn claim(&self, key: SlotKey) -> Option<SlotClaim> {
        if !self.windows.contains(&key.window) {
            return None;
        }
        self.book.claim(key)
    }
}

impl Default for Availability {
    fn default() -> Self {
        Self::new(&AvailabilityConfig::default())
    }
}
