//! Appointment scheduling types: arrival windows, slot keys and weekday rules.

use chrono::{NaiveDate, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};

use std::fmt;
use std::str::FromStr;

/// A fixed daily arrival window, e.g. 08:00-10:00.
///
/// Serialized as its canonical `HH:MM-HH:MM` form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ArrivalWindow {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl ArrivalWindow {
    /// Create a window from whole hours. Returns `None` for invalid hours or
    /// when `end` does not come after `start`.
    pub fn from_hours(start: u32, end: u32) -> Option<Self> {
        let start = NaiveTime::from_hms_opt(start, 0, 0)?;
        let end = NaiveTime::from_hms_opt(end, 0, 0)?;
        (end > start).then_some(Self { start, end })
    }

    /// Customer-facing label ("8:00 AM - 10:00 AM").
    pub fn label(&self) -> String {
        format!(
            "{} - {}",
            self.start.format("%-I:%M %p"),
            self.end.format("%-I:%M %p")
        )
    }
}

impl fmt::Display for ArrivalWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start.format("%H:%M"), self.end.format("%H:%M"))
    }
}

impl FromStr for ArrivalWindow {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (start, end) = s
            .trim()
            .split_once('-')
            .ok_or_else(|| format!("invalid arrival window: '{s}'"))?;
        let start = NaiveTime::parse_from_str(start.trim(), "%H:%M")
            .map_err(|e| format!("invalid window start '{start}': {e}"))?;
        let end = NaiveTime::parse_from_str(end.trim(), "%H:%M")
            .map_err(|e| format!("invalid window end '{end}': {e}"))?;
        if end <= start {
            return Err(format!("arrival window '{s}' ends before it starts"));
        }
        Ok(Self { start, end })
    }
}

impl TryFrom<String> for ArrivalWindow {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ArrivalWindow> for String {
    fn from(window: ArrivalWindow) -> Self {
        window.to_string()
    }
}

/// The default daily schedule: two morning and two afternoon windows.
pub fn default_windows() -> Vec<ArrivalWindow> {
    [(8, 10), (10, 12), (13, 15), (15, 17)]
        .into_iter()
        .filter_map(|(start, end)| ArrivalWindow::from_hours(start, end))
        .collect()
}

/// Identifies a single bookable slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SlotKey {
    pub date: NaiveDate,
    pub window: ArrivalWindow,
}

/// A window on a given date together with its availability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot {
    pub window: ArrivalWindow,
    pub booked: bool,
}

/// Which weekdays accept appointments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WeekdayRule {
    /// Monday through Saturday.
    ExceptSunday,
    /// Walkthroughs on Tuesdays and Thursdays only.
    TuesdayThursday,
    /// Explicit list of open weekdays.
    Only(Vec<Weekday>),
}

impl WeekdayRule {
    pub fn allows(&self, weekday: Weekday) -> bool {
        match self {
            WeekdayRule::ExceptSunday => weekday != Weekday::Sun,
            WeekdayRule::TuesdayThursday => matches!(weekday, Weekday::Tue | Weekday::Thu),
            WeekdayRule::Only(days) => days.contains(&weekday),
        }
    }

    /// True when no weekday is open, which would make date generation loop forever.
    pub fn is_empty(&self) -> bool {
        matches!(self, WeekdayRule::Only(days) if days.is_empty())
    }
}

impl Default for WeekdayRule {
    fn default() -> Self {
        WeekdayRule::ExceptSunday
    }
}
