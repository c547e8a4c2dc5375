use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

use std::fmt;
use std::str::FromStr;

use crate::schedule::ArrivalWindow;

/// Lowest bedroom/bathroom count a home profile can hold.
pub const MIN_ROOMS: u8 = 1;

/// Cleaning service offered on the quote form.
///
/// Matching is always done on the variant. The human labels used by the
/// landing page forms ("Move In / Move Out", "AirBnB / Vacation Rental") are
/// only accepted at the parsing boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ServiceType {
    Standard,
    Deep,
    MoveInOut,
    VacationRental,
    PostConstruction,
}

impl ServiceType {
    /// All services in display order.
    pub const ALL: [ServiceType; 5] = [
        ServiceType::Standard,
        ServiceType::Deep,
        ServiceType::MoveInOut,
        ServiceType::VacationRental,
        ServiceType::PostConstruction,
    ];

    /// Customer-facing label, as posted to the webhook.
    pub fn label(&self) -> &'static str {
        match self {
            ServiceType::Standard => "Standard House Cleaning",
            ServiceType::Deep => "Deep Cleaning",
            ServiceType::MoveInOut => "Move In / Move Out",
            ServiceType::VacationRental => "Vacation Rental / Airbnb",
            ServiceType::PostConstruction => "Post-Construction",
        }
    }
}

impl Default for ServiceType {
    fn default() -> Self {
        ServiceType::Standard
    }
}

impl fmt::Display for ServiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceType::Standard => write!(f, "standard"),
            ServiceType::Deep => write!(f, "deep"),
            ServiceType::MoveInOut => write!(f, "move-in-out"),
            ServiceType::VacationRental => write!(f, "vacation-rental"),
            ServiceType::PostConstruction => write!(f, "post-construction"),
        }
    }
}

impl FromStr for ServiceType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "standard" | "standard house cleaning" => Ok(ServiceType::Standard),
            "deep" | "deep cleaning" | "deep cleaning (first time)" => Ok(ServiceType::Deep),
            "move-in-out" | "move-in/out" | "move in / move out" => Ok(ServiceType::MoveInOut),
            "vacation-rental" | "vacation rental / airbnb" | "airbnb / vacation rental" => {
                Ok(ServiceType::VacationRental)
            }
            "post-construction" => Ok(ServiceType::PostConstruction),
            other => Err(format!("invalid service type: '{other}'")),
        }
    }
}

/// How often the clean repeats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Frequency {
    OneTime,
    Weekly,
    BiWeekly,
    Monthly,
}

impl Frequency {
    /// All frequencies in display order.
    pub const ALL: [Frequency; 4] = [
        Frequency::Weekly,
        Frequency::BiWeekly,
        Frequency::Monthly,
        Frequency::OneTime,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Frequency::OneTime => "One-Time Clean",
            Frequency::Weekly => "Weekly",
            Frequency::BiWeekly => "Bi-Weekly",
            Frequency::Monthly => "Monthly",
        }
    }

    /// Whether the plan produces a recurring price.
    pub fn is_recurring(&self) -> bool {
        !matches!(self, Frequency::OneTime)
    }
}

impl Default for Frequency {
    fn default() -> Self {
        Frequency::BiWeekly
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Frequency::OneTime => write!(f, "one-time"),
            Frequency::Weekly => write!(f, "weekly"),
            Frequency::BiWeekly => write!(f, "bi-weekly"),
            Frequency::Monthly => write!(f, "monthly"),
        }
    }
}

impl FromStr for Frequency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "one-time" | "one time" | "one-time clean" => Ok(Frequency::OneTime),
            "weekly" | "weekly (save 20%)" => Ok(Frequency::Weekly),
            "bi-weekly" | "biweekly" | "bi-weekly (most popular)" => Ok(Frequency::BiWeekly),
            "monthly" => Ok(Frequency::Monthly),
            other => Err(format!("invalid frequency: '{other}'")),
        }
    }
}

/// Service + frequency chosen on the plan step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ServiceSelection {
    pub service: ServiceType,
    pub frequency: Frequency,
}

/// Size and pets of the home being cleaned.
///
/// Room counts are clamped to [`MIN_ROOMS`] on every write path, including
/// deserialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HomeProfile {
    #[serde(deserialize_with = "at_least_one_room")]
    bedrooms: u8,
    #[serde(deserialize_with = "at_least_one_room")]
    bathrooms: u8,
    #[serde(default)]
    pub has_dog: bool,
    #[serde(default)]
    pub has_cat: bool,
}

fn at_least_one_room<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let rooms = u8::deserialize(deserializer)?;
    Ok(rooms.max(MIN_ROOMS))
}

impl HomeProfile {
    pub fn new(bedrooms: u8, bathrooms: u8) -> Self {
        Self {
            bedrooms: bedrooms.max(MIN_ROOMS),
            bathrooms: bathrooms.max(MIN_ROOMS),
            has_dog: false,
            has_cat: false,
        }
    }

    pub fn with_pets(mut self, has_dog: bool, has_cat: bool) -> Self {
        self.has_dog = has_dog;
        self.has_cat = has_cat;
        self
    }

    pub fn bedrooms(&self) -> u8 {
        self.bedrooms
    }

    pub fn bathrooms(&self) -> u8 {
        self.bathrooms
    }

    pub fn set_bedrooms(&mut self, bedrooms: u8) {
        self.bedrooms = bedrooms.max(MIN_ROOMS);
    }

    pub fn set_bathrooms(&mut self, bathrooms: u8) {
        self.bathrooms = bathrooms.max(MIN_ROOMS);
    }
}

impl Default for HomeProfile {
    fn default() -> Self {
        Self::new(3, 2)
    }
}

/// Contact fields that the wizard can require before leaving the first step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContactField {
    FullName,
    Email,
    Phone,
    Zip,
}

impl ContactField {
    pub const ALL: [ContactField; 4] = [
        ContactField::FullName,
        ContactField::Email,
        ContactField::Phone,
        ContactField::Zip,
    ];
}

impl fmt::Display for ContactField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContactField::FullName => write!(f, "full name"),
            ContactField::Email => write!(f, "email"),
            ContactField::Phone => write!(f, "phone"),
            ContactField::Zip => write!(f, "zip code"),
        }
    }
}

/// Visitor contact details. Empty strings are allowed until validation.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Contact {
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub zip: String,
}

impl Contact {
    pub fn value(&self, field: ContactField) -> &str {
        match field {
            ContactField::FullName => &self.full_name,
            ContactField::Email => &self.email,
            ContactField::Phone => &self.phone,
            ContactField::Zip => &self.zip,
        }
    }

    /// Required fields that are empty after trimming, in the order given.
    pub fn missing(&self, required: &[ContactField]) -> Vec<ContactField> {
        required
            .iter()
            .copied()
            .filter(|field| self.value(*field).trim().is_empty())
            .collect()
    }

    /// First word of the full name, used for greetings.
    pub fn first_name(&self) -> &str {
        self.full_name.split_whitespace().next().unwrap_or("")
    }
}

/// A low/high price pair shown to the visitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceRange {
    pub min: Decimal,
    pub max: Decimal,
}

impl fmt::Display for PriceRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${:.2} - ${:.2}", self.min, self.max)
    }
}

/// Pricing derived from a home profile and service selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceQuote {
    /// Room and pet driven price before multipliers and discounts.
    pub base: Decimal,
    /// Service multiplier used for the first visit.
    pub multiplier: Decimal,
    /// Fractional frequency discount (0.15 = 15%).
    pub discount: Decimal,
    /// First visit price range.
    pub initial: PriceRange,
    /// Per-visit price range for recurring plans, `None` for one-time cleans.
    pub recurring: Option<PriceRange>,
    /// Per-visit savings of the recurring plan against the base price.
    pub savings: Decimal,
    /// Label of the pricing formula that produced this quote.
    pub version: String,
}

/// The wizard's mutable request, owned for the lifetime of a session.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct QuoteRequest {
    pub contact: Contact,
    pub home: HomeProfile,
    pub selection: ServiceSelection,
    /// Derived pricing, refreshed by the wizard after every change.
    pub pricing: Option<PriceQuote>,
    /// City resolved from the zip code, if the lookup succeeded.
    pub city: Option<String>,
    pub in_service_area: bool,
    /// Label of the short form that seeded this request.
    pub form_source: Option<String>,
    appointment_date: Option<NaiveDate>,
    appointment_window: Option<ArrivalWindow>,
}

impl QuoteRequest {
    /// Build a request pre-filled from a short-form capture.
    pub fn from_capture(capture: &LeadCapture) -> Self {
        Self {
            contact: Contact {
                full_name: capture.full_name(),
                email: capture.email.trim().to_string(),
                phone: capture.phone.trim().to_string(),
                zip: capture.zip_code.trim().to_string(),
            },
            selection: ServiceSelection {
                service: capture.service.unwrap_or_default(),
                frequency: capture.frequency.unwrap_or_default(),
            },
            form_source: Some(capture.form_source.clone()),
            ..Default::default()
        }
    }

    pub fn appointment_date(&self) -> Option<NaiveDate> {
        self.appointment_date
    }

    pub fn appointment_window(&self) -> Option<ArrivalWindow> {
        self.appointment_window
    }

    /// Pick an appointment date. Any previously chosen window is cleared.
    pub fn select_date(&mut self, date: NaiveDate) {
        self.appointment_date = Some(date);
        self.appointment_window = None;
    }

    pub fn select_window(&mut self, window: ArrivalWindow) {
        self.appointment_window = Some(window);
    }

    pub fn clear_schedule(&mut self) {
        self.appointment_date = None;
        self.appointment_window = None;
    }

    /// Both a date and an arrival window are chosen.
    pub fn has_schedule(&self) -> bool {
        self.appointment_date.is_some() && self.appointment_window.is_some()
    }
}

/// Short lead form from the hero section or the main booking form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadCapture {
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    pub email: String,
    pub phone: String,
    #[serde(alias = "zip")]
    pub zip_code: String,
    #[serde(default)]
    pub service: Option<ServiceType>,
    #[serde(default)]
    pub frequency: Option<Frequency>,
    #[serde(default = "default_form_source")]
    pub form_source: String,
}

fn default_form_source() -> String {
    "Main Booking Form".to_string()
}

impl LeadCapture {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name.trim(), self.last_name.trim())
            .trim()
            .to_string()
    }

    /// Required capture fields that are empty, mapped onto contact fields.
    pub fn missing(&self) -> Vec<ContactField> {
        let mut missing = Vec::new();
        if self.first_name.trim().is_empty() {
            missing.push(ContactField::FullName);
        }
        if self.email.trim().is_empty() {
            missing.push(ContactField::Email);
        }
        if self.phone.trim().is_empty() {
            missing.push(ContactField::Phone);
        }
        if self.zip_code.trim().is_empty() {
            missing.push(ContactField::Zip);
        }
        missing
    }
}
