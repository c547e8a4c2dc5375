//! Global configuration types.
//!
//! `GlobalConfig` represents the top-level `config.toml` that controls the
//! pricing formula, webhook endpoints, the geocoder, appointment availability,
//! business details and the wizard shape. Every section has defaults, so an
//! empty file is a valid configuration.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::quote::{ContactField, Frequency, ServiceType};
use crate::schedule::{ArrivalWindow, SlotKey, WeekdayRule, default_windows};

/// Top-level configuration, loaded from `~/.starclean/config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GlobalConfig {
    #[serde(default)]
    pub pricing: PricingConfig,
    #[serde(default)]
    pub webhooks: WebhookConfig,
    #[serde(default)]
    pub geocoder: GeocoderConfig,
    #[serde(default)]
    pub availability: AvailabilityConfig,
    #[serde(default)]
    pub business: BusinessConfig,
    #[serde(default)]
    pub wizard: WizardConfig,
}

// ---------------------------------------------------------------------------
// Pricing
// ---------------------------------------------------------------------------

/// Constants of the pricing formula.
///
/// `base = base_fee + bedroom_rate * bedrooms + bathroom_rate * bathrooms + pet fees`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingConfig {
    /// Label echoed in every quote so formulas can be told apart downstream.
    pub version: String,
    pub base_fee: Decimal,
    pub bedroom_rate: Decimal,
    pub bathroom_rate: Decimal,
    pub dog_fee: Decimal,
    pub cat_fee: Decimal,
    /// No displayed price ever drops below this.
    pub floor: Decimal,
    /// Fraction added on top of a price to form the displayed range.
    pub range_uplift: Decimal,
    pub multipliers: ServiceMultipliers,
    pub discounts: FrequencyDiscounts,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            version: "v1".to_string(),
            base_fee: Decimal::new(90, 0),
            bedroom_rate: Decimal::new(25, 0),
            bathroom_rate: Decimal::new(20, 0),
            dog_fee: Decimal::new(15, 0),
            cat_fee: Decimal::new(10, 0),
            floor: Decimal::new(120, 0),
            range_uplift: Decimal::new(12, 2),
            multipliers: ServiceMultipliers::default(),
            discounts: FrequencyDiscounts::default(),
        }
    }
}

impl PricingConfig {
    pub fn multiplier(&self, service: ServiceType) -> Decimal {
        match service {
            ServiceType::Standard => self.multipliers.standard,
            ServiceType::Deep => self.multipliers.deep,
            ServiceType::MoveInOut => self.multipliers.move_in_out,
            ServiceType::VacationRental => self.multipliers.vacation_rental,
            ServiceType::PostConstruction => self.multipliers.post_construction,
        }
    }

    pub fn discount(&self, frequency: Frequency) -> Decimal {
        match frequency {
            Frequency::OneTime => self.discounts.one_time,
            Frequency::Weekly => self.discounts.weekly,
            Frequency::BiWeekly => self.discounts.bi_weekly,
            Frequency::Monthly => self.discounts.monthly,
        }
    }

    /// Check the invariants the calculator relies on: non-negative rates,
    /// surcharges above 1.0, discounts in `[0, 1)` ordered weekly >= bi-weekly
    /// >= monthly >= one-time.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let rates = [
            ("base_fee", self.base_fee),
            ("bedroom_rate", self.bedroom_rate),
            ("bathroom_rate", self.bathroom_rate),
            ("dog_fee", self.dog_fee),
            ("cat_fee", self.cat_fee),
            ("floor", self.floor),
            ("range_uplift", self.range_uplift),
        ];
        for (name, value) in rates {
            if value.is_sign_negative() {
                return Err(ConfigError::InvalidPricing(format!("{name} must not be negative")));
            }
        }

        if self.multipliers.standard != Decimal::ONE {
            return Err(ConfigError::InvalidPricing(
                "standard multiplier must be 1.0".to_string(),
            ));
        }
        for service in ServiceType::ALL {
            if service != ServiceType::Standard && self.multiplier(service) <= Decimal::ONE {
                return Err(ConfigError::InvalidPricing(format!(
                    "{service} multiplier must be greater than 1.0"
                )));
            }
        }

        for frequency in Frequency::ALL {
            let discount = self.discount(frequency);
            if discount.is_sign_negative() || discount >= Decimal::ONE {
                return Err(ConfigError::InvalidPricing(format!(
                    "{frequency} discount must be in [0, 1)"
                )));
            }
        }
        let d = &self.discounts;
        if !(d.weekly >= d.bi_weekly && d.bi_weekly >= d.monthly && d.monthly >= d.one_time) {
            return Err(ConfigError::InvalidPricing(
                "discounts must be ordered weekly >= bi-weekly >= monthly >= one-time".to_string(),
            ));
        }
        if !d.one_time.is_zero() {
            return Err(ConfigError::InvalidPricing(
                "one-time discount must be 0".to_string(),
            ));
        }

        Ok(())
    }
}

/// First-visit surcharge per service type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceMultipliers {
    pub standard: Decimal,
    pub deep: Decimal,
    pub move_in_out: Decimal,
    pub vacation_rental: Decimal,
    pub post_construction: Decimal,
}

impl Default for ServiceMultipliers {
    fn default() -> Self {
        Self {
            standard: Decimal::ONE,
            deep: Decimal::new(150, 2),
            move_in_out: Decimal::new(175, 2),
            vacation_rental: Decimal::new(125, 2),
            post_construction: Decimal::new(200, 2),
        }
    }
}

/// Fractional discount per frequency, applied to the base price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrequencyDiscounts {
    pub one_time: Decimal,
    pub weekly: Decimal,
    pub bi_weekly: Decimal,
    pub monthly: Decimal,
}

impl Default for FrequencyDiscounts {
    fn default() -> Self {
        Self {
            one_time: Decimal::ZERO,
            weekly: Decimal::new(20, 2),
            bi_weekly: Decimal::new(15, 2),
            monthly: Decimal::new(10, 2),
        }
    }
}

// ---------------------------------------------------------------------------
// External endpoints
// ---------------------------------------------------------------------------

const WEBHOOK_BASE: &str = "https://webhook.infra-remakingautomacoes.cloud/webhook";

/// Webhook URLs, one per stage family.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WebhookConfig {
    /// Receives short-form captures.
    pub lead_url: String,
    /// Receives `Quote Range Generated`.
    pub quote_url: String,
    /// Receives `Walkthrough Scheduled` and `Walkthrough Skipped`.
    pub scheduling_url: String,
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            lead_url: format!("{WEBHOOK_BASE}/scsite"),
            quote_url: format!("{WEBHOOK_BASE}/scsite-quote"),
            scheduling_url: format!("{WEBHOOK_BASE}/scsite-schedule"),
        }
    }
}

/// Public zip-code geocoder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeocoderConfig {
    /// Base URL; the zip code is appended as the last path segment.
    pub base_url: String,
}

impl Default for GeocoderConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.zippopotam.us/us".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Availability
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AvailabilityConfig {
    pub weekday_rule: WeekdayRule,
    /// How many upcoming dates to offer.
    pub days_shown: usize,
    pub windows: Vec<ArrivalWindow>,
    /// Slots shown as already booked.
    pub reserved: Vec<SlotKey>,
}

impl Default for AvailabilityConfig {
    fn default() -> Self {
        Self {
            weekday_rule: WeekdayRule::default(),
            days_shown: 10,
            windows: default_windows(),
            reserved: Vec::new(),
        }
    }
}

impl AvailabilityConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.weekday_rule.is_empty() {
            return Err(ConfigError::InvalidAvailability(
                "weekday rule allows no days".to_string(),
            ));
        }
        if self.days_shown == 0 {
            return Err(ConfigError::InvalidAvailability(
                "days_shown must be at least 1".to_string(),
            ));
        }
        if self.windows.is_empty() {
            return Err(ConfigError::InvalidAvailability(
                "at least one arrival window is required".to_string(),
            ));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Business and wizard
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BusinessConfig {
    pub name: String,
    /// Shown whenever a submission fails.
    pub fallback_phone: String,
    pub service_areas: Vec<String>,
}

impl Default for BusinessConfig {
    fn default() -> Self {
        Self {
            name: "Star Cleaning".to_string(),
            fallback_phone: "(843) 297-9935".to_string(),
            service_areas: [
                "Charleston",
                "Summerville",
                "Mount Pleasant",
                "West Ashley",
                "James Island",
                "North Charleston",
                "Goose Creek",
                "Daniel Island",
                "Hanahan",
                "Ladson",
                "Moncks Corner",
                "Johns Island",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
        }
    }
}

/// Shape of the booking wizard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WizardConfig {
    /// Contact fields that must be filled before leaving the first step.
    pub required_fields: Vec<ContactField>,
    /// Offer the scheduling step after the price is locked.
    pub offer_scheduling: bool,
    /// Start over with a blank request when the confirmation is dismissed.
    pub reset_on_dismiss: bool,
}

impl Default for WizardConfig {
    fn default() -> Self {
        Self {
            required_fields: ContactField::ALL.to_vec(),
            offer_scheduling: true,
            reset_on_dismiss: true,
        }
    }
}
