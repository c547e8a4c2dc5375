//! Quote pricing.
//!
//! A pure function of the home profile and the service selection. The
//! constants come from [`PricingConfig`]; nothing here performs I/O.

use rust_decimal::{Decimal, RoundingStrategy};

use starclean_types::config::PricingConfig;
use starclean_types::quote::{HomeProfile, PriceQuote, PriceRange, ServiceSelection};

/// Computes [`PriceQuote`]s from a fixed [`PricingConfig`].
#[derive(Debug, Clone)]
pub struct PriceCalculator {
    config: PricingConfig,
}

impl PriceCalculator {
    pub fn new(config: PricingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PricingConfig {
        &self.config
    }

    /// Room and pet driven price, before multipliers, discounts and the floor.
    pub fn base_price(&self, home: &HomeProfile) -> Decimal {
        let c = &self.config;
        let mut base = c.base_fee
            + c.bedroom_rate * Decimal::from(home.bedrooms())
            + c.bathroom_rate * Decimal::from(home.bathrooms());
        if home.has_dog {
            base += c.dog_fee;
        }
        if home.has_cat {
            base += c.cat_fee;
        }
        base
    }

    /// Full price breakdown.
    ///
    /// - initial: `base * service multiplier`, floored
    /// - recurring: `base * (1 - frequency discount)`, floored; `None` for one-time
    /// - ranges span `[price, price * (1 + range_uplift)]`
    /// - savings: `base - recurring.min`, never negative
    pub fn quote(&self, home: &HomeProfile, selection: &ServiceSelection) -> PriceQuote {
        let base = self.base_price(home);
        let multiplier = self.config.multiplier(selection.service);
        let discount = self.config.discount(selection.frequency);

        let initial = self.range(base * multiplier);

        let recurring = selection
            .frequency
            .is_recurring()
            .then(|| self.range(base * (Decimal::ONE - discount)));

        let savings = recurring
            .map(|r| (base - r.min).max(Decimal::ZERO))
            .unwrap_or(Decimal::ZERO);

        PriceQuote {
            base: to_cents(base),
            multiplier,
            discount,
            initial,
            recurring,
            savings: to_cents(savings),
            version: self.config.version.clone(),
        }
    }

    fn floored(&self, price: Decimal) -> Decimal {
        to_cents(price.max(self.config.floor))
    }

    fn range(&self, price: Decimal) -> PriceRange {
        let min = self.floored(price);
        let max = to_cents(min * (Decimal::ONE + self.config.range_uplift));
        PriceRange { min, max }
    }
}

impl Default for PriceCalculator {
    fn default() -> Self {
        Self::new(PricingConfig::default())
    }
}

fn to_cents(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}
