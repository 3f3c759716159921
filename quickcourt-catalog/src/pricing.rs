use serde::{Deserialize, Serialize};
use tracing::warn;
use crate::venue::VenueSnapshot;

/// Fallback hourly rate used when a sport has no pricing rows
pub const DEFAULT_PRICE_PER_HOUR: u32 = 600;

/// Pricing policy for court bookings.
///
/// The hourly rate of a sport is the rounded average of its time-slot prices.
/// A sport without pricing data (or a venue that has not loaded) falls back to
/// `default_price_per_hour` instead of failing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricingPolicy {
    pub default_price_per_hour: u32,
}

impl Default for PricingPolicy {
    fn default() -> Self {
        Self {
            default_price_per_hour: DEFAULT_PRICE_PER_HOUR,
        }
    }
}

/// Price breakdown shown in the order summary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceQuote {
    pub price_per_hour: u32,
    pub duration_hours: u32,
    pub total: u32,
    /// True when the default rate was substituted for missing pricing data
    pub is_fallback: bool,
}

impl PricingPolicy {
    pub fn new(default_price_per_hour: u32) -> Self {
        Self { default_price_per_hour }
    }

    /// Hourly rate for `sport` at `venue`, plus whether the fallback was used
    pub fn rate_for(&self, venue: Option<&VenueSnapshot>, sport: &str) -> (u32, bool) {
        let pricing = venue
            .and_then(|v| v.find_sport(sport))
            .map(|s| s.pricing.as_slice())
            .unwrap_or_default();

        if pricing.is_empty() {
            warn!("No pricing data for sport '{}', using default rate {}", sport, self.default_price_per_hour);
            return (self.default_price_per_hour, true);
        }

        let sum: f64 = pricing.iter().map(|p| p.price_per_hour).sum();
        let average = sum / pricing.len() as f64;

        // Half-up rounding, matching the prices shown on the venue page
        let rounded = (average + 0.5).floor();
        (rounded.clamp(0.0, u32::MAX as f64) as u32, false)
    }

    pub fn price_per_hour(&self, venue: Option<&VenueSnapshot>, sport: &str) -> u32 {
        self.rate_for(venue, sport).0
    }

    /// Quote for a booking of `duration_hours` hours
    pub fn quote(&self, venue: Option<&VenueSnapshot>, sport: &str, duration_hours: u32) -> PriceQuote {
        let (price_per_hour, is_fallback) = self.rate_for(venue, sport);
        PriceQuote {
            price_per_hour,
            duration_hours,
            total: total_price(duration_hours, price_per_hour),
            is_fallback,
        }
    }
}

pub fn total_price(duration_hours: u32, price_per_hour: u32) -> u32 {
    duration_hours.saturating_mul(price_per_hour)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::venue::{SlotPrice, VenueSport};

    fn venue_with_prices(prices: &[f64]) -> VenueSnapshot {
        VenueSnapshot {
            id: 1,
            name: "Test Venue".to_string(),
            address: String::new(),
            rating: 0.0,
            total_reviews: 0,
            sports: vec![VenueSport {
                id: 10,
                name: "Tennis".to_string(),
                icon: None,
                pricing: prices
                    .iter()
                    .map(|p| SlotPrice { time_slot: "morning".to_string(), price_per_hour: *p })
                    .collect(),
                number_of_courts: 2,
            }],
        }
    }

    #[test]
    fn test_average_of_slots() {
        let policy = PricingPolicy::default();
        let venue = venue_with_prices(&[500.0, 700.0, 801.0]);
        assert_eq!(policy.price_per_hour(Some(&venue), "Tennis"), 667);

        let venue = venue_with_prices(&[500.0, 501.0]);
        assert_eq!(policy.price_per_hour(Some(&venue), "tennis"), 501);
    }

    #[test]
    fn test_fallback_rate() {
        let policy = PricingPolicy::default();
        let venue = venue_with_prices(&[]);

        assert_eq!(policy.rate_for(Some(&venue), "Tennis"), (600, true));
        assert_eq!(policy.rate_for(Some(&venue), "Squash"), (600, true));
        assert_eq!(policy.rate_for(None, "Tennis"), (600, true));

        let custom = PricingPolicy::new(450);
        assert_eq!(custom.price_per_hour(None, "Tennis"), 450);
    }

    #[test]
    fn test_quote_total() {
        let policy = PricingPolicy::default();
        let venue = venue_with_prices(&[600.0]);
        let quote = policy.quote(Some(&venue), "Tennis", 2);

        assert_eq!(quote.price_per_hour, 600);
        assert_eq!(quote.total, 1200);
        assert!(!quote.is_fallback);
    }
}
