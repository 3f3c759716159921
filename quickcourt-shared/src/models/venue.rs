use serde::{Deserialize, Serialize};

/// Venue payload as returned by `GET /api/courts/venues/{id}/`.
/// Every field is optional; defaults are applied when the catalog normalizes it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VenueDto {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub venue_name: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub average_rating: Option<PriceValue>,
    #[serde(default)]
    pub total_reviews: Option<i64>,
    #[serde(default)]
    pub sports: Option<Vec<VenueSportDto>>,
}

/// A sport offered at a venue, with its slot pricing and court count
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VenueSportDto {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub sport: Option<SportDto>,
    #[serde(default)]
    pub pricing: Option<Vec<SlotPricingDto>>,
    #[serde(default)]
    pub number_of_courts: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SportDto {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SlotPricingDto {
    #[serde(default)]
    pub time_slot: Option<String>,
    #[serde(default)]
    pub price_per_hour: Option<PriceValue>,
}

/// Decimal fields come back either as JSON numbers or as strings ("600.00").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PriceValue {
    Number(f64),
    Text(String),
}

impl PriceValue {
    /// Numeric value, or `None` when the text form does not parse
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            PriceValue::Number(n) if n.is_finite() => Some(*n),
            PriceValue::Number(_) => None,
            PriceValue::Text(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_venue_decodes() {
        let venue: VenueDto = serde_json::from_str(r#"{"id": 7, "venue_name": "Smash Arena"}"#).unwrap();
        assert_eq!(venue.id, Some(7));
        assert!(venue.sports.is_none());
        assert!(venue.average_rating.is_none());
    }

    #[test]
    fn test_price_value_forms() {
        let pricing: Vec<SlotPricingDto> = serde_json::from_str(
            r#"[{"time_slot": "morning", "price_per_hour": "550.00"},
                {"time_slot": "evening", "price_per_hour": 700},
                {"time_slot": "night", "price_per_hour": "n/a"}]"#,
        ).unwrap();

        let values: Vec<Option<f64>> = pricing
            .iter()
            .map(|p| p.price_per_hour.as_ref().and_then(PriceValue::as_f64))
            .collect();
        assert_eq!(values, vec![Some(550.0), Some(700.0), None]);
    }
}
