use serde::{Deserialize, Serialize};
use quickcourt_shared::models::{PriceValue, VenueDto, VenueSportDto};
use tracing::warn;
use crate::CatalogError;

/// Upper bound on courts per sport; larger counts in a payload are clamped
pub const MAX_COURTS_PER_SPORT: u32 = 64;

/// Read-only venue projection held by the booking flow for one page visit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VenueSnapshot {
    pub id: i64,
    pub name: String,
    pub address: String,
    pub rating: f64,
    pub total_reviews: u32,
    pub sports: Vec<VenueSport>,
}

/// A sport offered at the venue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VenueSport {
    /// Venue-sport id, sent back as `venue_sport` when booking
    pub id: i64,
    pub name: String,
    pub icon: Option<String>,
    pub pricing: Vec<SlotPrice>,
    pub number_of_courts: u32,
}

/// Hourly rate for a named time slot (morning/evening/night)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlotPrice {
    pub time_slot: String,
    pub price_per_hour: f64,
}

impl VenueSnapshot {
    /// Normalize a raw venue payload, applying defaults for missing fields.
    /// Only a missing venue id is fatal.
    pub fn from_dto(dto: VenueDto) -> Result<Self, CatalogError> {
        let id = dto.id
            .ok_or_else(|| CatalogError::MalformedVenue("missing venue id".to_string()))?;

        let sports = dto.sports
            .unwrap_or_default()
            .into_iter()
            .filter_map(|sport| VenueSport::from_dto(id, sport))
            .collect();

        Ok(Self {
            id,
            name: dto.venue_name.unwrap_or_default(),
            address: dto.address.unwrap_or_default(),
            rating: dto.average_rating.as_ref().and_then(PriceValue::as_f64).unwrap_or(0.0),
            total_reviews: dto.total_reviews.and_then(|n| u32::try_from(n).ok()).unwrap_or(0),
            sports,
        })
    }

    /// Parse and normalize a JSON body
    pub fn from_json(body: &str) -> Result<Self, CatalogError> {
        let dto: VenueDto = serde_json::from_str(body)
            .map_err(|e| CatalogError::MalformedVenue(e.to_string()))?;
        Self::from_dto(dto)
    }

    /// Case-insensitive lookup by sport name
    pub fn find_sport(&self, name: &str) -> Option<&VenueSport> {
        let wanted = name.to_lowercase();
        self.sports.iter().find(|s| s.name.to_lowercase() == wanted)
    }

    /// The sport preselected when the booking page opens
    pub fn default_sport(&self) -> Option<&VenueSport> {
        self.sports.first()
    }

    pub fn sport_names(&self) -> Vec<&str> {
        self.sports.iter().map(|s| s.name.as_str()).collect()
    }

    /// Whether any sport at the venue has a court with this label
    pub fn offers_court(&self, label: &str) -> bool {
        self.sports.iter().any(|s| s.has_court(label))
    }
}

impl VenueSport {
    fn from_dto(venue_id: i64, dto: VenueSportDto) -> Option<Self> {
        let name = dto.sport.as_ref().and_then(|s| s.name.clone()).filter(|n| !n.is_empty());
        let (id, name) = match (dto.id, name) {
            (Some(id), Some(name)) => (id, name),
            _ => {
                warn!("Venue {}: dropping sport entry without id or name", venue_id);
                return None;
            }
        };

        let pricing = dto.pricing
            .unwrap_or_default()
            .into_iter()
            .filter_map(|p| {
                let price = p.price_per_hour.as_ref().and_then(PriceValue::as_f64);
                match price {
                    Some(price_per_hour) => Some(SlotPrice {
                        time_slot: p.time_slot.unwrap_or_default(),
                        price_per_hour,
                    }),
                    None => {
                        warn!("Venue {}: skipping unparsable {} price", venue_id, name);
                        None
                    }
                }
            })
            .collect();

        let mut number_of_courts = dto.number_of_courts.and_then(|n| u32::try_from(n).ok()).unwrap_or(0);
        if number_of_courts > MAX_COURTS_PER_SPORT {
            warn!(
                "Venue {}: {} reports {} courts, capping at {}",
                venue_id, name, number_of_courts, MAX_COURTS_PER_SPORT
            );
            number_of_courts = MAX_COURTS_PER_SPORT;
        }

        Some(Self {
            id,
            icon: dto.sport.and_then(|s| s.icon),
            pricing,
            number_of_courts,
            name,
        })
    }

    /// Court labels as shown in the court picker, e.g. "Tennis Court 2"
    pub fn court_labels(&self) -> Vec<String> {
        (1..=self.number_of_courts.min(MAX_COURTS_PER_SPORT))
            .map(|n| format!("{} Court {}", self.name, n))
            .collect()
    }

    /// Whether `label` names one of this sport's courts
    pub fn has_court(&self, label: &str) -> bool {
        label
            .strip_prefix(self.name.as_str())
            .and_then(|rest| rest.strip_prefix(" Court "))
            .and_then(|n| n.parse::<u32>().ok())
            .is_some_and(|n| n >= 1 && n <= self.number_of_courts.min(MAX_COURTS_PER_SPORT))
    }
}
