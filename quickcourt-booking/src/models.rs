use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};
use quickcourt_core::ContactPrefill;
use quickcourt_shared::Masked;

pub const MIN_DURATION_HOURS: u32 = 1;
pub const MAX_DURATION_HOURS: u32 = 8;
pub const DEFAULT_DURATION_HOURS: u32 = 2;

/// Contact details attached to a booking
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContactForm {
    pub name: String,
    pub phone: Masked<String>,
    pub email: Masked<String>,
}

impl ContactForm {
    pub fn from_prefill(prefill: ContactPrefill) -> Self {
        Self {
            name: prefill.name,
            phone: Masked::default(),
            email: Masked::new(prefill.email),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactField {
    Name,
    Phone,
    Email,
}

/// Courts picked for the booking, in the order they were added. No duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourtSelection(Vec<String>);

impl CourtSelection {
    /// Returns false when the label is empty or already selected
    pub fn add(&mut self, label: &str) -> bool {
        if label.is_empty() || self.contains(label) {
            return false;
        }
        self.0.push(label.to_string());
        true
    }

    pub fn remove(&mut self, label: &str) -> bool {
        let before = self.0.len();
        self.0.retain(|c| c != label);
        self.0.len() != before
    }

    pub fn contains(&self, label: &str) -> bool {
        self.0.iter().any(|c| c == label)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn to_vec(&self) -> Vec<String> {
        self.0.clone()
    }
}

/// In-progress booking selections
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingDraft {
    pub id: Uuid,
    pub sport: String,
    /// ISO date, "YYYY-MM-DD"; empty until picked
    pub date: String,
    /// "HH:MM"; empty until picked
    pub start_time: String,
    duration_hours: u32,
    pub courts: CourtSelection,
    pub contact: ContactForm,
    pub created_at: DateTime<Utc>,
}

impl BookingDraft {
    pub fn new(sport: &str, prefill: ContactPrefill) -> Self {
        Self {
            id: Uuid::new_v4(),
            sport: sport.to_string(),
            date: String::new(),
            start_time: String::new(),
            duration_hours: DEFAULT_DURATION_HOURS,
            courts: CourtSelection::default(),
            contact: ContactForm::from_prefill(prefill),
            created_at: Utc::now(),
        }
    }

    pub fn duration_hours(&self) -> u32 {
        self.duration_hours
    }

    /// Set an exact duration, clamped to 1..=8 hours
    pub fn set_duration(&mut self, hours: u32) -> u32 {
        self.duration_hours = hours.clamp(MIN_DURATION_HOURS, MAX_DURATION_HOURS);
        self.duration_hours
    }

    /// Step the duration up or down, clamped to 1..=8 hours
    pub fn change_duration(&mut self, delta: i32) -> u32 {
        let next = (self.duration_hours as i64 + delta as i64)
            .clamp(MIN_DURATION_HOURS as i64, MAX_DURATION_HOURS as i64);
        self.duration_hours = next as u32;
        self.duration_hours
    }

    pub fn set_contact(&mut self, field: ContactField, value: &str) {
        match field {
            ContactField::Name => self.contact.name = value.to_string(),
            ContactField::Phone => self.contact.phone = Masked::from(value),
            ContactField::Email => self.contact.email = Masked::from(value),
        }
    }
}

/// What the success screen shows once the booking exists server-side
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingReceipt {
    pub booking_id: String,
    pub venue_name: String,
    pub sport: String,
    pub date: String,
    pub start_time: String,
    pub end_time: String,
    pub courts: Vec<String>,
    pub amount_paid: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_add_court_is_idempotent() {
        let mut courts = CourtSelection::default();
        assert!(courts.add("Tennis Court 1"));
        assert!(!courts.add("Tennis Court 1"));
        assert!(!courts.add(""));
        assert_eq!(courts.len(), 1);
    }

    #[test]
    fn test_remove_then_add_restores() {
        let mut courts = CourtSelection::default();
        courts.add("Tennis Court 1");
        courts.add("Tennis Court 2");

        assert!(courts.remove("Tennis Court 1"));
        assert!(!courts.contains("Tennis Court 1"));
        assert!(courts.add("Tennis Court 1"));
        assert_eq!(courts.as_slice(), ["Tennis Court 2", "Tennis Court 1"]);
    }

    #[test]
    fn test_prefill_populates_contact() {
        let draft = BookingDraft::new("Tennis", ContactPrefill {
            name: "Asha".to_string(),
            email: "asha@example.com".to_string(),
        });
        assert_eq!(draft.contact.name, "Asha");
        assert_eq!(draft.contact.email.expose(), "asha@example.com");
        assert!(draft.contact.phone.expose().is_empty());
        assert_eq!(draft.duration_hours(), DEFAULT_DURATION_HOURS);
    }

    #[test]
    fn test_exact_duration_clamps() {
        let mut draft = BookingDraft::new("Tennis", ContactPrefill::default());
        assert_eq!(draft.set_duration(0), 1);
        assert_eq!(draft.set_duration(12), 8);
        assert_eq!(draft.set_duration(5), 5);
    }

    proptest! {
        #[test]
        fn duration_stays_in_range(deltas in prop::collection::vec(-10i32..10, 0..50)) {
            let mut draft = BookingDraft::new("Tennis", ContactPrefill::default());
            for delta in deltas {
                let d = draft.change_duration(delta);
                prop_assert!((MIN_DURATION_HOURS..=MAX_DURATION_HOURS).contains(&d));
            }
        }

        #[test]
        fn courts_never_duplicate(labels in prop::collection::vec("Court [1-4]", 0..30)) {
            let mut courts = CourtSelection::default();
            for label in &labels {
                courts.add(label);
            }
            let mut seen = courts.to_vec();
            seen.sort();
            seen.dedup();
            prop_assert_eq!(seen.len(), courts.len());
        }
    }
}
