use chrono::{Duration, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use crate::venue::VenueSnapshot;
use crate::CatalogError;

/// How many days ahead the date picker offers
pub const BOOKING_WINDOW_DAYS: u32 = 30;

const FIRST_SLOT_HOUR: u32 = 6;
const LAST_SLOT_HOUR: u32 = 22;
const SLOT_STEP_MINUTES: u32 = 30;

/// A selectable start time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSlot {
    /// "HH:MM", the value sent to the booking endpoint
    pub value: String,
    /// 12-hour label, e.g. "6:30 PM"
    pub display: String,
}

/// Dates offered by the picker: `today` and the following days
pub fn date_options(today: NaiveDate, days: u32) -> Vec<NaiveDate> {
    (0..days)
        .filter_map(|offset| today.checked_add_signed(Duration::days(offset as i64)))
        .collect()
}

/// Half-hour start times from 06:00 through 22:30
pub fn time_slots() -> Vec<TimeSlot> {
    let mut slots = Vec::new();
    for hour in FIRST_SLOT_HOUR..=LAST_SLOT_HOUR {
        for minute in (0..60).step_by(SLOT_STEP_MINUTES as usize) {
            if let Some(time) = NaiveTime::from_hms_opt(hour, minute, 0) {
                slots.push(TimeSlot {
                    value: time.format("%H:%M").to_string(),
                    display: time.format("%-I:%M %p").to_string(),
                });
            }
        }
    }
    slots
}

pub fn parse_time(value: &str) -> Result<NaiveTime, CatalogError> {
    NaiveTime::parse_from_str(value.trim(), "%H:%M")
        .map_err(|_| CatalogError::InvalidTime(value.to_string()))
}

pub fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").ok()
}

/// End of a booking that starts at `start` ("HH:MM") and lasts `hours`.
/// Wraps around midnight on a 24h clock.
pub fn end_time(start: &str, hours: u32) -> Result<String, CatalogError> {
    let start = parse_time(start)?;
    let (end, _) = start.overflowing_add_signed(Duration::hours(hours as i64));
    Ok(end.format("%H:%M").to_string())
}

/// Court labels across all sports at the venue, minus the ones already picked
pub fn court_options(venue: &VenueSnapshot, selected: &[String]) -> Vec<String> {
    venue.sports
        .iter()
        .flat_map(|sport| sport.court_labels())
        .filter(|label| !selected.contains(label))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::venue::VenueSport;

    #[test]
    fn test_date_window() {
        let today = NaiveDate::from_ymd_opt(2026, 12, 20).unwrap();
        let dates = date_options(today, BOOKING_WINDOW_DAYS);

        assert_eq!(dates.len(), 30);
        assert_eq!(dates[0], today);
        assert_eq!(dates[29], NaiveDate::from_ymd_opt(2027, 1, 18).unwrap());
    }

    #[test]
    fn test_time_slots() {
        let slots = time_slots();
        assert_eq!(slots.len(), 34);
        assert_eq!(slots[0].value, "06:00");
        assert_eq!(slots[0].display, "6:00 AM");
        assert_eq!(slots[33].value, "22:30");
        assert_eq!(slots[33].display, "10:30 PM");
    }

    #[test]
    fn test_end_time_wraps_midnight() {
        assert_eq!(end_time("18:00", 2).unwrap(), "20:00");
        assert_eq!(end_time("23:00", 2).unwrap(), "01:00");
        assert_eq!(end_time("22:30", 8).unwrap(), "06:30");
        assert!(end_time("25:00", 1).is_err());
        assert!(end_time("", 1).is_err());
    }

    #[test]
    fn test_court_options_skip_selected() {
        let venue = VenueSnapshot {
            id: 1,
            name: "Arena".to_string(),
            address: String::new(),
            rating: 0.0,
            total_reviews: 0,
            sports: vec![
                VenueSport { id: 1, name: "Tennis".to_string(), icon: None, pricing: vec![], number_of_courts: 2 },
                VenueSport { id: 2, name: "Squash".to_string(), icon: None, pricing: vec![], number_of_courts: 1 },
            ],
        };

        let options = court_options(&venue, &["Tennis Court 1".to_string()]);
        assert_eq!(options, vec!["Tennis Court 2", "Squash Court 1"]);
    }
}
