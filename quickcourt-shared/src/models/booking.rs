use serde::{Deserialize, Serialize};
use crate::pii::Masked;

/// Body of `POST /api/bookings/`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateBookingRequest {
    pub venue: i64,
    pub venue_sport: i64,
    pub booking_date: String,
    pub start_time: String,
    pub end_time: String,
    pub duration_hours: u32,
    pub court_numbers: Vec<String>,
    pub contact_name: String,
    pub contact_phone: Masked<String>,
    pub contact_email: Masked<String>,
    pub total_amount: u32,
    pub special_instructions: String,
}

/// Booking object returned on success. Only `id` is relied upon.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BookingRecord {
    #[serde(default)]
    pub id: Option<serde_json::Value>,
    #[serde(default)]
    pub status: Option<String>,
}

impl BookingRecord {
    /// Booking id rendered as text, whether the server sent a number or a string
    pub fn id_text(&self) -> Option<String> {
        match self.id.as_ref()? {
            serde_json::Value::String(s) if !s.is_empty() => Some(s.clone()),
            serde_json::Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }
}

/// JSON error body: `{"error": ...}` or `{"detail": ...}`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub detail: Option<String>,
}

impl ApiErrorBody {
    pub fn message(&self) -> Option<&str> {
        self.error
            .as_deref()
            .filter(|m| !m.is_empty())
            .or_else(|| self.detail.as_deref().filter(|m| !m.is_empty()))
    }
}
