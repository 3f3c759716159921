use quickcourt_catalog::{schedule, VenueSnapshot};
use quickcourt_shared::models::CreateBookingRequest;
use uuid::Uuid;
use crate::models::BookingDraft;
use crate::validation::ValidationError;

/// A frozen booking request waiting on the booking endpoint.
/// Tied to the payment session that produced it.
#[derive(Debug, Clone)]
pub struct PendingSubmission {
    pub payment_id: Uuid,
    pub request: CreateBookingRequest,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PayloadError {
    #[error("Selected sport not available at this venue")]
    SportUnavailable,

    #[error(transparent)]
    Invalid(#[from] ValidationError),
}

/// Build the `POST /api/bookings/` body from the draft
pub fn build_request(
    venue: &VenueSnapshot,
    draft: &BookingDraft,
    total_amount: u32,
) -> Result<CreateBookingRequest, PayloadError> {
    let venue_sport = venue
        .find_sport(&draft.sport)
        .ok_or(PayloadError::SportUnavailable)?;

    let end_time = schedule::end_time(&draft.start_time, draft.duration_hours())
        .map_err(|_| ValidationError::InvalidTime)?;

    Ok(CreateBookingRequest {
        venue: venue.id,
        venue_sport: venue_sport.id,
        booking_date: draft.date.clone(),
        start_time: draft.start_time.clone(),
        end_time,
        duration_hours: draft.duration_hours(),
        court_numbers: draft.courts.to_vec(),
        contact_name: draft.contact.name.clone(),
        contact_phone: draft.contact.phone.clone(),
        contact_email: draft.contact.email.clone(),
        total_amount,
        special_instructions: String::new(),
    })
}
