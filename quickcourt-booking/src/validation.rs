use once_cell::sync::Lazy;
use regex::Regex;
use crate::models::{BookingDraft, ContactForm};

pub const MIN_PHONE_LENGTH: usize = 10;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid")
});

/// Reasons a booking cannot move forward. `Display` is the alert text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Please fill in all required booking fields")]
    MissingBookingFields,

    #[error("Please fill in all contact details")]
    MissingContactDetails,

    #[error("Please enter a valid email address")]
    InvalidEmail,

    #[error("Please enter a valid phone number")]
    InvalidPhone,

    #[error("Please enter complete UPI PIN")]
    IncompletePin,

    #[error("Please pick a valid date")]
    InvalidDate,

    #[error("Please pick a valid start time")]
    InvalidTime,

    #[error("Court not available at this venue")]
    UnknownCourt,
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

/// Date, start time and at least one court
pub fn check_booking_fields(draft: &BookingDraft) -> Result<(), ValidationError> {
    if draft.date.is_empty() || draft.start_time.is_empty() || draft.courts.is_empty() {
        return Err(ValidationError::MissingBookingFields);
    }
    Ok(())
}

/// All three fields present, email well-formed, phone long enough. Checked in that order.
pub fn check_contact(contact: &ContactForm) -> Result<(), ValidationError> {
    let (name, phone, email) = (&contact.name, contact.phone.expose(), contact.email.expose());

    if name.is_empty() || phone.is_empty() || email.is_empty() {
        return Err(ValidationError::MissingContactDetails);
    }
    if !is_valid_email(email) {
        return Err(ValidationError::InvalidEmail);
    }
    if phone.chars().count() < MIN_PHONE_LENGTH {
        return Err(ValidationError::InvalidPhone);
    }
    Ok(())
}

/// Gate for leaving the form: the first violated rule wins
pub fn check_ready_for_payment(draft: &BookingDraft) -> Result<(), ValidationError> {
    check_booking_fields(draft)?;
    check_contact(&draft.contact)
}
