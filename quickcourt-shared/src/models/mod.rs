pub mod booking;
pub mod venue;

pub use booking::{ApiErrorBody, BookingRecord, CreateBookingRequest};
pub use venue::{PriceValue, VenueDto, VenueSportDto, SportDto, SlotPricingDto};
