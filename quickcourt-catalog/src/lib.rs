pub mod venue;
pub mod pricing;
pub mod schedule;

pub use venue::{VenueSnapshot, VenueSport, SlotPrice};
pub use pricing::{PricingPolicy, PriceQuote};
pub use schedule::TimeSlot;

/// Catalog-level errors
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Malformed venue data: {0}")]
    MalformedVenue(String),

    #[error("Invalid time: {0}")]
    InvalidTime(String),
}
