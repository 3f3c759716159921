pub mod models;
pub mod validation;
pub mod submission;
pub mod controller;

pub use models::{BookingDraft, BookingReceipt, ContactField, ContactForm, CourtSelection};
pub use validation::ValidationError;
pub use submission::{PayloadError, PendingSubmission};
pub use controller::{BookingFlowController, FlowError, FlowSettings};
