pub mod gateway;
pub mod session;
pub mod navigation;
pub mod payment;

pub use gateway::{BookingGateway, GatewayError, VenueGateway};
pub use navigation::Navigator;
pub use payment::{PaymentSession, PaymentStage, UpiPin, PIN_LENGTH};
pub use session::{ContactPrefill, Role, SessionContext, SessionStore, SessionUser};

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    ValidationError(String),
    #[error("Internal error: {0}")]
    InternalError(String),
}

pub type CoreResult<T> = Result<T, CoreError>;
