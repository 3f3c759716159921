use async_trait::async_trait;
use quickcourt_catalog::VenueSnapshot;
use quickcourt_shared::models::{BookingRecord, CreateBookingRequest};

/// Failure talking to the QuickCourt backend.
/// `Display` is the message shown to the user.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GatewayError {
    /// Request never got a response (connection refused, DNS, TLS)
    #[error("{0}")]
    Transport(String),

    /// Non-2xx status; `message` is already phrased for the user
    #[error("{message}")]
    Rejected { status: u16, message: String },

    /// 2xx status with a body that could not be understood
    #[error("Malformed response: {0}")]
    Malformed(String),

    /// Caller gave up waiting (cancelled or timed out)
    #[error("Request cancelled")]
    Cancelled,
}

/// Venue catalog endpoint
#[async_trait]
pub trait VenueGateway: Send + Sync {
    async fn fetch_venue(&self, venue_id: &str) -> Result<VenueSnapshot, GatewayError>;
}

/// Booking creation endpoint
#[async_trait]
pub trait BookingGateway: Send + Sync {
    async fn create_booking(&self, request: &CreateBookingRequest) -> Result<BookingRecord, GatewayError>;
}

/// In-process gateways for tests and offline demos
pub mod mock {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Serves one fixed venue, or a fixed error
    pub struct StaticVenueGateway {
        result: Result<VenueSnapshot, GatewayError>,
        calls: Mutex<Vec<String>>,
    }

    impl StaticVenueGateway {
        pub fn new(venue: VenueSnapshot) -> Self {
            Self { result: Ok(venue), calls: Mutex::new(Vec::new()) }
        }

        pub fn failing(error: GatewayError) -> Self {
            Self { result: Err(error), calls: Mutex::new(Vec::new()) }
        }

        /// Venue ids requested so far
        pub fn calls(&self) -> Vec<String> {
            self.calls.lock().map(|c| c.clone()).unwrap_or_default()
        }
    }

    #[async_trait]
    impl VenueGateway for StaticVenueGateway {
        async fn fetch_venue(&self, venue_id: &str) -> Result<VenueSnapshot, GatewayError> {
            if let Ok(mut calls) = self.calls.lock() {
                calls.push(venue_id.to_string());
            }
            self.result.clone()
        }
    }

    /// What the next booking call should do
    #[derive(Debug, Clone)]
    pub enum BookingOutcome {
        Created(BookingRecord),
        Failed(GatewayError),
        /// Never completes
        Hang,
    }

    /// Replays queued outcomes and records every request it receives.
    /// Once the queue is empty every call succeeds with id 1.
    #[derive(Default)]
    pub struct ScriptedBookingGateway {
        outcomes: Mutex<VecDeque<BookingOutcome>>,
        requests: Mutex<Vec<CreateBookingRequest>>,
    }

    impl ScriptedBookingGateway {
        pub fn new(outcomes: Vec<BookingOutcome>) -> Self {
            Self {
                outcomes: Mutex::new(outcomes.into()),
                requests: Mutex::new(Vec::new()),
            }
        }

        pub fn requests(&self) -> Vec<CreateBookingRequest> {
            self.requests.lock().map(|r| r.clone()).unwrap_or_default()
        }
    }

    #[async_trait]
    impl BookingGateway for ScriptedBookingGateway {
        async fn create_booking(&self, request: &CreateBookingRequest) -> Result<BookingRecord, GatewayError> {
            if let Ok(mut requests) = self.requests.lock() {
                requests.push(request.clone());
            }

            let next = self.outcomes.lock().ok().and_then(|mut o| o.pop_front());
            match next {
                Some(BookingOutcome::Created(record)) => Ok(record),
                Some(BookingOutcome::Failed(err)) => Err(err),
                Some(BookingOutcome::Hang) => std::future::pending().await,
                None => Ok(BookingRecord {
                    id: Some(serde_json::json!(1)),
                    status: Some("confirmed".to_string()),
                }),
            }
        }
    }
}
