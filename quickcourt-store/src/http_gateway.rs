use std::time::Duration;
use async_trait::async_trait;
use reqwest::{header::CONTENT_TYPE, Client, Response};
use tracing::{error, info};
use quickcourt_catalog::VenueSnapshot;
use quickcourt_core::{BookingGateway, GatewayError, VenueGateway};
use quickcourt_shared::models::{ApiErrorBody, BookingRecord, CreateBookingRequest};
use crate::app_config::ApiConfig;

const GENERIC_BOOKING_FAILURE: &str = "Failed to create booking";

/// REST client for the QuickCourt backend
#[derive(Clone)]
pub struct HttpGateway {
    client: Client,
    base_url: String,
}

impl HttpGateway {
    /// Only the connect phase is bounded; a slow booking call is left to the
    /// caller's cancellation token.
    pub fn new(config: &ApiConfig) -> Result<Self, GatewayError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .build()
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        Ok(Self::with_client(client, &config.base_url))
    }

    pub fn with_client(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait]
impl VenueGateway for HttpGateway {
    async fn fetch_venue(&self, venue_id: &str) -> Result<VenueSnapshot, GatewayError> {
        let url = self.url(&format!("/api/courts/venues/{}/", venue_id));
        let response = self.client
            .get(&url)
            .send()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        let status = response.status();
        info!("Venue API response status: {}", status);

        let body = response
            .text()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        if !status.is_success() {
            error!("Venue API error: {}", body);
            return Err(GatewayError::Rejected {
                status: status.as_u16(),
                message: format!("Failed to fetch venue details ({}): {}", status.as_u16(), body),
            });
        }

        VenueSnapshot::from_json(&body).map_err(|e| GatewayError::Malformed(e.to_string()))
    }
}

#[async_trait]
impl BookingGateway for HttpGateway {
    async fn create_booking(&self, request: &CreateBookingRequest) -> Result<BookingRecord, GatewayError> {
        let response = self.client
            .post(self.url("/api/bookings/"))
            .json(request)
            .send()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        let status = response.status();
        info!("Booking API response status: {}", status);

        if !status.is_success() {
            return Err(rejection(response).await);
        }

        let body = response
            .text()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;
        let record: BookingRecord = serde_json::from_str(&body)
            .map_err(|e| GatewayError::Malformed(e.to_string()))?;

        if record.id_text().is_none() {
            return Err(GatewayError::Malformed("booking response has no id".to_string()));
        }
        Ok(record)
    }
}

/// Turn a failed booking response into a user-facing message.
/// JSON bodies carry `error` or `detail`; anything else (an HTML error page)
/// is summarized by its status line.
async fn rejection(response: Response) -> GatewayError {
    let status = response.status();
    let is_json = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.contains("application/json"));

    let message = if is_json {
        response
            .json::<ApiErrorBody>()
            .await
            .ok()
            .and_then(|body| body.message().map(str::to_string))
            .unwrap_or_else(|| GENERIC_BOOKING_FAILURE.to_string())
    } else {
        let body = response.text().await.unwrap_or_default();
        error!("HTML error response from booking API: {}", body);
        format!(
            "Server error ({}): {}",
            status.as_u16(),
            status.canonical_reason().unwrap_or("Unknown")
        )
    };

    GatewayError::Rejected {
        status: status.as_u16(),
        message,
    }
}
