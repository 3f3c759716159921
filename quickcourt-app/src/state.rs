use std::sync::Arc;
use std::time::Duration;
use quickcourt_booking::FlowSettings;
use quickcourt_catalog::PricingPolicy;
use quickcourt_core::{BookingGateway, SessionContext, VenueGateway};
use quickcourt_store::app_config::BookingRules;

/// Everything a booking session needs from the outside world
pub struct AppState {
    pub venues: Arc<dyn VenueGateway>,
    pub bookings: Arc<dyn BookingGateway>,
    pub session: SessionContext,
    pub settings: FlowSettings,
    /// Booking requests are abandoned after this long
    pub submit_timeout: Option<Duration>,
}

impl AppState {
    pub fn new(
        venues: Arc<dyn VenueGateway>,
        bookings: Arc<dyn BookingGateway>,
        session: SessionContext,
        rules: &BookingRules,
    ) -> Self {
        Self {
            venues,
            bookings,
            session,
            settings: flow_settings(rules),
            submit_timeout: rules.submit_timeout_secs.map(Duration::from_secs),
        }
    }
}

pub fn flow_settings(rules: &BookingRules) -> FlowSettings {
    FlowSettings {
        pricing: PricingPolicy::new(rules.default_price_per_hour),
        redirect_delay: Duration::from_millis(rules.redirect_delay_ms),
        clear_pin_on_failure: rules.clear_pin_on_failure,
    }
}
