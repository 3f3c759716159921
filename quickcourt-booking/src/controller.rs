use std::sync::Arc;
use std::time::Duration;
use chrono::{NaiveDate, Utc};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use quickcourt_catalog::{pricing, schedule, PriceQuote, PricingPolicy, TimeSlot, VenueSnapshot};
use quickcourt_core::{
    navigation, BookingGateway, ContactPrefill, CoreError, GatewayError, Navigator,
    PaymentSession, PaymentStage, VenueGateway,
};
use quickcourt_shared::models::BookingRecord;
use crate::models::{BookingDraft, BookingReceipt, ContactField};
use crate::submission::{self, PayloadError, PendingSubmission};
use crate::validation::{self, ValidationError};

/// Delay between the success screen and the redirect to the profile page
pub const DEFAULT_REDIRECT_DELAY: Duration = Duration::from_secs(2);

/// Tunables for one booking flow
#[derive(Debug, Clone)]
pub struct FlowSettings {
    pub pricing: PricingPolicy,
    pub redirect_delay: Duration,
    /// Wipe the entered PIN after a failed booking attempt
    pub clear_pin_on_failure: bool,
}

impl Default for FlowSettings {
    fn default() -> Self {
        Self {
            pricing: PricingPolicy::default(),
            redirect_delay: DEFAULT_REDIRECT_DELAY,
            clear_pin_on_failure: false,
        }
    }
}

/// Errors surfaced by the booking flow. `Display` is what the user sees.
#[derive(Debug, thiserror::Error)]
pub enum FlowError {
    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("Not available while {actual:?} (needs {expected:?})")]
    InvalidStage {
        expected: PaymentStage,
        actual: PaymentStage,
    },

    #[error("A booking request is already being processed")]
    SubmissionInFlight,

    #[error("Booking failed: {0}")]
    BookingFailed(String),

    #[error("Submission belongs to a payment session that is no longer active")]
    StaleSubmission,

    #[error("No venue ID provided")]
    MissingVenueId,

    #[error("{0}")]
    VenueUnavailable(String),

    #[error(transparent)]
    Pin(#[from] CoreError),
}

/// Drives the court booking wizard: Form → Payment → Success.
///
/// `Payment → Form` is allowed through [`go_back`](Self::go_back); nothing
/// leaves `Success`. The draft is only editable in `Form` and the PIN only in
/// `Payment`. At most one booking request is in flight per payment session.
pub struct BookingFlowController {
    venue: VenueSnapshot,
    draft: BookingDraft,
    stage: PaymentStage,
    payment: Option<PaymentSession>,
    price_per_hour: u32,
    price_is_fallback: bool,
    receipt: Option<BookingReceipt>,
    redirect: Option<JoinHandle<()>>,
    navigator: Arc<dyn Navigator>,
    settings: FlowSettings,
}

impl BookingFlowController {
    /// Fetch the venue once and open the form
    pub async fn mount(
        gateway: &dyn VenueGateway,
        venue_id: &str,
        prefill: ContactPrefill,
        navigator: Arc<dyn Navigator>,
        settings: FlowSettings,
    ) -> Result<Self, FlowError> {
        let venue_id = venue_id.trim();
        if venue_id.is_empty() {
            error!("No venue ID provided");
            return Err(FlowError::MissingVenueId);
        }

        info!("Fetching venue {}", venue_id);
        let venue = gateway.fetch_venue(venue_id).await.map_err(|e| {
            error!("Error fetching venue {}: {}", venue_id, e);
            FlowError::VenueUnavailable(e.to_string())
        })?;

        Ok(Self::new(venue, prefill, navigator, settings))
    }

    /// Open the form for an already loaded venue. The first sport is preselected.
    pub fn new(
        venue: VenueSnapshot,
        prefill: ContactPrefill,
        navigator: Arc<dyn Navigator>,
        settings: FlowSettings,
    ) -> Self {
        let sport = venue.default_sport().map(|s| s.name.clone()).unwrap_or_default();
        let draft = BookingDraft::new(&sport, prefill);

        let mut controller = Self {
            venue,
            draft,
            stage: PaymentStage::Form,
            payment: None,
            price_per_hour: settings.pricing.default_price_per_hour,
            price_is_fallback: true,
            receipt: None,
            redirect: None,
            navigator,
            settings,
        };
        controller.reprice();

        info!(
            flow_id = %controller.draft.id,
            "Booking flow opened for venue {} ({} sports, default '{}')",
            controller.venue.id,
            controller.venue.sports.len(),
            controller.draft.sport
        );
        controller
    }

    // ---- form stage ----

    pub fn select_sport(&mut self, name: &str) -> Result<(), FlowError> {
        self.ensure_stage(PaymentStage::Form)?;

        if self.venue.find_sport(name).is_none() {
            warn!(flow_id = %self.draft.id, "Sport '{}' is not offered at venue {}", name, self.venue.id);
        }
        self.draft.sport = name.to_string();
        self.reprice();
        Ok(())
    }

    /// Pick the booking date ("YYYY-MM-DD"); empty clears it
    pub fn set_date(&mut self, value: &str) -> Result<(), FlowError> {
        self.ensure_stage(PaymentStage::Form)?;

        let value = value.trim();
        if value.is_empty() {
            self.draft.date.clear();
            return Ok(());
        }
        let date = schedule::parse_date(value).ok_or(ValidationError::InvalidDate)?;
        self.draft.date = date.format("%Y-%m-%d").to_string();
        Ok(())
    }

    /// Pick the start time ("HH:MM"); empty clears it
    pub fn set_start_time(&mut self, value: &str) -> Result<(), FlowError> {
        self.ensure_stage(PaymentStage::Form)?;

        let value = value.trim();
        if value.is_empty() {
            self.draft.start_time.clear();
            return Ok(());
        }
        let time = schedule::parse_time(value).map_err(|_| ValidationError::InvalidTime)?;
        self.draft.start_time = time.format("%H:%M").to_string();
        Ok(())
    }

    /// Step the duration by `delta` hours; the result stays within 1..=8
    pub fn change_duration(&mut self, delta: i32) -> Result<u32, FlowError> {
        self.ensure_stage(PaymentStage::Form)?;
        Ok(self.draft.change_duration(delta))
    }

    pub fn set_duration(&mut self, hours: u32) -> Result<u32, FlowError> {
        self.ensure_stage(PaymentStage::Form)?;
        Ok(self.draft.set_duration(hours))
    }

    /// Returns false when the label was empty or already selected.
    /// Labels the venue does not offer are rejected.
    pub fn add_court(&mut self, label: &str) -> Result<bool, FlowError> {
        self.ensure_stage(PaymentStage::Form)?;
        if label.is_empty() || self.draft.courts.contains(label) {
            return Ok(false);
        }
        if !self.venue.offers_court(label) {
            warn!(flow_id = %self.draft.id, "Court '{}' is not offered at venue {}", label, self.venue.id);
            return Err(ValidationError::UnknownCourt.into());
        }
        Ok(self.draft.courts.add(label))
    }

    pub fn remove_court(&mut self, label: &str) -> Result<bool, FlowError> {
        self.ensure_stage(PaymentStage::Form)?;
        Ok(self.draft.courts.remove(label))
    }

    pub fn set_contact(&mut self, field: ContactField, value: &str) -> Result<(), FlowError> {
        self.ensure_stage(PaymentStage::Form)?;
        self.draft.set_contact(field, value);
        Ok(())
    }

    /// Validation gate: Form → Payment
    pub fn continue_to_payment(&mut self) -> Result<(), FlowError> {
        self.ensure_stage(PaymentStage::Form)?;

        if let Err(e) = validation::check_ready_for_payment(&self.draft) {
            warn!(flow_id = %self.draft.id, "Cannot continue to payment: {}", e);
            return Err(e.into());
        }

        let session = PaymentSession::new();
        info!(
            flow_id = %self.draft.id,
            payment_id = %session.id,
            "Continuing to payment: {} x{}h, {} court(s), total {}",
            self.draft.sport,
            self.draft.duration_hours(),
            self.draft.courts.len(),
            self.total_price()
        );
        self.payment = Some(session);
        self.stage = PaymentStage::Payment;
        Ok(())
    }

    // ---- payment stage ----

    /// Enter a single digit (or "" to clear) into PIN slot `index`.
    /// Returns false when the value was not a single digit and got ignored.
    pub fn set_pin_digit(&mut self, index: usize, value: &str) -> Result<bool, FlowError> {
        let session = self.payment_mut()?;
        Ok(session.pin.set_digit(index, value)?)
    }

    /// Type one digit into the focused PIN slot. Returns false when the value
    /// was not a single digit or the PIN has no room left.
    pub fn type_pin_digit(&mut self, value: &str) -> Result<bool, FlowError> {
        let session = self.payment_mut()?;
        Ok(session.pin.push(value)?)
    }

    /// Backspace while PIN slot `index` has focus
    pub fn pin_backspace(&mut self, index: usize) -> Result<(), FlowError> {
        let session = self.payment_mut()?;
        Ok(session.pin.backspace(index)?)
    }

    /// Payment → Form. Keeps every selection in the draft.
    pub fn go_back(&mut self) -> Result<(), FlowError> {
        self.ensure_stage(PaymentStage::Payment)?;
        if self.is_processing() {
            return Err(FlowError::SubmissionInFlight);
        }

        self.payment = None;
        self.stage = PaymentStage::Form;
        info!(flow_id = %self.draft.id, "Returned to booking form");
        Ok(())
    }

    /// Check the PIN and contact details, freeze the draft into a request and
    /// mark the payment session as processing.
    ///
    /// Nothing is sent here; hand the request to a [`BookingGateway`] and report
    /// back through [`complete_submission`](Self::complete_submission).
    pub fn begin_submission(&mut self) -> Result<PendingSubmission, FlowError> {
        self.ensure_stage(PaymentStage::Payment)?;
        let total = self.total_price();

        let session = self.payment.as_ref().ok_or(FlowError::InvalidStage {
            expected: PaymentStage::Payment,
            actual: self.stage,
        })?;
        if session.processing {
            return Err(FlowError::SubmissionInFlight);
        }
        if !session.pin.is_complete() {
            return Err(ValidationError::IncompletePin.into());
        }
        if let Err(e) = validation::check_contact(&self.draft.contact) {
            warn!(flow_id = %self.draft.id, "Rejected payment before submission: {}", e);
            return Err(e.into());
        }

        let request = submission::build_request(&self.venue, &self.draft, total).map_err(|e| match e {
            PayloadError::SportUnavailable => FlowError::BookingFailed(e.to_string()),
            PayloadError::Invalid(v) => FlowError::Validation(v),
        })?;
        let payment_id = session.id;

        if let Some(session) = self.payment.as_mut() {
            session.processing = true;
        }
        info!(
            flow_id = %self.draft.id,
            payment_id = %payment_id,
            "Submitting booking: venue {} sport {} on {} {}-{}",
            request.venue,
            request.venue_sport,
            request.booking_date,
            request.start_time,
            request.end_time
        );

        Ok(PendingSubmission { payment_id, request })
    }

    /// Apply the booking endpoint's answer to a submission started with
    /// [`begin_submission`](Self::begin_submission).
    ///
    /// Success moves to `Success` and schedules the redirect. Any failure
    /// leaves the flow in `Payment` with `processing` reset so the user can retry.
    pub fn complete_submission(
        &mut self,
        pending: &PendingSubmission,
        outcome: Result<BookingRecord, GatewayError>,
    ) -> Result<BookingReceipt, FlowError> {
        let active = self.stage == PaymentStage::Payment
            && matches!(&self.payment, Some(s) if s.id == pending.payment_id && s.processing);
        if !active {
            warn!(flow_id = %self.draft.id, "Ignoring outcome for stale payment session {}", pending.payment_id);
            return Err(FlowError::StaleSubmission);
        }

        let outcome = outcome.and_then(|record| {
            record
                .id_text()
                .ok_or_else(|| GatewayError::Malformed("booking response has no id".to_string()))
        });

        match outcome {
            Ok(booking_id) => {
                let request = &pending.request;
                let receipt = BookingReceipt {
                    booking_id,
                    venue_name: self.venue.name.clone(),
                    sport: self.draft.sport.clone(),
                    date: request.booking_date.clone(),
                    start_time: request.start_time.clone(),
                    end_time: request.end_time.clone(),
                    courts: request.court_numbers.clone(),
                    amount_paid: request.total_amount,
                };

                info!(flow_id = %self.draft.id, "Booking created successfully: {}", receipt.booking_id);
                self.payment = None;
                self.stage = PaymentStage::Success;
                self.receipt = Some(receipt.clone());
                self.schedule_redirect();
                Ok(receipt)
            }
            Err(err) => {
                error!(flow_id = %self.draft.id, "Booking error: {}", err);
                let clear_pin = self.settings.clear_pin_on_failure;
                if let Some(session) = self.payment.as_mut() {
                    session.processing = false;
                    if clear_pin {
                        session.pin.clear();
                    }
                }
                Err(FlowError::BookingFailed(err.to_string()))
            }
        }
    }

    /// Give up on a submission whose outcome will never be reported.
    ///
    /// Same effect as a failed attempt: `processing` resets and the PIN
    /// policy applies. Returns false when the submission is no longer active.
    pub fn abandon_submission(&mut self, pending: &PendingSubmission) -> bool {
        if self.stage != PaymentStage::Payment {
            return false;
        }
        let clear_pin = self.settings.clear_pin_on_failure;
        match self.payment.as_mut() {
            Some(session) if session.id == pending.payment_id && session.processing => {
                session.processing = false;
                if clear_pin {
                    session.pin.clear();
                }
                warn!(flow_id = %self.draft.id, payment_id = %pending.payment_id, "Booking submission abandoned");
                true
            }
            _ => false,
        }
    }

    /// Submit the booking and wait for the endpoint.
    ///
    /// Cancelling `cancel` abandons the wait; the attempt is then reported as a
    /// failed booking and may be retried. Dropping the returned future before
    /// it resolves (a timeout, a losing `select!` arm) abandons the submission
    /// the same way.
    pub async fn confirm_payment(
        &mut self,
        gateway: &dyn BookingGateway,
        cancel: &CancellationToken,
    ) -> Result<BookingReceipt, FlowError> {
        let pending = self.begin_submission()?;
        let in_flight = InFlight { flow: self, pending: Some(pending) };
        let outcome = in_flight.send(gateway, cancel).await;
        in_flight.finish(outcome)
    }

    fn schedule_redirect(&mut self) {
        if self.redirect.is_some() {
            return;
        }

        let navigator = Arc::clone(&self.navigator);
        let delay = self.settings.redirect_delay;
        let redirect = async move {
            tokio::time::sleep(delay).await;
            let path = navigation::profile_refresh_path(Utc::now());
            info!("Redirecting to {}", path);
            navigator.navigate(&path);
        };

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => self.redirect = Some(handle.spawn(redirect)),
            Err(_) => {
                warn!("No async runtime for the redirect timer, navigating immediately");
                self.navigator.navigate(&navigation::profile_refresh_path(Utc::now()));
            }
        }
    }

    // ---- views ----

    pub fn stage(&self) -> PaymentStage {
        self.stage
    }

    pub fn venue(&self) -> &VenueSnapshot {
        &self.venue
    }

    pub fn draft(&self) -> &BookingDraft {
        &self.draft
    }

    pub fn payment(&self) -> Option<&PaymentSession> {
        self.payment.as_ref()
    }

    pub fn is_processing(&self) -> bool {
        self.payment.as_ref().is_some_and(|s| s.processing)
    }

    /// Confirm button state: full PIN and nothing in flight
    pub fn can_confirm(&self) -> bool {
        self.payment.as_ref().is_some_and(PaymentSession::can_confirm)
    }

    pub fn receipt(&self) -> Option<&BookingReceipt> {
        self.receipt.as_ref()
    }

    pub fn redirect_scheduled(&self) -> bool {
        self.redirect.is_some()
    }

    pub fn price_per_hour(&self) -> u32 {
        self.price_per_hour
    }

    pub fn total_price(&self) -> u32 {
        pricing::total_price(self.draft.duration_hours(), self.price_per_hour)
    }

    pub fn quote(&self) -> PriceQuote {
        PriceQuote {
            price_per_hour: self.price_per_hour,
            duration_hours: self.draft.duration_hours(),
            total: self.total_price(),
            is_fallback: self.price_is_fallback,
        }
    }

    /// Courts still available to add
    pub fn court_options(&self) -> Vec<String> {
        schedule::court_options(&self.venue, self.draft.courts.as_slice())
    }

    pub fn date_options(&self, today: NaiveDate) -> Vec<NaiveDate> {
        schedule::date_options(today, schedule::BOOKING_WINDOW_DAYS)
    }

    pub fn time_slots(&self) -> Vec<TimeSlot> {
        schedule::time_slots()
    }

    fn reprice(&mut self) {
        let (rate, fallback) = self.settings.pricing.rate_for(Some(&self.venue), &self.draft.sport);
        self.price_per_hour = rate;
        self.price_is_fallback = fallback;
    }

    fn ensure_stage(&self, expected: PaymentStage) -> Result<(), FlowError> {
        if self.stage != expected {
            return Err(FlowError::InvalidStage { expected, actual: self.stage });
        }
        Ok(())
    }

    fn payment_mut(&mut self) -> Result<&mut PaymentSession, FlowError> {
        let actual = self.stage;
        self.payment.as_mut().ok_or(FlowError::InvalidStage {
            expected: PaymentStage::Payment,
            actual,
        })
    }
}

/// A submission between `begin_submission` and its outcome. Dropped early,
/// it abandons the submission so the flow does not stay `processing`.
struct InFlight<'a> {
    flow: &'a mut BookingFlowController,
    pending: Option<PendingSubmission>,
}

impl InFlight<'_> {
    async fn send(
        &self,
        gateway: &dyn BookingGateway,
        cancel: &CancellationToken,
    ) -> Result<BookingRecord, GatewayError> {
        let Some(pending) = self.pending.as_ref() else {
            return Err(GatewayError::Cancelled);
        };

        tokio::select! {
            result = gateway.create_booking(&pending.request) => result,
            _ = cancel.cancelled() => {
                warn!(flow_id = %self.flow.draft.id, "Booking submission cancelled");
                Err(GatewayError::Cancelled)
            }
        }
    }

    fn finish(mut self, outcome: Result<BookingRecord, GatewayError>) -> Result<BookingReceipt, FlowError> {
        match self.pending.take() {
            Some(pending) => self.flow.complete_submission(&pending, outcome),
            None => Err(FlowError::StaleSubmission),
        }
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if let Some(pending) = self.pending.take() {
            self.flow.abandon_submission(&pending);
        }
    }
}

impl Drop for BookingFlowController {
    fn drop(&mut self) {
        // Leaving the page cancels a redirect that has not fired yet
        if let Some(redirect) = self.redirect.take() {
            redirect.abort();
        }
    }
}
