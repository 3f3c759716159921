use std::sync::Arc;
use std::time::Duration;
use quickcourt_booking::{BookingFlowController, ContactField, FlowError, FlowSettings};
use quickcourt_catalog::{SlotPrice, VenueSnapshot, VenueSport};
use quickcourt_core::gateway::mock::{BookingOutcome, ScriptedBookingGateway, StaticVenueGateway};
use quickcourt_core::navigation::RecordingNavigator;
use quickcourt_core::{ContactPrefill, GatewayError, PaymentStage};
use tokio_util::sync::CancellationToken;

fn tennis_venue(prices: &[f64]) -> VenueSnapshot {
    VenueSnapshot {
        id: 3,
        name: "Smash Arena".to_string(),
        address: "12 MG Road".to_string(),
        rating: 4.5,
        total_reviews: 18,
        sports: vec![VenueSport {
            id: 11,
            name: "Tennis".to_string(),
            icon: Some("🎾".to_string()),
            pricing: prices
                .iter()
                .map(|p| SlotPrice { time_slot: "evening".to_string(), price_per_hour: *p })
                .collect(),
            number_of_courts: 2,
        }],
    }
}

async fn open_flow(navigator: Arc<RecordingNavigator>) -> BookingFlowController {
    let venues = StaticVenueGateway::new(tennis_venue(&[600.0]));
    BookingFlowController::mount(
        &venues,
        "3",
        ContactPrefill { name: "Asha".to_string(), email: "asha@example.com".to_string() },
        navigator,
        FlowSettings::default(),
    )
    .await
    .unwrap()
}

fn fill_and_continue(flow: &mut BookingFlowController) {
    flow.set_date("2026-10-20").unwrap();
    flow.set_start_time("18:00").unwrap();
    flow.add_court("Tennis Court 1").unwrap();
    flow.set_contact(ContactField::Phone, "9876543210").unwrap();
    flow.continue_to_payment().unwrap();
}

fn enter_pin(flow: &mut BookingFlowController, pin: &str) {
    for (i, d) in pin.chars().enumerate() {
        flow.set_pin_digit(i, &d.to_string()).unwrap();
    }
}

#[tokio::test]
async fn test_tennis_two_hours_costs_1200() {
    let mut flow = open_flow(Arc::new(RecordingNavigator::default())).await;
    flow.select_sport("Tennis").unwrap();
    flow.set_duration(2).unwrap();

    assert_eq!(flow.price_per_hour(), 600);
    assert_eq!(flow.total_price(), 1200);
}

#[tokio::test]
async fn test_duration_clamped_through_stepper() {
    let mut flow = open_flow(Arc::new(RecordingNavigator::default())).await;
    for _ in 0..20 {
        flow.change_duration(1).unwrap();
    }
    assert_eq!(flow.draft().duration_hours(), 8);
    assert_eq!(flow.total_price(), 8 * 600);

    for _ in 0..20 {
        flow.change_duration(-1).unwrap();
    }
    assert_eq!(flow.draft().duration_hours(), 1);
    assert_eq!(flow.total_price(), 600);
}

#[tokio::test]
async fn test_sequential_pin_enables_confirm() {
    let mut flow = open_flow(Arc::new(RecordingNavigator::default())).await;
    fill_and_continue(&mut flow);
    assert!(!flow.can_confirm());

    enter_pin(&mut flow, "123456");
    assert_eq!(flow.payment().unwrap().pin.joined(), "123456");
    assert!(flow.can_confirm());
}

#[tokio::test]
async fn test_bad_email_keeps_flow_out_of_payment() {
    let mut flow = open_flow(Arc::new(RecordingNavigator::default())).await;
    fill_and_continue(&mut flow);
    enter_pin(&mut flow, "123456");

    // Back to the form, break the email, try to come forward again
    flow.go_back().unwrap();
    flow.set_contact(ContactField::Email, "bad-email").unwrap();
    let err = flow.continue_to_payment().unwrap_err();
    assert_eq!(err.to_string(), "Please enter a valid email address");
    assert_eq!(flow.stage(), PaymentStage::Form);

    // Confirming from the form is a stage error and sends nothing
    let bookings = ScriptedBookingGateway::new(vec![]);
    let result = flow.confirm_payment(&bookings, &CancellationToken::new()).await;
    assert!(matches!(
        result,
        Err(FlowError::InvalidStage { expected: PaymentStage::Payment, actual: PaymentStage::Form })
    ));
    assert!(bookings.requests().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_timeout_around_confirm_leaves_flow_usable() {
    let bookings = ScriptedBookingGateway::new(vec![BookingOutcome::Hang]);
    let mut flow = open_flow(Arc::new(RecordingNavigator::default())).await;
    fill_and_continue(&mut flow);
    enter_pin(&mut flow, "123456");

    let elapsed = tokio::time::timeout(
        Duration::from_secs(5),
        flow.confirm_payment(&bookings, &CancellationToken::new()),
    )
    .await;
    assert!(elapsed.is_err());
    assert!(!flow.is_processing());

    flow.go_back().unwrap();
    assert_eq!(flow.stage(), PaymentStage::Form);
}

#[tokio::test]
async fn test_http_500_keeps_payment_stage_and_pin() {
    let bookings = ScriptedBookingGateway::new(vec![BookingOutcome::Failed(GatewayError::Rejected {
        status: 500,
        message: "Server error (500): Internal Server Error".to_string(),
    })]);
    let navigator = Arc::new(RecordingNavigator::default());
    let mut flow = open_flow(navigator.clone()).await;
    fill_and_continue(&mut flow);
    enter_pin(&mut flow, "123456");

    let err = flow.confirm_payment(&bookings, &CancellationToken::new()).await.unwrap_err();

    assert!(matches!(err, FlowError::BookingFailed(_)));
    assert_eq!(err.to_string(), "Booking failed: Server error (500): Internal Server Error");
    assert_eq!(flow.stage(), PaymentStage::Payment);
    assert!(!flow.is_processing());
    assert_eq!(flow.payment().unwrap().pin.joined(), "123456");
    assert!(navigator.paths().is_empty());

    // Manual retry goes through with the same PIN
    let receipt = flow.confirm_payment(&bookings, &CancellationToken::new()).await.unwrap();
    assert_eq!(receipt.booking_id, "1");
    assert_eq!(bookings.requests().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_success_redirects_once_after_delay() {
    let bookings = ScriptedBookingGateway::new(vec![]);
    let navigator = Arc::new(RecordingNavigator::default());
    let mut flow = open_flow(navigator.clone()).await;
    fill_and_continue(&mut flow);
    enter_pin(&mut flow, "123456");

    let receipt = flow.confirm_payment(&bookings, &CancellationToken::new()).await.unwrap();
    assert_eq!(flow.stage(), PaymentStage::Success);
    assert!(flow.payment().is_none());
    assert_eq!(receipt.amount_paid, 1200);
    assert_eq!(receipt.end_time, "20:00");
    assert_eq!(receipt.courts, vec!["Tennis Court 1"]);

    let sent = &bookings.requests()[0];
    assert_eq!(sent.venue, 3);
    assert_eq!(sent.venue_sport, 11);
    assert_eq!(sent.contact_name, "Asha");
    assert_eq!(sent.contact_email.expose(), "asha@example.com");

    tokio::time::sleep(Duration::from_millis(1_900)).await;
    assert!(navigator.paths().is_empty());

    tokio::time::sleep(Duration::from_millis(200)).await;
    tokio::task::yield_now().await;
    let paths = navigator.paths();
    assert_eq!(paths.len(), 1);
    assert!(paths[0].starts_with("/profile?refresh="));

    tokio::time::sleep(Duration::from_secs(10)).await;
    assert_eq!(navigator.paths().len(), 1);

    // Nothing leaves Success
    assert!(matches!(flow.go_back(), Err(FlowError::InvalidStage { .. })));
    assert!(matches!(flow.begin_submission(), Err(FlowError::InvalidStage { .. })));
}

#[tokio::test]
async fn test_venue_fetch_failure() {
    let venues = StaticVenueGateway::failing(GatewayError::Rejected {
        status: 404,
        message: "Failed to fetch venue details (404): Not found".to_string(),
    });
    let result = BookingFlowController::mount(
        &venues,
        "99",
        ContactPrefill::default(),
        Arc::new(RecordingNavigator::default()),
        FlowSettings::default(),
    )
    .await;

    match result {
        Err(FlowError::VenueUnavailable(message)) => {
            assert_eq!(message, "Failed to fetch venue details (404): Not found");
        }
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("mount should fail"),
    }
}
