use std::sync::Arc;
use chrono::Local;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc::UnboundedReceiver;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use quickcourt_booking::{BookingFlowController, FlowError};
use quickcourt_core::{PaymentStage, PIN_LENGTH};
use crate::command::{Command, DurationChange, HELP};
use crate::navigator::ChannelNavigator;
use crate::state::AppState;

/// Dates listed by `options`; the picker itself accepts the whole window
const LISTED_DATES: usize = 7;

/// Why the command loop stopped
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Exit {
    Redirected(String),
    Quit,
    EndOfInput,
}

/// Fetch the venue and open the booking form for the current session
pub async fn open(
    state: &AppState,
    venue_id: &str,
) -> Result<(BookingFlowController, UnboundedReceiver<String>), FlowError> {
    let (navigator, redirects) = ChannelNavigator::new();
    let flow = BookingFlowController::mount(
        state.venues.as_ref(),
        venue_id,
        state.session.contact_prefill(),
        Arc::new(navigator),
        state.settings.clone(),
    )
    .await?;
    Ok((flow, redirects))
}

/// Line-oriented booking page.
///
/// Reads commands from `input` until the user quits, input runs out, or the
/// flow navigates away after a successful booking. Flow errors are printed as
/// `! <message>` alerts and never end the loop.
pub async fn run<R, W>(
    flow: &mut BookingFlowController,
    redirects: &mut UnboundedReceiver<String>,
    state: &AppState,
    input: R,
    output: &mut W,
) -> std::io::Result<Exit>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = input.lines();
    write_out(output, &render(flow)).await?;

    loop {
        tokio::select! {
            biased;

            Some(path) = redirects.recv() => {
                write_out(output, &format!("Redirecting to {}\n", path)).await?;
                return Ok(Exit::Redirected(path));
            }

            line = lines.next_line() => {
                let Some(line) = line? else {
                    // Input is gone but a booking went through: wait for the redirect
                    if flow.redirect_scheduled() {
                        if let Some(path) = redirects.recv().await {
                            write_out(output, &format!("Redirecting to {}\n", path)).await?;
                            return Ok(Exit::Redirected(path));
                        }
                    }
                    return Ok(Exit::EndOfInput);
                };

                match Command::parse(&line) {
                    Ok(None) => {}
                    Ok(Some(Command::Quit)) => return Ok(Exit::Quit),
                    Ok(Some(command)) => {
                        debug!("Command: {:?}", command);
                        let text = match execute(flow, state, command).await {
                            Ok(text) => text,
                            Err(e) => alert(&e.to_string()),
                        };
                        write_out(output, &text).await?;
                    }
                    Err(e) => write_out(output, &alert(&e.to_string())).await?,
                }
            }
        }
    }
}

async fn execute(
    flow: &mut BookingFlowController,
    state: &AppState,
    command: Command,
) -> Result<String, FlowError> {
    let text = match command {
        Command::Sport(name) => {
            flow.select_sport(&name)?;
            summary(flow)
        }
        Command::Date(value) => {
            flow.set_date(&value)?;
            format!("Date: {}\n", or_dash(&flow.draft().date))
        }
        Command::Time(value) => {
            flow.set_start_time(&value)?;
            format!("Start time: {}\n", or_dash(&flow.draft().start_time))
        }
        Command::Duration(change) => {
            match change {
                DurationChange::By(delta) => flow.change_duration(delta)?,
                DurationChange::To(hours) => flow.set_duration(hours)?,
            };
            summary(flow)
        }
        Command::AddCourt(label) => {
            if !flow.add_court(&label)? {
                return Ok(format!("{} is already selected\n", label));
            }
            courts_line(flow)
        }
        Command::RemoveCourt(label) => {
            flow.remove_court(&label)?;
            courts_line(flow)
        }
        Command::Contact(field, value) => {
            flow.set_contact(field, &value)?;
            String::new()
        }
        Command::Continue => {
            flow.continue_to_payment()?;
            render(flow)
        }
        Command::Pin(digits) => {
            for ch in digits.chars() {
                if !flow.type_pin_digit(&ch.to_string())? {
                    let message = if ch.is_ascii_digit() {
                        "PIN already has 6 digits, extra input ignored"
                    } else {
                        "PIN digits must be 0-9"
                    };
                    warn!("Ignored PIN input: {}", message);
                    return Ok(format!("{}{}", alert(message), pin_line(flow)));
                }
            }
            pin_line(flow)
        }
        Command::PinSlot(slot, value) => {
            if slot >= PIN_LENGTH {
                return Ok(alert("PIN slots are 1-6"));
            }
            if !flow.set_pin_digit(slot, &value)? {
                return Ok(format!("{}{}", alert("PIN digits must be 0-9"), pin_line(flow)));
            }
            pin_line(flow)
        }
        Command::Backspace => {
            let focus = flow.payment().map(|p| p.pin.focus()).unwrap_or(0);
            flow.pin_backspace(focus)?;
            pin_line(flow)
        }
        Command::Back => {
            flow.go_back()?;
            render(flow)
        }
        Command::Confirm => confirm(flow, state).await?,
        Command::Show => render(flow),
        Command::Options => options(flow),
        Command::Help => format!("{}\n", HELP),
        Command::Quit => String::new(),
    };
    Ok(text)
}

async fn confirm(flow: &mut BookingFlowController, state: &AppState) -> Result<String, FlowError> {
    let cancel = CancellationToken::new();
    let timer = state.submit_timeout.map(|timeout| {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(timeout).await;
            warn!("Booking request timed out after {:?}", timeout);
            cancel.cancel();
        })
    });

    let result = flow.confirm_payment(state.bookings.as_ref(), &cancel).await;
    if let Some(timer) = timer {
        timer.abort();
    }

    let receipt = result?;
    info!("Booking {} confirmed", receipt.booking_id);
    Ok(render(flow))
}

fn render(flow: &BookingFlowController) -> String {
    let venue = flow.venue();
    let mut out = format!(
        "== {} ==\n{}\nRating {:.1} ({} reviews)\n",
        venue.name, venue.address, venue.rating, venue.total_reviews
    );

    match flow.stage() {
        PaymentStage::Form => {
            out.push_str("-- Booking details --\n");
            out.push_str(&summary(flow));
            let contact = &flow.draft().contact;
            out.push_str(&format!(
                "Contact: {} / {} / {}\n",
                or_dash(&contact.name),
                or_dash(contact.phone.expose()),
                or_dash(contact.email.expose())
            ));
        }
        PaymentStage::Payment => {
            out.push_str("-- UPI payment --\n");
            out.push_str(&summary(flow));
            out.push_str(&pin_line(flow));
        }
        PaymentStage::Success => {
            out.push_str("-- Booking confirmed --\n");
            if let Some(receipt) = flow.receipt() {
                out.push_str(&format!(
                    "Booking ID: {}\n{} on {} {}-{}\nCourts: {}\nPaid: ₹{}\n",
                    receipt.booking_id,
                    receipt.sport,
                    receipt.date,
                    receipt.start_time,
                    receipt.end_time,
                    receipt.courts.join(", "),
                    receipt.amount_paid
                ));
            }
            out.push_str("Taking you to your profile...\n");
        }
    }
    out
}

fn summary(flow: &BookingFlowController) -> String {
    let draft = flow.draft();
    let quote = flow.quote();
    let mut out = format!(
        "Sport: {}\nDate: {}\nStart time: {}\nDuration: {}h\n",
        or_dash(&draft.sport),
        or_dash(&draft.date),
        or_dash(&draft.start_time),
        quote.duration_hours
    );
    out.push_str(&courts_line(flow));
    out.push_str(&format!(
        "Price: ₹{}/hour x {}h = ₹{}{}\n",
        quote.price_per_hour,
        quote.duration_hours,
        quote.total,
        if quote.is_fallback { " (standard rate)" } else { "" }
    ));
    out
}

fn courts_line(flow: &BookingFlowController) -> String {
    let courts = flow.draft().courts.as_slice();
    if courts.is_empty() {
        return "Courts: -\n".to_string();
    }
    format!("Courts: {}\n", courts.join(", "))
}

fn pin_line(flow: &BookingFlowController) -> String {
    let Some(session) = flow.payment() else {
        return String::new();
    };
    let slots: String = (0..PIN_LENGTH)
        .map(|i| if session.pin.digit(i).is_some() { '●' } else { '○' })
        .collect();
    format!(
        "PIN: {} [{}]\n",
        slots,
        if flow.can_confirm() { "ready to confirm" } else { "enter 6 digits" }
    )
}

fn options(flow: &BookingFlowController) -> String {
    let today = Local::now().date_naive();
    let dates = flow.date_options(today);
    let listed: Vec<String> = dates
        .iter()
        .take(LISTED_DATES)
        .map(|d| d.format("%Y-%m-%d").to_string())
        .collect();
    let times: Vec<String> = flow.time_slots().into_iter().map(|t| t.value).collect();
    let courts = flow.court_options();

    format!(
        "Sports: {}\nDates: {} ... ({} days)\nTimes: {}\nCourts: {}\n",
        flow.venue().sport_names().join(", "),
        listed.join(", "),
        dates.len(),
        times.join(" "),
        if courts.is_empty() { "-".to_string() } else { courts.join(", ") }
    )
}

fn alert(message: &str) -> String {
    format!("! {}\n", message)
}

fn or_dash(value: &str) -> &str {
    if value.is_empty() { "-" } else { value }
}

async fn write_out<W: AsyncWrite + Unpin>(output: &mut W, text: &str) -> std::io::Result<()> {
    if text.is_empty() {
        return Ok(());
    }
    output.write_all(text.as_bytes()).await?;
    output.flush().await
}
