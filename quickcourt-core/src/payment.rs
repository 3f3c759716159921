use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use crate::{CoreError, CoreResult};

pub const PIN_LENGTH: usize = 6;

/// Stage of the booking page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStage {
    Form,
    Payment,
    Success,
}

/// Six single-digit UPI PIN slots plus the slot that has focus
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpiPin {
    digits: [Option<u8>; PIN_LENGTH],
    focus: usize,
}

impl Default for UpiPin {
    fn default() -> Self {
        Self::new()
    }
}

impl UpiPin {
    pub fn new() -> Self {
        Self {
            digits: [None; PIN_LENGTH],
            focus: 0,
        }
    }

    /// Write `value` into slot `index`.
    ///
    /// `value` must be a single ASCII digit, or empty to clear the slot. Anything
    /// else is ignored and `Ok(false)` is returned. Entering a digit moves focus
    /// to the next slot.
    pub fn set_digit(&mut self, index: usize, value: &str) -> CoreResult<bool> {
        Self::check_index(index)?;

        let digit = match value.as_bytes() {
            [] => None,
            [b] if b.is_ascii_digit() => Some(b - b'0'),
            _ => return Ok(false),
        };

        self.digits[index] = digit;
        if digit.is_some() && index < PIN_LENGTH - 1 {
            self.focus = index + 1;
        } else {
            self.focus = index;
        }
        Ok(true)
    }

    /// Backspace pressed while slot `index` has focus.
    /// A filled slot is cleared in place; an empty slot moves focus back and
    /// clears the previous one.
    pub fn backspace(&mut self, index: usize) -> CoreResult<()> {
        Self::check_index(index)?;

        if self.digits[index].is_some() {
            self.digits[index] = None;
            self.focus = index;
        } else if index > 0 {
            self.digits[index - 1] = None;
            self.focus = index - 1;
        }
        Ok(())
    }

    /// Type a digit into the focused slot.
    /// A filled last slot takes no more input; `Ok(false)` is returned.
    pub fn push(&mut self, value: &str) -> CoreResult<bool> {
        let last = PIN_LENGTH - 1;
        if self.focus == last && self.digits[last].is_some() && !value.is_empty() {
            return Ok(false);
        }
        self.set_digit(self.focus, value)
    }

    /// Backspace on the focused slot
    pub fn pop(&mut self) -> CoreResult<()> {
        self.backspace(self.focus)
    }

    pub fn focus(&self) -> usize {
        self.focus
    }

    pub fn digit(&self, index: usize) -> Option<u8> {
        self.digits.get(index).copied().flatten()
    }

    /// Entered digits, in slot order, skipping empty slots
    pub fn joined(&self) -> String {
        self.digits
            .iter()
            .flatten()
            .map(|d| char::from(b'0' + d))
            .collect()
    }

    pub fn filled(&self) -> usize {
        self.digits.iter().flatten().count()
    }

    pub fn is_complete(&self) -> bool {
        self.joined().len() == PIN_LENGTH
    }

    pub fn clear(&mut self) {
        *self = Self::new();
    }

    fn check_index(index: usize) -> CoreResult<()> {
        if index >= PIN_LENGTH {
            return Err(CoreError::ValidationError(format!(
                "PIN slot {} out of range 0..{}",
                index, PIN_LENGTH
            )));
        }
        Ok(())
    }
}

/// Simulated UPI payment attempt. Lives from "continue to payment" until
/// success or "back".
#[derive(Debug, Clone)]
pub struct PaymentSession {
    pub id: Uuid,
    pub pin: UpiPin,
    /// A booking request is in flight
    pub processing: bool,
    pub opened_at: DateTime<Utc>,
}

impl PaymentSession {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            pin: UpiPin::new(),
            processing: false,
            opened_at: Utc::now(),
        }
    }

    /// The confirm button is live
    pub fn can_confirm(&self) -> bool {
        self.pin.is_complete() && !self.processing
    }
}

impl Default for PaymentSession {
    fn default() -> Self {
        Self::new()
    }
}
