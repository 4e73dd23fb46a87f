//! Booking notifications
//!
//! The confirmation email is sent after the booking transaction commits.
//! Its outcome is reported back as `emailSent` and never changes whether
//! the booking succeeded.

pub mod mailer;

use std::time::Duration;

use async_trait::async_trait;

use crate::models::{BookingDate, TableCount, TimeSlot};

pub use mailer::SmtpMailer;

/// Upper bound on how long a response waits for the mail relay
pub const SEND_TIMEOUT: Duration = Duration::from_secs(10);

/// Details rendered into the confirmation email
#[derive(Debug, Clone)]
pub struct BookingConfirmation {
    pub restaurant_name: String,
    pub customer_name: String,
    pub date: BookingDate,
    pub slot: TimeSlot,
    pub tables: TableCount,
    pub people: Option<i32>,
}

/// Notification error
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("invalid address: {0}")]
    Address(#[from] lettre::address::AddressError),

    #[error("could not build message: {0}")]
    Message(#[from] lettre::error::Error),

    #[error("smtp error: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),

    #[error("email is not configured")]
    Disabled,
}

/// Sends booking confirmations
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send_booking_confirmation(
        &self,
        to: &str,
        booking: &BookingConfirmation,
    ) -> Result<(), NotifyError>;
}

/// Notifier used when no mail relay is configured
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledNotifier;

#[async_trait]
impl Notifier for DisabledNotifier {
    async fn send_booking_confirmation(
        &self,
        _to: &str,
        _booking: &BookingConfirmation,
    ) -> Result<(), NotifyError> {
        Err(NotifyError::Disabled)
    }
}

/// Send a confirmation, logging failures. Returns whether it was sent.
pub async fn dispatch(
    notifier: &dyn Notifier,
    to: &str,
    booking: &BookingConfirmation,
    timeout: Duration,
) -> bool {
    match tokio::time::timeout(timeout, notifier.send_booking_confirmation(to, booking)).await {
        Ok(Ok(())) => {
            tracing::info!(restaurant = %booking.restaurant_name, "confirmation email sent");
            true
        }
        Ok(Err(NotifyError::Disabled)) => {
            tracing::debug!("email disabled, skipping confirmation");
            false
        }
        Ok(Err(e)) => {
            tracing::warn!(error = %e, "confirmation email failed");
            false
        }
        Err(_) => {
            tracing::warn!(timeout_secs = timeout.as_secs(), "confirmation email timed out");
            false
        }
    }
}
