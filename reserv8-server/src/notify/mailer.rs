//! SMTP mailer

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use super::{BookingConfirmation, Notifier, NotifyError};
use crate::config::MailConfig;

const CONFIRMATION_SUBJECT: &str = "Your Restaurant Booking Confirmation";

/// Sends HTML mail through an authenticated SMTP relay
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: String,
}

impl SmtpMailer {
    /// Build the relay transport. No connection is made until the first send.
    pub fn new(config: &MailConfig) -> Result<Self, NotifyError> {
        let creds = Credentials::new(config.username.clone(), config.password.clone());

        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&config.smtp_host)?
            .credentials(creds)
            .build();

        Ok(Self {
            transport,
            from: config.from.clone(),
        })
    }

    fn confirmation_message(
        &self,
        to: &str,
        booking: &BookingConfirmation,
    ) -> Result<Message, NotifyError> {
        Ok(Message::builder()
            .from(self.from.parse()?)
            .to(to.parse()?)
            .subject(CONFIRMATION_SUBJECT)
            .header(ContentType::TEXT_HTML)
            .body(render_confirmation(booking))?)
    }
}

#[async_trait]
impl Notifier for SmtpMailer {
    async fn send_booking_confirmation(
        &self,
        to: &str,
        booking: &BookingConfirmation,
    ) -> Result<(), NotifyError> {
        let message = self.confirmation_message(to, booking)?;
        self.transport.send(message).await?;
        Ok(())
    }
}

/// HTML body of the confirmation email
pub fn render_confirmation(booking: &BookingConfirmation) -> String {
    let restaurant = escape_html(&booking.restaurant_name);
    let people = booking
        .people
        .map(|p| format!("\n        <p><strong>Number of People:</strong> {}</p>", p))
        .unwrap_or_default();

    format!(
        r#"<div style="font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto; padding: 20px;">
      <h1 style="color: #2563eb;">Booking Confirmed!</h1>
      <p>Hi {customer}, your table has been successfully booked at {restaurant}.</p>

      <div style="background-color: #f3f4f6; padding: 20px; border-radius: 8px; margin: 20px 0;">
        <h2 style="color: #1f2937; margin-top: 0;">Booking Details</h2>
        <p><strong>Date:</strong> {date}</p>
        <p><strong>Time:</strong> {time}</p>
        <p><strong>Tables:</strong> {tables}</p>{people}
        <p><strong>Restaurant:</strong> {restaurant}</p>
      </div>

      <p style="color: #4b5563;">
        If you need to modify or cancel your reservation, please contact the restaurant directly.
      </p>

      <div style="margin-top: 30px; padding-top: 20px; border-top: 1px solid #e5e7eb;">
        <p style="color: #6b7280; font-size: 14px;">
          This is an automated message, please do not reply to this email.
        </p>
      </div>
    </div>"#,
        customer = escape_html(&booking.customer_name),
        restaurant = restaurant,
        date = booking.date,
        time = booking.slot.to_twelve_hour(),
        tables = booking.tables.get(),
        people = people,
    )
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::tests::confirmation;

    fn config() -> MailConfig {
        MailConfig {
            smtp_host: "smtp.example.com".into(),
            username: "bot@example.com".into(),
            password: "secret".into(),
            from: "Reserv8 <noreply@reserv8.com>".into(),
        }
    }

    #[test]
    fn body_lists_booking_details() {
        let html = render_confirmation(&confirmation());
        assert!(html.contains("Olive Bistro"));
        assert!(html.contains("<strong>Date:</strong> 2025-03-14"));
        assert!(html.contains("<strong>Time:</strong> 7:30 PM"));
        assert!(html.contains("<strong>Number of People:</strong> 4"));
    }

    #[test]
    fn body_omits_unknown_party_size() {
        let mut booking = confirmation();
        booking.people = None;
        assert!(!render_confirmation(&booking).contains("Number of People"));
    }

    #[test]
    fn names_are_escaped() {
        let mut booking = confirmation();
        booking.restaurant_name = "Fish & <Chips>".into();
        let html = render_confirmation(&booking);
        assert!(html.contains("Fish &amp; &lt;Chips&gt;"));
        assert!(!html.contains("<Chips>"));
    }

    #[tokio::test]
    async fn builds_message_without_connecting() {
        let mailer = SmtpMailer::new(&config()).unwrap();
        let message = mailer
            .confirmation_message("guest@example.com", &confirmation())
            .unwrap();
        let raw = String::from_utf8(message.formatted()).unwrap();
        assert!(raw.contains("Subject: Your Restaurant Booking Confirmation"));
        assert!(raw.contains("To: guest@example.com"));
    }

    #[tokio::test]
    async fn bad_recipient_is_an_address_error() {
        let mailer = SmtpMailer::new(&config()).unwrap();
        let err = mailer
            .confirmation_message("not an address", &confirmation())
            .unwrap_err();
        assert!(matches!(err, NotifyError::Address(_)));
    }
}
