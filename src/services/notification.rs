use std::time::Duration;

use chrono::NaiveDate;

use crate::models::{Booking, Inquiry};
use crate::services::messaging::{Mailer, OutgoingEmail};
use crate::state::AppState;

#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    #[error("notification timed out after {0:?}")]
    Timeout(Duration),

    #[error("notification delivery failed: {0:#}")]
    Delivery(#[source] anyhow::Error),
}

pub async fn dispatch(
    mailer: &dyn Mailer,
    email: &OutgoingEmail,
    timeout: Duration,
) -> Result<(), NotificationError> {
    match tokio::time::timeout(timeout, mailer.send_email(email)).await {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => Err(NotificationError::Delivery(e)),
        Err(_) => Err(NotificationError::Timeout(timeout)),
    }
}

/// Sends the booking confirmation. Failures are logged and swallowed: the
/// stored booking and its reference code stay authoritative.
pub async fn notify_booking_confirmed(state: &AppState, booking: &Booking) {
    let email = booking_confirmation(booking, &state.config.email_from_name);
    match dispatch(state.mailer.as_ref(), &email, state.config.notification_timeout).await {
        Ok(()) => tracing::info!(
            booking_id = %booking.id,
            reference_code = %booking.reference_code,
            "booking confirmation sent"
        ),
        Err(e) => tracing::warn!(
            booking_id = %booking.id,
            reference_code = %booking.reference_code,
            error = %e,
            "booking confirmation not delivered"
        ),
    }
}

pub async fn notify_inquiry_received(state: &AppState, inquiry: &Inquiry) {
    let email = inquiry_acknowledgement(inquiry, &state.config.email_from_name);
    if let Err(e) = dispatch(state.mailer.as_ref(), &email, state.config.notification_timeout).await {
        tracing::warn!(inquiry_id = %inquiry.id, error = %e, "inquiry acknowledgement not delivered");
    }
}

pub fn booking_confirmation(booking: &Booking, museum: &str) -> OutgoingEmail {
    let date = long_date(&booking.selected_date);
    let time = booking
        .selected_time
        .strip_suffix(":00")
        .unwrap_or(&booking.selected_time);

    let html = format!(
        "<h1>Booking Confirmation</h1>\
         <p>Dear {name},</p>\
         <p>Thank you for choosing to visit {museum}. We're excited to welcome you!</p>\
         <p><strong>Date:</strong> {date}<br><strong>Time:</strong> {time}</p>\
         <p>Your reference code: <strong>{code}</strong><br>Please keep this code handy during your visit.</p>\
         <ul>\
         <li>Please arrive 15 minutes before your scheduled time</li>\
         <li>Bring a valid ID for verification</li>\
         <li>Photography without flash is allowed in most galleries</li>\
         </ul>",
        name = escape(&booking.visitor_name),
        museum = escape(museum),
        date = date,
        time = escape(time),
        code = booking.reference_code,
    );

    OutgoingEmail {
        to: booking.email.clone(),
        subject: format!("Booking Confirmation - Reference: {}", booking.reference_code),
        html,
    }
}

pub fn inquiry_acknowledgement(inquiry: &Inquiry, museum: &str) -> OutgoingEmail {
    let html = format!(
        "<h1>Thank You for Contacting Us</h1>\
         <p>Dear {name},</p>\
         <p>Thank you for your inquiry regarding \"{subject}\". We have received your message \
         and will get back to you as soon as possible.</p>\
         <p>Our team typically responds within 24-48 hours during business days.</p>\
         <p>This is an automated response, please do not reply to this email.</p>",
        name = escape(&inquiry.full_name),
        subject = escape(&inquiry.subject),
    );

    OutgoingEmail {
        to: inquiry.email.clone(),
        subject: format!("Thank you for your inquiry - {museum}"),
        html,
    }
}

// "2025-06-10" -> "Tuesday, June 10, 2025"
fn long_date(date: &str) -> String {
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map(|d| d.format("%A, %B %-d, %Y").to_string())
        .unwrap_or_else(|_| date.to_string())
}

fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BookingStatus, StatusChange};
    use async_trait::async_trait;
    use chrono::Utc;

    fn booking() -> Booking {
        Booking {
            id: "b-1".to_string(),
            visitor_name: "Ana <script>".to_string(),
            email: "ana@example.com".to_string(),
            selected_date: "2025-06-10".to_string(),
            selected_time: "10:00 AM".to_string(),
            status: BookingStatus::Confirmed,
            status_history: vec![StatusChange::new(BookingStatus::Confirmed, "Booking confirmed")],
            timestamp: Utc::now(),
            reference_code: "MMDT4K9Z2Q".to_string(),
        }
    }

    struct Failing;

    #[async_trait]
    impl Mailer for Failing {
        async fn send_email(&self, _email: &OutgoingEmail) -> anyhow::Result<()> {
            anyhow::bail!("relay rejected sender")
        }
    }

    struct Slow;

    #[async_trait]
    impl Mailer for Slow {
        async fn send_email(&self, _email: &OutgoingEmail) -> anyhow::Result<()> {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok(())
        }
    }

    #[test]
    fn test_long_date() {
        assert_eq!(long_date("2025-06-10"), "Tuesday, June 10, 2025");
        assert_eq!(long_date("not-a-date"), "not-a-date");
    }

    #[test]
    fn test_booking_confirmation_contents() {
        let email = booking_confirmation(&booking(), "Museo de Malaquing Tubig");
        assert_eq!(email.to, "ana@example.com");
        assert_eq!(email.subject, "Booking Confirmation - Reference: MMDT4K9Z2Q");
        assert!(email.html.contains("Tuesday, June 10, 2025"));
        assert!(email.html.contains("10:00 AM"));
        assert!(email.html.contains("MMDT4K9Z2Q"));
        assert!(email.html.contains("Ana &lt;script&gt;"));
    }

    #[test]
    fn test_time_label_drops_trailing_seconds() {
        let mut b = booking();
        b.selected_time = "14:30:00".to_string();
        let email = booking_confirmation(&b, "Museo");
        assert!(email.html.contains("<strong>Time:</strong> 14:30<"));
    }

    #[tokio::test]
    async fn test_dispatch_reports_delivery_failure() {
        let email = booking_confirmation(&booking(), "Museo");
        let err = dispatch(&Failing, &email, Duration::from_secs(1)).await.unwrap_err();
        assert!(matches!(err, NotificationError::Delivery(_)));
    }

    #[tokio::test]
    async fn test_dispatch_times_out() {
        let email = booking_confirmation(&booking(), "Museo");
        let err = dispatch(&Slow, &email, Duration::from_millis(50)).await.unwrap_err();
        assert!(matches!(err, NotificationError::Timeout(_)));
    }
}
