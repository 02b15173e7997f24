use anyhow::Context;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use rusqlite::Connection;
use serde::Deserialize;
use uuid::Uuid;

use crate::db::queries;
use crate::errors::AppError;
use crate::models::{Booking, BookingStatus, SlotDay, StatusChange};
use crate::services::{notification, reference, required, verification};
use crate::state::AppState;

/// Raw booking submission as posted by the visit form.
#[derive(Debug, Default, Deserialize)]
pub struct BookingRequest {
    pub visitor_name: Option<String>,
    pub email: Option<String>,
    pub selected_date: Option<String>,
    pub selected_time: Option<String>,
    #[serde(rename = "recaptchaToken")]
    pub recaptcha_token: Option<String>,
}

/// A request that passed validation, with its date in `YYYY-MM-DD` form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedBooking {
    pub visitor_name: String,
    pub email: String,
    pub selected_date: String,
    pub selected_time: String,
}

/// Validates, persists and confirms a booking.
pub async fn create_booking(state: &AppState, request: BookingRequest) -> Result<Booking, AppError> {
    let validated = validate_booking(state, request).await?;

    let booking = {
        let db = state.db()?;
        write_booking(&db, validated)?
    };

    tracing::info!(
        booking_id = %booking.id,
        reference_code = %booking.reference_code,
        date = %booking.selected_date,
        time = %booking.selected_time,
        "booking confirmed"
    );

    notification::notify_booking_confirmed(state, &booking).await;

    Ok(booking)
}

pub async fn validate_booking(
    state: &AppState,
    request: BookingRequest,
) -> Result<ValidatedBooking, AppError> {
    // Matched verbatim against the slot label; never trimmed.
    let selected_time = request
        .selected_time
        .as_deref()
        .filter(|time| !time.trim().is_empty());

    let (Some(visitor_name), Some(email), Some(raw_date), Some(selected_time), Some(token)) = (
        required(&request.visitor_name),
        required(&request.email),
        required(&request.selected_date),
        selected_time,
        required(&request.recaptcha_token),
    ) else {
        return Err(AppError::Validation("All fields are required".to_string()));
    };

    let selected_date = normalize_date(raw_date)
        .ok_or_else(|| AppError::Validation(format!("Invalid date: {raw_date}")))?
        .format("%Y-%m-%d")
        .to_string();

    tracing::debug!(received = %raw_date, normalized = %selected_date, time = %selected_time, "booking request");

    verification::verify_token(
        state.verifier.as_ref(),
        token,
        state.config.verification_timeout,
    )
    .await?;

    let day = {
        let db = state.db()?;
        queries::find_slot_day(&db, &selected_date).context("failed to load slot day")?
    };
    check_slot(day.as_ref(), selected_time)?;

    Ok(ValidatedBooking {
        visitor_name: visitor_name.to_string(),
        email: email.to_string(),
        selected_date,
        selected_time: selected_time.to_string(),
    })
}

/// Decides from a snapshot whether `time` on `day` can take one more booking.
pub fn check_slot(day: Option<&SlotDay>, time: &str) -> Result<(), AppError> {
    let day = day.ok_or_else(|| AppError::NotAvailable("Selected date is not available".to_string()))?;
    let slot = day
        .find_slot(time)
        .ok_or_else(|| AppError::NotAvailable("Selected time slot not found".to_string()))?;

    if !slot.has_capacity() {
        return Err(AppError::SlotFull);
    }
    Ok(())
}

/// Inserts the booking and reserves its slot with a conditional increment,
/// both inside one transaction. When the increment does not go through, the
/// transaction is rolled back and the booking row goes with it.
pub fn write_booking(conn: &Connection, validated: ValidatedBooking) -> Result<Booking, AppError> {
    let booking = Booking {
        id: Uuid::new_v4().to_string(),
        visitor_name: validated.visitor_name,
        email: validated.email,
        selected_date: validated.selected_date,
        selected_time: validated.selected_time,
        status: BookingStatus::Confirmed,
        status_history: vec![StatusChange::new(BookingStatus::Confirmed, "Booking confirmed")],
        timestamp: Utc::now(),
        reference_code: reference::generate_reference_code(),
    };

    let tx = conn
        .unchecked_transaction()
        .context("failed to start booking transaction")?;

    queries::create_booking(&tx, &booking).context("failed to insert booking")?;

    let reserved = queries::increment_booking(&tx, &booking.selected_date, &booking.selected_time)
        .context("failed to reserve slot")?;

    if !reserved {
        tracing::warn!(
            booking_id = %booking.id,
            date = %booking.selected_date,
            time = %booking.selected_time,
            "slot filled before reservation, rolling back booking"
        );
        tx.rollback().context("failed to roll back booking")?;
        return Err(AppError::SlotFull);
    }

    tx.commit().context("failed to commit booking")?;

    Ok(booking)
}

/// Reduces a submitted date to its calendar day. Timestamps with an offset
/// are taken in UTC first.
pub fn normalize_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();

    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc).date_naive());
    }
    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(dt.date());
        }
    }
    NaiveDate::parse_from_str(raw, "%m/%d/%Y").ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use crate::models::TimeSlot;

    fn setup_db() -> Connection {
        db::init_db(":memory:").unwrap()
    }

    fn seed(conn: &Connection, max: i64, current: i64) {
        let mut slot = TimeSlot::new("10:00 AM", max);
        slot.current_bookings = current;
        queries::upsert_slot_day(
            conn,
            &SlotDay {
                date: "2025-06-10".to_string(),
                time_slots: vec![slot],
            },
        )
        .unwrap();
    }

    fn validated() -> ValidatedBooking {
        ValidatedBooking {
            visitor_name: "Lea".to_string(),
            email: "lea@example.com".to_string(),
            selected_date: "2025-06-10".to_string(),
            selected_time: "10:00 AM".to_string(),
        }
    }

    fn current_bookings(conn: &Connection) -> i64 {
        queries::find_slot_day(conn, "2025-06-10")
            .unwrap()
            .unwrap()
            .time_slots[0]
            .current_bookings
    }

    fn d(s: &str) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
    }

    #[test]
    fn test_normalize_date_formats() {
        assert_eq!(normalize_date("2025-06-10"), d("2025-06-10"));
        assert_eq!(normalize_date(" 2025-06-10 "), d("2025-06-10"));
        assert_eq!(normalize_date("2025-06-10T00:00:00.000Z"), d("2025-06-10"));
        assert_eq!(normalize_date("2025-06-10T15:45:00"), d("2025-06-10"));
        assert_eq!(normalize_date("06/10/2025"), d("2025-06-10"));
    }

    #[test]
    fn test_normalize_date_uses_utc_for_offsets() {
        // Midnight in Manila is still the previous day in UTC.
        assert_eq!(normalize_date("2025-06-10T00:00:00+08:00"), d("2025-06-09"));
    }

    #[test]
    fn test_normalize_date_rejects_garbage() {
        assert_eq!(normalize_date("next tuesday"), None);
        assert_eq!(normalize_date("2025-13-40"), None);
        assert_eq!(normalize_date(""), None);
    }

    #[test]
    fn test_check_slot_missing_day() {
        let result = check_slot(None, "10:00 AM");
        assert!(matches!(result, Err(AppError::NotAvailable(_))));
    }

    #[test]
    fn test_check_slot_unknown_time() {
        let day = SlotDay {
            date: "2025-06-10".to_string(),
            time_slots: vec![TimeSlot::new("10:00 AM", 2)],
        };
        let result = check_slot(Some(&day), "11:00 AM");
        assert!(matches!(result, Err(AppError::NotAvailable(ref m)) if m == "Selected time slot not found"));
    }

    #[test]
    fn test_check_slot_full_or_closed() {
        let mut full = TimeSlot::new("10:00 AM", 2);
        full.current_bookings = 2;
        let mut closed = TimeSlot::new("1:00 PM", 2);
        closed.is_available = false;
        let day = SlotDay {
            date: "2025-06-10".to_string(),
            time_slots: vec![full, closed, TimeSlot::new("3:00 PM", 2)],
        };

        assert!(matches!(check_slot(Some(&day), "10:00 AM"), Err(AppError::SlotFull)));
        assert!(matches!(check_slot(Some(&day), "1:00 PM"), Err(AppError::SlotFull)));
        assert!(check_slot(Some(&day), "3:00 PM").is_ok());
    }

    #[test]
    fn test_write_booking_reserves_slot() {
        let conn = setup_db();
        seed(&conn, 2, 0);

        let booking = write_booking(&conn, validated()).unwrap();
        assert_eq!(booking.status, BookingStatus::Confirmed);
        assert_eq!(booking.status_history.len(), 1);
        assert_eq!(booking.status_history[0].note, "Booking confirmed");
        assert!(booking.reference_code.starts_with(reference::REFERENCE_PREFIX));
        assert_eq!(current_bookings(&conn), 1);
        assert!(queries::get_booking_by_id(&conn, &booking.id).unwrap().is_some());
    }

    #[test]
    fn test_write_booking_rolls_back_when_slot_fills() {
        let conn = setup_db();
        seed(&conn, 1, 1);

        let result = write_booking(&conn, validated());
        assert!(matches!(result, Err(AppError::SlotFull)));
        assert_eq!(current_bookings(&conn), 1);
        assert!(queries::get_bookings_for_slot(&conn, "2025-06-10", "10:00 AM")
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_write_booking_rolls_back_when_increment_errors() {
        let conn = setup_db();
        seed(&conn, 2, 0);
        conn.execute_batch("DROP TABLE time_slots;").unwrap();

        let result = write_booking(&conn, validated());
        assert!(matches!(result, Err(AppError::Persistence(_))));
        assert!(queries::get_bookings_for_slot(&conn, "2025-06-10", "10:00 AM")
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_check_slot_matches_time_exactly() {
        let day = SlotDay {
            date: "2025-06-10".to_string(),
            time_slots: vec![TimeSlot::new("10:00 AM", 2)],
        };
        assert!(matches!(
            check_slot(Some(&day), " 10:00 AM  "),
            Err(AppError::NotAvailable(_))
        ));
    }

    #[test]
    fn test_write_booking_never_exceeds_capacity() {
        let conn = setup_db();
        seed(&conn, 3, 0);

        let outcomes: Vec<bool> = (0..5).map(|_| write_booking(&conn, validated()).is_ok()).collect();
        assert_eq!(outcomes.iter().filter(|ok| **ok).count(), 3);
        assert_eq!(current_bookings(&conn), 3);
        assert_eq!(
            queries::get_bookings_for_slot(&conn, "2025-06-10", "10:00 AM").unwrap().len(),
            3
        );
    }
}
