use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    #[serde(rename = "_id")]
    pub id: String,
    pub visitor_name: String,
    pub email: String,
    pub selected_date: String,
    pub selected_time: String,
    pub status: BookingStatus,
    #[serde(rename = "statusHistory")]
    pub status_history: Vec<StatusChange<BookingStatus>>,
    pub timestamp: DateTime<Utc>,
    pub reference_code: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum BookingStatus {
    Pending,
    Confirmed,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "Pending",
            BookingStatus::Confirmed => "Confirmed",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "Confirmed" => BookingStatus::Confirmed,
            _ => BookingStatus::Pending,
        }
    }
}

/// One entry of an append-only status audit log.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatusChange<S> {
    pub status: S,
    pub timestamp: DateTime<Utc>,
    pub note: String,
}

impl<S> StatusChange<S> {
    pub fn new(status: S, note: impl Into<String>) -> Self {
        Self {
            status,
            timestamp: Utc::now(),
            note: note.into(),
        }
    }
}

impl Booking {
    /// Moves the booking to `status`, recording the change in its history.
    pub fn transition(&mut self, status: BookingStatus, note: impl Into<String>) {
        self.status = status;
        self.status_history.push(StatusChange::new(status, note));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn booking() -> Booking {
        Booking {
            id: "b-1".to_string(),
            visitor_name: "Juan".to_string(),
            email: "juan@example.com".to_string(),
            selected_date: "2025-06-10".to_string(),
            selected_time: "10:00 AM".to_string(),
            status: BookingStatus::Pending,
            status_history: vec![StatusChange::new(BookingStatus::Pending, "Booking received")],
            timestamp: Utc::now(),
            reference_code: "MMDTABC123".to_string(),
        }
    }

    #[test]
    fn test_status_round_trips_through_str() {
        assert_eq!(BookingStatus::parse(BookingStatus::Confirmed.as_str()), BookingStatus::Confirmed);
        assert_eq!(BookingStatus::parse("garbage"), BookingStatus::Pending);
    }

    #[test]
    fn test_transition_appends_history() {
        let mut b = booking();
        b.transition(BookingStatus::Confirmed, "Booking confirmed");
        assert_eq!(b.status, BookingStatus::Confirmed);
        assert_eq!(b.status_history.len(), 2);
        assert_eq!(b.status_history[0].status, BookingStatus::Pending);
        assert_eq!(b.status_history[1].note, "Booking confirmed");
    }

    #[test]
    fn test_json_field_names() {
        let json = serde_json::to_value(booking()).unwrap();
        assert_eq!(json["_id"], "b-1");
        assert_eq!(json["status"], "Pending");
        assert_eq!(json["statusHistory"][0]["status"], "Pending");
        assert_eq!(json["reference_code"], "MMDTABC123");
        assert!(json.get("status_history").is_none());
    }
}
