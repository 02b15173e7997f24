use serde::{Deserialize, Serialize};

/// One bookable time of day within a [`SlotDay`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSlot {
    pub time: String,
    pub is_available: bool,
    pub max_capacity: i64,
    pub current_bookings: i64,
}

impl TimeSlot {
    pub fn new(time: impl Into<String>, max_capacity: i64) -> Self {
        Self {
            time: time.into(),
            is_available: true,
            max_capacity,
            current_bookings: 0,
        }
    }

    pub fn remaining(&self) -> i64 {
        (self.max_capacity - self.current_bookings).max(0)
    }

    /// Open for booking: not switched off and not at capacity.
    pub fn has_capacity(&self) -> bool {
        self.is_available && self.current_bookings < self.max_capacity
    }
}

/// A calendar date's bookable capacity, keyed by `YYYY-MM-DD`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotDay {
    pub date: String,
    pub time_slots: Vec<TimeSlot>,
}

impl SlotDay {
    pub fn find_slot(&self, time: &str) -> Option<&TimeSlot> {
        self.time_slots.iter().find(|slot| slot.time == time)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day() -> SlotDay {
        SlotDay {
            date: "2025-06-10".to_string(),
            time_slots: vec![
                TimeSlot::new("10:00 AM", 2),
                TimeSlot {
                    time: "2:00 PM".to_string(),
                    is_available: false,
                    max_capacity: 5,
                    current_bookings: 1,
                },
            ],
        }
    }

    #[test]
    fn test_find_slot_exact_match() {
        let day = day();
        assert!(day.find_slot("10:00 AM").is_some());
        assert!(day.find_slot("10:00 am").is_none());
        assert!(day.find_slot("10:00").is_none());
    }

    #[test]
    fn test_has_capacity() {
        let mut slot = TimeSlot::new("10:00 AM", 2);
        assert!(slot.has_capacity());
        slot.current_bookings = 2;
        assert!(!slot.has_capacity());
        assert_eq!(slot.remaining(), 0);
    }

    #[test]
    fn test_unavailable_slot_has_no_capacity() {
        let day = day();
        let slot = day.find_slot("2:00 PM").unwrap();
        assert_eq!(slot.remaining(), 4);
        assert!(!slot.has_capacity());
    }

    #[test]
    fn test_serializes_camel_case() {
        let json = serde_json::to_value(day()).unwrap();
        assert_eq!(json["timeSlots"][0]["maxCapacity"], 2);
        assert_eq!(json["timeSlots"][0]["currentBookings"], 0);
        assert_eq!(json["timeSlots"][1]["isAvailable"], false);
    }
}
