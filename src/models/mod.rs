pub mod artifact;
pub mod booking;
pub mod inquiry;
pub mod logbook;
pub mod slot;

pub use artifact::Artifact;
pub use booking::{Booking, BookingStatus, StatusChange};
pub use inquiry::{Inquiry, InquiryStatus};
pub use logbook::LogbookEntry;
pub use slot::{SlotDay, TimeSlot};
