pub mod booking;
pub mod contact;
pub mod messaging;
pub mod notification;
pub mod reference;
pub mod verification;

/// A form field that is present and not blank, trimmed.
pub(crate) fn required(field: &Option<String>) -> Option<&str> {
    field.as_deref().map(str::trim).filter(|s| !s.is_empty())
}
