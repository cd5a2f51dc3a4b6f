//! Search predicate for the appointment list.

use crate::models::{Appointment, Directory};

/// Normalized search text: lowercased and trimmed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchQuery(String);

impl SearchQuery {
    pub fn new(text: &str) -> Self {
        Self(text.trim().to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// An empty query matches everything.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Case-insensitive substring match on the name or the doctor's label.
    pub fn matches(&self, appointment: &Appointment, directory: &Directory) -> bool {
        if self.is_empty() {
            return true;
        }
        appointment.name.to_lowercase().contains(&self.0)
            || directory
                .doctor_label(appointment.doctor)
                .to_lowercase()
                .contains(&self.0)
    }
}
