//! Appointment models: candidates, validated requests and stored records.

use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use super::directory::{DoctorId, ServiceId};

/// Unique appointment identifier (UUID v4).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AppointmentId(String);

impl AppointmentId {
    /// Generate a fresh identifier.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AppointmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for AppointmentId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for AppointmentId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Appointment status derived from the `confirmed` flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    /// Added, awaiting confirmation
    Pending,
    /// Accepted; terminal
    Confirmed,
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppointmentStatus::Pending => write!(f, "pending"),
            AppointmentStatus::Confirmed => write!(f, "confirmed"),
        }
    }
}

/// A record as entered by the user, before validation.
///
/// Absent fields are `None`; the name is kept verbatim.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppointmentCandidate {
    pub name: String,
    pub date: Option<NaiveDate>,
    pub time: Option<NaiveTime>,
    pub doctor: Option<DoctorId>,
    pub service: Option<ServiceId>,
}

/// Raw form values, exactly as a booking form submits them.
///
/// Empty strings mean "not selected". Dates are `YYYY-MM-DD`, times `HH:MM`
/// (seconds optional), doctor and service are wire codes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppointmentForm {
    pub name: String,
    pub date: String,
    pub time: String,
    pub doctor: String,
    pub service: String,
}

/// A candidate that passed validation. Every field is present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppointmentRequest {
    /// Trimmed patient name
    pub name: String,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub doctor: DoctorId,
    pub service: ServiceId,
}

impl AppointmentRequest {
    /// Combined date and time.
    pub fn scheduled_at(&self) -> NaiveDateTime {
        self.date.and_time(self.time)
    }
}

/// A stored appointment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appointment {
    /// Unique ID, assigned at creation
    pub id: AppointmentId,
    /// Patient name (trimmed)
    pub name: String,
    /// Calendar date
    pub date: NaiveDate,
    /// Time of day
    pub time: NaiveTime,
    /// Booked doctor
    pub doctor: DoctorId,
    /// Booked service
    pub service: ServiceId,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Set once the appointment is accepted; never cleared
    pub confirmed: bool,
}

impl Appointment {
    /// Create a new pending appointment from a validated request.
    pub fn new(request: AppointmentRequest) -> Self {
        Self {
            id: AppointmentId::generate(),
            name: request.name,
            date: request.date,
            time: request.time,
            doctor: request.doctor,
            service: request.service,
            created_at: Utc::now(),
            confirmed: false,
        }
    }

    /// Combined date and time, the sort key for display.
    pub fn scheduled_at(&self) -> NaiveDateTime {
        self.date.and_time(self.time)
    }

    pub fn status(&self) -> AppointmentStatus {
        if self.confirmed {
            AppointmentStatus::Confirmed
        } else {
            AppointmentStatus::Pending
        }
    }

    /// Whether this is booked with the emergency room doctor.
    pub fn is_emergency(&self) -> bool {
        self.doctor.is_emergency()
    }

    /// Mark as confirmed. Returns `true` if this call changed the state.
    pub(crate) fn confirm(&mut self) -> bool {
        let changed = !self.confirmed;
        self.confirmed = true;
        changed
    }
}
