//! Parsing of raw form values.

use chrono::{NaiveDate, NaiveTime};

use super::{Field, ValidationError, ValidationReason, ValidationResult};
use crate::models::{AppointmentCandidate, AppointmentForm, DoctorId, ServiceId};

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMATS: [&str; 2] = ["%H:%M", "%H:%M:%S"];

impl AppointmentForm {
    /// Parse the date field. Empty means not selected.
    pub fn parse_date(&self) -> ValidationResult<Option<NaiveDate>> {
        parse_field(&self.date, Field::Date, ValidationReason::Malformed, |s| {
            NaiveDate::parse_from_str(s, DATE_FORMAT).ok()
        })
    }

    /// Parse the time field. Empty means not selected.
    pub fn parse_time(&self) -> ValidationResult<Option<NaiveTime>> {
        parse_field(&self.time, Field::Time, ValidationReason::Malformed, |s| {
            TIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveTime::parse_from_str(s, fmt).ok())
        })
    }

    /// Parse the doctor code. Empty means not selected.
    pub fn parse_doctor(&self) -> ValidationResult<Option<DoctorId>> {
        parse_field(&self.doctor, Field::Doctor, ValidationReason::Unknown, DoctorId::from_code)
    }

    /// Parse the service code. Empty means not selected.
    pub fn parse_service(&self) -> ValidationResult<Option<ServiceId>> {
        parse_field(
            &self.service,
            Field::Service,
            ValidationReason::Unknown,
            ServiceId::from_code,
        )
    }

    /// Parse every field into a candidate.
    ///
    /// Fields are parsed in validation order; the first unparseable one is
    /// reported. Presence is not checked here.
    pub fn to_candidate(&self) -> ValidationResult<AppointmentCandidate> {
        Ok(AppointmentCandidate {
            name: self.name.clone(),
            date: self.parse_date()?,
            time: self.parse_time()?,
            doctor: self.parse_doctor()?,
            service: self.parse_service()?,
        })
    }
}

/// Empty input means "not selected"; anything else must parse.
fn parse_field<T>(
    raw: &str,
    field: Field,
    reason: ValidationReason,
    parse: impl Fn(&str) -> Option<T>,
) -> ValidationResult<Option<T>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    parse(trimmed)
        .map(Some)
        .ok_or(ValidationError::new(field, reason))
}
