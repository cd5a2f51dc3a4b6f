//! Candidate validation.
//!
//! Checks run in a fixed order and stop at the first failure:
//! name → date → time → doctor → service → date+time not in the past
//! (→ service offered by the doctor, when enabled).

mod form;

use std::fmt;
use std::sync::Arc;

use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::models::{
    AppointmentCandidate, AppointmentForm, AppointmentRequest, Directory, DoctorId, ServiceId,
};

/// Field a validation failure refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Name,
    Date,
    Time,
    Doctor,
    Service,
    /// The combined date and time
    DateTime,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Field::Name => write!(f, "name"),
            Field::Date => write!(f, "date"),
            Field::Time => write!(f, "time"),
            Field::Doctor => write!(f, "doctor"),
            Field::Service => write!(f, "service"),
            Field::DateTime => write!(f, "date_time"),
        }
    }
}

/// Why a field was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationReason {
    /// Required value absent
    Missing,
    /// Shorter than the configured minimum (in characters)
    TooShort { min: usize },
    /// Value could not be parsed
    Malformed,
    /// Code not in the directory
    Unknown,
    /// Strictly earlier than the reference instant
    InPast,
    /// Service not offered by the selected doctor
    NotOffered,
}

impl fmt::Display for ValidationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationReason::Missing => write!(f, "missing"),
            ValidationReason::TooShort { min } => write!(f, "shorter than {} characters", min),
            ValidationReason::Malformed => write!(f, "malformed"),
            ValidationReason::Unknown => write!(f, "unknown"),
            ValidationReason::InPast => write!(f, "in the past"),
            ValidationReason::NotOffered => write!(f, "not offered by the selected doctor"),
        }
    }
}

/// A single pass/fail verdict naming one field and one reason.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid {field}: {reason}")]
pub struct ValidationError {
    pub field: Field,
    pub reason: ValidationReason,
}

impl ValidationError {
    pub fn new(field: Field, reason: ValidationReason) -> Self {
        Self { field, reason }
    }

    pub fn missing(field: Field) -> Self {
        Self::new(field, ValidationReason::Missing)
    }
}

pub type ValidationResult<T> = Result<T, ValidationError>;

/// Tunable validation rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationRules {
    /// Minimum trimmed name length, in characters
    pub min_name_len: usize,
    /// Reject services the selected doctor does not offer
    pub enforce_service_compatibility: bool,
}

impl Default for ValidationRules {
    fn default() -> Self {
        Self {
            min_name_len: 2,
            enforce_service_compatibility: false,
        }
    }
}

/// Validates candidates against the rules and the directory.
#[derive(Debug, Clone)]
pub struct Validator {
    rules: ValidationRules,
    directory: Arc<Directory>,
}

impl Validator {
    pub fn new(rules: ValidationRules, directory: Arc<Directory>) -> Self {
        Self { rules, directory }
    }

    pub fn rules(&self) -> &ValidationRules {
        &self.rules
    }

    pub fn directory(&self) -> &Directory {
        &self.directory
    }

    /// Validate against the current local wall-clock time.
    pub fn validate(&self, candidate: &AppointmentCandidate) -> ValidationResult<AppointmentRequest> {
        self.validate_at(candidate, Local::now().naive_local())
    }

    /// Validate against an explicit reference instant.
    pub fn validate_at(
        &self,
        candidate: &AppointmentCandidate,
        now: NaiveDateTime,
    ) -> ValidationResult<AppointmentRequest> {
        let result = self.check_name(&candidate.name).and_then(|name| {
            let date = candidate.date.ok_or(ValidationError::missing(Field::Date))?;
            let time = candidate.time.ok_or(ValidationError::missing(Field::Time))?;
            let doctor = candidate.doctor.ok_or(ValidationError::missing(Field::Doctor))?;
            let service = candidate
                .service
                .ok_or(ValidationError::missing(Field::Service))?;
            self.finish(name, date, time, doctor, service, now)
        });
        log_verdict(&result);
        result
    }

    /// Validate raw form values against the current local wall-clock time.
    pub fn validate_form(&self, form: &AppointmentForm) -> ValidationResult<AppointmentRequest> {
        self.validate_form_at(form, Local::now().naive_local())
    }

    /// Validate raw form values against an explicit reference instant.
    ///
    /// Parsing happens field by field in validation order, so a malformed
    /// later field never masks an earlier missing one.
    pub fn validate_form_at(
        &self,
        form: &AppointmentForm,
        now: NaiveDateTime,
    ) -> ValidationResult<AppointmentRequest> {
        let result = self.check_name(&form.name).and_then(|name| {
            let date = form.parse_date()?.ok_or(ValidationError::missing(Field::Date))?;
            let time = form.parse_time()?.ok_or(ValidationError::missing(Field::Time))?;
            let doctor = form
                .parse_doctor()?
                .ok_or(ValidationError::missing(Field::Doctor))?;
            let service = form
                .parse_service()?
                .ok_or(ValidationError::missing(Field::Service))?;
            self.finish(name, date, time, doctor, service, now)
        });
        log_verdict(&result);
        result
    }

    /// Run the rule for a single field, for live per-field feedback.
    ///
    /// `Field::Date` compares calendar days only; `Field::DateTime` needs both
    /// date and time and compares the full instant.
    pub fn check_field(
        &self,
        field: Field,
        candidate: &AppointmentCandidate,
        now: NaiveDateTime,
    ) -> ValidationResult<()> {
        match field {
            Field::Name => self.check_name(&candidate.name).map(|_| ()),
            Field::Date => {
                let date = candidate.date.ok_or(ValidationError::missing(Field::Date))?;
                if date < now.date() {
                    return Err(ValidationError::new(Field::Date, ValidationReason::InPast));
                }
                Ok(())
            }
            Field::Time => candidate
                .time
                .map(|_| ())
                .ok_or(ValidationError::missing(Field::Time)),
            Field::Doctor => candidate
                .doctor
                .map(|_| ())
                .ok_or(ValidationError::missing(Field::Doctor)),
            Field::Service => {
                let service = candidate
                    .service
                    .ok_or(ValidationError::missing(Field::Service))?;
                match candidate.doctor {
                    Some(doctor) => self.check_offered(doctor, service),
                    None => Ok(()),
                }
            }
            Field::DateTime => {
                let date = candidate.date.ok_or(ValidationError::missing(Field::Date))?;
                let time = candidate.time.ok_or(ValidationError::missing(Field::Time))?;
                check_not_past(date, time, now)
            }
        }
    }

    /// Services offered for the given doctor, as shown in a service picker.
    pub fn allowed_services(&self, doctor: DoctorId) -> Vec<ServiceId> {
        self.directory.allowed_services(doctor).into_iter().collect()
    }

    /// Name rule: trimmed, non-empty, at least `min_name_len` characters.
    fn check_name(&self, name: &str) -> ValidationResult<String> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::missing(Field::Name));
        }
        if trimmed.chars().count() < self.rules.min_name_len {
            return Err(ValidationError::new(
                Field::Name,
                ValidationReason::TooShort {
                    min: self.rules.min_name_len,
                },
            ));
        }
        Ok(trimmed.to_string())
    }

    fn check_offered(&self, doctor: DoctorId, service: ServiceId) -> ValidationResult<()> {
        if self.rules.enforce_service_compatibility
            && !self.directory.is_service_allowed(doctor, service)
        {
            return Err(ValidationError::new(Field::Service, ValidationReason::NotOffered));
        }
        Ok(())
    }

    fn finish(
        &self,
        name: String,
        date: NaiveDate,
        time: NaiveTime,
        doctor: DoctorId,
        service: ServiceId,
        now: NaiveDateTime,
    ) -> ValidationResult<AppointmentRequest> {
        check_not_past(date, time, now)?;
        self.check_offered(doctor, service)?;

        Ok(AppointmentRequest {
            name,
            date,
            time,
            doctor,
            service,
        })
    }
}

/// Reject an instant strictly earlier than `now`. Equal is accepted.
fn check_not_past(date: NaiveDate, time: NaiveTime, now: NaiveDateTime) -> ValidationResult<()> {
    if date.and_time(time) < now {
        return Err(ValidationError::new(Field::DateTime, ValidationReason::InPast));
    }
    Ok(())
}

fn log_verdict(result: &ValidationResult<AppointmentRequest>) {
    match result {
        Ok(request) => debug!(
            doctor = %request.doctor,
            service = %request.service,
            scheduled_at = %request.scheduled_at(),
            "Candidate accepted"
        ),
        Err(e) => warn!(field = %e.field, reason = %e.reason, "Candidate rejected"),
    }
}
