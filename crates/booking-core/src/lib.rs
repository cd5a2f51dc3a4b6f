//! Booking Core Library
//!
//! In-memory appointment booking: validation of form input and management of
//! the appointment list behind a booking screen.
//!
//! # Architecture
//!
//! ```text
//! Form → Validator ──(invalid)──▶ ValidationError{field, reason}
//!            │
//!         (valid)
//!            ▼
//!   BookingSession (awaiting confirmation)
//!            │
//!       user accepts
//!            │
//!   ┌────────▼─────────┐
//!   │ AppointmentStore │  add / confirm / delete
//!   │                  │  filter → sorted view
//!   └────────┬─────────┘
//!            ▼
//!      display rows
//! ```
//!
//! # Modules
//!
//! - [`models`]: Domain types (Appointment, DoctorId, ServiceId, Directory)
//! - [`validation`]: Ordered field checks and form parsing
//! - [`store`]: Appointment list with search filter and sorted view
//! - [`session`]: Pending-confirmation slot
//! - [`config`]: JSON configuration for directory tables and rules

pub mod config;
pub mod models;
pub mod session;
pub mod store;
pub mod validation;

// Re-export commonly used types
pub use config::{BookingConfig, ConfigError};
pub use models::{
    Appointment, AppointmentCandidate, AppointmentForm, AppointmentId, AppointmentRequest,
    AppointmentStatus, Directory, DoctorId, ServiceId,
};
pub use session::{BookingSession, Confirmation, PendingKind, SessionError};
pub use store::{AppointmentRow, AppointmentStore, StoreError};
pub use validation::{Field, ValidationError, ValidationReason, ValidationRules, Validator};

// UniFFI setup - using proc macros
uniffi::setup_scaffolding!();

use std::sync::{Arc, Mutex};

// =========================================================================
// FFI Error Type
// =========================================================================

#[derive(Debug, thiserror::Error, uniffi::Error)]
pub enum BookingCoreError {
    #[error("Validation failed on {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Nothing awaiting confirmation")]
    NothingPending,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<ValidationError> for BookingCoreError {
    fn from(e: ValidationError) -> Self {
        BookingCoreError::Validation {
            field: e.field.to_string(),
            reason: e.reason.to_string(),
        }
    }
}

impl From<StoreError> for BookingCoreError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound { id } => BookingCoreError::NotFound(id.to_string()),
        }
    }
}

impl From<SessionError> for BookingCoreError {
    fn from(e: SessionError) -> Self {
        match e {
            SessionError::NothingPending => BookingCoreError::NothingPending,
            SessionError::Store(e) => e.into(),
        }
    }
}

impl From<ConfigError> for BookingCoreError {
    fn from(e: ConfigError) -> Self {
        BookingCoreError::Config(e.to_string())
    }
}

impl<T> From<std::sync::PoisonError<T>> for BookingCoreError {
    fn from(e: std::sync::PoisonError<T>) -> Self {
        BookingCoreError::Internal(format!("Lock poisoned: {}", e))
    }
}

// =========================================================================
// Factory Functions (exported to FFI)
// =========================================================================

/// Create a booking core with the built-in directory and rules.
#[uniffi::export]
pub fn new_booking_core() -> Arc<BookingCore> {
    let directory = Arc::new(Directory::new());
    Arc::new(BookingCore::new(
        Validator::new(ValidationRules::default(), directory.clone()),
        AppointmentStore::new(directory),
    ))
}

/// Create a booking core from a JSON configuration document.
#[uniffi::export]
pub fn booking_core_from_config_json(json: String) -> Result<Arc<BookingCore>, BookingCoreError> {
    let config = BookingConfig::from_json_str(&json)?;
    let (validator, store) = config.build()?;
    Ok(Arc::new(BookingCore::new(validator, store)))
}

// =========================================================================
// Main API Object
// =========================================================================

struct BookingState {
    store: AppointmentStore,
    session: BookingSession,
}

/// Thread-safe booking core wrapper for FFI.
#[derive(uniffi::Object)]
pub struct BookingCore {
    validator: Validator,
    state: Arc<Mutex<BookingState>>,
}

impl BookingCore {
    pub fn new(validator: Validator, store: AppointmentStore) -> Self {
        Self {
            validator,
            state: Arc::new(Mutex::new(BookingState {
                store,
                session: BookingSession::new(),
            })),
        }
    }

    fn directory(&self) -> &Directory {
        self.validator.directory()
    }
}

#[uniffi::export]
impl BookingCore {
    // =========================================================================
    // Directory
    // =========================================================================

    /// All doctors with display labels.
    pub fn doctors(&self) -> Vec<FfiOption> {
        self.directory()
            .doctors()
            .into_iter()
            .map(|(d, label)| FfiOption::new(d.code(), label))
            .collect()
    }

    /// All services with display labels.
    pub fn services(&self) -> Vec<FfiOption> {
        self.directory()
            .services()
            .into_iter()
            .map(|(s, label)| FfiOption::new(s.code(), label))
            .collect()
    }

    /// Services to offer for a doctor selection (all when none selected).
    pub fn offered_services(&self, doctor: Option<String>) -> Result<Vec<FfiOption>, BookingCoreError> {
        let doctor = match doctor.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(code) => Some(parse_doctor(code)?),
        };
        let directory = self.directory();
        Ok(directory
            .offered_services(doctor)
            .into_iter()
            .map(|s| FfiOption::new(s.code(), directory.service_label(s)))
            .collect())
    }

    // =========================================================================
    // Validation
    // =========================================================================

    /// Validate a form without storing anything.
    pub fn validate(&self, form: FfiAppointmentForm) -> Result<(), BookingCoreError> {
        self.validator.validate_form(&form.into())?;
        Ok(())
    }

    // =========================================================================
    // Store Operations
    // =========================================================================

    /// Validate and add a new pending appointment.
    pub fn add_appointment(&self, form: FfiAppointmentForm) -> Result<FfiAppointment, BookingCoreError> {
        let request = self.validator.validate_form(&form.into())?;
        let mut state = self.state.lock()?;
        let appointment = state.store.add(request);
        Ok(FfiAppointment::new(&appointment, self.directory()))
    }

    /// Confirm an appointment. Idempotent.
    pub fn confirm_appointment(&self, id: String) -> Result<FfiAppointment, BookingCoreError> {
        let mut state = self.state.lock()?;
        let appointment = state.store.confirm(&AppointmentId::from(id))?;
        Ok(FfiAppointment::new(appointment, self.directory()))
    }

    /// Delete an appointment, returning the removed record.
    pub fn delete_appointment(&self, id: String) -> Result<FfiAppointment, BookingCoreError> {
        let mut state = self.state.lock()?;
        let removed = state.store.delete(&AppointmentId::from(id))?;
        Ok(FfiAppointment::new(&removed, self.directory()))
    }

    /// Get an appointment by ID.
    pub fn find_appointment(&self, id: String) -> Result<Option<FfiAppointment>, BookingCoreError> {
        let state = self.state.lock()?;
        Ok(state
            .store
            .find_by_id(&AppointmentId::from(id))
            .map(|a| FfiAppointment::new(a, self.directory())))
    }

    /// Replace the search query.
    pub fn set_filter_query(&self, query: String) -> Result<(), BookingCoreError> {
        let mut state = self.state.lock()?;
        state.store.set_filter_query(&query);
        Ok(())
    }

    /// Filtered appointments sorted by date and time.
    pub fn sorted_appointments(&self) -> Result<Vec<FfiAppointment>, BookingCoreError> {
        let state = self.state.lock()?;
        Ok(state
            .store
            .sorted_view()
            .into_iter()
            .map(|a| FfiAppointment::new(a, self.directory()))
            .collect())
    }

    // =========================================================================
    // Confirmation Flow
    // =========================================================================

    /// Validate a form and hold it for confirmation.
    pub fn stage_new(&self, form: FfiAppointmentForm) -> Result<FfiAppointment, BookingCoreError> {
        let request = self.validator.validate_form(&form.into())?;
        let mut state = self.state.lock()?;
        let pending = state.session.stage_new(request);
        Ok(FfiAppointment::new(&pending.appointment, self.directory()))
    }

    /// Hold a stored appointment for re-confirmation.
    pub fn stage_existing(&self, id: String) -> Result<FfiAppointment, BookingCoreError> {
        let mut guard = self.state.lock()?;
        let state = &mut *guard;
        let pending = state.session.open_existing(&state.store, &AppointmentId::from(id))?;
        Ok(FfiAppointment::new(&pending.appointment, self.directory()))
    }

    /// Accept whatever is awaiting confirmation.
    pub fn accept_pending(&self) -> Result<FfiConfirmation, BookingCoreError> {
        let mut guard = self.state.lock()?;
        let state = &mut *guard;
        let confirmation = state.session.accept(&mut state.store)?;
        Ok(FfiConfirmation::new(&confirmation, self.directory()))
    }

    /// Discard whatever is awaiting confirmation. Returns whether anything was pending.
    pub fn cancel_pending(&self) -> Result<bool, BookingCoreError> {
        let mut state = self.state.lock()?;
        Ok(state.session.cancel().is_some())
    }
}

fn parse_doctor(code: &str) -> Result<DoctorId, BookingCoreError> {
    DoctorId::from_code(code)
        .ok_or_else(|| BookingCoreError::InvalidInput(format!("Unknown doctor: {}", code)))
}

// =========================================================================
// FFI Types
// =========================================================================

/// FFI-safe form input. Empty strings mean "not selected".
#[derive(Debug, Clone, Default, uniffi::Record)]
pub struct FfiAppointmentForm {
    pub name: String,
    /// `YYYY-MM-DD`
    pub date: String,
    /// `HH:MM`
    pub time: String,
    /// Doctor code
    pub doctor: String,
    /// Service code
    pub service: String,
}

impl From<FfiAppointmentForm> for AppointmentForm {
    fn from(form: FfiAppointmentForm) -> Self {
        AppointmentForm {
            name: form.name,
            date: form.date,
            time: form.time,
            doctor: form.doctor,
            service: form.service,
        }
    }
}

/// FFI-safe appointment with resolved labels.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiAppointment {
    pub id: String,
    pub name: String,
    pub date: String,
    pub time: String,
    pub doctor: String,
    pub doctor_label: String,
    pub service: String,
    pub service_label: String,
    pub created_at: String,
    pub confirmed: bool,
    pub emergency: bool,
}

impl FfiAppointment {
    fn new(appointment: &Appointment, directory: &Directory) -> Self {
        Self {
            id: appointment.id.to_string(),
            name: appointment.name.clone(),
            date: appointment.date.format("%Y-%m-%d").to_string(),
            time: appointment.time.format("%H:%M").to_string(),
            doctor: appointment.doctor.code().to_string(),
            doctor_label: directory.doctor_label(appointment.doctor).to_string(),
            service: appointment.service.code().to_string(),
            service_label: directory.service_label(appointment.service).to_string(),
            created_at: appointment.created_at.to_rfc3339(),
            confirmed: appointment.confirmed,
            emergency: appointment.is_emergency(),
        }
    }
}

/// FFI-safe code/label pair for pickers.
#[derive(Debug, Clone, PartialEq, uniffi::Record)]
pub struct FfiOption {
    pub code: String,
    pub label: String,
}

impl FfiOption {
    fn new(code: &str, label: &str) -> Self {
        Self {
            code: code.to_string(),
            label: label.to_string(),
        }
    }
}

/// FFI-safe confirmation outcome.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiConfirmation {
    /// `true` if a new appointment was added, `false` if an existing one was confirmed
    pub added: bool,
    pub appointment: FfiAppointment,
}

impl FfiConfirmation {
    fn new(confirmation: &Confirmation, directory: &Directory) -> Self {
        Self {
            added: matches!(confirmation, Confirmation::Added(_)),
            appointment: FfiAppointment::new(confirmation.appointment(), directory),
        }
    }
}
