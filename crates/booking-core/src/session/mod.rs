//! Pending-confirmation slot.
//!
//! A booking is shown to the user before it takes effect. The session holds
//! the one appointment currently awaiting an answer, either a freshly
//! validated record or an existing one opened from the list.

use chrono::NaiveDateTime;
use thiserror::Error;
use tracing::{debug, info};

use crate::models::{Appointment, AppointmentCandidate, AppointmentId, AppointmentRequest};
use crate::store::{AppointmentStore, StoreError};
use crate::validation::{ValidationResult, Validator};

/// Session errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("No appointment is awaiting confirmation")]
    NothingPending,

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type SessionResult<T> = Result<T, SessionError>;

/// Where the pending appointment came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingKind {
    /// Not yet in the store; accepting adds it
    New,
    /// Already stored; accepting confirms it
    Existing,
}

/// The appointment awaiting an answer.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingAppointment {
    pub appointment: Appointment,
    pub kind: PendingKind,
}

/// Result of accepting the pending appointment.
#[derive(Debug, Clone, PartialEq)]
pub enum Confirmation {
    /// A new appointment was added (pending)
    Added(Appointment),
    /// An existing appointment was confirmed
    Confirmed(Appointment),
}

impl Confirmation {
    pub fn appointment(&self) -> &Appointment {
        match self {
            Confirmation::Added(a) | Confirmation::Confirmed(a) => a,
        }
    }
}

/// Holds at most one appointment awaiting confirmation.
#[derive(Debug, Clone, Default)]
pub struct BookingSession {
    pending: Option<PendingAppointment>,
}

impl BookingSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate a candidate and stage it as a new appointment.
    ///
    /// Replaces anything already pending. On failure the slot is left as is.
    pub fn open_new(
        &mut self,
        validator: &Validator,
        candidate: &AppointmentCandidate,
        now: NaiveDateTime,
    ) -> ValidationResult<&PendingAppointment> {
        let request = validator.validate_at(candidate, now)?;
        Ok(self.stage_new(request))
    }

    /// Stage an already validated request as a new appointment.
    pub fn stage_new(&mut self, request: AppointmentRequest) -> &PendingAppointment {
        let appointment = Appointment::new(request);
        debug!(id = %appointment.id, "Staged new appointment");
        self.pending.insert(PendingAppointment {
            appointment,
            kind: PendingKind::New,
        })
    }

    /// Stage a stored appointment for re-confirmation.
    pub fn open_existing(
        &mut self,
        store: &AppointmentStore,
        id: &AppointmentId,
    ) -> SessionResult<&PendingAppointment> {
        let appointment = store
            .find_by_id(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound { id: id.clone() })?;
        debug!(id = %id, "Staged existing appointment");
        Ok(self.pending.insert(PendingAppointment {
            appointment,
            kind: PendingKind::Existing,
        }))
    }

    pub fn pending(&self) -> Option<&PendingAppointment> {
        self.pending.as_ref()
    }

    /// Drop the pending appointment without touching the store.
    pub fn cancel(&mut self) -> Option<PendingAppointment> {
        self.pending.take()
    }

    /// Accept the pending appointment.
    ///
    /// A new record is added to the store; an existing one is confirmed.
    /// The slot is cleared whether or not the store operation succeeds.
    pub fn accept(&mut self, store: &mut AppointmentStore) -> SessionResult<Confirmation> {
        let pending = self.pending.take().ok_or(SessionError::NothingPending)?;
        let id = pending.appointment.id.clone();

        let confirmation = match pending.kind {
            PendingKind::New if !store.contains(&id) => {
                store.insert(pending.appointment.clone());
                Confirmation::Added(pending.appointment)
            }
            _ => Confirmation::Confirmed(store.confirm(&id)?.clone()),
        };

        info!(id = %id, kind = ?pending.kind, "Pending appointment accepted");
        Ok(confirmation)
    }
}
