//! In-memory appointment store.
//!
//! Holds every added appointment in insertion order plus the filtered view
//! for the current search query. The view is recomputed after every
//! mutation, so it never refers to a deleted record.

mod filter;

pub use filter::*;

use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::models::{Appointment, AppointmentId, AppointmentRequest, Directory};

/// Store errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Appointment not found: {id}")]
    NotFound { id: AppointmentId },
}

pub type StoreResult<T> = Result<T, StoreError>;

/// An appointment resolved against the directory, ready for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppointmentRow {
    pub id: AppointmentId,
    pub name: String,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub doctor_label: String,
    pub service_label: String,
    pub confirmed: bool,
    /// Booked with the emergency room doctor
    pub emergency: bool,
}

/// Authoritative appointment list with a derived filtered view.
#[derive(Debug, Clone)]
pub struct AppointmentStore {
    directory: Arc<Directory>,
    appointments: Vec<Appointment>,
    /// Indices into `appointments` matching `query`, ascending
    filtered: Vec<usize>,
    query: SearchQuery,
}

impl AppointmentStore {
    /// Create an empty store resolving doctor labels through `directory`.
    pub fn new(directory: Arc<Directory>) -> Self {
        Self {
            directory,
            appointments: Vec::new(),
            filtered: Vec::new(),
            query: SearchQuery::default(),
        }
    }

    pub fn directory(&self) -> &Directory {
        &self.directory
    }

    /// Add a validated request as a new pending appointment.
    pub fn add(&mut self, request: AppointmentRequest) -> Appointment {
        let appointment = Appointment::new(request);
        self.insert(appointment.clone());
        appointment
    }

    /// Insert a pre-built appointment (used when a staged record is accepted).
    pub(crate) fn insert(&mut self, appointment: Appointment) {
        info!(
            id = %appointment.id,
            doctor = %appointment.doctor,
            scheduled_at = %appointment.scheduled_at(),
            "Appointment added"
        );
        self.appointments.push(appointment);
        self.refilter();
    }

    /// Mark an appointment as confirmed. Idempotent.
    pub fn confirm(&mut self, id: &AppointmentId) -> StoreResult<&Appointment> {
        let index = self.position(id)?;
        if self.appointments[index].confirm() {
            info!(id = %id, "Appointment confirmed");
        } else {
            debug!(id = %id, "Appointment already confirmed");
        }
        Ok(&self.appointments[index])
    }

    /// Remove an appointment, returning it.
    pub fn delete(&mut self, id: &AppointmentId) -> StoreResult<Appointment> {
        let index = self.position(id)?;
        let removed = self.appointments.remove(index);
        self.refilter();
        info!(id = %id, "Appointment deleted");
        Ok(removed)
    }

    /// Replace the search query and recompute the filtered view.
    pub fn set_filter_query(&mut self, text: &str) {
        self.query = SearchQuery::new(text);
        self.refilter();
        debug!(
            query = self.query.as_str(),
            matches = self.filtered.len(),
            "Filter applied"
        );
    }

    /// Current normalized query.
    pub fn query(&self) -> &str {
        self.query.as_str()
    }

    /// Filtered view in insertion order.
    pub fn filtered(&self) -> Vec<&Appointment> {
        self.filtered.iter().map(|&i| &self.appointments[i]).collect()
    }

    /// Filtered view sorted by date and time. Ties keep insertion order.
    pub fn sorted_view(&self) -> Vec<&Appointment> {
        let mut view = self.filtered();
        view.sort_by_key(|a| a.scheduled_at());
        view
    }

    /// Sorted view resolved to display rows. Empty means "no appointments".
    pub fn rows(&self) -> Vec<AppointmentRow> {
        self.sorted_view()
            .into_iter()
            .map(|a| AppointmentRow {
                id: a.id.clone(),
                name: a.name.clone(),
                date: a.date,
                time: a.time,
                doctor_label: self.directory.doctor_label(a.doctor).to_string(),
                service_label: self.directory.service_label(a.service).to_string(),
                confirmed: a.confirmed,
                emergency: a.is_emergency(),
            })
            .collect()
    }

    /// Look up an appointment by ID.
    pub fn find_by_id(&self, id: &AppointmentId) -> Option<&Appointment> {
        self.appointments.iter().find(|a| &a.id == id)
    }

    pub fn contains(&self, id: &AppointmentId) -> bool {
        self.find_by_id(id).is_some()
    }

    /// Every appointment in insertion order, ignoring the filter.
    pub fn all(&self) -> &[Appointment] {
        &self.appointments
    }

    pub fn len(&self) -> usize {
        self.appointments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.appointments.is_empty()
    }

    fn position(&self, id: &AppointmentId) -> StoreResult<usize> {
        self.appointments
            .iter()
            .position(|a| &a.id == id)
            .ok_or_else(|| {
                warn!(id = %id, "Appointment not found");
                StoreError::NotFound { id: id.clone() }
            })
    }

    fn refilter(&mut self) {
        let directory = &self.directory;
        let query = &self.query;
        self.filtered = self
            .appointments
            .iter()
            .enumerate()
            .filter(|(_, a)| query.matches(a, directory))
            .map(|(i, _)| i)
            .collect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AppointmentStatus, DoctorId, ServiceId};

    fn make_request(name: &str, date: &str, time: &str, doctor: DoctorId) -> AppointmentRequest {
        AppointmentRequest {
            name: name.into(),
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            time: NaiveTime::parse_from_str(time, "%H:%M").unwrap(),
            doctor,
            service: ServiceId::Treatment,
        }
    }

    fn make_store() -> AppointmentStore {
        AppointmentStore::new(Arc::new(Directory::new()))
    }

    #[test]
    fn test_add_then_find() {
        let mut store = make_store();
        let added = store.add(make_request("Ana", "2099-01-01", "10:00", DoctorId::Orthopedics));

        let found = store.find_by_id(&added.id).unwrap();
        assert!(!found.confirmed);
        assert_eq!(found.name, "Ana");
        assert_eq!(store.len(), 1);
        assert_eq!(store.sorted_view().len(), 1);
    }

    #[test]
    fn test_confirm_idempotent() {
        let mut store = make_store();
        let added = store.add(make_request("Ana", "2099-01-01", "10:00", DoctorId::Orthopedics));

        assert!(store.confirm(&added.id).unwrap().confirmed);
        assert!(store.confirm(&added.id).unwrap().confirmed);
        assert_eq!(
            store.find_by_id(&added.id).unwrap().status(),
            AppointmentStatus::Confirmed
        );
    }

    #[test]
    fn test_unknown_id_does_not_mutate() {
        let mut store = make_store();
        let added = store.add(make_request("Ana", "2099-01-01", "10:00", DoctorId::Orthopedics));
        let missing = AppointmentId::from("nope");

        assert_eq!(
            store.confirm(&missing).unwrap_err(),
            StoreError::NotFound { id: missing.clone() }
        );
        assert_eq!(
            store.delete(&missing).unwrap_err(),
            StoreError::NotFound { id: missing.clone() }
        );
        assert_eq!(store.len(), 1);
        assert!(!store.find_by_id(&added.id).unwrap().confirmed);
    }

    #[test]
    fn test_delete_removes_everywhere() {
        let mut store = make_store();
        let a = store.add(make_request("Ana", "2099-01-01", "10:00", DoctorId::Orthopedics));
        let b = store.add(make_request("Beo", "2099-01-02", "10:00", DoctorId::Orthopedics));

        store.set_filter_query("ana");
        let removed = store.delete(&a.id).unwrap();
        assert_eq!(removed.id, a.id);

        assert!(store.find_by_id(&a.id).is_none());
        assert!(store.sorted_view().is_empty());

        store.set_filter_query("");
        let ids: Vec<_> = store.sorted_view().iter().map(|x| x.id.clone()).collect();
        assert_eq!(ids, vec![b.id]);

        // Deleted means gone
        assert!(store.confirm(&a.id).is_err());
    }

    #[test]
    fn test_sorted_by_date_then_time() {
        let mut store = make_store();
        store.add(make_request("Ana", "2099-01-02", "09:00", DoctorId::Pediatrics));
        store.add(make_request("Beo", "2099-01-01", "15:00", DoctorId::Pediatrics));
        store.add(make_request("Cem", "2099-01-01", "08:30", DoctorId::Pediatrics));

        let names: Vec<_> = store.sorted_view().iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["Cem", "Beo", "Ana"]);
    }

    #[test]
    fn test_ties_keep_insertion_order() {
        let mut store = make_store();
        store.add(make_request("First", "2099-03-01", "10:00", DoctorId::Neurology));
        store.add(make_request("Second", "2099-03-01", "10:00", DoctorId::Neurology));
        store.add(make_request("Early", "2099-02-01", "10:00", DoctorId::Neurology));

        let first: Vec<_> = store.sorted_view().iter().map(|a| a.id.clone()).collect();
        let second: Vec<_> = store.sorted_view().iter().map(|a| a.id.clone()).collect();
        assert_eq!(first, second);

        let names: Vec<_> = store.sorted_view().iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["Early", "First", "Second"]);
    }

    #[test]
    fn test_filter_by_name_and_doctor() {
        let mut store = make_store();
        store.add(make_request("Ana", "2099-01-01", "10:00", DoctorId::Cardiology));
        store.add(make_request("Beo", "2099-01-01", "11:00", DoctorId::Dermatology));

        store.set_filter_query("CARDIO");
        let names: Vec<_> = store.sorted_view().iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["Ana"]);

        store.set_filter_query("beo");
        assert_eq!(store.sorted_view().len(), 1);

        store.set_filter_query("zzz");
        assert!(store.sorted_view().is_empty());
        assert!(store.rows().is_empty());

        store.set_filter_query("   ");
        assert_eq!(store.sorted_view().len(), store.len());
        assert_eq!(store.query(), "");
    }

    #[test]
    fn test_add_respects_active_filter() {
        let mut store = make_store();
        store.set_filter_query("ana");
        store.add(make_request("Beo", "2099-01-01", "10:00", DoctorId::Cardiology));
        assert!(store.sorted_view().is_empty());

        store.add(make_request("Anastasia", "2099-01-01", "10:00", DoctorId::Cardiology));
        assert_eq!(store.sorted_view().len(), 1);
        assert_eq!(store.all().len(), 2);
    }

    #[test]
    fn test_rows_resolve_labels() {
        let mut store = make_store();
        let added = store.add(make_request("Ana", "2099-01-01", "10:00", DoctorId::Emergency));
        store.confirm(&added.id).unwrap();

        let rows = store.rows();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].doctor_label, "Emergency Room Doctor");
        assert_eq!(rows[0].service_label, "Treatment");
        assert!(rows[0].confirmed);
        assert!(rows[0].emergency);
    }
}
