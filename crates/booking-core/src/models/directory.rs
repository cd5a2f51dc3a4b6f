//! Doctor and service directory.
//!
//! The fixed doctor/service enumerations plus the read-only tables the rest
//! of the core resolves against:
//! - doctor → display label
//! - service → display label
//! - doctor → services that doctor offers

use std::collections::{BTreeSet, HashMap};
use std::fmt;

use serde::{Deserialize, Serialize};

/// Doctors that can be booked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DoctorId {
    #[serde(rename = "dr-ahmet-yilmaz")]
    Cardiology,
    #[serde(rename = "dr-ayse-demir")]
    InternalMedicine,
    #[serde(rename = "dr-mehmet-kaya")]
    Orthopedics,
    #[serde(rename = "dr-fatma-ozturk")]
    Pediatrics,
    #[serde(rename = "dr-ali-celik")]
    Neurology,
    #[serde(rename = "dr-zeynep-arslan")]
    Dermatology,
    /// Emergency room. Older forms used `emergency-doctor` for the same doctor.
    #[serde(rename = "acil-doktor", alias = "emergency-doctor")]
    Emergency,
}

impl DoctorId {
    pub const ALL: [DoctorId; 7] = [
        DoctorId::Cardiology,
        DoctorId::InternalMedicine,
        DoctorId::Orthopedics,
        DoctorId::Pediatrics,
        DoctorId::Neurology,
        DoctorId::Dermatology,
        DoctorId::Emergency,
    ];

    /// Wire code used by forms and configuration.
    pub fn code(&self) -> &'static str {
        match self {
            DoctorId::Cardiology => "dr-ahmet-yilmaz",
            DoctorId::InternalMedicine => "dr-ayse-demir",
            DoctorId::Orthopedics => "dr-mehmet-kaya",
            DoctorId::Pediatrics => "dr-fatma-ozturk",
            DoctorId::Neurology => "dr-ali-celik",
            DoctorId::Dermatology => "dr-zeynep-arslan",
            DoctorId::Emergency => "acil-doktor",
        }
    }

    /// Parse a wire code (case-insensitive, surrounding whitespace ignored).
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_lowercase().as_str() {
            "emergency-doctor" => Some(DoctorId::Emergency),
            other => Self::ALL.into_iter().find(|d| d.code() == other),
        }
    }

    pub fn is_emergency(&self) -> bool {
        matches!(self, DoctorId::Emergency)
    }
}

impl fmt::Display for DoctorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Services that can be booked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ServiceId {
    #[serde(rename = "konsultasyon", alias = "consultation")]
    Consultation,
    #[serde(rename = "tedavi", alias = "treatment")]
    Treatment,
    #[serde(rename = "kontrol", alias = "check-up")]
    CheckUp,
    #[serde(rename = "acil", alias = "emergency")]
    Emergency,
}

impl ServiceId {
    pub const ALL: [ServiceId; 4] = [
        ServiceId::Consultation,
        ServiceId::Treatment,
        ServiceId::CheckUp,
        ServiceId::Emergency,
    ];

    /// Wire code used by forms and configuration.
    pub fn code(&self) -> &'static str {
        match self {
            ServiceId::Consultation => "konsultasyon",
            ServiceId::Treatment => "tedavi",
            ServiceId::CheckUp => "kontrol",
            ServiceId::Emergency => "acil",
        }
    }

    /// English alias accepted alongside the wire code.
    fn alias(&self) -> &'static str {
        match self {
            ServiceId::Consultation => "consultation",
            ServiceId::Treatment => "treatment",
            ServiceId::CheckUp => "check-up",
            ServiceId::Emergency => "emergency",
        }
    }

    /// Parse a wire code or its English alias.
    pub fn from_code(code: &str) -> Option<Self> {
        let lower = code.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|s| s.code() == lower || s.alias() == lower)
    }
}

impl fmt::Display for ServiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Display labels and the doctor→services compatibility table.
#[derive(Debug, Clone, PartialEq)]
pub struct Directory {
    doctor_labels: HashMap<DoctorId, String>,
    service_labels: HashMap<ServiceId, String>,
    compatibility: HashMap<DoctorId, BTreeSet<ServiceId>>,
}

impl Default for Directory {
    fn default() -> Self {
        Self::new()
    }
}

impl Directory {
    /// Create a directory with the built-in tables.
    pub fn new() -> Self {
        Self {
            doctor_labels: Self::default_doctor_labels(),
            service_labels: Self::default_service_labels(),
            compatibility: Self::default_compatibility(),
        }
    }

    /// Display label for a doctor, falling back to its code.
    pub fn doctor_label(&self, doctor: DoctorId) -> &str {
        self.doctor_labels
            .get(&doctor)
            .map(String::as_str)
            .unwrap_or_else(|| doctor.code())
    }

    /// Display label for a service, falling back to its code.
    pub fn service_label(&self, service: ServiceId) -> &str {
        self.service_labels
            .get(&service)
            .map(String::as_str)
            .unwrap_or_else(|| service.code())
    }

    /// Services the given doctor offers. A doctor missing from the table offers none.
    pub fn allowed_services(&self, doctor: DoctorId) -> BTreeSet<ServiceId> {
        self.compatibility.get(&doctor).cloned().unwrap_or_default()
    }

    /// Services to offer for an optional doctor selection.
    ///
    /// With no doctor selected every service is offered.
    pub fn offered_services(&self, doctor: Option<DoctorId>) -> BTreeSet<ServiceId> {
        match doctor {
            Some(doctor) => self.allowed_services(doctor),
            None => ServiceId::ALL.into_iter().collect(),
        }
    }

    /// Check whether a doctor offers a service.
    pub fn is_service_allowed(&self, doctor: DoctorId, service: ServiceId) -> bool {
        self.compatibility
            .get(&doctor)
            .is_some_and(|services| services.contains(&service))
    }

    /// All doctors with their labels, in declaration order.
    pub fn doctors(&self) -> Vec<(DoctorId, &str)> {
        DoctorId::ALL
            .into_iter()
            .map(|d| (d, self.doctor_label(d)))
            .collect()
    }

    /// All services with their labels, in declaration order.
    pub fn services(&self) -> Vec<(ServiceId, &str)> {
        ServiceId::ALL
            .into_iter()
            .map(|s| (s, self.service_label(s)))
            .collect()
    }

    /// Override a doctor's display label.
    pub fn set_doctor_label(&mut self, doctor: DoctorId, label: &str) {
        self.doctor_labels.insert(doctor, label.to_string());
    }

    /// Override a service's display label.
    pub fn set_service_label(&mut self, service: ServiceId, label: &str) {
        self.service_labels.insert(service, label.to_string());
    }

    /// Replace the services a doctor offers.
    pub fn set_allowed_services<I>(&mut self, doctor: DoctorId, services: I)
    where
        I: IntoIterator<Item = ServiceId>,
    {
        self.compatibility
            .insert(doctor, services.into_iter().collect());
    }

    fn default_doctor_labels() -> HashMap<DoctorId, String> {
        let mut map = HashMap::new();
        map.insert(DoctorId::Cardiology, "Dr. Yüksel Kaya - Cardiology".into());
        map.insert(
            DoctorId::InternalMedicine,
            "Dr. Oğuzhan Özgür - Internal Medicine".into(),
        );
        map.insert(DoctorId::Orthopedics, "Dr. Berke Algün - Orthopedics".into());
        map.insert(DoctorId::Pediatrics, "Dr. Atakan Avsever - Pediatrics".into());
        map.insert(DoctorId::Neurology, "Dr. Emircan Üye - Neurology".into());
        map.insert(
            DoctorId::Dermatology,
            "Dr. Muzaffer Bayrak - Dermatology".into(),
        );
        map.insert(DoctorId::Emergency, "Emergency Room Doctor".into());
        map
    }

    fn default_service_labels() -> HashMap<ServiceId, String> {
        let mut map = HashMap::new();
        map.insert(ServiceId::Consultation, "Consultation".into());
        map.insert(ServiceId::Treatment, "Treatment".into());
        map.insert(ServiceId::CheckUp, "Check-up".into());
        map.insert(ServiceId::Emergency, "Emergency".into());
        map
    }

    fn default_compatibility() -> HashMap<DoctorId, BTreeSet<ServiceId>> {
        use ServiceId::*;

        let general: BTreeSet<ServiceId> = [Consultation, Treatment, CheckUp].into();

        let mut map = HashMap::new();
        map.insert(DoctorId::Cardiology, general.clone());
        map.insert(DoctorId::InternalMedicine, general.clone());
        map.insert(DoctorId::Orthopedics, [Treatment, CheckUp].into());
        map.insert(DoctorId::Pediatrics, general.clone());
        map.insert(DoctorId::Neurology, [Consultation, Treatment].into());
        map.insert(DoctorId::Dermatology, general);
        map.insert(DoctorId::Emergency, [Emergency].into());
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_doctor_codes_round_trip() {
        for doctor in DoctorId::ALL {
            assert_eq!(DoctorId::from_code(doctor.code()), Some(doctor));
        }
        assert_eq!(DoctorId::from_code("  DR-MEHMET-KAYA "), Some(DoctorId::Orthopedics));
        assert_eq!(DoctorId::from_code("dr-nobody"), None);
        assert_eq!(DoctorId::from_code(""), None);
    }

    #[test]
    fn test_emergency_doctor_accepts_both_codes() {
        assert_eq!(DoctorId::from_code("acil-doktor"), Some(DoctorId::Emergency));
        assert_eq!(DoctorId::from_code("emergency-doctor"), Some(DoctorId::Emergency));

        let parsed: DoctorId = serde_json::from_str("\"emergency-doctor\"").unwrap();
        assert_eq!(parsed, DoctorId::Emergency);
        assert_eq!(serde_json::to_string(&parsed).unwrap(), "\"acil-doktor\"");
    }

    #[test]
    fn test_service_aliases() {
        assert_eq!(ServiceId::from_code("kontrol"), Some(ServiceId::CheckUp));
        assert_eq!(ServiceId::from_code("check-up"), Some(ServiceId::CheckUp));
        assert_eq!(ServiceId::from_code("Consultation"), Some(ServiceId::Consultation));
        assert_eq!(ServiceId::from_code("massage"), None);
    }

    #[test]
    fn test_default_compatibility() {
        let dir = Directory::new();

        let ortho = dir.allowed_services(DoctorId::Orthopedics);
        assert!(!ortho.contains(&ServiceId::Consultation));
        assert!(ortho.contains(&ServiceId::Treatment));
        assert!(ortho.contains(&ServiceId::CheckUp));

        let er = dir.allowed_services(DoctorId::Emergency);
        assert_eq!(er.into_iter().collect::<Vec<_>>(), vec![ServiceId::Emergency]);

        assert!(!dir.is_service_allowed(DoctorId::Neurology, ServiceId::CheckUp));
        assert!(dir.is_service_allowed(DoctorId::Cardiology, ServiceId::CheckUp));
    }

    #[test]
    fn test_offered_services_without_doctor() {
        let dir = Directory::new();
        assert_eq!(dir.offered_services(None).len(), ServiceId::ALL.len());
        assert_eq!(dir.offered_services(Some(DoctorId::Emergency)).len(), 1);
    }

    #[test]
    fn test_label_overrides() {
        let mut dir = Directory::new();
        dir.set_doctor_label(DoctorId::Cardiology, "Dr. Yüksel Kaya - Kardiyoloji");
        dir.set_service_label(ServiceId::CheckUp, "Kontrol");

        assert_eq!(dir.doctor_label(DoctorId::Cardiology), "Dr. Yüksel Kaya - Kardiyoloji");
        assert_eq!(dir.service_label(ServiceId::CheckUp), "Kontrol");
        assert_eq!(dir.doctors().len(), 7);
    }

    #[test]
    fn test_set_allowed_services() {
        let mut dir = Directory::new();
        dir.set_allowed_services(DoctorId::Neurology, [ServiceId::CheckUp]);
        assert!(dir.is_service_allowed(DoctorId::Neurology, ServiceId::CheckUp));
        assert!(!dir.is_service_allowed(DoctorId::Neurology, ServiceId::Consultation));
    }
}
