//! Booking configuration.
//!
//! Everything is optional; missing entries keep the built-in tables.
//!
//! ```json
//! {
//!   "directory": {
//!     "doctor_labels": { "dr-ahmet-yilmaz": "Dr. Yüksel Kaya - Kardiyoloji" },
//!     "service_labels": { "kontrol": "Kontrol" },
//!     "compatibility": { "dr-ali-celik": ["konsultasyon", "tedavi", "kontrol"] }
//!   },
//!   "validation": { "min_name_len": 3, "enforce_service_compatibility": true }
//! }
//! ```

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::models::{Directory, DoctorId, ServiceId};
use crate::store::AppointmentStore;
use crate::validation::{ValidationRules, Validator};

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unknown {kind} code: {code}")]
    UnknownCode { kind: &'static str, code: String },
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Directory overrides keyed by wire code.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectoryConfig {
    pub doctor_labels: BTreeMap<String, String>,
    pub service_labels: BTreeMap<String, String>,
    pub compatibility: BTreeMap<String, Vec<String>>,
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BookingConfig {
    pub directory: DirectoryConfig,
    pub validation: ValidationRules,
}

impl BookingConfig {
    pub fn from_json_str(json: &str) -> ConfigResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let path = path.as_ref();
        debug!(path = %path.display(), "Loading booking config");
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    /// Build the directory: defaults with overrides applied.
    pub fn build_directory(&self) -> ConfigResult<Directory> {
        let mut directory = Directory::new();

        for (code, label) in &self.directory.doctor_labels {
            directory.set_doctor_label(doctor(code)?, label);
        }
        for (code, label) in &self.directory.service_labels {
            directory.set_service_label(service(code)?, label);
        }
        for (code, services) in &self.directory.compatibility {
            let services = services
                .iter()
                .map(|s| service(s))
                .collect::<ConfigResult<Vec<_>>>()?;
            directory.set_allowed_services(doctor(code)?, services);
        }

        Ok(directory)
    }

    /// Build a validator and an empty store sharing one directory.
    pub fn build(&self) -> ConfigResult<(Validator, AppointmentStore)> {
        let directory = Arc::new(self.build_directory()?);
        Ok((
            Validator::new(self.validation.clone(), directory.clone()),
            AppointmentStore::new(directory),
        ))
    }
}

fn doctor(code: &str) -> ConfigResult<DoctorId> {
    DoctorId::from_code(code).ok_or_else(|| ConfigError::UnknownCode {
        kind: "doctor",
        code: code.to_string(),
    })
}

fn service(code: &str) -> ConfigResult<ServiceId> {
    ServiceId::from_code(code).ok_or_else(|| ConfigError::UnknownCode {
        kind: "service",
        code: code.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = BookingConfig::from_json_str("{}").unwrap();
        assert_eq!(config, BookingConfig::default());
        assert_eq!(config.validation.min_name_len, 2);
        assert_eq!(config.build_directory().unwrap(), Directory::new());
    }

    #[test]
    fn test_overrides_applied() {
        let config = BookingConfig::from_json_str(
            r#"{
                "directory": {
                    "doctor_labels": { "dr-ahmet-yilmaz": "Dr. Yüksel Kaya - Kardiyoloji" },
                    "service_labels": { "check-up": "Kontrol" },
                    "compatibility": { "emergency-doctor": ["acil", "tedavi"] }
                },
                "validation": { "enforce_service_compatibility": true }
            }"#,
        )
        .unwrap();

        assert!(config.validation.enforce_service_compatibility);
        assert_eq!(config.validation.min_name_len, 2);

        let dir = config.build_directory().unwrap();
        assert_eq!(dir.doctor_label(DoctorId::Cardiology), "Dr. Yüksel Kaya - Kardiyoloji");
        assert_eq!(dir.service_label(ServiceId::CheckUp), "Kontrol");
        assert!(dir.is_service_allowed(DoctorId::Emergency, ServiceId::Treatment));
        // Untouched entries keep defaults
        assert_eq!(dir.doctor_label(DoctorId::Neurology), "Dr. Emircan Üye - Neurology");
    }

    #[test]
    fn test_unknown_code_rejected() {
        let config = BookingConfig::from_json_str(
            r#"{ "directory": { "compatibility": { "dr-ali-celik": ["massage"] } } }"#,
        )
        .unwrap();
        let err = config.build_directory().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::UnknownCode { kind: "service", .. }
        ));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "validation": {{ "min_name_len": 3 }} }}"#).unwrap();

        let config = BookingConfig::from_file(file.path()).unwrap();
        assert_eq!(config.validation.min_name_len, 3);

        let (validator, store) = config.build().unwrap();
        assert_eq!(validator.rules().min_name_len, 3);
        assert!(store.is_empty());
    }

    #[test]
    fn test_missing_file() {
        let err = BookingConfig::from_file("/nonexistent/booking.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
