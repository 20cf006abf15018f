//! JSON helpers for calibration files.

use std::{fs, path::Path};

use crate::intrinsics::{CalibrationError, CalibrationRecord, Intrinsics};

#[derive(thiserror::Error, Debug)]
pub enum CalibrationIoError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Calibration(#[from] CalibrationError),
}

impl CalibrationRecord {
    /// Load a raw (unvalidated) record from disk.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, CalibrationIoError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Write this record to disk as pretty JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), CalibrationIoError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}

/// Load and validate intrinsics from a JSON calibration file.
///
/// Validation failures surface as [`CalibrationIoError::Calibration`] so
/// callers can tell a malformed file from an unusable calibration.
pub fn load_intrinsics_json(path: impl AsRef<Path>) -> Result<Intrinsics, CalibrationIoError> {
    let record = CalibrationRecord::load_json(path)?;
    Ok(Intrinsics::try_from(record)?)
}
