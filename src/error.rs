//! Error Taxonomy
//!
//! Every error that crosses the crate boundary is one of these kinds.
//! Internal probe failures never appear here: they are absorbed into
//! sentinel feature values inside `features::probe`.

use std::fmt;

/// Reasons a retraining run is refused or aborted without replacing the
/// active model.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub enum TrainingFailure {
    /// One of the classes has too few usable examples to stratify
    NotEnoughData {
        label: String,
        count: usize,
        required: usize,
    },
    /// Best held-out F1 fell below the configured quality floor
    QualityFloor { f1: f32, floor: f32 },
}

impl fmt::Display for TrainingFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrainingFailure::NotEnoughData { label, count, required } => write!(
                f,
                "not enough '{}' examples to stratify: {} (need at least {})",
                label, count, required
            ),
            TrainingFailure::QualityFloor { f1, floor } => write!(
                f,
                "validation F1 {:.3} below quality floor {:.3}",
                f1, floor
            ),
        }
    }
}

impl std::error::Error for TrainingFailure {}

/// Top-level error kind for the core service
#[derive(Debug)]
pub enum CoreError {
    /// Empty or non-textual URL input
    InvalidInput(String),
    /// Feedback label is not one of the two canonical values
    InvalidLabel(String),
    /// No model artifact is currently loaded
    ModelNotLoaded,
    /// Another retraining run is already in flight
    RetrainInProgress,
    /// Retraining aborted without touching the active artifact
    Training(TrainingFailure),
    /// Persisted artifact/corpus does not match the current feature schema
    SchemaMismatch {
        expected_version: u16,
        expected_hash: u32,
        actual_version: u16,
        actual_hash: u32,
    },
    /// Referenced record does not exist
    NotFound(String),
    /// Prediction store failure
    Storage(String),
    IoError(std::io::Error),
    SerializationError(serde_json::Error),
}

impl fmt::Display for CoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoreError::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            CoreError::InvalidLabel(msg) => write!(f, "Invalid label: {}", msg),
            CoreError::ModelNotLoaded => write!(f, "No model artifact loaded"),
            CoreError::RetrainInProgress => write!(f, "A retraining run is already in progress"),
            CoreError::Training(failure) => write!(f, "Training failed: {}", failure),
            CoreError::SchemaMismatch {
                expected_version,
                expected_hash,
                actual_version,
                actual_hash,
            } => write!(
                f,
                "Schema mismatch: expected v{} ({:08x}), got v{} ({:08x})",
                expected_version, expected_hash, actual_version, actual_hash
            ),
            CoreError::NotFound(msg) => write!(f, "Not found: {}", msg),
            CoreError::Storage(msg) => write!(f, "Storage error: {}", msg),
            CoreError::IoError(e) => write!(f, "IO error: {}", e),
            CoreError::SerializationError(e) => write!(f, "Serialization error: {}", e),
        }
    }
}

impl std::error::Error for CoreError {}

impl From<std::io::Error> for CoreError {
    fn from(err: std::io::Error) -> Self {
        CoreError::IoError(err)
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        CoreError::SerializationError(err)
    }
}

impl From<rusqlite::Error> for CoreError {
    fn from(err: rusqlite::Error) -> Self {
        CoreError::Storage(err.to_string())
    }
}

impl From<TrainingFailure> for CoreError {
    fn from(err: TrainingFailure) -> Self {
        CoreError::Training(err)
    }
}
