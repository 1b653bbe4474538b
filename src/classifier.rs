//! Classifier - hot-swappable verdict engine
//!
//! Owns the currently active model artifact behind an explicitly shared
//! handle. Installing a new artifact is a single pointer replacement;
//! in-flight classifications keep scoring against the snapshot they
//! cloned, so no reader ever observes a half-replaced vectorizer/model
//! pair. The lock is never held across scoring.

use std::path::Path;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::features::FeatureVector;
use crate::model::{load_artifact, ModelArtifact};

// ============================================================================
// LABEL
// ============================================================================

/// The two canonical classes. The historical 0/1 and "good"/"bad"
/// polarities are not accepted anywhere in this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Label {
    Legitimate,
    Phishing,
}

impl Label {
    pub fn as_str(&self) -> &'static str {
        match self {
            Label::Legitimate => "legitimate",
            Label::Phishing => "phishing",
        }
    }

    /// Parse a user-supplied label, case- and whitespace-insensitively
    pub fn parse(input: &str) -> Result<Self, CoreError> {
        match input.trim().to_lowercase().as_str() {
            "legitimate" => Ok(Label::Legitimate),
            "phishing" => Ok(Label::Phishing),
            other => Err(CoreError::InvalidLabel(format!(
                "'{}' is not one of 'legitimate' / 'phishing'",
                other
            ))),
        }
    }

    /// Training target encoding (phishing is the positive class)
    pub fn target_value(&self) -> f32 {
        match self {
            Label::Legitimate => 0.0,
            Label::Phishing => 1.0,
        }
    }

    pub fn from_proba(proba: f32) -> Self {
        if proba >= 0.5 {
            Label::Phishing
        } else {
            Label::Legitimate
        }
    }
}

impl std::fmt::Display for Label {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// CLASSIFICATION RESULT
// ============================================================================

/// Verdict plus the winning class's posterior probability.
/// `confidence` is omitted rather than fabricated if the model cannot
/// produce probabilities.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Classification {
    pub verdict: Label,
    pub confidence: Option<f32>,
}

/// Status summary for the engine surface
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierStatus {
    pub model_loaded: bool,
    pub schema_version: Option<u16>,
    pub trained_at: Option<chrono::DateTime<chrono::Utc>>,
    pub validation_f1: Option<f32>,
    pub n_trees: Option<usize>,
}

// ============================================================================
// CLASSIFIER
// ============================================================================

/// Explicitly owned model handle, passed through the application context
/// instead of living in module-level state.
pub struct Classifier {
    active: RwLock<Option<Arc<ModelArtifact>>>,
}

impl Classifier {
    pub fn new() -> Self {
        Self {
            active: RwLock::new(None),
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.active.read().is_some()
    }

    /// Atomic hot-swap: one pointer write under the lock
    pub fn install(&self, artifact: ModelArtifact) {
        let version = artifact.schema_version;
        let f1 = artifact.metrics.f1;
        *self.active.write() = Some(Arc::new(artifact));
        log::info!(
            "Model artifact installed (schema v{}, validation F1 {:.3})",
            version,
            f1
        );
    }

    /// Clone the active artifact pointer. Callers score against this
    /// snapshot without holding any lock.
    pub fn snapshot(&self) -> Option<Arc<ModelArtifact>> {
        self.active.read().clone()
    }

    /// Load, validate and install a persisted artifact
    pub fn load_from(&self, path: &Path) -> Result<(), CoreError> {
        let artifact = load_artifact(path)?;
        self.install(artifact);
        Ok(())
    }

    /// Score one feature vector against the active artifact
    pub fn classify(&self, vector: &FeatureVector) -> Result<Classification, CoreError> {
        let artifact = self.snapshot().ok_or(CoreError::ModelNotLoaded)?;

        let row = artifact.vectorizer.transform(vector);
        let proba = artifact.forest.predict_proba(&row);
        let verdict = Label::from_proba(proba);
        let confidence = Some(if proba >= 0.5 { proba } else { 1.0 - proba });

        Ok(Classification {
            verdict,
            confidence,
        })
    }

    pub fn status(&self) -> ClassifierStatus {
        match self.snapshot() {
            Some(artifact) => ClassifierStatus {
                model_loaded: true,
                schema_version: Some(artifact.schema_version),
                trained_at: Some(artifact.trained_at),
                validation_f1: Some(artifact.metrics.f1),
                n_trees: Some(artifact.forest.n_trees()),
            },
            None => ClassifierStatus {
                model_loaded: false,
                schema_version: None,
                trained_at: None,
                validation_f1: None,
                n_trees: None,
            },
        }
    }
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// TESTS
// ============================================================================
