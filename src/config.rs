//! Engine Configuration
//!
//! Defaults live here; everything can be overridden from a JSON config
//! file or set at construction time.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Engine configuration (can be loaded from a config file)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Root directory for all persisted state (model, feedback, store)
    pub data_dir: PathBuf,
    /// Enable network-derived features (TLS probe, RDAP domain age)
    pub network_checks: bool,
    /// Per-probe timeout in seconds
    pub probe_timeout_secs: u64,
    /// Minimum validation F1 a retrain must reach to replace the model
    pub quality_floor: f32,
    /// Held-out fraction for validation (stratified)
    pub validation_split: f32,
    /// RNG seed for splits and forest training
    pub seed: u64,
    /// Include the embedded seed corpus in training
    pub include_seed_corpus: bool,
    /// Optional extra training corpus (JSONL of {url, label})
    pub base_corpus_path: Option<PathBuf>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        let data_dir = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("phishguard");

        Self {
            data_dir,
            network_checks: false,
            probe_timeout_secs: crate::constants::DEFAULT_PROBE_TIMEOUT_SECS,
            quality_floor: 0.6,
            validation_split: 0.2,
            seed: 42,
            include_seed_corpus: true,
            base_corpus_path: None,
        }
    }
}

impl EngineConfig {
    /// Fully offline profile: lexical features only
    pub fn offline() -> Self {
        Self {
            network_checks: false,
            ..Default::default()
        }
    }

    /// Profile with live TLS/RDAP enrichment enabled
    pub fn with_network_checks() -> Self {
        Self {
            network_checks: true,
            ..Default::default()
        }
    }

    /// Rooted at an explicit directory (used by tests and the CLI)
    pub fn rooted_at(dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: dir.into(),
            ..Default::default()
        }
    }

    /// Active model artifact location
    pub fn model_path(&self) -> PathBuf {
        self.data_dir.join("model").join("phishing_model.json")
    }

    /// Feedback corpus directory
    pub fn feedback_dir(&self) -> PathBuf {
        self.data_dir.join("feedback")
    }

    /// Prediction store location
    pub fn store_path(&self) -> PathBuf {
        self.data_dir.join("predictions.db")
    }

    /// Default config file location inside the data directory
    pub fn config_path(&self) -> PathBuf {
        self.data_dir.join("config.json")
    }

    /// Load from a JSON file
    pub fn load(path: &Path) -> Result<Self, CoreError> {
        let data = fs::read(path)?;
        let config = serde_json::from_slice(&data)?;
        Ok(config)
    }

    /// Save to a JSON file
    pub fn save(&self, path: &Path) -> Result<(), CoreError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_vec_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}

// ============================================================================
// TESTS
// ============================================================================
