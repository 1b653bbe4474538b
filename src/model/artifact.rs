//! Model Artifact - the deployable (vectorizer, forest) pair
//!
//! Loaded, swapped and persisted as one unit. Persistence is
//! write-to-temp-then-rename with an embedded SHA-256 checksum, so a
//! crash mid-save can never leave a readable-but-corrupt artifact and
//! bit rot is caught at load time.

use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::forest::{ForestParams, RandomForest};
use super::vectorizer::FeatureVectorizer;
use crate::error::CoreError;
use crate::features::layout::validate_layout;

// ============================================================================
// METRICS
// ============================================================================

/// Held-out evaluation of the selected configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingMetrics {
    pub f1: f32,
    pub precision: f32,
    pub recall: f32,
    pub accuracy: f32,
    pub train_size: usize,
    pub validation_size: usize,
}

// ============================================================================
// ARTIFACT
// ============================================================================

/// The paired vectorizer + decision model, tagged with the schema it was
/// trained against.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub schema_version: u16,
    pub layout_hash: u32,
    pub trained_at: DateTime<Utc>,
    pub params: ForestParams,
    pub metrics: TrainingMetrics,
    pub vectorizer: FeatureVectorizer,
    pub forest: RandomForest,
}

impl ModelArtifact {
    /// Check internal consistency and schema compatibility.
    /// Rejected artifacts are never installed.
    pub fn validate(&self) -> Result<(), CoreError> {
        validate_layout(self.schema_version, self.layout_hash)?;

        if self.vectorizer.n_columns() != self.forest.n_features {
            return Err(CoreError::Storage(format!(
                "artifact vectorizer/model arity mismatch: {} columns vs {} inputs",
                self.vectorizer.n_columns(),
                self.forest.n_features
            )));
        }

        Ok(())
    }
}

// ============================================================================
// PERSISTENCE
// ============================================================================

/// On-disk wrapper: checksum over the serialized artifact
#[derive(Serialize, Deserialize)]
struct ArtifactFile {
    checksum: String,
    artifact: ModelArtifact,
}

fn artifact_checksum(artifact: &ModelArtifact) -> Result<String, CoreError> {
    let payload = serde_json::to_vec(artifact)?;
    Ok(hex::encode(Sha256::digest(&payload)))
}

/// Persist an artifact atomically (temp file + rename in the same dir)
pub fn save_artifact(artifact: &ModelArtifact, path: &Path) -> Result<(), CoreError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let file = ArtifactFile {
        checksum: artifact_checksum(artifact)?,
        artifact: artifact.clone(),
    };
    let bytes = serde_json::to_vec(&file)?;

    let tmp = path.with_extension("tmp");
    fs::write(&tmp, &bytes)?;
    fs::rename(&tmp, path)?;

    log::info!(
        "Model artifact saved to {:?} ({} bytes, schema v{})",
        path,
        bytes.len(),
        artifact.schema_version
    );
    Ok(())
}

/// Load and fully validate a persisted artifact
pub fn load_artifact(path: &Path) -> Result<ModelArtifact, CoreError> {
    if !path.exists() {
        return Err(CoreError::NotFound(format!(
            "model artifact not found at {:?}",
            path
        )));
    }

    let data = fs::read(path)?;
    let file: ArtifactFile = serde_json::from_slice(&data)?;

    let checksum = artifact_checksum(&file.artifact)?;
    if checksum != file.checksum {
        return Err(CoreError::Storage(
            "artifact checksum mismatch - refusing to load".to_string(),
        ));
    }

    file.artifact.validate()?;
    Ok(file.artifact)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::layout::{layout_hash, SCHEMA_VERSION};
    use ndarray::Array2;

    fn test_artifact() -> ModelArtifact {
        let vectorizer = FeatureVectorizer::fit();
        let n_cols = vectorizer.n_columns();

        // Tiny forest over the real column count
        let x = Array2::from_shape_fn((8, n_cols), |(i, j)| ((i + j) % 3) as f32);
        let y = vec![0.0, 1.0, 0.0, 1.0, 0.0, 1.0, 0.0, 1.0];
        let params = ForestParams {
            n_trees: 3,
            max_depth: Some(2),
            min_samples_split: 2,
        };
        let forest = RandomForest::fit(&x, &y, params, 42);

        ModelArtifact {
            schema_version: SCHEMA_VERSION,
            layout_hash: layout_hash(),
            trained_at: Utc::now(),
            params,
            metrics: TrainingMetrics {
                f1: 0.9,
                precision: 0.9,
                recall: 0.9,
                accuracy: 0.9,
                train_size: 6,
                validation_size: 2,
            },
            vectorizer,
            forest,
        }
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model").join("artifact.json");

        let artifact = test_artifact();
        save_artifact(&artifact, &path).unwrap();

        let loaded = load_artifact(&path).unwrap();
        assert_eq!(loaded.schema_version, artifact.schema_version);
        assert_eq!(loaded.forest.n_trees(), artifact.forest.n_trees());
        assert_eq!(loaded.metrics.f1, artifact.metrics.f1);
    }

    #[test]
    fn test_no_temp_file_left_behind() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("artifact.json");

        save_artifact(&test_artifact(), &path).unwrap();

        let names: Vec<String> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["artifact.json".to_string()]);
    }

    #[test]
    fn test_tampered_artifact_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("artifact.json");

        let artifact = test_artifact();
        save_artifact(&artifact, &path).unwrap();

        // Flip the stored F1 in place
        let content = std::fs::read_to_string(&path).unwrap();
        let tampered = content.replacen("\"f1\":0.9", "\"f1\":0.1", 1);
        assert_ne!(content, tampered);
        std::fs::write(&path, tampered).unwrap();

        match load_artifact(&path) {
            Err(CoreError::Storage(msg)) => assert!(msg.contains("checksum")),
            other => panic!("expected checksum failure, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_stale_schema_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("artifact.json");

        let mut artifact = test_artifact();
        artifact.schema_version = SCHEMA_VERSION + 1;
        save_artifact(&artifact, &path).unwrap();

        match load_artifact(&path) {
            Err(CoreError::SchemaMismatch { .. }) => {}
            other => panic!("expected schema mismatch, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_missing_artifact_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        match load_artifact(&dir.path().join("nope.json")) {
            Err(CoreError::NotFound(_)) => {}
            other => panic!("expected NotFound, got {:?}", other.map(|_| ())),
        }
    }
}
