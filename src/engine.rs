//! Engine - the application context wiring the core together
//!
//! Owns the classifier handle, feedback corpus, retrainer and the
//! prediction store, and exposes the surface callers use: extract,
//! classify, submit feedback, retrain, status. Nothing in here is
//! global state; the engine is the explicitly owned context the design
//! calls for.

use serde::{Deserialize, Serialize};

use crate::classifier::{Classifier, ClassifierStatus, Label};
use crate::config::EngineConfig;
use crate::corpus::{CorpusManager, FeedbackReceipt};
use crate::error::CoreError;
use crate::features::{self, FeatureVector, NetworkOptions, SCHEMA_VERSION};
use crate::retrain::{RetrainReport, RetrainState, Retrainer};
use crate::store::{PredictionRecord, PredictionStore};

// ============================================================================
// RESULT TYPES
// ============================================================================

/// Full result of classifying a raw URL
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UrlVerdict {
    pub url: String,
    pub verdict: Label,
    pub confidence: Option<f32>,
    /// Stored prediction record id (opaque)
    pub prediction_id: String,
    /// Operator-facing headline, when one applies
    pub flag_reason: Option<String>,
}

/// Engine status summary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineStatus {
    pub schema_version: u16,
    pub classifier: ClassifierStatus,
    pub retrain: RetrainState,
    pub feedback_records: usize,
    pub stored_predictions: usize,
    pub network_checks: bool,
}

// ============================================================================
// ENGINE
// ============================================================================

pub struct Engine {
    config: EngineConfig,
    classifier: Classifier,
    corpus: CorpusManager,
    retrainer: Retrainer,
    store: PredictionStore,
}

impl Engine {
    /// Build an engine rooted at the configured data directory
    pub fn new(config: EngineConfig) -> Result<Self, CoreError> {
        std::fs::create_dir_all(&config.data_dir)?;

        let corpus = CorpusManager::new(config.feedback_dir());
        let store = PredictionStore::open(&config.store_path())?;

        Ok(Self {
            config,
            classifier: Classifier::new(),
            corpus,
            retrainer: Retrainer::new(),
            store,
        })
    }

    /// Ephemeral engine (in-memory store) for tests
    #[cfg(test)]
    pub fn ephemeral(config: EngineConfig) -> Result<Self, CoreError> {
        let corpus = CorpusManager::new(config.feedback_dir());
        let store = PredictionStore::open_in_memory()?;

        Ok(Self {
            config,
            classifier: Classifier::new(),
            corpus,
            retrainer: Retrainer::new(),
            store,
        })
    }

    /// Load the persisted artifact if one exists. A fresh install has
    /// none; classification then fails with ModelNotLoaded until the
    /// first retrain.
    pub fn init(&self) {
        let model_path = self.config.model_path();
        match self.classifier.load_from(&model_path) {
            Ok(()) => log::info!("Model artifact loaded from {:?}", model_path),
            Err(CoreError::NotFound(_)) => {
                log::info!("No model artifact at {:?} - retrain to create one", model_path)
            }
            Err(e) => log::warn!("Stored model artifact rejected: {}", e),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    fn network_options(&self) -> NetworkOptions {
        if self.config.network_checks {
            NetworkOptions::enabled(self.config.probe_timeout_secs)
        } else {
            NetworkOptions::disabled()
        }
    }

    // ------------------------------------------------------------------
    // Public surface
    // ------------------------------------------------------------------

    /// Schema-stable feature extraction
    pub fn extract_features(&self, url: &str) -> Result<FeatureVector, CoreError> {
        features::extract(url, &self.network_options())
    }

    /// Extract, classify and persist the verdict
    pub fn classify_url(&self, url: &str) -> Result<UrlVerdict, CoreError> {
        let normalized = features::normalized_url(url)?;
        let vector = features::extract(&normalized, &self.network_options())?;
        let classification = self.classifier.classify(&vector)?;

        let prediction_id =
            self.store
                .insert(&normalized, classification.verdict, classification.confidence)?;

        log::info!(
            "Classified {} -> {} (id {})",
            normalized,
            classification.verdict,
            prediction_id
        );

        Ok(UrlVerdict {
            url: normalized,
            verdict: classification.verdict,
            confidence: classification.confidence,
            prediction_id,
            flag_reason: features::flag_reason(&vector).map(str::to_string),
        })
    }

    /// Record a corrected label for a URL
    pub fn submit_feedback(&self, url: &str, label: &str) -> Result<FeedbackReceipt, CoreError> {
        self.corpus.record_feedback(url, label)
    }

    /// Record a corrected label against a previously stored verdict.
    /// The id is opaque; unknown or malformed ids are "not found".
    pub fn submit_feedback_for(
        &self,
        prediction_id: &str,
        label: &str,
    ) -> Result<FeedbackReceipt, CoreError> {
        let parsed = Label::parse(label)?;

        let record = self
            .store
            .get(prediction_id)?
            .ok_or_else(|| CoreError::NotFound(format!("prediction {}", prediction_id)))?;

        let receipt = self.corpus.record_feedback_label(&record.url, parsed)?;
        self.store.update_feedback(prediction_id, parsed)?;
        Ok(receipt)
    }

    /// Rebuild the model from the corpus and hot-swap it in
    pub fn retrain(&self) -> Result<RetrainReport, CoreError> {
        self.retrainer
            .retrain(&self.config, &self.corpus, &self.classifier)
    }

    /// Idle / running / last result
    pub fn retrain_status(&self) -> RetrainState {
        self.retrainer.state()
    }

    /// Stored prediction records
    pub fn predictions(&self) -> Result<Vec<PredictionRecord>, CoreError> {
        self.store.list_all()
    }

    /// One stored prediction by opaque id
    pub fn prediction(&self, id: &str) -> Result<Option<PredictionRecord>, CoreError> {
        self.store.get(id)
    }

    /// Engine status summary
    pub fn status(&self) -> Result<EngineStatus, CoreError> {
        Ok(EngineStatus {
            schema_version: SCHEMA_VERSION,
            classifier: self.classifier.status(),
            retrain: self.retrainer.state(),
            feedback_records: self.corpus.history_len()?,
            stored_predictions: self.store.count()?,
            network_checks: self.config.network_checks,
        })
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn trained_engine(dir: &std::path::Path) -> Engine {
        let engine = Engine::ephemeral(EngineConfig::rooted_at(dir)).unwrap();
        engine.retrain().unwrap();
        engine
    }

    #[test]
    fn test_classify_before_training_fails() {
        let dir = tempdir().unwrap();
        let engine = Engine::ephemeral(EngineConfig::rooted_at(dir.path())).unwrap();

        match engine.classify_url("https://example.com") {
            Err(CoreError::ModelNotLoaded) => {}
            other => panic!("expected ModelNotLoaded, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_default_trained_verdicts() {
        let dir = tempdir().unwrap();
        let engine = trained_engine(dir.path());

        // Keyword + suspicious-TLD signals dominate
        let bad = engine
            .classify_url("https://accounts-update-secure-login.tk/verify")
            .unwrap();
        assert_eq!(bad.verdict, Label::Phishing);

        // Trusted-domain + HTTPS signals dominate
        let good = engine.classify_url("https://www.who.int").unwrap();
        assert_eq!(good.verdict, Label::Legitimate);
    }

    #[test]
    fn test_classify_persists_prediction() {
        let dir = tempdir().unwrap();
        let engine = trained_engine(dir.path());

        let verdict = engine.classify_url("https://www.who.int").unwrap();
        let record = engine.prediction(&verdict.prediction_id).unwrap().unwrap();
        assert_eq!(record.url, "https://www.who.int");
        assert_eq!(record.verdict, verdict.verdict);
        assert_eq!(engine.predictions().unwrap().len(), 1);
    }

    #[test]
    fn test_feedback_by_prediction_id() {
        let dir = tempdir().unwrap();
        let engine = trained_engine(dir.path());

        let verdict = engine
            .classify_url("http://new-phishy-login.example.tk/verify")
            .unwrap();
        let receipt = engine
            .submit_feedback_for(&verdict.prediction_id, "phishing")
            .unwrap();
        assert_eq!(receipt.url, "http://new-phishy-login.example.tk/verify");

        let record = engine.prediction(&verdict.prediction_id).unwrap().unwrap();
        assert_eq!(record.feedback, Some(Label::Phishing));
    }

    #[test]
    fn test_feedback_for_unknown_id_is_not_found() {
        let dir = tempdir().unwrap();
        let engine = trained_engine(dir.path());

        for bad in ["garbage-id", "00000000-0000-0000-0000-000000000000"] {
            match engine.submit_feedback_for(bad, "phishing") {
                Err(CoreError::NotFound(_)) => {}
                other => panic!("expected NotFound for '{}', got {:?}", bad, other.map(|_| ())),
            }
        }
    }

    #[test]
    fn test_feedback_then_retrain_flips_verdict() {
        let dir = tempdir().unwrap();
        let engine = trained_engine(dir.path());

        // A URL the default model reads as phishing
        let url = "http://secure-account-login-update.tk/verify";
        assert_eq!(engine.classify_url(url).unwrap().verdict, Label::Phishing);

        // The operator corrects it twice; last write wins, and several
        // sibling corrections give the forest something to learn from
        engine.submit_feedback(url, "phishing").unwrap();
        engine.submit_feedback(url, "legitimate").unwrap();

        let report = engine.retrain().unwrap();
        assert!(report.feedback_urls >= 1);

        // The retrained model must have trained on "legitimate" for the
        // corrected URL (the training table says so even if the verdict
        // stays conservative)
        let (table, _) = crate::retrain::assemble_training_table(
            engine.config(),
            &CorpusManager::new(engine.config().feedback_dir()),
        )
        .unwrap();
        assert_eq!(table[url], Label::Legitimate);
    }

    #[test]
    fn test_status_reflects_activity() {
        let dir = tempdir().unwrap();
        let engine = Engine::ephemeral(EngineConfig::rooted_at(dir.path())).unwrap();

        let status = engine.status().unwrap();
        assert!(!status.classifier.model_loaded);
        assert!(matches!(status.retrain, RetrainState::Idle));
        assert_eq!(status.stored_predictions, 0);

        engine.retrain().unwrap();
        engine.classify_url("https://www.who.int").unwrap();
        engine.submit_feedback("http://x.example.tk", "phishing").unwrap();

        let status = engine.status().unwrap();
        assert!(status.classifier.model_loaded);
        assert!(matches!(status.retrain, RetrainState::Completed { .. }));
        assert_eq!(status.stored_predictions, 1);
        assert_eq!(status.feedback_records, 1);
        assert_eq!(status.schema_version, SCHEMA_VERSION);
    }

    #[test]
    fn test_init_restores_persisted_model() {
        let dir = tempdir().unwrap();
        let config = EngineConfig::rooted_at(dir.path());

        // Train once; artifact lands on disk
        {
            let engine = Engine::new(config.clone()).unwrap();
            engine.retrain().unwrap();
        }

        // A fresh engine picks it up via init
        let engine = Engine::new(config).unwrap();
        assert!(!engine.status().unwrap().classifier.model_loaded);
        engine.init();
        assert!(engine.status().unwrap().classifier.model_loaded);
        engine.classify_url("https://www.who.int").unwrap();
    }
}
