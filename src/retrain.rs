//! Retrainer - rebuilds the model artifact from the corpus
//!
//! Runs on demand or on a schedule, never inside the classification
//! path. Exactly one retrain may be in flight; a request arriving while
//! one runs is rejected with `RetrainInProgress`. A degraded run (data
//! starvation, quality floor) aborts without touching the active
//! artifact; partial artifacts are never persisted.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use chrono::{DateTime, Utc};
use ndarray::Array2;
use parking_lot::RwLock;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::classifier::{Classifier, Label};
use crate::config::EngineConfig;
use crate::corpus::{seed_examples, CorpusManager, TrainingExample};
use crate::error::{CoreError, TrainingFailure};
use crate::features::{self, layout_hash, FeatureVector, NetworkOptions, SCHEMA_VERSION};
use crate::model::{
    save_artifact, FeatureVectorizer, ForestParams, ModelArtifact, RandomForest, TrainingMetrics,
};

// ============================================================================
// CONSTANTS
// ============================================================================

/// Minimum usable examples per class for a stratified split
const MIN_CLASS_EXAMPLES: usize = 2;

/// Hyperparameter grid searched on every retrain
const GRID_N_TREES: &[usize] = &[100, 150];
const GRID_MAX_DEPTH: &[Option<usize>] = &[None, Some(10), Some(20)];

// ============================================================================
// REPORT & STATE
// ============================================================================

/// Outcome of a successful retraining run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrainReport {
    pub metrics: TrainingMetrics,
    pub params: ForestParams,
    pub schema_version: u16,
    /// Usable training examples after dedup and extraction
    pub corpus_size: usize,
    /// Unique URLs contributed by feedback
    pub feedback_urls: usize,
    /// URLs excluded because extraction rejected them
    pub dropped_urls: usize,
    pub duration_ms: u64,
    pub finished_at: DateTime<Utc>,
}

/// Observable retrainer state for the status surface
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum RetrainState {
    Idle,
    Running,
    Completed { report: RetrainReport },
    Failed { reason: String },
}

// ============================================================================
// RETRAINER
// ============================================================================

pub struct Retrainer {
    running: AtomicBool,
    last: RwLock<RetrainState>,
}

/// Clears the running flag on every exit path
struct RunningGuard<'a> {
    flag: &'a AtomicBool,
}

impl Drop for RunningGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}

impl Retrainer {
    pub fn new() -> Self {
        Self {
            running: AtomicBool::new(false),
            last: RwLock::new(RetrainState::Idle),
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Idle / running / last result
    pub fn state(&self) -> RetrainState {
        self.last.read().clone()
    }

    /// Run one exclusive retraining pass and hot-swap the classifier on
    /// success.
    pub fn retrain(
        &self,
        config: &EngineConfig,
        corpus: &CorpusManager,
        classifier: &Classifier,
    ) -> Result<RetrainReport, CoreError> {
        if self
            .running
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(CoreError::RetrainInProgress);
        }
        let _guard = RunningGuard { flag: &self.running };

        *self.last.write() = RetrainState::Running;
        let result = run(config, corpus, classifier);

        match &result {
            Ok(report) => {
                *self.last.write() = RetrainState::Completed {
                    report: report.clone(),
                }
            }
            Err(e) => {
                log::warn!("Retraining aborted, active model untouched: {}", e);
                *self.last.write() = RetrainState::Failed {
                    reason: e.to_string(),
                }
            }
        }

        result
    }
}

impl Default for Retrainer {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// TRAINING PIPELINE
// ============================================================================

fn run(
    config: &EngineConfig,
    corpus: &CorpusManager,
    classifier: &Classifier,
) -> Result<RetrainReport, CoreError> {
    let started = Instant::now();

    // 1. Assemble the training table: seed, base corpus, then feedback.
    // Later inserts win, so a user correction overrides any base label
    // for the same URL.
    let (table, feedback_urls) = assemble_training_table(config, corpus)?;

    // 2. Extract features; bad rows are excluded, not fatal.
    // Training extraction is lexical-only so retraining never touches
    // the network.
    let net = NetworkOptions::disabled();
    let mut examples: Vec<(FeatureVector, Label)> = Vec::with_capacity(table.len());
    let mut dropped_urls = 0usize;
    for (url, label) in &table {
        match features::extract(url, &net) {
            Ok(vector) => examples.push((vector, *label)),
            Err(e) => {
                dropped_urls += 1;
                log::warn!("Excluding {} from training: {}", url, e);
            }
        }
    }

    // 3. Stratified train/validation split with the fixed seed
    let (train_idx, val_idx) = stratified_split(&examples, config.validation_split, config.seed)?;

    let vectorizer = FeatureVectorizer::fit();
    let (x_train, y_train) = matrix_for(&train_idx, &examples, &vectorizer);
    let (x_val, y_val) = matrix_for(&val_idx, &examples, &vectorizer);

    // 4. Grid search, selecting by held-out F1. F1 over raw accuracy:
    // phishing is the minority class and false negatives cost more.
    let mut best: Option<(ForestParams, RandomForest, Evaluation)> = None;
    for &n_trees in GRID_N_TREES {
        for &max_depth in GRID_MAX_DEPTH {
            let params = ForestParams {
                n_trees,
                max_depth,
                min_samples_split: 2,
            };
            let forest = RandomForest::fit(&x_train, &y_train, params, config.seed);
            let eval = evaluate(&forest, &x_val, &y_val);
            log::debug!(
                "grid point n_trees={} max_depth={:?}: F1 {:.3}",
                n_trees,
                max_depth,
                eval.f1
            );

            if best.as_ref().map_or(true, |(_, _, b)| eval.f1 > b.f1) {
                best = Some((params, forest, eval));
            }
        }
    }
    let (params, forest, eval) = best.expect("hyperparameter grid is never empty");

    // 5. Quality floor: a degraded model never replaces a working one
    if eval.f1 < config.quality_floor {
        return Err(TrainingFailure::QualityFloor {
            f1: eval.f1,
            floor: config.quality_floor,
        }
        .into());
    }

    // 6. Persist atomically, then hot-swap
    let metrics = TrainingMetrics {
        f1: eval.f1,
        precision: eval.precision,
        recall: eval.recall,
        accuracy: eval.accuracy,
        train_size: train_idx.len(),
        validation_size: val_idx.len(),
    };
    let artifact = ModelArtifact {
        schema_version: SCHEMA_VERSION,
        layout_hash: layout_hash(),
        trained_at: Utc::now(),
        params,
        metrics: metrics.clone(),
        vectorizer,
        forest,
    };

    save_artifact(&artifact, &config.model_path())?;
    classifier.install(artifact);

    let report = RetrainReport {
        metrics,
        params,
        schema_version: SCHEMA_VERSION,
        corpus_size: examples.len(),
        feedback_urls,
        dropped_urls,
        duration_ms: started.elapsed().as_millis() as u64,
        finished_at: Utc::now(),
    };
    log::info!(
        "Retraining complete: {} examples ({} from feedback, {} dropped), F1 {:.3} with {:?}",
        report.corpus_size,
        report.feedback_urls,
        report.dropped_urls,
        report.metrics.f1,
        report.params
    );
    Ok(report)
}

/// Build the deduplicated URL -> label table the run trains on.
/// Returns the table plus how many URLs feedback contributed.
pub(crate) fn assemble_training_table(
    config: &EngineConfig,
    corpus: &CorpusManager,
) -> Result<(BTreeMap<String, Label>, usize), CoreError> {
    let mut table: BTreeMap<String, Label> = BTreeMap::new();

    if config.include_seed_corpus {
        for example in seed_examples() {
            table.insert(features::normalized_url(&example.url)?, example.label);
        }
    }

    if let Some(path) = &config.base_corpus_path {
        for example in load_base_corpus(path)? {
            table.insert(features::normalized_url(&example.url)?, example.label);
        }
    }

    let feedback = corpus.effective_view()?;
    let feedback_urls = feedback.len();
    for (url, label) in feedback {
        table.insert(url, label);
    }

    Ok((table, feedback_urls))
}

/// Operator-supplied corpus: JSONL of TrainingExample.
/// Corrupt lines are skipped with a warning, like the feedback log.
fn load_base_corpus(path: &Path) -> Result<Vec<TrainingExample>, CoreError> {
    if !path.exists() {
        return Err(CoreError::NotFound(format!(
            "base corpus not found at {:?}",
            path
        )));
    }

    let reader = BufReader::new(File::open(path)?);
    let mut examples = Vec::new();
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<TrainingExample>(&line) {
            Ok(example) => examples.push(example),
            Err(e) => log::warn!("Skipping corrupt base corpus line: {}", e),
        }
    }
    Ok(examples)
}

/// Class-balanced split with at least one validation row per class.
/// Fails when either class is too small to stratify.
fn stratified_split(
    examples: &[(FeatureVector, Label)],
    val_fraction: f32,
    seed: u64,
) -> Result<(Vec<usize>, Vec<usize>), CoreError> {
    let mut legitimate: Vec<usize> = Vec::new();
    let mut phishing: Vec<usize> = Vec::new();
    for (i, (_, label)) in examples.iter().enumerate() {
        match label {
            Label::Legitimate => legitimate.push(i),
            Label::Phishing => phishing.push(i),
        }
    }

    for (label, bucket) in [(Label::Legitimate, &legitimate), (Label::Phishing, &phishing)] {
        if bucket.len() < MIN_CLASS_EXAMPLES {
            return Err(TrainingFailure::NotEnoughData {
                label: label.as_str().to_string(),
                count: bucket.len(),
                required: MIN_CLASS_EXAMPLES,
            }
            .into());
        }
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let mut train = Vec::new();
    let mut val = Vec::new();
    for bucket in [&mut legitimate, &mut phishing] {
        bucket.shuffle(&mut rng);
        let n_val = ((bucket.len() as f32 * val_fraction).round() as usize)
            .clamp(1, bucket.len() - 1);
        val.extend(bucket[..n_val].iter().copied());
        train.extend(bucket[n_val..].iter().copied());
    }

    Ok((train, val))
}

fn matrix_for(
    indices: &[usize],
    examples: &[(FeatureVector, Label)],
    vectorizer: &FeatureVectorizer,
) -> (Array2<f32>, Vec<f32>) {
    let mut flat = Vec::with_capacity(indices.len() * vectorizer.n_columns());
    let mut y = Vec::with_capacity(indices.len());
    for &i in indices {
        flat.extend(vectorizer.transform(&examples[i].0));
        y.push(examples[i].1.target_value());
    }
    let x = Array2::from_shape_vec((indices.len(), vectorizer.n_columns()), flat)
        .expect("row arity matches vectorizer arity");
    (x, y)
}

// ============================================================================
// EVALUATION
// ============================================================================

struct Evaluation {
    f1: f32,
    precision: f32,
    recall: f32,
    accuracy: f32,
}

/// Held-out metrics with phishing as the positive class
fn evaluate(forest: &RandomForest, x_val: &Array2<f32>, y_val: &[f32]) -> Evaluation {
    let mut tp = 0usize;
    let mut fp = 0usize;
    let mut fn_ = 0usize;
    let mut tn = 0usize;

    for (i, &truth) in y_val.iter().enumerate() {
        let row: Vec<f32> = x_val.row(i).to_vec();
        let predicted = forest.predict(&row);
        match (predicted, truth > 0.5) {
            (true, true) => tp += 1,
            (true, false) => fp += 1,
            (false, true) => fn_ += 1,
            (false, false) => tn += 1,
        }
    }

    let ratio = |num: usize, den: usize| if den == 0 { 0.0 } else { num as f32 / den as f32 };
    let precision = ratio(tp, tp + fp);
    let recall = ratio(tp, tp + fn_);
    let f1 = if precision + recall == 0.0 {
        0.0
    } else {
        2.0 * precision * recall / (precision + recall)
    };
    let accuracy = ratio(tp + tn, tp + tn + fp + fn_);

    Evaluation {
        f1,
        precision,
        recall,
        accuracy,
    }
}

// ============================================================================
// TESTS
// ============================================================================
