//! PhishGuard Core - URL Classification Engine
//!
//! Classifies URLs as phishing or legitimate from lexical/structural
//! signals plus optional live network checks, and improves itself from
//! user-submitted feedback through a retraining loop.
//!
//! ## Architecture
//! - `features/` - feature extraction (schema, lexical signals, probes)
//! - `model/` - trainable classifier internals (vectorizer, forest, artifact)
//! - `classifier` - hot-swappable verdict engine
//! - `corpus/` - feedback corpus with last-write-wins training view
//! - `retrain` - exclusive retraining pipeline
//! - `store` - prediction record storage
//! - `engine` - the application context tying it together

pub mod classifier;
pub mod config;
pub mod constants;
pub mod corpus;
pub mod engine;
pub mod error;
pub mod features;
pub mod model;
pub mod retrain;
pub mod store;

// Re-export the public surface
pub use classifier::{Classification, Classifier, Label};
pub use config::EngineConfig;
pub use corpus::{CorpusManager, FeedbackReceipt, TrainingExample};
pub use engine::{Engine, EngineStatus, UrlVerdict};
pub use error::{CoreError, TrainingFailure};
pub use features::{extract, FeatureVector, NetworkOptions};
pub use model::ModelArtifact;
pub use retrain::{RetrainReport, RetrainState, Retrainer};
pub use store::{PredictionRecord, PredictionStore};
