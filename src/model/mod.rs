//! Model Module - trainable classifier internals
//!
//! - `vectorizer` - learned named-feature -> column mapping
//! - `forest` - bagged decision-tree ensemble
//! - `artifact` - the persisted (vectorizer, forest) unit

pub mod artifact;
pub mod forest;
pub mod vectorizer;

// Re-export common types
pub use artifact::{load_artifact, save_artifact, ModelArtifact, TrainingMetrics};
pub use forest::{ForestParams, RandomForest};
pub use vectorizer::FeatureVectorizer;
