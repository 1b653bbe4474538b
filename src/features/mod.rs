//! Features Module - URL Feature Extraction Engine
//!
//! Splits extraction into lexical signals (pure string work) and the
//! optional network probes. The schema itself lives in `layout.rs` and
//! is the single versioned source of truth.

pub mod extract;
pub mod layout;
pub mod probe;
pub mod url;
pub mod vector;

#[cfg(test)]
mod tests;

// Re-export common types
pub use extract::{extract, normalized_url, NetworkOptions};
pub use layout::{layout_hash, LayoutInfo, FEATURE_COUNT, FEATURE_LAYOUT, SCHEMA_VERSION};
pub use self::url::flag_reason;
pub use vector::{FeatureExtractor, FeatureVector};
