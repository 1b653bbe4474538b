//! Extraction Pipeline
//!
//! Composes normalization, permissive parsing, lexical signals and the
//! optional network probes into one schema-stable call.
//!
//! Policy: malformed-but-nonempty input yields the full zero-valued
//! schema ("maximally suspicious by absence of signal") so downstream
//! classification always has a vector to score. Only genuinely empty
//! input is an error.

use std::time::Duration;

use super::probe;
use super::url::{normalize, parse_parts, LexicalSignals};
use super::vector::{FeatureExtractor, FeatureVector};
use crate::error::CoreError;

// ============================================================================
// NETWORK OPTIONS
// ============================================================================

/// Controls the network-derived half of the schema
#[derive(Debug, Clone)]
pub struct NetworkOptions {
    pub enabled: bool,
    pub timeout: Duration,
}

impl NetworkOptions {
    /// Lexical-only extraction (pure; used in the training path)
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            timeout: Duration::from_secs(crate::constants::DEFAULT_PROBE_TIMEOUT_SECS),
        }
    }

    /// Probes enabled with the given per-call timeout
    pub fn enabled(timeout_secs: u64) -> Self {
        Self {
            enabled: true,
            timeout: Duration::from_secs(timeout_secs),
        }
    }
}

impl Default for NetworkOptions {
    fn default() -> Self {
        Self::disabled()
    }
}

// ============================================================================
// EXTRACTION
// ============================================================================

/// Turn a raw URL string into the fixed-schema feature vector.
///
/// Fails only on empty input. Parse failures return the all-zero schema.
/// Network probes run only for `https` URLs with probing enabled; probe
/// failures degrade to sentinels inside `probe::collect`.
pub fn extract(url: &str, net: &NetworkOptions) -> Result<FeatureVector, CoreError> {
    let normalized = normalize(url)?;
    let mut vector = FeatureVector::new();

    let parts = match parse_parts(&normalized) {
        Some(parts) => parts,
        None => {
            log::debug!("unparseable URL, returning zero schema: {}", normalized);
            return Ok(vector);
        }
    };

    LexicalSignals {
        url: &normalized,
        parts: &parts,
    }
    .extract(&mut vector);

    if net.enabled && parts.scheme == "https" {
        probe::collect(&parts.host, net.timeout).extract(&mut vector);
    }

    Ok(vector)
}

/// Normalized form of a URL, shared with the corpus manager so that
/// feedback dedup keys match extraction input.
pub fn normalized_url(url: &str) -> Result<String, CoreError> {
    normalize(url)
}
