//! Feature Layout - Centralized Feature Schema
//!
//! **CRITICAL: This file controls the feature schema**
//!
//! ## Rules (NEVER break these):
//! 1. Add feature → increment SCHEMA_VERSION
//! 2. Change order → increment SCHEMA_VERSION
//! 3. Remove feature → increment SCHEMA_VERSION
//!
//! ## Why versioning matters:
//! - Model artifact compatibility
//! - Feedback corpus replay / training data
//! - Cross-version migrations

use crc32fast::Hasher;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ============================================================================
// SCHEMA VERSION
// ============================================================================

/// Current feature schema version.
/// MUST be incremented when the layout changes.
pub const SCHEMA_VERSION: u16 = 1;

// ============================================================================
// FEATURE LAYOUT (Authoritative source)
// ============================================================================

/// Feature names in the exact order they appear in the vector.
/// This is the SINGLE SOURCE OF TRUTH for the feature schema.
pub const FEATURE_LAYOUT: &[&str] = &[
    // === Length counts (0-3) ===
    "url_length",               // 0: chars in the normalized URL
    "host_length",              // 1: chars in the host
    "path_length",              // 2: chars in the path
    "query_length",             // 3: chars in the query string

    // === Character counts over host+path+query (4-9) ===
    "num_dots",                 // 4
    "num_hyphens",              // 5
    "num_underscores",          // 6
    "num_slashes",              // 7
    "num_digits",               // 8
    "num_letters",              // 9

    // === Ratios, 0 when denominator empty (10-11) ===
    "ratio_digits",             // 10: digits / total, in [0,1]
    "ratio_letters",            // 11: letters / total, in [0,1]

    // === Scheme / token flags (12-13) ===
    "has_https",                // 12: normalized URL starts with https
    "count_https_token",        // 13: embedded "https" occurrences

    // === Structural flags (14-21) ===
    "has_ip",                   // 14: host is a strict dotted quad
    "has_at_symbol",            // 15
    "has_port",                 // 16: explicit port in authority
    "has_query",                // 17
    "has_equals",               // 18: '=' inside the query
    "has_double_slash",         // 19: '//' beyond the scheme delimiter
    "has_hex_encoding",         // 20: %XX escape present
    "num_subdomains",           // 21: host dot count - 1, clamped at 0

    // === Keyword / risk flags (22-29) ===
    "suspicious_keyword_count", // 22
    "has_suspicious_keyword",   // 23
    "tld_length",               // 24
    "is_tld_suspicious",        // 25
    "is_shortener",             // 26: host is a known URL shortener
    "is_trusted_domain",        // 27: allowlist substring match
    "host_is_short",            // 28: host shorter than SHORT_HOST_LEN
    "is_https_and_trusted",     // 29

    // === Network-derived, sentinel-substituted (30-33) ===
    // 0 when probing is disabled; -1 age sentinels when a probe failed.
    "cert_valid",               // 30
    "cert_age_days",            // 31
    "cert_matches_host",        // 32
    "domain_age_days",          // 33
];

/// Total number of features.
/// IMPORTANT: Must match FEATURE_LAYOUT.len()!
pub const FEATURE_COUNT: usize = 34;

// ============================================================================
// LAYOUT HASH
// ============================================================================

/// Compute CRC32 hash of the feature layout.
/// Used to detect layout mismatches at runtime.
pub fn compute_layout_hash() -> u32 {
    let mut hasher = Hasher::new();

    // Include version in hash
    hasher.update(&SCHEMA_VERSION.to_le_bytes());

    // Hash all feature names in order
    for name in FEATURE_LAYOUT {
        hasher.update(name.as_bytes());
        hasher.update(&[0]); // Separator
    }

    hasher.finalize()
}

/// Get layout hash (inputs are const, so this is stable per build)
pub fn layout_hash() -> u32 {
    compute_layout_hash()
}

// ============================================================================
// LAYOUT INFO
// ============================================================================

/// Complete layout information for serialization/logging
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutInfo {
    pub version: u16,
    pub hash: u32,
    pub feature_count: usize,
    pub feature_names: Vec<String>,
}

impl LayoutInfo {
    pub fn current() -> Self {
        Self {
            version: SCHEMA_VERSION,
            hash: layout_hash(),
            feature_count: FEATURE_COUNT,
            feature_names: FEATURE_LAYOUT.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl Default for LayoutInfo {
    fn default() -> Self {
        Self::current()
    }
}

// ============================================================================
// LAYOUT VALIDATION
// ============================================================================

/// Validate that incoming data matches the current layout
pub fn validate_layout(incoming_version: u16, incoming_hash: u32) -> Result<(), CoreError> {
    let current_hash = layout_hash();

    if incoming_version != SCHEMA_VERSION || incoming_hash != current_hash {
        return Err(CoreError::SchemaMismatch {
            expected_version: SCHEMA_VERSION,
            expected_hash: current_hash,
            actual_version: incoming_version,
            actual_hash: incoming_hash,
        });
    }

    Ok(())
}

/// Check if a layout is compatible (same version, same hash)
pub fn is_layout_compatible(version: u16, hash: u32) -> bool {
    version == SCHEMA_VERSION && hash == layout_hash()
}

// ============================================================================
// FEATURE INDEX LOOKUP
// ============================================================================

/// Get feature index by name (O(n) but features are few)
pub fn feature_index(name: &str) -> Option<usize> {
    FEATURE_LAYOUT.iter().position(|&n| n == name)
}

/// Get feature name by index
pub fn feature_name(index: usize) -> Option<&'static str> {
    FEATURE_LAYOUT.get(index).copied()
}

// ============================================================================
// TESTS
// ============================================================================
