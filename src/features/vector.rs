//! Feature Vector - Core data structure for model input
//!
//! **Versioned feature vector with layout validation**
//!
//! Uses the centralized layout from `layout.rs` for:
//! - Consistent feature ordering
//! - Version tracking
//! - Layout hash for compatibility checks

use serde::{Deserialize, Serialize};

use super::layout::{
    feature_index, layout_hash, validate_layout, FEATURE_COUNT, FEATURE_LAYOUT, SCHEMA_VERSION,
};
use crate::error::CoreError;

// ============================================================================
// VERSIONED FEATURE VECTOR
// ============================================================================

/// Versioned feature vector with layout metadata.
///
/// Every vector carries every name in the declared schema; signals that
/// could not be computed stay at their default instead of being omitted,
/// so the model input dimensionality never varies between calls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    /// Feature schema version
    pub version: u16,
    /// CRC32 hash of the feature layout (for mismatch detection)
    pub layout_hash: u32,
    /// Feature values in the order defined by FEATURE_LAYOUT
    #[serde(with = "array_serde")]
    pub values: [f32; FEATURE_COUNT],
}

/// Serde helper for `[f32; FEATURE_COUNT]`.
///
/// serde's derive only provides `Serialize`/`Deserialize` impls for arrays up
/// to length 32; `FEATURE_COUNT` is larger, so the array is (de)serialized as a
/// plain sequence here. Format and round-trip behavior are unchanged.
mod array_serde {
    use super::FEATURE_COUNT;
    use serde::de::Error as _;
    use serde::ser::SerializeTuple;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(values: &[f32; FEATURE_COUNT], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut tup = serializer.serialize_tuple(FEATURE_COUNT)?;
        for value in values.iter() {
            tup.serialize_element(value)?;
        }
        tup.end()
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<[f32; FEATURE_COUNT], D::Error>
    where
        D: Deserializer<'de>,
    {
        let values = Vec::<f32>::deserialize(deserializer)?;
        values.try_into().map_err(|v: Vec<f32>| {
            D::Error::custom(format!("expected {} features, got {}", FEATURE_COUNT, v.len()))
        })
    }
}

impl FeatureVector {
    /// Create a new zeroed feature vector with the current version
    pub fn new() -> Self {
        Self {
            version: SCHEMA_VERSION,
            layout_hash: layout_hash(),
            values: [0.0; FEATURE_COUNT],
        }
    }

    /// Create from raw values with the current version
    pub fn from_values(values: [f32; FEATURE_COUNT]) -> Self {
        Self {
            version: SCHEMA_VERSION,
            layout_hash: layout_hash(),
            values,
        }
    }

    /// Get values as a slice
    pub fn as_slice(&self) -> &[f32] {
        &self.values
    }

    /// Get feature by index
    pub fn get(&self, index: usize) -> Option<f32> {
        self.values.get(index).copied()
    }

    /// Get feature by name
    pub fn get_by_name(&self, name: &str) -> Option<f32> {
        feature_index(name).and_then(|i| self.get(i))
    }

    /// Set feature by index
    pub fn set(&mut self, index: usize, value: f32) {
        if index < FEATURE_COUNT {
            self.values[index] = value;
        }
    }

    /// Set feature by name; returns false for names outside the schema
    pub fn set_by_name(&mut self, name: &str, value: f32) -> bool {
        if let Some(index) = feature_index(name) {
            self.set(index, value);
            true
        } else {
            false
        }
    }

    /// Set a boolean flag by name (stored as 0.0 / 1.0)
    pub fn set_flag(&mut self, name: &str, value: bool) -> bool {
        self.set_by_name(name, if value { 1.0 } else { 0.0 })
    }

    /// Validate that this vector is compatible with the current layout
    pub fn validate(&self) -> Result<(), CoreError> {
        validate_layout(self.version, self.layout_hash)
    }

    /// Check if this vector is compatible with the current layout
    pub fn is_compatible(&self) -> bool {
        self.validate().is_ok()
    }

    /// Feature names for this vector
    pub fn feature_names(&self) -> &'static [&'static str] {
        FEATURE_LAYOUT
    }

    /// Convert to a JSON map of name -> value for logging and the CLI
    pub fn to_named_map(&self) -> serde_json::Value {
        serde_json::json!({
            "schema_version": self.version,
            "layout_hash": self.layout_hash,
            "features": FEATURE_LAYOUT.iter()
                .zip(self.values.iter())
                .map(|(name, value)| (name.to_string(), *value))
                .collect::<std::collections::BTreeMap<_, _>>(),
        })
    }
}

impl Default for FeatureVector {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// FEATURE EXTRACTOR TRAIT
// ============================================================================

/// Trait for signal groups that write into a feature vector
pub trait FeatureExtractor {
    /// Extract features and update the vector
    fn extract(&self, vector: &mut FeatureVector);
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feature_vector_new() {
        let vector = FeatureVector::new();
        assert_eq!(vector.version, SCHEMA_VERSION);
        assert_eq!(vector.layout_hash, layout_hash());
        assert!(vector.values.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_feature_vector_set_by_name() {
        let mut vector = FeatureVector::new();
        assert!(vector.set_by_name("url_length", 42.0));
        assert_eq!(vector.get_by_name("url_length"), Some(42.0));

        assert!(!vector.set_by_name("nonexistent", 0.0));
        assert_eq!(vector.get_by_name("nonexistent"), None);
    }

    #[test]
    fn test_feature_vector_set_flag() {
        let mut vector = FeatureVector::new();
        assert!(vector.set_flag("has_https", true));
        assert_eq!(vector.get_by_name("has_https"), Some(1.0));
        assert!(vector.set_flag("has_https", false));
        assert_eq!(vector.get_by_name("has_https"), Some(0.0));
    }

    #[test]
    fn test_feature_vector_validation() {
        let vector = FeatureVector::new();
        assert!(vector.is_compatible());

        let mut stale = FeatureVector::new();
        stale.version = SCHEMA_VERSION + 1;
        assert!(!stale.is_compatible());
    }

    #[test]
    fn test_to_named_map() {
        let mut vector = FeatureVector::new();
        vector.set_by_name("num_dots", 3.0);

        let map = vector.to_named_map();
        assert_eq!(map["schema_version"], SCHEMA_VERSION);
        assert_eq!(map["features"]["num_dots"], 3.0);
    }

    #[test]
    fn test_serde_round_trip() {
        let mut vector = FeatureVector::new();
        vector.set_by_name("ratio_digits", 0.25);

        let json = serde_json::to_string(&vector).unwrap();
        let back: FeatureVector = serde_json::from_str(&json).unwrap();
        assert_eq!(back, vector);
    }
}
