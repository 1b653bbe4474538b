//! Feature Vectorizer
//!
//! The learned mapping from named features to the model's numeric input
//! columns. The column order is frozen at training time, so an artifact
//! keeps working when the extractor later grows new names: names the
//! vectorizer never learned are ignored, learned names missing from a
//! vector read as zero. Breaking layout changes are caught one level up
//! by the schema version check on the artifact.

use serde::{Deserialize, Serialize};

use crate::features::{FeatureVector, FEATURE_LAYOUT};

/// Name -> column mapping learned at training time
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureVectorizer {
    names: Vec<String>,
}

impl FeatureVectorizer {
    /// Fit on the current schema: one column per declared feature name,
    /// in layout order.
    pub fn fit() -> Self {
        Self {
            names: FEATURE_LAYOUT.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Number of model input columns
    pub fn n_columns(&self) -> usize {
        self.names.len()
    }

    /// Column names in model input order
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Map a named feature vector into model input space.
    /// Missing learned names read as zero; extra names are ignored.
    pub fn transform(&self, vector: &FeatureVector) -> Vec<f32> {
        self.names
            .iter()
            .map(|name| vector.get_by_name(name).unwrap_or(0.0))
            .collect()
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::FEATURE_COUNT;

    #[test]
    fn test_fit_covers_schema() {
        let vectorizer = FeatureVectorizer::fit();
        assert_eq!(vectorizer.n_columns(), FEATURE_COUNT);
        assert_eq!(vectorizer.names()[0], "url_length");
    }

    #[test]
    fn test_transform_preserves_order() {
        let vectorizer = FeatureVectorizer::fit();
        let mut v = FeatureVector::new();
        v.set_by_name("url_length", 23.0);
        v.set_by_name("num_dots", 2.0);

        let row = vectorizer.transform(&v);
        assert_eq!(row.len(), FEATURE_COUNT);
        assert_eq!(row[0], 23.0);
        assert_eq!(row[4], 2.0);
    }

    #[test]
    fn test_unknown_names_read_as_zero() {
        // A vectorizer trained on names the current schema no longer has
        let vectorizer = FeatureVectorizer {
            names: vec!["url_length".to_string(), "retired_feature".to_string()],
        };
        let mut v = FeatureVector::new();
        v.set_by_name("url_length", 7.0);

        let row = vectorizer.transform(&v);
        assert_eq!(row, vec![7.0, 0.0]);
    }
}
