use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::classifier::Label;
use crate::features::SCHEMA_VERSION;

/// One unit of training data: a URL and its ground-truth label
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingExample {
    pub url: String,
    pub label: Label,
}

impl TrainingExample {
    pub fn new(url: impl Into<String>, label: Label) -> Self {
        Self {
            url: url.into(),
            label,
        }
    }
}

/// One accepted feedback correction, as persisted to the append-only log
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackEntry {
    /// Normalized URL (dedup key)
    pub url: String,
    pub label: Label,
    /// Schema version current when the entry was recorded
    pub schema_version: u16,
    pub recorded_at: DateTime<Utc>,
}

impl FeedbackEntry {
    pub fn new(url: impl Into<String>, label: Label) -> Self {
        Self {
            url: url.into(),
            label,
            schema_version: SCHEMA_VERSION,
            recorded_at: Utc::now(),
        }
    }
}

/// Receipt returned to the caller when feedback is accepted
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackReceipt {
    pub url: String,
    pub label: Label,
    pub recorded_at: DateTime<Utc>,
}
