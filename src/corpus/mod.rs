//! Corpus Module - feedback-driven training data
//!
//! Accepts user-corrected labels, keeps the full append-only history for
//! audit, and exposes the de-duplicated last-write-wins view the
//! retrainer actually trains on.

pub mod record;
pub mod seed;
pub mod writer;

#[cfg(test)]
mod tests;

use std::collections::BTreeMap;
use std::path::PathBuf;

pub use record::{FeedbackEntry, FeedbackReceipt, TrainingExample};
pub use seed::seed_examples;

use crate::classifier::Label;
use crate::error::CoreError;
use crate::features;
use writer::FeedbackLog;

/// Feedback corpus manager
pub struct CorpusManager {
    writer: FeedbackLog,
}

impl CorpusManager {
    pub fn new(feedback_dir: PathBuf) -> Self {
        Self {
            writer: FeedbackLog::from_path(feedback_dir),
        }
    }

    /// Record a correction given a raw label string.
    /// Rejects labels outside the two canonical values and URLs the
    /// extractor rejects (empty after trimming).
    pub fn record_feedback(&self, url: &str, label_text: &str) -> Result<FeedbackReceipt, CoreError> {
        let label = Label::parse(label_text)?;
        self.record_feedback_label(url, label)
    }

    /// Record a correction with an already-parsed label
    pub fn record_feedback_label(&self, url: &str, label: Label) -> Result<FeedbackReceipt, CoreError> {
        // The dedup key is the same normalized form extraction uses, so
        // "HTTPS://X " and "https://x" collapse to one training row.
        let normalized = features::normalized_url(url)?;

        let entry = FeedbackEntry::new(normalized.clone(), label);
        self.writer.append(&entry)?;

        log::info!("Feedback recorded: {} -> {}", normalized, label);
        Ok(FeedbackReceipt {
            url: normalized,
            label,
            recorded_at: entry.recorded_at,
        })
    }

    /// Latest label per URL. This is the only view the retrainer sees;
    /// BTreeMap keeps iteration deterministic for reproducible training.
    pub fn effective_view(&self) -> Result<BTreeMap<String, Label>, CoreError> {
        let mut view = BTreeMap::new();
        for entry in self.writer.load_entries()? {
            view.insert(entry.url, entry.label);
        }
        Ok(view)
    }

    /// Total recorded corrections (full history, not unique URLs)
    pub fn history_len(&self) -> Result<usize, CoreError> {
        Ok(self.writer.entry_count()?)
    }
}
