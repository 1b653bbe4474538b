//! Prediction Store - SQLite-backed verdict records
//!
//! Implements the storage contract the core needs: insert, get,
//! update-by-id and list, keyed by opaque string ids. Ids are UUIDs
//! underneath, but callers only ever see strings; a malformed id is
//! treated as "not found", never as an error.

use std::path::Path;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::classifier::Label;
use crate::error::CoreError;

// ============================================================================
// RECORD
// ============================================================================

/// One stored classification, optionally annotated with user feedback
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionRecord {
    pub id: String,
    pub url: String,
    pub verdict: Label,
    pub confidence: Option<f32>,
    pub feedback: Option<Label>,
    pub created_at: DateTime<Utc>,
}

// ============================================================================
// STORE
// ============================================================================

pub struct PredictionStore {
    conn: Mutex<Connection>,
}

const SCHEMA_SQL: &str = "
CREATE TABLE IF NOT EXISTS predictions (
    id          TEXT PRIMARY KEY,
    url         TEXT NOT NULL,
    verdict     TEXT NOT NULL,
    confidence  REAL,
    feedback    TEXT,
    created_at  TEXT NOT NULL
);
";

impl PredictionStore {
    /// Open (and create if needed) the store at the given path
    pub fn open(path: &Path) -> Result<Self, CoreError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        conn.execute_batch(SCHEMA_SQL)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// In-memory store for tests and ephemeral runs
    pub fn open_in_memory() -> Result<Self, CoreError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA_SQL)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Insert a verdict; returns the new opaque id
    pub fn insert(
        &self,
        url: &str,
        verdict: Label,
        confidence: Option<f32>,
    ) -> Result<String, CoreError> {
        let id = Uuid::new_v4().to_string();
        let created_at = Utc::now();

        self.conn.lock().execute(
            "INSERT INTO predictions (id, url, verdict, confidence, feedback, created_at)
             VALUES (?1, ?2, ?3, ?4, NULL, ?5)",
            params![
                id,
                url,
                verdict.as_str(),
                confidence,
                created_at.to_rfc3339()
            ],
        )?;

        Ok(id)
    }

    /// Attach a corrected label to a stored verdict.
    /// Returns false for malformed or unknown ids.
    pub fn update_feedback(&self, id: &str, feedback: Label) -> Result<bool, CoreError> {
        if !Self::is_valid_id(id) {
            return Ok(false);
        }

        let changed = self.conn.lock().execute(
            "UPDATE predictions SET feedback = ?1 WHERE id = ?2",
            params![feedback.as_str(), id],
        )?;
        Ok(changed > 0)
    }

    /// Fetch one record; malformed ids read as absent
    pub fn get(&self, id: &str) -> Result<Option<PredictionRecord>, CoreError> {
        if !Self::is_valid_id(id) {
            return Ok(None);
        }

        let conn = self.conn.lock();
        let record = conn
            .query_row(
                "SELECT id, url, verdict, confidence, feedback, created_at
                 FROM predictions WHERE id = ?1",
                params![id],
                Self::row_to_record,
            )
            .optional()?;
        Ok(record)
    }

    /// Every stored record in insertion order
    pub fn list_all(&self) -> Result<Vec<PredictionRecord>, CoreError> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "SELECT id, url, verdict, confidence, feedback, created_at
             FROM predictions ORDER BY created_at, id",
        )?;
        let rows = stmt.query_map([], Self::row_to_record)?;

        let mut records = Vec::new();
        for row in rows {
            records.push(row?);
        }
        Ok(records)
    }

    /// Stored record count
    pub fn count(&self) -> Result<usize, CoreError> {
        let count: i64 =
            self.conn
                .lock()
                .query_row("SELECT COUNT(*) FROM predictions", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    fn is_valid_id(id: &str) -> bool {
        Uuid::parse_str(id).is_ok()
    }

    fn row_to_record(row: &rusqlite::Row<'_>) -> rusqlite::Result<PredictionRecord> {
        let verdict_text: String = row.get(2)?;
        let feedback_text: Option<String> = row.get(4)?;
        let created_text: String = row.get(5)?;

        let parse_label = |text: &str, idx: usize| {
            Label::parse(text).map_err(|_| {
                rusqlite::Error::FromSqlConversionFailure(
                    idx,
                    rusqlite::types::Type::Text,
                    format!("unknown label '{}'", text).into(),
                )
            })
        };

        Ok(PredictionRecord {
            id: row.get(0)?,
            url: row.get(1)?,
            verdict: parse_label(&verdict_text, 2)?,
            confidence: row.get(3)?,
            feedback: match feedback_text {
                Some(text) => Some(parse_label(&text, 4)?),
                None => None,
            },
            created_at: DateTime::parse_from_rfc3339(&created_text)
                .map_err(|e| {
                    rusqlite::Error::FromSqlConversionFailure(
                        5,
                        rusqlite::types::Type::Text,
                        Box::new(e),
                    )
                })?
                .with_timezone(&Utc),
        })
    }
}

// ============================================================================
// TESTS
// ============================================================================
