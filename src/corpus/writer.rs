//! Feedback Log - append-only JSONL storage with rotation
//!
//! History is never rewritten: a correction for an already-seen URL is a
//! new line, and the de-duplicated "latest label per URL" view is built
//! at read time. Files rotate by size; the timestamped names keep
//! chronological order under a plain sort, which is what makes
//! last-write-wins reconstruction across files correct.

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufRead, BufReader, Write};
use std::path::PathBuf;
use std::sync::Mutex;

use chrono::Utc;

use super::record::FeedbackEntry;

const MAX_FILE_SIZE: u64 = 10 * 1024 * 1024; // 10 MB

pub struct FeedbackLog {
    file: Mutex<Option<File>>,
    base_dir: PathBuf,
}

impl FeedbackLog {
    pub fn from_path(base_dir: PathBuf) -> Self {
        if let Err(e) = fs::create_dir_all(&base_dir) {
            log::error!("Failed to create feedback directory: {}", e);
        }

        Self {
            file: Mutex::new(None),
            base_dir,
        }
    }

    /// Append an entry to the log, rotating when the current file is full.
    /// The mutex serializes all writers, so two corrections for the same
    /// URL land in a defined order.
    pub fn append(&self, entry: &FeedbackEntry) -> io::Result<()> {
        let mut file_guard = self.file.lock().unwrap();

        if file_guard.is_none() {
            if let Some(path) = self.find_latest_log_file()? {
                let f = OpenOptions::new().create(true).append(true).open(&path)?;
                if f.metadata()?.len() < MAX_FILE_SIZE {
                    *file_guard = Some(f);
                } else {
                    *file_guard = Some(self.create_new_file()?);
                }
            } else {
                *file_guard = Some(self.create_new_file()?);
            }
        }

        let should_rotate = if let Some(f) = file_guard.as_ref() {
            f.metadata()?.len() >= MAX_FILE_SIZE
        } else {
            false
        };

        if should_rotate {
            *file_guard = Some(self.create_new_file()?);
        }

        if let Some(file) = file_guard.as_mut() {
            let json = serde_json::to_string(entry)?;
            writeln!(file, "{}", json)?;
            file.flush()?;
        }

        Ok(())
    }

    /// Read every entry across all log files in chronological order.
    /// Lines that fail to parse are skipped with a warning rather than
    /// poisoning the whole corpus.
    pub fn load_entries(&self) -> io::Result<Vec<FeedbackEntry>> {
        let mut entries = Vec::new();

        for path in self.log_files()? {
            let reader = BufReader::new(File::open(&path)?);
            for line in reader.lines() {
                let line = line?;
                if line.trim().is_empty() {
                    continue;
                }
                match serde_json::from_str::<FeedbackEntry>(&line) {
                    Ok(entry) => entries.push(entry),
                    Err(e) => log::warn!("Skipping corrupt feedback line in {:?}: {}", path, e),
                }
            }
        }

        Ok(entries)
    }

    /// Total entries across all files (history, not unique URLs)
    pub fn entry_count(&self) -> io::Result<usize> {
        Ok(self.load_entries()?.len())
    }

    /// Sorted list of log files (filename timestamps give the order)
    fn log_files(&self) -> io::Result<Vec<PathBuf>> {
        if !self.base_dir.exists() {
            return Ok(Vec::new());
        }

        let mut paths: Vec<PathBuf> = fs::read_dir(&self.base_dir)?
            .filter_map(|res| res.ok())
            .map(|e| e.path())
            .filter(|p| p.extension().map_or(false, |ext| ext == "jsonl"))
            .collect();

        paths.sort();
        Ok(paths)
    }

    fn create_new_file(&self) -> io::Result<File> {
        let now = Utc::now();
        let filename = format!("feedback-{}.jsonl", now.format("%Y-%m-%d-%H%M%S%f"));
        let path = self.base_dir.join(filename);

        OpenOptions::new().create(true).append(true).open(path)
    }

    fn find_latest_log_file(&self) -> io::Result<Option<PathBuf>> {
        Ok(self.log_files()?.last().cloned())
    }
}
