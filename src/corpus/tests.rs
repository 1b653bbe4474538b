use tempfile::tempdir;

use super::record::FeedbackEntry;
use super::writer::FeedbackLog;
use super::CorpusManager;
use crate::classifier::Label;
use crate::error::CoreError;

#[test]
fn test_append_and_load_round_trip() {
    let dir = tempdir().unwrap();
    let writer = FeedbackLog::from_path(dir.path().to_path_buf());

    let entry = FeedbackEntry::new("http://example.com/login", Label::Phishing);
    writer.append(&entry).unwrap();

    let entries = writer.load_entries().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].url, "http://example.com/login");
    assert_eq!(entries[0].label, Label::Phishing);
}

#[test]
fn test_corrupt_lines_are_skipped() {
    let dir = tempdir().unwrap();
    let writer = FeedbackLog::from_path(dir.path().to_path_buf());

    writer
        .append(&FeedbackEntry::new("http://a.com", Label::Phishing))
        .unwrap();

    // Hand-write a corrupt line into the existing log file
    let path = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().path())
        .find(|p| p.extension().map_or(false, |e| e == "jsonl"))
        .unwrap();
    let mut content = std::fs::read_to_string(&path).unwrap();
    content.push_str("this is not json\n");
    std::fs::write(&path, content).unwrap();

    writer
        .append(&FeedbackEntry::new("http://b.com", Label::Legitimate))
        .unwrap();

    let entries = writer.load_entries().unwrap();
    assert_eq!(entries.len(), 2);
}

#[test]
fn test_last_write_wins_view() {
    let dir = tempdir().unwrap();
    let corpus = CorpusManager::new(dir.path().to_path_buf());

    corpus
        .record_feedback("http://flip.example.com", "phishing")
        .unwrap();
    corpus
        .record_feedback("http://flip.example.com", "legitimate")
        .unwrap();

    let view = corpus.effective_view().unwrap();
    assert_eq!(view.len(), 1);
    assert_eq!(view["http://flip.example.com"], Label::Legitimate);

    // The append-only history keeps both entries for audit
    assert_eq!(corpus.history_len().unwrap(), 2);
}

#[test]
fn test_dedup_key_is_normalized() {
    let dir = tempdir().unwrap();
    let corpus = CorpusManager::new(dir.path().to_path_buf());

    corpus
        .record_feedback("  HTTP://Example.COM/Login ", "phishing")
        .unwrap();
    corpus
        .record_feedback("http://example.com/login", "legitimate")
        .unwrap();

    let view = corpus.effective_view().unwrap();
    assert_eq!(view.len(), 1);
    assert_eq!(view["http://example.com/login"], Label::Legitimate);
}

#[test]
fn test_invalid_label_is_rejected() {
    let dir = tempdir().unwrap();
    let corpus = CorpusManager::new(dir.path().to_path_buf());

    for bad in ["bad", "good", "0", "1", ""] {
        match corpus.record_feedback("http://example.com", bad) {
            Err(CoreError::InvalidLabel(_)) => {}
            other => panic!("expected InvalidLabel for '{}', got {:?}", bad, other.map(|_| ())),
        }
    }
    assert_eq!(corpus.history_len().unwrap(), 0);
}

#[test]
fn test_empty_url_is_rejected() {
    let dir = tempdir().unwrap();
    let corpus = CorpusManager::new(dir.path().to_path_buf());

    match corpus.record_feedback("   ", "phishing") {
        Err(CoreError::InvalidInput(_)) => {}
        other => panic!("expected InvalidInput, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_label_normalization_on_record() {
    let dir = tempdir().unwrap();
    let corpus = CorpusManager::new(dir.path().to_path_buf());

    let receipt = corpus
        .record_feedback("http://example.com", "  PHISHING  ")
        .unwrap();
    assert_eq!(receipt.label, Label::Phishing);
}
