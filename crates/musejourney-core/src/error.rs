//! Error types for musejourney

use thiserror::Error;

/// Note name / MIDI number conversion failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NoteError {
    #[error("Invalid note name: {0}")]
    InvalidName(String),
    #[error("Note out of MIDI range: {0}")]
    OutOfRange(String),
}

/// Reasons a theory query produced no result
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TheoryError {
    #[error("Empty input")]
    Empty,
    #[error("Unknown chord: {0}")]
    UnknownChord(String),
    #[error("Unknown scale: {0}")]
    UnknownScale(String),
    #[error("Unknown key: {0}")]
    UnknownKey(String),
    #[error("Unsupported key mode: {0}")]
    UnsupportedKeyMode(String),
    #[error("Unknown interval: {0}")]
    UnknownInterval(String),
    #[error("{root} is not diatonic to {key}")]
    NotDiatonic { root: String, key: String },
    #[error(transparent)]
    Note(#[from] NoteError),
}

/// Storage backend failures
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}
