//! Training history and settings persistence
//!
//! The store keeps both blobs in memory and writes through to a backend on
//! every change. Read and write failures are logged and never surface to the
//! caller: a corrupt blob reads as defaults, a failed write leaves the
//! in-memory state authoritative until the process exits.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local, TimeZone};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use super::settings::{
    ChordSettings, GeneralSettings, IntervalSettings, ProgressionSettings, SettingsPatch, TrainingSettings,
};
use super::stats::{TimeRange, TrainingStats, compute_stats};
use super::types::{NewQuestion, TrainingCategory, TrainingHistory, TrainingQuestion, TrainingSession};
use crate::error::StorageError;

pub const HISTORY_KEY: &str = "musejourney_training_history";
pub const SETTINGS_KEY: &str = "musejourney_training_settings";

/// Most questions kept in history
pub const MAX_QUESTIONS: usize = 100;

/// Key/value blob storage
pub trait StorageBackend {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn save(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// One `<key>.json` file per blob in a directory
#[derive(Debug, Clone)]
pub struct FileBackend {
    dir: PathBuf,
}

impl FileBackend {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl StorageBackend for FileBackend {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        fs::create_dir_all(&self.dir)?;
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }
}

/// In-process storage
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    entries: HashMap<String, String>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn insert(&mut self, key: &str, value: impl Into<String>) {
        self.entries.insert(key.to_string(), value.into());
    }
}

impl StorageBackend for MemoryBackend {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.get(key).cloned())
    }

    fn save(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

fn to_base36(mut value: u64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if value == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while value > 0 {
        out.push(DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    out.reverse();
    String::from_utf8_lossy(&out).into_owned()
}

/// Base-36 timestamp followed by a random base-36 suffix
pub fn generate_id() -> String {
    generate_id_with(&mut fastrand::Rng::new(), Local::now().timestamp_millis())
}

pub fn generate_id_with(rng: &mut fastrand::Rng, now_millis: i64) -> String {
    let stamp = to_base36(now_millis.max(0) as u64);
    let suffix = to_base36(rng.u64(..));
    format!("{stamp}{suffix}")
}

pub struct TrainingStore<B: StorageBackend> {
    backend: B,
    history: TrainingHistory,
    settings: TrainingSettings,
}

impl<B: StorageBackend> TrainingStore<B> {
    /// Load both blobs, falling back to defaults for anything missing or corrupt
    pub fn open(backend: B) -> Self {
        let history: TrainingHistory = load_blob(&backend, HISTORY_KEY);
        let settings: TrainingSettings = load_blob(&backend, SETTINGS_KEY);
        info!(
            sessions = history.sessions.len(),
            questions = history.questions.len(),
            "Training store opened"
        );
        Self { backend, history, settings }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    fn persist_history(&mut self) {
        save_blob(&mut self.backend, HISTORY_KEY, &self.history);
    }

    fn persist_settings(&mut self) {
        save_blob(&mut self.backend, SETTINGS_KEY, &self.settings);
    }

    // ------------------------------------------------------------------
    // Settings
    // ------------------------------------------------------------------

    pub fn settings(&self) -> TrainingSettings {
        self.settings.clone()
    }

    pub fn save_settings(&mut self, settings: TrainingSettings) {
        self.settings = settings;
        self.persist_settings();
    }

    pub fn interval_settings(&self) -> IntervalSettings {
        self.settings.interval.clone()
    }

    pub fn chord_settings(&self) -> ChordSettings {
        self.settings.chord.clone()
    }

    pub fn progression_settings(&self) -> ProgressionSettings {
        self.settings.progression.clone()
    }

    pub fn general_settings(&self) -> GeneralSettings {
        self.settings.general.clone()
    }

    /// Merge a partial update into one block and persist
    pub fn update_type_settings(&mut self, patch: SettingsPatch) {
        debug!(?patch, "Updating training settings");
        patch.apply(&mut self.settings);
        self.persist_settings();
    }

    pub fn reset_settings(&mut self) {
        self.save_settings(TrainingSettings::default());
    }

    // ------------------------------------------------------------------
    // History
    // ------------------------------------------------------------------

    pub fn history(&self) -> TrainingHistory {
        self.history.clone()
    }

    pub fn add_session(&mut self, session: TrainingSession) {
        info!(
            category = %session.category,
            total = session.total_questions,
            correct = session.correct_answers,
            duration = session.duration,
            "Recording training session"
        );
        self.history.sessions.push(session);
        self.persist_history();
    }

    /// Record an answered question, newest first; returns its id
    pub fn add_question(&mut self, question: NewQuestion) -> String {
        self.add_question_at(question, Local::now().timestamp_millis())
    }

    pub fn add_question_at(&mut self, question: NewQuestion, timestamp: i64) -> String {
        let id = generate_id_with(&mut fastrand::Rng::new(), timestamp);
        self.history.questions.insert(
            0,
            TrainingQuestion {
                id: id.clone(),
                category: question.category,
                question: question.question,
                answer: question.answer,
                is_correct: question.is_correct,
                timestamp,
                detail: question.detail,
            },
        );
        self.history.questions.truncate(MAX_QUESTIONS);
        self.persist_history();
        id
    }

    /// Up to `limit` most recent questions, optionally of one category
    pub fn recent_questions(&self, category: Option<TrainingCategory>, limit: usize) -> Vec<TrainingQuestion> {
        self.history
            .questions
            .iter()
            .filter(|q| category.is_none_or(|c| c == q.category))
            .take(limit)
            .cloned()
            .collect()
    }

    pub fn clear_history(&mut self) {
        info!("Clearing training history");
        self.history = TrainingHistory::default();
        self.persist_history();
    }

    // ------------------------------------------------------------------
    // Statistics
    // ------------------------------------------------------------------

    pub fn stats(&self, category: Option<TrainingCategory>, range: Option<TimeRange>) -> TrainingStats {
        compute_stats(&self.history.sessions, category, range)
    }

    pub fn today_stats(&self, category: Option<TrainingCategory>) -> TrainingStats {
        self.today_stats_at(category, &Local::now())
    }

    pub fn today_stats_at<Tz: TimeZone>(&self, category: Option<TrainingCategory>, now: &DateTime<Tz>) -> TrainingStats {
        self.stats(category, Some(TimeRange::today_at(now)))
    }

    pub fn week_stats(&self, category: Option<TrainingCategory>) -> TrainingStats {
        self.week_stats_at(category, &Local::now())
    }

    pub fn week_stats_at<Tz: TimeZone>(&self, category: Option<TrainingCategory>, now: &DateTime<Tz>) -> TrainingStats {
        self.stats(category, Some(TimeRange::week_at(now)))
    }
}

impl TrainingStore<FileBackend> {
    pub fn open_dir(dir: impl Into<PathBuf>) -> Self {
        Self::open(FileBackend::new(dir))
    }
}

fn load_blob<T: DeserializeOwned + Default, B: StorageBackend>(backend: &B, key: &str) -> T {
    match backend.load(key) {
        Ok(Some(contents)) => match serde_json::from_str(&contents) {
            Ok(value) => value,
            Err(e) => {
                warn!(key, error = %e, "Corrupt training data, using defaults");
                T::default()
            }
        },
        Ok(None) => T::default(),
        Err(e) => {
            warn!(key, error = %e, "Failed to read training data, using defaults");
            T::default()
        }
    }
}

fn save_blob<T: Serialize, B: StorageBackend>(backend: &mut B, key: &str, value: &T) {
    let result = serde_json::to_string(value)
        .map_err(StorageError::from)
        .and_then(|json| backend.save(key, &json));
    if let Err(e) = result {
        warn!(key, error = %e, "Failed to save training data");
    }
}
