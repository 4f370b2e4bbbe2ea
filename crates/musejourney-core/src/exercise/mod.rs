//! Ear-training exercises: generate a question, take answers, score
//!
//! Exercises never touch audio or storage. They describe what to play as
//! [`PlaybackEvent`]s and hand each scored answer back as a [`NewQuestion`]
//! for the training store.

mod chord;
mod interval;
mod progression;

pub use chord::{CHORD_KINDS, ChordExercise, ChordKind, ChordQuestion, ROOT_NOTES};
pub use interval::{INTERVAL_KINDS, IntervalExercise, IntervalKind, IntervalQuestion};
pub use progression::{PROGRESSION_KINDS, ProgressionExercise, ProgressionKind, ProgressionQuestion};

use chrono::Local;
use serde::{Deserialize, Serialize};

use crate::training::{NewQuestion, TrainingCategory, TrainingSession, generate_id};

/// Notes to sound together, relative to the start of playback
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybackEvent {
    pub notes: Vec<u8>,
    /// Seconds from the start
    pub offset: f32,
    /// Seconds
    pub duration: f32,
}

impl PlaybackEvent {
    pub fn new(notes: Vec<u8>, offset: f32, duration: f32) -> Self {
        Self { notes, offset, duration }
    }
}

/// Result of a completed answer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoredAnswer {
    pub correct: bool,
    pub record: NewQuestion,
}

/// Per-trainer tally shown while practising
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunningStats {
    pub total: u32,
    pub correct: u32,
    pub streak: u32,
}

impl RunningStats {
    pub fn record(&mut self, correct: bool) {
        self.total += 1;
        if correct {
            self.correct += 1;
            self.streak += 1;
        } else {
            self.streak = 0;
        }
    }

    /// Rounded percentage, zero before the first answer
    pub fn accuracy(&self) -> u32 {
        if self.total == 0 {
            return 0;
        }
        (self.correct as f64 / self.total as f64 * 100.0).round() as u32
    }
}

/// Bounds one practice session from start to finish
#[derive(Debug, Clone)]
pub struct SessionTracker {
    category: TrainingCategory,
    started_at: i64,
    settings: serde_json::Value,
    stats: RunningStats,
}

impl SessionTracker {
    pub fn start(category: TrainingCategory, settings: serde_json::Value) -> Self {
        Self::start_at(category, settings, Local::now().timestamp_millis())
    }

    pub fn start_at(category: TrainingCategory, settings: serde_json::Value, now_millis: i64) -> Self {
        Self {
            category,
            started_at: now_millis,
            settings,
            stats: RunningStats::default(),
        }
    }

    pub fn category(&self) -> TrainingCategory {
        self.category
    }

    pub fn record(&mut self, correct: bool) {
        self.stats.record(correct);
    }

    pub fn stats(&self) -> RunningStats {
        self.stats
    }

    /// Close the session; a session without answers yields nothing
    pub fn finish(self) -> Option<TrainingSession> {
        self.finish_at(Local::now().timestamp_millis())
    }

    pub fn finish_at(self, now_millis: i64) -> Option<TrainingSession> {
        if self.stats.total == 0 {
            tracing::debug!(category = %self.category, "Discarding session without answers");
            return None;
        }
        Some(TrainingSession {
            id: generate_id(),
            category: self.category,
            timestamp: self.started_at,
            total_questions: self.stats.total,
            correct_answers: self.stats.correct,
            duration: ((now_millis - self.started_at).max(0) / 1000) as u64,
            settings: self.settings,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_running_stats() {
        let mut stats = RunningStats::default();
        assert_eq!(stats.accuracy(), 0);
        stats.record(true);
        stats.record(true);
        stats.record(false);
        assert_eq!(stats, RunningStats { total: 3, correct: 2, streak: 0 });
        assert_eq!(stats.accuracy(), 67);
        stats.record(true);
        assert_eq!(stats.streak, 1);
    }

    #[test]
    fn test_session_tracker() {
        let mut tracker = SessionTracker::start_at(TrainingCategory::Interval, serde_json::json!({"a": 1}), 10_000);
        tracker.record(true);
        tracker.record(false);
        let session = tracker.finish_at(75_500).unwrap();
        assert_eq!(session.category, TrainingCategory::Interval);
        assert_eq!(session.timestamp, 10_000);
        assert_eq!(session.total_questions, 2);
        assert_eq!(session.correct_answers, 1);
        assert_eq!(session.duration, 65);
        assert_eq!(session.settings["a"], 1);
    }

    #[test]
    fn test_empty_session_not_persisted() {
        let tracker = SessionTracker::start_at(TrainingCategory::Chord, serde_json::Value::Null, 0);
        assert!(tracker.finish_at(60_000).is_none());
    }
}
