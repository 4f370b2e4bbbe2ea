//! Persisted training records

use std::fmt;

use serde::{Deserialize, Serialize};

/// Which trainer produced a record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrainingCategory {
    Interval,
    Chord,
    Progression,
}

impl TrainingCategory {
    pub const ALL: [TrainingCategory; 3] = [Self::Interval, Self::Chord, Self::Progression];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Interval => "interval",
            Self::Chord => "chord",
            Self::Progression => "progression",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Interval => "Intervals",
            Self::Chord => "Chords",
            Self::Progression => "Progressions",
        }
    }
}

impl fmt::Display for TrainingCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Category-specific content of an answered question
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum QuestionDetail {
    #[serde(rename_all = "camelCase")]
    Interval {
        first_note: String,
        second_note: String,
        first_midi: u8,
        second_midi: u8,
        interval: String,
    },
    #[serde(rename_all = "camelCase")]
    Chord {
        root: String,
        chord_type: String,
        midi_notes: Vec<u8>,
    },
    #[serde(rename_all = "camelCase")]
    Progression {
        progression: String,
        chords: Vec<String>,
        numerals: Vec<String>,
    },
}

/// One answered prompt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainingQuestion {
    pub id: String,
    #[serde(rename = "type")]
    pub category: TrainingCategory,
    pub question: String,
    pub answer: String,
    pub is_correct: bool,
    /// Epoch milliseconds
    pub timestamp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<QuestionDetail>,
}

/// A question as submitted by a trainer, before the store assigns id and time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewQuestion {
    pub category: TrainingCategory,
    pub question: String,
    pub answer: String,
    pub is_correct: bool,
    pub detail: Option<QuestionDetail>,
}

/// One practice session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainingSession {
    pub id: String,
    #[serde(rename = "type")]
    pub category: TrainingCategory,
    /// Start time, epoch milliseconds
    pub timestamp: i64,
    pub total_questions: u32,
    pub correct_answers: u32,
    /// Seconds
    pub duration: u64,
    /// Settings in effect when the session ran
    #[serde(default)]
    pub settings: serde_json::Value,
}

/// Everything in the history blob, most recent question first
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingHistory {
    pub sessions: Vec<TrainingSession>,
    pub questions: Vec<TrainingQuestion>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_question_layout() {
        let question = TrainingQuestion {
            id: "abc".to_string(),
            category: TrainingCategory::Chord,
            question: "C maj".to_string(),
            answer: "C min".to_string(),
            is_correct: false,
            timestamp: 1_700_000_000_000,
            detail: Some(QuestionDetail::Chord {
                root: "C4".to_string(),
                chord_type: "maj".to_string(),
                midi_notes: vec![60, 64, 67],
            }),
        };
        let json = serde_json::to_value(&question).unwrap();
        assert_eq!(json["type"], "chord");
        assert_eq!(json["isCorrect"], false);
        assert_eq!(json["detail"]["kind"], "chord");
        assert_eq!(json["detail"]["chordType"], "maj");

        let back: TrainingQuestion = serde_json::from_value(json).unwrap();
        assert_eq!(back, question);
    }

    #[test]
    fn test_history_backfills_missing_lists() {
        let history: TrainingHistory = serde_json::from_str(r#"{"sessions": []}"#).unwrap();
        assert!(history.questions.is_empty());
    }
}
