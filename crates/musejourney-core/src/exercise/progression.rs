use tracing::warn;

use super::{PlaybackEvent, RunningStats, ScoredAnswer};
use crate::theory;
use crate::training::{NewQuestion, QuestionDetail, TrainingCategory};

#[derive(Debug, PartialEq, Eq)]
pub struct ProgressionKind {
    pub name: &'static str,
    pub description: &'static str,
    pub chords: &'static [&'static str],
    pub numerals: &'static [&'static str],
}

pub static PROGRESSION_KINDS: [ProgressionKind; 6] = [
    ProgressionKind {
        name: "I-IV-V-I",
        description: "Basic cadence",
        chords: &["C", "F", "G", "C"],
        numerals: &["I", "IV", "V", "I"],
    },
    ProgressionKind {
        name: "I-V-vi-IV",
        description: "Pop progression",
        chords: &["C", "G", "Am", "F"],
        numerals: &["I", "V", "vi", "IV"],
    },
    ProgressionKind {
        name: "ii-V-I",
        description: "Jazz turnaround",
        chords: &["Dm7", "G7", "Cmaj7"],
        numerals: &["ii7", "V7", "Imaj7"],
    },
    ProgressionKind {
        name: "I-vi-IV-V",
        description: "Fifties progression",
        chords: &["C", "Am", "F", "G"],
        numerals: &["I", "vi", "IV", "V"],
    },
    ProgressionKind {
        name: "vi-IV-I-V",
        description: "Sad progression",
        chords: &["Am", "F", "C", "G"],
        numerals: &["vi", "IV", "I", "V"],
    },
    ProgressionKind {
        name: "I-V-vi-iii-IV-I-IV-V",
        description: "Canon progression",
        chords: &["C", "G", "Am", "Em", "F", "C", "F", "G"],
        numerals: &["I", "V", "vi", "iii", "IV", "I", "IV", "V"],
    },
];

const VOICING_OCTAVE: i8 = 4;
const CHORD_SECONDS: f32 = 1.0;
/// Played when a chord symbol cannot be resolved
const FALLBACK_VOICING: [u8; 3] = [60, 64, 67];

#[derive(Debug, Clone, PartialEq)]
pub struct ProgressionQuestion {
    pub kind: &'static ProgressionKind,
    pub voicings: Vec<Vec<u8>>,
}

impl ProgressionQuestion {
    pub fn new(kind: &'static ProgressionKind) -> Self {
        let voicings = kind
            .chords
            .iter()
            .map(|symbol| {
                let notes = theory::chord_midi_notes(symbol, VOICING_OCTAVE);
                if notes.is_empty() {
                    warn!(symbol, "Unresolved progression chord, using C major");
                    FALLBACK_VOICING.to_vec()
                } else {
                    notes
                }
            })
            .collect();
        Self { kind, voicings }
    }

    pub fn playback(&self) -> Vec<PlaybackEvent> {
        self.voicings
            .iter()
            .enumerate()
            .map(|(i, notes)| PlaybackEvent::new(notes.clone(), i as f32 * CHORD_SECONDS, CHORD_SECONDS))
            .collect()
    }

    /// Every note of the progression, for keyboard highlighting
    pub fn all_notes(&self) -> Vec<u8> {
        let mut notes: Vec<u8> = self.voicings.iter().flatten().copied().collect();
        notes.sort_unstable();
        notes.dedup();
        notes
    }
}

pub struct ProgressionExercise {
    available: Vec<&'static ProgressionKind>,
    current: Option<ProgressionQuestion>,
    answer: Option<String>,
    stats: RunningStats,
}

impl ProgressionExercise {
    /// Restricted to the selection, or every progression if it matches none
    pub fn new(selected: &[String]) -> Self {
        let filtered: Vec<_> = PROGRESSION_KINDS
            .iter()
            .filter(|k| selected.iter().any(|s| s == k.name))
            .collect();
        let available = if filtered.is_empty() {
            PROGRESSION_KINDS.iter().collect()
        } else {
            filtered
        };
        Self {
            available,
            current: None,
            answer: None,
            stats: RunningStats::default(),
        }
    }

    pub fn available(&self) -> &[&'static ProgressionKind] {
        &self.available
    }

    pub fn next_question(&mut self, rng: &mut fastrand::Rng) -> &ProgressionQuestion {
        self.answer = None;
        let kind = self.available[rng.usize(..self.available.len())];
        self.current.insert(ProgressionQuestion::new(kind))
    }

    pub fn current(&self) -> Option<&ProgressionQuestion> {
        self.current.as_ref()
    }

    pub fn playback(&self) -> Vec<PlaybackEvent> {
        self.current.as_ref().map(|q| q.playback()).unwrap_or_default()
    }

    pub fn user_answer(&self) -> Option<&str> {
        self.answer.as_deref()
    }

    pub fn is_answered(&self) -> bool {
        self.answer.is_some()
    }

    /// Answers are chosen from the full catalogue
    pub fn choices(&self) -> &'static [ProgressionKind] {
        &PROGRESSION_KINDS
    }

    pub fn answer(&mut self, name: &str) -> Option<ScoredAnswer> {
        let question = self.current.as_ref()?;
        if self.answer.is_some() {
            return None;
        }
        let correct = name == question.kind.name;
        let record = NewQuestion {
            category: TrainingCategory::Progression,
            question: question.kind.chords.join(" - "),
            answer: name.to_string(),
            is_correct: correct,
            detail: Some(QuestionDetail::Progression {
                progression: question.kind.name.to_string(),
                chords: question.kind.chords.iter().map(|c| c.to_string()).collect(),
                numerals: question.kind.numerals.iter().map(|n| n.to_string()).collect(),
            }),
        };
        self.answer = Some(name.to_string());
        self.stats.record(correct);
        Some(ScoredAnswer { correct, record })
    }

    pub fn stats(&self) -> RunningStats {
        self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selection_fallback() {
        let exercise = ProgressionExercise::new(&["nothing".to_string()]);
        assert_eq!(exercise.available().len(), PROGRESSION_KINDS.len());

        let exercise = ProgressionExercise::new(&["ii-V-I".to_string(), "vi-IV-I-V".to_string()]);
        assert_eq!(exercise.available().len(), 2);
    }

    #[test]
    fn test_voicings_in_octave_four() {
        let question = ProgressionQuestion::new(&PROGRESSION_KINDS[2]);
        assert_eq!(question.voicings[0], vec![62, 65, 69, 72]);
        assert_eq!(question.voicings[1], vec![67, 71, 74, 77]);
        assert_eq!(question.voicings[2], vec![60, 64, 67, 71]);

        let events = question.playback();
        assert_eq!(events.len(), 3);
        assert_eq!(events[2].offset, 2.0);
    }

    #[test]
    fn test_answer_once() {
        let mut rng = fastrand::Rng::with_seed(4);
        let mut exercise = ProgressionExercise::new(&["I-IV-V-I".to_string()]);
        assert!(exercise.answer("I-IV-V-I").is_none());

        let question = exercise.next_question(&mut rng);
        assert_eq!(question.kind.name, "I-IV-V-I");
        let scored = exercise.answer("I-IV-V-I").unwrap();
        assert!(scored.correct);
        assert!(exercise.answer("ii-V-I").is_none());

        exercise.next_question(&mut rng);
        assert!(!exercise.answer("ii-V-I").unwrap().correct);
        assert_eq!(exercise.stats(), RunningStats { total: 2, correct: 1, streak: 0 });
    }
}
