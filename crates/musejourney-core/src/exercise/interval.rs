use super::{PlaybackEvent, RunningStats, ScoredAnswer};
use crate::note::midi_note_to_name;
use crate::training::{IntervalPlaybackMode, NewQuestion, QuestionDetail, TrainingCategory};

#[derive(Debug, PartialEq, Eq)]
pub struct IntervalKind {
    pub short_name: &'static str,
    pub label: &'static str,
    pub semitones: u8,
}

pub static INTERVAL_KINDS: [IntervalKind; 12] = [
    IntervalKind { short_name: "m2", label: "Minor second", semitones: 1 },
    IntervalKind { short_name: "M2", label: "Major second", semitones: 2 },
    IntervalKind { short_name: "m3", label: "Minor third", semitones: 3 },
    IntervalKind { short_name: "M3", label: "Major third", semitones: 4 },
    IntervalKind { short_name: "P4", label: "Perfect fourth", semitones: 5 },
    IntervalKind { short_name: "A4/d5", label: "Tritone", semitones: 6 },
    IntervalKind { short_name: "P5", label: "Perfect fifth", semitones: 7 },
    IntervalKind { short_name: "m6", label: "Minor sixth", semitones: 8 },
    IntervalKind { short_name: "M6", label: "Major sixth", semitones: 9 },
    IntervalKind { short_name: "m7", label: "Minor seventh", semitones: 10 },
    IntervalKind { short_name: "M7", label: "Major seventh", semitones: 11 },
    IntervalKind { short_name: "P8", label: "Octave", semitones: 12 },
];

impl IntervalKind {
    pub fn find(short_name: &str) -> Option<&'static IntervalKind> {
        INTERVAL_KINDS.iter().find(|k| k.short_name == short_name)
    }
}

/// Lowest and one-past-highest start note (C3..C5)
const START_RANGE: std::ops::Range<u8> = 48..72;
const NOTE_SECONDS: f32 = 0.5;
const NOTE_GAP: f32 = 1.0;

#[derive(Debug, Clone, PartialEq)]
pub struct IntervalQuestion {
    pub kind: &'static IntervalKind,
    pub first_midi: u8,
    pub second_midi: u8,
    pub first_note: String,
    pub second_note: String,
}

impl IntervalQuestion {
    pub fn playback(&self, mode: IntervalPlaybackMode) -> Vec<PlaybackEvent> {
        match mode {
            IntervalPlaybackMode::Descending => vec![
                PlaybackEvent::new(vec![self.second_midi], 0.0, NOTE_SECONDS),
                PlaybackEvent::new(vec![self.first_midi], NOTE_GAP, NOTE_SECONDS),
            ],
            IntervalPlaybackMode::Harmonic => {
                vec![PlaybackEvent::new(vec![self.first_midi, self.second_midi], 0.0, NOTE_SECONDS)]
            }
            IntervalPlaybackMode::Ascending | IntervalPlaybackMode::Random => vec![
                PlaybackEvent::new(vec![self.first_midi], 0.0, NOTE_SECONDS),
                PlaybackEvent::new(vec![self.second_midi], NOTE_GAP, NOTE_SECONDS),
            ],
        }
    }
}

pub struct IntervalExercise {
    selected: Vec<&'static IntervalKind>,
    playback_mode: IntervalPlaybackMode,
    current: Option<IntervalQuestion>,
    /// Playback direction for the current question, random mode resolved
    current_mode: IntervalPlaybackMode,
    answer: Option<String>,
    stats: RunningStats,
}

impl IntervalExercise {
    pub fn new(selected: &[String], playback_mode: IntervalPlaybackMode) -> Self {
        Self {
            selected: selected.iter().filter_map(|s| IntervalKind::find(s)).collect(),
            playback_mode,
            current: None,
            current_mode: playback_mode,
            answer: None,
            stats: RunningStats::default(),
        }
    }

    /// Draw a new question; `None` when nothing is selected
    pub fn next_question(&mut self, rng: &mut fastrand::Rng) -> Option<&IntervalQuestion> {
        self.answer = None;
        if self.selected.is_empty() {
            self.current = None;
            return None;
        }

        let kind = self.selected[rng.usize(..self.selected.len())];
        let first_midi = rng.u8(START_RANGE);
        let second_midi = first_midi + kind.semitones;

        self.current_mode = match self.playback_mode {
            IntervalPlaybackMode::Random => [
                IntervalPlaybackMode::Ascending,
                IntervalPlaybackMode::Descending,
                IntervalPlaybackMode::Harmonic,
            ][rng.usize(..3)],
            mode => mode,
        };
        self.current = Some(IntervalQuestion {
            kind,
            first_midi,
            second_midi,
            first_note: midi_note_to_name(first_midi),
            second_note: midi_note_to_name(second_midi),
        });
        self.current.as_ref()
    }

    pub fn current(&self) -> Option<&IntervalQuestion> {
        self.current.as_ref()
    }

    /// Events for the current question in the configured direction
    pub fn playback(&self) -> Vec<PlaybackEvent> {
        self.current
            .as_ref()
            .map(|q| q.playback(self.current_mode))
            .unwrap_or_default()
    }

    pub fn is_answered(&self) -> bool {
        self.answer.is_some()
    }

    pub fn user_answer(&self) -> Option<&str> {
        self.answer.as_deref()
    }

    /// Score an answer; repeated answers to the same question are ignored
    pub fn answer(&mut self, short_name: &str) -> Option<ScoredAnswer> {
        let question = self.current.as_ref()?;
        if self.answer.is_some() {
            return None;
        }

        let correct = short_name == question.kind.short_name;
        self.answer = Some(short_name.to_string());
        self.stats.record(correct);

        Some(ScoredAnswer {
            correct,
            record: NewQuestion {
                category: TrainingCategory::Interval,
                question: format!("{} - {}", question.first_note, question.second_note),
                answer: short_name.to_string(),
                is_correct: correct,
                detail: Some(QuestionDetail::Interval {
                    first_note: question.first_note.clone(),
                    second_note: question.second_note.clone(),
                    first_midi: question.first_midi,
                    second_midi: question.second_midi,
                    interval: question.kind.short_name.to_string(),
                }),
            },
        })
    }

    pub fn stats(&self) -> RunningStats {
        self.stats
    }

    pub fn choices(&self) -> &'static [IntervalKind] {
        &INTERVAL_KINDS
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_questions_stay_in_selection_and_range() {
        let mut rng = fastrand::Rng::with_seed(42);
        let mut exercise = IntervalExercise::new(&names(&["m3", "P5", "bogus"]), IntervalPlaybackMode::Ascending);
        for _ in 0..50 {
            let q = exercise.next_question(&mut rng).unwrap().clone();
            assert!(q.kind.short_name == "m3" || q.kind.short_name == "P5");
            assert!(START_RANGE.contains(&q.first_midi));
            assert_eq!(q.second_midi - q.first_midi, q.kind.semitones);
        }
    }

    #[test]
    fn test_empty_selection() {
        let mut rng = fastrand::Rng::with_seed(1);
        let mut exercise = IntervalExercise::new(&[], IntervalPlaybackMode::Ascending);
        assert!(exercise.next_question(&mut rng).is_none());
        assert!(exercise.answer("m2").is_none());
    }

    #[test]
    fn test_answer_once() {
        let mut rng = fastrand::Rng::with_seed(3);
        let mut exercise = IntervalExercise::new(&names(&["M3"]), IntervalPlaybackMode::Harmonic);
        exercise.next_question(&mut rng);

        let scored = exercise.answer("M3").unwrap();
        assert!(scored.correct);
        assert!(scored.record.is_correct);
        assert!(exercise.answer("m3").is_none());
        assert_eq!(exercise.stats(), RunningStats { total: 1, correct: 1, streak: 1 });

        exercise.next_question(&mut rng);
        let scored = exercise.answer("P4").unwrap();
        assert!(!scored.correct);
        assert_eq!(exercise.stats(), RunningStats { total: 2, correct: 1, streak: 0 });
    }

    #[test]
    fn test_playback_order() {
        let question = IntervalQuestion {
            kind: &INTERVAL_KINDS[6],
            first_midi: 60,
            second_midi: 67,
            first_note: "C4".to_string(),
            second_note: "G4".to_string(),
        };
        let up = question.playback(IntervalPlaybackMode::Ascending);
        assert_eq!(up[0].notes, vec![60]);
        assert_eq!(up[1].notes, vec![67]);
        assert_eq!(up[1].offset, 1.0);

        let down = question.playback(IntervalPlaybackMode::Descending);
        assert_eq!(down[0].notes, vec![67]);

        let together = question.playback(IntervalPlaybackMode::Harmonic);
        assert_eq!(together.len(), 1);
        assert_eq!(together[0].notes, vec![60, 67]);
    }
}
