use super::{PlaybackEvent, RunningStats, ScoredAnswer};
use crate::note::midi_note_to_name;
use crate::training::{ChordPlaybackMode, NewQuestion, QuestionDetail, TrainingCategory};

#[derive(Debug, PartialEq, Eq)]
pub struct ChordKind {
    pub short_name: &'static str,
    pub label: &'static str,
    pub semitones: &'static [u8],
}

pub static CHORD_KINDS: [ChordKind; 12] = [
    ChordKind { short_name: "maj", label: "Major triad", semitones: &[0, 4, 7] },
    ChordKind { short_name: "min", label: "Minor triad", semitones: &[0, 3, 7] },
    ChordKind { short_name: "aug", label: "Augmented triad", semitones: &[0, 4, 8] },
    ChordKind { short_name: "dim", label: "Diminished triad", semitones: &[0, 3, 6] },
    ChordKind { short_name: "maj7", label: "Major seventh", semitones: &[0, 4, 7, 11] },
    ChordKind { short_name: "7", label: "Dominant seventh", semitones: &[0, 4, 7, 10] },
    ChordKind { short_name: "min7", label: "Minor seventh", semitones: &[0, 3, 7, 10] },
    ChordKind { short_name: "m7b5", label: "Half-diminished seventh", semitones: &[0, 3, 6, 10] },
    ChordKind { short_name: "dim7", label: "Diminished seventh", semitones: &[0, 3, 6, 9] },
    ChordKind { short_name: "sus4", label: "Suspended fourth", semitones: &[0, 5, 7] },
    ChordKind { short_name: "sus2", label: "Suspended second", semitones: &[0, 2, 7] },
    ChordKind { short_name: "6", label: "Major sixth", semitones: &[0, 4, 7, 9] },
];

impl ChordKind {
    pub fn find(short_name: &str) -> Option<&'static ChordKind> {
        CHORD_KINDS.iter().find(|k| k.short_name == short_name)
    }
}

/// Root choices with their MIDI numbers (C4..B4)
pub static ROOT_NOTES: [(&str, u8); 12] = [
    ("C", 60),
    ("C#", 61),
    ("D", 62),
    ("D#", 63),
    ("E", 64),
    ("F", 65),
    ("F#", 66),
    ("G", 67),
    ("G#", 68),
    ("A", 69),
    ("A#", 70),
    ("B", 71),
];

const BLOCK_SECONDS: f32 = 1.0;
const ARPEGGIO_STEP: f32 = 0.5;

#[derive(Debug, Clone, PartialEq)]
pub struct ChordQuestion {
    pub root: &'static str,
    pub root_midi: u8,
    pub kind: &'static ChordKind,
    pub midi_notes: Vec<u8>,
}

impl ChordQuestion {
    pub fn full_name(&self) -> String {
        format!("{}{}", self.root, self.kind.short_name)
    }

    pub fn playback(&self, mode: ChordPlaybackMode) -> Vec<PlaybackEvent> {
        match mode {
            ChordPlaybackMode::Arpeggio => self
                .midi_notes
                .iter()
                .enumerate()
                .map(|(i, &n)| PlaybackEvent::new(vec![n], i as f32 * ARPEGGIO_STEP, ARPEGGIO_STEP))
                .collect(),
            ChordPlaybackMode::Block | ChordPlaybackMode::Random => {
                vec![PlaybackEvent::new(self.midi_notes.clone(), 0.0, BLOCK_SECONDS)]
            }
        }
    }

    pub fn note_names(&self) -> Vec<String> {
        self.midi_notes.iter().map(|&n| midi_note_to_name(n)).collect()
    }
}

pub struct ChordExercise {
    selected: Vec<&'static ChordKind>,
    identify_root: bool,
    identify_type: bool,
    playback_mode: ChordPlaybackMode,
    current: Option<ChordQuestion>,
    current_mode: ChordPlaybackMode,
    root_answer: Option<String>,
    type_answer: Option<String>,
    stats: RunningStats,
}

impl ChordExercise {
    /// With neither part enabled the type is asked
    pub fn new(selected: &[String], identify_root: bool, identify_type: bool, playback_mode: ChordPlaybackMode) -> Self {
        Self {
            selected: selected.iter().filter_map(|s| ChordKind::find(s)).collect(),
            identify_root,
            identify_type: identify_type || !identify_root,
            playback_mode,
            current: None,
            current_mode: playback_mode,
            root_answer: None,
            type_answer: None,
            stats: RunningStats::default(),
        }
    }

    pub fn identify_root(&self) -> bool {
        self.identify_root
    }

    pub fn identify_type(&self) -> bool {
        self.identify_type
    }

    pub fn next_question(&mut self, rng: &mut fastrand::Rng) -> Option<&ChordQuestion> {
        self.root_answer = None;
        self.type_answer = None;
        if self.selected.is_empty() {
            self.current = None;
            return None;
        }

        let kind = self.selected[rng.usize(..self.selected.len())];
        let (root, root_midi) = ROOT_NOTES[rng.usize(..ROOT_NOTES.len())];
        self.current_mode = match self.playback_mode {
            ChordPlaybackMode::Random => {
                if rng.bool() {
                    ChordPlaybackMode::Block
                } else {
                    ChordPlaybackMode::Arpeggio
                }
            }
            mode => mode,
        };
        self.current = Some(ChordQuestion {
            root,
            root_midi,
            kind,
            midi_notes: kind.semitones.iter().map(|s| root_midi + s).collect(),
        });
        self.current.as_ref()
    }

    pub fn current(&self) -> Option<&ChordQuestion> {
        self.current.as_ref()
    }

    pub fn playback(&self) -> Vec<PlaybackEvent> {
        self.current
            .as_ref()
            .map(|q| q.playback(self.current_mode))
            .unwrap_or_default()
    }

    /// Chord types offered as answers
    pub fn type_choices(&self) -> impl Iterator<Item = &'static ChordKind> + '_ {
        CHORD_KINDS.iter().filter(|k| self.selected.contains(k))
    }

    pub fn root_answer(&self) -> Option<&str> {
        self.root_answer.as_deref()
    }

    pub fn type_answer(&self) -> Option<&str> {
        self.type_answer.as_deref()
    }

    /// Every required part has an answer
    pub fn is_complete(&self) -> bool {
        (!self.identify_root || self.root_answer.is_some()) && (!self.identify_type || self.type_answer.is_some())
    }

    pub fn is_root_correct(&self) -> Option<bool> {
        let question = self.current.as_ref()?;
        self.root_answer.as_deref().map(|a| a == question.root)
    }

    pub fn is_type_correct(&self) -> Option<bool> {
        let question = self.current.as_ref()?;
        self.type_answer.as_deref().map(|a| a == question.kind.short_name)
    }

    pub fn answer_root(&mut self, root: &str) -> Option<ScoredAnswer> {
        if !self.identify_root || self.current.is_none() || self.root_answer.is_some() {
            return None;
        }
        self.root_answer = Some(root.to_string());
        self.score_if_complete()
    }

    pub fn answer_type(&mut self, short_name: &str) -> Option<ScoredAnswer> {
        if !self.identify_type || self.current.is_none() || self.type_answer.is_some() {
            return None;
        }
        self.type_answer = Some(short_name.to_string());
        self.score_if_complete()
    }

    fn score_if_complete(&mut self) -> Option<ScoredAnswer> {
        if !self.is_complete() {
            return None;
        }
        let question = self.current.as_ref()?;
        let correct = self.is_root_correct().unwrap_or(true) && self.is_type_correct().unwrap_or(true);

        let answer = [self.root_answer.as_deref(), self.type_answer.as_deref()]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(" ");
        let record = NewQuestion {
            category: TrainingCategory::Chord,
            question: question.full_name(),
            answer,
            is_correct: correct,
            detail: Some(QuestionDetail::Chord {
                root: question.root.to_string(),
                chord_type: question.kind.short_name.to_string(),
                midi_notes: question.midi_notes.clone(),
            }),
        };
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

    fn selection(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_root_right_type_wrong_scores_incorrect() {
        let mut rng = fastrand::Rng::with_seed(11);
        let mut exercise = ChordExercise::new(&selection(&["maj", "min"]), true, true, ChordPlaybackMode::Block);
        let question = exercise.next_question(&mut rng).unwrap().clone();
        assert!(question.kind.short_name == "maj" || question.kind.short_name == "min");

        assert!(exercise.answer_root(question.root).is_none());
        let wrong_type = if question.kind.short_name == "maj" { "min" } else { "maj" };
        let scored = exercise.answer_type(wrong_type).unwrap();

        assert!(!scored.correct);
        assert!(!scored.record.is_correct);
        assert_eq!(exercise.stats(), RunningStats { total: 1, correct: 0, streak: 0 });
    }

    #[test]
    fn test_both_parts_correct() {
        let mut rng = fastrand::Rng::with_seed(5);
        let mut exercise = ChordExercise::new(&selection(&["dim7"]), true, true, ChordPlaybackMode::Block);
        let question = exercise.next_question(&mut rng).unwrap().clone();
        assert!(exercise.answer_type("dim7").is_none());
        let scored = exercise.answer_root(question.root).unwrap();
        assert!(scored.correct);
        assert_eq!(scored.record.answer, format!("{} dim7", question.root));
        assert!(exercise.answer_root("C").is_none());
        assert_eq!(exercise.stats().streak, 1);
    }

    #[test]
    fn test_type_only() {
        let mut rng = fastrand::Rng::with_seed(9);
        let mut exercise = ChordExercise::new(&selection(&["sus2"]), false, true, ChordPlaybackMode::Arpeggio);
        exercise.next_question(&mut rng);
        assert!(exercise.answer_root("C").is_none());
        assert!(exercise.answer_type("sus2").unwrap().correct);
    }

    #[test]
    fn test_notes_and_playback() {
        let mut rng = fastrand::Rng::with_seed(2);
        let mut exercise = ChordExercise::new(&selection(&["maj7"]), true, true, ChordPlaybackMode::Arpeggio);
        let question = exercise.next_question(&mut rng).unwrap().clone();
        assert!((60..72).contains(&question.root_midi));
        let intervals: Vec<u8> = question.midi_notes.iter().map(|n| n - question.root_midi).collect();
        assert_eq!(intervals, vec![0, 4, 7, 11]);

        let events = exercise.playback();
        assert_eq!(events.len(), 4);
        assert_eq!(events[3].offset, 1.5);
        assert_eq!(question.playback(ChordPlaybackMode::Block).len(), 1);
    }

    #[test]
    fn test_type_choices_follow_selection() {
        let exercise = ChordExercise::new(&selection(&["7", "maj"]), true, true, ChordPlaybackMode::Block);
        let choices: Vec<&str> = exercise.type_choices().map(|k| k.short_name).collect();
        assert_eq!(choices, vec!["maj", "7"]);
    }
}
