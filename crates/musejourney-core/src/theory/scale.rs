//! Scale types and spelled scales

use serde::{Deserialize, Serialize};

use super::interval::*;
use crate::error::TheoryError;
use crate::note::SpelledNote;

/// Scale/mode types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScaleType {
    Major,
    Minor,
    Dorian,
    Phrygian,
    Lydian,
    Mixolydian,
    Locrian,
    HarmonicMinor,
    MelodicMinor,
    MajorPentatonic,
    MinorPentatonic,
    Blues,
    Chromatic,
}

impl ScaleType {
    pub const ALL: [ScaleType; 13] = [
        Self::Major,
        Self::Minor,
        Self::Dorian,
        Self::Phrygian,
        Self::Lydian,
        Self::Mixolydian,
        Self::Locrian,
        Self::HarmonicMinor,
        Self::MelodicMinor,
        Self::MajorPentatonic,
        Self::MinorPentatonic,
        Self::Blues,
        Self::Chromatic,
    ];

    /// Scale intervals from the tonic
    pub fn intervals(&self) -> &'static [Interval] {
        match self {
            Self::Major => &[UNISON, MAJ2, MAJ3, PERF4, PERF5, MAJ6, MAJ7],
            Self::Minor => &[UNISON, MAJ2, MIN3, PERF4, PERF5, MIN6, MIN7],
            Self::Dorian => &[UNISON, MAJ2, MIN3, PERF4, PERF5, MAJ6, MIN7],
            Self::Phrygian => &[UNISON, MIN2, MIN3, PERF4, PERF5, MIN6, MIN7],
            Self::Lydian => &[UNISON, MAJ2, MAJ3, AUG4, PERF5, MAJ6, MAJ7],
            Self::Mixolydian => &[UNISON, MAJ2, MAJ3, PERF4, PERF5, MAJ6, MIN7],
            Self::Locrian => &[UNISON, MIN2, MIN3, PERF4, DIM5, MIN6, MIN7],
            Self::HarmonicMinor => &[UNISON, MAJ2, MIN3, PERF4, PERF5, MIN6, MAJ7],
            Self::MelodicMinor => &[UNISON, MAJ2, MIN3, PERF4, PERF5, MAJ6, MAJ7],
            Self::MajorPentatonic => &[UNISON, MAJ2, MAJ3, PERF5, MAJ6],
            Self::MinorPentatonic => &[UNISON, MIN3, PERF4, PERF5, MIN7],
            Self::Blues => &[UNISON, MIN3, PERF4, DIM5, PERF5, MIN7],
            Self::Chromatic => &[UNISON, MIN2, MAJ2, MIN3, MAJ3, PERF4, DIM5, PERF5, MIN6, MAJ6, MIN7, MAJ7],
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Major => "major",
            Self::Minor => "minor",
            Self::Dorian => "dorian",
            Self::Phrygian => "phrygian",
            Self::Lydian => "lydian",
            Self::Mixolydian => "mixolydian",
            Self::Locrian => "locrian",
            Self::HarmonicMinor => "harmonic minor",
            Self::MelodicMinor => "melodic minor",
            Self::MajorPentatonic => "major pentatonic",
            Self::MinorPentatonic => "minor pentatonic",
            Self::Blues => "blues",
            Self::Chromatic => "chromatic",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        let normalized = name.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase();
        match normalized.as_str() {
            "major" | "ionian" => Some(Self::Major),
            "minor" | "aeolian" | "natural minor" => Some(Self::Minor),
            "harmonic minor" => Some(Self::HarmonicMinor),
            "melodic minor" => Some(Self::MelodicMinor),
            "major pentatonic" | "pentatonic" => Some(Self::MajorPentatonic),
            "minor pentatonic" => Some(Self::MinorPentatonic),
            other => Self::ALL.into_iter().find(|t| t.name() == other),
        }
    }
}

/// A scale spelled from a tonic
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scale {
    pub name: String,
    pub tonic: SpelledNote,
    pub scale_type: ScaleType,
    pub notes: Vec<SpelledNote>,
}

impl Scale {
    pub fn new(tonic: SpelledNote, scale_type: ScaleType) -> Self {
        let tonic = tonic.without_octave();
        let notes = scale_type.intervals().iter().map(|&i| tonic.transpose(i)).collect();
        Self {
            name: format!("{} {}", tonic, scale_type.name()),
            tonic,
            scale_type,
            notes,
        }
    }

    /// Parse `"C major"`, `"D dorian"`, `"F# harmonic minor"`
    pub fn parse(name: &str) -> Result<Self, TheoryError> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(TheoryError::Empty);
        }
        let (tonic_part, type_part) = trimmed
            .split_once(char::is_whitespace)
            .ok_or_else(|| TheoryError::UnknownScale(name.to_string()))?;
        let tonic = SpelledNote::parse(tonic_part)?;
        let scale_type =
            ScaleType::from_name(type_part).ok_or_else(|| TheoryError::UnknownScale(name.to_string()))?;
        Ok(Self::new(tonic, scale_type))
    }

    pub fn note_names(&self) -> Vec<String> {
        self.notes.iter().map(|n| n.to_string()).collect()
    }

    pub fn interval_names(&self) -> Vec<String> {
        self.scale_type.intervals().iter().map(|i| i.name()).collect()
    }

    pub fn contains_pitch_class(&self, pitch_class: u8) -> bool {
        self.notes.iter().any(|n| n.pitch_class() == pitch_class % 12)
    }

    /// Ascending MIDI notes from the tonic in `octave`, closed with the tonic an octave up
    pub fn midi_notes(&self, octave: i8) -> Vec<u8> {
        let Some(root) = self.tonic.with_octave(Some(octave)).midi() else {
            return Vec::new();
        };
        self.scale_type
            .intervals()
            .iter()
            .map(|i| i.semitones() as u16)
            .chain(std::iter::once(12))
            .map(|s| root as u16 + s)
            .filter(|&n| n <= 127)
            .map(|n| n as u8)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_scales() {
        let c = Scale::parse("C major").unwrap();
        assert_eq!(c.note_names(), vec!["C", "D", "E", "F", "G", "A", "B"]);

        let d = Scale::parse("D dorian").unwrap();
        assert_eq!(d.note_names(), vec!["D", "E", "F", "G", "A", "B", "C"]);

        let f = Scale::parse("F major").unwrap();
        assert_eq!(f.note_names(), vec!["F", "G", "A", "Bb", "C", "D", "E"]);

        let a = Scale::parse("A harmonic minor").unwrap();
        assert_eq!(a.note_names(), vec!["A", "B", "C", "D", "E", "F", "G#"]);
        assert_eq!(a.name, "A harmonic minor");
    }

    #[test]
    fn test_scale_aliases() {
        assert_eq!(ScaleType::from_name("Aeolian"), Some(ScaleType::Minor));
        assert_eq!(ScaleType::from_name("ionian"), Some(ScaleType::Major));
        assert_eq!(ScaleType::from_name("minor  pentatonic"), Some(ScaleType::MinorPentatonic));
        assert_eq!(ScaleType::from_name("bebop"), None);
    }

    #[test]
    fn test_invalid_scales() {
        assert_eq!(Scale::parse(""), Err(TheoryError::Empty));
        assert!(matches!(Scale::parse("C"), Err(TheoryError::UnknownScale(_))));
        assert!(matches!(Scale::parse("C bebop"), Err(TheoryError::UnknownScale(_))));
        assert!(matches!(Scale::parse("X major"), Err(TheoryError::Note(_))));
    }

    #[test]
    fn test_midi_notes() {
        let c = Scale::parse("C major pentatonic").unwrap();
        assert_eq!(c.midi_notes(4), vec![60, 62, 64, 67, 69, 72]);
        assert_eq!(Scale::parse("C chromatic").unwrap().notes.len(), 12);
    }
}
