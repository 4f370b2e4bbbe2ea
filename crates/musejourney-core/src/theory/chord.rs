//! Chord symbol parsing and the chord-type table

use serde::{Deserialize, Serialize};

use super::interval::*;
use crate::error::TheoryError;
use crate::note::SpelledNote;

/// Harmonic character of a chord, as encoded in roman numerals
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChordQuality {
    Major,
    Minor,
    Diminished,
    HalfDiminished,
    Augmented,
    Suspended,
}

impl ChordQuality {
    /// Minor-family chords are written with lowercase numerals
    pub fn is_minor_family(&self) -> bool {
        matches!(self, Self::Minor | Self::Diminished | Self::HalfDiminished)
    }
}

/// One entry of the chord table
#[derive(Debug, PartialEq, Eq)]
pub struct ChordType {
    /// Canonical suffix used when building symbols
    pub code: &'static str,
    pub aliases: &'static [&'static str],
    pub name: &'static str,
    pub quality: ChordQuality,
    pub intervals: &'static [Interval],
}

impl ChordType {
    pub fn semitones(&self) -> Vec<u8> {
        self.intervals.iter().map(|i| i.semitones() as u8).collect()
    }

    pub fn is_seventh(&self) -> bool {
        self.intervals.iter().any(|i| i.number() == 7)
    }

    /// Look up by any alias (`"min7"`, `"m7"`, `"-7"`)
    pub fn from_alias(alias: &str) -> Option<&'static ChordType> {
        CHORD_TYPES.iter().find(|t| t.aliases.contains(&alias))
    }

    /// Look up by semitone content relative to the root, folded into one octave
    pub fn from_semitones(semitones: &[u8]) -> Option<&'static ChordType> {
        CHORD_TYPES.iter().find(|t| {
            t.intervals.len() == semitones.len()
                && t.intervals
                    .iter()
                    .zip(semitones)
                    .all(|(i, &s)| (i.semitones() as u8) % 12 == s % 12)
        })
    }

    pub fn all() -> &'static [ChordType] {
        CHORD_TYPES
    }
}

pub static CHORD_TYPES: &[ChordType] = &[
    ChordType { code: "", aliases: &["", "M", "maj", "major"], name: "major", quality: ChordQuality::Major, intervals: &[UNISON, MAJ3, PERF5] },
    ChordType { code: "m", aliases: &["m", "min", "minor", "-"], name: "minor", quality: ChordQuality::Minor, intervals: &[UNISON, MIN3, PERF5] },
    ChordType { code: "aug", aliases: &["aug", "+"], name: "augmented", quality: ChordQuality::Augmented, intervals: &[UNISON, MAJ3, AUG5] },
    ChordType { code: "dim", aliases: &["dim", "°", "o"], name: "diminished", quality: ChordQuality::Diminished, intervals: &[UNISON, MIN3, DIM5] },
    ChordType { code: "sus2", aliases: &["sus2"], name: "suspended second", quality: ChordQuality::Suspended, intervals: &[UNISON, MAJ2, PERF5] },
    ChordType { code: "sus4", aliases: &["sus4", "sus"], name: "suspended fourth", quality: ChordQuality::Suspended, intervals: &[UNISON, PERF4, PERF5] },
    ChordType { code: "6", aliases: &["6", "M6", "maj6"], name: "sixth", quality: ChordQuality::Major, intervals: &[UNISON, MAJ3, PERF5, MAJ6] },
    ChordType { code: "m6", aliases: &["m6", "min6"], name: "minor sixth", quality: ChordQuality::Minor, intervals: &[UNISON, MIN3, PERF5, MAJ6] },
    ChordType { code: "maj7", aliases: &["maj7", "M7", "Maj7", "Δ", "Δ7"], name: "major seventh", quality: ChordQuality::Major, intervals: &[UNISON, MAJ3, PERF5, MAJ7] },
    ChordType { code: "7", aliases: &["7", "dom", "dom7"], name: "dominant seventh", quality: ChordQuality::Major, intervals: &[UNISON, MAJ3, PERF5, MIN7] },
    ChordType { code: "m7", aliases: &["m7", "min7", "-7"], name: "minor seventh", quality: ChordQuality::Minor, intervals: &[UNISON, MIN3, PERF5, MIN7] },
    ChordType { code: "m7b5", aliases: &["m7b5", "ø", "ø7", "h7"], name: "half-diminished", quality: ChordQuality::HalfDiminished, intervals: &[UNISON, MIN3, DIM5, MIN7] },
    ChordType { code: "dim7", aliases: &["dim7", "°7", "o7"], name: "diminished seventh", quality: ChordQuality::Diminished, intervals: &[UNISON, MIN3, DIM5, DIM7] },
    ChordType { code: "mMaj7", aliases: &["mMaj7", "mM7", "minmaj7"], name: "minor/major seventh", quality: ChordQuality::Minor, intervals: &[UNISON, MIN3, PERF5, MAJ7] },
    ChordType { code: "maj7#5", aliases: &["maj7#5", "M7#5", "+maj7"], name: "augmented major seventh", quality: ChordQuality::Augmented, intervals: &[UNISON, MAJ3, AUG5, MAJ7] },
    ChordType { code: "9", aliases: &["9", "dom9"], name: "dominant ninth", quality: ChordQuality::Major, intervals: &[UNISON, MAJ3, PERF5, MIN7, MAJ9] },
    ChordType { code: "maj9", aliases: &["maj9", "M9"], name: "major ninth", quality: ChordQuality::Major, intervals: &[UNISON, MAJ3, PERF5, MAJ7, MAJ9] },
    ChordType { code: "m9", aliases: &["m9", "min9", "-9"], name: "minor ninth", quality: ChordQuality::Minor, intervals: &[UNISON, MIN3, PERF5, MIN7, MAJ9] },
    ChordType { code: "add9", aliases: &["add9", "Madd9"], name: "added ninth", quality: ChordQuality::Major, intervals: &[UNISON, MAJ3, PERF5, MAJ9] },
];

/// A resolved chord: spelled root, type and member notes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chord {
    pub symbol: String,
    pub root: SpelledNote,
    pub chord_type: &'static ChordType,
    pub notes: Vec<SpelledNote>,
}

impl Chord {
    pub fn new(root: SpelledNote, chord_type: &'static ChordType) -> Self {
        let root = root.without_octave();
        let notes = chord_type.intervals.iter().map(|&i| root.transpose(i)).collect();
        Self {
            symbol: format!("{}{}", root.pitch_class_name(), chord_type.code),
            root,
            chord_type,
            notes,
        }
    }

    /// Parse a symbol such as `C`, `Am`, `F#m7b5`, `Bbmaj7`
    pub fn parse(symbol: &str) -> Result<Self, TheoryError> {
        let trimmed = symbol.trim();
        if trimmed.is_empty() {
            return Err(TheoryError::Empty);
        }

        // Root is a letter plus any run of '#'/'b'
        let mut split = 1;
        for (idx, c) in trimmed.char_indices().skip(1) {
            if c == '#' || c == 'b' {
                split = idx + c.len_utf8();
            } else {
                break;
            }
        }
        if !trimmed.is_char_boundary(split) {
            return Err(TheoryError::UnknownChord(symbol.to_string()));
        }

        let (root_part, suffix) = trimmed.split_at(split);
        if !root_part.starts_with(|c: char| c.is_ascii_uppercase()) {
            return Err(TheoryError::UnknownChord(symbol.to_string()));
        }
        let root = SpelledNote::parse(root_part)?;
        let chord_type = ChordType::from_alias(suffix)
            .ok_or_else(|| TheoryError::UnknownChord(symbol.to_string()))?;

        Ok(Self::new(root, chord_type))
    }

    pub fn quality(&self) -> ChordQuality {
        self.chord_type.quality
    }

    pub fn is_seventh(&self) -> bool {
        self.chord_type.is_seventh()
    }

    pub fn note_names(&self) -> Vec<String> {
        self.notes.iter().map(|n| n.to_string()).collect()
    }

    pub fn interval_names(&self) -> Vec<String> {
        self.chord_type.intervals.iter().map(|i| i.name()).collect()
    }

    pub fn pitch_classes(&self) -> Vec<u8> {
        self.notes.iter().map(|n| n.pitch_class()).collect()
    }

    /// Close-position MIDI voicing with the root in the given octave
    pub fn midi_notes(&self, octave: i8) -> Vec<u8> {
        let Some(root) = self.root.with_octave(Some(octave)).midi() else {
            return Vec::new();
        };
        self.chord_type
            .intervals
            .iter()
            .filter_map(|i| u8::try_from(root as i16 + i.semitones() as i16).ok())
            .filter(|&n| n <= 127)
            .collect()
    }

    /// Voiced note names after `inversion` rotations, each moved up an octave
    pub fn inverted(&self, inversion: usize, octave: i8) -> Vec<SpelledNote> {
        let root = self.root.with_octave(Some(octave));
        let mut notes: Vec<SpelledNote> = self.chord_type.intervals.iter().map(|&i| root.transpose(i)).collect();
        if notes.is_empty() {
            return notes;
        }
        for _ in 0..inversion % notes.len() {
            let first = notes.remove(0);
            let raised = first.with_octave(first.octave.map(|o| o.saturating_add(1)));
            notes.push(raised);
        }
        notes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_triads() {
        let c = Chord::parse("C").unwrap();
        assert_eq!(c.note_names(), vec!["C", "E", "G"]);
        assert_eq!(c.chord_type.name, "major");

        let bbm = Chord::parse("Bbm").unwrap();
        assert_eq!(bbm.note_names(), vec!["Bb", "Db", "F"]);
        assert_eq!(bbm.symbol, "Bbm");

        let f_sharp = Chord::parse("F#").unwrap();
        assert_eq!(f_sharp.note_names(), vec!["F#", "A#", "C#"]);
    }

    #[test]
    fn test_note_count_matches_formula() {
        for chord_type in ChordType::all() {
            for alias in chord_type.aliases {
                let chord = Chord::parse(&format!("D{}", alias)).unwrap();
                assert_eq!(chord.notes.len(), chord_type.intervals.len(), "D{}", alias);
            }
        }
    }

    #[test]
    fn test_sevenths() {
        let g7 = Chord::parse("G7").unwrap();
        assert_eq!(g7.note_names(), vec!["G", "B", "D", "F"]);
        assert!(g7.is_seventh());

        let b_half = Chord::parse("Bm7b5").unwrap();
        assert_eq!(b_half.note_names(), vec!["B", "D", "F", "A"]);
        assert_eq!(b_half.quality(), ChordQuality::HalfDiminished);

        let dim7 = Chord::parse("Bdim7").unwrap();
        assert_eq!(dim7.note_names(), vec!["B", "D", "F", "Ab"]);
    }

    #[test]
    fn test_unknown_chords() {
        assert!(matches!(Chord::parse("Cxyz"), Err(TheoryError::UnknownChord(_))));
        assert!(matches!(Chord::parse("H7"), Err(TheoryError::Note(_))));
        assert!(matches!(Chord::parse("m7"), Err(TheoryError::UnknownChord(_))));
        assert_eq!(Chord::parse("  "), Err(TheoryError::Empty));
    }

    #[test]
    fn test_midi_voicing() {
        let cmaj7 = Chord::parse("Cmaj7").unwrap();
        assert_eq!(cmaj7.midi_notes(4), vec![60, 64, 67, 71]);
        let dm = Chord::parse("Dm").unwrap();
        assert_eq!(dm.midi_notes(3), vec![50, 53, 57]);
    }

    #[test]
    fn test_inversions() {
        let c = Chord::parse("C").unwrap();
        let first = c.inverted(1, 4);
        let names: Vec<String> = first.iter().map(|n| n.to_string()).collect();
        assert_eq!(names, vec!["E4", "G4", "C5"]);

        let top = c.inverted(2, i8::MAX);
        assert_eq!(top.len(), 3);
        assert!(top.iter().all(|n| n.octave == Some(i8::MAX)));
    }

    #[test]
    fn test_lookup_by_semitones() {
        assert_eq!(ChordType::from_semitones(&[0, 3, 6, 10]).map(|t| t.code), Some("m7b5"));
        assert_eq!(ChordType::from_semitones(&[0, 4, 8, 11]).map(|t| t.code), Some("maj7#5"));
        assert_eq!(ChordType::from_semitones(&[0, 1, 2]), None);
    }
}
