//! Major and minor keys

use serde::{Deserialize, Serialize};

use super::chord::{Chord, ChordType};
use super::scale::{Scale, ScaleType};
use crate::error::TheoryError;
use crate::note::SpelledNote;

/// Position of each natural letter on the circle of fifths relative to C
const LETTER_FIFTHS: [i8; 7] = [0, 2, 4, -1, 1, 3, 5];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyMode {
    Major,
    Minor,
}

impl KeyMode {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Major => "major",
            Self::Minor => "minor",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Key {
    pub name: String,
    pub tonic: SpelledNote,
    pub mode: KeyMode,
    /// Sharps positive, flats negative
    pub signature: i8,
}

impl Key {
    pub fn new(tonic: SpelledNote, mode: KeyMode) -> Self {
        let tonic = tonic.without_octave();
        let fifths = LETTER_FIFTHS[tonic.letter as usize] + 7 * tonic.accidental;
        let signature = match mode {
            KeyMode::Major => fifths,
            KeyMode::Minor => fifths - 3,
        };
        Self {
            name: format!("{} {}", tonic, mode.name()),
            tonic,
            mode,
            signature,
        }
    }

    /// Parse `"G"`, `"G major"`, `"E minor"`; other modes are rejected
    pub fn parse(name: &str) -> Result<Self, TheoryError> {
        let mut parts = name.split_whitespace();
        let tonic_part = parts.next().ok_or(TheoryError::Empty)?;
        let tonic = SpelledNote::parse(tonic_part)?;
        let mode = match parts.next().map(str::to_lowercase).as_deref() {
            None | Some("major") => KeyMode::Major,
            Some("minor") => KeyMode::Minor,
            Some(other) => return Err(TheoryError::UnsupportedKeyMode(other.to_string())),
        };
        if parts.next().is_some() {
            return Err(TheoryError::UnknownKey(name.to_string()));
        }
        Ok(Self::new(tonic, mode))
    }

    /// Scale whose degrees name roman numerals (major or natural minor)
    pub fn degree_scale(&self) -> Scale {
        match self.mode {
            KeyMode::Major => Scale::new(self.tonic, ScaleType::Major),
            KeyMode::Minor => Scale::new(self.tonic, ScaleType::Minor),
        }
    }

    /// Scale the diatonic chords are built from (major or harmonic minor)
    pub fn harmony_scale(&self) -> Scale {
        match self.mode {
            KeyMode::Major => Scale::new(self.tonic, ScaleType::Major),
            KeyMode::Minor => Scale::new(self.tonic, ScaleType::HarmonicMinor),
        }
    }

    /// Zero-based scale degree of a pitch class, if diatonic
    pub fn degree_of(&self, pitch_class: u8) -> Option<usize> {
        self.degree_scale()
            .notes
            .iter()
            .position(|n| n.pitch_class() == pitch_class % 12)
    }

    /// Chords stacked in thirds on each degree of the harmony scale
    pub fn diatonic_chords(&self, sevenths: bool) -> Vec<Chord> {
        let scale = self.harmony_scale();
        let notes = &scale.notes;
        let size = if sevenths { 4 } else { 3 };

        (0..notes.len())
            .filter_map(|degree| {
                let root = notes[degree];
                let semitones: Vec<u8> = (0..size)
                    .map(|k| {
                        let member = notes[(degree + 2 * k) % notes.len()];
                        (member.pitch_class() + 12 - root.pitch_class()) % 12
                    })
                    .collect();
                ChordType::from_semitones(&semitones).map(|t| Chord::new(root, t))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signatures() {
        assert_eq!(Key::parse("C").unwrap().signature, 0);
        assert_eq!(Key::parse("G major").unwrap().signature, 1);
        assert_eq!(Key::parse("F major").unwrap().signature, -1);
        assert_eq!(Key::parse("Eb major").unwrap().signature, -3);
        assert_eq!(Key::parse("F# major").unwrap().signature, 6);
        assert_eq!(Key::parse("A minor").unwrap().signature, 0);
        assert_eq!(Key::parse("E minor").unwrap().signature, 1);
        assert_eq!(Key::parse("C minor").unwrap().signature, -3);
    }

    #[test]
    fn test_rejects_other_modes() {
        assert_eq!(
            Key::parse("D dorian"),
            Err(TheoryError::UnsupportedKeyMode("dorian".to_string()))
        );
        assert_eq!(Key::parse(""), Err(TheoryError::Empty));
        assert!(Key::parse("Q major").is_err());
    }

    #[test]
    fn test_diatonic_chords_major() {
        let key = Key::parse("C major").unwrap();
        let symbols: Vec<String> = key.diatonic_chords(true).into_iter().map(|c| c.symbol).collect();
        assert_eq!(symbols, vec!["Cmaj7", "Dm7", "Em7", "Fmaj7", "G7", "Am7", "Bm7b5"]);

        let triads: Vec<String> = key.diatonic_chords(false).into_iter().map(|c| c.symbol).collect();
        assert_eq!(triads, vec!["C", "Dm", "Em", "F", "G", "Am", "Bdim"]);
    }

    #[test]
    fn test_diatonic_chords_minor() {
        let key = Key::parse("A minor").unwrap();
        let symbols: Vec<String> = key.diatonic_chords(true).into_iter().map(|c| c.symbol).collect();
        assert_eq!(symbols, vec!["AmMaj7", "Bm7b5", "Cmaj7#5", "Dm7", "E7", "Fmaj7", "G#dim7"]);
    }

    #[test]
    fn test_degree_of() {
        let key = Key::parse("A minor").unwrap();
        assert_eq!(key.degree_of(9), Some(0));
        assert_eq!(key.degree_of(7), Some(6));
        assert_eq!(key.degree_of(8), None);
    }
}
