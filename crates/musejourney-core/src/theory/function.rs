//! Roman-numeral analysis and progression building

use serde::{Deserialize, Serialize};

use super::chord::{Chord, ChordQuality};
use super::key::Key;
use crate::error::TheoryError;

const ROMAN: [&str; 7] = ["I", "II", "III", "IV", "V", "VI", "VII"];

/// Next-chord suggestions keyed by function without suffixes
const SUGGESTIONS: &[(&str, &[&[&str]])] = &[
    ("I", &[&["IV"], &["V"], &["vi"], &["IV", "V"], &["vi", "IV"]]),
    ("ii", &[&["V"], &["vii"], &["V", "I"]]),
    ("iii", &[&["vi"], &["IV"], &["vi", "ii"]]),
    ("IV", &[&["V"], &["I"], &["ii"], &["V", "I"], &["ii", "V"]]),
    ("V", &[&["I"], &["vi"], &["IV"], &["I", "IV"], &["vi", "IV"]]),
    ("vi", &[&["ii"], &["IV"], &["V"], &["ii", "V"], &["IV", "V"]]),
    ("vii", &[&["I"], &["iii"], &["I", "IV"]]),
    ("i", &[&["iv"], &["V"], &["VI"], &["iv", "V"], &["VI", "iv"]]),
    ("iv", &[&["V"], &["i"], &["V", "i"]]),
    ("VI", &[&["iv"], &["ii"], &["iv", "V"]]),
    ("III", &[&["VI"], &["iv"], &["VI", "iv"]]),
];

const FALLBACK: &[&[&str]] = &[&["I"], &["IV"], &["V"]];

/// The four canonical progressions as (id, display name, degrees)
const CANONICAL: [(&str, &str, &[usize]); 4] = [
    ("I-IV-V", "I-IV-V", &[0, 3, 4]),
    ("I-V-vi-IV", "I-V-vi-IV (pop)", &[0, 4, 5, 3]),
    ("ii-V-I", "ii-V-I (jazz)", &[1, 4, 0]),
    ("I-vi-IV-V", "I-vi-IV-V (fifties)", &[0, 5, 3, 4]),
];

/// A named chord sequence in a key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChordProgression {
    pub id: String,
    pub name: String,
    pub chords: Vec<String>,
    pub key: String,
}

/// Roman numeral for `chord` in `key`, e.g. `V7`, `ii`, `vii°`
pub fn roman_numeral(chord: &Chord, key: &Key) -> Result<String, TheoryError> {
    let degree = key
        .degree_of(chord.root.pitch_class())
        .ok_or_else(|| TheoryError::NotDiatonic {
            root: chord.root.to_string(),
            key: key.name.clone(),
        })?;

    let quality = chord.quality();
    let mut roman = if quality.is_minor_family() {
        ROMAN[degree].to_lowercase()
    } else {
        ROMAN[degree].to_string()
    };

    match quality {
        ChordQuality::Diminished | ChordQuality::HalfDiminished => roman.push('°'),
        ChordQuality::Augmented => roman.push('+'),
        _ if chord.is_seventh() => roman.push('7'),
        _ => {}
    }
    Ok(roman)
}

/// Canonical progressions built from the key's diatonic seventh chords
pub fn canonical_progressions(key: &Key) -> Vec<ChordProgression> {
    let chords = key.diatonic_chords(true);
    CANONICAL
        .iter()
        .filter_map(|(id, name, degrees)| {
            let symbols = degrees
                .iter()
                .map(|&d| chords.get(d).map(|c| c.symbol.clone()))
                .collect::<Option<Vec<_>>>()?;
            Some(ChordProgression {
                id: id.to_string(),
                name: name.to_string(),
                chords: symbols,
                key: key.name.clone(),
            })
        })
        .collect()
}

/// Strip `°`, `+` and `7` suffixes from a numeral
fn strip_suffixes(numeral: &str) -> &str {
    numeral.trim_end_matches(['°', '+', '7'])
}

/// Suggested continuations for `chord` in `key`, resolved to diatonic triads
pub fn next_chord_suggestions(chord: &Chord, key: &Key) -> Vec<Vec<Chord>> {
    let numerals = match roman_numeral(chord, key) {
        Ok(numeral) => SUGGESTIONS
            .iter()
            .find(|(function, _)| *function == strip_suffixes(&numeral))
            .map(|(_, next)| *next)
            .unwrap_or(FALLBACK),
        Err(_) => FALLBACK,
    };

    let triads = key.diatonic_chords(false);
    numerals
        .iter()
        .filter_map(|sequence| {
            sequence
                .iter()
                .map(|numeral| {
                    let upper = numeral.to_uppercase();
                    ROMAN
                        .iter()
                        .position(|r| *r == upper)
                        .and_then(|degree| triads.get(degree).cloned())
                })
                .collect::<Option<Vec<_>>>()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numeral(chord: &str, key: &str) -> Result<String, TheoryError> {
        roman_numeral(&Chord::parse(chord).unwrap(), &Key::parse(key).unwrap())
    }

    #[test]
    fn test_numerals_in_major() {
        assert_eq!(numeral("C", "C major").unwrap(), "I");
        assert_eq!(numeral("Dm", "C major").unwrap(), "ii");
        assert_eq!(numeral("G7", "C major").unwrap(), "V7");
        assert_eq!(numeral("Bdim", "C major").unwrap(), "vii°");
        assert_eq!(numeral("Bm7b5", "C major").unwrap(), "vii°");
        assert_eq!(numeral("Caug", "C major").unwrap(), "I+");
        assert_eq!(numeral("Fmaj7", "C major").unwrap(), "IV7");
        assert_eq!(numeral("Am7", "C major").unwrap(), "vi7");
    }

    #[test]
    fn test_case_follows_quality() {
        let key = Key::parse("G major").unwrap();
        for symbol in ["G", "Am", "Bm", "C", "D7", "Em", "F#dim", "Gsus4"] {
            let chord = Chord::parse(symbol).unwrap();
            let numeral = roman_numeral(&chord, &key).unwrap();
            let first = numeral.chars().next().unwrap();
            assert_eq!(first.is_lowercase(), chord.quality().is_minor_family(), "{}", symbol);
        }
    }

    #[test]
    fn test_non_diatonic_root() {
        assert!(matches!(numeral("Db", "C major"), Err(TheoryError::NotDiatonic { .. })));
        assert!(matches!(numeral("F#m", "C major"), Err(TheoryError::NotDiatonic { .. })));
    }

    #[test]
    fn test_numerals_in_minor() {
        assert_eq!(numeral("Am", "A minor").unwrap(), "i");
        assert_eq!(numeral("E7", "A minor").unwrap(), "V7");
        assert_eq!(numeral("F", "A minor").unwrap(), "VI");
        assert_eq!(numeral("G", "A minor").unwrap(), "VII");
    }

    #[test]
    fn test_canonical_progressions() {
        let key = Key::parse("C major").unwrap();
        let progressions = canonical_progressions(&key);
        assert_eq!(progressions.len(), 4);
        assert_eq!(progressions[0].chords, vec!["Cmaj7", "Fmaj7", "G7"]);
        assert_eq!(progressions[2].id, "ii-V-I");
        assert_eq!(progressions[2].chords, vec!["Dm7", "G7", "Cmaj7"]);
    }

    #[test]
    fn test_suggestions() {
        let key = Key::parse("C major").unwrap();
        let g7 = Chord::parse("G7").unwrap();
        let suggestions = next_chord_suggestions(&g7, &key);
        let symbols: Vec<Vec<String>> = suggestions
            .iter()
            .map(|s| s.iter().map(|c| c.symbol.clone()).collect())
            .collect();
        assert_eq!(symbols[0], vec!["C"]);
        assert_eq!(symbols[3], vec!["C", "F"]);
        assert_eq!(symbols.len(), 5);
    }

    #[test]
    fn test_suggestion_fallback() {
        let key = Key::parse("C major").unwrap();
        let eb = Chord::parse("Eb").unwrap();
        let symbols: Vec<Vec<String>> = next_chord_suggestions(&eb, &key)
            .iter()
            .map(|s| s.iter().map(|c| c.symbol.clone()).collect())
            .collect();
        assert_eq!(symbols, vec![vec!["C"], vec!["F"], vec!["G"]]);
    }
}
