//! Music theory queries
//!
//! Every query has a `try_*` form returning the typed reason for failure and a
//! plain form that logs the reason and degrades to `None` or an empty value.

mod chord;
mod function;
mod interval;
mod key;
mod scale;

pub use chord::{CHORD_TYPES, Chord, ChordQuality, ChordType};
pub use function::{ChordProgression, canonical_progressions, next_chord_suggestions, roman_numeral};
pub use interval::Interval;
pub use key::{Key, KeyMode};
pub use scale::{Scale, ScaleType};

use tracing::debug;

use crate::error::TheoryError;
use crate::note::SpelledNote;

fn logged<T>(query: &str, input: &str, result: Result<T, TheoryError>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            debug!(query, input, error = %e, "theory query failed");
            None
        }
    }
}

pub fn try_chord_info(name: &str) -> Result<Chord, TheoryError> {
    Chord::parse(name)
}

pub fn chord_info(name: &str) -> Option<Chord> {
    logged("chord_info", name, try_chord_info(name))
}

pub fn try_scale_info(name: &str) -> Result<Scale, TheoryError> {
    Scale::parse(name)
}

pub fn scale_info(name: &str) -> Option<Scale> {
    logged("scale_info", name, try_scale_info(name))
}

pub fn try_key_info(name: &str) -> Result<Key, TheoryError> {
    Key::parse(name)
}

pub fn key_info(name: &str) -> Option<Key> {
    logged("key_info", name, try_key_info(name))
}

/// Normalized interval name (`"M3"` and `"3M"` both give `"3M"`)
pub fn try_interval_info(name: &str) -> Result<Interval, TheoryError> {
    Interval::parse(name)
}

pub fn interval_info(name: &str) -> Option<Interval> {
    logged("interval_info", name, try_interval_info(name))
}

pub fn try_interval_between(a: &str, b: &str) -> Result<Interval, TheoryError> {
    let a = SpelledNote::parse(a)?;
    let b = SpelledNote::parse(b)?;
    Ok(Interval::between(&a, &b))
}

pub fn interval_between(a: &str, b: &str) -> Option<Interval> {
    logged("interval_between", &format!("{a} {b}"), try_interval_between(a, b))
}

/// Roman-numeral function of a chord within a key
pub fn try_chord_function(chord: &str, key: &str) -> Result<String, TheoryError> {
    let chord = Chord::parse(chord)?;
    let key = Key::parse(key)?;
    roman_numeral(&chord, &key)
}

pub fn chord_function(chord: &str, key: &str) -> Option<String> {
    logged("chord_function", &format!("{chord} in {key}"), try_chord_function(chord, key))
}

pub fn try_common_progressions(key: &str) -> Result<Vec<ChordProgression>, TheoryError> {
    Ok(canonical_progressions(&Key::parse(key)?))
}

pub fn common_progressions(key: &str) -> Vec<ChordProgression> {
    logged("common_progressions", key, try_common_progressions(key)).unwrap_or_default()
}

/// Next-chord sequences (as symbols) following `chord` in `key`
pub fn try_progression_suggestions(chord: &str, key: &str) -> Result<Vec<Vec<String>>, TheoryError> {
    let chord = Chord::parse(chord)?;
    let key = Key::parse(key)?;
    Ok(next_chord_suggestions(&chord, &key)
        .into_iter()
        .map(|sequence| sequence.into_iter().map(|c| c.symbol).collect())
        .collect())
}

pub fn progression_suggestions(chord: &str, key: &str) -> Vec<Vec<String>> {
    logged(
        "progression_suggestions",
        &format!("{chord} in {key}"),
        try_progression_suggestions(chord, key),
    )
    .unwrap_or_default()
}

pub fn try_diatonic_chords(key: &str) -> Result<Vec<Chord>, TheoryError> {
    Ok(Key::parse(key)?.diatonic_chords(false))
}

pub fn diatonic_chords(key: &str) -> Vec<Chord> {
    logged("diatonic_chords", key, try_diatonic_chords(key)).unwrap_or_default()
}

/// Note names of `chord` voiced from `octave` after `inversion` rotations
pub fn try_invert_chord(chord: &str, inversion: usize, octave: i8) -> Result<Vec<String>, TheoryError> {
    let chord = Chord::parse(chord)?;
    Ok(chord.inverted(inversion, octave).iter().map(|n| n.to_string()).collect())
}

pub fn invert_chord(chord: &str, inversion: usize, octave: i8) -> Option<Vec<String>> {
    logged("invert_chord", chord, try_invert_chord(chord, inversion, octave))
}

pub fn chord_pitch_classes(chord: &str) -> Vec<String> {
    chord_info(chord)
        .map(|c| c.notes.iter().map(|n| n.pitch_class_name()).collect())
        .unwrap_or_default()
}

pub fn chord_midi_notes(chord: &str, octave: i8) -> Vec<u8> {
    chord_info(chord).map(|c| c.midi_notes(octave)).unwrap_or_default()
}

/// Whether `note` (any octave, enharmonics equal) is a member of `chord`
pub fn is_note_in_chord(note: &str, chord: &str) -> bool {
    let Some(note) = logged("is_note_in_chord", note, SpelledNote::parse(note).map_err(TheoryError::from)) else {
        return false;
    };
    chord_info(chord).is_some_and(|c| c.pitch_classes().contains(&note.pitch_class()))
}

/// Whether `note` (any octave, enharmonics equal) belongs to `scale`
pub fn is_note_in_scale(note: &str, scale: &str) -> bool {
    let Some(note) = logged("is_note_in_scale", note, SpelledNote::parse(note).map_err(TheoryError::from)) else {
        return false;
    };
    scale_info(scale).is_some_and(|s| s.contains_pitch_class(note.pitch_class()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_forms_degrade() {
        assert!(chord_info("Xyz").is_none());
        assert!(scale_info("C").is_none());
        assert!(key_info("C lydian").is_none());
        assert!(chord_function("Db", "C major").is_none());
        assert!(chord_function("C", "nonsense key").is_none());
        assert!(common_progressions("").is_empty());
        assert!(progression_suggestions("???", "C major").is_empty());
    }

    #[test]
    fn test_runaway_accidentals_degrade() {
        assert!(key_info("C################### major").is_none());
        assert!(key_info(&format!("G{} minor", "b".repeat(40))).is_none());
        assert!(chord_info(&format!("C{}", "#".repeat(128))).is_none());
        assert!(chord_info(&format!("E{}m7", "b".repeat(130))).is_none());
        assert!(key_info("F## major").is_some());
    }

    #[test]
    fn test_try_forms_distinguish_empty() {
        assert_eq!(try_chord_info(""), Err(TheoryError::Empty));
        assert!(matches!(try_chord_info("Cfoo"), Err(TheoryError::UnknownChord(_))));
    }

    #[test]
    fn test_chord_queries() {
        let chord = chord_info("Cmaj7").unwrap();
        assert_eq!(chord.note_names(), vec!["C", "E", "G", "B"]);
        assert_eq!(chord.interval_names(), vec!["1P", "3M", "5P", "7M"]);
        assert_eq!(chord_pitch_classes("Bbm"), vec!["Bb", "Db", "F"]);
        assert_eq!(chord_midi_notes("G7", 3), vec![55, 59, 62, 65]);
        assert!(is_note_in_chord("E5", "C"));
        assert!(is_note_in_chord("Fb", "C"));
        assert!(!is_note_in_chord("F4", "C"));
        assert!(!is_note_in_chord("F4", "nope"));
    }

    #[test]
    fn test_scale_queries() {
        assert!(is_note_in_scale("F#4", "G major"));
        assert!(!is_note_in_scale("F4", "G major"));
        assert_eq!(scale_info("D dorian").unwrap().notes.len(), 7);
    }

    #[test]
    fn test_interval_queries() {
        assert_eq!(interval_info("M3").map(|i| i.name()), Some("3M".to_string()));
        assert_eq!(interval_info("5P").map(|i| i.semitones()), Some(7));
        assert!(interval_info("Q9").is_none());
        assert_eq!(interval_between("C4", "G4").map(|i| i.name()), Some("5P".to_string()));
        assert!(interval_between("C4", "Z").is_none());
    }

    #[test]
    fn test_invert_and_progressions() {
        assert_eq!(
            invert_chord("Am", 2, 3),
            Some(vec!["E4".to_string(), "A4".to_string(), "C5".to_string()])
        );
        let suggestions = progression_suggestions("Dm", "C major");
        assert_eq!(suggestions[0], vec!["G"]);
        assert_eq!(common_progressions("A minor")[2].chords, vec!["Bm7b5", "E7", "AmMaj7"]);
        assert_eq!(diatonic_chords("G major")[6].symbol, "F#dim");
    }
}
