//! Spelled note names and MIDI number conversion

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::NoteError;
use crate::theory::Interval;

/// Sharp spellings used for MIDI display
pub const NOTE_NAMES: [&str; 12] = ["C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B"];

/// Which pitch classes are black keys
const IS_BLACK_KEY: [bool; 12] = [false, true, false, true, false, false, true, false, true, false, true, false];

const LETTERS: [char; 7] = ['C', 'D', 'E', 'F', 'G', 'A', 'B'];

/// Semitone offset of each natural letter from C
const LETTER_SEMITONES: [i8; 7] = [0, 2, 4, 5, 7, 9, 11];

/// Double sharp to double flat
const MAX_ACCIDENTALS: i8 = 2;

/// Octaves that can hold a MIDI note
const OCTAVE_RANGE: std::ops::RangeInclusive<i8> = -1..=9;

/// A note name with its letter spelling preserved (`Bb` is not `A#`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SpelledNote {
    /// Letter index, 0 = C .. 6 = B
    pub letter: u8,
    /// Sharps positive, flats negative
    pub accidental: i8,
    pub octave: Option<i8>,
}

impl SpelledNote {
    pub fn new(letter: u8, accidental: i8, octave: Option<i8>) -> Self {
        Self { letter: letter % 7, accidental, octave }
    }

    /// Parse `C`, `F#`, `Bb3`, `Ebb`, `c#4`
    pub fn parse(name: &str) -> Result<Self, NoteError> {
        let invalid = || NoteError::InvalidName(name.to_string());
        let trimmed = name.trim();
        let mut chars = trimmed.char_indices();

        let (_, first) = chars.next().ok_or_else(invalid)?;
        let letter = LETTERS
            .iter()
            .position(|&l| l == first.to_ascii_uppercase())
            .ok_or_else(invalid)? as u8;

        let mut accidental: i8 = 0;
        let mut rest_start = trimmed.len();
        for (idx, c) in chars {
            match c {
                '#' if accidental < MAX_ACCIDENTALS => accidental += 1,
                'b' if accidental > -MAX_ACCIDENTALS => accidental -= 1,
                '#' | 'b' => return Err(invalid()),
                _ => {
                    rest_start = idx;
                    break;
                }
            }
        }

        let rest = &trimmed[rest_start..];
        let octave = if rest.is_empty() {
            None
        } else {
            let octave = rest.parse::<i8>().map_err(|_| invalid())?;
            if !OCTAVE_RANGE.contains(&octave) {
                return Err(invalid());
            }
            Some(octave)
        };

        Ok(Self { letter, accidental, octave })
    }

    /// Pitch class 0..12 (C = 0)
    pub fn pitch_class(&self) -> u8 {
        (LETTER_SEMITONES[self.letter as usize] + self.accidental).rem_euclid(12) as u8
    }

    /// Semitones from C0-relative origin, treating a missing octave as 0
    fn absolute_semitones(&self) -> i32 {
        let octave = self.octave.unwrap_or(0) as i32;
        LETTER_SEMITONES[self.letter as usize] as i32 + self.accidental as i32 + octave * 12
    }

    /// MIDI number (C4 = 60); requires an octave
    pub fn midi(&self) -> Option<u8> {
        let octave = self.octave? as i32;
        let midi = (octave + 1) * 12 + LETTER_SEMITONES[self.letter as usize] as i32 + self.accidental as i32;
        u8::try_from(midi).ok().filter(|m| *m <= 127)
    }

    /// Letter plus accidentals, without octave
    pub fn pitch_class_name(&self) -> String {
        let mut s = String::new();
        s.push(LETTERS[self.letter as usize]);
        let symbol = if self.accidental > 0 { '#' } else { 'b' };
        for _ in 0..self.accidental.unsigned_abs() {
            s.push(symbol);
        }
        s
    }

    pub fn with_octave(self, octave: Option<i8>) -> Self {
        Self { octave, ..self }
    }

    pub fn without_octave(self) -> Self {
        self.with_octave(None)
    }

    /// Transpose upwards by an interval, keeping correct letter spelling
    pub fn transpose(&self, interval: Interval) -> Self {
        let steps = interval.number().saturating_sub(1) as i32;
        let letter_total = self.letter as i32 + steps;
        let new_letter = letter_total.rem_euclid(7) as u8;
        let octave_carry = letter_total.div_euclid(7);

        let target = self.absolute_semitones() + interval.semitones() as i32;
        let base_octave = self.octave.unwrap_or(0) as i32 + octave_carry;
        let natural = LETTER_SEMITONES[new_letter as usize] as i32 + base_octave * 12;
        let accidental = (target - natural) as i8;

        Self {
            letter: new_letter,
            accidental,
            octave: self.octave.map(|_| base_octave as i8),
        }
    }

    /// Letter-step and semitone distance from `self` up to `other`
    pub(crate) fn distance_to(&self, other: &SpelledNote) -> (i32, i32) {
        let with_octaves = self.octave.is_some() && other.octave.is_some();
        let self_steps = self.letter as i32 + 7 * self.octave.unwrap_or(0) as i32;
        let other_steps = other.letter as i32 + 7 * other.octave.unwrap_or(0) as i32;
        let steps = other_steps - self_steps;
        let semis = other.absolute_semitones() - self.absolute_semitones();

        if with_octaves {
            (steps, semis)
        } else {
            let steps = steps.rem_euclid(7);
            // Keep the semitone count in the octave implied by the letter steps
            let semis = semis.rem_euclid(12);
            let semis = if steps == 0 && semis > 6 { semis - 12 } else { semis };
            (steps, semis)
        }
    }
}

impl fmt::Display for SpelledNote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.pitch_class_name())?;
        if let Some(octave) = self.octave {
            write!(f, "{}", octave)?;
        }
        Ok(())
    }
}

/// Sharp-spelled name with octave for a MIDI number (60 -> "C4")
pub fn midi_note_to_name(midi: u8) -> String {
    let octave = (midi / 12) as i32 - 1;
    format!("{}{}", NOTE_NAMES[(midi % 12) as usize], octave)
}

/// MIDI number for a note name; the octave is required
pub fn note_name_to_midi(name: &str) -> Result<u8, NoteError> {
    let note = SpelledNote::parse(name)?;
    if note.octave.is_none() {
        return Err(NoteError::InvalidName(name.to_string()));
    }
    note.midi().ok_or_else(|| NoteError::OutOfRange(name.to_string()))
}

pub fn is_black_key(midi: u8) -> bool {
    IS_BLACK_KEY[(midi % 12) as usize]
}

/// Sharp spelling of a pitch class
pub fn pitch_class_name(pitch_class: u8) -> &'static str {
    NOTE_NAMES[(pitch_class % 12) as usize]
}
