//! Measure grouping and stave layout for simple notation

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::NoteError;
use crate::note::SpelledNote;

/// Note duration codes as written after the slash in `C4/q`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum NoteDuration {
    Whole,
    Half,
    #[default]
    Quarter,
    Eighth,
    Sixteenth,
    ThirtySecond,
}

impl NoteDuration {
    /// Length in quarter-note beats
    pub fn beats(&self) -> f32 {
        match self {
            Self::Whole => 4.0,
            Self::Half => 2.0,
            Self::Quarter => 1.0,
            Self::Eighth => 0.5,
            Self::Sixteenth => 0.25,
            Self::ThirtySecond => 0.125,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::Whole => "w",
            Self::Half => "h",
            Self::Quarter => "q",
            Self::Eighth => "8",
            Self::Sixteenth => "16",
            Self::ThirtySecond => "32",
        }
    }

    /// Unknown codes read as a quarter note
    pub fn from_code(code: &str) -> Self {
        match code {
            "w" => Self::Whole,
            "h" => Self::Half,
            "8" => Self::Eighth,
            "16" => Self::Sixteenth,
            "32" => Self::ThirtySecond,
            _ => Self::Quarter,
        }
    }

    pub fn is_filled(&self) -> bool {
        !matches!(self, Self::Whole | Self::Half)
    }

    pub fn flags(&self) -> u8 {
        match self {
            Self::Eighth => 1,
            Self::Sixteenth => 2,
            Self::ThirtySecond => 3,
            _ => 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Clef {
    #[default]
    Treble,
    Bass,
    Alto,
    Tenor,
}

impl Clef {
    /// Note on the middle stave line
    fn middle_line(&self) -> (u8, i8) {
        match self {
            Self::Treble => (6, 4), // B4
            Self::Bass => (1, 3),   // D3
            Self::Alto => (0, 4),   // C4
            Self::Tenor => (5, 3),  // A3
        }
    }

    /// Diatonic steps of `note` above the middle line (negative below)
    pub fn staff_step(&self, note: &SpelledNote) -> i32 {
        let (letter, octave) = self.middle_line();
        let reference = letter as i32 + 7 * octave as i32;
        let position = note.letter as i32 + 7 * note.octave.unwrap_or(4) as i32;
        position - reference
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Treble => "treble",
            Self::Bass => "bass",
            Self::Alto => "alto",
            Self::Tenor => "tenor",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSignature {
    pub beats: u8,
    pub beat_value: u8,
}

impl Default for TimeSignature {
    fn default() -> Self {
        Self { beats: 4, beat_value: 4 }
    }
}

impl TimeSignature {
    /// Measure length in quarter-note beats
    pub fn measure_beats(&self) -> f32 {
        self.beats as f32 * 4.0 / self.beat_value.max(1) as f32
    }
}

impl FromStr for TimeSignature {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (beats, value) = s.trim().split_once('/').ok_or_else(|| format!("Invalid time signature: {s}"))?;
        let beats: u8 = beats.trim().parse().map_err(|_| format!("Invalid time signature: {s}"))?;
        let beat_value: u8 = value.trim().parse().map_err(|_| format!("Invalid time signature: {s}"))?;
        if beats == 0 || beat_value == 0 {
            return Err(format!("Invalid time signature: {s}"));
        }
        Ok(Self { beats, beat_value })
    }
}

impl fmt::Display for TimeSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.beats, self.beat_value)
    }
}

/// A pitch with a written duration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotatedNote {
    pub pitch: SpelledNote,
    pub duration: NoteDuration,
}

impl NotatedNote {
    /// Parse `C4/q`, `Eb5/8`; a missing duration is a quarter note
    pub fn parse(s: &str) -> Result<Self, NoteError> {
        let (pitch, duration) = match s.split_once('/') {
            Some((pitch, code)) => (pitch, NoteDuration::from_code(code.trim())),
            None => (s, NoteDuration::Quarter),
        };
        Ok(Self {
            pitch: SpelledNote::parse(pitch)?,
            duration,
        })
    }
}

impl fmt::Display for NotatedNote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.pitch, self.duration.code())
    }
}

/// Greedy grouping: a note that would overflow the current measure starts a new one
pub fn group_notes_into_measures(notes: &[NotatedNote], time_signature: TimeSignature) -> Vec<Vec<NotatedNote>> {
    let capacity = time_signature.measure_beats();
    let mut measures = Vec::new();
    let mut current: Vec<NotatedNote> = Vec::new();
    let mut filled = 0.0;

    for note in notes {
        let beats = note.duration.beats();
        if filled + beats > capacity && !current.is_empty() {
            measures.push(std::mem::take(&mut current));
            filled = 0.0;
        }
        current.push(note.clone());
        filled += beats;
    }

    if !current.is_empty() {
        measures.push(current);
    }
    measures
}

/// Position of one stave in the rendered score
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StavePlacement {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub line: usize,
    /// First stave on a line carries clef, key and time signature
    pub show_signature: bool,
}

pub const MAX_STAVES_PER_LINE: usize = 4;
pub const LINE_HEIGHT: f32 = 100.0;

pub struct StaveLayout;

impl StaveLayout {
    pub fn compute(measure_count: usize, width: f32) -> Vec<StavePlacement> {
        if measure_count == 0 {
            return Vec::new();
        }
        let per_line = measure_count.min(MAX_STAVES_PER_LINE);
        let stave_width = (width - 40.0) / per_line as f32;

        (0..measure_count)
            .map(|i| {
                let line = i / per_line;
                let column = i % per_line;
                StavePlacement {
                    x: 20.0 + column as f32 * stave_width,
                    y: 40.0 + line as f32 * LINE_HEIGHT,
                    width: stave_width,
                    line,
                    show_signature: column == 0,
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn notes(list: &[&str]) -> Vec<NotatedNote> {
        list.iter().map(|s| NotatedNote::parse(s).unwrap()).collect()
    }

    #[test]
    fn test_parse_notes() {
        let note = NotatedNote::parse("Eb5/8").unwrap();
        assert_eq!(note.duration, NoteDuration::Eighth);
        assert_eq!(note.to_string(), "Eb5/8");
        assert_eq!(NotatedNote::parse("C4").unwrap().duration, NoteDuration::Quarter);
        assert_eq!(NotatedNote::parse("C4/zz").unwrap().duration, NoteDuration::Quarter);
        assert!(NotatedNote::parse("K4/q").is_err());
    }

    #[test]
    fn test_time_signature() {
        let ts: TimeSignature = "6/8".parse().unwrap();
        assert_eq!(ts.measure_beats(), 3.0);
        assert!("4".parse::<TimeSignature>().is_err());
        assert!("0/4".parse::<TimeSignature>().is_err());
    }

    #[test]
    fn test_grouping_four_four() {
        let input = notes(&["C4/q", "D4/q", "E4/q", "F4/q", "G4/h", "A4/h", "B4/w"]);
        let measures = group_notes_into_measures(&input, TimeSignature::default());
        let sizes: Vec<usize> = measures.iter().map(|m| m.len()).collect();
        assert_eq!(sizes, vec![4, 2, 1]);
    }

    #[test]
    fn test_grouping_overflow_starts_new_measure() {
        let ts: TimeSignature = "3/4".parse().unwrap();
        let input = notes(&["C4/h", "D4/h", "E4/8", "F4/8"]);
        let measures = group_notes_into_measures(&input, ts);
        let sizes: Vec<usize> = measures.iter().map(|m| m.len()).collect();
        assert_eq!(sizes, vec![1, 3]);
    }

    #[test]
    fn test_layout() {
        let layout = StaveLayout::compute(6, 540.0);
        assert_eq!(layout.len(), 6);
        assert_eq!(layout[0].width, 125.0);
        assert_eq!(layout[1].x, 145.0);
        assert_eq!(layout[4].line, 1);
        assert_eq!(layout[4].y, 140.0);
        assert!(layout[4].show_signature);
        assert!(!layout[5].show_signature);

        let single = StaveLayout::compute(2, 500.0);
        assert_eq!(single[1].x, 250.0);
        assert!(StaveLayout::compute(0, 500.0).is_empty());
    }

    #[test]
    fn test_staff_steps() {
        let b4 = SpelledNote::parse("B4").unwrap();
        let c4 = SpelledNote::parse("C4").unwrap();
        assert_eq!(Clef::Treble.staff_step(&b4), 0);
        assert_eq!(Clef::Treble.staff_step(&c4), -6);
        assert_eq!(Clef::Bass.staff_step(&SpelledNote::parse("D3").unwrap()), 0);
    }
}
