//! Intervals in letter-step + semitone form

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TheoryError;
use crate::note::SpelledNote;

/// Semitones of the major/perfect interval for each simple number (1..=7)
const BASE_SEMITONES: [i8; 7] = [0, 2, 4, 5, 7, 9, 11];

/// An interval such as a major third (`3M`) or diminished fifth (`5d`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Interval {
    number: u8,
    semitones: i8,
}

impl Interval {
    pub const fn new(number: u8, semitones: i8) -> Self {
        Self { number, semitones }
    }

    pub fn number(&self) -> u8 {
        self.number
    }

    pub fn semitones(&self) -> i8 {
        self.semitones
    }

    fn simple_index(number: u8) -> usize {
        ((number.max(1) - 1) % 7) as usize
    }

    fn is_perfect_class(number: u8) -> bool {
        matches!(Self::simple_index(number), 0 | 3 | 4)
    }

    fn base_semitones(number: u8) -> i8 {
        let octaves = ((number.max(1) - 1) / 7) as i8;
        BASE_SEMITONES[Self::simple_index(number)] + 12 * octaves
    }

    /// Quality letter(s): P, M, m, A, d, AA, dd
    pub fn quality(&self) -> String {
        let diff = self.semitones - Self::base_semitones(self.number);
        if Self::is_perfect_class(self.number) {
            match diff {
                0 => "P".to_string(),
                d if d > 0 => "A".repeat(d as usize),
                d => "d".repeat(d.unsigned_abs() as usize),
            }
        } else {
            match diff {
                0 => "M".to_string(),
                -1 => "m".to_string(),
                d if d > 0 => "A".repeat(d as usize),
                d => "d".repeat((d.unsigned_abs() - 1) as usize),
            }
        }
    }

    /// Number-first name, e.g. `3M`
    pub fn name(&self) -> String {
        format!("{}{}", self.number, self.quality())
    }

    /// Quality-first name, e.g. `M3`
    pub fn short_name(&self) -> String {
        format!("{}{}", self.quality(), self.number)
    }

    /// Parse `3M`, `M3`, `5d`, `P8`, `4A`
    pub fn parse(name: &str) -> Result<Self, TheoryError> {
        let unknown = || TheoryError::UnknownInterval(name.to_string());
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(TheoryError::Empty);
        }

        let digits_first = trimmed.starts_with(|c: char| c.is_ascii_digit());
        let (number_part, quality_part) = if digits_first {
            let split = trimmed.find(|c: char| !c.is_ascii_digit()).ok_or_else(unknown)?;
            (&trimmed[..split], &trimmed[split..])
        } else {
            let split = trimmed.find(|c: char| c.is_ascii_digit()).ok_or_else(unknown)?;
            (&trimmed[split..], &trimmed[..split])
        };

        let number: u8 = number_part.parse().map_err(|_| unknown())?;
        if number == 0 || number > 15 {
            return Err(unknown());
        }

        let base = Self::base_semitones(number);
        let perfect = Self::is_perfect_class(number);
        let offset: i8 = match quality_part {
            "P" if perfect => 0,
            "M" if !perfect => 0,
            "m" if !perfect => -1,
            "A" => 1,
            "AA" => 2,
            "d" if perfect => -1,
            "d" => -2,
            "dd" if perfect => -2,
            "dd" => -3,
            _ => return Err(unknown()),
        };

        Ok(Self::new(number, base + offset))
    }

    /// Interval size from `a` to `b`, regardless of direction
    pub fn between(a: &SpelledNote, b: &SpelledNote) -> Self {
        let (steps, semis) = a.distance_to(b);
        let (steps, semis) = if steps < 0 { (-steps, -semis) } else { (steps, semis) };
        Self::new(steps as u8 + 1, semis as i8)
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

// Interval constants used by the chord and scale tables
pub(crate) const UNISON: Interval = Interval::new(1, 0);
pub(crate) const MIN2: Interval = Interval::new(2, 1);
pub(crate) const MAJ2: Interval = Interval::new(2, 2);
pub(crate) const MIN3: Interval = Interval::new(3, 3);
pub(crate) const MAJ3: Interval = Interval::new(3, 4);
pub(crate) const PERF4: Interval = Interval::new(4, 5);
pub(crate) const AUG4: Interval = Interval::new(4, 6);
pub(crate) const DIM5: Interval = Interval::new(5, 6);
pub(crate) const PERF5: Interval = Interval::new(5, 7);
pub(crate) const AUG5: Interval = Interval::new(5, 8);
pub(crate) const MIN6: Interval = Interval::new(6, 8);
pub(crate) const MAJ6: Interval = Interval::new(6, 9);
pub(crate) const DIM7: Interval = Interval::new(7, 9);
pub(crate) const MIN7: Interval = Interval::new(7, 10);
pub(crate) const MAJ7: Interval = Interval::new(7, 11);
pub(crate) const MAJ9: Interval = Interval::new(9, 14);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names() {
        assert_eq!(MAJ3.name(), "3M");
        assert_eq!(MIN3.short_name(), "m3");
        assert_eq!(DIM5.name(), "5d");
        assert_eq!(Interval::new(4, 6).name(), "4A");
        assert_eq!(DIM7.name(), "7d");
        assert_eq!(Interval::new(8, 12).name(), "8P");
    }

    #[test]
    fn test_parse_both_orders() {
        assert_eq!(Interval::parse("3M"), Ok(MAJ3));
        assert_eq!(Interval::parse("M3"), Ok(MAJ3));
        assert_eq!(Interval::parse("m7"), Ok(MIN7));
        assert_eq!(Interval::parse("P8"), Ok(Interval::new(8, 12)));
        assert_eq!(Interval::parse("9M"), Ok(MAJ9));
        assert!(Interval::parse("P3").is_err());
        assert!(Interval::parse("M5").is_err());
        assert!(Interval::parse("X").is_err());
        assert_eq!(Interval::parse(""), Err(TheoryError::Empty));
    }

    #[test]
    fn test_between_notes() {
        let c = SpelledNote::parse("C").unwrap();
        let e = SpelledNote::parse("E").unwrap();
        let eb = SpelledNote::parse("Eb").unwrap();
        let f_sharp = SpelledNote::parse("F#").unwrap();
        assert_eq!(Interval::between(&c, &e).name(), "3M");
        assert_eq!(Interval::between(&c, &eb).name(), "3m");
        assert_eq!(Interval::between(&c, &f_sharp).name(), "4A");

        let c4 = SpelledNote::parse("C4").unwrap();
        let c5 = SpelledNote::parse("C5").unwrap();
        assert_eq!(Interval::between(&c4, &c5).name(), "8P");
        assert_eq!(Interval::between(&c5, &c4).name(), "8P");
    }
}
