//! MIDI note message parsing and encoding

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::note::midi_note_to_name;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NoteEventKind {
    On,
    Off,
}

/// A note-on or note-off decoded from raw bytes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MidiNoteEvent {
    pub kind: NoteEventKind,
    pub channel: u8,
    pub midi: u8,
    /// Sharp-spelled name, e.g. `C#4`
    pub note: String,
    /// 0.0..=1.0, zero for note-off
    pub velocity: f32,
}

impl MidiNoteEvent {
    pub fn is_note_on(&self) -> bool {
        self.kind == NoteEventKind::On
    }
}

/// Decode a note message; other message types are ignored
pub fn parse_midi_message(data: &[u8]) -> Option<MidiNoteEvent> {
    if data.len() < 3 {
        return None;
    }

    let status = data[0];
    let channel = status & 0x0F;
    let pitch = data[1] & 0x7F;
    let velocity = data[2] & 0x7F;

    let (kind, velocity) = match status & 0xF0 {
        0x90 if velocity > 0 => (NoteEventKind::On, velocity as f32 / 127.0),
        // Note On with velocity 0 is Note Off
        0x90 | 0x80 => (NoteEventKind::Off, 0.0),
        _ => return None,
    };

    Some(MidiNoteEvent {
        kind,
        channel,
        midi: pitch,
        note: midi_note_to_name(pitch),
        velocity,
    })
}

/// Note-on bytes; velocity is 0.0..=1.0
///
/// Encoded velocity is at least 1, since 0 reads as note-off.
pub fn encode_note_on(channel: u8, note: u8, velocity: f32) -> [u8; 3] {
    let velocity = ((velocity.clamp(0.0, 1.0) * 127.0).floor() as u8).max(1);
    [0x90 | (channel & 0x0F), note & 0x7F, velocity]
}

pub fn encode_note_off(channel: u8, note: u8) -> [u8; 3] {
    [0x80 | (channel & 0x0F), note & 0x7F, 0]
}

/// Notes currently held on a MIDI input, with their velocities
#[derive(Debug, Clone, Default)]
pub struct ActiveNotes {
    held: BTreeMap<u8, f32>,
}

impl ActiveNotes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply(&mut self, event: &MidiNoteEvent) {
        match event.kind {
            NoteEventKind::On => {
                self.held.insert(event.midi, event.velocity);
            }
            NoteEventKind::Off => {
                self.held.remove(&event.midi);
            }
        }
    }

    pub fn is_held(&self, midi: u8) -> bool {
        self.held.contains_key(&midi)
    }

    /// Held notes in ascending order
    pub fn notes(&self) -> Vec<u8> {
        self.held.keys().copied().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.held.is_empty()
    }

    pub fn clear(&mut self) {
        self.held.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_note_on() {
        let event = parse_midi_message(&[0x91, 60, 127]).unwrap();
        assert_eq!(event.kind, NoteEventKind::On);
        assert_eq!(event.channel, 1);
        assert_eq!(event.note, "C4");
        assert!((event.velocity - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_parse_note_off_forms() {
        let off = parse_midi_message(&[0x80, 64, 40]).unwrap();
        assert_eq!(off.kind, NoteEventKind::Off);
        assert_eq!(off.velocity, 0.0);

        let zero_velocity = parse_midi_message(&[0x90, 64, 0]).unwrap();
        assert_eq!(zero_velocity.kind, NoteEventKind::Off);
    }

    #[test]
    fn test_quiet_note_on_stays_note_on() {
        assert_eq!(encode_note_on(0, 60, 0.0), [0x90, 60, 1]);
        assert_eq!(encode_note_on(2, 60, 0.005), [0x92, 60, 1]);
        assert_eq!(encode_note_on(0, 60, 1.0), [0x90, 60, 127]);
        let parsed = parse_midi_message(&encode_note_on(0, 64, 0.001)).unwrap();
        assert_eq!(parsed.kind, NoteEventKind::On);
    }

    #[test]
    fn test_ignores_other_messages() {
        assert!(parse_midi_message(&[0xB0, 7, 100]).is_none());
        assert!(parse_midi_message(&[0xE0, 0, 64]).is_none());
        assert!(parse_midi_message(&[0xF8]).is_none());
        assert!(parse_midi_message(&[0x90, 60]).is_none());
    }

    #[test]
    fn test_encode() {
        assert_eq!(encode_note_on(0, 60, 0.7), [0x90, 60, 88]);
        assert_eq!(encode_note_on(3, 60, 2.0), [0x93, 60, 127]);
        assert_eq!(encode_note_off(3, 60), [0x83, 60, 0]);
    }

    #[test]
    fn test_active_notes() {
        let mut active = ActiveNotes::new();
        active.apply(&parse_midi_message(&[0x90, 64, 100]).unwrap());
        active.apply(&parse_midi_message(&[0x90, 60, 100]).unwrap());
        assert_eq!(active.notes(), vec![60, 64]);
        active.apply(&parse_midi_message(&[0x90, 64, 0]).unwrap());
        assert!(!active.is_held(64));
        assert!(active.is_held(60));
        active.clear();
        assert!(active.is_empty());
    }
}
