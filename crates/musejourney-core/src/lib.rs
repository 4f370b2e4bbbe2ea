//! musejourney-core: Domain types for the musejourney ear trainer

mod error;
pub mod exercise;
pub mod midi;
pub mod notation;
pub mod note;
pub mod theory;
pub mod training;

pub use error::{NoteError, StorageError, TheoryError};
pub use exercise::{PlaybackEvent, RunningStats, ScoredAnswer, SessionTracker};
pub use midi::{ActiveNotes, MidiNoteEvent, NoteEventKind, encode_note_off, encode_note_on, parse_midi_message};
pub use note::{NOTE_NAMES, SpelledNote, is_black_key, midi_note_to_name, note_name_to_midi};
pub use training::{TrainingCategory, TrainingSettings, TrainingStore};
