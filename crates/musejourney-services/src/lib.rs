//! musejourney-services: Audio output, synth voices and MIDI device access

pub mod audio_engine;
pub mod audio_io;
pub mod effects;
pub mod instruments;
pub mod midi_io;

pub use audio_engine::{
    AudioEngine, AudioEngineError, DEFAULT_VELOCITY, EngineSnapshot, PlaybackHandle, ScaleDirection,
};
pub use audio_io::{AudioOutputError, RealtimeOutputStream, default_output_info};
pub use effects::LowPassEffect;
pub use instruments::{AudioInstrument, InstrumentKind, PolySynth};
pub use midi_io::{
    MidiAccessState, MidiError, MidiOutputPort, MidiPortInfo, MidiSubscription, NoteOffHandle,
    listen_to_midi_channel, listen_to_midi_input, request_midi_access,
};
