//! Polyphonic synth voices for note playback

use std::f64::consts::TAU;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Largest number of simultaneously sounding voices per instrument
const MAX_VOICES: usize = 32;
/// Output gain per voice so full chords stay below clipping
const VOICE_GAIN: f64 = 0.18;
/// Modulation depth for the FM square tone, in radians
const FM_INDEX: f64 = 2.0;

/// Instrument that turns queued note events into sound
pub trait AudioInstrument: Send {
    /// Instrument display name
    fn name(&self) -> &str;
    /// Queue a note-on event at the given sample offset
    fn queue_note_on(&mut self, pitch: u8, velocity: u8, channel: u8, sample_offset: u32);
    /// Queue a note-off event at the given sample offset
    fn queue_note_off(&mut self, pitch: u8, velocity: u8, channel: u8, sample_offset: u32);
    /// Turn off all notes immediately
    fn all_notes_off(&mut self);
    /// Process and return stereo output buffers
    fn process(&mut self, num_frames: usize) -> (&[f32], &[f32]);
    /// Update sample rate
    fn set_sample_rate(&mut self, sample_rate: f32);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Waveform {
    Sine,
    Triangle,
    Square,
    /// Square carrier phase-modulated by a sine at the same frequency
    FmSquare,
}

impl Waveform {
    fn sample(self, phase: f64, mod_phase: f64) -> f64 {
        match self {
            Self::Sine => (phase * TAU).sin(),
            Self::Triangle => 4.0 * (phase.fract() - 0.5).abs() - 1.0,
            Self::Square => square(phase),
            Self::FmSquare => square(phase + FM_INDEX * (mod_phase * TAU).sin() / TAU),
        }
    }
}

fn square(phase: f64) -> f64 {
    if phase.rem_euclid(1.0) < 0.5 { 1.0 } else { -1.0 }
}

/// Linear ADSR, times in seconds
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Envelope {
    pub attack: f64,
    pub decay: f64,
    pub sustain: f64,
    pub release: f64,
}

/// The selectable instrument voices
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstrumentKind {
    #[default]
    Piano,
    Synth,
    Marimba,
    Guitar,
}

impl InstrumentKind {
    pub const ALL: [InstrumentKind; 4] = [Self::Piano, Self::Synth, Self::Marimba, Self::Guitar];

    pub fn name(self) -> &'static str {
        match self {
            Self::Piano => "piano",
            Self::Synth => "synth",
            Self::Marimba => "marimba",
            Self::Guitar => "guitar",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Piano => "Piano",
            Self::Synth => "Synth",
            Self::Marimba => "Marimba",
            Self::Guitar => "Guitar",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.name().eq_ignore_ascii_case(name.trim()))
    }

    pub fn waveform(self) -> Waveform {
        match self {
            Self::Piano | Self::Synth => Waveform::Triangle,
            Self::Marimba => Waveform::Sine,
            Self::Guitar => Waveform::FmSquare,
        }
    }

    pub fn envelope(self) -> Envelope {
        match self {
            Self::Piano => Envelope { attack: 0.02, decay: 0.1, sustain: 0.3, release: 1.0 },
            Self::Synth => Envelope { attack: 0.005, decay: 0.1, sustain: 0.3, release: 1.0 },
            Self::Marimba => Envelope { attack: 0.01, decay: 0.3, sustain: 0.0, release: 1.0 },
            Self::Guitar => Envelope { attack: 0.01, decay: 0.1, sustain: 0.2, release: 0.4 },
        }
    }
}

impl fmt::Display for InstrumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Equal-tempered frequency, A4 = 440 Hz
pub fn midi_to_hz(pitch: u8) -> f64 {
    440.0 * 2f64.powf((pitch as f64 - 69.0) / 12.0)
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Stage {
    Attack,
    Decay,
    Sustain,
    Release { from: f64 },
}

#[derive(Debug, Clone)]
struct SynthVoice {
    pitch: u8,
    active: bool,
    /// Key still down; cleared by note-off
    held: bool,
    /// Trigger order, oldest voice is stolen first
    age: u64,
    velocity: f64,
    stage: Stage,
    stage_time: f64,
    level: f64,
    phase: f64,
    mod_phase: f64,
}

impl SynthVoice {
    fn new() -> Self {
        Self {
            pitch: 0,
            active: false,
            held: false,
            age: 0,
            velocity: 0.0,
            stage: Stage::Attack,
            stage_time: 0.0,
            level: 0.0,
            phase: 0.0,
            mod_phase: 0.0,
        }
    }

    fn trigger(&mut self, pitch: u8, velocity: u8, age: u64) {
        self.pitch = pitch;
        self.active = true;
        self.held = true;
        self.age = age;
        self.velocity = velocity as f64 / 127.0;
        self.stage = Stage::Attack;
        self.stage_time = 0.0;
        self.level = 0.0;
        self.phase = 0.0;
        self.mod_phase = 0.0;
    }

    fn release(&mut self) {
        self.held = false;
        if self.active && !matches!(self.stage, Stage::Release { .. }) {
            self.stage = Stage::Release { from: self.level };
            self.stage_time = 0.0;
        }
    }

    fn advance_envelope(&mut self, env: &Envelope, dt: f64) {
        self.stage_time += dt;
        match self.stage {
            Stage::Attack => {
                self.level = if env.attack > 0.0 { (self.stage_time / env.attack).min(1.0) } else { 1.0 };
                if self.stage_time >= env.attack {
                    self.stage = Stage::Decay;
                    self.stage_time = 0.0;
                }
            }
            Stage::Decay => {
                let t = if env.decay > 0.0 { (self.stage_time / env.decay).min(1.0) } else { 1.0 };
                self.level = 1.0 - (1.0 - env.sustain) * t;
                if self.stage_time >= env.decay {
                    self.stage = Stage::Sustain;
                    self.stage_time = 0.0;
                }
            }
            Stage::Sustain => {
                self.level = env.sustain;
                if env.sustain <= 0.0 {
                    self.active = false;
                }
            }
            Stage::Release { from } => {
                let t = if env.release > 0.0 { (self.stage_time / env.release).min(1.0) } else { 1.0 };
                self.level = from * (1.0 - t);
                if t >= 1.0 {
                    self.active = false;
                }
            }
        }
    }

    fn tick(&mut self, waveform: Waveform, env: &Envelope, sample_rate: f64) -> f64 {
        if !self.active {
            return 0.0;
        }
        let dt = 1.0 / sample_rate;
        let freq = midi_to_hz(self.pitch);

        let osc = waveform.sample(self.phase, self.mod_phase);
        self.phase = (self.phase + freq * dt).fract();
        self.mod_phase = (self.mod_phase + freq * dt).fract();

        self.advance_envelope(env, dt);
        osc * self.level * self.velocity * VOICE_GAIN
    }
}

#[derive(Debug, Clone, Copy)]
struct QueuedEvent {
    pitch: u8,
    velocity: u8,
    offset: u32,
    note_on: bool,
}

/// Polyphonic oscillator + envelope instrument
pub struct PolySynth {
    kind: InstrumentKind,
    waveform: Waveform,
    envelope: Envelope,
    sample_rate: f32,
    voices: Vec<SynthVoice>,
    triggers: u64,
    pending_events: Vec<QueuedEvent>,
    output_left: Vec<f32>,
    output_right: Vec<f32>,
}

impl fmt::Debug for PolySynth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PolySynth")
            .field("kind", &self.kind)
            .field("sample_rate", &self.sample_rate)
            .field("active_voices", &self.active_voices())
            .finish()
    }
}

impl PolySynth {
    pub fn new(kind: InstrumentKind, sample_rate: f32) -> Self {
        Self {
            kind,
            waveform: kind.waveform(),
            envelope: kind.envelope(),
            sample_rate,
            voices: vec![SynthVoice::new(); MAX_VOICES],
            triggers: 0,
            pending_events: Vec::new(),
            output_left: Vec::new(),
            output_right: Vec::new(),
        }
    }

    pub fn kind(&self) -> InstrumentKind {
        self.kind
    }

    pub fn active_voices(&self) -> usize {
        self.voices.iter().filter(|v| v.active).count()
    }

    /// Pitches whose key is still down
    pub fn held_notes(&self) -> Vec<u8> {
        let mut notes: Vec<u8> = self.voices.iter().filter(|v| v.active && v.held).map(|v| v.pitch).collect();
        notes.sort_unstable();
        notes.dedup();
        notes
    }

    fn note_on(&mut self, pitch: u8, velocity: u8) {
        self.triggers += 1;
        let index = self
            .voices
            .iter()
            .position(|v| !v.active)
            .or_else(|| {
                self.voices
                    .iter()
                    .enumerate()
                    .min_by_key(|(_, v)| v.age)
                    .map(|(i, _)| i)
            });
        if let Some(voice) = index.and_then(|i| self.voices.get_mut(i)) {
            voice.trigger(pitch, velocity, self.triggers);
        }
    }

    /// Release the oldest held voice for this pitch
    fn note_off(&mut self, pitch: u8) {
        if let Some(voice) = self
            .voices
            .iter_mut()
            .filter(|v| v.active && v.held && v.pitch == pitch)
            .min_by_key(|v| v.age)
        {
            voice.release();
        }
    }
}

impl AudioInstrument for PolySynth {
    fn name(&self) -> &str {
        self.kind.label()
    }

    fn queue_note_on(&mut self, pitch: u8, velocity: u8, _channel: u8, sample_offset: u32) {
        self.pending_events.push(QueuedEvent { pitch, velocity, offset: sample_offset, note_on: true });
    }

    fn queue_note_off(&mut self, pitch: u8, velocity: u8, _channel: u8, sample_offset: u32) {
        self.pending_events.push(QueuedEvent { pitch, velocity, offset: sample_offset, note_on: false });
    }

    fn all_notes_off(&mut self) {
        self.pending_events.clear();
        for voice in &mut self.voices {
            voice.release();
        }
    }

    fn process(&mut self, num_frames: usize) -> (&[f32], &[f32]) {
        if self.output_left.len() < num_frames {
            self.output_left.resize(num_frames, 0.0);
            self.output_right.resize(num_frames, 0.0);
        }
        self.output_left[..num_frames].fill(0.0);
        self.output_right[..num_frames].fill(0.0);

        // Note-offs sort before note-ons at the same offset so a repeated pitch retriggers
        self.pending_events.sort_by_key(|e| (e.offset, e.note_on));

        let sample_rate = self.sample_rate as f64;
        let mut next_event = 0;
        for frame_idx in 0..num_frames {
            while let Some(&event) = self.pending_events.get(next_event) {
                if event.offset as usize > frame_idx {
                    break;
                }
                next_event += 1;
                if event.note_on {
                    self.note_on(event.pitch, event.velocity);
                } else {
                    self.note_off(event.pitch);
                }
            }

            let mut mix = 0.0;
            for voice in &mut self.voices {
                mix += voice.tick(self.waveform, &self.envelope, sample_rate);
            }
            self.output_left[frame_idx] = mix as f32;
            self.output_right[frame_idx] = mix as f32;
        }

        self.pending_events.drain(..next_event);
        for event in &mut self.pending_events {
            event.offset -= num_frames as u32;
        }

        (&self.output_left[..num_frames], &self.output_right[..num_frames])
    }

    fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn peak(buffer: &[f32]) -> f32 {
        buffer.iter().fold(0.0f32, |m, s| m.max(s.abs()))
    }

    #[test]
    fn test_frequency() {
        assert!((midi_to_hz(69) - 440.0).abs() < 1e-9);
        assert!((midi_to_hz(81) - 880.0).abs() < 1e-9);
        assert!((midi_to_hz(60) - 261.6256).abs() < 1e-3);
    }

    #[test]
    fn test_instrument_names() {
        assert_eq!(InstrumentKind::from_name("Marimba"), Some(InstrumentKind::Marimba));
        assert_eq!(InstrumentKind::from_name("banjo"), None);
        assert_eq!(InstrumentKind::Guitar.waveform(), Waveform::FmSquare);
        assert_eq!(InstrumentKind::Piano.envelope().release, 1.0);
    }

    #[test]
    fn test_note_sounds_and_releases() {
        let mut synth = PolySynth::new(InstrumentKind::Synth, 1000.0);
        synth.queue_note_on(69, 127, 0, 10);
        let (left, right) = synth.process(200);
        assert_eq!(left[..10].iter().copied().fold(0.0f32, f32::max), 0.0);
        assert!(peak(left) > 0.01);
        assert_eq!(left, right);
        assert_eq!(synth.held_notes(), vec![69]);

        synth.queue_note_off(69, 0, 0, 0);
        synth.process(500);
        assert!(synth.held_notes().is_empty());
        assert_eq!(synth.active_voices(), 1);

        // 1 s release at 1 kHz
        synth.process(1000);
        assert_eq!(synth.active_voices(), 0);
        assert_eq!(peak(synth.process(100).0), 0.0);
    }

    #[test]
    fn test_events_carry_across_blocks() {
        let mut synth = PolySynth::new(InstrumentKind::Piano, 1000.0);
        synth.queue_note_on(60, 100, 0, 150);
        synth.process(100);
        assert_eq!(synth.active_voices(), 0);
        synth.process(100);
        assert_eq!(synth.active_voices(), 1);
    }

    #[test]
    fn test_marimba_decays_without_note_off() {
        let mut synth = PolySynth::new(InstrumentKind::Marimba, 1000.0);
        synth.queue_note_on(72, 127, 0, 0);
        synth.process(200);
        assert_eq!(synth.active_voices(), 1);
        synth.process(200);
        assert_eq!(synth.active_voices(), 0);
    }

    #[test]
    fn test_retrigger_same_pitch() {
        let mut synth = PolySynth::new(InstrumentKind::Piano, 1000.0);
        synth.queue_note_on(64, 100, 0, 0);
        synth.queue_note_off(64, 0, 0, 50);
        synth.queue_note_on(64, 100, 0, 50);
        synth.process(100);
        assert_eq!(synth.held_notes(), vec![64]);
        assert_eq!(synth.active_voices(), 2);
    }

    #[test]
    fn test_all_notes_off() {
        let mut synth = PolySynth::new(InstrumentKind::Guitar, 1000.0);
        for pitch in [60, 64, 67] {
            synth.queue_note_on(pitch, 90, 0, 0);
        }
        synth.queue_note_on(72, 90, 0, 500);
        synth.process(50);
        assert_eq!(synth.held_notes(), vec![60, 64, 67]);

        synth.all_notes_off();
        synth.process(1000);
        assert_eq!(synth.active_voices(), 0);
    }

    #[test]
    fn test_voice_stealing() {
        let mut synth = PolySynth::new(InstrumentKind::Synth, 1000.0);
        for i in 0..=MAX_VOICES as u8 {
            synth.queue_note_on(30 + i, 100, 0, 0);
        }
        synth.process(10);
        assert_eq!(synth.active_voices(), MAX_VOICES);
        assert!(!synth.held_notes().contains(&30));
    }
}
