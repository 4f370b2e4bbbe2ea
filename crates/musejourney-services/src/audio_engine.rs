//! Audio engine for note, chord and scale playback
//!
//! The engine owns one [`PolySynth`] per [`InstrumentKind`] and a schedule of
//! notes measured in rendered samples. Every `play_*` call returns a
//! [`PlaybackHandle`] that can cancel whatever that call still has pending.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use musejourney_core::PlaybackEvent;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::audio_io::{AudioOutputError, RealtimeOutputStream};
use crate::effects::{DEFAULT_TONE_HZ, LowPassEffect};
use crate::instruments::{AudioInstrument, InstrumentKind, PolySynth};

pub const DEFAULT_SAMPLE_RATE: u32 = 44100;
pub const DEFAULT_VELOCITY: f32 = 0.7;
pub const DEFAULT_VOLUME: f32 = 0.8;
/// Chord length when a progression gives none
const DEFAULT_CHORD_SECONDS: f32 = 1.0;

#[derive(Debug, Error)]
pub enum AudioEngineError {
    #[error("Audio output error: {0}")]
    Output(#[from] AudioOutputError),
    #[error("Engine already running")]
    AlreadyRunning,
    #[error("Engine not running")]
    NotRunning,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScaleDirection {
    #[default]
    Up,
    Down,
    Both,
}

impl ScaleDirection {
    pub const ALL: [ScaleDirection; 3] = [Self::Up, Self::Down, Self::Both];

    pub fn label(self) -> &'static str {
        match self {
            Self::Up => "Ascending",
            Self::Down => "Descending",
            Self::Both => "Up and down",
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct ScheduledNote {
    handle: u64,
    instrument: InstrumentKind,
    pitch: u8,
    velocity: u8,
    /// Absolute sample positions on the engine clock
    on_at: u64,
    off_at: u64,
    started: bool,
}

/// Audio engine state shared between UI and audio thread
pub struct EngineState {
    initialized: AtomicBool,
    /// Samples rendered since the engine was created
    clock: AtomicU64,
    sample_rate: AtomicU32,
    /// f32 bits
    master_volume: AtomicU32,
    active_instrument: Mutex<InstrumentKind>,
    schedule: Mutex<Vec<ScheduledNote>>,
    instruments: Mutex<HashMap<InstrumentKind, PolySynth>>,
    master_effects: Mutex<LowPassEffect>,
    next_handle: AtomicU64,
}

impl EngineState {
    fn new(sample_rate: u32) -> Self {
        let instruments = InstrumentKind::ALL
            .into_iter()
            .map(|kind| (kind, PolySynth::new(kind, sample_rate as f32)))
            .collect();
        Self {
            initialized: AtomicBool::new(false),
            clock: AtomicU64::new(0),
            sample_rate: AtomicU32::new(sample_rate),
            master_volume: AtomicU32::new(DEFAULT_VOLUME.to_bits()),
            active_instrument: Mutex::new(InstrumentKind::default()),
            schedule: Mutex::new(Vec::new()),
            instruments: Mutex::new(instruments),
            master_effects: Mutex::new(LowPassEffect::new(DEFAULT_TONE_HZ, sample_rate as f32)),
            next_handle: AtomicU64::new(1),
        }
    }

    fn set_sample_rate(&self, sample_rate: u32) {
        self.sample_rate.store(sample_rate, Ordering::SeqCst);
        if let Ok(mut instruments) = self.instruments.lock() {
            for synth in instruments.values_mut() {
                synth.set_sample_rate(sample_rate as f32);
            }
        }
        if let Ok(mut effects) = self.master_effects.lock() {
            effects.set_sample_rate(sample_rate as f32);
        }
    }

    fn master_volume(&self) -> f32 {
        f32::from_bits(self.master_volume.load(Ordering::SeqCst))
    }

    fn active_instrument(&self) -> InstrumentKind {
        self.active_instrument.lock().map(|k| *k).unwrap_or_default()
    }

    fn cancel(&self, handle: u64) {
        let Ok(mut schedule) = self.schedule.lock() else {
            return;
        };
        // Sounding notes get released on the next block, the rest are dropped
        schedule.retain_mut(|note| {
            if note.handle != handle {
                return true;
            }
            if note.started {
                note.off_at = 0;
            }
            note.started
        });
    }

    fn is_pending(&self, handle: u64) -> bool {
        self.schedule
            .lock()
            .map(|s| s.iter().any(|n| n.handle == handle))
            .unwrap_or(false)
    }
}

/// Point-in-time view of the engine for display
#[derive(Debug, Clone, PartialEq)]
pub struct EngineSnapshot {
    pub initialized: bool,
    pub instrument: InstrumentKind,
    pub master_volume: f32,
    pub tone_hz: f32,
    pub sample_rate: u32,
    pub active_voices: usize,
    pub pending_notes: usize,
}

/// Cancels the notes scheduled by one `play_*` call
#[derive(Clone)]
pub struct PlaybackHandle {
    id: u64,
    state: Arc<EngineState>,
}

impl PlaybackHandle {
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Drop pending notes and release the ones already sounding
    pub fn cancel(&self) {
        self.state.cancel(self.id);
        debug!(handle = self.id, "Cancelled playback");
    }

    /// Every note of this call has been released
    pub fn is_finished(&self) -> bool {
        !self.state.is_pending(self.id)
    }
}

impl fmt::Debug for PlaybackHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlaybackHandle").field("id", &self.id).finish()
    }
}

/// Playback context, created once by the application
pub struct AudioEngine {
    state: Arc<EngineState>,
    stream: Option<RealtimeOutputStream>,
}

impl Default for AudioEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioEngine {
    /// Engine without output; call [`AudioEngine::init`] before playing
    pub fn new() -> Self {
        Self {
            state: Arc::new(EngineState::new(DEFAULT_SAMPLE_RATE)),
            stream: None,
        }
    }

    /// Initialized engine rendered on demand with [`AudioEngine::render`]
    pub fn offline(sample_rate: u32) -> Self {
        let engine = Self {
            state: Arc::new(EngineState::new(sample_rate)),
            stream: None,
        };
        engine.state.initialized.store(true, Ordering::SeqCst);
        engine
    }

    /// Open the audio output once; later calls return true immediately
    pub fn init(&mut self) -> bool {
        if self.is_initialized() {
            return true;
        }
        match self.start() {
            Ok(()) => true,
            Err(e) => {
                error!(error = %e, "Audio engine failed to start");
                false
            }
        }
    }

    /// Start the output stream
    pub fn start(&mut self) -> Result<(), AudioEngineError> {
        if self.stream.is_some() {
            return Err(AudioEngineError::AlreadyRunning);
        }

        let state = self.state.clone();
        let stream = RealtimeOutputStream::start(move |buffer, _sample_rate, channels| {
            Self::render_audio(&state, buffer, channels);
        })?;

        self.state.set_sample_rate(stream.sample_rate());
        self.stream = Some(stream);
        self.state.initialized.store(true, Ordering::SeqCst);
        info!(sample_rate = self.sample_rate(), "Audio engine started");
        Ok(())
    }

    /// Stop the output stream
    pub fn stop(&mut self) -> Result<(), AudioEngineError> {
        let stream = self.stream.take().ok_or(AudioEngineError::NotRunning)?;
        stream.stop();
        self.state.initialized.store(false, Ordering::SeqCst);
        info!("Audio engine stopped");
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.state.initialized.load(Ordering::SeqCst)
    }

    pub fn sample_rate(&self) -> u32 {
        self.state.sample_rate.load(Ordering::SeqCst)
    }

    pub fn select_instrument(&self, kind: InstrumentKind) {
        if let Ok(mut active) = self.state.active_instrument.lock() {
            *active = kind;
            debug!(instrument = kind.name(), "Selected instrument");
        }
    }

    pub fn active_instrument(&self) -> InstrumentKind {
        self.state.active_instrument()
    }

    /// Clamped to 0..=1
    pub fn set_master_volume(&self, volume: f32) {
        let volume = if volume.is_nan() { 0.0 } else { volume.clamp(0.0, 1.0) };
        self.state.master_volume.store(volume.to_bits(), Ordering::SeqCst);
    }

    pub fn master_volume(&self) -> f32 {
        self.state.master_volume()
    }

    /// Cutoff of the master tone filter
    pub fn set_tone(&self, cutoff_hz: f32) {
        self.with_master_effects(|filter| filter.set_cutoff(cutoff_hz));
    }

    pub fn state(&self) -> EngineSnapshot {
        let active_voices = self
            .state
            .instruments
            .lock()
            .map(|i| i.values().map(|s| s.active_voices()).sum())
            .unwrap_or(0);
        let pending_notes = self.state.schedule.lock().map(|s| s.len()).unwrap_or(0);
        EngineSnapshot {
            initialized: self.is_initialized(),
            instrument: self.active_instrument(),
            master_volume: self.master_volume(),
            tone_hz: self.with_master_effects(|f| f.cutoff()).unwrap_or(DEFAULT_TONE_HZ),
            sample_rate: self.sample_rate(),
            active_voices,
            pending_notes,
        }
    }

    /// Access the master tone filter
    pub fn with_master_effects<F, R>(&self, f: F) -> Option<R>
    where
        F: FnOnce(&mut LowPassEffect) -> R,
    {
        self.state.master_effects.lock().ok().map(|mut e| f(&mut e))
    }

    pub fn play_note(&self, note: u8, duration: f32, start_offset: f32, velocity: f32) -> Option<PlaybackHandle> {
        self.schedule([(note, start_offset, duration)], velocity)
    }

    pub fn play_chord(&self, notes: &[u8], duration: f32, start_offset: f32, velocity: f32) -> Option<PlaybackHandle> {
        self.schedule(notes.iter().map(|&n| (n, start_offset, duration)), velocity)
    }

    /// Chords back to back; a missing or non-positive duration lasts one second
    pub fn play_chord_progression(
        &self,
        chords: &[Vec<u8>],
        durations: &[f32],
        start_offset: f32,
        velocity: f32,
    ) -> Option<PlaybackHandle> {
        let mut offset = start_offset;
        let mut notes = Vec::new();
        for (i, chord) in chords.iter().enumerate() {
            let duration = durations
                .get(i)
                .copied()
                .filter(|d| *d > 0.0)
                .unwrap_or(DEFAULT_CHORD_SECONDS);
            notes.extend(chord.iter().map(|&n| (n, offset, duration)));
            offset += duration;
        }
        self.schedule(notes, velocity)
    }

    /// One note per step; the way down skips the repeated top note
    pub fn play_scale(
        &self,
        notes: &[u8],
        duration: f32,
        direction: ScaleDirection,
        velocity: f32,
    ) -> Option<PlaybackHandle> {
        let sequence: Vec<u8> = match direction {
            ScaleDirection::Up => notes.to_vec(),
            ScaleDirection::Down => notes.iter().rev().copied().collect(),
            ScaleDirection::Both => notes.iter().chain(notes.iter().rev().skip(1)).copied().collect(),
        };
        self.schedule(
            sequence
                .into_iter()
                .enumerate()
                .map(|(i, n)| (n, i as f32 * duration, duration)),
            velocity,
        )
    }

    /// Events from an exercise, under one handle
    pub fn play_events(&self, events: &[PlaybackEvent], velocity: f32) -> Option<PlaybackHandle> {
        self.schedule(
            events
                .iter()
                .flat_map(|e| e.notes.iter().map(move |&n| (n, e.offset, e.duration))),
            velocity,
        )
    }

    /// Clear the schedule and release every voice
    pub fn stop_all_sounds(&self) {
        if let Ok(mut schedule) = self.state.schedule.lock() {
            schedule.clear();
        }
        if let Ok(mut instruments) = self.state.instruments.lock() {
            for synth in instruments.values_mut() {
                synth.all_notes_off();
            }
        }
        debug!("Stopped all sounds");
    }

    /// Render mono samples for an engine without an output stream
    pub fn render(&self, num_frames: usize) -> Vec<f32> {
        let mut buffer = vec![0.0; num_frames];
        Self::render_audio(&self.state, &mut buffer, 1);
        buffer
    }

    /// Queue (pitch, offset seconds, duration seconds) on the active instrument
    fn schedule<I>(&self, notes: I, velocity: f32) -> Option<PlaybackHandle>
    where
        I: IntoIterator<Item = (u8, f32, f32)>,
    {
        if !self.is_initialized() {
            warn!("Audio engine not initialized, ignoring playback");
            return None;
        }
        let Ok(mut schedule) = self.state.schedule.lock() else {
            error!("Playback schedule unavailable");
            return None;
        };

        let id = self.state.next_handle.fetch_add(1, Ordering::SeqCst);
        let sample_rate = self.sample_rate() as f32;
        let now = self.state.clock.load(Ordering::SeqCst);
        let instrument = self.active_instrument();
        let velocity = (velocity.clamp(0.0, 1.0) * 127.0).round() as u8;

        let mut count = 0;
        for (pitch, offset, duration) in notes {
            if pitch > 127 {
                warn!(pitch, "Ignoring note outside MIDI range");
                continue;
            }
            let on_at = now + (offset.max(0.0) * sample_rate) as u64;
            let length = ((duration.max(0.0) * sample_rate) as u64).max(1);
            schedule.push(ScheduledNote {
                handle: id,
                instrument,
                pitch,
                velocity,
                on_at,
                off_at: on_at + length,
                started: false,
            });
            count += 1;
        }
        debug!(handle = id, notes = count, instrument = instrument.name(), "Scheduled playback");
        Some(PlaybackHandle { id, state: self.state.clone() })
    }

    /// Render audio into output buffer (called from audio thread)
    fn render_audio(state: &EngineState, buffer: &mut [f32], channels: u16) {
        let channels = channels.max(1) as usize;
        let num_frames = buffer.len() / channels;
        let now = state.clock.load(Ordering::SeqCst);
        let block_end = now + num_frames as u64;

        let Ok(mut instruments) = state.instruments.lock() else {
            buffer.fill(0.0);
            return;
        };

        // Hand notes that start or stop in this block to their instrument
        if let Ok(mut schedule) = state.schedule.lock() {
            schedule.retain_mut(|note| {
                let Some(synth) = instruments.get_mut(&note.instrument) else {
                    return false;
                };
                if !note.started && note.on_at < block_end {
                    synth.queue_note_on(note.pitch, note.velocity, 0, note.on_at.saturating_sub(now) as u32);
                    note.started = true;
                }
                if note.started && note.off_at < block_end {
                    synth.queue_note_off(note.pitch, 0, 0, note.off_at.saturating_sub(now) as u32);
                    return false;
                }
                true
            });
        }

        let mut mix = vec![0.0f32; num_frames];
        for synth in instruments.values_mut() {
            let (left, right) = synth.process(num_frames);
            for (i, sample) in mix.iter_mut().enumerate() {
                let l = left.get(i).copied().unwrap_or(0.0);
                let r = right.get(i).copied().unwrap_or(0.0);
                *sample += (l + r) * 0.5;
            }
        }
        drop(instruments);

        let volume = state.master_volume();
        for sample in mix.iter_mut() {
            *sample *= volume;
        }

        if let Ok(mut effects) = state.master_effects.lock() {
            effects.process(&mut mix);
        }

        for (i, frame) in buffer.chunks_mut(channels).enumerate() {
            frame.fill(mix.get(i).copied().unwrap_or(0.0));
        }
        state.clock.fetch_add(num_frames as u64, Ordering::SeqCst);
    }
}

impl Drop for AudioEngine {
    fn drop(&mut self) {
        if self.stream.is_some() {
            let _ = self.stop();
        }
    }
}
