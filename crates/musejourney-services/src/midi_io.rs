//! MIDI device access through midir
//!
//! Input ports deliver decoded note events to callbacks or a channel.
//! Output ports play single notes with a note-off scheduled on a timer
//! thread; the returned [`NoteOffHandle`] can call the note-off off.

use std::sync::atomic::{AtomicU8, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, bounded, unbounded};
use midir::{MidiInput, MidiInputConnection, MidiOutput, MidiOutputConnection};
use musejourney_core::{MidiNoteEvent, encode_note_off, encode_note_on, parse_midi_message};
use thiserror::Error;
use tracing::{debug, info, warn};

const CLIENT_NAME: &str = "musejourney";

#[derive(Debug, Error)]
pub enum MidiError {
    #[error("Failed to initialize MIDI: {0}")]
    InitFailed(String),
    #[error("Port not found: {0}")]
    PortNotFound(String),
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),
    #[error("Send failed: {0}")]
    SendFailed(String),
}

/// A discovered MIDI port
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MidiPortInfo {
    pub index: usize,
    pub name: String,
}

/// Outcome of asking the OS for MIDI; never an error
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MidiAccessState {
    pub supported: bool,
    pub inputs: Vec<MidiPortInfo>,
    pub outputs: Vec<MidiPortInfo>,
    /// First input, if any
    pub active_input: Option<MidiPortInfo>,
    /// First output, if any
    pub active_output: Option<MidiPortInfo>,
    pub error: Option<String>,
}

pub fn list_input_ports() -> Result<Vec<MidiPortInfo>, MidiError> {
    let midi_in = MidiInput::new(CLIENT_NAME).map_err(|e| MidiError::InitFailed(e.to_string()))?;
    Ok(midi_in
        .ports()
        .iter()
        .enumerate()
        .filter_map(|(index, port)| midi_in.port_name(port).ok().map(|name| MidiPortInfo { index, name }))
        .collect())
}

pub fn list_output_ports() -> Result<Vec<MidiPortInfo>, MidiError> {
    let midi_out = MidiOutput::new(CLIENT_NAME).map_err(|e| MidiError::InitFailed(e.to_string()))?;
    Ok(midi_out
        .ports()
        .iter()
        .enumerate()
        .filter_map(|(index, port)| midi_out.port_name(port).ok().map(|name| MidiPortInfo { index, name }))
        .collect())
}

/// Enumerate ports; an unavailable MIDI subsystem reports `supported: false`
pub fn request_midi_access() -> MidiAccessState {
    let state = access_state(list_input_ports(), list_output_ports());
    match &state.error {
        Some(e) => warn!(error = %e, "MIDI unavailable"),
        None => info!(inputs = state.inputs.len(), outputs = state.outputs.len(), "MIDI access granted"),
    }
    state
}

fn access_state(
    inputs: Result<Vec<MidiPortInfo>, MidiError>,
    outputs: Result<Vec<MidiPortInfo>, MidiError>,
) -> MidiAccessState {
    match (inputs, outputs) {
        (Ok(inputs), Ok(outputs)) => MidiAccessState {
            supported: true,
            active_input: inputs.first().cloned(),
            active_output: outputs.first().cloned(),
            inputs,
            outputs,
            error: None,
        },
        (Err(e), _) | (_, Err(e)) => MidiAccessState {
            error: Some(e.to_string()),
            ..MidiAccessState::default()
        },
    }
}

/// First port whose name contains `pattern`, ignoring case; empty matches any
fn find_port_index<'a>(names: impl IntoIterator<Item = &'a str>, pattern: &str) -> Option<usize> {
    let pattern = pattern.trim().to_lowercase();
    names
        .into_iter()
        .position(|name| pattern.is_empty() || name.to_lowercase().contains(&pattern))
}

/// Route raw bytes to the matching callback; false for anything but notes
fn dispatch<On, Off>(data: &[u8], on_note_on: &mut On, on_note_off: &mut Off) -> bool
where
    On: FnMut(MidiNoteEvent),
    Off: FnMut(MidiNoteEvent),
{
    let Some(event) = parse_midi_message(data) else {
        return false;
    };
    if event.is_note_on() {
        on_note_on(event);
    } else {
        on_note_off(event);
    }
    true
}

/// Open input connection; dropping it closes the port
pub struct MidiSubscription {
    connection: Option<MidiInputConnection<()>>,
    port_name: String,
    messages_received: Arc<AtomicU64>,
}

impl MidiSubscription {
    pub fn port_name(&self) -> &str {
        &self.port_name
    }

    pub fn is_active(&self) -> bool {
        self.connection.is_some()
    }

    /// Note messages delivered so far
    pub fn messages_received(&self) -> u64 {
        self.messages_received.load(Ordering::Relaxed)
    }

    pub fn unsubscribe(&mut self) {
        if let Some(conn) = self.connection.take() {
            conn.close();
            info!("Closed MIDI input: {}", self.port_name);
        }
    }
}

impl Drop for MidiSubscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

/// Subscribe to note events from the first input matching `port_pattern`
pub fn listen_to_midi_input<On, Off>(
    port_pattern: &str,
    mut on_note_on: On,
    mut on_note_off: Off,
) -> Result<MidiSubscription, MidiError>
where
    On: FnMut(MidiNoteEvent) + Send + 'static,
    Off: FnMut(MidiNoteEvent) + Send + 'static,
{
    let midi_in = MidiInput::new(CLIENT_NAME).map_err(|e| MidiError::InitFailed(e.to_string()))?;

    let ports = midi_in.ports();
    let names: Vec<String> = ports
        .iter()
        .map(|p| midi_in.port_name(p).unwrap_or_default())
        .collect();
    let index = find_port_index(names.iter().map(String::as_str), port_pattern)
        .ok_or_else(|| MidiError::PortNotFound(port_pattern.to_string()))?;
    let (Some(port), Some(port_name)) = (ports.get(index), names.get(index).cloned()) else {
        return Err(MidiError::PortNotFound(port_pattern.to_string()));
    };

    let messages_received = Arc::new(AtomicU64::new(0));
    let counter = Arc::clone(&messages_received);

    let connection = midi_in
        .connect(
            port,
            "musejourney-input",
            move |_timestamp_us, data, _| {
                if dispatch(data, &mut on_note_on, &mut on_note_off) {
                    counter.fetch_add(1, Ordering::Relaxed);
                }
            },
            (),
        )
        .map_err(|e| MidiError::ConnectionFailed(e.to_string()))?;

    info!("Opened MIDI input: {}", port_name);

    Ok(MidiSubscription {
        connection: Some(connection),
        port_name,
        messages_received,
    })
}

/// Subscribe and receive every note event on a channel
pub fn listen_to_midi_channel(port_pattern: &str) -> Result<(MidiSubscription, Receiver<MidiNoteEvent>), MidiError> {
    let (tx, rx) = unbounded();
    let off_tx = tx.clone();
    let subscription = listen_to_midi_input(
        port_pattern,
        move |event| {
            let _ = tx.send(event);
        },
        move |event| {
            let _ = off_tx.send(event);
        },
    )?;
    Ok((subscription, rx))
}

const NOTE_OFF_PENDING: u8 = 0;
const NOTE_OFF_SENT: u8 = 1;
const NOTE_OFF_CANCELLED: u8 = 2;

/// Single decision point between the timer and the handle; whichever
/// leaves `PENDING` first wins
#[derive(Debug, Clone, Default)]
struct NoteOffState(Arc<AtomicU8>);

impl NoteOffState {
    fn transition(&self, to: u8) -> bool {
        self.0
            .compare_exchange(NOTE_OFF_PENDING, to, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }

    /// Claim the right to send the note-off
    fn try_fire(&self) -> bool {
        self.transition(NOTE_OFF_SENT)
    }

    fn try_cancel(&self) -> bool {
        self.transition(NOTE_OFF_CANCELLED)
    }

    fn is_pending(&self) -> bool {
        self.0.load(Ordering::SeqCst) == NOTE_OFF_PENDING
    }
}

/// Pending note-off for a note sent with [`MidiOutputPort::send_midi_note`]
#[derive(Debug)]
pub struct NoteOffHandle {
    cancel_tx: Sender<()>,
    state: NoteOffState,
}

impl NoteOffHandle {
    /// Suppress the note-off; false if it was already sent
    pub fn cancel(&self) -> bool {
        if !self.state.try_cancel() {
            return false;
        }
        // Wake the timer thread early
        let _ = self.cancel_tx.try_send(());
        true
    }

    pub fn is_pending(&self) -> bool {
        self.state.is_pending()
    }
}

type SharedConnection = Arc<Mutex<Option<MidiOutputConnection>>>;

fn send_on(connection: &SharedConnection, data: &[u8]) -> Result<(), MidiError> {
    let mut guard = connection
        .lock()
        .map_err(|_| MidiError::SendFailed("Connection lock poisoned".to_string()))?;
    let Some(conn) = guard.as_mut() else {
        return Err(MidiError::SendFailed("Connection closed".to_string()));
    };
    conn.send(data).map_err(|e| MidiError::SendFailed(e.to_string()))
}

/// Open output connection
pub struct MidiOutputPort {
    connection: SharedConnection,
    port_name: String,
}

impl MidiOutputPort {
    /// Connect to the first output whose name matches `port_pattern`
    pub fn open(port_pattern: &str) -> Result<Self, MidiError> {
        let midi_out = MidiOutput::new(CLIENT_NAME).map_err(|e| MidiError::InitFailed(e.to_string()))?;

        let ports = midi_out.ports();
        let names: Vec<String> = ports
            .iter()
            .map(|p| midi_out.port_name(p).unwrap_or_default())
            .collect();
        let index = find_port_index(names.iter().map(String::as_str), port_pattern)
            .ok_or_else(|| MidiError::PortNotFound(port_pattern.to_string()))?;
        let (Some(port), Some(port_name)) = (ports.get(index), names.get(index).cloned()) else {
            return Err(MidiError::PortNotFound(port_pattern.to_string()));
        };

        let connection = midi_out
            .connect(port, "musejourney-output")
            .map_err(|e| MidiError::ConnectionFailed(e.to_string()))?;

        info!("Opened MIDI output: {}", port_name);

        Ok(Self {
            connection: Arc::new(Mutex::new(Some(connection))),
            port_name,
        })
    }

    pub fn port_name(&self) -> &str {
        &self.port_name
    }

    pub fn send_raw(&self, data: &[u8]) -> Result<(), MidiError> {
        send_on(&self.connection, data)
    }

    /// Note-on now, note-off after `duration` unless the handle cancels it
    pub fn send_midi_note(
        &self,
        note: u8,
        velocity: f32,
        channel: u8,
        duration: Duration,
    ) -> Result<NoteOffHandle, MidiError> {
        self.send_raw(&encode_note_on(channel, note, velocity))?;

        let (cancel_tx, cancel_rx) = bounded(1);
        // Keeps the channel open so dropping the handle does not skip the note-off
        let keep_open = cancel_tx.clone();
        let state = NoteOffState::default();
        let timer_state = state.clone();
        let connection = Arc::clone(&self.connection);

        thread::spawn(move || {
            let _keep_open = keep_open;
            let timed_out = matches!(cancel_rx.recv_timeout(duration), Err(RecvTimeoutError::Timeout));
            if timed_out && timer_state.try_fire() {
                if let Err(e) = send_on(&connection, &encode_note_off(channel, note)) {
                    warn!(note, error = %e, "MIDI note-off failed");
                }
            } else {
                debug!(note, "MIDI note-off cancelled");
            }
        });

        Ok(NoteOffHandle { cancel_tx, state })
    }

    pub fn close(&self) {
        let Ok(mut guard) = self.connection.lock() else {
            return;
        };
        if let Some(conn) = guard.take() {
            conn.close();
            info!("Closed MIDI output: {}", self.port_name);
        }
    }
}

impl Drop for MidiOutputPort {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn port(index: usize, name: &str) -> MidiPortInfo {
        MidiPortInfo { index, name: name.to_string() }
    }

    fn note_off_handle() -> (NoteOffHandle, NoteOffState, Receiver<()>) {
        let (cancel_tx, cancel_rx) = bounded(1);
        let state = NoteOffState::default();
        let handle = NoteOffHandle { cancel_tx, state: state.clone() };
        (handle, state, cancel_rx)
    }

    #[test]
    fn test_cancel_after_note_off_sent_reports_false() {
        let (handle, timer, cancel_rx) = note_off_handle();
        assert!(handle.is_pending());
        assert!(timer.try_fire());

        assert!(!handle.is_pending());
        assert!(!handle.cancel());
        assert!(cancel_rx.try_recv().is_err());
    }

    #[test]
    fn test_cancel_before_timer_suppresses_note_off() {
        let (handle, timer, cancel_rx) = note_off_handle();
        assert!(handle.cancel());
        assert!(cancel_rx.try_recv().is_ok());

        assert!(!timer.try_fire());
        assert!(!handle.cancel());
        assert!(!handle.is_pending());
    }

    #[test]
    fn test_access_state_picks_first_ports() {
        let state = access_state(
            Ok(vec![port(0, "Keystation 49"), port(1, "Launchkey")]),
            Ok(vec![port(0, "Synth Out")]),
        );
        assert!(state.supported);
        assert_eq!(state.inputs.len(), 2);
        assert_eq!(state.active_input, Some(port(0, "Keystation 49")));
        assert_eq!(state.active_output, Some(port(0, "Synth Out")));
        assert!(state.error.is_none());
    }

    #[test]
    fn test_access_state_without_devices() {
        let state = access_state(Ok(vec![]), Ok(vec![]));
        assert!(state.supported);
        assert!(state.active_input.is_none());
        assert!(state.active_output.is_none());
    }

    #[test]
    fn test_access_state_unsupported() {
        let state = access_state(Err(MidiError::InitFailed("no backend".to_string())), Ok(vec![port(0, "Out")]));
        assert!(!state.supported);
        assert!(state.inputs.is_empty());
        assert!(state.outputs.is_empty());
        assert_eq!(state.error.as_deref(), Some("Failed to initialize MIDI: no backend"));
    }

    #[test]
    fn test_find_port_index() {
        let names = ["Midi Through Port-0", "Arturia KeyStep 32", "Launchkey Mini"];
        assert_eq!(find_port_index(names, "keystep"), Some(1));
        assert_eq!(find_port_index(names, "LAUNCHKEY"), Some(2));
        assert_eq!(find_port_index(names, ""), Some(0));
        assert_eq!(find_port_index(names, "oxygen"), None);
        assert_eq!(find_port_index([], ""), None);
    }

    #[test]
    fn test_dispatch_routes_note_events() {
        let mut ons = Vec::new();
        let mut offs = Vec::new();
        let mut on = |e: MidiNoteEvent| ons.push(e.midi);
        let mut off = |e: MidiNoteEvent| offs.push(e.midi);

        assert!(dispatch(&[0x90, 60, 100], &mut on, &mut off));
        assert!(dispatch(&[0x80, 60, 0], &mut on, &mut off));
        assert!(dispatch(&[0x91, 64, 0], &mut on, &mut off));
        assert!(!dispatch(&[0xB0, 7, 127], &mut on, &mut off));
        assert!(!dispatch(&[0x90, 60], &mut on, &mut off));

        assert_eq!(ons, vec![60]);
        assert_eq!(offs, vec![60, 64]);
    }
}
