//! MIDI input connection owned by the app

use crossbeam_channel::Receiver;
use musejourney_core::{ActiveNotes, MidiNoteEvent};
use musejourney_services::{MidiAccessState, MidiSubscription, listen_to_midi_channel, request_midi_access};
use tracing::{info, warn};

use crate::panels::MidiStatus;

/// Apply queued events to `active`; returns how many were applied
fn drain_events(rx: &Receiver<MidiNoteEvent>, active: &mut ActiveNotes) -> usize {
    let mut applied = 0;
    for event in rx.try_iter() {
        active.apply(&event);
        applied += 1;
    }
    applied
}

pub struct MidiState {
    access: MidiAccessState,
    subscription: Option<MidiSubscription>,
    rx: Option<Receiver<MidiNoteEvent>>,
    active: ActiveNotes,
    error: Option<String>,
}

impl MidiState {
    pub fn new() -> Self {
        let access = request_midi_access();
        let error = access.error.clone();
        Self {
            access,
            subscription: None,
            rx: None,
            active: ActiveNotes::new(),
            error,
        }
    }

    pub fn rescan(&mut self) {
        self.access = request_midi_access();
        self.error = self.access.error.clone();
        info!(inputs = self.access.inputs.len(), "Rescanned MIDI ports");
    }

    pub fn connect(&mut self, pattern: &str) {
        self.disconnect();
        match listen_to_midi_channel(pattern) {
            Ok((subscription, rx)) => {
                self.subscription = Some(subscription);
                self.rx = Some(rx);
                self.error = None;
            }
            Err(e) => {
                warn!(pattern, error = %e, "MIDI connect failed");
                self.error = Some(e.to_string());
            }
        }
    }

    pub fn disconnect(&mut self) {
        if let Some(mut subscription) = self.subscription.take() {
            subscription.unsubscribe();
        }
        self.rx = None;
        self.active.clear();
    }

    pub fn is_connected(&self) -> bool {
        self.subscription.as_ref().is_some_and(|s| s.is_active())
    }

    /// Update held notes from the input; true when anything changed
    pub fn poll(&mut self) -> bool {
        match &self.rx {
            Some(rx) => drain_events(rx, &mut self.active) > 0,
            None => false,
        }
    }

    pub fn held(&self) -> Vec<u8> {
        self.active.notes()
    }

    pub fn status(&self) -> MidiStatus<'_> {
        MidiStatus {
            inputs: &self.access.inputs,
            connected: self.subscription.as_ref().map(|s| s.port_name()),
            error: self.error.as_deref(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::unbounded;
    use musejourney_core::parse_midi_message;

    #[test]
    fn test_drain_tracks_held_notes() {
        let (tx, rx) = unbounded();
        let mut active = ActiveNotes::new();
        for bytes in [[0x90, 60, 100], [0x90, 64, 90], [0x80, 60, 0]] {
            tx.send(parse_midi_message(&bytes).unwrap()).unwrap();
        }

        assert_eq!(drain_events(&rx, &mut active), 3);
        assert_eq!(active.notes(), vec![64]);
        assert_eq!(drain_events(&rx, &mut active), 0);
    }

    #[test]
    fn test_chord_in_one_poll_keeps_every_note() {
        let (tx, rx) = unbounded();
        let mut active = ActiveNotes::new();
        for note in [48, 52, 55] {
            tx.send(parse_midi_message(&[0x90, note, 100]).unwrap()).unwrap();
        }

        assert_eq!(drain_events(&rx, &mut active), 3);
        assert_eq!(active.notes(), vec![48, 52, 55]);
    }
}
