//! Audio and MIDI status bar

use egui::{Color32, RichText, Ui};
use musejourney_services::{EngineSnapshot, InstrumentKind, MidiPortInfo};

/// Actions returned from the status bar
#[derive(Debug, Clone, PartialEq)]
pub enum StatusAction {
    None,
    RetryAudio,
    SelectInstrument(InstrumentKind),
    SetVolume(f32),
    SetTone(f32),
    StopAll,
    /// Connect the input whose name contains this text
    ConnectMidi(String),
    DisconnectMidi,
    RescanMidi,
}

/// What the MIDI side currently looks like
pub struct MidiStatus<'a> {
    pub inputs: &'a [MidiPortInfo],
    pub connected: Option<&'a str>,
    pub error: Option<&'a str>,
}

pub struct StatusPanel {
    volume: f32,
    tone_hz: f32,
}

impl StatusPanel {
    pub fn new(volume: f32, tone_hz: f32) -> Self {
        Self { volume, tone_hz }
    }

    /// Red banner offering a retry when no audio device could be opened
    pub fn banner_ui(&mut self, ui: &mut Ui, engine: &EngineSnapshot) -> StatusAction {
        let mut action = StatusAction::None;
        if engine.initialized {
            return action;
        }
        ui.horizontal(|ui| {
            ui.label(
                RichText::new("\u{26A0} Audio output unavailable. Playback is disabled.")
                    .color(Color32::from_rgb(255, 120, 120))
                    .strong(),
            );
            if ui.button("Retry").clicked() {
                action = StatusAction::RetryAudio;
            }
        });
        action
    }

    pub fn ui(&mut self, ui: &mut Ui, engine: &EngineSnapshot, midi: &MidiStatus<'_>) -> StatusAction {
        let mut action = StatusAction::None;

        ui.horizontal(|ui| {
            ui.spacing_mut().item_spacing.x = 8.0;

            ui.label("Instrument:");
            let mut instrument = engine.instrument;
            egui::ComboBox::from_id_salt("instrument_combo")
                .selected_text(instrument.label())
                .show_ui(ui, |ui| {
                    for kind in InstrumentKind::ALL {
                        ui.selectable_value(&mut instrument, kind, kind.label());
                    }
                });
            if instrument != engine.instrument {
                action = StatusAction::SelectInstrument(instrument);
            }

            ui.label("Volume:");
            let slider = ui.add(egui::Slider::new(&mut self.volume, 0.0..=1.0).show_value(false));
            if slider.changed() {
                action = StatusAction::SetVolume(self.volume);
            }

            ui.label("Tone:");
            let tone = ui.add(
                egui::Slider::new(&mut self.tone_hz, 200.0..=20000.0)
                    .logarithmic(true)
                    .show_value(false),
            );
            if tone.changed() {
                action = StatusAction::SetTone(self.tone_hz);
            }

            if ui.button("\u{23F9}").on_hover_text("Stop all sounds").clicked() {
                action = StatusAction::StopAll;
            }

            ui.separator();

            ui.label("MIDI:");
            match (midi.connected, midi.error) {
                (Some(port), _) => {
                    ui.label(RichText::new(port).color(Color32::from_rgb(110, 200, 120)));
                    if ui.small_button("Disconnect").clicked() {
                        action = StatusAction::DisconnectMidi;
                    }
                }
                (None, Some(error)) => {
                    ui.label(RichText::new("unavailable").color(Color32::from_gray(150)))
                        .on_hover_text(error);
                }
                (None, None) if midi.inputs.is_empty() => {
                    ui.label(RichText::new("no inputs").color(Color32::from_gray(150)));
                }
                (None, None) => {
                    egui::ComboBox::from_id_salt("midi_input")
                        .selected_text("Connect input")
                        .show_ui(ui, |ui| {
                            for port in midi.inputs {
                                if ui.selectable_label(false, &port.name).clicked() {
                                    action = StatusAction::ConnectMidi(port.name.clone());
                                }
                            }
                        });
                }
            }
            if ui.small_button("\u{21BB}").on_hover_text("Rescan MIDI ports").clicked() {
                action = StatusAction::RescanMidi;
            }

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if engine.initialized {
                    ui.label(format!("{} Hz", engine.sample_rate));
                    if engine.active_voices > 0 {
                        ui.label(format!("{} voices", engine.active_voices));
                    }
                } else {
                    ui.label(RichText::new("No audio").color(Color32::from_rgb(220, 90, 90)));
                }
            });
        });

        action
    }
}
