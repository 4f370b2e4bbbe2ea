//! Scale explorer with directional playback

use egui::{RichText, Ui};
use musejourney_core::theory::{self, Scale, ScaleType};
use musejourney_core::NOTE_NAMES;
use musejourney_services::ScaleDirection;

use super::keyboard::{PianoKeyboard, range_around};
use super::{PlayRequest, ToolAction};

const SCALE_OCTAVE: i8 = 4;

pub struct ScaleVisualizerPanel {
    tonic: String,
    scale_type: ScaleType,
    scale: Option<Scale>,
    keyboard: PianoKeyboard,
}

impl ScaleVisualizerPanel {
    pub fn new() -> Self {
        let mut panel = Self {
            tonic: "C".to_string(),
            scale_type: ScaleType::Major,
            scale: None,
            keyboard: PianoKeyboard::new(48..=72),
        };
        panel.resolve();
        panel
    }

    fn resolve(&mut self) {
        self.scale = theory::scale_info(&format!("{} {}", self.tonic, self.scale_type.name()));
    }

    pub fn ui(&mut self, ui: &mut Ui, show_keyboard: bool) -> ToolAction {
        let mut action = ToolAction::None;

        ui.heading("Scale");
        ui.horizontal(|ui| {
            let mut changed = false;
            egui::ComboBox::from_id_salt("scale_tonic")
                .selected_text(self.tonic.as_str())
                .width(60.0)
                .show_ui(ui, |ui| {
                    for name in NOTE_NAMES {
                        changed |= ui.selectable_value(&mut self.tonic, name.to_string(), name).changed();
                    }
                });
            egui::ComboBox::from_id_salt("scale_type")
                .selected_text(self.scale_type.name())
                .width(140.0)
                .show_ui(ui, |ui| {
                    for ty in ScaleType::ALL {
                        changed |= ui.selectable_value(&mut self.scale_type, ty, ty.name()).changed();
                    }
                });
            if changed {
                self.resolve();
            }
        });

        let Some(scale) = &self.scale else {
            ui.label("Scale unavailable");
            return action;
        };
        let midi = scale.midi_notes(SCALE_OCTAVE);

        ui.label(RichText::new(&scale.name).size(20.0).strong());
        ui.label(format!("Notes: {}", scale.note_names().join(" ")));
        ui.label(format!("Intervals: {}", scale.interval_names().join(", ")));

        ui.horizontal(|ui| {
            for direction in ScaleDirection::ALL {
                if ui.button(format!("\u{25B6} {}", direction.label())).clicked() {
                    action = ToolAction::Play(PlayRequest::Scale(midi.clone(), direction));
                }
            }
        });

        if show_keyboard {
            ui.add_space(8.0);
            self.keyboard.set_range(range_around(&midi));
            let key_action: ToolAction = self.keyboard.ui(ui, &midi, &[]).into();
            if key_action != ToolAction::None {
                action = key_action;
            }
        }

        action
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolves_selection() {
        let mut panel = ScaleVisualizerPanel::new();
        assert_eq!(panel.scale.as_ref().map(|s| s.note_names().len()), Some(7));

        panel.tonic = "A".to_string();
        panel.scale_type = ScaleType::from_name("minor").unwrap();
        panel.resolve();
        let scale = panel.scale.unwrap();
        assert_eq!(scale.midi_notes(SCALE_OCTAVE).first(), Some(&69));
    }
}
