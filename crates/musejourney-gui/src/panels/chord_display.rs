//! Chord lookup: notes, intervals, inversions and a keyboard view

use egui::{Color32, RichText, Ui};
use musejourney_core::note_name_to_midi;
use musejourney_core::theory::{self, Chord};

use super::keyboard::{PianoKeyboard, range_around};
use super::{PlayRequest, ToolAction};

const DEFAULT_CHORD: &str = "Cmaj7";
const DEFAULT_OCTAVE: i8 = 4;

/// Voicing for a chord after `inversion` rotations
fn voicing(chord: &Chord, inversion: usize, octave: i8) -> (Vec<String>, Vec<u8>) {
    if inversion == 0 {
        return (chord.note_names(), chord.midi_notes(octave));
    }
    let names = theory::invert_chord(&chord.symbol, inversion, octave).unwrap_or_default();
    let midi = names.iter().filter_map(|n| note_name_to_midi(n).ok()).collect();
    (names, midi)
}

pub struct ChordDisplayPanel {
    input: String,
    octave: i8,
    inversion: usize,
    chord: Option<Chord>,
    keyboard: PianoKeyboard,
}

impl ChordDisplayPanel {
    pub fn new() -> Self {
        let mut panel = Self {
            input: DEFAULT_CHORD.to_string(),
            octave: DEFAULT_OCTAVE,
            inversion: 0,
            chord: None,
            keyboard: PianoKeyboard::new(48..=72),
        };
        panel.resolve();
        panel
    }

    fn resolve(&mut self) {
        self.chord = theory::chord_info(&self.input);
        if let Some(chord) = &self.chord {
            if self.inversion >= chord.notes.len() {
                self.inversion = 0;
            }
        }
    }

    pub fn ui(&mut self, ui: &mut Ui, show_keyboard: bool) -> ToolAction {
        let mut action = ToolAction::None;

        ui.heading("Chord");
        ui.horizontal(|ui| {
            ui.label("Symbol:");
            let response = ui.add(egui::TextEdit::singleline(&mut self.input).desired_width(100.0));
            if response.changed() {
                self.resolve();
            }
            ui.label("Octave:");
            if ui.add(egui::DragValue::new(&mut self.octave).range(1..=7)).changed() {
                self.resolve();
            }
        });

        let Some(chord) = self.chord.clone() else {
            if self.input.trim().is_empty() {
                ui.label("Enter a chord symbol such as C, Am7 or F#m7b5");
            } else {
                ui.label(RichText::new(format!("Unknown chord: {}", self.input)).color(Color32::from_rgb(220, 90, 90)));
            }
            return action;
        };

        let (names, midi) = voicing(&chord, self.inversion, self.octave);

        ui.horizontal(|ui| {
            ui.label(RichText::new(&chord.symbol).size(24.0).strong());
            if ui.button("\u{25B6} Play").clicked() && !midi.is_empty() {
                action = ToolAction::Play(PlayRequest::Chord(midi.clone()));
            }
        });

        egui::Grid::new("chord_info").num_columns(2).spacing([16.0, 4.0]).show(ui, |ui| {
            ui.label("Root");
            ui.label(chord.root.to_string());
            ui.end_row();
            ui.label("Type");
            ui.label(chord.chord_type.name);
            ui.end_row();
            ui.label("Notes");
            ui.label(chord.note_names().join(", "));
            ui.end_row();
            ui.label("Intervals");
            ui.label(chord.interval_names().join(", "));
            ui.end_row();
        });

        ui.horizontal(|ui| {
            ui.label("Inversion:");
            for i in 0..chord.notes.len() {
                let label = match i {
                    0 => "Root".to_string(),
                    1 => "1st".to_string(),
                    2 => "2nd".to_string(),
                    3 => "3rd".to_string(),
                    n => format!("{n}th"),
                };
                if ui.selectable_label(self.inversion == i, label).clicked() {
                    self.inversion = i;
                }
            }
        });
        ui.label(format!("Voicing: {}", names.join(" ")));

        if show_keyboard && !midi.is_empty() {
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
    fn test_root_position_voicing() {
        let chord = theory::chord_info("Cmaj7").unwrap();
        let (names, midi) = voicing(&chord, 0, 4);
        assert_eq!(names, vec!["C", "E", "G", "B"]);
        assert_eq!(midi, vec![60, 64, 67, 71]);
    }

    #[test]
    fn test_first_inversion_voicing() {
        let chord = theory::chord_info("C").unwrap();
        let (names, midi) = voicing(&chord, 1, 4);
        assert_eq!(names, vec!["E4", "G4", "C5"]);
        assert_eq!(midi, vec![64, 67, 72]);
    }

    #[test]
    fn test_inversion_reset_on_smaller_chord() {
        let mut panel = ChordDisplayPanel::new();
        panel.inversion = 3;
        panel.input = "Am".to_string();
        panel.resolve();
        assert_eq!(panel.inversion, 0);
        assert_eq!(panel.chord.as_ref().map(|c| c.symbol.as_str()), Some("Am"));
    }
}
