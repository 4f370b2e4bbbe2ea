//! Harmony analyzer: roman numerals and next-chord suggestions

use egui::{Color32, RichText, Ui};
use musejourney_core::theory;

use super::{PlayRequest, ToolAction, key_picker};

const VOICING_OCTAVE: i8 = 4;

/// Roman numeral per chord, `?` where the chord has no function in the key
fn chord_functions(chords: &[String], key: &str) -> Vec<String> {
    chords
        .iter()
        .map(|c| theory::chord_function(c, key).unwrap_or_else(|| "?".to_string()))
        .collect()
}

/// Continuations of the last chord
fn suggestions(chords: &[String], key: &str) -> Vec<Vec<String>> {
    chords
        .last()
        .map(|last| theory::progression_suggestions(last, key))
        .unwrap_or_default()
}

pub struct HarmonyPanel {
    key: String,
    chords: Vec<String>,
    chord_input: String,
    error: Option<String>,
}

impl HarmonyPanel {
    pub fn new() -> Self {
        Self {
            key: "C major".to_string(),
            chords: Vec::new(),
            chord_input: String::new(),
            error: None,
        }
    }

    fn add_chord(&mut self) {
        let symbol = self.chord_input.trim();
        if symbol.is_empty() {
            return;
        }
        match theory::try_chord_info(symbol) {
            Ok(chord) => {
                self.chords.push(chord.symbol);
                self.chord_input.clear();
                self.error = None;
            }
            Err(e) => self.error = Some(e.to_string()),
        }
    }

    pub fn ui(&mut self, ui: &mut Ui) -> ToolAction {
        let mut action = ToolAction::None;

        ui.heading("Harmony Analyzer");
        ui.horizontal(|ui| {
            ui.label("Key:");
            key_picker(ui, "harmony_key", &mut self.key);
        });

        ui.horizontal(|ui| {
            ui.label("Chord:");
            let response = ui.add(egui::TextEdit::singleline(&mut self.chord_input).desired_width(100.0));
            let submitted = response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
            if ui.button("Add").clicked() || submitted {
                self.add_chord();
            }
            if ui.add_enabled(!self.chords.is_empty(), egui::Button::new("Remove last")).clicked() {
                self.chords.pop();
            }
            if ui.add_enabled(!self.chords.is_empty(), egui::Button::new("Clear")).clicked() {
                self.chords.clear();
            }
        });
        if let Some(error) = &self.error {
            ui.label(RichText::new(error).color(Color32::from_rgb(220, 90, 90)));
        }

        if self.chords.is_empty() {
            ui.label("Add chords to analyze their function in the key.");
            return action;
        }

        ui.add_space(8.0);
        ui.horizontal(|ui| {
            ui.label(RichText::new("Progression").strong());
            if ui.button("\u{25B6} Play").clicked() {
                let voicings = self
                    .chords
                    .iter()
                    .map(|c| theory::chord_midi_notes(c, VOICING_OCTAVE))
                    .collect();
                action = ToolAction::Play(PlayRequest::Progression(voicings));
            }
        });
        let functions = chord_functions(&self.chords, &self.key);
        egui::Grid::new("harmony_functions").spacing([18.0, 4.0]).show(ui, |ui| {
            for chord in &self.chords {
                ui.label(RichText::new(chord).size(16.0));
            }
            ui.end_row();
            for function in &functions {
                ui.label(RichText::new(function).color(Color32::from_rgb(130, 170, 220)));
            }
            ui.end_row();
        });

        let suggestions = suggestions(&self.chords, &self.key);
        if !suggestions.is_empty() {
            ui.add_space(8.0);
            ui.label(RichText::new("Common continuations").strong());
            ui.horizontal_wrapped(|ui| {
                for suggestion in suggestions {
                    if ui.button(suggestion.join(" \u{2192} ")).clicked() {
                        self.chords.extend(suggestion);
                    }
                }
            });
        }

        action
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chords(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_functions_mark_unknown() {
        let functions = chord_functions(&chords(&["C", "G7", "Db", "nonsense"]), "C major");
        assert_eq!(functions, vec!["I", "V7", "?", "?"]);
    }

    #[test]
    fn test_suggestions_follow_last_chord() {
        assert!(suggestions(&[], "C major").is_empty());
        let next = suggestions(&chords(&["C", "Dm"]), "C major");
        assert_eq!(next[0], vec!["G"]);
    }

    #[test]
    fn test_add_chord_validates() {
        let mut panel = HarmonyPanel::new();
        panel.chord_input = " Am7 ".to_string();
        panel.add_chord();
        assert_eq!(panel.chords, vec!["Am7"]);
        assert!(panel.chord_input.is_empty());

        panel.chord_input = "Q".to_string();
        panel.add_chord();
        assert_eq!(panel.chords.len(), 1);
        assert!(panel.error.is_some());
        assert_eq!(panel.chord_input, "Q");
    }
}
