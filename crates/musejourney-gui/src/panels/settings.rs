//! Training settings editor

use egui::{CollapsingHeader, Ui};
use musejourney_core::exercise::{CHORD_KINDS, INTERVAL_KINDS, PROGRESSION_KINDS};
use musejourney_core::training::{
    ChordPlaybackMode, ChordSettingsPatch, Difficulty, GeneralSettingsPatch, IntervalPlaybackMode,
    IntervalSettingsPatch, KeyboardSize, ProgressionSettingsPatch, SettingsPatch, TrainingSettings,
};

/// Actions returned from the settings editor
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingsAction {
    None,
    Update(SettingsPatch),
    Reset,
}

/// Toggle `item` in `selected`, keeping catalogue order
fn toggle_selection<'a>(catalogue: impl IntoIterator<Item = &'a str>, selected: &[String], item: &str, on: bool) -> Vec<String> {
    catalogue
        .into_iter()
        .filter(|name| if *name == item { on } else { selected.iter().any(|s| s == name) })
        .map(str::to_string)
        .collect()
}

/// Checkbox list over a catalogue; returns the new selection when it changed
fn selection_ui<'a>(ui: &mut Ui, catalogue: &[(&'a str, &'a str)], selected: &[String]) -> Option<Vec<String>> {
    let mut changed = None;
    ui.horizontal(|ui| {
        if ui.small_button("All").clicked() {
            changed = Some(catalogue.iter().map(|(name, _)| name.to_string()).collect());
        }
        if ui.small_button("None").clicked() {
            changed = Some(Vec::new());
        }
    });
    ui.horizontal_wrapped(|ui| {
        for (name, label) in catalogue {
            let mut on = selected.iter().any(|s| s == name);
            if ui.checkbox(&mut on, *label).changed() {
                changed = Some(toggle_selection(catalogue.iter().map(|(n, _)| *n), selected, name, on));
            }
        }
    });
    changed
}

fn combo<T: Copy + PartialEq>(ui: &mut Ui, id: &str, current: T, all: &[T], label: impl Fn(&T) -> &'static str) -> Option<T> {
    let mut value = current;
    egui::ComboBox::from_id_salt(id)
        .selected_text(label(&current))
        .show_ui(ui, |ui| {
            for option in all {
                ui.selectable_value(&mut value, *option, label(option));
            }
        });
    (value != current).then_some(value)
}

pub struct SettingsPanel {
    confirm_reset: bool,
}

impl SettingsPanel {
    pub fn new() -> Self {
        Self { confirm_reset: false }
    }

    pub fn ui(&mut self, ui: &mut Ui, settings: &TrainingSettings) -> SettingsAction {
        let mut action = SettingsAction::None;

        ui.heading("Settings");
        CollapsingHeader::new("Intervals").default_open(true).show(ui, |ui| {
            let s = &settings.interval;
            let catalogue: Vec<_> = INTERVAL_KINDS.iter().map(|k| (k.short_name, k.label)).collect();
            if let Some(selected) = selection_ui(ui, &catalogue, &s.selected_intervals) {
                action = SettingsAction::Update(SettingsPatch::Interval(IntervalSettingsPatch {
                    selected_intervals: Some(selected),
                    ..Default::default()
                }));
            }
            ui.horizontal(|ui| {
                ui.label("Playback:");
                if let Some(mode) = combo(ui, "interval_mode", s.playback_mode, IntervalPlaybackMode::ALL, IntervalPlaybackMode::label) {
                    action = SettingsAction::Update(SettingsPatch::Interval(IntervalSettingsPatch {
                        playback_mode: Some(mode),
                        ..Default::default()
                    }));
                }
                ui.label("Difficulty:");
                if let Some(difficulty) = combo(ui, "interval_difficulty", s.difficulty, Difficulty::ALL, Difficulty::label) {
                    action = SettingsAction::Update(SettingsPatch::Interval(IntervalSettingsPatch {
                        difficulty: Some(difficulty),
                        ..Default::default()
                    }));
                }
            });
        });

        CollapsingHeader::new("Chords").default_open(true).show(ui, |ui| {
            let s = &settings.chord;
            let catalogue: Vec<_> = CHORD_KINDS.iter().map(|k| (k.short_name, k.label)).collect();
            if let Some(selected) = selection_ui(ui, &catalogue, &s.selected_chord_types) {
                action = SettingsAction::Update(SettingsPatch::Chord(ChordSettingsPatch {
                    selected_chord_types: Some(selected),
                    ..Default::default()
                }));
            }
            ui.horizontal(|ui| {
                let mut identify_root = s.identify_root;
                if ui.checkbox(&mut identify_root, "Identify root").changed() {
                    action = SettingsAction::Update(SettingsPatch::Chord(ChordSettingsPatch {
                        identify_root: Some(identify_root),
                        ..Default::default()
                    }));
                }
                let mut identify_type = s.identify_type;
                if ui.checkbox(&mut identify_type, "Identify type").changed() {
                    action = SettingsAction::Update(SettingsPatch::Chord(ChordSettingsPatch {
                        identify_type: Some(identify_type),
                        ..Default::default()
                    }));
                }
            });
            ui.horizontal(|ui| {
                ui.label("Playback:");
                if let Some(mode) = combo(ui, "chord_mode", s.playback_mode, ChordPlaybackMode::ALL, ChordPlaybackMode::label) {
                    action = SettingsAction::Update(SettingsPatch::Chord(ChordSettingsPatch {
                        playback_mode: Some(mode),
                        ..Default::default()
                    }));
                }
                ui.label("Difficulty:");
                if let Some(difficulty) = combo(ui, "chord_difficulty", s.difficulty, Difficulty::ALL, Difficulty::label) {
                    action = SettingsAction::Update(SettingsPatch::Chord(ChordSettingsPatch {
                        difficulty: Some(difficulty),
                        ..Default::default()
                    }));
                }
            });
        });

        CollapsingHeader::new("Progressions").default_open(true).show(ui, |ui| {
            let s = &settings.progression;
            let catalogue: Vec<_> = PROGRESSION_KINDS.iter().map(|k| (k.name, k.description)).collect();
            if let Some(selected) = selection_ui(ui, &catalogue, &s.selected_progressions) {
                action = SettingsAction::Update(SettingsPatch::Progression(ProgressionSettingsPatch {
                    selected_progressions: Some(selected),
                    ..Default::default()
                }));
            }
            if s.selected_progressions.is_empty() {
                ui.label("With nothing selected every progression is used.");
            }
            ui.horizontal(|ui| {
                ui.label("Difficulty:");
                if let Some(difficulty) = combo(ui, "progression_difficulty", s.difficulty, Difficulty::ALL, Difficulty::label) {
                    action = SettingsAction::Update(SettingsPatch::Progression(ProgressionSettingsPatch {
                        difficulty: Some(difficulty),
                        ..Default::default()
                    }));
                }
            });
        });

        CollapsingHeader::new("General").default_open(true).show(ui, |ui| {
            let s = &settings.general;
            let mut auto_play = s.auto_play_enabled;
            if ui.checkbox(&mut auto_play, "Play each new question automatically").changed() {
                action = SettingsAction::Update(SettingsPatch::General(GeneralSettingsPatch {
                    auto_play_enabled: Some(auto_play),
                    ..Default::default()
                }));
            }
            let mut show_keyboard = s.show_keyboard;
            if ui.checkbox(&mut show_keyboard, "Show keyboard").changed() {
                action = SettingsAction::Update(SettingsPatch::General(GeneralSettingsPatch {
                    show_keyboard: Some(show_keyboard),
                    ..Default::default()
                }));
            }
            ui.horizontal(|ui| {
                ui.label("Keyboard size:");
                if let Some(size) = combo(ui, "keyboard_size", s.keyboard_size, KeyboardSize::ALL, KeyboardSize::label) {
                    action = SettingsAction::Update(SettingsPatch::General(GeneralSettingsPatch {
                        keyboard_size: Some(size),
                        ..Default::default()
                    }));
                }
            });
        });

        ui.add_space(12.0);
        ui.horizontal(|ui| {
            if self.confirm_reset {
                ui.label("Restore all settings to defaults?");
                if ui.button("Reset").clicked() {
                    action = SettingsAction::Reset;
                    self.confirm_reset = false;
                }
                if ui.button("Cancel").clicked() {
                    self.confirm_reset = false;
                }
            } else if ui.button("Reset to defaults").clicked() {
                self.confirm_reset = true;
            }
        });

        action
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_toggle_keeps_catalogue_order() {
        let catalogue = ["m2", "M2", "m3", "M3"];
        let selected = strings(&["M3", "m2"]);
        assert_eq!(toggle_selection(catalogue, &selected, "M2", true), strings(&["m2", "M2", "M3"]));
        assert_eq!(toggle_selection(catalogue, &selected, "M3", false), strings(&["m2"]));
    }

    #[test]
    fn test_toggle_drops_unknown_names() {
        let selected = strings(&["maj", "bogus"]);
        assert_eq!(toggle_selection(["maj", "min"], &selected, "min", true), strings(&["maj", "min"]));
    }
}
