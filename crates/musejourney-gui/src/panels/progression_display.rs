//! Common progressions and diatonic chords of a key

use egui::{Color32, RichText, Ui};
use musejourney_core::theory::{self, ChordProgression};

use super::{PlayRequest, ToolAction, key_picker};

const VOICING_OCTAVE: i8 = 4;

/// A progression chord with its roman numeral, if it has one in the key
#[derive(Debug, Clone, PartialEq)]
struct AnalyzedChord {
    symbol: String,
    function: Option<String>,
    notes: Vec<u8>,
}

fn analyze(chords: &[String], key: &str) -> Vec<AnalyzedChord> {
    chords
        .iter()
        .map(|symbol| AnalyzedChord {
            symbol: symbol.clone(),
            function: theory::chord_function(symbol, key),
            notes: theory::chord_midi_notes(symbol, VOICING_OCTAVE),
        })
        .collect()
}

pub struct ProgressionDisplayPanel {
    key: String,
    progressions: Vec<ChordProgression>,
    selected: usize,
    diatonic: Vec<String>,
}

impl ProgressionDisplayPanel {
    pub fn new() -> Self {
        let mut panel = Self {
            key: "C major".to_string(),
            progressions: Vec::new(),
            selected: 0,
            diatonic: Vec::new(),
        };
        panel.refresh();
        panel
    }

    fn refresh(&mut self) {
        self.progressions = theory::common_progressions(&self.key);
        self.diatonic = theory::diatonic_chords(&self.key)
            .into_iter()
            .map(|c| c.symbol)
            .collect();
        self.selected = self.selected.min(self.progressions.len().saturating_sub(1));
    }

    pub fn ui(&mut self, ui: &mut Ui) -> ToolAction {
        let mut action = ToolAction::None;

        ui.heading("Chord Progressions");
        ui.horizontal(|ui| {
            ui.label("Key:");
            if key_picker(ui, "progression_key", &mut self.key) {
                self.refresh();
            }
        });

        ui.add_space(4.0);
        ui.label(RichText::new("Diatonic chords").strong());
        ui.horizontal_wrapped(|ui| {
            for symbol in &self.diatonic {
                let numeral = theory::chord_function(symbol, &self.key).unwrap_or_default();
                if ui.button(format!("{symbol}  {numeral}")).clicked() {
                    action = ToolAction::Play(PlayRequest::Chord(theory::chord_midi_notes(symbol, VOICING_OCTAVE)));
                }
            }
        });

        if self.progressions.is_empty() {
            ui.label("No progressions for this key");
            return action;
        }

        ui.add_space(8.0);
        ui.horizontal_wrapped(|ui| {
            for (i, progression) in self.progressions.iter().enumerate() {
                if ui.selectable_label(self.selected == i, &progression.name).clicked() {
                    self.selected = i;
                }
            }
        });

        let Some(progression) = self.progressions.get(self.selected) else {
            return action;
        };
        let chords = analyze(&progression.chords, &self.key);

        ui.add_space(8.0);
        ui.horizontal(|ui| {
            ui.label(RichText::new(format!("{} ({})", progression.name, progression.key)).size(18.0).strong());
            if ui.button("\u{25B6} Play progression").clicked() {
                let voicings = chords.iter().map(|c| c.notes.clone()).collect();
                action = ToolAction::Play(PlayRequest::Progression(voicings));
            }
        });

        ui.horizontal_wrapped(|ui| {
            for (i, chord) in chords.iter().enumerate() {
                ui.vertical(|ui| {
                    if ui.button(RichText::new(&chord.symbol).size(18.0)).clicked() {
                        action = ToolAction::Play(PlayRequest::Chord(chord.notes.clone()));
                    }
                    if let Some(function) = &chord.function {
                        ui.label(RichText::new(function).color(Color32::from_rgb(130, 170, 220)));
                    }
                });
                if i + 1 < chords.len() {
                    ui.label("\u{2192}");
                }
            }
        });

        action
    }
}
