//! UI panels

mod chord_display;
mod chord_trainer;
mod harmony;
mod interval_trainer;
mod keyboard;
mod notation;
mod progress;
mod progression_display;
mod progression_trainer;
mod scale_visualizer;
mod settings;
mod status;

pub use chord_display::ChordDisplayPanel;
pub use chord_trainer::ChordTrainerPanel;
pub use harmony::HarmonyPanel;
pub use interval_trainer::IntervalTrainerPanel;
pub use notation::NotationPanel;
pub use progress::{ProgressAction, ProgressPanel};
pub use progression_display::ProgressionDisplayPanel;
pub use progression_trainer::ProgressionTrainerPanel;
pub use scale_visualizer::ScaleVisualizerPanel;
pub use settings::{SettingsAction, SettingsPanel};
pub use status::{MidiStatus, StatusAction, StatusPanel};

use keyboard::KeyboardAction;
use musejourney_core::exercise::{PlaybackEvent, ScoredAnswer};
use musejourney_services::ScaleDirection;

/// Something a panel wants the audio engine to play
#[derive(Debug, Clone, PartialEq)]
pub enum PlayRequest {
    Note(u8),
    Chord(Vec<u8>),
    /// One voicing per second
    Progression(Vec<Vec<u8>>),
    Scale(Vec<u8>, ScaleDirection),
    Events(Vec<PlaybackEvent>),
}

/// Actions returned from the reference tools
#[derive(Debug, Clone, PartialEq)]
pub enum ToolAction {
    None,
    Play(PlayRequest),
}

/// Actions returned from the ear-training panels
#[derive(Debug, Clone, PartialEq)]
pub enum TrainerAction {
    None,
    Play(PlayRequest),
    Answered(ScoredAnswer),
}

impl From<KeyboardAction> for ToolAction {
    fn from(action: KeyboardAction) -> Self {
        match action {
            KeyboardAction::NoteOn(note) => ToolAction::Play(PlayRequest::Note(note)),
            KeyboardAction::None => ToolAction::None,
        }
    }
}

impl From<KeyboardAction> for TrainerAction {
    fn from(action: KeyboardAction) -> Self {
        match action {
            KeyboardAction::NoteOn(note) => TrainerAction::Play(PlayRequest::Note(note)),
            KeyboardAction::None => TrainerAction::None,
        }
    }
}

impl From<ToolAction> for TrainerAction {
    fn from(action: ToolAction) -> Self {
        match action {
            ToolAction::Play(request) => TrainerAction::Play(request),
            ToolAction::None => TrainerAction::None,
        }
    }
}

/// Key names offered by the key pickers
const COMMON_KEYS: [&str; 26] = [
    "C major", "G major", "D major", "A major", "E major", "B major", "F# major",
    "F major", "Bb major", "Eb major", "Ab major", "Db major", "Gb major",
    "A minor", "E minor", "B minor", "F# minor", "C# minor", "G# minor", "D# minor",
    "D minor", "G minor", "C minor", "F minor", "Bb minor", "Eb minor",
];

/// Key combo box; true when the selection changed
pub(crate) fn key_picker(ui: &mut egui::Ui, id: &str, key: &mut String) -> bool {
    let mut changed = false;
    egui::ComboBox::from_id_salt(id)
        .selected_text(key.as_str())
        .width(120.0)
        .show_ui(ui, |ui| {
            for name in COMMON_KEYS {
                if ui.selectable_label(key.as_str() == name, name).clicked() && key.as_str() != name {
                    *key = name.to_string();
                    changed = true;
                }
            }
        });
    changed
}

const CORRECT_FILL: egui::Color32 = egui::Color32::from_rgb(60, 130, 70);
const WRONG_FILL: egui::Color32 = egui::Color32::from_rgb(150, 55, 55);

/// Answer choice; `verdict` colours it once the question is answered
pub(crate) fn answer_button(ui: &mut egui::Ui, label: &str, verdict: Option<bool>, enabled: bool) -> bool {
    let mut button = egui::Button::new(label).min_size(egui::vec2(96.0, 28.0));
    match verdict {
        Some(true) => button = button.fill(CORRECT_FILL),
        Some(false) => button = button.fill(WRONG_FILL),
        None => {}
    }
    ui.add_enabled(enabled, button).clicked()
}

pub(crate) fn verdict_label(ui: &mut egui::Ui, correct: bool, detail: &str) {
    let (text, color) = if correct {
        ("Correct!", egui::Color32::from_rgb(110, 200, 120))
    } else {
        ("Incorrect", egui::Color32::from_rgb(220, 90, 90))
    };
    ui.horizontal(|ui| {
        ui.label(egui::RichText::new(text).strong().color(color));
        ui.label(detail);
    });
}

/// Settings snapshot stored with a session
pub(crate) fn settings_value<T: serde::Serialize>(settings: &T) -> serde_json::Value {
    serde_json::to_value(settings).unwrap_or_default()
}

/// Running tally row shared by the trainers
pub(crate) fn stats_row(ui: &mut egui::Ui, stats: musejourney_core::RunningStats) {
    ui.horizontal(|ui| {
        ui.spacing_mut().item_spacing.x = 16.0;
        ui.label(format!("Questions: {}", stats.total));
        ui.label(format!("Correct: {}", stats.correct));
        ui.label(format!("Accuracy: {}%", stats.accuracy()));
        ui.label(format!("Streak: {}", stats.streak));
    });
}
