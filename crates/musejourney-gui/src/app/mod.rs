//! Main application state

mod action_handlers;
mod config;
mod midi;
mod types;

use eframe::CreationContext;
use egui::{Context, RichText};
use musejourney_core::training::FileBackend;
use musejourney_core::TrainingStore;
use musejourney_services::{AudioEngine, PlaybackHandle};
use tracing::info;

use config::{AppConfig, load_config};
use midi::MidiState;
use types::View;

use crate::panels::{
    ChordDisplayPanel, ChordTrainerPanel, HarmonyPanel, IntervalTrainerPanel, NotationPanel, ProgressPanel,
    ProgressionDisplayPanel, ProgressionTrainerPanel, ScaleVisualizerPanel, SettingsPanel, StatusPanel,
};

pub struct MuseJourneyApp {
    config: AppConfig,
    engine: AudioEngine,
    store: TrainingStore<FileBackend>,
    rng: fastrand::Rng,
    midi: MidiState,
    view: View,

    /// Most recent playback; cancelled when something new plays
    playback: Option<PlaybackHandle>,

    // Panels
    status_panel: StatusPanel,
    interval_trainer: IntervalTrainerPanel,
    chord_trainer: ChordTrainerPanel,
    progression_trainer: ProgressionTrainerPanel,
    chord_display: ChordDisplayPanel,
    scale_visualizer: ScaleVisualizerPanel,
    progression_display: ProgressionDisplayPanel,
    notation_panel: NotationPanel,
    harmony_panel: HarmonyPanel,
    progress_panel: ProgressPanel,
    settings_panel: SettingsPanel,
}

impl MuseJourneyApp {
    pub fn new(_cc: &CreationContext<'_>) -> Self {
        let config = load_config();

        let mut engine = AudioEngine::new();
        engine.init();
        engine.select_instrument(config.audio.instrument);
        engine.set_master_volume(config.audio.volume);

        let data_dir = config.data_dir();
        info!(dir = %data_dir.display(), "Opening training store");
        let store = TrainingStore::open_dir(data_dir);
        let settings = store.settings();

        let mut midi = MidiState::new();
        if !config.midi.input_pattern.is_empty() {
            midi.connect(&config.midi.input_pattern);
        }

        let status_panel = StatusPanel::new(config.audio.volume, engine.state().tone_hz);

        Self {
            config,
            engine,
            store,
            rng: fastrand::Rng::new(),
            midi,
            view: View::Intervals,
            playback: None,
            status_panel,
            interval_trainer: IntervalTrainerPanel::new(&settings.interval),
            chord_trainer: ChordTrainerPanel::new(&settings.chord),
            progression_trainer: ProgressionTrainerPanel::new(&settings.progression),
            chord_display: ChordDisplayPanel::new(),
            scale_visualizer: ScaleVisualizerPanel::new(),
            progression_display: ProgressionDisplayPanel::new(),
            notation_panel: NotationPanel::new(),
            harmony_panel: HarmonyPanel::new(),
            progress_panel: ProgressPanel::new(),
            settings_panel: SettingsPanel::new(),
        }
    }

    fn view_selector(&self, ui: &mut egui::Ui) -> Option<View> {
        let mut selected = None;
        ui.horizontal_wrapped(|ui| {
            ui.label(RichText::new("Train").strong());
            for view in View::TRAINING {
                if ui.selectable_label(self.view == view, view.label()).clicked() {
                    selected = Some(view);
                }
            }
            ui.separator();
            ui.label(RichText::new("Explore").strong());
            for view in View::TOOLS {
                if ui.selectable_label(self.view == view, view.label()).clicked() {
                    selected = Some(view);
                }
            }
            ui.separator();
            for view in [View::Progress, View::Settings] {
                if ui.selectable_label(self.view == view, view.label()).clicked() {
                    selected = Some(view);
                }
            }
        });
        selected.filter(|v| *v != self.view)
    }

    fn central_ui(&mut self, ui: &mut egui::Ui) {
        let general = self.store.general_settings();
        let held = self.midi.held();

        match self.view {
            View::Intervals => {
                let action = self.interval_trainer.ui(ui, &mut self.rng, &general, &held);
                self.handle_trainer_action(action);
            }
            View::Chords => {
                let action = self.chord_trainer.ui(ui, &mut self.rng, &general, &held);
                self.handle_trainer_action(action);
            }
            View::Progressions => {
                let action = self.progression_trainer.ui(ui, &mut self.rng, &general, &held);
                self.handle_trainer_action(action);
            }
            View::ChordLookup => {
                let action = self.chord_display.ui(ui, general.show_keyboard);
                self.handle_tool_action(action);
            }
            View::Scales => {
                let action = self.scale_visualizer.ui(ui, general.show_keyboard);
                self.handle_tool_action(action);
            }
            View::ProgressionExplorer => {
                let action = self.progression_display.ui(ui);
                self.handle_tool_action(action);
            }
            View::Notation => {
                let action = self.notation_panel.ui(ui);
                self.handle_tool_action(action);
            }
            View::Harmony => {
                let action = self.harmony_panel.ui(ui);
                self.handle_tool_action(action);
            }
            View::Progress => {
                let action = self.progress_panel.ui(ui, &self.store);
                self.handle_progress_action(action);
            }
            View::Settings => {
                let settings = self.store.settings();
                let action = self.settings_panel.ui(ui, &settings);
                self.handle_settings_action(action);
            }
        }
    }
}

impl eframe::App for MuseJourneyApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        // MIDI input only drives the keyboard highlights
        if self.midi.poll() {
            ctx.request_repaint();
        }

        let snapshot = self.engine.state();

        let (selected_view, status_action) = egui::TopBottomPanel::top("header")
            .show(ctx, |ui| {
                ui.add_space(4.0);
                let selected = self.view_selector(ui);
                ui.separator();
                let status = self.midi.status();
                let action = self.status_panel.ui(ui, &snapshot, &status);
                ui.add_space(2.0);
                (selected, action)
            })
            .inner;
        self.handle_status_action(status_action);
        if let Some(view) = selected_view {
            self.switch_view(view);
        }

        if !snapshot.initialized {
            let banner_action = egui::TopBottomPanel::top("audio_banner")
                .show(ctx, |ui| self.status_panel.banner_ui(ui, &snapshot))
                .inner;
            self.handle_status_action(banner_action);
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui| self.central_ui(ui));
        });

        if snapshot.active_voices > 0 || snapshot.pending_notes > 0 || self.midi.is_connected() {
            ctx.request_repaint();
        }
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        self.finish_sessions();
        self.midi.disconnect();
        let _ = self.engine.stop();
    }
}
