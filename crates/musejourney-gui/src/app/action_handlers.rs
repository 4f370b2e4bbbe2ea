use musejourney_core::training::TrainingSession;
use musejourney_services::DEFAULT_VELOCITY;
use tracing::debug;

use super::MuseJourneyApp;
use super::config::save_config;
use super::types::{CHORD_SECONDS, NOTE_SECONDS, SCALE_STEP_SECONDS, View};
use crate::panels::{PlayRequest, ProgressAction, SettingsAction, StatusAction, ToolAction, TrainerAction};

impl MuseJourneyApp {
    /// Play a request, cutting off whatever played before it
    pub(super) fn play(&mut self, request: PlayRequest) {
        if let Some(previous) = self.playback.take() {
            if !previous.is_finished() {
                previous.cancel();
            }
        }

        self.playback = match request {
            PlayRequest::Note(note) => self.engine.play_note(note, NOTE_SECONDS, 0.0, DEFAULT_VELOCITY),
            PlayRequest::Chord(notes) => self.engine.play_chord(&notes, CHORD_SECONDS, 0.0, DEFAULT_VELOCITY),
            PlayRequest::Progression(chords) => {
                self.engine.play_chord_progression(&chords, &[], 0.0, DEFAULT_VELOCITY)
            }
            PlayRequest::Scale(notes, direction) => {
                self.engine.play_scale(&notes, SCALE_STEP_SECONDS, direction, DEFAULT_VELOCITY)
            }
            PlayRequest::Events(events) => self.engine.play_events(&events, DEFAULT_VELOCITY),
        };
    }

    pub(super) fn handle_trainer_action(&mut self, action: TrainerAction) {
        match action {
            TrainerAction::Play(request) => self.play(request),
            TrainerAction::Answered(scored) => {
                debug!(correct = scored.correct, question = %scored.record.question, "Answer recorded");
                self.store.add_question(scored.record);
            }
            TrainerAction::None => {}
        }
    }

    pub(super) fn handle_tool_action(&mut self, action: ToolAction) {
        self.handle_trainer_action(action.into());
    }

    pub(super) fn handle_progress_action(&mut self, action: ProgressAction) {
        match action {
            ProgressAction::ClearHistory => self.store.clear_history(),
            ProgressAction::None => {}
        }
    }

    pub(super) fn handle_settings_action(&mut self, action: SettingsAction) {
        match action {
            SettingsAction::Update(patch) => self.store.update_type_settings(patch),
            SettingsAction::Reset => self.store.reset_settings(),
            SettingsAction::None => return,
        }
        self.reset_trainers();
    }

    pub(super) fn handle_status_action(&mut self, action: StatusAction) {
        match action {
            StatusAction::RetryAudio => {
                if self.engine.init() {
                    self.engine.select_instrument(self.config.audio.instrument);
                    self.engine.set_master_volume(self.config.audio.volume);
                }
            }
            StatusAction::SelectInstrument(kind) => {
                self.engine.select_instrument(kind);
                self.config.audio.instrument = kind;
                save_config(&self.config);
            }
            StatusAction::SetVolume(volume) => {
                self.engine.set_master_volume(volume);
                self.config.audio.volume = volume;
                save_config(&self.config);
            }
            StatusAction::SetTone(cutoff_hz) => self.engine.set_tone(cutoff_hz),
            StatusAction::StopAll => {
                self.playback = None;
                self.engine.stop_all_sounds();
            }
            StatusAction::ConnectMidi(port) => {
                self.midi.connect(&port);
                if self.midi.is_connected() {
                    self.config.midi.input_pattern = port;
                    save_config(&self.config);
                }
            }
            StatusAction::DisconnectMidi => {
                self.midi.disconnect();
                self.config.midi.input_pattern.clear();
                save_config(&self.config);
            }
            StatusAction::RescanMidi => self.midi.rescan(),
            StatusAction::None => {}
        }
    }

    /// Leaving a trainer ends its session
    pub(super) fn switch_view(&mut self, view: View) {
        if self.view.is_trainer() {
            self.finish_sessions();
        }
        self.view = view;
    }

    pub(super) fn finish_sessions(&mut self) {
        let finished = [
            self.interval_trainer.finish_session(),
            self.chord_trainer.finish_session(),
            self.progression_trainer.finish_session(),
        ];
        self.store_sessions(finished);
    }

    /// Rebuild the trainers whose settings changed
    fn reset_trainers(&mut self) {
        let settings = self.store.settings();
        let finished = [
            self.interval_trainer.reset(&settings.interval),
            self.chord_trainer.reset(&settings.chord),
            self.progression_trainer.reset(&settings.progression),
        ];
        self.store_sessions(finished);
    }

    fn store_sessions(&mut self, sessions: impl IntoIterator<Item = Option<TrainingSession>>) {
        for session in sessions.into_iter().flatten() {
            debug!(category = session.category.label(), questions = session.total_questions, "Session finished");
            self.store.add_session(session);
        }
    }
}
