//! Progression ear training

use egui::{RichText, Ui};
use musejourney_core::exercise::ProgressionExercise;
use musejourney_core::training::{GeneralSettings, ProgressionSettings, TrainingSession};
use musejourney_core::{SessionTracker, TrainingCategory};

use super::keyboard::{PianoKeyboard, range_for_size};
use super::{PlayRequest, TrainerAction, answer_button, settings_value, stats_row, verdict_label};

pub struct ProgressionTrainerPanel {
    settings: ProgressionSettings,
    exercise: ProgressionExercise,
    session: Option<SessionTracker>,
    keyboard: PianoKeyboard,
}

impl ProgressionTrainerPanel {
    pub fn new(settings: &ProgressionSettings) -> Self {
        Self {
            settings: settings.clone(),
            exercise: ProgressionExercise::new(&settings.selected_progressions),
            session: None,
            keyboard: PianoKeyboard::new(48..=72),
        }
    }

    pub fn reset(&mut self, settings: &ProgressionSettings) -> Option<TrainingSession> {
        if *settings == self.settings {
            return None;
        }
        let finished = self.finish_session();
        *self = Self::new(settings);
        finished
    }

    pub fn finish_session(&mut self) -> Option<TrainingSession> {
        self.session.take().and_then(SessionTracker::finish)
    }

    fn next(&mut self, rng: &mut fastrand::Rng, auto_play: bool) -> TrainerAction {
        self.exercise.next_question(rng);
        if self.session.is_none() {
            self.session = Some(SessionTracker::start(TrainingCategory::Progression, settings_value(&self.settings)));
        }
        if auto_play {
            TrainerAction::Play(PlayRequest::Events(self.exercise.playback()))
        } else {
            TrainerAction::None
        }
    }

    fn answer(&mut self, name: &str) -> TrainerAction {
        let Some(scored) = self.exercise.answer(name) else {
            return TrainerAction::None;
        };
        if let Some(session) = &mut self.session {
            session.record(scored.correct);
        }
        TrainerAction::Answered(scored)
    }

    pub fn ui(&mut self, ui: &mut Ui, rng: &mut fastrand::Rng, general: &GeneralSettings, held: &[u8]) -> TrainerAction {
        let mut action = TrainerAction::None;

        ui.heading("Progression Training");
        ui.label(format!("{} progressions in rotation", self.exercise.available().len()));
        stats_row(ui, self.exercise.stats());
        ui.separator();

        let Some(question) = self.exercise.current().cloned() else {
            if ui.button(RichText::new("Start").size(18.0)).clicked() {
                action = self.next(rng, general.auto_play_enabled);
            }
            return action;
        };

        ui.horizontal(|ui| {
            if ui.button("\u{25B6} Play again").clicked() {
                action = TrainerAction::Play(PlayRequest::Events(self.exercise.playback()));
            }
            if ui.add_enabled(self.exercise.is_answered(), egui::Button::new("Next \u{23ED}")).clicked() {
                action = self.next(rng, general.auto_play_enabled);
            }
        });

        ui.add_space(8.0);
        ui.label("Which progression did you hear?");
        let answered = self.exercise.user_answer().map(str::to_string);
        let mut chosen = None;
        ui.vertical(|ui| {
            for kind in self.exercise.choices() {
                let state = answered.as_ref().and_then(|a| {
                    if kind.name == question.kind.name {
                        Some(true)
                    } else if a == kind.name {
                        Some(false)
                    } else {
                        None
                    }
                });
                let label = format!("{}  {}", kind.name, kind.description);
                if answer_button(ui, &label, state, answered.is_none()) {
                    chosen = Some(kind.name);
                }
            }
        });
        if let Some(name) = chosen {
            action = self.answer(name);
        }

        if let Some(answer) = &answered {
            ui.add_space(8.0);
            verdict_label(
                ui,
                answer == question.kind.name,
                &format!(
                    "{}: {} ({})",
                    question.kind.name,
                    question.kind.chords.join(" - "),
                    question.kind.numerals.join(" - ")
                ),
            );
        }

        if general.show_keyboard {
            ui.add_space(8.0);
            self.keyboard.set_range(range_for_size(general.keyboard_size));
            let highlighted = if answered.is_some() { question.all_notes() } else { Vec::new() };
            let key_action: TrainerAction = self.keyboard.ui(ui, &highlighted, held).into();
            if key_action != TrainerAction::None {
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
    fn test_answer_flow() {
        let mut panel = ProgressionTrainerPanel::new(&ProgressionSettings::default());
        let mut rng = fastrand::Rng::with_seed(9);
        let TrainerAction::Play(PlayRequest::Events(events)) = panel.next(&mut rng, true) else {
            panic!("expected playback");
        };
        let question = panel.exercise.current().unwrap().clone();
        assert_eq!(events.len(), question.kind.chords.len());

        let TrainerAction::Answered(scored) = panel.answer("vi-IV-I-V") else {
            panic!("expected a scored answer");
        };
        assert_eq!(scored.correct, question.kind.name == "vi-IV-I-V");
        let session = panel.finish_session().unwrap();
        assert_eq!(session.category, TrainingCategory::Progression);
    }

    #[test]
    fn test_selection_limits_rotation() {
        let settings = ProgressionSettings {
            selected_progressions: vec!["ii-V-I".to_string()],
            ..ProgressionSettings::default()
        };
        let mut panel = ProgressionTrainerPanel::new(&settings);
        let mut rng = fastrand::Rng::with_seed(4);
        for _ in 0..5 {
            panel.next(&mut rng, false);
            assert_eq!(panel.exercise.current().unwrap().kind.name, "ii-V-I");
        }
    }
}
