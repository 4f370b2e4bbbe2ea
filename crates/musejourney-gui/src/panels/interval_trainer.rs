//! Interval ear training

use egui::{RichText, Ui};
use musejourney_core::exercise::IntervalExercise;
use musejourney_core::training::{GeneralSettings, IntervalSettings, TrainingSession};
use musejourney_core::{SessionTracker, TrainingCategory};

use super::keyboard::{PianoKeyboard, range_for_size};
use super::{PlayRequest, TrainerAction, answer_button, settings_value, stats_row, verdict_label};

pub struct IntervalTrainerPanel {
    settings: IntervalSettings,
    exercise: IntervalExercise,
    session: Option<SessionTracker>,
    keyboard: PianoKeyboard,
}

impl IntervalTrainerPanel {
    pub fn new(settings: &IntervalSettings) -> Self {
        Self {
            settings: settings.clone(),
            exercise: IntervalExercise::new(&settings.selected_intervals, settings.playback_mode),
            session: None,
            keyboard: PianoKeyboard::new(48..=72),
        }
    }

    /// Apply new settings; the running session ends if they changed
    pub fn reset(&mut self, settings: &IntervalSettings) -> Option<TrainingSession> {
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
        if self.exercise.next_question(rng).is_none() {
            return TrainerAction::None;
        }
        if self.session.is_none() {
            self.session = Some(SessionTracker::start(TrainingCategory::Interval, settings_value(&self.settings)));
        }
        if auto_play {
            TrainerAction::Play(PlayRequest::Events(self.exercise.playback()))
        } else {
            TrainerAction::None
        }
    }

    fn answer(&mut self, short_name: &str) -> TrainerAction {
        let Some(scored) = self.exercise.answer(short_name) else {
            return TrainerAction::None;
        };
        if let Some(session) = &mut self.session {
            session.record(scored.correct);
        }
        TrainerAction::Answered(scored)
    }

    pub fn ui(&mut self, ui: &mut Ui, rng: &mut fastrand::Rng, general: &GeneralSettings, held: &[u8]) -> TrainerAction {
        let mut action = TrainerAction::None;

        ui.heading("Interval Training");
        ui.label(format!("Playback: {}", self.settings.playback_mode.label()));
        stats_row(ui, self.exercise.stats());
        ui.separator();

        let Some(question) = self.exercise.current().cloned() else {
            if self.settings.selected_intervals.is_empty() {
                ui.label("Select at least one interval in Settings to start.");
            } else if ui.button(RichText::new("Start").size(18.0)).clicked() {
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
        ui.label("Which interval did you hear?");
        let answered = self.exercise.user_answer().map(str::to_string);
        let mut chosen = None;
        ui.horizontal_wrapped(|ui| {
            for kind in self.exercise.choices() {
                let verdict = answered.as_ref().and_then(|a| {
                    if kind.short_name == question.kind.short_name {
                        Some(true)
                    } else if a == kind.short_name {
                        Some(false)
                    } else {
                        None
                    }
                });
                let label = format!("{} ({})", kind.label, kind.short_name);
                if answer_button(ui, &label, verdict, answered.is_none()) {
                    chosen = Some(kind.short_name);
                }
            }
        });
        if let Some(short_name) = chosen {
            action = self.answer(short_name);
        }

        if let Some(answer) = &answered {
            ui.add_space(8.0);
            verdict_label(
                ui,
                answer == question.kind.short_name,
                &format!("{}: {} \u{2192} {}", question.kind.label, question.first_note, question.second_note),
            );
        }

        if general.show_keyboard {
            ui.add_space(8.0);
            self.keyboard.set_range(range_for_size(general.keyboard_size));
            let highlighted = if answered.is_some() {
                vec![question.first_midi, question.second_midi]
            } else {
                Vec::new()
            };
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
    fn test_session_starts_with_first_question() {
        let mut panel = IntervalTrainerPanel::new(&IntervalSettings::default());
        let mut rng = fastrand::Rng::with_seed(7);
        assert!(panel.finish_session().is_none());

        let action = panel.next(&mut rng, true);
        assert!(matches!(action, TrainerAction::Play(PlayRequest::Events(ref e)) if e.len() == 2));
        assert!(panel.session.is_some());
        // A session with no answers is discarded
        assert!(panel.finish_session().is_none());
    }

    #[test]
    fn test_answer_recorded_in_session() {
        let mut panel = IntervalTrainerPanel::new(&IntervalSettings::default());
        let mut rng = fastrand::Rng::with_seed(3);
        panel.next(&mut rng, false);
        let expected = panel.exercise.current().unwrap().kind.short_name;

        let TrainerAction::Answered(scored) = panel.answer(expected) else {
            panic!("expected an answer");
        };
        assert!(scored.correct);
        // Second answer to the same question is ignored
        assert_eq!(panel.answer(expected), TrainerAction::None);

        let session = panel.finish_session().unwrap();
        assert_eq!(session.category, TrainingCategory::Interval);
        assert_eq!((session.total_questions, session.correct_answers), (1, 1));
    }

    #[test]
    fn test_reset_only_on_change() {
        let mut panel = IntervalTrainerPanel::new(&IntervalSettings::default());
        let mut rng = fastrand::Rng::with_seed(1);
        panel.next(&mut rng, false);
        let short = panel.exercise.current().unwrap().kind.short_name;
        panel.answer(short);

        assert!(panel.reset(&IntervalSettings::default()).is_none());
        assert!(panel.exercise.current().is_some());

        let mut changed = IntervalSettings::default();
        changed.selected_intervals = vec!["P5".to_string()];
        let finished = panel.reset(&changed);
        assert_eq!(finished.map(|s| s.total_questions), Some(1));
        assert!(panel.exercise.current().is_none());
    }

    #[test]
    fn test_empty_selection_never_starts() {
        let mut settings = IntervalSettings::default();
        settings.selected_intervals.clear();
        let mut panel = IntervalTrainerPanel::new(&settings);
        let mut rng = fastrand::Rng::with_seed(1);
        assert_eq!(panel.next(&mut rng, true), TrainerAction::None);
        assert!(panel.session.is_none());
    }
}
