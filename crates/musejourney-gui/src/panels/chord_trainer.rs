//! Chord identification: root, type or both

use egui::{RichText, Ui};
use musejourney_core::exercise::{ChordExercise, ROOT_NOTES, ScoredAnswer};
use musejourney_core::training::{ChordSettings, GeneralSettings, TrainingSession};
use musejourney_core::{SessionTracker, TrainingCategory};

use super::keyboard::{PianoKeyboard, range_for_size};
use super::{PlayRequest, TrainerAction, answer_button, settings_value, stats_row, verdict_label};

/// Which half of the answer a click fills in
enum ChordPick {
    Root(&'static str),
    Type(&'static str),
}

fn verdict(answer: Option<&str>, choice: &str, expected: &str) -> Option<bool> {
    let answer = answer?;
    if choice == expected {
        Some(true)
    } else if choice == answer {
        Some(false)
    } else {
        None
    }
}

pub struct ChordTrainerPanel {
    settings: ChordSettings,
    exercise: ChordExercise,
    session: Option<SessionTracker>,
    keyboard: PianoKeyboard,
}

impl ChordTrainerPanel {
    pub fn new(settings: &ChordSettings) -> Self {
        Self {
            settings: settings.clone(),
            exercise: ChordExercise::new(
                &settings.selected_chord_types,
                settings.identify_root,
                settings.identify_type,
                settings.playback_mode,
            ),
            session: None,
            keyboard: PianoKeyboard::new(48..=72),
        }
    }

    pub fn reset(&mut self, settings: &ChordSettings) -> Option<TrainingSession> {
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
            self.session = Some(SessionTracker::start(TrainingCategory::Chord, settings_value(&self.settings)));
        }
        if auto_play {
            TrainerAction::Play(PlayRequest::Events(self.exercise.playback()))
        } else {
            TrainerAction::None
        }
    }

    fn pick(&mut self, pick: ChordPick) -> TrainerAction {
        let scored = match pick {
            ChordPick::Root(root) => self.exercise.answer_root(root),
            ChordPick::Type(short_name) => self.exercise.answer_type(short_name),
        };
        self.record(scored)
    }

    fn record(&mut self, scored: Option<ScoredAnswer>) -> TrainerAction {
        let Some(scored) = scored else {
            return TrainerAction::None;
        };
        if let Some(session) = &mut self.session {
            session.record(scored.correct);
        }
        TrainerAction::Answered(scored)
    }

    pub fn ui(&mut self, ui: &mut Ui, rng: &mut fastrand::Rng, general: &GeneralSettings, held: &[u8]) -> TrainerAction {
        let mut action = TrainerAction::None;

        ui.heading("Chord Identification");
        ui.label(format!("Playback: {}", self.settings.playback_mode.label()));
        stats_row(ui, self.exercise.stats());
        ui.separator();

        let Some(question) = self.exercise.current().cloned() else {
            if self.settings.selected_chord_types.is_empty() {
                ui.label("Select at least one chord type in Settings to start.");
            } else if ui.button(RichText::new("Start").size(18.0)).clicked() {
                action = self.next(rng, general.auto_play_enabled);
            }
            return action;
        };

        let complete = self.exercise.is_complete();
        ui.horizontal(|ui| {
            if ui.button("\u{25B6} Play again").clicked() {
                action = TrainerAction::Play(PlayRequest::Events(self.exercise.playback()));
            }
            if ui.add_enabled(complete, egui::Button::new("Next \u{23ED}")).clicked() {
                action = self.next(rng, general.auto_play_enabled);
            }
        });

        let mut pick = None;
        if self.exercise.identify_root() {
            ui.add_space(8.0);
            ui.label("Root:");
            let answer = self.exercise.root_answer().map(str::to_string);
            let revealed = if complete { answer.as_deref() } else { None };
            ui.horizontal_wrapped(|ui| {
                for &(root, _) in ROOT_NOTES.iter() {
                    let state = verdict(revealed, root, question.root);
                    if answer_button(ui, root, state, answer.is_none()) {
                        pick = Some(ChordPick::Root(root));
                    }
                }
            });
        }

        if self.exercise.identify_type() {
            ui.add_space(8.0);
            ui.label("Type:");
            let answer = self.exercise.type_answer().map(str::to_string);
            let revealed = if complete { answer.as_deref() } else { None };
            let choices: Vec<_> = self.exercise.type_choices().collect();
            ui.horizontal_wrapped(|ui| {
                for kind in choices {
                    let state = verdict(revealed, kind.short_name, question.kind.short_name);
                    if answer_button(ui, kind.label, state, answer.is_none()) {
                        pick = Some(ChordPick::Type(kind.short_name));
                    }
                }
            });
        }

        if let Some(pick) = pick {
            action = self.pick(pick);
        }

        let complete = self.exercise.is_complete();
        if complete {
            let correct = self.exercise.is_root_correct().unwrap_or(true) && self.exercise.is_type_correct().unwrap_or(true);
            ui.add_space(8.0);
            verdict_label(
                ui,
                correct,
                &format!("{} {} ({})", question.root, question.kind.label, question.note_names().join(" ")),
            );
        }

        if general.show_keyboard {
            ui.add_space(8.0);
            self.keyboard.set_range(range_for_size(general.keyboard_size));
            let highlighted = if complete { question.midi_notes.clone() } else { Vec::new() };
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

    fn settings(identify_root: bool, identify_type: bool) -> ChordSettings {
        ChordSettings {
            identify_root,
            identify_type,
            ..ChordSettings::default()
        }
    }

    #[test]
    fn test_both_parts_score_once() {
        let mut panel = ChordTrainerPanel::new(&settings(true, true));
        let mut rng = fastrand::Rng::with_seed(11);
        panel.next(&mut rng, false);
        let question = panel.exercise.current().unwrap().clone();

        assert_eq!(panel.pick(ChordPick::Root(question.root)), TrainerAction::None);
        let TrainerAction::Answered(scored) = panel.pick(ChordPick::Type(question.kind.short_name)) else {
            panic!("expected a scored answer");
        };
        assert!(scored.correct);
        assert_eq!(panel.finish_session().map(|s| s.total_questions), Some(1));
    }

    #[test]
    fn test_type_only_wrong_answer() {
        let mut panel = ChordTrainerPanel::new(&settings(false, true));
        let mut rng = fastrand::Rng::with_seed(5);
        panel.next(&mut rng, false);
        let expected = panel.exercise.current().unwrap().kind.short_name;
        let wrong = if expected == "maj" { "min" } else { "maj" };

        let TrainerAction::Answered(scored) = panel.pick(ChordPick::Type(wrong)) else {
            panic!("expected a scored answer");
        };
        assert!(!scored.correct);
        assert_eq!(panel.exercise.stats().streak, 0);
    }

    #[test]
    fn test_verdict_colouring() {
        assert_eq!(verdict(None, "C", "C"), None);
        assert_eq!(verdict(Some("D"), "C", "C"), Some(true));
        assert_eq!(verdict(Some("D"), "D", "C"), Some(false));
        assert_eq!(verdict(Some("D"), "E", "C"), None);
    }

    #[test]
    fn test_autoplay_block_chord() {
        let mut panel = ChordTrainerPanel::new(&settings(true, true));
        let mut rng = fastrand::Rng::with_seed(2);
        let TrainerAction::Play(PlayRequest::Events(events)) = panel.next(&mut rng, true) else {
            panic!("expected playback");
        };
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].notes, panel.exercise.current().unwrap().midi_notes);
    }
}
