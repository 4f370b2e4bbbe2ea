//! Training progress and history

use chrono::{Local, TimeZone};
use egui::{Color32, RichText, Ui};
use musejourney_core::training::{StorageBackend, TrainingStats};
use musejourney_core::{TrainingCategory, TrainingStore};

const RECENT_LIMIT: usize = 20;

/// Actions returned from the progress panel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressAction {
    None,
    ClearHistory,
}

/// Practice hint for an answer tally
pub fn practice_advice(total: u32, correct: u32) -> &'static str {
    if total < 10 {
        return "Keep practising to unlock personalised advice.";
    }
    let accuracy = (correct as f64 / total as f64 * 100.0).round();
    if accuracy < 60.0 {
        "Consider lowering the difficulty or focusing on fewer items."
    } else if accuracy < 80.0 {
        "You are improving! Practise more often to build fluency."
    } else {
        "Excellent work! Try a harder setting or a new training type."
    }
}

fn format_duration(seconds: f64) -> String {
    let seconds = seconds.round() as u64;
    if seconds >= 60 {
        format!("{}m {:02}s", seconds / 60, seconds % 60)
    } else {
        format!("{seconds}s")
    }
}

fn stats_column(ui: &mut Ui, title: &str, stats: &TrainingStats) {
    ui.vertical(|ui| {
        ui.label(RichText::new(title).strong());
        ui.label(format!("Sessions: {}", stats.total_sessions));
        ui.label(format!("Questions: {}", stats.total_questions));
        ui.label(format!("Correct: {}", stats.correct_answers));
        ui.label(format!("Accuracy: {:.0}%", stats.accuracy));
        ui.label(format!("Time: {}", format_duration(stats.total_duration as f64)));
    });
}

pub struct ProgressPanel {
    filter: Option<TrainingCategory>,
    confirm_clear: bool,
}

impl ProgressPanel {
    pub fn new() -> Self {
        Self {
            filter: None,
            confirm_clear: false,
        }
    }

    pub fn ui<B: StorageBackend>(&mut self, ui: &mut Ui, store: &TrainingStore<B>) -> ProgressAction {
        let mut action = ProgressAction::None;

        ui.heading("Training Progress");
        ui.horizontal(|ui| {
            ui.label("Show:");
            ui.selectable_value(&mut self.filter, None, "All");
            for category in TrainingCategory::ALL {
                ui.selectable_value(&mut self.filter, Some(category), category.label());
            }
        });
        ui.separator();

        let all_time = store.stats(self.filter, None);
        ui.horizontal(|ui| {
            ui.spacing_mut().item_spacing.x = 32.0;
            stats_column(ui, "Today", &store.today_stats(self.filter));
            stats_column(ui, "This week", &store.week_stats(self.filter));
            stats_column(ui, "All time", &all_time);
        });
        ui.label(
            RichText::new(practice_advice(all_time.total_questions, all_time.correct_answers))
                .italics()
                .color(Color32::from_rgb(220, 195, 90)),
        );

        if self.filter.is_none() {
            ui.add_space(8.0);
            ui.label(RichText::new("By category").strong());
            egui::Grid::new("category_stats").striped(true).spacing([24.0, 4.0]).show(ui, |ui| {
                ui.label("Type");
                ui.label("Sessions");
                ui.label("Questions");
                ui.label("Accuracy");
                ui.label("Avg session");
                ui.end_row();
                for category in TrainingCategory::ALL {
                    let stats = store.stats(Some(category), None);
                    ui.label(category.label());
                    ui.label(stats.total_sessions.to_string());
                    ui.label(stats.total_questions.to_string());
                    ui.label(format!("{:.0}%", stats.accuracy));
                    ui.label(format_duration(stats.average_session_duration));
                    ui.end_row();
                }
            });
        }

        ui.add_space(8.0);
        ui.label(RichText::new("Recent questions").strong());
        let recent = store.recent_questions(self.filter, RECENT_LIMIT);
        if recent.is_empty() {
            ui.label("No answers recorded yet.");
        } else {
            egui::ScrollArea::vertical().max_height(240.0).show(ui, |ui| {
                egui::Grid::new("recent_questions").striped(true).spacing([16.0, 2.0]).show(ui, |ui| {
                    for question in &recent {
                        let when = Local
                            .timestamp_millis_opt(question.timestamp)
                            .single()
                            .map(|t| t.format("%m-%d %H:%M").to_string())
                            .unwrap_or_default();
                        let (mark, color) = if question.is_correct {
                            ("\u{2714}", Color32::from_rgb(110, 200, 120))
                        } else {
                            ("\u{2718}", Color32::from_rgb(220, 90, 90))
                        };
                        ui.label(RichText::new(mark).color(color));
                        ui.label(when);
                        ui.label(question.category.label());
                        ui.label(&question.question);
                        ui.label(format!("\u{2192} {}", question.answer));
                        ui.end_row();
                    }
                });
            });
        }

        ui.add_space(8.0);
        ui.horizontal(|ui| {
            if self.confirm_clear {
                ui.label("Delete all training history?");
                if ui.button("Yes, clear").clicked() {
                    action = ProgressAction::ClearHistory;
                    self.confirm_clear = false;
                }
                if ui.button("Cancel").clicked() {
                    self.confirm_clear = false;
                }
            } else if ui.button("Clear history").clicked() {
                self.confirm_clear = true;
            }
        });

        action
    }
}
