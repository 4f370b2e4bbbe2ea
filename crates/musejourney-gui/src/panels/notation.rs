//! Staff notation drawn with the egui painter

use egui::{Align2, Color32, FontId, Pos2, Rect, Sense, Stroke, Ui, Vec2};
use musejourney_core::exercise::PlaybackEvent;
use musejourney_core::notation::{
    Clef, LINE_HEIGHT, NotatedNote, StaveLayout, StavePlacement, TimeSignature, group_notes_into_measures,
};
use musejourney_core::theory;

use super::{PlayRequest, ToolAction};

const LINE_SPACING: f32 = 10.0;
const STAFF_COLOR: Color32 = Color32::from_gray(170);
const NOTE_COLOR: Color32 = Color32::from_gray(230);
const ERROR_COLOR: Color32 = Color32::from_rgb(220, 90, 90);
/// Room for clef, key and time signature on the first stave of a line
const SIGNATURE_WIDTH: f32 = 56.0;
const SECONDS_PER_BEAT: f32 = 0.5;
const DEFAULT_NOTES: &str = "C4/q D4/q E4/q F4/q G4/h G4/h A4/q A4/q A4/q A4/q G4/w";

/// Parse a whitespace separated note list, collecting the tokens that fail
pub fn parse_notes(input: &str) -> (Vec<NotatedNote>, Vec<String>) {
    let mut notes = Vec::new();
    let mut invalid = Vec::new();
    for token in input.split_whitespace() {
        match NotatedNote::parse(token) {
            Ok(note) if note.pitch.midi().is_some() => notes.push(note),
            _ => invalid.push(token.to_string()),
        }
    }
    (notes, invalid)
}

/// One event per note, back to back
pub fn note_events(notes: &[NotatedNote], seconds_per_beat: f32) -> Vec<PlaybackEvent> {
    let mut offset = 0.0;
    notes
        .iter()
        .filter_map(|note| {
            let duration = note.duration.beats() * seconds_per_beat;
            let event = note.pitch.midi().map(|m| PlaybackEvent::new(vec![m], offset, duration));
            offset += duration;
            event
        })
        .collect()
}

/// Vertical offset of a note head from the middle stave line, down positive
fn head_offset(clef: Clef, note: &NotatedNote) -> f32 {
    -(clef.staff_step(&note.pitch) as f32) * LINE_SPACING / 2.0
}

/// Ledger line steps needed for a note `step` lines away from the middle
fn ledger_steps(step: i32) -> Vec<i32> {
    if step >= 6 {
        (6..=step).step_by(2).collect()
    } else if step <= -6 {
        (step..=-6).rev().filter(|s| s % 2 == 0).collect()
    } else {
        Vec::new()
    }
}

pub struct NotationPanel {
    input: String,
    clef: Clef,
    time_signature: String,
    key_signature: String,
}

impl NotationPanel {
    pub fn new() -> Self {
        Self {
            input: DEFAULT_NOTES.to_string(),
            clef: Clef::Treble,
            time_signature: TimeSignature::default().to_string(),
            key_signature: "C major".to_string(),
        }
    }

    pub fn ui(&mut self, ui: &mut Ui) -> ToolAction {
        let mut action = ToolAction::None;

        ui.heading("Notation");
        ui.horizontal(|ui| {
            ui.label("Notes:");
            ui.add(egui::TextEdit::singleline(&mut self.input).desired_width(360.0));
        });
        ui.horizontal(|ui| {
            ui.label("Clef:");
            egui::ComboBox::from_id_salt("notation_clef")
                .selected_text(self.clef.name())
                .show_ui(ui, |ui| {
                    for clef in [Clef::Treble, Clef::Bass, Clef::Alto, Clef::Tenor] {
                        ui.selectable_value(&mut self.clef, clef, clef.name());
                    }
                });
            ui.label("Time:");
            ui.add(egui::TextEdit::singleline(&mut self.time_signature).desired_width(40.0));
            ui.label("Key:");
            super::key_picker(ui, "notation_key", &mut self.key_signature);
        });

        let (notes, invalid) = parse_notes(&self.input);
        let time_signature = match self.time_signature.parse::<TimeSignature>() {
            Ok(ts) => ts,
            Err(e) => {
                ui.label(egui::RichText::new(e).color(ERROR_COLOR));
                TimeSignature::default()
            }
        };
        if !invalid.is_empty() {
            ui.label(egui::RichText::new(format!("Skipped: {}", invalid.join(" "))).color(ERROR_COLOR));
        }

        if ui.add_enabled(!notes.is_empty(), egui::Button::new("\u{25B6} Play")).clicked() {
            action = ToolAction::Play(PlayRequest::Events(note_events(&notes, SECONDS_PER_BEAT)));
        }

        let measures = group_notes_into_measures(&notes, time_signature);
        let width = ui.available_width().max(200.0);
        let placements = StaveLayout::compute(measures.len(), width);
        let lines = placements.last().map(|p| p.line + 1).unwrap_or(1);
        let height = 40.0 + lines as f32 * LINE_HEIGHT;

        let (response, painter) = ui.allocate_painter(Vec2::new(width, height), Sense::hover());
        let origin = response.rect.min.to_vec2();
        let signature = theory::key_info(&self.key_signature).map(|k| k.signature).unwrap_or(0);

        for (measure, placement) in measures.iter().zip(&placements) {
            let placement = StavePlacement {
                x: placement.x + origin.x,
                y: placement.y + origin.y,
                ..*placement
            };
            self.draw_stave(&painter, &placement, time_signature, signature);
            self.draw_measure(&painter, &placement, measure);
        }

        action
    }

    fn draw_stave(&self, painter: &egui::Painter, p: &StavePlacement, ts: TimeSignature, signature: i8) {
        for i in 0..5 {
            let y = p.y + i as f32 * LINE_SPACING;
            painter.line_segment([Pos2::new(p.x, y), Pos2::new(p.x + p.width, y)], Stroke::new(1.0, STAFF_COLOR));
        }
        let bottom = p.y + 4.0 * LINE_SPACING;
        painter.line_segment([Pos2::new(p.x + p.width, p.y), Pos2::new(p.x + p.width, bottom)], Stroke::new(1.0, STAFF_COLOR));

        if !p.show_signature {
            return;
        }
        painter.line_segment([Pos2::new(p.x, p.y), Pos2::new(p.x, bottom)], Stroke::new(1.0, STAFF_COLOR));
        let clef_label = match self.clef {
            Clef::Treble => "\u{1D11E}",
            Clef::Bass => "\u{1D122}",
            Clef::Alto | Clef::Tenor => "\u{1D121}",
        };
        painter.text(Pos2::new(p.x + 10.0, p.y + 2.0 * LINE_SPACING), Align2::CENTER_CENTER, clef_label, FontId::proportional(28.0), NOTE_COLOR);
        if signature != 0 {
            let symbol = if signature > 0 { "\u{266F}" } else { "\u{266D}" };
            painter.text(
                Pos2::new(p.x + 22.0, p.y + LINE_SPACING),
                Align2::LEFT_CENTER,
                symbol.repeat(signature.unsigned_abs() as usize),
                FontId::proportional(11.0),
                NOTE_COLOR,
            );
        }
        let ts_x = p.x + SIGNATURE_WIDTH - 10.0;
        painter.text(Pos2::new(ts_x, p.y + LINE_SPACING), Align2::CENTER_CENTER, ts.beats.to_string(), FontId::proportional(14.0), NOTE_COLOR);
        painter.text(Pos2::new(ts_x, p.y + 3.0 * LINE_SPACING), Align2::CENTER_CENTER, ts.beat_value.to_string(), FontId::proportional(14.0), NOTE_COLOR);
    }

    fn draw_measure(&self, painter: &egui::Painter, p: &StavePlacement, measure: &[NotatedNote]) {
        let lead = if p.show_signature { SIGNATURE_WIDTH } else { 10.0 };
        let usable = (p.width - lead - 10.0).max(10.0);
        let step_x = usable / measure.len().max(1) as f32;
        let middle = p.y + 2.0 * LINE_SPACING;

        for (i, note) in measure.iter().enumerate() {
            let x = p.x + lead + step_x * (i as f32 + 0.5);
            let y = middle + head_offset(self.clef, note);
            let step = self.clef.staff_step(&note.pitch);

            for ledger in ledger_steps(step) {
                let ly = middle - ledger as f32 * LINE_SPACING / 2.0;
                painter.line_segment([Pos2::new(x - 9.0, ly), Pos2::new(x + 9.0, ly)], Stroke::new(1.0, STAFF_COLOR));
            }

            let head = Rect::from_center_size(Pos2::new(x, y), Vec2::new(11.0, 8.0));
            if note.duration.is_filled() {
                painter.rect_filled(head, 4.0, NOTE_COLOR);
            } else {
                painter.rect_stroke(head, 4.0, Stroke::new(1.5, NOTE_COLOR), egui::StrokeKind::Inside);
            }
            if note.pitch.accidental != 0 {
                let symbol = if note.pitch.accidental > 0 { "\u{266F}" } else { "\u{266D}" };
                painter.text(Pos2::new(x - 12.0, y), Align2::CENTER_CENTER, symbol, FontId::proportional(12.0), NOTE_COLOR);
            }

            if note.duration.beats() >= 4.0 {
                continue;
            }
            // Stems point away from the middle line
            let (stem_x, stem_end, flag_dir) = if step < 0 {
                (x + 5.0, y - 3.5 * LINE_SPACING, 1.0)
            } else {
                (x - 5.0, y + 3.5 * LINE_SPACING, -1.0)
            };
            painter.line_segment([Pos2::new(stem_x, y), Pos2::new(stem_x, stem_end)], Stroke::new(1.2, NOTE_COLOR));
            for f in 0..note.duration.flags() {
                let fy = stem_end + flag_dir * f as f32 * 6.0;
                painter.line_segment([Pos2::new(stem_x, fy), Pos2::new(stem_x + 7.0, fy + flag_dir * 8.0)], Stroke::new(1.2, NOTE_COLOR));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use musejourney_core::notation::NoteDuration;

    #[test]
    fn test_parse_notes_skips_invalid() {
        let (notes, invalid) = parse_notes("C4/q H4/q E4 G/h Bb3/8");
        assert_eq!(notes.len(), 3);
        assert_eq!(notes[1].duration, NoteDuration::Quarter);
        assert_eq!(notes[2].duration, NoteDuration::Eighth);
        // Unknown letter and a pitch without octave
        assert_eq!(invalid, vec!["H4/q", "G/h"]);
    }

    #[test]
    fn test_note_events_are_sequential() {
        let (notes, _) = parse_notes("C4/q E4/h G4/8");
        let events = note_events(&notes, 0.5);
        assert_eq!(events.len(), 3);
        assert_eq!(events[0], PlaybackEvent::new(vec![60], 0.0, 0.5));
        assert_eq!(events[1], PlaybackEvent::new(vec![64], 0.5, 1.0));
        assert_eq!(events[2], PlaybackEvent::new(vec![67], 1.5, 0.25));
    }

    #[test]
    fn test_head_offset_treble() {
        let (notes, _) = parse_notes("B4 C5 A4");
        assert_eq!(head_offset(Clef::Treble, &notes[0]), 0.0);
        assert_eq!(head_offset(Clef::Treble, &notes[1]), -5.0);
        assert_eq!(head_offset(Clef::Treble, &notes[2]), 5.0);
    }

    #[test]
    fn test_ledger_lines() {
        assert!(ledger_steps(4).is_empty());
        // Middle C in treble clef sits one ledger below
        assert_eq!(ledger_steps(-6), vec![-6]);
        assert_eq!(ledger_steps(-9), vec![-6, -8]);
        assert_eq!(ledger_steps(7), vec![6]);
    }
}
