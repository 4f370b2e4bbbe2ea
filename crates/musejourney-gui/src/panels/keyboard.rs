//! On-screen piano keyboard

use std::ops::RangeInclusive;

use egui::{Align2, Color32, FontId, Pos2, Rect, Sense, Stroke, StrokeKind, Ui, Vec2};
use musejourney_core::training::KeyboardSize;
use musejourney_core::{is_black_key, midi_note_to_name};

const WHITE_KEY: Color32 = Color32::from_gray(235);
const BLACK_KEY: Color32 = Color32::from_gray(30);
const KEY_BORDER: Color32 = Color32::from_gray(90);
const KEY_HIGHLIGHT: Color32 = Color32::from_rgb(220, 195, 90); // warm yellow
const KEY_PRESSED: Color32 = Color32::from_rgb(140, 200, 240); // played or held

const WHITE_KEY_WIDTH: f32 = 32.0;
const KEY_HEIGHT: f32 = 120.0;
const BLACK_WIDTH_RATIO: f32 = 0.6;
const BLACK_HEIGHT_RATIO: f32 = 0.62;

/// Action returned from the keyboard
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyboardAction {
    None,
    NoteOn(u8),
}

/// One drawn key
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeyShape {
    pub midi: u8,
    pub rect: Rect,
    pub black: bool,
}

/// Key rectangles for `range` laid out inside `bounds`, white keys first
pub fn key_shapes(range: RangeInclusive<u8>, bounds: Rect) -> Vec<KeyShape> {
    let white_count = range.clone().filter(|&n| !is_black_key(n)).count().max(1);
    let white_width = bounds.width() / white_count as f32;
    let black_width = white_width * BLACK_WIDTH_RATIO;
    let black_height = bounds.height() * BLACK_HEIGHT_RATIO;

    let mut whites = Vec::new();
    let mut blacks = Vec::new();
    let mut white_index = 0;
    for midi in range {
        if is_black_key(midi) {
            // Straddles the boundary with the previous white key
            let center = bounds.left() + white_index as f32 * white_width;
            let rect = Rect::from_min_size(
                Pos2::new(center - black_width / 2.0, bounds.top()),
                Vec2::new(black_width, black_height),
            );
            blacks.push(KeyShape { midi, rect, black: true });
        } else {
            let rect = Rect::from_min_size(
                Pos2::new(bounds.left() + white_index as f32 * white_width, bounds.top()),
                Vec2::new(white_width, bounds.height()),
            );
            whites.push(KeyShape { midi, rect, black: false });
            white_index += 1;
        }
    }
    whites.extend(blacks);
    whites
}

/// Key under `pos`; black keys sit on top
pub fn key_at(shapes: &[KeyShape], pos: Pos2) -> Option<u8> {
    shapes
        .iter()
        .rev()
        .find(|k| k.rect.contains(pos))
        .map(|k| k.midi)
}

pub fn range_for_size(size: KeyboardSize) -> RangeInclusive<u8> {
    match size {
        KeyboardSize::Small => 60..=72,
        KeyboardSize::Medium => 48..=72,
        KeyboardSize::Large => 36..=84,
    }
}

/// Range that shows `notes` with some room, clamped to C2..C6
pub fn range_around(notes: &[u8]) -> RangeInclusive<u8> {
    let (Some(&low), Some(&high)) = (notes.iter().min(), notes.iter().max()) else {
        return 48..=72;
    };
    let mut start = low.saturating_sub(5).max(36);
    let end = high.saturating_add(5).min(84).max(start);
    // Start on a white key so the first black key is not clipped
    if is_black_key(start) {
        start -= 1;
    }
    start..=end
}

pub struct PianoKeyboard {
    range: RangeInclusive<u8>,
    /// Last key sounded during the current drag
    last_touched: Option<u8>,
}

impl PianoKeyboard {
    pub fn new(range: RangeInclusive<u8>) -> Self {
        Self {
            range,
            last_touched: None,
        }
    }

    pub fn set_range(&mut self, range: RangeInclusive<u8>) {
        self.range = range;
    }

    /// `highlighted` marks answer or chord notes; `held` marks notes sounding now
    pub fn ui(&mut self, ui: &mut Ui, highlighted: &[u8], held: &[u8]) -> KeyboardAction {
        let white_count = self.range.clone().filter(|&n| !is_black_key(n)).count().max(1);
        let width = (white_count as f32 * WHITE_KEY_WIDTH).min(ui.available_width());
        let (response, painter) = ui.allocate_painter(Vec2::new(width, KEY_HEIGHT), Sense::click_and_drag());
        let shapes = key_shapes(self.range.clone(), response.rect);

        let mut action = KeyboardAction::None;
        if response.is_pointer_button_down_on() {
            let hovered = response.interact_pointer_pos().and_then(|pos| key_at(&shapes, pos));
            if let Some(note) = hovered {
                if self.last_touched != Some(note) {
                    self.last_touched = Some(note);
                    action = KeyboardAction::NoteOn(note);
                }
            }
        } else {
            self.last_touched = None;
        }

        for key in &shapes {
            let pressed = held.contains(&key.midi) || self.last_touched == Some(key.midi);
            let fill = if pressed {
                KEY_PRESSED
            } else if highlighted.contains(&key.midi) {
                KEY_HIGHLIGHT
            } else if key.black {
                BLACK_KEY
            } else {
                WHITE_KEY
            };
            painter.rect_filled(key.rect, 2.0, fill);
            painter.rect_stroke(key.rect, 2.0, Stroke::new(1.0, KEY_BORDER), StrokeKind::Inside);

            if !key.black {
                painter.text(
                    Pos2::new(key.rect.center().x, key.rect.bottom() - 10.0),
                    Align2::CENTER_CENTER,
                    midi_note_to_name(key.midi),
                    FontId::proportional(9.0),
                    Color32::from_gray(70),
                );
            }
        }

        action
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bounds(width: f32) -> Rect {
        Rect::from_min_size(Pos2::ZERO, Vec2::new(width, 100.0))
    }

    #[test]
    fn test_one_octave_layout() {
        let shapes = key_shapes(60..=72, bounds(160.0));
        assert_eq!(shapes.len(), 13);
        assert_eq!(shapes.iter().filter(|k| !k.black).count(), 8);
        // C#4 straddles C4 and D4
        let cs = shapes.iter().find(|k| k.midi == 61).unwrap();
        assert!(cs.black);
        assert!((cs.rect.center().x - 20.0).abs() < 0.01);
        assert!(cs.rect.height() < 100.0);
    }

    #[test]
    fn test_hit_test_prefers_black() {
        let shapes = key_shapes(60..=72, bounds(160.0));
        assert_eq!(key_at(&shapes, Pos2::new(20.0, 10.0)), Some(61));
        assert_eq!(key_at(&shapes, Pos2::new(15.0, 90.0)), Some(60));
        assert_eq!(key_at(&shapes, Pos2::new(155.0, 50.0)), Some(72));
        assert_eq!(key_at(&shapes, Pos2::new(200.0, 50.0)), None);
    }

    #[test]
    fn test_size_ranges() {
        assert_eq!(range_for_size(KeyboardSize::Small), 60..=72);
        assert_eq!(range_for_size(KeyboardSize::Medium), 48..=72);
        assert_eq!(range_for_size(KeyboardSize::Large), 36..=84);
    }

    #[test]
    fn test_range_around() {
        assert_eq!(range_around(&[60, 64, 67]), 55..=72);
        assert_eq!(range_around(&[36, 40]), 36..=45);
        assert_eq!(range_around(&[]), 48..=72);
        // 66 - 5 = 61 is black, so start drops to C
        assert_eq!(range_around(&[66]), 60..=71);
    }
}
