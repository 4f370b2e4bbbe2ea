//! Trainer settings with defaults and partial updates
//!
//! Every struct is `#[serde(default)]`, so a stored blob missing any block or
//! field reads back fully populated.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntervalPlaybackMode {
    #[default]
    Ascending,
    Descending,
    Harmonic,
    Random,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChordPlaybackMode {
    #[default]
    Block,
    Arpeggio,
    Random,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyboardSize {
    Small,
    #[default]
    Medium,
    Large,
}

macro_rules! labels {
    ($ty:ty { $($variant:ident => $label:expr),* $(,)? }) => {
        impl $ty {
            pub const ALL: &'static [Self] = &[$(Self::$variant),*];

            pub fn label(&self) -> &'static str {
                match self {
                    $(Self::$variant => $label),*
                }
            }
        }
    };
}

labels!(Difficulty { Beginner => "Beginner", Intermediate => "Intermediate", Advanced => "Advanced" });
labels!(IntervalPlaybackMode { Ascending => "Ascending", Descending => "Descending", Harmonic => "Harmonic", Random => "Random" });
labels!(ChordPlaybackMode { Block => "Block", Arpeggio => "Arpeggio", Random => "Random" });
labels!(KeyboardSize { Small => "Small", Medium => "Medium", Large => "Large" });

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct IntervalSettings {
    pub selected_intervals: Vec<String>,
    pub playback_mode: IntervalPlaybackMode,
    pub difficulty: Difficulty,
}

impl Default for IntervalSettings {
    fn default() -> Self {
        Self {
            selected_intervals: strings(&["m2", "M2", "m3", "M3", "P4", "A4/d5", "P5", "m6", "M6", "m7", "M7", "P8"]),
            playback_mode: IntervalPlaybackMode::Ascending,
            difficulty: Difficulty::Beginner,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ChordSettings {
    pub selected_chord_types: Vec<String>,
    pub identify_root: bool,
    pub identify_type: bool,
    pub playback_mode: ChordPlaybackMode,
    pub difficulty: Difficulty,
}

impl Default for ChordSettings {
    fn default() -> Self {
        Self {
            selected_chord_types: strings(&["maj", "min", "aug", "dim", "maj7", "7", "min7", "m7b5", "dim7"]),
            identify_root: true,
            identify_type: true,
            playback_mode: ChordPlaybackMode::Block,
            difficulty: Difficulty::Beginner,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProgressionSettings {
    pub selected_progressions: Vec<String>,
    pub difficulty: Difficulty,
}

impl Default for ProgressionSettings {
    fn default() -> Self {
        Self {
            selected_progressions: strings(&["I-IV-V-I", "I-V-vi-IV", "ii-V-I", "I-vi-IV-V", "vi-IV-I-V"]),
            difficulty: Difficulty::Beginner,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GeneralSettings {
    pub auto_play_enabled: bool,
    pub show_keyboard: bool,
    pub keyboard_size: KeyboardSize,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            auto_play_enabled: true,
            show_keyboard: true,
            keyboard_size: KeyboardSize::Medium,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingSettings {
    pub interval: IntervalSettings,
    pub chord: ChordSettings,
    pub progression: ProgressionSettings,
    pub general: GeneralSettings,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IntervalSettingsPatch {
    pub selected_intervals: Option<Vec<String>>,
    pub playback_mode: Option<IntervalPlaybackMode>,
    pub difficulty: Option<Difficulty>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChordSettingsPatch {
    pub selected_chord_types: Option<Vec<String>>,
    pub identify_root: Option<bool>,
    pub identify_type: Option<bool>,
    pub playback_mode: Option<ChordPlaybackMode>,
    pub difficulty: Option<Difficulty>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProgressionSettingsPatch {
    pub selected_progressions: Option<Vec<String>>,
    pub difficulty: Option<Difficulty>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeneralSettingsPatch {
    pub auto_play_enabled: Option<bool>,
    pub show_keyboard: Option<bool>,
    pub keyboard_size: Option<KeyboardSize>,
}

fn set<T>(target: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *target = value;
    }
}

impl IntervalSettingsPatch {
    pub fn merge(self, settings: &mut IntervalSettings) {
        set(&mut settings.selected_intervals, self.selected_intervals);
        set(&mut settings.playback_mode, self.playback_mode);
        set(&mut settings.difficulty, self.difficulty);
    }
}

impl ChordSettingsPatch {
    pub fn merge(self, settings: &mut ChordSettings) {
        set(&mut settings.selected_chord_types, self.selected_chord_types);
        set(&mut settings.identify_root, self.identify_root);
        set(&mut settings.identify_type, self.identify_type);
        set(&mut settings.playback_mode, self.playback_mode);
        set(&mut settings.difficulty, self.difficulty);
    }
}

impl ProgressionSettingsPatch {
    pub fn merge(self, settings: &mut ProgressionSettings) {
        set(&mut settings.selected_progressions, self.selected_progressions);
        set(&mut settings.difficulty, self.difficulty);
    }
}

impl GeneralSettingsPatch {
    pub fn merge(self, settings: &mut GeneralSettings) {
        set(&mut settings.auto_play_enabled, self.auto_play_enabled);
        set(&mut settings.show_keyboard, self.show_keyboard);
        set(&mut settings.keyboard_size, self.keyboard_size);
    }
}

/// A partial update to one settings block
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingsPatch {
    Interval(IntervalSettingsPatch),
    Chord(ChordSettingsPatch),
    Progression(ProgressionSettingsPatch),
    General(GeneralSettingsPatch),
}

impl SettingsPatch {
    pub fn apply(self, settings: &mut TrainingSettings) {
        match self {
            Self::Interval(patch) => patch.merge(&mut settings.interval),
            Self::Chord(patch) => patch.merge(&mut settings.chord),
            Self::Progression(patch) => patch.merge(&mut settings.progression),
            Self::General(patch) => patch.merge(&mut settings.general),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_blob_backfills() {
        let json = r#"{"chord": {"identifyRoot": false}, "general": {"keyboardSize": "large"}}"#;
        let settings: TrainingSettings = serde_json::from_str(json).unwrap();
        assert!(!settings.chord.identify_root);
        assert!(settings.chord.identify_type);
        assert_eq!(settings.chord.selected_chord_types.len(), 9);
        assert_eq!(settings.general.keyboard_size, KeyboardSize::Large);
        assert!(settings.general.auto_play_enabled);
        assert_eq!(settings.interval, IntervalSettings::default());
        assert_eq!(settings.progression, ProgressionSettings::default());
    }

    #[test]
    fn test_blob_layout() {
        let json = serde_json::to_value(TrainingSettings::default()).unwrap();
        assert_eq!(json["interval"]["playbackMode"], "ascending");
        assert_eq!(json["interval"]["selectedIntervals"][5], "A4/d5");
        assert_eq!(json["chord"]["playbackMode"], "block");
        assert_eq!(json["general"]["autoPlayEnabled"], true);
    }

    #[test]
    fn test_patch_touches_only_set_fields() {
        let mut settings = TrainingSettings::default();
        SettingsPatch::Chord(ChordSettingsPatch {
            identify_root: Some(false),
            ..Default::default()
        })
        .apply(&mut settings);

        let defaults = ChordSettings::default();
        assert!(!settings.chord.identify_root);
        assert_eq!(settings.chord.identify_type, defaults.identify_type);
        assert_eq!(settings.chord.selected_chord_types, defaults.selected_chord_types);
        assert_eq!(settings.chord.playback_mode, defaults.playback_mode);
        assert_eq!(settings.interval, IntervalSettings::default());
    }
}
