//! Training history, settings and statistics

mod settings;
mod stats;
mod store;
mod types;

pub use settings::{
    ChordPlaybackMode, ChordSettings, ChordSettingsPatch, Difficulty, GeneralSettings, GeneralSettingsPatch,
    IntervalPlaybackMode, IntervalSettings, IntervalSettingsPatch, KeyboardSize, ProgressionSettings,
    ProgressionSettingsPatch, SettingsPatch, TrainingSettings,
};
pub use stats::{TimeRange, TrainingStats, compute_stats};
pub use store::{
    FileBackend, HISTORY_KEY, MAX_QUESTIONS, MemoryBackend, SETTINGS_KEY, StorageBackend, TrainingStore,
    generate_id, generate_id_with,
};
pub use types::{NewQuestion, QuestionDetail, TrainingCategory, TrainingHistory, TrainingQuestion, TrainingSession};
