//! App-level types

/// Top-level page shown in the central panel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Intervals,
    Chords,
    Progressions,
    ChordLookup,
    Scales,
    ProgressionExplorer,
    Notation,
    Harmony,
    Progress,
    Settings,
}

impl View {
    pub const TRAINING: [View; 3] = [Self::Intervals, Self::Chords, Self::Progressions];
    pub const TOOLS: [View; 5] = [
        Self::ChordLookup,
        Self::Scales,
        Self::ProgressionExplorer,
        Self::Notation,
        Self::Harmony,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Intervals => "Intervals",
            Self::Chords => "Chords",
            Self::Progressions => "Progressions",
            Self::ChordLookup => "Chord Lookup",
            Self::Scales => "Scales",
            Self::ProgressionExplorer => "Progression Explorer",
            Self::Notation => "Notation",
            Self::Harmony => "Harmony",
            Self::Progress => "Progress",
            Self::Settings => "Settings",
        }
    }

    pub fn is_trainer(self) -> bool {
        Self::TRAINING.contains(&self)
    }
}

/// Seconds per note or chord for one-shot playback
pub const NOTE_SECONDS: f32 = 0.5;
pub const CHORD_SECONDS: f32 = 1.5;
pub const SCALE_STEP_SECONDS: f32 = 0.3;
