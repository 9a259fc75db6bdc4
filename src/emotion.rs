/// Shown wherever a frame has no label or confidence.
pub const PLACEHOLDER: &str = "-";

/// The closed set of emotions the backend classifies frames into.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Emotion {
    Happy,
    Sad,
    Neutral,
}

impl Emotion {
    pub const ALL: [Emotion; 3] = [Emotion::Happy, Emotion::Sad, Emotion::Neutral];

    /// Labels are matched exactly as the backend emits them.
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|emotion| emotion.label() == label)
    }

    pub fn label(self) -> &'static str {
        match self {
            Emotion::Happy => "Happy",
            Emotion::Sad => "Sad",
            Emotion::Neutral => "Neutral",
        }
    }

    /// File name of the emoji image for this emotion.
    pub fn asset_file(self) -> &'static str {
        match self {
            Emotion::Happy => "happy.svg",
            Emotion::Sad => "sad.svg",
            Emotion::Neutral => "neutral.svg",
        }
    }
}
