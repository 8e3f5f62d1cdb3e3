//! Feedback tiers shown after a module and their presentation hints.
use serde::{Deserialize, Serialize};

/// Colour family handed to the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    Primary,
    Info,
    Accent,
    Success,
    Warning,
    Destructive,
}

impl Tone {
    /// Stable class-name fragment for styling.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Primary => "primary",
            Self::Info => "info",
            Self::Accent => "accent",
            Self::Success => "success",
            Self::Warning => "warning",
            Self::Destructive => "destructive",
        }
    }
}

/// Banding of a module's aggregate score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedbackTier {
    Success,
    Warning,
    Failure,
}

impl FeedbackTier {
    #[must_use]
    pub const fn tone(self) -> Tone {
        match self {
            Self::Success => Tone::Success,
            Self::Warning => Tone::Warning,
            Self::Failure => Tone::Destructive,
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Success => "High",
            Self::Warning => "Medium",
            Self::Failure => "Low",
        }
    }
}

/// Per-module score thresholds: `score >= high` succeeds, `score >= medium` warns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackBands {
    pub high: u32,
    pub medium: u32,
}

impl FeedbackBands {
    #[must_use]
    pub const fn tier(&self, score: u32) -> FeedbackTier {
        if score >= self.high {
            FeedbackTier::Success
        } else if score >= self.medium {
            FeedbackTier::Warning
        } else {
            FeedbackTier::Failure
        }
    }
}
