//! End-of-course verdict and share line.
use serde::{Deserialize, Serialize};

use crate::constants::{SHARE_REFERENCE_POINTS, VERDICT_DEVELOPING_MIN, VERDICT_MASTER_MIN};
use crate::feedback::Tone;
use crate::offer::OfferKind;
use crate::state::ProgressionState;

/// Verdict band for the final results screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinalVerdict {
    /// 501 points or more
    Master,
    /// 201 to 500 points
    Developing,
    /// Below 201 points
    Beginner,
}

impl FinalVerdict {
    #[must_use]
    pub const fn from_points(points: u32) -> Self {
        if points >= VERDICT_MASTER_MIN {
            Self::Master
        } else if points >= VERDICT_DEVELOPING_MIN {
            Self::Developing
        } else {
            Self::Beginner
        }
    }

    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Master => "Master of Preparation",
            Self::Developing => "Developing Preparer",
            Self::Beginner => "Conscious Beginner",
        }
    }

    #[must_use]
    pub const fn headline(self) -> &'static str {
        match self {
            Self::Master => "Incredible! You have shown real commitment",
            Self::Developing => "Good work on your way to autonomy",
            Self::Beginner => "Your home has important vulnerabilities",
        }
    }

    #[must_use]
    pub const fn tone(self) -> Tone {
        match self {
            Self::Master => Tone::Success,
            Self::Developing => Tone::Warning,
            Self::Beginner => Tone::Destructive,
        }
    }
}

impl std::fmt::Display for FinalVerdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.title())
    }
}

/// Share percentile: `round(points / 1000 * 100)`. Not capped at 100.
#[must_use]
pub const fn share_percentile(points: u32) -> u32 {
    let per_pct = SHARE_REFERENCE_POINTS / 100;
    points.saturating_add(per_pct / 2) / per_pct
}

/// Everything the results screen shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultSummary {
    pub verdict: FinalVerdict,
    pub display_name: String,
    pub preparedness_points: u32,
    pub savings_points: u32,
    pub completed_modules: u32,
    pub total_modules: u32,
    pub badges: usize,
    pub share_percentile: u32,
    pub offer: OfferKind,
}

/// Summarise a finished (or abandoned) progression.
#[must_use]
pub fn result_summary(state: &ProgressionState) -> ResultSummary {
    let points = state.preparedness_points;
    ResultSummary {
        verdict: FinalVerdict::from_points(points),
        display_name: state.display_name().to_string(),
        preparedness_points: points,
        savings_points: state.savings_points,
        completed_modules: state.completed_count(),
        total_modules: state.total_steps,
        badges: state.badges.len(),
        share_percentile: share_percentile(points),
        offer: OfferKind::Final,
    }
}

impl ResultSummary {
    /// One-line text for the share button.
    #[must_use]
    pub fn share_text(&self) -> String {
        format!(
            "I'm in the top {}% of best-prepared households",
            self.share_percentile
        )
    }
}
