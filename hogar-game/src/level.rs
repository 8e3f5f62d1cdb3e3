//! Preparedness level derived from cumulative points.
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::constants::{LEVEL_ARCHITECT_MIN, LEVEL_EXPLORER_MIN, LEVEL_MASTER_MIN};

/// Discrete level shown next to the player's name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Novice,
    Explorer,
    Architect,
    Master,
}

impl Level {
    /// Map cumulative preparedness points onto a level.
    #[must_use]
    pub const fn from_points(points: u32) -> Self {
        if points >= LEVEL_MASTER_MIN {
            Self::Master
        } else if points >= LEVEL_ARCHITECT_MIN {
            Self::Architect
        } else if points >= LEVEL_EXPLORER_MIN {
            Self::Explorer
        } else {
            Self::Novice
        }
    }

    /// Tier number, 1 through 4.
    #[must_use]
    pub const fn tier(self) -> u8 {
        match self {
            Self::Novice => 1,
            Self::Explorer => 2,
            Self::Architect => 3,
            Self::Master => 4,
        }
    }

    /// Display name of the level.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Novice => "Novice",
            Self::Explorer => "Explorer",
            Self::Architect => "Architect",
            Self::Master => "Master",
        }
    }

    /// Points still missing to reach the next level, `None` at the top.
    #[must_use]
    pub const fn points_to_next(points: u32) -> Option<u32> {
        match Self::from_points(points) {
            Self::Novice => Some(LEVEL_EXPLORER_MIN - points),
            Self::Explorer => Some(LEVEL_ARCHITECT_MIN - points),
            Self::Architect => Some(LEVEL_MASTER_MIN - points),
            Self::Master => None,
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Level {}: {}", self.tier(), self.label())
    }
}

/// Convenience wrapper returning `(tier, label)`.
#[must_use]
pub const fn level(points: u32) -> (u8, &'static str) {
    let lvl = Level::from_points(points);
    (lvl.tier(), lvl.label())
}
