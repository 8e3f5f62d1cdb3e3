//! Persisted progression snapshot and the values derived from it.
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::constants::DEFAULT_TOTAL_STEPS;
use crate::gating::{self, ModuleStatus};
use crate::level::Level;
use crate::offer;

/// Recorded scores keyed by question id.
pub type QuestionScores = BTreeMap<u32, u32>;

/// Persisted progression snapshot.
///
/// Field names follow the stored blob layout. Missing fields fall back to
/// their defaults, so an older blob is accepted as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProgressionState {
    /// Finished module/step ids. Gating reads membership only.
    pub completed_steps: Vec<u32>,
    /// Highest unlocked step; never decreases.
    pub current_step: u32,
    pub total_steps: u32,
    pub preparedness_points: u32,
    /// Projected savings in euros, tracked apart from preparedness.
    pub savings_points: u32,
    pub badges: Vec<String>,
    pub email: String,
    pub has_started: bool,
    pub module_answers: BTreeMap<u32, QuestionScores>,
    pub current_module: Option<u32>,
}

impl Default for ProgressionState {
    fn default() -> Self {
        Self {
            completed_steps: Vec::new(),
            current_step: 0,
            total_steps: DEFAULT_TOTAL_STEPS,
            preparedness_points: 0,
            savings_points: 0,
            badges: Vec::new(),
            email: String::new(),
            has_started: false,
            module_answers: BTreeMap::new(),
            current_module: None,
        }
    }
}

impl ProgressionState {
    #[must_use]
    pub fn level(&self) -> Level {
        Level::from_points(self.preparedness_points)
    }

    #[must_use]
    pub fn module_status(&self, module_id: u32) -> ModuleStatus {
        gating::module_status(module_id, &self.completed_steps)
    }

    #[must_use]
    pub fn is_completed(&self, step: u32) -> bool {
        self.completed_steps.contains(&step)
    }

    /// Sum of the answers recorded for `module_id`, 0 when none exist.
    #[must_use]
    pub fn module_score(&self, module_id: u32) -> u32 {
        self.module_answers
            .get(&module_id)
            .map_or(0, |answers| answers.values().fold(0u32, |acc, p| acc.saturating_add(*p)))
    }

    /// Distinct completed ids within `1..=total_steps`.
    ///
    /// Roadmap steps share the id space and may record ids past the module
    /// range; those do not count towards progress.
    #[must_use]
    pub fn completed_count(&self) -> u32 {
        let counted: BTreeSet<u32> = self
            .completed_steps
            .iter()
            .copied()
            .filter(|id| (1..=self.total_steps).contains(id))
            .collect();
        u32::try_from(counted.len()).unwrap_or(u32::MAX)
    }

    /// Share of completed steps, in percent. Never above 100.
    #[must_use]
    pub fn progress_percent(&self) -> f64 {
        if self.total_steps == 0 {
            return 0.0;
        }
        (f64::from(self.completed_count()) * 100.0 / f64::from(self.total_steps)).min(100.0)
    }

    #[must_use]
    pub fn should_show_offer(&self) -> bool {
        offer::should_show_offer(self.progress_percent(), &self.badges)
    }

    #[must_use]
    pub fn has_badge(&self, label: &str) -> bool {
        self.badges.iter().any(|b| b == label)
    }

    /// Local part of the email, used as a greeting.
    #[must_use]
    pub fn display_name(&self) -> &str {
        display_name(&self.email)
    }

    /// Preparedness and savings combined, as shown in the header.
    #[must_use]
    pub const fn total_points(&self) -> u32 {
        self.preparedness_points.saturating_add(self.savings_points)
    }
}

/// Everything before the first `@`, or the whole string when there is none.
#[must_use]
pub fn display_name(email: &str) -> &str {
    email.split('@').next().unwrap_or(email)
}
