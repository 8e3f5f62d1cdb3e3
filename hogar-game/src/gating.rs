//! Linear unlock chain for dashboard modules.
use serde::{Deserialize, Serialize};

use crate::constants::FIRST_MODULE_ID;

/// Whether a module can be played.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModuleStatus {
    Locked,
    Available,
    Completed,
}

impl ModuleStatus {
    #[must_use]
    pub const fn is_playable(self) -> bool {
        matches!(self, Self::Available)
    }
}

/// Status of `module_id` given the set of completed steps.
///
/// The entry module is always available until completed. Every other module
/// unlocks only once its immediate predecessor (`module_id - 1`) is done.
#[must_use]
pub fn module_status(module_id: u32, completed_steps: &[u32]) -> ModuleStatus {
    if completed_steps.contains(&module_id) {
        return ModuleStatus::Completed;
    }
    if module_id == FIRST_MODULE_ID {
        return ModuleStatus::Available;
    }
    match module_id.checked_sub(1) {
        Some(prev) if completed_steps.contains(&prev) => ModuleStatus::Available,
        _ => ModuleStatus::Locked,
    }
}

/// Predecessor that must be completed before `module_id` unlocks.
#[must_use]
pub fn predecessor(module_id: u32) -> Option<u32> {
    if module_id <= FIRST_MODULE_ID {
        None
    } else {
        Some(module_id - 1)
    }
}
