//! Ten-step roadmap driven by the `current_step` pointer.
use log::{debug, warn};
use serde::Serialize;

use crate::ProgressStorage;
use crate::constants::ROADMAP_SAVINGS_PER_STEP;
use crate::data::RoadmapStep;
use crate::state::ProgressionState;
use crate::store::{Completion, Store};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    Done,
    Next,
    Locked,
}

/// Read-only view over the catalog's roadmap.
#[derive(Debug, Clone, Copy)]
pub struct Roadmap<'a> {
    steps: &'a [RoadmapStep],
}

impl<'a> Roadmap<'a> {
    #[must_use]
    pub const fn new(steps: &'a [RoadmapStep]) -> Self {
        Self { steps }
    }

    #[must_use]
    pub const fn steps(&self) -> &'a [RoadmapStep] {
        self.steps
    }

    #[must_use]
    pub fn status(state: &ProgressionState, step: &RoadmapStep) -> StepStatus {
        let next = state.current_step.saturating_add(1);
        if step.id < next {
            StepStatus::Done
        } else if step.id == next {
            StepStatus::Next
        } else {
            StepStatus::Locked
        }
    }

    /// Step whose id is `current_step + 1`, if the roadmap has one.
    #[must_use]
    pub fn next_step(&self, state: &ProgressionState) -> Option<&'a RoadmapStep> {
        let next = state.current_step.saturating_add(1);
        self.steps.iter().find(|step| step.id == next)
    }

    /// Steps done so far, for the `k/10` counter.
    #[must_use]
    pub fn done_count(&self, state: &ProgressionState) -> usize {
        self.steps
            .iter()
            .filter(|step| Self::status(state, step) == StepStatus::Done)
            .count()
    }

    /// Take step `step_id`, granting its points plus the flat savings bonus.
    ///
    /// Only the next step can be taken; anything else returns `None`.
    pub fn take<S: ProgressStorage>(
        &self,
        store: &mut Store<S>,
        step_id: u32,
    ) -> Option<Completion> {
        let Some(step) = self.next_step(store.state()) else {
            warn!("roadmap has no step after {}", store.state().current_step);
            return None;
        };
        if step.id != step_id {
            debug!("roadmap step {step_id} is not next (next is {})", step.id);
            return None;
        }
        // Recording `id - 1` lands the pointer on `id`.
        Some(store.complete_step(
            step.id.saturating_sub(1),
            step.points,
            ROADMAP_SAVINGS_PER_STEP,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::ModuleCatalog;
    use crate::storage::MemoryStorage;

    fn roadmap() -> Roadmap<'static> {
        Roadmap::new(&ModuleCatalog::load_from_static().unwrap().roadmap)
    }

    #[test]
    fn next_step_follows_pointer() {
        let mut state = ProgressionState::default();
        assert_eq!(roadmap().next_step(&state).unwrap().id, 1);
        state.current_step = 4;
        let next = roadmap().next_step(&state).unwrap();
        assert_eq!((next.id, next.points), (5, 150));
        state.current_step = 10;
        assert!(roadmap().next_step(&state).is_none());
    }

    #[test]
    fn statuses_split_on_pointer() {
        let state = ProgressionState {
            current_step: 2,
            ..ProgressionState::default()
        };
        let statuses: Vec<_> = roadmap()
            .steps()
            .iter()
            .take(4)
            .map(|step| Roadmap::status(&state, step))
            .collect();
        assert_eq!(
            statuses,
            [
                StepStatus::Done,
                StepStatus::Done,
                StepStatus::Next,
                StepStatus::Locked
            ]
        );
        assert_eq!(roadmap().done_count(&state), 2);
    }

    #[test]
    fn taking_next_step_grants_points_and_savings() {
        let mut store = Store::open(MemoryStorage::new());
        store.complete_step(0, 0, 0);
        assert_eq!(store.state().current_step, 1);

        let completion = roadmap().take(&mut store, 2).unwrap();
        assert_eq!(completion, Completion::Completed { score: 100 });
        assert_eq!(store.state().current_step, 2);
        assert_eq!(store.state().preparedness_points, 100);
        assert_eq!(store.state().savings_points, 10);
        assert_eq!(roadmap().next_step(store.state()).unwrap().id, 3);
    }

    #[test]
    fn only_next_step_can_be_taken() {
        let mut store = Store::open(MemoryStorage::new());
        assert!(roadmap().take(&mut store, 3).is_none());
        assert_eq!(store.state().preparedness_points, 0);
    }
}
