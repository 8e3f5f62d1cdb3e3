//! Hogar Autonomo progression core
//!
//! Platform-agnostic state and rules for the emergency-preparedness quiz:
//! progression state and its persistence, gating, levels, offers, the
//! module runner and the onboarding survey. No UI or platform dependencies.

pub mod constants;
pub mod dashboard;
pub mod data;
pub mod feedback;
pub mod gating;
pub mod level;
pub mod offer;
pub mod result;
pub mod roadmap;
pub mod runner;
pub mod state;
pub mod storage;
pub mod store;
pub mod survey;
pub mod timer;

// Re-export commonly used types
pub use dashboard::{DashboardView, ModuleCard, Selection, select_module};
pub use data::{CatalogError, Choice, Module, ModuleCatalog, Question, RoadmapStep};
pub use feedback::{FeedbackBands, FeedbackTier, Tone};
pub use gating::{ModuleStatus, module_status};
pub use level::{Level, level};
pub use offer::{OfferKind, OfferTerms, should_show_offer};
pub use result::{FinalVerdict, ResultSummary, result_summary, share_percentile};
pub use roadmap::{Roadmap, StepStatus};
pub use runner::{ModuleOutcome, ModuleRunner, RunnerError, RunnerPhase};
pub use state::{ProgressionState, display_name};
pub use storage::MemoryStorage;
pub use store::{Completion, Store};
pub use survey::{
    Email, OnboardingError, Resource, RiskLevel, SURVEY, SurveyOutcome, SurveyRunner,
    survival_hours,
};
pub use timer::{CancelToken, Clock, ManualClock, SystemClock, TimerHandle};

#[cfg(feature = "async")]
pub use timer::TokioClock;

/// Key-value persistence for serialized progression snapshots.
/// Platform-specific implementations should provide this
pub trait ProgressStorage {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Read the blob stored under `key`
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be read.
    fn load(&self, key: &str) -> Result<Option<String>, Self::Error>;

    /// Overwrite the blob stored under `key`
    ///
    /// # Errors
    ///
    /// Returns an error if the blob cannot be written.
    fn save(&self, key: &str, blob: &str) -> Result<(), Self::Error>;

    /// Remove the blob stored under `key`; absent keys are not an error
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store refuses the removal.
    fn clear(&self, key: &str) -> Result<(), Self::Error>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::fmt;

    #[derive(Debug)]
    struct Unavailable;

    impl fmt::Display for Unavailable {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("storage unavailable")
        }
    }

    impl std::error::Error for Unavailable {}

    /// Refuses every operation and counts the attempts.
    #[derive(Default)]
    struct BrokenStorage {
        attempts: Cell<u32>,
    }

    impl ProgressStorage for BrokenStorage {
        type Error = Unavailable;

        fn load(&self, _key: &str) -> Result<Option<String>, Self::Error> {
            self.attempts.set(self.attempts.get() + 1);
            Err(Unavailable)
        }

        fn save(&self, _key: &str, _blob: &str) -> Result<(), Self::Error> {
            self.attempts.set(self.attempts.get() + 1);
            Err(Unavailable)
        }

        fn clear(&self, _key: &str) -> Result<(), Self::Error> {
            self.attempts.set(self.attempts.get() + 1);
            Err(Unavailable)
        }
    }

    #[test]
    fn failing_storage_never_blocks_transitions() {
        let mut store = Store::open(BrokenStorage::default());
        assert_eq!(store.state(), &ProgressionState::default());

        store.record_answer(1, 1, 100);
        assert_eq!(store.complete_module(1), Completion::Completed { score: 100 });
        assert!(store.add_badge("first-steps"));
        store.reset();

        assert_eq!(store.state(), &ProgressionState::default());
        assert_eq!(store.storage().attempts.get(), 5);
    }

    #[test]
    fn memory_storage_satisfies_the_seam() {
        let storage = MemoryStorage::new();
        storage.save("slot", "{}").unwrap();
        assert_eq!(storage.load("slot").unwrap().as_deref(), Some("{}"));
        storage.clear("slot").unwrap();
        assert!(storage.load("slot").unwrap().is_none());
        storage.clear("slot").unwrap();
    }
}
