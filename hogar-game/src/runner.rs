//! Drives one module from its first question to completion.
use log::debug;
use serde::Serialize;
use std::time::Duration;

use crate::ProgressStorage;
use crate::data::{Module, Question};
use crate::feedback::FeedbackTier;
use crate::gating::ModuleStatus;
use crate::store::{Completion, Store};
use crate::timer::{CancelToken, TimerHandle};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RunnerError {
    #[error("module {0} is locked")]
    Locked(u32),
    #[error("module {0} is already completed")]
    AlreadyCompleted(u32),
    #[error("module {0} has no questions")]
    Empty(u32),
}

/// Where a module play-through currently stands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunnerPhase {
    /// Waiting for an answer to question `number` (1-based).
    Asking { number: usize },
    /// Showing the consequence of the answer to `number` until the deadline.
    AnswerShown { number: usize, consequence: String },
    /// Terminal: the module has been folded into the progression state.
    Completed(ModuleOutcome),
}

/// What the player sees after the last question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ModuleOutcome {
    pub module_id: u32,
    pub score: u32,
    pub savings: u32,
    pub tier: FeedbackTier,
    #[serde(skip)]
    pub completion: Completion,
}

/// One play-through of a module. Not reusable once completed.
#[derive(Debug)]
pub struct ModuleRunner<'a> {
    module: &'a Module,
    phase: RunnerPhase,
    pending: Option<TimerHandle>,
    savings: u32,
}

impl<'a> ModuleRunner<'a> {
    /// Start `module` if the gating policy allows it, marking it as current.
    ///
    /// # Errors
    ///
    /// Returns an error if the module is locked, already completed, or empty.
    pub fn start<S: ProgressStorage>(
        module: &'a Module,
        store: &mut Store<S>,
    ) -> Result<Self, RunnerError> {
        match store.state().module_status(module.id) {
            ModuleStatus::Locked => return Err(RunnerError::Locked(module.id)),
            ModuleStatus::Completed => return Err(RunnerError::AlreadyCompleted(module.id)),
            ModuleStatus::Available => {}
        }
        let runner = Self::new(module)?;
        store.start_module(module.id);
        Ok(runner)
    }

    fn new(module: &'a Module) -> Result<Self, RunnerError> {
        if module.questions.is_empty() {
            return Err(RunnerError::Empty(module.id));
        }
        Ok(Self {
            module,
            phase: RunnerPhase::Asking { number: 1 },
            pending: None,
            savings: 0,
        })
    }

    #[must_use]
    pub const fn module(&self) -> &Module {
        self.module
    }

    #[must_use]
    pub const fn phase(&self) -> &RunnerPhase {
        &self.phase
    }

    #[must_use]
    pub const fn is_completed(&self) -> bool {
        matches!(self.phase, RunnerPhase::Completed(_))
    }

    #[must_use]
    pub const fn outcome(&self) -> Option<&ModuleOutcome> {
        match &self.phase {
            RunnerPhase::Completed(outcome) => Some(outcome),
            _ => None,
        }
    }

    /// Question awaiting an answer, if any.
    #[must_use]
    pub fn current_question(&self) -> Option<&'a Question> {
        match self.phase {
            RunnerPhase::Asking { number } => self.module.question(number),
            _ => None,
        }
    }

    /// `(answered, total)` for progress bars.
    #[must_use]
    pub fn progress(&self) -> (usize, usize) {
        let total = self.module.questions.len();
        let answered = match &self.phase {
            RunnerPhase::Asking { number } => number - 1,
            RunnerPhase::AnswerShown { number, .. } => *number,
            RunnerPhase::Completed(_) => total,
        };
        (answered, total)
    }

    /// Deadline of the pending auto-advance.
    #[must_use]
    pub fn pending_deadline(&self) -> Option<Duration> {
        self.pending.as_ref().map(TimerHandle::due)
    }

    /// Token for an outside timer waiting on the pending auto-advance.
    #[must_use]
    pub fn timer_token(&self) -> Option<CancelToken> {
        self.pending.as_ref().map(TimerHandle::token)
    }

    /// Answer the current question with choice `choice_index`.
    ///
    /// Records the choice's points, then either shows its consequence until
    /// `now + delay` or moves straight on. Returns `None` (and changes
    /// nothing) when no question is being asked, the choice does not exist,
    /// or the module was completed elsewhere in the meantime.
    pub fn select<S: ProgressStorage>(
        &mut self,
        store: &mut Store<S>,
        choice_index: usize,
        now: Duration,
    ) -> Option<&RunnerPhase> {
        let RunnerPhase::Asking { number } = self.phase else {
            return None;
        };
        if store.state().is_completed(self.module.id) {
            debug!("module {} already completed; answer ignored", self.module.id);
            return None;
        }
        let question = self.module.question(number)?;
        let choice = question.choice(choice_index)?;

        store.record_answer(self.module.id, question.id, choice.points);
        self.savings = self.savings.saturating_add(choice.savings);

        match (self.module.consequence_delay_ms, &choice.consequence) {
            (Some(delay_ms), Some(consequence)) => {
                self.pending = Some(TimerHandle::schedule(now, Duration::from_millis(delay_ms)));
                self.phase = RunnerPhase::AnswerShown {
                    number,
                    consequence: consequence.clone(),
                };
            }
            _ => self.advance_from(number, store),
        }
        Some(&self.phase)
    }

    /// Fire the pending auto-advance if its deadline has passed.
    ///
    /// Returns `true` when the phase changed.
    pub fn poll<S: ProgressStorage>(&mut self, store: &mut Store<S>, now: Duration) -> bool {
        let RunnerPhase::AnswerShown { number, .. } = self.phase else {
            return false;
        };
        match &self.pending {
            Some(handle) if !handle.is_due(now) => false,
            _ => {
                self.pending = None;
                self.advance_from(number, store);
                true
            }
        }
    }

    /// Sleep until the pending deadline, then advance.
    #[cfg(feature = "async")]
    pub async fn settle<S: ProgressStorage, C: crate::timer::Clock>(
        &mut self,
        store: &mut Store<S>,
        clock: &C,
    ) -> bool {
        let Some(remaining) = self.pending.as_ref().map(|h| h.remaining(clock.now())) else {
            return false;
        };
        tokio::time::sleep(remaining).await;
        self.poll(store, clock.now())
    }

    fn advance_from<S: ProgressStorage>(&mut self, number: usize, store: &mut Store<S>) {
        if number < self.module.questions.len() {
            self.phase = RunnerPhase::Asking { number: number + 1 };
            return;
        }
        let completion = store.complete_module_with_savings(self.module.id, self.savings);
        let score = completion.score();
        let tier = self
            .module
            .feedback
            .map_or(FeedbackTier::Success, |bands| bands.tier(score));
        debug!(
            "module {} finished with {score} points ({tier:?})",
            self.module.id
        );
        self.phase = RunnerPhase::Completed(ModuleOutcome {
            module_id: self.module.id,
            score,
            savings: self.savings,
            tier,
            completion,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::ModuleCatalog;
    use crate::storage::MemoryStorage;
    use crate::timer::{Clock, ManualClock};

    fn catalog() -> &'static ModuleCatalog {
        ModuleCatalog::load_from_static().unwrap()
    }

    fn store_with_completed(ids: &[u32]) -> Store<MemoryStorage> {
        let mut store = Store::open(MemoryStorage::new());
        for id in ids {
            store.complete_module(*id);
        }
        store
    }

    #[test]
    fn direct_module_runs_to_completion() {
        let mut store = store_with_completed(&[1]);
        let water = catalog().module(2).unwrap();
        let mut runner = ModuleRunner::start(water, &mut store).unwrap();
        assert_eq!(store.state().current_module, Some(2));
        assert_eq!(runner.progress(), (0, 2));

        runner.select(&mut store, 0, Duration::ZERO).unwrap();
        assert_eq!(runner.phase(), &RunnerPhase::Asking { number: 2 });
        runner.select(&mut store, 1, Duration::ZERO).unwrap();

        let outcome = *runner.outcome().unwrap();
        assert_eq!(outcome.score, 150);
        assert_eq!(outcome.tier, FeedbackTier::Success);
        assert_eq!(outcome.completion, Completion::Completed { score: 150 });
        assert_eq!(store.state().preparedness_points, 150);
        assert!(store.state().current_module.is_none());
        assert!(runner.select(&mut store, 0, Duration::ZERO).is_none());
    }

    #[test]
    fn locked_and_completed_modules_refuse_to_start() {
        let mut store = store_with_completed(&[1]);
        let food = catalog().module(3).unwrap();
        assert_eq!(
            ModuleRunner::start(food, &mut store).unwrap_err(),
            RunnerError::Locked(3)
        );
        let scanner = catalog().module(1).unwrap();
        assert_eq!(
            ModuleRunner::start(scanner, &mut store).unwrap_err(),
            RunnerError::AlreadyCompleted(1)
        );
        assert!(store.state().current_module.is_none());
    }

    #[test]
    fn unknown_choice_is_ignored() {
        let mut store = store_with_completed(&[1]);
        let water = catalog().module(2).unwrap();
        let mut runner = ModuleRunner::start(water, &mut store).unwrap();
        assert!(runner.select(&mut store, 7, Duration::ZERO).is_none());
        assert_eq!(runner.phase(), &RunnerPhase::Asking { number: 1 });
        assert!(store.state().module_answers.get(&2).is_none());
    }

    #[test]
    fn consequence_waits_for_deadline() {
        let mut store = store_with_completed(&[1, 2, 3, 4, 5]);
        let crisis = catalog().module(6).unwrap();
        let clock = ManualClock::new();
        let mut runner = ModuleRunner::start(crisis, &mut store).unwrap();

        runner.select(&mut store, 1, clock.now()).unwrap();
        assert!(matches!(
            runner.phase(),
            RunnerPhase::AnswerShown { number: 1, .. }
        ));
        assert_eq!(runner.pending_deadline(), Some(Duration::from_millis(2_000)));
        assert!(runner.select(&mut store, 0, clock.now()).is_none());

        clock.advance_ms(1_999);
        assert!(!runner.poll(&mut store, clock.now()));
        clock.advance_ms(1);
        assert!(runner.poll(&mut store, clock.now()));
        assert_eq!(runner.phase(), &RunnerPhase::Asking { number: 2 });
        assert!(runner.pending_deadline().is_none());
    }

    #[test]
    fn consequence_module_completes_after_last_deadline() {
        let mut store = store_with_completed(&[1, 2, 3, 4, 5]);
        let crisis = catalog().module(6).unwrap();
        let clock = ManualClock::new();
        let mut runner = ModuleRunner::start(crisis, &mut store).unwrap();

        for choice in [0, 2, 1] {
            runner.select(&mut store, choice, clock.now()).unwrap();
            clock.advance_ms(2_000);
            assert!(runner.poll(&mut store, clock.now()));
        }
        // 30 + 20 + 40
        let outcome = runner.outcome().unwrap();
        assert_eq!(outcome.score, 90);
        assert_eq!(outcome.tier, FeedbackTier::Failure);
        assert!(store.state().is_completed(6));
    }

    #[test]
    fn savings_mission_credits_savings() {
        let mut store = store_with_completed(&[1, 2, 3, 4]);
        let missions = catalog().module(5).unwrap();
        let mut runner = ModuleRunner::start(missions, &mut store).unwrap();
        runner.select(&mut store, 1, Duration::ZERO).unwrap();
        let outcome = runner.outcome().unwrap();
        assert_eq!(outcome.savings, 15);
        assert_eq!(outcome.tier, FeedbackTier::Success);
        assert_eq!(store.state().savings_points, 15);
        assert_eq!(store.state().preparedness_points, 100);
    }

    #[test]
    fn dropping_runner_cancels_pending_advance() {
        let mut store = store_with_completed(&[1, 2, 3, 4, 5, 6]);
        let finale = catalog().module(7).unwrap();
        let token = {
            let mut runner = ModuleRunner::start(finale, &mut store).unwrap();
            runner.select(&mut store, 0, Duration::ZERO).unwrap();
            let token = runner.timer_token().unwrap();
            assert!(!token.is_cancelled());
            token
        };
        assert!(token.is_cancelled());
        assert!(!store.state().is_completed(7));
    }

    #[test]
    fn completed_module_keeps_its_answers() {
        let mut store = store_with_completed(&[]);
        let scanner = catalog().module(1).unwrap();
        let mut first = ModuleRunner::start(scanner, &mut store).unwrap();
        let mut second = ModuleRunner::new(scanner).unwrap();

        first.select(&mut store, 0, Duration::ZERO).unwrap();
        first.select(&mut store, 0, Duration::ZERO).unwrap();
        assert_eq!(store.state().preparedness_points, 200);

        assert!(second.select(&mut store, 2, Duration::ZERO).is_none());
        assert_eq!(second.phase(), &RunnerPhase::Asking { number: 1 });
        assert_eq!(store.state().module_score(1), 200);
        assert_eq!(store.state().preparedness_points, 200);
    }

    #[test]
    fn repeat_completion_reports_no_points() {
        let mut store = store_with_completed(&[1]);
        let water = catalog().module(2).unwrap();
        let mut runner = ModuleRunner::start(water, &mut store).unwrap();
        runner.select(&mut store, 0, Duration::ZERO).unwrap();
        store.complete_module(2);
        let before = store.state().preparedness_points;

        runner.advance_from(2, &mut store);
        let outcome = runner.outcome().unwrap();
        assert_eq!(outcome.completion, Completion::AlreadyCompleted);
        assert_eq!(outcome.score, 0);
        assert_eq!(store.state().preparedness_points, before);
    }

    #[test]
    fn empty_module_is_rejected() {
        let module = Module {
            id: 9,
            title: "Empty".to_string(),
            desc: String::new(),
            points: 0,
            minutes: 1,
            tone: crate::feedback::Tone::Info,
            consequence_delay_ms: None,
            feedback: None,
            questions: Vec::new(),
        };
        assert_eq!(ModuleRunner::new(&module).unwrap_err(), RunnerError::Empty(9));
    }
}
