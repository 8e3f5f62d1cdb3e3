use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use hogar_game::constants::{PRO_ACCESS_BADGE, SURVEY_ANSWER_DELAY_MS, SURVEY_RESULT_DELAY_MS};
use hogar_game::{
    Clock, DashboardView, Email, ManualClock, ModuleCatalog, ModuleOutcome, ModuleRunner,
    ProgressStorage, ProgressionState, ResultSummary, Roadmap, Selection, Store, SurveyOutcome,
    SurveyRunner, TokioClock, result_summary, select_module,
};
use log::debug;

use crate::logic::policy::{AnswerStrategy, PlayerPolicy};

const OFFER_START_PCT: u64 = 40;
const OFFER_END_PCT: u64 = 90;

/// How consequence screens and survey transitions are waited out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pacing {
    /// Jump a manual clock straight to each deadline.
    Instant,
    /// Sleep through the real delays on the tokio timer.
    RealTime,
}

/// Assertion hook run after a playthrough completes.
type PlaythroughExpectationFn =
    Arc<dyn Fn(&PlaythroughSummary) -> Result<()> + Send + Sync + 'static>;

#[derive(Clone)]
pub struct PlaythroughExpectation(PlaythroughExpectationFn);

impl std::fmt::Debug for PlaythroughExpectation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaythroughExpectation").finish()
    }
}

impl PlaythroughExpectation {
    pub fn evaluate(&self, summary: &PlaythroughSummary) -> Result<()> {
        (self.0)(summary)
    }
}

impl<F> From<F> for PlaythroughExpectation
where
    F: Fn(&PlaythroughSummary) -> Result<()> + Send + Sync + 'static,
{
    fn from(f: F) -> Self {
        Self(Arc::new(f))
    }
}

/// What a scripted player does, start to finish.
#[derive(Debug, Clone)]
pub struct PlaythroughPlan {
    pub strategy: AnswerStrategy,
    pub onboard: bool,
    /// Play only the first `n` modules; `None` plays them all.
    pub module_limit: Option<usize>,
    pub roadmap: bool,
    pub reset_at_end: bool,
    pub expectations: Vec<PlaythroughExpectation>,
}

impl PlaythroughPlan {
    #[must_use]
    pub const fn new(strategy: AnswerStrategy) -> Self {
        Self {
            strategy,
            onboard: true,
            module_limit: None,
            roadmap: false,
            reset_at_end: false,
            expectations: Vec::new(),
        }
    }

    #[must_use]
    pub const fn without_onboarding(mut self) -> Self {
        self.onboard = false;
        self
    }

    #[must_use]
    pub const fn with_module_limit(mut self, limit: usize) -> Self {
        self.module_limit = Some(limit);
        self
    }

    #[must_use]
    pub const fn with_roadmap(mut self) -> Self {
        self.roadmap = true;
        self
    }

    #[must_use]
    pub const fn with_reset_at_end(mut self) -> Self {
        self.reset_at_end = true;
        self
    }

    #[must_use]
    pub fn with_expectation(mut self, expectation: impl Into<PlaythroughExpectation>) -> Self {
        self.expectations.push(expectation.into());
        self
    }
}

/// Complete record of one playthrough.
#[derive(Debug, Clone)]
pub struct PlaythroughSummary {
    pub seed: u64,
    pub strategy: AnswerStrategy,
    pub survey: Option<SurveyOutcome>,
    pub outcomes: Vec<ModuleOutcome>,
    pub roadmap_steps: usize,
    /// Dashboard renders that carried the flash offer.
    pub offer_renders: usize,
    pub violations: Vec<String>,
    pub final_state: ProgressionState,
    /// What storage held right after the last transition.
    pub persisted: Option<ProgressionState>,
    pub after_reset: Option<ProgressionState>,
    pub result: ResultSummary,
}

/// Watches every observable state for regressions.
#[derive(Debug)]
struct InvariantMonitor {
    last: ProgressionState,
    offer_renders: usize,
    violations: Vec<String>,
}

impl InvariantMonitor {
    fn new(initial: &ProgressionState) -> Self {
        Self {
            last: initial.clone(),
            offer_renders: 0,
            violations: Vec::new(),
        }
    }

    fn observe(&mut self, state: &ProgressionState, catalog: &ModuleCatalog, label: &str) {
        let prev = &self.last;
        if state.preparedness_points < prev.preparedness_points {
            self.violations.push(format!(
                "{label}: preparedness dropped {} -> {}",
                prev.preparedness_points, state.preparedness_points
            ));
        }
        if state.savings_points < prev.savings_points {
            self.violations.push(format!(
                "{label}: savings dropped {} -> {}",
                prev.savings_points, state.savings_points
            ));
        }
        if state.current_step < prev.current_step {
            self.violations.push(format!(
                "{label}: current step went back {} -> {}",
                prev.current_step, state.current_step
            ));
        }
        if state.level() < prev.level() {
            self.violations
                .push(format!("{label}: level went back to {}", state.level()));
        }
        let unique: HashSet<_> = state.completed_steps.iter().collect();
        if unique.len() != state.completed_steps.len() {
            self.violations.push(format!(
                "{label}: duplicate completions {:?}",
                state.completed_steps
            ));
        }

        let view = DashboardView::build(state, catalog);
        let done = u64::from(state.completed_count());
        let total = u64::from(state.total_steps);
        let in_window =
            OFFER_START_PCT * total <= done * 100 && done * 100 < OFFER_END_PCT * total;
        let expected = in_window && !state.has_badge(PRO_ACCESS_BADGE);
        if view.offer.is_some() != expected {
            self.violations.push(format!(
                "{label}: offer shown={} at {done}/{total} steps",
                view.offer.is_some()
            ));
        }
        if view.offer.is_some() {
            self.offer_renders += 1;
        }
        self.last = state.clone();
    }
}

enum PaceClock {
    Manual(ManualClock),
    Tokio(TokioClock),
}

impl PaceClock {
    fn for_pacing(pacing: Pacing) -> Self {
        match pacing {
            Pacing::Instant => Self::Manual(ManualClock::new()),
            Pacing::RealTime => Self::Tokio(TokioClock::new()),
        }
    }

    fn now(&self) -> Duration {
        match self {
            Self::Manual(clock) => clock.now(),
            Self::Tokio(clock) => clock.now(),
        }
    }

    async fn pause(&self, ms: u64) {
        match self {
            Self::Manual(clock) => clock.advance_ms(ms),
            Self::Tokio(_) => tokio::time::sleep(Duration::from_millis(ms)).await,
        }
    }

    async fn wait_out<S: ProgressStorage>(
        &self,
        runner: &mut ModuleRunner<'_>,
        store: &mut Store<S>,
    ) -> bool {
        match self {
            Self::Manual(clock) => {
                if let Some(due) = runner.pending_deadline() {
                    clock.advance(due.saturating_sub(clock.now()));
                }
                runner.poll(store, clock.now())
            }
            Self::Tokio(clock) => runner.settle(store, clock).await,
        }
    }
}

/// Drives scripted players through the catalog.
#[derive(Debug, Clone, Copy)]
pub struct PlaythroughDriver {
    catalog: &'static ModuleCatalog,
    pacing: Pacing,
}

impl PlaythroughDriver {
    pub fn new(pacing: Pacing) -> Result<Self> {
        let catalog = ModuleCatalog::load_from_static().context("loading module catalog")?;
        Ok(Self { catalog, pacing })
    }

    /// Play `plan` from a fresh session on `store`.
    pub async fn run<S: ProgressStorage>(
        &self,
        plan: &PlaythroughPlan,
        seed: u64,
        store: &mut Store<S>,
    ) -> Result<PlaythroughSummary> {
        store.reset();
        let clock = PaceClock::for_pacing(self.pacing);
        let mut policy = plan.strategy.create_policy(seed);
        let mut monitor = InvariantMonitor::new(store.state());

        let survey = if plan.onboard {
            let outcome = self.take_survey(policy.as_mut(), &clock).await?;
            debug!(
                "survey: {}h, {:?} risk. {}",
                outcome.survival_hours,
                outcome.risk,
                outcome.risk.message()
            );
            let email = Email::parse(&format!("player{seed}@example.com"))?;
            store.onboard(&email)?;
            monitor.observe(store.state(), self.catalog, "onboarding");
            Some(outcome)
        } else {
            None
        };

        let limit = plan.module_limit.unwrap_or(usize::MAX);
        let mut outcomes = Vec::new();
        for module in self.catalog.iter().take(limit) {
            match select_module(store.state(), self.catalog, module.id) {
                Some(Selection::Start(_)) => {}
                other => {
                    return Err(anyhow!("module {} not startable: {other:?}", module.id));
                }
            }
            let mut runner = ModuleRunner::start(module, store)?;
            while !runner.is_completed() {
                if let Some(question) = runner.current_question() {
                    let scores: Vec<u32> = question.choices.iter().map(|c| c.points).collect();
                    let choice = policy.pick(&scores);
                    runner
                        .select(store, choice, clock.now())
                        .ok_or_else(|| anyhow!("module {} rejected choice {choice}", module.id))?;
                    debug!(
                        "{} answered module {} question {} with option {choice}",
                        policy.name(),
                        module.id,
                        question.id
                    );
                } else if !clock.wait_out(&mut runner, store).await {
                    return Err(anyhow!("module {} stalled on a consequence", module.id));
                }
                monitor.observe(store.state(), self.catalog, &format!("module {}", module.id));
            }
            let outcome = runner
                .outcome()
                .copied()
                .ok_or_else(|| anyhow!("module {} finished without outcome", module.id))?;
            outcomes.push(outcome);
        }

        let mut roadmap_steps = 0;
        if plan.roadmap {
            let roadmap = Roadmap::new(&self.catalog.roadmap);
            while let Some(step) = roadmap.next_step(store.state()) {
                roadmap
                    .take(store, step.id)
                    .ok_or_else(|| anyhow!("roadmap refused step {}", step.id))?;
                roadmap_steps += 1;
                monitor.observe(store.state(), self.catalog, &format!("roadmap {}", step.id));
            }
        }

        let persisted = match store.storage().load(store.key())? {
            Some(blob) => Some(serde_json::from_str(&blob).context("parsing persisted state")?),
            None => None,
        };
        let final_state = store.state().clone();
        let result = result_summary(&final_state);

        let after_reset = if plan.reset_at_end {
            store.reset();
            Some(store.state().clone())
        } else {
            None
        };

        Ok(PlaythroughSummary {
            seed,
            strategy: plan.strategy,
            survey,
            outcomes,
            roadmap_steps,
            offer_renders: monitor.offer_renders,
            violations: monitor.violations,
            final_state,
            persisted,
            after_reset,
            result,
        })
    }

    async fn take_survey(
        &self,
        policy: &mut (dyn PlayerPolicy + Send),
        clock: &PaceClock,
    ) -> Result<SurveyOutcome> {
        let mut survey = SurveyRunner::new();
        while let Some(question) = survey.current() {
            let hours: Vec<u32> = question.options.iter().map(|o| o.hours).collect();
            let pick = policy.pick(&hours);
            survey
                .answer(pick)
                .ok_or_else(|| anyhow!("survey rejected option {pick}"))?;
            clock.pause(SURVEY_ANSWER_DELAY_MS).await;
        }
        clock.pause(SURVEY_RESULT_DELAY_MS).await;
        Ok(survey.outcome()?)
    }
}
