//! Named playthrough scenarios and what each must prove.
use anyhow::{Result, ensure};
use hogar_game::{
    FeedbackTier, FinalVerdict, Level, ModuleCatalog, ModuleStatus, ProgressionState, RiskLevel,
};

use crate::logic::{AnswerStrategy, PlaythroughPlan, PlaythroughSummary};

#[derive(Debug, Clone)]
pub struct TestScenario {
    pub name: String,
    pub plan: PlaythroughPlan,
}

impl TestScenario {
    #[must_use]
    pub fn new(name: impl Into<String>, plan: PlaythroughPlan) -> Self {
        Self {
            name: name.into(),
            plan,
        }
    }
}

const SCENARIOS: [(&str, &str); 8] = [
    ("smoke", "Smoke Test"),
    ("perfect-run", "Perfect Run"),
    ("worst-run", "Worst Run"),
    ("cautious-run", "Cautious Run"),
    ("random-run", "Random Run"),
    ("offer-window", "Offer Window"),
    ("roadmap", "Roadmap Walk"),
    ("restart", "Restart After Partial Run"),
];

fn canonical_key(key: &str) -> Option<&'static str> {
    let key = key.to_lowercase();
    let canonical = match key.as_str() {
        "perfect" => "perfect-run",
        "worst" => "worst-run",
        "cautious" => "cautious-run",
        "random" => "random-run",
        "offer" => "offer-window",
        "reset" => "restart",
        other => other,
    };
    SCENARIOS
        .iter()
        .map(|(k, _)| *k)
        .find(|k| *k == canonical)
}

pub fn get_scenario(key: &str) -> Option<TestScenario> {
    let key = canonical_key(key)?;
    let plan = match key {
        "smoke" => PlaythroughPlan::new(AnswerStrategy::Perfect)
            .with_module_limit(1)
            .with_expectation(smoke_expectation),
        "perfect-run" => {
            PlaythroughPlan::new(AnswerStrategy::Perfect).with_expectation(perfect_expectation)
        }
        "worst-run" => {
            PlaythroughPlan::new(AnswerStrategy::Worst).with_expectation(worst_expectation)
        }
        "cautious-run" => {
            PlaythroughPlan::new(AnswerStrategy::Cautious).with_expectation(cautious_expectation)
        }
        "random-run" => PlaythroughPlan::new(AnswerStrategy::MonteCarlo)
            .with_expectation(full_run_expectation)
            .with_expectation(persisted_expectation),
        "offer-window" => PlaythroughPlan::new(AnswerStrategy::MonteCarlo)
            .without_onboarding()
            .with_expectation(offer_expectation),
        "roadmap" => PlaythroughPlan::new(AnswerStrategy::Cautious)
            .with_module_limit(0)
            .with_roadmap()
            .with_expectation(roadmap_expectation),
        "restart" => PlaythroughPlan::new(AnswerStrategy::Perfect)
            .with_module_limit(3)
            .with_reset_at_end()
            .with_expectation(persisted_expectation)
            .with_expectation(restart_expectation),
        _ => return None,
    };
    let name = SCENARIOS
        .iter()
        .find(|(k, _)| *k == key)
        .map_or(key, |(_, name)| *name);
    Some(TestScenario::new(name, plan))
}

pub fn list_scenarios() -> Vec<(&'static str, &'static str)> {
    SCENARIOS.to_vec()
}

fn catalog() -> Result<&'static ModuleCatalog> {
    Ok(ModuleCatalog::load_from_static()?)
}

/// Onboarding bonus plus the lowest-scoring choice everywhere.
const WORST_POINTS: u32 = 410;

/// Best possible preparedness: onboarding bonus plus every question's top choice.
fn max_points(catalog: &ModuleCatalog) -> u32 {
    50 + catalog
        .iter()
        .flat_map(|m| &m.questions)
        .map(hogar_game::Question::max_points)
        .sum::<u32>()
}

fn smoke_expectation(summary: &PlaythroughSummary) -> Result<()> {
    let state = &summary.final_state;
    ensure!(summary.outcomes.len() == 1, "smoke plays one module");
    ensure!(
        state.preparedness_points == 50 + summary.outcomes[0].score,
        "bonus plus module score, got {}",
        state.preparedness_points
    );
    ensure!(state.current_step == 2, "step pointer should sit on 2");
    ensure!(
        state.module_status(2) == ModuleStatus::Available,
        "module 2 should unlock"
    );
    ensure!(
        state.module_status(3) == ModuleStatus::Locked,
        "module 3 should stay locked"
    );
    Ok(())
}

fn full_run_expectation(summary: &PlaythroughSummary) -> Result<()> {
    let state = &summary.final_state;
    ensure!(
        state.completed_steps == [1, 2, 3, 4, 5, 6, 7],
        "modules completed out of order: {:?}",
        state.completed_steps
    );
    ensure!(state.current_step == 8, "current step {}", state.current_step);
    ensure!(
        state.current_module.is_none(),
        "no module should be in flight"
    );
    ensure!(
        state.level() == Level::from_points(state.preparedness_points),
        "level must follow points"
    );
    ensure!(
        summary.result.verdict == FinalVerdict::from_points(state.preparedness_points),
        "verdict must follow points"
    );
    Ok(())
}

fn perfect_expectation(summary: &PlaythroughSummary) -> Result<()> {
    full_run_expectation(summary)?;
    let state = &summary.final_state;
    let best = max_points(catalog()?);
    ensure!(
        state.preparedness_points == best,
        "expected {best} points, got {}",
        state.preparedness_points
    );
    ensure!(state.savings_points == 15, "best mission saves 15");
    ensure!(
        summary.outcomes.iter().all(|o| o.tier == FeedbackTier::Success),
        "perfect answers should always earn top feedback"
    );
    ensure!(state.level() == Level::Master, "perfect run reaches Master");
    ensure!(
        summary.survey.is_some_and(|s| s.risk == RiskLevel::Low),
        "best survey answers leave 36h of energy"
    );
    Ok(())
}

fn worst_expectation(summary: &PlaythroughSummary) -> Result<()> {
    full_run_expectation(summary)?;
    let state = &summary.final_state;
    ensure!(
        state.preparedness_points == WORST_POINTS,
        "worst run scores {WORST_POINTS}, got {}",
        state.preparedness_points
    );
    ensure!(state.level() == Level::Explorer, "worst run ends as Explorer");
    ensure!(
        summary.result.verdict == FinalVerdict::Developing,
        "worst run is still Developing"
    );
    ensure!(
        summary.outcomes[0].tier == FeedbackTier::Failure,
        "worst scan answers should fail"
    );
    ensure!(
        summary.survey.is_some_and(|s| s.risk == RiskLevel::High),
        "2h of energy is high risk"
    );
    Ok(())
}

fn cautious_expectation(summary: &PlaythroughSummary) -> Result<()> {
    full_run_expectation(summary)?;
    let points = summary.final_state.preparedness_points;
    ensure!(
        WORST_POINTS < points && points < max_points(catalog()?),
        "cautious run should land between worst and best, got {points}"
    );
    ensure!(
        summary.survey.is_some_and(|s| s.risk == RiskLevel::Medium),
        "second-best survey answers leave 16h"
    );
    Ok(())
}

fn offer_expectation(summary: &PlaythroughSummary) -> Result<()> {
    full_run_expectation(summary)?;
    ensure!(
        summary.offer_renders > 0,
        "the flash offer never appeared"
    );
    ensure!(
        !summary.final_state.should_show_offer(),
        "offer must be gone at 100%"
    );
    Ok(())
}

fn roadmap_expectation(summary: &PlaythroughSummary) -> Result<()> {
    let state = &summary.final_state;
    let roadmap = &catalog()?.roadmap;
    let granted: u32 = roadmap.iter().skip(1).map(|s| s.points).sum();
    ensure!(summary.roadmap_steps == 9, "took {} steps", summary.roadmap_steps);
    ensure!(state.current_step == 10, "pointer at {}", state.current_step);
    ensure!(
        state.preparedness_points == 50 + granted,
        "expected {} points, got {}",
        50 + granted,
        state.preparedness_points
    );
    ensure!(state.savings_points == 90, "ten per step");
    Ok(())
}

fn persisted_expectation(summary: &PlaythroughSummary) -> Result<()> {
    ensure!(
        summary.persisted.as_ref() == Some(&summary.final_state),
        "stored blob does not match the live state"
    );
    Ok(())
}

fn restart_expectation(summary: &PlaythroughSummary) -> Result<()> {
    ensure!(
        summary.final_state.completed_steps == [1, 2, 3],
        "partial run should stop after module 3"
    );
    let after = summary
        .after_reset
        .as_ref()
        .ok_or_else(|| anyhow::anyhow!("reset was not performed"))?;
    ensure!(after == &ProgressionState::default(), "reset left state behind");
    ensure!(after.level().tier() == 1, "reset should drop to level 1");
    Ok(())
}
