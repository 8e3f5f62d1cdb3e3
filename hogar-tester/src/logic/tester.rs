use colored::Colorize;
use hogar_game::{ProgressStorage, Store};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

use crate::logic::playthrough::{PlaythroughDriver, PlaythroughPlan, PlaythroughSummary};
use crate::scenario::TestScenario;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioResult {
    pub scenario_name: String,
    pub seed: u64,
    pub passed: bool,
    pub iterations_run: usize,
    pub successful_iterations: usize,
    pub failures: Vec<String>,
    pub mean_points: f64,
    #[serde(with = "duration_serde")]
    pub average_duration: Duration,
}

pub struct LogicTester {
    driver: PlaythroughDriver,
    verbose: bool,
}

impl LogicTester {
    pub const fn new(driver: PlaythroughDriver, verbose: bool) -> Self {
        Self { driver, verbose }
    }

    /// Run `scenario` once per seed, `iterations` times each, on the shared store.
    pub async fn run_scenario<S: ProgressStorage>(
        &self,
        scenario: &TestScenario,
        seeds: &[u64],
        iterations: usize,
        store: &mut Store<S>,
    ) -> Vec<ScenarioResult> {
        let mut results = Vec::new();
        for &seed in seeds {
            if self.verbose {
                println!(
                    "🧪 Testing scenario: {} (strategy: {} seed: {})",
                    scenario.name.bright_white(),
                    scenario.plan.strategy,
                    seed
                );
            }
            results.push(
                self.run_single_scenario(scenario, seed, iterations, store)
                    .await,
            );
        }
        results
    }

    async fn run_single_scenario<S: ProgressStorage>(
        &self,
        scenario: &TestScenario,
        seed: u64,
        iterations: usize,
        store: &mut Store<S>,
    ) -> ScenarioResult {
        let mut successes = 0;
        let mut failures = Vec::new();
        let mut durations = Vec::new();
        let mut points = Vec::new();

        for i in 0..iterations {
            let start = Instant::now();
            let iteration_seed = seed.wrapping_add(u64::try_from(i).unwrap_or(u64::MAX));
            let outcome = self
                .driver
                .run(&scenario.plan, iteration_seed, store)
                .await
                .and_then(|summary| {
                    evaluate_expectations(&scenario.plan, &summary)?;
                    Ok(summary)
                });

            match outcome {
                Ok(summary) => {
                    successes += 1;
                    let duration = start.elapsed();
                    durations.push(duration);
                    points.push(summary.final_state.preparedness_points);
                    if self.verbose {
                        println!(
                            "  ✅ Iteration {}/{} passed ({duration:?}) seed:{} points:{} verdict:{}",
                            i + 1,
                            iterations,
                            summary.seed,
                            summary.final_state.preparedness_points,
                            summary.result.verdict
                        );
                    }
                }
                Err(err) => {
                    let message = format!(
                        "Iteration {} (strategy {}, seed {iteration_seed}): {err:#}",
                        i + 1,
                        scenario.plan.strategy
                    );
                    if self.verbose {
                        println!(
                            "  ❌ Iteration {}/{} failed: {}",
                            i + 1,
                            iterations,
                            message.clone().red()
                        );
                    }
                    failures.push(message);
                }
            }
        }

        ScenarioResult {
            scenario_name: scenario.name.clone(),
            seed,
            passed: failures.is_empty(),
            iterations_run: iterations,
            successful_iterations: successes,
            failures,
            mean_points: mean(&points),
            average_duration: average(&durations),
        }
    }
}

fn evaluate_expectations(plan: &PlaythroughPlan, summary: &PlaythroughSummary) -> anyhow::Result<()> {
    anyhow::ensure!(
        summary.violations.is_empty(),
        "invariant violations: {}",
        summary.violations.join("; ")
    );
    for expectation in &plan.expectations {
        expectation.evaluate(summary)?;
    }
    Ok(())
}

#[allow(clippy::cast_precision_loss)]
fn mean(points: &[u32]) -> f64 {
    if points.is_empty() {
        return 0.0;
    }
    points.iter().map(|p| f64::from(*p)).sum::<f64>() / points.len() as f64
}

fn average(durations: &[Duration]) -> Duration {
    if durations.is_empty() {
        return Duration::ZERO;
    }
    durations.iter().sum::<Duration>() / u32::try_from(durations.len()).unwrap_or(1)
}

mod duration_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration.as_millis().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}
