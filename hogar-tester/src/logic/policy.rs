use std::fmt;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

/// Picks one option out of a scored list.
///
/// Module questions score by points, survey questions by hours of autonomy;
/// either way higher is better.
pub trait PlayerPolicy {
    fn name(&self) -> &'static str;

    fn pick(&mut self, scores: &[u32]) -> usize;
}

/// Built-in answering strategies for automated runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AnswerStrategy {
    /// Always the best-scoring option
    Perfect,
    /// Always the worst-scoring option
    Worst,
    /// Second-best option, as a hesitant player would
    Cautious,
    /// Uniformly random, seeded
    MonteCarlo,
}

impl AnswerStrategy {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Perfect => "Perfect",
            Self::Worst => "Worst",
            Self::Cautious => "Cautious",
            Self::MonteCarlo => "Monte Carlo",
        }
    }

    #[must_use]
    pub fn create_policy(self, seed: u64) -> Box<dyn PlayerPolicy + Send> {
        match self {
            Self::Perfect => Box::new(PerfectPolicy),
            Self::Worst => Box::new(WorstPolicy),
            Self::Cautious => Box::new(CautiousPolicy),
            Self::MonteCarlo => Box::new(MonteCarloPolicy::new(seed)),
        }
    }
}

impl fmt::Display for AnswerStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

struct PerfectPolicy;
struct WorstPolicy;
struct CautiousPolicy;

struct MonteCarloPolicy {
    rng: ChaCha20Rng,
}

impl MonteCarloPolicy {
    fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha20Rng::seed_from_u64(seed),
        }
    }
}

/// Indices ordered best first; ties keep catalog order.
fn ranked(scores: &[u32]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|a, b| scores[*b].cmp(&scores[*a]));
    order
}

impl PlayerPolicy for PerfectPolicy {
    fn name(&self) -> &'static str {
        "perfect"
    }

    fn pick(&mut self, scores: &[u32]) -> usize {
        ranked(scores).first().copied().unwrap_or(0)
    }
}

impl PlayerPolicy for WorstPolicy {
    fn name(&self) -> &'static str {
        "worst"
    }

    fn pick(&mut self, scores: &[u32]) -> usize {
        ranked(scores).last().copied().unwrap_or(0)
    }
}

impl PlayerPolicy for CautiousPolicy {
    fn name(&self) -> &'static str {
        "cautious"
    }

    fn pick(&mut self, scores: &[u32]) -> usize {
        let order = ranked(scores);
        order.get(1).or_else(|| order.first()).copied().unwrap_or(0)
    }
}

impl PlayerPolicy for MonteCarloPolicy {
    fn name(&self) -> &'static str {
        "monte-carlo"
    }

    fn pick(&mut self, scores: &[u32]) -> usize {
        if scores.is_empty() {
            return 0;
        }
        self.rng.gen_range(0..scores.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCORES: [u32; 3] = [50, 100, 10];

    #[test]
    fn deterministic_policies_rank_by_score() {
        assert_eq!(AnswerStrategy::Perfect.create_policy(0).pick(&SCORES), 1);
        assert_eq!(AnswerStrategy::Worst.create_policy(0).pick(&SCORES), 2);
        assert_eq!(AnswerStrategy::Cautious.create_policy(0).pick(&SCORES), 0);
        assert_eq!(AnswerStrategy::Cautious.create_policy(0).pick(&[7]), 0);
    }

    #[test]
    fn monte_carlo_is_reproducible_per_seed() {
        let picks = |seed| {
            let mut policy = AnswerStrategy::MonteCarlo.create_policy(seed);
            (0..16).map(|_| policy.pick(&SCORES)).collect::<Vec<_>>()
        };
        assert_eq!(picks(42), picks(42));
        assert!(picks(42).iter().all(|i| *i < SCORES.len()));
    }

    #[test]
    fn empty_option_lists_fall_back_to_zero() {
        for strategy in [
            AnswerStrategy::Perfect,
            AnswerStrategy::Worst,
            AnswerStrategy::Cautious,
            AnswerStrategy::MonteCarlo,
        ] {
            assert_eq!(strategy.create_policy(1).pick(&[]), 0);
        }
    }
}
