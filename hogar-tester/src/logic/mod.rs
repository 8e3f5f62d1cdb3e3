pub mod playthrough;
pub mod policy;
pub mod reports;
pub mod seeds;
pub mod tester;

pub use playthrough::{Pacing, PlaythroughDriver, PlaythroughPlan, PlaythroughSummary};
pub use policy::AnswerStrategy;
pub use seeds::resolve_seed_inputs;
pub use tester::*;
