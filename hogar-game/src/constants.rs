//! Centralized balance and tuning constants for the progression core.
//!
//! Thresholds, bonuses and pacing delays are fixed here so that the
//! progression rules can only change through reviewed code, never through
//! the JSON module catalog.

// Persistence ---------------------------------------------------------------
/// Key under which the serialized progression blob is stored.
pub const STORAGE_KEY: &str = "hogar-autonomo-state";

// Progression ---------------------------------------------------------------
/// Entry module; always available until completed.
pub const FIRST_MODULE_ID: u32 = 1;
/// Number of modules shown on the dashboard, used as the progress denominator.
pub const DEFAULT_TOTAL_STEPS: u32 = 7;
/// Preparedness points granted when the onboarding survey is finished.
pub const INITIAL_BONUS_POINTS: u32 = 50;
/// Step pointer set once onboarding hands off to the dashboard.
pub const ONBOARDED_STEP: u32 = 1;
/// Savings credited for each legacy roadmap step.
pub const ROADMAP_SAVINGS_PER_STEP: u32 = 10;

// Levels --------------------------------------------------------------------
pub(crate) const LEVEL_EXPLORER_MIN: u32 = 401;
pub(crate) const LEVEL_ARCHITECT_MIN: u32 = 701;
pub(crate) const LEVEL_MASTER_MIN: u32 = 901;

// Offers --------------------------------------------------------------------
/// Badge marking that PRO access was already granted.
pub const PRO_ACCESS_BADGE: &str = "pro-access";
pub(crate) const OFFER_WINDOW_START_PCT: f64 = 40.0;
pub(crate) const OFFER_WINDOW_END_PCT: f64 = 90.0;
pub(crate) const OFFER_LIST_PRICE_EUR: u32 = 67;

// Onboarding ----------------------------------------------------------------
/// Emails must be strictly longer than this many characters.
pub const EMAIL_MIN_LEN: usize = 3;

// Survey risk bands (hours) ---------------------------------------------------
pub(crate) const RISK_HIGH_MAX_HOURS: u32 = 8;
pub(crate) const RISK_MEDIUM_MAX_HOURS: u32 = 24;
pub(crate) const RISK_LOW_MAX_HOURS: u32 = 48;

// Final results ---------------------------------------------------------------
pub(crate) const VERDICT_MASTER_MIN: u32 = 501;
pub(crate) const VERDICT_DEVELOPING_MIN: u32 = 201;
pub(crate) const SHARE_REFERENCE_POINTS: u32 = 1_000;

// Pacing (milliseconds) -------------------------------------------------------
/// Delay between picking a survey option and showing the next question.
pub const SURVEY_ANSWER_DELAY_MS: u64 = 300;
/// "Calculating" pause before the survey result is revealed.
pub const SURVEY_RESULT_DELAY_MS: u64 = 1_500;
