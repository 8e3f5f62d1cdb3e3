//! Progression store: owns the state, applies transitions, persists snapshots.
use log::{debug, warn};

use crate::ProgressStorage;
use crate::constants::{INITIAL_BONUS_POINTS, ONBOARDED_STEP, STORAGE_KEY};
use crate::state::ProgressionState;
use crate::survey::{Email, OnboardingError};

/// Result of a completion transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// The step was recorded and `score` points were added.
    Completed { score: u32 },
    /// The id was already in `completed_steps`; nothing changed.
    AlreadyCompleted,
}

impl Completion {
    #[must_use]
    pub const fn score(self) -> u32 {
        match self {
            Self::Completed { score } => score,
            Self::AlreadyCompleted => 0,
        }
    }
}

/// Single owner of the progression state.
///
/// Built once at the application root and handed by `&mut` to whatever
/// drives the quiz. Every mutation writes a full snapshot to storage.
#[derive(Debug)]
pub struct Store<S: ProgressStorage> {
    state: ProgressionState,
    storage: S,
    key: String,
}

impl<S: ProgressStorage> Store<S> {
    /// Rehydrate from storage under the default key.
    pub fn open(storage: S) -> Self {
        Self::open_with_key(storage, STORAGE_KEY)
    }

    /// Rehydrate from storage; any read or parse failure starts a fresh session.
    pub fn open_with_key(storage: S, key: &str) -> Self {
        let state = match storage.load(key) {
            Ok(Some(blob)) => serde_json::from_str(&blob).unwrap_or_else(|err| {
                warn!("discarding unreadable progression blob under {key}: {err}");
                ProgressionState::default()
            }),
            Ok(None) => ProgressionState::default(),
            Err(err) => {
                warn!("progression storage read failed for {key}: {err}");
                ProgressionState::default()
            }
        };
        Self {
            state,
            storage,
            key: key.to_string(),
        }
    }

    #[must_use]
    pub const fn state(&self) -> &ProgressionState {
        &self.state
    }

    #[must_use]
    pub const fn storage(&self) -> &S {
        &self.storage
    }

    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Serialized snapshot as written to storage.
    ///
    /// # Errors
    ///
    /// Returns an error if the state cannot be serialized.
    pub fn to_blob(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.state)
    }

    /// Upsert one answer; a later call for the same question replaces it.
    pub fn record_answer(&mut self, module_id: u32, question_id: u32, points: u32) {
        self.update(|state| {
            state
                .module_answers
                .entry(module_id)
                .or_default()
                .insert(question_id, points);
        });
        debug!("answer recorded: module {module_id} question {question_id} -> {points}");
    }

    /// Mark `module_id` as the one being played.
    pub fn start_module(&mut self, module_id: u32) {
        self.update(|state| state.current_module = Some(module_id));
        debug!("module {module_id} started");
    }

    /// Leave the current module without completing it.
    pub fn leave_module(&mut self) {
        if self.state.current_module.is_some() {
            self.update(|state| state.current_module = None);
        }
    }

    /// Fold the module's recorded answers into the preparedness total.
    pub fn complete_module(&mut self, module_id: u32) -> Completion {
        self.complete_module_with_savings(module_id, 0)
    }

    /// Like [`Store::complete_module`], also crediting projected savings.
    pub fn complete_module_with_savings(&mut self, module_id: u32, savings: u32) -> Completion {
        if self.state.is_completed(module_id) {
            warn!("module {module_id} already completed; ignoring repeat completion");
            return Completion::AlreadyCompleted;
        }
        let score = self.state.module_score(module_id);
        self.update(|state| {
            state.completed_steps.push(module_id);
            state.current_step = state.current_step.max(module_id.saturating_add(1));
            state.preparedness_points = state.preparedness_points.saturating_add(score);
            state.savings_points = state.savings_points.saturating_add(savings);
            state.current_module = None;
        });
        debug!(
            "module {module_id} completed: +{score} preparedness, +{savings} savings (total {})",
            self.state.preparedness_points
        );
        Completion::Completed { score }
    }

    /// Grant points for a step directly, bypassing per-question answers.
    pub fn complete_step(&mut self, step: u32, preparedness: u32, savings: u32) -> Completion {
        if self.state.is_completed(step) {
            warn!("step {step} already completed; ignoring repeat completion");
            return Completion::AlreadyCompleted;
        }
        self.update(|state| {
            state.completed_steps.push(step);
            state.current_step = state.current_step.max(step.saturating_add(1));
            state.preparedness_points = state.preparedness_points.saturating_add(preparedness);
            state.savings_points = state.savings_points.saturating_add(savings);
        });
        debug!("step {step} completed: +{preparedness} preparedness, +{savings} savings");
        Completion::Completed {
            score: preparedness,
        }
    }

    pub fn add_points(&mut self, preparedness: u32, savings: u32) {
        self.update(|state| {
            state.preparedness_points = state.preparedness_points.saturating_add(preparedness);
            state.savings_points = state.savings_points.saturating_add(savings);
        });
    }

    /// Append a badge. Returns `false` when the label is already held.
    pub fn add_badge(&mut self, label: &str) -> bool {
        if self.state.has_badge(label) {
            debug!("badge {label} already held");
            return false;
        }
        self.update(|state| state.badges.push(label.to_string()));
        debug!("badge {label} awarded");
        true
    }

    /// Hand off from the initial survey to the dashboard.
    ///
    /// # Errors
    ///
    /// Returns [`OnboardingError::AlreadyStarted`] if onboarding already ran.
    pub fn onboard(&mut self, email: &Email) -> Result<(), OnboardingError> {
        if self.state.has_started {
            return Err(OnboardingError::AlreadyStarted);
        }
        self.update(|state| {
            state.email = email.as_str().to_string();
            state.has_started = true;
            state.current_step = state.current_step.max(ONBOARDED_STEP);
            state.preparedness_points = state
                .preparedness_points
                .saturating_add(INITIAL_BONUS_POINTS);
        });
        debug!("onboarded {}", self.state.display_name());
        Ok(())
    }

    /// Clear persisted progress and start over with defaults.
    pub fn reset(&mut self) {
        if let Err(err) = self.storage.clear(&self.key) {
            warn!("failed to clear progression storage {}: {err}", self.key);
        }
        self.state = ProgressionState::default();
        debug!("progression reset");
    }

    fn update(&mut self, apply: impl FnOnce(&mut ProgressionState)) {
        apply(&mut self.state);
        self.persist();
    }

    fn persist(&self) {
        let blob = match self.to_blob() {
            Ok(blob) => blob,
            Err(err) => {
                warn!("failed to serialize progression state: {err}");
                return;
            }
        };
        if let Err(err) = self.storage.save(&self.key, &blob) {
            warn!("failed to persist progression state {}: {err}", self.key);
        }
    }
}
