//! Onboarding job (in-memory state)
//!
//! One job exists per in-flight submission. It carries the workflow state,
//! the synthetic progress counter and the retained error message.

use chrono::{DateTime, Utc};
use cld_common::events::OnboardingPhase;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// State transition record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateTransition {
    pub job_id: Uuid,
    pub old_state: OnboardingPhase,
    pub new_state: OnboardingPhase,
    pub transitioned_at: DateTime<Utc>,
}

/// Transient onboarding job
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OnboardingJob {
    /// Unique job identifier
    pub job_id: Uuid,

    /// Organization name as submitted (trimmed)
    pub target_name: String,

    /// Ticker supplied by the user, if any
    pub ticker: Option<String>,

    /// Current workflow state
    pub state: OnboardingPhase,

    /// Synthetic progress step, 0..=max_step
    pub step: u32,

    /// Terminal step, reached only on backend success
    pub max_step: u32,

    /// Error message retained for display while Failed
    pub error: Option<String>,

    /// Job start time
    pub started_at: DateTime<Utc>,

    /// Time the job reached Succeeded or Failed
    pub ended_at: Option<DateTime<Utc>>,
}

impl OnboardingJob {
    /// Create new job in Submitting state
    pub fn new(target_name: String, ticker: Option<String>, max_step: u32) -> Self {
        Self {
            job_id: Uuid::new_v4(),
            target_name,
            ticker,
            state: OnboardingPhase::Submitting,
            step: 0,
            max_step: max_step.max(1),
            error: None,
            started_at: Utc::now(),
            ended_at: None,
        }
    }

    /// Transition to new state
    pub fn transition_to(&mut self, new_state: OnboardingPhase) -> StateTransition {
        let transition = StateTransition {
            job_id: self.job_id,
            old_state: self.state,
            new_state,
            transitioned_at: Utc::now(),
        };
        self.state = new_state;

        if new_state.is_terminal() {
            self.ended_at = Some(Utc::now());
        }

        transition
    }

    /// Last step the ticker may reach while still waiting
    pub fn last_waiting_step(&self) -> u32 {
        self.max_step - 1
    }

    /// Advance the synthetic counter by one
    ///
    /// Only moves while Progressing and saturates below the terminal step.
    /// Returns the new step when it changed.
    pub fn advance_step(&mut self) -> Option<u32> {
        if self.state != OnboardingPhase::Progressing || self.step >= self.last_waiting_step() {
            return None;
        }
        self.step += 1;
        Some(self.step)
    }

    /// Backend returned a payload
    pub fn succeed(&mut self) -> StateTransition {
        self.step = self.max_step;
        self.error = None;
        self.transition_to(OnboardingPhase::Succeeded)
    }

    /// Validation or backend failure
    pub fn fail(&mut self, message: String) -> StateTransition {
        self.step = 0;
        self.error = Some(message);
        self.transition_to(OnboardingPhase::Failed)
    }

    /// A backend request is outstanding
    pub fn is_running(&self) -> bool {
        self.state.is_running()
    }

    /// Progress as a fraction in 0.0..=1.0
    pub fn fraction(&self) -> f64 {
        self.step as f64 / self.max_step as f64
    }

    /// Elapsed time since submission
    pub fn elapsed_seconds(&self) -> u64 {
        let end = self.ended_at.unwrap_or_else(Utc::now);
        (end - self.started_at).num_seconds().max(0) as u64
    }
}
