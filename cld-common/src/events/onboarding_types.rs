//! Onboarding and portfolio event type definitions
//!
//! Supporting types for the client-side onboarding workflow.

use serde::{Deserialize, Serialize};

/// Onboarding workflow state
///
/// Idle → Submitting → Progressing → {Succeeded, Failed}; both terminal
/// states return to Idle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OnboardingPhase {
    /// No job
    Idle,
    /// Job accepted, request being sent
    Submitting,
    /// Request outstanding, synthetic progress running
    Progressing,
    /// Backend returned a payload
    Succeeded,
    /// Validation or backend failure; error retained until dismissed
    Failed,
}

impl OnboardingPhase {
    /// A backend request is outstanding; the job cannot be dismissed
    pub fn is_running(self) -> bool {
        matches!(self, OnboardingPhase::Submitting | OnboardingPhase::Progressing)
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, OnboardingPhase::Succeeded | OnboardingPhase::Failed)
    }
}

impl std::fmt::Display for OnboardingPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OnboardingPhase::Idle => write!(f, "Idle"),
            OnboardingPhase::Submitting => write!(f, "Submitting"),
            OnboardingPhase::Progressing => write!(f, "Progressing"),
            OnboardingPhase::Succeeded => write!(f, "Succeeded"),
            OnboardingPhase::Failed => write!(f, "Failed"),
        }
    }
}

/// Why the portfolio list changed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum PortfolioChangeTrigger {
    /// Optimistic local insert
    Merge,
    /// Full re-sync from the backend listing
    Refresh,
}

impl std::fmt::Display for PortfolioChangeTrigger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PortfolioChangeTrigger::Merge => write!(f, "Merge"),
            PortfolioChangeTrigger::Refresh => write!(f, "Refresh"),
        }
    }
}
