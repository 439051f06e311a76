//! Onboarding workflow
//!
//! Drives the "add this organization" lifecycle against a backend that gives
//! no progress signal and may take minutes to answer:
//!
//! ```text
//! Idle → Submitting → Progressing → Succeeded → (settle delay) → Idle
//!                                 ↘ Failed → (dismiss / next submit) → Idle
//! ```
//!
//! At most one job exists at a time. While a request is outstanding the job
//! can be neither replaced nor dismissed.

mod job;
mod progress;

pub use job::{OnboardingJob, StateTransition};
pub use progress::ProgressTicker;

use std::sync::Arc;
use std::time::Duration;

use cld_common::events::{CldEvent, EventBus, OnboardingPhase};
use cld_common::{CreateCompanyRequest, PortfolioEntry};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::backend::Backend;
use crate::directory::Directory;
use crate::error::{ClientError, ClientResult, ValidationError};
use crate::portfolio::PortfolioStore;

/// Error retained when a submission is abandoned before the backend answers
pub const CANCELLED_MESSAGE: &str = "Onboarding cancelled";

/// Timing of the synthetic progress display
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OnboardingSettings {
    /// Wall-clock interval between progress steps
    pub progress_interval: Duration,
    /// Terminal step; the counter waits at `max_step - 1`
    pub max_step: u32,
    /// How long Succeeded stays visible before the job clears
    pub settle_delay: Duration,
}

impl Default for OnboardingSettings {
    fn default() -> Self {
        Self {
            progress_interval: Duration::from_millis(4000),
            max_step: 5,
            settle_delay: Duration::from_millis(1500),
        }
    }
}

/// Owner of the single onboarding job
#[derive(Clone)]
pub struct OnboardingWorkflow {
    backend: Arc<dyn Backend>,
    portfolio: PortfolioStore,
    directory: Arc<Directory>,
    event_bus: EventBus,
    settings: OnboardingSettings,
    job: Arc<RwLock<Option<OnboardingJob>>>,
}

impl OnboardingWorkflow {
    pub fn new(
        backend: Arc<dyn Backend>,
        portfolio: PortfolioStore,
        directory: Arc<Directory>,
        event_bus: EventBus,
        settings: OnboardingSettings,
    ) -> Self {
        Self {
            backend,
            portfolio,
            directory,
            event_bus,
            settings,
            job: Arc::new(RwLock::new(None)),
        }
    }

    pub fn settings(&self) -> &OnboardingSettings {
        &self.settings
    }

    /// Snapshot of the current job, `None` when Idle
    pub async fn current_job(&self) -> Option<OnboardingJob> {
        self.job.read().await.clone()
    }

    pub async fn phase(&self) -> OnboardingPhase {
        self.job
            .read()
            .await
            .as_ref()
            .map(|j| j.state)
            .unwrap_or(OnboardingPhase::Idle)
    }

    /// Whether the dismiss control is enabled
    pub async fn can_dismiss(&self) -> bool {
        !self.phase().await.is_running()
    }

    /// Submit an organization and wait for the backend's answer
    ///
    /// Returns the entry merged into the portfolio. On return the job is
    /// Idle after success, or Failed (error retained) after a failure.
    ///
    /// Rejected without any transition when another job is active or the
    /// name is blank. A name or ticker already in the portfolio moves the
    /// job straight to Failed without contacting the backend.
    ///
    /// Dropping the returned future stops the progress timer and fails the
    /// job with [`CANCELLED_MESSAGE`].
    pub async fn submit(
        &self,
        target_name: &str,
        ticker: Option<&str>,
    ) -> ClientResult<PortfolioEntry> {
        let name = target_name.trim().to_string();
        let ticker = ticker
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string);

        let (job_id, progress) = {
            let mut slot = self.job.write().await;

            if let Some(existing) = slot.as_ref() {
                if existing.state != OnboardingPhase::Failed {
                    tracing::warn!(
                        active = %existing.target_name,
                        requested = %name,
                        state = %existing.state,
                        "Rejecting submission while a job is active"
                    );
                    return Err(ValidationError::JobActive {
                        target_name: existing.target_name.clone(),
                    }
                    .into());
                }
            }

            if name.is_empty() {
                return Err(ValidationError::EmptyName.into());
            }

            if let Some(previous) = slot.take() {
                tracing::debug!(job_id = %previous.job_id, "Discarding failed job for retry");
                self.emit_transition(&previous, OnboardingPhase::Failed, OnboardingPhase::Idle);
            }

            if let Some(existing) = self.find_in_portfolio(&name, ticker.as_deref()).await {
                let mut job =
                    OnboardingJob::new(name.clone(), ticker.clone(), self.settings.max_step);
                let err = ValidationError::AlreadyInPortfolio {
                    name: existing.name.clone(),
                };
                job.fail(err.to_string());
                tracing::info!(
                    target_name = %name,
                    ticker = %existing.ticker,
                    "Organization already in portfolio; not submitting"
                );
                self.emit_transition(&job, OnboardingPhase::Idle, OnboardingPhase::Failed);
                *slot = Some(job);
                return Err(err.into());
            }

            let mut job = OnboardingJob::new(name.clone(), ticker.clone(), self.settings.max_step);
            let job_id = job.job_id;
            self.emit_transition(&job, OnboardingPhase::Idle, OnboardingPhase::Submitting);

            let transition = job.transition_to(OnboardingPhase::Progressing);
            self.emit_transition(&job, transition.old_state, transition.new_state);
            self.emit_progress(&job);
            *slot = Some(job);

            tracing::info!(job_id = %job_id, target_name = %name, ticker = ?ticker, "Onboarding started");

            let progress = ProgressTicker::start(
                Arc::clone(&self.job),
                job_id,
                self.settings.progress_interval,
                self.event_bus.clone(),
            );
            (job_id, progress)
        };

        let mut guard = SubmitGuard {
            workflow: self,
            job_id,
            armed: true,
        };
        let request = CreateCompanyRequest {
            company_name: name,
            ticker,
        };
        let result = self.backend.create_company(&request).await;
        progress.stop().await;
        guard.armed = false;

        match result {
            Ok(payload) => self.complete(job_id, PortfolioEntry::from(&payload)).await,
            Err(err) => {
                self.fail(job_id, &err).await;
                Err(err)
            }
        }
    }

    /// Clear a Failed (or settling Succeeded) job
    ///
    /// Disabled while Submitting or Progressing.
    pub async fn dismiss(&self) -> ClientResult<()> {
        let mut slot = self.job.write().await;
        match slot.as_ref() {
            None => Ok(()),
            Some(job) if job.is_running() => Err(ValidationError::DismissWhileRunning {
                target_name: job.target_name.clone(),
            }
            .into()),
            Some(job) => {
                tracing::debug!(job_id = %job.job_id, state = %job.state, "Job dismissed");
                self.emit_transition(job, job.state, OnboardingPhase::Idle);
                *slot = None;
                Ok(())
            }
        }
    }

    async fn complete(
        &self,
        job_id: Uuid,
        entry: PortfolioEntry,
    ) -> ClientResult<PortfolioEntry> {
        {
            let mut slot = self.job.write().await;
            if let Some(job) = slot.as_mut().filter(|j| j.job_id == job_id) {
                let transition = job.succeed();
                self.emit_transition(job, transition.old_state, transition.new_state);
                self.emit_progress(job);
                tracing::info!(
                    job_id = %job_id,
                    name = %entry.name,
                    ticker = %entry.ticker,
                    elapsed_secs = job.elapsed_seconds(),
                    "Onboarding succeeded"
                );
            }
        }

        self.portfolio.merge(entry.clone()).await;
        if let Err(e) = self.portfolio.refresh().await {
            tracing::warn!(
                job_id = %job_id,
                error = %e,
                "Portfolio refresh after onboarding failed; keeping local entry"
            );
        }

        tokio::time::sleep(self.settings.settle_delay).await;

        let mut slot = self.job.write().await;
        if let Some(job) = slot.as_ref() {
            if job.job_id == job_id && job.state == OnboardingPhase::Succeeded {
                self.emit_transition(job, OnboardingPhase::Succeeded, OnboardingPhase::Idle);
                *slot = None;
            }
        }

        Ok(entry)
    }

    async fn fail(&self, job_id: Uuid, err: &ClientError) {
        let mut slot = self.job.write().await;
        if let Some(job) = slot.as_mut().filter(|j| j.job_id == job_id) {
            let transition = job.fail(err.to_string());
            self.emit_transition(job, transition.old_state, transition.new_state);
            self.emit_progress(job);
            tracing::error!(
                job_id = %job_id,
                target_name = %job.target_name,
                error = %err,
                "Onboarding failed"
            );
        }
    }

    /// By ticker when supplied, else by name; a typed domain or name is first
    /// resolved to the directory's canonical name
    async fn find_in_portfolio(&self, name: &str, ticker: Option<&str>) -> Option<PortfolioEntry> {
        if let Some(ticker) = ticker {
            return self.portfolio.find_by_ticker(ticker).await;
        }

        if let Some(org) = self.directory.resolve(name) {
            if let Some(entry) = self.portfolio.find_by_name(&org.name).await {
                return Some(entry);
            }
        }
        self.portfolio.find_by_name(name).await
    }

    fn emit_transition(
        &self,
        job: &OnboardingJob,
        old_state: OnboardingPhase,
        new_state: OnboardingPhase,
    ) {
        emit_state_change(&self.event_bus, job, old_state, new_state);
    }

    fn emit_progress(&self, job: &OnboardingJob) {
        self.event_bus.emit_lossy(CldEvent::OnboardingProgress {
            job_id: job.job_id,
            step: job.step,
            max_step: job.max_step,
            timestamp: chrono::Utc::now(),
        });
    }
}

fn emit_state_change(
    event_bus: &EventBus,
    job: &OnboardingJob,
    old_state: OnboardingPhase,
    new_state: OnboardingPhase,
) {
    tracing::debug!(job_id = %job.job_id, from = %old_state, to = %new_state, "Onboarding state change");
    event_bus.emit_lossy(CldEvent::OnboardingStateChanged {
        job_id: job.job_id,
        target_name: job.target_name.clone(),
        old_state,
        new_state,
        message: if new_state == OnboardingPhase::Failed {
            job.error.clone()
        } else {
            None
        },
        timestamp: chrono::Utc::now(),
    });
}

/// Fail `job_id` with [`CANCELLED_MESSAGE`] if it is still running
fn cancel_job(slot: &mut Option<OnboardingJob>, job_id: Uuid, event_bus: &EventBus) {
    if let Some(job) = slot.as_mut().filter(|j| j.job_id == job_id && j.is_running()) {
        let transition = job.fail(CANCELLED_MESSAGE.to_string());
        tracing::warn!(job_id = %job_id, target_name = %job.target_name, "Onboarding cancelled");
        emit_state_change(event_bus, job, transition.old_state, transition.new_state);
    }
}

/// Fails the job if `submit` is dropped while the request is outstanding
struct SubmitGuard<'a> {
    workflow: &'a OnboardingWorkflow,
    job_id: Uuid,
    armed: bool,
}

impl Drop for SubmitGuard<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        if let Ok(mut slot) = self.workflow.job.try_write() {
            cancel_job(&mut slot, self.job_id, &self.workflow.event_bus);
            return;
        }

        // A reader holds the lock; finish the cancellation once it is released
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            tracing::error!(job_id = %self.job_id, "Submission dropped outside a runtime; job left running");
            return;
        };
        let job = Arc::clone(&self.workflow.job);
        let event_bus = self.workflow.event_bus.clone();
        let job_id = self.job_id;
        handle.spawn(async move {
            let mut slot = job.write().await;
            cancel_job(&mut slot, job_id, &event_bus);
        });
    }
}
