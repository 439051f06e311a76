//! Synthetic progress timer
//!
//! The backend reports nothing while an analysis runs, so the workflow shows
//! a step counter that advances on a fixed interval while the request is
//! outstanding. The counter lives in the job; this task only nudges it.

use std::sync::Arc;
use std::time::Duration;

use cld_common::events::{CldEvent, EventBus};
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use super::job::OnboardingJob;

/// Handle to a running progress timer
///
/// The timer stops when [`ProgressTicker::stop`] is called, when the handle is
/// dropped, or when the job leaves Progressing.
pub struct ProgressTicker {
    token: CancellationToken,
    handle: JoinHandle<()>,
}

impl ProgressTicker {
    pub fn start(
        job: Arc<RwLock<Option<OnboardingJob>>>,
        job_id: Uuid,
        interval: Duration,
        event_bus: EventBus,
    ) -> Self {
        let token = CancellationToken::new();
        let handle = tokio::spawn(run_ticker(job, job_id, interval, event_bus, token.clone()));
        Self { token, handle }
    }

    /// Cancel the timer and wait for its task, so no step lands after this returns
    pub async fn stop(mut self) {
        self.token.cancel();
        if let Err(e) = (&mut self.handle).await {
            tracing::warn!(error = %e, "Progress timer task ended abnormally");
        }
    }
}

impl Drop for ProgressTicker {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

async fn run_ticker(
    job: Arc<RwLock<Option<OnboardingJob>>>,
    job_id: Uuid,
    interval: Duration,
    event_bus: EventBus,
    token: CancellationToken,
) {
    let mut ticker = tokio::time::interval_at(Instant::now() + interval, interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            _ = token.cancelled() => break,
            _ = ticker.tick() => {}
        }

        let mut slot = job.write().await;
        let Some(current) = slot.as_mut().filter(|j| j.job_id == job_id) else {
            break;
        };
        if !current.is_running() {
            break;
        }

        if let Some(step) = current.advance_step() {
            tracing::debug!(job_id = %job_id, step, max_step = current.max_step, "Onboarding progress");
            event_bus.emit_lossy(CldEvent::OnboardingProgress {
                job_id,
                step,
                max_step: current.max_step,
                timestamp: chrono::Utc::now(),
            });
        }
    }

    tracing::trace!(job_id = %job_id, "Progress timer stopped");
}
