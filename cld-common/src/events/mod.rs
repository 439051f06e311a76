//! Event types for the CLD event system
//!
//! Provides shared event definitions and the EventBus used by UI layers to
//! follow onboarding, portfolio and search activity.

mod onboarding_types;

pub use onboarding_types::{OnboardingPhase, PortfolioChangeTrigger};

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::models::OrganizationRef;

/// CLD event types
///
/// Events are broadcast via EventBus and can be serialized for transmission
/// to any front end.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum CldEvent {
    /// Onboarding job changed state
    ///
    /// Triggers:
    /// - UI: Show/hide progress display, enable/disable dismiss control
    /// - UI: Show error message on Failed
    OnboardingStateChanged {
        /// Job identifier
        job_id: Uuid,
        /// Organization being onboarded
        target_name: String,
        /// State before change
        old_state: OnboardingPhase,
        /// State after change
        new_state: OnboardingPhase,
        /// Error message when entering Failed
        message: Option<String>,
        /// When state changed
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Synthetic progress step changed
    ///
    /// NOTE: Cosmetic only. The backend reports no progress; `step == max_step`
    /// is only ever emitted after the backend responded successfully.
    OnboardingProgress {
        /// Job identifier
        job_id: Uuid,
        /// Current step (0-based)
        step: u32,
        /// Terminal step
        max_step: u32,
        /// Progress update timestamp
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Portfolio list changed
    ///
    /// Triggers:
    /// - UI: Re-render dashboard
    PortfolioChanged {
        /// Number of entries after the change
        entries: usize,
        /// Why the list changed
        trigger: PortfolioChangeTrigger,
        /// When the list changed
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Debounced search produced results for the latest query
    SearchResultsReady {
        /// Monotonic query generation
        generation: u64,
        /// Query as typed
        query: String,
        /// Matches, capped
        results: Vec<OrganizationRef>,
        /// When the search ran
        timestamp: chrono::DateTime<chrono::Utc>,
    },
}

impl CldEvent {
    /// Event name for logging and SSE-style framing
    pub fn event_type(&self) -> &'static str {
        match self {
            CldEvent::OnboardingStateChanged { .. } => "OnboardingStateChanged",
            CldEvent::OnboardingProgress { .. } => "OnboardingProgress",
            CldEvent::PortfolioChanged { .. } => "PortfolioChanged",
            CldEvent::SearchResultsReady { .. } => "SearchResultsReady",
        }
    }
}

// ========================================
// EventBus Implementation
// ========================================

/// Central event distribution bus
///
/// The EventBus uses tokio::broadcast internally, providing:
/// - Non-blocking publish (slow subscribers don't block producers)
/// - Multiple concurrent subscribers
/// - Lagged message detection for slow subscribers
///
/// # Examples
///
/// ```
/// use cld_common::events::{CldEvent, EventBus, PortfolioChangeTrigger};
///
/// let event_bus = EventBus::new(100);
/// let mut rx = event_bus.subscribe();
///
/// event_bus.emit(CldEvent::PortfolioChanged {
///     entries: 3,
///     trigger: PortfolioChangeTrigger::Refresh,
///     timestamp: chrono::Utc::now(),
/// }).ok();
///
/// assert!(rx.try_recv().is_ok());
/// ```
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<CldEvent>,
    capacity: usize,
}

impl EventBus {
    /// Creates a new EventBus with specified channel capacity
    ///
    /// * `capacity` - Number of events to buffer before dropping old events
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx, capacity }
    }

    /// Subscribe to all future events
    ///
    /// Events emitted before subscription are not received.
    pub fn subscribe(&self) -> broadcast::Receiver<CldEvent> {
        self.tx.subscribe()
    }

    /// Emit an event to all subscribers
    ///
    /// Returns `Ok(subscriber_count)` if at least one subscriber exists.
    /// Returns `Err` if no subscribers are listening.
    #[allow(clippy::result_large_err)]
    pub fn emit(
        &self,
        event: CldEvent,
    ) -> Result<usize, broadcast::error::SendError<CldEvent>> {
        self.tx.send(event)
    }

    /// Emit an event, ignoring if no subscribers are listening
    pub fn emit_lossy(&self, event: CldEvent) {
        let _ = self.tx.send(event);
    }

    /// Current number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Configured channel capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn progress(step: u32) -> CldEvent {
        CldEvent::OnboardingProgress {
            job_id: Uuid::nil(),
            step,
            max_step: 5,
            timestamp: chrono::Utc::now(),
        }
    }

    #[test]
    fn test_emit_without_subscribers_is_err() {
        let bus = EventBus::new(10);
        assert!(bus.emit(progress(1)).is_err());
        // Lossy variant never fails
        bus.emit_lossy(progress(1));
    }

    #[tokio::test]
    async fn test_subscribers_receive_in_order() {
        let bus = EventBus::new(10);
        let mut rx = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 1);

        bus.emit(progress(1)).unwrap();
        bus.emit(progress(2)).unwrap();

        for expected in [1, 2] {
            match rx.recv().await.unwrap() {
                CldEvent::OnboardingProgress { step, .. } => assert_eq!(step, expected),
                other => panic!("unexpected event {:?}", other),
            }
        }
    }

    #[test]
    fn test_lagged_subscriber() {
        let bus = EventBus::new(2);
        let mut rx = bus.subscribe();
        for step in 0..5 {
            bus.emit_lossy(progress(step));
        }
        assert!(matches!(
            rx.try_recv(),
            Err(broadcast::error::TryRecvError::Lagged(_))
        ));
        assert_eq!(bus.capacity(), 2);
    }

    #[test]
    fn test_event_serialization_tag() {
        let event = CldEvent::OnboardingStateChanged {
            job_id: Uuid::nil(),
            target_name: "Acme Co".to_string(),
            old_state: OnboardingPhase::Submitting,
            new_state: OnboardingPhase::Progressing,
            message: None,
            timestamp: chrono::Utc::now(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "OnboardingStateChanged");
        assert_eq!(json["new_state"], "PROGRESSING");
        assert_eq!(event.event_type(), "OnboardingStateChanged");
    }

    #[test]
    fn test_phase_predicates() {
        assert!(OnboardingPhase::Submitting.is_running());
        assert!(OnboardingPhase::Progressing.is_running());
        assert!(!OnboardingPhase::Failed.is_running());
        assert!(OnboardingPhase::Succeeded.is_terminal());
        assert!(!OnboardingPhase::Idle.is_terminal());
    }
}
