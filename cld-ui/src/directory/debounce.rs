//! Debounced search-as-you-type
//!
//! Each keystroke calls [`SearchDebouncer::schedule`], which cancels the
//! pending timer and starts a new one. Every scheduled query carries a
//! generation number; results are published only if their generation is
//! still the latest, so a slow earlier query can never overwrite a newer one.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use cld_common::events::{CldEvent, EventBus};
use cld_common::OrganizationRef;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use super::Directory;

/// Results for one query generation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchResults {
    pub generation: u64,
    pub query: String,
    pub results: Vec<OrganizationRef>,
}

/// Owns the search debounce timer
pub struct SearchDebouncer {
    directory: Arc<Directory>,
    delay: Duration,
    event_bus: EventBus,
    generation: Arc<AtomicU64>,
    pending: Mutex<Option<CancellationToken>>,
    results_tx: Arc<watch::Sender<SearchResults>>,
}

impl SearchDebouncer {
    pub fn new(directory: Arc<Directory>, delay: Duration, event_bus: EventBus) -> Self {
        let (results_tx, _) = watch::channel(SearchResults::default());
        Self {
            directory,
            delay,
            event_bus,
            generation: Arc::new(AtomicU64::new(0)),
            pending: Mutex::new(None),
            results_tx: Arc::new(results_tx),
        }
    }

    /// Receiver that always holds the latest applied results
    pub fn subscribe(&self) -> watch::Receiver<SearchResults> {
        self.results_tx.subscribe()
    }

    pub fn latest(&self) -> SearchResults {
        self.results_tx.borrow().clone()
    }

    /// Generation of the most recently scheduled query
    pub fn current_generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Schedule `query` after the debounce delay, superseding any pending one
    ///
    /// Must be called from within a tokio runtime. Returns the query's generation.
    pub fn schedule(&self, query: &str) -> u64 {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let token = CancellationToken::new();

        if let Some(previous) = self.pending_slot().replace(token.clone()) {
            previous.cancel();
        }

        let directory = Arc::clone(&self.directory);
        let latest = Arc::clone(&self.generation);
        let results_tx = Arc::clone(&self.results_tx);
        let event_bus = self.event_bus.clone();
        let delay = self.delay;
        let query = query.to_string();

        tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {
                    tracing::trace!(generation, "Search superseded before debounce elapsed");
                    return;
                }
                _ = tokio::time::sleep(delay) => {}
            }

            let results = directory.search(&query);
            publish_if_current(&latest, &results_tx, &event_bus, generation, query, results);
        });

        generation
    }

    /// Cancel the pending timer, if any
    pub fn cancel(&self) {
        if let Some(token) = self.pending_slot().take() {
            token.cancel();
        }
    }

    fn pending_slot(&self) -> MutexGuard<'_, Option<CancellationToken>> {
        self.pending.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Drop for SearchDebouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Apply results only if no newer query has been scheduled
///
/// Returns whether the results were applied.
fn publish_if_current(
    latest: &AtomicU64,
    results_tx: &watch::Sender<SearchResults>,
    event_bus: &EventBus,
    generation: u64,
    query: String,
    results: Vec<OrganizationRef>,
) -> bool {
    if latest.load(Ordering::SeqCst) != generation {
        tracing::debug!(generation, "Discarding stale search results");
        return false;
    }

    tracing::debug!(generation, query = %query, matches = results.len(), "Search results ready");

    event_bus.emit_lossy(CldEvent::SearchResultsReady {
        generation,
        query: query.clone(),
        results: results.clone(),
        timestamp: chrono::Utc::now(),
    });
    results_tx.send_replace(SearchResults {
        generation,
        query,
        results,
    });
    true
}
