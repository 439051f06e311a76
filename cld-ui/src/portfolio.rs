//! Portfolio store
//!
//! Canonical, de-duplicated list of organizations the user has added.
//!
//! The backend's listing is authoritative. `merge` is an optimistic local
//! insert that callers reconcile with `refresh()` right after; no other
//! persistence policy is supported.

use std::sync::Arc;

use cld_common::events::{CldEvent, EventBus, PortfolioChangeTrigger};
use cld_common::PortfolioEntry;
use tokio::sync::RwLock;

use crate::backend::Backend;
use crate::error::ClientResult;

#[derive(Clone)]
pub struct PortfolioStore {
    backend: Arc<dyn Backend>,
    entries: Arc<RwLock<Vec<PortfolioEntry>>>,
    event_bus: EventBus,
}

impl PortfolioStore {
    pub fn new(backend: Arc<dyn Backend>, event_bus: EventBus) -> Self {
        Self {
            backend,
            entries: Arc::new(RwLock::new(Vec::new())),
            event_bus,
        }
    }

    /// Entries in backend order, locally merged entries last
    pub async fn list(&self) -> Vec<PortfolioEntry> {
        self.entries.read().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Insert unless the ticker is already present
    ///
    /// Returns whether the entry was inserted.
    pub async fn merge(&self, entry: PortfolioEntry) -> bool {
        let mut entries = self.entries.write().await;
        if entries.iter().any(|e| e.has_ticker(&entry.ticker)) {
            tracing::debug!(ticker = %entry.ticker, "Portfolio already holds ticker; merge is a no-op");
            return false;
        }

        tracing::info!(name = %entry.name, ticker = %entry.ticker, "Portfolio entry added");
        entries.push(entry);
        self.emit_changed(entries.len(), PortfolioChangeTrigger::Merge);
        true
    }

    /// Replace local state with the backend listing
    ///
    /// On error local state is left untouched. Returns the new entry count.
    pub async fn refresh(&self) -> ClientResult<usize> {
        let listing = self.backend.list_portfolio().await?;
        let fresh = dedupe_by_ticker(listing);

        let mut entries = self.entries.write().await;
        *entries = fresh;
        tracing::info!(entries = entries.len(), "Portfolio refreshed from backend");
        self.emit_changed(entries.len(), PortfolioChangeTrigger::Refresh);
        Ok(entries.len())
    }

    pub async fn find_by_ticker(&self, ticker: &str) -> Option<PortfolioEntry> {
        self.entries
            .read()
            .await
            .iter()
            .find(|e| e.has_ticker(ticker))
            .cloned()
    }

    pub async fn find_by_name(&self, name: &str) -> Option<PortfolioEntry> {
        self.entries
            .read()
            .await
            .iter()
            .find(|e| e.has_name(name))
            .cloned()
    }

    fn emit_changed(&self, entries: usize, trigger: PortfolioChangeTrigger) {
        self.event_bus.emit_lossy(CldEvent::PortfolioChanged {
            entries,
            trigger,
            timestamp: chrono::Utc::now(),
        });
    }
}

/// Keep the first entry per ticker, preserving order
fn dedupe_by_ticker(listing: Vec<PortfolioEntry>) -> Vec<PortfolioEntry> {
    let mut unique: Vec<PortfolioEntry> = Vec::with_capacity(listing.len());
    for entry in listing {
        if unique.iter().any(|e| e.has_ticker(&entry.ticker)) {
            tracing::warn!(ticker = %entry.ticker, "Backend listing repeats ticker; keeping first");
            continue;
        }
        unique.push(entry);
    }
    unique
}
