//! cld-ui library - Corporate Lie Detector client core
//!
//! Directory search, onboarding workflow, portfolio store and verification
//! model, wired to an analysis backend over HTTP.

use std::sync::Arc;

use anyhow::Context;
use cld_common::events::EventBus;

pub mod backend;
pub mod config;
pub mod detail;
pub mod directory;
pub mod error;
pub mod onboarding;
pub mod portfolio;
pub mod render;
pub mod verification;

pub use backend::{Backend, HttpBackend};
pub use config::ClientConfig;
pub use detail::DetailPanel;
pub use directory::{Directory, SearchDebouncer};
pub use error::{ClientError, ClientResult, ValidationError};
pub use onboarding::{OnboardingJob, OnboardingSettings, OnboardingWorkflow};
pub use portfolio::PortfolioStore;

/// Everything a front end needs, sharing one backend and one event bus
#[derive(Clone)]
pub struct AppContext {
    pub config: ClientConfig,
    pub event_bus: EventBus,
    pub backend: Arc<dyn Backend>,
    pub directory: Arc<Directory>,
    pub portfolio: PortfolioStore,
    pub onboarding: OnboardingWorkflow,
    pub detail: DetailPanel,
}

impl AppContext {
    /// Wire components around an existing backend
    pub fn new(config: ClientConfig, backend: Arc<dyn Backend>, directory: Directory) -> Self {
        let event_bus = EventBus::new(config.event_capacity);
        let directory = Arc::new(directory);
        let portfolio = PortfolioStore::new(Arc::clone(&backend), event_bus.clone());
        let onboarding = OnboardingWorkflow::new(
            Arc::clone(&backend),
            portfolio.clone(),
            Arc::clone(&directory),
            event_bus.clone(),
            config.onboarding.clone(),
        );
        let detail = DetailPanel::new(Arc::clone(&backend));

        Self {
            config,
            event_bus,
            backend,
            directory,
            portfolio,
            onboarding,
            detail,
        }
    }

    /// HTTP backend plus the configured (or built-in) directory
    pub fn from_config(config: ClientConfig) -> anyhow::Result<Self> {
        let backend = HttpBackend::new(
            &config.backend_url,
            config.request_timeout,
            config.submit_timeout,
        )
        .context("Failed to build HTTP backend client")?;

        let directory = match config.directory_file() {
            Some(path) => Directory::from_json_file(path)
                .with_context(|| format!("Failed to load directory from {}", path.display()))?,
            None => Directory::builtin().context("Built-in directory is invalid")?,
        };

        tracing::info!(
            backend_url = %config.backend_url,
            directory_entries = directory.len(),
            "Client context ready"
        );

        Ok(Self::new(config, Arc::new(backend), directory))
    }

    /// Search driver bound to this context's directory and event bus
    pub fn search_debouncer(&self) -> SearchDebouncer {
        SearchDebouncer::new(
            Arc::clone(&self.directory),
            self.config.search_debounce,
            self.event_bus.clone(),
        )
    }
}
