//! Detail panel
//!
//! Holds whatever organization is currently on display. Selecting a
//! directory or portfolio row shows it immediately; `load` replaces it with
//! the backend's full analysis only once that fetch succeeds.

use std::sync::Arc;

use cld_common::{OrganizationDetail, OrganizationRef, PortfolioEntry};
use tokio::sync::RwLock;

use crate::backend::Backend;
use crate::error::ClientResult;
use crate::verification::{self, VerificationView};

#[derive(Clone)]
pub struct DetailPanel {
    backend: Arc<dyn Backend>,
    current: Arc<RwLock<Option<OrganizationDetail>>>,
}

impl DetailPanel {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self {
            backend,
            current: Arc::new(RwLock::new(None)),
        }
    }

    pub async fn current(&self) -> Option<OrganizationDetail> {
        self.current.read().await.clone()
    }

    /// Normalized view of the displayed analysis, if one is loaded
    pub async fn view(&self) -> Option<VerificationView> {
        self.current
            .read()
            .await
            .as_ref()
            .and_then(OrganizationDetail::analysis)
            .map(verification::normalize)
    }

    pub async fn show_directory_entry(&self, org: OrganizationRef) {
        *self.current.write().await = Some(OrganizationDetail::Directory(org));
    }

    pub async fn show_portfolio_entry(&self, entry: PortfolioEntry) {
        *self.current.write().await = Some(OrganizationDetail::Portfolio(entry));
    }

    /// Fetch and display the analysis for `ticker`
    ///
    /// On error the previously displayed detail is kept as is.
    pub async fn load(&self, ticker: &str) -> ClientResult<VerificationView> {
        let payload = match self.backend.fetch_company(ticker).await {
            Ok(payload) => payload,
            Err(e) => {
                tracing::warn!(ticker = %ticker, error = %e, "Detail fetch failed; keeping current detail");
                return Err(e);
            }
        };

        let view = verification::normalize(&payload);
        tracing::debug!(
            ticker = %payload.ticker,
            promises = payload.promise.len(),
            truths = payload.truth.len(),
            "Detail loaded"
        );
        *self.current.write().await = Some(OrganizationDetail::Analysis(Box::new(payload)));
        Ok(view)
    }

    pub async fn clear(&self) {
        *self.current.write().await = None;
    }
}
