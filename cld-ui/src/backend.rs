//! Analysis backend client
//!
//! The three calls below are the entire boundary between the client core and
//! the backend:
//! - `GET  /portfolio`         → `[{name, ticker}]`
//! - `GET  /company/{ticker}`  → `AnalysisPayload` (404 if unknown)
//! - `POST /company`           → `AnalysisPayload` (may take minutes)

use async_trait::async_trait;
use cld_common::{AnalysisPayload, CreateCompanyRequest, ErrorDetail, PortfolioEntry};
use reqwest::{StatusCode, Url};
use serde::de::DeserializeOwned;
use std::time::Duration;

use crate::error::{ClientError, ClientResult};

const USER_AGENT: &str = concat!("cld-ui/", env!("CARGO_PKG_VERSION"));

/// Backend contract consumed by the portfolio store, onboarding workflow and
/// detail panel
#[async_trait]
pub trait Backend: Send + Sync {
    /// `GET /portfolio`
    async fn list_portfolio(&self) -> ClientResult<Vec<PortfolioEntry>>;

    /// `GET /company/{ticker}`
    async fn fetch_company(&self, ticker: &str) -> ClientResult<AnalysisPayload>;

    /// `POST /company`
    async fn create_company(&self, request: &CreateCompanyRequest) -> ClientResult<AnalysisPayload>;
}

/// reqwest-backed implementation of [`Backend`]
pub struct HttpBackend {
    http_client: reqwest::Client,
    base_url: String,
    submit_timeout: Duration,
}

impl HttpBackend {
    /// * `base_url` - prefix for the three endpoints, e.g. `http://127.0.0.1:8000/api`
    /// * `request_timeout` - applies to the listing and detail calls
    /// * `submit_timeout` - applies to `POST /company` only
    pub fn new(
        base_url: &str,
        request_timeout: Duration,
        submit_timeout: Duration,
    ) -> ClientResult<Self> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(request_timeout)
            .build()
            .map_err(|e| ClientError::Transport(format!("HTTP client setup failed: {}", e)))?;

        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
            submit_timeout,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// `/company/{ticker}` with the ticker as a single encoded path segment
    fn company_url(&self, ticker: &str) -> ClientResult<Url> {
        let ticker = ticker.trim();
        if matches!(ticker, "" | "." | "..") {
            return Err(ClientError::NotFound(format!(
                "No company with ticker {:?}",
                ticker
            )));
        }

        let mut url = Url::parse(&self.url("/company"))
            .map_err(|e| ClientError::Transport(format!("Invalid backend URL: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| {
                ClientError::Transport(format!("Backend URL cannot take a path: {}", self.base_url))
            })?
            .push(ticker);
        Ok(url)
    }
}

#[async_trait]
impl Backend for HttpBackend {
    async fn list_portfolio(&self) -> ClientResult<Vec<PortfolioEntry>> {
        let url = self.url("/portfolio");
        tracing::debug!(url = %url, "Fetching portfolio listing");

        let response = self.http_client.get(&url).send().await?;
        decode_response(response, None).await
    }

    async fn fetch_company(&self, ticker: &str) -> ClientResult<AnalysisPayload> {
        let url = self.company_url(ticker)?;
        tracing::debug!(ticker = %ticker, url = %url, "Fetching company analysis");

        let response = self.http_client.get(url).send().await?;
        decode_response(response, Some(ticker)).await
    }

    async fn create_company(
        &self,
        request: &CreateCompanyRequest,
    ) -> ClientResult<AnalysisPayload> {
        let url = self.url("/company");
        tracing::info!(
            company_name = %request.company_name,
            ticker = ?request.ticker,
            timeout_secs = self.submit_timeout.as_secs(),
            "Submitting company for analysis"
        );

        let response = self
            .http_client
            .post(&url)
            .timeout(self.submit_timeout)
            .json(request)
            .send()
            .await?;
        decode_response(response, None).await
    }
}

/// Map an HTTP response onto the client error taxonomy
///
/// `not_found_key` turns a 404 into `NotFound`; elsewhere a 404 is treated
/// like any other non-2xx status.
async fn decode_response<T: DeserializeOwned>(
    response: reqwest::Response,
    not_found_key: Option<&str>,
) -> ClientResult<T> {
    let status = response.status();

    if status.is_success() {
        return response
            .json::<T>()
            .await
            .map_err(|e| ClientError::Transport(format!("Invalid response body: {}", e)));
    }

    let detail = response
        .json::<ErrorDetail>()
        .await
        .ok()
        .and_then(|body| body.message().map(str::to_string));

    tracing::warn!(status = status.as_u16(), detail = ?detail, "Backend returned error status");

    if status == StatusCode::NOT_FOUND {
        if let Some(key) = not_found_key {
            return Err(ClientError::NotFound(
                detail.unwrap_or_else(|| format!("No company with ticker {}", key)),
            ));
        }
    }

    match detail {
        Some(message) => Err(ClientError::Backend(message)),
        None => Err(ClientError::http_status(status.as_u16())),
    }
}
