//! Organization, portfolio and analysis data model
//!
//! Shared by the client core (`cld-ui`) and the stand-in backend (`cld-mock`)
//! so both ends of the HTTP contract agree on field names.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A known organization as listed in the directory
///
/// Identity is the ticker once the backend has assigned one, the name before that.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrganizationRef {
    /// Display name
    pub name: String,
    /// Web domain or other free-form identifier
    #[serde(alias = "domain_or_identifier")]
    pub domain: String,
    /// Exchange ticker, if known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ticker: Option<String>,
}

impl OrganizationRef {
    pub fn new(name: impl Into<String>, domain: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            domain: domain.into(),
            ticker: None,
        }
    }

    pub fn with_ticker(mut self, ticker: impl Into<String>) -> Self {
        self.ticker = Some(ticker.into());
        self
    }
}

/// Durable portfolio membership record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortfolioEntry {
    pub name: String,
    pub ticker: String,
}

impl PortfolioEntry {
    pub fn new(name: impl Into<String>, ticker: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ticker: ticker.into(),
        }
    }

    /// Tickers compare case-insensitively; the backend upper-cases them on lookup
    pub fn has_ticker(&self, ticker: &str) -> bool {
        self.ticker.trim().eq_ignore_ascii_case(ticker.trim())
    }

    pub fn has_name(&self, name: &str) -> bool {
        self.name.trim().to_lowercase() == name.trim().to_lowercase()
    }
}

impl From<&AnalysisPayload> for PortfolioEntry {
    fn from(payload: &AnalysisPayload) -> Self {
        Self::new(payload.name.clone(), payload.ticker.clone())
    }
}

/// Source reference supporting a verdict
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Citation {
    pub url: String,
    /// Older backend revisions sent `title` instead of `description`
    #[serde(default, alias = "title")]
    pub description: Option<String>,
}

impl Citation {
    pub fn new(url: impl Into<String>, description: Option<&str>) -> Self {
        Self {
            url: url.into(),
            description: description.map(str::to_string),
        }
    }
}

/// Raw result of a completed analysis job
///
/// `promise` and `truth` share a key vocabulary but their key sets are
/// independent. Map order is the backend's order and is preserved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisPayload {
    pub name: String,
    pub ticker: String,
    #[serde(default, alias = "esg_report")]
    pub esg_report_reference: Option<String>,
    /// Claimed metric values; `null` when no claim was found
    #[serde(default)]
    pub promise: IndexMap<String, Value>,
    /// Verification verdict per metric key
    #[serde(default)]
    pub truth: IndexMap<String, bool>,
    /// Citations per metric key
    #[serde(default)]
    pub metric_sources: IndexMap<String, Vec<Citation>>,
    /// General attribution, not keyed by metric
    #[serde(default)]
    pub sources: Vec<Citation>,
}

impl AnalysisPayload {
    /// Payload with no analysis data yet
    pub fn empty(name: impl Into<String>, ticker: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ticker: ticker.into(),
            esg_report_reference: None,
            promise: IndexMap::new(),
            truth: IndexMap::new(),
            metric_sources: IndexMap::new(),
            sources: Vec::new(),
        }
    }
}

/// POST /company request body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateCompanyRequest {
    pub company_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ticker: Option<String>,
}

/// Error body returned by the backend on non-2xx responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub detail: Value,
}

impl ErrorDetail {
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: Value::String(detail.into()),
        }
    }

    /// The detail text, when the backend sent a plain string
    pub fn message(&self) -> Option<&str> {
        match &self.detail {
            Value::String(s) if !s.trim().is_empty() => Some(s.as_str()),
            _ => None,
        }
    }
}

/// Anything shown in an organization card or popup
///
/// One tagged shape regardless of whether the data came from the directory,
/// the portfolio listing or a full analysis fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OrganizationDetail {
    Directory(OrganizationRef),
    Portfolio(PortfolioEntry),
    Analysis(Box<AnalysisPayload>),
}

impl OrganizationDetail {
    pub fn name(&self) -> &str {
        match self {
            OrganizationDetail::Directory(org) => &org.name,
            OrganizationDetail::Portfolio(entry) => &entry.name,
            OrganizationDetail::Analysis(payload) => &payload.name,
        }
    }

    pub fn ticker(&self) -> Option<&str> {
        match self {
            OrganizationDetail::Directory(org) => org.ticker.as_deref(),
            OrganizationDetail::Portfolio(entry) => Some(&entry.ticker),
            OrganizationDetail::Analysis(payload) => Some(&payload.ticker),
        }
    }

    pub fn analysis(&self) -> Option<&AnalysisPayload> {
        match self {
            OrganizationDetail::Analysis(payload) => Some(payload.as_ref()),
            _ => None,
        }
    }
}
