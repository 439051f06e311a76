//! In-memory company database
//!
//! Loaded from a JSON object keyed by ticker. Records added through
//! `POST /api/company` live only as long as the process.

use std::path::Path;

use cld_common::{AnalysisPayload, Citation, PortfolioEntry, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

const BUILTIN_DATA: &str = include_str!("../data/data.json");

/// Ticker prefix length derived from a company name
const DERIVED_TICKER_LEN: usize = 4;

/// Fallback when a name has no alphanumerics to derive a ticker from
const FALLBACK_TICKER: &str = "ORG";

/// One company as stored on disk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyRecord {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub esg_report_reference: Option<String>,
    #[serde(default)]
    pub scanned: bool,
    #[serde(default)]
    pub promise: IndexMap<String, Value>,
    #[serde(default)]
    pub truth: IndexMap<String, bool>,
    #[serde(default)]
    pub metric_sources: IndexMap<String, Vec<Citation>>,
    #[serde(default)]
    pub sources: Vec<Citation>,
}

impl CompanyRecord {
    /// Freshly onboarded company with no analysis content yet
    pub fn scanned(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            esg_report_reference: None,
            scanned: true,
            promise: IndexMap::new(),
            truth: IndexMap::new(),
            metric_sources: IndexMap::new(),
            sources: Vec::new(),
        }
    }

    pub fn to_payload(&self, ticker: &str) -> AnalysisPayload {
        AnalysisPayload {
            name: self.name.clone(),
            ticker: ticker.to_string(),
            esg_report_reference: self.esg_report_reference.clone(),
            promise: self.promise.clone(),
            truth: self.truth.clone(),
            metric_sources: self.metric_sources.clone(),
            sources: self.sources.clone(),
        }
    }
}

/// Companies keyed by upper-case ticker, in file order
#[derive(Debug, Clone, Default)]
pub struct CompanyDb {
    companies: IndexMap<String, CompanyRecord>,
}

impl CompanyDb {
    pub fn builtin() -> Result<Self> {
        Self::from_json_str(BUILTIN_DATA)
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let raw: IndexMap<String, CompanyRecord> = serde_json::from_str(json)?;
        let companies = raw
            .into_iter()
            .map(|(ticker, record)| (ticker.trim().to_uppercase(), record))
            .collect();
        Ok(Self { companies })
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let db = Self::from_json_str(&content)?;
        tracing::info!(path = %path.display(), companies = db.len(), "Loaded company database");
        Ok(db)
    }

    pub fn len(&self) -> usize {
        self.companies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.companies.is_empty()
    }

    /// `{name, ticker}` for every company
    pub fn portfolio(&self) -> Vec<PortfolioEntry> {
        self.companies
            .iter()
            .map(|(ticker, record)| PortfolioEntry::new(record.name.clone(), ticker.clone()))
            .collect()
    }

    /// Case-insensitive ticker lookup
    pub fn get(&self, ticker: &str) -> Option<AnalysisPayload> {
        let key = ticker.trim().to_uppercase();
        self.companies.get(&key).map(|record| record.to_payload(&key))
    }

    /// Existing company matching the ticker or (case-insensitive) name
    pub fn find(&self, name: &str, ticker: Option<&str>) -> Option<AnalysisPayload> {
        if let Some(found) = ticker.and_then(|t| self.get(t)) {
            return Some(found);
        }

        let needle = name.trim().to_lowercase();
        self.companies
            .iter()
            .find(|(_, record)| record.name.trim().to_lowercase() == needle)
            .map(|(key, record)| record.to_payload(key))
    }

    /// Unused ticker for a new company
    ///
    /// The requested ticker (upper-cased) or the first letters and digits of
    /// the name. A taken ticker gets a numeric suffix: `ACME`, `ACME2`, ...
    pub fn assign_ticker(&self, name: &str, requested: Option<&str>) -> String {
        let base = requested
            .map(|t| t.trim().to_uppercase())
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| derive_ticker(name));

        if !self.companies.contains_key(&base) {
            return base;
        }

        (2..)
            .map(|n| format!("{}{}", base, n))
            .find(|candidate| !self.companies.contains_key(candidate))
            .unwrap_or(base)
    }

    pub fn insert(&mut self, ticker: String, record: CompanyRecord) -> AnalysisPayload {
        let payload = record.to_payload(&ticker);
        self.companies.insert(ticker, record);
        payload
    }
}

fn derive_ticker(name: &str) -> String {
    let derived: String = name
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .take(DERIVED_TICKER_LEN)
        .collect::<String>()
        .to_uppercase();

    if derived.is_empty() {
        FALLBACK_TICKER.to_string()
    } else {
        derived
    }
}
