//! Verification model
//!
//! Pure transform from a raw [`AnalysisPayload`] into display-ready metric
//! records. Every record joins `promise`, `truth` and `metric_sources` on the
//! metric key; a key missing from any of them yields `None` / an empty list,
//! never an error.

use cld_common::{AnalysisPayload, Citation};
use serde::Serialize;
use serde_json::Value;

/// Entries in the sample-metrics panel
pub const SAMPLE_METRIC_LIMIT: usize = 10;
/// Entries in the promises list
pub const PROMISE_LIMIT: usize = 20;
/// Entries in the truths list
pub const TRUTH_LIMIT: usize = 20;

/// One metric, cross-referenced across the payload maps
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricRecord {
    pub key: String,
    #[serde(rename = "metric")]
    pub display_label: String,
    /// Claimed value as sent by the backend
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    /// Verdict, when the key appears in `truth`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verified: Option<bool>,
    pub citations: Vec<Citation>,
}

impl MetricRecord {
    /// Value as shown in a table cell; no numeric parsing
    pub fn display_value(&self) -> String {
        match &self.value {
            None | Some(Value::Null) => "N/A".to_string(),
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
        }
    }
}

/// Everything the detail view renders for one organization
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VerificationView {
    pub name: String,
    pub ticker: String,
    pub esg_report_reference: Option<String>,
    /// First promise entries, for the summary panel
    pub metrics: Vec<MetricRecord>,
    pub promises: Vec<MetricRecord>,
    /// First truth entries, each with its citations
    pub truths: Vec<MetricRecord>,
    /// General attribution, independent of per-metric citations
    pub sources: Vec<Citation>,
}

/// Metric key → human label
///
/// Underscores become spaces and the first letter of each word is
/// upper-cased. Other characters are left as they are, so
/// `emissions_intensity_(scope_1)` becomes `Emissions Intensity (Scope 1)`.
pub fn format_metric_label(key: &str) -> String {
    let mut label = String::with_capacity(key.len());
    let mut at_word_start = true;

    for c in key.chars() {
        let c = if c == '_' { ' ' } else { c };
        if c.is_alphanumeric() {
            if at_word_start {
                label.extend(c.to_uppercase());
            } else {
                label.push(c);
            }
            at_word_start = false;
        } else {
            label.push(c);
            at_word_start = true;
        }
    }

    label
}

/// Build the full view for a payload
pub fn normalize(payload: &AnalysisPayload) -> VerificationView {
    let metrics = payload
        .promise
        .keys()
        .take(SAMPLE_METRIC_LIMIT)
        .map(|key| metric_record(payload, key))
        .collect();

    let promises = payload
        .promise
        .keys()
        .take(PROMISE_LIMIT)
        .map(|key| metric_record(payload, key))
        .collect();

    let truths = payload
        .truth
        .keys()
        .take(TRUTH_LIMIT)
        .map(|key| metric_record(payload, key))
        .collect();

    VerificationView {
        name: payload.name.clone(),
        ticker: payload.ticker.clone(),
        esg_report_reference: payload.esg_report_reference.clone(),
        metrics,
        promises,
        truths,
        sources: payload.sources.clone(),
    }
}

/// Join one key across promise, truth and metric_sources
pub fn metric_record(payload: &AnalysisPayload, key: &str) -> MetricRecord {
    MetricRecord {
        key: key.to_string(),
        display_label: format_metric_label(key),
        value: payload.promise.get(key).cloned(),
        verified: payload.truth.get(key).copied(),
        citations: payload.metric_sources.get(key).cloned().unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;
    use serde_json::json;

    fn payload_with(promise: usize, truth: usize) -> AnalysisPayload {
        let mut payload = AnalysisPayload::empty("Acme Co", "ACME");
        for i in 0..promise {
            payload.promise.insert(format!("metric_{}", i), json!(i));
        }
        for i in 0..truth {
            payload.truth.insert(format!("metric_{}", i), i % 2 == 0);
        }
        payload
    }

    #[test]
    fn test_label_formatting() {
        assert_eq!(format_metric_label("ghg_emissions"), "Ghg Emissions");
        assert_eq!(format_metric_label("revenue"), "Revenue");
        assert_eq!(format_metric_label("female_workforce_%"), "Female Workforce %");
        assert_eq!(
            format_metric_label("emissions_intensity_(scope_1_per_revenue)"),
            "Emissions Intensity (Scope 1 Per Revenue)"
        );
        assert_eq!(format_metric_label("c-suit_turnover_rate"), "C-Suit Turnover Rate");
        assert_eq!(format_metric_label("CO2_total"), "CO2 Total");
        assert_eq!(format_metric_label(""), "");
    }

    #[test]
    fn test_label_is_identical_across_views() {
        let mut payload = AnalysisPayload::empty("Acme Co", "ACME");
        payload.promise.insert("water_usage".into(), json!("5 ML"));
        payload.truth.insert("water_usage".into(), false);

        let view = normalize(&payload);
        let label = format_metric_label("water_usage");
        assert_eq!(view.metrics[0].display_label, label);
        assert_eq!(view.promises[0].display_label, label);
        assert_eq!(view.truths[0].display_label, label);
    }

    #[test]
    fn test_truth_entry_with_citations() {
        let mut payload = AnalysisPayload::empty("Acme Co", "ACME");
        payload.promise.insert("ghg_emissions".into(), json!("1000t"));
        payload.truth.insert("ghg_emissions".into(), true);
        payload.metric_sources.insert(
            "ghg_emissions".into(),
            vec![Citation::new("https://x", Some("report"))],
        );

        let view = normalize(&payload);
        assert_eq!(view.truths.len(), 1);

        let truth = serde_json::to_value(&view.truths[0]).unwrap();
        assert_eq!(truth["metric"], "Ghg Emissions");
        assert_eq!(truth["verified"], true);
        assert_eq!(
            truth["citations"],
            json!([{"url": "https://x", "description": "report"}])
        );
    }

    #[test]
    fn test_truth_without_sources_has_empty_citations() {
        let mut payload = AnalysisPayload::empty("Acme Co", "ACME");
        payload.truth.insert("water_usage".into(), false);
        payload
            .metric_sources
            .insert("energy_consumption".into(), vec![Citation::new("https://y", None)]);

        let view = normalize(&payload);
        assert_eq!(view.truths[0].verified, Some(false));
        assert!(view.truths[0].citations.is_empty());
        // Key only in truth: no claimed value
        assert_eq!(view.truths[0].value, None);
        assert_eq!(view.truths[0].display_value(), "N/A");
    }

    #[test]
    fn test_view_limits() {
        let view = normalize(&payload_with(35, 28));
        assert_eq!(view.metrics.len(), SAMPLE_METRIC_LIMIT);
        assert_eq!(view.promises.len(), PROMISE_LIMIT);
        assert_eq!(view.truths.len(), TRUTH_LIMIT);

        let small = normalize(&payload_with(3, 0));
        assert_eq!(small.metrics.len(), 3);
        assert!(small.truths.is_empty());
    }

    #[test]
    fn test_map_order_preserved() {
        let mut promise = IndexMap::new();
        promise.insert("zeta".to_string(), json!(1));
        promise.insert("alpha".to_string(), json!(2));
        promise.insert("mid".to_string(), json!(3));
        let mut payload = AnalysisPayload::empty("Acme Co", "ACME");
        payload.promise = promise;

        let keys: Vec<String> = normalize(&payload).metrics.into_iter().map(|m| m.key).collect();
        assert_eq!(keys, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_values_pass_through_unchanged() {
        let mut payload = AnalysisPayload::empty("Acme Co", "ACME");
        payload.promise.insert("revenue".into(), json!(1.5e9));
        payload.promise.insert("employees".into(), json!("about 10,000"));
        payload.promise.insert("water_usage".into(), Value::Null);

        let view = normalize(&payload);
        assert_eq!(view.metrics[0].value, Some(json!(1.5e9)));
        assert_eq!(view.metrics[1].display_value(), "about 10,000");
        assert_eq!(view.metrics[2].value, Some(Value::Null));
        assert_eq!(view.metrics[2].display_value(), "N/A");
    }

    #[test]
    fn test_sources_independent_of_metrics() {
        let mut payload = AnalysisPayload::empty("Acme Co", "ACME");
        payload.sources = vec![Citation::new("https://annual-report", Some("Annual report"))];

        let view = normalize(&payload);
        assert_eq!(view.sources.len(), 1);
        assert!(view.truths.is_empty());
        assert!(view.metrics.is_empty());
    }
}
