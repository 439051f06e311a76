//! Plain-text rendering for the terminal front end

use std::fmt::Write;

use cld_common::{OrganizationRef, PortfolioEntry};

use crate::onboarding::OnboardingJob;
use crate::verification::{MetricRecord, VerificationView};

const BAR_WIDTH: usize = 20;

pub fn search_results(query: &str, results: &[OrganizationRef]) -> String {
    if results.is_empty() {
        return format!("No organizations match \"{}\"\n", query.trim());
    }

    let mut out = String::new();
    for org in results {
        let ticker = org.ticker.as_deref().unwrap_or("-");
        let _ = writeln!(out, "{:<40} {:<28} {}", org.name, org.domain, ticker);
    }
    out
}

pub fn portfolio(entries: &[PortfolioEntry]) -> String {
    if entries.is_empty() {
        return "Portfolio is empty\n".to_string();
    }

    let mut out = String::new();
    for entry in entries {
        let _ = writeln!(out, "{:<8} {}", entry.ticker, entry.name);
    }
    out
}

/// One-line status, e.g. `[########------------] 2/5 Progressing Acme Co`
pub fn job_status(job: &OnboardingJob) -> String {
    let filled = (job.fraction() * BAR_WIDTH as f64).round() as usize;
    let filled = filled.min(BAR_WIDTH);
    let mut line = format!(
        "[{}{}] {}/{} {} {}",
        "#".repeat(filled),
        "-".repeat(BAR_WIDTH - filled),
        job.step,
        job.max_step,
        job.state,
        job.target_name
    );
    if let Some(error) = &job.error {
        let _ = write!(line, ": {}", error);
    }
    line
}

pub fn progress_line(step: u32, max_step: u32) -> String {
    let max_step = max_step.max(1);
    let filled = (step.min(max_step) as usize * BAR_WIDTH) / max_step as usize;
    format!(
        "[{}{}] {}/{}",
        "#".repeat(filled),
        "-".repeat(BAR_WIDTH - filled),
        step,
        max_step
    )
}

pub fn verification(view: &VerificationView) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} ({})", view.name, view.ticker);
    if let Some(report) = &view.esg_report_reference {
        let _ = writeln!(out, "Report: {}", report);
    }

    let _ = writeln!(out, "\nSample metrics");
    metric_table(&mut out, &view.metrics);

    let _ = writeln!(out, "\nPromises");
    metric_table(&mut out, &view.promises);

    let _ = writeln!(out, "\nVerification");
    if view.truths.is_empty() {
        let _ = writeln!(out, "  (none)");
    }
    for truth in &view.truths {
        let verdict = match truth.verified {
            Some(true) => "VERIFIED",
            Some(false) => "NOT VERIFIED",
            None => "UNKNOWN",
        };
        let _ = writeln!(out, "  {:<45} {}", truth.display_label, verdict);
        for citation in &truth.citations {
            match &citation.description {
                Some(description) => {
                    let _ = writeln!(out, "      {} ({})", citation.url, description);
                }
                None => {
                    let _ = writeln!(out, "      {}", citation.url);
                }
            }
        }
    }

    if !view.sources.is_empty() {
        let _ = writeln!(out, "\nSources");
        for source in &view.sources {
            let _ = writeln!(
                out,
                "  {}{}",
                source.url,
                source
                    .description
                    .as_deref()
                    .map(|d| format!(" ({})", d))
                    .unwrap_or_default()
            );
        }
    }

    out
}

fn metric_table(out: &mut String, records: &[MetricRecord]) {
    if records.is_empty() {
        let _ = writeln!(out, "  (none)");
        return;
    }
    for record in records {
        let _ = writeln!(out, "  {:<45} {}", record.display_label, record.display_value());
    }
}
