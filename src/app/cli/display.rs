//! Finding output for the CLI

use crate::client::types::Finding;
use crate::core::styles::StyleRole;
use crate::report::types::ScanReport;
use crate::scan::findings::FindingsSummary;

/// `name: risk (confidence)`
pub fn format_finding(finding: &Finding, use_color: bool) -> String {
    let risk = StyleRole::for_risk(finding.risk).paint(&finding.risk.to_string(), use_color);
    format!(
        "{}: {} ({})",
        finding.display_name(),
        risk,
        finding.confidence
    )
}

/// Log one line per finding followed by the per-risk summary
pub fn log_report(report: &ScanReport, use_color: bool) {
    for finding in report.vulnerabilities() {
        log::info!("{}", format_finding(finding, use_color));
    }
    log::info!(
        "{}",
        FindingsSummary::from_findings(report.vulnerabilities())
    );
    if let Some(batch) = report.classifications() {
        let counts: Vec<String> = batch
            .summary
            .iter()
            .map(|(verdict, count)| format!("{} {}", count, verdict))
            .collect();
        log::info!("Classifier verdicts: {}", counts.join(", "));
    }
}
