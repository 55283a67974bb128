//! Findings selection and tallies

use crate::client::types::{Finding, PhaseHandle, RiskLevel};
use std::collections::BTreeMap;
use std::fmt;
use strum::IntoEnumIterator;

/// Keep only findings raised by the scan behind `handle`, in scanner order
pub fn filter_by_scan(findings: Vec<Finding>, handle: &PhaseHandle) -> Vec<Finding> {
    findings
        .into_iter()
        .filter(|f| f.scan_id == handle.as_str())
        .collect()
}

/// Finding counts per risk level
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FindingsSummary {
    counts: BTreeMap<RiskLevel, usize>,
    total: usize,
}

impl FindingsSummary {
    pub fn from_findings(findings: &[Finding]) -> Self {
        let mut counts: BTreeMap<RiskLevel, usize> =
            RiskLevel::iter().map(|risk| (risk, 0)).collect();
        for finding in findings {
            *counts.entry(finding.risk).or_default() += 1;
        }
        Self {
            counts,
            total: findings.len(),
        }
    }

    pub fn count(&self, risk: RiskLevel) -> usize {
        self.counts.get(&risk).copied().unwrap_or_default()
    }

    pub fn total(&self) -> usize {
        self.total
    }
}

impl fmt::Display for FindingsSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} findings", self.total)?;
        // Most severe first
        let parts: Vec<String> = self
            .counts
            .iter()
            .rev()
            .map(|(risk, count)| format!("{} {}", count, risk))
            .collect();
        write!(f, " ({})", parts.join(", "))
    }
}
