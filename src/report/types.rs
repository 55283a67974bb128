//! Report data model

use crate::classifier::types::BatchClassification;
use crate::client::types::Finding;
use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use serde::{Deserialize, Serialize, Serializer};

/// The exported artifact of one scan
///
/// `total_count` is derived from the finding sequence on construction and
/// cannot be set independently.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanReport {
    target_url: String,
    #[serde(serialize_with = "rfc3339_seconds")]
    scan_timestamp: DateTime<Utc>,
    vulnerabilities: Vec<Finding>,
    total_count: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    classifications: Option<BatchClassification>,
}

fn rfc3339_seconds<S: Serializer>(ts: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&ts.to_rfc3339_opts(SecondsFormat::Secs, true))
}

impl ScanReport {
    pub fn new(target_url: impl Into<String>, vulnerabilities: Vec<Finding>) -> Self {
        Self::at(target_url, Utc::now(), vulnerabilities)
    }

    /// The timestamp is kept to whole seconds, as it is written
    pub fn at(
        target_url: impl Into<String>,
        scan_timestamp: DateTime<Utc>,
        vulnerabilities: Vec<Finding>,
    ) -> Self {
        Self {
            target_url: target_url.into(),
            scan_timestamp: scan_timestamp.trunc_subsecs(0),
            total_count: vulnerabilities.len(),
            vulnerabilities,
            classifications: None,
        }
    }

    pub fn with_classifications(mut self, classifications: BatchClassification) -> Self {
        self.classifications = Some(classifications);
        self
    }

    pub fn target_url(&self) -> &str {
        &self.target_url
    }

    pub fn scan_timestamp(&self) -> DateTime<Utc> {
        self.scan_timestamp
    }

    pub fn vulnerabilities(&self) -> &[Finding] {
        &self.vulnerabilities
    }

    pub fn total_count(&self) -> usize {
        self.total_count
    }

    pub fn classifications(&self) -> Option<&BatchClassification> {
        self.classifications.as_ref()
    }

    /// Whether `total_count` matches the finding sequence; only a report
    /// read back from disk can disagree
    pub fn is_consistent(&self) -> bool {
        self.total_count == self.vulnerabilities.len()
    }
}
