//! Classifier wire types

use crate::client::types::Finding;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One captured response submitted for scoring
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseSample {
    pub url: String,
    pub method: String,
    /// 0 when the scanner did not report the status
    pub status_code: u16,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    pub body: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_payload: Option<String>,
}

impl ResponseSample {
    /// Sample built from a finding's evidence; `None` when there is none
    pub fn from_finding(finding: &Finding) -> Option<Self> {
        if finding.evidence.trim().is_empty() {
            return None;
        }
        let detail = |key: &str| {
            finding
                .details
                .get(key)
                .and_then(|v| v.as_str())
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };

        Some(Self {
            url: finding.url.clone().unwrap_or_default(),
            method: detail("method").unwrap_or_else(|| "GET".to_string()),
            status_code: 0,
            headers: BTreeMap::new(),
            body: finding.evidence.clone(),
            request_payload: detail("attack"),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Verdict {
    Hit,
    Miss,
    Likely,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub url: String,
    pub classification: Verdict,
    pub confidence: f64,
    #[serde(default)]
    pub vulnerability_type: String,
    #[serde(default)]
    pub explanation: String,
}

/// Service answer to one batch, attached verbatim to the report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchClassification {
    pub results: Vec<ClassificationResult>,
    #[serde(default)]
    pub summary: BTreeMap<String, u64>,
}

#[derive(Debug, Serialize)]
pub(crate) struct BatchRequest<'a> {
    pub responses: &'a [ResponseSample],
}
