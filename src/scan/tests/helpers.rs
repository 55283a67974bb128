//! Test helpers for scan unit tests
//!
//! `FakeScanner` replays scripted answers per call type and records every
//! call. A script's last entry repeats once the others are used up.

use crate::classifier::traits::ResponseClassifier;
use crate::classifier::types::{BatchClassification, ClassificationResult, ResponseSample, Verdict};
use crate::client::error::{ClientError, ClientResult};
use crate::client::traits::ScannerApi;
use crate::client::types::{
    AlertFilter, Confidence, Finding, PhaseHandle, PhaseKind, PhaseParams, PhaseStatus, RiskLevel,
    ScanTarget,
};
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

fn next<T: Clone>(script: &mut VecDeque<T>) -> Option<T> {
    if script.len() > 1 {
        script.pop_front()
    } else {
        script.front().cloned()
    }
}

#[derive(Default)]
struct Script {
    versions: VecDeque<ClientResult<String>>,
    starts: HashMap<PhaseKind, VecDeque<ClientResult<PhaseHandle>>>,
    statuses: HashMap<PhaseKind, VecDeque<ClientResult<PhaseStatus>>>,
    findings: VecDeque<ClientResult<Vec<Finding>>>,
    reports: VecDeque<ClientResult<Vec<u8>>>,
    version_delay: Duration,
    calls: Vec<String>,
}

#[derive(Default)]
pub struct FakeScanner {
    script: Mutex<Script>,
}

impl FakeScanner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_versions(self, versions: Vec<ClientResult<String>>) -> Self {
        self.script.lock().unwrap().versions = versions.into();
        self
    }

    /// Every version query takes `delay` to answer
    pub fn with_version_delay(self, delay: Duration) -> Self {
        self.script.lock().unwrap().version_delay = delay;
        self
    }

    pub fn with_start(self, kind: PhaseKind, result: ClientResult<PhaseHandle>) -> Self {
        self.script
            .lock()
            .unwrap()
            .starts
            .insert(kind, VecDeque::from([result]));
        self
    }

    pub fn with_statuses(self, kind: PhaseKind, statuses: Vec<ClientResult<PhaseStatus>>) -> Self {
        self.script
            .lock()
            .unwrap()
            .statuses
            .insert(kind, statuses.into());
        self
    }

    /// Shorthand for a sequence of successful percentages
    pub fn with_progress(self, kind: PhaseKind, percents: &[u8]) -> Self {
        let statuses = percents
            .iter()
            .map(|p| Ok(PhaseStatus::Progress(*p)))
            .collect();
        self.with_statuses(kind, statuses)
    }

    pub fn with_findings(self, findings: ClientResult<Vec<Finding>>) -> Self {
        self.script.lock().unwrap().findings = VecDeque::from([findings]);
        self
    }

    pub fn with_report(self, report: ClientResult<Vec<u8>>) -> Self {
        self.script.lock().unwrap().reports = VecDeque::from([report]);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.script.lock().unwrap().calls.clone()
    }

    pub fn count_calls(&self, prefix: &str) -> usize {
        self.calls().iter().filter(|c| c.starts_with(prefix)).count()
    }
}

fn default_handle(kind: PhaseKind) -> PhaseHandle {
    match kind {
        PhaseKind::Discovery => PhaseHandle::new("1"),
        PhaseKind::Active => PhaseHandle::new("2"),
    }
}

#[async_trait]
impl ScannerApi for FakeScanner {
    async fn version(&self) -> ClientResult<String> {
        let (answer, delay) = {
            let mut script = self.script.lock().unwrap();
            script.calls.push("version".to_string());
            let answer = next(&mut script.versions).unwrap_or_else(|| Ok("2.14.0".to_string()));
            (answer, script.version_delay)
        };
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        answer
    }

    async fn start_phase(
        &self,
        _target: &ScanTarget,
        params: &PhaseParams,
    ) -> ClientResult<PhaseHandle> {
        let kind = params.kind();
        let mut script = self.script.lock().unwrap();
        script.calls.push(format!("start {}", kind.component()));
        script
            .starts
            .get_mut(&kind)
            .and_then(next)
            .unwrap_or_else(|| Ok(default_handle(kind)))
    }

    async fn query_status(
        &self,
        kind: PhaseKind,
        handle: &PhaseHandle,
    ) -> ClientResult<PhaseStatus> {
        let mut script = self.script.lock().unwrap();
        script
            .calls
            .push(format!("status {} {}", kind.component(), handle.as_str()));
        script
            .statuses
            .get_mut(&kind)
            .and_then(next)
            .unwrap_or(Ok(PhaseStatus::Progress(PhaseStatus::COMPLETE)))
    }

    async fn fetch_findings(&self, filter: &AlertFilter) -> ClientResult<Vec<Finding>> {
        let mut script = self.script.lock().unwrap();
        let call = match &filter.base_url {
            Some(base) => format!("alerts {}", base),
            None => "alerts".to_string(),
        };
        script.calls.push(call);
        next(&mut script.findings).unwrap_or_else(|| Ok(Vec::new()))
    }

    async fn request_report(&self, format: &str) -> ClientResult<Vec<u8>> {
        let mut script = self.script.lock().unwrap();
        script.calls.push(format!("report {}", format));
        next(&mut script.reports).unwrap_or_else(|| Ok(b"<html></html>".to_vec()))
    }
}

/// Classifier answering every sample with one fixed verdict, or failing
pub struct FakeClassifier {
    pub fail: bool,
}

#[async_trait]
impl ResponseClassifier for FakeClassifier {
    async fn health(&self) -> ClientResult<bool> {
        Ok(true)
    }

    async fn classify_batch(&self, samples: &[ResponseSample]) -> ClientResult<BatchClassification> {
        if self.fail {
            return Err(ClientError::transport("/classify/batch", "connection refused"));
        }
        Ok(BatchClassification {
            results: samples
                .iter()
                .map(|s| ClassificationResult {
                    url: s.url.clone(),
                    classification: Verdict::Likely,
                    confidence: 0.5,
                    vulnerability_type: "SQL Injection".to_string(),
                    explanation: String::new(),
                })
                .collect(),
            summary: [("total".to_string(), samples.len() as u64)]
                .into_iter()
                .collect(),
        })
    }
}

pub fn finding(name: &str, scan_id: &str) -> Finding {
    Finding {
        name: name.to_string(),
        risk: RiskLevel::Medium,
        confidence: Confidence::Medium,
        scan_id: scan_id.to_string(),
        url: Some("http://example.com/".to_string()),
        evidence: String::new(),
        details: Default::default(),
    }
}

pub fn transport_error() -> ClientError {
    ClientError::transport("/JSON/core/view/version/", "connection refused")
}
