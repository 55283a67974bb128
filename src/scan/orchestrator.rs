//! Scan Orchestrator
//!
//! Owns one scan run: validates inputs, waits for the scanner, drives the
//! discovery and active phases in sequence, collects the findings the active
//! scan raised, and exports the report. Each orchestrator runs exactly one
//! scan; concurrent scans need independent instances.

use crate::classifier::traits::ResponseClassifier;
use crate::classifier::types::{BatchClassification, ResponseSample};
use crate::client::error::ClientResult;
use crate::client::traits::ScannerApi;
use crate::client::types::{AlertFilter, Finding, PhaseKind, ScanTarget};
use crate::core::shutdown::{Cancelled, ShutdownSignal};
use crate::report::exporter::{scanner_report_path, ReportExporter};
use crate::report::types::ScanReport;
use crate::scan::config::ScanConfig;
use crate::scan::error::{ScanError, ScanResult};
use crate::scan::findings::filter_by_scan;
use crate::scan::phase::PhaseRunner;
use crate::scan::readiness::ReadinessProber;
use crate::scan::state::{FailureReason, ScanState};
use std::path::Path;
use std::sync::Arc;
use tokio::time::Instant;

pub struct ScanOrchestrator {
    api: Arc<dyn ScannerApi>,
    config: ScanConfig,
    classifier: Option<Arc<dyn ResponseClassifier>>,
    signal: ShutdownSignal,
    exporter: ReportExporter,
    state: ScanState,
    history: Vec<ScanState>,
    report: Option<ScanReport>,
    started: Instant,
}

impl ScanOrchestrator {
    pub fn new(api: Arc<dyn ScannerApi>, config: ScanConfig) -> Self {
        Self {
            api,
            config,
            classifier: None,
            signal: ShutdownSignal::detached(),
            exporter: ReportExporter::default(),
            state: ScanState::Init,
            history: vec![ScanState::Init],
            report: None,
            started: Instant::now(),
        }
    }

    pub fn with_classifier(mut self, classifier: Arc<dyn ResponseClassifier>) -> Self {
        self.classifier = Some(classifier);
        self
    }

    /// Abort waits and polls once `signal` fires
    pub fn with_shutdown(mut self, signal: ShutdownSignal) -> Self {
        self.signal = signal;
        self
    }

    pub fn with_exporter(mut self, exporter: ReportExporter) -> Self {
        self.exporter = exporter;
        self
    }

    pub fn state(&self) -> ScanState {
        self.state
    }

    /// Every state entered so far, starting with `INIT`
    pub fn history(&self) -> &[ScanState] {
        &self.history
    }

    /// The report built by this run, kept even when exporting it failed
    pub fn report(&self) -> Option<&ScanReport> {
        self.report.as_ref()
    }

    /// Run the whole scan against `target` and export the report to `destination`
    pub async fn run(&mut self, target: &str, destination: &Path) -> ScanResult<ScanReport> {
        if self.state != ScanState::Init {
            return Err(ScanError::InvalidState {
                operation: "start a scan",
                state: self.state,
            });
        }
        self.started = Instant::now();

        let result = self.execute(target, destination).await;
        if let Err(err) = &result {
            if let Some(reason) = err.failure_reason() {
                self.transition(ScanState::Failed(reason));
            }
        }
        result
    }

    /// Re-attempt a failed export from the retained report
    pub async fn retry_export(&mut self, destination: &Path) -> ScanResult<()> {
        let report = match (&self.state, &self.report) {
            (ScanState::Failed(FailureReason::ExportFailed), Some(report)) => report,
            _ => {
                return Err(ScanError::InvalidState {
                    operation: "retry the export",
                    state: self.state,
                })
            }
        };

        self.exporter
            .export(report, destination)
            .await
            .map_err(|source| ScanError::ExportFailed {
                path: destination.to_path_buf(),
                source,
            })?;
        log::info!("Report written to {}", destination.display());
        self.transition(ScanState::Reported);
        Ok(())
    }

    async fn execute(&mut self, target: &str, destination: &Path) -> ScanResult<ScanReport> {
        // Inputs are checked before the scanner sees any request
        self.config.validate().map_err(ScanError::InvalidConfig)?;
        let target = ScanTarget::parse(target).map_err(ScanError::InvalidTarget)?;
        let api = Arc::clone(&self.api);

        let version = ReadinessProber::new(self.config.readiness)
            .probe(api.as_ref(), &mut self.signal)
            .await?;
        log::info!("Scanner {} is ready; scanning {}", version, target);
        self.transition(ScanState::Ready);

        if self.config.run_discovery {
            self.transition(ScanState::DiscoveryRunning);
            let runner = PhaseRunner::new(
                PhaseKind::Discovery,
                self.config.discovery,
                self.config.max_transport_errors,
            );
            let params = self.config.discovery_params();
            let outcome = runner
                .run_phase(api.as_ref(), &target, &params, &mut self.signal)
                .await
                .map_err(|e| ScanError::from_phase(e, ScanState::DiscoveryRunning))?;
            log::info!(
                "Discovery {} completed after {} polls",
                outcome.handle,
                outcome.polls
            );
            self.transition(ScanState::DiscoveryDone);

            if self.config.run_active && !self.config.settle_delay.is_zero() {
                self.settle(self.config.settle_delay, ScanState::DiscoveryDone)
                    .await?;
            }
        } else {
            log::info!("Discovery disabled");
            self.transition(ScanState::DiscoveryDone);
        }

        let findings = if self.config.run_active {
            self.transition(ScanState::ActiveRunning);
            let runner = PhaseRunner::new(
                PhaseKind::Active,
                self.config.active,
                self.config.max_transport_errors,
            );
            let params = self.config.active_params();
            let outcome = runner
                .run_phase(api.as_ref(), &target, &params, &mut self.signal)
                .await
                .map_err(|e| ScanError::from_phase(e, ScanState::ActiveRunning))?;
            log::info!(
                "Active scan {} completed after {} polls",
                outcome.handle,
                outcome.polls
            );
            self.transition(ScanState::ActiveDone);

            let filter = if self.config.scope_alerts_to_target {
                AlertFilter::for_target(&target)
            } else {
                AlertFilter::all()
            };
            let all = self
                .signal
                .run(api.fetch_findings(&filter))
                .await
                .map_err(|_| ScanError::Cancelled {
                    stage: ScanState::ActiveDone,
                })?
                .map_err(ScanError::FindingsFailed)?;
            let fetched = all.len();
            let kept = filter_by_scan(all, &outcome.handle);
            log::info!(
                "{} of {} scanner findings belong to active scan {}",
                kept.len(),
                fetched,
                outcome.handle
            );
            kept
        } else {
            log::info!("Active scan disabled; no findings collected");
            Vec::new()
        };
        self.transition(ScanState::FindingsCollected);

        let mut report = ScanReport::new(target.as_str(), findings);
        if let Some(batch) = self.classify(report.vulnerabilities()).await? {
            report = report.with_classifications(batch);
        }
        self.save_scanner_report(destination).await?;

        self.report = Some(report.clone());
        self.exporter
            .export(&report, destination)
            .await
            .map_err(|source| ScanError::ExportFailed {
                path: destination.to_path_buf(),
                source,
            })?;
        log::info!("Report written to {}", destination.display());
        self.transition(ScanState::Reported);
        Ok(report)
    }

    async fn settle(&mut self, delay: std::time::Duration, stage: ScanState) -> ScanResult<()> {
        log::debug!("Waiting {:?} for the scanner to settle", delay);
        self.signal
            .sleep(delay)
            .await
            .map_err(|Cancelled| ScanError::Cancelled { stage })
    }

    /// Auxiliary scoring; any failure is logged and ignored
    async fn classify(&mut self, findings: &[Finding]) -> ScanResult<Option<BatchClassification>> {
        let Some(classifier) = self.classifier.clone() else {
            return Ok(None);
        };
        let samples: Vec<ResponseSample> =
            findings.iter().filter_map(ResponseSample::from_finding).collect();
        if samples.is_empty() {
            log::debug!("No captured responses to classify");
            return Ok(None);
        }

        let outcome = self
            .signal
            .run(request_classification(classifier.as_ref(), &samples))
            .await
            .map_err(|Cancelled| ScanError::Cancelled {
                stage: ScanState::FindingsCollected,
            })?;

        match outcome {
            Ok(Some(batch)) => {
                log::info!("Classified {} captured responses", batch.results.len());
                Ok(Some(batch))
            }
            Ok(None) => Ok(None),
            Err(err) => {
                log::warn!("Response classification skipped: {}", err);
                Ok(None)
            }
        }
    }

    /// Save the scanner's native report next to the artifact; failure is a warning
    async fn save_scanner_report(&mut self, destination: &Path) -> ScanResult<()> {
        let Some(format) = self.config.scanner_report_format.clone() else {
            return Ok(());
        };
        let fetched = self
            .signal
            .run(self.api.request_report(&format))
            .await
            .map_err(|Cancelled| ScanError::Cancelled {
                stage: ScanState::FindingsCollected,
            })?;

        let path = scanner_report_path(destination, &format);
        match fetched {
            Ok(bytes) => match self.exporter.export_raw(&bytes, &path).await {
                Ok(()) => log::info!("Scanner {} report written to {}", format, path.display()),
                Err(err) => log::warn!("Could not save scanner report: {}", err),
            },
            Err(err) => log::warn!("Scanner {} report unavailable: {}", format, err),
        }
        Ok(())
    }

    fn transition(&mut self, next: ScanState) {
        debug_assert!(
            self.state.can_transition_to(next),
            "illegal transition {} -> {}",
            self.state,
            next
        );
        let elapsed = self.started.elapsed();
        match next {
            ScanState::Failed(_) => log::warn!("{} -> {} ({:.1?})", self.state, next, elapsed),
            _ => log::info!("{} -> {} ({:.1?})", self.state, next, elapsed),
        }
        self.state = next;
        self.history.push(next);
    }
}

async fn request_classification(
    classifier: &dyn ResponseClassifier,
    samples: &[ResponseSample],
) -> ClientResult<Option<BatchClassification>> {
    if !classifier.health().await? {
        log::warn!("Classifier reports no model loaded; skipping classification");
        return Ok(None);
    }
    classifier.classify_batch(samples).await.map(Some)
}
