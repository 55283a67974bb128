//! Scan configuration
//!
//! Everything one orchestrator run needs to know besides the target and the
//! scanner connection. Defaults follow the scanner automation this tool
//! replaces: 30s/30min discovery, 60s/60min active scan, 5s/5min readiness.

use crate::client::types::PhaseParams;
use crate::core::polling::PollPolicy;
use crate::core::validation::ValidationError;
use std::time::Duration;

pub const DEFAULT_MAX_CHILDREN: u32 = 10;
pub const DEFAULT_SCAN_POLICY: &str = "Default Policy";
pub const DEFAULT_DISCOVERY_POLL: PollPolicy = PollPolicy::from_secs(30, 1800);
pub const DEFAULT_ACTIVE_POLL: PollPolicy = PollPolicy::from_secs(60, 3600);
pub const DEFAULT_READINESS_POLL: PollPolicy = PollPolicy::from_secs(5, 300);
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_secs(5);
pub const DEFAULT_MAX_TRANSPORT_ERRORS: u32 = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanConfig {
    /// Maximum children the crawler visits per node
    pub max_children: u32,
    /// Crawl below the target path
    pub recurse: bool,
    /// Active-scan policy name known to the scanner
    pub scan_policy: String,
    pub run_discovery: bool,
    pub run_active: bool,
    pub discovery: PollPolicy,
    pub active: PollPolicy,
    pub readiness: PollPolicy,
    /// Pause after discovery so the scanner's site tree settles
    pub settle_delay: Duration,
    /// Consecutive transport failures a phase tolerates while polling
    pub max_transport_errors: u32,
    /// Scope the alert query to the target's base URL
    pub scope_alerts_to_target: bool,
    /// Also save the scanner's own report in this format
    pub scanner_report_format: Option<String>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            max_children: DEFAULT_MAX_CHILDREN,
            recurse: true,
            scan_policy: DEFAULT_SCAN_POLICY.to_string(),
            run_discovery: true,
            run_active: true,
            discovery: DEFAULT_DISCOVERY_POLL,
            active: DEFAULT_ACTIVE_POLL,
            readiness: DEFAULT_READINESS_POLL,
            settle_delay: DEFAULT_SETTLE_DELAY,
            max_transport_errors: DEFAULT_MAX_TRANSPORT_ERRORS,
            scope_alerts_to_target: false,
            scanner_report_format: None,
        }
    }
}

impl ScanConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.max_children == 0 {
            return Err(ValidationError::new(
                "Maximum discovery breadth must be greater than 0",
            ));
        }
        if self.run_active && self.scan_policy.trim().is_empty() {
            return Err(ValidationError::new("Scan policy name cannot be empty"));
        }
        self.readiness.validate("readiness")?;
        if self.run_discovery {
            self.discovery.validate("discovery")?;
        }
        if self.run_active {
            self.active.validate("active scan")?;
        }
        if let Some(format) = &self.scanner_report_format {
            if format.trim().is_empty() {
                return Err(ValidationError::new("Scanner report format cannot be empty"));
            }
        }
        Ok(())
    }

    pub fn discovery_params(&self) -> PhaseParams {
        PhaseParams::Discovery {
            max_children: self.max_children,
            recurse: self.recurse,
        }
    }

    /// The active phase always recurses from the target
    pub fn active_params(&self) -> PhaseParams {
        PhaseParams::Active {
            scan_policy: self.scan_policy.clone(),
            recurse: true,
        }
    }
}
