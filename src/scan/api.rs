//! Scan Orchestration API
//!
//! Public surface for driving a complete scan.

pub use crate::scan::config::{
    ScanConfig, DEFAULT_ACTIVE_POLL, DEFAULT_DISCOVERY_POLL, DEFAULT_MAX_CHILDREN,
    DEFAULT_MAX_TRANSPORT_ERRORS, DEFAULT_READINESS_POLL, DEFAULT_SCAN_POLICY,
    DEFAULT_SETTLE_DELAY,
};
pub use crate::scan::error::{PhaseError, ScanError, ScanResult};
pub use crate::scan::findings::FindingsSummary;
pub use crate::scan::orchestrator::ScanOrchestrator;
pub use crate::scan::state::{FailureReason, ScanState};
