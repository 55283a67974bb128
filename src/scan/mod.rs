//! Scan Orchestration
//!
//! The state machine that sequences one assessment of a target URL:
//!
//! - **ReadinessProber**: waits for the scanner to answer a version query
//! - **PhaseRunner**: start-then-poll loop shared by discovery and active scan
//! - **ScanOrchestrator**: owns the `ScanState` of one run and the report
//!
//! Timeouts are wall-clock budgets per phase, measured from that phase's
//! start. Every wait races the run's `ShutdownSignal`.

pub mod api;
pub mod config;
pub mod error;
pub mod findings;
pub mod orchestrator;
pub mod phase;
pub mod readiness;
pub mod state;


pub use config::ScanConfig;
pub use error::{PhaseError, PhaseProgress, ScanError, ScanResult};
pub use findings::{filter_by_scan, FindingsSummary};
pub use orchestrator::ScanOrchestrator;
pub use phase::{PhaseOutcome, PhaseRunner};
pub use readiness::ReadinessProber;
pub use state::{FailureReason, ScanState};
