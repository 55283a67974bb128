//! Scan Error Types

use crate::client::error::ClientError;
use crate::client::types::{PhaseHandle, PhaseKind};
use crate::core::error_handling::ContextualError;
use crate::core::validation::ValidationError;
use crate::report::error::ReportError;
use crate::scan::state::{FailureReason, ScanState};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// What a phase had achieved when it ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PhaseProgress {
    /// Wall-clock time since the phase started
    pub elapsed: Duration,
    /// Status queries issued
    pub polls: u32,
    /// Last percentage the scanner reported
    pub last_percent: Option<u8>,
}

impl fmt::Display for PhaseProgress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "after {:.1?}, {} polls, ", self.elapsed, self.polls)?;
        match self.last_percent {
            Some(percent) => write!(f, "last progress {}%", percent),
            None => write!(f, "no progress reported"),
        }
    }
}

/// Why a polled phase did not reach 100%
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PhaseError {
    #[error("{kind} could not be started: {source}")]
    StartFailed { kind: PhaseKind, source: ClientError },

    #[error("{kind} {handle} is unknown to the scanner ({progress})")]
    NotFound {
        kind: PhaseKind,
        handle: PhaseHandle,
        progress: PhaseProgress,
    },

    #[error("{kind} {handle} status query failed ({progress}): {source}")]
    PollFailed {
        kind: PhaseKind,
        handle: PhaseHandle,
        progress: PhaseProgress,
        source: ClientError,
    },

    #[error("{kind} {handle} did not complete within {timeout:?} ({progress})")]
    Timeout {
        kind: PhaseKind,
        handle: PhaseHandle,
        timeout: Duration,
        progress: PhaseProgress,
    },

    #[error("{kind} cancelled ({progress})")]
    Cancelled {
        kind: PhaseKind,
        handle: Option<PhaseHandle>,
        progress: PhaseProgress,
    },
}

impl PhaseError {
    pub fn kind(&self) -> PhaseKind {
        match self {
            Self::StartFailed { kind, .. }
            | Self::NotFound { kind, .. }
            | Self::PollFailed { kind, .. }
            | Self::Timeout { kind, .. }
            | Self::Cancelled { kind, .. } => *kind,
        }
    }

    pub fn handle(&self) -> Option<&PhaseHandle> {
        match self {
            Self::StartFailed { .. } => None,
            Self::NotFound { handle, .. }
            | Self::PollFailed { handle, .. }
            | Self::Timeout { handle, .. } => Some(handle),
            Self::Cancelled { handle, .. } => handle.as_ref(),
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

fn last_error_suffix(last_error: &Option<ClientError>) -> String {
    match last_error {
        Some(err) => format!("; last error: {}", err),
        None => String::new(),
    }
}

/// Everything that can end a scan early
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    #[error("Invalid target URL: {0}")]
    InvalidTarget(ValidationError),

    #[error("Invalid scan configuration: {0}")]
    InvalidConfig(ValidationError),

    #[error(
        "Scanner did not become ready within {elapsed:?} ({attempts} probes){}",
        last_error_suffix(.last_error)
    )]
    ReadinessTimeout {
        elapsed: Duration,
        attempts: u32,
        last_error: Option<ClientError>,
    },

    #[error("Discovery phase failed: {0}")]
    DiscoveryFailed(PhaseError),

    #[error("Discovery phase timed out: {0}")]
    DiscoveryTimeout(PhaseError),

    #[error("Active scan failed: {0}")]
    ActiveFailed(PhaseError),

    #[error("Active scan timed out: {0}")]
    ActiveTimeout(PhaseError),

    #[error("Collecting findings failed: {0}")]
    FindingsFailed(ClientError),

    #[error("Exporting report to {} failed: {source}", path.display())]
    ExportFailed { path: PathBuf, source: ReportError },

    #[error("Scan cancelled in state {stage}")]
    Cancelled { stage: ScanState },

    #[error("Cannot {operation} while the scan is in state {state}")]
    InvalidState {
        operation: &'static str,
        state: ScanState,
    },
}

impl ScanError {
    /// Classify a phase failure; `stage` is the running state it happened in
    pub fn from_phase(error: PhaseError, stage: ScanState) -> Self {
        match (&error, error.kind()) {
            (PhaseError::Cancelled { .. }, _) => Self::Cancelled { stage },
            (PhaseError::Timeout { .. }, PhaseKind::Discovery) => Self::DiscoveryTimeout(error),
            (PhaseError::Timeout { .. }, PhaseKind::Active) => Self::ActiveTimeout(error),
            (_, PhaseKind::Discovery) => Self::DiscoveryFailed(error),
            (_, PhaseKind::Active) => Self::ActiveFailed(error),
        }
    }

    /// The `FAILED(reason)` this error puts the scan in; `None` for misuse of
    /// the orchestrator, which leaves its state untouched
    pub fn failure_reason(&self) -> Option<FailureReason> {
        let reason = match self {
            Self::InvalidTarget(_) => FailureReason::InvalidTarget,
            Self::InvalidConfig(_) => FailureReason::InvalidConfig,
            Self::ReadinessTimeout { .. } => FailureReason::ReadinessTimeout,
            Self::DiscoveryFailed(_) => FailureReason::DiscoveryFailed,
            Self::DiscoveryTimeout(_) => FailureReason::DiscoveryTimeout,
            Self::ActiveFailed(_) => FailureReason::ActiveFailed,
            Self::ActiveTimeout(_) => FailureReason::ActiveTimeout,
            Self::FindingsFailed(_) => FailureReason::FindingsFailed,
            Self::ExportFailed { .. } => FailureReason::ExportFailed,
            Self::Cancelled { .. } => FailureReason::Cancelled,
            Self::InvalidState { .. } => return None,
        };
        Some(reason)
    }

    /// Process exit code for the CLI
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::InvalidTarget(_) | Self::InvalidConfig(_) => 2,
            Self::Cancelled { .. } => 130,
            _ => 1,
        }
    }
}

impl ContextualError for ScanError {
    fn is_user_actionable(&self) -> bool {
        matches!(self, Self::InvalidTarget(_) | Self::InvalidConfig(_))
    }

    fn user_message(&self) -> Option<&str> {
        match self {
            Self::InvalidTarget(e) | Self::InvalidConfig(e) => Some(e.details()),
            _ => None,
        }
    }
}

pub type ScanResult<T> = Result<T, ScanError>;
