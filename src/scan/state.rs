//! Scan lifecycle states

use std::fmt;

/// Why a scan ended in `ScanState::Failed`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureReason {
    InvalidTarget,
    InvalidConfig,
    ReadinessTimeout,
    DiscoveryFailed,
    DiscoveryTimeout,
    ActiveFailed,
    ActiveTimeout,
    FindingsFailed,
    ExportFailed,
    Cancelled,
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Where one orchestrator run currently is
///
/// ```text
/// INIT -> READY -> DISCOVERY_RUNNING -> DISCOVERY_DONE -> ACTIVE_RUNNING
///      -> ACTIVE_DONE -> FINDINGS_COLLECTED -> REPORTED
/// ```
/// Disabled phases are skipped (`READY -> DISCOVERY_DONE`,
/// `DISCOVERY_DONE -> FINDINGS_COLLECTED`). Any non-terminal state may move to
/// `FAILED(reason)`. A failed export may still reach `REPORTED` on retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScanState {
    Init,
    Ready,
    DiscoveryRunning,
    DiscoveryDone,
    ActiveRunning,
    ActiveDone,
    FindingsCollected,
    Reported,
    Failed(FailureReason),
}

impl ScanState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Reported | Self::Failed(_))
    }

    pub fn can_transition_to(&self, next: ScanState) -> bool {
        use ScanState::*;

        match (*self, next) {
            (Failed(FailureReason::ExportFailed), Reported) => true,
            (current, Failed(_)) => !current.is_terminal(),
            (Init, Ready)
            | (Ready, DiscoveryRunning)
            | (Ready, DiscoveryDone)
            | (DiscoveryRunning, DiscoveryDone)
            | (DiscoveryDone, ActiveRunning)
            | (DiscoveryDone, FindingsCollected)
            | (ActiveRunning, ActiveDone)
            | (ActiveDone, FindingsCollected)
            | (FindingsCollected, Reported) => true,
            _ => false,
        }
    }
}

impl fmt::Display for ScanState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Init => write!(f, "INIT"),
            Self::Ready => write!(f, "READY"),
            Self::DiscoveryRunning => write!(f, "DISCOVERY_RUNNING"),
            Self::DiscoveryDone => write!(f, "DISCOVERY_DONE"),
            Self::ActiveRunning => write!(f, "ACTIVE_RUNNING"),
            Self::ActiveDone => write!(f, "ACTIVE_DONE"),
            Self::FindingsCollected => write!(f, "FINDINGS_COLLECTED"),
            Self::Reported => write!(f, "REPORTED"),
            Self::Failed(reason) => write!(f, "FAILED({})", reason),
        }
    }
}
