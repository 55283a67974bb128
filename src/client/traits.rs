//! Scanner control API seam
//!
//! The orchestrator only talks to the scanner through `ScannerApi`, so tests
//! and alternative transports can substitute their own implementation.

use crate::client::error::ClientResult;
use crate::client::types::{
    AlertFilter, Finding, PhaseHandle, PhaseKind, PhaseParams, PhaseStatus, ScanTarget,
};
use async_trait::async_trait;

#[async_trait]
pub trait ScannerApi: Send + Sync {
    /// Version string of the running scanner; used as the readiness probe
    async fn version(&self) -> ClientResult<String>;

    /// Start the phase selected by `params` against `target`
    async fn start_phase(
        &self,
        target: &ScanTarget,
        params: &PhaseParams,
    ) -> ClientResult<PhaseHandle>;

    /// Current completion of a started phase
    async fn query_status(&self, kind: PhaseKind, handle: &PhaseHandle)
        -> ClientResult<PhaseStatus>;

    /// All findings the scanner currently holds, optionally scoped
    async fn fetch_findings(&self, filter: &AlertFilter) -> ClientResult<Vec<Finding>>;

    /// Scanner-native report in `format`
    async fn request_report(&self, format: &str) -> ClientResult<Vec<u8>>;
}
