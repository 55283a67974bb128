//! Scanner Client
//!
//! Thin request/response binding to the remote scanner's control API:
//! start a phase, query its status, fetch findings, request a report.
//!
//! - **ScannerApi**: the trait the orchestrator is written against
//! - **ZapClient**: reqwest implementation attaching the API key to every call
//! - **ClientError**: transport, API and protocol failures kept apart, since
//!   only transport failures may clear up on a later attempt

pub mod api;
pub mod error;
pub mod http;
pub mod traits;
pub mod types;


pub use error::{ClientError, ClientResult};
pub use http::{ApiKeyPlacement, ClientConfig, ZapClient};
pub use traits::ScannerApi;
pub use types::{
    AlertFilter, Confidence, Finding, PhaseHandle, PhaseKind, PhaseParams, PhaseStatus,
    RiskLevel, ScanTarget,
};
