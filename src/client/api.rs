//! Scanner Client API
//!
//! Public surface of the client module for the rest of the crate and for
//! embedders that drive the scanner directly.

pub use crate::client::error::{ClientError, ClientResult};
pub use crate::client::http::{
    ApiKeyPlacement, ClientConfig, ZapClient, API_KEY_HEADER, DEFAULT_SCANNER_URL,
};
pub use crate::client::traits::ScannerApi;
pub use crate::client::types::{
    AlertFilter, Finding, PhaseHandle, PhaseKind, PhaseParams, PhaseStatus, RiskLevel, ScanTarget,
};
