//! Scanner Client Types
//!
//! Values exchanged with the remote scanner: targets, phase handles and
//! statuses, and the findings it reports.

use crate::core::validation::{validate_absolute_url, ValidationError};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use strum_macros::EnumIter;
use url::Url;

/// A validated absolute URL (scheme and host present) to scan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanTarget {
    raw: String,
    url: Url,
}

impl ScanTarget {
    pub fn parse(value: &str) -> Result<Self, ValidationError> {
        let url = validate_absolute_url(value)?;
        Ok(Self {
            raw: value.trim().to_string(),
            url,
        })
    }

    /// The target exactly as given (trimmed), which is what the scanner receives
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn host(&self) -> &str {
        self.url.host_str().unwrap_or_default()
    }
}

impl fmt::Display for ScanTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}

/// The two polled phases the scanner runs against a target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter)]
pub enum PhaseKind {
    /// Crawl ("spider") enumerating reachable endpoints
    Discovery,
    /// Active attack probing discovered endpoints
    Active,
}

impl PhaseKind {
    /// API component the phase is driven through
    pub fn component(&self) -> &'static str {
        match self {
            Self::Discovery => "spider",
            Self::Active => "ascan",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Discovery => "discovery",
            Self::Active => "active scan",
        }
    }
}

impl fmt::Display for PhaseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Opaque identifier the scanner returns when a phase starts
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PhaseHandle(String);

impl PhaseHandle {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PhaseHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Phase completion as reported by the scanner
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseStatus {
    /// Completion percentage in 0..=100
    Progress(u8),
    /// The scanner does not know the handle
    NotFound,
}

impl PhaseStatus {
    pub const COMPLETE: u8 = 100;

    pub fn is_complete(&self) -> bool {
        matches!(self, Self::Progress(Self::COMPLETE))
    }
}

/// Phase specific start parameters; the variant selects the phase
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PhaseParams {
    Discovery { max_children: u32, recurse: bool },
    Active { scan_policy: String, recurse: bool },
}

impl PhaseParams {
    pub fn kind(&self) -> PhaseKind {
        match self {
            Self::Discovery { .. } => PhaseKind::Discovery,
            Self::Active { .. } => PhaseKind::Active,
        }
    }
}

/// Optional scoping of the alert query
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AlertFilter {
    pub base_url: Option<String>,
}

impl AlertFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn for_target(target: &ScanTarget) -> Self {
        Self {
            base_url: Some(target.as_str().to_string()),
        }
    }
}

/// Risk rating of a finding, ordered from least to most severe
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, EnumIter,
)]
pub enum RiskLevel {
    #[serde(alias = "Info")]
    Informational,
    Low,
    Medium,
    High,
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Informational => "Informational",
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        };
        write!(f, "{}", label)
    }
}

/// How sure the scanner is about a finding
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Confidence {
    #[serde(rename = "False Positive")]
    FalsePositive,
    Low,
    Medium,
    High,
    #[serde(alias = "User Confirmed")]
    Confirmed,
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::FalsePositive => "False Positive",
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
            Self::Confirmed => "Confirmed",
        };
        write!(f, "{}", label)
    }
}

/// One vulnerability reported by the scanner
///
/// Fields the scanner sends beyond the ones modelled here are kept verbatim
/// in `details` so the report carries the full alert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    #[serde(default)]
    pub name: String,
    pub risk: RiskLevel,
    pub confidence: Confidence,
    /// Identifier of the scan that raised the finding
    #[serde(rename = "scanID", default, deserialize_with = "string_or_number")]
    pub scan_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default)]
    pub evidence: String,
    #[serde(flatten)]
    pub details: serde_json::Map<String, serde_json::Value>,
}

impl Finding {
    /// Display name, falling back to the scanner's legacy `alert` key
    pub fn display_name(&self) -> &str {
        if !self.name.is_empty() {
            return &self.name;
        }
        self.details
            .get("alert")
            .and_then(|v| v.as_str())
            .unwrap_or("Unknown")
    }
}

/// The scanner encodes ids as strings in some versions and numbers in others
pub(crate) fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        serde_json::Value::Null => Ok(String::new()),
        other => Err(D::Error::custom(format!(
            "expected string or number, found {}",
            other
        ))),
    }
}
