//! Response Classifier
//!
//! Optional collaborator that scores captured response bodies as likely
//! true or false positives. The orchestrator only uses it for auxiliary
//! annotations on the report; its failure never fails a scan.

pub mod http;
pub mod traits;
pub mod types;

#[cfg(test)]
mod tests;

pub use http::HttpClassifier;
pub use traits::ResponseClassifier;
pub use types::{BatchClassification, ClassificationResult, ResponseSample, Verdict};
