//! Classifier seam

use crate::classifier::types::{BatchClassification, ResponseSample};
use crate::client::error::ClientResult;
use async_trait::async_trait;

#[async_trait]
pub trait ResponseClassifier: Send + Sync {
    /// Whether the service is up and has a model loaded
    async fn health(&self) -> ClientResult<bool>;

    async fn classify_batch(&self, samples: &[ResponseSample]) -> ClientResult<BatchClassification>;
}
