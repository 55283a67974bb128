//! HTTP binding to the classifier service

use crate::classifier::traits::ResponseClassifier;
use crate::classifier::types::{BatchClassification, BatchRequest, ResponseSample};
use crate::client::error::{ClientError, ClientResult};
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use url::Url;

const HEALTH_PATH: &str = "/health";
const BATCH_PATH: &str = "/classify/batch";

pub struct HttpClassifier {
    http: reqwest::Client,
    base: String,
}

impl HttpClassifier {
    pub fn new(base_url: &Url, request_timeout: Duration) -> ClientResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|e| ClientError::transport("client setup", e))?;

        Ok(Self {
            http,
            base: base_url.as_str().trim_end_matches('/').to_string(),
        })
    }

    async fn decode(path: &str, response: reqwest::Response) -> ClientResult<Value> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ClientError::transport(path, e))?;
        if !status.is_success() {
            return Err(ClientError::api(path, status.as_u16(), &body));
        }
        serde_json::from_str(&body)
            .map_err(|e| ClientError::protocol(path, format!("invalid JSON: {}", e)))
    }
}

#[async_trait]
impl ResponseClassifier for HttpClassifier {
    async fn health(&self) -> ClientResult<bool> {
        let response = self
            .http
            .get(format!("{}{}", self.base, HEALTH_PATH))
            .send()
            .await
            .map_err(|e| ClientError::transport(HEALTH_PATH, e))?;
        let body = Self::decode(HEALTH_PATH, response).await?;

        let healthy = body.get("status").and_then(Value::as_str) == Some("healthy");
        let model_loaded = body
            .get("model_loaded")
            .and_then(Value::as_bool)
            .unwrap_or(true);
        Ok(healthy && model_loaded)
    }

    async fn classify_batch(&self, samples: &[ResponseSample]) -> ClientResult<BatchClassification> {
        log::debug!("POST {} ({} samples)", BATCH_PATH, samples.len());
        let response = self
            .http
            .post(format!("{}{}", self.base, BATCH_PATH))
            .json(&BatchRequest { responses: samples })
            .send()
            .await
            .map_err(|e| ClientError::transport(BATCH_PATH, e))?;
        let body = Self::decode(BATCH_PATH, response).await?;

        serde_json::from_value(body)
            .map_err(|e| ClientError::protocol(BATCH_PATH, format!("malformed batch result: {}", e)))
    }
}
