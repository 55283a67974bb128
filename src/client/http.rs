//! HTTP binding to the scanner's JSON control API

use crate::client::error::{ClientError, ClientResult};
use crate::client::traits::ScannerApi;
use crate::client::types::{
    AlertFilter, Finding, PhaseHandle, PhaseKind, PhaseParams, PhaseStatus, ScanTarget,
};
use async_trait::async_trait;
use reqwest::Method;
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use url::Url;

pub const DEFAULT_SCANNER_URL: &str = "http://localhost:8080";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const API_KEY_HEADER: &str = "X-ZAP-API-Key";
pub const API_KEY_PARAM: &str = "apikey";

/// Error code the scanner uses for unknown scan ids
const DOES_NOT_EXIST: &str = "does_not_exist";

/// Where the API key travels on each request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ApiKeyPlacement {
    #[default]
    Header,
    Query,
}

impl FromStr for ApiKeyPlacement {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "header" => Ok(Self::Header),
            "query" => Ok(Self::Query),
            other => Err(format!(
                "unknown API key placement '{}' (expected 'header' or 'query')",
                other
            )),
        }
    }
}

/// Connection settings for one scanner instance
#[derive(Clone)]
pub struct ClientConfig {
    pub base_url: Url,
    pub api_key: Option<String>,
    pub key_placement: ApiKeyPlacement,
    pub request_timeout: Duration,
}

impl ClientConfig {
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            api_key: None,
            key_placement: ApiKeyPlacement::default(),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }

    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key.filter(|k| !k.is_empty());
        self
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(Url::parse(DEFAULT_SCANNER_URL).expect("default scanner URL is valid"))
    }
}

// The API key never ends up in logs
impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url.as_str())
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("key_placement", &self.key_placement)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

/// Stateless client for the scanner API; safe to share across phases
pub struct ZapClient {
    http: reqwest::Client,
    base: String,
    api_key: Option<String>,
    key_placement: ApiKeyPlacement,
}

impl ZapClient {
    pub fn new(config: ClientConfig) -> ClientResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| ClientError::transport("client setup", e))?;

        Ok(Self {
            http,
            base: config.base_url.as_str().trim_end_matches('/').to_string(),
            api_key: config.api_key,
            key_placement: config.key_placement,
        })
    }

    /// Issue one call and return its status and raw body
    async fn send(
        &self,
        method: Method,
        path: &str,
        params: &[(&str, String)],
    ) -> ClientResult<(u16, String)> {
        let url = format!("{}{}", self.base, path);
        log::debug!("{} {} {:?}", method, path, params);

        let mut request = self.http.request(method, &url).query(params);
        if let Some(key) = &self.api_key {
            request = match self.key_placement {
                ApiKeyPlacement::Header => request.header(API_KEY_HEADER, key),
                ApiKeyPlacement::Query => request.query(&[(API_KEY_PARAM, key)]),
            };
        }

        let response = request
            .send()
            .await
            .map_err(|e| ClientError::transport(path, e))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ClientError::transport(path, e))?;
        Ok((status.as_u16(), body))
    }

    /// Issue one call and decode its JSON body
    async fn call(&self, method: Method, path: &str, params: &[(&str, String)]) -> ClientResult<Value> {
        let (status, body) = self.send(method, path, params).await?;
        decode_body(path, status, &body)
    }
}

fn decode_body(path: &str, status: u16, body: &str) -> ClientResult<Value> {
    if !(200..300).contains(&status) {
        return Err(ClientError::api(path, status, body));
    }
    if body.trim().is_empty() {
        return Err(ClientError::protocol(path, "empty response body"));
    }
    serde_json::from_str(body)
        .map_err(|e| ClientError::protocol(path, format!("invalid JSON: {}", e)))
}

/// Unknown scan ids come back as 404 or as an error object coded `does_not_exist`
fn is_unknown_scan(status: u16, body: &str) -> bool {
    if status == 404 {
        return true;
    }
    match serde_json::from_str::<Value>(body) {
        Ok(value) => value.get("code").and_then(Value::as_str) == Some(DOES_NOT_EXIST),
        Err(_) => body.contains(DOES_NOT_EXIST),
    }
}

/// Read `key` from a response object as a string, accepting numeric values
fn field_as_string(value: &Value, key: &str, path: &str) -> ClientResult<String> {
    match value.get(key) {
        Some(Value::String(s)) => Ok(s.clone()),
        Some(Value::Number(n)) => Ok(n.to_string()),
        Some(other) => Err(ClientError::protocol(
            path,
            format!("field '{}' has unexpected type: {}", key, other),
        )),
        None => Err(ClientError::protocol(
            path,
            format!("response lacks '{}' field", key),
        )),
    }
}

fn parse_percent(raw: &str, path: &str) -> ClientResult<u8> {
    match raw.trim().parse::<u8>() {
        Ok(p) if p <= PhaseStatus::COMPLETE => Ok(p),
        _ => Err(ClientError::protocol(
            path,
            format!("status '{}' is not a percentage", raw),
        )),
    }
}

#[async_trait]
impl ScannerApi for ZapClient {
    async fn version(&self) -> ClientResult<String> {
        let path = "/JSON/core/view/version/";
        let response = self.call(Method::GET, path, &[]).await?;
        field_as_string(&response, "version", path)
    }

    async fn start_phase(
        &self,
        target: &ScanTarget,
        params: &PhaseParams,
    ) -> ClientResult<PhaseHandle> {
        let path = format!("/JSON/{}/action/scan/", params.kind().component());
        let mut query = vec![("url", target.as_str().to_string())];
        match params {
            PhaseParams::Discovery {
                max_children,
                recurse,
            } => {
                query.push(("maxChildren", max_children.to_string()));
                query.push(("recurse", recurse.to_string()));
            }
            PhaseParams::Active {
                scan_policy,
                recurse,
            } => {
                query.push(("scanPolicyName", scan_policy.clone()));
                query.push(("recurse", recurse.to_string()));
            }
        }

        let response = self.call(Method::POST, &path, &query).await?;
        let id = field_as_string(&response, "scan", &path)?;
        if id.trim().is_empty() {
            return Err(ClientError::protocol(&path, "scanner returned an empty scan id"));
        }
        Ok(PhaseHandle::new(id))
    }

    async fn query_status(
        &self,
        kind: PhaseKind,
        handle: &PhaseHandle,
    ) -> ClientResult<PhaseStatus> {
        let path = format!("/JSON/{}/view/status/", kind.component());
        let query = [("scanId", handle.as_str().to_string())];

        // Checked on the whole body, before an error would truncate it
        let (status, body) = self.send(Method::GET, &path, &query).await?;
        if !(200..300).contains(&status) && is_unknown_scan(status, &body) {
            return Ok(PhaseStatus::NotFound);
        }

        let response = decode_body(&path, status, &body)?;
        let raw = field_as_string(&response, "status", &path)?;
        Ok(PhaseStatus::Progress(parse_percent(&raw, &path)?))
    }

    async fn fetch_findings(&self, filter: &AlertFilter) -> ClientResult<Vec<Finding>> {
        let path = "/JSON/core/view/alerts/";
        let mut query = Vec::new();
        if let Some(base_url) = &filter.base_url {
            query.push(("baseurl", base_url.clone()));
        }

        let mut response = self.call(Method::GET, path, &query).await?;
        let alerts = response
            .get_mut("alerts")
            .map(Value::take)
            .ok_or_else(|| ClientError::protocol(path, "response lacks 'alerts' field"))?;

        serde_json::from_value(alerts)
            .map_err(|e| ClientError::protocol(path, format!("malformed alert: {}", e)))
    }

    async fn request_report(&self, format: &str) -> ClientResult<Vec<u8>> {
        let path = "/JSON/reports/action/generate/";
        let response = self
            .call(Method::POST, path, &[("format", format.to_string())])
            .await?;

        match response.get("report") {
            Some(Value::String(content)) => Ok(content.clone().into_bytes()),
            Some(Value::Null) | None => Err(ClientError::protocol(
                path,
                "response lacks 'report' field",
            )),
            Some(other) => serde_json::to_vec_pretty(other)
                .map_err(|e| ClientError::protocol(path, e)),
        }
    }
}
