//! Validation utilities for CLI arguments, configuration values and targets

use crate::core::error_handling::ContextualError;
use std::fmt;
use url::Url;

/// User-facing validation failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    message: String,
}

impl ValidationError {
    pub fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
        }
    }

    pub fn details(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ValidationError {}

impl ContextualError for ValidationError {
    fn is_user_actionable(&self) -> bool {
        true
    }

    fn user_message(&self) -> Option<&str> {
        Some(&self.message)
    }
}

/// Validate positive integer value
pub fn validate_positive_int(value: &str) -> Result<u32, String> {
    match value.parse::<u32>() {
        Ok(0) => Err("Value must be greater than 0".to_string()),
        Ok(n) => Ok(n),
        Err(_) => Err(format!("'{}' is not a valid positive integer", value)),
    }
}

/// An absolute URL with a non-empty scheme and host
pub fn validate_absolute_url(value: &str) -> Result<Url, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::new("URL cannot be empty"));
    }

    let url = Url::parse(trimmed)
        .map_err(|e| ValidationError::new(&format!("'{}' is not a valid URL: {}", trimmed, e)))?;

    if url.scheme().is_empty() {
        return Err(ValidationError::new(&format!(
            "'{}' has no scheme",
            trimmed
        )));
    }
    match url.host_str() {
        Some(host) if !host.is_empty() => Ok(url),
        _ => Err(ValidationError::new(&format!("'{}' has no host", trimmed))),
    }
}

/// Base URL of an HTTP service this tool talks to (scanner API, classifier)
pub fn validate_service_url(value: &str) -> Result<Url, ValidationError> {
    let url = validate_absolute_url(value)?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ValidationError::new(&format!(
            "'{}' uses unsupported scheme '{}'; only http and https are supported",
            value.trim(),
            other
        ))),
    }
}
