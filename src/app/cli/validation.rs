//! CLI argument validation and resolution
//!
//! Checks the connection-level settings and converts `Args` into the client
//! and scan configurations. Target and polling budgets are validated by the
//! orchestrator itself so the CLI and library callers get the same errors.

use crate::client::http::{ApiKeyPlacement, ClientConfig, DEFAULT_SCANNER_URL};
use crate::core::logging::LogFormat;
use crate::core::polling::PollPolicy;
use crate::core::validation::{validate_service_url, ValidationError};
use crate::report::exporter::default_report_path;
use crate::scan::config::ScanConfig;
use chrono::{DateTime, Utc};
use std::io::IsTerminal;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

use super::args::Args;

fn budget(base: PollPolicy, interval: Option<u64>, timeout: Option<u64>) -> PollPolicy {
    PollPolicy::new(
        interval.map(Duration::from_secs).unwrap_or(base.interval),
        timeout.map(Duration::from_secs).unwrap_or(base.timeout),
    )
}

impl Args {
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.scanner_url()?;
        self.classifier_url()?;
        self.key_placement()?;
        if self.request_timeout == Some(0) {
            return Err(ValidationError::new(
                "Request timeout must be greater than 0 seconds",
            ));
        }
        if let Some(format) = &self.report_format {
            if format.trim().is_empty() || format.contains(['/', '\\']) {
                return Err(ValidationError::new(&format!(
                    "Invalid scanner report format '{}'",
                    format
                )));
            }
        }
        self.log_format()?;
        Ok(())
    }

    pub fn scanner_url(&self) -> Result<Url, ValidationError> {
        validate_service_url(self.zap_url.as_deref().unwrap_or(DEFAULT_SCANNER_URL))
    }

    pub fn classifier_url(&self) -> Result<Option<Url>, ValidationError> {
        self.classifier_url
            .as_deref()
            .map(validate_service_url)
            .transpose()
    }

    fn key_placement(&self) -> Result<ApiKeyPlacement, ValidationError> {
        match &self.api_key_placement {
            None => Ok(ApiKeyPlacement::default()),
            Some(value) => value.parse().map_err(|e: String| ValidationError::new(&e)),
        }
    }

    pub fn client_config(&self) -> Result<ClientConfig, ValidationError> {
        let mut config = ClientConfig::new(self.scanner_url()?).with_api_key(self.api_key.clone());
        config.key_placement = self.key_placement()?;
        if let Some(secs) = self.request_timeout {
            config.request_timeout = Duration::from_secs(secs);
        }
        Ok(config)
    }

    pub fn scan_config(&self) -> ScanConfig {
        let defaults = ScanConfig::default();
        ScanConfig {
            max_children: self.max_children.unwrap_or(defaults.max_children),
            recurse: !self.no_recurse,
            scan_policy: self.policy.clone().unwrap_or(defaults.scan_policy),
            run_discovery: !self.no_spider,
            run_active: !self.no_active,
            discovery: budget(defaults.discovery, self.spider_interval, self.spider_timeout),
            active: budget(defaults.active, self.active_interval, self.active_timeout),
            readiness: budget(defaults.readiness, self.ready_interval, self.ready_timeout),
            settle_delay: self
                .settle_delay
                .map(Duration::from_secs)
                .unwrap_or(defaults.settle_delay),
            max_transport_errors: self
                .max_transport_errors
                .unwrap_or(defaults.max_transport_errors),
            scope_alerts_to_target: self.scope_alerts,
            scanner_report_format: self.report_format.clone(),
        }
    }

    /// `--output`, or a timestamped file in the output directory
    pub fn report_path(&self, now: DateTime<Utc>) -> PathBuf {
        match &self.output {
            Some(path) => path.clone(),
            None => {
                let dir = self.output_dir.clone().unwrap_or_else(|| PathBuf::from("."));
                default_report_path(&dir, now)
            }
        }
    }

    pub fn log_format(&self) -> Result<LogFormat, ValidationError> {
        match &self.log_format {
            None => Ok(LogFormat::default()),
            Some(value) => value.parse().map_err(|e: String| ValidationError::new(&e)),
        }
    }

    /// Log file to write, if any; `none` disables file logging
    pub fn log_file_path(&self) -> Option<&str> {
        self.log_file
            .as_deref()
            .and_then(|p| p.to_str())
            .filter(|p| !p.eq_ignore_ascii_case("none"))
    }

    pub fn use_color(&self) -> bool {
        if self.color {
            return true;
        }
        !self.no_color && std::io::stderr().is_terminal()
    }
}
