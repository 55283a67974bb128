//! TOML configuration file loading
//!
//! Values from the file only fill settings the command line (or the
//! environment) left unset.

use crate::core::validation::ValidationError;
use std::path::{Path, PathBuf};

use super::args::Args;

pub const CONFIG_DIR_NAME: &str = "Vulnguard";
pub const CONFIG_FILE_NAME: &str = "vulnguard.toml";

/// Keys accepted in the configuration file
pub const CONFIG_KEYS: &[&str] = &[
    "zap-url",
    "api-key",
    "api-key-placement",
    "request-timeout",
    "max-children",
    "recurse",
    "scan-policy",
    "spider",
    "active",
    "scope-alerts",
    "spider-interval",
    "spider-timeout",
    "active-interval",
    "active-timeout",
    "ready-interval",
    "ready-timeout",
    "settle-delay",
    "max-transport-errors",
    "output-dir",
    "report-format",
    "classifier-url",
    "log-level",
    "log-format",
    "log-file",
];

fn toml_string(config: &toml::Table, key: &str) -> Result<Option<String>, ValidationError> {
    match config.get(key) {
        None => Ok(None),
        Some(value) => value.as_str().map(|s| Some(s.to_string())).ok_or_else(|| {
            ValidationError::new(&format!("Configuration key '{}' must be a string", key))
        }),
    }
}

fn toml_bool(config: &toml::Table, key: &str) -> Result<Option<bool>, ValidationError> {
    match config.get(key) {
        None => Ok(None),
        Some(value) => value.as_bool().map(Some).ok_or_else(|| {
            ValidationError::new(&format!("Configuration key '{}' must be true or false", key))
        }),
    }
}

fn toml_u64(config: &toml::Table, key: &str) -> Result<Option<u64>, ValidationError> {
    match config.get(key) {
        None => Ok(None),
        Some(value) => value
            .as_integer()
            .and_then(|n| u64::try_from(n).ok())
            .map(Some)
            .ok_or_else(|| {
                ValidationError::new(&format!(
                    "Configuration key '{}' must be a non-negative integer",
                    key
                ))
            }),
    }
}

fn toml_u32(config: &toml::Table, key: &str) -> Result<Option<u32>, ValidationError> {
    match toml_u64(config, key)? {
        None => Ok(None),
        Some(n) => u32::try_from(n).map(Some).map_err(|_| {
            ValidationError::new(&format!("Configuration key '{}' is out of range", key))
        }),
    }
}

/// Fill `target` from the file unless the command line already set it
fn fill<T>(target: &mut Option<T>, value: Option<T>) {
    if target.is_none() {
        *target = value;
    }
}

impl Args {
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    /// Load the configuration file named on the command line, or the default
    /// one if it exists. Returns the path that was applied.
    ///
    /// An explicitly named file must exist.
    pub async fn load_config_file(&mut self) -> Result<Option<PathBuf>, ValidationError> {
        let path = match &self.config_file {
            Some(path) => {
                if !path.exists() {
                    return Err(ValidationError::new(&format!(
                        "The specified configuration file does not exist: {}",
                        path.display()
                    )));
                }
                path.clone()
            }
            None => match Self::default_config_path() {
                Some(path) if path.exists() => path,
                _ => return Ok(None),
            },
        };

        let config = Self::read_config(&path).await?;
        self.apply_toml_values(&config).map_err(|e| {
            ValidationError::new(&format!(
                "Error in configuration file {}: {}",
                path.display(),
                e
            ))
        })?;
        Ok(Some(path))
    }

    async fn read_config(path: &Path) -> Result<toml::Table, ValidationError> {
        let contents = tokio::fs::read_to_string(path).await.map_err(|e| {
            ValidationError::new(&format!(
                "Error reading configuration file {}: {}",
                path.display(),
                e
            ))
        })?;
        toml::from_str::<toml::Table>(&contents).map_err(|e| {
            ValidationError::new(&format!(
                "Error parsing configuration file {}: {}",
                path.display(),
                e
            ))
        })
    }

    /// Apply TOML configuration values to settings still unset
    pub fn apply_toml_values(&mut self, config: &toml::Table) -> Result<(), ValidationError> {
        if let Some(unknown) = config
            .keys()
            .find(|key| !CONFIG_KEYS.contains(&key.as_str()))
        {
            return Err(ValidationError::new(&format!(
                "Unknown configuration key '{}'",
                unknown
            )));
        }

        fill(&mut self.zap_url, toml_string(config, "zap-url")?);
        fill(&mut self.api_key, toml_string(config, "api-key")?);
        fill(
            &mut self.api_key_placement,
            toml_string(config, "api-key-placement")?,
        );
        fill(&mut self.request_timeout, toml_u64(config, "request-timeout")?);
        fill(&mut self.max_children, toml_u32(config, "max-children")?);
        fill(&mut self.policy, toml_string(config, "scan-policy")?);
        fill(&mut self.spider_interval, toml_u64(config, "spider-interval")?);
        fill(&mut self.spider_timeout, toml_u64(config, "spider-timeout")?);
        fill(&mut self.active_interval, toml_u64(config, "active-interval")?);
        fill(&mut self.active_timeout, toml_u64(config, "active-timeout")?);
        fill(&mut self.ready_interval, toml_u64(config, "ready-interval")?);
        fill(&mut self.ready_timeout, toml_u64(config, "ready-timeout")?);
        fill(&mut self.settle_delay, toml_u64(config, "settle-delay")?);
        fill(
            &mut self.max_transport_errors,
            toml_u32(config, "max-transport-errors")?,
        );
        fill(
            &mut self.output_dir,
            toml_string(config, "output-dir")?.map(PathBuf::from),
        );
        fill(&mut self.report_format, toml_string(config, "report-format")?);
        fill(&mut self.classifier_url, toml_string(config, "classifier-url")?);
        fill(&mut self.log_level, toml_string(config, "log-level")?);
        fill(&mut self.log_format, toml_string(config, "log-format")?);
        fill(
            &mut self.log_file,
            toml_string(config, "log-file")?.map(PathBuf::from),
        );

        // Switches: the file can only turn a phase off, never back on
        if toml_bool(config, "recurse")? == Some(false) {
            self.no_recurse = true;
        }
        if toml_bool(config, "spider")? == Some(false) {
            self.no_spider = true;
        }
        if toml_bool(config, "active")? == Some(false) {
            self.no_active = true;
        }
        if toml_bool(config, "scope-alerts")? == Some(true) {
            self.scope_alerts = true;
        }
        Ok(())
    }
}
