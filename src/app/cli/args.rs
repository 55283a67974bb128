//! Command line arguments
//!
//! The `Args` struct is the single place every setting lands in: clap fills
//! it from the command line and environment, `config.rs` fills remaining
//! gaps from the TOML file, and `validation.rs` turns it into the client and
//! scan configurations.

use crate::core::validation::validate_positive_int;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug, Clone, Default)]
#[command(name = "vulnguard")]
#[command(about = "Drive a ZAP scanner through discovery and active scanning of a web target")]
#[command(version)]
#[command(after_help = "Durations are in seconds. Command line values override the configuration file.")]
pub struct Args {
    /// Target URL to scan (scheme and host required)
    #[arg(value_name = "TARGET")]
    pub target: String,

    /// Scanner API key
    #[arg(long = "api-key", value_name = "KEY", env = "ZAP_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Scanner API base URL [default: http://localhost:8080]
    #[arg(long = "zap-url", value_name = "URL")]
    pub zap_url: Option<String>,

    /// How the API key is sent
    #[arg(long = "api-key-placement", value_name = "WHERE", value_parser = ["header", "query"])]
    pub api_key_placement: Option<String>,

    /// Per-request timeout for scanner calls
    #[arg(long = "request-timeout", value_name = "SECONDS")]
    pub request_timeout: Option<u64>,

    /// Maximum children the crawler visits per node [default: 10]
    #[arg(short = 'm', long = "max-children", value_name = "COUNT", value_parser = validate_positive_int)]
    pub max_children: Option<u32>,

    /// Only crawl the target URL itself, not below it
    #[arg(long = "no-recurse")]
    pub no_recurse: bool,

    /// Skip the discovery (spider) phase
    #[arg(long = "no-spider")]
    pub no_spider: bool,

    /// Skip the active scan phase
    #[arg(long = "no-active")]
    pub no_active: bool,

    /// Active scan policy name [default: "Default Policy"]
    #[arg(long = "policy", value_name = "NAME")]
    pub policy: Option<String>,

    /// Only collect alerts under the target URL
    #[arg(long = "scope-alerts")]
    pub scope_alerts: bool,

    /// Report file (overrides --output-dir)
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Directory for scan_results_<timestamp>.json [default: .]
    #[arg(long = "output-dir", value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Also save the scanner's own report in this format (e.g. html)
    #[arg(long = "report-format", value_name = "FORMAT")]
    pub report_format: Option<String>,

    /// Response classifier service URL
    #[arg(long = "classifier-url", value_name = "URL")]
    pub classifier_url: Option<String>,

    #[arg(long = "spider-interval", value_name = "SECONDS")]
    pub spider_interval: Option<u64>,

    /// Discovery budget [default: 1800]
    #[arg(long = "spider-timeout", value_name = "SECONDS")]
    pub spider_timeout: Option<u64>,

    #[arg(long = "active-interval", value_name = "SECONDS")]
    pub active_interval: Option<u64>,

    /// Active scan budget [default: 3600]
    #[arg(long = "active-timeout", value_name = "SECONDS")]
    pub active_timeout: Option<u64>,

    #[arg(long = "ready-interval", value_name = "SECONDS")]
    pub ready_interval: Option<u64>,

    /// How long to wait for the scanner to come up [default: 300]
    #[arg(long = "ready-timeout", value_name = "SECONDS")]
    pub ready_timeout: Option<u64>,

    /// Pause between discovery and active scan [default: 5]
    #[arg(long = "settle-delay", value_name = "SECONDS")]
    pub settle_delay: Option<u64>,

    /// Consecutive unreachable polls tolerated per phase [default: 3]
    #[arg(long = "max-transport-errors", value_name = "COUNT", value_parser = validate_positive_int)]
    pub max_transport_errors: Option<u32>,

    /// Configuration file path
    #[arg(short = 'c', long = "config-file", value_name = "FILE")]
    pub config_file: Option<PathBuf>,

    /// Force colored output
    #[arg(long = "color", conflicts_with = "no_color")]
    pub color: bool,

    /// Disable colored output
    #[arg(long = "no-color", conflicts_with = "color")]
    pub no_color: bool,

    /// Log level
    #[arg(short = 'l', long = "log-level", value_name = "LEVEL", value_parser = ["trace", "debug", "info", "warn", "error", "off"])]
    pub log_level: Option<String>,

    /// Log output format
    #[arg(long = "log-format", value_name = "FORMAT", value_parser = ["text", "ext", "json"])]
    pub log_format: Option<String>,

    /// Log file path (use 'none' to disable file logging)
    #[arg(short = 'f', long = "log-file", value_name = "FILE")]
    pub log_file: Option<PathBuf>,
}
