//! flexi_logger backed logging setup
//!
//! Lines go to stderr (or a file) in one of three layouts: `text`, `ext`
//! (adds the source location) and `json` (one object per line). The HTTP
//! stack is held at `warn` so per-request chatter does not drown out scan
//! progress unless `trace` is asked for.

use std::fmt;
use std::str::FromStr;

// Dropping the handle would stop the logger
static LOGGER_HANDLE: std::sync::OnceLock<std::sync::Mutex<flexi_logger::LoggerHandle>> =
    std::sync::OnceLock::new();

const QUIET_MODULES: &[&str] = &["hyper", "reqwest", "rustls", "h2"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Extended,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(Self::Text),
            "ext" => Ok(Self::Extended),
            "json" => Ok(Self::Json),
            other => Err(format!(
                "Unknown log format '{}' (expected text, ext or json)",
                other
            )),
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Text => "text",
            Self::Extended => "ext",
            Self::Json => "json",
        };
        write!(f, "{}", name)
    }
}

pub fn init_logging(
    log_level: Option<&str>,
    log_format: LogFormat,
    log_file: Option<&str>,
    color_enabled: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    use flexi_logger::{FileSpec, Logger};

    let mut logger = Logger::try_with_str(log_spec(log_level.unwrap_or("info")))?;

    // Escape codes never go to a file
    let color = color_enabled && log_file.is_none();
    let format: flexi_logger::FormatFunction = match (log_format, color) {
        (LogFormat::Json, _) => json_format,
        (LogFormat::Extended, true) => extended_color_format,
        (LogFormat::Extended, false) => extended_format,
        (LogFormat::Text, true) => text_color_format,
        (LogFormat::Text, false) => text_format,
    };
    logger = logger.format(format);

    if let Some(file_path) = log_file {
        let file_spec = FileSpec::try_from(std::path::Path::new(file_path))?;
        logger = logger.log_to_file(file_spec);
    }

    let handle = logger.start()?;
    let _ = LOGGER_HANDLE.set(std::sync::Mutex::new(handle));

    Ok(())
}

/// Logger spec for `level` with the HTTP stack capped at `warn`
fn log_spec(level: &str) -> String {
    if matches!(level, "trace" | "off") {
        return level.to_string();
    }
    let mut spec = level.to_string();
    for module in QUIET_MODULES {
        spec.push_str(&format!(", {}=warn", module));
    }
    spec
}

fn level_abbr(level: log::Level) -> &'static str {
    match level {
        log::Level::Error => "ERR",
        log::Level::Warn => "WRN",
        log::Level::Info => "INF",
        log::Level::Debug => "DBG",
        log::Level::Trace => "TRC",
    }
}

fn level_colored(level: log::Level) -> colored::ColoredString {
    use colored::Colorize;

    let abbr = level_abbr(level);
    match level {
        log::Level::Error => abbr.red().bold(),
        log::Level::Warn => abbr.yellow(),
        log::Level::Info => abbr.green(),
        log::Level::Debug => abbr.blue(),
        log::Level::Trace => abbr.magenta(),
    }
}

/// "YYYY-MM-DD HH:mm:ss.fff INF message[ (scan/phase.rs:42)]"
fn write_line(
    w: &mut dyn std::io::Write,
    now: &mut flexi_logger::DeferredNow,
    record: &log::Record,
    color: bool,
    with_location: bool,
) -> Result<(), std::io::Error> {
    use colored::Colorize;

    let stamp = now.format("%Y-%m-%d %H:%M:%S%.3f").to_string();
    if color {
        write!(
            w,
            "{} {} {}",
            stamp.dimmed(),
            level_colored(record.level()),
            record.args()
        )?;
    } else {
        write!(w, "{} {} {}", stamp, level_abbr(record.level()), record.args())?;
    }

    if with_location {
        let location = source_location(record.target(), record.line());
        if color {
            write!(w, " ({})", location.dimmed())?;
        } else {
            write!(w, " ({})", location)?;
        }
    }
    Ok(())
}

fn text_format(
    w: &mut dyn std::io::Write,
    now: &mut flexi_logger::DeferredNow,
    record: &log::Record,
) -> Result<(), std::io::Error> {
    write_line(w, now, record, false, false)
}

fn text_color_format(
    w: &mut dyn std::io::Write,
    now: &mut flexi_logger::DeferredNow,
    record: &log::Record,
) -> Result<(), std::io::Error> {
    write_line(w, now, record, true, false)
}

fn extended_format(
    w: &mut dyn std::io::Write,
    now: &mut flexi_logger::DeferredNow,
    record: &log::Record,
) -> Result<(), std::io::Error> {
    write_line(w, now, record, false, true)
}

fn extended_color_format(
    w: &mut dyn std::io::Write,
    now: &mut flexi_logger::DeferredNow,
    record: &log::Record,
) -> Result<(), std::io::Error> {
    write_line(w, now, record, true, true)
}

fn json_format(
    w: &mut dyn std::io::Write,
    now: &mut flexi_logger::DeferredNow,
    record: &log::Record,
) -> Result<(), std::io::Error> {
    let line = serde_json::json!({
        "timestamp": now.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string(),
        "level": level_abbr(record.level()),
        "message": record.args().to_string(),
        "target": source_location(record.target(), record.line()),
    });

    match serde_json::to_string(&line) {
        Ok(encoded) => w.write_all(encoded.as_bytes()),
        Err(_) => w.write_all(b"{\"error\":\"unserializable log record\"}"),
    }
}

// vulnguard::scan::phase -> scan/phase.rs:LINE
fn source_location(target: &str, line: Option<u32>) -> String {
    let path = match target.strip_prefix("vulnguard::") {
        Some(module) => module.replace("::", "/") + ".rs",
        None => target.replace("::", "/"),
    };

    match line {
        Some(line) => format!("{}:{}", path, line),
        None => path,
    }
}
