//! Report Exporter
//!
//! Serializes a scan's findings into a JSON artifact. Writes are atomic: a
//! reader sees either the previous file or the complete new one.

pub mod error;
pub mod exporter;
pub mod types;

#[cfg(test)]
mod tests;

pub use error::{ReportError, ReportResult};
pub use exporter::{default_report_path, scanner_report_path, ReportExporter};
pub use types::ScanReport;
