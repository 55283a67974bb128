//! Atomic report writer

use crate::report::error::{ReportError, ReportResult};
use crate::report::types::ScanReport;
use chrono::{DateTime, Utc};
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tokio::fs;
use tokio::io::AsyncWriteExt;

#[derive(Debug, Clone, Copy)]
pub struct ReportExporter {
    pretty: bool,
}

impl Default for ReportExporter {
    fn default() -> Self {
        Self { pretty: true }
    }
}

impl ReportExporter {
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }

    /// Serialize `report` in full, then replace `path` atomically
    pub async fn export(&self, report: &ScanReport, path: &Path) -> ReportResult<()> {
        let bytes = if self.pretty {
            serde_json::to_vec_pretty(report)?
        } else {
            serde_json::to_vec(report)?
        };
        self.export_raw(&bytes, path).await
    }

    /// Atomically write already-rendered content (e.g. a scanner-native report)
    pub async fn export_raw(&self, bytes: &[u8], path: &Path) -> ReportResult<()> {
        write_atomic(path, bytes).await?;
        log::debug!("Wrote {} bytes to {}", bytes.len(), path.display());
        Ok(())
    }

    /// Read an artifact back, rejecting one whose count disagrees with its findings
    pub async fn load(path: &Path) -> ReportResult<ScanReport> {
        let bytes = fs::read(path)
            .await
            .map_err(|e| ReportError::io("read", path, e))?;
        let report: ScanReport = serde_json::from_slice(&bytes)?;
        if !report.is_consistent() {
            return Err(ReportError::Inconsistent {
                declared: report.total_count(),
                actual: report.vulnerabilities().len(),
            });
        }
        Ok(report)
    }
}

/// `<dir>/scan_results_<unix-seconds>.json`
pub fn default_report_path(dir: &Path, at: DateTime<Utc>) -> PathBuf {
    dir.join(format!("scan_results_{}.json", at.timestamp()))
}

/// Sibling of the JSON artifact holding the scanner's own report
pub fn scanner_report_path(destination: &Path, format: &str) -> PathBuf {
    let stem = destination
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("scan_results");
    destination.with_file_name(format!("{}.scanner.{}", stem, format))
}

/// Hidden sibling of `path` that the content is staged in
pub(crate) fn temp_path_for(path: &Path) -> ReportResult<PathBuf> {
    let file_name = path.file_name().and_then(|n| n.to_str()).ok_or_else(|| {
        ReportError::io(
            "resolve",
            path,
            io::Error::new(io::ErrorKind::InvalidInput, "destination has no file name"),
        )
    })?;
    let nanos = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    Ok(parent.join(format!(".{}.tmp.{}", file_name, nanos)))
}

async fn write_atomic(path: &Path, bytes: &[u8]) -> ReportResult<()> {
    let tmp_path = temp_path_for(path)?;
    if let Some(parent) = tmp_path.parent() {
        fs::create_dir_all(parent)
            .await
            .map_err(|e| ReportError::io("create directory", parent, e))?;
    }

    let result = stage_and_rename(&tmp_path, path, bytes).await;
    if result.is_err() {
        let _ = fs::remove_file(&tmp_path).await;
    }
    result
}

async fn stage_and_rename(tmp_path: &Path, path: &Path, bytes: &[u8]) -> ReportResult<()> {
    let mut file = fs::File::create(tmp_path)
        .await
        .map_err(|e| ReportError::io("create", tmp_path, e))?;
    file.write_all(bytes)
        .await
        .map_err(|e| ReportError::io("write", tmp_path, e))?;
    file.flush()
        .await
        .map_err(|e| ReportError::io("flush", tmp_path, e))?;
    file.sync_all()
        .await
        .map_err(|e| ReportError::io("sync", tmp_path, e))?;
    drop(file);

    fs::rename(tmp_path, path)
        .await
        .map_err(|e| ReportError::io("replace", path, e))
}
