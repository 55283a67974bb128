//! Report exporter tests

use crate::client::types::{Confidence, Finding, RiskLevel};
use crate::report::error::ReportError;
use crate::report::exporter::ReportExporter;
use crate::report::types::ScanReport;
use chrono::{TimeZone, Utc};
use serde_json::{json, Value};
use tempfile::TempDir;

fn finding(name: &str) -> Finding {
    Finding {
        name: name.to_string(),
        risk: RiskLevel::Medium,
        confidence: Confidence::High,
        scan_id: "2".to_string(),
        url: Some("http://example.com/".to_string()),
        evidence: String::new(),
        details: Default::default(),
    }
}

fn leftover_temp_files(dir: &TempDir) -> Vec<String> {
    std::fs::read_dir(dir.path())
        .unwrap()
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
        .filter(|name| name.contains(".tmp."))
        .collect()
}

#[test]
fn test_total_count_tracks_findings() {
    let report = ScanReport::new("http://example.com", vec![finding("a"), finding("b")]);

    assert_eq!(report.total_count(), 2);
    assert!(report.is_consistent());
    assert!(report.classifications().is_none());
}

#[test]
fn test_serialized_shape() {
    let ts = Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap();
    let report = ScanReport::at("http://example.com", ts, vec![]);

    let value = serde_json::to_value(&report).unwrap();

    assert_eq!(
        value,
        json!({
            "target_url": "http://example.com",
            "scan_timestamp": "2024-05-01T12:30:00Z",
            "vulnerabilities": [],
            "total_count": 0
        })
    );
}

#[tokio::test]
async fn test_export_then_load() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("scan_results.json");
    let mut xss = finding("Cross Site Scripting");
    xss.details.insert("pluginId".to_string(), json!("40012"));
    xss.details.insert("attack".to_string(), json!("<script>alert(1)</script>"));
    let report = ScanReport::new("http://example.com", vec![finding("SQL Injection"), xss]);

    ReportExporter::default().export(&report, &path).await.unwrap();
    let loaded = ReportExporter::load(&path).await.unwrap();

    assert_eq!(loaded, report);
    assert!(leftover_temp_files(&dir).is_empty());
}

#[test]
fn test_timestamp_kept_to_whole_seconds() {
    let ts = Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 5).unwrap()
        + chrono::Duration::milliseconds(750);
    let report = ScanReport::at("http://example.com", ts, vec![]);

    assert_eq!(
        report.scan_timestamp(),
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 5).unwrap()
    );
}

#[tokio::test]
async fn test_export_replaces_existing_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("scan_results.json");
    std::fs::write(&path, "stale").unwrap();

    let report = ScanReport::new("http://example.com", vec![]);
    ReportExporter::new(false).export(&report, &path).await.unwrap();

    let written: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(written["total_count"], 0);
}

#[tokio::test]
async fn test_failed_export_leaves_no_temp_file() {
    let dir = TempDir::new().unwrap();
    // A directory at the destination makes the final rename fail
    let path = dir.path().join("occupied");
    std::fs::create_dir(&path).unwrap();
    std::fs::write(path.join("keep"), "x").unwrap();

    let report = ScanReport::new("http://example.com", vec![finding("a")]);
    let err = ReportExporter::default()
        .export(&report, &path)
        .await
        .unwrap_err();

    assert!(matches!(err, ReportError::Io { .. }), "got {:?}", err);
    assert!(leftover_temp_files(&dir).is_empty());
    assert!(path.join("keep").exists());
}

#[tokio::test]
async fn test_load_rejects_count_mismatch() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("tampered.json");
    std::fs::write(
        &path,
        json!({
            "target_url": "http://example.com",
            "scan_timestamp": "2024-05-01T12:30:00Z",
            "vulnerabilities": [],
            "total_count": 3
        })
        .to_string(),
    )
    .unwrap();

    let err = ReportExporter::load(&path).await.unwrap_err();

    assert!(matches!(
        err,
        ReportError::Inconsistent {
            declared: 3,
            actual: 0
        }
    ));
}

#[test]
fn test_artifact_paths() {
    use crate::report::exporter::{default_report_path, scanner_report_path};
    use std::path::Path;

    let at = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
    let path = default_report_path(Path::new("out"), at);

    assert_eq!(path, Path::new("out/scan_results_1714521600.json"));
    assert_eq!(
        scanner_report_path(&path, "html"),
        Path::new("out/scan_results_1714521600.scanner.html")
    );
}
