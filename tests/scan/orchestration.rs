//! End-to-end scan runs through the HTTP client

use crate::common::{alert, fast_config, status, MockZap, TARGET};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use url::Url;
use vulnguard::classifier::{HttpClassifier, Verdict};
use vulnguard::core::polling::PollPolicy;
use vulnguard::report::ReportExporter;
use vulnguard::scan::api::{FailureReason, ScanConfig, ScanError, ScanOrchestrator, ScanState};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_full_scan_writes_report_of_active_findings() {
    let zap = MockZap::start().await;
    zap.version("2.14.0").await;
    zap.phase("spider", "1", status(100)).await;
    zap.phase("ascan", "2", status(100)).await;
    zap.alerts(vec![
        alert("Directory Browsing", "Medium", 1),
        alert("SQL Injection", "High", 2),
        alert("Cookie No HttpOnly Flag", "Low", 2),
    ])
    .await;

    let dir = TempDir::new().unwrap();
    let destination = dir.path().join("reports").join("scan.json");
    let mut scan = ScanOrchestrator::new(Arc::new(zap.client()), fast_config());

    let report = scan.run(TARGET, &destination).await.unwrap();

    assert_eq!(scan.state(), ScanState::Reported);
    assert_eq!(report.total_count(), 2);

    let saved = ReportExporter::load(&destination).await.unwrap();
    assert_eq!(saved.target_url(), TARGET);
    let names: Vec<&str> = saved
        .vulnerabilities()
        .iter()
        .map(|f| f.name.as_str())
        .collect();
    assert_eq!(names, vec!["SQL Injection", "Cookie No HttpOnly Flag"]);

    // Unmodelled alert fields survive into the artifact
    let raw: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&destination).unwrap()).unwrap();
    assert_eq!(raw["vulnerabilities"][0]["pluginId"], "40018");
    assert_eq!(raw["total_count"], 2);
}

#[tokio::test]
async fn test_scanner_report_saved_beside_artifact() {
    let zap = MockZap::start().await;
    zap.version("2.14.0").await;
    zap.phase("spider", "1", status(100)).await;
    zap.phase("ascan", "2", status(100)).await;
    zap.alerts(vec![]).await;
    zap.scanner_report("html", "<html>report</html>").await;

    let dir = TempDir::new().unwrap();
    let destination = dir.path().join("scan.json");
    let config = ScanConfig {
        scanner_report_format: Some("html".to_string()),
        ..fast_config()
    };
    let mut scan = ScanOrchestrator::new(Arc::new(zap.client()), config);

    let report = scan.run(TARGET, &destination).await.unwrap();

    assert_eq!(report.total_count(), 0);
    let scanner_report = std::fs::read_to_string(dir.path().join("scan.scanner.html")).unwrap();
    assert_eq!(scanner_report, "<html>report</html>");
}

#[tokio::test]
async fn test_unreachable_scanner_fails_readiness() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/JSON/core/view/version/"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;
    let zap = MockZap { server };

    let dir = TempDir::new().unwrap();
    let destination = dir.path().join("scan.json");
    let mut scan = ScanOrchestrator::new(Arc::new(zap.client()), fast_config());

    let err = scan.run(TARGET, &destination).await.unwrap_err();

    assert!(matches!(err, ScanError::ReadinessTimeout { .. }));
    assert_eq!(
        scan.state(),
        ScanState::Failed(FailureReason::ReadinessTimeout)
    );
    assert!(!destination.exists());
}

#[tokio::test]
async fn test_vanished_active_scan_fails_run() {
    let zap = MockZap::start().await;
    zap.version("2.14.0").await;
    zap.phase("spider", "1", status(100)).await;
    zap.phase(
        "ascan",
        "2",
        ResponseTemplate::new(400).set_body_json(json!({
            "code": "does_not_exist",
            "message": "Does Not Exist"
        })),
    )
    .await;

    let dir = TempDir::new().unwrap();
    let destination = dir.path().join("scan.json");
    let mut scan = ScanOrchestrator::new(Arc::new(zap.client()), fast_config());

    let err = scan.run(TARGET, &destination).await.unwrap_err();

    assert!(matches!(err, ScanError::ActiveFailed(_)));
    assert_eq!(scan.state(), ScanState::Failed(FailureReason::ActiveFailed));
    assert_eq!(err.exit_code(), 1);
}

#[tokio::test]
async fn test_stalled_discovery_times_out() {
    let zap = MockZap::start().await;
    zap.version("2.14.0").await;
    zap.phase("spider", "1", status(40)).await;

    let dir = TempDir::new().unwrap();
    let destination = dir.path().join("scan.json");
    let config = ScanConfig {
        discovery: PollPolicy::new(Duration::from_millis(20), Duration::from_millis(150)),
        ..fast_config()
    };
    let mut scan = ScanOrchestrator::new(Arc::new(zap.client()), config);

    let err = scan.run(TARGET, &destination).await.unwrap_err();

    assert!(matches!(err, ScanError::DiscoveryTimeout(_)));
    assert_eq!(
        scan.state(),
        ScanState::Failed(FailureReason::DiscoveryTimeout)
    );
}

#[tokio::test]
async fn test_classifier_verdicts_attached_to_report() {
    let zap = MockZap::start().await;
    zap.version("2.14.0").await;
    zap.phase("spider", "1", status(100)).await;
    zap.phase("ascan", "2", status(100)).await;
    zap.alerts(vec![alert("SQL Injection", "High", 2)]).await;

    let service = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"status": "healthy", "model_loaded": true})),
        )
        .mount(&service)
        .await;
    Mock::given(method("POST"))
        .and(path("/classify/batch"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{
                "url": format!("{}/listproducts.php?cat=1", TARGET),
                "classification": "HIT",
                "confidence": 0.9,
                "vulnerability_type": "SQL Injection",
                "explanation": "SQL error patterns detected: 1"
            }],
            "summary": {"total": 1, "HIT": 1, "MISS": 0, "LIKELY": 0, "ERROR": 0}
        })))
        .expect(1)
        .mount(&service)
        .await;
    let classifier =
        HttpClassifier::new(&Url::parse(&service.uri()).unwrap(), Duration::from_secs(5))
            .unwrap();

    let dir = TempDir::new().unwrap();
    let destination = dir.path().join("scan.json");
    let mut scan = ScanOrchestrator::new(Arc::new(zap.client()), fast_config())
        .with_classifier(Arc::new(classifier));

    let report = scan.run(TARGET, &destination).await.unwrap();

    let batch = report.classifications().unwrap();
    assert_eq!(batch.results.len(), 1);
    assert_eq!(batch.results[0].classification, Verdict::Hit);

    let saved = ReportExporter::load(&destination).await.unwrap();
    assert!(saved.classifications().is_some());
}
