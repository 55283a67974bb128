//! Classifier tests against a mock service

use crate::classifier::http::HttpClassifier;
use crate::classifier::traits::ResponseClassifier;
use crate::classifier::types::{ResponseSample, Verdict};
use crate::client::error::ClientError;
use crate::client::types::{Confidence, Finding, RiskLevel};
use serde_json::json;
use std::collections::BTreeMap;
use std::time::Duration;
use url::Url;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn classifier_for(server: &MockServer) -> HttpClassifier {
    HttpClassifier::new(&Url::parse(&server.uri()).unwrap(), Duration::from_secs(5)).unwrap()
}

fn sample() -> ResponseSample {
    ResponseSample {
        url: "http://example.com/item?id=1".to_string(),
        method: "GET".to_string(),
        status_code: 500,
        headers: BTreeMap::new(),
        body: "You have an error in your SQL syntax".to_string(),
        request_payload: Some("1'".to_string()),
    }
}

#[tokio::test]
async fn test_health_requires_loaded_model() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"status": "healthy", "model_loaded": false})),
        )
        .mount(&server)
        .await;

    assert!(!classifier_for(&server).health().await.unwrap());
}

#[tokio::test]
async fn test_classify_batch_posts_samples_and_decodes_results() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/classify/batch"))
        .and(body_partial_json(json!({
            "responses": [{"url": "http://example.com/item?id=1", "request_payload": "1'"}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{
                "url": "http://example.com/item?id=1",
                "classification": "HIT",
                "confidence": 0.92,
                "vulnerability_type": "SQL Injection",
                "explanation": "SQL error patterns detected: 1"
            }],
            "summary": {"total": 1, "HIT": 1, "MISS": 0, "LIKELY": 0, "ERROR": 0}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let batch = classifier_for(&server)
        .classify_batch(&[sample()])
        .await
        .unwrap();

    assert_eq!(batch.results.len(), 1);
    assert_eq!(batch.results[0].classification, Verdict::Hit);
    assert_eq!(batch.summary.get("HIT"), Some(&1));
}

#[tokio::test]
async fn test_unloaded_model_is_api_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/classify/batch"))
        .respond_with(ResponseTemplate::new(503).set_body_json(json!({"detail": "ML model not loaded"})))
        .mount(&server)
        .await;

    let err = classifier_for(&server)
        .classify_batch(&[sample()])
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::Api { status: 503, .. }), "got {:?}", err);
}

#[test]
fn test_sample_from_finding_uses_evidence_and_attack() {
    let mut details = serde_json::Map::new();
    details.insert("method".to_string(), json!("POST"));
    details.insert("attack".to_string(), json!("' OR 1=1 --"));
    let finding = Finding {
        name: "SQL Injection".to_string(),
        risk: RiskLevel::High,
        confidence: Confidence::Medium,
        scan_id: "2".to_string(),
        url: Some("http://example.com/login".to_string()),
        evidence: "syntax error".to_string(),
        details,
    };

    let sample = ResponseSample::from_finding(&finding).unwrap();

    assert_eq!(sample.method, "POST");
    assert_eq!(sample.body, "syntax error");
    assert_eq!(sample.request_payload.as_deref(), Some("' OR 1=1 --"));
    assert_eq!(sample.status_code, 0);
}

#[test]
fn test_finding_without_evidence_yields_no_sample() {
    let finding = Finding {
        name: "Missing Header".to_string(),
        risk: RiskLevel::Low,
        confidence: Confidence::Medium,
        scan_id: "2".to_string(),
        url: None,
        evidence: "  ".to_string(),
        details: Default::default(),
    };

    assert!(ResponseSample::from_finding(&finding).is_none());
}
