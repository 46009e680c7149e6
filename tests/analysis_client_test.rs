//! Integration tests for the analysis service client
//!
//! Tests HTTP client behavior using wiremock for request/response mocking.

mod common;

use std::time::Duration;

use serde_json::json;
use wiremock::{
    matchers::{body_json, header, header_regex, method, path},
    Mock, MockServer, ResponseTemplate,
};

use case_intelligence::api::{
    AnalysisClient, AnalysisService, AnalyzeCaseRequest, PrecedentRequest, RiskRequest,
};
use case_intelligence::config::{EndpointConfig, RequestConfig, ServiceConfig};
use case_intelligence::error::ServiceError;

use common::{test_client, test_config};

fn client_with(base_url: &str, api_key: Option<&str>, timeout_ms: u64) -> AnalysisClient {
    AnalysisClient::new(
        &ServiceConfig {
            base_url: base_url.to_string(),
            api_key: api_key.map(str::to_string),
        },
        EndpointConfig::default(),
        RequestConfig { timeout_ms },
    )
    .expect("Failed to create client")
}

#[tokio::test]
async fn test_stage_call_returns_payload_field() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/analyze-case"))
        .and(header("Content-Type", "application/json"))
        .and(body_json(json!({"case_text": "FIR filed under theft"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "analysis": "```json\n{\"case_type\": \"Criminal\"}\n```",
            "model": "mistral"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = test_client(&test_config(&mock_server.uri()));
    let payload = client
        .analyze_case(&AnalyzeCaseRequest::new("FIR filed under theft"))
        .await
        .unwrap();

    assert_eq!(payload, json!("```json\n{\"case_type\": \"Criminal\"}\n```"));
}

#[tokio::test]
async fn test_missing_payload_field_is_null() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/find-precedents"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"error": "model busy"})))
        .mount(&mock_server)
        .await;

    let client = test_client(&test_config(&mock_server.uri()));
    let payload = client
        .find_precedents(&PrecedentRequest {
            case_description: "theft".to_string(),
            case_type: "Criminal".to_string(),
        })
        .await
        .unwrap();

    assert!(payload.is_null());
}

#[tokio::test]
async fn test_bearer_token_sent_when_configured() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/calculate-risk"))
        .and(header("Authorization", "Bearer secret-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"risk_analysis": {}})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_with(&mock_server.uri(), Some("secret-token"), 5000);
    let request = RiskRequest {
        case_details: json!({}),
        evidence: vec![],
    };
    assert!(client.calculate_risk(&request).await.is_ok());
}

#[tokio::test]
async fn test_error_status_is_api_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/analyze-case"))
        .respond_with(ResponseTemplate::new(500).set_body_string("model crashed"))
        .mount(&mock_server)
        .await;

    let client = test_client(&test_config(&mock_server.uri()));
    let result = client.analyze_case(&AnalyzeCaseRequest::new("x")).await;

    match result {
        Err(ServiceError::Api { status, message }) => {
            assert_eq!(status, 500);
            assert_eq!(message, "model crashed");
        }
        other => panic!("Expected Api error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_non_json_envelope_is_invalid_response() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/analyze-case"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>proxy error</html>"))
        .mount(&mock_server)
        .await;

    let client = test_client(&test_config(&mock_server.uri()));
    let result = client.analyze_case(&AnalyzeCaseRequest::new("x")).await;

    assert!(matches!(result, Err(ServiceError::InvalidResponse { .. })));
}

#[tokio::test]
async fn test_slow_service_times_out() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/analyze-case"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"analysis": {}}))
                .set_delay(Duration::from_millis(2000)),
        )
        .mount(&mock_server)
        .await;

    let client = client_with(&mock_server.uri(), None, 200);
    let result = client.analyze_case(&AnalyzeCaseRequest::new("x")).await;

    assert!(matches!(
        result,
        Err(ServiceError::Timeout { timeout_ms: 200 })
    ));
}

#[tokio::test]
async fn test_unreachable_service_is_unavailable() {
    let client = client_with("http://127.0.0.1:1", None, 2000);
    let result = client.analyze_case(&AnalyzeCaseRequest::new("x")).await;

    assert!(matches!(result, Err(ServiceError::Unavailable { .. })));
}

#[tokio::test]
async fn test_evidence_upload_is_multipart() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/upload-evidence"))
        .and(header_regex("content-type", "^multipart/form-data"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "filename": "agreement.pdf",
            "analysis": "{\"impact\": \"High\", \"weight\": 85}"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = test_client(&test_config(&mock_server.uri()));
    let response = client
        .upload_evidence("agreement.pdf", b"%PDF-1.4".to_vec())
        .await
        .unwrap();

    assert!(response.success);
    assert_eq!(response.filename.as_deref(), Some("agreement.pdf"));
}

#[tokio::test]
async fn test_health_check() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "healthy",
            "ollama": "connected",
            "models": ["mistral:latest", "llava:latest"]
        })))
        .mount(&mock_server)
        .await;

    let client = test_client(&test_config(&mock_server.uri()));
    let health = client.health().await.unwrap();

    assert!(health.is_healthy());
    assert_eq!(health.models.len(), 2);
}
