//! Unit tests for analysis service request/response types.

use super::*;
use crate::case::{EvidenceAnalysis, EvidenceItem};
use crate::decode::Decoded;
use serde_json::json;

#[test]
fn test_analyze_request_body() {
    let body = serde_json::to_value(AnalyzeCaseRequest::new("FIR filed under theft")).unwrap();
    assert_eq!(body, json!({"case_text": "FIR filed under theft"}));
}

#[test]
fn test_risk_request_body_shape() {
    let request = RiskRequest {
        case_details: json!({}),
        evidence: vec![],
    };
    let body = serde_json::to_value(&request).unwrap();
    assert_eq!(body, json!({"case_details": {}, "evidence": []}));
}

#[test]
fn test_strength_request_uses_case_info_key() {
    let request = StrengthRequest {
        case_info: json!({"case_type": "Civil"}),
        evidence: vec![],
    };
    let body = serde_json::to_value(&request).unwrap();
    assert_eq!(body["case_info"]["case_type"], json!("Civil"));
}

#[test]
fn test_evidence_payload_from_item() {
    let analysis = EvidenceAnalysis {
        impact: Some("High".to_string()),
        weight: Some(85.0),
        ..Default::default()
    };
    let item = EvidenceItem::new("fir.pdf", Decoded::Ok(analysis));
    let payload = EvidencePayload::from(&item);
    assert_eq!(payload.filename, "fir.pdf");
    assert_eq!(payload.analysis["impact"], json!("High"));

    let body = serde_json::to_value(&payload).unwrap();
    assert!(body.get("uploadDate").is_some());
}

#[test]
fn test_evidence_payload_without_response_sends_null_analysis() {
    let item = EvidenceItem::new("scan.pdf", Decoded::Failed);
    assert_eq!(EvidencePayload::from(&item).analysis, serde_json::Value::Null);
}

#[test]
fn test_timeline_request_body() {
    let request = TimelineRequest {
        case_type: TimelineRequest::DEFAULT_CASE_TYPE.to_string(),
        jurisdiction: TimelineRequest::DEFAULT_JURISDICTION.to_string(),
        filing_date: "2024-01-01".to_string(),
    };
    assert_eq!(
        serde_json::to_value(&request).unwrap(),
        json!({
            "case_type": "Criminal",
            "jurisdiction": "District Court",
            "filing_date": "2024-01-01"
        })
    );
}

#[test]
fn test_payload_field_extract() {
    let envelope = json!({"risk_analysis": "```json\n{}\n```", "other": 1});
    assert_eq!(
        PayloadField::RiskAnalysis.extract(envelope),
        json!("```json\n{}\n```")
    );
    assert_eq!(
        PayloadField::Precedents.extract(json!({"timeline": []})),
        serde_json::Value::Null
    );
    assert_eq!(PayloadField::Analysis.extract(json!([1, 2])), serde_json::Value::Null);
}

#[test]
fn test_evidence_upload_response() {
    let response: EvidenceUploadResponse = serde_json::from_value(json!({
        "success": true,
        "filename": "agreement.pdf",
        "extracted_text": "…",
        "analysis": {"document_type": "Agreement", "weight": 85}
    }))
    .unwrap();
    assert!(response.success);
    assert_eq!(response.filename.as_deref(), Some("agreement.pdf"));
    assert_eq!(response.analysis["weight"], json!(85));

    let error: EvidenceUploadResponse =
        serde_json::from_value(json!({"error": "bad file"})).unwrap();
    assert!(!error.success);
}

#[test]
fn test_health_status() {
    let health: HealthStatus = serde_json::from_value(json!({
        "status": "healthy",
        "ollama": "connected",
        "models": ["mistral:latest"]
    }))
    .unwrap();
    assert!(health.is_healthy());
    assert_eq!(health.backend.as_deref(), Some("connected"));

    let down: HealthStatus =
        serde_json::from_value(json!({"status": "unhealthy", "ollama": "not_running"})).unwrap();
    assert!(!down.is_healthy());
    assert!(down.models.is_empty());
}
