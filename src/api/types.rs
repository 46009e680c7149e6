use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::case::EvidenceItem;

/// Stage 1 request body
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalyzeCaseRequest {
    pub case_text: String,
}

/// Stage 2 request body
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskRequest {
    /// Decoded stage 1 output, or `{}` when stage 1 failed.
    pub case_details: Value,
    pub evidence: Vec<EvidencePayload>,
}

/// Stage 3 request body
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StrengthRequest {
    /// Decoded stage 1 output, or `{}` when stage 1 failed.
    pub case_info: Value,
    pub evidence: Vec<EvidencePayload>,
}

/// Evidence item as sent to the service. The analysis is forwarded as it
/// was received, whether or not it decoded.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvidencePayload {
    pub filename: String,
    pub analysis: Value,
    #[serde(rename = "uploadDate")]
    pub upload_date: String,
}

impl From<&EvidenceItem> for EvidencePayload {
    fn from(item: &EvidenceItem) -> Self {
        Self {
            filename: item.filename.clone(),
            analysis: item.raw_analysis.clone(),
            upload_date: item.upload_date.to_rfc3339(),
        }
    }
}

/// Stage 4 request body
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PrecedentRequest {
    pub case_description: String,
    pub case_type: String,
}

/// Stage 5 request body
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimelineRequest {
    pub case_type: String,
    pub jurisdiction: String,
    /// `YYYY-MM-DD`
    pub filing_date: String,
}

/// Response envelope field holding each stage's payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadField {
    Analysis,
    RiskAnalysis,
    StrengthAnalysis,
    Precedents,
    Timeline,
}

impl PayloadField {
    pub fn as_str(&self) -> &'static str {
        match self {
            PayloadField::Analysis => "analysis",
            PayloadField::RiskAnalysis => "risk_analysis",
            PayloadField::StrengthAnalysis => "strength_analysis",
            PayloadField::Precedents => "precedents",
            PayloadField::Timeline => "timeline",
        }
    }

    /// Take this field out of a response envelope. A missing field is
    /// returned as `Null` and left for the decoder to reject.
    pub fn extract(&self, envelope: Value) -> Value {
        match envelope {
            Value::Object(mut map) => map.remove(self.as_str()).unwrap_or(Value::Null),
            _ => Value::Null,
        }
    }
}

/// Response from the evidence upload endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct EvidenceUploadResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub filename: Option<String>,
    /// Raw analysis payload, decoded by the caller.
    #[serde(default)]
    pub analysis: Value,
}

/// Response from the health endpoint
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    /// State of the model backend behind the service, when reported.
    #[serde(default, alias = "ollama")]
    pub backend: Option<String>,
    #[serde(default)]
    pub models: Vec<String>,
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        self.status.eq_ignore_ascii_case("healthy")
    }
}

impl AnalyzeCaseRequest {
    pub fn new(case_text: impl Into<String>) -> Self {
        Self {
            case_text: case_text.into(),
        }
    }
}

impl TimelineRequest {
    /// Fallbacks used when the classification did not supply a value.
    pub const DEFAULT_CASE_TYPE: &'static str = "Criminal";
    pub const DEFAULT_JURISDICTION: &'static str = "District Court";
}

impl PrecedentRequest {
    pub const DEFAULT_CASE_TYPE: &'static str = "General";
}
