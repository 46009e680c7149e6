//! Case data model.
//!
//! Every field the analysis service fills in is optional. Absent values stay
//! absent here and are replaced by "N/A", 0, or an empty list only when a
//! view renders them. Fields the service adds beyond the known ones are
//! kept in `extra` so a stored snapshot loses nothing.

mod lenient;


use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::decode::Decoded;

/// Maximum number of characters of case text kept with a snapshot.
pub const TEXT_PREVIEW_CHARS: usize = 500;

/// Stage 1 output: classification of the uploaded document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRecord {
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub case_type: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub jurisdiction: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_number")]
    pub complexity_score: Option<f64>,
    #[serde(default, deserialize_with = "lenient::string_list")]
    pub sections: Vec<String>,
    #[serde(default, deserialize_with = "lenient::opt_parties")]
    pub parties: Option<Parties>,
    #[serde(default, deserialize_with = "lenient::string_list")]
    pub key_facts: Vec<String>,
    #[serde(default, deserialize_with = "lenient::string_list")]
    pub legal_issues: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Parties to a case.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Parties {
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub petitioner: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub respondent: Option<String>,
}

/// Overall risk band reported by the risk stage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
    #[default]
    Unknown,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "Low",
            RiskLevel::Medium => "Medium",
            RiskLevel::High => "High",
            RiskLevel::Critical => "Critical",
            RiskLevel::Unknown => "Unknown",
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<String> for RiskLevel {
    fn from(s: String) -> Self {
        match s.trim().to_lowercase().as_str() {
            "low" => RiskLevel::Low,
            "medium" => RiskLevel::Medium,
            "high" => RiskLevel::High,
            "critical" => RiskLevel::Critical,
            _ => RiskLevel::Unknown,
        }
    }
}

impl From<RiskLevel> for String {
    fn from(level: RiskLevel) -> Self {
        level.as_str().to_string()
    }
}

/// Stage 2 output.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    #[serde(default, deserialize_with = "lenient::risk_level")]
    pub overall_risk: RiskLevel,
    #[serde(default, deserialize_with = "lenient::opt_number")]
    pub legal_penalty_probability: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt_number")]
    pub financial_risk: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt_number")]
    pub urgency_level: Option<f64>,
    #[serde(
        default,
        alias = "explanation",
        deserialize_with = "lenient::opt_string"
    )]
    pub risk_explanation: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// An element of a strength list: either plain text or a structured entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StrengthItem {
    Text(String),
    Detail(StrengthDetail),
}

/// Structured strength-list entry. Which fields are present depends on the
/// list it came from.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrengthDetail {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aspect: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub legal_weight: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub legal_impact: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub how_to_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub importance: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub how_to_obtain: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeline: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl StrengthItem {
    /// The line to show for this item: plain text verbatim, otherwise the
    /// first of description, aspect, action, or item that is present.
    pub fn headline(&self) -> &str {
        match self {
            StrengthItem::Text(text) => text,
            StrengthItem::Detail(detail) => detail
                .description
                .as_deref()
                .or(detail.aspect.as_deref())
                .or(detail.action.as_deref())
                .or(detail.item.as_deref())
                .unwrap_or(""),
        }
    }
}

/// Stage 3 output.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StrengthAssessment {
    #[serde(default, deserialize_with = "lenient::opt_number")]
    pub strength_score: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt_number")]
    pub win_probability: Option<f64>,
    #[serde(default, deserialize_with = "lenient::strength_items")]
    pub strengths: Vec<StrengthItem>,
    #[serde(default, deserialize_with = "lenient::strength_items")]
    pub weaknesses: Vec<StrengthItem>,
    #[serde(default, deserialize_with = "lenient::strength_items")]
    pub missing_evidence: Vec<StrengthItem>,
    #[serde(default, deserialize_with = "lenient::strength_items")]
    pub recommendations: Vec<StrengthItem>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Stage 4 output element.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Precedent {
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub citation: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_number")]
    pub similarity: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub verdict: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub reasoning: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub relevance: Option<String>,
    #[serde(default, alias = "keyTakeaway", deserialize_with = "lenient::opt_string")]
    pub key_takeaway: Option<String>,
}

/// Progress of a timeline milestone. The service is free to invent other
/// labels; those are kept as [`MilestoneStatus::Other`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum MilestoneStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
    Upcoming,
    Other(String),
}

impl MilestoneStatus {
    pub fn label(&self) -> &str {
        match self {
            MilestoneStatus::Pending => "Pending",
            MilestoneStatus::InProgress => "In Progress",
            MilestoneStatus::Completed => "Completed",
            MilestoneStatus::Upcoming => "Upcoming",
            MilestoneStatus::Other(label) => label,
        }
    }
}

impl From<String> for MilestoneStatus {
    fn from(s: String) -> Self {
        let normalized: String = s
            .trim()
            .to_lowercase()
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect();
        match normalized.as_str() {
            "pending" => MilestoneStatus::Pending,
            "inprogress" | "ongoing" => MilestoneStatus::InProgress,
            "completed" | "complete" | "done" => MilestoneStatus::Completed,
            "upcoming" | "scheduled" => MilestoneStatus::Upcoming,
            _ => MilestoneStatus::Other(s.trim().to_string()),
        }
    }
}

impl From<MilestoneStatus> for String {
    fn from(status: MilestoneStatus) -> Self {
        status.label().to_string()
    }
}

/// Stage 5 output element.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimelineMilestone {
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub date: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub stage: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub description: Option<String>,
    #[serde(
        default,
        alias = "expectedDuration",
        deserialize_with = "lenient::opt_string"
    )]
    pub expected_duration: Option<String>,
    #[serde(default, deserialize_with = "lenient::milestone_status")]
    pub status: MilestoneStatus,
}

/// Analysis of one uploaded evidence file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EvidenceAnalysis {
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub impact: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub document_type: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_number")]
    pub weight: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub summary: Option<String>,
    #[serde(default, deserialize_with = "lenient::string_list")]
    pub key_points: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strengthens_case: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One piece of evidence uploaded during the current session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvidenceItem {
    pub filename: String,
    pub analysis: Decoded<EvidenceAnalysis>,
    /// Analysis payload exactly as the service returned it. This is what
    /// risk and strength requests carry.
    #[serde(default)]
    pub raw_analysis: Value,
    pub upload_date: DateTime<Utc>,
}

impl EvidenceItem {
    pub fn new(filename: impl Into<String>, analysis: Decoded<EvidenceAnalysis>) -> Self {
        let raw_analysis = analysis
            .as_ok()
            .and_then(|a| serde_json::to_value(a).ok())
            .unwrap_or(Value::Null);
        Self {
            filename: filename.into(),
            analysis,
            raw_analysis,
            upload_date: Utc::now(),
        }
    }

    /// Build an item from the upload response payload, decoding it for
    /// display while keeping the original for later requests.
    pub fn from_response(filename: impl Into<String>, raw: Value) -> Self {
        Self {
            filename: filename.into(),
            analysis: crate::decode::decode_as(&raw),
            raw_analysis: raw,
            upload_date: Utc::now(),
        }
    }
}

/// Creation-time token identifying a snapshot. Strictly increasing within a
/// process, based on milliseconds since the Unix epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SnapshotId(pub i64);

static LAST_SNAPSHOT_ID: AtomicI64 = AtomicI64::new(0);

impl SnapshotId {
    /// Allocate the next id from the current time.
    pub fn next() -> Self {
        let now = Utc::now().timestamp_millis();
        let mut last = LAST_SNAPSHOT_ID.load(Ordering::Relaxed);
        loop {
            let candidate = now.max(last + 1);
            match LAST_SNAPSHOT_ID.compare_exchange_weak(
                last,
                candidate,
                Ordering::Relaxed,
                Ordering::Relaxed,
            ) {
                Ok(_) => return SnapshotId(candidate),
                Err(actual) => last = actual,
            }
        }
    }
}

impl std::fmt::Display for SnapshotId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A completed case analysis as stored in history. Never modified after it
/// is created; re-analysis produces a new snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseSnapshot {
    pub id: SnapshotId,
    pub name: String,
    pub timestamp: DateTime<Utc>,
    pub analysis: Decoded<AnalysisRecord>,
    pub risk: Decoded<RiskAssessment>,
    pub strength: Decoded<StrengthAssessment>,
    #[serde(default)]
    pub precedents: Vec<Precedent>,
    #[serde(default)]
    pub timeline: Vec<TimelineMilestone>,
    #[serde(default)]
    pub text_preview: String,
}

/// A bookmarked case summary. Equality for registry purposes is by name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookmarkEntry {
    pub name: String,
    pub timestamp: DateTime<Utc>,
    pub analysis: Option<Decoded<AnalysisRecord>>,
    pub risk: Option<Decoded<RiskAssessment>>,
    pub strength: Option<Decoded<StrengthAssessment>>,
}

/// First [`TEXT_PREVIEW_CHARS`] characters of `text`.
pub fn text_preview(text: &str) -> String {
    text.chars().take(TEXT_PREVIEW_CHARS).collect()
}
