//! Normalization of analysis payloads.
//!
//! The analysis service returns each stage's payload in whatever shape the
//! underlying model produced: sometimes a JSON value, sometimes a string
//! holding JSON, and sometimes prose wrapping JSON in a markdown code fence.
//! [`decode`] turns all of these into a [`serde_json::Value`] or reports
//! [`Decoded::Failed`]. It never panics and never returns an error type,
//! because a payload that cannot be read is an expected outcome rather than
//! a fault.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

const FENCE: &str = "```";

/// Outcome of decoding one stage payload.
///
/// `Failed` means the service answered but the answer could not be read.
/// It is distinct from a legitimately empty `Ok(..)` value such as `{}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum Decoded<T> {
    Ok(T),
    Failed,
}

impl<T> Decoded<T> {
    pub fn is_ok(&self) -> bool {
        matches!(self, Decoded::Ok(_))
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Decoded::Failed)
    }

    /// Borrow the decoded value, if any.
    pub fn as_ok(&self) -> Option<&T> {
        match self {
            Decoded::Ok(value) => Some(value),
            Decoded::Failed => None,
        }
    }

    pub fn ok(self) -> Option<T> {
        match self {
            Decoded::Ok(value) => Some(value),
            Decoded::Failed => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Decoded<U> {
        match self {
            Decoded::Ok(value) => Decoded::Ok(f(value)),
            Decoded::Failed => Decoded::Failed,
        }
    }
}

impl<T> From<Option<T>> for Decoded<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => Decoded::Ok(v),
            None => Decoded::Failed,
        }
    }
}

/// Decode a raw payload into a structured value.
pub fn decode(raw: &Value) -> Decoded<Value> {
    let text = match raw {
        Value::Object(_) | Value::Array(_) => return Decoded::Ok(raw.clone()),
        Value::Null => return Decoded::Failed,
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };

    decode_text(&text)
}

/// Decode a text payload, looking inside a fenced block before
/// falling back to the whole text.
pub fn decode_text(text: &str) -> Decoded<Value> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        debug!("Empty payload");
        return Decoded::Failed;
    }

    if let Some(inner) = fenced_block(trimmed) {
        match serde_json::from_str::<Value>(inner) {
            Ok(Value::Null) => {}
            Ok(value) => return Decoded::Ok(value),
            Err(e) => debug!(error = %e, "Fenced block is not valid JSON, trying whole text"),
        }
    }

    match serde_json::from_str::<Value>(trimmed) {
        Ok(Value::Null) => Decoded::Failed,
        Ok(value) => Decoded::Ok(value),
        Err(e) => {
            warn!(
                error = %e,
                preview = %trimmed.chars().take(100).collect::<String>(),
                "Payload could not be decoded"
            );
            Decoded::Failed
        }
    }
}

/// Decode a payload and deserialize it into `T`.
///
/// A value that decodes but does not fit `T` counts as a failure.
pub fn decode_as<T: DeserializeOwned>(raw: &Value) -> Decoded<T> {
    match decode(raw) {
        Decoded::Ok(value) => match serde_json::from_value::<T>(value) {
            Ok(typed) => Decoded::Ok(typed),
            Err(e) => {
                warn!(
                    error = %e,
                    target_type = std::any::type_name::<T>(),
                    "Decoded payload has unexpected shape"
                );
                Decoded::Failed
            }
        },
        Decoded::Failed => Decoded::Failed,
    }
}

/// Decode a list payload. Anything that is not an array becomes an empty
/// list, and elements that do not fit `T` are dropped.
pub fn decode_list<T: DeserializeOwned>(raw: &Value) -> Vec<T> {
    match decode(raw) {
        Decoded::Ok(Value::Array(items)) => {
            let total = items.len();
            let parsed: Vec<T> = items
                .into_iter()
                .filter_map(|item| serde_json::from_value(item).ok())
                .collect();
            if parsed.len() < total {
                debug!(total, kept = parsed.len(), "Dropped malformed list elements");
            }
            parsed
        }
        Decoded::Ok(other) => {
            debug!(kind = value_kind(&other), "Expected a list payload");
            Vec::new()
        }
        Decoded::Failed => Vec::new(),
    }
}

/// Interior of the first `json` fenced block, or failing that the first
/// fenced block of any kind with its language tag removed.
fn fenced_block(text: &str) -> Option<&str> {
    let json_fence = format!("{FENCE}json");
    if let Some(pos) = text.to_ascii_lowercase().find(&json_fence) {
        let rest = &text[pos + json_fence.len()..];
        if let Some(end) = rest.find(FENCE) {
            return Some(rest[..end].trim());
        }
    }

    let start = text.find(FENCE)? + FENCE.len();
    let rest = &text[start..];
    let rest = match rest.find('\n') {
        Some(n) if is_language_tag(&rest[..n]) => &rest[n + 1..],
        _ => rest,
    };
    let end = rest.find(FENCE)?;
    Some(rest[..end].trim())
}

fn is_language_tag(line: &str) -> bool {
    line.trim()
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '+' | '_' | '.'))
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn wrap_in_fence(value: &Value) -> Value {
        Value::String(format!(
            "Here is the analysis:\n```json\n{}\n```\nLet me know if you need more.",
            serde_json::to_string_pretty(value).unwrap()
        ))
    }

    #[test]
    fn test_structured_value_returned_unchanged() {
        let payload = json!({"case_type": "Criminal", "sections": ["IPC 379"]});
        assert_eq!(decode(&payload), Decoded::Ok(payload.clone()));

        let list = json!([{"title": "A vs B"}]);
        assert_eq!(decode(&list), Decoded::Ok(list.clone()));
    }

    #[test]
    fn test_fenced_round_trip() {
        let payloads = [
            json!({"overall_risk": "Medium", "financial_risk": 40}),
            json!([{"stage": "Filing"}, {"stage": "Trial"}]),
            json!({}),
        ];
        for payload in payloads {
            assert_eq!(decode(&wrap_in_fence(&payload)), Decoded::Ok(payload));
        }
    }

    #[test]
    fn test_bare_fence_without_tag() {
        let raw = json!("```\n{\"strength_score\": 65}\n```");
        assert_eq!(decode(&raw), Decoded::Ok(json!({"strength_score": 65})));
    }

    #[test]
    fn test_fence_on_single_line() {
        let raw = json!("```json{\"a\": 1}```");
        assert_eq!(decode(&raw), Decoded::Ok(json!({"a": 1})));
    }

    #[test]
    fn test_json_fence_preferred_over_earlier_plain_fence() {
        let raw = json!(
            "Relevant statute:\n```\nSection 379 IPC\n```\nAnalysis:\n```json\n{\"case_type\": \"Criminal\"}\n```"
        );
        assert_eq!(decode(&raw), Decoded::Ok(json!({"case_type": "Criminal"})));

        let raw = json!("Quoted:\n```text\nrobbery\n```\n```JSON\n[1, 2]\n```");
        assert_eq!(decode(&raw), Decoded::Ok(json!([1, 2])));
    }

    #[test]
    fn test_language_tag_is_stripped_from_plain_fence() {
        let raw = json!("```python\n{\"overall_risk\": \"Low\"}\n```");
        assert_eq!(decode(&raw), Decoded::Ok(json!({"overall_risk": "Low"})));
    }

    #[test]
    fn test_only_first_fence_is_considered() {
        let raw = json!("```json\n{\"first\": true}\n```\n```json\n{\"second\": true}\n```");
        assert_eq!(decode(&raw), Decoded::Ok(json!({"first": true})));
    }

    #[test]
    fn test_plain_json_text() {
        let raw = json!("  {\"case_type\": \"Civil\"}  ");
        assert_eq!(decode(&raw), Decoded::Ok(json!({"case_type": "Civil"})));
    }

    #[test]
    fn test_broken_fence_falls_back_to_whole_text() {
        // Unterminated fence: the whole text is tried, and fails.
        let raw = json!("```json\n{\"a\": 1}");
        assert_eq!(decode(&raw), Decoded::Failed);

        // Fence content invalid but whole text is not JSON either.
        let raw = json!("```json\nnot json\n```");
        assert_eq!(decode(&raw), Decoded::Failed);
    }

    #[test]
    fn test_malformed_text_fails() {
        for raw in [
            json!("The model could not analyze this document."),
            json!("{\"unterminated\": "),
            json!(""),
            json!("   \n\t "),
            Value::Null,
            json!("null"),
        ] {
            assert_eq!(decode(&raw), Decoded::Failed, "input: {raw:?}");
        }
    }

    #[test]
    fn test_empty_object_is_not_failure() {
        assert_eq!(decode(&json!("{}")), Decoded::Ok(json!({})));
        assert_eq!(decode(&json!("[]")), Decoded::Ok(json!([])));
    }

    #[test]
    fn test_scalars_are_coerced_through_text() {
        assert_eq!(decode(&json!(42)), Decoded::Ok(json!(42)));
        assert_eq!(decode(&json!(true)), Decoded::Ok(json!(true)));
    }

    #[test]
    fn test_decode_as_shape_mismatch_fails() {
        #[derive(Debug, Deserialize)]
        #[allow(dead_code)]
        struct Needs {
            value: u32,
        }
        assert!(decode_as::<Needs>(&json!({"other": 1})).is_failed());
        assert!(decode_as::<Needs>(&json!("{\"value\": 3}")).is_ok());
    }

    #[test]
    fn test_decode_list_coerces_non_arrays() {
        assert!(decode_list::<Value>(&json!({"not": "a list"})).is_empty());
        assert!(decode_list::<Value>(&json!("garbage")).is_empty());
        assert_eq!(decode_list::<Value>(&json!("[1, 2]")).len(), 2);
    }

    #[test]
    fn test_decode_list_drops_bad_elements() {
        let parsed: Vec<u32> = decode_list(&json!([1, "two", 3]));
        assert_eq!(parsed, vec![1, 3]);
    }

    #[test]
    fn test_decoded_serializes_with_status_tag() {
        let ok: Decoded<Value> = Decoded::Ok(json!({"a": 1}));
        assert_eq!(
            serde_json::to_value(&ok).unwrap(),
            json!({"status": "ok", "value": {"a": 1}})
        );
        let failed: Decoded<Value> = Decoded::Failed;
        assert_eq!(serde_json::to_value(&failed).unwrap(), json!({"status": "failed"}));
    }
}
