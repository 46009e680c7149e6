//! Field deserializers that accept whatever the model produced.
//!
//! Each function reads the raw JSON value and keeps what it can. None of
//! them fail, so one oddly shaped field never discards a whole record.

use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

use super::{MilestoneStatus, Parties, RiskLevel, StrengthDetail, StrengthItem};

fn scalar_text(value: Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

pub(super) fn opt_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(scalar_text(Value::deserialize(deserializer)?))
}

/// Numbers, or strings holding a number (a trailing `%` is allowed).
pub(super) fn opt_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().trim_end_matches('%').trim().parse().ok(),
        _ => None,
    })
}

/// Arrays of scalars; a single string becomes a one-element list.
pub(super) fn string_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Array(items) => items.into_iter().filter_map(scalar_text).collect(),
        other => scalar_text(other).into_iter().collect(),
    })
}

pub(super) fn opt_parties<'de, D>(deserializer: D) -> Result<Option<Parties>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Object(_) => serde_json::from_value(value).ok(),
        _ => None,
    })
}

pub(super) fn risk_level<'de, D>(deserializer: D) -> Result<RiskLevel, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(scalar_text(Value::deserialize(deserializer)?)
        .map(RiskLevel::from)
        .unwrap_or_default())
}

pub(super) fn milestone_status<'de, D>(deserializer: D) -> Result<MilestoneStatus, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(scalar_text(Value::deserialize(deserializer)?)
        .map(MilestoneStatus::from)
        .unwrap_or_default())
}

/// Strength lists mix plain strings and objects. Objects keep their text
/// fields; anything else is rendered as text.
pub(super) fn strength_items<'de, D>(deserializer: D) -> Result<Vec<StrengthItem>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let items = match value {
        Value::Array(items) => items,
        Value::Null => return Ok(Vec::new()),
        other => vec![other],
    };

    Ok(items.into_iter().filter_map(strength_item).collect())
}

fn strength_item(value: Value) -> Option<StrengthItem> {
    match value {
        Value::Object(fields) => {
            let textual: Map<String, Value> = fields
                .into_iter()
                .filter_map(|(k, v)| scalar_text(v).map(|s| (k, Value::String(s))))
                .collect();
            serde_json::from_value::<StrengthDetail>(Value::Object(textual))
                .ok()
                .map(StrengthItem::Detail)
        }
        other => scalar_text(other).map(StrengthItem::Text),
    }
}
