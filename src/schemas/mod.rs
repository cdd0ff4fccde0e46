use std::collections::HashMap;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

pub(crate) mod exam;
pub(crate) mod generation;
pub(crate) mod leaderboard;
pub(crate) mod marking;

#[derive(Debug, Serialize)]
pub(crate) struct HealthResponse {
    pub(crate) service: String,
    pub(crate) status: String,
    pub(crate) components: HashMap<String, String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct RootResponse {
    pub(crate) message: String,
    pub(crate) version: String,
    pub(crate) api_prefix: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct MessageResponse {
    pub(crate) message: String,
}

/// Accepts marks as a JSON number or a numeric string; editors and models send both.
pub(crate) fn deserialize_optional_marks<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    let number = match raw {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::Number(number)) => number.as_f64(),
        Some(Value::String(text)) if text.trim().is_empty() => return Ok(None),
        Some(Value::String(text)) => text.trim().parse::<f64>().ok(),
        Some(other) => return Err(D::Error::custom(format!("invalid marks: {other}"))),
    };

    match number {
        Some(value) if value.is_finite() && value >= 0.0 && value <= f64::from(u32::MAX) => {
            Ok(Some(value.round() as u32))
        }
        _ => Err(D::Error::custom("marks must be a non-negative number")),
    }
}

/// Accepts an answer reference given as a string or a bare number (an option index).
pub(crate) fn deserialize_optional_reference<'de, D>(
    deserializer: D,
) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(text)) if text.trim().is_empty() => Ok(None),
        Some(Value::String(text)) => Ok(Some(text)),
        Some(Value::Number(number)) => Ok(Some(number.to_string())),
        Some(other) => Err(D::Error::custom(format!("invalid answer reference: {other}"))),
    }
}
