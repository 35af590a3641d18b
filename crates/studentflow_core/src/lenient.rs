//! crates/studentflow_core/src/lenient.rs
//!
//! Serde helpers for habit inputs that arrive from forms. A habit log is never
//! rejected for a malformed field: numbers may come as strings, and anything
//! that does not parse falls back to a neutral default.

use chrono::NaiveTime;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::domain::Mood;

/// Reads a non-negative, finite number. Strings are parsed; everything else,
/// including negative values and NaN, becomes 0.
pub fn hours<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(coerce_number(value.as_ref()))
}

/// Like [`hours`], truncated to whole units.
pub fn minutes<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(coerce_number(value.as_ref()).min(u32::MAX as f64) as u32)
}

/// Reads a mood label; unknown labels and non-strings become `None`.
pub fn mood<'de, D>(deserializer: D) -> Result<Option<Mood>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(label)) => label.trim().parse().ok(),
        _ => None,
    })
}

/// Reads `HH:MM` or `HH:MM:SS`; anything else becomes `None`.
pub fn time_of_day<'de, D>(deserializer: D) -> Result<Option<NaiveTime>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(text)) => parse_time(&text),
        _ => None,
    })
}

pub fn coerce_number(value: Option<&Value>) -> f64 {
    let number = match value {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => s.trim().parse::<f64>().unwrap_or(0.0),
        _ => 0.0,
    };
    if number.is_finite() && number > 0.0 {
        number
    } else {
        0.0
    }
}

pub fn parse_time(text: &str) -> Option<NaiveTime> {
    let text = text.trim();
    NaiveTime::parse_from_str(text, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(text, "%H:%M"))
        .ok()
}
