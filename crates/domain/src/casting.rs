use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Interprets a loosely typed value as a boolean flag.
///
/// Accepts `true`, `"true"`, `"1"`, `"on"`, `"yes"` (case-insensitive) and
/// the number `1` as true. Everything else, including ambiguous input,
/// resolves to `false`; this never errors.
#[must_use]
pub fn truthiness(value: &Value) -> bool {
    match value {
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_u64() == Some(1),
        Value::String(text) => {
            matches!(
                text.trim().to_ascii_lowercase().as_str(),
                "1" | "true" | "on" | "yes"
            )
        }
        _ => false,
    }
}

/// Deserializes an optional boolean flag from common form representations.
pub fn lenient_flag<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().map(truthiness))
}

/// Deserializes an optional record id from a number or numeric string.
///
/// Blank or non-numeric input resolves to `None` rather than an error.
pub fn lenient_id<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(|value| match value {
        Value::Number(number) => number.as_u64(),
        Value::String(text) => text.trim().parse::<u64>().ok(),
        _ => None,
    }))
}
