use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::warn;

use crate::error::AppError;

/// Error body returned by the collaborator.
#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub detail: Option<Value>,
}

impl ErrorBody {
    pub fn message(body: &str) -> String {
        match serde_json::from_str::<ErrorBody>(body) {
            Ok(ErrorBody { detail: Some(Value::String(detail)) }) => detail,
            Ok(ErrorBody { detail: Some(other) }) => other.to_string(),
            _ => body.to_string(),
        }
    }
}

/// Decodes a JSON sequence, skipping items that do not fit `T`.
pub fn decode_list<T: DeserializeOwned>(body: &str, what: &str) -> Result<Vec<T>, AppError> {
    let value: Value = serde_json::from_str(body)
        .map_err(|e| AppError::MalformedResponse(format!("{}: {}", what, e)))?;

    let Value::Array(items) = value else {
        return Err(AppError::MalformedResponse(format!(
            "{}: expected a sequence, got {}",
            what,
            shape_of(&value)
        )));
    };

    let mut decoded = Vec::with_capacity(items.len());
    for item in items {
        match serde_json::from_value::<T>(item) {
            Ok(v) => decoded.push(v),
            Err(e) => {
                warn!("Skipping malformed {} entry: {}", what, e);
            }
        }
    }
    Ok(decoded)
}

pub fn decode_one<T: DeserializeOwned>(body: &str, what: &str) -> Result<T, AppError> {
    serde_json::from_str(body).map_err(|e| AppError::MalformedResponse(format!("{}: {}", what, e)))
}

fn shape_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a sequence",
        Value::Object(_) => "an object",
    }
}
