//! # Response Envelope
//!
//! Every response body is a JSON object of the shape:
//!
//! ```json
//! { "status": "ok", "result": <payload> }
//! ```
//!
//! When the status is anything but `"ok"`, `result` optionally carries a human-readable
//! message which becomes the error message.
use super::{OK_STATUS, RESULT_KEY, STATUS_KEY};
use crate::error::DatabaseError;
use serde_json::Value;

/// Decodes a raw response body into the action payload.
///
/// # Returns
///
/// * `Ok(Value)` - The `result` of an `"ok"` response, `Value::Null` when absent.
/// * `Err(DatabaseError::InvalidResponse)` - The body is not a JSON object.
/// * `Err(DatabaseError::Remote)` - The server reported an error with a message.
/// * `Err(DatabaseError::UnknownRemote)` - The server reported an error without a message.
pub fn decode_response(raw: &str) -> Result<Value, DatabaseError> {
    let mut envelope = match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) => map,
        _ => {
            return Err(DatabaseError::InvalidResponse {
                raw: raw.to_string(),
            });
        }
    };

    let result = envelope.remove(RESULT_KEY).unwrap_or(Value::Null);

    if envelope.get(STATUS_KEY).and_then(Value::as_str) == Some(OK_STATUS) {
        return Ok(result);
    }

    match error_message(result) {
        Some(message) => Err(DatabaseError::Remote(message)),
        None => Err(DatabaseError::UnknownRemote {
            raw: raw.to_string(),
        }),
    }
}

fn error_message(result: Value) -> Option<String> {
    let message = match result {
        Value::String(message) => message,
        Value::Number(number) => number.to_string(),
        Value::Bool(flag) => flag.to_string(),
        _ => return None,
    };

    (!message.trim().is_empty()).then_some(message)
}
