//! Client-side parameter checks applied before a request is issued

use serde_json::{Map, Value};
use validator::ValidationError;

use crate::error::{ApiContractError, ApiContractResult};

/// Returns true when `value` has the shape of a Galaxy encoded id: a
/// non-empty, even-length string of ASCII hex digits.
pub fn is_encoded_id(value: &str) -> bool {
    !value.is_empty() && value.len() % 2 == 0 && value.bytes().all(|b| b.is_ascii_hexdigit())
}

/// Check an identifier, naming the resource it belongs to in the error.
pub fn validate_encoded_id(kind: &'static str, value: &str) -> ApiContractResult<()> {
    if is_encoded_id(value) {
        Ok(())
    } else {
        Err(ApiContractError::invalid_id(kind, value))
    }
}

/// `validator` adapter for id fields on request bodies.
pub fn encoded_id_field(value: &str) -> Result<(), ValidationError> {
    if is_encoded_id(value) {
        Ok(())
    } else {
        Err(ValidationError::new("encoded_id"))
    }
}

/// Parse workflow text (the contents of a `.ga` file) into a JSON object.
pub fn parse_workflow_document(text: &str) -> ApiContractResult<Map<String, Value>> {
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(ApiContractError::InvalidWorkflowJson(format!(
            "expected an object, found {}",
            json_kind(&other)
        ))),
        Err(e) => Err(ApiContractError::InvalidWorkflowJson(e.to_string())),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
