use serde_json::Value;

/// Marker embedded in the fallback form when encoding fails.
const FAILURE_MARKER: &str = "unserializable";

/// Canonical text encoding of a payload, used as fingerprint input.
///
/// Total over every `Value`: scalars render in their natural textual form
/// (strings unquoted), structured values as JSON with object keys in
/// sorted order, so two semantically equal objects built in different
/// insertion orders encode identically.
pub fn canonical_form(payload: &Value) -> String {
    match payload {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        other => serde_json::to_string(other)
            .unwrap_or_else(|_| format!("[{}:{}]", FAILURE_MARKER, json_kind(other))),
    }
}

/// Runtime kind of a JSON value, for the fallback form.
fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
