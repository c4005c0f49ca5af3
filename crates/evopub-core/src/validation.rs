use serde_json::Value;

use crate::error::ValidationError;

/// Literal placeholder strings that stand in for absent values when raw
/// text crosses the webhook boundary.
pub const SENTINEL_LITERALS: [&str; 2] = ["null", "undefined"];

/// Outcome of validating one event, with every failed rule collected.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationReport {
    pub errors: Vec<ValidationError>,
}

impl ValidationReport {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Validator for inbound event type / payload pairs.
pub struct Validator;

impl Validator {
    /// Validate the event type.
    /// Must be non-empty after trimming and not a sentinel literal.
    pub fn validate_event_type(event_type: &str) -> Result<(), ValidationError> {
        let trimmed = event_type.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::EmptyEventType);
        }
        if SENTINEL_LITERALS.contains(&trimmed) {
            return Err(ValidationError::SentinelEventType(trimmed.to_string()));
        }
        Ok(())
    }

    /// Validate the payload.
    /// Null is rejected; string payloads must not be sentinel literals.
    /// Falsy-but-meaningful values (empty string, zero, false) are valid.
    pub fn validate_payload(payload: &Value) -> Result<(), ValidationError> {
        match payload {
            Value::Null => Err(ValidationError::NullPayload),
            Value::String(s) if SENTINEL_LITERALS.contains(&s.as_str()) => {
                Err(ValidationError::SentinelPayload(s.clone()))
            }
            _ => Ok(()),
        }
    }

    /// Validate a complete event, collecting every failed rule.
    pub fn validate(event_type: &str, payload: &Value) -> ValidationReport {
        let mut errors = Vec::new();
        if let Err(e) = Self::validate_event_type(event_type) {
            errors.push(e);
        }
        if let Err(e) = Self::validate_payload(payload) {
            errors.push(e);
        }
        ValidationReport { errors }
    }
}
