//! Adapts foreign error values into the closed [`ServiceError`] set.
//!
//! Handlers that bubble up errors from JSON-speaking collaborators (upstream
//! APIs, scripting hooks) can convert the raw value with `ServiceError::from`.
//! The shape rules live here and nowhere else.

use serde_json::{Map, Value};

use crate::error::normalizer::trusted_status;
use crate::error::ServiceError;
use crate::validation::Issue;

const MESSAGE_FIELDS: [&str; 3] = ["message", "statusMessage", "statusText"];
const STATUS_FIELDS: [&str; 3] = ["code", "status", "statusCode"];

impl From<Value> for ServiceError {
    fn from(value: Value) -> Self {
        let classified = value.as_object().and_then(classify_object);
        classified.unwrap_or(Self::Unclassified { raw: value })
    }
}

fn classify_object(object: &Map<String, Value>) -> Option<ServiceError> {
    let message = candidate_message(object);
    let status = candidate_status(object);

    if let Some(issues) = object.get("issues").and_then(issue_list) {
        return Some(ServiceError::Validation {
            issues,
            status,
            message,
        });
    }

    if let Some(errors) = object.get("errors").and_then(error_list) {
        return Some(ServiceError::Multi {
            errors,
            status,
            message,
        });
    }

    status.map(|code| ServiceError::Status { code, message })
}

fn candidate_message(object: &Map<String, Value>) -> Option<String> {
    MESSAGE_FIELDS
        .iter()
        .find_map(|field| object.get(*field).and_then(Value::as_str))
        .map(str::to_string)
}

/// First numeric status field, kept only inside the trusted band.
fn candidate_status(object: &Map<String, Value>) -> Option<u16> {
    STATUS_FIELDS
        .iter()
        .find_map(|field| object.get(*field).and_then(parse_status))
        .filter(|status| trusted_status(Some(*status)).is_some())
}

fn parse_status(value: &Value) -> Option<u16> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0 && *f >= 0.0).map(|f| f as u64))
            .and_then(|n| u16::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// A non-empty array of issue records.
fn issue_list(value: &Value) -> Option<Vec<Issue>> {
    serde_json::from_value::<Vec<Issue>>(value.clone())
        .ok()
        .filter(|issues| !issues.is_empty())
}

fn error_list(value: &Value) -> Option<Vec<Value>> {
    match value {
        Value::Null | Value::Bool(false) => None,
        Value::Array(items) if items.is_empty() => None,
        Value::Array(items) => Some(items.clone()),
        Value::String(s) if s.is_empty() => None,
        Value::Object(map) if map.is_empty() => None,
        other => Some(vec![other.clone()]),
    }
}
