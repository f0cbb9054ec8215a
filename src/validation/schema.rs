//! Schema contract and issue records.

use std::fmt;
use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One segment of an issue path: an object key or an array index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathSegment {
    Index(usize),
    Key(String),
}

impl From<&str> for PathSegment {
    fn from(key: &str) -> Self {
        Self::Key(key.to_string())
    }
}

impl From<String> for PathSegment {
    fn from(key: String) -> Self {
        Self::Key(key)
    }
}

impl From<usize> for PathSegment {
    fn from(index: usize) -> Self {
        Self::Index(index)
    }
}

/// A single validation problem reported by a schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    /// Location of the offending value inside the payload.
    pub path: Vec<PathSegment>,
    /// Human-readable description.
    pub message: String,
    /// Machine-readable issue code (e.g. `invalid_type`).
    pub code: String,
}

impl Issue {
    pub fn new(
        path: impl IntoIterator<Item = PathSegment>,
        message: impl Into<String>,
        code: impl Into<String>,
    ) -> Self {
        Self {
            path: path.into_iter().collect(),
            message: message.into(),
            code: code.into(),
        }
    }
}

/// Structured failure returned by [`Schema::parse`].
///
/// Schemas should report at least one issue; an empty list is not answered
/// with a 400 but normalized like any error without a recognized shape.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("payload failed validation with {} issue(s)", .issues.len())]
pub struct ValidationError {
    pub issues: Vec<Issue>,
}

impl ValidationError {
    pub fn new(issues: Vec<Issue>) -> Self {
        Self { issues }
    }

    /// Shorthand for a failure with exactly one issue.
    pub fn single(issue: Issue) -> Self {
        Self {
            issues: vec![issue],
        }
    }
}

/// A schema validates a raw payload and produces a typed value.
///
/// `parse` may reshape the payload (defaults, coercions); the returned value
/// is what the route handler receives.
pub trait Schema: Send + Sync + 'static {
    type Output: Send + 'static;

    fn parse(&self, payload: Value) -> Result<Self::Output, ValidationError>;
}

/// Schema type used by routes that declare no schema. Never invoked.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unchecked;

impl Schema for Unchecked {
    type Output = Value;

    fn parse(&self, payload: Value) -> Result<Value, ValidationError> {
        Ok(payload)
    }
}

/// Schema backed by a serde `Deserialize` implementation.
pub struct SerdeSchema<T> {
    _marker: PhantomData<fn() -> T>,
}

impl<T> SerdeSchema<T> {
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<T> Default for SerdeSchema<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for SerdeSchema<T> {
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for SerdeSchema<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SerdeSchema")
            .field("output", &std::any::type_name::<T>())
            .finish()
    }
}

impl<T> Schema for SerdeSchema<T>
where
    T: DeserializeOwned + Send + 'static,
{
    type Output = T;

    fn parse(&self, payload: Value) -> Result<T, ValidationError> {
        serde_json::from_value(payload).map_err(|e| ValidationError::single(serde_issue(&e)))
    }
}

/// Translate a serde_json error into an issue record.
pub(crate) fn serde_issue(error: &serde_json::Error) -> Issue {
    let message = error.to_string();
    let code = if error.is_data() {
        "invalid_type"
    } else {
        "invalid_json"
    };

    // serde reports missing fields as "missing field `name`"
    let path = message
        .strip_prefix("missing field `")
        .and_then(|rest| rest.split('`').next())
        .map(|field| vec![PathSegment::from(field)])
        .unwrap_or_default();

    let message = if path.is_empty() {
        message
    } else {
        "Required".to_string()
    };

    Issue {
        path,
        message,
        code: code.to_string(),
    }
}
