//! Error model for route compilation and request handling.
//!
//! # Data Flow
//! ```text
//! Startup:
//!     RouteTable → compiler → ConfigurationError (fatal, before bind)
//!
//! Per request:
//!     validation / handler / panic
//!         → ServiceError (closed variant set)
//!         → normalizer.rs (normalize → status + JSON body)
//!         → Response
//!
//! Foreign error values (JSON):
//!     classify.rs (From<Value>) → ServiceError
//! ```
//!
//! # Design Decisions
//! - Classification is an exhaustive match over variants, never field probing
//! - Only statuses inside [400, 500) reported by an error are trusted
//! - Anything unrecognised becomes a 500 and is logged server-side

pub mod classify;
pub mod normalizer;

use std::any::Any;

use axum::response::{IntoResponse, Response};
use serde_json::{json, Value};

use crate::routing::HttpMethod;
use crate::validation::{Issue, ValidationError};

pub use normalizer::{normalize, ErrorBody, NormalizedError};

/// Errors raised while handling a request.
///
/// Every variant is recovered into a response by [`normalize`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ServiceError {
    /// Schema validation failed.
    #[error("validation failed with {} issue(s)", .issues.len())]
    Validation {
        issues: Vec<Issue>,
        status: Option<u16>,
        message: Option<String>,
    },

    /// Several loosely structured errors reported at once.
    #[error("{} error(s) reported", .errors.len())]
    Multi {
        errors: Vec<Value>,
        status: Option<u16>,
        message: Option<String>,
    },

    /// An error carrying its own HTTP status.
    #[error("status {code}: {}", .message.as_deref().unwrap_or("<no message>"))]
    Status { code: u16, message: Option<String> },

    /// An error of unknown shape.
    #[error("unclassified error: {raw}")]
    Unclassified { raw: Value },
}

impl ServiceError {
    /// Error with an explicit status and message.
    pub fn status(code: u16, message: impl Into<String>) -> Self {
        Self::Status {
            code,
            message: Some(message.into()),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::status(400, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::status(401, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::status(403, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::status(404, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::status(409, message)
    }

    /// Multi-error with the default status.
    pub fn multi(errors: impl IntoIterator<Item = impl Into<Value>>) -> Self {
        Self::Multi {
            errors: errors.into_iter().map(Into::into).collect(),
            status: None,
            message: None,
        }
    }

    /// Wrap an arbitrary error as unclassified, keeping its display text.
    pub fn internal(error: impl std::fmt::Display) -> Self {
        Self::Unclassified {
            raw: json!({ "message": error.to_string() }),
        }
    }

    /// Build from a caught panic payload.
    pub fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let message = payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "handler panicked".to_string());

        Self::Unclassified {
            raw: json!({ "panic": message }),
        }
    }

    /// JSON form of the error as it would have been thrown.
    pub fn to_value(&self) -> Value {
        let mut object = serde_json::Map::new();
        let (status, message) = match self {
            Self::Unclassified { raw } => return raw.clone(),
            Self::Validation {
                issues,
                status,
                message,
            } => {
                object.insert(
                    "issues".into(),
                    serde_json::to_value(issues).unwrap_or_default(),
                );
                (*status, message)
            }
            Self::Multi {
                errors,
                status,
                message,
            } => {
                object.insert("errors".into(), Value::Array(errors.clone()));
                (*status, message)
            }
            Self::Status { code, message } => (Some(*code), message),
        };

        if let Some(status) = status {
            object.insert("status".into(), status.into());
        }
        if let Some(message) = message {
            object.insert("message".into(), message.clone().into());
        }
        Value::Object(object)
    }
}

impl From<ValidationError> for ServiceError {
    fn from(error: ValidationError) -> Self {
        Self::Validation {
            issues: error.issues,
            status: None,
            message: None,
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        normalize(&self).into_response()
    }
}

/// Malformed route table, detected before the listener is bound.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigurationError {
    #[error("Unknown HTTP method {method} for path {path}")]
    UnknownMethod { path: String, method: String },

    #[error("route {method} {path} is registered more than once")]
    DuplicateRoute { path: String, method: HttpMethod },

    #[error("invalid route path {path:?}: {reason}")]
    InvalidPath { path: String, reason: &'static str },

    #[error("route path {path:?} captures differently from {existing:?} at the same position")]
    ConflictingPath { path: String, existing: String },

    #[error("route {method} {path} requires authentication but no authenticator is configured")]
    MissingAuthenticator { path: String, method: HttpMethod },
}
