//! Exception normalizer: every `ServiceError` to a status and JSON body.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ServiceError;

/// Statuses an error may report for itself.
const TRUSTED_STATUS: std::ops::Range<u16> = 400..500;

const DEFAULT_VALIDATION_MESSAGE: &str = "Validation Error";

/// JSON body of an error response. Absent fields are omitted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issues: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exception: Option<Value>,
}

/// Result of normalization: what the client receives.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedError {
    pub status: StatusCode,
    pub body: ErrorBody,
}

impl IntoResponse for NormalizedError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

/// Returns the status if it lies in the trusted client-error band.
pub fn trusted_status(status: Option<u16>) -> Option<StatusCode> {
    status
        .filter(|s| TRUSTED_STATUS.contains(s))
        .and_then(|s| StatusCode::from_u16(s).ok())
}

/// Map an error to its response. Total and deterministic.
pub fn normalize(error: &ServiceError) -> NormalizedError {
    match error {
        ServiceError::Validation {
            issues,
            status,
            message,
        } if !issues.is_empty() => NormalizedError {
            status: trusted_status(*status).unwrap_or(StatusCode::BAD_REQUEST),
            body: ErrorBody {
                message: Some(
                    message
                        .clone()
                        .unwrap_or_else(|| DEFAULT_VALIDATION_MESSAGE.to_string()),
                ),
                issues: Some(serde_json::to_value(issues).unwrap_or_default()),
                exception: None,
            },
        },

        ServiceError::Multi {
            errors,
            status,
            message,
        } if !errors.is_empty() => NormalizedError {
            status: trusted_status(*status).unwrap_or(StatusCode::BAD_REQUEST),
            body: ErrorBody {
                message: message.clone(),
                issues: Some(Value::Array(errors.clone())),
                exception: None,
            },
        },

        ServiceError::Validation {
            status, message, ..
        }
        | ServiceError::Multi {
            status, message, ..
        } => with_trusted_status(error, *status, message),

        ServiceError::Status { code, message } => with_trusted_status(error, Some(*code), message),

        ServiceError::Unclassified { raw } => unclassified(raw.clone()),
    }
}

fn with_trusted_status(
    error: &ServiceError,
    status: Option<u16>,
    message: &Option<String>,
) -> NormalizedError {
    match trusted_status(status) {
        Some(status) => NormalizedError {
            status,
            body: ErrorBody {
                message: message.clone(),
                ..ErrorBody::default()
            },
        },
        None => unclassified(error.to_value()),
    }
}

fn unclassified(raw: Value) -> NormalizedError {
    tracing::error!(exception = %raw, "Unclassified exception normalized to 500");

    NormalizedError {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        body: ErrorBody {
            exception: Some(raw),
            ..ErrorBody::default()
        },
    }
}
