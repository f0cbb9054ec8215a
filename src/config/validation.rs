//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (body limit > 0, host set)
//! - Check origins and log filters parse
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ServiceConfig → Result<(), Vec<ConfigIssue>>
//! - Runs before config is accepted into the system

use axum::http::HeaderValue;
use tracing_subscriber::EnvFilter;

use crate::config::schema::ServiceConfig;

/// One semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{field}: {message}")]
pub struct ConfigIssue {
    pub field: &'static str,
    pub message: String,
}

impl ConfigIssue {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

pub fn validate_config(config: &ServiceConfig) -> Result<(), Vec<ConfigIssue>> {
    let mut issues = Vec::new();

    if config.listener.host.trim().is_empty() {
        issues.push(ConfigIssue::new("listener.host", "must not be empty"));
    }

    if config.limits.max_body_bytes == 0 {
        issues.push(ConfigIssue::new(
            "limits.max_body_bytes",
            "must be greater than zero",
        ));
    }

    for origin in &config.cors.allowed_origins {
        if origin == "*" && config.cors.allow_credentials {
            issues.push(ConfigIssue::new(
                "cors.allowed_origins",
                "\"*\" cannot be combined with allow_credentials",
            ));
        } else if HeaderValue::from_str(origin).is_err() {
            issues.push(ConfigIssue::new(
                "cors.allowed_origins",
                format!("invalid origin {origin:?}"),
            ));
        }
    }

    if let Err(e) = EnvFilter::try_new(&config.observability.log_level) {
        issues.push(ConfigIssue::new("observability.log_level", e.to_string()));
    }

    if config.auth.bearer_token.as_deref().is_some_and(|t| t.trim().is_empty()) {
        issues.push(ConfigIssue::new("auth.bearer_token", "must not be empty when set"));
    }

    if issues.is_empty() {
        Ok(())
    } else {
        Err(issues)
    }
}
