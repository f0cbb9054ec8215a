//! Per-request context handed to route handlers.
//!
//! # Responsibilities
//! - Capture method, URI, headers, path and query parameters
//! - Parse the request body into JSON (body-parser semantics)
//! - Carry request extensions set by earlier middleware (authentication)
//!
//! # Design Decisions
//! - One context per request, owned exclusively by that request
//! - An empty body, or one of a type we do not parse, becomes `{}`
//! - The raw bytes are kept for handlers that read other media types
//! - The body is read with a hard size limit; overflow is a 413

use std::collections::HashMap;

use axum::{
    body::{to_bytes, Body, Bytes},
    extract::{Path, Request},
    http::{header, Extensions, HeaderMap, Method, Uri},
    RequestPartsExt,
};
use http_body_util::LengthLimitError;
use serde_json::{Map, Value};

use crate::error::ServiceError;

/// Owned view of an incoming request.
#[derive(Debug, Default)]
pub struct RequestContext {
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    params: HashMap<String, String>,
    query: HashMap<String, String>,
    body: Value,
    raw_body: Bytes,
    extensions: Extensions,
}

impl RequestContext {
    /// Build a context from a matched request, reading at most `body_limit` bytes.
    pub async fn from_request(request: Request, body_limit: usize) -> Result<Self, ServiceError> {
        let (mut parts, body) = request.into_parts();

        let params = parts
            .extract::<Path<HashMap<String, String>>>()
            .await
            .map(|Path(params)| params)
            .unwrap_or_default();

        let query = parts
            .uri
            .query()
            .map(|q| url::form_urlencoded::parse(q.as_bytes()).into_owned().collect())
            .unwrap_or_default();

        let content_type = parts
            .headers
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_ascii_lowercase);

        let raw_body = read_body(body, body_limit).await?;
        let body = parse_body(&raw_body, content_type.as_deref())?;

        Ok(Self {
            method: parts.method,
            uri: parts.uri,
            headers: parts.headers,
            params,
            query,
            body,
            raw_body,
            extensions: parts.extensions,
        })
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    pub fn path(&self) -> &str {
        self.uri.path()
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Header value as a string, if present and valid UTF-8.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Path capture, e.g. `id` for a route registered as `/users/{id}`.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    pub fn params(&self) -> &HashMap<String, String> {
        &self.params
    }

    pub fn query(&self, name: &str) -> Option<&str> {
        self.query.get(name).map(String::as_str)
    }

    pub fn query_params(&self) -> &HashMap<String, String> {
        &self.query
    }

    pub fn body(&self) -> &Value {
        &self.body
    }

    /// Move the parsed body out, leaving `null` behind.
    pub fn take_body(&mut self) -> Value {
        std::mem::take(&mut self.body)
    }

    /// Body bytes exactly as received, whatever the content type.
    pub fn raw_body(&self) -> &Bytes {
        &self.raw_body
    }

    pub fn extensions(&self) -> &Extensions {
        &self.extensions
    }

    /// Typed extension inserted by middleware.
    pub fn extension<T: Clone + Send + Sync + 'static>(&self) -> Option<&T> {
        self.extensions.get::<T>()
    }
}

async fn read_body(body: Body, limit: usize) -> Result<Bytes, ServiceError> {
    to_bytes(body, limit).await.map_err(|e| {
        let inner = e.into_inner();
        if inner.downcast_ref::<LengthLimitError>().is_some() {
            ServiceError::status(413, "Payload Too Large")
        } else {
            tracing::debug!(error = %inner, "Failed to read request body");
            ServiceError::bad_request("Failed to read request body")
        }
    })
}

/// Parse the body the way the content type asks for.
fn parse_body(bytes: &Bytes, content_type: Option<&str>) -> Result<Value, ServiceError> {
    if bytes.is_empty() {
        return Ok(Value::Object(Map::new()));
    }

    match content_type {
        None => parse_json(&bytes),
        Some(ct) if ct.starts_with("application/json") || ct.contains("+json") => parse_json(&bytes),
        Some(ct) if ct.starts_with("application/x-www-form-urlencoded") => Ok(Value::Object(
            url::form_urlencoded::parse(&bytes)
                .into_owned()
                .map(|(k, v)| (k, Value::String(v)))
                .collect(),
        )),
        Some(ct) if ct.starts_with("text/") => Ok(Value::String(
            String::from_utf8_lossy(&bytes).into_owned(),
        )),
        Some(_) => Ok(Value::Object(Map::new())),
    }
}

fn parse_json(bytes: &[u8]) -> Result<Value, ServiceError> {
    serde_json::from_slice(bytes).map_err(|e| {
        tracing::debug!(error = %e, "Rejected malformed JSON body");
        ServiceError::bad_request("Invalid JSON body")
    })
}
