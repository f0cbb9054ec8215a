//! Route compilation: tables → axum router.
//!
//! # Responsibilities
//! - Check every method token and path before anything is registered
//! - Reject a `(path, method)` pair declared twice, in one table or across both
//! - Reject paths whose captures clash with another route's
//! - Wrap each entry in the core handler (context → endpoint → normalizer)
//! - Put the authenticator in front of authenticated routes
//!
//! # Design Decisions
//! - One compile function for both entry shapes
//! - Compilation is all-or-nothing: an error leaves no half-built router
//! - Nothing that reaches the core handler escapes as a panic or raw error

use std::collections::{HashMap, HashSet};
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use axum::{
    extract::Request,
    middleware::from_fn_with_state,
    response::{IntoResponse, Response},
    routing::{on, MethodRouter},
    Router,
};
use futures_util::FutureExt;

use crate::error::{normalize, ConfigurationError, ServiceError};
use crate::http::middleware::{authenticate, Authenticator};
use crate::http::RequestContext;
use crate::routing::method::HttpMethod;
use crate::routing::route::{Endpoint, RouteEntry, RouteKind, StandardRoute, ValidatingRoute};
use crate::routing::table::RouteTable;

/// Description of one registered route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledRoute {
    pub path: String,
    pub method: HttpMethod,
    pub kind: RouteKind,
    pub authenticated: bool,
}

/// Output of compilation: the router and what was registered on it.
#[derive(Debug)]
pub struct CompiledRoutes {
    pub router: Router,
    pub routes: Vec<CompiledRoute>,
}

/// Compiles route tables into a router.
#[derive(Clone)]
pub struct RouteCompiler {
    authenticator: Option<Arc<dyn Authenticator>>,
    body_limit: usize,
}

impl RouteCompiler {
    pub fn new(body_limit: usize) -> Self {
        Self {
            authenticator: None,
            body_limit,
        }
    }

    pub fn with_authenticator(mut self, authenticator: Arc<dyn Authenticator>) -> Self {
        self.authenticator = Some(authenticator);
        self
    }

    /// Compile both tables. Fails before registering anything if either is malformed.
    pub fn compile(
        &self,
        validated: &RouteTable<ValidatingRoute>,
        standard: &RouteTable<StandardRoute>,
    ) -> Result<CompiledRoutes, ConfigurationError> {
        let entries = validated
            .iter()
            .map(|(path, method, route)| (path, method, RouteEntry::from(route.clone())))
            .chain(
                standard
                    .iter()
                    .map(|(path, method, route)| (path, method, RouteEntry::from(route.clone()))),
            );

        let mut seen = HashSet::new();
        let mut checked = Vec::new();
        for (path, token, entry) in entries {
            check_path(path)?;

            let method = token
                .parse::<HttpMethod>()
                .map_err(|_| ConfigurationError::UnknownMethod {
                    path: path.to_string(),
                    method: token.to_string(),
                })?;

            if !seen.insert((path, method)) {
                return Err(ConfigurationError::DuplicateRoute {
                    path: path.to_string(),
                    method,
                });
            }

            if entry.authenticated() && self.authenticator.is_none() {
                return Err(ConfigurationError::MissingAuthenticator {
                    path: path.to_string(),
                    method,
                });
            }

            checked.push((path, method, entry));
        }

        check_conflicts(checked.iter().map(|(path, _, _)| *path))?;

        let mut router = Router::new();
        let mut routes = Vec::with_capacity(checked.len());
        for (path, method, entry) in checked {
            router = router.route(path, self.compile_entry(method, &entry));

            tracing::debug!(%method, path, kind = ?entry.kind(), authenticated = entry.authenticated(), "Registered route");
            routes.push(CompiledRoute {
                path: path.to_string(),
                method,
                kind: entry.kind(),
                authenticated: entry.authenticated(),
            });
        }

        Ok(CompiledRoutes { router, routes })
    }

    /// Build the method router for a single entry.
    fn compile_entry(&self, method: HttpMethod, entry: &RouteEntry) -> MethodRouter {
        let endpoint = entry.endpoint();
        let body_limit = self.body_limit;

        let core = move |request: Request| {
            let endpoint = endpoint.clone();
            async move { dispatch(endpoint, request, body_limit).await }
        };

        let method_router = on(method.filter(), core);

        match (&self.authenticator, entry.authenticated()) {
            (Some(authenticator), true) => {
                method_router.route_layer(from_fn_with_state(authenticator.clone(), authenticate))
            }
            _ => method_router,
        }
    }
}

impl std::fmt::Debug for RouteCompiler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouteCompiler")
            .field("authenticator", &self.authenticator.is_some())
            .field("body_limit", &self.body_limit)
            .finish()
    }
}

/// Core handler shared by every compiled route.
async fn dispatch(endpoint: Arc<dyn Endpoint>, request: Request, body_limit: usize) -> Response {
    let outcome = AssertUnwindSafe(async move {
        let ctx = RequestContext::from_request(request, body_limit).await?;
        endpoint.call(ctx).await
    })
    .catch_unwind()
    .await;

    match outcome {
        Ok(Ok(response)) => response,
        Ok(Err(error)) => normalize(&error).into_response(),
        Err(panic) => normalize(&ServiceError::from_panic(panic)).into_response(),
    }
}

/// Reject paths axum would refuse to register.
fn check_path(path: &str) -> Result<(), ConfigurationError> {
    let invalid = |reason| ConfigurationError::InvalidPath {
        path: path.to_string(),
        reason,
    };

    if !path.starts_with('/') {
        return Err(invalid("must start with '/'"));
    }

    let segments: Vec<&str> = path.split('/').skip(1).collect();
    let mut names = HashSet::new();
    for (position, segment) in segments.iter().enumerate() {
        if segment.starts_with(':') || segment.starts_with('*') {
            return Err(invalid("captures must use the {name} syntax"));
        }
        if !segment.contains(['{', '}']) {
            continue;
        }

        let capture = segment
            .strip_prefix('{')
            .and_then(|rest| rest.strip_suffix('}'))
            .ok_or_else(|| invalid("captures must span a whole segment"))?;
        let (name, catch_all) = match capture.strip_prefix('*') {
            Some(name) => (name, true),
            None => (capture, false),
        };

        if name.is_empty() || name.contains(['{', '}', '*']) {
            return Err(invalid("capture names must be non-empty identifiers"));
        }
        if catch_all && position + 1 != segments.len() {
            return Err(invalid("a catch-all capture must be the last segment"));
        }
        if !names.insert(name) {
            return Err(invalid("capture name used twice"));
        }
    }
    Ok(())
}

/// Captures behind the same static prefix must be spelled identically,
/// otherwise the path matcher cannot tell them apart.
fn check_conflicts<'a>(paths: impl IntoIterator<Item = &'a str>) -> Result<(), ConfigurationError> {
    let mut captures: HashMap<String, (&str, &str)> = HashMap::new();

    for path in paths {
        let mut prefix = String::new();
        for segment in path.split('/').skip(1) {
            if !segment.starts_with('{') {
                prefix.push('/');
                prefix.push_str(segment);
                continue;
            }

            match captures.get(&prefix) {
                Some((existing_segment, existing)) if *existing_segment != segment => {
                    return Err(ConfigurationError::ConflictingPath {
                        path: path.to_string(),
                        existing: existing.to_string(),
                    });
                }
                Some(_) => {}
                None => {
                    captures.insert(prefix.clone(), (segment, path));
                }
            }
            prefix.push_str("/{}");
        }
    }
    Ok(())
}
