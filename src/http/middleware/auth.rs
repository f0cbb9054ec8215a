//! Authentication middleware contract.
//!
//! An [`Authenticator`] sees the request and the rest of the chain. It either
//! calls `next.run(request)` to proceed or answers on its own (401/403) and
//! never reaches the route.

use std::future::Future;
use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use futures_util::future::BoxFuture;
use serde_json::json;

/// Pluggable authentication step placed in front of authenticated routes.
pub trait Authenticator: Send + Sync + 'static {
    fn authenticate(&self, request: Request, next: Next) -> BoxFuture<'static, Response>;
}

impl<F, Fut> Authenticator for F
where
    F: Fn(Request, Next) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Response> + Send + 'static,
{
    fn authenticate(&self, request: Request, next: Next) -> BoxFuture<'static, Response> {
        Box::pin(self(request, next))
    }
}

/// Marker inserted into request extensions once a request is authenticated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Authenticated {
    pub scheme: &'static str,
}

/// Accepts requests carrying `Authorization: Bearer <token>`.
#[derive(Clone)]
pub struct BearerTokenAuth {
    token: String,
}

impl BearerTokenAuth {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

impl std::fmt::Debug for BearerTokenAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BearerTokenAuth").finish_non_exhaustive()
    }
}

impl Authenticator for BearerTokenAuth {
    fn authenticate(&self, mut request: Request, next: Next) -> BoxFuture<'static, Response> {
        let authorized = request
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .is_some_and(|token| token == self.token);

        Box::pin(async move {
            if !authorized {
                tracing::debug!(path = %request.uri().path(), "Rejected unauthenticated request");
                return (
                    StatusCode::UNAUTHORIZED,
                    Json(json!({ "message": "Unauthorized" })),
                )
                    .into_response();
            }

            request
                .extensions_mut()
                .insert(Authenticated { scheme: "bearer" });
            next.run(request).await
        })
    }
}

/// Route layer function bridging an [`Authenticator`] into axum.
pub async fn authenticate(
    State(authenticator): State<Arc<dyn Authenticator>>,
    request: Request,
    next: Next,
) -> Response {
    authenticator.authenticate(request, next).await
}
