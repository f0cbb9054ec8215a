//! Route entries: the two handler shapes a table can hold.
//!
//! # Responsibilities
//! - Resolve payload, argument and result types when a route is built
//! - Erase them behind [`Endpoint`] so both shapes compile the same way
//!
//! # Design Decisions
//! - Validating routes return a value that becomes the JSON body
//! - Standard routes own their whole response
//! - Handler errors only need `Into<ServiceError>`

use std::fmt;
use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;

use axum::{
    response::{IntoResponse, Response},
    Json,
};
use futures_util::future::BoxFuture;
use serde::{de::DeserializeOwned, Serialize};

use crate::error::ServiceError;
use crate::http::RequestContext;
use crate::validation::{validate, Schema, Unchecked};

/// Type-erased route body invoked by the core handler.
pub trait Endpoint: Send + Sync + 'static {
    fn call(self: Arc<Self>, ctx: RequestContext) -> BoxFuture<'static, Result<Response, ServiceError>>;
}

/// Which table a route came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RouteKind {
    Validating,
    Standard,
}

/// Route whose payload is validated before the handler runs.
#[derive(Clone)]
pub struct ValidatingRoute {
    endpoint: Arc<dyn Endpoint>,
    authenticated: bool,
}

impl ValidatingRoute {
    /// Start building a route: no schema, no arguments, unauthenticated.
    pub fn builder() -> ValidatingRouteBuilder<Unchecked, fn(&RequestContext)> {
        ValidatingRouteBuilder {
            schema: None,
            args: no_args,
            authenticated: false,
        }
    }

    pub fn authenticated(&self) -> bool {
        self.authenticated
    }

    pub(crate) fn endpoint(&self) -> Arc<dyn Endpoint> {
        self.endpoint.clone()
    }
}

impl fmt::Debug for ValidatingRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidatingRoute")
            .field("authenticated", &self.authenticated)
            .finish_non_exhaustive()
    }
}

fn no_args(_: &RequestContext) {}

/// Builder for [`ValidatingRoute`]; `S` is the schema, `X` the argument extractor.
pub struct ValidatingRouteBuilder<S, X> {
    schema: Option<S>,
    args: X,
    authenticated: bool,
}

impl<S, X> ValidatingRouteBuilder<S, X> {
    /// Validate payloads with `schema`; the handler receives its output.
    pub fn schema<S2: Schema>(self, schema: S2) -> ValidatingRouteBuilder<S2, X> {
        ValidatingRouteBuilder {
            schema: Some(schema),
            args: self.args,
            authenticated: self.authenticated,
        }
    }

    /// Extract auxiliary arguments (path or query params, headers) per request.
    pub fn args<X2, A>(self, args: X2) -> ValidatingRouteBuilder<S, X2>
    where
        X2: Fn(&RequestContext) -> A + Send + Sync + 'static,
    {
        ValidatingRouteBuilder {
            schema: self.schema,
            args,
            authenticated: self.authenticated,
        }
    }

    pub fn authenticated(mut self, authenticated: bool) -> Self {
        self.authenticated = authenticated;
        self
    }

    /// Finish the route with its handler.
    pub fn handler<H, A, Fut, R, E>(self, handler: H) -> ValidatingRoute
    where
        S: Schema,
        S::Output: DeserializeOwned,
        X: Fn(&RequestContext) -> A + Send + Sync + 'static,
        A: Send + 'static,
        H: Fn(S::Output, A) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<R, E>> + Send + 'static,
        R: Serialize + Send + 'static,
        E: Into<ServiceError> + Send + 'static,
    {
        ValidatingRoute {
            endpoint: Arc::new(ValidatingEndpoint {
                schema: self.schema,
                args: self.args,
                handler,
                _marker: PhantomData::<fn() -> (A, Fut, R, E)>,
            }),
            authenticated: self.authenticated,
        }
    }
}

struct ValidatingEndpoint<S, X, H, M> {
    schema: Option<S>,
    args: X,
    handler: H,
    _marker: PhantomData<fn() -> M>,
}

impl<S, X, H, A, Fut, R, E> Endpoint for ValidatingEndpoint<S, X, H, (A, Fut, R, E)>
where
    S: Schema,
    S::Output: DeserializeOwned,
    X: Fn(&RequestContext) -> A + Send + Sync + 'static,
    A: Send + 'static,
    H: Fn(S::Output, A) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<R, E>> + Send + 'static,
    R: Serialize + Send + 'static,
    E: Into<ServiceError> + Send + 'static,
{
    fn call(self: Arc<Self>, mut ctx: RequestContext) -> BoxFuture<'static, Result<Response, ServiceError>> {
        Box::pin(async move {
            let payload = validate(self.schema.as_ref(), ctx.take_body())?;
            let args = (self.args)(&ctx);
            let result = (self.handler)(payload, args).await.map_err(Into::into)?;
            Ok(Json(result).into_response())
        })
    }
}

/// Route whose handler receives the raw request context and builds the response.
#[derive(Clone)]
pub struct StandardRoute {
    endpoint: Arc<dyn Endpoint>,
    authenticated: bool,
}

impl StandardRoute {
    pub fn new<H, Fut, R, E>(handler: H) -> Self
    where
        H: Fn(RequestContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<R, E>> + Send + 'static,
        R: IntoResponse + 'static,
        E: Into<ServiceError> + 'static,
    {
        Self {
            endpoint: Arc::new(StandardEndpoint {
                handler,
                _marker: PhantomData::<fn() -> (Fut, R, E)>,
            }),
            authenticated: false,
        }
    }

    pub fn with_authentication(mut self, authenticated: bool) -> Self {
        self.authenticated = authenticated;
        self
    }

    pub fn authenticated(&self) -> bool {
        self.authenticated
    }

    pub(crate) fn endpoint(&self) -> Arc<dyn Endpoint> {
        self.endpoint.clone()
    }
}

impl fmt::Debug for StandardRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StandardRoute")
            .field("authenticated", &self.authenticated)
            .finish_non_exhaustive()
    }
}

struct StandardEndpoint<H, M> {
    handler: H,
    _marker: PhantomData<fn() -> M>,
}

impl<H, Fut, R, E> Endpoint for StandardEndpoint<H, (Fut, R, E)>
where
    H: Fn(RequestContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<R, E>> + Send + 'static,
    R: IntoResponse + 'static,
    E: Into<ServiceError> + 'static,
{
    fn call(self: Arc<Self>, ctx: RequestContext) -> BoxFuture<'static, Result<Response, ServiceError>> {
        let fut = (self.handler)(ctx);
        Box::pin(async move {
            fut.await
                .map(IntoResponse::into_response)
                .map_err(Into::into)
        })
    }
}

/// A table entry of either shape, as seen by the compiler.
#[derive(Debug, Clone)]
pub enum RouteEntry {
    Validating(ValidatingRoute),
    Standard(StandardRoute),
}

impl RouteEntry {
    pub fn kind(&self) -> RouteKind {
        match self {
            RouteEntry::Validating(_) => RouteKind::Validating,
            RouteEntry::Standard(_) => RouteKind::Standard,
        }
    }

    pub fn authenticated(&self) -> bool {
        match self {
            RouteEntry::Validating(route) => route.authenticated(),
            RouteEntry::Standard(route) => route.authenticated(),
        }
    }

    pub(crate) fn endpoint(&self) -> Arc<dyn Endpoint> {
        match self {
            RouteEntry::Validating(route) => route.endpoint(),
            RouteEntry::Standard(route) => route.endpoint(),
        }
    }
}

impl From<ValidatingRoute> for RouteEntry {
    fn from(route: ValidatingRoute) -> Self {
        RouteEntry::Validating(route)
    }
}

impl From<StandardRoute> for RouteEntry {
    fn from(route: StandardRoute) -> Self {
        RouteEntry::Standard(route)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::SerdeSchema;
    use axum::body::to_bytes;
    use axum::http::StatusCode;
    use serde::Deserialize;
    use serde_json::{json, Value};
    use std::sync::atomic::{AtomicBool, Ordering};

    #[derive(Debug, Deserialize)]
    struct Greeting {
        name: String,
    }

    async fn body_json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn context(body: &'static str) -> RequestContext {
        let request = axum::http::Request::builder()
            .uri("/greet?times=2")
            .body(axum::body::Body::from(body))
            .unwrap();
        RequestContext::from_request(request, 1024).await.unwrap()
    }

    #[tokio::test]
    async fn test_validating_route_invokes_handler_with_typed_payload() {
        let route = ValidatingRoute::builder()
            .schema(SerdeSchema::<Greeting>::new())
            .args(|ctx: &RequestContext| ctx.query("times").map(str::to_string))
            .handler(|greeting: Greeting, times: Option<String>| async move {
                Ok::<_, ServiceError>(json!({"hello": greeting.name, "times": times}))
            });

        let response = route.endpoint().call(context(r#"{"name":"a"}"#).await).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, json!({"hello": "a", "times": "2"}));
    }

    #[tokio::test]
    async fn test_validating_route_rejects_before_handler() {
        let called = Arc::new(AtomicBool::new(false));
        let flag = called.clone();
        let route = ValidatingRoute::builder()
            .schema(SerdeSchema::<Greeting>::new())
            .handler(move |_: Greeting, _: ()| {
                flag.store(true, Ordering::SeqCst);
                async move { Ok::<_, ServiceError>(Value::Null) }
            });

        let err = route.endpoint().call(context("{}").await).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation { .. }));
        assert!(!called.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_route_without_schema_receives_raw_payload() {
        let route = ValidatingRoute::builder().handler(|payload: Value, _: ()| async move {
            Ok::<_, ServiceError>(payload)
        });

        let response = route.endpoint().call(context(r#"{"free":"form"}"#).await).await.unwrap();
        assert_eq!(body_json(response).await, json!({"free": "form"}));
    }

    #[tokio::test]
    async fn test_standard_route_owns_response() {
        let route = StandardRoute::new(|ctx: RequestContext| async move {
            Ok::<_, ServiceError>((StatusCode::ACCEPTED, ctx.path().to_string()))
        })
        .with_authentication(true);

        assert!(route.authenticated());
        let response = route.endpoint().call(context("").await).await.unwrap();
        assert_eq!(response.status(), StatusCode::ACCEPTED);
    }

    #[test]
    fn test_entry_kind_and_authentication() {
        let validating: RouteEntry = ValidatingRoute::builder()
            .authenticated(true)
            .handler(|p: Value, _: ()| async move { Ok::<_, ServiceError>(p) })
            .into();
        assert_eq!(validating.kind(), RouteKind::Validating);
        assert!(validating.authenticated());

        let standard: RouteEntry =
            StandardRoute::new(|_: RequestContext| async { Ok::<_, ServiceError>(StatusCode::NO_CONTENT) }).into();
        assert_eq!(standard.kind(), RouteKind::Standard);
        assert!(!standard.authenticated());
    }
}
