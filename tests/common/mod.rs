//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    response::Response,
    Router,
};
use serde_json::Value;
use service_api::{
    Authenticator, Dispatcher, RouteTable, ServiceConfig, Shutdown, StandardRoute,
    ValidatingRoute,
};
use tokio::net::TcpListener;
use tower::ServiceExt;

/// Bootstrap a dispatcher with default config, panicking on table errors.
pub fn dispatcher(
    validated: RouteTable<ValidatingRoute>,
    standard: RouteTable<StandardRoute>,
    authenticator: Option<Arc<dyn Authenticator>>,
) -> Dispatcher {
    Dispatcher::bootstrap(ServiceConfig::default(), &validated, &standard, authenticator)
        .expect("route tables should compile")
}

/// Build a JSON request.
pub fn json_request(method: &str, uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Build a request without a body.
pub fn empty_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

/// Send one request through the router in-process.
pub async fn send(router: Router, request: Request<Body>) -> Response {
    router.oneshot(request).await.unwrap()
}

/// Status and parsed JSON body of a response.
pub async fn status_and_json(response: Response) -> (StatusCode, Value) {
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

/// Serve a dispatcher on an ephemeral local port.
///
/// Returns the bound address and the shutdown handle; triggering it stops the server.
pub async fn spawn_server(dispatcher: Dispatcher) -> (SocketAddr, Shutdown) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let receiver = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = dispatcher.serve(listener, receiver).await;
    });

    (addr, shutdown)
}
