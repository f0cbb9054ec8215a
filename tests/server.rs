//! End-to-end tests over a real TCP listener.

use std::sync::Arc;
use std::time::Duration;

use axum::http::StatusCode;
use serde_json::{json, Value};
use service_api::http::middleware::Authenticated;
use service_api::{
    BearerTokenAuth, Dispatcher, RequestContext, RouteTable, ServiceConfig, ServiceError,
    StandardRoute, ValidatingRoute,
};

mod common;
use common::spawn_server;

fn tables() -> (RouteTable<ValidatingRoute>, RouteTable<StandardRoute>) {
    let validated = RouteTable::new().route(
        "/echo",
        "POST",
        ValidatingRoute::builder().handler(|payload: Value, _: ()| async move { Ok::<_, ServiceError>(payload) }),
    );

    let standard = RouteTable::new()
        .route(
            "/health",
            "get",
            StandardRoute::new(|_: RequestContext| async {
                Ok::<_, ServiceError>(axum::Json(json!({"status": "ok"})))
            }),
        )
        .route(
            "/me",
            "get",
            StandardRoute::new(|ctx: RequestContext| async move {
                let scheme = ctx
                    .extension::<Authenticated>()
                    .map(|a| a.scheme)
                    .ok_or_else(|| ServiceError::unauthorized("Unauthorized"))?;
                Ok::<_, ServiceError>(axum::Json(json!({"scheme": scheme})))
            })
            .with_authentication(true),
        );

    (validated, standard)
}

fn bootstrap(config: ServiceConfig) -> Dispatcher {
    let (validated, standard) = tables();
    Dispatcher::bootstrap(
        config,
        &validated,
        &standard,
        Some(Arc::new(BearerTokenAuth::new("s3cret"))),
    )
    .unwrap()
}

#[tokio::test]
async fn test_serves_json_over_tcp() {
    let (addr, shutdown) = spawn_server(bootstrap(ServiceConfig::default())).await;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("http://{addr}/echo"))
        .json(&json!({"hello": "world"}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.json::<Value>().await.unwrap(), json!({"hello": "world"}));

    shutdown.trigger();
}

#[tokio::test]
async fn test_request_id_is_generated_and_propagated() {
    let (addr, shutdown) = spawn_server(bootstrap(ServiceConfig::default())).await;
    let client = reqwest::Client::new();

    let res = client
        .get(format!("http://{addr}/health"))
        .send()
        .await
        .unwrap();
    let generated = res
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .unwrap();
    assert!(uuid::Uuid::parse_str(generated).is_ok());

    let res = client
        .get(format!("http://{addr}/health"))
        .header("x-request-id", "trace-me")
        .send()
        .await
        .unwrap();
    assert_eq!(res.headers()["x-request-id"], "trace-me");

    shutdown.trigger();
}

#[tokio::test]
async fn test_cors_mirrors_origin_with_credentials() {
    let (addr, shutdown) = spawn_server(bootstrap(ServiceConfig::default())).await;
    let client = reqwest::Client::new();

    let res = client
        .get(format!("http://{addr}/health"))
        .header("origin", "https://app.example.com")
        .send()
        .await
        .unwrap();
    assert_eq!(
        res.headers()["access-control-allow-origin"],
        "https://app.example.com"
    );
    assert_eq!(res.headers()["access-control-allow-credentials"], "true");

    let preflight = client
        .request(reqwest::Method::OPTIONS, format!("http://{addr}/echo"))
        .header("origin", "https://app.example.com")
        .header("access-control-request-method", "POST")
        .send()
        .await
        .unwrap();
    assert!(preflight.status().is_success());
    assert_eq!(
        preflight.headers()["access-control-allow-origin"],
        "https://app.example.com"
    );

    shutdown.trigger();
}

#[tokio::test]
async fn test_cors_can_be_disabled() {
    let mut config = ServiceConfig::default();
    config.cors.enabled = false;
    let (addr, shutdown) = spawn_server(bootstrap(config)).await;

    let res = reqwest::Client::new()
        .get(format!("http://{addr}/health"))
        .header("origin", "https://app.example.com")
        .send()
        .await
        .unwrap();
    assert!(res.headers().get("access-control-allow-origin").is_none());

    shutdown.trigger();
}

#[tokio::test]
async fn test_bearer_auth() {
    let (addr, shutdown) = spawn_server(bootstrap(ServiceConfig::default())).await;
    let client = reqwest::Client::new();

    let res = client.get(format!("http://{addr}/me")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        res.json::<Value>().await.unwrap(),
        json!({"message": "Unauthorized"})
    );

    let res = client
        .get(format!("http://{addr}/me"))
        .bearer_auth("wrong")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = client
        .get(format!("http://{addr}/me"))
        .bearer_auth("s3cret")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.json::<Value>().await.unwrap(), json!({"scheme": "bearer"}));

    shutdown.trigger();
}

#[tokio::test]
async fn test_shutdown_stops_accepting() {
    let (addr, shutdown) = spawn_server(bootstrap(ServiceConfig::default())).await;
    assert_eq!(shutdown.receiver_count(), 1);

    shutdown.trigger();

    let mut refused = false;
    for _ in 0..50 {
        tokio::time::sleep(Duration::from_millis(20)).await;
        if tokio::net::TcpStream::connect(addr).await.is_err() {
            refused = true;
            break;
        }
    }
    assert!(refused, "listener should close after shutdown");
}
