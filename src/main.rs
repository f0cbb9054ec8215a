//! Service API (v1)
//!
//! Bootstraps a small demo service from two route tables.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ─────────────▶ trace → request id → timing → CORS
//!                         │
//!                         ▼
//!                    axum Router (path + method)
//!                         │
//!                         ▼
//!                    [auth] → body parse → validate → handler
//!                         │
//!                         ▼
//!     Client Response ◀── JSON result or normalized error
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use axum::http::StatusCode;
use clap::Parser;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use service_api::config::{load_config, ServiceConfig};
use service_api::http::middleware::{Authenticated, Authenticator, BearerTokenAuth};
use service_api::observability::init_tracing;
use service_api::{
    Dispatcher, RequestContext, RouteTable, SerdeSchema, ServiceError, StandardRoute,
    ValidatingRoute,
};

#[derive(Parser, Debug)]
#[command(name = "service-api", version, about = "Route dispatch and error normalization service")]
struct Cli {
    /// Path to a TOML config file (defaults are used when omitted)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port to listen on (overrides listener.port)
    #[arg(short, long)]
    port: Option<u16>,
}

#[derive(Debug, Deserialize)]
struct NewUser {
    name: String,
    email: String,
}

#[derive(Debug, Serialize)]
struct User {
    id: String,
    name: String,
    email: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ServiceConfig::default(),
    };

    init_tracing(&config.observability)?;
    tracing::info!("service-api v{} starting", env!("CARGO_PKG_VERSION"));

    let port = cli.port.unwrap_or(config.listener.port);
    tracing::info!(
        host = %config.listener.host,
        port,
        max_body_bytes = config.limits.max_body_bytes,
        cors = config.cors.enabled,
        "Configuration loaded"
    );

    let authenticator = config
        .auth
        .bearer_token
        .clone()
        .map(|token| Arc::new(BearerTokenAuth::new(token)) as Arc<dyn Authenticator>);

    let dispatcher = Dispatcher::bootstrap(
        config,
        &validated_routes(),
        &standard_routes(authenticator.is_some()),
        authenticator,
    )?;

    for route in dispatcher.routes() {
        tracing::info!(
            method = %route.method,
            path = %route.path,
            kind = ?route.kind,
            authenticated = route.authenticated,
            "Route"
        );
    }

    dispatcher.run(port).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

fn validated_routes() -> RouteTable<ValidatingRoute> {
    RouteTable::new()
        .route(
            "/echo",
            "post",
            ValidatingRoute::builder()
                .handler(|payload: Value, _: ()| async move { Ok::<_, ServiceError>(payload) }),
        )
        .route(
            "/users",
            "post",
            ValidatingRoute::builder()
                .schema(SerdeSchema::<NewUser>::new())
                .handler(|user: NewUser, _: ()| async move {
                    if !user.email.contains('@') {
                        return Err(ServiceError::from(json!({
                            "statusCode": 422,
                            "message": "email must contain '@'",
                        })));
                    }
                    Ok(User {
                        id: uuid::Uuid::new_v4().to_string(),
                        name: user.name,
                        email: user.email,
                    })
                }),
        )
}

fn standard_routes(with_auth: bool) -> RouteTable<StandardRoute> {
    let table = RouteTable::new().route(
        "/health",
        "get",
        StandardRoute::new(|_: RequestContext| async {
            Ok::<_, ServiceError>(axum::Json(json!({ "status": "ok" })))
        }),
    );

    if !with_auth {
        return table;
    }

    table.route(
        "/me",
        "get",
        StandardRoute::new(|ctx: RequestContext| async move {
            let scheme = ctx
                .extension::<Authenticated>()
                .map(|a| a.scheme)
                .ok_or_else(|| ServiceError::unauthorized("Unauthorized"))?;
            Ok::<_, ServiceError>((StatusCode::OK, axum::Json(json!({ "scheme": scheme }))))
        })
        .with_authentication(true),
    )
}
