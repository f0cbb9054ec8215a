//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Compile route tables into an Axum Router
//! - Wire up cross-cutting middleware (trace, request ID, timing log, CORS)
//! - JSON fallbacks for unknown paths and methods
//! - Bind to a port and serve until shutdown

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{middleware, Router};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::trace::TraceLayer;

use crate::config::ServiceConfig;
use crate::error::{ConfigurationError, ServiceError};
use crate::http::middleware::{cors_layer, log_timing, Authenticator};
use crate::http::request::{propagate_request_id_layer, set_request_id_layer};
use crate::lifecycle::Shutdown;
use crate::routing::{CompiledRoute, RouteCompiler, RouteTable, StandardRoute, ValidatingRoute};

/// A compiled, ready-to-serve set of routes.
///
/// Owned by the caller; nothing about it is global.
#[derive(Debug)]
pub struct Dispatcher {
    router: Router,
    routes: Vec<CompiledRoute>,
    config: ServiceConfig,
}

impl Dispatcher {
    /// Compile both route tables and install the cross-cutting middleware.
    ///
    /// Fails without binding anything if a table is malformed.
    pub fn bootstrap(
        config: ServiceConfig,
        validated: &RouteTable<ValidatingRoute>,
        standard: &RouteTable<StandardRoute>,
        authenticator: Option<Arc<dyn Authenticator>>,
    ) -> Result<Self, ConfigurationError> {
        let mut compiler = RouteCompiler::new(config.limits.max_body_bytes);
        if let Some(authenticator) = authenticator {
            compiler = compiler.with_authenticator(authenticator);
        }

        let compiled = compiler.compile(validated, standard)?;
        tracing::info!(routes = compiled.routes.len(), "Route tables compiled");

        let router = Self::build_router(&config, compiled.router);
        Ok(Self {
            router,
            routes: compiled.routes,
            config,
        })
    }

    /// Layer the compiled routes. Later layers wrap earlier ones.
    fn build_router(config: &ServiceConfig, routes: Router) -> Router {
        let mut router = routes
            .fallback(|| async { ServiceError::not_found("Not Found") })
            .method_not_allowed_fallback(|| async {
                ServiceError::status(405, "Method Not Allowed")
            });

        if config.cors.enabled {
            router = router.layer(cors_layer(&config.cors));
        }

        router
            .layer(middleware::from_fn(log_timing))
            .layer(propagate_request_id_layer())
            .layer(set_request_id_layer())
            .layer(TraceLayer::new_for_http())
    }

    /// Routes registered on this dispatcher.
    pub fn routes(&self) -> &[CompiledRoute] {
        &self.routes
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// The fully layered router, e.g. for in-process testing.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn into_router(self) -> Router {
        self.router
    }

    /// Bind `host:port` from the listener config and serve until SIGINT/SIGTERM.
    pub async fn run(self, port: u16) -> Result<(), std::io::Error> {
        let listener = TcpListener::bind((self.config.listener.host.as_str(), port)).await?;

        let shutdown = Shutdown::new();
        let receiver = shutdown.subscribe();
        shutdown.trigger_on_signal();

        self.serve(listener, receiver).await
    }

    /// Serve on an already bound listener until `shutdown` fires.
    pub async fn serve(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, routes = self.routes.len(), "Service API - Started");

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}
