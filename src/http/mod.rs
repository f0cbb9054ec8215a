//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware stack, fallbacks)
//!     → request.rs (request ID assigned and echoed)
//!     → middleware/ (timing, CORS, per-route auth)
//!     → context.rs (parse body, collect params and query)
//!     → routing layer (endpoint call, error normalization)
//!     → Send to client
//! ```

pub mod context;
pub mod middleware;
pub mod request;
pub mod server;

pub use context::RequestContext;
pub use request::X_REQUEST_ID;
pub use server::Dispatcher;
