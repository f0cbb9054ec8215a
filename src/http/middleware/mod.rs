//! Middleware applied around compiled routes.
//!
//! # Data Flow
//! ```text
//! Cross-cutting (every request):
//!     → timing.rs (elapsed time log)
//!     → cors.rs (CORS policy, credentials on)
//!
//! Per route (authenticated routes only):
//!     → auth.rs (Authenticator: proceed or short-circuit)
//! ```

pub mod auth;
pub mod cors;
pub mod timing;

pub use auth::{authenticate, Authenticated, Authenticator, BearerTokenAuth};
pub use cors::cors_layer;
pub use timing::log_timing;
