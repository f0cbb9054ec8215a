//! Observability subsystem.
//!
//! Everything is emitted through `tracing`:
//! - `TraceLayer` spans per HTTP request
//! - one timing line per request, tagged with the request ID
//! - an error event for every exception normalized to 500
//!
//! This module only installs the subscriber.

pub mod logging;

pub use logging::init_tracing;
