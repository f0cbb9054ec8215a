//! Process lifecycle.
//!
//! # Data Flow
//! ```text
//! Dispatcher::run:
//!     bind host:port → Shutdown::trigger_on_signal → serve
//!
//! signals.rs:
//!     SIGINT / SIGTERM → resolves shutdown_signal()
//!
//! shutdown.rs:
//!     trigger → every serving Dispatcher stops accepting and drains
//! ```
//!
//! Route tables are compiled before any of this; a bad table never binds a port.

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
pub use signals::shutdown_signal;
