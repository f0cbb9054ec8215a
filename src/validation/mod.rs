//! Payload validation subsystem.
//!
//! # Data Flow
//! ```text
//! Raw request body (serde_json::Value)
//!     → adapter.rs (validate: schema present? parse : re-type)
//!     → schema.rs (Schema::parse contract, Issue records)
//!     → Typed payload handed to the route handler
//!       or ServiceError::Validation back to the core handler
//! ```
//!
//! # Design Decisions
//! - Validation never catches its own failure; the core handler is the
//!   only place errors are turned into responses
//! - Issues are ordered and carry a path of keys/indices

pub mod adapter;
pub mod schema;

pub use adapter::validate;
pub use schema::{Issue, PathSegment, Schema, SerdeSchema, Unchecked, ValidationError};
