//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Route Compilation (at startup):
//!     RouteTable<ValidatingRoute> + RouteTable<StandardRoute>
//!     → method.rs (parse method tokens)
//!     → compiler.rs (check paths, reject duplicates, attach auth)
//!     → Freeze as immutable axum Router
//!
//! Per request (validated routes):
//!     body → schema → args → handler → JSON 200
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - Both route shapes share one core handler and one error backstop
//! - Handlers are type-erased behind `Endpoint` once built

pub mod compiler;
pub mod method;
pub mod route;
pub mod table;

pub use compiler::{CompiledRoute, CompiledRoutes, RouteCompiler};
pub use method::{HttpMethod, UnknownMethod};
pub use route::{
    Endpoint, RouteEntry, RouteKind, StandardRoute, ValidatingRoute, ValidatingRouteBuilder,
};
pub use table::RouteTable;
