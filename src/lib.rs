//! Service API bootstrap layer.
//!
//! Turns two declarative route tables into a running HTTP service:
//! validated routes get their body checked against a schema before the
//! handler sees it, standard routes get the raw request context, and every
//! failure leaves as a normalized JSON error.

pub mod config;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;
pub mod validation;

pub use config::ServiceConfig;
pub use error::{normalize, ConfigurationError, ServiceError};
pub use http::middleware::{Authenticator, BearerTokenAuth};
pub use http::{Dispatcher, RequestContext};
pub use lifecycle::Shutdown;
pub use routing::{HttpMethod, RouteTable, StandardRoute, ValidatingRoute};
pub use validation::{Issue, Schema, SerdeSchema, ValidationError};
