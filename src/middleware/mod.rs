//! # Middleware Module
//!
//! Hooks that run around handlers in [`Service`](crate::server::Service).
//!
//! - [`OpenApiValidator`]: rejects requests that do not conform to the API
//!   description before the handler runs;
//! - [`TracingMiddleware`]: request start/finish events.

mod config;
mod core;
mod tracing;
mod validator;

pub use config::{Skipper, ValidatorConfig};
pub use core::Middleware;
pub use tracing::TracingMiddleware;
pub use validator::OpenApiValidator;
