//! # Server Module
//!
//! An in-process HTTP service: [`Request`] in, [`Response`] out.
//!
//! [`Service`] owns a [`Router`](crate::router::Router), a middleware chain and
//! one handler per registered route. It carries no socket layer; embed it behind
//! any HTTP server, or call it directly from tests and tools.

pub mod request;
pub mod response;
pub mod service;

pub use request::{parse_cookies, parse_query_params, QueryParams, Request};
pub use response::Response;
pub use service::{Handler, Service};
