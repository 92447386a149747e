//! # brrtguard
//!
//! OpenAPI request validation for routers that speak `:name` route templates.
//!
//! A router matches `/count/100/USD` against the route template
//! `/count/:number/:currency`; the API description declares the same path as
//! `/count/{number}/{currency}`. brrtguard bridges the two, caches the result
//! per route template, validates the request against the declared operation,
//! and turns any failure into a `400`, `403` or `500` problem response before
//! the handler runs.
//!
//! ## Architecture
//!
//! - **[`spec`]** - OpenAPI 3.x loading into an [`ApiDescription`] path table
//! - **[`router`]** - radix-tree router over `:name` route templates
//! - **[`resolver`]** - route template to operation group resolution and its cache
//! - **[`engine`]** - the validation engine boundary and the default JSON Schema engine
//! - **[`security`]** - security providers consulted by the engine
//! - **[`middleware`]** - the [`OpenApiValidator`] middleware and request tracing
//! - **[`error`]** - failure taxonomy and status code translation
//! - **[`server`]** - in-process request/response service
//!
//! ## Example
//!
//! ```rust
//! use brrtguard::engine::SchemaEngine;
//! use brrtguard::middleware::{OpenApiValidator, ValidatorConfig};
//! use brrtguard::runtime_config::RuntimeConfig;
//! use brrtguard::server::{Request, Response, Service};
//! use brrtguard::spec::load_api_description_from_str;
//! use http::{Method, StatusCode};
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! let description = Arc::new(load_api_description_from_str(r#"
//! openapi: 3.1.0
//! info: { title: Hello, version: "1.0.0" }
//! paths:
//!   /hello/{name}:
//!     get:
//!       parameters:
//!         - { name: name, in: path, required: true, schema: { type: string } }
//!       responses: { "200": { description: OK } }
//! "#).unwrap());
//!
//! let config = RuntimeConfig::default();
//! let engine = Arc::new(SchemaEngine::new(&description, &config));
//! let validator = OpenApiValidator::new(Arc::clone(&description), engine, ValidatorConfig::new());
//!
//! let mut service = Service::new();
//! service
//!     .route(Method::GET, "/hello/:name", |_req, route| {
//!         Response::ok(json!({ "hello": route.param("name") }))
//!     })
//!     .unwrap();
//! service.add_validator(Arc::new(validator));
//! service.start(&config).unwrap();
//!
//! assert_eq!(service.call(Request::get("/hello/world")).status, StatusCode::OK);
//! // Known template, undeclared method: rejected by the validator
//! assert_eq!(service.call(Request::post("/hello/world")).status, StatusCode::BAD_REQUEST);
//! ```

pub mod cli;
pub mod engine;
pub mod error;
pub mod ids;
pub mod logging;
pub mod middleware;
pub mod resolver;
pub mod router;
pub mod runtime_config;
pub mod security;
pub mod server;
pub mod spec;

pub use engine::{EngineOptions, ValidationEngine, ValidationFailure};
pub use error::{GuardError, HttpError};
pub use middleware::{OpenApiValidator, ValidatorConfig};
pub use resolver::{OperationCache, ResolutionError, Resolver};
pub use spec::{load_api_description, ApiDescription};
