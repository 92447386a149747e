//! # Engine Module
//!
//! The validation engine boundary and its default implementation.
//!
//! The [`OpenApiValidator`](crate::middleware::OpenApiValidator) reaches the
//! engine only through [`ValidationEngine::validate`], handing it a
//! [`RequestValidationInput`]: the live request, the path parameters bound by
//! the router, and the declared operation selected for the request method.
//! The engine answers with a closed [`ValidationFailure`] the error
//! translator maps to a status code.
//!
//! [`SchemaEngine`] is the default engine. It decodes every declared
//! parameter with a [`ParamDecoder`], checks it against the parameter schema,
//! checks the JSON body against the request body schema, and evaluates the
//! operation's security requirements through registered
//! [`SecurityProvider`](crate::security::SecurityProvider)s.

mod decoder;
mod schema;
mod validator_cache;

pub use decoder::{is_exploded_array, DefaultParamDecoder, ParamDecoder};
pub use schema::SchemaEngine;
pub use validator_cache::ValidatorCache;

use crate::server::{QueryParams, Request};
use crate::spec::{ApiDescription, OperationGroup, OperationMeta, ParameterLocation};
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

/// Switches for one validation call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngineOptions {
    /// Skip the request body check
    pub exclude_request_body: bool,
    /// Skip security requirement evaluation
    pub exclude_security: bool,
    /// Report every failing parameter instead of stopping at the first
    pub multi_error: bool,
}

/// Everything the engine needs for one request.
pub struct RequestValidationInput<'a> {
    pub request: &'a Request,
    /// Router-bound path parameters, one entry per binding
    pub path_params: HashMap<&'a str, &'a str>,
    /// Every value of each query parameter
    pub query_params: &'a QueryParams,
    pub group: &'a OperationGroup,
    pub operation: &'a OperationMeta,
    pub options: EngineOptions,
    pub decoder: &'a dyn ParamDecoder,
}

impl fmt::Debug for RequestValidationInput<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestValidationInput")
            .field("method", &self.request.method)
            .field("path", &self.request.path)
            .field("api_path", &self.group.path)
            .field("operation_id", &self.operation.operation_id)
            .field("path_params", &self.path_params)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

/// Decides whether a request conforms to its declared operation.
pub trait ValidationEngine: Send + Sync {
    /// # Errors
    ///
    /// A [`ValidationFailure`] describing the first violation found, or every
    /// parameter violation when [`EngineOptions::multi_error`] is set.
    fn validate(&self, input: &RequestValidationInput<'_>) -> Result<(), ValidationFailure>;

    /// Startup hook run by eager initialization. Returns how many schemas were prepared.
    fn warm_up(&self, _description: &ApiDescription) -> usize {
        0
    }
}

/// Where in the request a failing value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureLocation {
    Path,
    Query,
    Header,
    Cookie,
    Body,
}

impl From<ParameterLocation> for FailureLocation {
    fn from(location: ParameterLocation) -> Self {
        match location {
            ParameterLocation::Path => FailureLocation::Path,
            ParameterLocation::Query => FailureLocation::Query,
            ParameterLocation::Header => FailureLocation::Header,
            ParameterLocation::Cookie => FailureLocation::Cookie,
        }
    }
}

impl fmt::Display for FailureLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FailureLocation::Path => "path",
            FailureLocation::Query => "query",
            FailureLocation::Header => "header",
            FailureLocation::Cookie => "cookie",
            FailureLocation::Body => "body",
        })
    }
}

/// Closed set of engine outcomes other than success.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationFailure {
    /// A raw value could not be decoded into its declared type.
    #[error("parameter \"{name}\" in {location} has an invalid value \"{value}\": {reason}")]
    Parse {
        name: String,
        location: FailureLocation,
        value: String,
        reason: String,
    },
    /// A decoded value, or the request body, violates its schema.
    #[error("parameter \"{name}\" in {location} has an invalid value \"{value}\": {reason}")]
    Schema {
        name: String,
        location: FailureLocation,
        value: String,
        reason: String,
    },
    /// Parameter failures collected under [`EngineOptions::multi_error`].
    #[error("{}", join_failures(.0))]
    Multiple(Vec<ValidationFailure>),
    /// No security requirement alternative was satisfied.
    #[error("security requirements failed: {reason}")]
    Security { reason: String },
    /// Anything the engine could not classify, including engine faults.
    #[error("{0}")]
    Unclassified(String),
}

fn join_failures(failures: &[ValidationFailure]) -> String {
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
