//! # Spec Module
//!
//! Loads an OpenAPI 3.x document and reduces it to an [`ApiDescription`]: a path
//! table keyed by API path templates (`/hello/{name}`), each holding an
//! [`OperationGroup`] with one [`OperationMeta`] per declared method.
//!
//! Parameter and schema `$ref`s are resolved at load time so the validation
//! engine never has to walk the document.

pub use oas3::spec::{SecurityRequirement, SecurityScheme};
mod build;
mod description;
mod load;
mod types;

pub use build::*;
pub use description::ApiDescription;
pub use load::*;
pub use types::*;
