//! # Resolver Module
//!
//! Ties a router's matched route template to the [`OperationGroup`] the API
//! description declares for it.
//!
//! ## Flow
//!
//! 1. Look the route template (`/hello/:name`) up in the [`OperationCache`].
//! 2. On a miss, normalize it to the description's form (`/hello/{name}`).
//! 3. Look that template up in the description's path table.
//! 4. Store and return the group, or fail with [`ResolutionError::PathNotInSpec`].
//!
//! [`Resolver::initialize`] runs steps 2-4 for every registered route before
//! traffic, failing fast on the first gap.
//!
//! [`OperationGroup`]: crate::spec::OperationGroup

mod cache;
mod core;
pub mod normalize;

pub use cache::OperationCache;
pub use core::{ResolutionError, Resolver};
