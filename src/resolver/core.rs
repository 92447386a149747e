use std::collections::HashSet;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::cache::OperationCache;
use super::normalize::to_api_path;
use crate::router::RouteInfo;
use crate::spec::{ApiDescription, OperationGroup};

/// A route that cannot be tied to the API description.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolutionError {
    /// The route's normalized template is not a key of the description's path table.
    #[error("path not used in API specification: {route} (looked up as {api_path})")]
    PathNotInSpec { route: String, api_path: String },
    /// The router bound one parameter name to two values in a single match.
    #[error("route {route} binds parameter '{name}' more than once")]
    DuplicateParam { route: String, name: String },
    /// The router supplied a different number of parameter names and values.
    #[error("route {route} bound {names} parameter name(s) but {values} value(s)")]
    BindingMismatch {
        route: String,
        names: usize,
        values: usize,
    },
}

/// Resolves router templates to the operation groups declared for them.
///
/// The resolver owns its [`OperationCache`]: empty at construction, optionally
/// filled by [`Resolver::initialize`] before traffic, append-only afterwards.
/// The lazy path in [`Resolver::resolve`] stays active after initialization so
/// routes registered later still resolve on first use.
#[derive(Debug, Clone)]
pub struct Resolver {
    description: Arc<ApiDescription>,
    cache: Arc<OperationCache>,
}

impl Resolver {
    #[must_use]
    pub fn new(description: Arc<ApiDescription>) -> Self {
        Self::with_cache(description, Arc::new(OperationCache::new()))
    }

    #[must_use]
    pub fn with_cache(description: Arc<ApiDescription>, cache: Arc<OperationCache>) -> Self {
        Self { description, cache }
    }

    #[must_use]
    pub fn description(&self) -> &Arc<ApiDescription> {
        &self.description
    }

    #[must_use]
    pub fn cache(&self) -> &Arc<OperationCache> {
        &self.cache
    }

    /// Operation group for a router template.
    ///
    /// # Errors
    ///
    /// [`ResolutionError::PathNotInSpec`] when the normalized template is not
    /// declared. Failures are not cached.
    pub fn resolve(
        &self,
        route_template: &str,
        param_names: &[Arc<str>],
    ) -> Result<Arc<OperationGroup>, ResolutionError> {
        if let Some(group) = self.cache.get(route_template) {
            debug!(route = %route_template, api_path = %group.path, "Operation cache hit");
            return Ok(group);
        }

        let api_path = to_api_path(route_template, param_names);
        let Some(group) = self.description.path(&api_path) else {
            warn!(
                route = %route_template,
                api_path = %api_path,
                "Route has no matching path in API description"
            );
            return Err(ResolutionError::PathNotInSpec {
                route: route_template.to_string(),
                api_path,
            });
        };

        self.cache.put(Arc::from(route_template), Arc::clone(&group));
        info!(
            route = %route_template,
            api_path = %api_path,
            methods = ?group.methods(),
            "Route resolved to API path"
        );
        Ok(group)
    }

    /// Resolve every registered route up front.
    ///
    /// Run once after route registration and before serving traffic. Stops at
    /// the first route with no description entry so startup can abort.
    /// Returns the number of distinct route templates now cached.
    ///
    /// # Errors
    ///
    /// The first [`ResolutionError`] encountered.
    pub fn initialize<I, R>(&self, routes: I) -> Result<usize, ResolutionError>
    where
        I: IntoIterator<Item = R>,
        R: AsRef<RouteInfo>,
    {
        let mut seen: HashSet<Arc<str>> = HashSet::new();
        for route in routes {
            let route = route.as_ref();
            if !seen.insert(Arc::clone(&route.template)) {
                continue;
            }
            self.resolve(&route.template, &route.param_names)?;
        }
        info!(
            routes = seen.len(),
            cache_size = self.cache.len(),
            "Validator path cache initialized"
        );
        Ok(seen.len())
    }
}
