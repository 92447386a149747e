use http::Method;
use smallvec::SmallVec;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

use super::radix::RadixTree;
use crate::resolver::normalize::param_names;

/// Maximum number of path parameters before the value list spills to the heap.
pub const MAX_INLINE_PARAMS: usize = 8;

/// Per-request parameter values, positionally aligned with [`RouteInfo::param_names`].
pub type ParamValues = SmallVec<[String; MAX_INLINE_PARAMS]>;

/// A registered route: method, router template and its ordered `:name` markers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteInfo {
    /// Registration order, used by the service to find the handler
    pub index: usize,
    pub method: Method,
    /// Router template, e.g. `/count/:number/:currency`
    pub template: Arc<str>,
    /// Parameter names in marker order; shared by every match of this route
    pub param_names: Arc<[Arc<str>]>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    #[error("route template '{template}' must start with '/'")]
    MissingLeadingSlash { template: String },
    #[error("route template '{template}' has an empty parameter name")]
    EmptyParamName { template: String },
    #[error("route template '{template}' binds parameter '{name}' more than once")]
    DuplicateParam { template: String, name: String },
    #[error("route {method} {template} is already registered")]
    AlreadyRegistered { method: Method, template: String },
}

/// Result of matching a concrete request path.
#[derive(Debug, Clone)]
pub struct RouteMatch {
    pub route: Arc<RouteInfo>,
    pub param_values: ParamValues,
}

impl RouteMatch {
    #[inline]
    #[must_use]
    pub fn route_template(&self) -> &str {
        &self.route.template
    }

    #[inline]
    #[must_use]
    pub fn param_names(&self) -> &[Arc<str>] {
        &self.route.param_names
    }

    /// Value bound to `name` for this request.
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&str> {
        self.route
            .param_names
            .iter()
            .position(|n| n.as_ref() == name)
            .and_then(|i| self.param_values.get(i))
            .map(String::as_str)
    }

    /// `(name, value)` pairs in marker order.
    pub fn params(&self) -> impl Iterator<Item = (&str, &str)> {
        self.route
            .param_names
            .iter()
            .zip(self.param_values.iter())
            .map(|(n, v)| (n.as_ref(), v.as_str()))
    }
}

/// Router over `:name` route templates.
///
/// Routes are registered once at startup and matched per request. The
/// registered list is exposed through [`Router::routes`] so a validator can
/// check every route against the API description before traffic is served.
#[derive(Clone, Default)]
pub struct Router {
    tree: RadixTree,
    routes: Vec<Arc<RouteInfo>>,
}

impl Router {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a route template for `method`.
    ///
    /// # Errors
    ///
    /// Rejects templates without a leading `/`, with an empty `:` marker, binding
    /// the same name twice, or already registered for the same method.
    pub fn register(
        &mut self,
        method: Method,
        template: &str,
    ) -> Result<Arc<RouteInfo>, RouteError> {
        if !template.starts_with('/') {
            return Err(RouteError::MissingLeadingSlash {
                template: template.to_string(),
            });
        }
        let names = param_names(template);
        if names.iter().any(|n| n.is_empty()) {
            return Err(RouteError::EmptyParamName {
                template: template.to_string(),
            });
        }
        for (i, name) in names.iter().enumerate() {
            if names[..i].contains(name) {
                return Err(RouteError::DuplicateParam {
                    template: template.to_string(),
                    name: name.to_string(),
                });
            }
        }
        if self
            .routes
            .iter()
            .any(|r| r.method == method && &*r.template == template)
        {
            return Err(RouteError::AlreadyRegistered {
                method,
                template: template.to_string(),
            });
        }

        let route = Arc::new(RouteInfo {
            index: self.routes.len(),
            method,
            template: Arc::from(template),
            param_names: names.into(),
        });
        self.tree.insert(Arc::clone(&route));
        self.routes.push(Arc::clone(&route));

        info!(
            method = %route.method,
            template = %route.template,
            param_names = ?route.param_names,
            routes_count = self.routes.len(),
            "Route registered"
        );
        Ok(route)
    }

    /// Match a request path.
    #[must_use]
    pub fn route(&self, method: &Method, path: &str) -> Option<RouteMatch> {
        let result = self.tree.search(method, path);
        match &result {
            Some((route, values)) => debug!(
                method = %method,
                path = %path,
                template = %route.template,
                param_values = ?values,
                "Route matched"
            ),
            None => debug!(method = %method, path = %path, "No route matched"),
        }
        result.map(|(route, param_values)| RouteMatch { route, param_values })
    }

    /// Match a path whatever the method, taking the template's first registered route.
    ///
    /// Lets a caller tell "unknown path" apart from "known path, other method".
    #[must_use]
    pub fn route_any_method(&self, path: &str) -> Option<RouteMatch> {
        self.tree
            .search_any_method(path)
            .map(|(route, param_values)| RouteMatch { route, param_values })
    }

    /// All registered routes in registration order.
    #[must_use]
    pub fn routes(&self) -> &[Arc<RouteInfo>] {
        &self.routes
    }
}
