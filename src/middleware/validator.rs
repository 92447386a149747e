use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, warn};

use super::config::{ResolvedConfig, ValidatorConfig};
use super::Middleware;
use crate::engine::{RequestValidationInput, ValidationEngine};
use crate::error::{GuardError, HttpError};
use crate::resolver::{ResolutionError, Resolver};
use crate::router::{RouteInfo, RouteMatch};
use crate::server::{Request, Response};
use crate::spec::ApiDescription;

/// Middleware that validates each routed request against its declared operation.
///
/// Per request: resolve the matched route template to its operation group,
/// select the operation for the request method, bind path parameters by the
/// router's own names, and hand everything to the [`ValidationEngine`]. Any
/// failure becomes a problem-JSON response and the handler never runs.
pub struct OpenApiValidator {
    resolver: Resolver,
    engine: Arc<dyn ValidationEngine>,
    config: ResolvedConfig,
}

impl std::fmt::Debug for OpenApiValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenApiValidator")
            .field("resolver", &self.resolver)
            .field("options", &self.config.options)
            .finish_non_exhaustive()
    }
}

impl OpenApiValidator {
    #[must_use]
    pub fn new(
        description: Arc<ApiDescription>,
        engine: Arc<dyn ValidationEngine>,
        config: ValidatorConfig,
    ) -> Self {
        Self::with_resolver(Resolver::new(description), engine, config)
    }

    #[must_use]
    pub fn with_resolver(
        resolver: Resolver,
        engine: Arc<dyn ValidationEngine>,
        config: ValidatorConfig,
    ) -> Self {
        Self {
            resolver,
            engine,
            config: config.resolve(),
        }
    }

    #[must_use]
    pub fn resolver(&self) -> &Resolver {
        &self.resolver
    }

    /// Resolve every registered route before serving traffic, then let the
    /// engine prepare its schemas. Returns the number of route templates resolved.
    ///
    /// # Errors
    ///
    /// The first route with no matching path in the API description.
    pub fn initialize<I, R>(&self, routes: I) -> Result<usize, ResolutionError>
    where
        I: IntoIterator<Item = R>,
        R: AsRef<RouteInfo>,
    {
        let resolved = self.resolver.initialize(routes)?;
        let prepared = self.engine.warm_up(self.resolver.description());
        debug!(routes = resolved, schemas = prepared, "Validator warmed up");
        Ok(resolved)
    }

    /// Run the full check for one routed request.
    ///
    /// # Errors
    ///
    /// A [`GuardError`] for unresolvable routes, undeclared methods and engine failures.
    pub fn validate(&self, req: &Request, route: &RouteMatch) -> Result<(), GuardError> {
        let names = route.param_names();
        let group = self.resolver.resolve(route.route_template(), names)?;

        let Some(operation) = group.operation(&req.method) else {
            return Err(GuardError::MethodNotDeclared {
                method: req.method.clone(),
                path: req.path.clone(),
            });
        };

        let path_params = bind_path_params(route)?;
        let input = RequestValidationInput {
            request: req,
            path_params,
            query_params: &req.query_params,
            group: &group,
            operation,
            options: self.config.options,
            decoder: self.config.param_decoder.as_ref(),
        };
        self.engine.validate(&input)?;
        debug!(
            request_id = %req.id,
            route = %route.route_template(),
            operation_id = %operation.operation_id,
            "Request passed validation"
        );
        Ok(())
    }
}

/// Zip the router's names and values, refusing anything that would lose a binding.
fn bind_path_params(route: &RouteMatch) -> Result<HashMap<&str, &str>, ResolutionError> {
    let names = route.param_names();
    let values = &route.param_values;
    if names.len() != values.len() {
        return Err(ResolutionError::BindingMismatch {
            route: route.route_template().to_string(),
            names: names.len(),
            values: values.len(),
        });
    }
    let mut bound = HashMap::with_capacity(names.len());
    for (name, value) in names.iter().zip(values.iter()) {
        if bound.insert(name.as_ref(), value.as_str()).is_some() {
            return Err(ResolutionError::DuplicateParam {
                route: route.route_template().to_string(),
                name: name.to_string(),
            });
        }
    }
    Ok(bound)
}

impl Middleware for OpenApiValidator {
    fn before(&self, req: &Request, route: &RouteMatch) -> Option<Response> {
        if (self.config.skipper)(req) {
            debug!(request_id = %req.id, path = %req.path, "Validation skipped");
            return None;
        }
        match self.validate(req, route) {
            Ok(()) => None,
            Err(err) => {
                let http = HttpError::from(&err);
                warn!(
                    request_id = %req.id,
                    method = %req.method,
                    path = %req.path,
                    route = %route.route_template(),
                    status = http.status.as_u16(),
                    error = %http.message,
                    "Request rejected by validator"
                );
                Some(http.to_response())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::router::{ParamValues, RouteInfo};
    use http::Method;

    fn route_match(names: &[&str], values: &[&str]) -> RouteMatch {
        RouteMatch {
            route: Arc::new(RouteInfo {
                index: 0,
                method: Method::GET,
                template: Arc::from("/t"),
                param_names: names.iter().map(|n| Arc::from(*n)).collect(),
            }),
            param_values: values.iter().map(|v| v.to_string()).collect::<ParamValues>(),
        }
    }

    #[test]
    fn test_bind_keeps_router_alignment() {
        let m = route_match(&["number", "currency"], &["100", "USD"]);
        let bound = bind_path_params(&m).unwrap();
        assert_eq!(bound.len(), 2);
        assert_eq!(bound["number"], "100");
        assert_eq!(bound["currency"], "USD");
    }

    #[test]
    fn test_bind_refuses_duplicate_names() {
        let m = route_match(&["id", "id"], &["1", "2"]);
        assert!(matches!(
            bind_path_params(&m),
            Err(ResolutionError::DuplicateParam { ref name, .. }) if name == "id"
        ));
    }

    #[test]
    fn test_bind_refuses_length_mismatch() {
        let m = route_match(&["a", "b"], &["1"]);
        assert!(matches!(
            bind_path_params(&m),
            Err(ResolutionError::BindingMismatch { names: 2, values: 1, .. })
        ));
    }
}
