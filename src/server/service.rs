use http::{Method, StatusCode};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, info_span};

use super::request::Request;
use super::response::Response;
use crate::error::HttpError;
use crate::middleware::{Middleware, OpenApiValidator};
use crate::resolver::ResolutionError;
use crate::router::{RouteError, RouteInfo, RouteMatch, Router};
use crate::runtime_config::RuntimeConfig;

/// Request handler bound to one registered route.
pub type Handler = Arc<dyn Fn(&Request, &RouteMatch) -> Response + Send + Sync>;

/// In-process service: router, middleware chain and handler table.
///
/// Routes are registered up front; [`Service::call`] then matches, runs the
/// middleware chain and the handler. A path no template matches gets 404. A
/// path whose template is only registered under other methods still runs the
/// middleware chain, then gets 405 if nothing answered first.
#[derive(Clone, Default)]
pub struct Service {
    router: Router,
    handlers: Vec<Handler>,
    middlewares: Vec<Arc<dyn Middleware>>,
    validator: Option<Arc<OpenApiValidator>>,
}

impl Service {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for `method` on a route template.
    ///
    /// # Errors
    ///
    /// Any [`RouteError`] from the router.
    pub fn route<F>(
        &mut self,
        method: Method,
        template: &str,
        handler: F,
    ) -> Result<Arc<RouteInfo>, RouteError>
    where
        F: Fn(&Request, &RouteMatch) -> Response + Send + Sync + 'static,
    {
        let route = self.router.register(method, template)?;
        debug_assert_eq!(route.index, self.handlers.len());
        self.handlers.push(Arc::new(handler));
        Ok(route)
    }

    /// Append a middleware to the chain.
    pub fn add_middleware(&mut self, middleware: Arc<dyn Middleware>) {
        self.middlewares.push(middleware);
    }

    /// Install the OpenAPI validator as the next middleware.
    ///
    /// The service keeps a handle so [`Service::start`] can initialize it.
    pub fn add_validator(&mut self, validator: Arc<OpenApiValidator>) {
        self.add_middleware(Arc::clone(&validator) as Arc<dyn Middleware>);
        self.validator = Some(validator);
    }

    #[must_use]
    pub fn router(&self) -> &Router {
        &self.router
    }

    /// Registered routes in registration order.
    #[must_use]
    pub fn routes(&self) -> &[Arc<RouteInfo>] {
        self.router.routes()
    }

    /// Startup hook: eagerly resolve every route when `config.eager_init` is on.
    ///
    /// Returns the number of route templates resolved, 0 when skipped.
    ///
    /// # Errors
    ///
    /// The first route with no counterpart in the API description.
    pub fn start(&self, config: &RuntimeConfig) -> Result<usize, ResolutionError> {
        let Some(validator) = &self.validator else {
            return Ok(0);
        };
        if !config.eager_init {
            info!("Eager validator initialization disabled");
            return Ok(0);
        }
        validator.initialize(self.routes())
    }

    /// Handle one request.
    pub fn call(&self, req: Request) -> Response {
        let span = info_span!(
            "request",
            request_id = %req.id,
            method = %req.method,
            path = %req.path
        );
        let _entered = span.enter();
        let started = Instant::now();

        // A template registered under another method still runs the chain, so
        // the validator can report the undeclared method itself.
        let (route, method_matched) = match self.router.route(&req.method, &req.path) {
            Some(route) => (route, true),
            None => match self.router.route_any_method(&req.path) {
                Some(route) => (route, false),
                None => {
                    debug!("No route for request");
                    return HttpError::new(
                        StatusCode::NOT_FOUND,
                        format!("no route for {} {}", req.method, req.path),
                    )
                    .to_response();
                }
            },
        };

        let mut ran = 0;
        let mut short_circuit = None;
        for middleware in &self.middlewares {
            ran += 1;
            if let Some(response) = middleware.before(&req, &route) {
                short_circuit = Some(response);
                break;
            }
        }

        let mut response = match short_circuit {
            Some(response) => response,
            None if !method_matched => HttpError::new(
                StatusCode::METHOD_NOT_ALLOWED,
                format!("method {} not allowed on {}", req.method, route.route_template()),
            )
            .to_response(),
            None => match self.handlers.get(route.route.index) {
                Some(handler) => handler(&req, &route),
                None => HttpError::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("no handler for route {}", route.route_template()),
                )
                .to_response(),
            },
        };

        let latency = started.elapsed();
        for middleware in self.middlewares[..ran].iter().rev() {
            middleware.after(&req, &mut response, latency);
        }
        response
    }
}
