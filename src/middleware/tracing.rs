use std::time::Duration;

use tracing::{debug, info, warn};

use super::Middleware;
use crate::router::RouteMatch;
use crate::server::{Request, Response};

/// Logs one event when a request enters the chain and one when it leaves.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingMiddleware;

impl Middleware for TracingMiddleware {
    fn before(&self, req: &Request, route: &RouteMatch) -> Option<Response> {
        debug!(
            request_id = %req.id,
            method = %req.method,
            path = %req.path,
            route = %route.route_template(),
            "Request started"
        );
        None
    }

    fn after(&self, req: &Request, res: &mut Response, latency: Duration) {
        let latency_ms = u64::try_from(latency.as_millis()).unwrap_or(u64::MAX);
        if res.status.is_server_error() {
            warn!(
                request_id = %req.id,
                method = %req.method,
                path = %req.path,
                status = res.status.as_u16(),
                latency_ms = latency_ms,
                "Request failed"
            );
        } else {
            info!(
                request_id = %req.id,
                method = %req.method,
                path = %req.path,
                status = res.status.as_u16(),
                latency_ms = latency_ms,
                "Request completed"
            );
        }
    }
}
