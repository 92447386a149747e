use std::time::Duration;

use crate::router::RouteMatch;
use crate::server::{Request, Response};

/// A hook around handler execution.
///
/// `before` runs in registration order once a route has matched; returning a
/// response short-circuits the chain and the handler. `after` runs for every
/// middleware whose `before` ran, in reverse order.
pub trait Middleware: Send + Sync {
    fn before(&self, _req: &Request, _route: &RouteMatch) -> Option<Response> {
        None
    }
    fn after(&self, _req: &Request, _res: &mut Response, _latency: Duration) {}
}
