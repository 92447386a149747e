//! # Router Module
//!
//! Matches concrete request paths against registered route templates written
//! with positional `:name` markers (`/count/:number/:currency`), the form most
//! HTTP routers register. A match carries the template, the ordered parameter
//! names bound to it, and the positionally aligned values taken from the request.
//!
//! ```rust
//! use brrtguard::router::Router;
//! use http::Method;
//!
//! let mut router = Router::new();
//! router.register(Method::GET, "/hello/:name").unwrap();
//!
//! let m = router.route(&Method::GET, "/hello/world").unwrap();
//! assert_eq!(m.route_template(), "/hello/:name");
//! assert_eq!(m.param("name"), Some("world"));
//! ```

mod core;
mod radix;

pub use core::{ParamValues, RouteError, RouteInfo, RouteMatch, Router, MAX_INLINE_PARAMS};
