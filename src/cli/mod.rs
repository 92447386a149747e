//! # CLI Module
//!
//! Command-line checks for wiring a router to an OpenAPI description.
//!
//! ## Commands
//!
//! ### `check`
//!
//! Register the given routes and run eager resolution, exiting non-zero on the
//! first route the description does not declare:
//!
//! ```bash
//! brrtguard check --spec openapi.yaml \
//!     --route "GET /hello/:name" \
//!     --route "GET /count/:number/:currency"
//! ```
//!
//! ### `inspect`
//!
//! List every API path template with its methods and operation ids:
//!
//! ```bash
//! brrtguard inspect --spec openapi.yaml
//! ```

mod commands;


pub use commands::{check_routes, inspect, parse_route_arg, run_cli, Cli, Commands};
