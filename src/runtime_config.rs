//! # Runtime Configuration Module
//!
//! Environment-driven switches for the validator's runtime behavior.
//!
//! ## Environment Variables
//!
//! ### `BRRTG_SCHEMA_CACHE`
//!
//! `on` (default) keeps compiled JSON Schema validators in the engine's
//! [`ValidatorCache`](crate::engine::ValidatorCache). `off` compiles per request,
//! which is only useful when chasing a suspected cache bug.
//!
//! ### `BRRTG_EAGER_INIT`
//!
//! `on` (default) makes [`Service::start`](crate::server::Service::start) check
//! every registered route against the API description before accepting
//! requests. `off` leaves resolution entirely lazy.
//!
//! ## Usage
//!
//! ```rust
//! use brrtguard::runtime_config::RuntimeConfig;
//!
//! let config = RuntimeConfig::from_env();
//! println!("schema cache: {}", config.schema_cache);
//! ```

use std::env;

/// Runtime configuration loaded from environment variables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Cache compiled JSON Schema validators (default: on)
    pub schema_cache: bool,
    /// Resolve every route at startup (default: on)
    pub eager_init: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            schema_cache: true,
            eager_init: true,
        }
    }
}

impl RuntimeConfig {
    /// Load configuration from environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            schema_cache: flag("BRRTG_SCHEMA_CACHE", defaults.schema_cache),
            eager_init: flag("BRRTG_EAGER_INIT", defaults.eager_init),
        }
    }
}

fn flag(var: &str, default: bool) -> bool {
    env::var(var)
        .ok()
        .and_then(|v| parse_flag(&v))
        .unwrap_or(default)
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "on" | "true" | "1" | "yes" => Some(true),
        "off" | "false" | "0" | "no" => Some(false),
        _ => None,
    }
}
