//! # Security Module
//!
//! Credential checks for the security schemes an operation declares.
//!
//! The validation engine evaluates an operation's `security` requirements
//! (alternatives OR'ed, schemes within one alternative AND'ed) and asks the
//! [`SecurityProvider`] registered under each scheme name whether the request
//! satisfies it. A scheme with no provider never passes.
//!
//! Two static providers ship with the crate:
//!
//! - [`ApiKeyProvider`]: a fixed key set, read from the header, query
//!   parameter or cookie the `apiKey` scheme names;
//! - [`BearerTokenProvider`]: a fixed token set behind `Authorization: Bearer`.
//!
//! ```rust
//! use brrtguard::security::{SecurityProvider, SecurityRequest};
//! use brrtguard::spec::SecurityScheme;
//!
//! struct AllowAll;
//!
//! impl SecurityProvider for AllowAll {
//!     fn validate(
//!         &self,
//!         _scheme: &SecurityScheme,
//!         _scopes: &[String],
//!         _req: &SecurityRequest,
//!     ) -> bool {
//!         true
//!     }
//! }
//! ```

use crate::spec::SecurityScheme;
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// The parts of a request a provider may inspect.
#[derive(Debug, Clone, Copy)]
pub struct SecurityRequest<'a> {
    /// Headers with lowercase names
    pub headers: &'a HashMap<String, String>,
    /// Query parameters; providers read the first value
    pub query: &'a HashMap<String, Vec<String>>,
    pub cookies: &'a HashMap<String, String>,
}

impl<'a> SecurityRequest<'a> {
    #[inline]
    #[must_use]
    pub fn get_header(&self, name: &str) -> Option<&'a str> {
        self.headers
            .get(name)
            .or_else(|| self.headers.get(&name.to_ascii_lowercase()))
            .map(String::as_str)
    }

    #[inline]
    #[must_use]
    pub fn get_query(&self, name: &str) -> Option<&'a str> {
        self.query
            .get(name)
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    #[inline]
    #[must_use]
    pub fn get_cookie(&self, name: &str) -> Option<&'a str> {
        self.cookies.get(name).map(String::as_str)
    }
}

/// Decides whether a request satisfies one security scheme.
pub trait SecurityProvider: Send + Sync {
    fn validate(&self, scheme: &SecurityScheme, scopes: &[String], req: &SecurityRequest) -> bool;
}

/// Accepts API keys from a fixed set.
///
/// The key is read from wherever the `apiKey` scheme says: `header`, `query`
/// or `cookie`, under the scheme's `name`.
#[derive(Debug, Clone, Default)]
pub struct ApiKeyProvider {
    keys: HashSet<String>,
}

impl ApiKeyProvider {
    pub fn new<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            keys: keys.into_iter().map(Into::into).collect(),
        }
    }
}

impl SecurityProvider for ApiKeyProvider {
    fn validate(&self, scheme: &SecurityScheme, _scopes: &[String], req: &SecurityRequest) -> bool {
        let SecurityScheme::ApiKey { name, location, .. } = scheme else {
            return false;
        };
        let presented = match location.to_ascii_lowercase().as_str() {
            "header" => req.get_header(name),
            "query" => req.get_query(name),
            "cookie" => req.get_cookie(name),
            other => {
                debug!(location = %other, "Unsupported apiKey location");
                None
            }
        };
        presented.is_some_and(|key| self.keys.contains(key))
    }
}

/// Accepts bearer tokens from a fixed set, for `http` schemes with `scheme: bearer`.
#[derive(Debug, Clone, Default)]
pub struct BearerTokenProvider {
    tokens: HashSet<String>,
}

impl BearerTokenProvider {
    pub fn new<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tokens: tokens.into_iter().map(Into::into).collect(),
        }
    }
}

impl SecurityProvider for BearerTokenProvider {
    fn validate(&self, scheme: &SecurityScheme, _scopes: &[String], req: &SecurityRequest) -> bool {
        match scheme {
            SecurityScheme::Http { scheme, .. } if scheme.eq_ignore_ascii_case("bearer") => {}
            _ => return false,
        }
        req.get_header("authorization")
            .and_then(|h| h.strip_prefix("Bearer ").or_else(|| h.strip_prefix("bearer ")))
            .is_some_and(|token| self.tokens.contains(token.trim()))
    }
}
