use std::fmt;
use std::sync::Arc;

use crate::engine::{DefaultParamDecoder, EngineOptions, ParamDecoder};
use crate::server::Request;

/// Predicate that bypasses validation for a request when it returns `true`.
pub type Skipper = Arc<dyn Fn(&Request) -> bool + Send + Sync>;

/// Caller-facing validator configuration.
///
/// Every field is optional. [`ValidatorConfig::merged`] fills unset fields from
/// another config one field at a time, so setting only `options` keeps the
/// default skipper and decoder.
#[derive(Clone, Default)]
pub struct ValidatorConfig {
    /// Default: never skip
    pub skipper: Option<Skipper>,
    /// Default: [`EngineOptions::default`]
    pub options: Option<EngineOptions>,
    /// Default: [`DefaultParamDecoder`]
    pub param_decoder: Option<Arc<dyn ParamDecoder>>,
}

impl fmt::Debug for ValidatorConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidatorConfig")
            .field("skipper", &self.skipper.as_ref().map(|_| "<fn>"))
            .field("options", &self.options)
            .field("param_decoder", &self.param_decoder.as_ref().map(|_| "<decoder>"))
            .finish()
    }
}

impl ValidatorConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn skipper<F>(mut self, skipper: F) -> Self
    where
        F: Fn(&Request) -> bool + Send + Sync + 'static,
    {
        self.skipper = Some(Arc::new(skipper));
        self
    }

    #[must_use]
    pub fn options(mut self, options: EngineOptions) -> Self {
        self.options = Some(options);
        self
    }

    #[must_use]
    pub fn param_decoder(mut self, decoder: Arc<dyn ParamDecoder>) -> Self {
        self.param_decoder = Some(decoder);
        self
    }

    /// Fields set on `self` win; unset ones come from `fallback`.
    #[must_use]
    pub fn merged(self, fallback: ValidatorConfig) -> ValidatorConfig {
        ValidatorConfig {
            skipper: self.skipper.or(fallback.skipper),
            options: self.options.or(fallback.options),
            param_decoder: self.param_decoder.or(fallback.param_decoder),
        }
    }

    /// The built-in defaults, with every field set.
    #[must_use]
    pub fn defaults() -> ValidatorConfig {
        ValidatorConfig {
            skipper: Some(Arc::new(|_: &Request| false)),
            options: Some(EngineOptions::default()),
            param_decoder: Some(Arc::new(DefaultParamDecoder)),
        }
    }

    pub(crate) fn resolve(self) -> ResolvedConfig {
        let ValidatorConfig {
            skipper,
            options,
            param_decoder,
        } = self.merged(ValidatorConfig::defaults());
        ResolvedConfig {
            skipper: skipper.unwrap_or_else(|| Arc::new(|_: &Request| false)),
            options: options.unwrap_or_default(),
            param_decoder: param_decoder.unwrap_or_else(|| Arc::new(DefaultParamDecoder)),
        }
    }
}

/// Fully populated configuration held by the validator.
#[derive(Clone)]
pub(crate) struct ResolvedConfig {
    pub skipper: Skipper,
    pub options: EngineOptions,
    pub param_decoder: Arc<dyn ParamDecoder>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_gets_all_defaults() {
        let resolved = ValidatorConfig::new().resolve();
        assert!(!(resolved.skipper)(&Request::get("/")));
        assert_eq!(resolved.options, EngineOptions::default());
    }

    #[test]
    fn test_partial_config_keeps_other_defaults() {
        let options = EngineOptions {
            exclude_security: true,
            ..EngineOptions::default()
        };
        let merged = ValidatorConfig::new()
            .options(options)
            .merged(ValidatorConfig::defaults());
        assert_eq!(merged.options, Some(options));
        assert!(merged.skipper.is_some());
        assert!(merged.param_decoder.is_some());
    }

    #[test]
    fn test_set_field_wins_over_fallback() {
        let resolved = ValidatorConfig::new()
            .skipper(|req: &Request| req.path == "/health")
            .resolve();
        assert!((resolved.skipper)(&Request::get("/health")));
        assert!(!(resolved.skipper)(&Request::get("/hello/world")));
    }
}
