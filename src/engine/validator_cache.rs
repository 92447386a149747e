//! # Schema Validator Cache
//!
//! Compiled JSON Schema validators shared across requests.
//!
//! Compiling a schema costs far more than evaluating it, so [`SchemaEngine`]
//! compiles each parameter and body schema once and keeps the result behind an
//! `Arc`.
//!
//! ## Cache Key Structure
//!
//! `{operation_id}:{kind}:{name}`
//! - `operation_id`: the operation's `operationId` (or its generated stand-in)
//! - `kind`: `path`, `query`, `header`, `cookie` or `body`
//! - `name`: the parameter name, empty for `body`
//!
//! ## Configuration
//!
//! Disabled with `BRRTG_SCHEMA_CACHE=off`; validators are then compiled per use.
//!
//! [`SchemaEngine`]: super::SchemaEngine

use jsonschema::Validator;
use parking_lot::RwLock;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, error, info};

use crate::spec::ApiDescription;

/// Thread-safe cache of compiled validators.
#[derive(Clone)]
pub struct ValidatorCache {
    cache: Arc<RwLock<HashMap<String, Arc<Validator>>>>,
    enabled: bool,
}

impl std::fmt::Debug for ValidatorCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValidatorCache")
            .field("enabled", &self.enabled)
            .field("size", &self.size())
            .finish()
    }
}

impl ValidatorCache {
    #[must_use]
    pub fn new(enabled: bool) -> Self {
        info!(enabled = enabled, "Initializing JSON Schema validator cache");
        Self {
            cache: Arc::new(RwLock::new(HashMap::new())),
            enabled,
        }
    }

    fn cache_key(operation_id: &str, kind: &str, name: &str) -> String {
        format!("{operation_id}:{kind}:{name}")
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Cached validator for a schema, compiling it on first use.
    ///
    /// # Errors
    ///
    /// The compiler's message when the schema itself is invalid. Failed
    /// compilations are not cached.
    pub fn get_or_compile(
        &self,
        operation_id: &str,
        kind: &str,
        name: &str,
        schema: &Value,
    ) -> Result<Arc<Validator>, String> {
        if !self.enabled {
            return compile(operation_id, kind, name, schema).map(Arc::new);
        }

        let key = Self::cache_key(operation_id, kind, name);

        // Fast path: read lock only
        if let Some(validator) = self.cache.read().get(&key) {
            debug!(cache_key = %key, "Schema validator cache hit");
            return Ok(Arc::clone(validator));
        }

        let validator = Arc::new(compile(operation_id, kind, name, schema)?);
        let mut cache = self.cache.write();
        // Another thread may have compiled while this one waited
        if let Some(existing) = cache.get(&key) {
            debug!(cache_key = %key, "Schema validator compiled by another thread");
            return Ok(Arc::clone(existing));
        }
        cache.insert(key.clone(), Arc::clone(&validator));
        info!(
            cache_key = %key,
            cache_size = cache.len(),
            "Schema validator compiled and cached"
        );
        Ok(validator)
    }

    /// Number of cached validators.
    #[must_use]
    pub fn size(&self) -> usize {
        self.cache.read().len()
    }

    pub fn clear(&self) {
        let mut cache = self.cache.write();
        let cleared = cache.len();
        cache.clear();
        info!(cleared = cleared, "Schema validator cache cleared");
    }

    /// Compile every parameter and request body schema in the description.
    ///
    /// Invalid schemas are logged and skipped; they surface again as engine
    /// faults on the first request that needs them. Returns the number of
    /// schemas compiled.
    pub fn precompile(&self, description: &ApiDescription) -> usize {
        if !self.enabled {
            info!("Schema cache disabled, skipping precompilation");
            return 0;
        }

        let mut compiled_count = 0;
        let mut operations_count = 0;
        for group in description.groups() {
            for operation in group.operations() {
                operations_count += 1;
                for param in &operation.parameters {
                    if let Some(schema) = &param.schema {
                        let kind = param.location.to_string();
                        if self
                            .get_or_compile(&operation.operation_id, &kind, &param.name, schema)
                            .is_ok()
                        {
                            compiled_count += 1;
                        }
                    }
                }
                if let Some(schema) = &operation.request_schema {
                    if self
                        .get_or_compile(&operation.operation_id, "body", "", schema)
                        .is_ok()
                    {
                        compiled_count += 1;
                    }
                }
            }
        }

        info!(
            compiled_count = compiled_count,
            cache_size = self.size(),
            operations_count = operations_count,
            "Precompiled schemas at startup"
        );
        compiled_count
    }
}

fn compile(
    operation_id: &str,
    kind: &str,
    name: &str,
    schema: &Value,
) -> Result<Validator, String> {
    jsonschema::validator_for(schema).map_err(|e| {
        error!(
            operation_id = operation_id,
            kind = kind,
            name = name,
            error = %e,
            "Failed to compile JSON Schema"
        );
        format!("invalid schema for {kind} '{name}' of operation {operation_id}: {e}")
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_cache_enabled_shares_validator() {
        let cache = ValidatorCache::new(true);
        let schema = json!({"type": "integer"});

        let v1 = cache.get_or_compile("count", "path", "number", &schema).unwrap();
        let v2 = cache.get_or_compile("count", "path", "number", &schema).unwrap();
        assert!(Arc::ptr_eq(&v1, &v2));
        assert_eq!(cache.size(), 1);
        assert!(v1.is_valid(&json!(5)));
        assert!(!v1.is_valid(&json!("x")));
    }

    #[test]
    fn test_cache_disabled_compiles_each_time() {
        let cache = ValidatorCache::new(false);
        let schema = json!({"type": "string"});
        let v1 = cache.get_or_compile("hello", "path", "name", &schema).unwrap();
        let v2 = cache.get_or_compile("hello", "path", "name", &schema).unwrap();
        assert!(!Arc::ptr_eq(&v1, &v2));
        assert_eq!(cache.size(), 0);
    }

    #[test]
    fn test_keys_separate_kinds_and_names() {
        let cache = ValidatorCache::new(true);
        let schema = json!({"type": "string"});
        cache.get_or_compile("op", "path", "a", &schema).unwrap();
        cache.get_or_compile("op", "query", "a", &schema).unwrap();
        cache.get_or_compile("op", "query", "b", &schema).unwrap();
        assert_eq!(cache.size(), 3);
    }

    #[test]
    fn test_invalid_schema_is_an_error_and_not_cached() {
        let cache = ValidatorCache::new(true);
        let schema = json!({"type": 12});
        let err = cache.get_or_compile("op", "body", "", &schema).unwrap_err();
        assert!(err.contains("invalid schema"));
        assert_eq!(cache.size(), 0);
    }

    #[test]
    fn test_clear() {
        let cache = ValidatorCache::new(true);
        cache
            .get_or_compile("op", "body", "", &json!({"type": "object"}))
            .unwrap();
        cache.clear();
        assert_eq!(cache.size(), 0);
    }
}
