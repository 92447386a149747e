//! Route template to operation group cache.
//!
//! Keys are router templates (`/hello/:name`), values are the operation groups
//! the API description declares for the matching path. The set of routes is
//! fixed after startup, so entries are never evicted. Concurrent first-miss
//! writers for one key store the same `Arc` target; the last write wins.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

use crate::spec::OperationGroup;

/// Read-mostly map from route template to resolved [`OperationGroup`].
#[derive(Debug, Default)]
pub struct OperationCache {
    entries: RwLock<HashMap<Arc<str>, Arc<OperationGroup>>>,
}

impl OperationCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached group for a route template. Readers never block each other.
    #[must_use]
    pub fn get(&self, route_template: &str) -> Option<Arc<OperationGroup>> {
        self.entries.read().get(route_template).map(Arc::clone)
    }

    /// Store a group for a route template.
    pub fn put(&self, route_template: Arc<str>, group: Arc<OperationGroup>) {
        let mut entries = self.entries.write();
        let replaced = entries.insert(route_template, group).is_some();
        debug!(
            replaced = replaced,
            cache_size = entries.len(),
            "Operation cache entry stored"
        );
    }

    #[must_use]
    pub fn contains(&self, route_template: &str) -> bool {
        self.entries.read().contains_key(route_template)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}
