//! Radix tree over route templates.
//!
//! Each node is one path segment. Static segments (`users`) match exactly and
//! are tried before parameter segments (`:id`), which match any single
//! non-empty segment. Routes live at terminal nodes keyed by HTTP method.
//!
//! Parameter values are pushed in the order segments are consumed, which is
//! the order of the `:name` markers in the matched template, so the value list
//! returned by [`RadixTree::search`] is positionally aligned with the route's
//! `param_names`.

use http::Method;
use std::collections::HashMap;
use std::sync::Arc;

use super::core::{ParamValues, RouteInfo};

#[derive(Clone, Default)]
struct RadixNode {
    segment: Box<str>,
    routes: HashMap<Method, Arc<RouteInfo>>,
    param_name: Option<Box<str>>,
    children: Vec<RadixNode>,
    /// Several parameter children may exist at one position when routes use
    /// different names there (e.g. `/users/:id/posts` and `/users/:user_id/comments`).
    param_children: Vec<RadixNode>,
}

impl RadixNode {
    fn new(segment: &str) -> Self {
        Self {
            segment: segment.into(),
            ..Self::default()
        }
    }

    fn new_param(param_name: &str) -> Self {
        Self {
            param_name: Some(param_name.into()),
            ..Self::default()
        }
    }

    /// Insert `route`; returns the route it replaced, if any.
    fn insert(&mut self, segments: &[&str], route: Arc<RouteInfo>) -> Option<Arc<RouteInfo>> {
        let Some((segment, remaining)) = segments.split_first() else {
            return self.routes.insert(route.method.clone(), route);
        };

        if let Some(param_name) = segment.strip_prefix(':') {
            if let Some(child) = self
                .param_children
                .iter_mut()
                .find(|c| c.param_name.as_deref() == Some(param_name))
            {
                return child.insert(remaining, route);
            }
            let mut child = RadixNode::new_param(param_name);
            let replaced = child.insert(remaining, route);
            self.param_children.push(child);
            return replaced;
        }

        if let Some(child) = self.children.iter_mut().find(|c| &*c.segment == *segment) {
            return child.insert(remaining, route);
        }
        let mut child = RadixNode::new(segment);
        let replaced = child.insert(remaining, route);
        self.children.push(child);
        replaced
    }

    /// `method: None` accepts any method, preferring the earliest registered.
    fn search(
        &self,
        segments: &[&str],
        method: Option<&Method>,
        values: &mut ParamValues,
    ) -> Option<Arc<RouteInfo>> {
        let Some((segment, remaining)) = segments.split_first() else {
            return match method {
                Some(method) => self.routes.get(method).map(Arc::clone),
                None => self.routes.values().min_by_key(|r| r.index).map(Arc::clone),
            };
        };

        for child in &self.children {
            if &*child.segment == *segment {
                if let Some(route) = child.search(remaining, method, values) {
                    return Some(route);
                }
            }
        }

        if segment.is_empty() {
            return None;
        }

        for param_child in &self.param_children {
            values.push((*segment).to_string());
            if let Some(route) = param_child.search(remaining, method, values) {
                return Some(route);
            }
            // Backtrack
            values.pop();
        }

        None
    }
}

/// Radix tree router keyed by templates such as `/count/:number/:currency`.
#[derive(Clone, Default)]
pub struct RadixTree {
    root: RadixNode,
}

impl RadixTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, route: Arc<RouteInfo>) -> Option<Arc<RouteInfo>> {
        let template = Arc::clone(&route.template);
        let segments = split_segments(&template);
        self.root.insert(&segments, route)
    }

    pub fn search(&self, method: &Method, path: &str) -> Option<(Arc<RouteInfo>, ParamValues)> {
        self.search_with(Some(method), path)
    }

    /// Match `path` under whichever method registered its template first.
    pub fn search_any_method(&self, path: &str) -> Option<(Arc<RouteInfo>, ParamValues)> {
        self.search_with(None, path)
    }

    fn search_with(
        &self,
        method: Option<&Method>,
        path: &str,
    ) -> Option<(Arc<RouteInfo>, ParamValues)> {
        let segments = split_segments(path);
        let mut values = ParamValues::new();
        self.root
            .search(&segments, method, &mut values)
            .map(|route| (route, values))
    }
}

/// Split a path into segments, ignoring the leading slash. `/` has no segments.
fn split_segments(path: &str) -> Vec<&str> {
    let trimmed = path.strip_prefix('/').unwrap_or(path);
    if trimmed.is_empty() {
        Vec::new()
    } else {
        trimmed.split('/').collect()
    }
}
