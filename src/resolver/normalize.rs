//! Route template to API path template conversion.
//!
//! Routers register `/count/:number/:currency`; OpenAPI declares
//! `/count/{number}/{currency}`. Conversion is plain text substitution of each
//! `:name` marker with `{name}`, with two guards:
//!
//! - names are substituted longest first, so `:id` can never eat the front of
//!   `:idx`;
//! - a marker only matches when it runs to the end of its segment, and only its
//!   first such occurrence is rewritten.

use std::sync::Arc;

/// Prefix of a positional parameter marker in a route template.
pub const MARKER_PREFIX: char = ':';

/// Parameter names of a route template, in marker order.
///
/// `"/count/:number/:currency"` gives `["number", "currency"]`.
#[must_use]
pub fn param_names(route_template: &str) -> Vec<Arc<str>> {
    route_template
        .split('/')
        .filter_map(|seg| seg.strip_prefix(MARKER_PREFIX))
        .map(Arc::from)
        .collect()
}

/// Convert a router template into the API description's path template form.
///
/// `param_names` is the router's list for this route. It is only read; the
/// sorted order lives in a local copy so the router's names stay aligned with
/// its values. With no names the template is returned as is.
#[must_use]
pub fn to_api_path(route_template: &str, param_names: &[Arc<str>]) -> String {
    if param_names.is_empty() {
        return route_template.to_string();
    }

    let mut names: Vec<&str> = param_names.iter().map(AsRef::as_ref).collect();
    if names.len() > 1 {
        // Stable: equal-length names keep router order
        names.sort_by(|a, b| b.len().cmp(&a.len()));
    }

    let mut api_path = route_template.to_string();
    for name in names {
        if let Some(replaced) = replace_first_marker(&api_path, name) {
            api_path = replaced;
        }
    }
    api_path
}

/// Replace the first `:name` that ends at a segment boundary with `{name}`.
fn replace_first_marker(path: &str, name: &str) -> Option<String> {
    let marker_len = name.len() + MARKER_PREFIX.len_utf8();
    let mut search_from = 0;

    while let Some(offset) = path[search_from..].find(MARKER_PREFIX) {
        let start = search_from + offset;
        let name_start = start + MARKER_PREFIX.len_utf8();
        let end = start + marker_len;
        let rest = &path[name_start..];
        if rest.starts_with(name) && (end == path.len() || path[end..].starts_with('/')) {
            let mut out = String::with_capacity(path.len() + 1);
            out.push_str(&path[..start]);
            out.push('{');
            out.push_str(name);
            out.push('}');
            out.push_str(&path[end..]);
            return Some(out);
        }
        search_from = name_start;
    }
    None
}
