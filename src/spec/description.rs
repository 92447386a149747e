use super::types::OperationGroup;
use super::SecurityScheme;
use std::collections::HashMap;
use std::sync::Arc;

/// An OpenAPI document reduced to what request validation needs.
///
/// The path table is keyed by API path templates (`/hello/{name}`). The
/// description is immutable once built; share it behind an `Arc`.
#[derive(Debug, Clone, Default)]
pub struct ApiDescription {
    title: String,
    paths: HashMap<String, Arc<OperationGroup>>,
    security_schemes: HashMap<String, SecurityScheme>,
}

impl ApiDescription {
    pub fn new(
        title: impl Into<String>,
        paths: HashMap<String, Arc<OperationGroup>>,
        security_schemes: HashMap<String, SecurityScheme>,
    ) -> Self {
        Self {
            title: title.into(),
            paths,
            security_schemes,
        }
    }

    /// Operation group declared for an API path template.
    #[must_use]
    pub fn path(&self, api_path: &str) -> Option<Arc<OperationGroup>> {
        self.paths.get(api_path).map(Arc::clone)
    }

    /// Declared API path templates, sorted.
    #[must_use]
    pub fn paths(&self) -> Vec<&str> {
        let mut paths: Vec<&str> = self.paths.keys().map(String::as_str).collect();
        paths.sort_unstable();
        paths
    }

    pub fn groups(&self) -> impl Iterator<Item = &Arc<OperationGroup>> {
        self.paths.values()
    }

    #[must_use]
    pub fn security_schemes(&self) -> &HashMap<String, SecurityScheme> {
        &self.security_schemes
    }

    #[must_use]
    pub fn security_scheme(&self, name: &str) -> Option<&SecurityScheme> {
        self.security_schemes.get(name)
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// URL-safe form of the document title (`Test Service` becomes `test_service`).
    #[must_use]
    pub fn slug(&self) -> String {
        self.title
            .to_lowercase()
            .replace(|c: char| !c.is_ascii_alphanumeric(), "_")
            .trim_matches('_')
            .to_string()
    }
}
