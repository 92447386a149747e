use super::SecurityRequirement;
use http::Method;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParameterLocation {
    Path,
    Query,
    Header,
    Cookie,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterStyle {
    Matrix,
    Label,
    Form,
    Simple,
    SpaceDelimited,
    PipeDelimited,
    DeepObject,
}

impl From<oas3::spec::ParameterStyle> for ParameterStyle {
    fn from(style: oas3::spec::ParameterStyle) -> Self {
        use oas3::spec::ParameterStyle as PS;
        match style {
            PS::Matrix => ParameterStyle::Matrix,
            PS::Label => ParameterStyle::Label,
            PS::Form => ParameterStyle::Form,
            PS::Simple => ParameterStyle::Simple,
            PS::SpaceDelimited => ParameterStyle::SpaceDelimited,
            PS::PipeDelimited => ParameterStyle::PipeDelimited,
            PS::DeepObject => ParameterStyle::DeepObject,
        }
    }
}

impl std::fmt::Display for ParameterLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParameterLocation::Path => write!(f, "path"),
            ParameterLocation::Query => write!(f, "query"),
            ParameterLocation::Header => write!(f, "header"),
            ParameterLocation::Cookie => write!(f, "cookie"),
        }
    }
}

impl From<oas3::spec::ParameterIn> for ParameterLocation {
    fn from(loc: oas3::spec::ParameterIn) -> Self {
        match loc {
            oas3::spec::ParameterIn::Path => ParameterLocation::Path,
            oas3::spec::ParameterIn::Query => ParameterLocation::Query,
            oas3::spec::ParameterIn::Header => ParameterLocation::Header,
            oas3::spec::ParameterIn::Cookie => ParameterLocation::Cookie,
        }
    }
}

/// A parameter declared on an operation (or inherited from its path item).
#[derive(Debug, Clone)]
pub struct ParameterMeta {
    pub name: String,
    pub location: ParameterLocation,
    pub required: bool,
    pub schema: Option<Value>,
    pub style: Option<ParameterStyle>,
    pub explode: Option<bool>,
}

/// One declared operation: a method on an API path template.
#[derive(Debug, Clone)]
pub struct OperationMeta {
    pub method: Method,
    /// API path template this operation is declared under (e.g. `/hello/{name}`)
    pub path: Arc<str>,
    /// `operationId`, or `{method}_{path}` when the document omits it
    pub operation_id: Arc<str>,
    pub parameters: Vec<ParameterMeta>,
    pub request_schema: Option<Value>,
    pub request_body_required: bool,
    pub security: Vec<SecurityRequirement>,
}

impl OperationMeta {
    /// Look up a declared parameter by name and location.
    #[must_use]
    pub fn parameter(&self, name: &str, location: ParameterLocation) -> Option<&ParameterMeta> {
        self.parameters
            .iter()
            .find(|p| p.location == location && p.name == name)
    }
}

/// All operations declared for one API path template, keyed by method.
///
/// Owned by [`ApiDescription`](super::ApiDescription) behind an `Arc`; caches hold
/// clones of that `Arc`, never copies of the group.
#[derive(Debug, Clone, Default)]
pub struct OperationGroup {
    pub path: Arc<str>,
    operations: HashMap<Method, Arc<OperationMeta>>,
}

impl OperationGroup {
    pub fn new(path: impl Into<Arc<str>>) -> Self {
        Self {
            path: path.into(),
            operations: HashMap::new(),
        }
    }

    pub fn insert(&mut self, operation: OperationMeta) {
        self.operations
            .insert(operation.method.clone(), Arc::new(operation));
    }

    /// Operation declared for `method`, if any.
    #[must_use]
    pub fn operation(&self, method: &Method) -> Option<&Arc<OperationMeta>> {
        self.operations.get(method)
    }

    /// Declared methods, sorted for stable output.
    #[must_use]
    pub fn methods(&self) -> Vec<&Method> {
        let mut methods: Vec<&Method> = self.operations.keys().collect();
        methods.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        methods
    }

    pub fn operations(&self) -> impl Iterator<Item = &Arc<OperationMeta>> {
        self.operations.values()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }
}
