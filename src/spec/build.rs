use super::description::ApiDescription;
use super::types::{OperationGroup, OperationMeta, ParameterLocation, ParameterMeta, ParameterStyle};
use super::SecurityScheme;
use oas3::spec::{ObjectOrReference, Parameter};
use oas3::OpenApiV3Spec;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};

/// A structural problem found while building the description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecIssue {
    pub location: String,
    pub kind: &'static str,
    pub message: String,
}

impl SpecIssue {
    fn new(location: impl Into<String>, kind: &'static str, message: impl Into<String>) -> Self {
        SpecIssue {
            location: location.into(),
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for SpecIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.kind, self.location, self.message)
    }
}

/// Resolve a JSON Schema `$ref` of the form `#/components/schemas/{name}`.
pub fn resolve_schema_ref<'a>(
    spec: &'a OpenApiV3Spec,
    ref_path: &str,
) -> Option<&'a oas3::spec::ObjectSchema> {
    let name = ref_path.strip_prefix("#/components/schemas/")?;
    spec.components
        .as_ref()?
        .schemas
        .get(name)
        .and_then(|schema_ref| match schema_ref {
            ObjectOrReference::Object(schema) => Some(schema),
            _ => None,
        })
}

/// Recursively replace `$ref` objects with their resolved schema definitions.
///
/// Component schemas that reference themselves are expanded to a bounded depth
/// and then left as an empty (accept-anything) schema. Returns the `$ref`
/// targets that did not resolve; those objects are left as they were.
#[must_use]
pub fn expand_schema_refs(spec: &OpenApiV3Spec, value: &mut Value) -> Vec<String> {
    let mut unresolved = Vec::new();
    expand_schema_refs_bounded(spec, value, 0, &mut unresolved);
    unresolved
}

const MAX_REF_DEPTH: usize = 16;

fn expand_schema_refs_bounded(
    spec: &OpenApiV3Spec,
    value: &mut Value,
    depth: usize,
    unresolved: &mut Vec<String>,
) {
    match value {
        Value::Object(obj) => {
            if let Some(ref_path) = obj.get("$ref").and_then(|v| v.as_str()) {
                if depth >= MAX_REF_DEPTH {
                    *value = Value::Object(serde_json::Map::new());
                    return;
                }
                match resolve_schema_ref(spec, ref_path).map(serde_json::to_value) {
                    Some(Ok(mut new_val)) => {
                        expand_schema_refs_bounded(spec, &mut new_val, depth + 1, unresolved);
                        *value = new_val;
                        return;
                    }
                    _ => unresolved.push(ref_path.to_string()),
                }
            }
            for v in obj.values_mut() {
                expand_schema_refs_bounded(spec, v, depth, unresolved);
            }
        }
        Value::Array(arr) => {
            for v in arr.iter_mut() {
                expand_schema_refs_bounded(spec, v, depth, unresolved);
            }
        }
        _ => {}
    }
}

/// Collects build problems against the operation (or path item) being built.
pub(crate) struct IssueSink<'a> {
    location: &'a str,
    issues: &'a mut Vec<SpecIssue>,
}

impl<'a> IssueSink<'a> {
    pub(crate) fn new(location: &'a str, issues: &'a mut Vec<SpecIssue>) -> Self {
        Self { location, issues }
    }

    fn unresolved(&mut self, what: &str, ref_path: &str) {
        self.issues.push(SpecIssue::new(
            self.location,
            "UnresolvedRef",
            format!("{what} reference '{ref_path}' does not resolve"),
        ));
    }
}

fn schema_value(
    spec: &OpenApiV3Spec,
    schema: &ObjectOrReference<oas3::spec::ObjectSchema>,
    what: &str,
    sink: &mut IssueSink<'_>,
) -> Option<Value> {
    let serialized = match schema {
        ObjectOrReference::Object(obj) => serde_json::to_value(obj),
        ObjectOrReference::Ref { ref_path, .. } => match resolve_schema_ref(spec, ref_path) {
            Some(resolved) => serde_json::to_value(resolved),
            None => {
                sink.unresolved(what, ref_path);
                return None;
            }
        },
    };
    let mut value = match serialized {
        Ok(value) => value,
        Err(e) => {
            sink.issues.push(SpecIssue::new(
                sink.location,
                "InvalidSchema",
                format!("{what} schema cannot be serialized: {e}"),
            ));
            return None;
        }
    };
    for ref_path in expand_schema_refs(spec, &mut value) {
        sink.unresolved(what, &ref_path);
    }
    Some(value)
}

fn resolve_request_body_ref<'a>(
    spec: &'a OpenApiV3Spec,
    ref_path: &str,
) -> Option<&'a oas3::spec::RequestBody> {
    let name = ref_path.strip_prefix("#/components/requestBodies/")?;
    spec.components
        .as_ref()?
        .request_bodies
        .get(name)
        .and_then(|body_ref| match body_ref {
            ObjectOrReference::Object(body) => Some(body),
            _ => None,
        })
}

/// Extract the `application/json` request body schema and whether the body is required.
pub(crate) fn extract_request_schema(
    spec: &OpenApiV3Spec,
    operation: &oas3::spec::Operation,
    sink: &mut IssueSink<'_>,
) -> (Option<Value>, bool) {
    let req_body = match operation.request_body.as_ref() {
        None => return (None, false),
        Some(ObjectOrReference::Object(body)) => body,
        Some(ObjectOrReference::Ref { ref_path, .. }) => {
            match resolve_request_body_ref(spec, ref_path) {
                Some(body) => body,
                None => {
                    sink.unresolved("request body", ref_path);
                    return (None, false);
                }
            }
        }
    };
    let required = req_body.required.unwrap_or(false);
    let schema = req_body
        .content
        .get("application/json")
        .and_then(|media| media.schema.as_ref())
        .and_then(|s| schema_value(spec, s, "request body", sink));
    (schema, required)
}

/// Extract all security schemes declared under `components.securitySchemes`.
pub fn extract_security_schemes(spec: &OpenApiV3Spec) -> HashMap<String, SecurityScheme> {
    spec.components
        .as_ref()
        .map(|c| {
            c.security_schemes
                .iter()
                .filter_map(|(name, scheme)| match scheme {
                    ObjectOrReference::Object(obj) => Some((name.clone(), obj.clone())),
                    _ => None,
                })
                .collect()
        })
        .unwrap_or_default()
}

fn resolve_parameter_ref<'a>(
    spec: &'a OpenApiV3Spec,
    ref_path: &str,
) -> Option<&'a oas3::spec::Parameter> {
    let name = ref_path.strip_prefix("#/components/parameters/")?;
    spec.components
        .as_ref()?
        .parameters
        .get(name)
        .and_then(|param_ref| match param_ref {
            ObjectOrReference::Object(param) => Some(param),
            _ => None,
        })
}

/// Resolve parameter references and extract their metadata.
///
/// Path parameters are always required, whatever the document says.
/// References that do not resolve are reported to `sink`.
pub(crate) fn extract_parameters(
    spec: &OpenApiV3Spec,
    params: &[ObjectOrReference<Parameter>],
    sink: &mut IssueSink<'_>,
) -> Vec<ParameterMeta> {
    let mut out = Vec::with_capacity(params.len());
    for p in params {
        let param = match p {
            ObjectOrReference::Object(obj) => obj,
            ObjectOrReference::Ref { ref_path, .. } => match resolve_parameter_ref(spec, ref_path) {
                Some(param) => param,
                None => {
                    sink.unresolved("parameter", ref_path);
                    continue;
                }
            },
        };

        let location = ParameterLocation::from(param.location);
        let what = format!("parameter '{}'", param.name);
        out.push(ParameterMeta {
            name: param.name.clone(),
            location,
            required: location == ParameterLocation::Path || param.required.unwrap_or(false),
            schema: param
                .schema
                .as_ref()
                .and_then(|s| schema_value(spec, s, &what, sink)),
            style: param.style.map(ParameterStyle::from),
            explode: param.explode,
        });
    }
    out
}

/// Merge path-item level parameters with operation parameters.
///
/// An operation parameter overrides a path-item parameter with the same name and location.
fn merge_parameters(
    path_level: Vec<ParameterMeta>,
    op_level: Vec<ParameterMeta>,
) -> Vec<ParameterMeta> {
    let mut merged: Vec<ParameterMeta> = path_level
        .into_iter()
        .filter(|p| {
            !op_level
                .iter()
                .any(|o| o.name == p.name && o.location == p.location)
        })
        .collect();
    merged.extend(op_level);
    merged
}

/// `{name}` placeholders of an API path template, in order.
pub(crate) fn template_placeholders(path: &str) -> Vec<&str> {
    path.split('/')
        .filter_map(|seg| seg.strip_prefix('{').and_then(|s| s.strip_suffix('}')))
        .collect()
}

/// Build the path table for an already parsed [`OpenApiV3Spec`].
///
/// # Errors
///
/// Returns an error listing every structural issue found, e.g. a `{placeholder}`
/// with no matching `in: path` parameter declaration.
pub fn build_description(spec: OpenApiV3Spec) -> anyhow::Result<ApiDescription> {
    let mut groups: HashMap<String, Arc<OperationGroup>> = HashMap::new();
    let mut issues = Vec::new();

    if let Some(paths_map) = spec.paths.as_ref() {
        for (path, item) in paths_map {
            let path_params =
                extract_parameters(&spec, &item.parameters, &mut IssueSink::new(path, &mut issues));
            let mut group = OperationGroup::new(path.as_str());

            for (method, operation) in item.methods() {
                let location = format!("{path} {method}");
                let mut sink = IssueSink::new(&location, &mut issues);
                let op_params = extract_parameters(&spec, &operation.parameters, &mut sink);
                let (request_schema, request_body_required) =
                    extract_request_schema(&spec, operation, &mut sink);
                let parameters = merge_parameters(path_params.clone(), op_params);

                for placeholder in template_placeholders(path) {
                    let declared = parameters
                        .iter()
                        .any(|p| p.location == ParameterLocation::Path && p.name == placeholder);
                    if !declared {
                        issues.push(SpecIssue::new(
                            location.as_str(),
                            "MissingPathParameter",
                            format!("placeholder '{{{placeholder}}}' has no 'in: path' parameter"),
                        ));
                    }
                }

                let security = if !operation.security.is_empty() {
                    operation.security.clone()
                } else {
                    spec.security.clone()
                };
                let operation_id = operation.operation_id.clone().unwrap_or_else(|| {
                    format!("{}_{}", method.as_str().to_ascii_lowercase(), path)
                });

                debug!(
                    method = %method,
                    path = %path,
                    operation_id = %operation_id,
                    parameters = parameters.len(),
                    security_requirements = security.len(),
                    "Operation extracted"
                );

                group.insert(OperationMeta {
                    method: method.clone(),
                    path: Arc::from(path.as_str()),
                    operation_id: Arc::from(operation_id.as_str()),
                    parameters,
                    request_schema,
                    request_body_required,
                    security,
                });
            }

            groups.insert(path.clone(), Arc::new(group));
        }
    }

    if !issues.is_empty() {
        let listing: Vec<String> = issues.iter().map(ToString::to_string).collect();
        anyhow::bail!(
            "OpenAPI description has {} issue(s):\n{}",
            issues.len(),
            listing.join("\n")
        );
    }

    let security_schemes = extract_security_schemes(&spec);
    let title = spec.info.title.clone();

    info!(
        title = %title,
        paths = groups.len(),
        operations = groups.values().map(|g| g.len()).sum::<usize>(),
        security_schemes = security_schemes.len(),
        "API description built"
    );

    Ok(ApiDescription::new(title, groups, security_schemes))
}
