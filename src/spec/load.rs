use super::build::build_description;
use super::description::ApiDescription;
use anyhow::Context;
use oas3::OpenApiV3Spec;
use std::path::Path;

fn strip_unknown_verbs(val: &mut serde_json::Value) {
    const METHODS: [&str; 8] = [
        "get", "post", "put", "delete", "patch", "options", "head", "trace",
    ];

    let Some(serde_json::Value::Object(paths_map)) = val.get_mut("paths") else {
        return;
    };
    for item in paths_map.values_mut() {
        if let serde_json::Value::Object(obj) = item {
            obj.retain(|k, _| {
                let lk = k.to_ascii_lowercase();
                match lk.as_str() {
                    "summary" | "description" | "servers" | "parameters" | "$ref" => true,
                    m if METHODS.contains(&m) => true,
                    _ => k.starts_with("x-"),
                }
            });
        }
    }
}

/// Rewrite an operation's explicit `security: []` to `[{}]`.
///
/// Both forms mean "no authentication", but an empty list deserializes the same
/// as an absent key and would fall back to the document-level requirements.
/// A single empty requirement object survives deserialization and always passes.
fn mark_security_opt_outs(val: &mut serde_json::Value) {
    let Some(serde_json::Value::Object(paths_map)) = val.get_mut("paths") else {
        return;
    };
    for item in paths_map.values_mut() {
        let serde_json::Value::Object(obj) = item else {
            continue;
        };
        for operation in obj.values_mut() {
            if let Some(serde_json::Value::Array(security)) = operation.get_mut("security") {
                if security.is_empty() {
                    security.push(serde_json::Value::Object(serde_json::Map::new()));
                }
            }
        }
    }
}

fn parse_document(content: &str, yaml: bool) -> anyhow::Result<OpenApiV3Spec> {
    let mut value: serde_json::Value = if yaml {
        serde_yaml::from_str(content).context("invalid YAML in OpenAPI document")?
    } else {
        serde_json::from_str(content).context("invalid JSON in OpenAPI document")?
    };
    strip_unknown_verbs(&mut value);
    mark_security_opt_outs(&mut value);
    serde_json::from_value(value).context("document is not a valid OpenAPI 3 specification")
}

/// Load an OpenAPI description from a `.yaml`/`.yml` or `.json` file.
pub fn load_api_description(file_path: impl AsRef<Path>) -> anyhow::Result<ApiDescription> {
    let file_path = file_path.as_ref();
    let content = std::fs::read_to_string(file_path)
        .with_context(|| format!("failed to read {}", file_path.display()))?;
    let yaml = matches!(
        file_path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    );
    let spec = parse_document(&content, yaml)
        .with_context(|| format!("failed to parse {}", file_path.display()))?;
    build_description(spec)
}

/// Build a description from YAML text (JSON is valid YAML too).
pub fn load_api_description_from_str(content: &str) -> anyhow::Result<ApiDescription> {
    build_description(parse_document(content, true)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_strip_unknown_verbs() {
        let mut v = json!({
            "paths": {
                "/x": { "get": {}, "patch": {}, "unknown": {}, "x-internal": true }
            }
        });
        strip_unknown_verbs(&mut v);
        assert!(v["paths"]["/x"].get("unknown").is_none());
        assert!(v["paths"]["/x"].get("get").is_some());
        assert!(v["paths"]["/x"].get("x-internal").is_some());
    }

    #[test]
    fn test_load_from_str_builds_path_table() {
        let doc = load_api_description_from_str(
            r#"
openapi: 3.1.0
info: { title: Test Service, version: "1.0.0" }
paths:
  /hello/{name}:
    get:
      operationId: hello
      parameters:
        - { name: name, in: path, required: true, schema: { type: string } }
      responses:
        "200": { description: OK }
"#,
        )
        .unwrap();
        assert_eq!(doc.paths(), vec!["/hello/{name}"]);
        assert_eq!(doc.slug(), "test_service");
    }

    #[test]
    fn test_explicit_empty_security_opts_out() {
        let doc = load_api_description_from_str(
            r#"
openapi: 3.1.0
info: { title: Opt Out, version: "1.0.0" }
security:
  - ApiKeyAuth: []
components:
  securitySchemes:
    ApiKeyAuth: { type: apiKey, in: header, name: X-API-Key }
paths:
  /health:
    get:
      operationId: health
      security: []
      responses:
        "200": { description: OK }
  /secret:
    get:
      operationId: secret
      responses:
        "200": { description: OK }
"#,
        )
        .unwrap();
        let health = doc.path("/health").unwrap();
        let health_op = health.operation(&http::Method::GET).unwrap();
        assert_eq!(health_op.security.len(), 1);
        assert!(health_op.security[0].0.is_empty());

        let secret = doc.path("/secret").unwrap();
        let secret_op = secret.operation(&http::Method::GET).unwrap();
        assert!(secret_op.security[0].0.contains_key("ApiKeyAuth"));
    }

    #[test]
    fn test_load_missing_file_has_context() {
        let err = load_api_description("/definitely/not/here.yaml").unwrap_err();
        assert!(format!("{err:#}").contains("failed to read"));
    }
}
