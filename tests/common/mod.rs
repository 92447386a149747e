#![allow(dead_code)]

use brrtguard::engine::SchemaEngine;
use brrtguard::middleware::{OpenApiValidator, TracingMiddleware, ValidatorConfig};
use brrtguard::runtime_config::RuntimeConfig;
use brrtguard::router::RouteMatch;
use brrtguard::server::{Request, Response, Service};
use brrtguard::spec::{load_api_description_from_str, ApiDescription};
use brrtguard::ValidationEngine;
use http::Method;
use serde_json::json;
use std::sync::Arc;

pub const TEST_SERVICE: &str = r#"
openapi: 3.1.0
info: { title: Test Service, version: "1.0.0" }
components:
  securitySchemes:
    ApiKeyAuth: { type: apiKey, in: header, name: X-API-Key }
paths:
  /hello/{name}:
    get:
      operationId: hello
      parameters:
        - { name: name, in: path, required: true, schema: { type: string } }
      responses: { "200": { description: OK } }
  /count/{number}/{currency}:
    get:
      operationId: count
      parameters:
        - { name: number, in: path, required: true, schema: { type: integer } }
        - name: currency
          in: path
          required: true
          schema: { type: string, enum: [USD, EUR] }
      responses: { "200": { description: OK } }
  /items/{id}/parts/{idx}:
    get:
      operationId: item_part
      parameters:
        - { name: id, in: path, required: true, schema: { type: string } }
        - { name: idx, in: path, required: true, schema: { type: integer } }
      responses: { "200": { description: OK } }
  /list:
    get:
      operationId: list
      parameters:
        - name: ids
          in: query
          required: true
          schema:
            type: array
            minItems: 2
            items: { type: integer }
      responses: { "200": { description: OK } }
  /security:
    get:
      operationId: secured
      security:
        - ApiKeyAuth: []
      responses: { "200": { description: OK } }
"#;

pub mod temp_files {
    use std::io::Write;
    use tempfile::NamedTempFile;

    /// Write `content` to a fresh temp file ending in `.{ext}`, removed on drop.
    pub fn create_temp_spec(content: &str, ext: &str) -> NamedTempFile {
        let mut file = tempfile::Builder::new()
            .prefix("brrtguard_test_")
            .suffix(&format!(".{ext}"))
            .tempfile()
            .unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    pub fn create_temp_yaml(content: &str) -> NamedTempFile {
        create_temp_spec(content, "yaml")
    }
}

pub fn description() -> Arc<ApiDescription> {
    Arc::new(load_api_description_from_str(TEST_SERVICE).unwrap())
}

fn ok_handler(
    name: &'static str,
) -> impl Fn(&Request, &RouteMatch) -> Response + Send + Sync + 'static {
    move |_req: &Request, route: &RouteMatch| {
        let params: serde_json::Map<String, serde_json::Value> = route
            .params()
            .map(|(k, v)| (k.to_string(), json!(v)))
            .collect();
        Response::ok(json!({ "handler": name, "params": params }))
    }
}

/// Service wired with the default [`SchemaEngine`].
pub fn build_service(config: ValidatorConfig) -> Service {
    let description = description();
    let runtime = RuntimeConfig::default();
    let engine = Arc::new(SchemaEngine::new(&description, &runtime));
    build_service_with_engine(description, engine, config)
}

/// Hello and count are known before `start`. The security and goodbye routes
/// are registered afterwards so they are only ever resolved lazily.
pub fn build_service_with_engine(
    description: Arc<ApiDescription>,
    engine: Arc<dyn ValidationEngine>,
    config: ValidatorConfig,
) -> Service {
    let mut service = Service::new();
    service
        .route(Method::GET, "/hello/:name", ok_handler("hello"))
        .unwrap();
    service
        .route(Method::GET, "/count/:number/:currency", ok_handler("count"))
        .unwrap();
    service
        .route(Method::GET, "/items/:id/parts/:idx", ok_handler("item_part"))
        .unwrap();
    service.add_middleware(Arc::new(TracingMiddleware));
    service.add_validator(Arc::new(OpenApiValidator::new(description, engine, config)));
    assert_eq!(service.start(&RuntimeConfig::default()), Ok(3));

    service
        .route(Method::GET, "/security", ok_handler("secured"))
        .unwrap();
    service
        .route(Method::GET, "/goodbye/:name", ok_handler("goodbye"))
        .unwrap();
    service
        .route(Method::GET, "/list", ok_handler("list"))
        .unwrap();
    service
}
