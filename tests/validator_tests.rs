mod common;

use brrtguard::engine::{RequestValidationInput, SchemaEngine};
use brrtguard::middleware::{OpenApiValidator, ValidatorConfig};
use brrtguard::resolver::ResolutionError;
use brrtguard::runtime_config::RuntimeConfig;
use brrtguard::security::ApiKeyProvider;
use brrtguard::server::{Request, Response, Service};
use brrtguard::spec::load_api_description;
use brrtguard::{EngineOptions, ValidationEngine, ValidationFailure};
use common::temp_files::create_temp_yaml;
use common::{build_service, build_service_with_engine, description, TEST_SERVICE};
use http::{Method, StatusCode};
use serde_json::json;
use std::sync::Arc;

struct BrokenEngine;

impl ValidationEngine for BrokenEngine {
    fn validate(&self, _input: &RequestValidationInput<'_>) -> Result<(), ValidationFailure> {
        Err(ValidationFailure::Unclassified("engine exploded".to_string()))
    }
}

fn detail(res: &Response) -> &str {
    res.body["detail"].as_str().unwrap_or_default()
}

#[test]
fn test_declared_route_passes() {
    let service = build_service(ValidatorConfig::new());
    let res = service.call(Request::get("/hello/world"));
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["params"], json!({"name": "world"}));
}

#[test]
fn test_config_variants_pass() {
    for config in [
        ValidatorConfig::new(),
        ValidatorConfig::new().options(EngineOptions::default()),
        ValidatorConfig::new().options(EngineOptions {
            multi_error: true,
            ..EngineOptions::default()
        }),
    ] {
        let service = build_service(config);
        assert_eq!(service.call(Request::get("/hello/world")).status, StatusCode::OK);
    }
}

#[test]
fn test_route_without_api_path_is_400() {
    let service = build_service(ValidatorConfig::new());
    let res = service.call(Request::get("/goodbye/world"));
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.body["status"], json!(400));
    assert!(detail(&res).contains("path not used in API specification"));
    assert!(detail(&res).contains("/goodbye/{name}"));
}

#[test]
fn test_undeclared_method_is_400_with_own_message() {
    let service = build_service(ValidatorConfig::new());
    let res = service.call(Request::post("/hello/world"));
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(detail(&res), "method 'POST' not found on path '/hello/world'");
    assert!(!detail(&res).contains("path not used"));
}

#[test]
fn test_positional_values_are_typed() {
    let service = build_service(ValidatorConfig::new());

    let res = service.call(Request::get("/count/USD/100"));
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert!(detail(&res).contains("parameter \"number\" in path"));

    let res = service.call(Request::get("/count/100/USD"));
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["params"], json!({"number": "100", "currency": "USD"}));
}

#[test]
fn test_multi_error_reports_both_params() {
    let config = ValidatorConfig::new().options(EngineOptions {
        multi_error: true,
        ..EngineOptions::default()
    });
    let service = build_service(config);
    let res = service.call(Request::get("/count/USD/100"));
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert!(detail(&res).contains("\"number\""));
    assert!(detail(&res).contains("\"currency\""));
}

#[test]
fn test_repeated_query_keys_validate_as_one_array() {
    let service = build_service(ValidatorConfig::new());
    assert_eq!(service.call(Request::get("/list?ids=1&ids=2")).status, StatusCode::OK);

    let res = service.call(Request::get("/list?ids=1&ids=x"));
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert!(detail(&res).contains("invalid value \"1,x\""), "{}", detail(&res));

    let res = service.call(Request::get("/list?ids=1,,2"));
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
}

#[test]
fn test_security_without_provider_is_403() {
    let service = build_service(ValidatorConfig::new());
    let res = service.call(Request::get("/security").with_header("X-API-Key", "secret"));
    assert_eq!(res.status, StatusCode::FORBIDDEN);
    assert!(detail(&res).starts_with("security requirements failed"));
}

#[test]
fn test_security_with_provider() {
    let description = description();
    let mut engine = SchemaEngine::new(&description, &RuntimeConfig::default());
    engine.register_security_provider("ApiKeyAuth", Arc::new(ApiKeyProvider::new(["secret"])));
    let service = build_service_with_engine(description, Arc::new(engine), ValidatorConfig::new());

    let res = service.call(Request::get("/security").with_header("X-API-Key", "secret"));
    assert_eq!(res.status, StatusCode::OK);

    let res = service.call(Request::get("/security").with_header("X-API-Key", "wrong"));
    assert_eq!(res.status, StatusCode::FORBIDDEN);

    let res = service.call(Request::get("/security"));
    assert_eq!(res.status, StatusCode::FORBIDDEN);
}

#[test]
fn test_exclude_security_option() {
    let config = ValidatorConfig::new().options(EngineOptions {
        exclude_security: true,
        ..EngineOptions::default()
    });
    let service = build_service(config);
    assert_eq!(service.call(Request::get("/security")).status, StatusCode::OK);
}

#[test]
fn test_skipper_bypasses_validation() {
    let config = ValidatorConfig::new().skipper(|req: &Request| req.path == "/security");
    let service = build_service(config);
    assert_eq!(service.call(Request::get("/security")).status, StatusCode::OK);
    // Everything else is still checked
    assert_eq!(
        service.call(Request::get("/count/USD/100")).status,
        StatusCode::BAD_REQUEST
    );
}

#[test]
fn test_unclassified_engine_failure_is_500() {
    let service =
        build_service_with_engine(description(), Arc::new(BrokenEngine), ValidatorConfig::new());
    let res = service.call(Request::get("/hello/world"));
    assert_eq!(res.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(detail(&res), "engine exploded");
}

#[test]
fn test_resolution_failure_precedes_engine() {
    // The engine is never consulted for a route with no API path
    let service =
        build_service_with_engine(description(), Arc::new(BrokenEngine), ValidatorConfig::new());
    let res = service.call(Request::get("/goodbye/world"));
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
}

#[test]
fn test_eager_start_fails_on_gap() {
    let description = description();
    let engine = Arc::new(SchemaEngine::new(&description, &RuntimeConfig::default()));
    let mut service = Service::new();
    service
        .route(Method::GET, "/hello/:name", |_req, _route| Response::ok(json!({})))
        .unwrap();
    service
        .route(Method::GET, "/goodbye/:name", |_req, _route| Response::ok(json!({})))
        .unwrap();
    service.add_validator(Arc::new(OpenApiValidator::new(
        Arc::clone(&description),
        engine,
        ValidatorConfig::new(),
    )));

    let err = service.start(&RuntimeConfig::default()).unwrap_err();
    assert!(matches!(
        err,
        ResolutionError::PathNotInSpec { ref route, .. } if route == "/goodbye/:name"
    ));

    let lazy = RuntimeConfig {
        eager_init: false,
        ..RuntimeConfig::default()
    };
    assert_eq!(service.start(&lazy), Ok(0));
    assert_eq!(service.call(Request::get("/hello/world")).status, StatusCode::OK);
}

#[test]
fn test_eager_start_precompiles_schemas() {
    let description = description();
    let engine = Arc::new(SchemaEngine::new(&description, &RuntimeConfig::default()));
    let service = build_service_with_engine(
        description,
        Arc::clone(&engine) as Arc<dyn ValidationEngine>,
        ValidatorConfig::new(),
    );
    // name; number, currency; id, idx; ids
    assert_eq!(engine.validators().size(), 6);
    assert_eq!(service.call(Request::get("/hello/world")).status, StatusCode::OK);
    assert_eq!(engine.validators().size(), 6);
}

#[test]
fn test_description_loaded_from_file() {
    let file = create_temp_yaml(TEST_SERVICE);
    let description = Arc::new(load_api_description(file.path()).unwrap());
    assert!(description.path("/count/{number}/{currency}").is_some());

    let engine = Arc::new(SchemaEngine::new(&description, &RuntimeConfig::default()));
    let service = build_service_with_engine(description, engine, ValidatorConfig::new());
    assert_eq!(service.call(Request::get("/count/7/EUR")).status, StatusCode::OK);
}

#[test]
fn test_operation_can_opt_out_of_document_security() {
    let description = Arc::new(
        brrtguard::spec::load_api_description_from_str(
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
      responses: { "200": { description: OK } }
  /admin:
    get:
      operationId: admin
      responses: { "200": { description: OK } }
"#,
        )
        .unwrap(),
    );
    let engine = Arc::new(SchemaEngine::new(&description, &RuntimeConfig::default()));
    let mut service = Service::new();
    for template in ["/health", "/admin"] {
        service
            .route(Method::GET, template, |_req, _route| Response::ok(json!({})))
            .unwrap();
    }
    service.add_validator(Arc::new(OpenApiValidator::new(
        Arc::clone(&description),
        engine,
        ValidatorConfig::new(),
    )));
    assert_eq!(service.start(&RuntimeConfig::default()), Ok(2));

    assert_eq!(service.call(Request::get("/health")).status, StatusCode::OK);
    assert_eq!(service.call(Request::get("/admin")).status, StatusCode::FORBIDDEN);
}
