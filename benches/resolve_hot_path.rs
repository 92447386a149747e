use brrtguard::engine::SchemaEngine;
use brrtguard::middleware::{OpenApiValidator, ValidatorConfig};
use brrtguard::resolver::Resolver;
use brrtguard::router::Router;
use brrtguard::runtime_config::RuntimeConfig;
use brrtguard::server::Request;
use brrtguard::spec::load_api_description_from_str;
use criterion::{criterion_group, criterion_main, Criterion};
use http::Method;
use std::hint::black_box;
use std::sync::Arc;

fn example_spec() -> &'static str {
    r#"openapi: 3.1.0
info:
  title: Verb Zoo
  version: "1.0.0"
paths:
  /zoo/animals/{id}:
    get:
      operationId: get_animal
      parameters:
        - { name: id, in: path, required: true, schema: { type: integer } }
      responses:
        "200": { description: OK }
  /zoo/animals/{id}/toys/{toy_id}:
    get:
      operationId: animal_toy
      parameters:
        - { name: id, in: path, required: true, schema: { type: integer } }
        - { name: toy_id, in: path, required: true, schema: { type: string } }
      responses:
        "200": { description: OK }
  /zoo/{category}/animals/{id}/habitats/{habitat_id}/sections/{section_id}:
    get:
      operationId: habitat_section
      responses:
        "200": { description: OK }
  /complex/{a}/{b}/{c}/{d}/{e}/{f}/{g}/{h}/{i}:
    get:
      operationId: complex_many_params
      responses:
        "200": { description: OK }
"#
}

fn router() -> Router {
    let mut router = Router::new();
    for template in [
        "/zoo/animals/:id",
        "/zoo/animals/:id/toys/:toy_id",
        "/zoo/:category/animals/:id/habitats/:habitat_id/sections/:section_id",
        "/complex/:a/:b/:c/:d/:e/:f/:g/:h/:i",
    ] {
        router
            .register(Method::GET, template)
            .expect("failed to register route");
    }
    router
}

fn bench_resolve(c: &mut Criterion) {
    let description =
        Arc::new(load_api_description_from_str(example_spec()).expect("failed to load spec"));
    let router = router();
    let resolver = Resolver::new(Arc::clone(&description));
    resolver
        .initialize(router.routes())
        .expect("failed to initialize resolver");

    c.bench_function("resolve_warm", |b| {
        b.iter(|| {
            for route in router.routes() {
                let group = resolver.resolve(&route.template, &route.param_names);
                black_box(&group);
            }
        })
    });

    c.bench_function("resolve_cold", |b| {
        b.iter(|| {
            let cold = Resolver::new(Arc::clone(&description));
            for route in router.routes() {
                black_box(cold.resolve(&route.template, &route.param_names).ok());
            }
        })
    });
}

fn bench_validate(c: &mut Criterion) {
    let description =
        Arc::new(load_api_description_from_str(example_spec()).expect("failed to load spec"));
    let router = router();
    let engine = Arc::new(SchemaEngine::new(&description, &RuntimeConfig::default()));
    let validator = OpenApiValidator::new(description, engine, ValidatorConfig::new());
    validator
        .initialize(router.routes())
        .expect("failed to initialize validator");

    let requests = [
        Request::get("/zoo/animals/123"),
        Request::get("/zoo/animals/123/toys/ball"),
        Request::get("/zoo/cats/animals/123/habitats/88/sections/5"),
        Request::get("/complex/1/2/3/4/5/6/7/8/9"),
    ];
    c.bench_function("validate_request", |b| {
        b.iter(|| {
            for req in &requests {
                if let Some(route) = router.route(&req.method, &req.path) {
                    black_box(validator.validate(req, &route).is_ok());
                }
            }
        })
    });
}

criterion_group!(benches, bench_resolve, bench_validate);
criterion_main!(benches);
