//! Integration tests for verdoc-swagger

use std::sync::Arc;
use verdoc_config::{ConfigManager, FileFormat};
use verdoc_core::*;
use verdoc_openapi::{SwaggerGenOptions, SwaggerGenerator};
use verdoc_swagger::*;

struct Order;

fn config(json: &str) -> ConfigManager {
    let config = ConfigManager::new();
    config.load_str(json, FileFormat::Json).unwrap();
    config
}

fn assembly() -> AssemblyInfo {
    AssemblyInfo::new("orders", std::env::temp_dir().join("verdoc-swagger-no-docs"))
}

fn orders_container() -> Container {
    let container = Container::new();
    container.add_route(
        Route::new(
            HttpMethod::GET,
            "/health",
            handler_fn(|_req| async { Ok(HttpResponse::ok()) }),
        )
        .with_metadata(EndpointMetadata::new().operation_id("health")),
    );
    container.add_route(
        Route::new(
            HttpMethod::GET,
            "/orders",
            handler_fn(|_req| async { Ok(HttpResponse::ok()) }),
        )
        .with_metadata(
            EndpointMetadata::new()
                .operation_id("list_orders")
                .produces::<Order>()
                .versions(
                    ApiVersionModel::declared([ApiVersion::V1, ApiVersion::V2])
                        .deprecate(ApiVersion::V1),
                ),
        ),
    );
    container.add_route(
        Route::new(
            HttpMethod::POST,
            "/orders",
            handler_fn(|_req| async { Ok(HttpResponse::new(201)) }),
        )
        .with_metadata(
            EndpointMetadata::new()
                .operation_id("create_order")
                .versions(ApiVersionModel::declared([ApiVersion::V2])),
        ),
    );
    container
}

fn registered(json: &str) -> (Container, ConfigManager) {
    let config = config(json);
    let container = orders_container();
    container.add_swagger(&config, &assembly()).unwrap();
    (container, config)
}

#[test]
fn test_disabled_registers_only_versioning() {
    let (container, config) = registered(r#"{"Swagger": {"Enabled": false}}"#);

    assert!(container.has::<ApiVersioningOptions>());
    assert!(!container.has::<SwaggerGenOptions>());
    assert!(!container.has::<SwaggerGenerator>());
    assert!(!container.has_dyn::<dyn ApiVersionDescriptionProvider>());

    let builder = ApplicationBuilder::new(container).use_swagger(&config).unwrap();
    assert!(builder.middleware().is_empty());
}

#[test]
fn test_missing_provider_fails_both_units() {
    let config = config(r#"{"Swagger": {"Enabled": true}}"#);
    let container = orders_container();

    let registration = container.add_swagger_with_explorer(&config, &assembly(), |_| {});
    assert!(matches!(
        registration,
        Err(SwaggerError::MissingProvider("ApiVersionDescriptionProvider"))
    ));

    let activation = ApplicationBuilder::new(container).use_swagger(&config);
    assert!(matches!(
        activation,
        Err(SwaggerError::MissingProvider("ApiVersionDescriptionProvider"))
    ));
}

#[test]
fn test_missing_section_fails_both_units() {
    let config = config(r#"{"Logging": {"Level": "debug"}}"#);
    let container = orders_container();

    assert!(matches!(
        container.add_swagger(&config, &assembly()),
        Err(SwaggerError::InvalidArgument("swaggerConfiguration"))
    ));
    // Versioning is registered before the section is read
    assert!(container.has::<ApiVersioningOptions>());

    assert!(matches!(
        ApplicationBuilder::new(container).use_swagger(&config),
        Err(SwaggerError::InvalidArgument("swaggerConfiguration"))
    ));
}

#[test]
fn test_bearer_scheme_by_default() {
    let (container, _) = registered(r#"{"Swagger": {"Enabled": true}}"#);
    let generator = container.resolve::<SwaggerGenerator>().unwrap();

    let options = generator.options();
    assert_eq!(options.security_schemes().len(), 1);
    assert_eq!(options.security_requirements().len(), 1);

    let spec = generator.generate("2.0").unwrap();
    let value = serde_json::to_value(&spec).unwrap();
    let bearer = &value["components"]["securitySchemes"][BEARER_SCHEME];
    assert_eq!(bearer["type"], "http");
    assert_eq!(bearer["scheme"], "bearer");
    assert_eq!(bearer["description"], BEARER_DESCRIPTION);
    assert_eq!(value["security"][0]["Bearer"][0], "Bearer");
}

#[test]
fn test_authorization_disabled() {
    let (container, _) =
        registered(r#"{"Swagger": {"Enabled": true, "AuthorizationEnabled": false}}"#);
    let generator = container.resolve::<SwaggerGenerator>().unwrap();

    assert!(generator.options().security_schemes().is_empty());
    assert!(generator.options().security_requirements().is_empty());

    let spec = generator.generate("1.0").unwrap();
    assert!(spec.security.is_empty());
    assert!(spec.security_schemes().is_none_or(|schemes| schemes.is_empty()));
}

#[test]
fn test_documents_follow_version_models() {
    let (container, _) = registered(r#"{"Swagger": {"Enabled": "true"}}"#);
    let generator = container.resolve::<SwaggerGenerator>().unwrap();
    assert_eq!(generator.document_names(), vec!["1.0", "2.0"]);

    let v1 = generator.generate("1.0").unwrap();
    assert_eq!(v1.info.title, "swagger orders");
    assert_eq!(v1.info.description.as_deref(), Some(DEPRECATION_DESCRIPTION));
    assert!(v1.operation("/health", HttpMethod::GET).is_some());
    assert!(v1.operation("/orders", HttpMethod::GET).is_some());
    assert!(v1.operation("/orders", HttpMethod::POST).is_none());

    let v2 = generator.generate("2.0").unwrap();
    assert!(v2.info.description.is_none());
    assert!(v2.operation("/health", HttpMethod::GET).is_some());
    let create = v2.operation("/orders", HttpMethod::POST).unwrap();
    assert_eq!(create.tags, vec!["2.0"]);
}

#[test]
fn test_schema_ids_are_fully_qualified() {
    let (container, _) = registered(r#"{"Swagger": {"Enabled": true}}"#);
    let spec = container
        .resolve::<SwaggerGenerator>()
        .unwrap()
        .generate("2.0")
        .unwrap();

    let schemas = spec.components.unwrap().schemas;
    assert!(schemas.contains_key(std::any::type_name::<Order>()));
}

#[test]
fn test_xml_comments_next_to_binary() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("orders.xml"),
        r#"<?xml version="1.0"?>
<doc>
    <assembly><name>orders</name></assembly>
    <members>
        <member name="M:orders::handlers::create_order">
            <summary>Places a new order.</summary>
        </member>
    </members>
</doc>"#,
    )
    .unwrap();

    let config = config(r#"{"Swagger": {"Enabled": true}}"#);
    let container = orders_container();
    container
        .add_swagger(&config, &AssemblyInfo::new("orders", dir.path()))
        .unwrap();

    let spec = container
        .resolve::<SwaggerGenerator>()
        .unwrap()
        .generate("2.0")
        .unwrap();
    let create = spec.operation("/orders", HttpMethod::POST).unwrap();
    assert_eq!(create.summary.as_deref(), Some("Places a new order."));
}

#[test]
fn test_malformed_xml_comments() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("orders.xml"), "<doc><members>").unwrap();

    let result = orders_container().add_swagger(
        &config(r#"{"Swagger": {"Enabled": true}}"#),
        &AssemblyInfo::new("orders", dir.path()),
    );
    assert!(matches!(result, Err(SwaggerError::OpenApi(_))));
}

#[test]
fn test_ui_endpoints_from_provider() {
    let provider = StaticVersionDescriptions::new(vec![
        ApiVersionDescription::new(ApiVersion::V1, "1.0", false),
        ApiVersionDescription::new(ApiVersion::V2, "2.0", false),
    ]);
    let options = ui_options_for(&provider);

    let urls: Vec<&str> = options.urls.iter().map(|u| u.url.as_str()).collect();
    let names: Vec<&str> = options.urls.iter().map(|u| u.name.as_str()).collect();
    assert_eq!(urls, vec!["./1.0/swagger.json", "./2.0/swagger.json"]);
    assert_eq!(names, vec!["1.0", "2.0"]);
}

#[test]
fn test_registered_providers_kept() {
    let config = config(r#"{"Swagger": {"Enabled": true}}"#);
    let container = orders_container();

    let versions: Arc<dyn ApiVersionDescriptionProvider> =
        Arc::new(StaticVersionDescriptions::new(vec![ApiVersionDescription::new(
            ApiVersion::V3,
            "3.0",
            false,
        )]));
    let descriptions: Arc<dyn ApiDescriptionProvider> = Arc::new(VersionedApiExplorer::new(
        container.endpoints(),
        &ApiVersioningOptions::default(),
    ));
    container.register_dyn(versions);
    container.register_dyn(descriptions);

    container.add_swagger(&config, &assembly()).unwrap();
    let options = container.resolve::<SwaggerGenOptions>().unwrap();
    let names: Vec<&str> = options.docs().iter().map(|d| d.name.as_str()).collect();
    assert_eq!(names, vec!["3.0"]);
}

#[tokio::test]
async fn test_pipeline_serves_documents_and_ui() {
    let (container, config) = registered(r#"{"Swagger": {"Enabled": true}}"#);
    let app = ApplicationBuilder::new(container)
        .use_swagger(&config)
        .unwrap()
        .build();

    let redirect = app.handle(HttpRequest::new("GET", "/swagger")).await;
    assert_eq!(redirect.status, 301);
    assert_eq!(
        redirect.headers.get("Location").map(String::as_str),
        Some("/swagger/index.html")
    );

    let page = app.handle(HttpRequest::new("GET", "/swagger/index.html")).await;
    assert_eq!(page.status, 200);
    let html = page.text();
    assert!(html.contains("./1.0/swagger.json"));
    assert!(html.contains("./2.0/swagger.json"));

    let doc = app
        .handle(HttpRequest::new("GET", "/swagger/2.0/swagger.json"))
        .await;
    assert_eq!(doc.status, 200);
    let value: serde_json::Value = serde_json::from_slice(&doc.body).unwrap();
    assert_eq!(value["info"]["version"], "2.0");
    assert_eq!(value["paths"]["/orders"]["post"]["operationId"], "create_order");

    let yaml = app
        .handle(HttpRequest::new("GET", "/swagger/1.0/swagger.yaml"))
        .await;
    assert!(yaml.text().contains("title: swagger orders"));

    let unknown = app
        .handle(HttpRequest::new("GET", "/swagger/9.0/swagger.json"))
        .await;
    assert_eq!(unknown.status, 404);

    let api = app.handle(HttpRequest::new("POST", "/orders")).await;
    assert_eq!(api.status, 201);
}
