//! Integration tests for verdoc-core

use verdoc_core::*;

fn versioned_container() -> Container {
    let container = Container::new();
    container.add_api_versioning(
        ApiVersioningOptions::new()
            .report_api_versions(true)
            .assume_default_version_when_unspecified(true)
            .default_api_version(ApiVersion::V1)
            .reader(VersioningStrategy::default_combined()),
    );

    container.add_route(
        Route::new(
            HttpMethod::GET,
            "/users",
            handler_fn(|_req| async { Ok(HttpResponse::ok().with_body(b"users".to_vec())) }),
        )
        .with_metadata(
            EndpointMetadata::new()
                .operation_id("list_users")
                .versions(ApiVersionModel::declared([ApiVersion::V1, ApiVersion::V2]).deprecate(ApiVersion::V1)),
        ),
    );
    container.add_route(
        Route::new(
            HttpMethod::GET,
            "/health",
            handler_fn(|_req| async { Ok(HttpResponse::ok()) }),
        )
        .with_metadata(EndpointMetadata::new().operation_id("health")),
    );
    container
}

#[test]
fn test_explorer_sees_registered_routes() {
    let container = versioned_container();
    let explorer = container.add_versioned_api_explorer();

    let groups: Vec<String> = explorer
        .api_version_descriptions()
        .into_iter()
        .map(|d| d.group_name)
        .collect();
    assert_eq!(groups, vec!["1.0".to_string(), "2.0".to_string()]);

    // two versions for /users, and /health described in both groups
    assert_eq!(explorer.api_descriptions().len(), 4);
}

#[test]
fn test_versioning_options_resolution() {
    let container = versioned_container();
    let options = container.resolve::<ApiVersioningOptions>().unwrap();

    let request = HttpRequest::new("GET", "/users");
    assert_eq!(options.resolve_version(&request).unwrap(), ApiVersion::V1);

    let request = HttpRequest::new("GET", "/users").with_header("X-API-Version", "2.0");
    assert_eq!(options.resolve_version(&request).unwrap(), ApiVersion::V2);
}

#[tokio::test]
async fn test_pipeline_reports_versions() {
    let container = versioned_container();
    container.add_versioned_api_explorer();

    let app = ApplicationBuilder::new(container).build();

    let response = app.handle(HttpRequest::new("GET", "/users")).await;
    assert_eq!(response.status, 200);
    assert_eq!(response.text(), "users");
    assert_eq!(
        response.headers.get("api-supported-versions"),
        Some(&"2.0".to_string())
    );
    assert_eq!(
        response.headers.get("api-deprecated-versions"),
        Some(&"1.0".to_string())
    );
}

#[test]
fn test_missing_dyn_service() {
    let container = Container::new();
    assert!(container.get_dyn::<dyn ApiVersionDescriptionProvider>().is_none());
    assert!(matches!(
        container.resolve_dyn::<dyn ApiDescriptionProvider>(),
        Err(Error::ProviderNotFound(_))
    ));
}
