// Two-version orders service with Swagger enabled from configuration
//
// Run with `cargo run --bin verdoc-demo` and open
// http://localhost:3000/swagger. `VERDOC_SWAGGER__ENABLED=false` turns the
// documents off; `VERDOC_SWAGGER__AUTHORIZATIONENABLED=false` drops the
// bearer scheme.

use verdoc::logging::{LogConfig, LogFormat, LogLevel, info};
use verdoc::prelude::*;
use verdoc::verdoc_config::FileFormat;

#[derive(Serialize)]
struct Order {
    id: u32,
    item: &'static str,
}

fn routes(container: &Container) {
    let versioning = container
        .get::<ApiVersioningOptions>()
        .unwrap_or_default();

    container.add_route(
        Route::new(
            HttpMethod::GET,
            "/health",
            handler_fn(|_req| async { Ok(HttpResponse::ok().with_content("text/plain", "ok")) }),
        )
        .with_metadata(EndpointMetadata::new().operation_id("health")),
    );

    container.add_route(
        Route::new(
            HttpMethod::GET,
            "/orders",
            handler_fn(move |req| {
                let versioning = versioning.clone();
                async move {
                    let version = versioning.resolve_version(&req)?;
                    let orders = vec![Order { id: 1, item: "widget" }];
                    HttpResponse::ok()
                        .with_header("x-served-version", version.to_string())
                        .with_json(&orders)
                }
            }),
        )
        .with_metadata(
            EndpointMetadata::new()
                .operation_id("list_orders")
                .summary("List orders")
                .produces::<Vec<Order>>()
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
            handler_fn(|_req| async {
                HttpResponse::new(201).with_json(&Order { id: 2, item: "gadget" })
            }),
        )
        .with_metadata(
            EndpointMetadata::new()
                .operation_id("create_order")
                .accepts::<Order>()
                .produces::<Order>()
                .versions(ApiVersionModel::declared([ApiVersion::V2])),
        ),
    );
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _guard = LogConfig::new()
        .level(LogLevel::Debug)
        .format(LogFormat::Pretty)
        .init()?;

    let config = ConfigService::builder()
        .add_file("config/appsettings.json", FileFormat::Json)
        .load_dotenv(None)
        .with_prefix("VERDOC_")
        .load_env()
        .build()?;
    let port = config.get_or("Server:Port", 3000u16);

    let container = Container::new();
    container.add_api_versioning(verdoc::verdoc_swagger::default_versioning_options());
    routes(&container);
    container.add_swagger(config.manager(), &AssemblyInfo::named("orders")?)?;

    let builder = ApplicationBuilder::new(container)
        .use_middleware(LoggerMiddleware)
        .use_swagger(config.manager())?;

    info!(port, "Starting orders service");
    builder.build().listen(port).await?;
    Ok(())
}
