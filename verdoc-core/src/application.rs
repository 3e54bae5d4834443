// Application builder and HTTP server

use crate::logging::{debug, error, info};
use crate::{
    ApiVersionDescriptionProvider, ApiVersioningOptions, Container, Error, HandlerFn, HttpRequest,
    HttpResponse, Middleware, MiddlewareChain, ReportApiVersionsMiddleware, Router,
};
use http_body_util::{BodyExt, Full};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response, body::Incoming as IncomingBody};
use hyper_util::rt::TokioIo;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;

/// Request pipeline under construction.
///
/// Services are registered on the [`Container`] first; the builder then
/// installs middleware in order and finally freezes the routes registered in
/// the container into an [`Application`].
pub struct ApplicationBuilder {
    services: Container,
    middleware: MiddlewareChain,
}

impl ApplicationBuilder {
    pub fn new(services: Container) -> Self {
        Self {
            services,
            middleware: MiddlewareChain::new(),
        }
    }

    /// Services available to middleware during pipeline construction
    pub fn application_services(&self) -> &Container {
        &self.services
    }

    /// Append a middleware to the pipeline
    pub fn use_middleware<M: Middleware + 'static>(mut self, middleware: M) -> Self {
        debug!(middleware = middleware.name(), "Middleware installed");
        self.middleware.use_middleware(middleware);
        self
    }

    /// The middleware installed so far
    pub fn middleware(&self) -> &MiddlewareChain {
        &self.middleware
    }

    /// Freeze the pipeline and the container's routes.
    ///
    /// When the registered [`ApiVersioningOptions`] ask for version reporting
    /// and a version description provider is registered, every response
    /// passes through [`ReportApiVersionsMiddleware`] first.
    pub fn build(mut self) -> Application {
        let report_versions = self
            .services
            .get::<ApiVersioningOptions>()
            .is_some_and(|options| options.report_api_versions);
        if report_versions {
            match self.services.get_dyn::<dyn ApiVersionDescriptionProvider>() {
                Some(provider) => {
                    debug!("API version reporting enabled");
                    self.middleware
                        .wrap_with(ReportApiVersionsMiddleware::new(provider));
                }
                None => debug!("API version reporting requested without a version provider"),
            }
        }

        let mut router = Router::new();
        for route in self.services.endpoints().routes() {
            router.add_route(route);
        }

        info!(
            routes = router.routes.len(),
            middleware = self.middleware.len(),
            "Application built"
        );

        Application {
            container: self.services,
            router: Arc::new(router),
            middleware: self.middleware,
        }
    }
}

/// The main application struct
pub struct Application {
    pub container: Container,
    pub router: Arc<Router>,
    middleware: MiddlewareChain,
}

impl Application {
    /// Get a reference to the DI container
    pub fn container(&self) -> &Container {
        &self.container
    }

    /// Run a request through the middleware pipeline and the router.
    ///
    /// Errors are rendered as JSON error responses.
    pub async fn handle(&self, request: HttpRequest) -> HttpResponse {
        let router = self.router.clone();
        let terminal: HandlerFn = crate::handler_fn(move |req| {
            let router = router.clone();
            async move { router.route(req).await }
        });

        match self.middleware.apply(request, terminal).await {
            Ok(response) => response,
            Err(err) => {
                debug!(error = %err, "Request ended with error");
                HttpResponse::from(err)
            }
        }
    }

    /// Start the HTTP server on the specified port
    pub async fn listen(self, port: u16) -> Result<(), Error> {
        let addr = SocketAddr::from(([0, 0, 0, 0], port));
        let listener = TcpListener::bind(addr).await?;

        info!(address = %addr, "Server listening");

        let app = Arc::new(self);

        loop {
            let (stream, _) = listener.accept().await?;
            let io = TokioIo::new(stream);
            let app = app.clone();

            tokio::spawn(async move {
                let service = service_fn(move |req: Request<IncomingBody>| {
                    let app = app.clone();
                    async move { handle_request(req, app).await }
                });

                if let Err(err) = http1::Builder::new().serve_connection(io, service).await {
                    error!(error = ?err, "Error serving connection");
                }
            });
        }
    }
}

/// Handle an incoming HTTP request
async fn handle_request(
    req: Request<IncomingBody>,
    app: Arc<Application>,
) -> Result<Response<Full<bytes::Bytes>>, hyper::Error> {
    let method = req.method().to_string();
    let path = match req.uri().path_and_query() {
        Some(pq) => pq.as_str().to_string(),
        None => req.uri().path().to_string(),
    };

    let mut request = HttpRequest::new(method, path);

    for (name, value) in req.headers() {
        if let Ok(value_str) = value.to_str() {
            request
                .headers
                .insert(name.to_string(), value_str.to_string());
        }
    }

    let body_bytes = req.collect().await?.to_bytes();
    request.body = body_bytes.to_vec();

    let response = app.handle(request).await;

    let mut builder = Response::builder().status(response.status);
    for (key, value) in response.headers {
        builder = builder.header(key, value);
    }

    let body = Full::new(bytes::Bytes::from(response.body));
    Ok(builder.body(body).unwrap_or_else(|err| {
        error!(error = %err, "Invalid response parts");
        let mut fallback = Response::new(Full::new(bytes::Bytes::new()));
        *fallback.status_mut() = hyper::StatusCode::INTERNAL_SERVER_ERROR;
        fallback
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{HttpMethod, LoggerMiddleware, Route, handler_fn};

    fn container_with_ping() -> Container {
        let container = Container::new();
        container.add_route(Route::new(
            HttpMethod::GET,
            "/ping",
            handler_fn(|_req| async { Ok(HttpResponse::ok().with_body(b"pong".to_vec())) }),
        ));
        container
    }

    #[tokio::test]
    async fn test_build_and_handle() {
        let app = ApplicationBuilder::new(container_with_ping())
            .use_middleware(LoggerMiddleware)
            .build();

        let response = app.handle(HttpRequest::new("GET", "/ping")).await;
        assert_eq!(response.status, 200);
        assert_eq!(response.text(), "pong");
    }

    #[tokio::test]
    async fn test_unknown_route_renders_404() {
        let app = ApplicationBuilder::new(container_with_ping()).build();

        let response = app.handle(HttpRequest::new("GET", "/missing")).await;
        assert_eq!(response.status, 404);
    }

    fn reporting_container(report: bool) -> Container {
        let container = Container::new();
        container.add_api_versioning(crate::ApiVersioningOptions::new().report_api_versions(report));
        container.add_route(
            Route::new(
                HttpMethod::GET,
                "/orders",
                handler_fn(|_req| async { Ok(HttpResponse::ok()) }),
            )
            .with_metadata(crate::EndpointMetadata::new().versions(
                crate::ApiVersionModel::declared([crate::ApiVersion::V1, crate::ApiVersion::V2])
                    .deprecate(crate::ApiVersion::V1),
            )),
        );
        container.add_versioned_api_explorer();
        container
    }

    #[tokio::test]
    async fn test_build_reports_versions_when_enabled() {
        let app = ApplicationBuilder::new(reporting_container(true)).build();

        let response = app.handle(HttpRequest::new("GET", "/orders")).await;
        assert_eq!(response.status, 200);
        assert_eq!(
            response.headers.get("api-supported-versions"),
            Some(&"2.0".to_string())
        );
        assert_eq!(
            response.headers.get("api-deprecated-versions"),
            Some(&"1.0".to_string())
        );
    }

    #[tokio::test]
    async fn test_build_skips_reporting_when_disabled() {
        let app = ApplicationBuilder::new(reporting_container(false)).build();

        let response = app.handle(HttpRequest::new("GET", "/orders")).await;
        assert_eq!(response.status, 200);
        assert!(!response.headers.contains_key("api-supported-versions"));
        assert!(!response.headers.contains_key("api-deprecated-versions"));
    }

    #[tokio::test]
    async fn test_reporting_needs_a_provider() {
        let container = container_with_ping();
        container.add_api_versioning(crate::ApiVersioningOptions::new().report_api_versions(true));

        let app = ApplicationBuilder::new(container).build();
        let response = app.handle(HttpRequest::new("GET", "/ping")).await;
        assert_eq!(response.status, 200);
        assert!(response.headers.is_empty());
    }

    #[test]
    fn test_builder_exposes_services() {
        let container = container_with_ping();
        let builder = ApplicationBuilder::new(container);
        assert_eq!(builder.application_services().endpoints().len(), 1);
        assert!(builder.middleware().is_empty());
    }
}
