//! Swagger UI and document endpoints
//!
//! [`SwaggerMiddleware`] serves generated documents at
//! `/{prefix}/{documentName}/swagger.json` (and `.yaml`); [`SwaggerUiMiddleware`]
//! serves the UI at `/{prefix}/index.html`, listing one entry per document.

use crate::generator::SwaggerGenerator;
use crate::spec::OpenApiSpec;
use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use verdoc_core::logging::debug;
use verdoc_core::{Error, HttpRequest, HttpResponse, Middleware, Next};

/// Default route prefix for documents and the UI
pub const DEFAULT_ROUTE_PREFIX: &str = "swagger";

fn request_path(req: &HttpRequest) -> &str {
    req.path.split('?').next().unwrap_or(&req.path)
}

fn trim_prefix(prefix: &str) -> &str {
    prefix.trim_matches('/')
}

/// A document listed in the UI's selector
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UrlDescriptor {
    pub url: String,
    pub name: String,
}

/// Swagger UI configuration
#[derive(Debug, Clone)]
pub struct SwaggerUiOptions {
    /// Path segment the UI is served under (e.g. `"swagger"`)
    pub route_prefix: String,
    /// Title for the Swagger UI page
    pub document_title: String,
    pub urls: Vec<UrlDescriptor>,
}

impl Default for SwaggerUiOptions {
    fn default() -> Self {
        Self {
            route_prefix: DEFAULT_ROUTE_PREFIX.to_string(),
            document_title: "Swagger UI".to_string(),
            urls: Vec::new(),
        }
    }
}

impl SwaggerUiOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// List a document in the UI
    pub fn swagger_endpoint(mut self, url: impl Into<String>, name: impl Into<String>) -> Self {
        self.urls.push(UrlDescriptor {
            url: url.into(),
            name: name.into(),
        });
        self
    }

    pub fn with_route_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.route_prefix = prefix.into();
        self
    }

    /// Set the title
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.document_title = title.into();
        self
    }

    /// Path of the UI page
    pub fn index_path(&self) -> String {
        format!("/{}/index.html", trim_prefix(&self.route_prefix))
    }
}

/// Render the Swagger UI page
pub fn swagger_ui_html(options: &SwaggerUiOptions) -> Result<String, Error> {
    let urls = serde_json::to_string(&options.urls)
        .map_err(|e| Error::Serialization(format!("Failed to serialize UI urls: {}", e)))?;

    Ok(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <link rel="stylesheet" href="https://cdn.jsdelivr.net/npm/swagger-ui-dist@5.10.0/swagger-ui.css">
    <style>
        body {{
            margin: 0;
            padding: 0;
        }}
    </style>
</head>
<body>
    <div id="swagger-ui"></div>
    <script src="https://cdn.jsdelivr.net/npm/swagger-ui-dist@5.10.0/swagger-ui-bundle.js"></script>
    <script src="https://cdn.jsdelivr.net/npm/swagger-ui-dist@5.10.0/swagger-ui-standalone-preset.js"></script>
    <script>
        window.onload = function() {{
            SwaggerUIBundle({{
                urls: {urls},
                dom_id: '#swagger-ui',
                deepLinking: true,
                presets: [
                    SwaggerUIBundle.presets.apis,
                    SwaggerUIStandalonePreset
                ],
                plugins: [
                    SwaggerUIBundle.plugins.DownloadUrl
                ],
                layout: "StandaloneLayout"
            }});
        }};
    </script>
</body>
</html>"#,
        title = options.document_title,
        urls = urls
    ))
}

/// Generate the Swagger UI HTML response
pub fn swagger_ui_response(options: &SwaggerUiOptions) -> Result<HttpResponse, Error> {
    Ok(HttpResponse::ok().with_content("text/html; charset=utf-8", swagger_ui_html(options)?))
}

/// Generate a response carrying the document as JSON
pub fn spec_json_response(spec: &OpenApiSpec) -> Result<HttpResponse, Error> {
    let body = serde_json::to_string_pretty(spec)
        .map_err(|e| Error::Serialization(format!("Failed to serialize spec: {}", e)))?;
    Ok(HttpResponse::ok().with_content("application/json; charset=utf-8", body))
}

/// Generate a response carrying the document as YAML
pub fn spec_yaml_response(spec: &OpenApiSpec) -> Result<HttpResponse, Error> {
    let body = serde_yaml::to_string(spec)
        .map_err(|e| Error::Serialization(format!("Failed to serialize spec: {}", e)))?;
    Ok(HttpResponse::ok().with_content("application/x-yaml", body))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DocumentFormat {
    Json,
    Yaml,
}

/// Serves generated documents
pub struct SwaggerMiddleware {
    generator: Arc<SwaggerGenerator>,
    route_prefix: String,
}

impl SwaggerMiddleware {
    pub fn new(generator: Arc<SwaggerGenerator>) -> Self {
        Self {
            generator,
            route_prefix: DEFAULT_ROUTE_PREFIX.to_string(),
        }
    }

    pub fn with_route_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.route_prefix = prefix.into();
        self
    }

    /// Document name and format addressed by `path`, if any
    fn match_document<'a>(&self, path: &'a str) -> Option<(&'a str, DocumentFormat)> {
        let rest = path
            .trim_start_matches('/')
            .strip_prefix(trim_prefix(&self.route_prefix))?
            .strip_prefix('/')?;
        let (document, file) = rest.split_once('/')?;
        if document.is_empty() {
            return None;
        }
        match file {
            "swagger.json" => Some((document, DocumentFormat::Json)),
            "swagger.yaml" => Some((document, DocumentFormat::Yaml)),
            _ => None,
        }
    }
}

#[async_trait]
impl Middleware for SwaggerMiddleware {
    async fn handle(&self, req: HttpRequest, next: Next) -> Result<HttpResponse, Error> {
        if req.method != "GET" {
            return next(req).await;
        }
        let Some((document, format)) = self.match_document(request_path(&req)) else {
            return next(req).await;
        };

        debug!(document, format = ?format, "Serving OpenAPI document");
        let spec = self.generator.generate(document)?;
        match format {
            DocumentFormat::Json => spec_json_response(&spec),
            DocumentFormat::Yaml => spec_yaml_response(&spec),
        }
    }
}

/// Serves the Swagger UI page
pub struct SwaggerUiMiddleware {
    options: SwaggerUiOptions,
}

impl SwaggerUiMiddleware {
    pub fn new(options: SwaggerUiOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &SwaggerUiOptions {
        &self.options
    }
}

#[async_trait]
impl Middleware for SwaggerUiMiddleware {
    async fn handle(&self, req: HttpRequest, next: Next) -> Result<HttpResponse, Error> {
        if req.method != "GET" {
            return next(req).await;
        }

        let prefix = trim_prefix(&self.options.route_prefix);
        let path = request_path(&req).trim_matches('/');

        if path == prefix {
            // Relative document urls resolve against index.html
            return Ok(HttpResponse::moved_permanently(self.options.index_path()));
        }
        if path.strip_prefix(prefix) == Some("/index.html") {
            return swagger_ui_response(&self.options);
        }
        next(req).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::SwaggerGenOptions;
    use crate::spec::Info;
    use verdoc_core::{ApiDescription, ApiDescriptionProvider, MiddlewareChain, handler_fn};

    struct NoRoutes;

    impl ApiDescriptionProvider for NoRoutes {
        fn api_descriptions(&self) -> Vec<ApiDescription> {
            Vec::new()
        }
    }

    fn chain() -> MiddlewareChain {
        let generator = Arc::new(SwaggerGenerator::new(
            SwaggerGenOptions::new().swagger_doc("1.0", Info::new("swagger orders", "1.0")),
            Arc::new(NoRoutes),
        ));
        let ui = SwaggerUiOptions::new()
            .swagger_endpoint("./1.0/swagger.json", "1.0")
            .with_title("Orders");

        let mut chain = MiddlewareChain::new();
        chain.use_middleware(SwaggerMiddleware::new(generator));
        chain.use_middleware(SwaggerUiMiddleware::new(ui));
        chain
    }

    async fn get(path: &str) -> Result<HttpResponse, Error> {
        let fallthrough = handler_fn(|_req| async { Ok(HttpResponse::new(204)) });
        chain().apply(HttpRequest::new("GET", path), fallthrough).await
    }

    #[test]
    fn test_ui_html_lists_urls() {
        let options = SwaggerUiOptions::new()
            .swagger_endpoint("./1.0/swagger.json", "1.0")
            .swagger_endpoint("./2.0/swagger.json", "2.0");
        let html = swagger_ui_html(&options).unwrap();

        assert!(html.contains(r#"{"url":"./1.0/swagger.json","name":"1.0"}"#));
        assert!(html.contains("<title>Swagger UI</title>"));
        assert_eq!(options.index_path(), "/swagger/index.html");
    }

    #[tokio::test]
    async fn test_serves_json_and_yaml() {
        let json = get("/swagger/1.0/swagger.json").await.unwrap();
        assert_eq!(json.status, 200);
        let doc: serde_json::Value = serde_json::from_slice(&json.body).unwrap();
        assert_eq!(doc["info"]["title"], "swagger orders");

        let yaml = get("/swagger/1.0/swagger.yaml?download=1").await.unwrap();
        assert!(yaml.text().contains("title: swagger orders"));
    }

    #[tokio::test]
    async fn test_unknown_document_is_not_found() {
        let err = get("/swagger/9.0/swagger.json").await.unwrap_err();
        assert_eq!(err.status_code(), 404);
    }

    #[tokio::test]
    async fn test_ui_routes() {
        let redirect = get("/swagger").await.unwrap();
        assert_eq!(redirect.status, 301);
        assert_eq!(
            redirect.headers.get("Location"),
            Some(&"/swagger/index.html".to_string())
        );

        let page = get("/swagger/index.html").await.unwrap();
        assert_eq!(page.status, 200);
        assert!(page.text().contains("<title>Orders</title>"));
    }

    #[tokio::test]
    async fn test_other_paths_pass_through() {
        assert_eq!(get("/orders").await.unwrap().status, 204);
        assert_eq!(get("/swagger/1.0/other.json").await.unwrap().status, 204);
        assert_eq!(get("/swaggerish").await.unwrap().status, 204);

        let post = chain()
            .apply(
                HttpRequest::new("POST", "/swagger/1.0/swagger.json"),
                handler_fn(|_req| async { Ok(HttpResponse::new(204)) }),
            )
            .await
            .unwrap();
        assert_eq!(post.status, 204);
    }
}
