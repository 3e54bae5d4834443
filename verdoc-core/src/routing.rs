// Routing system for HTTP requests

use crate::logging::debug;
use crate::{ApiVersionModel, Error, HandlerFn, HttpMethod, HttpRequest, HttpResponse, Provider};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

/// Reference to a Rust type used as a request or response body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeRef {
    /// Fully-qualified path, as reported by `std::any::type_name`
    pub full_name: &'static str,
}

impl TypeRef {
    pub fn of<T: ?Sized>() -> Self {
        Self {
            full_name: std::any::type_name::<T>(),
        }
    }

    /// Last path segment, generic arguments included
    pub fn short_name(&self) -> &'static str {
        let base = self.full_name.split('<').next().unwrap_or(self.full_name);
        match base.rfind("::") {
            Some(idx) => &self.full_name[idx + 2..],
            None => self.full_name,
        }
    }
}

/// Descriptive data attached to a route, consumed by API explorers.
#[derive(Debug, Clone, Default)]
pub struct EndpointMetadata {
    pub operation_id: Option<String>,
    pub summary: Option<String>,
    /// Versions the route is mapped to; `None` means version-neutral
    pub version_model: Option<ApiVersionModel>,
    pub request_type: Option<TypeRef>,
    pub response_type: Option<TypeRef>,
}

impl EndpointMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn operation_id(mut self, id: impl Into<String>) -> Self {
        self.operation_id = Some(id.into());
        self
    }

    pub fn summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    pub fn versions(mut self, model: ApiVersionModel) -> Self {
        self.version_model = Some(model);
        self
    }

    pub fn accepts<T: ?Sized>(mut self) -> Self {
        self.request_type = Some(TypeRef::of::<T>());
        self
    }

    pub fn produces<T: ?Sized>(mut self) -> Self {
        self.response_type = Some(TypeRef::of::<T>());
        self
    }
}

/// Route definition with handler
#[derive(Clone)]
pub struct Route {
    pub method: HttpMethod,
    pub path: String,
    pub handler: HandlerFn,
    pub metadata: EndpointMetadata,
}

impl Route {
    pub fn new(method: HttpMethod, path: impl Into<String>, handler: HandlerFn) -> Self {
        Self {
            method,
            path: path.into(),
            handler,
            metadata: EndpointMetadata::default(),
        }
    }

    pub fn with_metadata(mut self, metadata: EndpointMetadata) -> Self {
        self.metadata = metadata;
        self
    }
}

impl std::fmt::Debug for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Route")
            .field("method", &self.method)
            .field("path", &self.path)
            .field("metadata", &self.metadata)
            .finish()
    }
}

/// Routes registered with the service container.
///
/// Registration code adds routes here before the documentation and versioning
/// services are wired, so explorers can see every endpoint.
#[derive(Default)]
pub struct EndpointRegistry {
    routes: RwLock<Vec<Route>>,
}

impl EndpointRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, route: Route) {
        debug!(method = route.method.as_str(), path = %route.path, "Endpoint registered");
        self.routes
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(route);
    }

    /// Snapshot of the registered routes, in registration order
    pub fn routes(&self) -> Vec<Route> {
        self.routes
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn len(&self) -> usize {
        self.routes.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Provider for EndpointRegistry {}

impl crate::Container {
    /// The container's endpoint registry, created on first use
    pub fn endpoints(&self) -> Arc<EndpointRegistry> {
        self.resolve_or_register(EndpointRegistry::new)
    }

    /// Register a route with the container's endpoint registry
    pub fn add_route(&self, route: Route) {
        self.endpoints().add(route);
    }
}

/// Router for managing routes and dispatching requests
#[derive(Default)]
pub struct Router {
    pub routes: Vec<Route>,
}

impl Router {
    pub fn new() -> Self {
        Self { routes: Vec::new() }
    }

    /// Add a route to the router
    pub fn add_route(&mut self, route: Route) {
        self.routes.push(route);
    }

    /// Find a route that matches the request
    pub async fn route(&self, mut request: HttpRequest) -> Result<HttpResponse, Error> {
        let (path, query_string) = match request.path.split_once('?') {
            Some((p, q)) => (p.to_string(), Some(q.to_string())),
            None => (request.path.clone(), None),
        };

        if let Some(query) = query_string {
            request.query_params.extend(parse_query_string(&query));
            request.path = path.clone();
        }

        let method = HttpMethod::from_str(&request.method);
        let mut path_matched = false;

        for route in &self.routes {
            let Some(params) = match_path(&route.path, &path) else {
                continue;
            };
            if method != Some(route.method) {
                path_matched = true;
                continue;
            }
            request.path_params = params;
            return (route.handler)(request).await;
        }

        if path_matched {
            Err(Error::MethodNotAllowed(format!("{} {}", request.method, path)))
        } else {
            Err(Error::RouteNotFound(format!("{} {}", request.method, path)))
        }
    }
}

/// Match a route path pattern against a request path
/// Returns Some(params) if matched, None otherwise
fn match_path(pattern: &str, path: &str) -> Option<HashMap<String, String>> {
    let pattern_parts: Vec<&str> = pattern.split('/').filter(|s| !s.is_empty()).collect();
    let path_parts: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

    if pattern_parts.len() != path_parts.len() {
        return None;
    }

    let mut params = HashMap::new();

    for (pattern_part, path_part) in pattern_parts.iter().zip(path_parts.iter()) {
        if let Some(param_name) = pattern_part
            .strip_prefix(':')
            .or_else(|| pattern_part.strip_prefix('{').and_then(|p| p.strip_suffix('}')))
        {
            params.insert(param_name.to_string(), path_part.to_string());
        } else if pattern_part != path_part {
            return None;
        }
    }

    Some(params)
}

/// Parse a query string into a map of parameters
fn parse_query_string(query: &str) -> HashMap<String, String> {
    query
        .split('&')
        .filter(|part| !part.is_empty())
        .filter_map(|part| {
            let mut split = part.splitn(2, '=');
            let key = split.next()?;
            let value = split.next().unwrap_or("");
            Some((key.to_string(), value.to_string()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    mod models {
        pub struct User;
    }

    #[test]
    fn test_type_ref_names() {
        let type_ref = TypeRef::of::<models::User>();
        assert!(type_ref.full_name.ends_with("routing::tests::models::User"));
        assert_eq!(type_ref.short_name(), "User");

        let generic = TypeRef::of::<Vec<models::User>>();
        assert!(generic.short_name().starts_with("Vec<"));
    }

    #[test]
    fn test_match_path_with_params() {
        let params = match_path("/users/:id", "/users/123").unwrap();
        assert_eq!(params.get("id"), Some(&"123".to_string()));

        let params = match_path("/swagger/{documentName}/swagger.json", "/swagger/1.0/swagger.json")
            .unwrap();
        assert_eq!(params.get("documentName"), Some(&"1.0".to_string()));

        assert!(match_path("/users/:id", "/posts/123").is_none());
        assert!(match_path("/", "/").is_some());
    }

    #[test]
    fn test_parse_query_string() {
        let params = parse_query_string("name=john&api-version=2.0");
        assert_eq!(params.get("name"), Some(&"john".to_string()));
        assert_eq!(params.get("api-version"), Some(&"2.0".to_string()));
        assert!(parse_query_string("").is_empty());
    }

    #[tokio::test]
    async fn test_router_dispatch() {
        let mut router = Router::new();
        router.add_route(Route::new(
            HttpMethod::GET,
            "/users/:id",
            crate::handler_fn(|req: HttpRequest| async move {
                let id = req.param("id").cloned().unwrap_or_default();
                let version = req.query("api-version").cloned().unwrap_or_default();
                Ok(HttpResponse::ok().with_body(format!("{}@{}", id, version).into_bytes()))
            }),
        ));

        let response = router
            .route(HttpRequest::new("GET", "/users/7?api-version=1.0"))
            .await
            .unwrap();
        assert_eq!(response.text(), "7@1.0");

        let wrong_method = router.route(HttpRequest::new("POST", "/users/7")).await;
        assert!(matches!(wrong_method, Err(Error::MethodNotAllowed(_))));

        let missing = router.route(HttpRequest::new("GET", "/orders/7")).await;
        assert!(matches!(missing, Err(Error::RouteNotFound(_))));

        let unknown_method = router.route(HttpRequest::new("BREW", "/users/7")).await;
        assert!(matches!(unknown_method, Err(Error::MethodNotAllowed(_))));
    }

    #[test]
    fn test_container_endpoints() {
        let container = crate::Container::new();
        container.add_route(
            Route::new(
                HttpMethod::GET,
                "/ping",
                crate::handler_fn(|_req| async { Ok(HttpResponse::ok()) }),
            )
            .with_metadata(EndpointMetadata::new().operation_id("ping")),
        );

        let routes = container.endpoints().routes();
        assert_eq!(routes.len(), 1);
        assert_eq!(routes[0].metadata.operation_id.as_deref(), Some("ping"));
    }
}
