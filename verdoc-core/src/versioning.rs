//! API Versioning Support
//!
//! Versions are attached to endpoints through an [`ApiVersionModel`] and
//! resolved from requests with a [`VersioningStrategy`]:
//!
//! - **URL Path Versioning**: `/v1/users`, `/v2.0/users`
//! - **Header Versioning**: `X-API-Version: 1.0`
//! - **Query Parameter Versioning**: `/users?api-version=1.0`
//!
//! [`ApiVersioningOptions`] is the service-level switchboard (default version,
//! version reporting) and [`ApiVersionDescriptionProvider`] is the seam through
//! which documentation tooling discovers the versions a service exposes.
//!
//! ```
//! use verdoc_core::versioning::{ApiVersion, ApiVersionModel};
//!
//! let model = ApiVersionModel::new()
//!     .implement(ApiVersion::V1)
//!     .declare(ApiVersion::V2)
//!     .deprecate(ApiVersion::V1);
//!
//! assert!(model.supports(&ApiVersion::V2));
//! assert!(model.is_deprecated(&ApiVersion::V1));
//! assert_eq!(model.versions(), vec![ApiVersion::V1, ApiVersion::V2]);
//! ```

use crate::logging::trace;
use crate::{Error, HttpRequest, HttpResponse, Provider};
use async_trait::async_trait;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

// ============================================================================
// API Version
// ============================================================================

/// Represents an API version as `major.minor`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ApiVersion {
    /// Major version number
    pub major: u32,
    /// Minor version number (defaults to 0)
    pub minor: u32,
}

impl ApiVersion {
    /// Create a new API version.
    pub const fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }

    /// Create a version with only major number.
    pub const fn major_only(major: u32) -> Self {
        Self { major, minor: 0 }
    }

    /// Version 1.0
    pub const V1: Self = Self::new(1, 0);
    /// Version 2.0
    pub const V2: Self = Self::new(2, 0);
    /// Version 3.0
    pub const V3: Self = Self::new(3, 0);

    /// Group name used to key per-version documents (e.g. `"1.0"`).
    pub fn group_name(&self) -> String {
        self.to_string()
    }

    /// Format as URL path prefix (e.g., "v1" or "v1.2")
    pub fn as_path_prefix(&self) -> String {
        if self.minor == 0 {
            format!("v{}", self.major)
        } else {
            format!("v{}.{}", self.major, self.minor)
        }
    }

    /// Parse from URL path prefix (e.g., "v1" or "v1.2")
    pub fn from_path_prefix(s: &str) -> Option<Self> {
        let s = s.strip_prefix('v').or_else(|| s.strip_prefix('V'))?;
        Self::from_str(s).ok()
    }
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

impl FromStr for ApiVersion {
    type Err = VersionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(VersionParseError::Empty);
        }

        let s = s.strip_prefix('v').or_else(|| s.strip_prefix('V')).unwrap_or(s);

        if let Some((major, minor)) = s.split_once('.') {
            let major: u32 = major.parse().map_err(|_| VersionParseError::InvalidFormat)?;
            let minor: u32 = minor.parse().map_err(|_| VersionParseError::InvalidFormat)?;
            Ok(ApiVersion::new(major, minor))
        } else {
            let major: u32 = s.parse().map_err(|_| VersionParseError::InvalidFormat)?;
            Ok(ApiVersion::major_only(major))
        }
    }
}

/// Error parsing an API version string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionParseError {
    /// Invalid version format
    InvalidFormat,
    /// Version string was empty
    Empty,
}

impl fmt::Display for VersionParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidFormat => write!(f, "Invalid version format"),
            Self::Empty => write!(f, "Empty version string"),
        }
    }
}

impl std::error::Error for VersionParseError {}

// ============================================================================
// Versioning Strategy
// ============================================================================

/// Strategy for reading the requested API version.
#[derive(Debug, Clone)]
pub enum VersioningStrategy {
    /// Version from URL path prefix: `/v1/users`
    UrlPath,

    /// Version from an HTTP header: `X-API-Version: 1.0`
    Header { header_name: String },

    /// Version from a query parameter: `/users?api-version=1.0`
    QueryParam { param_name: String },

    /// Try multiple strategies in order
    Combined(Vec<VersioningStrategy>),
}

impl VersioningStrategy {
    pub fn url_path() -> Self {
        Self::UrlPath
    }

    /// Header strategy reading `X-API-Version`.
    pub fn header() -> Self {
        Self::Header {
            header_name: "X-API-Version".into(),
        }
    }

    /// Query strategy reading `api-version`.
    pub fn query_param() -> Self {
        Self::QueryParam {
            param_name: "api-version".into(),
        }
    }

    /// URL path, then header, then query param.
    pub fn default_combined() -> Self {
        Self::Combined(vec![Self::url_path(), Self::header(), Self::query_param()])
    }

    /// Extract API version from a request.
    pub fn extract_version(&self, request: &HttpRequest) -> Option<ApiVersion> {
        match self {
            Self::UrlPath => {
                let segment = request.path.trim_start_matches('/').split('/').next()?;
                ApiVersion::from_path_prefix(segment)
            }
            Self::Header { header_name } => {
                ApiVersion::from_str(request.header(header_name)?).ok()
            }
            Self::QueryParam { param_name } => {
                ApiVersion::from_str(request.query_params.get(param_name)?).ok()
            }
            Self::Combined(strategies) => strategies
                .iter()
                .find_map(|strategy| strategy.extract_version(request)),
        }
    }
}

impl Default for VersioningStrategy {
    fn default() -> Self {
        Self::query_param()
    }
}

// ============================================================================
// Version Model
// ============================================================================

/// Versions an endpoint is mapped to.
///
/// `declared` versions are mapped explicitly on the endpoint; `implemented`
/// versions come from the group (controller) the endpoint belongs to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApiVersionModel {
    pub declared: Vec<ApiVersion>,
    pub implemented: Vec<ApiVersion>,
    pub deprecated: Vec<ApiVersion>,
}

impl ApiVersionModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Model declaring exactly the given versions.
    pub fn declared(versions: impl IntoIterator<Item = ApiVersion>) -> Self {
        Self {
            declared: versions.into_iter().collect(),
            ..Self::default()
        }
    }

    pub fn declare(mut self, version: ApiVersion) -> Self {
        self.declared.push(version);
        self
    }

    pub fn implement(mut self, version: ApiVersion) -> Self {
        self.implemented.push(version);
        self
    }

    pub fn deprecate(mut self, version: ApiVersion) -> Self {
        self.deprecated.push(version);
        self
    }

    /// Whether the version is declared or implemented.
    pub fn supports(&self, version: &ApiVersion) -> bool {
        self.declared.contains(version) || self.implemented.contains(version)
    }

    pub fn is_deprecated(&self, version: &ApiVersion) -> bool {
        self.deprecated.contains(version)
    }

    /// Declared and implemented versions, sorted and de-duplicated.
    pub fn versions(&self) -> Vec<ApiVersion> {
        let mut versions: Vec<ApiVersion> = self
            .declared
            .iter()
            .chain(self.implemented.iter())
            .copied()
            .collect();
        versions.sort();
        versions.dedup();
        versions
    }
}

// ============================================================================
// Versioning Options
// ============================================================================

/// Service-wide API versioning behavior.
#[derive(Debug, Clone)]
pub struct ApiVersioningOptions {
    /// Add `api-supported-versions` / `api-deprecated-versions` response headers
    pub report_api_versions: bool,
    /// Fall back to `default_api_version` when a request names no version
    pub assume_default_version_when_unspecified: bool,
    pub default_api_version: ApiVersion,
    /// How the requested version is read
    pub reader: VersioningStrategy,
}

impl ApiVersioningOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn report_api_versions(mut self, report: bool) -> Self {
        self.report_api_versions = report;
        self
    }

    pub fn assume_default_version_when_unspecified(mut self, assume: bool) -> Self {
        self.assume_default_version_when_unspecified = assume;
        self
    }

    pub fn default_api_version(mut self, version: ApiVersion) -> Self {
        self.default_api_version = version;
        self
    }

    pub fn reader(mut self, reader: VersioningStrategy) -> Self {
        self.reader = reader;
        self
    }

    /// Resolve the version a request targets.
    pub fn resolve_version(&self, request: &HttpRequest) -> Result<ApiVersion, Error> {
        if let Some(version) = self.reader.extract_version(request) {
            return Ok(version);
        }

        if self.assume_default_version_when_unspecified {
            trace!(version = %self.default_api_version, "Assuming default API version");
            return Ok(self.default_api_version);
        }

        Err(Error::BadRequest(
            "API version is required but not provided".to_string(),
        ))
    }
}

impl Default for ApiVersioningOptions {
    fn default() -> Self {
        Self {
            report_api_versions: false,
            assume_default_version_when_unspecified: false,
            default_api_version: ApiVersion::V1,
            reader: VersioningStrategy::default(),
        }
    }
}

impl Provider for ApiVersioningOptions {}

// ============================================================================
// Version Descriptions
// ============================================================================

/// One API version exposed by the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiVersionDescription {
    pub api_version: ApiVersion,
    pub group_name: String,
    pub is_deprecated: bool,
}

impl ApiVersionDescription {
    pub fn new(api_version: ApiVersion, group_name: impl Into<String>, is_deprecated: bool) -> Self {
        Self {
            api_version,
            group_name: group_name.into(),
            is_deprecated,
        }
    }
}

/// Source of the API versions a service exposes.
pub trait ApiVersionDescriptionProvider: Send + Sync {
    /// Versions in ascending order.
    fn api_version_descriptions(&self) -> Vec<ApiVersionDescription>;
}

/// Fixed list of versions, for services that do not derive them from routes.
#[derive(Debug, Clone, Default)]
pub struct StaticVersionDescriptions {
    descriptions: Vec<ApiVersionDescription>,
}

impl StaticVersionDescriptions {
    pub fn new(descriptions: Vec<ApiVersionDescription>) -> Self {
        Self { descriptions }
    }
}

impl ApiVersionDescriptionProvider for StaticVersionDescriptions {
    fn api_version_descriptions(&self) -> Vec<ApiVersionDescription> {
        self.descriptions.clone()
    }
}

// ============================================================================
// Version Reporting
// ============================================================================

/// Adds `api-supported-versions` and `api-deprecated-versions` headers.
pub struct ReportApiVersionsMiddleware {
    provider: Arc<dyn ApiVersionDescriptionProvider>,
}

impl ReportApiVersionsMiddleware {
    pub fn new(provider: Arc<dyn ApiVersionDescriptionProvider>) -> Self {
        Self { provider }
    }
}

fn join_versions<'a>(descriptions: impl Iterator<Item = &'a ApiVersionDescription>) -> String {
    descriptions
        .map(|d| d.api_version.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

#[async_trait]
impl crate::Middleware for ReportApiVersionsMiddleware {
    async fn handle(&self, req: HttpRequest, next: crate::Next) -> Result<HttpResponse, Error> {
        let mut response = next(req).await?;
        let descriptions = self.provider.api_version_descriptions();

        let supported = join_versions(descriptions.iter().filter(|d| !d.is_deprecated));
        if !supported.is_empty() {
            response
                .headers
                .insert("api-supported-versions".to_string(), supported);
        }

        let deprecated = join_versions(descriptions.iter().filter(|d| d.is_deprecated));
        if !deprecated.is_empty() {
            response
                .headers
                .insert("api-deprecated-versions".to_string(), deprecated);
        }

        Ok(response)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_version_display() {
        assert_eq!(ApiVersion::new(1, 0).to_string(), "1.0");
        assert_eq!(ApiVersion::new(2, 3).to_string(), "2.3");
        assert_eq!(ApiVersion::V2.group_name(), "2.0");
    }

    #[test]
    fn test_api_version_from_str() {
        assert_eq!(ApiVersion::from_str("1").unwrap(), ApiVersion::V1);
        assert_eq!(ApiVersion::from_str("2.3").unwrap(), ApiVersion::new(2, 3));
        assert_eq!(ApiVersion::from_str("v1").unwrap(), ApiVersion::V1);
        assert_eq!(ApiVersion::from_str("V2.0").unwrap(), ApiVersion::V2);
        assert_eq!(ApiVersion::from_str(""), Err(VersionParseError::Empty));
        assert_eq!(
            ApiVersion::from_str("one"),
            Err(VersionParseError::InvalidFormat)
        );
    }

    #[test]
    fn test_api_version_path_prefix() {
        assert_eq!(ApiVersion::V1.as_path_prefix(), "v1");
        assert_eq!(ApiVersion::new(2, 3).as_path_prefix(), "v2.3");
        assert_eq!(ApiVersion::from_path_prefix("v2.3"), Some(ApiVersion::new(2, 3)));
        assert_eq!(ApiVersion::from_path_prefix("users"), None);
    }

    #[test]
    fn test_url_path_versioning() {
        let strategy = VersioningStrategy::url_path();
        let request = HttpRequest::new("GET", "/v2/users");
        assert_eq!(strategy.extract_version(&request), Some(ApiVersion::V2));

        let request = HttpRequest::new("GET", "/users");
        assert_eq!(strategy.extract_version(&request), None);
    }

    #[test]
    fn test_combined_versioning() {
        let strategy = VersioningStrategy::default_combined();

        let request = HttpRequest::new("GET", "/v1/users").with_header("x-api-version", "2");
        assert_eq!(strategy.extract_version(&request), Some(ApiVersion::V1));

        let request = HttpRequest::new("GET", "/users").with_header("x-api-version", "2");
        assert_eq!(strategy.extract_version(&request), Some(ApiVersion::V2));

        let mut request = HttpRequest::new("GET", "/users");
        request
            .query_params
            .insert("api-version".to_string(), "3.0".to_string());
        assert_eq!(strategy.extract_version(&request), Some(ApiVersion::V3));
    }

    #[test]
    fn test_version_model() {
        let model = ApiVersionModel::new()
            .implement(ApiVersion::V2)
            .implement(ApiVersion::V1)
            .declare(ApiVersion::V2);

        assert_eq!(model.versions(), vec![ApiVersion::V1, ApiVersion::V2]);
        assert!(model.supports(&ApiVersion::V1));
        assert!(!model.supports(&ApiVersion::V3));
        assert!(!model.is_deprecated(&ApiVersion::V1));
    }

    #[test]
    fn test_resolve_default_version() {
        let options = ApiVersioningOptions::new()
            .assume_default_version_when_unspecified(true)
            .default_api_version(ApiVersion::new(1, 0));

        let request = HttpRequest::new("GET", "/users");
        assert_eq!(options.resolve_version(&request).unwrap(), ApiVersion::V1);

        let strict = ApiVersioningOptions::new();
        assert!(strict.resolve_version(&request).is_err());
    }

    #[tokio::test]
    async fn test_report_api_versions_middleware() {
        use crate::{MiddlewareChain, handler_fn};

        let provider: Arc<dyn ApiVersionDescriptionProvider> =
            Arc::new(StaticVersionDescriptions::new(vec![
                ApiVersionDescription::new(ApiVersion::V1, "1.0", true),
                ApiVersionDescription::new(ApiVersion::V2, "2.0", false),
            ]));

        let mut chain = MiddlewareChain::new();
        chain.use_middleware(ReportApiVersionsMiddleware::new(provider));

        let handler = handler_fn(|_req| async { Ok(HttpResponse::ok()) });
        let response = chain
            .apply(HttpRequest::new("GET", "/users"), handler)
            .await
            .unwrap();

        assert_eq!(
            response.headers.get("api-supported-versions"),
            Some(&"2.0".to_string())
        );
        assert_eq!(
            response.headers.get("api-deprecated-versions"),
            Some(&"1.0".to_string())
        );
    }
}
