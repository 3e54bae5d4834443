// Verdoc - versioned HTTP services with configuration-gated API documentation
//
// The core crate is always available; configuration, OpenAPI generation and
// the Swagger wiring are enabled through features.

// Re-export core functionality
pub use verdoc_core::*;

// Re-export optional crates
#[cfg(feature = "config")]
pub use verdoc_config;

#[cfg(feature = "openapi")]
pub use verdoc_openapi;

#[cfg(feature = "swagger")]
pub use verdoc_swagger;

// Prelude for common imports
pub mod prelude {
    pub use crate::{
        ApiVersion, ApiVersionModel, ApiVersioningOptions, Application, ApplicationBuilder,
        Container, EndpointMetadata, Error, HttpMethod, HttpRequest, HttpResponse,
        LoggerMiddleware, Middleware, Provider, ReportApiVersionsMiddleware, Route, handler_fn,
    };

    #[cfg(feature = "config")]
    pub use verdoc_config::{ConfigManager, ConfigService, FileFormat};

    #[cfg(feature = "swagger")]
    pub use verdoc_swagger::{
        AssemblyInfo, SwaggerApplicationExt, SwaggerError, SwaggerServiceExt,
    };

    pub use async_trait::async_trait;
    pub use serde::{Deserialize, Serialize};
    pub use std::sync::Arc;
}
