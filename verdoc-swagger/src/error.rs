// Error types for Swagger wiring

use thiserror::Error;
use verdoc_config::ConfigError;
use verdoc_openapi::OpenApiError;

#[derive(Error, Debug)]
pub enum SwaggerError {
    /// A required input was missing or bound to nothing
    #[error("Value cannot be empty: {0}")]
    InvalidArgument(&'static str),

    /// A service the wiring depends on is not registered
    #[error("Required service not registered: {0}")]
    MissingProvider(&'static str),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    OpenApi(#[from] OpenApiError),

    #[error(transparent)]
    Core(#[from] verdoc_core::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, SwaggerError>;
