// Error types for document generation

use std::path::PathBuf;
use thiserror::Error;
use verdoc_core::HttpMethod;

#[derive(Error, Debug)]
pub enum OpenApiError {
    #[error("Unknown OpenAPI document: {0}")]
    UnknownDocument(String),

    #[error("Conflicting method/path combination \"{} {path}\"; configure a conflicting actions resolver", method.as_str())]
    ConflictingActions { method: HttpMethod, path: String },

    #[error("Invalid XML comments in {}: {message}", path.display())]
    XmlComments { path: PathBuf, message: String },

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, OpenApiError>;

impl From<OpenApiError> for verdoc_core::Error {
    fn from(err: OpenApiError) -> Self {
        match err {
            OpenApiError::UnknownDocument(_) => verdoc_core::Error::NotFound(err.to_string()),
            OpenApiError::Serialization(msg) => verdoc_core::Error::Serialization(msg),
            other => verdoc_core::Error::Internal(other.to_string()),
        }
    }
}
