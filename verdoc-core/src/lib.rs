// Core library for the verdoc framework
// This module contains the container, request pipeline and API versioning primitives

pub mod application;
pub mod container;
pub mod error;
pub mod explorer;
pub mod http;
pub mod logging;
pub mod middleware;
pub mod routing;
pub mod traits;
pub mod versioning;

// Re-export commonly used types
pub use application::*;
pub use container::*;
pub use error::*;
pub use explorer::*;
pub use http::*;
pub use middleware::*;
pub use routing::*;
pub use traits::*;
pub use versioning::*;
