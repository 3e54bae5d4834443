//! OpenAPI 3.0 document generation and Swagger UI for verdoc services
//!
//! Documents are declared up front in [`SwaggerGenOptions`], typically one per
//! API version, and generated on request by a [`SwaggerGenerator`] from the
//! route descriptions an API explorer reports.
//!
//! ## Building a document by hand
//!
//! ```
//! use verdoc_openapi::OpenApiBuilder;
//!
//! let spec = OpenApiBuilder::new("My API", "1.0")
//!     .description("A wonderful API")
//!     .server("http://localhost:3000", None)
//!     .add_bearer_auth("Bearer", "JWT Authorization header")
//!     .build();
//!
//! assert_eq!(spec.info.title, "My API");
//! assert!(spec.security_schemes().unwrap().contains_key("Bearer"));
//! ```
//!
//! ## Generating per-version documents
//!
//! ```
//! use std::sync::Arc;
//! use verdoc_core::{ApiDescription, ApiDescriptionProvider};
//! use verdoc_openapi::{Info, SwaggerGenOptions, SwaggerGenerator};
//!
//! struct NoRoutes;
//!
//! impl ApiDescriptionProvider for NoRoutes {
//!     fn api_descriptions(&self) -> Vec<ApiDescription> {
//!         Vec::new()
//!     }
//! }
//!
//! let options = SwaggerGenOptions::new()
//!     .swagger_doc("1.0", Info::new("swagger orders", "1.0"))
//!     .swagger_doc("2.0", Info::new("swagger orders", "2.0"));
//! let generator = SwaggerGenerator::new(options, Arc::new(NoRoutes));
//!
//! let spec = generator.generate("2.0").unwrap();
//! assert_eq!(spec.info.version, "2.0");
//! assert!(generator.generate("3.0").is_err());
//! ```

pub mod builder;
pub mod error;
pub mod generator;
pub mod spec;
pub mod swagger;
pub mod xml_comments;

pub use builder::*;
pub use error::{OpenApiError, Result};
pub use generator::*;
pub use spec::*;
pub use swagger::*;
pub use xml_comments::{MemberDoc, XmlComments};
