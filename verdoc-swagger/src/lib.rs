//! Configuration-gated Swagger wiring for versioned verdoc services
//!
//! Two steps, both driven by the `Swagger` configuration section:
//!
//! - [`SwaggerServiceExt::add_swagger`] registers API versioning and, unless
//!   `Swagger:Enabled` is `false`, one OpenAPI document per discovered API
//!   version, secured with a `Bearer` scheme unless
//!   `Swagger:AuthorizationEnabled` is `false`.
//! - [`SwaggerApplicationExt::use_swagger`] installs the document and UI
//!   middleware listing those documents.
//!
//! ```
//! use verdoc_config::{ConfigManager, FileFormat};
//! use verdoc_core::{ApplicationBuilder, Container};
//! use verdoc_swagger::{AssemblyInfo, SwaggerApplicationExt, SwaggerServiceExt};
//!
//! let config = ConfigManager::new();
//! config
//!     .load_str(r#"{"Swagger": {"Enabled": true}}"#, FileFormat::Json)
//!     .unwrap();
//!
//! let container = Container::new();
//! container
//!     .add_swagger(&config, &AssemblyInfo::new("orders", "."))
//!     .unwrap();
//!
//! let builder = ApplicationBuilder::new(container).use_swagger(&config).unwrap();
//! assert_eq!(builder.middleware().len(), 2);
//! ```

pub mod activation;
pub mod assembly;
pub mod error;
pub mod registration;
pub mod section;

pub use activation::{SwaggerApplicationExt, ui_options_for};
pub use assembly::AssemblyInfo;
pub use error::{Result, SwaggerError};
pub use registration::{
    BEARER_DESCRIPTION, BEARER_SCHEME, DEPRECATION_DESCRIPTION, SwaggerServiceExt,
    bearer_requirement, default_versioning_options, info_for_version,
    register_versioned_explorer,
};
pub use section::SwaggerConfigurationSection;
