//! Service registration
//!
//! Versioning options are registered unconditionally so handlers can resolve
//! a requested version even when documentation is switched off. Everything
//! else depends on the `Swagger` section.

use crate::{AssemblyInfo, Result, SwaggerConfigurationSection, SwaggerError};
use std::collections::HashMap;
use verdoc_config::ConfigManager;
use verdoc_core::logging::{debug, info};
use verdoc_core::{
    ApiDescription, ApiDescriptionProvider, ApiVersion, ApiVersionDescription,
    ApiVersionDescriptionProvider, ApiVersioningOptions, Container,
};
use verdoc_openapi::{
    Info, SecurityRequirement, SecurityScheme, SwaggerGenOptions, SwaggerGenerator,
};

/// Appended to the description of deprecated version documents
pub const DEPRECATION_DESCRIPTION: &str = "This API version is obsolete.";

/// Name of the bearer security scheme
pub const BEARER_SCHEME: &str = "Bearer";

pub const BEARER_DESCRIPTION: &str =
    "JWT Authorization header using the Bearer scheme. Example: \"Authorization: Bearer {token}\"";

/// Versioning options registered by [`SwaggerServiceExt::add_swagger`]
pub fn default_versioning_options() -> ApiVersioningOptions {
    ApiVersioningOptions::new()
        .report_api_versions(true)
        .assume_default_version_when_unspecified(true)
        .default_api_version(ApiVersion::new(1, 0))
}

/// Document information for one API version
pub fn info_for_version(description: &ApiVersionDescription, service_name: &str) -> Info {
    let info = Info::new(
        format!("swagger {}", service_name),
        description.api_version.to_string(),
    );
    if description.is_deprecated {
        info.with_description(DEPRECATION_DESCRIPTION)
    } else {
        info
    }
}

/// Global requirement referencing the bearer scheme
pub fn bearer_requirement() -> SecurityRequirement {
    SecurityRequirement::from([(BEARER_SCHEME.to_string(), vec![BEARER_SCHEME.to_string()])])
}

/// Inclusion by version: a description is listed in a version's document when
/// its route maps that version. Version-neutral routes are listed everywhere.
fn version_inclusion(
    versions: HashMap<String, ApiVersion>,
) -> impl Fn(&str, &ApiDescription) -> bool + Send + Sync + 'static {
    move |document_name, description| {
        let Some(model) = description.version_model() else {
            return true;
        };
        match versions.get(document_name) {
            Some(version) => model.supports(version),
            None => description.group_name.as_deref() == Some(document_name),
        }
    }
}

/// Registers the versioned API explorer unless version descriptions are
/// already provided.
pub fn register_versioned_explorer(container: &Container) {
    if container.has_dyn::<dyn ApiVersionDescriptionProvider>()
        && container.has_dyn::<dyn ApiDescriptionProvider>()
    {
        debug!("API explorer already registered");
        return;
    }
    container.add_versioned_api_explorer();
}

/// Swagger registration on the service container
pub trait SwaggerServiceExt {
    /// Register versioning and, unless disabled, document generation.
    ///
    /// Routes must be registered with the container beforehand; the
    /// documents published are those of the versions discovered now.
    fn add_swagger(&self, config: &ConfigManager, assembly: &AssemblyInfo) -> Result<()>;

    /// Like [`add_swagger`](Self::add_swagger) with a custom explorer
    /// registration step.
    fn add_swagger_with_explorer<F>(
        &self,
        config: &ConfigManager,
        assembly: &AssemblyInfo,
        register_explorer: F,
    ) -> Result<()>
    where
        F: FnOnce(&Container);
}

impl SwaggerServiceExt for Container {
    fn add_swagger(&self, config: &ConfigManager, assembly: &AssemblyInfo) -> Result<()> {
        self.add_swagger_with_explorer(config, assembly, register_versioned_explorer)
    }

    fn add_swagger_with_explorer<F>(
        &self,
        config: &ConfigManager,
        assembly: &AssemblyInfo,
        register_explorer: F,
    ) -> Result<()>
    where
        F: FnOnce(&Container),
    {
        self.add_api_versioning(default_versioning_options());

        if assembly.name().is_empty() {
            return Err(SwaggerError::InvalidArgument("executingAssembly"));
        }

        let section = SwaggerConfigurationSection::bind(config)?
            .ok_or(SwaggerError::InvalidArgument("swaggerConfiguration"))?;

        if !section.is_enabled() {
            info!("Swagger disabled by configuration");
            return Ok(());
        }

        register_explorer(self);

        let versions = self
            .get_dyn::<dyn ApiVersionDescriptionProvider>()
            .ok_or(SwaggerError::MissingProvider("ApiVersionDescriptionProvider"))?;
        let descriptions = self
            .get_dyn::<dyn ApiDescriptionProvider>()
            .ok_or(SwaggerError::MissingProvider("ApiDescriptionProvider"))?;

        let version_descriptions = versions.api_version_descriptions();
        let service_name = assembly.name();

        let mut options = SwaggerGenOptions::new();
        for description in &version_descriptions {
            debug!(
                group = %description.group_name,
                deprecated = description.is_deprecated,
                "Declaring OpenAPI document"
            );
            options = options.swagger_doc(
                description.group_name.clone(),
                info_for_version(description, service_name),
            );
        }

        let by_group: HashMap<String, ApiVersion> = version_descriptions
            .iter()
            .map(|d| (d.group_name.clone(), d.api_version))
            .collect();

        options = options
            .resolve_conflicting_actions(|candidates| candidates[0].clone())
            .custom_schema_ids(|type_ref| type_ref.full_name.to_string())
            .tag_actions_by(|description| description.group_name.iter().cloned().collect())
            .doc_inclusion_predicate(version_inclusion(by_group));

        let xml_path = assembly.xml_doc_path();
        if xml_path.is_file() {
            options = options.include_xml_comments(&xml_path)?;
        } else {
            debug!(path = %xml_path.display(), "No XML documentation file");
        }

        let authorization = section.is_authorization_enabled();
        if authorization {
            options = options
                .add_security_definition(BEARER_SCHEME, SecurityScheme::bearer(BEARER_DESCRIPTION))
                .add_security_requirement(bearer_requirement());
        }

        info!(
            service = service_name,
            documents = version_descriptions.len(),
            authorization,
            "Swagger generation registered"
        );

        self.register(options.clone());
        self.register(SwaggerGenerator::new(options, descriptions));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use verdoc_config::FileFormat;
    use verdoc_core::{
        ApiVersionModel, EndpointMetadata, HttpMethod, HttpResponse, Route, handler_fn,
    };

    fn config(json: &str) -> ConfigManager {
        let config = ConfigManager::new();
        config.load_str(json, FileFormat::Json).unwrap();
        config
    }

    fn assembly() -> AssemblyInfo {
        AssemblyInfo::new("orders", std::env::temp_dir().join("verdoc-no-xml-here"))
    }

    fn versioned_container() -> Container {
        let container = Container::new();
        container.add_route(
            Route::new(
                HttpMethod::GET,
                "/orders",
                handler_fn(|_req| async { Ok(HttpResponse::ok()) }),
            )
            .with_metadata(
                EndpointMetadata::new()
                    .operation_id("list_orders")
                    .versions(ApiVersionModel::declared([ApiVersion::V1, ApiVersion::V2]).deprecate(ApiVersion::V1)),
            ),
        );
        container
    }

    #[test]
    fn test_info_for_version() {
        let current = ApiVersionDescription::new(ApiVersion::V2, "2.0", false);
        let info = info_for_version(&current, "orders");
        assert_eq!(info.title, "swagger orders");
        assert_eq!(info.version, "2.0");
        assert!(info.description.is_none());

        let old = ApiVersionDescription::new(ApiVersion::V1, "1.0", true);
        assert_eq!(
            info_for_version(&old, "orders").description.as_deref(),
            Some(DEPRECATION_DESCRIPTION)
        );
    }

    #[test]
    fn test_version_inclusion() {
        let predicate = version_inclusion(HashMap::from([
            ("1.0".to_string(), ApiVersion::V1),
            ("2.0".to_string(), ApiVersion::V2),
        ]));

        let neutral = ApiDescription {
            method: HttpMethod::GET,
            relative_path: "/health".into(),
            group_name: Some("1.0".into()),
            api_version: Some(ApiVersion::V1),
            metadata: EndpointMetadata::new(),
        };
        assert!(predicate("1.0", &neutral));
        assert!(predicate("2.0", &neutral));

        let v2_only = ApiDescription {
            metadata: EndpointMetadata::new().versions(ApiVersionModel::declared([ApiVersion::V2])),
            group_name: Some("2.0".into()),
            api_version: Some(ApiVersion::V2),
            ..neutral.clone()
        };
        assert!(!predicate("1.0", &v2_only));
        assert!(predicate("2.0", &v2_only));
        assert!(!predicate("unknown", &v2_only));
    }

    #[test]
    fn test_registration_declares_documents() {
        let container = versioned_container();
        container
            .add_swagger(&config(r#"{"Swagger": {"Enabled": true}}"#), &assembly())
            .unwrap();

        let options = container.resolve::<SwaggerGenOptions>().unwrap();
        let names: Vec<&str> = options.docs().iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["1.0", "2.0"]);
        assert_eq!(
            options.doc("1.0").unwrap().info.description.as_deref(),
            Some(DEPRECATION_DESCRIPTION)
        );
        assert!(options.xml_comments().is_empty());
        assert!(container.has::<SwaggerGenerator>());

        let versioning = container.resolve::<ApiVersioningOptions>().unwrap();
        assert!(versioning.report_api_versions);
        assert!(versioning.assume_default_version_when_unspecified);
    }

    #[test]
    fn test_empty_assembly_name() {
        let container = versioned_container();
        let result = container.add_swagger(
            &config(r#"{"Swagger": {}}"#),
            &AssemblyInfo::new("", "."),
        );
        assert!(matches!(
            result,
            Err(SwaggerError::InvalidArgument("executingAssembly"))
        ));
    }

    #[test]
    fn test_existing_explorer_kept() {
        let container = versioned_container();
        let explorer = container.add_versioned_api_explorer();

        register_versioned_explorer(&container);
        let registered = container
            .get_dyn::<dyn ApiVersionDescriptionProvider>()
            .unwrap();
        assert_eq!(
            registered.api_version_descriptions(),
            explorer.api_version_descriptions()
        );
    }
}
