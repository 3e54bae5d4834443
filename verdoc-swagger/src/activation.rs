// Pipeline activation: document and UI middleware

use crate::{Result, SwaggerConfigurationSection, SwaggerError};
use verdoc_config::ConfigManager;
use verdoc_core::logging::{debug, info};
use verdoc_core::{ApiVersionDescriptionProvider, ApplicationBuilder};
use verdoc_openapi::{SwaggerGenerator, SwaggerMiddleware, SwaggerUiMiddleware, SwaggerUiOptions};

/// UI options listing one document per reported version, in reported order.
///
/// Urls are relative to the UI page, so `./1.0/swagger.json` resolves to
/// `/swagger/1.0/swagger.json`.
pub fn ui_options_for(provider: &dyn ApiVersionDescriptionProvider) -> SwaggerUiOptions {
    provider
        .api_version_descriptions()
        .iter()
        .fold(SwaggerUiOptions::new(), |options, description| {
            options.swagger_endpoint(
                format!("./{}/swagger.json", description.group_name),
                description.group_name.to_uppercase(),
            )
        })
}

/// Swagger activation on the request pipeline
pub trait SwaggerApplicationExt: Sized {
    /// Serve the generated documents and the UI unless disabled.
    ///
    /// Requires [`add_swagger`](crate::SwaggerServiceExt::add_swagger) to have
    /// run on the application's container.
    fn use_swagger(self, config: &ConfigManager) -> Result<Self>;
}

impl SwaggerApplicationExt for ApplicationBuilder {
    fn use_swagger(self, config: &ConfigManager) -> Result<Self> {
        let section = SwaggerConfigurationSection::bind(config)?
            .ok_or(SwaggerError::InvalidArgument("swaggerConfiguration"))?;

        if !section.is_enabled() {
            debug!("Swagger disabled, pipeline unchanged");
            return Ok(self);
        }

        let services = self.application_services();
        let provider = services
            .get_dyn::<dyn ApiVersionDescriptionProvider>()
            .ok_or(SwaggerError::MissingProvider("ApiVersionDescriptionProvider"))?;
        let generator = services
            .get::<SwaggerGenerator>()
            .ok_or(SwaggerError::MissingProvider("SwaggerGenerator"))?;

        let ui_options = ui_options_for(provider.as_ref());
        info!(
            endpoints = ui_options.urls.len(),
            index = %ui_options.index_path(),
            "Swagger UI enabled"
        );

        Ok(self
            .use_middleware(SwaggerMiddleware::new(generator))
            .use_middleware(SwaggerUiMiddleware::new(ui_options)))
    }
}
