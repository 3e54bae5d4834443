//! Builders for OpenAPI documents and operations

use crate::spec::*;
use std::collections::BTreeMap;

/// OpenAPI version emitted by the builders
pub const OPENAPI_VERSION: &str = "3.0.1";

/// Builder for OpenAPI documents
#[derive(Debug, Clone)]
pub struct OpenApiBuilder {
    spec: OpenApiSpec,
}

impl OpenApiBuilder {
    /// Create a new OpenAPI builder
    pub fn new(title: impl Into<String>, version: impl Into<String>) -> Self {
        Self::from_info(Info::new(title, version))
    }

    /// Start from complete API information
    pub fn from_info(info: Info) -> Self {
        Self {
            spec: OpenApiSpec {
                openapi: OPENAPI_VERSION.to_string(),
                info,
                servers: Vec::new(),
                paths: BTreeMap::new(),
                components: None,
                security: Vec::new(),
                tags: Vec::new(),
            },
        }
    }

    /// Set description
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.spec.info.description = Some(description.into());
        self
    }

    /// Add a server
    pub fn server(mut self, url: impl Into<String>, description: Option<String>) -> Self {
        self.spec.servers.push(Server {
            url: url.into(),
            description,
        });
        self
    }

    /// Add a tag
    pub fn tag(mut self, name: impl Into<String>, description: Option<String>) -> Self {
        self.spec.tags.push(Tag {
            name: name.into(),
            description,
        });
        self
    }

    /// Add an operation, creating the path item if needed
    pub fn operation(
        mut self,
        path: impl Into<String>,
        method: verdoc_core::HttpMethod,
        operation: Operation,
    ) -> Self {
        self.spec
            .paths
            .entry(path.into())
            .or_default()
            .set_operation(method, operation);
        self
    }

    fn components(&mut self) -> &mut Components {
        self.spec.components.get_or_insert_with(Components::default)
    }

    /// Add a schema component
    pub fn schema(mut self, name: impl Into<String>, schema: Schema) -> Self {
        self.components().schemas.insert(name.into(), schema);
        self
    }

    /// Add a security scheme
    pub fn security_scheme(mut self, name: impl Into<String>, scheme: SecurityScheme) -> Self {
        self.components().security_schemes.insert(name.into(), scheme);
        self
    }

    /// Add global security requirement
    pub fn security(mut self, requirement: SecurityRequirement) -> Self {
        self.spec.security.push(requirement);
        self
    }

    /// Build the OpenAPI document
    pub fn build(self) -> OpenApiSpec {
        self.spec
    }
}

/// Helper functions for creating common components
impl OpenApiBuilder {
    /// Add an HTTP bearer scheme under `name`
    pub fn add_bearer_auth(self, name: impl Into<String>, description: impl Into<String>) -> Self {
        self.security_scheme(name, SecurityScheme::bearer(description))
    }

    /// Add API key authentication
    pub fn add_api_key_auth(
        self,
        name: impl Into<String>,
        key_name: impl Into<String>,
        location: ApiKeyLocation,
    ) -> Self {
        self.security_scheme(
            name,
            SecurityScheme::ApiKey {
                name: key_name.into(),
                location,
                description: None,
            },
        )
    }
}

/// Builder for operations
pub struct OperationBuilder {
    operation: Operation,
}

impl OperationBuilder {
    pub fn new() -> Self {
        Self {
            operation: Operation::default(),
        }
    }

    pub fn summary(mut self, summary: impl Into<String>) -> Self {
        self.operation.summary = Some(summary.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.operation.description = Some(description.into());
        self
    }

    pub fn operation_id(mut self, id: impl Into<String>) -> Self {
        self.operation.operation_id = Some(id.into());
        self
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.operation.tags.push(tag.into());
        self
    }

    pub fn tags(mut self, tags: impl IntoIterator<Item = String>) -> Self {
        self.operation.tags.extend(tags);
        self
    }

    pub fn parameter(mut self, parameter: Parameter) -> Self {
        self.operation.parameters.push(parameter);
        self
    }

    /// JSON request body referencing a component schema
    pub fn json_request(mut self, schema_id: &str) -> Self {
        self.operation.request_body = Some(RequestBody {
            description: None,
            content: json_content(schema_id),
            required: Some(true),
        });
        self
    }

    pub fn response(mut self, status: impl Into<String>, response: Response) -> Self {
        self.operation.responses.insert(status.into(), response);
        self
    }

    /// JSON response referencing a component schema
    pub fn json_response(self, status: impl Into<String>, schema_id: &str) -> Self {
        self.response(
            status,
            Response {
                description: "Success".to_string(),
                content: Some(json_content(schema_id)),
            },
        )
    }

    pub fn deprecated(mut self, deprecated: bool) -> Self {
        self.operation.deprecated = deprecated;
        self
    }

    pub fn build(self) -> Operation {
        self.operation
    }
}

impl Default for OperationBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn json_content(schema_id: &str) -> BTreeMap<String, MediaType> {
    BTreeMap::from([(
        "application/json".to_string(),
        MediaType {
            schema: Some(ref_schema(schema_id)),
        },
    )])
}

/// Helper functions for creating schemas
pub fn string_schema() -> Schema {
    Schema {
        schema_type: Some("string".to_string()),
        ..Default::default()
    }
}

pub fn object_schema(properties: BTreeMap<String, Schema>, required: Vec<String>) -> Schema {
    Schema {
        schema_type: Some("object".to_string()),
        properties: Some(properties),
        required,
        ..Default::default()
    }
}

pub fn ref_schema(reference: impl Into<String>) -> Schema {
    Schema {
        reference: Some(format!("#/components/schemas/{}", reference.into())),
        ..Default::default()
    }
}
