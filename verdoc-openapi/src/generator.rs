//! Per-document OpenAPI generation
//!
//! [`SwaggerGenOptions`] declares the documents a service publishes and how
//! route descriptions are turned into operations; [`SwaggerGenerator`]
//! applies those options to the descriptions reported by an
//! [`ApiDescriptionProvider`] whenever a document is requested.

use crate::builder::{OpenApiBuilder, OperationBuilder, object_schema};
use crate::spec::{Info, OpenApiSpec, Parameter, PathItem, SecurityRequirement, SecurityScheme};
use crate::xml_comments::XmlComments;
use crate::{OpenApiError, Result};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use verdoc_core::logging::{debug, trace};
use verdoc_core::{ApiDescription, ApiDescriptionProvider, HttpMethod, Provider, TypeRef};

/// Decides whether a description belongs in the named document
pub type DocInclusionPredicate = Arc<dyn Fn(&str, &ApiDescription) -> bool + Send + Sync>;

/// Picks one description out of several sharing a method and path
pub type ConflictingActionsResolver =
    Arc<dyn Fn(&[ApiDescription]) -> ApiDescription + Send + Sync>;

/// Names the component schema generated for a type
pub type SchemaIdSelector = Arc<dyn Fn(&TypeRef) -> String + Send + Sync>;

/// Tags attached to an operation
pub type TagSelector = Arc<dyn Fn(&ApiDescription) -> Vec<String> + Send + Sync>;

/// One published document
#[derive(Debug, Clone)]
pub struct SwaggerDoc {
    pub name: String,
    pub info: Info,
}

/// Document generation settings
#[derive(Clone)]
pub struct SwaggerGenOptions {
    docs: Vec<SwaggerDoc>,
    inclusion_predicate: Option<DocInclusionPredicate>,
    conflicting_actions_resolver: Option<ConflictingActionsResolver>,
    schema_id_selector: SchemaIdSelector,
    tag_selector: Option<TagSelector>,
    xml_comments: Vec<XmlComments>,
    security_schemes: BTreeMap<String, SecurityScheme>,
    security_requirements: Vec<SecurityRequirement>,
}

impl Default for SwaggerGenOptions {
    fn default() -> Self {
        Self {
            docs: Vec::new(),
            inclusion_predicate: None,
            conflicting_actions_resolver: None,
            schema_id_selector: Arc::new(|t| t.short_name().to_string()),
            tag_selector: None,
            xml_comments: Vec::new(),
            security_schemes: BTreeMap::new(),
            security_requirements: Vec::new(),
        }
    }
}

impl std::fmt::Debug for SwaggerGenOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SwaggerGenOptions")
            .field("docs", &self.docs)
            .field("xml_comments", &self.xml_comments.len())
            .field("security_schemes", &self.security_schemes)
            .field("security_requirements", &self.security_requirements)
            .finish_non_exhaustive()
    }
}

impl SwaggerGenOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a document; a later declaration with the same name replaces it
    pub fn swagger_doc(mut self, name: impl Into<String>, info: Info) -> Self {
        let name = name.into();
        self.docs.retain(|doc| doc.name != name);
        self.docs.push(SwaggerDoc { name, info });
        self
    }

    /// Choose which descriptions belong to which document.
    ///
    /// Without a predicate a description belongs to the document named after
    /// its group.
    pub fn doc_inclusion_predicate<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&str, &ApiDescription) -> bool + Send + Sync + 'static,
    {
        self.inclusion_predicate = Some(Arc::new(predicate));
        self
    }

    /// Resolve descriptions that share a method and path.
    ///
    /// Without a resolver such conflicts fail generation.
    pub fn resolve_conflicting_actions<F>(mut self, resolver: F) -> Self
    where
        F: Fn(&[ApiDescription]) -> ApiDescription + Send + Sync + 'static,
    {
        self.conflicting_actions_resolver = Some(Arc::new(resolver));
        self
    }

    /// Name component schemas; the default is the type's short name
    pub fn custom_schema_ids<F>(mut self, selector: F) -> Self
    where
        F: Fn(&TypeRef) -> String + Send + Sync + 'static,
    {
        self.schema_id_selector = Arc::new(selector);
        self
    }

    /// Tag operations; the default is the first literal path segment
    pub fn tag_actions_by<F>(mut self, selector: F) -> Self
    where
        F: Fn(&ApiDescription) -> Vec<String> + Send + Sync + 'static,
    {
        self.tag_selector = Some(Arc::new(selector));
        self
    }

    /// Load an XML documentation file
    pub fn include_xml_comments(mut self, path: impl AsRef<Path>) -> Result<Self> {
        self.xml_comments.push(XmlComments::from_file(path)?);
        Ok(self)
    }

    pub fn add_security_definition(mut self, name: impl Into<String>, scheme: SecurityScheme) -> Self {
        self.security_schemes.insert(name.into(), scheme);
        self
    }

    pub fn add_security_requirement(mut self, requirement: SecurityRequirement) -> Self {
        self.security_requirements.push(requirement);
        self
    }

    pub fn docs(&self) -> &[SwaggerDoc] {
        &self.docs
    }

    pub fn doc(&self, name: &str) -> Option<&SwaggerDoc> {
        self.docs.iter().find(|doc| doc.name == name)
    }

    pub fn xml_comments(&self) -> &[XmlComments] {
        &self.xml_comments
    }

    pub fn security_schemes(&self) -> &BTreeMap<String, SecurityScheme> {
        &self.security_schemes
    }

    pub fn security_requirements(&self) -> &[SecurityRequirement] {
        &self.security_requirements
    }

    fn includes(&self, document_name: &str, description: &ApiDescription) -> bool {
        match &self.inclusion_predicate {
            Some(predicate) => predicate(document_name, description),
            None => description.group_name.as_deref() == Some(document_name),
        }
    }

    fn tags(&self, description: &ApiDescription) -> Vec<String> {
        match &self.tag_selector {
            Some(selector) => selector(description),
            None => openapi_path(&description.relative_path)
                .split('/')
                .find(|segment| !segment.is_empty() && !segment.starts_with('{'))
                .map(|segment| vec![segment.to_string()])
                .unwrap_or_default(),
        }
    }
}

impl Provider for SwaggerGenOptions {}

/// Route template in OpenAPI form: `/users/:id` becomes `/users/{id}`
pub fn openapi_path(route_path: &str) -> String {
    let converted: Vec<String> = route_path
        .split('/')
        .map(|segment| match segment.strip_prefix(':') {
            Some(name) => format!("{{{}}}", name),
            None => segment.to_string(),
        })
        .collect();
    converted.join("/")
}

fn path_parameters(path: &str) -> Vec<Parameter> {
    path.split('/')
        .filter_map(|segment| segment.strip_prefix('{')?.strip_suffix('}'))
        .map(Parameter::path)
        .collect()
}

/// Generates documents from route descriptions.
pub struct SwaggerGenerator {
    options: SwaggerGenOptions,
    descriptions: Arc<dyn ApiDescriptionProvider>,
}

impl SwaggerGenerator {
    pub fn new(options: SwaggerGenOptions, descriptions: Arc<dyn ApiDescriptionProvider>) -> Self {
        Self {
            options,
            descriptions,
        }
    }

    pub fn options(&self) -> &SwaggerGenOptions {
        &self.options
    }

    /// Names of the documents that can be generated
    pub fn document_names(&self) -> Vec<String> {
        self.options.docs.iter().map(|doc| doc.name.clone()).collect()
    }

    /// Generate the named document
    pub fn generate(&self, document_name: &str) -> Result<OpenApiSpec> {
        let doc = self
            .options
            .doc(document_name)
            .ok_or_else(|| OpenApiError::UnknownDocument(document_name.to_string()))?;

        // (path, method) -> candidate descriptions, in discovery order
        let mut grouped: BTreeMap<(String, HttpMethod), Vec<ApiDescription>> = BTreeMap::new();
        for description in self.descriptions.api_descriptions() {
            if !self.options.includes(document_name, &description) {
                trace!(
                    document = document_name,
                    path = %description.relative_path,
                    "Description excluded from document"
                );
                continue;
            }
            grouped
                .entry((openapi_path(&description.relative_path), description.method))
                .or_default()
                .push(description);
        }

        let mut builder = OpenApiBuilder::from_info(doc.info.clone());
        let mut paths: BTreeMap<String, PathItem> = BTreeMap::new();

        for ((path, method), candidates) in grouped {
            let description = self.resolve(document_name, &path, method, candidates)?;

            let (operation, schemas) = self.operation(&path, &description);
            for (id, schema) in schemas {
                builder = builder.schema(id, schema);
            }
            paths.entry(path).or_default().set_operation(method, operation);
        }

        for (name, scheme) in &self.options.security_schemes {
            builder = builder.security_scheme(name.clone(), scheme.clone());
        }
        for requirement in &self.options.security_requirements {
            builder = builder.security(requirement.clone());
        }

        let mut spec = builder.build();
        spec.paths = paths;

        for comments in &self.options.xml_comments {
            for operation in spec.paths.values_mut().flat_map(PathItem::operations_mut) {
                comments.apply(operation);
            }
        }

        debug!(
            document = document_name,
            operations = spec.operation_count(),
            "Generated OpenAPI document"
        );
        Ok(spec)
    }

    /// Candidates reach the resolver in discovery order, with descriptions
    /// from the document's own group moved to the front.
    fn resolve(
        &self,
        document_name: &str,
        path: &str,
        method: HttpMethod,
        mut candidates: Vec<ApiDescription>,
    ) -> Result<ApiDescription> {
        if candidates.len() == 1 {
            return Ok(candidates.remove(0));
        }
        candidates.sort_by_key(|d| d.group_name.as_deref() != Some(document_name));
        match &self.options.conflicting_actions_resolver {
            Some(resolver) => Ok(resolver(&candidates)),
            None => Err(OpenApiError::ConflictingActions {
                method,
                path: path.to_string(),
            }),
        }
    }

    fn operation(
        &self,
        path: &str,
        description: &ApiDescription,
    ) -> (crate::spec::Operation, Vec<(String, crate::spec::Schema)>) {
        let metadata = &description.metadata;
        let mut schemas = Vec::new();
        let mut op = OperationBuilder::new()
            .tags(self.options.tags(description))
            .deprecated(description.is_deprecated());

        if let Some(id) = &metadata.operation_id {
            op = op.operation_id(id.clone());
        }
        if let Some(summary) = &metadata.summary {
            op = op.summary(summary.clone());
        }
        for parameter in path_parameters(path) {
            op = op.parameter(parameter);
        }

        if let Some(request) = &metadata.request_type {
            let id = (self.options.schema_id_selector)(request);
            op = op.json_request(&id);
            schemas.push((id, object_schema(BTreeMap::new(), Vec::new())));
        }
        match &metadata.response_type {
            Some(response) => {
                let id = (self.options.schema_id_selector)(response);
                op = op.json_response("200", &id);
                schemas.push((id, object_schema(BTreeMap::new(), Vec::new())));
            }
            None => {
                op = op.response(
                    "200",
                    crate::spec::Response {
                        description: "Success".to_string(),
                        content: None,
                    },
                );
            }
        }

        (op.build(), schemas)
    }
}

impl Provider for SwaggerGenerator {}
