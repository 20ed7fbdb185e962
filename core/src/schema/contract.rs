//! # Contract Model
//!
//! Resolves the Paths Object into operations whose parameter and body
//! schemas point into the shared [`SchemaGraph`], and collects the document's
//! security schemes.

use crate::error::{AppError, AppResult};
use crate::oas::models::{HttpMethod, ParamLocation};
use crate::oas::ref_utils::{component_name, ComponentSection};
use crate::oas::parse_openapi_document;
use crate::oas::shims::{
    ShimComponents, ShimOpenApi, ShimParameter, ShimRequestBody, ShimSecurityScheme,
};
use crate::schema::graph::{SchemaGraph, SchemaId};
use crate::schema::resolver::SchemaResolver;
use indexmap::IndexMap;
use std::collections::HashSet;
use std::fmt;
use utoipa::openapi::RefOr;

/// A parameter of a resolved operation.
#[derive(Debug, Clone, PartialEq)]
pub struct ContractParameter {
    /// Wire name.
    pub name: String,
    /// Location.
    pub location: ParamLocation,
    /// Whether the contract requires it.
    pub required: bool,
    /// Schema; `None` when the parameter declares none.
    pub schema: Option<SchemaId>,
    /// Description.
    pub description: Option<String>,
}

/// The request body of a resolved operation.
#[derive(Debug, Clone, PartialEq)]
pub struct ContractRequestBody {
    /// Media type the schema was taken from.
    pub content_type: String,
    /// Body schema; `None` when the media type declares none.
    pub schema: Option<SchemaId>,
    /// Whether a body must be sent.
    pub required: bool,
}

/// One (path, method) pair of the contract.
#[derive(Debug, Clone, PartialEq)]
pub struct ContractOperation {
    /// Path template, e.g. `/pets/{petId}`.
    pub path: String,
    /// HTTP method.
    pub method: HttpMethod,
    /// `operationId`, if declared.
    pub operation_id: Option<String>,
    /// Tags.
    pub tags: Vec<String>,
    /// Path-level and operation-level parameters, operation first.
    pub parameters: Vec<ContractParameter>,
    /// Request body.
    pub request_body: Option<ContractRequestBody>,
}

impl ContractOperation {
    /// Finds a parameter by wire name and location.
    pub fn parameter(&self, name: &str, location: ParamLocation) -> Option<&ContractParameter> {
        self.parameters
            .iter()
            .find(|p| p.name == name && p.location == location)
    }
}

/// Where an apiKey credential travels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CredentialLocation {
    /// Request header.
    Header,
    /// Query string.
    Query,
}

impl fmt::Display for CredentialLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CredentialLocation::Header => write!(f, "header"),
            CredentialLocation::Query => write!(f, "query"),
        }
    }
}

/// An apiKey-style security scheme.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecuritySchemeDescriptor {
    /// Key in `components.securitySchemes`.
    pub scheme_name: String,
    /// Description, line breaks preserved.
    pub description: Option<String>,
    /// Header or query.
    pub credential_location: CredentialLocation,
    /// The header/query key carrying the credential.
    pub parameter_name: String,
}

/// The resolved contract: schema graph, operations and security schemes.
#[derive(Debug, Clone, Default)]
pub struct ContractModel {
    /// Every schema reachable from components, parameters and bodies.
    pub graph: SchemaGraph,
    /// Operations in document order.
    pub operations: Vec<ContractOperation>,
    /// apiKey schemes in declaration order.
    pub security_schemes: Vec<SecuritySchemeDescriptor>,
}

impl ContractModel {
    /// Resolves a parsed document.
    pub fn from_document(doc: &ShimOpenApi) -> AppResult<Self> {
        let mut resolver = SchemaResolver::new(doc);
        resolver.resolve_components()?;

        let mut operations = Vec::new();
        for (path, item) in &doc.paths.items {
            let shared = collect_parameters(&mut resolver, doc, &item.parameters, path)?;

            for (method, op) in item.operations() {
                let location = format!("{} {}", method, path);
                let mut parameters =
                    collect_parameters(&mut resolver, doc, &op.parameters, &location)?;
                // Operation parameters override path-level ones on (name, in).
                for p in &shared {
                    if !parameters
                        .iter()
                        .any(|o| o.name == p.name && o.location == p.location)
                    {
                        parameters.push(p.clone());
                    }
                }

                let request_body = match &op.request_body {
                    Some(body) => resolve_request_body(&mut resolver, doc, body, &location)?,
                    None => None,
                };

                operations.push(ContractOperation {
                    path: path.clone(),
                    method,
                    operation_id: op.operation_id.clone(),
                    tags: op.tags.clone(),
                    parameters,
                    request_body,
                });
            }
        }

        let security_schemes = collect_security_schemes(doc)?;
        tracing::debug!(
            operations = operations.len(),
            schemes = security_schemes.len(),
            "resolved contract"
        );

        Ok(Self {
            graph: resolver.finish(),
            operations,
            security_schemes,
        })
    }

    /// Parses and resolves a YAML/JSON document string.
    pub fn from_yaml_str(yaml_content: &str) -> AppResult<Self> {
        let doc = parse_openapi_document(yaml_content)?;
        Self::from_document(&doc)
    }

    /// Finds the operation for an exact (path, method) pair.
    pub fn operation(&self, path: &str, method: HttpMethod) -> Option<&ContractOperation> {
        self.operations
            .iter()
            .find(|op| op.path == path && op.method == method)
    }
}

fn collect_parameters(
    resolver: &mut SchemaResolver<'_>,
    doc: &ShimOpenApi,
    params: &[RefOr<ShimParameter>],
    location: &str,
) -> AppResult<Vec<ContractParameter>> {
    let mut result = Vec::with_capacity(params.len());
    for param_or_ref in params {
        let param = match param_or_ref {
            RefOr::T(p) => p,
            RefOr::Ref(r) => lookup_parameter(doc, &r.ref_location)?,
        };

        let Some(param_location) = ParamLocation::from_in(&param.parameter_in) else {
            tracing::debug!(
                parameter = %param.name,
                location = %param.parameter_in,
                "skipping parameter with unsupported location"
            );
            continue;
        };

        let schema = match &param.schema {
            Some(s) => Some(resolver.resolve(s, &format!("{}.{}", location, param.name))?),
            None => None,
        };

        result.push(ContractParameter {
            name: param.name.clone(),
            location: param_location,
            // Path parameters are always required.
            required: param.required || param_location == ParamLocation::Path,
            schema,
            description: param.description.clone(),
        });
    }
    Ok(result)
}

/// Follows a component `$ref` (and any alias chain) to the inline object.
fn follow_component<'d, T>(
    doc: &'d ShimOpenApi,
    ref_str: &str,
    section: ComponentSection,
    pick: impl Fn(&'d ShimComponents) -> &'d IndexMap<String, RefOr<T>>,
) -> AppResult<&'d T> {
    let mut current = ref_str.to_string();
    let mut seen = HashSet::new();
    loop {
        if !seen.insert(current.clone()) {
            return Err(AppError::unsupported(
                ref_str,
                format!("{} references form a cycle", section),
            ));
        }
        let name = component_name(&current, doc.self_uri.as_deref(), section)?;
        match doc.components.as_ref().and_then(|c| pick(c).get(&name)) {
            Some(RefOr::T(found)) => return Ok(found),
            Some(RefOr::Ref(r)) => current = r.ref_location.clone(),
            None => return Err(AppError::UnresolvedReference(current)),
        }
    }
}

fn lookup_parameter<'d>(doc: &'d ShimOpenApi, ref_str: &str) -> AppResult<&'d ShimParameter> {
    follow_component(doc, ref_str, ComponentSection::Parameters, |c| &c.parameters)
}

fn lookup_request_body<'d>(doc: &'d ShimOpenApi, ref_str: &str) -> AppResult<&'d ShimRequestBody> {
    follow_component(doc, ref_str, ComponentSection::RequestBodies, |c| {
        &c.request_bodies
    })
}

fn resolve_request_body(
    resolver: &mut SchemaResolver<'_>,
    doc: &ShimOpenApi,
    body: &RefOr<ShimRequestBody>,
    location: &str,
) -> AppResult<Option<ContractRequestBody>> {
    let body = match body {
        RefOr::T(b) => b,
        RefOr::Ref(r) => lookup_request_body(doc, &r.ref_location)?,
    };

    // Prefer JSON, otherwise the first declared media type.
    let media = body
        .content
        .get_key_value("application/json")
        .or_else(|| body.content.first());
    let Some((content_type, media)) = media else {
        return Ok(None);
    };

    let schema = match &media.schema {
        Some(s) => Some(resolver.resolve(s, &format!("{}.requestBody", location))?),
        None => None,
    };

    Ok(Some(ContractRequestBody {
        content_type: content_type.clone(),
        schema,
        required: body.required,
    }))
}

/// Collects apiKey security schemes in declaration order. Other scheme types
/// and cookie-borne keys are skipped.
pub fn collect_security_schemes(doc: &ShimOpenApi) -> AppResult<Vec<SecuritySchemeDescriptor>> {
    let Some(components) = doc.components.as_ref() else {
        return Ok(Vec::new());
    };

    let mut result = Vec::new();
    for (scheme_name, scheme_or_ref) in &components.security_schemes {
        let scheme: &ShimSecurityScheme = match scheme_or_ref {
            RefOr::T(s) => s,
            RefOr::Ref(r) => follow_component(
                doc,
                &r.ref_location,
                ComponentSection::SecuritySchemes,
                |c| &c.security_schemes,
            )?,
        };

        if scheme.scheme_type != "apiKey" {
            continue;
        }
        let credential_location = match scheme.location.as_deref() {
            Some("header") => CredentialLocation::Header,
            Some("query") => CredentialLocation::Query,
            other => {
                tracing::debug!(
                    scheme = %scheme_name,
                    location = ?other,
                    "skipping apiKey scheme with unsupported location"
                );
                continue;
            }
        };

        result.push(SecuritySchemeDescriptor {
            scheme_name: scheme_name.clone(),
            description: scheme.description.clone(),
            credential_location,
            parameter_name: scheme.name.clone().unwrap_or_else(|| scheme_name.clone()),
        });
    }
    Ok(result)
}
