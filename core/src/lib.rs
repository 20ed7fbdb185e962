#![deny(missing_docs)]

//! # CDD Contract Core
//!
//! Bridges an OpenAPI contract and a statically-typed service description:
//! resolves schemas into a canonical graph, maps them to and from a declared
//! type model, and validates a service's resources against the contract.

/// Shared error types.
pub mod error;

/// OpenAPI (OAS) document shims and `$ref` utilities.
pub mod oas;

/// Schema graph, resolver and contract model.
pub mod schema;

/// Naming of anonymous schemas.
pub mod naming;

/// Declared service model and Rust source readers.
pub mod declared;

/// Type mapping logic (contract <-> declared).
pub mod types;

/// Contract validation.
pub mod validation;

pub use declared::{
    extract_declared_types, parse_declared_type, DeclaredParam, DeclaredType, ParamBinding,
    RecordField, RecordType, ResourceFunction, ScalarKind, ServiceModel,
};
pub use error::{AppError, AppResult};
pub use naming::NamingContext;
pub use oas::{parse_openapi_document, HttpMethod, OpenApiDocument, ParamLocation};
pub use schema::{
    resolve_schemas, ContractModel, ContractOperation, CredentialLocation, SchemaGraph, SchemaId,
    SchemaKind, SchemaNode, SecuritySchemeDescriptor,
};
pub use types::{
    describe_parameter, map_components, AuthConfigModel, MapperConfig, ParameterDescriptor,
    SchemaFragment, TypeMapper, TypeModel,
};
pub use validation::{validate, ValidationConfig, ValidationError};
