//! # OpenAPI Document Module
//!
//! - **models**: method and parameter-location value types.
//! - **shims**: serde deserialization layer for the document subset we consume.
//! - **document**: loaders from YAML/JSON text.
//! - **ref_utils**: `$ref` to component-name resolution.

pub mod document;
pub mod models;
pub mod ref_utils;
pub mod shims;

pub use document::{parse_openapi_document, parse_openapi_value, OpenApiDocument};
pub use models::{HttpMethod, ParamLocation};
pub use ref_utils::{component_name, ComponentSection};
pub use shims::{
    ShimComponents, ShimMediaType, ShimOpenApi, ShimOperation, ShimParameter, ShimPathItem,
    ShimRequestBody, ShimSchema, ShimSchemaType, ShimSecurityScheme,
};
