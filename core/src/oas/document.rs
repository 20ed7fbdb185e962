//! # OpenAPI Document Loading
//!
//! Deserializes an already-read OpenAPI document (YAML or JSON text, or a
//! `serde_json::Value`) into the shim layer. Nothing here touches the
//! filesystem or the network.

use crate::error::{AppError, AppResult};
use crate::oas::shims::ShimOpenApi;
use serde_json::Value;

/// The raw document handed to the schema resolver.
pub type OpenApiDocument = ShimOpenApi;

impl ShimOpenApi {
    /// Parses YAML (or JSON) text. See [`parse_openapi_document`].
    pub fn from_yaml_str(yaml_content: &str) -> AppResult<Self> {
        parse_openapi_document(yaml_content)
    }

    /// Deserializes an already parsed JSON value. See [`parse_openapi_value`].
    pub fn from_json_value(raw: Value) -> AppResult<Self> {
        parse_openapi_value(raw)
    }
}

/// Parses a raw OpenAPI YAML (or JSON, which is valid YAML) string.
///
/// # Arguments
///
/// * `yaml_content` - The raw text of the openapi document.
pub fn parse_openapi_document(yaml_content: &str) -> AppResult<ShimOpenApi> {
    let raw: Value = serde_yaml::from_str(yaml_content)
        .map_err(|e| AppError::General(format!("Failed to parse OpenAPI YAML: {}", e)))?;
    parse_openapi_value(raw)
}

/// Converts an already parsed JSON value into the shim document.
pub fn parse_openapi_value(raw: Value) -> AppResult<ShimOpenApi> {
    if !raw.is_object() {
        return Err(AppError::General(
            "OpenAPI document root must be an object".into(),
        ));
    }
    let doc: ShimOpenApi = serde_json::from_value(raw)
        .map_err(|e| AppError::General(format!("Failed to parse OpenAPI document: {}", e)))?;
    tracing::debug!(
        paths = doc.paths.items.len(),
        schemas = doc.components.as_ref().map_or(0, |c| c.schemas.len()),
        "loaded OpenAPI document"
    );
    Ok(doc)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_document() {
        let yaml = r#"
openapi: 3.0.3
info: {title: T, version: "1"}
paths:
  /pets:
    get:
      operationId: listPets
      tags: [pets]
components:
  securitySchemes:
    Key:
      type: apiKey
      in: header
      name: X-Key
"#;
        let doc = parse_openapi_document(yaml).unwrap();
        assert_eq!(doc.openapi.as_deref(), Some("3.0.3"));
        let op = doc.paths.items["/pets"].get.as_ref().unwrap();
        assert_eq!(op.operation_id.as_deref(), Some("listPets"));
        assert_eq!(op.tags, vec!["pets".to_string()]);
        let comps = doc.components.unwrap();
        assert_eq!(comps.security_schemes.len(), 1);
    }

    #[test]
    fn test_non_object_root_fails() {
        assert!(parse_openapi_document("- a\n- b\n").is_err());
        assert!(parse_openapi_document("key: [unclosed").is_err());
    }

    #[test]
    fn test_from_json_value() {
        let raw = serde_json::json!({
            "openapi": "3.1.0",
            "$self": "https://example.com/api.json",
            "paths": {"/a": {"delete": {}}}
        });
        let doc = OpenApiDocument::from_json_value(raw).unwrap();
        assert_eq!(doc.self_uri.as_deref(), Some("https://example.com/api.json"));
        assert!(doc.paths.items["/a"].delete.is_some());
    }
}
