//! # Document Shims
//!
//! Generic structures acting as an Intermediate Deserialization Layer.
//! These structs map directly to OpenAPI YAML/JSON objects and keep only the
//! keywords the resolver consumes. Unknown keys are ignored.
//!
//! `$ref`-or-object positions use `utoipa::openapi::RefOr`, which tries the
//! `{"$ref": ...}` shape first and falls back to the inline object.

use crate::oas::models::HttpMethod;
use indexmap::IndexMap;
use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use utoipa::openapi::RefOr;

/// Root of an OpenAPI 3.x document.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ShimOpenApi {
    /// The `openapi` version string.
    #[serde(default)]
    pub openapi: Option<String>,
    /// OAS 3.2 `$self`: the document's own URI, used for `$ref` matching.
    #[serde(rename = "$self", default)]
    pub self_uri: Option<String>,
    /// The Paths Object.
    #[serde(default)]
    pub paths: ShimPaths,
    /// The Components Object.
    #[serde(default)]
    pub components: Option<ShimComponents>,
}

/// The Paths Object, in document order. `x-` extensions are dropped.
#[derive(Debug, Clone, Default)]
pub struct ShimPaths {
    /// Path items keyed by path template.
    pub items: IndexMap<String, ShimPathItem>,
}

impl<'de> Deserialize<'de> for ShimPaths {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = IndexMap::<String, Value>::deserialize(deserializer)?;
        let mut items = IndexMap::new();

        for (key, value) in raw {
            if key.starts_with("x-") {
                continue;
            }
            let path_item = serde_json::from_value::<ShimPathItem>(value).map_err(|e| {
                DeError::custom(format!("Failed to parse path item '{}': {}", key, e))
            })?;
            items.insert(key, path_item);
        }

        Ok(Self { items })
    }
}

/// A Path Item Object.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ShimPathItem {
    /// Parameters shared by every operation under this path.
    #[serde(default)]
    pub parameters: Vec<RefOr<ShimParameter>>,
    /// GET operation.
    #[serde(default)]
    pub get: Option<ShimOperation>,
    /// PUT operation.
    #[serde(default)]
    pub put: Option<ShimOperation>,
    /// POST operation.
    #[serde(default)]
    pub post: Option<ShimOperation>,
    /// DELETE operation.
    #[serde(default)]
    pub delete: Option<ShimOperation>,
    /// OPTIONS operation.
    #[serde(default)]
    pub options: Option<ShimOperation>,
    /// HEAD operation.
    #[serde(default)]
    pub head: Option<ShimOperation>,
    /// PATCH operation.
    #[serde(default)]
    pub patch: Option<ShimOperation>,
    /// TRACE operation.
    #[serde(default)]
    pub trace: Option<ShimOperation>,
}

impl ShimPathItem {
    /// Returns the operation bound to `method`, if any.
    pub fn operation(&self, method: HttpMethod) -> Option<&ShimOperation> {
        match method {
            HttpMethod::Get => self.get.as_ref(),
            HttpMethod::Put => self.put.as_ref(),
            HttpMethod::Post => self.post.as_ref(),
            HttpMethod::Delete => self.delete.as_ref(),
            HttpMethod::Options => self.options.as_ref(),
            HttpMethod::Head => self.head.as_ref(),
            HttpMethod::Patch => self.patch.as_ref(),
            HttpMethod::Trace => self.trace.as_ref(),
        }
    }

    /// Iterates the defined operations in Path Item declaration order.
    pub fn operations(&self) -> impl Iterator<Item = (HttpMethod, &ShimOperation)> {
        HttpMethod::ALL
            .into_iter()
            .filter_map(move |m| self.operation(m).map(|op| (m, op)))
    }
}

/// An Operation Object.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShimOperation {
    /// Unique operation identifier.
    #[serde(default)]
    pub operation_id: Option<String>,
    /// Tags used by the selection policy.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Operation-level parameters (override path-level ones).
    #[serde(default)]
    pub parameters: Vec<RefOr<ShimParameter>>,
    /// Request body.
    #[serde(default)]
    pub request_body: Option<RefOr<ShimRequestBody>>,
}

/// A Parameter Object.
///
/// Utoipa's Parameter struct can be strict about enums or missing fields,
/// so `in` is kept as a raw string and mapped later.
#[derive(Debug, Clone, Deserialize)]
pub struct ShimParameter {
    /// Name of the parameter.
    pub name: String,
    /// Location of the parameter (query, path, header, cookie).
    #[serde(rename = "in")]
    pub parameter_in: String,
    /// Whether the parameter is required.
    #[serde(default)]
    pub required: bool,
    /// Description.
    #[serde(default)]
    pub description: Option<String>,
    /// Schema definition.
    #[serde(default)]
    pub schema: Option<RefOr<ShimSchema>>,
}

/// A Request Body Object.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ShimRequestBody {
    /// Description.
    #[serde(default)]
    pub description: Option<String>,
    /// Media types keyed by content type, in document order.
    #[serde(default)]
    pub content: IndexMap<String, ShimMediaType>,
    /// Whether a body must be sent.
    #[serde(default)]
    pub required: bool,
}

/// A Media Type Object.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ShimMediaType {
    /// Body schema.
    #[serde(default)]
    pub schema: Option<RefOr<ShimSchema>>,
}

/// The Components Object (subset).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShimComponents {
    /// Reusable schemas.
    #[serde(default)]
    pub schemas: IndexMap<String, RefOr<ShimSchema>>,
    /// Reusable parameters.
    #[serde(default)]
    pub parameters: IndexMap<String, RefOr<ShimParameter>>,
    /// Reusable request bodies.
    #[serde(default)]
    pub request_bodies: IndexMap<String, RefOr<ShimRequestBody>>,
    /// Security schemes in declaration order.
    #[serde(default)]
    pub security_schemes: IndexMap<String, RefOr<ShimSecurityScheme>>,
}

/// A Security Scheme Object.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShimSecurityScheme {
    /// `apiKey`, `http`, `oauth2`, `openIdConnect`, `mutualTLS`.
    #[serde(rename = "type")]
    pub scheme_type: String,
    /// Description (may span several lines).
    #[serde(default)]
    pub description: Option<String>,
    /// apiKey: the header/query/cookie key.
    #[serde(default)]
    pub name: Option<String>,
    /// apiKey: `header`, `query` or `cookie`.
    #[serde(rename = "in", default)]
    pub location: Option<String>,
    /// http: `basic`, `bearer`, ...
    #[serde(default)]
    pub scheme: Option<String>,
}

/// The `type` keyword: a single name (3.0) or a list (3.1).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ShimSchemaType {
    /// `type: string`
    Single(String),
    /// `type: [string, "null"]`
    Multiple(Vec<String>),
}

impl ShimSchemaType {
    /// All declared type names.
    pub fn names(&self) -> Vec<&str> {
        match self {
            ShimSchemaType::Single(s) => vec![s.as_str()],
            ShimSchemaType::Multiple(v) => v.iter().map(String::as_str).collect(),
        }
    }
}

/// A Schema Object (subset).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShimSchema {
    /// `type`
    #[serde(rename = "type", default)]
    pub schema_type: Option<ShimSchemaType>,
    /// `title`, used as a naming hint for anonymous schemas.
    #[serde(default)]
    pub title: Option<String>,
    /// `description`
    #[serde(default)]
    pub description: Option<String>,
    /// `properties`, in declaration order.
    #[serde(default)]
    pub properties: IndexMap<String, RefOr<ShimSchema>>,
    /// `required`
    #[serde(default)]
    pub required: Vec<String>,
    /// `items`
    #[serde(default)]
    pub items: Option<Box<RefOr<ShimSchema>>>,
    /// `oneOf`
    #[serde(default)]
    pub one_of: Option<Vec<RefOr<ShimSchema>>>,
    /// `anyOf`
    #[serde(default)]
    pub any_of: Option<Vec<RefOr<ShimSchema>>>,
    /// `allOf`
    #[serde(default)]
    pub all_of: Option<Vec<RefOr<ShimSchema>>>,
    /// OAS 3.0 `nullable`
    #[serde(default)]
    pub nullable: bool,
    /// Swagger-era `x-nullable`
    #[serde(rename = "x-nullable", default)]
    pub x_nullable: bool,
    /// `default` literal.
    #[serde(default)]
    pub default: Option<Value>,
    /// `format`
    #[serde(default)]
    pub format: Option<String>,
}
