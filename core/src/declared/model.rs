//! # Declared Model
//!
//! The service/client side of the bridge: the types and resource functions a
//! service declares, independent of how they were obtained.

use crate::oas::models::{HttpMethod, ParamLocation};
use indexmap::IndexMap;
use std::fmt;

/// Scalar declared types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    /// Text.
    String,
    /// Whole number.
    Integer,
    /// Floating point number.
    Number,
    /// Boolean.
    Boolean,
}

impl ScalarKind {
    /// Rust spelling used by [`DeclaredType::type_name`].
    pub fn rust_name(&self) -> &'static str {
        match self {
            ScalarKind::String => "String",
            ScalarKind::Integer => "i64",
            ScalarKind::Number => "f64",
            ScalarKind::Boolean => "bool",
        }
    }
}

/// A declared type.
#[derive(Debug, Clone, PartialEq)]
pub enum DeclaredType {
    /// A scalar.
    Scalar(ScalarKind),
    /// A list of `T`.
    Array(Box<DeclaredType>),
    /// A reference to a type defined elsewhere by name.
    Named(String),
    /// An inline record definition.
    Record(RecordType),
    /// One of several alternatives, in order.
    Union(Vec<DeclaredType>),
    /// `T` or null.
    Nullable(Box<DeclaredType>),
}

impl DeclaredType {
    /// Shorthand for `Nullable(inner)`.
    pub fn nullable(inner: DeclaredType) -> Self {
        DeclaredType::Nullable(Box::new(inner))
    }

    /// Shorthand for `Array(item)`.
    pub fn array(item: DeclaredType) -> Self {
        DeclaredType::Array(Box::new(item))
    }

    /// Shorthand for `Named(name)`.
    pub fn named(name: impl Into<String>) -> Self {
        DeclaredType::Named(name.into())
    }

    /// Whether the outermost layer accepts null.
    pub fn is_nullable(&self) -> bool {
        matches!(self, DeclaredType::Nullable(_))
    }

    /// The type with every outer `Nullable` removed.
    pub fn strip_nullable(&self) -> &DeclaredType {
        match self {
            DeclaredType::Nullable(inner) => inner.strip_nullable(),
            other => other,
        }
    }

    /// Display name: `String`, `i64`, `Vec<T>`, `Option<T>`, record and named
    /// types by name, unions as `A|B` in member order.
    pub fn type_name(&self) -> String {
        match self {
            DeclaredType::Scalar(s) => s.rust_name().to_string(),
            DeclaredType::Array(item) => format!("Vec<{}>", item.type_name()),
            DeclaredType::Named(name) => name.clone(),
            DeclaredType::Record(record) => record.name.clone(),
            DeclaredType::Union(members) => members
                .iter()
                .map(DeclaredType::type_name)
                .collect::<Vec<_>>()
                .join("|"),
            DeclaredType::Nullable(inner) => format!("Option<{}>", inner.type_name()),
        }
    }
}

impl fmt::Display for DeclaredType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.type_name())
    }
}

/// A field of a [`RecordType`].
#[derive(Debug, Clone, PartialEq)]
pub struct RecordField {
    /// Wire name of the field.
    pub name: String,
    /// Field type.
    pub ty: DeclaredType,
    /// Whether the field may be omitted.
    pub optional: bool,
    /// Doc text.
    pub doc: Option<String>,
}

impl RecordField {
    /// A required field without docs.
    pub fn required(name: impl Into<String>, ty: DeclaredType) -> Self {
        Self {
            name: name.into(),
            ty,
            optional: false,
            doc: None,
        }
    }

    /// An optional field without docs.
    pub fn optional(name: impl Into<String>, ty: DeclaredType) -> Self {
        Self {
            optional: true,
            ..Self::required(name, ty)
        }
    }
}

/// A named record definition.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordType {
    /// Type name.
    pub name: String,
    /// Fields in declaration order.
    pub fields: Vec<RecordField>,
}

impl RecordType {
    /// Creates a record type.
    pub fn new(name: impl Into<String>, fields: Vec<RecordField>) -> Self {
        Self {
            name: name.into(),
            fields,
        }
    }

    /// Finds a field by wire name.
    pub fn field(&self, name: &str) -> Option<&RecordField> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// Where a declared parameter is bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamBinding {
    /// Path template segment.
    Path,
    /// Query string.
    Query,
    /// Request header.
    Header,
    /// Request payload.
    Body,
}

impl ParamBinding {
    /// The contract location, `None` for the body.
    pub fn location(&self) -> Option<ParamLocation> {
        match self {
            ParamBinding::Path => Some(ParamLocation::Path),
            ParamBinding::Query => Some(ParamLocation::Query),
            ParamBinding::Header => Some(ParamLocation::Header),
            ParamBinding::Body => None,
        }
    }
}

impl From<ParamLocation> for ParamBinding {
    fn from(location: ParamLocation) -> Self {
        match location {
            ParamLocation::Path => ParamBinding::Path,
            ParamLocation::Query => ParamBinding::Query,
            ParamLocation::Header => ParamBinding::Header,
        }
    }
}

/// A parameter of a resource function.
#[derive(Debug, Clone, PartialEq)]
pub struct DeclaredParam {
    /// Identifier as written; may carry escapes (`r#type`, `\-`).
    pub name: String,
    /// Binding.
    pub binding: ParamBinding,
    /// Declared type.
    pub ty: DeclaredType,
    /// Default literal as written in source, e.g. `"v1"` or `10`.
    pub default: Option<String>,
    /// Externally visible name override.
    pub rename: Option<String>,
}

impl DeclaredParam {
    /// A parameter without default or rename.
    pub fn new(name: impl Into<String>, binding: ParamBinding, ty: DeclaredType) -> Self {
        Self {
            name: name.into(),
            binding,
            ty,
            default: None,
            rename: None,
        }
    }

    /// Sets the default literal.
    pub fn with_default(mut self, literal: impl Into<String>) -> Self {
        self.default = Some(literal.into());
        self
    }

    /// Sets the external name.
    pub fn with_rename(mut self, rename: impl Into<String>) -> Self {
        self.rename = Some(rename.into());
        self
    }

    /// The name the contract knows: the rename, else the identifier without
    /// escape characters.
    pub fn external_name(&self) -> String {
        if let Some(rename) = &self.rename {
            return rename.clone();
        }
        self.name
            .strip_prefix("r#")
            .unwrap_or(&self.name)
            .replace('\\', "")
    }
}

/// A resource function: one (path, method) the service implements.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceFunction {
    /// Path template, e.g. `/pets/{petId}`.
    pub path: String,
    /// HTTP method.
    pub method: HttpMethod,
    /// Parameters in declaration order, body included.
    pub params: Vec<DeclaredParam>,
}

impl ResourceFunction {
    /// A resource without parameters.
    pub fn new(path: impl Into<String>, method: HttpMethod) -> Self {
        Self {
            path: path.into(),
            method,
            params: Vec::new(),
        }
    }

    /// Appends a parameter.
    pub fn with_param(mut self, param: DeclaredParam) -> Self {
        self.params.push(param);
        self
    }

    /// The body parameter, if declared.
    pub fn body(&self) -> Option<&DeclaredParam> {
        self.params.iter().find(|p| p.binding == ParamBinding::Body)
    }

    /// Path, query and header parameters.
    pub fn non_body_params(&self) -> impl Iterator<Item = &DeclaredParam> {
        self.params.iter().filter(|p| p.binding != ParamBinding::Body)
    }
}

/// A service: resources plus the named types they use.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ServiceModel {
    /// Resource functions in declaration order.
    pub resources: Vec<ResourceFunction>,
    /// Named type definitions.
    pub types: IndexMap<String, DeclaredType>,
}

impl ServiceModel {
    /// An empty service.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a resource.
    pub fn with_resource(mut self, resource: ResourceFunction) -> Self {
        self.resources.push(resource);
        self
    }

    /// Registers a record type under its own name.
    pub fn with_record(mut self, record: RecordType) -> Self {
        self.types
            .insert(record.name.clone(), DeclaredType::Record(record));
        self
    }

    /// Registers any type under `name`.
    pub fn with_type(mut self, name: impl Into<String>, ty: DeclaredType) -> Self {
        self.types.insert(name.into(), ty);
        self
    }

    /// Looks up a named definition.
    pub fn lookup(&self, name: &str) -> Option<&DeclaredType> {
        self.types.get(name)
    }

    /// Finds the resource for an exact (path, method) pair.
    pub fn resource(&self, path: &str, method: HttpMethod) -> Option<&ResourceFunction> {
        self.resources
            .iter()
            .find(|r| r.path == path && r.method == method)
    }
}
