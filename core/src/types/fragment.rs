//! # Schema Fragments
//!
//! The declared-to-contract direction: schema values produced from declared
//! types, serializable as OpenAPI schema objects.

use crate::declared::model::{DeclaredType, ScalarKind};
use indexmap::IndexMap;
use serde_json::{json, Map, Value};
use std::fmt::Display;

/// The shape of a [`SchemaFragment`].
#[derive(Debug, Clone, PartialEq)]
pub enum FragmentType {
    /// `string`
    String,
    /// `integer`
    Integer,
    /// `number`
    Number,
    /// `boolean`
    Boolean,
    /// `array` of the item schema.
    Array(Box<SchemaFragment>),
    /// A reference to a named component.
    Ref(String),
    /// An inline object.
    Object {
        /// Properties in declaration order.
        properties: IndexMap<String, SchemaFragment>,
        /// Required property names.
        required: Vec<String>,
    },
    /// `oneOf` of the members, in order.
    OneOf(Vec<SchemaFragment>),
}

impl Display for FragmentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FragmentType::String => write!(f, "string"),
            FragmentType::Integer => write!(f, "integer"),
            FragmentType::Number => write!(f, "number"),
            FragmentType::Boolean => write!(f, "boolean"),
            FragmentType::Array(inner) => write!(f, "array<{}>", inner.ty),
            FragmentType::Ref(s) => write!(f, "$ref:{}", s),
            FragmentType::Object { .. } => write!(f, "object"),
            FragmentType::OneOf(_) => write!(f, "oneOf"),
        }
    }
}

/// A schema generated from a declared type.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaFragment {
    /// The primary type.
    pub ty: FragmentType,
    /// Whether null is accepted.
    pub nullable: bool,
    /// `default` literal.
    pub default: Option<Value>,
}

impl SchemaFragment {
    /// A non-nullable fragment without default.
    pub fn simple(ty: FragmentType) -> Self {
        Self {
            ty,
            nullable: false,
            default: None,
        }
    }

    /// Builds the fragment for a declared type. `Option<T>` sets `nullable`.
    pub fn from_declared(declared: &DeclaredType) -> Self {
        match declared {
            DeclaredType::Scalar(kind) => Self::simple(match kind {
                ScalarKind::String => FragmentType::String,
                ScalarKind::Integer => FragmentType::Integer,
                ScalarKind::Number => FragmentType::Number,
                ScalarKind::Boolean => FragmentType::Boolean,
            }),
            DeclaredType::Array(item) => {
                Self::simple(FragmentType::Array(Box::new(Self::from_declared(item))))
            }
            DeclaredType::Named(name) => Self::simple(FragmentType::Ref(name.clone())),
            DeclaredType::Record(record) => {
                let mut properties = IndexMap::new();
                let mut required = Vec::new();
                for field in &record.fields {
                    properties.insert(field.name.clone(), Self::from_declared(&field.ty));
                    if !field.optional {
                        required.push(field.name.clone());
                    }
                }
                Self::simple(FragmentType::Object {
                    properties,
                    required,
                })
            }
            DeclaredType::Union(members) => Self::simple(FragmentType::OneOf(
                members.iter().map(Self::from_declared).collect(),
            )),
            DeclaredType::Nullable(inner) => Self {
                nullable: true,
                ..Self::from_declared(inner)
            },
        }
    }

    /// Serializes to an OpenAPI 3.0 schema object.
    ///
    /// A nullable reference is written as `allOf: [$ref]` with `nullable`,
    /// since siblings of `$ref` are ignored.
    pub fn to_value(&self) -> Value {
        let mut obj = Map::new();
        match &self.ty {
            FragmentType::String => {
                obj.insert("type".into(), json!("string"));
            }
            FragmentType::Integer => {
                obj.insert("type".into(), json!("integer"));
            }
            FragmentType::Number => {
                obj.insert("type".into(), json!("number"));
            }
            FragmentType::Boolean => {
                obj.insert("type".into(), json!("boolean"));
            }
            FragmentType::Array(item) => {
                obj.insert("type".into(), json!("array"));
                obj.insert("items".into(), item.to_value());
            }
            FragmentType::Ref(name) => {
                let reference = json!({ "$ref": format!("#/components/schemas/{}", name) });
                if !self.nullable && self.default.is_none() {
                    return reference;
                }
                obj.insert("allOf".into(), Value::Array(vec![reference]));
            }
            FragmentType::Object {
                properties,
                required,
            } => {
                obj.insert("type".into(), json!("object"));
                let props: Map<String, Value> = properties
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_value()))
                    .collect();
                obj.insert("properties".into(), Value::Object(props));
                if !required.is_empty() {
                    obj.insert("required".into(), json!(required));
                }
            }
            FragmentType::OneOf(members) => {
                obj.insert(
                    "oneOf".into(),
                    Value::Array(members.iter().map(SchemaFragment::to_value).collect()),
                );
            }
        }
        if self.nullable {
            obj.insert("nullable".into(), Value::Bool(true));
        }
        if let Some(default) = &self.default {
            obj.insert("default".into(), default.clone());
        }
        Value::Object(obj)
    }
}

/// Interprets a default literal as written in source.
///
/// A quoted string literal is copied verbatim with its surrounding quotes
/// removed. Numbers and booleans become JSON values; anything else is kept as
/// its raw text.
pub fn default_literal_value(literal: &str) -> Value {
    let trimmed = literal.trim();
    if let Some(inner) = trimmed
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
    {
        return Value::String(inner.to_string());
    }
    match serde_json::from_str::<Value>(trimmed) {
        Ok(v @ (Value::Number(_) | Value::Bool(_))) => v,
        _ => Value::String(trimmed.to_string()),
    }
}
