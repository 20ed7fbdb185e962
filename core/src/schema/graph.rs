//! # Schema Graph
//!
//! The canonical, arena-backed representation of resolved schemas.
//!
//! Nodes are addressed by [`SchemaId`] handles. A `$ref` becomes an edge to the
//! one node of its component, so "same node" is an integer comparison and
//! recursive schemas are plain cycles in the graph.

use indexmap::{IndexMap, IndexSet};
use serde_json::Value;
use std::fmt;
use std::ops::Index;

/// Opaque handle to a node in a [`SchemaGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SchemaId(usize);

impl SchemaId {
    /// Position of the node in its arena.
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for SchemaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Scalar JSON types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    /// `string`
    String,
    /// `number`
    Number,
    /// `integer`
    Integer,
    /// `boolean`
    Boolean,
}

impl PrimitiveKind {
    /// Maps a JSON Schema `type` name. Returns `None` for non-scalar names.
    pub fn from_type_name(name: &str) -> Option<Self> {
        match name {
            "string" => Some(PrimitiveKind::String),
            "number" => Some(PrimitiveKind::Number),
            "integer" => Some(PrimitiveKind::Integer),
            "boolean" => Some(PrimitiveKind::Boolean),
            _ => None,
        }
    }

    /// The JSON Schema `type` name.
    pub fn as_str(&self) -> &'static str {
        match self {
            PrimitiveKind::String => "string",
            PrimitiveKind::Number => "number",
            PrimitiveKind::Integer => "integer",
            PrimitiveKind::Boolean => "boolean",
        }
    }
}

/// Which composition keyword produced a union.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnionKind {
    /// `oneOf`
    OneOf,
    /// `anyOf`
    AnyOf,
}

impl UnionKind {
    /// The keyword spelling.
    pub fn as_str(&self) -> &'static str {
        match self {
            UnionKind::OneOf => "oneOf",
            UnionKind::AnyOf => "anyOf",
        }
    }
}

/// The shape of a schema node.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaKind {
    /// A scalar.
    Primitive(PrimitiveKind),
    /// A homogeneous array.
    Array {
        /// Element schema.
        item: SchemaId,
    },
    /// An object with named properties.
    Record {
        /// Properties in declaration order.
        fields: IndexMap<String, SchemaId>,
        /// Names listed in `required`.
        required: IndexSet<String>,
    },
    /// `oneOf` / `anyOf`. Branch order is significant.
    Union {
        /// Alternatives in declaration order.
        branches: Vec<SchemaId>,
        /// Originating keyword.
        kind: UnionKind,
    },
    /// An `allOf` that could not be flattened into a single record.
    Intersection {
        /// Members in declaration order.
        branches: Vec<SchemaId>,
    },
}

impl SchemaKind {
    /// An object without properties.
    pub fn empty_record() -> Self {
        SchemaKind::Record {
            fields: IndexMap::new(),
            required: IndexSet::new(),
        }
    }

    /// Short keyword used in diagnostics (`string`, `object`, `oneOf`, ...).
    pub fn describe(&self) -> &'static str {
        match self {
            SchemaKind::Primitive(p) => p.as_str(),
            SchemaKind::Array { .. } => "array",
            SchemaKind::Record { .. } => "object",
            SchemaKind::Union { kind, .. } => kind.as_str(),
            SchemaKind::Intersection { .. } => "allOf",
        }
    }
}

/// A resolved schema node.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaNode {
    /// Shape.
    pub kind: SchemaKind,
    /// Whether `null` is an accepted value.
    pub nullable: bool,
    /// The `default` literal, if any.
    pub default: Option<Value>,
    /// Component name for reusable schemas; `None` for inline ones.
    pub name: Option<String>,
    /// The `title` keyword, used as a naming hint.
    pub title: Option<String>,
}

impl SchemaNode {
    /// Anonymous, non-nullable node of the given shape.
    pub fn anonymous(kind: SchemaKind) -> Self {
        Self {
            kind,
            nullable: false,
            default: None,
            name: None,
            title: None,
        }
    }
}

/// Arena of resolved schema nodes plus the component-name index.
#[derive(Debug, Clone, Default)]
pub struct SchemaGraph {
    nodes: Vec<SchemaNode>,
    components: IndexMap<String, SchemaId>,
}

impl SchemaGraph {
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a node and returns its handle.
    pub fn push(&mut self, node: SchemaNode) -> SchemaId {
        self.nodes.push(node);
        SchemaId(self.nodes.len() - 1)
    }

    /// Overwrites a node reserved earlier with [`SchemaGraph::push`].
    pub(crate) fn replace(&mut self, id: SchemaId, node: SchemaNode) {
        self.nodes[id.0] = node;
    }

    /// Registers `name` as the component living at `id`.
    pub(crate) fn register_component(&mut self, name: &str, id: SchemaId) {
        self.components.insert(name.to_string(), id);
    }

    /// Looks up a node.
    pub fn get(&self, id: SchemaId) -> Option<&SchemaNode> {
        self.nodes.get(id.0)
    }

    /// Looks up a component by name.
    pub fn component(&self, name: &str) -> Option<SchemaId> {
        self.components.get(name).copied()
    }

    /// Component names and ids in declaration order.
    pub fn components(&self) -> impl Iterator<Item = (&str, SchemaId)> + '_ {
        self.components.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the graph has no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Diagnostic label: the component name if present, else the kind keyword.
    pub fn describe(&self, id: SchemaId) -> String {
        let node = &self[id];
        match &node.name {
            Some(name) => name.clone(),
            None => node.kind.describe().to_string(),
        }
    }
}

impl Index<SchemaId> for SchemaGraph {
    type Output = SchemaNode;

    fn index(&self, id: SchemaId) -> &SchemaNode {
        &self.nodes[id.0]
    }
}
