//! # Schema Module
//!
//! - **graph**: arena of canonical schema nodes.
//! - **resolver**: raw shims to graph, with `$ref` edges and composition handling.
//! - **contract**: operations, parameters and security schemes over the graph.

pub mod contract;
pub mod graph;
pub mod resolver;

pub use contract::{
    collect_security_schemes, ContractModel, ContractOperation, ContractParameter,
    ContractRequestBody, CredentialLocation, SecuritySchemeDescriptor,
};
pub use graph::{PrimitiveKind, SchemaGraph, SchemaId, SchemaKind, SchemaNode, UnionKind};
pub use resolver::{resolve_schemas, SchemaResolver};
