//! # Declared Module
//!
//! The service side: declared types, resource functions and the Rust-source
//! readers that produce them.
//!
//! - **model**: `DeclaredType`, `DeclaredParam`, `ResourceFunction`, `ServiceModel`.
//! - **type_expr**: Rust type strings to `DeclaredType`.
//! - **attributes**: `#[serde(...)]` attribute parsing.
//! - **source**: struct and enum extraction.

pub mod attributes;
pub mod model;
pub mod source;
pub mod type_expr;

pub use model::{
    DeclaredParam, DeclaredType, ParamBinding, RecordField, RecordType, ResourceFunction,
    ScalarKind, ServiceModel,
};
pub use source::extract_declared_types;
pub use type_expr::parse_declared_type;
