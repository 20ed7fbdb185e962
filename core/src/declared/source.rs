//! # Source Extraction
//!
//! Builds declared types from Rust `struct` and `enum` definitions.
//!
//! - Structs with named fields become records. Field names follow
//!   `#[serde(rename)]` / `rename_all`; `Option<T>` or `#[serde(default)]`
//!   makes a field optional; `#[serde(skip)]` drops it.
//! - Newtype structs become aliases of their inner type.
//! - Enums of unit variants are strings; `#[serde(untagged)]` enums of
//!   single-field tuple variants are unions of the variant types. Externally
//!   tagged tuple enums wrap each value in an object and are skipped.

use crate::declared::attributes::{apply_rename_all, extract_attributes};
use crate::declared::model::{DeclaredType, RecordField, RecordType, ScalarKind, ServiceModel};
use crate::declared::type_expr::map_ast_type;
use crate::error::AppResult;
use indexmap::IndexMap;
use ra_ap_edition::Edition;
use ra_ap_syntax::ast::{self, HasName};
use ra_ap_syntax::{AstNode, SourceFile, SyntaxKind, SyntaxNode};

/// Extracts every supported type definition in `code`, keyed by its wire name.
pub fn extract_declared_types(code: &str) -> AppResult<IndexMap<String, DeclaredType>> {
    let parse = SourceFile::parse(code, Edition::Edition2021);
    let file = parse.tree();
    let mut types = IndexMap::new();

    for node in file.syntax().descendants() {
        if let Some(struct_def) = ast::Struct::cast(node.clone()) {
            if let Some((name, ty)) = parse_struct_node(&struct_def)? {
                types.insert(name, ty);
            }
        } else if let Some(enum_def) = ast::Enum::cast(node) {
            if let Some((name, ty)) = parse_enum_node(&enum_def)? {
                types.insert(name, ty);
            }
        }
    }

    tracing::debug!(types = types.len(), "extracted declared types from source");
    Ok(types)
}

impl ServiceModel {
    /// Registers the types defined in Rust source `code`.
    pub fn with_types_from_source(mut self, code: &str) -> AppResult<Self> {
        self.types.extend(extract_declared_types(code)?);
        Ok(self)
    }
}

fn parse_struct_node(struct_def: &ast::Struct) -> AppResult<Option<(String, DeclaredType)>> {
    let Some(ident) = struct_def.name() else {
        return Ok(None);
    };
    let attrs = extract_attributes(struct_def.syntax());
    let name = attrs.rename.unwrap_or_else(|| ident.text().to_string());

    match struct_def.field_list() {
        Some(ast::FieldList::RecordFieldList(list)) => {
            let mut fields = Vec::new();
            for field in list.fields() {
                let (Some(fname), Some(ty)) = (field.name(), field.ty()) else {
                    continue;
                };
                let field_attrs = extract_attributes(field.syntax());
                if field_attrs.is_skipped {
                    continue;
                }

                let ident = fname.text().to_string();
                let ident = ident.strip_prefix("r#").unwrap_or(&ident).to_string();
                let wire_name = match (&field_attrs.rename, &attrs.rename_all) {
                    (Some(rename), _) => rename.clone(),
                    (None, Some(rule)) => apply_rename_all(rule, &ident),
                    (None, None) => ident,
                };

                let declared = map_ast_type(&ty)?;
                fields.push(RecordField {
                    name: wire_name,
                    optional: declared.is_nullable() || field_attrs.has_default,
                    ty: declared,
                    doc: extract_doc_comment(field.syntax()),
                });
            }
            Ok(Some((
                name.clone(),
                DeclaredType::Record(RecordType::new(name, fields)),
            )))
        }
        Some(ast::FieldList::TupleFieldList(list)) => {
            let mut items = list.fields();
            match (items.next().and_then(|f| f.ty()), items.next()) {
                (Some(inner), None) => Ok(Some((name, map_ast_type(&inner)?))),
                _ => {
                    tracing::debug!(name = %name, "skipping tuple struct with several fields");
                    Ok(None)
                }
            }
        }
        None => Ok(Some((
            name.clone(),
            DeclaredType::Record(RecordType::new(name, Vec::new())),
        ))),
    }
}

fn parse_enum_node(enum_def: &ast::Enum) -> AppResult<Option<(String, DeclaredType)>> {
    let Some(ident) = enum_def.name() else {
        return Ok(None);
    };
    let attrs = extract_attributes(enum_def.syntax());
    let name = attrs.rename.unwrap_or_else(|| ident.text().to_string());

    let mut unit = 0usize;
    let mut members = Vec::new();
    let mut total = 0usize;

    if let Some(list) = enum_def.variant_list() {
        for variant in list.variants() {
            total += 1;
            match variant.field_list() {
                None => unit += 1,
                Some(ast::FieldList::TupleFieldList(tfl)) => {
                    let mut fields = tfl.fields();
                    if let (Some(ty), None) = (fields.next().and_then(|f| f.ty()), fields.next()) {
                        members.push(map_ast_type(&ty)?);
                    }
                }
                Some(ast::FieldList::RecordFieldList(_)) => {}
            }
        }
    }

    if total > 0 && unit == total {
        Ok(Some((name, DeclaredType::Scalar(ScalarKind::String))))
    } else if total > 0 && members.len() == total {
        if attrs.untagged {
            Ok(Some((name, DeclaredType::Union(members))))
        } else {
            tracing::debug!(name = %name, "skipping externally tagged tuple enum");
            Ok(None)
        }
    } else {
        tracing::debug!(name = %name, "skipping enum with mixed or struct variants");
        Ok(None)
    }
}

/// Helper to extract `///` comments from a syntax node's trivia children.
fn extract_doc_comment(node: &SyntaxNode) -> Option<String> {
    let mut lines = Vec::new();

    for child in node.children_with_tokens() {
        if child.kind() == SyntaxKind::COMMENT {
            let text = child.to_string();
            if let Some(content) = text.strip_prefix("///") {
                lines.push(content.strip_prefix(' ').unwrap_or(content).to_owned());
            }
        }
    }

    if lines.is_empty() {
        None
    } else {
        Some(lines.join("\n").trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const MODELS: &str = r#"
        /// A pet.
        #[derive(Serialize, Deserialize)]
        #[serde(rename_all = "camelCase")]
        pub struct Pet {
            /// Display name.
            pub display_name: String,
            #[serde(rename = "tag")]
            pub label: Option<String>,
            #[serde(default)]
            pub age: i32,
            #[serde(skip)]
            pub cache: Vec<u8>,
            pub r#type: String,
        }

        pub struct PetId(String);

        pub enum Status { Available, Sold }

        #[serde(untagged)]
        pub enum Animal {
            Dog(Dog),
            Cat(Cat),
        }

        pub enum Tagged {
            Dog(Dog),
            Cat(Cat),
        }

        pub enum Weird {
            A,
            B { x: i32 },
        }
    "#;

    #[test]
    fn test_extract_record_fields() {
        let types = extract_declared_types(MODELS).unwrap();
        let Some(DeclaredType::Record(pet)) = types.get("Pet") else {
            panic!("Pet should be a record");
        };

        let names: Vec<&str> = pet.fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["displayName", "tag", "age", "type"]);

        let display = pet.field("displayName").unwrap();
        assert!(!display.optional);
        assert_eq!(display.doc.as_deref(), Some("Display name."));

        assert!(pet.field("tag").unwrap().optional);
        assert!(pet.field("age").unwrap().optional);
    }

    #[test]
    fn test_newtype_and_enums() {
        let types = extract_declared_types(MODELS).unwrap();
        assert_eq!(
            types.get("PetId"),
            Some(&DeclaredType::Scalar(ScalarKind::String))
        );
        assert_eq!(
            types.get("Status"),
            Some(&DeclaredType::Scalar(ScalarKind::String))
        );
        assert_eq!(
            types.get("Animal").map(DeclaredType::type_name).as_deref(),
            Some("Dog|Cat")
        );
        assert!(types.get("Tagged").is_none());
        assert!(types.get("Weird").is_none());
    }

    #[test]
    fn test_service_model_from_source() {
        let service = ServiceModel::new()
            .with_types_from_source("struct Owner { id: u64 }")
            .unwrap();
        assert!(matches!(service.lookup("Owner"), Some(DeclaredType::Record(_))));
    }
}
