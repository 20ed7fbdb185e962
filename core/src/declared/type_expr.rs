//! # Type Expressions
//!
//! Converts Rust type strings into [`DeclaredType`].
//! Handles primitives, collections (Vec), and nullability (Option).

use crate::declared::model::{DeclaredType, ScalarKind};
use crate::error::{AppError, AppResult};
// Import HasGenericArgs to access .generic_arg_list() on PathSegments
use ra_ap_edition::Edition;
use ra_ap_syntax::ast::{self, HasGenericArgs};
use ra_ap_syntax::{AstNode, SourceFile};

/// Parses a Rust type string (e.g. `Option<Vec<String>>`) into a declared type.
pub fn parse_declared_type(rust_type: &str) -> AppResult<DeclaredType> {
    // Wrap in a type alias so the parser sees valid Rust syntax
    let code = format!("type _Wrapper = {};", rust_type);
    let parse = SourceFile::parse(&code, Edition::Edition2021);
    let file = parse.tree();

    let type_alias = file
        .syntax()
        .descendants()
        .find_map(ast::TypeAlias::cast)
        .ok_or_else(|| AppError::General(format!("Failed to parse type string: {}", rust_type)))?;

    let root_type = type_alias
        .ty()
        .ok_or_else(|| AppError::General(format!("Invalid type syntax: {}", rust_type)))?;

    map_ast_type(&root_type)
}

/// Recursively maps an AST Type node to a declared type.
pub(crate) fn map_ast_type(ty: &ast::Type) -> AppResult<DeclaredType> {
    match ty {
        ast::Type::PathType(path_type) => {
            let path = path_type
                .path()
                .ok_or_else(|| AppError::General("Empty path".into()))?;
            let segment = path
                .segment()
                .ok_or_else(|| AppError::General("Empty segment".into()))?;
            let name_ref = segment
                .name_ref()
                .ok_or_else(|| AppError::General("No type name".into()))?;
            let name = name_ref.text();

            match name.as_str() {
                "String" | "str" | "char" | "Uuid" | "NaiveDateTime" | "DateTime"
                | "NaiveDate" => Ok(DeclaredType::Scalar(ScalarKind::String)),
                "bool" => Ok(DeclaredType::Scalar(ScalarKind::Boolean)),
                "i8" | "i16" | "i32" | "i64" | "i128" | "isize" | "u8" | "u16" | "u32" | "u64"
                | "u128" | "usize" => Ok(DeclaredType::Scalar(ScalarKind::Integer)),
                "f32" | "f64" => Ok(DeclaredType::Scalar(ScalarKind::Number)),

                "Option" => Ok(DeclaredType::nullable(first_type_arg(&segment)?)),
                "Vec" => Ok(DeclaredType::array(first_type_arg(&segment)?)),
                "Box" => first_type_arg(&segment),

                // Anything else is a user defined type
                other => Ok(DeclaredType::named(other)),
            }
        }
        ast::Type::RefType(ref_type) => {
            let inner = ref_type
                .ty()
                .ok_or_else(|| AppError::General("Invalid reference".into()))?;
            map_ast_type(&inner)
        }
        ast::Type::SliceType(slice) => {
            let inner = slice
                .ty()
                .ok_or_else(|| AppError::General("Invalid slice".into()))?;
            Ok(DeclaredType::array(map_ast_type(&inner)?))
        }
        _ => Err(AppError::General(format!(
            "Unsupported type structure: {}",
            ty.syntax().text()
        ))),
    }
}

/// The `T` of a container such as `Option<T>` or `Vec<T>`.
fn first_type_arg(segment: &ast::PathSegment) -> AppResult<DeclaredType> {
    let generic_args = segment
        .generic_arg_list()
        .ok_or_else(|| AppError::General("Missing generic arguments for container type".into()))?;

    let first_arg = generic_args
        .generic_args()
        .next()
        .ok_or_else(|| AppError::General("Generic list empty".into()))?;

    match first_arg {
        ast::GenericArg::TypeArg(type_arg) => {
            let inner_ty = type_arg
                .ty()
                .ok_or_else(|| AppError::General("Invalid generic type".into()))?;
            map_ast_type(&inner_ty)
        }
        _ => Err(AppError::General(
            "Unsupported generic argument type".into(),
        )),
    }
}
