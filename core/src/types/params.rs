//! # Parameter Mapping
//!
//! Both directions for path, query and header parameters:
//!
//! - declared parameter -> [`ParameterDescriptor`] (with a [`SchemaFragment`])
//! - contract parameter -> [`DeclaredParam`]
//!
//! Header parameters typed as an array of anything but strings have no
//! representation and are skipped in both directions.

use crate::declared::model::{DeclaredParam, DeclaredType, ParamBinding, ScalarKind};
use crate::naming::case::to_snake_case;
use crate::oas::models::ParamLocation;
use crate::schema::contract::{ContractOperation, ContractParameter};
use crate::schema::graph::{PrimitiveKind, SchemaGraph, SchemaKind};
use crate::types::fragment::{default_literal_value, SchemaFragment};
use crate::types::mapper::{MapperConfig, TypeMapper};
use serde_json::{json, Value};

/// A parameter as the contract should declare it.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterDescriptor {
    /// External name.
    pub name: String,
    /// Location.
    pub location: ParamLocation,
    /// Whether the parameter must be sent.
    pub required: bool,
    /// Schema.
    pub schema: SchemaFragment,
    /// The declared identifier, when a rename replaced it.
    pub renamed_from: Option<String>,
}

impl ParameterDescriptor {
    /// Serializes to an OpenAPI Parameter Object.
    pub fn to_value(&self) -> Value {
        json!({
            "name": self.name,
            "in": self.location.to_string(),
            "required": self.required,
            "schema": self.schema.to_value(),
        })
    }
}

/// Describes a declared path, query or header parameter.
///
/// Returns `None` for the body, and for header arrays of non-string items.
pub fn describe_parameter(
    param: &DeclaredParam,
    config: &MapperConfig,
) -> Option<ParameterDescriptor> {
    let location = param.binding.location()?;

    if location == ParamLocation::Header && !is_string_list_or_scalar(&param.ty) {
        tracing::debug!(
            parameter = %param.name,
            ty = %param.ty,
            "dropping header parameter typed as array of non-string items"
        );
        return None;
    }

    let nullable = param.ty.is_nullable();
    let required = match location {
        ParamLocation::Path => true,
        _ if param.default.is_some() => false,
        _ => !(nullable && config.treat_nilable_as_optional),
    };

    let mut schema = SchemaFragment::from_declared(&param.ty);
    schema.default = param.default.as_deref().map(default_literal_value);

    Some(ParameterDescriptor {
        name: param.external_name(),
        location,
        required,
        schema,
        renamed_from: param.rename.as_ref().map(|_| param.name.clone()),
    })
}

/// Describes every non-body parameter, skipping unsupported header arrays.
pub fn describe_parameters<'a>(
    params: impl IntoIterator<Item = &'a DeclaredParam>,
    config: &MapperConfig,
) -> Vec<ParameterDescriptor> {
    params
        .into_iter()
        .filter_map(|p| describe_parameter(p, config))
        .collect()
}

fn is_string_list_or_scalar(ty: &DeclaredType) -> bool {
    match ty.strip_nullable() {
        DeclaredType::Array(item) => {
            matches!(item.strip_nullable(), DeclaredType::Scalar(ScalarKind::String))
        }
        _ => true,
    }
}

/// Maps a contract parameter to the parameter a service would declare.
///
/// Optional query and header parameters become `Option<T>`. Returns `None`
/// for header arrays of non-string items.
pub fn declared_param_from_contract(
    mapper: &mut TypeMapper<'_>,
    graph: &SchemaGraph,
    param: &ContractParameter,
) -> Option<DeclaredParam> {
    if param.location == ParamLocation::Header {
        if let Some(schema) = param.schema {
            if let SchemaKind::Array { item } = &graph[schema].kind {
                if graph[*item].kind != SchemaKind::Primitive(PrimitiveKind::String) {
                    tracing::debug!(
                        parameter = %param.name,
                        "dropping header parameter typed as array of non-string items"
                    );
                    return None;
                }
            }
        }
    }

    let mut ty = match param.schema {
        Some(schema) => mapper.map_schema(schema, &param.name),
        None => DeclaredType::Scalar(ScalarKind::String),
    };
    if !param.required && !ty.is_nullable() {
        ty = DeclaredType::nullable(ty);
    }

    let identifier = to_snake_case(&param.name);
    let rename = (identifier != param.name).then(|| param.name.clone());
    let mut declared = DeclaredParam::new(identifier, ParamBinding::from(param.location), ty);
    declared.rename = rename;
    if let Some(schema) = param.schema {
        declared.default = graph[schema].default.as_ref().map(Value::to_string);
    }
    Some(declared)
}

/// Maps every parameter of `op`, plus its body as a `payload` parameter.
pub fn declared_params_for_operation(
    mapper: &mut TypeMapper<'_>,
    graph: &SchemaGraph,
    op: &ContractOperation,
) -> Vec<DeclaredParam> {
    let mut params: Vec<DeclaredParam> = op
        .parameters
        .iter()
        .filter_map(|p| declared_param_from_contract(mapper, graph, p))
        .collect();

    if let Some(body) = &op.request_body {
        let role = op
            .operation_id
            .as_deref()
            .map(|id| format!("{} request", id))
            .unwrap_or_else(|| "request body".to_string());
        let mut ty = match body.schema {
            Some(schema) => mapper.map_schema(schema, &role),
            None => DeclaredType::Scalar(ScalarKind::String),
        };
        if !body.required && !ty.is_nullable() {
            ty = DeclaredType::nullable(ty);
        }
        params.push(DeclaredParam::new("payload", ParamBinding::Body, ty));
    }
    params
}
