//! # Type Mapping Module
//!
//! - **mapper**: schema graph -> declared types.
//! - **fragment**: declared types -> schema fragments.
//! - **params**: parameter descriptors in both directions.
//! - **auth**: apiKey schemes -> `AuthConfigModel`.

pub mod auth;
pub mod fragment;
pub mod mapper;
pub mod params;

pub use auth::{AuthConfigField, AuthConfigModel, ConstructorParam, WiringStatement};
pub use fragment::{default_literal_value, FragmentType, SchemaFragment};
pub use mapper::{map_components, MapperConfig, TypeMapper, TypeModel};
pub use params::{
    declared_param_from_contract, declared_params_for_operation, describe_parameter,
    describe_parameters, ParameterDescriptor,
};
