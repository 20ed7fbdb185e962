//! # Auth Config Model
//!
//! Folds the document's apiKey security schemes into a configuration record
//! plus the three pieces needed to wire it into a client: the lookup table,
//! the constructor parameter and the assignment statements. Every output
//! follows the scheme declaration order.

use crate::declared::model::{DeclaredType, RecordField, RecordType, ScalarKind};
use crate::naming::case::to_snake_case;
use crate::schema::contract::{CredentialLocation, SecuritySchemeDescriptor};
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::fmt;

/// Name of the generated configuration record.
pub const API_KEYS_CONFIG_TYPE: &str = "ApiKeysConfig";

/// Name of the constructor parameter carrying the configuration.
pub const API_KEYS_CONFIG_PARAM: &str = "api_keys_config";

/// One apiKey scheme as a configuration field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthConfigField {
    /// Field name (snake_case of the scheme name).
    pub field_name: String,
    /// Scheme name as declared.
    pub scheme_name: String,
    /// Scheme description, line breaks preserved.
    pub description: Option<String>,
    /// Header or query key the credential travels under.
    pub parameter_name: String,
    /// Header or query.
    pub credential_location: CredentialLocation,
}

/// A constructor parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstructorParam {
    /// Parameter name.
    pub name: String,
    /// Parameter type.
    pub ty: DeclaredType,
}

/// Assigns one configuration field into the lookup table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WiringStatement {
    /// Lookup-table key (the credential parameter name).
    pub key: String,
    /// Constructor parameter the value is read from.
    pub source_param: String,
    /// Field of the constructor parameter.
    pub source_field: String,
}

impl fmt::Display for WiringStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "api_keys[{:?}] = {}.{}",
            self.key, self.source_param, self.source_field
        )
    }
}

/// The configuration model for all apiKey schemes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthConfigModel {
    /// Fields in scheme declaration order.
    pub fields: Vec<AuthConfigField>,
}

impl AuthConfigModel {
    /// Builds the model from scheme descriptors.
    pub fn from_schemes(schemes: &[SecuritySchemeDescriptor]) -> Self {
        let mut keys = HashSet::new();
        let fields = schemes
            .iter()
            .filter(|s| {
                let fresh = keys.insert(s.parameter_name.as_str());
                if !fresh {
                    tracing::warn!(
                        scheme = %s.scheme_name,
                        key = %s.parameter_name,
                        "credential key already bound by an earlier scheme"
                    );
                }
                fresh
            })
            .map(|s| AuthConfigField {
                field_name: to_snake_case(&s.scheme_name),
                scheme_name: s.scheme_name.clone(),
                description: s.description.clone(),
                parameter_name: s.parameter_name.clone(),
                credential_location: s.credential_location,
            })
            .collect();
        Self { fields }
    }

    /// Whether there is nothing to configure.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// (a) The `ApiKeysConfig` record: one required string field per scheme,
    /// documented with the scheme description.
    pub fn config_type(&self) -> RecordType {
        RecordType::new(
            API_KEYS_CONFIG_TYPE,
            self.fields
                .iter()
                .map(|f| RecordField {
                    name: f.field_name.clone(),
                    ty: DeclaredType::Scalar(ScalarKind::String),
                    optional: false,
                    doc: f.description.clone(),
                })
                .collect(),
        )
    }

    /// (b) The lookup-table literal: credential parameter name -> config field.
    pub fn lookup_table(&self) -> Value {
        let entries: Map<String, Value> = self
            .fields
            .iter()
            .map(|f| (f.parameter_name.clone(), Value::String(f.field_name.clone())))
            .collect();
        Value::Object(entries)
    }

    /// (c) Constructor parameters needed to fill the table.
    pub fn constructor_params(&self) -> Vec<ConstructorParam> {
        if self.is_empty() {
            return Vec::new();
        }
        vec![ConstructorParam {
            name: API_KEYS_CONFIG_PARAM.to_string(),
            ty: DeclaredType::named(API_KEYS_CONFIG_TYPE),
        }]
    }

    /// (d) Statements populating the table from the constructor parameter.
    pub fn wiring_statements(&self) -> Vec<WiringStatement> {
        self.fields
            .iter()
            .map(|f| WiringStatement {
                key: f.parameter_name.clone(),
                source_param: API_KEYS_CONFIG_PARAM.to_string(),
                source_field: f.field_name.clone(),
            })
            .collect()
    }
}
