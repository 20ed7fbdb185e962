//! # Validation Configuration
//!
//! Selection policy and options for a validation run. Loads from YAML or
//! JSON with camelCase keys; the singular forms (`tag`, `excludeTag`,
//! `operation`, `excludeOperation`) are accepted as aliases.

use crate::error::{AppError, AppResult};
use crate::schema::contract::ContractOperation;
use crate::types::mapper::MapperConfig;
use serde::Deserialize;

/// Options for [`crate::validation::validate`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ValidationConfig {
    /// Only operations carrying one of these tags are validated.
    #[serde(alias = "tag")]
    pub tags: Vec<String>,
    /// Operations carrying any of these tags are skipped.
    #[serde(alias = "excludeTag")]
    pub exclude_tags: Vec<String>,
    /// Only these operation ids are validated.
    #[serde(alias = "operation")]
    pub operations: Vec<String>,
    /// These operation ids are skipped.
    #[serde(alias = "excludeOperation")]
    pub exclude_operations: Vec<String>,
    /// A nullable field or parameter is also treated as not required.
    pub treat_nilable_as_optional: bool,
}

impl ValidationConfig {
    /// Parses a YAML (or JSON) configuration string.
    pub fn from_yaml_str(content: &str) -> AppResult<Self> {
        serde_yaml::from_str(content)
            .map_err(|e| AppError::General(format!("Failed to parse validation config: {}", e)))
    }

    /// Whether an include filter (`tags` or `operations`) is active.
    pub fn has_include_filter(&self) -> bool {
        !self.tags.is_empty() || !self.operations.is_empty()
    }

    /// Applies the selection policy to one operation.
    pub fn is_selected(&self, op: &ContractOperation) -> bool {
        let op_id = op.operation_id.as_deref();
        let has_tag = |list: &[String]| op.tags.iter().any(|t| list.contains(t));
        let has_id = |list: &[String]| op_id.is_some_and(|id| list.iter().any(|o| o == id));

        (self.tags.is_empty() || has_tag(self.tags.as_slice()))
            && (self.operations.is_empty() || has_id(self.operations.as_slice()))
            && !has_tag(self.exclude_tags.as_slice())
            && !has_id(self.exclude_operations.as_slice())
    }

    /// The mapper options implied by this configuration.
    pub fn mapper_config(&self) -> MapperConfig {
        MapperConfig {
            treat_nilable_as_optional: self.treat_nilable_as_optional,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oas::models::HttpMethod;

    fn op(id: &str, tags: &[&str]) -> ContractOperation {
        ContractOperation {
            path: "/x".into(),
            method: HttpMethod::Get,
            operation_id: Some(id.into()),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            parameters: Vec::new(),
            request_body: None,
        }
    }

    #[test]
    fn test_load_with_aliases() {
        let config = ValidationConfig::from_yaml_str(
            r#"
tag: [pets]
excludeOperation: [deletePet]
treatNilableAsOptional: true
"#,
        )
        .unwrap();
        assert_eq!(config.tags, vec!["pets".to_string()]);
        assert_eq!(config.exclude_operations, vec!["deletePet".to_string()]);
        assert!(config.treat_nilable_as_optional);
        assert!(config.mapper_config().treat_nilable_as_optional);
    }

    #[test]
    fn test_absent_options_default() {
        let config = ValidationConfig::from_yaml_str("{}").unwrap();
        assert_eq!(config, ValidationConfig::default());
        assert!(!config.has_include_filter());
        assert!(config.is_selected(&op("any", &[])));
    }

    #[test]
    fn test_selection_policy() {
        let config = ValidationConfig {
            tags: vec!["pets".into()],
            exclude_tags: vec!["beta".into()],
            exclude_operations: vec!["deletePet".into()],
            ..Default::default()
        };
        assert!(config.is_selected(&op("listPets", &["pets"])));
        assert!(!config.is_selected(&op("listUsers", &["users"])));
        assert!(!config.is_selected(&op("newPets", &["pets", "beta"])));
        assert!(!config.is_selected(&op("deletePet", &["pets"])));

        let by_id = ValidationConfig {
            operations: vec!["listPets".into()],
            ..Default::default()
        };
        assert!(by_id.is_selected(&op("listPets", &[])));
        assert!(!by_id.is_selected(&op("getPet", &[])));
    }

    #[test]
    fn test_invalid_config() {
        assert!(ValidationConfig::from_yaml_str("tags: 5").is_err());
    }
}
