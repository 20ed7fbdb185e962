//! # Validation Findings
//!
//! Mismatches between a service and its contract. These are data, collected
//! and returned; they never abort a run.

use crate::oas::models::HttpMethod;
use derive_more::Display;

/// One finding of the validation engine.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum ValidationError {
    /// A field or parameter the contract expects is absent.
    #[display("missing field '{field_name}'")]
    MissingField {
        /// The absent field or parameter.
        field_name: String,
    },

    /// A field is present with an incompatible type.
    #[display("type mismatch for '{field_name}': expected {expected}, found {actual}")]
    TypeMismatch {
        /// The offending field or parameter.
        field_name: String,
        /// Contract type.
        expected: String,
        /// Declared type.
        actual: String,
    },

    /// No union branch is satisfied. `branch_errors` are the errors against
    /// the first branch.
    #[display(
        "'{field_name}' matches no union branch ({} error(s) against the first branch)",
        branch_errors.len()
    )]
    OneOfTypeValidation {
        /// The declared type's name.
        field_name: String,
        /// Findings against the first declared branch.
        branch_errors: Vec<ValidationError>,
    },

    /// A declared resource has no operation in the contract.
    #[display("resource {method} {path} is not defined in the contract")]
    ResourcePathMissing {
        /// Path template.
        path: String,
        /// HTTP method.
        method: HttpMethod,
    },

    /// A contract operation has no declared resource.
    #[display("operation {method} {path} is not implemented")]
    OperationPathMissing {
        /// Path template.
        path: String,
        /// HTTP method.
        method: HttpMethod,
    },
}

impl ValidationError {
    /// Shorthand for [`ValidationError::MissingField`].
    pub fn missing(field_name: impl Into<String>) -> Self {
        ValidationError::MissingField {
            field_name: field_name.into(),
        }
    }

    /// Shorthand for [`ValidationError::TypeMismatch`].
    pub fn mismatch(
        field_name: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        ValidationError::TypeMismatch {
            field_name: field_name.into(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Nested findings (only `OneOfTypeValidation` has any).
    pub fn children(&self) -> &[ValidationError] {
        match self {
            ValidationError::OneOfTypeValidation { branch_errors, .. } => branch_errors,
            _ => &[],
        }
    }
}

impl std::error::Error for ValidationError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        assert_eq!(
            ValidationError::missing("bark").to_string(),
            "missing field 'bark'"
        );
        assert_eq!(
            ValidationError::mismatch("age", "integer", "String").to_string(),
            "type mismatch for 'age': expected integer, found String"
        );
        let one_of = ValidationError::OneOfTypeValidation {
            field_name: "Dog".into(),
            branch_errors: vec![ValidationError::missing("bark")],
        };
        assert_eq!(
            one_of.to_string(),
            "'Dog' matches no union branch (1 error(s) against the first branch)"
        );
        assert_eq!(one_of.children().len(), 1);
        assert_eq!(
            ValidationError::OperationPathMissing {
                path: "/pets".into(),
                method: HttpMethod::Get
            }
            .to_string(),
            "operation get /pets is not implemented"
        );
    }
}
