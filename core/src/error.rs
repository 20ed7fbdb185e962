//! # Error Handling
//!
//! Provides the unified `AppError` enum returned by every fallible operation
//! in the crate. Validation findings are *not* errors; see
//! [`crate::validation::ValidationError`].

use derive_more::{Display, From};

/// The Global Error Enum.
///
/// We use `derive_more` for boilerplate.
/// Note: String errors default to `General`.
#[derive(Debug, Clone, PartialEq, Eq, Display, From)]
pub enum AppError {
    /// A `$ref` points at a target that does not exist in the document.
    #[from(ignore)]
    #[display("Unresolved reference: {_0}")]
    UnresolvedReference(String),

    /// A schema combines keywords in a way that has no defined precedence.
    #[from(ignore)]
    #[display("Unsupported schema shape at '{location}': {reason}")]
    UnsupportedSchemaShape {
        /// Where the offending node sits (component name or JSON-ish path).
        location: String,
        /// Human readable description of the conflict.
        reason: String,
    },

    /// Generic errors (document loading, type expression parsing).
    #[display("General Error: {_0}")]
    General(String),
}

impl AppError {
    /// Shorthand for building an [`AppError::UnsupportedSchemaShape`].
    pub fn unsupported(location: impl Into<String>, reason: impl Into<String>) -> Self {
        AppError::UnsupportedSchemaShape {
            location: location.into(),
            reason: reason.into(),
        }
    }
}

/// Manual implementation of the standard Error trait.
impl std::error::Error for AppError {}

/// Helper type alias for Result using AppError.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_conversion() {
        // String converts to General, never to the resolver kinds
        let msg = String::from("something wrong");
        let app_err: AppError = msg.into();
        match app_err {
            AppError::General(s) => assert_eq!(s, "something wrong"),
            _ => panic!("String should convert to AppError::General"),
        }
    }

    #[test]
    fn test_unresolved_display() {
        let app_err = AppError::UnresolvedReference("#/components/schemas/Nope".into());
        assert_eq!(
            app_err.to_string(),
            "Unresolved reference: #/components/schemas/Nope"
        );
    }

    #[test]
    fn test_unsupported_display() {
        let app_err = AppError::unsupported("Pet", "oneOf and anyOf on the same node");
        assert_eq!(
            app_err.to_string(),
            "Unsupported schema shape at 'Pet': oneOf and anyOf on the same node"
        );
    }
}
