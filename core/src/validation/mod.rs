//! # Validation Module
//!
//! - **engine**: coverage, parameter and body checks per operation.
//! - **body**: structural comparison of declared types against schemas.
//! - **config**: selection policy.
//! - **error**: the `ValidationError` findings.

pub mod body;
pub mod config;
pub mod engine;
pub mod error;

pub use body::BodyValidator;
pub use config::ValidationConfig;
pub use engine::{validate, REQUEST_BODY_FIELD};
pub use error::ValidationError;
