//! # Naming Module
//!
//! Deterministic names for anonymous schemas.
//!
//! - **case**: `snake_case` and title-case helpers.
//! - **structural**: shape equality over the schema graph.
//! - **context**: the per-run `NamingContext`.

pub mod case;
pub mod context;
pub mod structural;

pub use case::{title_case, to_snake_case};
pub use context::{base_name, NamingContext};
pub use structural::structurally_equal;
