//! Adapter definitions and the registry they build
//!
//! - **Definition** - TOML adapter files describing one pegged asset
//! - **Registry** - Constructed chain → role → source mapping handed to collection
//! - **Validation** - Static checks run before any network access

pub mod definition;
pub mod registry;
pub mod validation;

pub use definition::AdapterDefinition;
pub use registry::AdapterRegistry;
pub use validation::{ensure_valid, validate_definition, ValidationIssue};
