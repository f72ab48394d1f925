//! Order status catalog for Tapiz.
//!
//! The catalog is the ordered set of named order statuses, some of which
//! mark an order as terminal (done, cancelled, or pending). It is always
//! handled as an explicitly passed-in snapshot, never as ambient state,
//! so every rule over it stays pure and testable.
//!
//! # Modules
//!
//! - `types` - Status definitions and the catalog snapshot
//! - `error` - Catalog-specific error types
//! - `admin` - Validation and planning for catalog admin operations

pub mod admin;
pub mod error;
pub mod types;


pub use admin::{CatalogAdmin, DefaultAssignment, NewStatusDefinition, SortAssignment};
pub use error::CatalogError;
pub use types::{EndState, StatusCatalog, StatusDefinition};
