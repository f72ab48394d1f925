//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the
//! application.

pub mod order;
pub mod status_catalog;

pub use order::{CreateOrderInput, OrderError, OrderRepository, TransitionResult};
pub use status_catalog::{StatusCatalogError, StatusCatalogRepository, StatusDefinitionInput};
