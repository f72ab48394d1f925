//! `SeaORM` entity definitions.

pub mod orders;
pub mod status_definitions;
