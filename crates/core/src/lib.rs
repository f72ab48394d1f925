//! Core business logic for Tapiz.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! All domain types, validation rules, and calculations live here.
//!
//! # Modules
//!
//! - `catalog` - Order status catalog and its admin rules
//! - `order` - Order document types and financial totals
//! - `transition` - Status transition and payment-consistency engine

pub mod catalog;
pub mod order;
pub mod transition;
