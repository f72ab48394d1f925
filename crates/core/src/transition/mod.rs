//! Status transition and payment-consistency engine.
//!
//! Transitions between ordinary statuses are always allowed; moving an
//! order into an end state is gated by payment-consistency rules:
//! done means fully paid, cancelled means zero paid, pending clears
//! payment and records when work resumes. The engine never writes
//! anything itself - it returns a single [`types::OrderPatch`] for the
//! persistence layer to apply atomically with the status change.
//!
//! # Modules
//!
//! - `types` - Outcomes, inputs, and the order patch
//! - `error` - Transition-specific error types
//! - `engine` - The transition rules

pub mod engine;
pub mod error;
pub mod types;

#[cfg(test)]
mod tests;

pub use engine::TransitionEngine;
pub use error::TransitionError;
pub use types::{
    InputRequest, OrderPatch, Resolution, ResolutionChoice, TransitionInput, TransitionOutcome,
};
