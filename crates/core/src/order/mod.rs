//! Order document types and financial totals.
//!
//! An order is a document-shaped record: customer snapshot, invoice
//! details, a sequence of furniture line groups, and a payment state
//! with an append-only payment history. The only derived number is the
//! order total, computed here as a pure function.
//!
//! # Modules
//!
//! - `types` - Order, line group, and payment state types
//! - `financials` - Order total calculation

pub mod financials;
pub mod types;

#[cfg(test)]
mod total_props;

pub use financials::{line_group_total, order_total};
pub use types::{
    Order, OrderDetails, OrderLineGroup, PaymentEntry, PaymentKind, PaymentMethod, PaymentState,
    PersonalInfo,
};
