//! Order domain types.
//!
//! Every numeric field that can be absent in a stored document is an
//! `Option<Decimal>`; a missing amount or quantity always coerces to
//! zero in calculations instead of failing.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Customer snapshot captured at order intake.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonalInfo {
    /// Customer or company name.
    #[serde(default)]
    pub full_name: String,
    /// Contact phone number.
    pub phone: Option<String>,
    /// Contact email.
    pub email: Option<String>,
    /// Pickup/delivery address.
    pub address: Option<String>,
}

/// Invoice-level details of an order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderDetails {
    /// Invoice number shown on documents.
    pub invoice_number: Option<String>,
    /// Free-text description of the work.
    pub description: Option<String>,
    /// Where the lead came from (showroom, phone, web, ...).
    pub platform: Option<String>,
    /// Expected timeline in days, as entered by staff.
    pub timeline: Option<String>,
    /// Date work is expected to start.
    pub start_date: Option<NaiveDate>,
}

/// One furniture item group on an order.
///
/// Materials and labour are always priced; foam is an optional extra
/// that only contributes when enabled (or when it carries a price, for
/// legacy documents that never set the flag).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLineGroup {
    /// Kind of furniture being reupholstered.
    #[serde(default)]
    pub furniture_type: String,
    /// Material supplier company.
    pub material_company: Option<String>,
    /// Supplier catalog code of the material.
    pub material_code: Option<String>,
    /// Material quantity (e.g., meters of fabric).
    pub material_quantity: Option<Decimal>,
    /// Price per material unit.
    pub material_unit_price: Option<Decimal>,
    /// Price per labour unit.
    pub labour_unit_price: Option<Decimal>,
    /// Labour quantity.
    pub labour_quantity: Option<Decimal>,
    /// Whether foam replacement is part of this group.
    #[serde(default)]
    pub foam_enabled: bool,
    /// Price per foam unit.
    pub foam_unit_price: Option<Decimal>,
    /// Foam quantity.
    pub foam_quantity: Option<Decimal>,
    /// Notes about the material.
    pub material_notes: Option<String>,
    /// General notes for the workshop.
    pub general_notes: Option<String>,
}

/// Kind of a payment history entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentKind {
    /// Up-front deposit at intake.
    Deposit,
    /// Ordinary customer payment.
    Payment,
    /// Automatic settlement of an outstanding balance on completion.
    Settlement,
    /// Refund back to the customer (negative amount).
    Refund,
}

impl PaymentKind {
    /// Returns the string representation of the kind.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Deposit => "deposit",
            Self::Payment => "payment",
            Self::Settlement => "settlement",
            Self::Refund => "refund",
        }
    }
}

impl fmt::Display for PaymentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How a payment was made.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    /// Cash payment.
    Cash,
    /// Card payment.
    Card,
    /// Bank transfer.
    Transfer,
    /// Book-keeping adjustment made by the system.
    Adjustment,
    /// Anything else.
    Other,
}

/// One entry in the append-only payment history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentEntry {
    /// Signed amount; negative means a refund.
    pub amount: Decimal,
    /// When the payment was recorded.
    pub date: DateTime<Utc>,
    /// Kind of entry.
    pub kind: PaymentKind,
    /// How the payment was made.
    pub method: PaymentMethod,
    /// Optional free-text description.
    pub description: Option<String>,
}

/// Payment state of an order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentState {
    /// Deposit requested at intake.
    pub deposit_required: Option<Decimal>,
    /// Total amount received so far.
    #[serde(default)]
    pub amount_paid: Decimal,
    /// Whether pickup/delivery was sold with the order.
    #[serde(default)]
    pub pickup_delivery_enabled: bool,
    /// Pickup/delivery cost, charged once per order.
    pub pickup_delivery_cost: Option<Decimal>,
    /// Append-only, ordered payment history.
    #[serde(default)]
    pub payment_history: Vec<PaymentEntry>,
}

/// A customer order.
///
/// `status_value` always names a definition in the current status
/// catalog; it is only ever mutated through the transition engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    /// Unique identifier.
    pub id: Uuid,
    /// Customer snapshot.
    pub personal_info: PersonalInfo,
    /// Invoice-level details.
    pub order_details: OrderDetails,
    /// Furniture item groups.
    #[serde(default)]
    pub line_groups: Vec<OrderLineGroup>,
    /// Payment state.
    #[serde(default)]
    pub payment_state: PaymentState,
    /// Machine key of the current status.
    pub status_value: String,
    /// Why the order was cancelled, when it was.
    pub cancellation_reason: Option<String>,
    /// When the order was cancelled.
    pub cancelled_at: Option<DateTime<Utc>>,
    /// When the order was completed.
    pub completed_at: Option<DateTime<Utc>>,
    /// When the order was parked as pending.
    pub pending_at: Option<DateTime<Utc>>,
    /// When a pending order is expected to resume.
    pub expected_resume_date: Option<NaiveDate>,
    /// Notes recorded when parking the order.
    pub pending_notes: Option<String>,
    /// When the order was created.
    pub created_at: DateTime<Utc>,
    /// When the order was last written.
    pub updated_at: DateTime<Utc>,
}
