//! Transition domain types.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::order::types::{Order, PaymentEntry};

/// Result of requesting a status transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum TransitionOutcome {
    /// The transition is valid as-is; the patch can be persisted.
    Apply(OrderPatch),
    /// The transition needs user-supplied fields before it can apply.
    RequiresInput(InputRequest),
    /// A payment mismatch must be resolved first; exactly one
    /// remediation is offered.
    RequiresResolution(Resolution),
}

/// Fields the user must supply before an end-state transition applies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InputRequest {
    /// A cancellation needs a non-empty reason.
    Cancellation {
        /// The end-state status being entered.
        status_value: String,
    },
    /// Parking an order needs an expected resume date (>= today) and
    /// optionally some notes.
    Pending {
        /// The end-state status being entered.
        status_value: String,
    },
}

/// The single remediation offered for a payment mismatch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Resolution {
    /// Completing an under-paid order: mark the shortfall as paid.
    SettleShortfall {
        /// The done status being entered.
        status_value: String,
        /// Outstanding amount, `total - paid`.
        pending_amount: Decimal,
    },
    /// Cancelling a paid order: refund the payment down to zero.
    RefundPayments {
        /// The cancelled status being entered.
        status_value: String,
        /// Amount currently paid, to be refunded in full.
        current_amount: Decimal,
    },
}

impl Resolution {
    /// Returns the choice that accepts this resolution.
    #[must_use]
    pub fn choice(&self) -> ResolutionChoice {
        match self {
            Self::SettleShortfall { .. } => ResolutionChoice::SettleShortfall,
            Self::RefundPayments { .. } => ResolutionChoice::RefundPayments,
        }
    }
}

/// The caller's pick of an offered remediation.
///
/// Each [`Resolution`] offers exactly one choice; the caller echoes it
/// back so a stale resolution can be detected before applying.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionChoice {
    /// Accept settling the shortfall.
    SettleShortfall,
    /// Accept refunding down to zero.
    RefundPayments,
}

/// User-supplied fields answering an [`InputRequest`].
///
/// Fields arrive optional, mirroring the form payload; validation of
/// presence happens in the engine so missing-field errors stay typed.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TransitionInput {
    /// Answer to [`InputRequest::Cancellation`].
    Cancellation {
        /// Why the order is being cancelled.
        reason: Option<String>,
    },
    /// Answer to [`InputRequest::Pending`].
    Pending {
        /// When work is expected to resume (must be today or later).
        expected_resume_date: Option<NaiveDate>,
        /// Optional notes about the pause.
        notes: Option<String>,
    },
}

/// A single atomic unit of order mutations.
///
/// One patch carries the status write together with every financial
/// side effect and metadata stamp of the transition; the persistence
/// layer applies it in one write so no torn state is ever observable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderPatch {
    /// The status the order moves to.
    pub status_value: String,
    /// New value for `amount_paid`, when the transition changes it.
    pub amount_paid: Option<Decimal>,
    /// Payment history entry to append, when the transition adds one.
    pub payment_entry: Option<PaymentEntry>,
    /// Completion stamp for done transitions.
    pub completed_at: Option<DateTime<Utc>>,
    /// Cancellation stamp for cancelled transitions.
    pub cancelled_at: Option<DateTime<Utc>>,
    /// Reason collected for a cancellation.
    pub cancellation_reason: Option<String>,
    /// Pause stamp for pending transitions.
    pub pending_at: Option<DateTime<Utc>>,
    /// Expected resume date collected for a pending transition.
    pub expected_resume_date: Option<NaiveDate>,
    /// Notes collected for a pending transition.
    pub pending_notes: Option<String>,
}

impl OrderPatch {
    /// A patch that only writes the status, with no side effects.
    #[must_use]
    pub fn status_only(status_value: impl Into<String>) -> Self {
        Self {
            status_value: status_value.into(),
            amount_paid: None,
            payment_entry: None,
            completed_at: None,
            cancelled_at: None,
            cancellation_reason: None,
            pending_at: None,
            expected_resume_date: None,
            pending_notes: None,
        }
    }

    /// Applies this patch to an order in place.
    ///
    /// The patch owns every transition-metadata field: a field it does
    /// not set is cleared, so stamps and notes left by an earlier end
    /// state never survive a later transition.
    pub fn apply_to(self, order: &mut Order) {
        order.status_value = self.status_value;
        if let Some(entry) = self.payment_entry {
            order.payment_state.payment_history.push(entry);
        }
        if let Some(amount) = self.amount_paid {
            order.payment_state.amount_paid = amount;
        }
        order.completed_at = self.completed_at;
        order.cancelled_at = self.cancelled_at;
        order.cancellation_reason = self.cancellation_reason;
        order.pending_at = self.pending_at;
        order.expected_resume_date = self.expected_resume_date;
        order.pending_notes = self.pending_notes;
    }
}
