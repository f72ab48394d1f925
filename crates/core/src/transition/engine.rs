//! Status transition rules.

use chrono::Utc;
use rust_decimal::Decimal;

use crate::catalog::{EndState, StatusCatalog};
use crate::order::financials::order_total;
use crate::order::types::{Order, PaymentEntry, PaymentKind, PaymentMethod};
use crate::transition::error::TransitionError;
use crate::transition::types::{
    InputRequest, OrderPatch, Resolution, ResolutionChoice, TransitionInput, TransitionOutcome,
};

/// Stateless transition engine.
///
/// Every decision is a pure function of the order, the target status,
/// and the injected catalog snapshot. The caller is responsible for
/// evaluating and applying the outcome inside one transaction so the
/// payment state the decision saw is the one the patch lands on.
#[derive(Debug, Clone, Copy, Default)]
pub struct TransitionEngine;

impl TransitionEngine {
    /// Creates a new transition engine.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Decides what a transition to `new_status_value` requires.
    ///
    /// Ordinary statuses (and re-entering the current status) apply
    /// immediately. End states are gated:
    ///
    /// - `done` on an under-paid order offers settling the shortfall;
    ///   a fully paid order applies with `amount_paid` normalized to
    ///   the order total.
    /// - `cancelled` on a paid order offers refunding to zero; an
    ///   unpaid order still needs a cancellation reason.
    /// - `pending` always needs an expected resume date.
    pub fn request_transition(
        &self,
        order: &Order,
        new_status_value: &str,
        catalog: &StatusCatalog,
    ) -> Result<TransitionOutcome, TransitionError> {
        let definition = catalog
            .find_by_value(new_status_value)
            .ok_or_else(|| TransitionError::UnknownStatus(new_status_value.to_string()))?;

        let Some(end_state) = definition.end_state else {
            return Ok(TransitionOutcome::Apply(OrderPatch::status_only(
                new_status_value,
            )));
        };

        let paid = order.payment_state.amount_paid;
        match end_state {
            EndState::Done => {
                let total = order_total(order);
                if paid < total {
                    return Ok(TransitionOutcome::RequiresResolution(
                        Resolution::SettleShortfall {
                            status_value: new_status_value.to_string(),
                            pending_amount: total - paid,
                        },
                    ));
                }
                let mut patch = OrderPatch::status_only(new_status_value);
                patch.amount_paid = Some(total);
                patch.completed_at = Some(Utc::now());
                Ok(TransitionOutcome::Apply(patch))
            }
            EndState::Cancelled => {
                if paid > Decimal::ZERO {
                    return Ok(TransitionOutcome::RequiresResolution(
                        Resolution::RefundPayments {
                            status_value: new_status_value.to_string(),
                            current_amount: paid,
                        },
                    ));
                }
                Ok(TransitionOutcome::RequiresInput(InputRequest::Cancellation {
                    status_value: new_status_value.to_string(),
                }))
            }
            EndState::Pending => Ok(TransitionOutcome::RequiresInput(InputRequest::Pending {
                status_value: new_status_value.to_string(),
            })),
        }
    }

    /// Validates user input answering a [`RequiresInput`] outcome and
    /// builds the patch.
    ///
    /// The input kind must match what the target status calls for. A
    /// cancellation needs a non-empty reason; a pending transition
    /// needs a resume date that is today or later (UTC).
    ///
    /// [`RequiresInput`]: TransitionOutcome::RequiresInput
    pub fn apply_input(
        &self,
        order: &Order,
        new_status_value: &str,
        input: &TransitionInput,
        catalog: &StatusCatalog,
    ) -> Result<OrderPatch, TransitionError> {
        let definition = catalog
            .find_by_value(new_status_value)
            .ok_or_else(|| TransitionError::UnknownStatus(new_status_value.to_string()))?;

        // The input path never moves money, so it only serves end
        // states whose gate is informational.
        match (definition.end_state, input) {
            (Some(EndState::Cancelled), TransitionInput::Cancellation { reason }) => {
                let reason = reason
                    .as_deref()
                    .map(str::trim)
                    .filter(|r| !r.is_empty())
                    .ok_or(TransitionError::MissingCancellationReason)?;
                if order.payment_state.amount_paid > Decimal::ZERO {
                    // Paid orders must go through the refund resolution.
                    return Err(TransitionError::StaleResolution);
                }

                let mut patch = OrderPatch::status_only(new_status_value);
                patch.amount_paid = Some(Decimal::ZERO);
                patch.cancellation_reason = Some(reason.to_string());
                patch.cancelled_at = Some(Utc::now());
                Ok(patch)
            }
            (
                Some(EndState::Pending),
                TransitionInput::Pending {
                    expected_resume_date,
                    notes,
                },
            ) => {
                let date = expected_resume_date.ok_or(TransitionError::MissingResumeDate)?;
                if date < Utc::now().date_naive() {
                    return Err(TransitionError::InvalidResumeDate { date });
                }

                let mut patch = OrderPatch::status_only(new_status_value);
                patch.amount_paid = Some(Decimal::ZERO);
                patch.pending_at = Some(Utc::now());
                patch.expected_resume_date = Some(date);
                patch.pending_notes = notes
                    .as_deref()
                    .map(str::trim)
                    .filter(|n| !n.is_empty())
                    .map(ToString::to_string);
                Ok(patch)
            }
            _ => Err(TransitionError::InputMismatch),
        }
    }

    /// Applies an accepted resolution choice and builds the patch.
    ///
    /// The transition is re-decided against the order's current state;
    /// if it no longer offers the accepted choice (the payment state
    /// changed underneath the caller) this fails with
    /// [`TransitionError::StaleResolution`].
    pub fn resolve(
        &self,
        order: &Order,
        new_status_value: &str,
        choice: ResolutionChoice,
        catalog: &StatusCatalog,
    ) -> Result<OrderPatch, TransitionError> {
        let outcome = self.request_transition(order, new_status_value, catalog)?;
        let TransitionOutcome::RequiresResolution(resolution) = outcome else {
            return Err(TransitionError::StaleResolution);
        };
        if resolution.choice() != choice {
            return Err(TransitionError::StaleResolution);
        }

        let now = Utc::now();
        match resolution {
            Resolution::SettleShortfall {
                status_value,
                pending_amount,
            } => {
                let mut patch = OrderPatch::status_only(status_value);
                patch.payment_entry = Some(PaymentEntry {
                    amount: pending_amount,
                    date: now,
                    kind: PaymentKind::Settlement,
                    method: PaymentMethod::Adjustment,
                    description: Some("Outstanding balance settled on completion".to_string()),
                });
                patch.amount_paid = Some(order_total(order));
                patch.completed_at = Some(now);
                Ok(patch)
            }
            Resolution::RefundPayments {
                status_value,
                current_amount,
            } => {
                let mut patch = OrderPatch::status_only(status_value);
                patch.payment_entry = Some(PaymentEntry {
                    amount: -current_amount,
                    date: now,
                    kind: PaymentKind::Refund,
                    method: PaymentMethod::Adjustment,
                    description: Some("Payments refunded on cancellation".to_string()),
                });
                patch.amount_paid = Some(Decimal::ZERO);
                patch.cancelled_at = Some(now);
                Ok(patch)
            }
        }
    }
}
