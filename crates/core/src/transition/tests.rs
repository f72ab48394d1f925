//! Tests for the transition engine.

use chrono::{Duration, Utc};
use rstest::rstest;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use uuid::Uuid;

use crate::catalog::{EndState, StatusCatalog, StatusDefinition};
use crate::order::types::{
    Order, OrderDetails, OrderLineGroup, PaymentKind, PaymentState, PersonalInfo,
};

use super::engine::TransitionEngine;
use super::error::TransitionError;
use super::types::{
    InputRequest, Resolution, ResolutionChoice, TransitionInput, TransitionOutcome,
};

fn def(value: &str, end_state: Option<EndState>, sort_order: i32) -> StatusDefinition {
    StatusDefinition {
        id: Uuid::new_v4(),
        label: value.to_string(),
        value: value.to_string(),
        color: "#888888".to_string(),
        description: None,
        end_state,
        is_default: value == "new",
        sort_order,
    }
}

fn catalog() -> StatusCatalog {
    StatusCatalog::new(vec![
        def("new", None, 1),
        def("in-progress", None, 2),
        def("done", Some(EndState::Done), 3),
        def("cancelled", Some(EndState::Cancelled), 4),
        def("on-hold", Some(EndState::Pending), 5),
    ])
}

/// An order totalling 250 with the given amount already paid.
fn order_paying(amount_paid: Decimal) -> Order {
    Order {
        id: Uuid::new_v4(),
        personal_info: PersonalInfo::default(),
        order_details: OrderDetails::default(),
        line_groups: vec![OrderLineGroup {
            furniture_type: "sofa".to_string(),
            material_unit_price: Some(dec!(100)),
            material_quantity: Some(dec!(2)),
            labour_unit_price: Some(dec!(50)),
            labour_quantity: Some(dec!(1)),
            ..OrderLineGroup::default()
        }],
        payment_state: PaymentState {
            amount_paid,
            ..PaymentState::default()
        },
        status_value: "in-progress".to_string(),
        cancellation_reason: None,
        cancelled_at: None,
        completed_at: None,
        pending_at: None,
        expected_resume_date: None,
        pending_notes: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

#[rstest]
#[case("new")]
#[case("in-progress")]
fn test_ordinary_statuses_apply_without_side_effects(#[case] target: &str) {
    let engine = TransitionEngine::new();
    let order = order_paying(dec!(50));

    let outcome = engine.request_transition(&order, target, &catalog()).unwrap();
    let TransitionOutcome::Apply(patch) = outcome else {
        panic!("expected Apply, got {outcome:?}");
    };
    assert_eq!(patch.status_value, target);
    assert_eq!(patch.amount_paid, None);
    assert!(patch.payment_entry.is_none());
    assert!(patch.completed_at.is_none());
    assert!(patch.cancelled_at.is_none());
    assert!(patch.pending_at.is_none());
}

#[test]
fn test_unknown_status_is_rejected() {
    let engine = TransitionEngine::new();
    let order = order_paying(Decimal::ZERO);

    let err = engine
        .request_transition(&order, "shipped", &catalog())
        .unwrap_err();
    assert_eq!(err, TransitionError::UnknownStatus("shipped".to_string()));
}

#[test]
fn test_done_underpaid_offers_shortfall() {
    let engine = TransitionEngine::new();
    let order = order_paying(dec!(100));

    let outcome = engine.request_transition(&order, "done", &catalog()).unwrap();
    assert_eq!(
        outcome,
        TransitionOutcome::RequiresResolution(Resolution::SettleShortfall {
            status_value: "done".to_string(),
            pending_amount: dec!(150),
        })
    );
}

#[rstest]
#[case(dec!(250))] // exactly paid
#[case(dec!(300))] // overpaid normalizes down
fn test_done_fully_paid_applies_with_normalized_amount(#[case] paid: Decimal) {
    let engine = TransitionEngine::new();
    let order = order_paying(paid);

    let outcome = engine.request_transition(&order, "done", &catalog()).unwrap();
    let TransitionOutcome::Apply(patch) = outcome else {
        panic!("expected Apply, got {outcome:?}");
    };
    assert_eq!(patch.status_value, "done");
    assert_eq!(patch.amount_paid, Some(dec!(250)));
    assert!(patch.completed_at.is_some());
    // Normalization never fabricates a payment record.
    assert!(patch.payment_entry.is_none());
}

#[test]
fn test_cancelled_with_payments_offers_refund() {
    let engine = TransitionEngine::new();
    let order = order_paying(dec!(80));

    let outcome = engine
        .request_transition(&order, "cancelled", &catalog())
        .unwrap();
    assert_eq!(
        outcome,
        TransitionOutcome::RequiresResolution(Resolution::RefundPayments {
            status_value: "cancelled".to_string(),
            current_amount: dec!(80),
        })
    );
}

#[test]
fn test_cancelled_unpaid_asks_for_reason() {
    let engine = TransitionEngine::new();
    let order = order_paying(Decimal::ZERO);

    let outcome = engine
        .request_transition(&order, "cancelled", &catalog())
        .unwrap();
    assert_eq!(
        outcome,
        TransitionOutcome::RequiresInput(InputRequest::Cancellation {
            status_value: "cancelled".to_string(),
        })
    );
}

#[rstest]
#[case(Decimal::ZERO)]
#[case(dec!(250))]
fn test_pending_always_asks_for_resume_date(#[case] paid: Decimal) {
    let engine = TransitionEngine::new();
    let order = order_paying(paid);

    let outcome = engine
        .request_transition(&order, "on-hold", &catalog())
        .unwrap();
    assert_eq!(
        outcome,
        TransitionOutcome::RequiresInput(InputRequest::Pending {
            status_value: "on-hold".to_string(),
        })
    );
}

#[test]
fn test_reentering_current_end_state_rechecks_gates() {
    let engine = TransitionEngine::new();
    let mut order = order_paying(dec!(100));
    order.status_value = "done".to_string();

    // Already in done but now under-paid: the gate still fires.
    let outcome = engine.request_transition(&order, "done", &catalog()).unwrap();
    assert!(matches!(
        outcome,
        TransitionOutcome::RequiresResolution(Resolution::SettleShortfall { .. })
    ));
}

#[rstest]
#[case(None)]
#[case(Some(String::new()))]
#[case(Some("   ".to_string()))]
fn test_cancellation_input_requires_reason(#[case] reason: Option<String>) {
    let engine = TransitionEngine::new();
    let order = order_paying(Decimal::ZERO);

    let err = engine
        .apply_input(
            &order,
            "cancelled",
            &TransitionInput::Cancellation { reason },
            &catalog(),
        )
        .unwrap_err();
    assert_eq!(err, TransitionError::MissingCancellationReason);
}

#[test]
fn test_cancellation_input_builds_patch() {
    let engine = TransitionEngine::new();
    let order = order_paying(Decimal::ZERO);

    let patch = engine
        .apply_input(
            &order,
            "cancelled",
            &TransitionInput::Cancellation {
                reason: Some("  customer moved abroad  ".to_string()),
            },
            &catalog(),
        )
        .unwrap();
    assert_eq!(patch.status_value, "cancelled");
    assert_eq!(patch.amount_paid, Some(Decimal::ZERO));
    assert_eq!(
        patch.cancellation_reason.as_deref(),
        Some("customer moved abroad")
    );
    assert!(patch.cancelled_at.is_some());
    assert!(patch.payment_entry.is_none());
}

#[test]
fn test_cancellation_input_rejected_when_payments_exist() {
    let engine = TransitionEngine::new();
    let order = order_paying(dec!(80));

    let err = engine
        .apply_input(
            &order,
            "cancelled",
            &TransitionInput::Cancellation {
                reason: Some("changed mind".to_string()),
            },
            &catalog(),
        )
        .unwrap_err();
    assert_eq!(err, TransitionError::StaleResolution);
}

#[test]
fn test_pending_input_requires_date() {
    let engine = TransitionEngine::new();
    let order = order_paying(dec!(50));

    let err = engine
        .apply_input(
            &order,
            "on-hold",
            &TransitionInput::Pending {
                expected_resume_date: None,
                notes: None,
            },
            &catalog(),
        )
        .unwrap_err();
    assert_eq!(err, TransitionError::MissingResumeDate);
}

#[test]
fn test_pending_input_rejects_past_date() {
    let engine = TransitionEngine::new();
    let order = order_paying(dec!(50));
    let yesterday = Utc::now().date_naive() - Duration::days(1);

    let err = engine
        .apply_input(
            &order,
            "on-hold",
            &TransitionInput::Pending {
                expected_resume_date: Some(yesterday),
                notes: None,
            },
            &catalog(),
        )
        .unwrap_err();
    assert_eq!(err, TransitionError::InvalidResumeDate { date: yesterday });
}

#[rstest]
#[case(0)] // today is allowed
#[case(14)]
fn test_pending_input_builds_patch(#[case] days_ahead: i64) {
    let engine = TransitionEngine::new();
    let order = order_paying(dec!(50));
    let resume = Utc::now().date_naive() + Duration::days(days_ahead);

    let patch = engine
        .apply_input(
            &order,
            "on-hold",
            &TransitionInput::Pending {
                expected_resume_date: Some(resume),
                notes: Some("waiting on fabric".to_string()),
            },
            &catalog(),
        )
        .unwrap();
    assert_eq!(patch.status_value, "on-hold");
    assert_eq!(patch.amount_paid, Some(Decimal::ZERO));
    assert_eq!(patch.expected_resume_date, Some(resume));
    assert_eq!(patch.pending_notes.as_deref(), Some("waiting on fabric"));
    assert!(patch.pending_at.is_some());
}

#[test]
fn test_input_kind_must_match_target_status() {
    let engine = TransitionEngine::new();
    let order = order_paying(Decimal::ZERO);

    let err = engine
        .apply_input(
            &order,
            "cancelled",
            &TransitionInput::Pending {
                expected_resume_date: Some(Utc::now().date_naive()),
                notes: None,
            },
            &catalog(),
        )
        .unwrap_err();
    assert_eq!(err, TransitionError::InputMismatch);

    // Ordinary statuses never take input.
    let err = engine
        .apply_input(
            &order,
            "in-progress",
            &TransitionInput::Cancellation {
                reason: Some("whatever".to_string()),
            },
            &catalog(),
        )
        .unwrap_err();
    assert_eq!(err, TransitionError::InputMismatch);
}

#[test]
fn test_settle_shortfall_records_settlement() {
    let engine = TransitionEngine::new();
    let order = order_paying(dec!(100));

    let patch = engine
        .resolve(&order, "done", ResolutionChoice::SettleShortfall, &catalog())
        .unwrap();
    assert_eq!(patch.status_value, "done");
    assert_eq!(patch.amount_paid, Some(dec!(250)));
    assert!(patch.completed_at.is_some());

    let entry = patch.payment_entry.expect("settlement entry");
    assert_eq!(entry.amount, dec!(150));
    assert_eq!(entry.kind, PaymentKind::Settlement);
}

#[test]
fn test_refund_records_negative_entry() {
    let engine = TransitionEngine::new();
    let order = order_paying(dec!(80));

    let patch = engine
        .resolve(
            &order,
            "cancelled",
            ResolutionChoice::RefundPayments,
            &catalog(),
        )
        .unwrap();
    assert_eq!(patch.status_value, "cancelled");
    assert_eq!(patch.amount_paid, Some(Decimal::ZERO));
    assert!(patch.cancelled_at.is_some());

    let entry = patch.payment_entry.expect("refund entry");
    assert_eq!(entry.amount, dec!(-80));
    assert_eq!(entry.kind, PaymentKind::Refund);
}

#[test]
fn test_resolve_is_stale_when_payment_state_moved_on() {
    let engine = TransitionEngine::new();

    // Order became fully paid after the shortfall was offered.
    let order = order_paying(dec!(250));
    let err = engine
        .resolve(&order, "done", ResolutionChoice::SettleShortfall, &catalog())
        .unwrap_err();
    assert_eq!(err, TransitionError::StaleResolution);

    // Refund accepted but the order no longer has payments.
    let order = order_paying(Decimal::ZERO);
    let err = engine
        .resolve(
            &order,
            "cancelled",
            ResolutionChoice::RefundPayments,
            &catalog(),
        )
        .unwrap_err();
    assert_eq!(err, TransitionError::StaleResolution);
}

#[test]
fn test_reparking_without_notes_clears_previous_notes() {
    let engine = TransitionEngine::new();
    let mut order = order_paying(Decimal::ZERO);
    order.status_value = "on-hold".to_string();
    order.pending_at = Some(Utc::now() - Duration::days(30));
    order.expected_resume_date = Some(Utc::now().date_naive() - Duration::days(2));
    order.pending_notes = Some("waiting on fabric".to_string());

    let resume = Utc::now().date_naive() + Duration::days(7);
    let patch = engine
        .apply_input(
            &order,
            "on-hold",
            &TransitionInput::Pending {
                expected_resume_date: Some(resume),
                notes: None,
            },
            &catalog(),
        )
        .unwrap();
    patch.apply_to(&mut order);

    assert_eq!(order.expected_resume_date, Some(resume));
    assert_eq!(order.pending_notes, None);
    assert!(order.pending_at.is_some());
}

#[test]
fn test_leaving_an_end_state_clears_its_stamps() {
    let engine = TransitionEngine::new();
    let mut order = order_paying(dec!(250));
    order.status_value = "done".to_string();
    order.completed_at = Some(Utc::now());

    let outcome = engine
        .request_transition(&order, "in-progress", &catalog())
        .unwrap();
    let TransitionOutcome::Apply(patch) = outcome else {
        panic!("expected Apply, got {outcome:?}");
    };
    patch.apply_to(&mut order);

    assert_eq!(order.status_value, "in-progress");
    assert_eq!(order.completed_at, None);
    // Reopening never touches what was paid.
    assert_eq!(order.payment_state.amount_paid, dec!(250));
}

#[test]
fn test_settlement_patch_updates_payment_state() {
    let engine = TransitionEngine::new();
    let mut order = order_paying(dec!(100));

    let patch = engine
        .resolve(&order, "done", ResolutionChoice::SettleShortfall, &catalog())
        .unwrap();
    patch.apply_to(&mut order);

    assert_eq!(order.payment_state.amount_paid, dec!(250));
    assert_eq!(order.payment_state.payment_history.len(), 1);
    assert_eq!(order.payment_state.payment_history[0].amount, dec!(150));
}

#[test]
fn test_resolve_rejects_wrong_choice() {
    let engine = TransitionEngine::new();
    let order = order_paying(dec!(100));

    let err = engine
        .resolve(&order, "done", ResolutionChoice::RefundPayments, &catalog())
        .unwrap_err();
    assert_eq!(err, TransitionError::StaleResolution);
}
