//! Property-based tests for the order total.

use chrono::Utc;
use proptest::prelude::*;
use rust_decimal::Decimal;
use uuid::Uuid;

use super::financials::order_total;
use super::types::{Order, OrderDetails, OrderLineGroup, PaymentState, PersonalInfo};

/// Strategy for an optional 2-decimal amount in [0, 10_000.00).
fn amount_strategy() -> impl Strategy<Value = Option<Decimal>> {
    proptest::option::of((0i64..1_000_000).prop_map(|n| Decimal::new(n, 2)))
}

/// Strategy for an optional quantity in [0, 100.0).
fn quantity_strategy() -> impl Strategy<Value = Option<Decimal>> {
    proptest::option::of((0i64..1_000).prop_map(|n| Decimal::new(n, 1)))
}

fn line_group_strategy() -> impl Strategy<Value = OrderLineGroup> {
    (
        amount_strategy(),
        quantity_strategy(),
        amount_strategy(),
        quantity_strategy(),
        any::<bool>(),
        amount_strategy(),
        quantity_strategy(),
    )
        .prop_map(
            |(
                material_unit_price,
                material_quantity,
                labour_unit_price,
                labour_quantity,
                foam_enabled,
                foam_unit_price,
                foam_quantity,
            )| OrderLineGroup {
                furniture_type: "chair".to_string(),
                material_unit_price,
                material_quantity,
                labour_unit_price,
                labour_quantity,
                foam_enabled,
                foam_unit_price,
                foam_quantity,
                ..OrderLineGroup::default()
            },
        )
}

fn order_with(line_groups: Vec<OrderLineGroup>) -> Order {
    Order {
        id: Uuid::nil(),
        personal_info: PersonalInfo::default(),
        order_details: OrderDetails::default(),
        line_groups,
        payment_state: PaymentState::default(),
        status_value: "new".to_string(),
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

proptest! {
    /// Permuting the line groups never changes the order total.
    #[test]
    fn test_total_is_permutation_invariant(
        groups in proptest::collection::vec(line_group_strategy(), 0..8),
        rotation in 0usize..8,
    ) {
        let base = order_total(&order_with(groups.clone()));

        let mut reversed = groups.clone();
        reversed.reverse();
        prop_assert_eq!(order_total(&order_with(reversed)), base);

        let mut rotated = groups.clone();
        if !rotated.is_empty() {
            let mid = rotation % rotated.len();
            rotated.rotate_left(mid);
        }
        prop_assert_eq!(order_total(&order_with(rotated)), base);
    }

    /// The total is pure: recomputing on the same order gives the same value.
    #[test]
    fn test_total_is_deterministic(
        groups in proptest::collection::vec(line_group_strategy(), 0..8),
    ) {
        let order = order_with(groups);
        prop_assert_eq!(order_total(&order), order_total(&order));
    }

    /// Totals are never negative for non-negative inputs.
    #[test]
    fn test_total_is_non_negative(
        groups in proptest::collection::vec(line_group_strategy(), 0..8),
    ) {
        let order = order_with(groups);
        prop_assert!(order_total(&order) >= Decimal::ZERO);
    }
}
