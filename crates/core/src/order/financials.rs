//! Order total calculation.
//!
//! Pure functions over the order document. All missing numeric inputs
//! coerce to zero; results carry standard 2-decimal money semantics.
//! No tax is applied at this layer.

use rust_decimal::Decimal;

use crate::order::types::{Order, OrderLineGroup};
use tapiz_shared::types::money;

/// Computes the total for a single furniture line group.
///
/// Materials and labour always count. Foam counts when the group has it
/// enabled, or when a foam price was entered without the flag (legacy
/// documents predating the flag).
#[must_use]
pub fn line_group_total(group: &OrderLineGroup) -> Decimal {
    let materials =
        money::or_zero(group.material_unit_price) * money::or_zero(group.material_quantity);
    let labour = money::or_zero(group.labour_unit_price) * money::or_zero(group.labour_quantity);

    let foam_price = money::or_zero(group.foam_unit_price);
    let foam = if group.foam_enabled || foam_price > Decimal::ZERO {
        foam_price * money::or_zero(group.foam_quantity)
    } else {
        Decimal::ZERO
    };

    materials + labour + foam
}

/// Computes the monetary total of an order.
///
/// Sums every line group and adds the pickup/delivery cost once when
/// that service is enabled. Pure and independent of line-group order.
#[must_use]
pub fn order_total(order: &Order) -> Decimal {
    let lines: Decimal = order.line_groups.iter().map(line_group_total).sum();

    let pickup = if order.payment_state.pickup_delivery_enabled {
        money::or_zero(order.payment_state.pickup_delivery_cost)
    } else {
        Decimal::ZERO
    };

    money::round(lines + pickup)
}
