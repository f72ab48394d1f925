//! Order repository.
//!
//! Status transitions run through the core engine with the order row
//! locked and the catalog snapshot read inside the same transaction,
//! so the payment state a decision saw is the state its patch lands
//! on. A resolution accepted against state that has since moved fails
//! with a stale error instead of applying blindly.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use serde::Serialize;
use uuid::Uuid;

use tapiz_core::catalog::CatalogError;
use tapiz_core::order::types::{Order, OrderDetails, OrderLineGroup, PaymentState, PersonalInfo};
use tapiz_core::transition::{
    InputRequest, OrderPatch, Resolution, ResolutionChoice, TransitionEngine, TransitionError,
    TransitionInput, TransitionOutcome,
};
use tapiz_shared::types::pagination::{PageRequest, PageResponse};

use crate::entities::orders;
use crate::repositories::status_catalog::{fetch_catalog, StatusCatalogError};

/// Error types for order operations.
#[derive(Debug, thiserror::Error)]
pub enum OrderError {
    /// Order not found.
    #[error("Order not found: {0}")]
    NotFound(Uuid),

    /// A transition rule rejected the request.
    #[error(transparent)]
    Transition(#[from] TransitionError),

    /// The status catalog itself is unusable.
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// The catalog has no default status to assign to a new order.
    #[error("No default status is configured")]
    NoDefaultStatus,

    /// A stored order document failed to (de)serialize.
    #[error("Invalid order document: {0}")]
    Document(#[from] serde_json::Error),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl From<StatusCatalogError> for OrderError {
    fn from(err: StatusCatalogError) -> Self {
        match err {
            StatusCatalogError::Catalog(e) => Self::Catalog(e),
            StatusCatalogError::Database(e) => Self::Database(e),
        }
    }
}

/// Input for creating an order.
#[derive(Debug, Clone)]
pub struct CreateOrderInput {
    /// Customer snapshot.
    pub personal_info: PersonalInfo,
    /// Invoice-level details.
    pub order_details: OrderDetails,
    /// Furniture item groups.
    pub line_groups: Vec<OrderLineGroup>,
    /// Initial payment state (deposit, pickup/delivery).
    pub payment_state: PaymentState,
    /// Starting status; the catalog default when absent.
    pub status_value: Option<String>,
}

/// Result of requesting a transition.
///
/// Applied transitions return the updated order; gated transitions
/// return what is still needed and write nothing.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum TransitionResult {
    /// The transition applied; here is the updated order.
    Applied(Box<Order>),
    /// User input is required before the transition can apply.
    RequiresInput(InputRequest),
    /// A payment mismatch must be resolved first.
    RequiresResolution(Resolution),
}

/// Order repository for CRUD and transition operations.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    db: DatabaseConnection,
    engine: TransitionEngine,
}

impl OrderRepository {
    /// Creates a new order repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self {
            db,
            engine: TransitionEngine,
        }
    }

    /// Finds an order by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the order does not exist or the query fails.
    pub async fn get(&self, id: Uuid) -> Result<Order, OrderError> {
        let model = orders::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(OrderError::NotFound(id))?;
        to_order(model)
    }

    /// Lists orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn list(&self, page: &PageRequest) -> Result<PageResponse<Order>, OrderError> {
        let query = orders::Entity::find().order_by_desc(orders::Column::CreatedAt);

        let total = query.clone().count(&self.db).await?;
        let models = query
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await?;

        let data = models
            .into_iter()
            .map(to_order)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(PageResponse::new(data, page.page, page.per_page, total))
    }

    /// Creates a new order.
    ///
    /// The order starts in the requested status, or the catalog default
    /// when none is given.
    ///
    /// # Errors
    ///
    /// Returns an error if the status is unknown, no default status is
    /// configured, or the insert fails.
    pub async fn create(&self, input: CreateOrderInput) -> Result<Order, OrderError> {
        let txn = self.db.begin().await?;

        let catalog = fetch_catalog(&txn).await?;
        let status_value = match input.status_value {
            Some(value) => catalog
                .find_by_value(&value)
                .map(|d| d.value.clone())
                .ok_or(TransitionError::UnknownStatus(value))?,
            None => catalog
                .default_status()
                .map(|d| d.value.clone())
                .ok_or(OrderError::NoDefaultStatus)?,
        };

        let now = Utc::now();
        let model = orders::ActiveModel {
            id: Set(Uuid::new_v4()),
            personal_info: Set(serde_json::to_value(&input.personal_info)?),
            order_details: Set(serde_json::to_value(&input.order_details)?),
            line_groups: Set(serde_json::to_value(&input.line_groups)?),
            payment_state: Set(serde_json::to_value(&input.payment_state)?),
            status_value: Set(status_value),
            cancellation_reason: Set(None),
            cancelled_at: Set(None),
            completed_at: Set(None),
            pending_at: Set(None),
            expected_resume_date: Set(None),
            pending_notes: Set(None),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };
        let inserted = model.insert(&txn).await?;

        txn.commit().await?;
        to_order(inserted)
    }

    /// Counts orders currently holding the given status.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn count_with_status(&self, status_value: &str) -> Result<u64, OrderError> {
        let count = orders::Entity::find()
            .filter(orders::Column::StatusValue.eq(status_value))
            .count(&self.db)
            .await?;
        Ok(count)
    }

    /// Requests a transition to `new_status_value`.
    ///
    /// When the engine allows the transition outright the patch is
    /// applied before returning; otherwise the required input or
    /// resolution is returned and nothing is written.
    ///
    /// # Errors
    ///
    /// Returns an error if the order or status does not exist or the
    /// write fails.
    pub async fn request_transition(
        &self,
        id: Uuid,
        new_status_value: &str,
    ) -> Result<TransitionResult, OrderError> {
        let txn = self.db.begin().await?;

        let (model, order) = fetch_locked(&txn, id).await?;
        let catalog = fetch_catalog(&txn).await?;

        let outcome = self
            .engine
            .request_transition(&order, new_status_value, &catalog)?;

        let result = match outcome {
            TransitionOutcome::Apply(patch) => {
                let updated = apply_patch(&txn, model, order, patch).await?;
                TransitionResult::Applied(Box::new(to_order(updated)?))
            }
            TransitionOutcome::RequiresInput(request) => TransitionResult::RequiresInput(request),
            TransitionOutcome::RequiresResolution(resolution) => {
                TransitionResult::RequiresResolution(resolution)
            }
        };

        txn.commit().await?;
        Ok(result)
    }

    /// Completes an input-gated transition with the supplied fields.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is missing or invalid for the
    /// target status, or the write fails.
    pub async fn apply_input(
        &self,
        id: Uuid,
        new_status_value: &str,
        input: &TransitionInput,
    ) -> Result<Order, OrderError> {
        let txn = self.db.begin().await?;

        let (model, order) = fetch_locked(&txn, id).await?;
        let catalog = fetch_catalog(&txn).await?;

        let patch = self
            .engine
            .apply_input(&order, new_status_value, input, &catalog)?;
        let updated = apply_patch(&txn, model, order, patch).await?;

        txn.commit().await?;
        to_order(updated)
    }

    /// Completes a resolution-gated transition with the accepted choice.
    ///
    /// The engine re-decides against the locked row; if the payment
    /// state moved on since the resolution was offered this fails with
    /// [`TransitionError::StaleResolution`] and writes nothing.
    ///
    /// # Errors
    ///
    /// Returns an error if the resolution is stale, the order or status
    /// does not exist, or the write fails.
    pub async fn resolve(
        &self,
        id: Uuid,
        new_status_value: &str,
        choice: ResolutionChoice,
    ) -> Result<Order, OrderError> {
        let txn = self.db.begin().await?;

        let (model, order) = fetch_locked(&txn, id).await?;
        let catalog = fetch_catalog(&txn).await?;

        let patch = self
            .engine
            .resolve(&order, new_status_value, choice, &catalog)?;
        let updated = apply_patch(&txn, model, order, patch).await?;

        txn.commit().await?;
        to_order(updated)
    }
}

/// Fetches an order row with a row lock, plus its domain form.
async fn fetch_locked(
    txn: &DatabaseTransaction,
    id: Uuid,
) -> Result<(orders::Model, Order), OrderError> {
    let model = orders::Entity::find_by_id(id)
        .lock_exclusive()
        .one(txn)
        .await?
        .ok_or(OrderError::NotFound(id))?;
    let order = to_order(model.clone())?;
    Ok((model, order))
}

/// Applies a transition patch to an order row.
///
/// Every transition-metadata column is written from the patched order,
/// so a transition out of an end state clears the stamps and notes the
/// previous state left behind.
async fn apply_patch(
    txn: &DatabaseTransaction,
    model: orders::Model,
    mut order: Order,
    patch: OrderPatch,
) -> Result<orders::Model, OrderError> {
    patch.apply_to(&mut order);

    let mut active: orders::ActiveModel = model.into();
    active.status_value = Set(order.status_value);
    active.payment_state = Set(serde_json::to_value(&order.payment_state)?);
    active.completed_at = Set(order.completed_at.map(Into::into));
    active.cancelled_at = Set(order.cancelled_at.map(Into::into));
    active.cancellation_reason = Set(order.cancellation_reason);
    active.pending_at = Set(order.pending_at.map(Into::into));
    active.expected_resume_date = Set(order.expected_resume_date);
    active.pending_notes = Set(order.pending_notes);
    active.updated_at = Set(Utc::now().into());

    Ok(active.update(txn).await?)
}

/// Converts a stored row into the domain order.
fn to_order(model: orders::Model) -> Result<Order, OrderError> {
    Ok(Order {
        id: model.id,
        personal_info: serde_json::from_value(model.personal_info)?,
        order_details: serde_json::from_value(model.order_details)?,
        line_groups: serde_json::from_value(model.line_groups)?,
        payment_state: serde_json::from_value(model.payment_state)?,
        status_value: model.status_value,
        cancellation_reason: model.cancellation_reason,
        cancelled_at: model.cancelled_at.map(Into::into),
        completed_at: model.completed_at.map(Into::into),
        pending_at: model.pending_at.map(Into::into),
        expected_resume_date: model.expected_resume_date,
        pending_notes: model.pending_notes,
        created_at: model.created_at.into(),
        updated_at: model.updated_at.into(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn model() -> orders::Model {
        let now = Utc::now();
        orders::Model {
            id: Uuid::new_v4(),
            personal_info: json!({"full_name": "Iris Verhoeven"}),
            order_details: json!({"invoice_number": "INV-042"}),
            line_groups: json!([{
                "furniture_type": "armchair",
                "material_unit_price": "100",
                "material_quantity": "2",
            }]),
            payment_state: json!({"amount_paid": "50"}),
            status_value: "in-progress".to_string(),
            cancellation_reason: None,
            cancelled_at: None,
            completed_at: None,
            pending_at: None,
            expected_resume_date: None,
            pending_notes: None,
            created_at: now.into(),
            updated_at: now.into(),
        }
    }

    #[test]
    fn test_row_maps_to_domain_order() {
        let order = to_order(model()).unwrap();

        assert_eq!(order.personal_info.full_name, "Iris Verhoeven");
        assert_eq!(order.order_details.invoice_number.as_deref(), Some("INV-042"));
        assert_eq!(order.line_groups.len(), 1);
        assert_eq!(order.line_groups[0].material_unit_price, Some(dec!(100)));
        assert_eq!(order.payment_state.amount_paid, dec!(50));
        assert!(order.payment_state.payment_history.is_empty());
    }

    #[test]
    fn test_partial_documents_fill_defaults() {
        let mut m = model();
        m.personal_info = json!({});
        m.payment_state = json!({});

        let order = to_order(m).unwrap();
        assert_eq!(order.payment_state.amount_paid, Decimal::ZERO);
        assert!(!order.payment_state.pickup_delivery_enabled);
    }

    #[test]
    fn test_corrupt_document_is_rejected() {
        let mut m = model();
        m.line_groups = json!({"not": "an array"});

        assert!(matches!(to_order(m), Err(OrderError::Document(_))));
    }
}
