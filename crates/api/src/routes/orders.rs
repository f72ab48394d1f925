//! Order routes, including the status transition flow.
//!
//! Transitions are a small conversation: the client requests a target
//! status and either gets the updated order back, or is told what is
//! still needed (a cancellation reason, a resume date, or a payment
//! resolution) and completes the transition with a follow-up call.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::error;
use uuid::Uuid;

use tapiz_core::order::financials::order_total;
use tapiz_core::order::types::{Order, OrderDetails, OrderLineGroup, PaymentState, PersonalInfo};
use tapiz_core::transition::{ResolutionChoice, TransitionInput};
use tapiz_db::repositories::{CreateOrderInput, OrderError, OrderRepository, TransitionResult};
use tapiz_shared::types::pagination::PageRequest;

use crate::AppState;
use crate::routes::{error_response, validation_error};

/// Creates the order routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/orders", get(list_orders))
        .route("/orders", post(create_order))
        .route("/orders/{id}", get(get_order))
        .route("/orders/{id}/transition", post(request_transition))
        .route("/orders/{id}/transition/input", post(apply_transition_input))
        .route(
            "/orders/{id}/transition/resolution",
            post(resolve_transition),
        )
}

/// Request body for creating an order.
#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    /// Customer snapshot.
    #[serde(default)]
    pub personal_info: PersonalInfo,
    /// Invoice-level details.
    #[serde(default)]
    pub order_details: OrderDetails,
    /// Furniture item groups.
    #[serde(default)]
    pub line_groups: Vec<OrderLineGroup>,
    /// Initial payment state.
    #[serde(default)]
    pub payment_state: PaymentState,
    /// Starting status; the catalog default when absent.
    pub status_value: Option<String>,
}

/// Request body for requesting a transition.
#[derive(Debug, Deserialize)]
pub struct TransitionRequest {
    /// Target status machine key.
    pub status_value: String,
}

/// Request body for completing an input-gated transition.
#[derive(Debug, Deserialize)]
pub struct TransitionInputRequest {
    /// Target status machine key.
    pub status_value: String,
    /// The user-supplied fields for the target end state.
    pub input: TransitionInput,
}

/// Request body for completing a resolution-gated transition.
#[derive(Debug, Deserialize)]
pub struct ResolveRequest {
    /// Target status machine key.
    pub status_value: String,
    /// The accepted remediation.
    pub choice: ResolutionChoice,
}

/// Response for an order, with its computed total.
#[derive(Debug, Serialize)]
pub struct OrderResponse {
    /// Unique identifier.
    pub id: Uuid,
    /// Customer snapshot.
    pub personal_info: PersonalInfo,
    /// Invoice-level details.
    pub order_details: OrderDetails,
    /// Furniture item groups.
    pub line_groups: Vec<OrderLineGroup>,
    /// Payment state.
    pub payment_state: PaymentState,
    /// Current status machine key.
    pub status_value: String,
    /// Monetary total of the order.
    pub total: Decimal,
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

impl From<Order> for OrderResponse {
    fn from(order: Order) -> Self {
        let total = order_total(&order);
        Self {
            id: order.id,
            personal_info: order.personal_info,
            order_details: order.order_details,
            line_groups: order.line_groups,
            payment_state: order.payment_state,
            status_value: order.status_value,
            total,
            cancellation_reason: order.cancellation_reason,
            cancelled_at: order.cancelled_at,
            completed_at: order.completed_at,
            pending_at: order.pending_at,
            expected_resume_date: order.expected_resume_date,
            pending_notes: order.pending_notes,
            created_at: order.created_at,
            updated_at: order.updated_at,
        }
    }
}

fn order_error_response(err: &OrderError) -> Response {
    match err {
        OrderError::NotFound(id) => error_response(
            404,
            "ORDER_NOT_FOUND",
            &format!("Order not found: {id}"),
        ),
        OrderError::Transition(e) => error_response(e.status_code(), e.error_code(), &e.to_string()),
        OrderError::Catalog(e) => error_response(e.status_code(), e.error_code(), &e.to_string()),
        OrderError::NoDefaultStatus => error_response(
            409,
            "NO_DEFAULT_STATUS",
            "No default status is configured",
        ),
        OrderError::Document(_) | OrderError::Database(_) => {
            error_response(500, "INTERNAL_ERROR", "An error occurred")
        }
    }
}

fn transition_result_body(result: TransitionResult) -> Json<serde_json::Value> {
    match result {
        TransitionResult::Applied(order) => Json(json!({
            "outcome": "applied",
            "order": OrderResponse::from(*order)
        })),
        TransitionResult::RequiresInput(request) => Json(json!({
            "outcome": "requires_input",
            "request": request
        })),
        TransitionResult::RequiresResolution(resolution) => Json(json!({
            "outcome": "requires_resolution",
            "resolution": resolution
        })),
    }
}

/// GET `/orders` - List orders, newest first.
async fn list_orders(
    State(state): State<AppState>,
    Query(page): Query<PageRequest>,
) -> impl IntoResponse {
    let repo = OrderRepository::new((*state.db).clone());

    match repo.list(&page).await {
        Ok(response) => {
            (StatusCode::OK, Json(response.map(OrderResponse::from))).into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to list orders");
            order_error_response(&e)
        }
    }
}

/// POST `/orders` - Create an order.
async fn create_order(
    State(state): State<AppState>,
    Json(request): Json<CreateOrderRequest>,
) -> impl IntoResponse {
    if request.personal_info.full_name.trim().is_empty() {
        return validation_error("personal_info.full_name must not be empty");
    }

    let repo = OrderRepository::new((*state.db).clone());

    let input = CreateOrderInput {
        personal_info: request.personal_info,
        order_details: request.order_details,
        line_groups: request.line_groups,
        payment_state: request.payment_state,
        status_value: request.status_value,
    };

    match repo.create(input).await {
        Ok(order) => (
            StatusCode::CREATED,
            Json(json!({ "order": OrderResponse::from(order) })),
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, "Failed to create order");
            order_error_response(&e)
        }
    }
}

/// GET `/orders/{id}` - Get a single order.
async fn get_order(State(state): State<AppState>, Path(id): Path<Uuid>) -> impl IntoResponse {
    let repo = OrderRepository::new((*state.db).clone());

    match repo.get(id).await {
        Ok(order) => (
            StatusCode::OK,
            Json(json!({ "order": OrderResponse::from(order) })),
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, order_id = %id, "Failed to get order");
            order_error_response(&e)
        }
    }
}

/// POST `/orders/{id}/transition` - Request a status transition.
///
/// Returns the updated order when the transition applied, or the
/// input/resolution still required when it is gated.
async fn request_transition(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<TransitionRequest>,
) -> impl IntoResponse {
    if request.status_value.trim().is_empty() {
        return validation_error("status_value must not be empty");
    }

    let repo = OrderRepository::new((*state.db).clone());

    match repo.request_transition(id, &request.status_value).await {
        Ok(result) => (StatusCode::OK, transition_result_body(result)).into_response(),
        Err(e) => {
            error!(error = %e, order_id = %id, "Failed to request transition");
            order_error_response(&e)
        }
    }
}

/// POST `/orders/{id}/transition/input` - Complete an input-gated
/// transition.
async fn apply_transition_input(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<TransitionInputRequest>,
) -> impl IntoResponse {
    let repo = OrderRepository::new((*state.db).clone());

    match repo
        .apply_input(id, &request.status_value, &request.input)
        .await
    {
        Ok(order) => (
            StatusCode::OK,
            Json(json!({ "order": OrderResponse::from(order) })),
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, order_id = %id, "Failed to apply transition input");
            order_error_response(&e)
        }
    }
}

/// POST `/orders/{id}/transition/resolution` - Complete a
/// resolution-gated transition.
async fn resolve_transition(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<ResolveRequest>,
) -> impl IntoResponse {
    let repo = OrderRepository::new((*state.db).clone());

    match repo
        .resolve(id, &request.status_value, request.choice)
        .await
    {
        Ok(order) => (
            StatusCode::OK,
            Json(json!({ "order": OrderResponse::from(order) })),
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, order_id = %id, "Failed to resolve transition");
            order_error_response(&e)
        }
    }
}
