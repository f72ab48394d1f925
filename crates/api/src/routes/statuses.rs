//! Status catalog admin routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::error;
use uuid::Uuid;

use tapiz_core::catalog::{StatusCatalog, StatusDefinition};
use tapiz_db::repositories::{StatusCatalogError, StatusCatalogRepository, StatusDefinitionInput};

use crate::AppState;
use crate::routes::{error_response, validation_error};

/// Creates the status catalog routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/statuses", get(list_statuses))
        .route("/statuses", post(create_status))
        .route("/statuses/reorder", put(reorder_statuses))
        .route("/statuses/{id}", put(update_status))
        .route("/statuses/{id}", delete(delete_status))
        .route("/statuses/{id}/default", put(set_default_status))
}

/// Request body for creating or updating a status definition.
#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    /// Display name.
    pub label: String,
    /// Stable machine key.
    pub value: String,
    /// Display color.
    #[serde(default = "default_color")]
    pub color: String,
    /// Optional description.
    pub description: Option<String>,
    /// Whether the status is terminal.
    #[serde(default)]
    pub is_end_state: bool,
    /// Terminal subtype (done, cancelled, or pending).
    pub end_state_type: Option<String>,
    /// Whether new orders start in this status.
    #[serde(default)]
    pub is_default: bool,
    /// Explicit position; appended when absent.
    pub sort_order: Option<i32>,
}

fn default_color() -> String {
    "#888888".to_string()
}

/// Request body for reordering the catalog.
#[derive(Debug, Deserialize)]
pub struct ReorderRequest {
    /// Every definition id, in the desired display order.
    pub ids: Vec<Uuid>,
}

/// Response for a status definition.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    /// Unique identifier.
    pub id: Uuid,
    /// Display name.
    pub label: String,
    /// Stable machine key.
    pub value: String,
    /// Display color.
    pub color: String,
    /// Optional description.
    pub description: Option<String>,
    /// Whether the status is terminal.
    pub is_end_state: bool,
    /// Terminal subtype, when terminal.
    pub end_state_type: Option<&'static str>,
    /// Whether new orders start in this status.
    pub is_default: bool,
    /// Display position.
    pub sort_order: i32,
}

impl From<StatusDefinition> for StatusResponse {
    fn from(def: StatusDefinition) -> Self {
        Self {
            id: def.id,
            label: def.label,
            value: def.value,
            color: def.color,
            description: def.description,
            is_end_state: def.end_state.is_some(),
            end_state_type: def.end_state.map(|e| e.as_str()),
            is_default: def.is_default,
            sort_order: def.sort_order,
        }
    }
}

fn catalog_body(catalog: StatusCatalog) -> Json<serde_json::Value> {
    let statuses: Vec<StatusResponse> = catalog
        .definitions()
        .iter()
        .cloned()
        .map(StatusResponse::from)
        .collect();
    Json(json!({ "statuses": statuses }))
}

fn catalog_error_response(err: &StatusCatalogError) -> Response {
    match err {
        StatusCatalogError::Catalog(e) => {
            error_response(e.status_code(), e.error_code(), &e.to_string())
        }
        StatusCatalogError::Database(_) => error_response(
            500,
            "INTERNAL_ERROR",
            "An error occurred",
        ),
    }
}

fn validate(request: &StatusRequest) -> Result<(), Response> {
    if request.label.trim().is_empty() {
        return Err(validation_error("label must not be empty"));
    }
    if request.value.trim().is_empty() {
        return Err(validation_error("value must not be empty"));
    }
    Ok(())
}

impl From<StatusRequest> for StatusDefinitionInput {
    fn from(request: StatusRequest) -> Self {
        Self {
            label: request.label.trim().to_string(),
            value: request.value.trim().to_string(),
            color: request.color,
            description: request.description,
            is_end_state: request.is_end_state,
            end_state_type: request.end_state_type,
            is_default: request.is_default,
            sort_order: request.sort_order,
        }
    }
}

/// GET `/statuses` - List the status catalog in display order.
async fn list_statuses(State(state): State<AppState>) -> impl IntoResponse {
    let repo = StatusCatalogRepository::new((*state.db).clone());

    match repo.list().await {
        Ok(catalog) => (StatusCode::OK, catalog_body(catalog)).into_response(),
        Err(e) => {
            error!(error = %e, "Failed to list statuses");
            catalog_error_response(&e)
        }
    }
}

/// POST `/statuses` - Create a status definition.
async fn create_status(
    State(state): State<AppState>,
    Json(request): Json<StatusRequest>,
) -> impl IntoResponse {
    if let Err(response) = validate(&request) {
        return response;
    }

    let repo = StatusCatalogRepository::new((*state.db).clone());

    match repo.create(request.into()).await {
        Ok(definition) => (
            StatusCode::CREATED,
            Json(json!({ "status": StatusResponse::from(definition) })),
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, "Failed to create status");
            catalog_error_response(&e)
        }
    }
}

/// PUT `/statuses/{id}` - Update a status definition.
async fn update_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<StatusRequest>,
) -> impl IntoResponse {
    if let Err(response) = validate(&request) {
        return response;
    }

    let repo = StatusCatalogRepository::new((*state.db).clone());

    match repo.update(id, request.into()).await {
        Ok(definition) => (
            StatusCode::OK,
            Json(json!({ "status": StatusResponse::from(definition) })),
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, status_id = %id, "Failed to update status");
            catalog_error_response(&e)
        }
    }
}

/// DELETE `/statuses/{id}` - Delete a status definition.
///
/// Rejected for the default status and for any status still held by
/// orders.
async fn delete_status(State(state): State<AppState>, Path(id): Path<Uuid>) -> impl IntoResponse {
    let repo = StatusCatalogRepository::new((*state.db).clone());

    match repo.delete(id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => {
            error!(error = %e, status_id = %id, "Failed to delete status");
            catalog_error_response(&e)
        }
    }
}

/// PUT `/statuses/reorder` - Reorder the whole catalog.
///
/// The body must list every definition id exactly once.
async fn reorder_statuses(
    State(state): State<AppState>,
    Json(request): Json<ReorderRequest>,
) -> impl IntoResponse {
    let repo = StatusCatalogRepository::new((*state.db).clone());

    match repo.reorder(&request.ids).await {
        Ok(catalog) => (StatusCode::OK, catalog_body(catalog)).into_response(),
        Err(e) => {
            error!(error = %e, "Failed to reorder statuses");
            catalog_error_response(&e)
        }
    }
}

/// PUT `/statuses/{id}/default` - Mark a status as the default.
async fn set_default_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    let repo = StatusCatalogRepository::new((*state.db).clone());

    match repo.set_default(id).await {
        Ok(catalog) => (StatusCode::OK, catalog_body(catalog)).into_response(),
        Err(e) => {
            error!(error = %e, status_id = %id, "Failed to set default status");
            catalog_error_response(&e)
        }
    }
}
