//! API route definitions.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use tapiz_shared::AppError;

pub mod health;
pub mod orders;
pub mod statuses;

use crate::AppState;
use axum::Router;

/// Creates the API router with all routes.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(health::routes())
        .merge(statuses::routes())
        .merge(orders::routes())
}

/// Builds the standard error response body.
pub(crate) fn error_response(status: u16, code: &str, message: &str) -> Response {
    let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (
        status,
        Json(json!({
            "error": code,
            "message": message
        })),
    )
        .into_response()
}

/// Maps an application error to the standard response body.
pub(crate) fn app_error_response(err: &AppError) -> Response {
    error_response(err.status_code(), err.error_code(), &err.to_string())
}

/// Builds a 400 validation error response.
pub(crate) fn validation_error(message: &str) -> Response {
    app_error_response(&AppError::Validation(message.to_string()))
}
