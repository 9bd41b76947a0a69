use crate::app::{CatalogError, CatalogResult};
use crate::transport::http::types::{ApiError, ApiResponse, AppState};
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::{Map, Value as JsonValue};

pub fn success<T: Serialize>(status: StatusCode, data: &T, message: Option<&str>) -> Response {
    match serde_json::to_value(data) {
        Ok(data) => (
            status,
            Json(ApiResponse {
                success: true,
                data: Some(data),
                message: message.map(str::to_string),
                error: None,
                validation_errors: None,
            }),
        )
            .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "failed to serialize response body");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", "Internal server error")
        }
    }
}

/// A success envelope with a message and no data (deletes).
pub fn message_only(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(ApiResponse {
            success: true,
            data: None,
            message: Some(message.to_string()),
            error: None,
            validation_errors: None,
        }),
    )
        .into_response()
}

pub fn error_response(status: StatusCode, code: &str, message: &str) -> Response {
    (
        status,
        Json(ApiResponse {
            success: false,
            data: None,
            message: None,
            error: Some(ApiError {
                message: message.to_string(),
                code: code.to_string(),
            }),
            validation_errors: None,
        }),
    )
        .into_response()
}

/// Maps a service error onto a status code, error code and envelope.
pub fn catalog_error(state: &AppState, err: CatalogError) -> Response {
    match err {
        CatalogError::Validation(errors) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(ApiResponse {
                success: false,
                data: None,
                message: None,
                error: Some(ApiError {
                    message: "Validation failed".to_string(),
                    code: "VALIDATION_ERROR".to_string(),
                }),
                validation_errors: Some(errors),
            }),
        )
            .into_response(),
        CatalogError::NotFound { entity, .. } => error_response(
            StatusCode::NOT_FOUND,
            &format!("{}_NOT_FOUND", entity.code_prefix()),
            &err.to_string(),
        ),
        CatalogError::Referential { entity, .. } => error_response(
            StatusCode::UNPROCESSABLE_ENTITY,
            &format!("{}_NOT_FOUND", entity.code_prefix()),
            &err.to_string(),
        ),
        CatalogError::InUse { entity, .. } => error_response(
            StatusCode::UNPROCESSABLE_ENTITY,
            &format!("{}_IN_USE", entity.code_prefix()),
            &err.to_string(),
        ),
        CatalogError::Store(ref e) => {
            tracing::error!(error = %e, "store failure");
            let message = if state.expose_store_errors {
                err.to_string()
            } else {
                "Database error".to_string()
            };
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "DB_ERROR", &message)
        }
    }
}

/// Renders a service result: `status` on success, the mapped error otherwise.
pub fn respond<T: Serialize>(
    state: &AppState,
    result: CatalogResult<T>,
    status: StatusCode,
    message: Option<&str>,
) -> Response {
    match result {
        Ok(data) => success(status, &data, message),
        Err(e) => catalog_error(state, e),
    }
}

/// Path ids must be positive integers.
pub fn parse_id(raw: &str) -> Result<i64, Response> {
    match raw.trim().parse::<i64>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(error_response(
            StatusCode::BAD_REQUEST,
            "INVALID_ID",
            &format!("Invalid ID: '{}'", raw),
        )),
    }
}

/// Unwraps a JSON body that must be an object.
pub fn json_object(
    body: Result<Json<JsonValue>, JsonRejection>,
) -> Result<Map<String, JsonValue>, Response> {
    match body {
        Ok(Json(JsonValue::Object(record))) => Ok(record),
        Ok(Json(_)) => Err(error_response(
            StatusCode::BAD_REQUEST,
            "INVALID_JSON",
            "Invalid JSON body: expected an object",
        )),
        Err(e) => Err(error_response(
            StatusCode::BAD_REQUEST,
            "INVALID_JSON",
            &format!("Invalid JSON body: {}", e.body_text()),
        )),
    }
}

pub async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "NOT_FOUND", "Endpoint not found")
}

pub async fn method_not_allowed_handler() -> Response {
    error_response(
        StatusCode::METHOD_NOT_ALLOWED,
        "METHOD_NOT_ALLOWED",
        "Method not allowed",
    )
}
