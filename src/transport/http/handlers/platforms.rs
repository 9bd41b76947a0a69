use crate::transport::http::handlers::common::{
    catalog_error, json_object, message_only, parse_id, respond,
};
use crate::transport::http::types::{ApiResponse, AppState, PlatformInput};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Response;
use axum::Json;
use serde_json::Value as JsonValue;

#[utoipa::path(
    get,
    path = "/api/platforms",
    responses(
        (status = 200, description = "All platforms ordered by name", body = ApiResponse),
        (status = 500, description = "Store failure", body = ApiResponse)
    )
)]
pub async fn list_platforms_handler(State(state): State<AppState>) -> Response {
    let result = state.catalog.list_platforms().await;
    respond(&state, result, StatusCode::OK, None)
}

#[utoipa::path(
    get,
    path = "/api/platforms/{id}",
    params(("id" = i64, Path, description = "Platform id")),
    responses(
        (status = 200, description = "Platform with its games", body = ApiResponse),
        (status = 400, description = "Invalid id", body = ApiResponse),
        (status = 404, description = "Platform not found", body = ApiResponse)
    )
)]
pub async fn get_platform_handler(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let platform_id = match parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    let result = state.catalog.get_platform(platform_id).await;
    respond(&state, result, StatusCode::OK, None)
}

#[utoipa::path(
    post,
    path = "/api/platforms",
    request_body = PlatformInput,
    responses(
        (status = 201, description = "Platform created", body = ApiResponse),
        (status = 400, description = "Invalid JSON body", body = ApiResponse),
        (status = 422, description = "Validation failed", body = ApiResponse)
    )
)]
pub async fn create_platform_handler(
    State(state): State<AppState>,
    body: Result<Json<JsonValue>, JsonRejection>,
) -> Response {
    let record = match json_object(body) {
        Ok(r) => r,
        Err(resp) => return resp,
    };
    let result = state.catalog.create_platform(&record).await;
    respond(&state, result, StatusCode::CREATED, Some("Platform created successfully"))
}

#[utoipa::path(
    put,
    path = "/api/platforms/{id}",
    params(("id" = i64, Path, description = "Platform id")),
    request_body = PlatformInput,
    responses(
        (status = 200, description = "Platform updated", body = ApiResponse),
        (status = 400, description = "Invalid id or JSON body", body = ApiResponse),
        (status = 404, description = "Platform not found", body = ApiResponse),
        (status = 422, description = "Validation failed", body = ApiResponse)
    )
)]
pub async fn update_platform_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<JsonValue>, JsonRejection>,
) -> Response {
    let platform_id = match parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    let record = match json_object(body) {
        Ok(r) => r,
        Err(resp) => return resp,
    };
    let result = state.catalog.update_platform(platform_id, &record).await;
    respond(&state, result, StatusCode::OK, Some("Platform updated successfully"))
}

#[utoipa::path(
    delete,
    path = "/api/platforms/{id}",
    params(("id" = i64, Path, description = "Platform id")),
    responses(
        (status = 200, description = "Platform and its game links deleted", body = ApiResponse),
        (status = 400, description = "Invalid id", body = ApiResponse),
        (status = 404, description = "Platform not found", body = ApiResponse)
    )
)]
pub async fn delete_platform_handler(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let platform_id = match parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    match state.catalog.delete_platform(platform_id).await {
        Ok(()) => message_only(StatusCode::OK, "Platform deleted successfully"),
        Err(e) => catalog_error(&state, e),
    }
}
