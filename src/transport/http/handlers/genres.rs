use crate::transport::http::handlers::common::{
    catalog_error, json_object, message_only, parse_id, respond,
};
use crate::transport::http::types::{ApiResponse, AppState, GenreInput};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Response;
use axum::Json;
use serde_json::Value as JsonValue;

#[utoipa::path(
    get,
    path = "/api/genres",
    responses(
        (status = 200, description = "All genres ordered by name", body = ApiResponse),
        (status = 500, description = "Store failure", body = ApiResponse)
    )
)]
pub async fn list_genres_handler(State(state): State<AppState>) -> Response {
    let result = state.catalog.list_genres().await;
    respond(&state, result, StatusCode::OK, None)
}

#[utoipa::path(
    get,
    path = "/api/genres/{id}",
    params(("id" = i64, Path, description = "Genre id")),
    responses(
        (status = 200, description = "Genre with its games", body = ApiResponse),
        (status = 400, description = "Invalid id", body = ApiResponse),
        (status = 404, description = "Genre not found", body = ApiResponse)
    )
)]
pub async fn get_genre_handler(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let genre_id = match parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    let result = state.catalog.get_genre(genre_id).await;
    respond(&state, result, StatusCode::OK, None)
}

#[utoipa::path(
    post,
    path = "/api/genres",
    request_body = GenreInput,
    responses(
        (status = 201, description = "Genre created", body = ApiResponse),
        (status = 400, description = "Invalid JSON body", body = ApiResponse),
        (status = 422, description = "Validation failed", body = ApiResponse)
    )
)]
pub async fn create_genre_handler(
    State(state): State<AppState>,
    body: Result<Json<JsonValue>, JsonRejection>,
) -> Response {
    let record = match json_object(body) {
        Ok(r) => r,
        Err(resp) => return resp,
    };
    let result = state.catalog.create_genre(&record).await;
    respond(&state, result, StatusCode::CREATED, Some("Genre created successfully"))
}

#[utoipa::path(
    put,
    path = "/api/genres/{id}",
    params(("id" = i64, Path, description = "Genre id")),
    request_body = GenreInput,
    responses(
        (status = 200, description = "Genre updated", body = ApiResponse),
        (status = 400, description = "Invalid id or JSON body", body = ApiResponse),
        (status = 404, description = "Genre not found", body = ApiResponse),
        (status = 422, description = "Validation failed", body = ApiResponse)
    )
)]
pub async fn update_genre_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<JsonValue>, JsonRejection>,
) -> Response {
    let genre_id = match parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    let record = match json_object(body) {
        Ok(r) => r,
        Err(resp) => return resp,
    };
    let result = state.catalog.update_genre(genre_id, &record).await;
    respond(&state, result, StatusCode::OK, Some("Genre updated successfully"))
}

#[utoipa::path(
    delete,
    path = "/api/genres/{id}",
    params(("id" = i64, Path, description = "Genre id")),
    responses(
        (status = 200, description = "Genre deleted", body = ApiResponse),
        (status = 400, description = "Invalid id", body = ApiResponse),
        (status = 404, description = "Genre not found", body = ApiResponse),
        (status = 422, description = "Genre still used by games", body = ApiResponse)
    )
)]
pub async fn delete_genre_handler(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let genre_id = match parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    match state.catalog.delete_genre(genre_id).await {
        Ok(()) => message_only(StatusCode::OK, "Genre deleted successfully"),
        Err(e) => catalog_error(&state, e),
    }
}
