use crate::transport::http::handlers::common::{
    catalog_error, json_object, message_only, parse_id, respond,
};
use crate::transport::http::types::{ApiResponse, AppState, GameInput};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Response;
use axum::Json;
use serde_json::Value as JsonValue;

#[utoipa::path(
    get,
    path = "/api/games",
    responses(
        (status = 200, description = "All games with genre and platforms, ordered by title", body = ApiResponse),
        (status = 500, description = "Store failure", body = ApiResponse)
    )
)]
pub async fn list_games_handler(State(state): State<AppState>) -> Response {
    let result = state.catalog.list_games().await;
    respond(&state, result, StatusCode::OK, None)
}

#[utoipa::path(
    get,
    path = "/api/games/{id}",
    params(("id" = i64, Path, description = "Game id")),
    responses(
        (status = 200, description = "Game with genre and platforms", body = ApiResponse),
        (status = 400, description = "Invalid id", body = ApiResponse),
        (status = 404, description = "Game not found", body = ApiResponse)
    )
)]
pub async fn get_game_handler(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let game_id = match parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    let result = state.catalog.get_game(game_id).await;
    respond(&state, result, StatusCode::OK, None)
}

#[utoipa::path(
    post,
    path = "/api/games",
    request_body = GameInput,
    responses(
        (status = 201, description = "Game created and platforms linked", body = ApiResponse),
        (status = 400, description = "Invalid JSON body", body = ApiResponse),
        (status = 422, description = "Validation failed or genre/platform not found", body = ApiResponse),
        (status = 500, description = "Store failure", body = ApiResponse)
    )
)]
pub async fn create_game_handler(
    State(state): State<AppState>,
    body: Result<Json<JsonValue>, JsonRejection>,
) -> Response {
    let record = match json_object(body) {
        Ok(r) => r,
        Err(resp) => return resp,
    };
    let result = state.catalog.create_game(&record).await;
    respond(&state, result, StatusCode::CREATED, Some("Game created successfully"))
}

#[utoipa::path(
    put,
    path = "/api/games/{id}",
    params(("id" = i64, Path, description = "Game id")),
    request_body = GameInput,
    responses(
        (status = 200, description = "Game updated and platforms synchronized", body = ApiResponse),
        (status = 400, description = "Invalid id or JSON body", body = ApiResponse),
        (status = 404, description = "Game not found", body = ApiResponse),
        (status = 422, description = "Validation failed or genre/platform not found", body = ApiResponse),
        (status = 500, description = "Store failure", body = ApiResponse)
    )
)]
pub async fn update_game_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<JsonValue>, JsonRejection>,
) -> Response {
    let game_id = match parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    let record = match json_object(body) {
        Ok(r) => r,
        Err(resp) => return resp,
    };
    let result = state.catalog.update_game(game_id, &record).await;
    respond(&state, result, StatusCode::OK, Some("Game updated successfully"))
}

#[utoipa::path(
    delete,
    path = "/api/games/{id}",
    params(("id" = i64, Path, description = "Game id")),
    responses(
        (status = 200, description = "Game and its platform links deleted", body = ApiResponse),
        (status = 400, description = "Invalid id", body = ApiResponse),
        (status = 404, description = "Game not found", body = ApiResponse)
    )
)]
pub async fn delete_game_handler(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let game_id = match parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    match state.catalog.delete_game(game_id).await {
        Ok(()) => message_only(StatusCode::OK, "Game deleted successfully"),
        Err(e) => catalog_error(&state, e),
    }
}
