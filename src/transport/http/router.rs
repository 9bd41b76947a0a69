use crate::domain::model::{Game, GameDetail, Genre, GenreDetail, Platform, PlatformDetail};
use crate::transport::http::handlers::common::{method_not_allowed_handler, not_found_handler};
use crate::transport::http::handlers::{games, genres, health, platforms};
use crate::transport::http::types::{
    ApiError, ApiResponse, AppState, GameInput, GenreInput, PlatformInput,
};
use axum::routing::get;
use axum::Router;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        health::healthcheck_handler,
        games::list_games_handler,
        games::get_game_handler,
        games::create_game_handler,
        games::update_game_handler,
        games::delete_game_handler,
        genres::list_genres_handler,
        genres::get_genre_handler,
        genres::create_genre_handler,
        genres::update_genre_handler,
        genres::delete_genre_handler,
        platforms::list_platforms_handler,
        platforms::get_platform_handler,
        platforms::create_platform_handler,
        platforms::update_platform_handler,
        platforms::delete_platform_handler
    ),
    components(schemas(
        ApiResponse,
        ApiError,
        GameInput,
        GenreInput,
        PlatformInput,
        Game,
        GameDetail,
        Genre,
        GenreDetail,
        Platform,
        PlatformDetail
    ))
)]
pub struct ApiDoc;

pub fn create_router(app_state: AppState) -> Router {
    Router::new()
        .route(
            "/health",
            get(health::healthcheck_handler).fallback(method_not_allowed_handler),
        )
        .route(
            "/api/games",
            get(games::list_games_handler)
                .post(games::create_game_handler)
                .fallback(method_not_allowed_handler),
        )
        .route(
            "/api/games/:id",
            get(games::get_game_handler)
                .put(games::update_game_handler)
                .delete(games::delete_game_handler)
                .fallback(method_not_allowed_handler),
        )
        .route(
            "/api/genres",
            get(genres::list_genres_handler)
                .post(genres::create_genre_handler)
                .fallback(method_not_allowed_handler),
        )
        .route(
            "/api/genres/:id",
            get(genres::get_genre_handler)
                .put(genres::update_genre_handler)
                .delete(genres::delete_genre_handler)
                .fallback(method_not_allowed_handler),
        )
        .route(
            "/api/platforms",
            get(platforms::list_platforms_handler)
                .post(platforms::create_platform_handler)
                .fallback(method_not_allowed_handler),
        )
        .route(
            "/api/platforms/:id",
            get(platforms::get_platform_handler)
                .put(platforms::update_platform_handler)
                .delete(platforms::delete_platform_handler)
                .fallback(method_not_allowed_handler),
        )
        .fallback(not_found_handler)
        .with_state(app_state)
}
