use crate::app::CatalogService;
use crate::domain::validation::ValidationErrors;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::sync::Arc;
use utoipa::ToSchema;

#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<CatalogService>,
    /// Append the underlying store message to `DB_ERROR` responses.
    pub expose_store_errors: bool,
}

impl AppState {
    pub fn new(catalog: Arc<CatalogService>) -> Self {
        Self {
            catalog,
            expose_store_errors: false,
        }
    }
}

/// Response envelope shared by every endpoint.
#[derive(Serialize, Debug, ToSchema)]
pub struct ApiResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Object)]
    pub data: Option<JsonValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiError>,
    /// Field name -> messages.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Object)]
    pub validation_errors: Option<ValidationErrors>,
}

#[derive(Serialize, Debug, ToSchema)]
pub struct ApiError {
    pub message: String,
    /// Machine-readable code, e.g. `VALIDATION_ERROR` or `GAME_NOT_FOUND`.
    pub code: String,
}

/// Body accepted by `POST /api/games` and `PUT /api/games/{id}`.
///
/// Bodies are validated field by field, so any JSON object is accepted at the parsing stage.
#[derive(Deserialize, Debug, ToSchema)]
pub struct GameInput {
    #[schema(example = "Portal")]
    pub title: String,
    #[schema(example = "2007-10-10")]
    pub release_date: String,
    pub genre_id: i64,
    pub description: String,
    pub platform_ids: Vec<i64>,
}

#[derive(Deserialize, Debug, ToSchema)]
pub struct GenreInput {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Deserialize, Debug, ToSchema)]
pub struct PlatformInput {
    pub name: String,
    #[serde(default)]
    pub manufacturer: Option<String>,
}
