//! Record store contracts for the catalog, plus the Postgres and in-memory backends.

use crate::domain::model::{Game, Genre, Platform};
use crate::domain::sync::RelationLinks;
use anyhow::Result;
use async_trait::async_trait;

pub mod memory;
pub mod postgres;

pub use memory::MemoryCatalogStore;
pub use postgres::PostgresCatalogStore;

#[async_trait]
pub trait GameRepository: Send + Sync {
    /// All games ordered by title.
    async fn find_all_games(&self) -> Result<Vec<Game>>;
    async fn find_game(&self, game_id: i64) -> Result<Option<Game>>;
    async fn find_games_by_genre(&self, genre_id: i64) -> Result<Vec<Game>>;
    /// Games linked to `platform_id`, ordered by title.
    async fn find_games_by_platform(&self, platform_id: i64) -> Result<Vec<Game>>;
    /// Inserts when `game_id` is `None` (and assigns it), updates otherwise.
    /// Returns `false` when the row to update no longer exists.
    async fn save_game(&self, game: &mut Game) -> Result<bool>;
    /// Deletes the game and its platform links; returns whether a row was removed.
    async fn delete_game(&self, game_id: i64) -> Result<bool>;
}

#[async_trait]
pub trait GenreRepository: Send + Sync {
    /// All genres ordered by name.
    async fn find_all_genres(&self) -> Result<Vec<Genre>>;
    async fn find_genre(&self, genre_id: i64) -> Result<Option<Genre>>;
    async fn save_genre(&self, genre: &mut Genre) -> Result<bool>;
    async fn delete_genre(&self, genre_id: i64) -> Result<bool>;
}

#[async_trait]
pub trait PlatformRepository: Send + Sync {
    /// All platforms ordered by name.
    async fn find_all_platforms(&self) -> Result<Vec<Platform>>;
    async fn find_platform(&self, platform_id: i64) -> Result<Option<Platform>>;
    /// Platforms linked to `game_id`, ordered by name.
    async fn find_platforms_by_game(&self, game_id: i64) -> Result<Vec<Platform>>;
    async fn save_platform(&self, platform: &mut Platform) -> Result<bool>;
    /// Deletes the platform and its game links.
    async fn delete_platform(&self, platform_id: i64) -> Result<bool>;
}

#[async_trait]
pub trait GamePlatformRepository: Send + Sync {
    async fn game_platform_exists(&self, game_id: i64, platform_id: i64) -> Result<bool>;
    /// Inserts the pair unless it already exists; returns whether a row was created.
    async fn create_game_platform(&self, game_id: i64, platform_id: i64) -> Result<bool>;
    async fn remove_game_platform(&self, game_id: i64, platform_id: i64) -> Result<bool>;
}

/// Everything the catalog service needs from a backend.
#[async_trait]
pub trait CatalogStore:
    GameRepository + GenreRepository + PlatformRepository + GamePlatformRepository
{
    /// Cheap reachability probe used by `/health`.
    async fn ping(&self) -> Result<()>;
}

/// Game <-> platform join operations seen through the synchronizer's interface.
pub struct GamePlatformLinks<'a, S: ?Sized> {
    store: &'a S,
}

impl<'a, S: CatalogStore + ?Sized> GamePlatformLinks<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }
}

#[async_trait]
impl<S: CatalogStore + ?Sized> RelationLinks for GamePlatformLinks<'_, S> {
    async fn related_exists(&self, platform_id: i64) -> Result<bool> {
        Ok(self.store.find_platform(platform_id).await?.is_some())
    }

    async fn link(&self, game_id: i64, platform_id: i64) -> Result<bool> {
        self.store.create_game_platform(game_id, platform_id).await
    }

    async fn unlink(&self, game_id: i64, platform_id: i64) -> Result<bool> {
        self.store.remove_game_platform(game_id, platform_id).await
    }
}
