//! In-process catalog store. Same contract as the Postgres backend, including cascade and
//! restrict behavior on deletes; used by `CATALOG_BACKEND=memory` and the tests.

use super::{CatalogStore, GamePlatformRepository, GameRepository, GenreRepository, PlatformRepository};
use crate::domain::model::{Game, GamePlatform, Genre, Platform};
use anyhow::Result;
use async_trait::async_trait;
use std::collections::{BTreeMap, BTreeSet};
use tokio::sync::RwLock;

#[derive(Default)]
struct Tables {
    games: BTreeMap<i64, Game>,
    genres: BTreeMap<i64, Genre>,
    platforms: BTreeMap<i64, Platform>,
    game_platforms: BTreeSet<GamePlatform>,
    next_game_id: i64,
    next_genre_id: i64,
    next_platform_id: i64,
}

fn next_id(counter: &mut i64) -> i64 {
    *counter += 1;
    *counter
}

fn by_title(mut games: Vec<Game>) -> Vec<Game> {
    games.sort_by(|a, b| a.title.cmp(&b.title).then(a.game_id.cmp(&b.game_id)));
    games
}

#[derive(Default)]
pub struct MemoryCatalogStore {
    tables: RwLock<Tables>,
}

impl MemoryCatalogStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl GameRepository for MemoryCatalogStore {
    async fn find_all_games(&self) -> Result<Vec<Game>> {
        let tables = self.tables.read().await;
        Ok(by_title(tables.games.values().cloned().collect()))
    }

    async fn find_game(&self, game_id: i64) -> Result<Option<Game>> {
        Ok(self.tables.read().await.games.get(&game_id).cloned())
    }

    async fn find_games_by_genre(&self, genre_id: i64) -> Result<Vec<Game>> {
        let tables = self.tables.read().await;
        let games = tables
            .games
            .values()
            .filter(|g| g.genre_id == genre_id)
            .cloned()
            .collect();
        Ok(by_title(games))
    }

    async fn find_games_by_platform(&self, platform_id: i64) -> Result<Vec<Game>> {
        let tables = self.tables.read().await;
        let games = tables
            .game_platforms
            .iter()
            .filter(|link| link.platform_id == platform_id)
            .filter_map(|link| tables.games.get(&link.game_id).cloned())
            .collect();
        Ok(by_title(games))
    }

    async fn save_game(&self, game: &mut Game) -> Result<bool> {
        let mut tables = self.tables.write().await;
        if !tables.genres.contains_key(&game.genre_id) {
            anyhow::bail!("insert or update on games violates foreign key on genre_id {}", game.genre_id);
        }
        match game.game_id {
            Some(game_id) => match tables.games.get_mut(&game_id) {
                Some(row) => {
                    *row = game.clone();
                    Ok(true)
                }
                None => Ok(false),
            },
            None => {
                let game_id = next_id(&mut tables.next_game_id);
                game.game_id = Some(game_id);
                tables.games.insert(game_id, game.clone());
                Ok(true)
            }
        }
    }

    async fn delete_game(&self, game_id: i64) -> Result<bool> {
        let mut tables = self.tables.write().await;
        let removed = tables.games.remove(&game_id).is_some();
        tables.game_platforms.retain(|link| link.game_id != game_id);
        Ok(removed)
    }
}

#[async_trait]
impl GenreRepository for MemoryCatalogStore {
    async fn find_all_genres(&self) -> Result<Vec<Genre>> {
        let tables = self.tables.read().await;
        let mut genres: Vec<Genre> = tables.genres.values().cloned().collect();
        genres.sort_by(|a, b| a.name.cmp(&b.name).then(a.genre_id.cmp(&b.genre_id)));
        Ok(genres)
    }

    async fn find_genre(&self, genre_id: i64) -> Result<Option<Genre>> {
        Ok(self.tables.read().await.genres.get(&genre_id).cloned())
    }

    async fn save_genre(&self, genre: &mut Genre) -> Result<bool> {
        let mut tables = self.tables.write().await;
        match genre.genre_id {
            Some(genre_id) => match tables.genres.get_mut(&genre_id) {
                Some(row) => {
                    *row = genre.clone();
                    Ok(true)
                }
                None => Ok(false),
            },
            None => {
                let genre_id = next_id(&mut tables.next_genre_id);
                genre.genre_id = Some(genre_id);
                tables.genres.insert(genre_id, genre.clone());
                Ok(true)
            }
        }
    }

    async fn delete_genre(&self, genre_id: i64) -> Result<bool> {
        let mut tables = self.tables.write().await;
        if tables.games.values().any(|g| g.genre_id == genre_id) {
            anyhow::bail!("delete on genres violates foreign key from games (genre_id {})", genre_id);
        }
        Ok(tables.genres.remove(&genre_id).is_some())
    }
}

#[async_trait]
impl PlatformRepository for MemoryCatalogStore {
    async fn find_all_platforms(&self) -> Result<Vec<Platform>> {
        let tables = self.tables.read().await;
        let mut platforms: Vec<Platform> = tables.platforms.values().cloned().collect();
        platforms.sort_by(|a, b| a.name.cmp(&b.name).then(a.platform_id.cmp(&b.platform_id)));
        Ok(platforms)
    }

    async fn find_platform(&self, platform_id: i64) -> Result<Option<Platform>> {
        Ok(self.tables.read().await.platforms.get(&platform_id).cloned())
    }

    async fn find_platforms_by_game(&self, game_id: i64) -> Result<Vec<Platform>> {
        let tables = self.tables.read().await;
        let mut platforms: Vec<Platform> = tables
            .game_platforms
            .iter()
            .filter(|link| link.game_id == game_id)
            .filter_map(|link| tables.platforms.get(&link.platform_id).cloned())
            .collect();
        platforms.sort_by(|a, b| a.name.cmp(&b.name).then(a.platform_id.cmp(&b.platform_id)));
        Ok(platforms)
    }

    async fn save_platform(&self, platform: &mut Platform) -> Result<bool> {
        let mut tables = self.tables.write().await;
        match platform.platform_id {
            Some(platform_id) => match tables.platforms.get_mut(&platform_id) {
                Some(row) => {
                    *row = platform.clone();
                    Ok(true)
                }
                None => Ok(false),
            },
            None => {
                let platform_id = next_id(&mut tables.next_platform_id);
                platform.platform_id = Some(platform_id);
                tables.platforms.insert(platform_id, platform.clone());
                Ok(true)
            }
        }
    }

    async fn delete_platform(&self, platform_id: i64) -> Result<bool> {
        let mut tables = self.tables.write().await;
        let removed = tables.platforms.remove(&platform_id).is_some();
        tables
            .game_platforms
            .retain(|link| link.platform_id != platform_id);
        Ok(removed)
    }
}

#[async_trait]
impl GamePlatformRepository for MemoryCatalogStore {
    async fn game_platform_exists(&self, game_id: i64, platform_id: i64) -> Result<bool> {
        let tables = self.tables.read().await;
        Ok(tables.game_platforms.contains(&GamePlatform { game_id, platform_id }))
    }

    async fn create_game_platform(&self, game_id: i64, platform_id: i64) -> Result<bool> {
        let mut tables = self.tables.write().await;
        if !tables.games.contains_key(&game_id) || !tables.platforms.contains_key(&platform_id) {
            anyhow::bail!(
                "insert on game_platforms violates foreign key ({}, {})",
                game_id,
                platform_id
            );
        }
        Ok(tables.game_platforms.insert(GamePlatform { game_id, platform_id }))
    }

    async fn remove_game_platform(&self, game_id: i64, platform_id: i64) -> Result<bool> {
        let mut tables = self.tables.write().await;
        Ok(tables.game_platforms.remove(&GamePlatform { game_id, platform_id }))
    }
}

#[async_trait]
impl CatalogStore for MemoryCatalogStore {
    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}
