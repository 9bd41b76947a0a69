//! The catalog service.
//!
//! Sits between the HTTP layer and the record store. For every write it:
//! 1.  Validates the submitted field map against the entity's rule set.
//! 2.  Checks that referenced genres/platforms exist (how strictly depends on [`ServicePolicy`]).
//! 3.  Saves the record, then reconciles the game's platform links with the synchronizer.

use crate::app::error::{CatalogError, CatalogResult, Entity};
use crate::domain::model::{
    Game, GameDetail, GameDraft, Genre, GenreDetail, GenreDraft, Platform, PlatformDetail,
    PlatformDraft,
};
use crate::domain::sync::{self, MissingLinkPolicy, SyncOutcome};
use crate::storage::catalog::{CatalogStore, GamePlatformLinks};
use serde_json::{Map, Value as JsonValue};
use std::sync::Arc;

/// Knobs that used to differ between API generations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ServicePolicy {
    pub missing_platforms: MissingLinkPolicy,
}

pub struct CatalogService {
    store: Arc<dyn CatalogStore>,
    policy: ServicePolicy,
}

impl CatalogService {
    pub fn new(store: Arc<dyn CatalogStore>, policy: ServicePolicy) -> Self {
        Self { store, policy }
    }

    pub fn store(&self) -> &dyn CatalogStore {
        self.store.as_ref()
    }

    pub fn policy(&self) -> ServicePolicy {
        self.policy
    }

    pub async fn ping(&self) -> CatalogResult<()> {
        Ok(self.store.ping().await?)
    }

    // --- Games ---

    pub async fn list_games(&self) -> CatalogResult<Vec<GameDetail>> {
        let games = self.store.find_all_games().await?;
        let mut out = Vec::with_capacity(games.len());
        for game in games {
            out.push(self.game_detail(game).await?);
        }
        Ok(out)
    }

    pub async fn get_game(&self, game_id: i64) -> CatalogResult<GameDetail> {
        let game = self.require_game(game_id).await?;
        self.game_detail(game).await
    }

    pub async fn create_game(&self, record: &Map<String, JsonValue>) -> CatalogResult<GameDetail> {
        let draft = GameDraft::from_record(record)?;
        self.check_references(&draft).await?;

        let mut game = Game::from_draft(&draft);
        if !self.store.save_game(&mut game).await? {
            return Err(anyhow::anyhow!("failed to create game").into());
        }
        let game_id = game
            .game_id
            .ok_or_else(|| anyhow::anyhow!("store did not assign a game id"))?;

        let outcome = self.sync_platforms(game_id, &draft.platform_ids, &[]).await?;
        tracing::info!(
            game_id,
            title = %game.title,
            linked = ?outcome.linked,
            skipped = ?outcome.skipped,
            "game created"
        );
        self.game_detail(game).await
    }

    pub async fn update_game(
        &self,
        game_id: i64,
        record: &Map<String, JsonValue>,
    ) -> CatalogResult<GameDetail> {
        let draft = GameDraft::from_record(record)?;
        let mut game = self.require_game(game_id).await?;
        self.check_references(&draft).await?;

        game.assign(&draft);
        if !self.store.save_game(&mut game).await? {
            return Err(CatalogError::NotFound {
                entity: Entity::Game,
                id: game_id,
            });
        }

        let current: Vec<i64> = self
            .store
            .find_platforms_by_game(game_id)
            .await?
            .iter()
            .filter_map(|p| p.platform_id)
            .collect();
        let outcome = self
            .sync_platforms(game_id, &draft.platform_ids, &current)
            .await?;
        tracing::info!(
            game_id,
            linked = ?outcome.linked,
            unlinked = ?outcome.unlinked,
            skipped = ?outcome.skipped,
            "game updated"
        );
        self.game_detail(game).await
    }

    pub async fn delete_game(&self, game_id: i64) -> CatalogResult<()> {
        self.require_game(game_id).await?;
        if !self.store.delete_game(game_id).await? {
            return Err(CatalogError::NotFound {
                entity: Entity::Game,
                id: game_id,
            });
        }
        tracing::info!(game_id, "game deleted");
        Ok(())
    }

    async fn require_game(&self, game_id: i64) -> CatalogResult<Game> {
        self.store
            .find_game(game_id)
            .await?
            .ok_or(CatalogError::NotFound {
                entity: Entity::Game,
                id: game_id,
            })
    }

    async fn game_detail(&self, game: Game) -> CatalogResult<GameDetail> {
        let genre = self.store.find_genre(game.genre_id).await?;
        let platforms = match game.game_id {
            Some(game_id) => self.store.find_platforms_by_game(game_id).await?,
            None => Vec::new(),
        };
        Ok(GameDetail {
            game,
            genre,
            platforms,
        })
    }

    /// The genre must exist. Under [`MissingLinkPolicy::Reject`] so must every platform.
    async fn check_references(&self, draft: &GameDraft) -> CatalogResult<()> {
        if self.store.find_genre(draft.genre_id).await?.is_none() {
            return Err(CatalogError::Referential {
                entity: Entity::Genre,
                id: draft.genre_id,
            });
        }
        if self.policy.missing_platforms == MissingLinkPolicy::Reject {
            for &platform_id in &draft.platform_ids {
                if self.store.find_platform(platform_id).await?.is_none() {
                    return Err(CatalogError::Referential {
                        entity: Entity::Platform,
                        id: platform_id,
                    });
                }
            }
        }
        Ok(())
    }

    async fn sync_platforms(
        &self,
        game_id: i64,
        desired: &[i64],
        current: &[i64],
    ) -> CatalogResult<SyncOutcome> {
        let links = GamePlatformLinks::new(self.store.as_ref());
        let outcome = sync::sync(&links, game_id, desired, current)
            .await
            .map_err(|e| {
                tracing::error!(game_id, error = %e, "platform sync stopped part-way");
                CatalogError::Store(e)
            })?;
        Ok(outcome)
    }

    // --- Genres ---

    pub async fn list_genres(&self) -> CatalogResult<Vec<Genre>> {
        Ok(self.store.find_all_genres().await?)
    }

    pub async fn get_genre(&self, genre_id: i64) -> CatalogResult<GenreDetail> {
        let genre = self.require_genre(genre_id).await?;
        let games = self.store.find_games_by_genre(genre_id).await?;
        Ok(GenreDetail { genre, games })
    }

    pub async fn create_genre(&self, record: &Map<String, JsonValue>) -> CatalogResult<Genre> {
        let draft = GenreDraft::from_record(record)?;
        let mut genre = Genre::new(&draft.name, draft.description.as_deref());
        if !self.store.save_genre(&mut genre).await? {
            return Err(anyhow::anyhow!("failed to create genre").into());
        }
        tracing::info!(genre_id = ?genre.genre_id, name = %genre.name, "genre created");
        Ok(genre)
    }

    pub async fn update_genre(
        &self,
        genre_id: i64,
        record: &Map<String, JsonValue>,
    ) -> CatalogResult<Genre> {
        let draft = GenreDraft::from_record(record)?;
        let mut genre = self.require_genre(genre_id).await?;
        genre.assign(&draft);
        if !self.store.save_genre(&mut genre).await? {
            return Err(CatalogError::NotFound {
                entity: Entity::Genre,
                id: genre_id,
            });
        }
        tracing::info!(genre_id, "genre updated");
        Ok(genre)
    }

    pub async fn delete_genre(&self, genre_id: i64) -> CatalogResult<()> {
        self.require_genre(genre_id).await?;
        let games = self.store.find_games_by_genre(genre_id).await?;
        if !games.is_empty() {
            return Err(CatalogError::InUse {
                entity: Entity::Genre,
                id: genre_id,
                count: games.len(),
            });
        }
        if !self.store.delete_genre(genre_id).await? {
            return Err(CatalogError::NotFound {
                entity: Entity::Genre,
                id: genre_id,
            });
        }
        tracing::info!(genre_id, "genre deleted");
        Ok(())
    }

    async fn require_genre(&self, genre_id: i64) -> CatalogResult<Genre> {
        self.store
            .find_genre(genre_id)
            .await?
            .ok_or(CatalogError::NotFound {
                entity: Entity::Genre,
                id: genre_id,
            })
    }

    // --- Platforms ---

    pub async fn list_platforms(&self) -> CatalogResult<Vec<Platform>> {
        Ok(self.store.find_all_platforms().await?)
    }

    pub async fn get_platform(&self, platform_id: i64) -> CatalogResult<PlatformDetail> {
        let platform = self.require_platform(platform_id).await?;
        let games = self.store.find_games_by_platform(platform_id).await?;
        Ok(PlatformDetail { platform, games })
    }

    pub async fn create_platform(
        &self,
        record: &Map<String, JsonValue>,
    ) -> CatalogResult<Platform> {
        let draft = PlatformDraft::from_record(record)?;
        let mut platform = Platform::new(&draft.name, draft.manufacturer.as_deref());
        if !self.store.save_platform(&mut platform).await? {
            return Err(anyhow::anyhow!("failed to create platform").into());
        }
        tracing::info!(platform_id = ?platform.platform_id, name = %platform.name, "platform created");
        Ok(platform)
    }

    pub async fn update_platform(
        &self,
        platform_id: i64,
        record: &Map<String, JsonValue>,
    ) -> CatalogResult<Platform> {
        let draft = PlatformDraft::from_record(record)?;
        let mut platform = self.require_platform(platform_id).await?;
        platform.assign(&draft);
        if !self.store.save_platform(&mut platform).await? {
            return Err(CatalogError::NotFound {
                entity: Entity::Platform,
                id: platform_id,
            });
        }
        tracing::info!(platform_id, "platform updated");
        Ok(platform)
    }

    pub async fn delete_platform(&self, platform_id: i64) -> CatalogResult<()> {
        self.require_platform(platform_id).await?;
        if !self.store.delete_platform(platform_id).await? {
            return Err(CatalogError::NotFound {
                entity: Entity::Platform,
                id: platform_id,
            });
        }
        tracing::info!(platform_id, "platform deleted");
        Ok(())
    }

    async fn require_platform(&self, platform_id: i64) -> CatalogResult<Platform> {
        self.store
            .find_platform(platform_id)
            .await?
            .ok_or(CatalogError::NotFound {
                entity: Entity::Platform,
                id: platform_id,
            })
    }
}
