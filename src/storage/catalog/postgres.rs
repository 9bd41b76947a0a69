//! Catalog store backed by PostgreSQL.

use super::{CatalogStore, GamePlatformRepository, GameRepository, GenreRepository, PlatformRepository};
use crate::domain::model::{Game, Genre, Platform};
use anyhow::Result;
use async_trait::async_trait;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};

/// A catalog store that uses a PostgreSQL connection pool.
#[derive(Clone)]
pub struct PostgresCatalogStore {
    pool: PgPool,
}

impl PostgresCatalogStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connects and brings the schema up to date.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        let store = Self::new(pool);
        store.migrate().await?;
        Ok(store)
    }

    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn game_from_row(row: &PgRow) -> Result<Game> {
    Ok(Game {
        game_id: Some(row.try_get("game_id")?),
        title: row.try_get("title")?,
        release_date: row.try_get("release_date")?,
        genre_id: row.try_get("genre_id")?,
        description: row.try_get("description")?,
    })
}

fn genre_from_row(row: &PgRow) -> Result<Genre> {
    Ok(Genre {
        genre_id: Some(row.try_get("genre_id")?),
        name: row.try_get("name")?,
        description: row.try_get("description")?,
    })
}

fn platform_from_row(row: &PgRow) -> Result<Platform> {
    Ok(Platform {
        platform_id: Some(row.try_get("platform_id")?),
        name: row.try_get("name")?,
        manufacturer: row.try_get("manufacturer")?,
    })
}

#[async_trait]
impl GameRepository for PostgresCatalogStore {
    async fn find_all_games(&self) -> Result<Vec<Game>> {
        let rows = sqlx::query(
            "SELECT game_id, title, release_date, genre_id, description FROM games ORDER BY title, game_id",
        )
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(game_from_row).collect()
    }

    async fn find_game(&self, game_id: i64) -> Result<Option<Game>> {
        let row = sqlx::query(
            "SELECT game_id, title, release_date, genre_id, description FROM games WHERE game_id = $1",
        )
        .bind(game_id)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(game_from_row).transpose()
    }

    async fn find_games_by_genre(&self, genre_id: i64) -> Result<Vec<Game>> {
        let rows = sqlx::query(
            "SELECT game_id, title, release_date, genre_id, description FROM games
             WHERE genre_id = $1 ORDER BY title, game_id",
        )
        .bind(genre_id)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(game_from_row).collect()
    }

    async fn find_games_by_platform(&self, platform_id: i64) -> Result<Vec<Game>> {
        let rows = sqlx::query(
            "SELECT g.game_id, g.title, g.release_date, g.genre_id, g.description
             FROM games g
             INNER JOIN game_platforms gp ON g.game_id = gp.game_id
             WHERE gp.platform_id = $1
             ORDER BY g.title, g.game_id",
        )
        .bind(platform_id)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(game_from_row).collect()
    }

    async fn save_game(&self, game: &mut Game) -> Result<bool> {
        match game.game_id {
            Some(game_id) => {
                let result = sqlx::query(
                    "UPDATE games SET title = $1, release_date = $2, genre_id = $3, description = $4
                     WHERE game_id = $5",
                )
                .bind(&game.title)
                .bind(game.release_date)
                .bind(game.genre_id)
                .bind(&game.description)
                .bind(game_id)
                .execute(&self.pool)
                .await?;
                Ok(result.rows_affected() > 0)
            }
            None => {
                let game_id: i64 = sqlx::query_scalar(
                    "INSERT INTO games (title, release_date, genre_id, description)
                     VALUES ($1, $2, $3, $4) RETURNING game_id",
                )
                .bind(&game.title)
                .bind(game.release_date)
                .bind(game.genre_id)
                .bind(&game.description)
                .fetch_one(&self.pool)
                .await?;
                game.game_id = Some(game_id);
                Ok(true)
            }
        }
    }

    async fn delete_game(&self, game_id: i64) -> Result<bool> {
        // game_platforms rows go with it (ON DELETE CASCADE).
        let result = sqlx::query("DELETE FROM games WHERE game_id = $1")
            .bind(game_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl GenreRepository for PostgresCatalogStore {
    async fn find_all_genres(&self) -> Result<Vec<Genre>> {
        let rows = sqlx::query("SELECT genre_id, name, description FROM genres ORDER BY name, genre_id")
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(genre_from_row).collect()
    }

    async fn find_genre(&self, genre_id: i64) -> Result<Option<Genre>> {
        let row = sqlx::query("SELECT genre_id, name, description FROM genres WHERE genre_id = $1")
            .bind(genre_id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(genre_from_row).transpose()
    }

    async fn save_genre(&self, genre: &mut Genre) -> Result<bool> {
        match genre.genre_id {
            Some(genre_id) => {
                let result =
                    sqlx::query("UPDATE genres SET name = $1, description = $2 WHERE genre_id = $3")
                        .bind(&genre.name)
                        .bind(&genre.description)
                        .bind(genre_id)
                        .execute(&self.pool)
                        .await?;
                Ok(result.rows_affected() > 0)
            }
            None => {
                let genre_id: i64 = sqlx::query_scalar(
                    "INSERT INTO genres (name, description) VALUES ($1, $2) RETURNING genre_id",
                )
                .bind(&genre.name)
                .bind(&genre.description)
                .fetch_one(&self.pool)
                .await?;
                genre.genre_id = Some(genre_id);
                Ok(true)
            }
        }
    }

    async fn delete_genre(&self, genre_id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM genres WHERE genre_id = $1")
            .bind(genre_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl PlatformRepository for PostgresCatalogStore {
    async fn find_all_platforms(&self) -> Result<Vec<Platform>> {
        let rows = sqlx::query(
            "SELECT platform_id, name, manufacturer FROM platforms ORDER BY name, platform_id",
        )
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(platform_from_row).collect()
    }

    async fn find_platform(&self, platform_id: i64) -> Result<Option<Platform>> {
        let row = sqlx::query(
            "SELECT platform_id, name, manufacturer FROM platforms WHERE platform_id = $1",
        )
        .bind(platform_id)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(platform_from_row).transpose()
    }

    async fn find_platforms_by_game(&self, game_id: i64) -> Result<Vec<Platform>> {
        let rows = sqlx::query(
            "SELECT p.platform_id, p.name, p.manufacturer
             FROM platforms p
             INNER JOIN game_platforms gp ON p.platform_id = gp.platform_id
             WHERE gp.game_id = $1
             ORDER BY p.name, p.platform_id",
        )
        .bind(game_id)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(platform_from_row).collect()
    }

    async fn save_platform(&self, platform: &mut Platform) -> Result<bool> {
        match platform.platform_id {
            Some(platform_id) => {
                let result = sqlx::query(
                    "UPDATE platforms SET name = $1, manufacturer = $2 WHERE platform_id = $3",
                )
                .bind(&platform.name)
                .bind(&platform.manufacturer)
                .bind(platform_id)
                .execute(&self.pool)
                .await?;
                Ok(result.rows_affected() > 0)
            }
            None => {
                let platform_id: i64 = sqlx::query_scalar(
                    "INSERT INTO platforms (name, manufacturer) VALUES ($1, $2) RETURNING platform_id",
                )
                .bind(&platform.name)
                .bind(&platform.manufacturer)
                .fetch_one(&self.pool)
                .await?;
                platform.platform_id = Some(platform_id);
                Ok(true)
            }
        }
    }

    async fn delete_platform(&self, platform_id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM platforms WHERE platform_id = $1")
            .bind(platform_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl GamePlatformRepository for PostgresCatalogStore {
    async fn game_platform_exists(&self, game_id: i64, platform_id: i64) -> Result<bool> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM game_platforms WHERE game_id = $1 AND platform_id = $2",
        )
        .bind(game_id)
        .bind(platform_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count > 0)
    }

    async fn create_game_platform(&self, game_id: i64, platform_id: i64) -> Result<bool> {
        if self.game_platform_exists(game_id, platform_id).await? {
            return Ok(false);
        }
        // A concurrent insert between the probe and here lands on the primary key.
        let result = sqlx::query(
            "INSERT INTO game_platforms (game_id, platform_id) VALUES ($1, $2)
             ON CONFLICT (game_id, platform_id) DO NOTHING",
        )
        .bind(game_id)
        .bind(platform_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn remove_game_platform(&self, game_id: i64, platform_id: i64) -> Result<bool> {
        let result =
            sqlx::query("DELETE FROM game_platforms WHERE game_id = $1 AND platform_id = $2")
                .bind(game_id)
                .bind(platform_id)
                .execute(&self.pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl CatalogStore for PostgresCatalogStore {
    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
