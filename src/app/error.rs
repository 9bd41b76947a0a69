use crate::domain::validation::ValidationErrors;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    Game,
    Genre,
    Platform,
}

impl Entity {
    /// Upper-case prefix used in error codes (`GAME_NOT_FOUND`, ...).
    pub fn code_prefix(self) -> &'static str {
        match self {
            Entity::Game => "GAME",
            Entity::Genre => "GENRE",
            Entity::Platform => "PLATFORM",
        }
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Entity::Game => "Game",
            Entity::Genre => "Genre",
            Entity::Platform => "Platform",
        })
    }
}

/// Errors reported by the catalog service. None of them are retried.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Per-field input problems; nothing was written.
    #[error("Validation failed")]
    Validation(ValidationErrors),

    /// The requested entity id does not resolve.
    #[error("{entity} not found")]
    NotFound { entity: Entity, id: i64 },

    /// A referenced id (genre, platform) does not exist.
    #[error("{entity} with ID {id} not found")]
    Referential { entity: Entity, id: i64 },

    /// Deleting would leave dangling references.
    #[error("{entity} {id} is still used by {count} game(s)")]
    InUse { entity: Entity, id: i64, count: usize },

    /// The store failed or is unreachable. Also covers a link/unlink failing part-way through a
    /// platform sync, in which case earlier calls stay applied.
    #[error("Database error: {0}")]
    Store(#[from] anyhow::Error),
}

impl From<ValidationErrors> for CatalogError {
    fn from(errors: ValidationErrors) -> Self {
        CatalogError::Validation(errors)
    }
}

pub type CatalogResult<T> = Result<T, CatalogError>;
