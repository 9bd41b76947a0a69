//! Centralized configuration (environment variables + defaults).

use crate::domain::sync::MissingLinkPolicy;
use anyhow::{Context, Result};

/// Which record store the server runs against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Postgres,
    Memory,
}

impl std::str::FromStr for Backend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(Backend::Postgres),
            "memory" => Ok(Backend::Memory),
            other => anyhow::bail!("unknown CATALOG_BACKEND '{}' (expected 'postgres' or 'memory')", other),
        }
    }
}

fn var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Database URL must be provided (no default) for safety.
pub fn database_url() -> Result<String> {
    var("DATABASE_URL").context("DATABASE_URL must be set")
}

pub fn catalog_backend() -> Result<Backend> {
    var("CATALOG_BACKEND").map_or(Ok(Backend::Postgres), |v| v.parse())
}

pub fn bind_addr() -> String {
    var("BIND_ADDR").unwrap_or_else(|| "0.0.0.0:3000".to_string())
}

/// Pool size (default 5).
pub fn max_connections() -> Result<u32> {
    match var("DB_MAX_CONNECTIONS") {
        Some(v) => Ok(v
            .trim()
            .parse::<u32>()
            .with_context(|| format!("DB_MAX_CONNECTIONS must be a valid u32, got '{}'", v))?
            .max(1)),
        None => Ok(5),
    }
}

pub fn missing_platform_policy() -> Result<MissingLinkPolicy> {
    var("MISSING_PLATFORM_POLICY").map_or(Ok(MissingLinkPolicy::default()), |v| v.parse())
}

/// Whether 500 responses carry the underlying store message.
pub fn expose_store_errors() -> Result<bool> {
    match var("EXPOSE_STORE_ERRORS") {
        None => Ok(false),
        Some(v) => match v.trim().to_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => anyhow::bail!("EXPOSE_STORE_ERRORS must be true or false, got '{}'", v),
        },
    }
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub backend: Backend,
    /// Only read for the postgres backend.
    pub database_url: Option<String>,
    pub bind_addr: String,
    pub max_connections: u32,
    pub missing_platforms: MissingLinkPolicy,
    pub expose_store_errors: bool,
}

impl Settings {
    /// Loads `.env` (if any) and reads every setting.
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();

        let backend = catalog_backend()?;
        let database_url = match backend {
            Backend::Postgres => Some(database_url()?),
            Backend::Memory => None,
        };
        Ok(Self {
            backend,
            database_url,
            bind_addr: bind_addr(),
            max_connections: max_connections()?,
            missing_platforms: missing_platform_policy()?,
            expose_store_errors: expose_store_errors()?,
        })
    }
}
