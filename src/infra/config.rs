//! Centralized configuration (environment variables + defaults).

use anyhow::Context;
use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
pub const DEFAULT_CORS_ORIGIN: &str = "http://localhost:5173";
pub const DEFAULT_STORAGE_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_DB_MAX_CONNECTIONS: u32 = 5;

/// Which `CarCollection` implementation backs the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Postgres,
    Memory,
}

#[derive(Debug, Error)]
#[error("unknown storage backend '{0}' (expected 'postgres' or 'memory')")]
pub struct BackendParseError(String);

impl FromStr for StorageBackend {
    type Err = BackendParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(StorageBackend::Postgres),
            "memory" | "in-memory" => Ok(StorageBackend::Memory),
            other => Err(BackendParseError(other.to_string())),
        }
    }
}

fn var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Parses `raw` as `T`, falling back to `default` when unset.
pub fn parse_or_default<T>(name: &str, raw: Option<String>, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    match raw {
        Some(v) => v
            .trim()
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("{} has an invalid value '{}': {}", name, v, e)),
        None => Ok(default),
    }
}

/// Splits a comma-separated origin list, dropping blanks.
pub fn split_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .map(str::to_string)
        .collect()
}

/// Database URL must be provided (no default) for the Postgres backend.
pub fn database_url() -> anyhow::Result<String> {
    var("DATABASE_URL").context("DATABASE_URL must be set")
}

/// Storage backend (`postgres` by default).
pub fn storage_backend() -> anyhow::Result<StorageBackend> {
    parse_or_default("STORAGE_BACKEND", var("STORAGE_BACKEND"), StorageBackend::Postgres)
}

/// Connection pool size for the Postgres backend.
pub fn db_max_connections() -> anyhow::Result<u32> {
    let n = parse_or_default(
        "DB_MAX_CONNECTIONS",
        var("DB_MAX_CONNECTIONS"),
        DEFAULT_DB_MAX_CONNECTIONS,
    )?;
    Ok(n.max(1))
}

/// Address the HTTP server listens on.
pub fn bind_addr() -> String {
    var("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
}

/// Origins allowed by CORS.
pub fn cors_allowed_origins() -> Vec<String> {
    let origins = split_origins(&var("CORS_ALLOWED_ORIGINS").unwrap_or_default());
    if origins.is_empty() {
        vec![DEFAULT_CORS_ORIGIN.to_string()]
    } else {
        origins
    }
}

/// Deadline applied to every storage call.
pub fn storage_timeout() -> anyhow::Result<Duration> {
    let secs = parse_or_default(
        "STORAGE_TIMEOUT_SECS",
        var("STORAGE_TIMEOUT_SECS"),
        DEFAULT_STORAGE_TIMEOUT_SECS,
    )?;
    if secs == 0 {
        anyhow::bail!("STORAGE_TIMEOUT_SECS must be greater than zero");
    }
    Ok(Duration::from_secs(secs))
}

/// `LOG_FORMAT=json` switches logs to JSON lines.
pub fn json_logs() -> bool {
    var("LOG_FORMAT").is_some_and(|v| v.eq_ignore_ascii_case("json"))
}
