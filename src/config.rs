// src/config.rs

use std::{env, net::SocketAddr, path::PathBuf, str::FromStr, time::Duration};

use dotenvy::dotenv;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Postgres connection string. `None` runs the service on the in-memory store.
    pub database_url: Option<String>,
    pub jwt_secret: String,
    /// Token lifetime in seconds.
    pub jwt_expiration: u64,
    pub rust_log: String,
    /// Root of the `<language>/<chapter>.json` quiz files.
    pub quiz_data_dir: PathBuf,
    pub bind_addr: SocketAddr,
    /// Sessions idle for longer than this are dropped.
    pub session_ttl_secs: i64,
    /// How long a submit waits for persistence before answering anyway.
    pub persist_timeout_ms: u64,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL").filter(|url| !url.trim().is_empty());

        let jwt_secret = lookup("JWT_SECRET")
            .filter(|secret| !secret.is_empty())
            .ok_or(ConfigError::Missing("JWT_SECRET"))?;

        let rust_log = lookup("RUST_LOG").unwrap_or_else(|| "info".to_string());

        let quiz_data_dir = lookup("QUIZ_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("data"));

        Ok(Self {
            database_url,
            jwt_secret,
            jwt_expiration: parse_or(&lookup, "JWT_EXPIRATION_SECS", 86_400)?,
            rust_log,
            quiz_data_dir,
            bind_addr: parse_or(&lookup, "BIND_ADDR", SocketAddr::from(([0, 0, 0, 0], 3000)))?,
            session_ttl_secs: parse_or(&lookup, "SESSION_TTL_SECS", 7_200)?,
            persist_timeout_ms: parse_or(&lookup, "PERSIST_TIMEOUT_MS", 3_000)?,
        })
    }

    pub fn persist_timeout(&self) -> Duration {
        Duration::from_millis(self.persist_timeout_ms)
    }
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value: raw }),
        None => Ok(default),
    }
}
