/*
 * Responsibility
 * - Load .env (optional, but a broken one is an error) before anything reads the environment
 * - Read and validate settings up front so a bad value fails startup, not a request
 */
use std::net::{IpAddr, SocketAddr};
use std::path::Path;

use thiserror::Error;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    fn parse(raw: Option<&str>) -> Self {
        match raw.unwrap_or("development").to_ascii_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid configuration: {0}")]
    Invalid(&'static str),

    #[error("failed to load .env: {0}")]
    EnvFile(#[from] dotenvy::Error),
}

/// Load `.env` (or `path` when given) into the process environment.
///
/// A missing file is fine. A file that exists but cannot be read or parsed is not.
/// Variables already set in the environment win over the file.
pub fn load_env_file(path: Option<&Path>) -> Result<(), ConfigError> {
    let loaded = match path {
        Some(path) => dotenvy::from_path(path),
        None => dotenvy::dotenv().map(drop),
    };

    match loaded {
        Ok(()) => Ok(()),
        Err(err) if err.not_found() => Ok(()),
        Err(err) => Err(err.into()),
    }
}

#[derive(Clone, Debug)]
pub struct Config {
    pub addr: SocketAddr,
    pub app_env: AppEnv,
    /// Only when `APP_ENV` explicitly names development.
    /// Otherwise a panicking request takes down its own task, not the process.
    pub abort_on_panic: bool,
}

impl Config {
    /// Read settings from the process environment. Call [`load_env_file`] first.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let host: IpAddr = lookup("HOST")
            .as_deref()
            .unwrap_or(DEFAULT_HOST)
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid("HOST"))?;

        let port: u16 = match lookup("PORT") {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|_| ConfigError::Invalid("PORT"))?,
            None => DEFAULT_PORT,
        };

        let raw_env = lookup("APP_ENV");
        let app_env = AppEnv::parse(raw_env.as_deref());
        let abort_on_panic = raw_env.as_deref().is_some_and(|raw| {
            matches!(raw.trim().to_ascii_lowercase().as_str(), "development" | "dev")
        });

        Ok(Self {
            addr: SocketAddr::new(host, port),
            app_env,
            abort_on_panic,
        })
    }
}
