use std::env;
use std::str::FromStr;

use crate::error::AppError;

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// Process configuration, built once at startup and passed to whatever needs it.
#[derive(Debug, Clone)]
pub struct Config {
    /// Postgres connection string. When absent the server keeps tasks in memory.
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    pub server_host: String,
    pub server_port: u16,
    /// Shared secret used to verify bearer tokens issued by the auth provider.
    pub auth_secret: Option<String>,
    /// Allowed CORS origin. `None` allows any origin.
    pub cors_origin: Option<String>,
}

impl Config {
    /// Loads configuration from the process environment.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Loads configuration from an arbitrary key lookup.
    ///
    /// Empty values are treated as unset. `BETTER_AUTH_SECRET` takes precedence
    /// over `JWT_SECRET`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        Ok(Self {
            database_url: get("DATABASE_URL"),
            database_max_connections: parse_or(
                "DATABASE_MAX_CONNECTIONS",
                get("DATABASE_MAX_CONNECTIONS"),
                DEFAULT_MAX_CONNECTIONS,
            )?,
            server_host: get("SERVER_HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            server_port: parse_or("SERVER_PORT", get("SERVER_PORT"), DEFAULT_PORT)?,
            auth_secret: get("BETTER_AUTH_SECRET").or_else(|| get("JWT_SECRET")),
            cors_origin: get("CORS_ORIGIN"),
        })
    }

    pub fn server_url(&self) -> String {
        format!("http://{}:{}", self.server_host, self.server_port)
    }
}

fn parse_or<T: FromStr>(key: &str, raw: Option<String>, default: T) -> Result<T, AppError> {
    match raw {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| AppError::Configuration(format!("{} must be a number, got {:?}", key, value))),
        None => Ok(default),
    }
}
