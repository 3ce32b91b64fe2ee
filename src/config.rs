use std::{env, fmt::Display, str::FromStr};

use log::{info, warn};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Enviroment variable: '{0}' not set")]
    Missing(&'static str),
    #[error("Invalid value for '{key}': {reason}")]
    Invalid { key: &'static str, reason: String },
}

/// Which [`DocumentStore`](crate::database::DocumentStore) backend to open
#[derive(Debug, Clone, PartialEq)]
pub enum StoreKind {
    Redis,
    Memory,
}

impl FromStr for StoreKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "redis" => Ok(StoreKind::Redis),
            "memory" => Ok(StoreKind::Memory),
            other => Err(format!("unknown store '{}'", other)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    /// Secret the session tokens are signed with
    pub access_token_secret: String,
    /// Browser origin allowed to call the API with credentials
    pub client_origin: String,
    pub store: StoreKind,
    pub redis_url: String,
}

impl Config {
    /// Reads the configuration from the enviroment. Call `dotenv()` first
    /// to pick up a `.env` file.
    pub fn from_env() -> Result<Config, ConfigError> {
        Ok(Config {
            port: try_load("PORT", "5000")?,
            access_token_secret: env::var("ACCESS_TOKEN_SECRET")
                .map_err(|_| ConfigError::Missing("ACCESS_TOKEN_SECRET"))?,
            client_origin: try_load("CLIENT_ORIGIN", "http://localhost:5173")?,
            store: try_load("BLOG_STORE", "redis")?,
            redis_url: redis_url(),
        })
    }
}

fn try_load<T: FromStr>(key: &'static str, default: &str) -> Result<T, ConfigError>
where
    T::Err: Display,
{
    env::var(key)
        .unwrap_or_else(|_| {
            info!("{} not set, using default: {}", key, default);
            default.to_string()
        })
        .parse()
        .map_err(|e: T::Err| {
            warn!("Invalid {} value: {}", key, e);
            ConfigError::Invalid {
                key,
                reason: e.to_string(),
            }
        })
}

/// `REDIS_URL` when set, otherwise built from the `DB_*` credentials
fn redis_url() -> String {
    if let Ok(url) = env::var("REDIS_URL") {
        return url;
    }
    let host = env::var("DB_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());

    match (env::var("DB_USER"), env::var("DB_PASSWORD")) {
        (Ok(user), Ok(password)) => format!("redis://{}:{}@{}/", user, password, host),
        (Err(_), Ok(password)) => format!("redis://:{}@{}/", password, host),
        _ => format!("redis://{}/", host),
    }
}
