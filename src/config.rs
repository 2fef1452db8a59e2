use anyhow::{anyhow, Context, Result};
use std::env;
use std::time::Duration;

pub const DEFAULT_API_BASE_URL: &str = "https://statsapi.web.nhl.com/api/v1";
pub const DEFAULT_DATABASE_URL: &str = "sqlite://nhl-stats.sqlite3";

/// Configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub api_base_url: String,
    pub database_url: String,
    /// Minimum gap between game requests
    pub request_interval: Duration,
    pub http_timeout: Duration,
    pub db_connect_retries: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            database_url: DEFAULT_DATABASE_URL.to_string(),
            request_interval: Duration::from_millis(1000),
            http_timeout: Duration::from_secs(30),
            db_connect_retries: 5,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary variable source. Unset variables fall back to
    /// defaults; set-but-empty ones are rejected.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let read = |key: &str| -> Result<Option<String>> {
            match lookup(key) {
                Some(v) if v.trim().is_empty() => Err(anyhow!("{key} is set but empty")),
                Some(v) => Ok(Some(v.trim().to_string())),
                None => Ok(None),
            }
        };

        let api_base_url = read("NHL_API_BASE_URL")?.unwrap_or(defaults.api_base_url);
        let database_url = read("DATABASE_URL")?.unwrap_or(defaults.database_url);

        let request_interval = match read("REQUEST_INTERVAL_MS")? {
            Some(v) => Duration::from_millis(
                v.parse()
                    .with_context(|| format!("REQUEST_INTERVAL_MS is not a number: {v}"))?,
            ),
            None => defaults.request_interval,
        };
        if request_interval.is_zero() {
            return Err(anyhow!("REQUEST_INTERVAL_MS must be greater than zero"));
        }

        let http_timeout = match read("HTTP_TIMEOUT_SECONDS")? {
            Some(v) => Duration::from_secs(
                v.parse()
                    .with_context(|| format!("HTTP_TIMEOUT_SECONDS is not a number: {v}"))?,
            ),
            None => defaults.http_timeout,
        };

        let db_connect_retries = match read("DB_CONNECT_RETRIES")? {
            Some(v) => v
                .parse()
                .with_context(|| format!("DB_CONNECT_RETRIES is not a number: {v}"))?,
            None => defaults.db_connect_retries,
        };

        Ok(Self {
            api_base_url,
            database_url,
            request_interval,
            http_timeout,
            db_connect_retries: db_connect_retries.max(1),
        })
    }
}
