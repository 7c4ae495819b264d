//! Runtime configuration parsed from environment variables.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use std::time::Duration;

use crate::router::RoutePaths;

pub const DEFAULT_BASE_URL: &str = "https://register.nomoreparties.co";
pub const DEFAULT_COOKIE_NAME: &str = "jwt";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A numeric setting could not be parsed.
    #[error("invalid value for {key}: {value:?}")]
    InvalidNumber { key: &'static str, value: String },

    /// A setting was present but empty.
    #[error("{key} must not be empty")]
    Empty { key: &'static str },

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
}

/// Transport timeouts. `None` leaves the transport default in place.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HttpTimeouts {
    pub request: Option<Duration>,
    pub connect: Option<Duration>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthConfig {
    pub base_url: String,
    pub cookie_name: String,
    pub routes: RoutePaths,
    pub timeouts: HttpTimeouts,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            cookie_name: DEFAULT_COOKIE_NAME.to_owned(),
            routes: RoutePaths::default(),
            timeouts: HttpTimeouts::default(),
        }
    }
}

impl AuthConfig {
    /// Build typed config from environment variables.
    ///
    /// All optional:
    /// - `TOKENAUTH_BASE_URL`: API base URL, trailing `/` trimmed
    /// - `TOKENAUTH_COOKIE_NAME`: default `jwt`
    /// - `TOKENAUTH_HOME_PATH` / `TOKENAUTH_LOGIN_PATH` / `TOKENAUTH_SIGNUP_PATH`
    /// - `TOKENAUTH_REQUEST_TIMEOUT_SECS` / `TOKENAUTH_CONNECT_TIMEOUT_SECS`
    ///
    /// # Errors
    ///
    /// Returns an error if a value is empty or a timeout is not an integer.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`AuthConfig::from_env`] with an explicit variable source.
    ///
    /// # Errors
    ///
    /// Returns an error if a value is empty or a timeout is not an integer.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let base_url = non_empty(&lookup, "TOKENAUTH_BASE_URL")?
            .unwrap_or(defaults.base_url)
            .trim_end_matches('/')
            .to_owned();
        let cookie_name = non_empty(&lookup, "TOKENAUTH_COOKIE_NAME")?.unwrap_or(defaults.cookie_name);
        let routes = RoutePaths {
            home: non_empty(&lookup, "TOKENAUTH_HOME_PATH")?.unwrap_or(defaults.routes.home),
            log_in: non_empty(&lookup, "TOKENAUTH_LOGIN_PATH")?.unwrap_or(defaults.routes.log_in),
            sign_up: non_empty(&lookup, "TOKENAUTH_SIGNUP_PATH")?.unwrap_or(defaults.routes.sign_up),
        };
        let timeouts = HttpTimeouts {
            request: parse_secs(&lookup, "TOKENAUTH_REQUEST_TIMEOUT_SECS")?,
            connect: parse_secs(&lookup, "TOKENAUTH_CONNECT_TIMEOUT_SECS")?,
        };
        Ok(Self { base_url, cookie_name, routes, timeouts })
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        base_url.trim_end_matches('/').clone_into(&mut self.base_url);
        self
    }
}

fn non_empty<F>(lookup: &F, key: &'static str) -> Result<Option<String>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) if raw.trim().is_empty() => Err(ConfigError::Empty { key }),
        Some(raw) => Ok(Some(raw.trim().to_owned())),
    }
}

fn parse_secs<F>(lookup: &F, key: &'static str) -> Result<Option<Duration>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = non_empty(lookup, key)? else {
        return Ok(None);
    };
    raw.parse::<u64>()
        .map(|secs| Some(Duration::from_secs(secs)))
        .map_err(|_| ConfigError::InvalidNumber { key, value: raw })
}
