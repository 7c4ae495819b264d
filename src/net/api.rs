//! REST client for the remote auth API.
//!
//! ENDPOINTS
//! =========
//! - `POST /signin`   credentials -> `{token}`
//! - `POST /signup`   credentials -> `{data:{_id,email}}`
//! - `GET  /users/me` bearer token -> `{data:{_id,email}}`
//!
//! ERROR HANDLING
//! ==============
//! Each call returns `AuthApiError` carrying one normalized message (see
//! `net::error`). No retries and no caching; timeouts only when configured.

#[cfg(test)]
#[path = "api_test.rs"]
mod api_test;

use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::de::DeserializeOwned;

use super::error::{ApiFailure, AuthApiError};
use super::types::{AuthApiErrorBody, Credentials, UserIdentifiers, UserIdentity, UserToken};
use crate::config::{AuthConfig, ConfigError, HttpTimeouts};

pub const SIGN_IN_PATH: &str = "/signin";
pub const SIGN_UP_PATH: &str = "/signup";
pub const CURRENT_USER_PATH: &str = "/users/me";

/// Remote auth operations the session depends on.
#[async_trait::async_trait]
pub trait AuthApi: Send + Sync {
    /// Exchange credentials for a session token.
    async fn acquire_token(&self, credentials: &Credentials) -> Result<UserToken, AuthApiError>;

    /// Create an account. Does not sign the user in.
    async fn create_account(&self, credentials: &Credentials) -> Result<UserIdentity, AuthApiError>;

    /// Resolve a token to the identity it was issued for.
    async fn validate_token(&self, token: &str) -> Result<UserIdentity, AuthApiError>;
}

/// `reqwest`-backed [`AuthApi`].
#[derive(Debug, Clone)]
pub struct AuthClient {
    http: reqwest::Client,
    base_url: String,
}

impl AuthClient {
    /// Build a client for `base_url` (trailing `/` ignored).
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(base_url: &str, timeouts: HttpTimeouts) -> Result<Self, ConfigError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let mut builder = reqwest::Client::builder().default_headers(headers);
        if let Some(timeout) = timeouts.request {
            builder = builder.timeout(timeout);
        }
        if let Some(timeout) = timeouts.connect {
            builder = builder.connect_timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| ConfigError::HttpClientBuild(e.to_string()))?;

        Ok(Self { http, base_url: base_url.trim_end_matches('/').to_owned() })
    }

    /// Build a client from typed config.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn from_config(config: &AuthConfig) -> Result<Self, ConfigError> {
        Self::new(&config.base_url, config.timeouts)
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send<T: DeserializeOwned>(&self, path: &str, request: reqwest::RequestBuilder) -> Result<T, AuthApiError> {
        let response = request.send().await.map_err(|e| {
            let err = AuthApiError::from(e);
            tracing::warn!(%path, error = %err, "auth request failed");
            err
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.bytes().await.unwrap_or_default();
            let message = serde_json::from_slice::<AuthApiErrorBody>(&body)
                .ok()
                .and_then(|b| b.error);
            let err = AuthApiError::new(ApiFailure::ServerRejection { status: status.as_u16(), message });
            tracing::warn!(%path, status = status.as_u16(), error = %err, "auth request rejected");
            return Err(err);
        }

        response.json::<T>().await.map_err(AuthApiError::from)
    }
}

#[async_trait::async_trait]
impl AuthApi for AuthClient {
    async fn acquire_token(&self, credentials: &Credentials) -> Result<UserToken, AuthApiError> {
        tracing::debug!(email = %credentials.email, "requesting token");
        let request = self.http.post(self.url(SIGN_IN_PATH)).json(credentials);
        self.send(SIGN_IN_PATH, request).await
    }

    async fn create_account(&self, credentials: &Credentials) -> Result<UserIdentity, AuthApiError> {
        tracing::debug!(email = %credentials.email, "creating account");
        let request = self.http.post(self.url(SIGN_UP_PATH)).json(credentials);
        let body: UserIdentifiers = self.send(SIGN_UP_PATH, request).await?;
        Ok(body.into())
    }

    async fn validate_token(&self, token: &str) -> Result<UserIdentity, AuthApiError> {
        let request = self.http.get(self.url(CURRENT_USER_PATH)).bearer_auth(token);
        let body: UserIdentifiers = self.send(CURRENT_USER_PATH, request).await?;
        Ok(body.into())
    }
}
