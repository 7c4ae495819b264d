//! Cookie-persisted token session.
//!
//! DESIGN
//! ======
//! The session is an explicit phase machine:
//!
//! ```text
//! Unknown --mount--> Checking --valid--> Authorized
//!    |                   |
//!    |                   +--invalid--> (logout) Unauthenticated
//!    +--mount, no token--> Unauthenticated
//! ```
//!
//! `mount` is the only external trigger. A successful `login` enters
//! `Checking` directly with the fresh token, and `logout` always lands in
//! `Unauthenticated`. Nothing re-enters `mount` on its own.
//!
//! ERROR HANDLING
//! ==============
//! `login` and `register` never propagate failures; they return a
//! [`QueryResult`] the view can render. A token that fails validation is
//! logged and degraded to a logout rather than surfaced.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use std::sync::Arc;

use serde::Serialize;

use crate::config::AuthConfig;
use crate::cookies::{SameSite, TokenStore};
use crate::net::api::AuthApi;
use crate::net::types::{Credentials, UserIdentity};
use crate::router::{Navigator, RoutePaths};
use crate::state::auth::SessionStore;

/// Where the session currently stands.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum SessionPhase {
    /// Not mounted yet.
    #[default]
    Unknown,
    /// A token is persisted but not yet confirmed by the server.
    Checking,
    /// The server confirmed the token.
    Authorized(UserIdentity),
    /// No usable token.
    Unauthenticated,
}

/// Outcome of `login` / `register` as handed to the view.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct QueryResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl QueryResult {
    #[must_use]
    pub fn success() -> Self {
        Self { success: true, error: None }
    }

    #[must_use]
    pub fn failure(error: impl Into<String>) -> Self {
        Self { success: false, error: Some(error.into()) }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    pub cookie_name: String,
    pub routes: RoutePaths,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::from(&AuthConfig::default())
    }
}

impl From<&AuthConfig> for SessionConfig {
    fn from(config: &AuthConfig) -> Self {
        Self { cookie_name: config.cookie_name.clone(), routes: config.routes.clone() }
    }
}

/// Session controller wired to the host's collaborators.
pub struct TokenSession {
    api: Arc<dyn AuthApi>,
    cookies: Arc<dyn TokenStore>,
    store: Arc<dyn SessionStore>,
    router: Arc<dyn Navigator>,
    config: SessionConfig,
    phase: SessionPhase,
}

impl TokenSession {
    #[must_use]
    pub fn new(
        api: Arc<dyn AuthApi>,
        cookies: Arc<dyn TokenStore>,
        store: Arc<dyn SessionStore>,
        router: Arc<dyn Navigator>,
        config: SessionConfig,
    ) -> Self {
        Self { api, cookies, store, router, config, phase: SessionPhase::Unknown }
    }

    #[must_use]
    pub fn phase(&self) -> &SessionPhase {
        &self.phase
    }

    #[must_use]
    pub fn identity(&self) -> Option<&UserIdentity> {
        match &self.phase {
            SessionPhase::Authorized(identity) => Some(identity),
            _ => None,
        }
    }

    /// Run the mount-time check.
    ///
    /// Without a token, redirects from the home view to the log-in view and
    /// makes no network call. With one, validates it remotely.
    pub async fn mount(&mut self) {
        let token = self
            .cookies
            .get(&self.config.cookie_name)
            .filter(|token| !token.is_empty());

        let Some(token) = token else {
            self.phase = SessionPhase::Unauthenticated;
            let pathname = self.router.pathname();
            if pathname == self.config.routes.home {
                tracing::info!(from = %pathname, to = %self.config.routes.log_in, "no session token, redirecting");
                self.router.navigate(&self.config.routes.log_in);
            }
            return;
        };

        self.confirm(&token).await;
    }

    /// Sign in and persist the issued token.
    ///
    /// Success only means a token was issued and stored; the follow-up
    /// validation settles the phase the same way `mount` does.
    pub async fn login(&mut self, credentials: &Credentials) -> QueryResult {
        let token = match self.api.acquire_token(credentials).await {
            Ok(body) => body.token,
            Err(e) => return QueryResult::failure(e.message()),
        };

        if let Err(e) = self.cookies.set(&self.config.cookie_name, &token, SameSite::Lax) {
            tracing::error!(error = %e, "failed to persist session token");
            return QueryResult::failure(e.to_string());
        }

        self.confirm(&token).await;
        QueryResult::success()
    }

    /// Create an account. Persists nothing.
    pub async fn register(&self, credentials: &Credentials) -> QueryResult {
        match self.api.create_account(credentials).await {
            Ok(identity) => {
                tracing::info!(user_id = %identity.id, "account created");
                QueryResult::success()
            }
            Err(e) => QueryResult::failure(e.message()),
        }
    }

    /// Drop the token and the identity, whatever the current phase.
    pub fn logout(&mut self) {
        if let Err(e) = self.cookies.remove(&self.config.cookie_name) {
            tracing::warn!(error = %e, "failed to remove session token");
        }
        self.phase = SessionPhase::Unauthenticated;
        self.store.user_logged_out();
    }

    async fn confirm(&mut self, token: &str) {
        self.phase = SessionPhase::Checking;
        match self.api.validate_token(token).await {
            Ok(identity) => {
                self.store.user_authorized(identity.clone());
                self.phase = SessionPhase::Authorized(identity);
                self.router.navigate(&self.config.routes.home);
            }
            Err(e) => {
                tracing::error!(error = %e, "error validating token");
                self.logout();
            }
        }
    }
}
