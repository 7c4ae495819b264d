//! Auth-session state for the current user.
//!
//! SYSTEM CONTEXT
//! ==============
//! The session pushes exactly two transitions into the host's global store:
//! a confirmed identity or a logout. Views read [`AuthState`] to decide what
//! to render.

#[cfg(test)]
#[path = "auth_test.rs"]
mod auth_test;

use std::sync::{Arc, PoisonError, RwLock};

use crate::net::types::UserIdentity;

/// Global store capability injected by the host.
pub trait SessionStore: Send + Sync {
    fn user_authorized(&self, identity: UserIdentity);
    fn user_logged_out(&self);
}

/// Snapshot of the authenticated user, if any.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AuthState {
    pub user: Option<UserIdentity>,
}

impl AuthState {
    #[must_use]
    pub fn is_authorized(&self) -> bool {
        self.user.is_some()
    }
}

/// Shared in-process store. Clones observe the same state.
#[derive(Clone, Debug, Default)]
pub struct AuthStore {
    inner: Arc<RwLock<AuthState>>,
}

impl AuthStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn snapshot(&self) -> AuthState {
        self.inner.read().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

impl SessionStore for AuthStore {
    fn user_authorized(&self, identity: UserIdentity) {
        tracing::info!(user_id = %identity.id, "user authorized");
        self.inner.write().unwrap_or_else(PoisonError::into_inner).user = Some(identity);
    }

    fn user_logged_out(&self) {
        tracing::info!("user logged out");
        self.inner.write().unwrap_or_else(PoisonError::into_inner).user = None;
    }
}
