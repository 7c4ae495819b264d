//! Host router seam.
//!
//! SYSTEM CONTEXT
//! ==============
//! The session only needs the current path and a way to move elsewhere. A
//! browser shell implements [`Navigator`] over its real router; the CLI and
//! tests use [`MemoryRouter`].

#[cfg(test)]
#[path = "router_test.rs"]
mod router_test;

use std::sync::Mutex;

pub const HOME_PATH: &str = "/";
pub const LOG_IN_PATH: &str = "/sign-in";
pub const SIGN_UP_PATH: &str = "/sign-up";

/// Paths the session redirects between.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutePaths {
    pub home: String,
    pub log_in: String,
    pub sign_up: String,
}

impl Default for RoutePaths {
    fn default() -> Self {
        Self { home: HOME_PATH.to_owned(), log_in: LOG_IN_PATH.to_owned(), sign_up: SIGN_UP_PATH.to_owned() }
    }
}

/// Router capability injected by the host.
pub trait Navigator: Send + Sync {
    /// Path of the view currently mounted.
    fn pathname(&self) -> String;

    /// Navigate to `path`.
    fn navigate(&self, path: &str);
}

/// In-process router that remembers every navigation.
#[derive(Debug, Default)]
pub struct MemoryRouter {
    inner: Mutex<RouterInner>,
}

#[derive(Debug, Default)]
struct RouterInner {
    current: String,
    history: Vec<String>,
}

impl MemoryRouter {
    #[must_use]
    pub fn at(path: &str) -> Self {
        Self { inner: Mutex::new(RouterInner { current: path.to_owned(), history: Vec::new() }) }
    }

    /// Paths navigated to, oldest first. The starting path is not included.
    #[must_use]
    pub fn history(&self) -> Vec<String> {
        self.lock().history.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, RouterInner> {
        self.inner.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl Navigator for MemoryRouter {
    fn pathname(&self) -> String {
        self.lock().current.clone()
    }

    fn navigate(&self, path: &str) {
        let mut inner = self.lock();
        path.clone_into(&mut inner.current);
        inner.history.push(path.to_owned());
        tracing::debug!(%path, "navigate");
    }
}
