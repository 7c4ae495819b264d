//! Token persistence over cookies.
//!
//! DESIGN
//! ======
//! The session token lives in a single session-scoped cookie (`SameSite=Lax`,
//! path `/`, no `Max-Age`). [`MemoryCookieJar`] stands in for the browser's
//! cookie store; [`FileCookieJar`] keeps one `Set-Cookie` line per cookie on
//! disk so a CLI session survives between invocations.

#[cfg(test)]
#[path = "cookies_test.rs"]
mod cookies_test;

use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use cookie::{Cookie, CookieJar};
pub use cookie::SameSite;

#[derive(Debug, thiserror::Error)]
pub enum CookieError {
    #[error("cookie file {} could not be written: {source}", path.display())]
    Write { path: PathBuf, source: std::io::Error },

    #[error("cookie file {} could not be read: {source}", path.display())]
    Read { path: PathBuf, source: std::io::Error },
}

/// Cookie store capability injected by the host.
pub trait TokenStore: Send + Sync {
    fn get(&self, name: &str) -> Option<String>;

    /// Write `name=value` as a session cookie with the given `SameSite` policy.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store rejects the write.
    fn set(&self, name: &str, value: &str, same_site: SameSite) -> Result<(), CookieError>;

    /// Remove `name`. Removing a missing cookie succeeds.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store rejects the write.
    fn remove(&self, name: &str) -> Result<(), CookieError>;
}

/// Build the session cookie written for a token.
#[must_use]
pub fn session_cookie(name: &str, value: &str, same_site: SameSite) -> Cookie<'static> {
    Cookie::build((name.to_owned(), value.to_owned()))
        .path("/")
        .same_site(same_site)
        .build()
}

// =============================================================================
// MEMORY JAR
// =============================================================================

#[derive(Debug, Default)]
pub struct MemoryCookieJar {
    jar: Mutex<CookieJar>,
}

impl MemoryCookieJar {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Jar pre-seeded with one cookie, as a browser would present it.
    #[must_use]
    pub fn with_cookie(name: &str, value: &str) -> Self {
        let mut jar = CookieJar::new();
        jar.add(session_cookie(name, value, SameSite::Lax));
        Self { jar: Mutex::new(jar) }
    }

    /// Full cookie including attributes.
    #[must_use]
    pub fn cookie(&self, name: &str) -> Option<Cookie<'static>> {
        self.jar.lock().unwrap_or_else(PoisonError::into_inner).get(name).cloned()
    }
}

impl TokenStore for MemoryCookieJar {
    fn get(&self, name: &str) -> Option<String> {
        self.cookie(name).map(|c| c.value().to_owned())
    }

    fn set(&self, name: &str, value: &str, same_site: SameSite) -> Result<(), CookieError> {
        self.jar
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .add(session_cookie(name, value, same_site));
        Ok(())
    }

    fn remove(&self, name: &str) -> Result<(), CookieError> {
        self.jar
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(Cookie::new(name.to_owned(), ""));
        Ok(())
    }
}

// =============================================================================
// FILE JAR
// =============================================================================

#[derive(Debug, Clone)]
pub struct FileCookieJar {
    path: PathBuf,
}

impl FileCookieJar {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<Vec<Cookie<'static>>, CookieError> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => return Err(CookieError::Read { path: self.path.clone(), source }),
        };
        let cookies = raw
            .lines()
            .filter(|line| !line.trim().is_empty())
            .filter_map(|line| match Cookie::parse(line.to_owned()) {
                Ok(cookie) => Some(cookie),
                Err(e) => {
                    tracing::warn!(path = %self.path.display(), error = %e, "skipping malformed cookie line");
                    None
                }
            })
            .collect();
        Ok(cookies)
    }

    fn store(&self, cookies: &[Cookie<'static>]) -> Result<(), CookieError> {
        let mut out = String::new();
        for cookie in cookies {
            out.push_str(&cookie.to_string());
            out.push('\n');
        }
        std::fs::write(&self.path, out).map_err(|source| CookieError::Write { path: self.path.clone(), source })
    }
}

impl TokenStore for FileCookieJar {
    fn get(&self, name: &str) -> Option<String> {
        match self.load() {
            Ok(cookies) => cookies.into_iter().find(|c| c.name() == name).map(|c| c.value().to_owned()),
            Err(e) => {
                tracing::warn!(error = %e, "cookie file unreadable, treating as empty");
                None
            }
        }
    }

    fn set(&self, name: &str, value: &str, same_site: SameSite) -> Result<(), CookieError> {
        let mut cookies = self.load()?;
        cookies.retain(|c| c.name() != name);
        cookies.push(session_cookie(name, value, same_site));
        self.store(&cookies)
    }

    fn remove(&self, name: &str) -> Result<(), CookieError> {
        let mut cookies = self.load()?;
        let before = cookies.len();
        cookies.retain(|c| c.name() != name);
        if cookies.len() == before {
            return Ok(());
        }
        self.store(&cookies)
    }
}
