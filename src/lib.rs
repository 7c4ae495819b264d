//! Token authentication glue for the `register.nomoreparties.co` auth API.
//!
//! ARCHITECTURE
//! ============
//! `net` talks to the remote sign-in/sign-up API and normalizes every failure
//! into one human-readable message. `session` drives the cookie-persisted
//! token through an explicit phase machine and pushes the outcome into the
//! host's session store and router, which are injected as traits (`state`,
//! `router`, `cookies`) so the same logic runs in a browser shell, a CLI or a
//! test.

pub mod config;
pub mod cookies;
pub mod net;
pub mod router;
pub mod session;
pub mod state;

pub use config::{AuthConfig, ConfigError};
pub use cookies::{CookieError, FileCookieJar, MemoryCookieJar, TokenStore};
pub use net::api::{AuthApi, AuthClient};
pub use net::error::{ApiFailure, AuthApiError};
pub use net::types::{Credentials, UserIdentity, UserToken};
pub use router::{MemoryRouter, Navigator, RoutePaths};
pub use session::{QueryResult, SessionConfig, SessionPhase, TokenSession};
pub use state::auth::{AuthState, AuthStore, SessionStore};
