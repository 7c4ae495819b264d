use std::collections::HashMap;
use std::sync::Mutex;

use super::*;
use crate::cookies::{FileCookieJar, MemoryCookieJar};
use crate::net::error::{ApiFailure, AuthApiError};
use crate::net::types::UserToken;
use crate::router::MemoryRouter;
use crate::state::auth::AuthStore;

// =============================================================================
// Mocks
// =============================================================================

struct MockApi {
    sign_in: Result<UserToken, AuthApiError>,
    sign_up: Result<UserIdentity, AuthApiError>,
    valid_tokens: HashMap<String, UserIdentity>,
    calls: Mutex<Vec<String>>,
}

impl MockApi {
    fn new() -> Self {
        let mut valid_tokens = HashMap::new();
        valid_tokens.insert("abc".to_owned(), UserIdentity::new("1", "a@b.com"));
        Self {
            sign_in: Ok(UserToken { token: "abc".to_owned() }),
            sign_up: Ok(UserIdentity::new("2", "new@b.com")),
            valid_tokens,
            calls: Mutex::new(Vec::new()),
        }
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("mock mutex should lock").clone()
    }

    fn record(&self, call: &str) {
        self.calls.lock().expect("mock mutex should lock").push(call.to_owned());
    }
}

fn rejected(status: u16, message: &str) -> AuthApiError {
    AuthApiError::new(ApiFailure::ServerRejection { status, message: Some(message.to_owned()) })
}

#[async_trait::async_trait]
impl AuthApi for MockApi {
    async fn acquire_token(&self, _credentials: &Credentials) -> Result<UserToken, AuthApiError> {
        self.record("signin");
        self.sign_in.clone()
    }

    async fn create_account(&self, _credentials: &Credentials) -> Result<UserIdentity, AuthApiError> {
        self.record("signup");
        self.sign_up.clone()
    }

    async fn validate_token(&self, token: &str) -> Result<UserIdentity, AuthApiError> {
        self.record(&format!("users/me:{token}"));
        self.valid_tokens
            .get(token)
            .cloned()
            .ok_or_else(|| rejected(401, "Invalid token"))
    }
}

struct Harness {
    session: TokenSession,
    api: Arc<MockApi>,
    cookies: Arc<MemoryCookieJar>,
    store: AuthStore,
    router: Arc<MemoryRouter>,
}

fn harness(api: MockApi, cookies: MemoryCookieJar, path: &str) -> Harness {
    let api = Arc::new(api);
    let cookies = Arc::new(cookies);
    let store = AuthStore::new();
    let router = Arc::new(MemoryRouter::at(path));
    let session = TokenSession::new(
        api.clone(),
        cookies.clone(),
        Arc::new(store.clone()),
        router.clone(),
        SessionConfig::default(),
    );
    Harness { session, api, cookies, store, router }
}

fn creds() -> Credentials {
    Credentials::new("a@b.com", "secret")
}

// =============================================================================
// QueryResult
// =============================================================================

#[test]
fn success_result_serializes_without_error_field() {
    let json = serde_json::to_value(QueryResult::success()).unwrap();
    assert_eq!(json, serde_json::json!({ "success": true }));
}

#[test]
fn failure_result_serializes_error() {
    let json = serde_json::to_value(QueryResult::failure("X")).unwrap();
    assert_eq!(json, serde_json::json!({ "success": false, "error": "X" }));
}

#[test]
fn new_session_is_unknown() {
    let h = harness(MockApi::new(), MemoryCookieJar::new(), "/");
    assert_eq!(h.session.phase(), &SessionPhase::Unknown);
    assert!(h.session.identity().is_none());
}

// =============================================================================
// mount
// =============================================================================

#[tokio::test]
async fn mount_without_token_on_home_redirects_to_log_in() {
    let mut h = harness(MockApi::new(), MemoryCookieJar::new(), "/");
    h.session.mount().await;

    assert_eq!(h.router.history(), vec!["/sign-in".to_owned()]);
    assert!(h.api.calls().is_empty());
    assert_eq!(h.session.phase(), &SessionPhase::Unauthenticated);
}

#[tokio::test]
async fn mount_without_token_off_home_stays_put() {
    let mut h = harness(MockApi::new(), MemoryCookieJar::new(), "/sign-up");
    h.session.mount().await;

    assert!(h.router.history().is_empty());
    assert!(h.api.calls().is_empty());
    assert_eq!(h.session.phase(), &SessionPhase::Unauthenticated);
}

#[tokio::test]
async fn mount_with_empty_token_counts_as_missing() {
    let mut h = harness(MockApi::new(), MemoryCookieJar::with_cookie("jwt", ""), "/");
    h.session.mount().await;

    assert_eq!(h.router.history(), vec!["/sign-in".to_owned()]);
    assert!(h.api.calls().is_empty());
}

#[tokio::test]
async fn mount_with_valid_token_authorizes_and_navigates_home() {
    let mut h = harness(MockApi::new(), MemoryCookieJar::with_cookie("jwt", "abc"), "/sign-in");
    h.session.mount().await;

    let expected = UserIdentity::new("1", "a@b.com");
    assert_eq!(h.store.snapshot().user, Some(expected.clone()));
    assert_eq!(h.session.phase(), &SessionPhase::Authorized(expected.clone()));
    assert_eq!(h.session.identity(), Some(&expected));
    assert_eq!(h.router.history(), vec!["/".to_owned()]);
    assert_eq!(h.api.calls(), vec!["users/me:abc".to_owned()]);
}

#[tokio::test]
async fn mount_with_expired_token_logs_out_without_navigation() {
    let mut h = harness(MockApi::new(), MemoryCookieJar::with_cookie("jwt", "expired"), "/");
    h.store.user_authorized(UserIdentity::new("stale", "old@b.com"));
    h.session.mount().await;

    assert_eq!(h.cookies.get("jwt"), None);
    assert!(!h.store.snapshot().is_authorized());
    assert_eq!(h.session.phase(), &SessionPhase::Unauthenticated);
    assert!(h.router.history().is_empty());
}

#[tokio::test]
async fn remount_after_logout_redirects_from_home() {
    let mut h = harness(MockApi::new(), MemoryCookieJar::with_cookie("jwt", "expired"), "/");
    h.session.mount().await;
    h.session.mount().await;

    assert_eq!(h.router.history(), vec!["/sign-in".to_owned()]);
    assert_eq!(h.api.calls(), vec!["users/me:expired".to_owned()]);
}

// =============================================================================
// login
// =============================================================================

#[tokio::test]
async fn login_success_persists_lax_cookie_and_authorizes() {
    let mut h = harness(MockApi::new(), MemoryCookieJar::new(), "/sign-in");
    let result = h.session.login(&creds()).await;

    assert_eq!(result, QueryResult::success());
    assert!(result.error.is_none());
    let cookie = h.cookies.cookie("jwt").unwrap();
    assert_eq!(cookie.value(), "abc");
    assert_eq!(cookie.same_site(), Some(SameSite::Lax));
    assert!(cookie.max_age().is_none());
    assert_eq!(h.store.snapshot().user, Some(UserIdentity::new("1", "a@b.com")));
    assert_eq!(h.router.history(), vec!["/".to_owned()]);
    assert_eq!(h.api.calls(), vec!["signin".to_owned(), "users/me:abc".to_owned()]);
}

#[tokio::test]
async fn login_failure_returns_server_message_and_persists_nothing() {
    let mut api = MockApi::new();
    api.sign_in = Err(rejected(401, "Incorrect email or password"));
    let mut h = harness(api, MemoryCookieJar::new(), "/sign-in");

    let result = h.session.login(&creds()).await;

    assert_eq!(result, QueryResult::failure("Incorrect email or password"));
    assert_eq!(h.cookies.get("jwt"), None);
    assert_eq!(h.session.phase(), &SessionPhase::Unknown);
    assert!(h.router.history().is_empty());
}

#[tokio::test]
async fn login_failure_without_response_reports_no_response() {
    let mut api = MockApi::new();
    api.sign_in = Err(AuthApiError::new(ApiFailure::NoResponse));
    let mut h = harness(api, MemoryCookieJar::new(), "/sign-in");

    let result = h.session.login(&creds()).await;
    assert_eq!(result.error.as_deref(), Some("No response from the server."));
    assert!(!result.success);
}

#[tokio::test]
async fn login_failure_with_bare_status_reports_status() {
    let mut api = MockApi::new();
    api.sign_in = Err(AuthApiError::new(ApiFailure::ServerRejection { status: 503, message: None }));
    let mut h = harness(api, MemoryCookieJar::new(), "/sign-in");

    let result = h.session.login(&creds()).await;
    assert_eq!(result.error.as_deref(), Some("Error Status: 503"));
}

#[tokio::test]
async fn login_with_token_that_fails_validation_ends_logged_out() {
    let mut api = MockApi::new();
    api.sign_in = Ok(UserToken { token: "revoked".to_owned() });
    let mut h = harness(api, MemoryCookieJar::new(), "/sign-in");

    let result = h.session.login(&creds()).await;

    assert!(result.success);
    assert_eq!(h.cookies.get("jwt"), None);
    assert_eq!(h.session.phase(), &SessionPhase::Unauthenticated);
    assert!(!h.store.snapshot().is_authorized());
}

#[tokio::test]
async fn login_reports_cookie_write_failure() {
    let dir = tempfile::tempdir().unwrap();
    let api = Arc::new(MockApi::new());
    let jar = Arc::new(FileCookieJar::new(dir.path().join("missing").join("cookies")));
    let store = AuthStore::new();
    let mut session = TokenSession::new(
        api.clone(),
        jar,
        Arc::new(store.clone()),
        Arc::new(MemoryRouter::at("/sign-in")),
        SessionConfig::default(),
    );

    let result = session.login(&creds()).await;

    assert!(!result.success);
    assert!(result.error.unwrap().contains("could not be written"));
    assert_eq!(api.calls(), vec!["signin".to_owned()]);
    assert!(!store.snapshot().is_authorized());
}

// =============================================================================
// register
// =============================================================================

#[tokio::test]
async fn register_success_persists_nothing() {
    let h = harness(MockApi::new(), MemoryCookieJar::new(), "/sign-up");
    let result = h.session.register(&Credentials::new("new@b.com", "pw")).await;

    assert_eq!(result, QueryResult::success());
    assert_eq!(h.cookies.get("jwt"), None);
    assert!(!h.store.snapshot().is_authorized());
    assert!(h.router.history().is_empty());
}

#[tokio::test]
async fn register_failure_returns_message() {
    let mut api = MockApi::new();
    api.sign_up = Err(rejected(409, "User already exists"));
    let h = harness(api, MemoryCookieJar::new(), "/sign-up");

    let result = h.session.register(&creds()).await;
    assert_eq!(result, QueryResult::failure("User already exists"));
}

// =============================================================================
// logout
// =============================================================================

#[tokio::test]
async fn logout_clears_authorized_session() {
    let mut h = harness(MockApi::new(), MemoryCookieJar::with_cookie("jwt", "abc"), "/");
    h.session.mount().await;
    assert!(h.store.snapshot().is_authorized());

    h.session.logout();

    assert_eq!(h.cookies.get("jwt"), None);
    assert!(!h.store.snapshot().is_authorized());
    assert_eq!(h.session.phase(), &SessionPhase::Unauthenticated);
    assert!(h.session.identity().is_none());
}

#[test]
fn logout_without_prior_session_still_lands_logged_out() {
    let mut h = harness(MockApi::new(), MemoryCookieJar::new(), "/");
    h.session.logout();
    h.session.logout();

    assert_eq!(h.cookies.get("jwt"), None);
    assert_eq!(h.store.snapshot(), crate::state::auth::AuthState::default());
    assert_eq!(h.session.phase(), &SessionPhase::Unauthenticated);
    assert!(h.router.history().is_empty());
    assert!(h.api.calls().is_empty());
}

#[test]
fn custom_cookie_name_is_honored() {
    let config = AuthConfig { cookie_name: "session".to_owned(), ..AuthConfig::default() };
    let cookies = Arc::new(MemoryCookieJar::with_cookie("session", "abc"));
    let mut session = TokenSession::new(
        Arc::new(MockApi::new()),
        cookies.clone(),
        Arc::new(AuthStore::new()),
        Arc::new(MemoryRouter::at("/")),
        SessionConfig::from(&config),
    );
    session.logout();
    assert_eq!(cookies.get("session"), None);
}
