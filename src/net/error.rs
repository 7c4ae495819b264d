//! Auth API failure taxonomy and message normalization.
//!
//! ERROR HANDLING
//! ==============
//! Every failure collapses into one display string picked by an ordered
//! fallback chain:
//!
//! 1. the server's `{error}` string
//! 2. `Error Status: <code>` when any response came back
//! 3. `No response from the server.` when the request went out unanswered
//! 4. the transport's own message
//! 5. `An unknown error occurred.`
//!
//! The chain lives in [`ApiFailure::message`] and nowhere else.

#[cfg(test)]
#[path = "error_test.rs"]
mod error_test;

pub const NO_RESPONSE_MESSAGE: &str = "No response from the server.";
pub const UNKNOWN_ERROR_MESSAGE: &str = "An unknown error occurred.";

/// Where a request failed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ApiFailure {
    /// The server answered with a non-success status.
    ServerRejection { status: u16, message: Option<String> },
    /// The request was sent but nothing came back.
    NoResponse,
    /// The request never completed on our side (build, decode, body errors).
    ClientFailure(String),
    /// Nothing more specific is known.
    Unknown,
}

impl ApiFailure {
    /// Classify a transport error from `reqwest`.
    #[must_use]
    pub fn from_reqwest(err: &reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            return Self::ServerRejection { status: status.as_u16(), message: None };
        }
        if err.is_builder() {
            return Self::ClientFailure(err.to_string());
        }
        if err.is_connect() || err.is_timeout() || err.is_request() {
            return Self::NoResponse;
        }
        if err.is_decode() || err.is_body() {
            return Self::ClientFailure(err.to_string());
        }
        Self::Unknown
    }

    /// Normalized message for this failure.
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::ServerRejection { message: Some(message), .. } if !message.is_empty() => message.clone(),
            Self::ServerRejection { status, .. } => format!("Error Status: {status}"),
            Self::NoResponse => NO_RESPONSE_MESSAGE.to_owned(),
            Self::ClientFailure(message) if !message.is_empty() => message.clone(),
            Self::ClientFailure(_) | Self::Unknown => UNKNOWN_ERROR_MESSAGE.to_owned(),
        }
    }
}

/// Failure of one auth API call. Displays as the normalized message only.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct AuthApiError {
    failure: ApiFailure,
    message: String,
}

impl AuthApiError {
    #[must_use]
    pub fn new(failure: ApiFailure) -> Self {
        let message = failure.message();
        Self { failure, message }
    }

    #[must_use]
    pub fn failure(&self) -> &ApiFailure {
        &self.failure
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// HTTP status if the server answered.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self.failure {
            ApiFailure::ServerRejection { status, .. } => Some(status),
            _ => None,
        }
    }
}

impl From<ApiFailure> for AuthApiError {
    fn from(failure: ApiFailure) -> Self {
        Self::new(failure)
    }
}

impl From<reqwest::Error> for AuthApiError {
    fn from(err: reqwest::Error) -> Self {
        Self::new(ApiFailure::from_reqwest(&err))
    }
}
