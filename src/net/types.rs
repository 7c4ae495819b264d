//! Wire DTOs for the auth API.
//!
//! DESIGN
//! ======
//! Sign-in answers with a flat `{token}` while sign-up and `/users/me` wrap
//! the user in a `{data:{_id,email}}` envelope. Both shapes are kept as the
//! server sends them; callers only ever see `UserToken` and `UserIdentity`.

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;

use std::fmt;

use serde::{Deserialize, Serialize};

/// Email + password pair posted to `/signin` and `/signup`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    #[must_use]
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self { email: email.into(), password: password.into() }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Successful `/signin` body.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserToken {
    pub token: String,
}

impl fmt::Debug for UserToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserToken").field("token", &"<redacted>").finish()
    }
}

/// Successful `/signup` and `/users/me` body.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentifiers {
    pub data: UserIdentity,
}

/// Identity of the signed-in user.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    /// Server-assigned user id (`_id` on the wire).
    #[serde(rename = "_id")]
    pub id: String,
    pub email: String,
}

impl UserIdentity {
    #[must_use]
    pub fn new(id: impl Into<String>, email: impl Into<String>) -> Self {
        Self { id: id.into(), email: email.into() }
    }
}

impl From<UserIdentifiers> for UserIdentity {
    fn from(body: UserIdentifiers) -> Self {
        body.data
    }
}

/// Error body returned by the API on non-2xx responses.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct AuthApiErrorBody {
    #[serde(default)]
    pub error: Option<String>,
}
