//! Authentication context passed to every store call.

use std::fmt;

use cms_model::AccessToken;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::StoreError;

/// Token context for store calls.
///
/// Starts anonymous, becomes authenticated through [`Session::begin`]
/// (normally via [`crate::login`]) and returns to anonymous on
/// [`Session::clear`]. Serializable so a CLI can keep it between runs.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    email: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    access_token: Option<String>,
}

impl Session {
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Session for a bearer token received from elsewhere (request headers)
    pub fn from_token(token: impl Into<String>) -> Self {
        Self {
            email: None,
            access_token: Some(token.into()),
        }
    }

    /// Start an authenticated session
    pub fn begin(&mut self, email: impl Into<String>, token: AccessToken) {
        self.email = Some(email.into());
        self.access_token = Some(token.access_token);
    }

    /// Tear down (logout, or token rejected by the store)
    pub fn clear(&mut self) {
        if self.access_token.is_some() {
            debug!("session cleared");
        }
        self.email = None;
        self.access_token = None;
    }

    pub fn token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }

    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.access_token.is_some()
    }

    /// Pass a store result through, clearing the session if the store
    /// rejected the token.
    pub fn observe<T>(&mut self, result: Result<T, StoreError>) -> Result<T, StoreError> {
        if let Err(StoreError::Unauthorized) = &result {
            self.clear();
        }
        result
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("email", &self.email)
            .field(
                "access_token",
                &self.access_token.as_ref().map(|_| "<redacted>"),
            )
            .finish()
    }
}
