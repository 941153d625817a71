//! Bearer credentials for an authenticated Lemmy session.

use crate::errors::LemmyError;
use reqwest::header::HeaderValue;
use std::fmt;

/// Opaque bearer token (the JWT Lemmy hands out on login).
///
/// The token is never printed by `Debug`. An empty token counts as "no
/// credential" everywhere in this crate.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Wraps a raw token.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Returns the raw token.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Builds the `Authorization: Bearer <token>` header value, marked sensitive.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if the token holds bytes that can't go into a header.
    pub fn bearer_header(&self) -> Result<HeaderValue, LemmyError> {
        let mut value = HeaderValue::from_str(&format!("Bearer {}", self.0)).map_err(|_| {
            LemmyError::InvalidInput("credential contains characters not allowed in a header".to_string())
        })?;
        value.set_sensitive(true);
        Ok(value)
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}

impl From<String> for Credential {
    fn from(token: String) -> Self {
        Self(token)
    }
}

impl From<&str> for Credential {
    fn from(token: &str) -> Self {
        Self(token.to_string())
    }
}
