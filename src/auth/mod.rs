//! Credential exchange and bearer-token ownership.
//!
//! - [`Credentials`] - username/password pair, immutable for the run
//! - [`Token`] - bearer header value (`Bearer <value>`)
//! - [`TokenSource`] - the seam the authenticated transport reads tokens through
//! - [`Authenticator`] - production [`TokenSource`] backed by the auth endpoint
//!
//! Nothing here is persisted: every process starts unauthenticated.

mod authenticator;
mod error;

pub use authenticator::Authenticator;
pub use error::AuthError;

use std::fmt;

use async_trait::async_trait;

/// Account credentials. `Debug` never prints the password.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    username: String,
    password: String,
}

impl Credentials {
    /// Creates a credential pair.
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Returns the account username (email).
    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    pub(crate) fn password(&self) -> &str {
        &self.password
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Bearer token as sent in the `Authorization` header.
#[derive(Clone, PartialEq, Eq)]
pub struct Token(String);

impl Token {
    /// Builds a token from the raw access value returned by the auth endpoint.
    #[must_use]
    pub fn bearer(access: &str) -> Self {
        Self(format!("Bearer {access}"))
    }

    /// Full header value, including the scheme marker.
    #[must_use]
    pub fn header_value(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Token(<redacted>)")
    }
}

/// Source of the current bearer token.
///
/// The transport reads [`current_token`](Self::current_token) at send time so
/// a replacement made by [`reauthenticate`](Self::reauthenticate) is visible
/// to every later request.
#[async_trait]
pub trait TokenSource: Send + Sync {
    /// Returns the token to attach to the next request, if one was issued.
    async fn current_token(&self) -> Option<Token>;

    /// Replaces a token the server rejected and returns the new one.
    ///
    /// `rejected` is the token the caller sent. Implementations serialize
    /// concurrent calls; when the holder already carries a different token
    /// than `rejected`, that newer token is returned without a new login.
    async fn reauthenticate(&self, rejected: Option<&Token>) -> Result<Token, AuthError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_bearer_prefix() {
        let token = Token::bearer("abc.def");
        assert_eq!(token.header_value(), "Bearer abc.def");
    }

    #[test]
    fn test_debug_output_redacts_secrets() {
        let creds = Credentials::new("reader@example.com", "hunter2");
        let rendered = format!("{creds:?}");
        assert!(rendered.contains("reader@example.com"));
        assert!(!rendered.contains("hunter2"));

        let token = Token::bearer("secret-jwt");
        assert!(!format!("{token:?}").contains("secret-jwt"));
    }
}
