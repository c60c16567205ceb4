//! Error types for the authentication module.

use thiserror::Error;

/// Errors raised while exchanging credentials for a bearer token.
///
/// Every variant is fatal for the run: bad credentials cannot be fixed by
/// retrying, and an unreachable auth endpoint leaves nothing to export.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The auth endpoint answered with a non-200 status.
    #[error("login rejected (HTTP {status}): {message}\n  Suggestion: check the email and password")]
    Rejected {
        /// HTTP status returned by the auth endpoint.
        status: u16,
        /// Server-provided message, or a generic description.
        message: String,
    },

    /// Network-level failure reaching the auth endpoint.
    #[error("network error contacting {url}: {source}")]
    Network {
        /// The auth endpoint URL.
        url: String,
        /// The underlying network error.
        #[source]
        source: reqwest::Error,
    },

    /// The auth endpoint did not answer in time.
    #[error("timeout contacting {url}")]
    Timeout {
        /// The auth endpoint URL.
        url: String,
    },

    /// Status 200 without the expected token field.
    #[error("malformed login response from {url}: {reason}")]
    MalformedResponse {
        /// The auth endpoint URL.
        url: String,
        /// What was missing or unreadable.
        reason: String,
    },
}

impl AuthError {
    /// Creates a rejection error.
    pub fn rejected(status: u16, message: impl Into<String>) -> Self {
        Self::Rejected {
            status,
            message: message.into(),
        }
    }

    /// Creates a network or timeout error from a reqwest error.
    pub fn transport(url: impl Into<String>, source: reqwest::Error) -> Self {
        if source.is_timeout() {
            Self::Timeout { url: url.into() }
        } else {
            Self::Network {
                url: url.into(),
                source,
            }
        }
    }

    /// Creates a malformed-response error.
    pub fn malformed(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedResponse {
            url: url.into(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejected_display_includes_status_and_hint() {
        let msg = AuthError::rejected(401, "Invalid credentials").to_string();
        assert!(msg.contains("401"), "{msg}");
        assert!(msg.contains("Invalid credentials"), "{msg}");
        assert!(msg.contains("email and password"), "{msg}");
    }

    #[test]
    fn test_malformed_display_includes_reason() {
        let msg = AuthError::malformed("https://x/auth", "missing data.access").to_string();
        assert!(msg.contains("missing data.access"), "{msg}");
        assert!(msg.contains("https://x/auth"), "{msg}");
    }
}
