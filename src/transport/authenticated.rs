//! Token-attaching transport with the single-retry rule.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use tracing::{info, instrument, warn};

use super::{ApiResponse, HttpError, RequestSender};
use crate::auth::TokenSource;

/// Decorates a [`RequestSender`] with bearer authentication.
///
/// Every request reads the token from the [`TokenSource`] at send time. A 401
/// triggers exactly one re-authentication and one replay; a second 401 is
/// returned as [`HttpError::Unauthorized`]. Every other status is handed
/// back untouched.
#[derive(Clone)]
pub struct AuthenticatedTransport {
    sender: Arc<dyn RequestSender>,
    tokens: Arc<dyn TokenSource>,
}

impl std::fmt::Debug for AuthenticatedTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthenticatedTransport").finish_non_exhaustive()
    }
}

impl AuthenticatedTransport {
    /// Creates the decorator.
    #[must_use]
    pub fn new(sender: Arc<dyn RequestSender>, tokens: Arc<dyn TokenSource>) -> Self {
        Self { sender, tokens }
    }

    /// Sends an authenticated GET.
    ///
    /// # Errors
    ///
    /// - transport failures from the underlying sender
    /// - [`HttpError::Reauthentication`] when the token refresh fails
    /// - [`HttpError::Unauthorized`] when the replay is rejected too
    #[instrument(level = "debug", skip(self), fields(url = %url))]
    pub async fn get(&self, url: &str) -> Result<ApiResponse, HttpError> {
        let token = self.tokens.current_token().await;
        let first = self
            .sender
            .get(url, token.as_ref().map(|t| t.header_value()))
            .await?;
        if !first.is_unauthorized() {
            return Ok(first);
        }

        info!("request rejected with 401; refreshing token and replaying once");
        let fresh = self.tokens.reauthenticate(token.as_ref()).await?;
        let replay = self.sender.get(url, Some(fresh.header_value())).await?;
        if replay.is_unauthorized() {
            warn!("replay rejected with 401");
            return Err(HttpError::unauthorized(url));
        }
        Ok(replay)
    }

    /// Sends an authenticated GET and decodes a 2xx JSON body.
    ///
    /// # Errors
    ///
    /// Everything [`get`](Self::get) returns, plus [`HttpError::Status`] for
    /// non-2xx responses and [`HttpError::Decode`] for bodies that do not
    /// match `T`.
    pub async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, HttpError> {
        self.get(url).await?.error_for_status()?.json()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::auth::{AuthError, Token};

    /// Answers with queued statuses and records the authorization it saw.
    struct ScriptedSender {
        statuses: Mutex<VecDeque<u16>>,
        seen: Mutex<Vec<Option<String>>>,
    }

    impl ScriptedSender {
        fn new(statuses: &[u16]) -> Arc<Self> {
            Arc::new(Self {
                statuses: Mutex::new(statuses.iter().copied().collect()),
                seen: Mutex::new(Vec::new()),
            })
        }

        fn seen(&self) -> Vec<Option<String>> {
            self.seen.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl RequestSender for ScriptedSender {
        async fn get(
            &self,
            url: &str,
            authorization: Option<&str>,
        ) -> Result<ApiResponse, HttpError> {
            self.seen.lock().unwrap().push(authorization.map(str::to_string));
            let status = self.statuses.lock().unwrap().pop_front().unwrap_or(200);
            Ok(ApiResponse::new(url, status, "{}"))
        }
    }

    struct FakeTokens {
        current: Mutex<Token>,
        refreshes: AtomicUsize,
        fail: bool,
    }

    impl FakeTokens {
        fn new(fail: bool) -> Arc<Self> {
            Arc::new(Self {
                current: Mutex::new(Token::bearer("old")),
                refreshes: AtomicUsize::new(0),
                fail,
            })
        }
    }

    #[async_trait]
    impl TokenSource for FakeTokens {
        async fn current_token(&self) -> Option<Token> {
            Some(self.current.lock().unwrap().clone())
        }

        async fn reauthenticate(&self, _rejected: Option<&Token>) -> Result<Token, AuthError> {
            self.refreshes.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(AuthError::rejected(403, "account locked"));
            }
            let fresh = Token::bearer("new");
            *self.current.lock().unwrap() = fresh.clone();
            Ok(fresh)
        }
    }

    #[tokio::test]
    async fn test_401_refreshes_and_replays_with_new_token() {
        let sender = ScriptedSender::new(&[401, 200]);
        let tokens = FakeTokens::new(false);
        let transport = AuthenticatedTransport::new(sender.clone(), tokens.clone());

        let response = transport.get("https://api/x").await.unwrap();
        assert_eq!(response.status, 200);
        assert_eq!(tokens.refreshes.load(Ordering::SeqCst), 1);
        assert_eq!(
            sender.seen(),
            [Some("Bearer old".to_string()), Some("Bearer new".to_string())]
        );
    }

    #[tokio::test]
    async fn test_second_401_is_unauthorized_without_further_retries() {
        let sender = ScriptedSender::new(&[401, 401, 200]);
        let tokens = FakeTokens::new(false);
        let transport = AuthenticatedTransport::new(sender.clone(), tokens.clone());

        let err = transport.get("https://api/x").await.unwrap_err();
        assert!(matches!(err, HttpError::Unauthorized { .. }));
        assert!(!err.is_fatal());
        assert_eq!(sender.seen().len(), 2);
        assert_eq!(tokens.refreshes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_other_statuses_pass_through_untouched() {
        let sender = ScriptedSender::new(&[500]);
        let tokens = FakeTokens::new(false);
        let transport = AuthenticatedTransport::new(sender.clone(), tokens.clone());

        let response = transport.get("https://api/x").await.unwrap();
        assert_eq!(response.status, 500);
        assert_eq!(tokens.refreshes.load(Ordering::SeqCst), 0);
        assert_eq!(sender.seen().len(), 1);
    }

    #[tokio::test]
    async fn test_failed_refresh_is_fatal() {
        let sender = ScriptedSender::new(&[401]);
        let tokens = FakeTokens::new(true);
        let transport = AuthenticatedTransport::new(sender.clone(), tokens);

        let err = transport.get("https://api/x").await.unwrap_err();
        assert!(matches!(err, HttpError::Reauthentication(_)));
        assert!(err.is_fatal());
        assert_eq!(sender.seen().len(), 1);
    }

    #[tokio::test]
    async fn test_get_json_rejects_non_success() {
        let sender = ScriptedSender::new(&[404]);
        let transport = AuthenticatedTransport::new(sender, FakeTokens::new(false));

        let err = transport
            .get_json::<serde_json::Value>("https://api/x")
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), Some(404));
    }
}
