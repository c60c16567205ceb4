//! Token exchange against the auth endpoint.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, instrument, warn};

use super::{AuthError, Credentials, Token, TokenSource};
use crate::endpoints::ApiEndpoints;

#[derive(Serialize)]
struct LoginBody<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct LoginResponse {
    data: Option<LoginData>,
}

#[derive(Deserialize)]
struct LoginData {
    access: Option<String>,
}

#[derive(Deserialize)]
struct LoginFailure {
    message: Option<String>,
}

/// Owns the credentials and the current bearer token.
///
/// Shared by reference (`Arc<Authenticator>`) with the authenticated
/// transport. Token refreshes are single-flight: a refresh mutex serializes
/// them and a caller whose rejected token was already replaced gets the
/// replacement without a second login.
#[derive(Debug)]
pub struct Authenticator {
    client: Client,
    auth_url: String,
    credentials: Credentials,
    token: RwLock<Option<Token>>,
    refresh_lock: Mutex<()>,
}

impl Authenticator {
    /// Creates an unauthenticated holder; call [`authenticate`](Self::authenticate)
    /// before issuing any other request.
    #[must_use]
    pub fn new(client: Client, endpoints: &ApiEndpoints, credentials: Credentials) -> Self {
        Self {
            client,
            auth_url: endpoints.auth_url(),
            credentials,
            token: RwLock::new(None),
            refresh_lock: Mutex::new(()),
        }
    }

    /// Performs the initial login and stores the issued token.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError`] when the endpoint is unreachable, answers with a
    /// non-200 status, or omits the token field. All of these are fatal.
    #[instrument(skip(self), fields(username = %self.credentials.username()))]
    pub async fn authenticate(&self) -> Result<Token, AuthError> {
        let _guard = self.refresh_lock.lock().await;
        let token = self.request_token().await?;
        *self.token.write().await = Some(token.clone());
        info!("authenticated");
        Ok(token)
    }

    async fn request_token(&self) -> Result<Token, AuthError> {
        debug!(url = %self.auth_url, "requesting token");
        let body = LoginBody {
            username: self.credentials.username(),
            password: self.credentials.password(),
        };
        let response = self
            .client
            .post(&self.auth_url)
            .json(&body)
            .send()
            .await
            .map_err(|e| AuthError::transport(&self.auth_url, e))?;

        let status = response.status().as_u16();
        let raw = response
            .text()
            .await
            .map_err(|e| AuthError::transport(&self.auth_url, e))?;

        if status != 200 {
            let message = serde_json::from_str::<LoginFailure>(&raw)
                .ok()
                .and_then(|failure| failure.message)
                .unwrap_or_else(|| "login failed".to_string());
            warn!(status, message = %message, "login rejected");
            return Err(AuthError::rejected(status, message));
        }

        let parsed: LoginResponse = serde_json::from_str(&raw)
            .map_err(|e| AuthError::malformed(&self.auth_url, e.to_string()))?;
        let access = parsed
            .data
            .and_then(|data| data.access)
            .filter(|access| !access.is_empty())
            .ok_or_else(|| AuthError::malformed(&self.auth_url, "missing data.access"))?;
        Ok(Token::bearer(&access))
    }
}

#[async_trait]
impl TokenSource for Authenticator {
    async fn current_token(&self) -> Option<Token> {
        self.token.read().await.clone()
    }

    #[instrument(skip(self, rejected))]
    async fn reauthenticate(&self, rejected: Option<&Token>) -> Result<Token, AuthError> {
        let _guard = self.refresh_lock.lock().await;
        if let Some(current) = self.token.read().await.as_ref()
            && Some(current) != rejected
        {
            debug!("token already refreshed by another request");
            return Ok(current.clone());
        }

        info!("token rejected; re-authenticating");
        let fresh = self.request_token().await?;
        *self.token.write().await = Some(fresh.clone());
        Ok(fresh)
    }
}
