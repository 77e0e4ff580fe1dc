//! Per-request authentication.

use std::sync::Arc;

use reqwest::header::{AUTHORIZATION, COOKIE, HeaderMap, HeaderValue, USER_AGENT};
use tracing::{debug, warn};

use super::request::Target;
use crate::credentials::{CredentialStore, KeyType, SessionState};
use crate::error::{Error, Result};

/// Headers to attach to one attempt, plus the session generation they were
/// derived from.
#[derive(Debug, Clone)]
pub struct Authenticated {
    pub headers: HeaderMap,
    pub generation: u64,
}

/// Attaches credentials to outgoing requests according to their [`Target`].
///
/// Never mutates credential state; it only reads the token store and takes a
/// snapshot of the session.
pub struct Authenticator {
    store: Arc<dyn CredentialStore>,
    session: Arc<SessionState>,
    user_agent: HeaderValue,
}

impl Authenticator {
    pub fn new(
        store: Arc<dyn CredentialStore>,
        session: Arc<SessionState>,
        user_agent: &str,
    ) -> Result<Self> {
        let user_agent = HeaderValue::from_str(user_agent)
            .map_err(|e| Error::config(format!("invalid user agent {user_agent:?}: {e}")))?;
        Ok(Self {
            store,
            session,
            user_agent,
        })
    }

    /// Read the stored api token. Store failures read as "no token".
    pub async fn api_token(&self) -> Option<String> {
        match self.store.get(KeyType::ApiToken).await {
            Ok(token) => Some(token),
            Err(e) if e.is_not_found() => None,
            Err(e) => {
                warn!(error = %e, "Failed to read api token");
                None
            }
        }
    }

    /// Build the headers for a request to `target`.
    ///
    /// Fails without touching the network when the target's required
    /// credential is missing.
    pub async fn authenticate(&self, target: Target) -> Result<Authenticated> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, self.user_agent.clone());

        match target {
            Target::Stats => {
                let token = self
                    .api_token()
                    .await
                    .filter(|token| !token.is_empty())
                    .ok_or(Error::MissingApiToken)?;
                let value = HeaderValue::from_str(&format!("Bearer {token}"))
                    .map_err(|_| Error::invalid_argument("api token is not a valid header value"))?;
                headers.insert(AUTHORIZATION, value);
                Ok(Authenticated {
                    headers,
                    generation: self.session.generation(),
                })
            }
            Target::Game => {
                let (account, generation) = self.session.snapshot().await;
                if !account.has_session_token() {
                    return Err(Error::SessionUnavailable);
                }
                if account.has_cookie() {
                    let value = HeaderValue::from_str(&format!(
                        "iksm_session={}",
                        account.iksm_session
                    ))
                    .map_err(|_| {
                        Error::invalid_argument("session cookie is not a valid header value")
                    })?;
                    headers.insert(COOKIE, value);
                } else {
                    debug!("No session cookie yet; sending game request without it");
                }
                Ok(Authenticated {
                    headers,
                    generation,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credentials::{Account, MemoryCredentialStore};

    fn authenticator(store: MemoryCredentialStore, account: Account) -> Authenticator {
        Authenticator::new(
            Arc::new(store),
            Arc::new(SessionState::new(account)),
            "Salmonia3/tkgling",
        )
        .unwrap()
    }

    #[tokio::test]
    async fn stats_requires_token() {
        let auth = authenticator(MemoryCredentialStore::new(), Account::default());
        assert!(matches!(
            auth.authenticate(Target::Stats).await,
            Err(Error::MissingApiToken)
        ));

        let auth = authenticator(MemoryCredentialStore::with_api_token(""), Account::default());
        assert!(matches!(
            auth.authenticate(Target::Stats).await,
            Err(Error::MissingApiToken)
        ));
    }

    #[tokio::test]
    async fn stats_gets_bearer_and_user_agent() {
        let auth = authenticator(
            MemoryCredentialStore::with_api_token("secret"),
            Account::default(),
        );
        let headers = auth.authenticate(Target::Stats).await.unwrap().headers;
        assert_eq!(headers[AUTHORIZATION], "Bearer secret");
        assert_eq!(headers[USER_AGENT], "Salmonia3/tkgling");
        assert!(headers.get(COOKIE).is_none());
    }

    #[tokio::test]
    async fn game_requires_session_token() {
        let auth = authenticator(
            MemoryCredentialStore::with_api_token("secret"),
            Account::new("nsaid", "cookie", ""),
        );
        assert!(matches!(
            auth.authenticate(Target::Game).await,
            Err(Error::SessionUnavailable)
        ));
    }

    #[tokio::test]
    async fn game_cookie_is_optional() {
        let auth = authenticator(MemoryCredentialStore::new(), Account::new("nsaid", "", "token"));
        let headers = auth.authenticate(Target::Game).await.unwrap().headers;
        assert!(headers.get(COOKIE).is_none());
        assert!(headers.get(AUTHORIZATION).is_none());

        let auth = authenticator(
            MemoryCredentialStore::new(),
            Account::new("nsaid", "abc123", "token"),
        );
        let headers = auth.authenticate(Target::Game).await.unwrap().headers;
        assert_eq!(headers[COOKIE], "iksm_session=abc123");
        assert_eq!(headers[USER_AGENT], "Salmonia3/tkgling");
    }
}
