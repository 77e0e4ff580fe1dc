//! Game session state and refresh.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, instrument, warn};

use super::error::CredentialError;

/// Game account credentials.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Account {
    /// NSA account identifier.
    pub nsaid: String,
    /// Short-lived session cookie (`iksm_session`).
    pub iksm_session: String,
    /// Long-lived token used to mint new session cookies.
    pub session_token: String,
}

impl Account {
    pub fn new(
        nsaid: impl Into<String>,
        iksm_session: impl Into<String>,
        session_token: impl Into<String>,
    ) -> Self {
        Self {
            nsaid: nsaid.into(),
            iksm_session: iksm_session.into(),
            session_token: session_token.into(),
        }
    }

    #[inline]
    pub fn has_session_token(&self) -> bool {
        !self.session_token.is_empty()
    }

    #[inline]
    pub fn has_cookie(&self) -> bool {
        !self.iksm_session.is_empty()
    }
}

// Secrets stay out of logs.
impl std::fmt::Debug for Account {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Account")
            .field("nsaid", &self.nsaid)
            .field("iksm_session", &redact(&self.iksm_session))
            .field("session_token", &redact(&self.session_token))
            .finish()
    }
}

fn redact(value: &str) -> &'static str {
    if value.is_empty() { "<empty>" } else { "<redacted>" }
}

/// Source of fresh game sessions.
#[async_trait]
pub trait SessionProvider: Send + Sync {
    /// Exchange `session_token` for a fresh account session.
    async fn refresh(&self, session_token: &str) -> Result<Account, CredentialError>;
}

/// Provider that always hands back the same account.
///
/// Useful when the session cookie is managed outside this process.
#[derive(Debug, Clone)]
pub struct StaticSessionProvider {
    account: Account,
}

impl StaticSessionProvider {
    pub fn new(account: Account) -> Self {
        Self { account }
    }
}

#[async_trait]
impl SessionProvider for StaticSessionProvider {
    async fn refresh(&self, session_token: &str) -> Result<Account, CredentialError> {
        if session_token.is_empty() {
            return Err(CredentialError::RefreshFailed(
                "session token is empty".to_string(),
            ));
        }
        Ok(self.account.clone())
    }
}

#[derive(Serialize)]
struct RefreshRequest<'a> {
    session_token: &'a str,
}

/// Provider that exchanges the session token at an HTTP endpoint.
///
/// The endpoint receives `{"session_token": "..."}` and must answer with an
/// [`Account`] object.
#[derive(Debug, Clone)]
pub struct HttpSessionProvider {
    client: Client,
    endpoint: String,
    user_agent: String,
}

impl HttpSessionProvider {
    pub fn new(client: Client, endpoint: impl Into<String>, user_agent: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            user_agent: user_agent.into(),
        }
    }
}

#[async_trait]
impl SessionProvider for HttpSessionProvider {
    #[instrument(skip(self, session_token), fields(endpoint = %self.endpoint))]
    async fn refresh(&self, session_token: &str) -> Result<Account, CredentialError> {
        if session_token.is_empty() {
            return Err(CredentialError::RefreshFailed(
                "session token is empty".to_string(),
            ));
        }

        let response = self
            .client
            .post(&self.endpoint)
            .header(reqwest::header::USER_AGENT, &self.user_agent)
            .json(&RefreshRequest { session_token })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(CredentialError::RefreshFailed(format!(
                "session endpoint responded with {status}"
            )));
        }

        let mut account: Account = response.json().await?;
        // Endpoints are not required to echo the token back.
        if account.session_token.is_empty() {
            account.session_token = session_token.to_string();
        }
        debug!(nsaid = %account.nsaid, "Session refreshed");
        Ok(account)
    }
}

/// In-memory game session shared by every request.
///
/// Reads take a snapshot together with a generation number. A refresh is
/// single-flight: it only calls the provider when the generation the failing
/// request saw is still current, so concurrent failures refresh once.
#[derive(Debug, Default)]
pub struct SessionState {
    account: RwLock<Account>,
    generation: AtomicU64,
    refresh_lock: Mutex<()>,
}

impl SessionState {
    pub fn new(account: Account) -> Self {
        Self {
            account: RwLock::new(account),
            generation: AtomicU64::new(0),
            refresh_lock: Mutex::new(()),
        }
    }

    /// Current account and the generation it belongs to.
    pub async fn snapshot(&self) -> (Account, u64) {
        let account = self.account.read().await;
        (account.clone(), self.generation.load(Ordering::Acquire))
    }

    pub async fn account(&self) -> Account {
        self.account.read().await.clone()
    }

    #[inline]
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// Replace the account unconditionally.
    pub async fn replace(&self, account: Account) {
        let mut guard = self.account.write().await;
        *guard = account;
        self.generation.fetch_add(1, Ordering::AcqRel);
    }

    /// Refresh the session if `observed` is still the current generation.
    ///
    /// Returns `Ok(true)` when this call refreshed, `Ok(false)` when another
    /// caller already did.
    pub async fn refresh(
        &self,
        provider: &dyn SessionProvider,
        observed: u64,
    ) -> Result<bool, CredentialError> {
        let _guard = self.refresh_lock.lock().await;

        if self.generation() != observed {
            debug!(observed, current = self.generation(), "Session already refreshed");
            return Ok(false);
        }

        let session_token = self.account.read().await.session_token.clone();
        match provider.refresh(&session_token).await {
            Ok(account) => {
                info!(nsaid = %account.nsaid, "Game session refreshed");
                self.replace(account).await;
                Ok(true)
            }
            Err(e) => {
                warn!(error = %e, "Game session refresh failed");
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::AtomicUsize;

    struct CountingProvider {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl SessionProvider for CountingProvider {
        async fn refresh(&self, session_token: &str) -> Result<Account, CredentialError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            tokio::task::yield_now().await;
            Ok(Account::new("nsaid", format!("cookie-{n}"), session_token))
        }
    }

    #[test]
    fn debug_output_hides_secrets() {
        let account = Account::new("abcd", "cookie", "");
        let debug = format!("{account:?}");
        assert!(debug.contains("abcd"));
        assert!(!debug.contains("cookie\""));
        assert!(debug.contains("<redacted>"));
        assert!(debug.contains("<empty>"));
    }

    #[tokio::test]
    async fn refresh_bumps_generation() {
        let state = SessionState::new(Account::new("nsaid", "old", "token"));
        let provider = CountingProvider {
            calls: AtomicUsize::new(0),
        };

        let (_, generation) = state.snapshot().await;
        assert!(state.refresh(&provider, generation).await.unwrap());

        let (account, next) = state.snapshot().await;
        assert_eq!(next, generation + 1);
        assert_eq!(account.iksm_session, "cookie-1");
        assert_eq!(account.session_token, "token");
    }

    #[tokio::test]
    async fn stale_generation_skips_provider() {
        let state = SessionState::new(Account::new("nsaid", "old", "token"));
        let provider = CountingProvider {
            calls: AtomicUsize::new(0),
        };

        state.refresh(&provider, 0).await.unwrap();
        assert!(!state.refresh(&provider, 0).await.unwrap());
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn concurrent_refreshes_call_provider_once() {
        let state = Arc::new(SessionState::new(Account::new("nsaid", "old", "token")));
        let provider = Arc::new(CountingProvider {
            calls: AtomicUsize::new(0),
        });

        let tasks: Vec<_> = (0..8)
            .map(|_| {
                let state = Arc::clone(&state);
                let provider = Arc::clone(&provider);
                tokio::spawn(async move { state.refresh(provider.as_ref(), 0).await })
            })
            .collect();
        for task in tasks {
            task.await.unwrap().unwrap();
        }

        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
        assert_eq!(state.generation(), 1);
    }

    #[tokio::test]
    async fn static_provider_rejects_empty_token() {
        let provider = StaticSessionProvider::new(Account::new("nsaid", "cookie", "token"));
        assert!(provider.refresh("").await.is_err());
        assert_eq!(provider.refresh("token").await.unwrap().iksm_session, "cookie");
    }
}
