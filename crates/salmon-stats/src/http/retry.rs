//! Retry policy: decides whether a failed request is worth a second attempt.
//!
//! The only recovery path is a game session refresh; Salmon Stats failures are
//! always terminal.

use std::sync::Arc;

use tracing::{debug, warn};

use super::request::Target;
use crate::credentials::{SessionProvider, SessionState};
use crate::error::Error;

/// Outcome of [`RetryPolicy::decide`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    Retry,
    DoNotRetry,
}

/// Configuration and collaborators for retrying failed requests.
pub struct RetryPolicy {
    /// Retries allowed per request (not counting the initial attempt).
    pub max_session_retries: u32,
    session: Arc<SessionState>,
    provider: Option<Arc<dyn SessionProvider>>,
}

impl RetryPolicy {
    pub fn new(
        max_session_retries: u32,
        session: Arc<SessionState>,
        provider: Option<Arc<dyn SessionProvider>>,
    ) -> Self {
        Self {
            max_session_retries,
            session,
            provider,
        }
    }

    /// Decide whether attempt `attempt` (0-indexed) of a request to `target`
    /// should be retried after failing with `error`.
    ///
    /// `generation` is the session generation the failed attempt was
    /// authenticated with. For a stale game session this refreshes the
    /// session before answering [`RetryDecision::Retry`].
    pub async fn decide(
        &self,
        target: Target,
        attempt: u32,
        error: &Error,
        generation: u64,
    ) -> RetryDecision {
        if error.is_pre_send() {
            return RetryDecision::DoNotRetry;
        }

        match target {
            Target::Stats => {
                debug!(error = %error, "Salmon Stats request failed; not retrying");
                RetryDecision::DoNotRetry
            }
            Target::Game => {
                if attempt >= self.max_session_retries {
                    debug!(attempt, max = self.max_session_retries, "Retry budget exhausted");
                    return RetryDecision::DoNotRetry;
                }
                if !error.is_session_stale() {
                    return RetryDecision::DoNotRetry;
                }
                let Some(provider) = self.provider.as_deref() else {
                    debug!("No session provider configured; not retrying");
                    return RetryDecision::DoNotRetry;
                };

                match self.session.refresh(provider, generation).await {
                    Ok(refreshed) => {
                        warn!(
                            attempt = attempt + 1,
                            max = self.max_session_retries,
                            refreshed,
                            error = %error,
                            "Retrying game request with refreshed session"
                        );
                        RetryDecision::Retry
                    }
                    Err(_) => RetryDecision::DoNotRetry,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credentials::{Account, CredentialError};
    use async_trait::async_trait;
    use reqwest::StatusCode;
    use std::sync::atomic::{AtomicU32, Ordering};

    struct Provider {
        calls: AtomicU32,
        fail: bool,
    }

    #[async_trait]
    impl SessionProvider for Provider {
        async fn refresh(&self, session_token: &str) -> Result<Account, CredentialError> {
            self.calls.fetch_add(1, Ordering::Relaxed);
            if self.fail {
                Err(CredentialError::RefreshFailed("expired".to_string()))
            } else {
                Ok(Account::new("nsaid", "fresh", session_token))
            }
        }
    }

    fn policy(fail: bool) -> (RetryPolicy, Arc<Provider>, Arc<SessionState>) {
        let provider = Arc::new(Provider {
            calls: AtomicU32::new(0),
            fail,
        });
        let session = Arc::new(SessionState::new(Account::new("nsaid", "stale", "token")));
        let policy = RetryPolicy::new(
            1,
            Arc::clone(&session),
            Some(provider.clone() as Arc<dyn SessionProvider>),
        );
        (policy, provider, session)
    }

    fn status(target: Target) -> Error {
        Error::Status {
            target,
            status: StatusCode::UNAUTHORIZED,
            body: String::new(),
        }
    }

    #[tokio::test]
    async fn game_failure_refreshes_then_retries() {
        let (policy, provider, session) = policy(false);
        let decision = policy.decide(Target::Game, 0, &status(Target::Game), 0).await;
        assert_eq!(decision, RetryDecision::Retry);
        assert_eq!(provider.calls.load(Ordering::Relaxed), 1);
        assert_eq!(session.account().await.iksm_session, "fresh");
    }

    #[tokio::test]
    async fn failed_refresh_does_not_retry() {
        let (policy, provider, session) = policy(true);
        let decision = policy.decide(Target::Game, 0, &status(Target::Game), 0).await;
        assert_eq!(decision, RetryDecision::DoNotRetry);
        assert_eq!(provider.calls.load(Ordering::Relaxed), 1);
        assert_eq!(session.account().await.iksm_session, "stale");
    }

    #[tokio::test]
    async fn second_failure_is_terminal() {
        let (policy, provider, _) = policy(false);
        let decision = policy.decide(Target::Game, 1, &status(Target::Game), 0).await;
        assert_eq!(decision, RetryDecision::DoNotRetry);
        assert_eq!(provider.calls.load(Ordering::Relaxed), 0);
    }

    #[tokio::test]
    async fn stats_failures_are_never_retried() {
        let (policy, provider, _) = policy(false);
        let decision = policy
            .decide(Target::Stats, 0, &status(Target::Stats), 0)
            .await;
        assert_eq!(decision, RetryDecision::DoNotRetry);
        let decision = policy
            .decide(Target::Stats, 0, &Error::MissingApiToken, 0)
            .await;
        assert_eq!(decision, RetryDecision::DoNotRetry);
        assert_eq!(provider.calls.load(Ordering::Relaxed), 0);
    }

    #[tokio::test]
    async fn pre_send_and_decode_errors_are_terminal() {
        let (policy, provider, _) = policy(false);
        let decision = policy
            .decide(Target::Game, 0, &Error::SessionUnavailable, 0)
            .await;
        assert_eq!(decision, RetryDecision::DoNotRetry);
        let decision = policy
            .decide(Target::Game, 0, &Error::Decode("bad".to_string()), 0)
            .await;
        assert_eq!(decision, RetryDecision::DoNotRetry);
        assert_eq!(provider.calls.load(Ordering::Relaxed), 0);
    }
}
