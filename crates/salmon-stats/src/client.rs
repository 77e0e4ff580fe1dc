//! The Salmon Stats client.
//!
//! [`SalmonStats`] owns both credential sets and runs every request through
//! the same cycle: authenticate for the request's [`Target`], send, and on
//! failure ask the [`RetryPolicy`] whether a refreshed session deserves a
//! second attempt.
//!
//! The fetch and upload pipelines live in `fetch.rs` and `upload.rs` as
//! further `impl SalmonStats` blocks.

use std::sync::Arc;

use bytes::Bytes;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};
use url::Url;

use crate::config::ClientConfig;
use crate::credentials::{
    Account, CredentialStore, KeyType, MemoryCredentialStore, SessionProvider, SessionState,
};
use crate::error::{Error, Result};
use crate::http::{
    ApiRequest, Authenticator, HttpRequest, ReqwestTransport, RetryDecision, RetryPolicy, Target,
    Transport,
};

/// Client for the game-companion API and Salmon Stats.
pub struct SalmonStats {
    pub(crate) config: ClientConfig,
    game_base: Url,
    stats_base: Url,
    transport: Arc<dyn Transport>,
    store: Arc<dyn CredentialStore>,
    session: Arc<SessionState>,
    authenticator: Authenticator,
    retry: RetryPolicy,
}

impl SalmonStats {
    pub fn builder() -> SalmonStatsBuilder {
        SalmonStatsBuilder::default()
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// The stored Salmon Stats api token, if any.
    pub async fn api_token(&self) -> Option<String> {
        self.authenticator.api_token().await
    }

    /// Persist the Salmon Stats api token.
    pub async fn set_api_token(&self, token: &str) -> Result<()> {
        self.store.set(KeyType::ApiToken, token).await?;
        debug!("Api token updated");
        Ok(())
    }

    /// Snapshot of the current game account.
    pub async fn account(&self) -> Account {
        self.session.account().await
    }

    /// Replace the in-memory game account.
    pub async fn set_account(&self, account: Account) {
        self.session.replace(account).await;
    }

    /// Send `request`, retrying once per the retry policy, and return the
    /// response body of the first successful attempt.
    #[instrument(skip(self, request), fields(service = %request.target, path = %request.path))]
    pub(crate) async fn execute(&self, request: &ApiRequest) -> Result<Bytes> {
        let base = match request.target {
            Target::Game => &self.game_base,
            Target::Stats => &self.stats_base,
        };
        let url = request.url(base)?;
        let body = request.body.as_ref().map(serde_json::to_vec).transpose()?;

        let mut attempt = 0;
        loop {
            // Authenticate every attempt so a retry picks up the refreshed session.
            let auth = self.authenticator.authenticate(request.target).await?;

            let http_request = HttpRequest {
                target: request.target,
                method: request.method.clone(),
                url: url.clone(),
                headers: auth.headers,
                body: body.clone(),
            };

            let error = match self.transport.send(http_request).await {
                Ok(response) if response.status.is_success() => return Ok(response.body),
                Ok(response) => Error::Status {
                    target: request.target,
                    status: response.status,
                    body: String::from_utf8_lossy(&response.body).into_owned(),
                },
                Err(e) => e,
            };

            match self
                .retry
                .decide(request.target, attempt, &error, auth.generation)
                .await
            {
                RetryDecision::Retry => attempt += 1,
                RetryDecision::DoNotRetry => {
                    warn!(attempt, error = %error, "Request failed");
                    return Err(error);
                }
            }
        }
    }

    /// [`Self::execute`] and decode the body as JSON.
    pub(crate) async fn execute_json<T: DeserializeOwned>(&self, request: &ApiRequest) -> Result<T> {
        let body = self.execute(request).await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

/// Builder for [`SalmonStats`].
#[derive(Default)]
pub struct SalmonStatsBuilder {
    config: Option<ClientConfig>,
    transport: Option<Arc<dyn Transport>>,
    store: Option<Arc<dyn CredentialStore>>,
    session_provider: Option<Arc<dyn SessionProvider>>,
    account: Option<Account>,
}

impl SalmonStatsBuilder {
    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Use a custom transport instead of a `reqwest` client built from the
    /// config.
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Where the api token is kept. Defaults to [`MemoryCredentialStore`].
    pub fn credential_store(mut self, store: Arc<dyn CredentialStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Provider used to refresh stale game sessions. Without one, game
    /// failures are never retried.
    pub fn session_provider(mut self, provider: Arc<dyn SessionProvider>) -> Self {
        self.session_provider = Some(provider);
        self
    }

    pub fn account(mut self, account: Account) -> Self {
        self.account = Some(account);
        self
    }

    pub fn build(self) -> Result<SalmonStats> {
        let config = self.config.unwrap_or_default();
        config.validate()?;

        let game_base = config.game_base()?;
        let stats_base = config.stats_base()?;

        let transport = self
            .transport
            .unwrap_or_else(|| Arc::new(ReqwestTransport::from_config(&config)));
        let store = self
            .store
            .unwrap_or_else(|| Arc::new(MemoryCredentialStore::new()));
        let session = Arc::new(SessionState::new(self.account.unwrap_or_default()));

        let authenticator =
            Authenticator::new(Arc::clone(&store), Arc::clone(&session), &config.user_agent)?;
        let retry = RetryPolicy::new(
            config.max_session_retries,
            Arc::clone(&session),
            self.session_provider,
        );

        Ok(SalmonStats {
            config,
            game_base,
            stats_base,
            transport,
            store,
            session,
            authenticator,
            retry,
        })
    }
}
