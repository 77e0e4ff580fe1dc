use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use salmon_stats::credentials::{
    Account, CredentialStore, HttpSessionProvider, MemoryCredentialStore, SessionProvider,
    StaticSessionProvider,
};
use salmon_stats::http::build_client;
use salmon_stats::{ClientConfig, SalmonStats};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Keyring service name the api token is stored under.
#[cfg(feature = "keyring")]
const KEYRING_SERVICE: &str = "salmon-stats";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub client: ClientConfig,
    pub account: Account,
    /// Endpoint that trades the session token for a fresh `iksm_session`.
    pub session_refresh_url: Option<String>,
    /// Salmon Stats api token, used when no other source provides one.
    pub api_token: Option<String>,
}

impl AppConfig {
    pub fn default_path() -> Result<PathBuf> {
        let dir = dirs::config_dir().context("no configuration directory on this platform")?;
        Ok(dir.join("salmon-stats").join("config.toml"))
    }

    fn resolve(path: Option<&Path>) -> Result<PathBuf> {
        match path {
            Some(path) => Ok(path.to_path_buf()),
            None => Self::default_path(),
        }
    }

    /// Load from `path`, or the default location. A missing file yields the
    /// defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = Self::resolve(path)?;
        if !path.exists() {
            debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("failed to parse {}", path.display()))?;
        debug!(path = %path.display(), "Loaded config");
        Ok(config)
    }

    pub fn save(&self, path: Option<&Path>) -> Result<()> {
        let path = Self::resolve(path)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let content = toml::to_string_pretty(self).context("failed to serialize config")?;
        fs::write(&path, content).with_context(|| format!("failed to write {}", path.display()))?;
        Ok(())
    }

    fn session_provider(&self) -> Arc<dyn SessionProvider> {
        match &self.session_refresh_url {
            Some(url) => Arc::new(HttpSessionProvider::new(
                build_client(&self.client),
                url.clone(),
                self.client.user_agent.clone(),
            )),
            // Without a refresh endpoint the configured cookie is all there is.
            None => Arc::new(StaticSessionProvider::new(self.account.clone())),
        }
    }

    #[cfg(feature = "keyring")]
    async fn credential_store(&self, api_token: Option<&str>) -> Result<Arc<dyn CredentialStore>> {
        use salmon_stats::credentials::{KeyType, KeyringCredentialStore};

        if let Some(token) = api_token {
            // A one-off override is not persisted.
            return Ok(Arc::new(MemoryCredentialStore::with_api_token(token)));
        }

        let store = Arc::new(KeyringCredentialStore::new(KEYRING_SERVICE));
        if let Some(token) = &self.api_token {
            match store.get(KeyType::ApiToken).await {
                Err(e) if e.is_not_found() => store.set(KeyType::ApiToken, token).await?,
                Err(e) => return Err(e.into()),
                Ok(_) => {}
            }
        }
        Ok(store)
    }

    #[cfg(not(feature = "keyring"))]
    async fn credential_store(&self, api_token: Option<&str>) -> Result<Arc<dyn CredentialStore>> {
        let store = match api_token.or(self.api_token.as_deref()) {
            Some(token) => MemoryCredentialStore::with_api_token(token),
            None => MemoryCredentialStore::new(),
        };
        Ok(Arc::new(store))
    }

    /// Persist `token` where later runs will find it: the OS keychain with
    /// the `keyring` feature, otherwise the config file at `path`.
    ///
    /// Any one-off override (`--api-token`, environment) is ignored here.
    #[cfg(feature = "keyring")]
    pub async fn store_api_token(&mut self, token: &str, _path: Option<&Path>) -> Result<()> {
        use salmon_stats::credentials::{KeyType, KeyringCredentialStore};

        KeyringCredentialStore::new(KEYRING_SERVICE)
            .set(KeyType::ApiToken, token)
            .await
            .context("failed to store api token in the keychain")?;
        Ok(())
    }

    #[cfg(not(feature = "keyring"))]
    pub async fn store_api_token(&mut self, token: &str, path: Option<&Path>) -> Result<()> {
        self.api_token = Some(token.to_string());
        self.save(path).context("failed to persist api token")
    }

    /// Build a client from this configuration. `api_token` takes precedence
    /// over any stored token.
    pub async fn build_client(&self, api_token: Option<&str>) -> Result<SalmonStats> {
        let store = self.credential_store(api_token).await?;
        let client = SalmonStats::builder()
            .config(self.client.clone())
            .credential_store(store)
            .session_provider(self.session_provider())
            .account(self.account.clone())
            .build()
            .context("invalid client configuration")?;
        Ok(client)
    }
}
