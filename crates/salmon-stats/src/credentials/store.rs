//! Persistence of the Salmon Stats api token.
//!
//! The token is the only credential the client persists; the game session
//! lives in memory (see [`super::session`]).

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;

use super::error::CredentialError;

/// Keys recognized by a [`CredentialStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyType {
    ApiToken,
}

impl KeyType {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ApiToken => "apiToken",
        }
    }
}

/// Key/value secret storage.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Read the value stored under `key`.
    ///
    /// Returns [`CredentialError::NotFound`] when nothing is stored.
    async fn get(&self, key: KeyType) -> Result<String, CredentialError>;

    /// Store `value` under `key`, replacing any previous value.
    async fn set(&self, key: KeyType, value: &str) -> Result<(), CredentialError>;
}

/// Process-local store. Values are lost when the process exits.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    values: RwLock<HashMap<KeyType, String>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store already holding `token` as the api token.
    pub fn with_api_token(token: impl Into<String>) -> Self {
        let store = Self::new();
        store.values.write().insert(KeyType::ApiToken, token.into());
        store
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn get(&self, key: KeyType) -> Result<String, CredentialError> {
        self.values
            .read()
            .get(&key)
            .cloned()
            .ok_or(CredentialError::NotFound(key.as_str()))
    }

    async fn set(&self, key: KeyType, value: &str) -> Result<(), CredentialError> {
        self.values.write().insert(key, value.to_string());
        Ok(())
    }
}

#[cfg(feature = "keyring")]
pub use self::keyring_store::KeyringCredentialStore;

#[cfg(feature = "keyring")]
mod keyring_store {
    use async_trait::async_trait;
    use tracing::debug;

    use super::{CredentialError, CredentialStore, KeyType};

    /// Store backed by the OS keychain (macOS Keychain, Windows Credential
    /// Manager, Secret Service).
    #[derive(Debug, Clone)]
    pub struct KeyringCredentialStore {
        service: String,
    }

    impl KeyringCredentialStore {
        pub fn new(service: impl Into<String>) -> Self {
            Self {
                service: service.into(),
            }
        }

        fn entry(&self, key: KeyType) -> Result<keyring::Entry, CredentialError> {
            keyring::Entry::new(&self.service, key.as_str())
                .map_err(|e| CredentialError::Backend(e.to_string()))
        }
    }

    #[async_trait]
    impl CredentialStore for KeyringCredentialStore {
        async fn get(&self, key: KeyType) -> Result<String, CredentialError> {
            let entry = self.entry(key)?;
            // Keychain access may block on a platform daemon.
            tokio::task::spawn_blocking(move || match entry.get_password() {
                Ok(value) => Ok(value),
                Err(keyring::Error::NoEntry) => Err(CredentialError::NotFound(key.as_str())),
                Err(e) => Err(CredentialError::Backend(e.to_string())),
            })
            .await
            .map_err(|e| CredentialError::Backend(e.to_string()))?
        }

        async fn set(&self, key: KeyType, value: &str) -> Result<(), CredentialError> {
            let entry = self.entry(key)?;
            let value = value.to_string();
            debug!(service = %self.service, key = key.as_str(), "Writing credential to keyring");
            tokio::task::spawn_blocking(move || entry.set_password(&value))
                .await
                .map_err(|e| CredentialError::Backend(e.to_string()))?
                .map_err(|e| CredentialError::Backend(e.to_string()))
        }
    }
}
