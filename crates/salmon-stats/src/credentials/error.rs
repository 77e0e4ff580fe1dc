//! Credential error types.

use thiserror::Error;

/// Errors raised by credential stores and session providers.
#[derive(Debug, Error)]
pub enum CredentialError {
    /// The requested key has no stored value.
    #[error("no credential stored for {0}")]
    NotFound(&'static str),

    /// The underlying store failed.
    #[error("credential store error: {0}")]
    Backend(String),

    /// The session provider rejected or could not complete a refresh.
    #[error("session refresh failed: {0}")]
    RefreshFailed(String),

    /// Network error while talking to a session provider.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
}

impl CredentialError {
    /// Whether the credential is simply absent rather than unreadable.
    #[inline]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}
