//! Error types for the Salmon Stats client.

use reqwest::StatusCode;
use thiserror::Error;

use crate::credentials::CredentialError;
use crate::http::Target;

/// Client-wide result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned by the client pipelines.
#[derive(Debug, Error)]
pub enum Error {
    /// No Salmon Stats api token is stored. Raised before any request is sent.
    #[error("Salmon Stats api token is not set")]
    MissingApiToken,

    /// No game session is available. Raised before any request is sent.
    #[error("game session is unavailable")]
    SessionUnavailable,

    /// The remote answered with a non-success status code.
    #[error("{target} responded with {status}")]
    Status {
        target: Target,
        status: StatusCode,
        body: String,
    },

    /// Transport-level failure (connect, timeout, TLS...).
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The response body could not be decoded.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// A payload decoded but carried a value the client cannot interpret.
    #[error("decode error: {0}")]
    Decode(String),

    /// A batched upload failed. The failing batch error is kept as the source.
    #[error("bad request")]
    BadRequest {
        #[source]
        source: Box<Error>,
    },

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("credential error: {0}")]
    Credential(#[from] CredentialError),
}

impl Error {
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub(crate) fn bad_request(source: Error) -> Self {
        Self::BadRequest {
            source: Box::new(source),
        }
    }

    /// Whether this error means the game session went stale and a refresh
    /// may recover it.
    ///
    /// Only failures the remote actually answered qualify: authenticator
    /// rejections never reached the network and transport/decode errors are
    /// not caused by the session.
    pub fn is_session_stale(&self) -> bool {
        matches!(
            self,
            Self::Status {
                target: Target::Game,
                ..
            }
        )
    }

    /// Whether this error was raised before anything was sent.
    #[inline]
    pub fn is_pre_send(&self) -> bool {
        matches!(self, Self::MissingApiToken | Self::SessionUnavailable)
    }
}
