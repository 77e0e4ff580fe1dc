//! Client configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{Error, Result};

pub const DEFAULT_GAME_BASE_URL: &str = "https://app.splatoon2.nintendo.net/api/";
pub const DEFAULT_STATS_BASE_URL: &str = "https://salmon-stats-api.yuki.games/api/";
pub const DEFAULT_USER_AGENT: &str = "Salmonia3/tkgling";

/// Results per page when listing results from the game API.
pub const DEFAULT_PAGE_SIZE: u32 = 50;

/// Results per upload request to Salmon Stats.
pub const DEFAULT_UPLOAD_BATCH_SIZE: usize = 10;

/// Configuration for [`crate::SalmonStats`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL of the game-companion API.
    pub game_base_url: String,
    /// Base URL of the Salmon Stats API.
    pub stats_base_url: String,
    /// Client identifier sent as `User-Agent` to both hosts.
    pub user_agent: String,
    /// Per-request timeout in seconds. `0` disables the timeout.
    pub request_timeout_secs: u64,
    /// How many times a game request is retried after a session refresh.
    pub max_session_retries: u32,
    pub page_size: u32,
    pub upload_batch_size: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            game_base_url: DEFAULT_GAME_BASE_URL.to_string(),
            stats_base_url: DEFAULT_STATS_BASE_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            request_timeout_secs: 30,
            max_session_retries: 1,
            page_size: DEFAULT_PAGE_SIZE,
            upload_batch_size: DEFAULT_UPLOAD_BATCH_SIZE,
        }
    }
}

impl ClientConfig {
    pub fn request_timeout(&self) -> Option<Duration> {
        (self.request_timeout_secs > 0).then(|| Duration::from_secs(self.request_timeout_secs))
    }

    pub fn game_base(&self) -> Result<Url> {
        parse_base_url("game_base_url", &self.game_base_url)
    }

    pub fn stats_base(&self) -> Result<Url> {
        parse_base_url("stats_base_url", &self.stats_base_url)
    }

    /// Check the configuration for values the client cannot work with.
    pub fn validate(&self) -> Result<()> {
        self.game_base()?;
        self.stats_base()?;
        if self.user_agent.trim().is_empty() {
            return Err(Error::config("user_agent must not be empty"));
        }
        if self.page_size == 0 {
            return Err(Error::config("page_size must be positive"));
        }
        if self.upload_batch_size == 0 {
            return Err(Error::config("upload_batch_size must be positive"));
        }
        Ok(())
    }
}

/// Parse a base URL, appending the trailing slash `Url::join` needs to keep
/// the last path segment.
fn parse_base_url(field: &str, raw: &str) -> Result<Url> {
    let normalized = if raw.ends_with('/') {
        raw.to_string()
    } else {
        format!("{raw}/")
    };
    let url = Url::parse(&normalized)
        .map_err(|e| Error::config(format!("{field} is not a valid url ({raw}): {e}")))?;
    if url.cannot_be_a_base() {
        return Err(Error::config(format!("{field} cannot be a base url: {raw}")));
    }
    Ok(url)
}
