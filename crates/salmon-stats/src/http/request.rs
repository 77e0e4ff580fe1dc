use std::fmt;

use reqwest::Method;
use reqwest::header::HeaderMap;
use serde::Serialize;
use url::Url;

use crate::error::{Error, Result};

/// Remote service a request is addressed to.
///
/// Fixed when the request is built; decides which credentials are attached
/// and how failures are retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Target {
    /// The game-companion API, authenticated by session cookie.
    Game,
    /// Salmon Stats, authenticated by bearer token.
    Stats,
}

impl Target {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Game => "game",
            Self::Stats => "salmon-stats",
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A request described relative to its target's base URL.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub target: Target,
    pub method: Method,
    /// Path relative to the target base URL, without a leading slash.
    pub path: String,
    /// Segments appended after `path`, each percent-encoded as a whole.
    pub segments: Vec<String>,
    pub query: Vec<(String, String)>,
    pub body: Option<serde_json::Value>,
}

impl ApiRequest {
    pub fn new(target: Target, method: Method, path: impl Into<String>) -> Self {
        Self {
            target,
            method,
            path: path.into(),
            segments: Vec::new(),
            query: Vec::new(),
            body: None,
        }
    }

    pub fn get(target: Target, path: impl Into<String>) -> Self {
        Self::new(target, Method::GET, path)
    }

    pub fn post(target: Target, path: impl Into<String>) -> Self {
        Self::new(target, Method::POST, path)
    }

    /// Append one path segment. Slashes in `segment` are encoded, so
    /// caller-supplied ids can never reach another endpoint.
    pub fn segment(mut self, segment: impl ToString) -> Self {
        self.segments.push(segment.to_string());
        self
    }

    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self> {
        self.body = Some(serde_json::to_value(body)?);
        Ok(self)
    }

    /// Resolve the full URL against `base`.
    pub fn url(&self, base: &Url) -> Result<Url> {
        let mut url = base
            .join(self.path.trim_start_matches('/'))
            .map_err(|e| Error::invalid_argument(format!("bad request path {}: {e}", self.path)))?;
        if !self.segments.is_empty() {
            if let Some(bad) = self
                .segments
                .iter()
                .find(|segment| matches!(segment.as_str(), "" | "." | ".."))
            {
                return Err(Error::invalid_argument(format!(
                    "bad path segment {bad:?}"
                )));
            }
            url.path_segments_mut()
                .map_err(|_| Error::invalid_argument(format!("{base} cannot be a base url")))?
                .pop_if_empty()
                .extend(&self.segments);
        }
        if !self.query.is_empty() {
            url.query_pairs_mut().extend_pairs(&self.query);
        }
        Ok(url)
    }
}

/// A fully prepared request handed to a [`super::Transport`].
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub target: Target,
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Option<Vec<u8>>,
}

impl HttpRequest {
    /// Path of the URL, for logging and routing.
    pub fn path(&self) -> &str {
        self.url.path()
    }

    /// First value of query parameter `key`.
    pub fn query_param(&self, key: &str) -> Option<String> {
        self.url
            .query_pairs()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.into_owned())
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}
