//! Shared fixtures for the pipeline tests: a recording transport and
//! synthetic result payloads.

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use reqwest::StatusCode;
use salmon_stats::credentials::{Account, MemoryCredentialStore, SessionProvider};
use salmon_stats::http::{HttpRequest, HttpResponse, Transport};
use salmon_stats::models::{UploadBatch, UploadResponse};
use salmon_stats::{ClientConfig, Result, SalmonStats};
use serde_json::{Value, json};

type Handler = Box<dyn Fn(&HttpRequest) -> Result<HttpResponse> + Send + Sync>;

/// Transport that records every request and answers through a handler.
///
/// Each request stays in flight across a few scheduler yields, so
/// concurrently issued requests overlap and show up in
/// [`MockTransport::peak_in_flight`].
pub struct MockTransport {
    handler: Handler,
    requests: Mutex<Vec<HttpRequest>>,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

impl MockTransport {
    pub fn new(
        handler: impl Fn(&HttpRequest) -> Result<HttpResponse> + Send + Sync + 'static,
    ) -> Arc<Self> {
        Arc::new(Self {
            handler: Box::new(handler),
            requests: Mutex::new(Vec::new()),
            in_flight: AtomicUsize::new(0),
            peak_in_flight: AtomicUsize::new(0),
        })
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().clone()
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().len()
    }

    /// Most requests that were ever in flight at the same time.
    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        self.requests.lock().push(request.clone());
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(current, Ordering::SeqCst);

        // Let concurrent requests interleave.
        for _ in 0..4 {
            tokio::task::yield_now().await;
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        (self.handler)(&request)
    }
}

pub fn test_config() -> ClientConfig {
    ClientConfig {
        game_base_url: "http://game.test/api/".to_string(),
        stats_base_url: "http://stats.test/api/".to_string(),
        ..Default::default()
    }
}

pub fn test_account() -> Account {
    Account::new("0123abcd", "cookie", "session-token")
}

pub fn client(transport: Arc<MockTransport>, api_token: Option<&str>) -> SalmonStats {
    client_with_provider(transport, api_token, test_account(), None)
}

pub fn client_with_provider(
    transport: Arc<MockTransport>,
    api_token: Option<&str>,
    account: Account,
    provider: Option<Arc<dyn SessionProvider>>,
) -> SalmonStats {
    let store = match api_token {
        Some(token) => MemoryCredentialStore::with_api_token(token),
        None => MemoryCredentialStore::new(),
    };
    let mut builder = SalmonStats::builder()
        .config(test_config())
        .transport(transport)
        .credential_store(Arc::new(store))
        .account(account);
    if let Some(provider) = provider {
        builder = builder.session_provider(provider);
    }
    builder.build().expect("client should build")
}

/// Minimal game payload for job `job_id`.
pub fn result_json(job_id: u64) -> Value {
    json!({
        "id": job_id,
        "start_at": 1_618_045_200 + job_id as i64,
        "members": ["0123abcd"],
        "danger_rate": 200.0,
        "clear_waves": 3,
        "golden_egg_delivered": 50,
        "power_egg_collected": 2000,
        "boss_appearances": {"3": 1},
        "boss_appearance_count": 1,
        "boss_elimination_count": 1,
        "player_results": [],
        "waves": []
    })
}

pub fn json_response(value: &Value) -> Result<HttpResponse> {
    HttpResponse::json(value)
}

pub fn status(code: StatusCode) -> Result<HttpResponse> {
    Ok(HttpResponse::new(code, "error"))
}

/// Job id of `/api/results/{id}`.
pub fn result_id(request: &HttpRequest) -> Option<u64> {
    request
        .path()
        .strip_prefix("/api/results/")
        .and_then(|id| id.parse().ok())
}

/// Answer an upload with one response per submitted record, in reverse order.
pub fn upload_reply(request: &HttpRequest) -> Result<HttpResponse> {
    let batch = uploaded_batch(request);
    let responses: Vec<UploadResponse> = batch
        .results
        .iter()
        .rev()
        .map(|record| UploadResponse {
            job_id: record.job_id,
            salmon_id: 10_000 + record.job_id,
            created: true,
        })
        .collect();
    HttpResponse::json(&responses)
}

pub fn uploaded_batch(request: &HttpRequest) -> UploadBatch {
    let body = request.body.as_deref().expect("upload has a body");
    serde_json::from_slice(body).expect("upload body is a batch")
}
