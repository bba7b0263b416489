//! Test doubles shared by the unit tests.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};

use reqwest::StatusCode;
use reqwest::header::HeaderMap;
use tokio::sync::Notify;

use crate::endpoint::{EndpointConfig, PageLocation};
use crate::error::TransportError;
use crate::transport::{ApiResponse, HttpRequest, HttpTransport};

pub const PAGE: &str = "https://hoss.local/ui/";
pub const RESOURCE_BASE: &str = "https://hoss.local/core/v1";
pub const PROVISIONAL_AUTH: &str = "https://hoss.local/auth/v1";
pub const DISCOVER_URL: &str = "https://hoss.local/core/v1/discover";

pub fn page_config() -> EndpointConfig {
    EndpointConfig::from_location(&PageLocation::parse(PAGE).unwrap())
}

pub fn stored_user(id_token: &str) -> String {
    serde_json::json!({ "id_token": id_token, "token_type": "Bearer" }).to_string()
}

// =========================================================================
// MockTransport
// =========================================================================

#[derive(Debug, Clone)]
pub enum MockReply {
    Json(u16, serde_json::Value),
    Raw(u16, String),
    Fail,
}

/// Records every request and answers from per-URL reply queues. The last
/// reply queued for a URL repeats. Unknown URLs answer 404.
#[derive(Default)]
pub struct MockTransport {
    replies: Mutex<HashMap<String, VecDeque<MockReply>>>,
    gates: Mutex<HashMap<String, Arc<Notify>>>,
    requests: Mutex<Vec<HttpRequest>>,
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
}

impl MockTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn on(&self, url: &str, reply: MockReply) {
        lock(&self.replies).entry(url.to_owned()).or_default().push_back(reply);
    }

    pub fn on_discover(&self, auth_service: &str) {
        self.on(DISCOVER_URL, MockReply::Json(200, serde_json::json!({ "alive": "true", "auth_service": auth_service })));
    }

    /// Hold replies for `url` until the returned `Notify` is signalled.
    pub fn gate(&self, url: &str) -> Arc<Notify> {
        let notify = Arc::new(Notify::new());
        lock(&self.gates).insert(url.to_owned(), notify.clone());
        notify
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        lock(&self.requests).clone()
    }

    pub fn requests_to(&self, url: &str) -> Vec<HttpRequest> {
        self.requests().into_iter().filter(|r| r.url == url).collect()
    }

    pub fn call_count(&self) -> usize {
        lock(&self.requests).len()
    }

    fn next_reply(&self, url: &str) -> Option<MockReply> {
        let mut replies = lock(&self.replies);
        let queue = replies.get_mut(url)?;
        if queue.len() > 1 { queue.pop_front() } else { queue.front().cloned() }
    }
}

#[async_trait::async_trait]
impl HttpTransport for MockTransport {
    async fn send(&self, request: HttpRequest) -> Result<ApiResponse, TransportError> {
        let url = request.url.clone();
        lock(&self.requests).push(request);

        let gate = lock(&self.gates).get(&url).cloned();
        if let Some(gate) = gate {
            gate.notified().await;
        }

        let (status, body) = match self.next_reply(&url) {
            Some(MockReply::Json(status, value)) => (status, value.to_string()),
            Some(MockReply::Raw(status, body)) => (status, body),
            Some(MockReply::Fail) => {
                return Err(TransportError::Request { url, message: "connection refused".into() });
            }
            None => (404, r#"{"error":"not found"}"#.to_owned()),
        };

        Ok(ApiResponse {
            url,
            status: StatusCode::from_u16(status).unwrap(),
            headers: HeaderMap::new(),
            body: body.into_bytes(),
        })
    }
}
