use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use rand::RngExt;
use reqwest::Client;
use reqwest::header::{ACCEPT, CONTENT_TYPE, RANGE, USER_AGENT};
use url::Url;

use crate::error::Rejection;

pub const DEFAULT_USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.6 Safari/605.1.15",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/126.0.0.0 Safari/537.36",
];

/// Bytes requested by a stream probe; enough for the server to commit to a
/// content type without transferring media.
const PROBE_RANGE: &str = "bytes=0-1023";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpReply {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: String,
}

impl HttpReply {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Status and declared content type of a partial media fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeReply {
    pub status: u16,
    pub content_type: Option<String>,
}

/// HTTP seam used by the pool, dispatcher and probe.
///
/// Failures to get any response at all are reported as
/// [`Rejection::Transport`]; status codes are left to the caller.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, url: &Url, timeout: Duration) -> Result<HttpReply, Rejection>;

    async fn probe(&self, url: &Url, timeout: Duration) -> Result<ProbeReply, Rejection>;
}

pub fn default_client() -> Client {
    Client::builder()
        .gzip(true)
        .deflate(true)
        .connect_timeout(Duration::from_secs(10))
        .pool_max_idle_per_host(4)
        .build()
        .expect("Failed to create HTTP client")
}

#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
    user_agents: Arc<[String]>,
}

impl Default for ReqwestTransport {
    fn default() -> Self {
        Self::new(
            default_client(),
            DEFAULT_USER_AGENTS.iter().map(|s| s.to_string()).collect(),
        )
    }
}

impl ReqwestTransport {
    pub fn new(client: Client, user_agents: Vec<String>) -> Self {
        let user_agents = if user_agents.is_empty() {
            DEFAULT_USER_AGENTS.iter().map(|s| s.to_string()).collect()
        } else {
            user_agents
        };
        Self {
            client,
            user_agents: user_agents.into(),
        }
    }

    fn user_agent(&self) -> &str {
        let index = rand::rng().random_range(0..self.user_agents.len());
        &self.user_agents[index]
    }
}

fn content_type(response: &reqwest::Response) -> Option<String> {
    response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.to_string())
}

fn transport_rejection(url: &Url, err: reqwest::Error) -> Rejection {
    if err.is_timeout() {
        Rejection::transport(format!("{url}: timed out"))
    } else {
        Rejection::transport(format!("{url}: {err}"))
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn get(&self, url: &Url, timeout: Duration) -> Result<HttpReply, Rejection> {
        let response = self
            .client
            .get(url.clone())
            .header(USER_AGENT, self.user_agent())
            .header(ACCEPT, "application/json")
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| transport_rejection(url, e))?;

        let status = response.status().as_u16();
        let content_type = content_type(&response);
        let body = response
            .text()
            .await
            .map_err(|e| transport_rejection(url, e))?;

        Ok(HttpReply {
            status,
            content_type,
            body,
        })
    }

    async fn probe(&self, url: &Url, timeout: Duration) -> Result<ProbeReply, Rejection> {
        let response = self
            .client
            .get(url.clone())
            .header(USER_AGENT, self.user_agent())
            .header(RANGE, PROBE_RANGE)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| transport_rejection(url, e))?;

        // The body is never read; dropping the response closes the stream.
        Ok(ProbeReply {
            status: response.status().as_u16(),
            content_type: content_type(&response),
        })
    }
}
