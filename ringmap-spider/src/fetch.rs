use crate::error::{Result, SpiderError};
use async_trait::async_trait;
use reqwest::Client;
use tokio::sync::Semaphore;
use tracing::debug;

const USER_AGENT: &str = concat!(
    "Mozilla/5.0 (Linux x86_64) ",
    "AppleWebKit/537.36 (KHTML, like Gecko) ",
    "Chrome/124.0.0.0 ",
    "Safari/537.36 ",
    "Ringmap/0.2 (+https://github.com/ringmap/ringmap)",
);

/// A fetched page as the classifier sees it. The body is kept as raw bytes
/// because platform signatures are matched before any text decoding.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub url: String,
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

impl FetchedPage {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn is_html(&self) -> bool {
        self.content_type
            .as_deref()
            .map(|ct| ct.starts_with("text/html"))
            .unwrap_or(false)
    }

    pub fn is_json(&self) -> bool {
        self.content_type
            .as_deref()
            .map(|ct| ct.starts_with("application/json"))
            .unwrap_or(false)
    }

    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// The classifier's only view of the network. Each call is final: there is
/// no retry behind this boundary, a failure terminates the calling branch.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<FetchedPage>;
}

/// Real fetcher: one pooled reqwest client plus a semaphore bounding total
/// in-flight requests across every discovery branch.
pub struct HttpFetcher {
    client: Client,
    permits: Semaphore,
}

impl HttpFetcher {
    pub fn new(max_in_flight: usize, timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .connect_timeout(std::time::Duration::from_secs(timeout_secs.div_ceil(2)))
            .pool_max_idle_per_host(10)
            .pool_idle_timeout(std::time::Duration::from_secs(90))
            .tcp_keepalive(std::time::Duration::from_secs(60))
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()?;

        Ok(Self {
            client,
            permits: Semaphore::new(max_in_flight),
        })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedPage> {
        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|e| SpiderError::Other(format!("fetch pool closed: {}", e)))?;

        debug!("Fetching {}", url);
        let response = self.client.get(url).send().await?;
        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());
        let final_url = response.url().to_string();
        let body = response.bytes().await?.to_vec();

        Ok(FetchedPage {
            url: final_url,
            status,
            content_type,
            body,
        })
    }
}
