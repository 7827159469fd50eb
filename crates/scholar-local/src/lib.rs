use futures_util::StreamExt;
use scholar_core::{Error, FetchBackend, FetchRequest, FetchResponse, Result};
use std::time::Duration;

pub mod demo;
pub mod extract;
pub mod search;
pub mod tool;

pub use search::DuckDuckGoProvider;
pub use tool::WebContentTool;

/// Header value sent on page fetches; some sites refuse non-browser agents.
pub const BROWSER_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

/// Build the shared HTTP client for provider calls.
pub fn default_client() -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(concat!("scholar-local/", env!("CARGO_PKG_VERSION")))
        .redirect(reqwest::redirect::Policy::limited(10))
        // Avoid "hang forever" on DNS/TLS/body stalls; per-request timeouts still apply.
        .connect_timeout(Duration::from_secs(10))
        .timeout(Duration::from_secs(30))
        .build()
        .map_err(|e| Error::Fetch(e.to_string()))
}

#[derive(Debug, Clone)]
pub struct HtmlFetcher {
    client: reqwest::Client,
}

impl HtmlFetcher {
    pub fn new() -> Result<Self> {
        Ok(Self::with_client(default_client()?))
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl FetchBackend for HtmlFetcher {
    async fn fetch(&self, req: &FetchRequest) -> Result<FetchResponse> {
        let url = url::Url::parse(&req.url).map_err(|e| Error::InvalidUrl(e.to_string()))?;

        let mut rb = self
            .client
            .get(url)
            .header(reqwest::header::USER_AGENT, BROWSER_USER_AGENT);
        if let Some(to) = req.timeout() {
            rb = rb.timeout(to);
        }
        let resp = rb.send().await.map_err(|e| Error::Fetch(e.to_string()))?;
        let status = resp.status();
        if !status.is_success() {
            return Err(Error::HttpStatus(status.as_u16()));
        }
        let final_url = resp.url().to_string();
        let content_type = resp
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());

        let max_bytes = req.max_bytes.unwrap_or(u64::MAX) as usize;
        let mut truncated = false;
        let mut bytes = Vec::new();
        let mut stream = resp.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| Error::Fetch(e.to_string()))?;
            if bytes.len().saturating_add(chunk.len()) > max_bytes {
                let can_take = max_bytes.saturating_sub(bytes.len());
                bytes.extend_from_slice(&chunk[..can_take]);
                truncated = true;
                break;
            }
            bytes.extend_from_slice(&chunk);
        }

        Ok(FetchResponse {
            url: req.url.clone(),
            final_url,
            status: status.as_u16(),
            content_type,
            bytes,
            truncated,
        })
    }
}
