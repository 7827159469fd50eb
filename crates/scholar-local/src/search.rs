use scholar_core::{Error, Result, SearchProvider, SearchQuery, SearchResult};
use serde::Deserialize;
use std::time::Duration;

pub const DEFAULT_DUCKDUCKGO_ENDPOINT: &str = "https://api.duckduckgo.com/";

/// Related-topic titles are clipped to this many characters.
const MAX_TITLE_CHARS: usize = 100;

fn timeout_ms_from_query(q: &SearchQuery) -> u64 {
    q.timeout_ms.unwrap_or(10_000).clamp(1_000, 60_000)
}

fn duckduckgo_endpoint_from_env() -> Option<String> {
    std::env::var("SCHOLAR_SEARCH_ENDPOINT")
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// DuckDuckGo Instant Answer API (free, no key).
#[derive(Debug, Clone)]
pub struct DuckDuckGoProvider {
    client: reqwest::Client,
    endpoint: String,
}

impl DuckDuckGoProvider {
    pub fn new(client: reqwest::Client) -> Self {
        Self::with_endpoint(client, DEFAULT_DUCKDUCKGO_ENDPOINT)
    }

    pub fn with_endpoint(client: reqwest::Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }

    pub fn from_env(client: reqwest::Client) -> Self {
        match duckduckgo_endpoint_from_env() {
            Some(ep) => Self::with_endpoint(client, ep),
            None => Self::new(client),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct DuckDuckGoResponse {
    #[serde(rename = "Abstract", default)]
    abstract_text: String,
    #[serde(rename = "AbstractURL", default)]
    abstract_url: String,
    #[serde(rename = "Heading", default)]
    heading: Option<String>,
    #[serde(rename = "RelatedTopics", default)]
    related_topics: Vec<DuckDuckGoTopic>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum DuckDuckGoTopic {
    Entry {
        #[serde(rename = "Text")]
        text: String,
        #[serde(rename = "FirstURL", default)]
        first_url: String,
    },
    // Grouped topics (`{"Name": .., "Topics": [..]}`) and anything else we don't use.
    Other(serde_json::Value),
}

fn clip_chars(s: &str, max_chars: usize) -> String {
    s.chars().take(max_chars).collect()
}

/// Normalize a parsed response: the abstract first, then up to `max_results - 1` related topics.
pub(crate) fn results_from_response(
    parsed: DuckDuckGoResponse,
    max_results: usize,
) -> Vec<SearchResult> {
    let mut out = Vec::new();

    if !parsed.abstract_text.is_empty() {
        let title = parsed
            .heading
            .filter(|h| !h.is_empty())
            .unwrap_or_else(|| "Abstract".to_string());
        out.push(SearchResult {
            url: parsed.abstract_url,
            title,
            snippet: parsed.abstract_text,
            source: "DuckDuckGo Abstract".to_string(),
        });
    }

    let topic_budget = max_results.saturating_sub(1);
    for topic in parsed.related_topics.into_iter().take(topic_budget) {
        if let DuckDuckGoTopic::Entry { text, first_url } = topic {
            out.push(SearchResult {
                url: first_url,
                title: clip_chars(&text, MAX_TITLE_CHARS),
                snippet: text,
                source: "DuckDuckGo Related".to_string(),
            });
        }
    }

    out.truncate(max_results);
    out
}

#[async_trait::async_trait]
impl SearchProvider for DuckDuckGoProvider {
    fn name(&self) -> &'static str {
        "duckduckgo"
    }

    async fn search(&self, q: &SearchQuery) -> Result<Vec<SearchResult>> {
        let timeout_ms = timeout_ms_from_query(q);

        let resp = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("q", q.query.as_str()),
                ("format", "json"),
                ("pretty", "1"),
                ("no_redirect", "1"),
                ("no_html", "1"),
                ("skip_disambig", "1"),
            ])
            .timeout(Duration::from_millis(timeout_ms))
            .send()
            .await
            .map_err(|e| Error::Search(e.to_string()))?;
        let status = resp.status();
        if !status.is_success() {
            return Err(Error::Search(format!("duckduckgo search HTTP {status}")));
        }

        // DDG serves JSON as `application/x-javascript`, so parse the bytes ourselves.
        let body = resp
            .bytes()
            .await
            .map_err(|e| Error::Search(e.to_string()))?;
        let parsed: DuckDuckGoResponse =
            serde_json::from_slice(&body).map_err(|e| Error::Search(e.to_string()))?;

        Ok(results_from_response(parsed, q.max_results))
    }
}
