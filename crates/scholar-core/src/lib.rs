use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("invalid url: {0}")]
    InvalidUrl(String),
    #[error("fetch failed: {0}")]
    Fetch(String),
    #[error("HTTP status {0}")]
    HttpStatus(u16),
    #[error("search failed: {0}")]
    Search(String),
    #[error("template error: {0}")]
    Template(String),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Where a value came from: a real upstream call, or the deterministic placeholder set.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Provenance {
    Live,
    Demo,
}

impl Provenance {
    pub fn as_str(self) -> &'static str {
        match self {
            Provenance::Live => "live",
            Provenance::Demo => "demo",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchQuery {
    pub query: String,
    pub max_results: usize,
    pub timeout_ms: Option<u64>,
}

impl SearchQuery {
    pub fn new(query: impl Into<String>, max_results: usize) -> Self {
        Self {
            query: query.into(),
            max_results,
            timeout_ms: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SearchResult {
    pub url: String,
    pub title: String,
    pub snippet: String,
    pub source: String,
}

/// Result of a search that always carries at least one entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchOutcome {
    pub results: Vec<SearchResult>,
    pub provenance: Provenance,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_reason: Option<String>,
}

#[async_trait::async_trait]
pub trait SearchProvider: Send + Sync {
    fn name(&self) -> &'static str;
    async fn search(&self, q: &SearchQuery) -> Result<Vec<SearchResult>>;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchRequest {
    pub url: String,
    pub timeout_ms: Option<u64>,
    /// Hard cap on bytes read from the response body.
    pub max_bytes: Option<u64>,
}

impl FetchRequest {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }
}

#[derive(Debug, Clone)]
pub struct FetchResponse {
    pub url: String,
    pub final_url: String,
    pub status: u16,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
    pub truncated: bool,
}

impl FetchResponse {
    pub fn text_lossy(&self) -> String {
        String::from_utf8_lossy(&self.bytes).to_string()
    }
}

#[async_trait::async_trait]
pub trait FetchBackend: Send + Sync {
    async fn fetch(&self, req: &FetchRequest) -> Result<FetchResponse>;
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ContentStatus {
    Success,
    Demo,
}

impl ContentStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ContentStatus::Success => "success",
            ContentStatus::Demo => "demo",
        }
    }
}

/// Readable page text, either extracted from a real fetch or a demo placeholder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchedContent {
    pub url: String,
    pub title: String,
    pub content: String,
    /// Character count of `content`.
    pub length: usize,
    pub status: ContentStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_reason: Option<String>,
}

impl FetchedContent {
    pub fn is_demo(&self) -> bool {
        self.status == ContentStatus::Demo
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Citation {
    pub url: String,
    pub title: String,
    pub snippet: String,
}

impl Citation {
    pub fn new(url: &str, title: &str, snippet: &str) -> Self {
        Self {
            url: url.to_string(),
            title: title.to_string(),
            snippet: snippet.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TraceStatus {
    Success,
    Error,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceEntry {
    pub timestamp: String,
    pub agent: String,
    pub action: String,
    pub tool: String,
    pub input: serde_json::Value,
    pub output: serde_json::Value,
    pub status: TraceStatus,
}

impl TraceEntry {
    /// Build an entry stamped with the current UTC time.
    pub fn now(
        agent: &str,
        action: &str,
        tool: &str,
        input: serde_json::Value,
        output: serde_json::Value,
        status: TraceStatus,
    ) -> Self {
        Self {
            timestamp: chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Micros, true),
            agent: agent.to_string(),
            action: action.to_string(),
            tool: tool.to_string(),
            input,
            output,
            status,
        }
    }
}

/// Append-only execution log for a single query.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Trace(Vec<TraceEntry>);

impl Trace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: TraceEntry) {
        self.0.push(entry);
    }

    pub fn entries(&self) -> &[TraceEntry] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn actions(&self) -> Vec<&str> {
        self.0.iter().map(|e| e.action.as_str()).collect()
    }
}

/// The full response returned to a caller of `/api/ask`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResearchResult {
    pub answer: String,
    pub reasoning: String,
    pub citations: Vec<Citation>,
    pub trace: Trace,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trace_entry_serializes_with_lowercase_status() {
        let e = TraceEntry::now(
            "analyzer",
            "validate_information",
            "content_validator",
            serde_json::json!({"sources": 3}),
            serde_json::json!({"ok": true}),
            TraceStatus::Success,
        );
        let v = serde_json::to_value(&e).unwrap();
        assert_eq!(v["status"], "success");
        assert_eq!(v["agent"], "analyzer");
        assert_eq!(v["input"]["sources"], 3);
        assert!(v["timestamp"].as_str().unwrap().ends_with('Z'));
    }

    #[test]
    fn trace_serializes_as_plain_array() {
        let mut t = Trace::new();
        t.push(TraceEntry::now(
            "a",
            "b",
            "c",
            serde_json::json!({}),
            serde_json::json!({}),
            TraceStatus::Error,
        ));
        let v = serde_json::to_value(&t).unwrap();
        assert!(v.is_array());
        assert_eq!(v[0]["status"], "error");
        assert_eq!(t.actions(), vec!["b"]);
    }

    #[test]
    fn fetched_content_omits_absent_fallback_reason() {
        let c = FetchedContent {
            url: "https://x".to_string(),
            title: "t".to_string(),
            content: "c".to_string(),
            length: 1,
            status: ContentStatus::Success,
            fallback_reason: None,
        };
        let v = serde_json::to_value(&c).unwrap();
        assert_eq!(v["status"], "success");
        assert!(v.get("fallback_reason").is_none());
        assert!(!c.is_demo());
    }

    #[test]
    fn provenance_round_trips_through_lowercase_strings() {
        assert_eq!(serde_json::to_value(Provenance::Demo).unwrap(), "demo");
        assert_eq!(Provenance::Live.as_str(), "live");
    }
}
