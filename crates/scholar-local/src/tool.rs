use scholar_core::{
    ContentStatus, Error, FetchBackend, FetchRequest, FetchedContent, Provenance, Result,
    SearchOutcome, SearchProvider, SearchQuery,
};
use std::sync::Arc;

use crate::{demo, extract, DuckDuckGoProvider, HtmlFetcher};

pub const SEARCH_TIMEOUT_MS: u64 = 10_000;
pub const FETCH_TIMEOUT_MS: u64 = 15_000;
/// Upper bound on response bytes read before extraction.
pub const DEFAULT_FETCH_MAX_BYTES: u64 = 2 * 1024 * 1024;

/// Web search + page fetch that never fails: every error degrades to demo content.
///
/// The `provenance` / `status` fields on the returned values are the only way to tell a
/// real result from a placeholder.
#[derive(Clone)]
pub struct WebContentTool {
    search: Arc<dyn SearchProvider>,
    fetcher: Arc<dyn FetchBackend>,
}

impl std::fmt::Debug for WebContentTool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebContentTool")
            .field("search", &self.search.name())
            .finish()
    }
}

impl WebContentTool {
    pub fn new(search: Arc<dyn SearchProvider>, fetcher: Arc<dyn FetchBackend>) -> Self {
        Self { search, fetcher }
    }

    /// DuckDuckGo search + local HTML fetcher sharing one client.
    ///
    /// `search_endpoint` overrides the DuckDuckGo API URL (used by tests and proxies).
    pub fn local(search_endpoint: Option<&str>) -> Result<Self> {
        let client = crate::default_client()?;
        let search = match search_endpoint {
            Some(ep) => DuckDuckGoProvider::with_endpoint(client.clone(), ep),
            None => DuckDuckGoProvider::from_env(client.clone()),
        };
        Ok(Self::new(
            Arc::new(search),
            Arc::new(HtmlFetcher::with_client(client)),
        ))
    }

    pub fn provider_name(&self) -> &'static str {
        self.search.name()
    }

    /// Search for `query`, returning between 1 and `max_results` entries.
    pub async fn search(&self, query: &str, max_results: usize) -> SearchOutcome {
        let max_results = max_results.max(1);
        let q = SearchQuery {
            query: query.to_string(),
            max_results,
            timeout_ms: Some(SEARCH_TIMEOUT_MS),
        };

        let reason = match self.search.search(&q).await {
            Ok(mut results) if !results.is_empty() => {
                results.truncate(max_results);
                return SearchOutcome {
                    results,
                    provenance: Provenance::Live,
                    fallback_reason: None,
                };
            }
            Ok(_) => "provider returned no results".to_string(),
            Err(e) => e.to_string(),
        };

        tracing::warn!(
            provider = self.search.name(),
            reason = %reason,
            "search fell back to demo results"
        );
        let mut results = demo::demo_results(query);
        results.truncate(max_results);
        SearchOutcome {
            results,
            provenance: Provenance::Demo,
            fallback_reason: Some(reason),
        }
    }

    /// Fetch `url` and extract up to `max_chars` characters of readable text.
    pub async fn fetch(&self, url: &str, max_chars: usize) -> FetchedContent {
        if demo::is_demo_url(url) {
            return demo::demo_content(url, None);
        }
        match self.fetch_live(url, max_chars).await {
            Ok(content) => content,
            Err(e) => {
                tracing::warn!(url, error = %e, "fetch fell back to demo content");
                demo::demo_content(url, Some(&e.to_string()))
            }
        }
    }

    async fn fetch_live(&self, url: &str, max_chars: usize) -> Result<FetchedContent> {
        let req = FetchRequest {
            url: url.to_string(),
            timeout_ms: Some(FETCH_TIMEOUT_MS),
            max_bytes: Some(DEFAULT_FETCH_MAX_BYTES),
        };
        let resp = self.fetcher.fetch(&req).await?;
        tracing::debug!(
            url,
            final_url = %resp.final_url,
            content_type = resp.content_type.as_deref().unwrap_or(""),
            bytes = resp.bytes.len(),
            truncated = resp.truncated,
            "page fetched"
        );

        let html = resp.text_lossy();
        let page = tokio::task::spawn_blocking(move || extract::extract_page_text(&html))
            .await
            .map_err(|e| Error::Fetch(format!("extract join failed: {e}")))?;

        let content = extract::clip_text(&page.text, max_chars);
        Ok(FetchedContent {
            url: url.to_string(),
            title: page.title.unwrap_or_else(|| "No Title".to_string()),
            length: content.chars().count(),
            content,
            status: ContentStatus::Success,
            fallback_reason: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::header, http::StatusCode, routing::get, Json, Router};
    use proptest::prelude::*;
    use scholar_core::{FetchResponse, SearchResult};
    use std::net::SocketAddr;
    use std::sync::atomic::{AtomicUsize, Ordering};

    async fn serve(app: Router) -> SocketAddr {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr: SocketAddr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        addr
    }

    struct FixedSearch(Result<Vec<SearchResult>>);

    #[async_trait::async_trait]
    impl SearchProvider for FixedSearch {
        fn name(&self) -> &'static str {
            "fixed"
        }
        async fn search(&self, _q: &SearchQuery) -> Result<Vec<SearchResult>> {
            match &self.0 {
                Ok(v) => Ok(v.clone()),
                Err(e) => Err(Error::Search(e.to_string())),
            }
        }
    }

    /// Counts calls and always fails; proves demo URLs never touch the network.
    #[derive(Default)]
    struct CountingFetch(AtomicUsize);

    #[async_trait::async_trait]
    impl FetchBackend for CountingFetch {
        async fn fetch(&self, _req: &FetchRequest) -> Result<FetchResponse> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Err(Error::Fetch("unreachable".to_string()))
        }
    }

    fn result(n: usize) -> SearchResult {
        SearchResult {
            url: format!("https://r{n}.test/"),
            title: format!("r{n}"),
            snippet: String::new(),
            source: "fixed".to_string(),
        }
    }

    fn tool_with(search: Result<Vec<SearchResult>>) -> (WebContentTool, Arc<CountingFetch>) {
        let fetch = Arc::new(CountingFetch::default());
        let tool = WebContentTool::new(Arc::new(FixedSearch(search)), fetch.clone());
        (tool, fetch)
    }

    #[tokio::test]
    async fn search_failure_degrades_to_demo_results() {
        let (tool, _) = tool_with(Err(Error::Search("boom".to_string())));
        let out = tool.search("volcanoes", 3).await;
        assert_eq!(out.provenance, Provenance::Demo);
        assert_eq!(out.results.len(), 2);
        assert!(out.results[0].title.contains("volcanoes"));
        assert!(out.fallback_reason.unwrap().contains("boom"));
    }

    #[tokio::test]
    async fn empty_search_degrades_to_demo_results() {
        let (tool, _) = tool_with(Ok(vec![]));
        let out = tool.search("q", 5).await;
        assert_eq!(out.provenance, Provenance::Demo);
        assert_eq!(out.results[0].source, "Demo Wikipedia");
    }

    #[tokio::test]
    async fn live_search_is_truncated_to_max_results() {
        let (tool, _) = tool_with(Ok((0..10).map(result).collect()));
        let out = tool.search("q", 4).await;
        assert_eq!(out.provenance, Provenance::Live);
        assert_eq!(out.results.len(), 4);
    }

    #[tokio::test]
    async fn zero_max_results_still_returns_one_entry() {
        let (tool, _) = tool_with(Err(Error::Search("down".to_string())));
        let out = tool.search("q", 0).await;
        assert_eq!(out.results.len(), 1);
    }

    #[tokio::test]
    async fn demo_urls_skip_the_network() {
        let (tool, fetch) = tool_with(Ok(vec![]));
        let a = tool.fetch("", 100).await;
        let b = tool.fetch("https://www.example.com/article", 100).await;
        assert_eq!(a.status, ContentStatus::Demo);
        assert_eq!(b.status, ContentStatus::Demo);
        assert!(a.fallback_reason.is_none());
        assert_eq!(fetch.0.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn fetch_failure_is_tagged_with_reason() {
        let (tool, fetch) = tool_with(Ok(vec![]));
        let out = tool.fetch("https://unreachable.test/", 100).await;
        assert_eq!(fetch.0.load(Ordering::SeqCst), 1);
        assert!(out.is_demo());
        assert!(out.content.contains("Real fetch failed"));
        assert!(out.fallback_reason.unwrap().contains("unreachable"));
    }

    #[tokio::test]
    async fn fetch_extracts_and_truncates_real_pages() {
        let body = format!(
            "<html><head><title>Doc</title><script>nope()</script></head><body><p>{}</p></body></html>",
            "word ".repeat(500)
        );
        let app = Router::new().route(
            "/doc",
            get(move || {
                let b = body.clone();
                async move { ([(header::CONTENT_TYPE, "text/html")], b) }
            }),
        );
        let addr = serve(app).await;

        let tool = WebContentTool::local(Some(&format!("http://{addr}/ddg"))).unwrap();
        let out = tool.fetch(&format!("http://{addr}/doc"), 50).await;
        assert_eq!(out.status, ContentStatus::Success);
        assert_eq!(out.title, "Doc");
        assert!(out.content.ends_with("..."));
        assert!(!out.content.contains("nope"));
        assert_eq!(out.length, 53);
    }

    #[tokio::test]
    async fn fetch_http_error_becomes_demo_content() {
        let app = Router::new().route(
            "/gone",
            get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "err") }),
        );
        let addr = serve(app).await;

        let tool = WebContentTool::local(Some(&format!("http://{addr}/ddg"))).unwrap();
        let out = tool.fetch(&format!("http://{addr}/gone"), 50).await;
        assert_eq!(out.status, ContentStatus::Demo);
        assert_eq!(out.fallback_reason.as_deref(), Some("HTTP status 500"));
    }

    #[tokio::test]
    async fn local_tool_uses_duckduckgo_endpoint_override() {
        let app = Router::new().route(
            "/ddg",
            get(|| async {
                Json(serde_json::json!({
                    "Abstract": "",
                    "RelatedTopics": [
                        {"Text": "Topic one", "FirstURL": "https://one.test/"},
                        {"Text": "Topic two", "FirstURL": "https://two.test/"}
                    ]
                }))
            }),
        );
        let addr = serve(app).await;

        let tool = WebContentTool::local(Some(&format!("http://{addr}/ddg"))).unwrap();
        let out = tool.search("anything", 3).await;
        assert_eq!(out.provenance, Provenance::Live);
        assert_eq!(out.results.len(), 2);
        assert_eq!(out.results[0].url, "https://one.test/");
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]
        #[test]
        fn search_count_is_bounded_even_on_failure(
            n in 0usize..12,
            live in 0usize..15,
            fail in any::<bool>()
        ) {
            let rt = tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap();
            let search = if fail {
                Err(Error::Search("down".to_string()))
            } else {
                Ok((0..live).map(result).collect())
            };
            let (tool, _) = tool_with(search);
            let out = rt.block_on(tool.search("q", n));
            prop_assert!(!out.results.is_empty());
            prop_assert!(out.results.len() <= n.max(1));
        }
    }
}
