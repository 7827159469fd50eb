//! Deterministic placeholder content used whenever a real lookup is skipped or fails.

use scholar_core::{ContentStatus, FetchedContent, SearchResult};

/// URLs under this prefix are never fetched; they always resolve to demo content.
pub const DEMO_URL_PREFIX: &str = "https://www.example.com";

pub fn is_demo_url(url: &str) -> bool {
    url.is_empty() || url.starts_with(DEMO_URL_PREFIX)
}

pub fn demo_results(query: &str) -> Vec<SearchResult> {
    vec![
        SearchResult {
            url: "https://en.wikipedia.org/wiki/Example".to_string(),
            title: format!("About {query} - Wikipedia"),
            snippet: format!(
                "This is demo content about {query}. Wikipedia is a free online encyclopedia."
            ),
            source: "Demo Wikipedia".to_string(),
        },
        SearchResult {
            url: format!("{DEMO_URL_PREFIX}/article"),
            title: format!("{query} - Complete Guide"),
            snippet: format!(
                "Learn everything about {query} in this comprehensive guide with examples."
            ),
            source: "Demo Article".to_string(),
        },
    ]
}

/// Placeholder page content. `error` is the reason a real fetch failed, if one was attempted.
pub fn demo_content(url: &str, error: Option<&str>) -> FetchedContent {
    let content = match error {
        Some(e) => format!("Demo content for {url}. (Note: Real fetch failed: {e})"),
        None => format!(
            "This is demo content fetched from {url}. In a real implementation, this would contain the actual webpage content."
        ),
    };
    FetchedContent {
        url: url.to_string(),
        title: format!("Demo Content - {url}"),
        length: content.chars().count(),
        content,
        status: ContentStatus::Demo,
        fallback_reason: error.map(str::to_string),
    }
}
