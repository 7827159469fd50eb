/// Appended to page text that was cut at `max_chars`.
pub const TRUNCATION_MARKER: &str = "...";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageText {
    pub title: Option<String>,
    pub text: String,
}

fn is_hidden_element(name: &str) -> bool {
    matches!(name, "script" | "style")
}

/// Extract the page title and readable text from an HTML document.
///
/// `script`/`style` subtrees are dropped; the remaining text nodes are joined with single
/// spaces in document order and then whitespace-collapsed with [`collapse_text`].
pub fn extract_page_text(html: &str) -> PageText {
    let doc = html_scraper::Html::parse_document(html);

    let mut parts: Vec<&str> = Vec::new();
    for node in doc.tree.root().descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };
        let hidden = node.ancestors().any(|a| {
            a.value()
                .as_element()
                .is_some_and(|el| is_hidden_element(el.name()))
        });
        if hidden {
            continue;
        }
        parts.push(&text.text);
    }

    PageText {
        title: page_title(&doc),
        text: collapse_text(&parts.join(" ")),
    }
}

fn page_title(doc: &html_scraper::Html) -> Option<String> {
    let sel = html_scraper::Selector::parse("title").ok()?;
    let el = doc.select(&sel).next()?;
    let t = el.text().collect::<String>();
    let t = t.trim().to_string();
    (!t.is_empty()).then_some(t)
}

/// Trim every line, split lines on runs of two spaces, and join the non-empty phrases
/// with single spaces.
pub fn collapse_text(raw: &str) -> String {
    raw.lines()
        .map(str::trim)
        .flat_map(|line| line.split("  "))
        .map(str::trim)
        .filter(|phrase| !phrase.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn truncate_chars(s: &str, max_chars: usize) -> (String, bool) {
    if max_chars == 0 {
        return ("".to_string(), !s.is_empty());
    }
    let mut out = String::new();
    for (n, ch) in s.chars().enumerate() {
        if n >= max_chars {
            return (out, true);
        }
        out.push(ch);
    }
    (out, false)
}

/// Keep at most `max_chars` characters, appending [`TRUNCATION_MARKER`] when anything was cut.
pub fn clip_text(s: &str, max_chars: usize) -> String {
    let (mut out, clipped) = truncate_chars(s, max_chars);
    if clipped {
        out.push_str(TRUNCATION_MARKER);
    }
    out
}
