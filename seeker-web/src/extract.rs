use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use url::Url;

/// An organic link on a search results page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResult {
    pub url: Url,
    pub title: String,
}

/// Readable content of a fetched page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageText {
    pub title: Option<String>,
    pub text: String,
}

/// Elements whose text never belongs to the page's content.
const SKIPPED: &[&str] = &[
    "script", "style", "noscript", "template", "svg", "nav", "header", "footer", "aside", "form",
    "button", "iframe",
];

/// Elements that start a new line of text.
const BLOCKS: &[&str] = &[
    "p", "div", "section", "article", "main", "li", "ul", "ol", "table", "tr", "h1", "h2", "h3",
    "h4", "h5", "h6", "br", "pre", "blockquote", "dd", "dt",
];

/// Where readable content is looked for, most specific first.
const CONTENT_ROOTS: &[&str] = &["main", "article", r#"[role="main"]"#, ".content", "body"];

fn select_first<'a>(doc: &'a Html, css: &str) -> Option<ElementRef<'a>> {
    let sel = Selector::parse(css).ok()?;
    doc.select(&sel).next()
}

fn text_of(el: ElementRef<'_>) -> String {
    el.text().collect::<Vec<_>>().join(" ").split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Resolve a result link, unwrapping Google's `/url?q=` redirects. Only
/// off-site http(s) targets are kept.
fn resolve_result_href(href: &str, base: &Url) -> Option<Url> {
    let joined = base.join(href).ok()?;
    let target = if joined.path() == "/url" {
        let q = joined
            .query_pairs()
            .find(|(k, _)| k == "q" || k == "url")
            .map(|(_, v)| v.into_owned())?;
        Url::parse(&q).ok()?
    } else {
        joined
    };

    if !matches!(target.scheme(), "http" | "https") {
        return None;
    }
    let host = target.host_str()?;
    let is_google = host == "google.com"
        || host.ends_with(".google.com")
        || host.starts_with("google.")
        || host.contains(".google.")
        || host.ends_with("googleusercontent.com");
    (!is_google).then_some(target)
}

/// Organic results in page order, deduplicated by URL.
///
/// Two shapes are recognized: anchors wrapping an `h3` title (the scripted
/// page) and `/url?q=` redirect anchors (the basic HTML page).
pub fn extract_results(html: &str, base: &Url) -> Vec<SearchResult> {
    let doc = Html::parse_document(html);
    let (Ok(anchors), Ok(h3)) = (Selector::parse("a[href]"), Selector::parse("h3")) else {
        return Vec::new();
    };

    let mut seen = HashSet::new();
    let mut results = Vec::new();
    for a in doc.select(&anchors) {
        let Some(href) = a.value().attr("href") else {
            continue;
        };
        let heading = a.select(&h3).next().map(text_of);
        if heading.is_none() && !href.starts_with("/url?") {
            continue;
        }
        let Some(url) = resolve_result_href(href, base) else {
            continue;
        };
        let title = heading.unwrap_or_else(|| text_of(a));
        if title.is_empty() || !seen.insert(url.clone()) {
            continue;
        }
        results.push(SearchResult { url, title });
    }
    results
}

fn collect_text(el: ElementRef<'_>, out: &mut String) {
    for child in el.children() {
        if let Some(text) = child.value().as_text() {
            // Source line breaks are not content line breaks.
            out.extend(text.chars().map(|c| if c.is_whitespace() { ' ' } else { c }));
        } else if let Some(child_el) = ElementRef::wrap(child) {
            let element = child_el.value();
            let name = element.name();
            if SKIPPED.contains(&name)
                || element.attr("role") == Some("navigation")
                || element.attr("aria-hidden") == Some("true")
            {
                continue;
            }
            let block = BLOCKS.contains(&name);
            if block {
                out.push('\n');
            }
            collect_text(child_el, out);
            if block {
                out.push('\n');
            }
        }
    }
}

/// Main text of a page, one line per block, capped at `max_chars`
/// characters.
pub fn extract_page_text(html: &str, max_chars: usize) -> PageText {
    let doc = Html::parse_document(html);
    let title = select_first(&doc, "title")
        .or_else(|| select_first(&doc, "h1"))
        .map(text_of)
        .filter(|t| !t.is_empty());

    let mut raw = String::new();
    if let Some(root) = CONTENT_ROOTS.iter().find_map(|css| select_first(&doc, css)) {
        collect_text(root, &mut raw);
    }

    let text = raw
        .lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n");

    let text = match text.char_indices().nth(max_chars) {
        Some((cut, _)) => text[..cut].to_string(),
        None => text,
    };
    PageText { title, text }
}
