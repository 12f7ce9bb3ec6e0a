//! Readability-style main content extraction
//!
//! Picks the element most likely to hold the page's main text, strips
//! navigation and other boilerplate from it, and renders it as markdown.

use std::collections::HashMap;

use scraper::{ElementRef, Html, Node, Selector};

/// Marker returned when a page has no extractable content
pub const EXTRACTION_FAILED: &str = "<error>Page failed to be simplified from HTML</error>";

/// Semantic containers that win outright when they hold this much text
const MIN_ARTICLE_CHARS: usize = 140;

/// Elements dropped together with everything inside them
const DROP_TAGS: &[&str] = &[
    "script", "style", "noscript", "template", "nav", "header", "footer", "aside", "form",
    "iframe", "svg", "button", "select", "textarea", "head",
];

/// Class or id tokens that mark boilerplate
const DROP_MARKERS: &[&str] = &[
    "nav", "navbar", "menu", "sidebar", "advert", "ad", "ads", "promo", "cookie", "cookies",
    "banner", "comments", "comment", "share", "social", "breadcrumb", "breadcrumbs",
];

/// Elements kept in the cleaned markup; anything else is unwrapped
const KEEP_TAGS: &[&str] = &[
    "p", "h1", "h2", "h3", "h4", "h5", "h6", "a", "ul", "ol", "li", "strong", "em", "b", "i",
    "code", "pre", "blockquote", "br", "hr",
];

/// Extract the main content of an HTML page as markdown
///
/// Returns `None` when nothing readable is left after cleaning.
pub fn extract_markdown(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let root = content_root(&document)?;

    let mut cleaned = String::new();
    write_clean(root, &mut cleaned);

    let markdown = atx_headings(&html2md::parse_html(&cleaned));
    let markdown = markdown.trim();
    if markdown.is_empty() {
        None
    } else {
        Some(markdown.to_string())
    }
}

/// Extract the main content, falling back to the failure marker
pub fn extract_content_from_html(html: &str) -> String {
    extract_markdown(html).unwrap_or_else(|| EXTRACTION_FAILED.to_string())
}

/// Rewrite setext headings (text over a `===` or `---` line) as `#`/`##`
fn atx_headings(markdown: &str) -> String {
    let lines: Vec<&str> = markdown.lines().collect();
    let mut out = Vec::with_capacity(lines.len());
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i];
        match lines.get(i + 1).and_then(|next| setext_level(next)) {
            Some(level) if !line.trim().is_empty() => {
                out.push(format!("{} {}", "#".repeat(level), line.trim()));
                i += 2;
            }
            _ => {
                out.push(line.to_string());
                i += 1;
            }
        }
    }

    out.join("\n")
}

fn setext_level(line: &str) -> Option<usize> {
    let line = line.trim_end();
    if line.len() < 3 {
        return None;
    }
    if line.chars().all(|c| c == '=') {
        Some(1)
    } else if line.chars().all(|c| c == '-') {
        Some(2)
    } else {
        None
    }
}

fn content_root(document: &Html) -> Option<ElementRef<'_>> {
    for css in ["article", "main", "[role=\"main\"]"] {
        let Ok(selector) = Selector::parse(css) else {
            continue;
        };
        if let Some(el) = document
            .select(&selector)
            .find(|el| !is_boilerplate(el) && text_len(el) >= MIN_ARTICLE_CHARS)
        {
            return Some(el);
        }
    }

    best_paragraph_container(document).or_else(|| {
        let body = Selector::parse("body").ok()?;
        document.select(&body).next()
    })
}

/// The element whose direct `<p>` children carry the most text
fn best_paragraph_container(document: &Html) -> Option<ElementRef<'_>> {
    let paragraphs = Selector::parse("p").ok()?;
    let mut scores: HashMap<_, usize> = HashMap::new();

    for p in document.select(&paragraphs) {
        let Some(parent) = p.parent().and_then(ElementRef::wrap) else {
            continue;
        };
        if is_boilerplate(&parent) || has_boilerplate_ancestor(&parent) {
            continue;
        }
        *scores.entry(parent.id()).or_default() += text_len(&p);
    }

    let (id, _) = scores
        .into_iter()
        .filter(|(_, score)| *score > 0)
        .max_by_key(|(_, score)| *score)?;
    document.tree.get(id).and_then(ElementRef::wrap)
}

fn text_len(el: &ElementRef<'_>) -> usize {
    el.text().map(|t| t.trim().len()).sum()
}

fn is_boilerplate(el: &ElementRef<'_>) -> bool {
    let element = el.value();
    if DROP_TAGS.contains(&element.name()) {
        return true;
    }
    if element.attr("aria-hidden") == Some("true") {
        return true;
    }
    if element.attr("role") == Some("navigation") {
        return true;
    }

    ["class", "id"].iter().filter_map(|attr| element.attr(attr)).any(|value| {
        value
            .split(|c: char| c.is_whitespace() || c == '-' || c == '_')
            .any(|token| DROP_MARKERS.contains(&token.to_ascii_lowercase().as_str()))
    })
}

fn has_boilerplate_ancestor(el: &ElementRef<'_>) -> bool {
    el.ancestors()
        .filter_map(ElementRef::wrap)
        .any(|ancestor| is_boilerplate(&ancestor))
}

/// Serialize `el`'s children, dropping boilerplate and unwrapping unknown tags
fn write_clean(el: ElementRef<'_>, out: &mut String) {
    for child in el.children() {
        match child.value() {
            Node::Text(text) => escape_text(text, out),
            Node::Element(_) => {
                let Some(child) = ElementRef::wrap(child) else {
                    continue;
                };
                if is_boilerplate(&child) {
                    continue;
                }

                let name = child.value().name();
                if !KEEP_TAGS.contains(&name) {
                    write_clean(child, out);
                    continue;
                }

                out.push('<');
                out.push_str(name);
                if name == "a" {
                    if let Some(href) = child.value().attr("href") {
                        out.push_str(" href=\"");
                        escape_attr(href, out);
                        out.push('"');
                    }
                }
                out.push('>');

                if name == "br" || name == "hr" {
                    continue;
                }

                write_clean(child, out);
                out.push_str("</");
                out.push_str(name);
                out.push('>');
            }
            _ => {}
        }
    }
}

fn escape_text(text: &str, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
}

fn escape_attr(value: &str, out: &mut String) {
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '<' => out.push_str("&lt;"),
            _ => out.push(c),
        }
    }
}
