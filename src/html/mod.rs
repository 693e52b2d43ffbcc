//! HTML helpers shared by the analyzers
//!
//! `scraper::Html` is not `Send`, so documents are parsed and queried inside
//! synchronous functions; only owned data leaves them.

use scraper::node::Node;
use scraper::{ElementRef, Html, Selector};

/// Containers whose text does not count as page content
pub const NON_CONTENT_TAGS: [&str; 6] = ["script", "style", "nav", "footer", "header", "noscript"];

/// Returns every element matching `css`; an invalid selector matches nothing
pub fn select_all<'a>(document: &'a Html, css: &str) -> Vec<ElementRef<'a>> {
    match Selector::parse(css) {
        Ok(selector) => document.select(&selector).collect(),
        Err(_) => Vec::new(),
    }
}

/// Returns every descendant of `element` matching `css`
pub fn select_all_within<'a>(element: &ElementRef<'a>, css: &str) -> Vec<ElementRef<'a>> {
    match Selector::parse(css) {
        Ok(selector) => element.select(&selector).collect(),
        Err(_) => Vec::new(),
    }
}

/// Returns the first element matching `css`
pub fn select_first<'a>(document: &'a Html, css: &str) -> Option<ElementRef<'a>> {
    let selector = Selector::parse(css).ok()?;
    document.select(&selector).next()
}

/// Counts elements matching `css`
pub fn count(document: &Html, css: &str) -> usize {
    select_all(document, css).len()
}

/// Element text with each text node trimmed and the pieces concatenated
pub fn stripped_text(element: &ElementRef<'_>) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|piece| !piece.is_empty())
        .collect()
}

/// Raw element text, untrimmed
pub fn element_text(element: &ElementRef<'_>) -> String {
    element.text().collect()
}

/// Reads an attribute, returning `None` when it is missing or blank
pub fn attr<'a>(element: &ElementRef<'a>, name: &str) -> Option<&'a str> {
    element
        .value()
        .attr(name)
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

/// True when the element's `rel` attribute contains a token satisfying `predicate`
pub fn has_rel(element: &ElementRef<'_>, predicate: impl Fn(&str) -> bool) -> bool {
    element
        .value()
        .attr("rel")
        .map(|rel| {
            rel.split_ascii_whitespace()
                .any(|token| predicate(&token.to_ascii_lowercase()))
        })
        .unwrap_or(false)
}

/// Content of the first `<meta name="...">` tag, trimmed
pub fn meta_content(document: &Html, name: &str) -> Option<String> {
    let element = select_first(document, &format!("meta[name=\"{}\"]", name))?;
    attr(&element, "content").map(str::to_string)
}

/// True when the element sits inside one of the non-content containers
pub fn is_boilerplate(element: &ElementRef<'_>) -> bool {
    element.ancestors().any(|node| match node.value() {
        Node::Element(el) => NON_CONTENT_TAGS.contains(&el.name()),
        _ => false,
    })
}

/// Human-visible text of the document
///
/// Text inside script, style, nav, footer, header and noscript elements is
/// dropped; remaining text nodes are trimmed and joined with single spaces.
pub fn visible_text(document: &Html) -> String {
    let mut pieces: Vec<&str> = Vec::new();

    for node in document.root_element().descendants() {
        let Node::Text(text) = node.value() else {
            continue;
        };

        let hidden = node.ancestors().any(|ancestor| match ancestor.value() {
            Node::Element(el) => NON_CONTENT_TAGS.contains(&el.name()),
            _ => false,
        });
        if hidden {
            continue;
        }

        let piece = text.trim();
        if !piece.is_empty() {
            pieces.push(piece);
        }
    }

    pieces.join(" ")
}

/// Truncates to at most `max` characters
pub fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}
