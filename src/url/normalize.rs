use crate::UrlError;
use url::Url;

/// Path extensions that mark a link as an asset rather than a page
const ASSET_EXTENSIONS: &[&str] = &[
    "jpg", "jpeg", "png", "gif", "webp", "svg", "ico", "pdf", "css", "js", "json", "xml",
    "zip", "mp3", "mp4", "woff", "woff2",
];

/// Normalizes a user-supplied audit target into an absolute URL
///
/// # Normalization Steps
///
/// 1. Trim surrounding whitespace
/// 2. Default to `https://` when no scheme is given
/// 3. Parse the URL; reject if malformed
/// 4. Only HTTP and HTTPS are accepted
/// 5. A host is required
///
/// # Examples
///
/// ```
/// use seo_audit::url::normalize_target;
///
/// let url = normalize_target("example.com/shop").unwrap();
/// assert_eq!(url.as_str(), "https://example.com/shop");
/// ```
pub fn normalize_target(input: &str) -> Result<Url, UrlError> {
    let trimmed = input.trim();
    let lower = trimmed.to_lowercase();

    let candidate = if lower.starts_with("http://") || lower.starts_with("https://") {
        trimmed.to_string()
    } else if trimmed.contains("://") {
        let scheme = trimmed.split("://").next().unwrap_or_default();
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            scheme
        )));
    } else {
        format!("https://{}", trimmed)
    };

    let url = Url::parse(&candidate).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.host_str().map_or(true, str::is_empty) {
        return Err(UrlError::MissingDomain);
    }

    Ok(url)
}

/// Resolves a link href against a base URL
///
/// Returns None if the link does not point at another web document:
/// - javascript:, mailto:, tel: schemes
/// - data: URIs
/// - fragment-only hrefs (same page anchors)
/// - Non-HTTP(S) URLs after resolution
pub fn resolve_link(href: &str, base_url: &Url) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let lower = href.to_lowercase();
    if lower.starts_with("javascript:")
        || lower.starts_with("mailto:")
        || lower.starts_with("tel:")
        || lower.starts_with("data:")
    {
        return None;
    }

    match base_url.join(href) {
        Ok(absolute_url) if matches!(absolute_url.scheme(), "http" | "https") => {
            Some(absolute_url)
        }
        _ => None,
    }
}

/// Returns true if a same-site URL looks like an HTML page worth crawling
///
/// URLs carrying a fragment and URLs whose last path segment has an asset
/// extension (images, documents, stylesheets, scripts) are rejected.
pub fn is_page_candidate(url: &Url) -> bool {
    if url.fragment().is_some() {
        return false;
    }

    let last_segment = url
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .unwrap_or_default();

    match last_segment.rsplit_once('.') {
        Some((_, ext)) => !ASSET_EXTENSIONS.contains(&ext.to_lowercase().as_str()),
        None => true,
    }
}
