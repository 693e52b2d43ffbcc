//! Fetch layer for the audit engine
//!
//! This module contains everything that touches the network:
//! - Building the HTTP client with the audit's identifying user agent
//! - GET requests with manual redirect tracking and body decoding
//! - HEAD probes used for link existence checks
//! - The per-audit single-flight page cache

mod cache;
mod client;
mod decode;

pub use cache::PageCache;
pub use client::{build_http_client, fetch_page, probe_url, FetchError, Probe, RequestOptions};

use reqwest::header::HeaderMap;
use reqwest::StatusCode;
use std::time::Duration;
use url::Url;

/// A fetched document, owned by the page cache for the lifetime of one audit
#[derive(Debug, Clone)]
pub struct PageFetch {
    /// The URL that was requested
    pub url: String,

    /// HTTP status code of the final response
    pub status_code: u16,

    /// Response headers of the final response
    pub headers: HeaderMap,

    /// Decoded body text
    pub body: String,

    /// Size of the decoded body in bytes
    pub body_bytes: usize,

    /// Wall-clock time from first request to body fully read
    pub elapsed: Duration,

    /// Final URL after redirects
    pub final_url: Url,

    /// URLs that answered with a redirect, in order
    pub redirect_chain: Vec<String>,
}

impl PageFetch {
    /// Builds a fetch record for a document that is already in memory
    ///
    /// Used when analyzing HTML that did not come over the network.
    pub fn from_html(url: &Url, html: &str) -> Self {
        Self {
            url: url.to_string(),
            status_code: StatusCode::OK.as_u16(),
            headers: HeaderMap::new(),
            body: html.to_string(),
            body_bytes: html.len(),
            elapsed: Duration::ZERO,
            final_url: url.clone(),
            redirect_chain: Vec::new(),
        }
    }

    /// Returns a header value as text, if present and valid UTF-8
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }

    pub fn is_https(&self) -> bool {
        self.final_url.scheme() == "https"
    }
}
