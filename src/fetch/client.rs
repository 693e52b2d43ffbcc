//! HTTP client and request handling
//!
//! This module handles all HTTP requests for the audit, including:
//! - Building HTTP clients with the identifying user agent string
//! - GET requests that record the redirect chain
//! - HEAD probes for link existence checks
//! - Error classification

use crate::config::{FetchConfig, UserAgentConfig};
use crate::fetch::decode::decode_body;
use crate::fetch::PageFetch;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT_ENCODING, CONTENT_ENCODING, LOCATION};
use reqwest::{redirect::Policy, Client, Method, Response};
use std::collections::HashSet;
use std::time::{Duration, Instant};
use thiserror::Error;
use url::Url;

/// Transport-level failures
///
/// These never escape the fetch layer: callers see an absent page instead.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("Connection failed for {url}")]
    Connect { url: String },

    #[error("Too many redirects from {url}")]
    RedirectLimit { url: String },

    #[error("Redirect loop detected at {url}")]
    RedirectLoop { url: String },

    #[error("Invalid URL {url}: {message}")]
    InvalidUrl { url: String, message: String },

    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },
}

impl FetchError {
    fn classify(url: &str, error: reqwest::Error) -> Self {
        let url = url.to_string();
        if error.is_timeout() {
            FetchError::Timeout { url }
        } else if error.is_connect() {
            FetchError::Connect { url }
        } else {
            FetchError::Http { url, source: error }
        }
    }

    /// Short machine-friendly reason, used in broken-link details
    pub fn reason(&self) -> &'static str {
        match self {
            FetchError::Timeout { .. } => "timeout",
            FetchError::Connect { .. } => "connection failed",
            FetchError::RedirectLimit { .. } => "too many redirects",
            FetchError::RedirectLoop { .. } => "redirect loop",
            FetchError::InvalidUrl { .. } => "invalid url",
            FetchError::Http { .. } => "transport error",
        }
    }
}

/// Per-request limits
#[derive(Debug, Clone, Copy)]
pub struct RequestOptions {
    /// Upper bound for the whole request, redirects and body included
    pub timeout: Duration,

    /// Maximum number of redirect hops followed
    pub max_redirects: u32,
}

impl RequestOptions {
    pub fn new(timeout: Duration, max_redirects: u32) -> Self {
        Self {
            timeout,
            max_redirects,
        }
    }

    pub fn root(config: &FetchConfig) -> Self {
        Self::new(Duration::from_secs(config.root_timeout), config.max_redirects)
    }

    pub fn probe(config: &FetchConfig) -> Self {
        Self::new(Duration::from_secs(config.probe_timeout), config.max_redirects)
    }

    pub fn crawl(config: &FetchConfig) -> Self {
        Self::new(Duration::from_secs(config.crawl_timeout), config.max_redirects)
    }
}

/// Result of a HEAD existence probe
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Probe {
    /// The server answered with this final status
    Status(u16),
    /// No answer: timeout, connection failure, redirect trouble
    Failed(String),
}

impl Probe {
    /// A link is broken when it answers >= 400 or not at all
    pub fn is_broken(&self) -> bool {
        match self {
            Probe::Status(code) => *code >= 400,
            Probe::Failed(_) => true,
        }
    }
}

/// Builds an HTTP client with proper configuration
///
/// Redirects are followed manually so the chain can be recorded, and
/// compressed bodies are decoded by the fetch layer itself.
///
/// # Example
///
/// ```no_run
/// use seo_audit::config::UserAgentConfig;
/// use seo_audit::fetch::build_http_client;
///
/// let client = build_http_client(&UserAgentConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &UserAgentConfig) -> Result<Client, reqwest::Error> {
    let mut headers = HeaderMap::new();
    headers.insert(
        ACCEPT_ENCODING,
        HeaderValue::from_static("gzip, deflate, br"),
    );

    Client::builder()
        .user_agent(config.header_value())
        .default_headers(headers)
        .connect_timeout(Duration::from_secs(10))
        .redirect(Policy::none())
        .build()
}

/// Fetches a page with GET, following redirects
///
/// # Request Flow
///
/// 1. Send GET; on a 3xx with a `Location` header, follow it
///    - Track visited URLs to detect loops
///    - Give up after `max_redirects` hops
/// 2. Read and decode the body of the final response
/// 3. The whole flow is bounded by `options.timeout`
///
/// Any HTTP status counts as a successful fetch; only transport failures
/// are errors.
pub async fn fetch_page(
    client: &Client,
    url: &str,
    options: &RequestOptions,
) -> Result<PageFetch, FetchError> {
    let started = Instant::now();

    let work = async {
        let (response, final_url, redirect_chain) =
            send_following_redirects(client, Method::GET, url, options).await?;

        let status_code = response.status().as_u16();
        let headers = response.headers().clone();
        let raw = response
            .bytes()
            .await
            .map_err(|e| FetchError::classify(url, e))?;

        let content_encoding = headers.get(CONTENT_ENCODING).and_then(|v| v.to_str().ok());
        let decoded = decode_body(&raw, content_encoding);

        Ok(PageFetch {
            url: url.to_string(),
            status_code,
            headers,
            body_bytes: decoded.len(),
            body: String::from_utf8_lossy(&decoded).into_owned(),
            elapsed: Duration::ZERO,
            final_url,
            redirect_chain,
        })
    };

    let mut page = tokio::time::timeout(options.timeout, work)
        .await
        .map_err(|_| FetchError::Timeout {
            url: url.to_string(),
        })??;

    page.elapsed = started.elapsed();
    tracing::debug!(
        "Fetched {} -> {} ({} bytes, {:?})",
        url,
        page.status_code,
        page.body_bytes,
        page.elapsed
    );
    Ok(page)
}

/// Sends a HEAD request and reports the final status
pub async fn probe_url(client: &Client, url: &str, options: &RequestOptions) -> Probe {
    let work = send_following_redirects(client, Method::HEAD, url, options);

    match tokio::time::timeout(options.timeout, work).await {
        Ok(Ok((response, _, _))) => Probe::Status(response.status().as_u16()),
        Ok(Err(e)) => {
            tracing::debug!("Probe of {} failed: {}", url, e);
            Probe::Failed(e.reason().to_string())
        }
        Err(_) => {
            tracing::debug!("Probe of {} timed out", url);
            Probe::Failed("timeout".to_string())
        }
    }
}

async fn send_following_redirects(
    client: &Client,
    method: Method,
    url: &str,
    options: &RequestOptions,
) -> Result<(Response, Url, Vec<String>), FetchError> {
    let mut current = Url::parse(url).map_err(|e| FetchError::InvalidUrl {
        url: url.to_string(),
        message: e.to_string(),
    })?;
    let mut chain: Vec<String> = Vec::new();
    let mut visited: HashSet<String> = HashSet::new();

    loop {
        let response = client
            .request(method.clone(), current.clone())
            .send()
            .await
            .map_err(|e| FetchError::classify(current.as_str(), e))?;

        if !response.status().is_redirection() {
            return Ok((response, current, chain));
        }

        let location = match response.headers().get(LOCATION).and_then(|v| v.to_str().ok()) {
            Some(location) => location,
            None => return Ok((response, current, chain)),
        };

        let next = current
            .join(location)
            .map_err(|e| FetchError::InvalidUrl {
                url: location.to_string(),
                message: e.to_string(),
            })?;

        visited.insert(current.to_string());
        chain.push(current.to_string());

        if visited.contains(next.as_str()) {
            return Err(FetchError::RedirectLoop {
                url: next.to_string(),
            });
        }

        if chain.len() > options.max_redirects as usize {
            return Err(FetchError::RedirectLimit {
                url: url.to_string(),
            });
        }

        tracing::debug!("Following redirect {} -> {}", current, next);
        current = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_http_client() {
        let client = build_http_client(&UserAgentConfig::default());
        assert!(client.is_ok());
    }

    #[test]
    fn test_user_agent_format() {
        let config = UserAgentConfig {
            crawler_name: "TestAuditor".to_string(),
            crawler_version: "1.0".to_string(),
            contact_url: "https://example.com/bot".to_string(),
        };
        assert_eq!(
            config.header_value(),
            "Mozilla/5.0 (compatible; TestAuditor/1.0; +https://example.com/bot)"
        );
    }

    #[test]
    fn test_probe_is_broken() {
        assert!(!Probe::Status(200).is_broken());
        assert!(!Probe::Status(301).is_broken());
        assert!(Probe::Status(404).is_broken());
        assert!(Probe::Status(500).is_broken());
        assert!(Probe::Failed("timeout".to_string()).is_broken());
    }

    #[test]
    fn test_request_options_from_config() {
        let config = FetchConfig::default();
        assert_eq!(RequestOptions::root(&config).timeout, Duration::from_secs(15));
        assert_eq!(RequestOptions::probe(&config).timeout, Duration::from_secs(5));
        assert_eq!(RequestOptions::crawl(&config).timeout, Duration::from_secs(10));
        assert_eq!(RequestOptions::root(&config).max_redirects, 10);
    }

    #[tokio::test]
    async fn test_invalid_url_is_an_error() {
        let client = build_http_client(&UserAgentConfig::default()).unwrap();
        let options = RequestOptions::new(Duration::from_secs(1), 3);
        let result = fetch_page(&client, "not a url", &options).await;
        assert!(matches!(result, Err(FetchError::InvalidUrl { .. })));
    }

    #[tokio::test]
    async fn test_probe_invalid_url_fails() {
        let client = build_http_client(&UserAgentConfig::default()).unwrap();
        let options = RequestOptions::new(Duration::from_secs(1), 3);
        let probe = probe_url(&client, "not a url", &options).await;
        assert_eq!(probe, Probe::Failed("invalid url".to_string()));
    }
}
