//! Robots.txt handling module
//!
//! robots.txt is fetched through the audit's page cache, so the technical
//! analyzer and the internal crawl share a single request.

mod parser;

pub use parser::ParsedRobots;

use crate::fetch::PageCache;
use crate::url::AuditTarget;
use std::time::Duration;

/// robots.txt as seen by one audit
#[derive(Debug, Clone)]
pub struct RobotsTxt {
    /// Status code of the robots.txt response, `None` when unreachable
    pub status: Option<u16>,
    /// Rules; permissive unless the file was served with a 2xx status
    pub rules: ParsedRobots,
}

impl RobotsTxt {
    /// True when the file exists (HTTP 200)
    pub fn exists(&self) -> bool {
        self.status == Some(200)
    }
}

/// Fetches robots.txt for the audit target
pub async fn fetch_robots(cache: &PageCache, target: &AuditTarget, timeout: Duration) -> RobotsTxt {
    let Some(url) = target.root_file("robots.txt") else {
        return RobotsTxt {
            status: None,
            rules: ParsedRobots::allow_all(),
        };
    };

    match cache.fetch(url.as_str(), timeout).await {
        Some(page) if page.is_success() => RobotsTxt {
            status: Some(page.status_code),
            rules: ParsedRobots::from_content(&page.body),
        },
        Some(page) => {
            tracing::debug!("robots.txt for {} answered {}", target.domain(), page.status_code);
            RobotsTxt {
                status: Some(page.status_code),
                rules: ParsedRobots::allow_all(),
            }
        }
        None => RobotsTxt {
            status: None,
            rules: ParsedRobots::allow_all(),
        },
    }
}

/// Checks if a URL is allowed by robots.txt
///
/// Only the path and query take part in matching.
pub fn is_allowed(robots: &ParsedRobots, url: &url::Url, user_agent: &str) -> bool {
    let mut path = url.path().to_string();
    if let Some(query) = url.query() {
        path.push('?');
        path.push_str(query);
    }
    robots.is_allowed(&path, user_agent)
}
