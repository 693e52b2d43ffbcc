//! Analyzer set
//!
//! Each analyzer inspects the audited page (and occasionally a few auxiliary
//! URLs) through the shared [`PageCache`] and produces an [`AnalyzerResult`]
//! with a score in its own fixed range. Analyzers never see each other's
//! output.

mod backlinks;
mod content;
mod crawl;
mod headings;
mod images;
mod keywords;
mod links;
mod meta;
mod mobile;
mod schema;
mod security;
mod snippet;
mod social;
mod speed;
mod technical;

pub use backlinks::BacklinkAnalyzer;
pub use content::ContentAnalyzer;
pub use crawl::CrawlAnalyzer;
pub use headings::HeadingAnalyzer;
pub use images::ImageAnalyzer;
pub use keywords::KeywordAnalyzer;
pub use links::LinkAnalyzer;
pub use meta::MetaAnalyzer;
pub use mobile::MobileAnalyzer;
pub use schema::SchemaAnalyzer;
pub use security::SecurityAnalyzer;
pub use snippet::SnippetAnalyzer;
pub use social::SocialAnalyzer;
pub use speed::SpeedAnalyzer;
pub use technical::TechnicalAnalyzer;

use crate::config::Config;
use crate::fetch::{PageCache, PageFetch};
use crate::url::AuditTarget;
use async_trait::async_trait;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// How serious a finding is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    Warning,
    Info,
}

impl Severity {
    /// Sort rank: critical first
    pub fn rank(self) -> u8 {
        match self {
            Severity::Critical => 0,
            Severity::Warning => 1,
            Severity::Info => 2,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Critical => "critical",
            Severity::Warning => "warning",
            Severity::Info => "info",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single categorized finding
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    pub severity: Severity,
    pub category: String,
    pub message: String,
}

impl Issue {
    pub fn new(severity: Severity, category: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity,
            category: category.into(),
            message: message.into(),
        }
    }
}

/// Whether an analyzer actually ran
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum AnalyzerStatus {
    /// The analyzer inspected the page
    Ok,
    /// An input page could not be fetched
    Unavailable { reason: String },
    /// The analyzer itself broke
    Failed { error: String },
}

/// Output of one analyzer for one audit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzerResult {
    pub name: String,
    pub score: u32,
    pub max_score: u32,
    pub status: AnalyzerStatus,
    pub details: Map<String, Value>,
    pub issues: Vec<Issue>,
}

impl AnalyzerResult {
    pub fn new(name: &str, max_score: u32) -> Self {
        Self {
            name: name.to_string(),
            score: 0,
            max_score,
            status: AnalyzerStatus::Ok,
            details: Map::new(),
            issues: Vec::new(),
        }
    }

    /// Zero-scored result for an analyzer whose input page is missing
    pub fn unavailable(name: &str, max_score: u32, reason: impl Into<String>) -> Self {
        let reason = reason.into();
        let mut result = Self::new(name, max_score);
        result.details.insert("error".to_string(), Value::String(reason.clone()));
        result.status = AnalyzerStatus::Unavailable { reason };
        result
    }

    /// Zero-scored result for an analyzer that errored or panicked
    pub fn failed(name: &str, max_score: u32, error: impl Into<String>) -> Self {
        let error = error.into();
        let mut result = Self::new(name, max_score);
        result.details.insert("error".to_string(), Value::String(error.clone()));
        result.status = AnalyzerStatus::Failed { error };
        result
    }

    pub fn award(&mut self, points: u32) {
        self.score += points;
    }

    pub fn detail(&mut self, key: &str, value: impl Into<Value>) {
        self.details.insert(key.to_string(), value.into());
    }

    pub fn issue(&mut self, severity: Severity, category: &str, message: impl Into<String>) {
        self.issues.push(Issue::new(severity, category, message));
    }

    /// Clamps the score to the analyzer's range
    pub fn finish(mut self) -> Self {
        self.score = self.score.min(self.max_score);
        self
    }

    pub fn is_ok(&self) -> bool {
        self.status == AnalyzerStatus::Ok
    }

    /// Numeric detail lookup, used by comparison and rendering
    pub fn number(&self, key: &str) -> Option<f64> {
        self.details.get(key).and_then(Value::as_f64)
    }
}

/// Reasons an analyzer could not produce a normal result
#[derive(Debug, Error)]
pub enum AnalyzerError {
    #[error("Page unavailable: {url}")]
    PageUnavailable { url: String },

    #[error("{0}")]
    Internal(String),
}

/// Everything an analyzer may read during one audit
///
/// Owns the audit target, the configuration and the page cache; the cache
/// lives exactly as long as the context.
pub struct AuditContext {
    target: AuditTarget,
    config: Config,
    cache: PageCache,
}

impl AuditContext {
    pub fn new(target: AuditTarget, config: Config, cache: PageCache) -> Self {
        Self {
            target,
            config,
            cache,
        }
    }

    pub fn target(&self) -> &AuditTarget {
        &self.target
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn cache(&self) -> &PageCache {
        &self.cache
    }

    /// The audited page, through the cache
    pub async fn page(&self) -> Result<Arc<PageFetch>, AnalyzerError> {
        self.cache
            .fetch(self.target.as_str(), self.root_timeout())
            .await
            .ok_or_else(|| AnalyzerError::PageUnavailable {
                url: self.target.as_str().to_string(),
            })
    }

    /// Robots.txt product token of the audit bot
    pub fn user_agent_token(&self) -> &str {
        &self.config.user_agent.crawler_name
    }

    pub fn root_timeout(&self) -> Duration {
        Duration::from_secs(self.config.fetch.root_timeout)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.config.fetch.probe_timeout)
    }

    pub fn crawl_timeout(&self) -> Duration {
        Duration::from_secs(self.config.fetch.crawl_timeout)
    }
}

/// One independent check over the audited site
#[async_trait]
pub trait Analyzer: Send + Sync {
    /// Report key, e.g. `meta_analysis`
    fn name(&self) -> &'static str;

    /// Upper bound of the score this analyzer can award
    fn max_score(&self) -> u32;

    async fn analyze(&self, ctx: &AuditContext) -> Result<AnalyzerResult, AnalyzerError>;
}

/// Report keys of the default battery, in run order
pub const REPORT_SECTIONS: [&str; 15] = [
    "meta_analysis",
    "heading_structure",
    "image_analysis",
    "link_analysis",
    "content_analysis",
    "keyword_analysis",
    "technical",
    "security_headers",
    "page_speed",
    "mobile_friendly",
    "schema_markup",
    "social_media",
    "backlink_indicators",
    "featured_snippet",
    "multi_page",
];

/// The full analyzer battery, in report order
pub fn default_analyzers() -> Vec<Box<dyn Analyzer>> {
    vec![
        Box::new(MetaAnalyzer),
        Box::new(HeadingAnalyzer),
        Box::new(ImageAnalyzer),
        Box::new(LinkAnalyzer),
        Box::new(ContentAnalyzer),
        Box::new(KeywordAnalyzer),
        Box::new(TechnicalAnalyzer),
        Box::new(SecurityAnalyzer),
        Box::new(SpeedAnalyzer),
        Box::new(MobileAnalyzer),
        Box::new(SchemaAnalyzer),
        Box::new(SocialAnalyzer),
        Box::new(BacklinkAnalyzer),
        Box::new(SnippetAnalyzer),
        Box::new(CrawlAnalyzer),
    ]
}

/// Compiles one of the analyzers' built-in patterns
///
/// The patterns are constants, so a failure here is a programming error.
pub(crate) fn compile_pattern(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|e| {
        panic!("built-in pattern '{}' does not compile: {}", pattern, e)
    })
}

/// Rounds to a fixed number of decimals for report details
pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use crate::fetch::build_http_client;

    /// A context whose root page is already cached
    ///
    /// The target points at a closed local port so any auxiliary fetch
    /// fails fast.
    pub fn context_with_html(html: &str) -> AuditContext {
        context_for("http://127.0.0.1:1/", html)
    }

    pub fn context_for(url: &str, html: &str) -> AuditContext {
        let target = AuditTarget::parse(url).unwrap();
        let config = Config::default();
        let client = build_http_client(&config.user_agent).unwrap();
        let cache = PageCache::new(client, config.fetch.max_redirects);
        cache.seed(PageFetch::from_html(target.url(), html));
        AuditContext::new(target, config, cache)
    }

    pub fn count(result: &AnalyzerResult, severity: Severity) -> usize {
        result.issues.iter().filter(|i| i.severity == severity).count()
    }
}
