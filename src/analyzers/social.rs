//! Social profile links found anywhere in the page source.

use super::{compile_pattern, Analyzer, AnalyzerError, AnalyzerResult, AuditContext, Severity};
use async_trait::async_trait;
use regex::Regex;
use serde_json::{Map, Value};
use std::sync::LazyLock;

const CATEGORY: &str = "social";

const PLATFORMS: &[(&str, &str)] = &[
    ("facebook", r"facebook\.com/([a-zA-Z0-9._-]+)"),
    ("instagram", r"instagram\.com/([a-zA-Z0-9._-]+)"),
    ("twitter", r"(?:twitter|x)\.com/([a-zA-Z0-9_]+)"),
    ("linkedin", r"linkedin\.com/(?:company|in)/([a-zA-Z0-9_-]+)"),
    ("youtube", r"youtube\.com/(?:channel|c|@|user)/([a-zA-Z0-9_-]+)"),
    ("tiktok", r"tiktok\.com/@([a-zA-Z0-9._-]+)"),
    ("pinterest", r"pinterest\.com/([a-zA-Z0-9_-]+)"),
];

static PLATFORM_PATTERNS: LazyLock<Vec<(&str, Regex)>> = LazyLock::new(|| {
    PLATFORMS
        .iter()
        .map(|(platform, pattern)| (*platform, compile_pattern(pattern)))
        .collect()
});

pub struct SocialAnalyzer;

#[async_trait]
impl Analyzer for SocialAnalyzer {
    fn name(&self) -> &'static str {
        "social_media"
    }

    fn max_score(&self) -> u32 {
        3
    }

    async fn analyze(&self, ctx: &AuditContext) -> Result<AnalyzerResult, AnalyzerError> {
        let page = ctx.page().await?;
        Ok(self.inspect(&page.body))
    }
}

impl SocialAnalyzer {
    fn inspect(&self, body: &str) -> AnalyzerResult {
        let mut result = AnalyzerResult::new(self.name(), self.max_score());
        let mut profiles = Map::new();

        for (platform, pattern) in PLATFORM_PATTERNS.iter() {
            if let Some(handle) = pattern.captures(body).and_then(|c| c.get(1)) {
                profiles.insert(platform.to_string(), Value::from(handle.as_str()));
            }
        }

        let found = profiles.len();
        if found >= 3 {
            result.award(3);
        } else if found >= 1 {
            result.award(1);
        } else {
            result.issue(Severity::Info, CATEGORY, "No social media profile links found.");
        }

        result.detail("platform_count", found);
        result.detail("profiles", Value::Object(profiles));
        result.finish()
    }
}
