//! Mobile friendliness: viewport, inline media queries and fixed widths.

use super::{compile_pattern, Analyzer, AnalyzerError, AnalyzerResult, AuditContext, Severity};
use crate::html;
use async_trait::async_trait;
use regex::Regex;
use scraper::Html;
use std::sync::LazyLock;

const CATEGORY: &str = "mobile";

static FIXED_WIDTH: LazyLock<Regex> = LazyLock::new(|| compile_pattern(r"width\s*:\s*\d{4,}px"));

pub struct MobileAnalyzer;

#[async_trait]
impl Analyzer for MobileAnalyzer {
    fn name(&self) -> &'static str {
        "mobile_friendly"
    }

    fn max_score(&self) -> u32 {
        5
    }

    async fn analyze(&self, ctx: &AuditContext) -> Result<AnalyzerResult, AnalyzerError> {
        let page = ctx.page().await?;
        Ok(self.inspect(&page.body))
    }
}

impl MobileAnalyzer {
    fn inspect(&self, body: &str) -> AnalyzerResult {
        let document = Html::parse_document(body);
        let mut result = AnalyzerResult::new(self.name(), self.max_score());

        let viewport = html::select_first(&document, "meta[name=\"viewport\"]");
        result.detail("has_viewport", viewport.is_some());
        match viewport {
            Some(meta) => {
                result.detail("viewport_content", meta.value().attr("content").unwrap_or(""));
                result.award(3);
            }
            None => {
                result.issue(Severity::Critical, CATEGORY, "Viewport meta tag is missing.");
            }
        }

        let has_touch_icon = html::select_all(&document, "link[rel]")
            .iter()
            .any(|link| html::has_rel(link, |token| token.contains("apple-touch-icon")));
        result.detail("has_touch_icon", has_touch_icon);

        let inline_css = html::select_all(&document, "style")
            .iter()
            .map(html::element_text)
            .collect::<Vec<_>>()
            .join(" ");

        let has_media_queries = inline_css.contains("@media");
        result.detail("has_media_queries", has_media_queries);
        if has_media_queries {
            result.award(2);
        }

        if FIXED_WIDTH.is_match(&inline_css) {
            result.issue(
                Severity::Warning,
                CATEGORY,
                "Very large fixed pixel widths detected in inline CSS.",
            );
        }

        result.detail(
            "has_amp",
            html::select_first(&document, "link[rel~=\"amphtml\"]").is_some(),
        );

        result.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::testing::count;

    #[test]
    fn test_responsive_page_scores_full() {
        let page = r#"<head>
            <meta name="viewport" content="width=device-width, initial-scale=1">
            <link rel="apple-touch-icon" href="/touch.png">
            <link rel="amphtml" href="/amp/">
            <style>@media (max-width: 600px) { body { font-size: 14px; } }</style>
        </head>"#;
        let result = MobileAnalyzer.inspect(page);
        assert_eq!(result.score, 5);
        assert_eq!(result.details["has_touch_icon"], true);
        assert_eq!(result.details["has_amp"], true);
        assert!(result.issues.is_empty());
    }

    #[test]
    fn test_missing_viewport_is_critical() {
        let result = MobileAnalyzer.inspect("<p>desktop only</p>");
        assert_eq!(count(&result, Severity::Critical), 1);
        assert_eq!(result.score, 0);
    }

    #[test]
    fn test_fixed_width_warns() {
        let result = MobileAnalyzer
            .inspect("<style>.wrap { width: 1200px; } .ok { width: 320px; }</style>");
        assert_eq!(count(&result, Severity::Warning), 1);
    }
}
