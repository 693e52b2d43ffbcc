//! Page-speed proxies from document structure
//!
//! No timing is measured here; resource counts and loading hints stand in
//! for real performance data.

use super::{Analyzer, AnalyzerError, AnalyzerResult, AuditContext, Severity};
use crate::html;
use async_trait::async_trait;
use scraper::Html;

const CATEGORY: &str = "speed";

pub struct SpeedAnalyzer;

#[async_trait]
impl Analyzer for SpeedAnalyzer {
    fn name(&self) -> &'static str {
        "page_speed"
    }

    fn max_score(&self) -> u32 {
        5
    }

    async fn analyze(&self, ctx: &AuditContext) -> Result<AnalyzerResult, AnalyzerError> {
        let page = ctx.page().await?;
        Ok(self.inspect(&page.body))
    }
}

impl SpeedAnalyzer {
    fn inspect(&self, body: &str) -> AnalyzerResult {
        let document = Html::parse_document(body);
        let mut result = AnalyzerResult::new(self.name(), self.max_score());

        let css_files = html::select_all(&document, "link[rel~=\"stylesheet\"]");
        let js_files = html::select_all(&document, "script[src]");

        if css_files.len() > 10 {
            result.issue(
                Severity::Warning,
                CATEGORY,
                format!("{} CSS files are loaded; bundling is recommended.", css_files.len()),
            );
        }
        if js_files.len() > 15 {
            result.issue(
                Severity::Warning,
                CATEGORY,
                format!(
                    "{} JavaScript files are loaded; bundling is recommended.",
                    js_files.len()
                ),
            );
        }

        let blocking_css = css_files
            .iter()
            .filter(|link| matches!(html::attr(link, "media"), None | Some("all")))
            .count();
        let blocking_js = js_files
            .iter()
            .filter(|script| {
                script.value().attr("async").is_none() && script.value().attr("defer").is_none()
            })
            .count();
        if blocking_js > 5 {
            result.issue(
                Severity::Warning,
                CATEGORY,
                format!("{} render-blocking scripts; use async or defer.", blocking_js),
            );
        }

        let inline_css_blocks = html::count(&document, "style");
        let inline_js_blocks = html::select_all(&document, "script:not([src])")
            .iter()
            .filter(|script| html::element_text(script).chars().count() > 100)
            .count();

        let image_count = html::count(&document, "img");
        let total_resources = css_files.len() + js_files.len() + image_count;
        if total_resources <= 30 {
            result.award(3);
        } else if total_resources <= 60 {
            result.award(1);
        }

        let preload_hints = html::select_all(&document, "link[rel]")
            .iter()
            .filter(|link| {
                html::has_rel(link, |token| {
                    token.contains("preload") || token.contains("prefetch") || token.contains("preconnect")
                })
            })
            .count();
        if preload_hints > 0 {
            result.award(2);
        }

        result.detail("css_files", css_files.len());
        result.detail("js_files", js_files.len());
        result.detail("blocking_css", blocking_css);
        result.detail("blocking_js", blocking_js);
        result.detail("inline_css_blocks", inline_css_blocks);
        result.detail("inline_js_blocks", inline_js_blocks);
        result.detail("total_resources", total_resources);
        result.detail("preload_hints", preload_hints);

        result.finish()
    }
}
