//! Image checks: alt text, explicit dimensions and lazy loading.

use super::{round_to, Analyzer, AnalyzerError, AnalyzerResult, AuditContext, Severity};
use crate::html;
use async_trait::async_trait;
use scraper::Html;

const CATEGORY: &str = "image";

pub struct ImageAnalyzer;

#[async_trait]
impl Analyzer for ImageAnalyzer {
    fn name(&self) -> &'static str {
        "image_analysis"
    }

    fn max_score(&self) -> u32 {
        8
    }

    async fn analyze(&self, ctx: &AuditContext) -> Result<AnalyzerResult, AnalyzerError> {
        let page = ctx.page().await?;
        Ok(self.inspect(&page.body))
    }
}

impl ImageAnalyzer {
    fn inspect(&self, body: &str) -> AnalyzerResult {
        let document = Html::parse_document(body);
        let mut result = AnalyzerResult::new(self.name(), self.max_score());

        let images = html::select_all(&document, "img");
        let total = images.len();
        let mut missing_alt = 0usize;
        let mut missing_dimensions = 0usize;
        let mut lazy_loaded = 0usize;
        let mut sources: Vec<String> = Vec::new();

        for img in &images {
            if html::attr(img, "alt").is_none() {
                missing_alt += 1;
            }

            let sized = html::attr(img, "width").is_some() || html::attr(img, "height").is_some();
            let styled = html::attr(img, "style")
                .is_some_and(|style| style.contains("width") || style.contains("height"));
            if !sized && !styled {
                missing_dimensions += 1;
            }

            let data_src = html::attr(img, "data-src");
            if img.value().attr("loading") == Some("lazy") || data_src.is_some() {
                lazy_loaded += 1;
            }

            if let Some(src) = html::attr(img, "src").or(data_src) {
                if !src.starts_with("data:") && sources.len() < 5 {
                    sources.push(src.to_string());
                }
            }
        }

        result.detail("total", total);
        result.detail("missing_alt", missing_alt);
        result.detail("missing_dimensions", missing_dimensions);
        result.detail("lazy_loaded", lazy_loaded);
        result.detail("image_sources", sources);

        if total == 0 {
            result.detail("alt_coverage", 100.0);
            result.award(5);
            return result.finish();
        }

        let alt_pct = (total - missing_alt) as f64 / total as f64 * 100.0;
        result.detail("alt_coverage", round_to(alt_pct, 1));
        if missing_alt > 0 {
            result.issue(
                Severity::Warning,
                CATEGORY,
                format!("{}/{} images are missing alt text.", missing_alt, total),
            );
        }
        if alt_pct >= 90.0 {
            result.award(5);
        }

        if missing_dimensions as f64 > total as f64 * 0.5 {
            result.issue(
                Severity::Info,
                CATEGORY,
                format!(
                    "{} images have no width/height; this can cause layout shift.",
                    missing_dimensions
                ),
            );
        }

        let lazy_pct = lazy_loaded as f64 / total as f64 * 100.0;
        result.detail("lazy_load_coverage", round_to(lazy_pct, 1));
        if total > 5 && lazy_pct < 50.0 {
            result.issue(
                Severity::Info,
                CATEGORY,
                format!(
                    "Only {:.0}% of images use lazy loading; recommended for page speed.",
                    lazy_pct
                ),
            );
        } else if lazy_pct >= 50.0 {
            result.award(3);
        }

        result.finish()
    }
}
