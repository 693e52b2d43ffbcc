//! Heading structure: one H1, H2 presence and level skips.

use super::{Analyzer, AnalyzerError, AnalyzerResult, AuditContext, Severity};
use crate::html;
use async_trait::async_trait;
use scraper::Html;
use serde_json::{Map, Value};

const CATEGORY: &str = "heading";

pub struct HeadingAnalyzer;

#[async_trait]
impl Analyzer for HeadingAnalyzer {
    fn name(&self) -> &'static str {
        "heading_structure"
    }

    fn max_score(&self) -> u32 {
        15
    }

    async fn analyze(&self, ctx: &AuditContext) -> Result<AnalyzerResult, AnalyzerError> {
        let page = ctx.page().await?;
        Ok(self.inspect(&page.body))
    }
}

impl HeadingAnalyzer {
    fn inspect(&self, body: &str) -> AnalyzerResult {
        let document = Html::parse_document(body);
        let mut result = AnalyzerResult::new(self.name(), self.max_score());

        // levels[0] holds h1 texts, levels[5] h6
        let levels: Vec<Vec<String>> = (1..=6)
            .map(|level| {
                html::select_all(&document, &format!("h{}", level))
                    .iter()
                    .map(|h| html::truncate_chars(&html::stripped_text(h), 100))
                    .collect()
            })
            .collect();

        let h1_count = levels[0].len();
        let total: usize = levels.iter().map(Vec::len).sum();

        if h1_count == 0 {
            result.issue(Severity::Critical, CATEGORY, "No H1 heading.");
        } else if h1_count > 1 {
            result.issue(
                Severity::Warning,
                CATEGORY,
                format!("Multiple H1 headings ({}); a single H1 is recommended.", h1_count),
            );
        } else {
            result.award(8);
        }

        if levels[1].is_empty() {
            result.issue(
                Severity::Warning,
                CATEGORY,
                "No H2 headings; content structure should be improved.",
            );
        } else {
            result.award(4);
        }

        let mut has_skip = false;
        for level in 1..=4 {
            if levels[level - 1].is_empty() && !levels[level].is_empty() {
                has_skip = true;
                result.issue(
                    Severity::Info,
                    CATEGORY,
                    format!(
                        "H{} is skipped but H{} is used; heading hierarchy is broken.",
                        level,
                        level + 1
                    ),
                );
            }
        }
        if !has_skip && total >= 3 {
            result.award(3);
        }

        let headings: Map<String, Value> = levels
            .into_iter()
            .enumerate()
            .map(|(i, texts)| (format!("h{}", i + 1), Value::from(texts)))
            .collect();
        result.detail("headings", Value::Object(headings));
        result.detail("h1_count", h1_count);
        result.detail("total_headings", total);

        result.finish()
    }
}
