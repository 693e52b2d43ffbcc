//! Content volume, text/markup ratio and a simple readability estimate.

use super::{
    compile_pattern, round_to, Analyzer, AnalyzerError, AnalyzerResult, AuditContext, Severity,
};
use crate::html;
use async_trait::async_trait;
use regex::Regex;
use scraper::Html;
use std::sync::LazyLock;

const CATEGORY: &str = "content";

static SENTENCE_END: LazyLock<Regex> = LazyLock::new(|| compile_pattern(r"[.!?]+"));

pub struct ContentAnalyzer;

#[async_trait]
impl Analyzer for ContentAnalyzer {
    fn name(&self) -> &'static str {
        "content_analysis"
    }

    fn max_score(&self) -> u32 {
        12
    }

    async fn analyze(&self, ctx: &AuditContext) -> Result<AnalyzerResult, AnalyzerError> {
        let page = ctx.page().await?;
        Ok(self.inspect(&page.body))
    }
}

impl ContentAnalyzer {
    fn inspect(&self, body: &str) -> AnalyzerResult {
        let document = Html::parse_document(body);
        let mut result = AnalyzerResult::new(self.name(), self.max_score());

        let text = html::visible_text(&document);
        let words: Vec<&str> = text.split_whitespace().collect();
        let word_count = words.len();

        let sentences: Vec<&str> = SENTENCE_END
            .split(&text)
            .map(str::trim)
            .filter(|s| s.chars().count() > 10)
            .collect();
        let avg_sentence_length = sentences
            .iter()
            .map(|s| s.split_whitespace().count())
            .sum::<usize>() as f64
            / sentences.len().max(1) as f64;

        let paragraph_count = html::select_all(&document, "p")
            .iter()
            .filter(|p| !html::is_boilerplate(p))
            .filter(|p| html::stripped_text(p).chars().count() > 20)
            .count();

        let long_words = words.iter().filter(|w| w.chars().count() > 8).count();
        let long_word_pct = long_words as f64 / word_count.max(1) as f64 * 100.0;
        let readability =
            (100.0 - long_word_pct * 2.0 - avg_sentence_length * 1.5).clamp(0.0, 100.0);

        let html_size = body.chars().count();
        let text_html_ratio = text.chars().count() as f64 / html_size.max(1) as f64 * 100.0;

        result.detail("word_count", word_count);
        result.detail("sentence_count", sentences.len());
        result.detail("paragraph_count", paragraph_count);
        result.detail("avg_sentence_length", round_to(avg_sentence_length, 1));
        result.detail("long_word_percentage", round_to(long_word_pct, 1));
        result.detail("readability_score", round_to(readability, 1));
        result.detail("text_html_ratio", round_to(text_html_ratio, 1));

        if word_count < 300 {
            result.issue(
                Severity::Warning,
                CATEGORY,
                format!("Thin content ({} words); 500+ words recommended.", word_count),
            );
        } else if word_count >= 500 {
            result.award(5);
        }
        if word_count >= 1000 {
            result.award(3);
        }

        if text_html_ratio < 10.0 {
            result.issue(
                Severity::Warning,
                CATEGORY,
                format!(
                    "Low text/HTML ratio ({:.1}%); more content should be added.",
                    text_html_ratio
                ),
            );
        } else if text_html_ratio >= 15.0 {
            result.award(2);
        }

        if readability < 40.0 {
            result.issue(
                Severity::Info,
                CATEGORY,
                format!(
                    "Low readability (score {:.0}/100); shorter sentences recommended.",
                    readability
                ),
            );
        } else if readability >= 60.0 {
            result.award(2);
        }

        result.finish()
    }
}
