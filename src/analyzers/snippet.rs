//! Featured-snippet readiness: lists, tables, FAQ signals and short
//! definition paragraphs after H2 headings.

use super::schema::JsonLd;
use super::{Analyzer, AnalyzerError, AnalyzerResult, AuditContext, Severity};
use crate::html;
use async_trait::async_trait;
use scraper::Html;
use serde_json::{Map, Value};

const CATEGORY: &str = "snippet";

const FAQ_SIGNALS: &[&str] = &[
    "sıkça sorulan",
    "frequently asked",
    "faq",
    "sss",
    "sorular",
    "nasıl",
    "nedir",
    "neden",
];

pub struct SnippetAnalyzer;

#[async_trait]
impl Analyzer for SnippetAnalyzer {
    fn name(&self) -> &'static str {
        "featured_snippet"
    }

    fn max_score(&self) -> u32 {
        6
    }

    async fn analyze(&self, ctx: &AuditContext) -> Result<AnalyzerResult, AnalyzerError> {
        let page = ctx.page().await?;
        Ok(self.inspect(&page.body))
    }
}

/// Counts H2 headings whose next sibling paragraph is answer-sized
fn definition_paragraphs(document: &Html) -> usize {
    html::select_all(document, "h2")
        .iter()
        .filter_map(|h2| {
            h2.next_siblings()
                .filter_map(scraper::ElementRef::wrap)
                .find(|sibling| sibling.value().name() == "p")
        })
        .filter(|p| (40..=300).contains(&html::stripped_text(p).chars().count()))
        .count()
}

impl SnippetAnalyzer {
    fn inspect(&self, body: &str) -> AnalyzerResult {
        let document = Html::parse_document(body);
        let mut result = AnalyzerResult::new(self.name(), self.max_score());

        let ordered_lists = html::count(&document, "ol");
        let unordered_lists = html::count(&document, "ul");
        let tables = html::count(&document, "table");
        let has_lists = ordered_lists + unordered_lists > 0;
        let has_tables = tables > 0;

        let lower = body.to_lowercase();
        let faq_signals: Vec<&str> = FAQ_SIGNALS
            .iter()
            .copied()
            .filter(|signal| lower.contains(signal))
            .collect();
        let has_faq_content = !faq_signals.is_empty();

        let definitions = definition_paragraphs(&document);
        let has_faq_schema = JsonLd::from_document(&document)
            .types()
            .iter()
            .any(|t| t == "FAQPage");

        if has_lists {
            result.award(1);
        }
        if has_tables {
            result.award(1);
        }
        if has_faq_content {
            result.award(1);
        }
        if definitions >= 2 {
            result.award(1);
        }
        if has_faq_schema {
            result.award(2);
        }

        if !has_lists && !has_tables {
            result.issue(
                Severity::Info,
                CATEGORY,
                "No lists or tables; they improve featured snippet chances.",
            );
        }
        if !has_faq_content {
            result.issue(
                Severity::Info,
                CATEGORY,
                "No FAQ content found; question and answer formats suit snippets.",
            );
        }

        let mut readiness = Map::new();
        readiness.insert("has_lists".to_string(), Value::from(has_lists));
        readiness.insert("ordered_lists".to_string(), Value::from(ordered_lists));
        readiness.insert("unordered_lists".to_string(), Value::from(unordered_lists));
        readiness.insert("has_tables".to_string(), Value::from(has_tables));
        readiness.insert("table_count".to_string(), Value::from(tables));
        readiness.insert("has_faq_content".to_string(), Value::from(has_faq_content));
        readiness.insert("faq_signals".to_string(), Value::from(faq_signals));
        readiness.insert("definition_paragraphs".to_string(), Value::from(definitions));
        readiness.insert("has_faq_schema".to_string(), Value::from(has_faq_schema));
        result.detail("readiness", Value::Object(readiness));

        result.finish()
    }
}
