//! Structured data: JSON-LD blocks and microdata item types.

use super::{Analyzer, AnalyzerError, AnalyzerResult, AuditContext, Severity};
use crate::html;
use async_trait::async_trait;
use scraper::Html;
use serde_json::Value;

const CATEGORY: &str = "schema";

const RECOMMENDED_TYPES: &[&str] = &[
    "Organization",
    "LocalBusiness",
    "WebSite",
    "BreadcrumbList",
    "Product",
];

/// JSON-LD objects found on a page
#[derive(Debug, Default)]
pub(crate) struct JsonLd {
    /// Top-level objects, with arrays and `@graph` containers flattened
    pub objects: Vec<Value>,
    /// Blocks that did not parse as JSON
    pub invalid_blocks: usize,
}

impl JsonLd {
    pub(crate) fn from_document(document: &Html) -> Self {
        let mut json_ld = JsonLd::default();

        for script in html::select_all(document, "script[type=\"application/ld+json\"]") {
            match serde_json::from_str::<Value>(html::element_text(&script).trim()) {
                Ok(value) => json_ld.push(value),
                Err(e) => {
                    tracing::debug!("Skipping malformed JSON-LD block: {}", e);
                    json_ld.invalid_blocks += 1;
                }
            }
        }

        json_ld
    }

    fn push(&mut self, value: Value) {
        match value {
            Value::Array(items) => items.into_iter().for_each(|item| self.push(item)),
            Value::Object(mut object) => match object.remove("@graph") {
                Some(graph) => {
                    if object.contains_key("@type") {
                        self.objects.push(Value::Object(object));
                    }
                    self.push(graph);
                }
                None => self.objects.push(Value::Object(object)),
            },
            _ => {}
        }
    }

    /// Declared types, one entry per type name; untyped objects count as `Unknown`
    pub(crate) fn types(&self) -> Vec<String> {
        self.objects
            .iter()
            .flat_map(|object| match object.get("@type") {
                Some(Value::String(name)) => vec![name.clone()],
                Some(Value::Array(names)) => names
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect(),
                _ => vec!["Unknown".to_string()],
            })
            .collect()
    }
}

pub struct SchemaAnalyzer;

#[async_trait]
impl Analyzer for SchemaAnalyzer {
    fn name(&self) -> &'static str {
        "schema_markup"
    }

    fn max_score(&self) -> u32 {
        4
    }

    async fn analyze(&self, ctx: &AuditContext) -> Result<AnalyzerResult, AnalyzerError> {
        let page = ctx.page().await?;
        Ok(self.inspect(&page.body))
    }
}

impl SchemaAnalyzer {
    fn inspect(&self, body: &str) -> AnalyzerResult {
        let document = Html::parse_document(body);
        let mut result = AnalyzerResult::new(self.name(), self.max_score());

        let json_ld = JsonLd::from_document(&document);
        let types = json_ld.types();

        let microdata_types: Vec<String> = html::select_all(&document, "[itemtype]")
            .iter()
            .filter_map(|el| el.value().attr("itemtype"))
            .map(|itemtype| {
                itemtype
                    .trim_end_matches('/')
                    .rsplit('/')
                    .next()
                    .unwrap_or(itemtype)
                    .to_string()
            })
            .collect();

        if types.is_empty() {
            result.issue(
                Severity::Warning,
                CATEGORY,
                "No JSON-LD structured data found; it enables rich results.",
            );
        } else {
            result.award(4);
            let missing: Vec<&str> = RECOMMENDED_TYPES
                .iter()
                .copied()
                .filter(|recommended| !types.iter().any(|t| t == recommended))
                .collect();
            if !missing.is_empty() {
                result.issue(
                    Severity::Info,
                    CATEGORY,
                    format!(
                        "Recommended schema types are missing: {}",
                        missing.iter().take(3).copied().collect::<Vec<_>>().join(", ")
                    ),
                );
            }
        }

        result.detail("has_schema", !types.is_empty() || !microdata_types.is_empty());
        result.detail("schema_count", json_ld.objects.len());
        result.detail("invalid_blocks", json_ld.invalid_blocks);
        result.detail("json_ld_types", types);
        result.detail("microdata_types", microdata_types);
        result.detail(
            "raw_schemas",
            json_ld.objects.iter().take(5).cloned().collect::<Vec<_>>(),
        );

        result.finish()
    }
}
