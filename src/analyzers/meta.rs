//! Meta tag analysis: title, description, canonical, robots, social cards,
//! viewport, language, hreflang and favicon.

use super::{Analyzer, AnalyzerError, AnalyzerResult, AuditContext, Severity};
use crate::html;
use async_trait::async_trait;
use scraper::Html;
use serde_json::{json, Map, Value};

const CATEGORY: &str = "meta";

pub struct MetaAnalyzer;

#[async_trait]
impl Analyzer for MetaAnalyzer {
    fn name(&self) -> &'static str {
        "meta_analysis"
    }

    fn max_score(&self) -> u32 {
        38
    }

    async fn analyze(&self, ctx: &AuditContext) -> Result<AnalyzerResult, AnalyzerError> {
        let page = ctx.page().await?;
        Ok(self.inspect(&page.body))
    }
}

impl MetaAnalyzer {
    fn inspect(&self, body: &str) -> AnalyzerResult {
        let document = Html::parse_document(body);
        let mut result = AnalyzerResult::new(self.name(), self.max_score());

        // Title
        let title = html::select_first(&document, "title")
            .map(|t| html::element_text(&t).trim().to_string())
            .unwrap_or_default();
        let title_length = title.chars().count();
        result.detail("title", title.as_str());
        result.detail("title_length", title_length);

        if title.is_empty() {
            result.issue(Severity::Critical, CATEGORY, "Title tag is missing.");
        } else if title_length < 30 {
            result.issue(
                Severity::Warning,
                CATEGORY,
                format!("Title is too short ({} characters); 50-60 recommended.", title_length),
            );
        } else if title_length > 60 {
            result.issue(
                Severity::Warning,
                CATEGORY,
                format!("Title is too long ({} characters); 50-60 recommended.", title_length),
            );
        } else {
            result.award(10);
        }

        if !title.is_empty() {
            let words = title.split_whitespace().count();
            result.detail("title_word_count", words);
            if words < 3 {
                result.issue(
                    Severity::Info,
                    CATEGORY,
                    "Title could carry more keywords.",
                );
            }
        }

        // Description
        let description = html::meta_content(&document, "description").unwrap_or_default();
        let description_length = description.chars().count();
        result.detail("meta_description", description.as_str());
        result.detail("meta_description_length", description_length);

        if description.is_empty() {
            result.issue(Severity::Critical, CATEGORY, "Meta description is missing.");
        } else if description_length < 120 {
            result.issue(
                Severity::Warning,
                CATEGORY,
                format!(
                    "Meta description is short ({} characters); 150-160 recommended.",
                    description_length
                ),
            );
        } else if description_length > 160 {
            result.issue(
                Severity::Warning,
                CATEGORY,
                format!(
                    "Meta description is long ({} characters); 150-160 recommended.",
                    description_length
                ),
            );
        } else {
            result.award(10);
        }

        // Canonical
        let canonical = html::select_first(&document, "link[rel~=\"canonical\"]")
            .map(|link| link.value().attr("href").unwrap_or("").to_string());
        result.detail("canonical", canonical.clone());
        if canonical.is_some() {
            result.award(3);
        } else {
            result.issue(Severity::Warning, CATEGORY, "No canonical URL defined.");
        }

        // Robots directives
        let robots = html::meta_content(&document, "robots");
        result.detail("robots", robots.clone().unwrap_or_else(|| "unspecified".to_string()));
        if robots
            .as_deref()
            .is_some_and(|content| content.to_lowercase().contains("noindex"))
        {
            result.issue(
                Severity::Critical,
                CATEGORY,
                "Page is marked noindex and will not appear in search results.",
            );
        }

        // Open Graph
        let og_tags = collect_pairs(&document, "meta[property^=\"og:\"]", "property");
        result.detail("og_tags_count", og_tags.len());
        if og_tags.is_empty() {
            result.issue(
                Severity::Warning,
                CATEGORY,
                "Open Graph tags are missing (used when the page is shared).",
            );
        } else {
            result.award(3);
            if !og_tags.contains_key("og:image") {
                result.issue(
                    Severity::Info,
                    CATEGORY,
                    "og:image is missing; shared links will show no image.",
                );
            }
        }
        result.detail("og_tags", Value::Object(og_tags));

        // Twitter Card
        let twitter_tags = collect_pairs(&document, "meta[name^=\"twitter:\"]", "name");
        if twitter_tags.is_empty() {
            result.issue(Severity::Info, CATEGORY, "Twitter Card tags are missing.");
        } else {
            result.award(2);
        }
        result.detail("twitter_tags", Value::Object(twitter_tags));

        // Viewport
        let has_viewport = html::select_first(&document, "meta[name=\"viewport\"]").is_some();
        result.detail("has_viewport", has_viewport);
        if has_viewport {
            result.award(5);
        } else {
            result.issue(
                Severity::Critical,
                CATEGORY,
                "Viewport meta tag is missing; the page is not mobile friendly.",
            );
        }

        // Language
        let lang = html::select_first(&document, "html")
            .and_then(|el| html::attr(&el, "lang"))
            .unwrap_or("")
            .to_string();
        if lang.is_empty() {
            result.issue(Severity::Warning, CATEGORY, "The html lang attribute is missing.");
        } else {
            result.award(2);
        }
        result.detail("lang", lang);

        // Hreflang
        let hreflangs: Vec<Value> =
            html::select_all(&document, "link[rel~=\"alternate\"][hreflang]")
                .iter()
                .map(|link| {
                    json!({
                        "lang": link.value().attr("hreflang").unwrap_or(""),
                        "href": link.value().attr("href").unwrap_or(""),
                    })
                })
                .collect();
        let is_multilingual = !hreflangs.is_empty();
        if is_multilingual {
            result.award(3);
        }
        result.detail("hreflang_tags", hreflangs);
        result.detail("is_multilingual", is_multilingual);

        // Favicon
        let has_favicon = html::select_all(&document, "link[rel]")
            .iter()
            .any(|link| html::has_rel(link, |token| token.contains("icon")));
        result.detail("has_favicon", has_favicon);
        if !has_favicon {
            result.issue(Severity::Info, CATEGORY, "No favicon found.");
        }

        result.finish()
    }
}

fn collect_pairs(document: &Html, css: &str, key_attr: &str) -> Map<String, Value> {
    html::select_all(document, css)
        .iter()
        .map(|el| {
            let key = el.value().attr(key_attr).unwrap_or("").to_string();
            let value = el.value().attr("content").unwrap_or("").to_string();
            (key, Value::String(value))
        })
        .collect()
}
