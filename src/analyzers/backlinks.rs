//! On-page trust and authority indicators
//!
//! Nothing here queries an external backlink index; the signals are read
//! from the page source alone.

use super::{compile_pattern, Analyzer, AnalyzerError, AnalyzerResult, AuditContext, Severity};
use crate::html;
use async_trait::async_trait;
use chrono::Datelike;
use regex::Regex;
use scraper::Html;
use serde_json::{Map, Value};
use std::sync::LazyLock;

const CATEGORY: &str = "backlink";

static COPYRIGHT: LazyLock<Regex> =
    LazyLock::new(|| compile_pattern(r"(?:©|&copy;|&#169;)\s*(\d{4})"));
static PHONE: LazyLock<Regex> = LazyLock::new(|| compile_pattern(r"\+?[\d\s\-()]{10,}"));
static EMAIL: LazyLock<Regex> = LazyLock::new(|| compile_pattern(r"[\w.-]+@[\w.-]+\.\w+"));

const SOCIAL_SIGNALS: &[&str] = &["facebook", "instagram", "twitter", "linkedin", "youtube"];

const TRUST_KEYWORDS: &[&str] = &[
    "sertifika",
    "certificate",
    "iso",
    "fssc",
    "haccp",
    "halal",
    "helal",
    "kalite",
    "quality",
    "award",
    "ödül",
];

const ADDRESS_KEYWORDS: &[&str] = &["adres", "address", "mahalle", "sokak", "cadde"];

pub struct BacklinkAnalyzer;

#[async_trait]
impl Analyzer for BacklinkAnalyzer {
    fn name(&self) -> &'static str {
        "backlink_indicators"
    }

    fn max_score(&self) -> u32 {
        6
    }

    async fn analyze(&self, ctx: &AuditContext) -> Result<AnalyzerResult, AnalyzerError> {
        let page = ctx.page().await?;
        let current_year = chrono::Utc::now().year();
        Ok(self.inspect(&page.body, ctx.target().is_https(), current_year))
    }
}

impl BacklinkAnalyzer {
    fn inspect(&self, body: &str, has_ssl: bool, current_year: i32) -> AnalyzerResult {
        let mut result = AnalyzerResult::new(self.name(), self.max_score());
        let mut indicators = Map::new();
        let lower = body.to_lowercase();

        indicators.insert("has_ssl".to_string(), Value::from(has_ssl));

        // Copyright year as a rough domain age estimate
        if let Some(year) = COPYRIGHT
            .captures(body)
            .and_then(|c| c.get(1))
            .and_then(|m| m.as_str().parse::<i32>().ok())
        {
            let age = current_year - year;
            indicators.insert("copyright_year".to_string(), Value::from(year));
            indicators.insert("estimated_domain_age".to_string(), Value::from(age));
            if age >= 3 {
                result.award(2);
            }
        }

        let document = Html::parse_document(body);
        let external_links = html::select_all(&document, "a[href]")
            .iter()
            .filter_map(|a| a.value().attr("href"))
            .filter(|href| href.starts_with("http://") || href.starts_with("https://"))
            .count();
        indicators.insert("external_link_count".to_string(), Value::from(external_links));

        let social_presence = SOCIAL_SIGNALS.iter().filter(|s| lower.contains(*s)).count();
        indicators.insert("social_presence_count".to_string(), Value::from(social_presence));

        let trust_signals: Vec<&str> = TRUST_KEYWORDS
            .iter()
            .copied()
            .filter(|keyword| lower.contains(keyword))
            .collect();
        if trust_signals.len() >= 2 {
            result.award(2);
        }
        indicators.insert("trust_signals".to_string(), Value::from(trust_signals));

        // Phone runs must carry enough digits to be a number, not indentation
        let has_phone = PHONE
            .find_iter(body)
            .any(|m| m.as_str().chars().filter(char::is_ascii_digit).count() >= 7);
        let has_email = EMAIL.is_match(body);
        let has_address = ADDRESS_KEYWORDS.iter().any(|keyword| lower.contains(keyword));

        indicators.insert("has_phone".to_string(), Value::from(has_phone));
        indicators.insert("has_email".to_string(), Value::from(has_email));
        indicators.insert("has_address".to_string(), Value::from(has_address));

        if has_phone && has_email && has_address {
            result.award(2);
        }
        if !has_phone && !has_email && !has_address {
            result.issue(
                Severity::Warning,
                CATEGORY,
                "Contact details are missing; trust signals are weak.",
            );
        }

        result.detail("indicators", Value::Object(indicators));
        result.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::testing::count;

    #[test]
    fn test_established_business_scores_full() {
        let page = r#"<footer>
            &copy; 2015 Acme Foods. ISO 22000 certificate holder, quality first.
            Address: Main Street 1. Call +90 (212) 555 01 23 or mail info@acme.example.
        </footer>"#;
        let result = BacklinkAnalyzer.inspect(page, true, 2026);
        assert_eq!(result.score, 6);
        assert_eq!(result.details["indicators"]["estimated_domain_age"], 11);
        assert!(result.issues.is_empty());
    }

    #[test]
    fn test_unicode_copyright_symbol() {
        let result = BacklinkAnalyzer.inspect("<p>© 2025 New Co</p>", true, 2026);
        assert_eq!(result.details["indicators"]["copyright_year"], 2025);
        assert_eq!(result.score, 0);
    }

    #[test]
    fn test_no_contact_details_warns() {
        let page = "<html>\n            <body>\n                <p>hello</p>\n            </body>\n</html>";
        let result = BacklinkAnalyzer.inspect(page, false, 2026);
        assert_eq!(result.details["indicators"]["has_phone"], false);
        assert_eq!(count(&result, Severity::Warning), 1);
    }

    #[test]
    fn test_address_alone_counts_as_contact() {
        let page = "<footer>Address: Main Street 1, Springfield</footer>";
        let result = BacklinkAnalyzer.inspect(page, false, 2026);
        assert_eq!(result.details["indicators"]["has_address"], true);
        assert_eq!(result.details["indicators"]["has_phone"], false);
        assert_eq!(result.details["indicators"]["has_email"], false);
        assert_eq!(count(&result, Severity::Warning), 0);
    }
}
