//! Keyword frequency analysis over visible text
//!
//! Words of three or more letters are counted after stop-word removal;
//! bigrams and trigrams are built from the filtered sequence. Ties keep
//! first-occurrence order so results are stable between runs.

use super::{
    compile_pattern, round_to, Analyzer, AnalyzerError, AnalyzerResult, AuditContext, Severity,
};
use crate::html;
use async_trait::async_trait;
use regex::Regex;
use scraper::Html;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::LazyLock;

const CATEGORY: &str = "keyword";

static WORD: LazyLock<Regex> = LazyLock::new(|| compile_pattern(r"\b[a-zçğıöşü]{3,}\b"));

const STOP_WORDS: &[&str] = &[
    // Turkish
    "bir", "ve", "bu", "da", "de", "ile", "için", "olan", "olarak", "en", "çok", "daha", "gibi",
    "ama", "ancak", "hem", "ya", "veya", "ise", "her", "ne", "kadar", "sonra", "önce", "üzere",
    "biz", "siz", "ben", "sen", "onun", "bunu", "şu", "var", "yok", "den", "dan",
    // English
    "the", "and", "for", "that", "this", "with", "are", "was", "were", "from", "has", "have",
    "been", "will", "can", "all", "its", "your", "not", "but", "they", "you", "more", "some",
    "about",
];

pub struct KeywordAnalyzer;

#[async_trait]
impl Analyzer for KeywordAnalyzer {
    fn name(&self) -> &'static str {
        "keyword_analysis"
    }

    fn max_score(&self) -> u32 {
        7
    }

    async fn analyze(&self, ctx: &AuditContext) -> Result<AnalyzerResult, AnalyzerError> {
        let page = ctx.page().await?;
        Ok(self.inspect(&page.body))
    }
}

/// Most frequent items, highest count first, ties by first occurrence
fn most_common(items: &[String], limit: usize) -> Vec<(String, usize)> {
    let mut counts: HashMap<&str, (usize, usize)> = HashMap::new();
    for (position, item) in items.iter().enumerate() {
        counts.entry(item.as_str()).or_insert((0, position)).0 += 1;
    }

    let mut ranked: Vec<(&str, usize, usize)> = counts
        .into_iter()
        .map(|(item, (count, first))| (item, count, first))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.2.cmp(&b.2)));

    ranked
        .into_iter()
        .take(limit)
        .map(|(item, count, _)| (item.to_string(), count))
        .collect()
}

fn ngrams(words: &[String], n: usize) -> Vec<String> {
    words.windows(n).map(|window| window.join(" ")).collect()
}

fn density(count: usize, total: usize) -> f64 {
    count as f64 / total.max(1) as f64 * 100.0
}

impl KeywordAnalyzer {
    fn inspect(&self, body: &str) -> AnalyzerResult {
        let document = Html::parse_document(body);
        let mut result = AnalyzerResult::new(self.name(), self.max_score());

        let text = html::visible_text(&document).to_lowercase();
        let filtered: Vec<String> = WORD
            .find_iter(&text)
            .map(|m| m.as_str())
            .filter(|word| !STOP_WORDS.contains(word))
            .map(str::to_string)
            .collect();
        let total = filtered.len();

        let top_keywords = most_common(&filtered, 20);
        let top_bigrams = most_common(&ngrams(&filtered, 2), 10);
        let top_trigrams = most_common(&ngrams(&filtered, 3), 5);

        let title = html::select_first(&document, "title")
            .map(|t| html::element_text(&t).to_lowercase())
            .unwrap_or_default();
        let description = html::meta_content(&document, "description")
            .unwrap_or_default()
            .to_lowercase();
        let h1_text = html::select_all(&document, "h1")
            .iter()
            .filter(|h| !html::is_boilerplate(h))
            .map(html::element_text)
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase();

        let placement: Vec<Value> = top_keywords
            .iter()
            .take(5)
            .map(|(keyword, count)| {
                json!({
                    "keyword": keyword,
                    "count": count,
                    "density": round_to(density(*count, total), 2),
                    "in_title": title.contains(keyword.as_str()),
                    "in_meta_desc": description.contains(keyword.as_str()),
                    "in_h1": h1_text.contains(keyword.as_str()),
                })
            })
            .collect();

        result.detail("total_words_analyzed", total);
        result.detail(
            "top_keywords",
            top_keywords
                .iter()
                .map(|(keyword, count)| {
                    json!({
                        "keyword": keyword,
                        "count": count,
                        "density": round_to(density(*count, total), 2),
                    })
                })
                .collect::<Vec<_>>(),
        );
        result.detail("top_bigrams", phrases(&top_bigrams));
        result.detail("top_trigrams", phrases(&top_trigrams));

        if let Some((top, count)) = top_keywords.first() {
            let top_density = density(*count, total);
            if top_density > 5.0 {
                result.issue(
                    Severity::Warning,
                    CATEGORY,
                    format!(
                        "Keyword '{}' density is very high ({:.1}%); risk of keyword stuffing.",
                        top, top_density
                    ),
                );
            } else if top_density >= 1.0 {
                result.award(4);
            }

            if title.contains(top.as_str()) {
                result.award(3);
            } else {
                result.issue(
                    Severity::Warning,
                    CATEGORY,
                    format!("Most used word '{}' does not appear in the title.", top),
                );
            }
            if !h1_text.contains(top.as_str()) {
                result.issue(
                    Severity::Info,
                    CATEGORY,
                    format!("Most used word '{}' does not appear in the H1.", top),
                );
            }
        }

        result.detail("keyword_placement", placement);
        result.finish()
    }
}

fn phrases(ranked: &[(String, usize)]) -> Vec<Value> {
    ranked
        .iter()
        .map(|(phrase, count)| json!({ "phrase": phrase, "count": count }))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(list: &[&str]) -> Vec<String> {
        list.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn test_most_common_breaks_ties_by_first_occurrence() {
        let items = words(&["beta", "alpha", "alpha", "beta", "gamma"]);
        let ranked = most_common(&items, 3);
        assert_eq!(
            ranked,
            vec![
                ("beta".to_string(), 2),
                ("alpha".to_string(), 2),
                ("gamma".to_string(), 1)
            ]
        );
    }

    #[test]
    fn test_ngrams() {
        let items = words(&["red", "blue", "green"]);
        assert_eq!(ngrams(&items, 2), vec!["red blue", "blue green"]);
        assert_eq!(ngrams(&items, 3), vec!["red blue green"]);
        assert!(ngrams(&items, 4).is_empty());
    }

    #[test]
    fn test_keyword_stuffing_warning() {
        let page = "<title>Shop</title><p>widget widget widget widget quick brown fox jumps</p>";
        let result = KeywordAnalyzer.inspect(page);
        assert!(result
            .issues
            .iter()
            .any(|i| i.severity == Severity::Warning && i.message.contains("keyword stuffing")));
        assert_eq!(result.details["top_keywords"][0]["keyword"], "widget");
    }

    #[test]
    fn test_stop_words_and_short_words_ignored() {
        let page = "<p>The cat and the dog are in the yard</p>";
        let result = KeywordAnalyzer.inspect(page);
        // cat, dog, yard
        assert_eq!(result.details["total_words_analyzed"], 3);
    }

    #[test]
    fn test_turkish_letters_are_words() {
        let page = "<p>güzel çiçek güzel</p>";
        let result = KeywordAnalyzer.inspect(page);
        assert_eq!(result.details["top_keywords"][0]["keyword"], "güzel");
        assert_eq!(result.details["top_keywords"][0]["count"], 2);
    }

    #[test]
    fn test_keyword_in_title_and_h1_rewarded() {
        let filler: String = (0..200u8)
            .map(|i| format!("word{}{} ", char::from(b'a' + i / 26), char::from(b'a' + i % 26)))
            .collect();
        let page = format!(
            "<title>Garden tools</title><h1>Garden tools</h1><p>garden garden {}</p>",
            filler
        );
        let result = KeywordAnalyzer.inspect(&page);
        assert_eq!(result.details["top_keywords"][0]["keyword"], "garden");
        assert_eq!(result.score, 7);
        assert!(result.issues.is_empty(), "{:?}", result.issues);
    }

    #[test]
    fn test_empty_text_scores_zero_without_issues() {
        let result = KeywordAnalyzer.inspect("<div></div>");
        assert_eq!(result.score, 0);
        assert!(result.issues.is_empty());
    }
}
