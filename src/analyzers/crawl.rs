//! Bounded internal crawl
//!
//! Up to `crawl.max-pages` same-site pages linked from the root are fetched
//! concurrently through the page cache. Each page gets a reduced check set
//! (title, description, H1, load time); findings are folded into one issue
//! per problem kind rather than one per page. Pages that fail to load or
//! that robots.txt disallows are skipped.

use super::{round_to, Analyzer, AnalyzerError, AnalyzerResult, AuditContext, Severity};
use crate::fetch::PageFetch;
use crate::html;
use crate::robots::{self, ParsedRobots};
use crate::url::{is_page_candidate, AuditTarget};
use async_trait::async_trait;
use futures::future::join_all;
use scraper::Html;
use serde::Serialize;
use std::collections::HashSet;

const CATEGORY: &str = "multipage";

/// Seconds above which a crawled page counts as slow
const SLOW_PAGE_SECS: f64 = 3.0;

pub struct CrawlAnalyzer;

/// Reduced checks for one crawled page
#[derive(Debug, Clone, Serialize)]
struct PageSummary {
    url: String,
    status: u16,
    load_time: f64,
    has_title: bool,
    title: Option<String>,
    has_meta_desc: bool,
    has_h1: bool,
}

impl PageSummary {
    fn from_fetch(page: &PageFetch) -> Self {
        let document = Html::parse_document(&page.body);
        let title = html::select_first(&document, "title")
            .map(|t| html::element_text(&t).trim().to_string())
            .filter(|t| !t.is_empty());

        Self {
            url: page.url.clone(),
            status: page.status_code,
            load_time: round_to(page.elapsed.as_secs_f64(), 2),
            has_title: title.is_some(),
            title: title.map(|t| html::truncate_chars(&t, 60)),
            has_meta_desc: html::meta_content(&document, "description").is_some(),
            has_h1: html::select_first(&document, "h1").is_some(),
        }
    }

    fn is_slow(&self) -> bool {
        self.load_time > SLOW_PAGE_SECS
    }
}

/// Distinct same-site page links from the root, in page order
fn crawl_candidates(body: &str, target: &AuditTarget) -> Vec<String> {
    let document = Html::parse_document(body);
    let mut seen = HashSet::new();

    html::select_all(&document, "a[href]")
        .iter()
        .filter_map(|a| a.value().attr("href"))
        .filter_map(|href| target.resolve(href))
        .filter(|url| target.is_same_site(url) && url != target.url())
        .filter(is_page_candidate)
        .map(|url| url.to_string())
        .filter(|url| seen.insert(url.clone()))
        .collect()
}

/// Splits candidates into the pages to fetch and those robots.txt disallows
///
/// The page cap applies after robots filtering, so disallowed links never
/// take a slot from an allowed one.
fn select_crawlable(
    candidates: Vec<String>,
    robots: &ParsedRobots,
    user_agent: &str,
    limit: usize,
) -> (Vec<String>, Vec<String>) {
    let (mut allowed, disallowed): (Vec<String>, Vec<String>) =
        candidates.into_iter().partition(|candidate| {
            url::Url::parse(candidate)
                .map(|url| robots::is_allowed(robots, &url, user_agent))
                .unwrap_or(false)
        });
    allowed.truncate(limit);
    (allowed, disallowed)
}

#[async_trait]
impl Analyzer for CrawlAnalyzer {
    fn name(&self) -> &'static str {
        "multi_page"
    }

    fn max_score(&self) -> u32 {
        3
    }

    async fn analyze(&self, ctx: &AuditContext) -> Result<AnalyzerResult, AnalyzerError> {
        let page = ctx.page().await?;
        let candidates = crawl_candidates(&page.body, ctx.target());

        let robots = robots::fetch_robots(ctx.cache(), ctx.target(), ctx.probe_timeout()).await;
        let (allowed, disallowed) = select_crawlable(
            candidates,
            &robots.rules,
            ctx.user_agent_token(),
            ctx.config().crawl.max_pages,
        );

        tracing::debug!(
            "Crawling {} internal pages of {} ({} disallowed by robots.txt)",
            allowed.len(),
            ctx.target().domain(),
            disallowed.len()
        );

        let fetched = join_all(
            allowed
                .iter()
                .map(|url| ctx.cache().fetch(url, ctx.crawl_timeout())),
        )
        .await;

        let summaries: Vec<PageSummary> = fetched
            .iter()
            .flatten()
            .map(|page| PageSummary::from_fetch(page))
            .collect();

        Ok(self.score(summaries, disallowed))
    }
}

impl CrawlAnalyzer {
    fn score(&self, pages: Vec<PageSummary>, disallowed: Vec<String>) -> AnalyzerResult {
        let mut result = AnalyzerResult::new(self.name(), self.max_score());

        let missing_title = pages.iter().filter(|p| !p.has_title).count();
        let missing_desc = pages.iter().filter(|p| !p.has_meta_desc).count();
        let missing_h1 = pages.iter().filter(|p| !p.has_h1).count();
        let slow = pages.iter().filter(|p| p.is_slow()).count();

        let mut common_issues: Vec<String> = Vec::new();
        if missing_title > 0 {
            common_issues.push(format!("{} internal pages are missing a title", missing_title));
        }
        if missing_desc > 0 {
            common_issues.push(format!(
                "{} internal pages are missing a meta description",
                missing_desc
            ));
        }
        if missing_h1 > 0 {
            common_issues.push(format!("{} internal pages are missing an H1", missing_h1));
        }
        if slow > 0 {
            common_issues.push(format!("{} internal pages load slower than 3 seconds", slow));
        }

        for message in &common_issues {
            result.issue(Severity::Warning, CATEGORY, message.as_str());
        }

        if !pages.is_empty() && common_issues.is_empty() {
            result.award(3);
        }

        result.detail("pages_crawled", pages.len());
        result.detail("common_issues", common_issues);
        result.detail("skipped_by_robots", disallowed);
        result.detail(
            "page_results",
            serde_json::to_value(&pages).unwrap_or_default(),
        );

        result.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::testing::context_with_html;

    fn target() -> AuditTarget {
        AuditTarget::parse("https://example.com/").unwrap()
    }

    fn summary(url: &str, title: bool, desc: bool, h1: bool, load_time: f64) -> PageSummary {
        PageSummary {
            url: url.to_string(),
            status: 200,
            load_time,
            has_title: title,
            title: title.then(|| "Title".to_string()),
            has_meta_desc: desc,
            has_h1: h1,
        }
    }

    #[test]
    fn test_candidates_skip_assets_anchors_and_root() {
        let page = r##"
            <a href="/">Home</a>
            <a href="/about">About</a>
            <a href="/about">About again</a>
            <a href="/logo.PNG">Logo</a>
            <a href="/docs#intro">Docs</a>
            <a href="https://other.com/x">Elsewhere</a>
            <a href="/contact">Contact</a>
            <a href="/blog">Blog</a>
        "##;
        let candidates = crawl_candidates(page, &target());
        assert_eq!(
            candidates,
            vec![
                "https://example.com/about".to_string(),
                "https://example.com/contact".to_string(),
                "https://example.com/blog".to_string()
            ]
        );
    }

    #[test]
    fn test_page_cap_applies_after_robots_filter() {
        let robots = ParsedRobots::from_content("User-agent: *\nDisallow: /private/\n");
        let candidates: Vec<String> = (1..=5)
            .map(|i| format!("https://example.com/private/{}", i))
            .chain((1..=6).map(|i| format!("https://example.com/page/{}", i)))
            .collect();

        let (allowed, disallowed) = select_crawlable(candidates, &robots, "SeoAuditBot", 5);

        assert_eq!(allowed.len(), 5);
        assert!(allowed.iter().all(|url| url.contains("/page/")));
        assert_eq!(allowed[0], "https://example.com/page/1");
        assert_eq!(disallowed.len(), 5);
    }

    #[test]
    fn test_select_crawlable_keeps_page_order() {
        let candidates = vec![
            "https://example.com/b".to_string(),
            "https://example.com/a".to_string(),
        ];
        let (allowed, disallowed) =
            select_crawlable(candidates, &ParsedRobots::allow_all(), "SeoAuditBot", 5);
        assert_eq!(allowed, ["https://example.com/b", "https://example.com/a"]);
        assert!(disallowed.is_empty());
    }

    #[test]
    fn test_clean_pages_earn_bonus() {
        let pages = vec![
            summary("https://example.com/a", true, true, true, 0.4),
            summary("https://example.com/b", true, true, true, 1.2),
        ];
        let result = CrawlAnalyzer.score(pages, Vec::new());
        assert_eq!(result.score, 3);
        assert_eq!(result.details["pages_crawled"], 2);
        assert!(result.issues.is_empty());
    }

    #[test]
    fn test_issues_are_aggregated_not_per_page() {
        let pages = vec![
            summary("https://example.com/a", false, false, true, 0.4),
            summary("https://example.com/b", false, true, false, 4.0),
            summary("https://example.com/c", false, true, true, 0.2),
        ];
        let result = CrawlAnalyzer.score(pages, Vec::new());
        assert_eq!(result.score, 0);
        assert_eq!(result.issues.len(), 4);
        assert!(result.issues[0].message.starts_with("3 internal pages"));
    }

    #[test]
    fn test_nothing_crawled_scores_zero() {
        let result = CrawlAnalyzer.score(Vec::new(), Vec::new());
        assert_eq!(result.score, 0);
        assert!(result.issues.is_empty());
    }

    #[test]
    fn test_summary_from_fetch() {
        let url = url::Url::parse("https://example.com/a").unwrap();
        let page = PageFetch::from_html(
            &url,
            "<title>  About us  </title><meta name=\"description\" content=\"x\"><h1>Hi</h1>",
        );
        let summary = PageSummary::from_fetch(&page);
        assert_eq!(summary.title.as_deref(), Some("About us"));
        assert!(summary.has_meta_desc && summary.has_h1 && !summary.is_slow());
    }

    #[tokio::test]
    async fn test_unreachable_internal_pages_are_skipped() {
        let ctx = context_with_html(r#"<a href="/one">1</a><a href="/two">2</a>"#);
        let result = CrawlAnalyzer.analyze(&ctx).await.unwrap();
        assert_eq!(result.details["pages_crawled"], 0);
        assert!(result.issues.is_empty());
    }
}
