//! Technical checks on the root response
//!
//! Load time, HTTPS, page size, compression and caching headers and the
//! redirect chain come from the cached root fetch. robots.txt and the
//! sitemap are fetched through the cache with the probe timeout.

use super::{
    compile_pattern, round_to, Analyzer, AnalyzerError, AnalyzerResult, AuditContext, Severity,
};
use crate::fetch::PageFetch;
use crate::robots;
use async_trait::async_trait;
use regex::Regex;
use std::sync::LazyLock;

const CATEGORY: &str = "technical";

pub struct TechnicalAnalyzer;

#[async_trait]
impl Analyzer for TechnicalAnalyzer {
    fn name(&self) -> &'static str {
        "technical"
    }

    fn max_score(&self) -> u32 {
        24
    }

    async fn analyze(&self, ctx: &AuditContext) -> Result<AnalyzerResult, AnalyzerError> {
        let page = ctx.page().await?;
        let mut result = self.inspect_response(&page);

        // robots.txt
        let robots = robots::fetch_robots(ctx.cache(), ctx.target(), ctx.probe_timeout()).await;
        let has_robots = robots.exists();
        result.detail("has_robots_txt", has_robots);
        if has_robots {
            result.award(2);
            if let Some(file) = ctx.target().root_file("robots.txt") {
                if let Some(fetched) = ctx.cache().cached(file.as_str()) {
                    let excerpt: String = fetched.body.chars().take(500).collect();
                    result.detail("robots_txt_content", excerpt);
                }
            }
        }
        result.detail(
            "root_allowed_by_robots",
            robots::is_allowed(&robots.rules, ctx.target().url(), ctx.user_agent_token()),
        );

        // Sitemap: /sitemap.xml first, then any location robots.txt declares
        let mut candidates: Vec<String> = ctx
            .target()
            .root_file("sitemap.xml")
            .map(|url| vec![url.to_string()])
            .unwrap_or_default();
        candidates.extend(robots.rules.sitemaps().iter().cloned());
        candidates.dedup();

        let mut sitemap: Option<(String, usize)> = None;
        for candidate in candidates {
            if let Some(fetched) = ctx.cache().fetch(&candidate, ctx.probe_timeout()).await {
                if fetched.status_code == 200 {
                    let entries = count_sitemap_entries(&fetched.body);
                    sitemap = Some((candidate, entries));
                    break;
                }
            }
        }

        result.detail("has_sitemap", sitemap.is_some());
        match sitemap {
            Some((location, entries)) => {
                result.award(2);
                result.detail("sitemap_location", location);
                result.detail("sitemap_url_count", entries);
            }
            None => {
                result.issue(Severity::Warning, CATEGORY, "sitemap.xml not found.");
            }
        }
        if !has_robots {
            result.issue(Severity::Warning, CATEGORY, "robots.txt not found.");
        }

        Ok(result.finish())
    }
}

impl TechnicalAnalyzer {
    fn inspect_response(&self, page: &PageFetch) -> AnalyzerResult {
        let mut result = AnalyzerResult::new(self.name(), self.max_score());

        let load_time = page.elapsed.as_secs_f64();
        let size_kb = round_to(page.body_bytes as f64 / 1024.0, 1);

        result.detail("status_code", page.status_code);
        result.detail("response_time", round_to(load_time, 2));
        result.detail("total_load_time", round_to(load_time, 2));
        result.detail("content_size_kb", size_kb);
        result.detail("redirect_count", page.redirect_chain.len());
        result.detail("is_https", page.is_https());
        result.detail("final_url", page.final_url.as_str());

        if !page.redirect_chain.is_empty() {
            let mut chain = page.redirect_chain.clone();
            chain.push(page.final_url.to_string());
            result.detail("redirect_chain", chain);

            if page.redirect_chain.len() > 2 {
                result.issue(
                    Severity::Warning,
                    CATEGORY,
                    format!(
                        "{} redirects before the page; extra hops slow loading.",
                        page.redirect_chain.len()
                    ),
                );
            }
        }

        if load_time > 3.0 {
            result.issue(
                Severity::Critical,
                CATEGORY,
                format!("Page is very slow ({:.1}s); under 3s recommended.", load_time),
            );
        } else if load_time > 1.5 {
            result.issue(
                Severity::Warning,
                CATEGORY,
                format!("Page is slow ({:.1}s); under 1.5s is ideal.", load_time),
            );
        } else {
            result.award(8);
        }

        if page.is_https() {
            result.award(5);
        } else {
            result.issue(Severity::Critical, CATEGORY, "HTTPS is not used.");
        }

        if size_kb > 3000.0 {
            result.issue(
                Severity::Warning,
                CATEGORY,
                format!("Page is very large ({:.0} KB); under 3 MB recommended.", size_kb),
            );
        } else if size_kb < 1500.0 {
            result.award(2);
        }

        match page.header("content-encoding") {
            Some(encoding) => {
                result.detail("compression", encoding);
                result.award(3);
            }
            None => {
                result.detail("compression", "none");
                result.issue(
                    Severity::Warning,
                    CATEGORY,
                    "Gzip/Brotli compression is not enabled.",
                );
            }
        }

        match page.header("cache-control") {
            Some(cache_control) => {
                result.detail("cache_control", cache_control);
                result.award(2);
            }
            None => {
                result.detail("cache_control", "none");
                result.issue(Severity::Info, CATEGORY, "No Cache-Control header.");
            }
        }

        result
    }
}

static SITEMAP_ENTRY: LazyLock<Regex> = LazyLock::new(|| compile_pattern(r"(?i)<url[\s>]"));

fn count_sitemap_entries(body: &str) -> usize {
    SITEMAP_ENTRY.find_iter(body).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::testing::{context_with_html, count};
    use reqwest::header::HeaderValue;
    use std::time::Duration;
    use url::Url;

    fn page() -> PageFetch {
        let url = Url::parse("https://example.com/").unwrap();
        PageFetch::from_html(&url, "<html></html>")
    }

    #[test]
    fn test_fast_compressed_https_page() {
        let mut page = page();
        page.headers
            .insert("content-encoding", HeaderValue::from_static("br"));
        page.headers
            .insert("cache-control", HeaderValue::from_static("max-age=600"));

        let result = TechnicalAnalyzer.inspect_response(&page);
        assert_eq!(result.score, 20);
        assert!(result.issues.is_empty());
        assert_eq!(result.details["compression"], "br");
    }

    #[test]
    fn test_slow_page_is_critical() {
        let mut page = page();
        page.elapsed = Duration::from_millis(3500);
        let result = TechnicalAnalyzer.inspect_response(&page);
        assert!(result
            .issues
            .iter()
            .any(|i| i.severity == Severity::Critical && i.message.contains("very slow")));
        assert_eq!(result.details["response_time"], 3.5);
    }

    #[test]
    fn test_long_redirect_chain_warns() {
        let mut page = page();
        page.redirect_chain = vec![
            "http://example.com/".to_string(),
            "https://example.com/index".to_string(),
            "https://www.example.com/".to_string(),
        ];
        let result = TechnicalAnalyzer.inspect_response(&page);
        assert!(result.issues.iter().any(|i| i.message.contains("3 redirects")));
        assert_eq!(result.details["redirect_chain"].as_array().unwrap().len(), 4);
    }

    #[test]
    fn test_sitemap_entry_count() {
        let xml = "<urlset><url><loc>a</loc></url><URL ><loc>b</loc></URL><urlx/></urlset>";
        assert_eq!(count_sitemap_entries(xml), 2);
    }

    #[tokio::test]
    async fn test_unreachable_auxiliary_files_warn() {
        let ctx = context_with_html("<html></html>");
        let result = TechnicalAnalyzer.analyze(&ctx).await.unwrap();

        assert_eq!(result.details["has_robots_txt"], false);
        assert_eq!(result.details["has_sitemap"], false);
        assert_eq!(result.details["root_allowed_by_robots"], true);
        // plain http is critical; two missing files and compression warn
        assert_eq!(count(&result, Severity::Critical), 1);
        assert_eq!(count(&result, Severity::Warning), 3);
        assert_eq!(result.score, 10);
    }
}
