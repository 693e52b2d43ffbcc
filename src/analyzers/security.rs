//! Security response headers.

use super::{Analyzer, AnalyzerError, AnalyzerResult, AuditContext, Severity};
use crate::fetch::PageFetch;
use async_trait::async_trait;
use serde_json::{Map, Value};

const CATEGORY: &str = "security";

/// Header, severity when missing, message when missing
const CHECKS: &[(&str, Severity, &str)] = &[
    (
        "Strict-Transport-Security",
        Severity::Warning,
        "HSTS header is missing; enforcing HTTPS is recommended.",
    ),
    (
        "X-Content-Type-Options",
        Severity::Info,
        "X-Content-Type-Options header is missing.",
    ),
    (
        "X-Frame-Options",
        Severity::Info,
        "X-Frame-Options header is missing; clickjacking protection is recommended.",
    ),
    (
        "Content-Security-Policy",
        Severity::Info,
        "Content-Security-Policy header is missing.",
    ),
    (
        "X-XSS-Protection",
        Severity::Info,
        "X-XSS-Protection header is missing.",
    ),
];

pub struct SecurityAnalyzer;

#[async_trait]
impl Analyzer for SecurityAnalyzer {
    fn name(&self) -> &'static str {
        "security_headers"
    }

    fn max_score(&self) -> u32 {
        5
    }

    async fn analyze(&self, ctx: &AuditContext) -> Result<AnalyzerResult, AnalyzerError> {
        let page = ctx.page().await?;
        Ok(self.inspect(&page))
    }
}

fn security_grade(found: u32) -> &'static str {
    match found {
        n if n >= 4 => "A",
        3 => "B",
        2 => "C",
        1 => "D",
        _ => "F",
    }
}

impl SecurityAnalyzer {
    fn inspect(&self, page: &PageFetch) -> AnalyzerResult {
        let mut result = AnalyzerResult::new(self.name(), self.max_score());
        let mut headers = Map::new();
        let mut found = 0u32;

        for (header, severity, message) in CHECKS {
            match page.header(header) {
                Some(value) => {
                    found += 1;
                    headers.insert(header.to_string(), Value::from(value));
                }
                None => {
                    headers.insert(header.to_string(), Value::from("missing"));
                    result.issue(*severity, CATEGORY, *message);
                }
            }
        }

        if let Some(server) = page.header("server") {
            headers.insert("Server".to_string(), Value::from(server));
            result.issue(
                Severity::Info,
                CATEGORY,
                format!("Server header discloses '{}'; hiding it is recommended.", server),
            );
        }

        result.award(found);
        result.detail("headers", Value::Object(headers));
        result.detail("security_grade", security_grade(found));
        result.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::testing::count;
    use reqwest::header::HeaderValue;
    use url::Url;

    fn page(headers: &[(&'static str, &'static str)]) -> PageFetch {
        let url = Url::parse("https://example.com/").unwrap();
        let mut page = PageFetch::from_html(&url, "");
        for (name, value) in headers {
            page.headers.insert(*name, HeaderValue::from_static(*value));
        }
        page
    }

    #[test]
    fn test_no_headers_grade_f() {
        let result = SecurityAnalyzer.inspect(&page(&[]));
        assert_eq!(result.score, 0);
        assert_eq!(result.details["security_grade"], "F");
        assert_eq!(count(&result, Severity::Warning), 1);
        assert_eq!(count(&result, Severity::Info), 4);
    }

    #[test]
    fn test_all_headers_grade_a() {
        let result = SecurityAnalyzer.inspect(&page(&[
            ("strict-transport-security", "max-age=31536000"),
            ("x-content-type-options", "nosniff"),
            ("x-frame-options", "DENY"),
            ("content-security-policy", "default-src 'self'"),
            ("x-xss-protection", "1; mode=block"),
        ]));
        assert_eq!(result.score, 5);
        assert_eq!(result.details["security_grade"], "A");
        assert!(result.issues.is_empty());
    }

    #[test]
    fn test_server_disclosure_is_info() {
        let result = SecurityAnalyzer.inspect(&page(&[
            ("x-frame-options", "SAMEORIGIN"),
            ("x-content-type-options", "nosniff"),
            ("server", "nginx/1.25"),
        ]));
        assert_eq!(result.details["security_grade"], "C");
        assert!(result.issues.iter().any(|i| i.message.contains("nginx/1.25")));
    }

    #[test]
    fn test_grade_thresholds() {
        assert_eq!(security_grade(5), "A");
        assert_eq!(security_grade(4), "A");
        assert_eq!(security_grade(3), "B");
        assert_eq!(security_grade(1), "D");
    }
}
