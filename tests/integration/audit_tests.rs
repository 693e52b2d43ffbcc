//! Integration tests for full audits
//!
//! These tests use wiremock to serve a small site and run the complete
//! analyzer battery against it end-to-end.

use seo_audit::analyzers::REPORT_SECTIONS;
use seo_audit::audit::{Metric, Winner};
use seo_audit::config::Config;
use seo_audit::{AnalyzerStatus, AuditReport, Auditor, Grade, Severity};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const RICH_PAGE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>Handmade Ceramic Mugs and Bowls | Clay Studio</title>
  <meta name="description" content="Clay Studio makes handmade ceramic mugs, bowls and plates in small batches. Browse the catalogue, read our glazing guide and order online today.">
  <link rel="canonical" href="/">
  <meta property="og:title" content="Clay Studio">
  <meta property="og:description" content="Handmade ceramics">
  <meta property="og:image" content="/og.png">
  <meta name="twitter:card" content="summary">
  <script type="application/ld+json">
  {"@context": "https://schema.org", "@type": "Organization", "name": "Clay Studio"}
  </script>
</head>
<body>
  <header><nav><a href="/about">About us</a> <a href="/contact">Contact</a></nav></header>
  <h1>Handmade ceramic mugs</h1>
  <h2>What is stoneware?</h2>
  <p>Stoneware is a dense ceramic fired at high temperature, which makes every mug durable and ready for daily use in any kitchen.</p>
  <h2>Our glazing process</h2>
  <p>Each ceramic piece is glazed by hand and fired twice. We mix our own glazes from natural minerals so colours vary slightly between mugs and bowls.</p>
  <img src="/mug.jpg" alt="Blue ceramic mug" width="400" height="300" loading="lazy">
  <p>Visit the <a href="/private/admin">studio tools</a> page or read about <a href="https://example.org/clay">clay types</a>.</p>
  <footer><p>&copy; 2024 Clay Studio</p><a href="https://twitter.com/claystudio">Twitter</a></footer>
</body>
</html>"#;

const SUBPAGE: &str = r#"<html><head><title>About Clay Studio</title>
<meta name="description" content="About the studio"></head>
<body><h1>About</h1><p>We are potters.</p></body></html>"#;

const BARE_PAGE: &str = "<html><body><p>hello</p></body></html>";

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .insert_header("content-type", "text/html; charset=utf-8")
        .set_body_string(body)
}

/// Mounts a small site; page mocks match any method so HEAD probes succeed
async fn mount_site(server: &MockServer) {
    Mock::given(path("/"))
        .respond_with(html(RICH_PAGE))
        .mount(server)
        .await;
    Mock::given(path("/about"))
        .respond_with(html(SUBPAGE))
        .mount(server)
        .await;
    Mock::given(path("/contact"))
        .respond_with(html(SUBPAGE))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            "User-agent: *\nDisallow: /private/\n",
        ))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/sitemap.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            "<urlset><url><loc>/</loc></url><url><loc>/about</loc></url></urlset>",
        ))
        .mount(server)
        .await;
}

async fn audit(url: &str) -> AuditReport {
    Auditor::new(url, Config::default())
        .expect("valid target")
        .full_audit()
        .await
}

fn assert_report_invariants(report: &AuditReport) {
    assert_eq!(report.analyzers.len(), REPORT_SECTIONS.len());
    for section in REPORT_SECTIONS {
        let result = report.analyzer(section).expect("section present");
        assert!(
            result.score <= result.max_score,
            "{} scored {} of {}",
            section,
            result.score,
            result.max_score
        );
    }

    let total: u32 = report.section_scores.values().sum();
    assert_eq!(report.overall_score, total.min(100));
    assert_eq!(report.grade, Grade::from_score(report.overall_score));

    let ranks: Vec<u8> = report.issues.iter().map(|i| i.severity.rank()).collect();
    let mut sorted = ranks.clone();
    sorted.sort();
    assert_eq!(ranks, sorted, "issues must be sorted by severity");

    assert_eq!(report.summary.total_issues, report.issues.len());
    assert_eq!(
        report.summary.critical_count + report.summary.warning_count + report.summary.info_count,
        report.summary.total_issues
    );
}

#[tokio::test]
async fn test_full_audit_of_rich_page() {
    let server = MockServer::start().await;
    mount_site(&server).await;

    let report = audit(&server.uri()).await;

    assert_report_invariants(&report);
    assert!(report.analyzers.values().all(|r| r.is_ok()));
    assert!(report.overall_score > 0);
    assert!(!report.recommendations.is_empty());

    let technical = report.analyzer("technical").unwrap();
    assert_eq!(technical.details["has_robots_txt"], true);
    assert_eq!(technical.details["has_sitemap"], true);
    assert_eq!(technical.details["status_code"], 200);

    let schema = report.analyzer("schema_markup").unwrap();
    assert_eq!(schema.details["has_schema"], true);

    assert!(report.detail_number("link_analysis", "internal_count") >= 3.0);
    assert_eq!(report.detail_number("image_analysis", "total"), 1.0);
}

#[tokio::test]
async fn test_unreachable_root_degrades_every_analyzer() {
    let report = audit("http://127.0.0.1:1/").await;

    assert_eq!(report.overall_score, 0);
    assert_eq!(report.grade, Grade::F);
    assert_eq!(report.analyzers.len(), REPORT_SECTIONS.len());
    assert!(report
        .analyzers
        .values()
        .all(|r| matches!(r.status, AnalyzerStatus::Unavailable { .. }) && r.score == 0));

    assert_eq!(report.summary.critical_count, 1);
    assert_eq!(report.issues[0].severity, Severity::Critical);
    assert_eq!(
        report.issues[0].message,
        "Page unavailable: http://127.0.0.1:1/ could not be fetched."
    );
}

#[tokio::test]
async fn test_repeated_audits_agree() {
    let server = MockServer::start().await;
    mount_site(&server).await;

    let first = audit(&server.uri()).await;
    let second = audit(&server.uri()).await;

    assert_eq!(first.overall_score, second.overall_score);
    assert_eq!(first.grade, second.grade);
    assert_eq!(first.section_scores, second.section_scores);
    assert_eq!(first.issues, second.issues);
}

#[tokio::test]
async fn test_report_json_round_trip() {
    let server = MockServer::start().await;
    mount_site(&server).await;

    let report = audit(&server.uri()).await;
    let json = serde_json::to_string(&report).unwrap();
    let parsed: AuditReport = serde_json::from_str(&json).unwrap();

    assert_eq!(parsed.url, report.url);
    assert_eq!(parsed.timestamp, report.timestamp);
    assert_eq!(parsed.overall_score, report.overall_score);
    assert_eq!(parsed.grade, report.grade);
    assert_eq!(parsed.section_scores, report.section_scores);
    assert_eq!(parsed.issues, report.issues);
    assert_eq!(parsed.recommendations, report.recommendations);
    assert_eq!(
        parsed.analyzers.keys().collect::<Vec<_>>(),
        report.analyzers.keys().collect::<Vec<_>>()
    );

    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert!(value["grade"].is_string());
    assert!(value["analyzers"]["meta_analysis"]["score"].is_u64());
}

#[tokio::test]
async fn test_crawl_respects_robots() {
    let server = MockServer::start().await;
    mount_site(&server).await;

    let report = audit(&server.uri()).await;
    let crawl = report.analyzer("multi_page").unwrap();

    assert_eq!(crawl.details["pages_crawled"], 2);
    let skipped = crawl.details["skipped_by_robots"].as_array().unwrap();
    assert_eq!(skipped.len(), 1);
    assert!(skipped[0].as_str().unwrap().ends_with("/private/admin"));
    assert_eq!(crawl.score, 3);
}

#[tokio::test]
async fn test_root_page_fetched_once() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(RICH_PAGE))
        .expect(1)
        .mount(&server)
        .await;

    let report = audit(&server.uri()).await;

    assert_report_invariants(&report);
    assert!(report.analyzers.values().all(|r| r.is_ok()));
    // Missing robots.txt and sitemap fall through to wiremock's 404
    let technical = report.analyzer("technical").unwrap();
    assert_eq!(technical.details["has_robots_txt"], false);
}

#[tokio::test]
async fn test_comparison_against_weaker_competitor() {
    let mine = MockServer::start().await;
    mount_site(&mine).await;

    let theirs = MockServer::start().await;
    Mock::given(path("/"))
        .respond_with(html(BARE_PAGE))
        .mount(&theirs)
        .await;

    let auditor = Auditor::new(&mine.uri(), Config::default()).unwrap();
    let own = auditor.full_audit().await;
    let comparison = auditor
        .compare_with_competitor(&own, &theirs.uri())
        .await
        .unwrap();

    assert_eq!(comparison.comparison.len(), Metric::ALL.len());
    assert_eq!(comparison.your_score, own.overall_score);
    assert!(comparison.your_score > comparison.competitor_score);

    let score = comparison.metric(Metric::OverallScore).unwrap();
    assert_eq!(score.winner, Winner::Yours);

    let words = comparison.metric(Metric::WordCount).unwrap();
    assert!(words.yours > words.competitor);
    assert_eq!(words.winner, Winner::Yours);

    let schema = comparison.metric(Metric::SchemaTypes).unwrap();
    assert_eq!(schema.competitor, 0.0);
}

#[tokio::test]
async fn test_invalid_competitor_url_is_an_error() {
    let server = MockServer::start().await;
    mount_site(&server).await;

    let auditor = Auditor::new(&server.uri(), Config::default()).unwrap();
    let own = auditor.full_audit().await;

    assert!(auditor
        .compare_with_competitor(&own, "ftp://example.com")
        .await
        .is_err());
}
