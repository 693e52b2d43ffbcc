//! Link analysis
//!
//! Classifies every anchor on the page as internal or external, counts
//! nofollow and empty anchors, and probes a sample of internal links with
//! HEAD requests to find broken ones.

use super::{Analyzer, AnalyzerError, AnalyzerResult, AuditContext, Severity};
use crate::fetch::Probe;
use crate::html;
use crate::url::{extract_domain, AuditTarget, LinkScope};
use async_trait::async_trait;
use futures::future::join_all;
use scraper::Html;
use serde_json::{json, Value};
use std::collections::HashSet;

const CATEGORY: &str = "link";

pub struct LinkAnalyzer;

/// A resolved anchor
#[derive(Debug, Clone)]
struct Anchor {
    url: String,
    text: String,
    domain: String,
}

#[derive(Debug, Default)]
struct LinkInventory {
    internal: Vec<Anchor>,
    external: Vec<Anchor>,
    external_domains: Vec<String>,
    nofollow: usize,
    empty_anchors: usize,
}

impl LinkInventory {
    fn from_html(body: &str, target: &AuditTarget) -> Self {
        let document = Html::parse_document(body);
        let mut inventory = LinkInventory::default();
        let mut seen_domains = HashSet::new();

        for link in html::select_all(&document, "a[href]") {
            let href = link.value().attr("href").unwrap_or("");
            let text = html::stripped_text(&link);

            if html::has_rel(&link, |token| token == "nofollow") {
                inventory.nofollow += 1;
            }

            if text.is_empty() && html::select_all_within(&link, "img").is_empty() {
                inventory.empty_anchors += 1;
            }

            let Some(url) = target.resolve(href) else {
                continue;
            };
            let domain = extract_domain(&url).unwrap_or_default();
            let anchor = Anchor {
                url: url.to_string(),
                text: html::truncate_chars(&text, 60),
                domain: domain.clone(),
            };

            match target.scope_of(&url) {
                LinkScope::Internal => inventory.internal.push(anchor),
                LinkScope::External => {
                    if seen_domains.insert(domain.clone()) {
                        inventory.external_domains.push(domain);
                    }
                    inventory.external.push(anchor);
                }
            }
        }

        inventory
    }

    /// Distinct internal URLs in page order
    fn probe_sample(&self, size: usize) -> Vec<String> {
        let mut seen = HashSet::new();
        self.internal
            .iter()
            .filter(|anchor| seen.insert(anchor.url.as_str()))
            .take(size)
            .map(|anchor| anchor.url.clone())
            .collect()
    }
}

#[async_trait]
impl Analyzer for LinkAnalyzer {
    fn name(&self) -> &'static str {
        "link_analysis"
    }

    fn max_score(&self) -> u32 {
        6
    }

    async fn analyze(&self, ctx: &AuditContext) -> Result<AnalyzerResult, AnalyzerError> {
        let page = ctx.page().await?;
        let inventory = LinkInventory::from_html(&page.body, ctx.target());

        let sample = inventory.probe_sample(ctx.config().links.probe_sample);
        let probes = join_all(
            sample
                .iter()
                .map(|url| ctx.cache().probe(url, ctx.probe_timeout())),
        )
        .await;

        let broken: Vec<Value> = sample
            .iter()
            .zip(probes)
            .filter(|(_, probe)| probe.is_broken())
            .map(|(url, probe)| match probe {
                Probe::Status(code) => json!({ "url": url, "status": code }),
                Probe::Failed(reason) => json!({ "url": url, "status": reason }),
            })
            .collect();

        tracing::debug!(
            "Probed {} internal links on {}, {} broken",
            sample.len(),
            ctx.target().domain(),
            broken.len()
        );

        Ok(self.score(&inventory, broken))
    }
}

impl LinkAnalyzer {
    fn score(&self, inventory: &LinkInventory, broken: Vec<Value>) -> AnalyzerResult {
        let mut result = AnalyzerResult::new(self.name(), self.max_score());

        let internal_count = inventory.internal.len();
        let external_count = inventory.external.len();

        if internal_count >= 5 {
            result.award(4);
        } else if internal_count >= 2 {
            result.award(2);
        }
        if external_count >= 1 {
            result.award(2);
        }

        if inventory.empty_anchors > 5 {
            result.issue(
                Severity::Warning,
                CATEGORY,
                format!("{} links have empty anchor text.", inventory.empty_anchors),
            );
        }
        if !broken.is_empty() {
            result.issue(
                Severity::Critical,
                CATEGORY,
                format!("{} broken links detected.", broken.len()),
            );
        }

        let top_internal: Vec<Value> = inventory
            .internal
            .iter()
            .take(15)
            .map(|a| json!({ "url": a.url, "anchor": a.text }))
            .collect();
        let top_external: Vec<Value> = inventory
            .external
            .iter()
            .take(15)
            .map(|a| json!({ "url": a.url, "anchor": a.text, "domain": a.domain }))
            .collect();

        result.detail("internal_count", internal_count);
        result.detail("external_count", external_count);
        result.detail(
            "external_domains",
            inventory
                .external_domains
                .iter()
                .take(20)
                .cloned()
                .collect::<Vec<_>>(),
        );
        result.detail("external_domain_count", inventory.external_domains.len());
        result.detail("nofollow_count", inventory.nofollow);
        result.detail("empty_anchors", inventory.empty_anchors);
        result.detail("broken_link_count", broken.len());
        result.detail("broken_links", broken);
        result.detail("top_internal", top_internal);
        result.detail("top_external", top_external);

        result.finish()
    }
}
