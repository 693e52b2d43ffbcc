//! Audit orchestration
//!
//! The [`Auditor`] owns one target, one configuration and one page cache.
//! It fetches the root page, runs the analyzers in a fixed order and
//! aggregates their results.

use super::{compare_reports, AuditReport, ComparisonReport};
use crate::analyzers::{
    default_analyzers, Analyzer, AnalyzerError, AnalyzerResult, AuditContext, Issue, Severity,
};
use crate::config::Config;
use crate::fetch::{build_http_client, PageCache};
use crate::url::AuditTarget;
use chrono::Utc;
use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::time::Instant;

/// Runs audits against a single site
pub struct Auditor {
    ctx: AuditContext,
    analyzers: Vec<Box<dyn Analyzer>>,
}

impl Auditor {
    /// Creates an auditor for user input (scheme optional)
    ///
    /// # Errors
    ///
    /// Returns an error if the URL cannot be normalized or the HTTP client
    /// cannot be built. Network failures never surface here.
    pub fn new(input: &str, config: Config) -> crate::Result<Self> {
        let target = AuditTarget::parse(input)?;
        let client = build_http_client(&config.user_agent)?;
        let cache = PageCache::new(client, config.fetch.max_redirects);

        Ok(Self {
            ctx: AuditContext::new(target, config, cache),
            analyzers: default_analyzers(),
        })
    }

    /// Replaces the analyzer battery
    pub fn with_analyzers(mut self, analyzers: Vec<Box<dyn Analyzer>>) -> Self {
        self.analyzers = analyzers;
        self
    }

    pub fn target(&self) -> &AuditTarget {
        self.ctx.target()
    }

    pub fn context(&self) -> &AuditContext {
        &self.ctx
    }

    /// Runs every analyzer and aggregates the report
    ///
    /// Always returns a report. When the root page cannot be fetched every
    /// analyzer is marked unavailable and a single critical issue is added.
    pub async fn full_audit(&self) -> AuditReport {
        let started = Instant::now();
        let target = self.ctx.target();
        tracing::info!("Starting audit of {}", target.as_str());

        if let Err(e) = self.ctx.page().await {
            tracing::warn!("Audit of {} degraded: {}", target.as_str(), e);
            let reason = e.to_string();
            let results = self
                .analyzers
                .iter()
                .map(|a| AnalyzerResult::unavailable(a.name(), a.max_score(), reason.as_str()))
                .collect();
            let issue = Issue::new(
                Severity::Critical,
                "page",
                format!("Page unavailable: {} could not be fetched.", target.as_str()),
            );
            return AuditReport::assemble(target, results, vec![issue], Utc::now());
        }

        let mut results = Vec::with_capacity(self.analyzers.len());
        for analyzer in &self.analyzers {
            results.push(self.run_analyzer(analyzer.as_ref()).await);
        }

        let report = AuditReport::assemble(target, results, Vec::new(), Utc::now());
        tracing::info!(
            "Audit of {} finished in {:.2?}: score {} ({}), {} issues, {} pages fetched",
            target.as_str(),
            started.elapsed(),
            report.overall_score,
            report.grade,
            report.summary.total_issues,
            self.ctx.cache().len()
        );
        report
    }

    async fn run_analyzer(&self, analyzer: &dyn Analyzer) -> AnalyzerResult {
        let name = analyzer.name();
        let max_score = analyzer.max_score();

        match AssertUnwindSafe(analyzer.analyze(&self.ctx))
            .catch_unwind()
            .await
        {
            Ok(Ok(result)) => {
                tracing::debug!("{}: {}/{}", name, result.score, max_score);
                result
            }
            Ok(Err(AnalyzerError::PageUnavailable { url })) => {
                tracing::warn!("{} unavailable: could not fetch {}", name, url);
                AnalyzerResult::unavailable(name, max_score, format!("page unavailable: {}", url))
            }
            Ok(Err(e)) => {
                tracing::warn!("{} failed: {}", name, e);
                AnalyzerResult::failed(name, max_score, e.to_string())
            }
            Err(panic) => {
                let message = panic_message(panic.as_ref());
                tracing::warn!("{} panicked: {}", name, message);
                AnalyzerResult::failed(name, max_score, message)
            }
        }
    }

    /// Audits a competitor with the same configuration and compares
    ///
    /// `own` is the report produced by this auditor's `full_audit`.
    pub async fn compare_with_competitor(
        &self,
        own: &AuditReport,
        competitor_url: &str,
    ) -> crate::Result<ComparisonReport> {
        let competitor = Auditor::new(competitor_url, self.ctx.config().clone())?;
        let theirs = competitor.full_audit().await;
        Ok(compare_reports(own, &theirs))
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "analyzer panicked".to_string()
    }
}
