//! Head-to-head comparison of two audit reports

use super::AuditReport;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which side a metric favours
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Winner {
    Yours,
    Competitor,
}

impl fmt::Display for Winner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Winner::Yours => f.write_str("You"),
            Winner::Competitor => f.write_str("Competitor"),
        }
    }
}

/// The fixed set of compared metrics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    OverallScore,
    WordCount,
    InternalLinks,
    ExternalLinks,
    ResponseTime,
    ImageCount,
    SchemaTypes,
    CriticalIssues,
}

impl Metric {
    pub const ALL: [Metric; 8] = [
        Metric::OverallScore,
        Metric::WordCount,
        Metric::InternalLinks,
        Metric::ExternalLinks,
        Metric::ResponseTime,
        Metric::ImageCount,
        Metric::SchemaTypes,
        Metric::CriticalIssues,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Metric::OverallScore => "SEO Score",
            Metric::WordCount => "Word Count",
            Metric::InternalLinks => "Internal Links",
            Metric::ExternalLinks => "External Links",
            Metric::ResponseTime => "Response Time (s)",
            Metric::ImageCount => "Image Count",
            Metric::SchemaTypes => "Schema Types",
            Metric::CriticalIssues => "Critical Issues",
        }
    }

    /// Response time and critical issues are better when smaller
    pub fn lower_is_better(self) -> bool {
        matches!(self, Metric::ResponseTime | Metric::CriticalIssues)
    }

    /// Reads the metric from a report; missing data counts as zero
    pub fn value(self, report: &AuditReport) -> f64 {
        match self {
            Metric::OverallScore => f64::from(report.overall_score),
            Metric::WordCount => report.detail_number("content_analysis", "word_count"),
            Metric::InternalLinks => report.detail_number("link_analysis", "internal_count"),
            Metric::ExternalLinks => report.detail_number("link_analysis", "external_count"),
            Metric::ResponseTime => report.detail_number("technical", "response_time"),
            Metric::ImageCount => report.detail_number("image_analysis", "total"),
            Metric::SchemaTypes => report
                .analyzer("schema_markup")
                .and_then(|r| r.details.get("json_ld_types"))
                .and_then(|types| types.as_array())
                .map_or(0.0, |types| types.len() as f64),
            Metric::CriticalIssues => report.summary.critical_count as f64,
        }
    }

    /// Ties go to the audited site
    pub fn winner(self, yours: f64, competitor: f64) -> Winner {
        let yours_wins = if self.lower_is_better() {
            yours <= competitor
        } else {
            yours >= competitor
        };
        if yours_wins {
            Winner::Yours
        } else {
            Winner::Competitor
        }
    }
}

/// One row of the comparison table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricComparison {
    pub metric: Metric,
    pub label: String,
    pub yours: f64,
    pub competitor: f64,
    pub winner: Winner,
}

/// Per-metric verdict between the audited site and a competitor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonReport {
    pub your_site: String,
    pub competitor: String,
    pub your_score: u32,
    pub competitor_score: u32,
    pub comparison: Vec<MetricComparison>,
}

impl ComparisonReport {
    pub fn metric(&self, metric: Metric) -> Option<&MetricComparison> {
        self.comparison.iter().find(|row| row.metric == metric)
    }

    /// Number of metrics the audited site wins
    pub fn wins(&self) -> usize {
        self.comparison
            .iter()
            .filter(|row| row.winner == Winner::Yours)
            .count()
    }
}

/// Compares two finished reports; neither is modified
pub fn compare_reports(yours: &AuditReport, competitor: &AuditReport) -> ComparisonReport {
    let comparison = Metric::ALL
        .iter()
        .map(|&metric| {
            let mine = metric.value(yours);
            let theirs = metric.value(competitor);
            MetricComparison {
                metric,
                label: metric.label().to_string(),
                yours: mine,
                competitor: theirs,
                winner: metric.winner(mine, theirs),
            }
        })
        .collect();

    ComparisonReport {
        your_site: yours.url.clone(),
        competitor: competitor.url.clone(),
        your_score: yours.overall_score,
        competitor_score: competitor.overall_score,
        comparison,
    }
}
