//! Audit report and score aggregation

use crate::analyzers::{AnalyzerResult, Issue, Severity};
use crate::url::AuditTarget;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// Letter grade derived from the overall score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Grade {
    #[serde(rename = "A+")]
    APlus,
    A,
    B,
    C,
    D,
    F,
}

impl Grade {
    /// Maps an overall score to its grade
    ///
    /// | score | grade |
    /// |-------|-------|
    /// | >= 90 | A+ |
    /// | >= 80 | A |
    /// | >= 70 | B |
    /// | >= 60 | C |
    /// | >= 40 | D |
    /// | else  | F |
    pub fn from_score(score: u32) -> Self {
        match score {
            s if s >= 90 => Grade::APlus,
            s if s >= 80 => Grade::A,
            s if s >= 70 => Grade::B,
            s if s >= 60 => Grade::C,
            s if s >= 40 => Grade::D,
            _ => Grade::F,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Grade::APlus => "A+",
            Grade::A => "A",
            Grade::B => "B",
            Grade::C => "C",
            Grade::D => "D",
            Grade::F => "F",
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Issue counts by severity
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueSummary {
    pub total_issues: usize,
    pub critical_count: usize,
    pub warning_count: usize,
    pub info_count: usize,
}

impl IssueSummary {
    pub fn from_issues(issues: &[Issue]) -> Self {
        let count = |severity: Severity| issues.iter().filter(|i| i.severity == severity).count();
        Self {
            total_issues: issues.len(),
            critical_count: count(Severity::Critical),
            warning_count: count(Severity::Warning),
            info_count: count(Severity::Info),
        }
    }
}

/// The result of one full audit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditReport {
    pub url: String,
    pub domain: String,
    pub timestamp: DateTime<Utc>,
    /// Analyzer results keyed by report section name
    pub analyzers: BTreeMap<String, AnalyzerResult>,
    pub section_scores: BTreeMap<String, u32>,
    pub overall_score: u32,
    pub grade: Grade,
    /// All issues, critical first; equal severities keep analyzer order
    pub issues: Vec<Issue>,
    pub summary: IssueSummary,
    pub recommendations: Vec<String>,
}

impl AuditReport {
    /// Aggregates analyzer results into a report
    ///
    /// `top_level` issues (such as an unreachable root page) are placed
    /// ahead of analyzer issues before sorting. When two results share a
    /// name the later one replaces the earlier, for the score as well as
    /// the section map.
    pub fn assemble(
        target: &AuditTarget,
        results: Vec<AnalyzerResult>,
        top_level: Vec<Issue>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        let results = last_per_name(results);
        let total: u32 = results.iter().map(|r| r.score).sum();
        let overall_score = total.min(100);
        let grade = Grade::from_score(overall_score);

        let mut issues = top_level;
        issues.extend(results.iter().flat_map(|r| r.issues.iter().cloned()));
        sort_issues(&mut issues);

        let summary = IssueSummary::from_issues(&issues);
        let recommendations = recommendations(&summary, overall_score);

        let section_scores = results.iter().map(|r| (r.name.clone(), r.score)).collect();
        let analyzers = results.into_iter().map(|r| (r.name.clone(), r)).collect();

        Self {
            url: target.as_str().to_string(),
            domain: target.domain().to_string(),
            timestamp,
            analyzers,
            section_scores,
            overall_score,
            grade,
            issues,
            summary,
            recommendations,
        }
    }

    pub fn analyzer(&self, name: &str) -> Option<&AnalyzerResult> {
        self.analyzers.get(name)
    }

    /// Numeric detail of one analyzer, zero when absent
    pub fn detail_number(&self, section: &str, key: &str) -> f64 {
        self.analyzer(section)
            .and_then(|result| result.number(key))
            .unwrap_or(0.0)
    }

    pub fn section_score(&self, section: &str) -> u32 {
        self.section_scores.get(section).copied().unwrap_or(0)
    }
}

/// Stable sort by severity rank
pub fn sort_issues(issues: &mut [Issue]) {
    issues.sort_by_key(|issue| issue.severity.rank());
}

fn recommendations(summary: &IssueSummary, score: u32) -> Vec<String> {
    let mut lines = Vec::new();

    if summary.critical_count > 0 {
        lines.push(format!(
            "{} critical issues need to be fixed immediately",
            summary.critical_count
        ));
    }
    if summary.warning_count > 0 {
        lines.push(format!("{} warnings need attention", summary.warning_count));
    }
    if summary.info_count > 0 {
        lines.push(format!(
            "{} improvement suggestions are available",
            summary.info_count
        ));
    }

    let band = if score >= 80 {
        "The site is in good overall shape"
    } else if score >= 60 {
        "The site is above average but has room for improvement"
    } else {
        "The site needs serious SEO improvements"
    };
    lines.push(band.to_string());

    lines
}

/// Keeps the last result for each analyzer name, in run order
fn last_per_name(results: Vec<AnalyzerResult>) -> Vec<AnalyzerResult> {
    let mut last_index: HashMap<String, usize> = HashMap::new();
    for (index, result) in results.iter().enumerate() {
        last_index.insert(result.name.clone(), index);
    }
    results
        .into_iter()
        .enumerate()
        .filter(|(index, result)| last_index.get(&result.name) == Some(index))
        .map(|(_, result)| result)
        .collect()
}
