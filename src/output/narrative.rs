//! Narrative summaries of an audit
//!
//! A narrative turns a report into prose a site owner can act on. The
//! offline template implementation needs no network access.

use crate::analyzers::Severity;
use crate::audit::AuditReport;

/// Produces a markdown narrative for a finished audit
pub trait NarrativeGenerator {
    fn generate(&self, url: &str, report: &AuditReport) -> String;
}

/// Builds a prioritized action list from the report's top issues
#[derive(Debug, Clone)]
pub struct TemplateNarrative {
    max_actions: usize,
}

impl TemplateNarrative {
    pub fn new(max_actions: usize) -> Self {
        Self { max_actions }
    }
}

impl Default for TemplateNarrative {
    fn default() -> Self {
        Self::new(10)
    }
}

impl NarrativeGenerator for TemplateNarrative {
    fn generate(&self, url: &str, report: &AuditReport) -> String {
        let mut md = String::new();

        md.push_str(&format!("## Action Plan for {}\n\n", url));
        md.push_str(&format!(
            "The page scored {}/100 (grade {}) with {} critical issues, {} warnings and {} suggestions.\n\n",
            report.overall_score,
            report.grade,
            report.summary.critical_count,
            report.summary.warning_count,
            report.summary.info_count
        ));

        if report.issues.is_empty() {
            md.push_str("No outstanding issues were found. Keep monitoring the page after each release.\n");
            return md;
        }

        md.push_str("### Priorities\n\n");
        // Issues are already sorted critical first
        for (index, issue) in report.issues.iter().take(self.max_actions).enumerate() {
            md.push_str(&format!(
                "{}. **{}** ({}): {}\n",
                index + 1,
                urgency(issue.severity),
                issue.category,
                issue.message
            ));
        }

        let remaining = report.issues.len().saturating_sub(self.max_actions);
        if remaining > 0 {
            md.push_str(&format!(
                "\n{} further issues are listed in the full report.\n",
                remaining
            ));
        }

        let weakest = report
            .analyzers
            .values()
            .filter(|result| result.max_score > 0)
            .min_by(|a, b| {
                let ra = f64::from(a.score) / f64::from(a.max_score);
                let rb = f64::from(b.score) / f64::from(b.max_score);
                ra.total_cmp(&rb)
            });
        if let Some(weakest) = weakest {
            md.push_str(&format!(
                "\nThe weakest area is `{}` at {}/{} points.\n",
                weakest.name, weakest.score, weakest.max_score
            ));
        }

        md
    }
}

fn urgency(severity: Severity) -> &'static str {
    match severity {
        Severity::Critical => "Fix now",
        Severity::Warning => "Fix soon",
        Severity::Info => "Consider",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::{AnalyzerResult, Issue};
    use crate::url::AuditTarget;
    use chrono::Utc;

    fn report(issue_count: usize) -> AuditReport {
        let target = AuditTarget::parse("https://example.com/").unwrap();
        let mut meta = AnalyzerResult::new("meta_analysis", 38);
        meta.score = 30;
        meta.issues = (0..issue_count)
            .map(|i| Issue::new(Severity::Warning, "meta", format!("warning {}", i)))
            .collect();
        meta.issues
            .push(Issue::new(Severity::Critical, "meta", "Missing title tag"));
        let mut speed = AnalyzerResult::new("page_speed", 5);
        speed.score = 1;
        AuditReport::assemble(&target, vec![meta, speed], Vec::new(), Utc::now())
    }

    #[test]
    fn test_critical_issue_listed_first() {
        let narrative = TemplateNarrative::default().generate("https://example.com/", &report(2));

        assert!(narrative.contains("1. **Fix now** (meta): Missing title tag"));
        assert!(narrative.contains("2. **Fix soon** (meta): warning 0"));
        assert!(narrative.contains("weakest area is `page_speed`"));
    }

    #[test]
    fn test_action_list_is_capped() {
        let narrative = TemplateNarrative::new(3).generate("https://example.com/", &report(5));

        assert!(narrative.contains("3. **Fix soon**"));
        assert!(!narrative.contains("4. **"));
        assert!(narrative.contains("3 further issues"));
    }

    #[test]
    fn test_clean_report() {
        let target = AuditTarget::parse("https://example.com/").unwrap();
        let mut meta = AnalyzerResult::new("meta_analysis", 38);
        meta.score = 38;
        let report = AuditReport::assemble(&target, vec![meta], Vec::new(), Utc::now());

        let narrative = TemplateNarrative::default().generate("https://example.com/", &report);
        assert!(narrative.contains("No outstanding issues"));
    }
}
