//! Markdown rendering of audit and comparison reports

use crate::analyzers::{AnalyzerResult, AnalyzerStatus, Severity, REPORT_SECTIONS};
use crate::audit::{AuditReport, ComparisonReport};

/// Formats an audit report as markdown
///
/// Sections appear in the default battery order; any extra analyzers follow
/// in name order.
pub fn format_audit_markdown(report: &AuditReport) -> String {
    let mut md = String::new();

    md.push_str(&format!("# SEO Audit: {}\n\n", report.url));
    md.push_str(&format!("- **Domain**: {}\n", report.domain));
    md.push_str(&format!("- **Audited**: {}\n", report.timestamp.to_rfc3339()));
    md.push_str(&format!(
        "- **Overall Score**: {}/100\n",
        report.overall_score
    ));
    md.push_str(&format!("- **Grade**: {}\n\n", report.grade));

    md.push_str("## Section Scores\n\n");
    md.push_str("| Section | Score | Status |\n");
    md.push_str("|---------|-------|--------|\n");
    for result in ordered_results(report) {
        md.push_str(&format!(
            "| {} | {}/{} | {} |\n",
            result.name,
            result.score,
            result.max_score,
            status_label(&result.status)
        ));
    }
    md.push('\n');

    md.push_str("## Issue Summary\n\n");
    md.push_str("| Severity | Count |\n");
    md.push_str("|----------|-------|\n");
    md.push_str(&format!("| Critical | {} |\n", report.summary.critical_count));
    md.push_str(&format!("| Warning | {} |\n", report.summary.warning_count));
    md.push_str(&format!("| Info | {} |\n", report.summary.info_count));
    md.push_str(&format!("| **Total** | {} |\n\n", report.summary.total_issues));

    for severity in [Severity::Critical, Severity::Warning, Severity::Info] {
        let mut issues = report
            .issues
            .iter()
            .filter(|issue| issue.severity == severity)
            .peekable();
        if issues.peek().is_none() {
            continue;
        }

        md.push_str(&format!("## {} Issues\n\n", heading_for(severity)));
        for issue in issues {
            md.push_str(&format!("- [{}] {}\n", issue.category, issue.message));
        }
        md.push('\n');
    }

    if !report.recommendations.is_empty() {
        md.push_str("## Recommendations\n\n");
        for line in &report.recommendations {
            md.push_str(&format!("- {}\n", line));
        }
        md.push('\n');
    }

    md
}

/// Formats a comparison as a markdown table
pub fn format_comparison_markdown(comparison: &ComparisonReport) -> String {
    let mut md = String::new();

    md.push_str(&format!(
        "# Competitor Comparison: {} vs {}\n\n",
        comparison.your_site, comparison.competitor
    ));
    md.push_str(&format!(
        "- **Your Score**: {}/100\n",
        comparison.your_score
    ));
    md.push_str(&format!(
        "- **Competitor Score**: {}/100\n",
        comparison.competitor_score
    ));
    md.push_str(&format!(
        "- **Metrics Won**: {} of {}\n\n",
        comparison.wins(),
        comparison.comparison.len()
    ));

    md.push_str("| Metric | You | Competitor | Winner |\n");
    md.push_str("|--------|-----|------------|--------|\n");
    for row in &comparison.comparison {
        md.push_str(&format!(
            "| {} | {} | {} | {} |\n",
            row.label,
            format_number(row.yours),
            format_number(row.competitor),
            row.winner
        ));
    }
    md.push('\n');

    md
}

fn ordered_results(report: &AuditReport) -> Vec<&AnalyzerResult> {
    let mut ordered: Vec<&AnalyzerResult> = REPORT_SECTIONS
        .iter()
        .filter_map(|name| report.analyzers.get(*name))
        .collect();
    ordered.extend(
        report
            .analyzers
            .values()
            .filter(|result| !REPORT_SECTIONS.contains(&result.name.as_str())),
    );
    ordered
}

fn status_label(status: &AnalyzerStatus) -> String {
    match status {
        AnalyzerStatus::Ok => "ok".to_string(),
        AnalyzerStatus::Unavailable { reason } => format!("unavailable ({})", reason),
        AnalyzerStatus::Failed { error } => format!("failed ({})", error),
    }
}

fn heading_for(severity: Severity) -> &'static str {
    match severity {
        Severity::Critical => "Critical",
        Severity::Warning => "Warning",
        Severity::Info => "Info",
    }
}

fn format_number(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{:.0}", value)
    } else {
        format!("{:.2}", value)
    }
}
