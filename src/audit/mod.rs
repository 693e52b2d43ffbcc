//! Audit orchestration, aggregation and comparison

mod compare;
mod orchestrator;
mod report;

pub use compare::{compare_reports, ComparisonReport, Metric, MetricComparison, Winner};
pub use orchestrator::Auditor;
pub use report::{sort_issues, AuditReport, Grade, IssueSummary};
