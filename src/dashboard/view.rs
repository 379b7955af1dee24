//! Presentation-ready rollups derived from one snapshot.
//!
//! Everything here is recomputed from the canonical payload on each render;
//! nothing mutates the fetched data.

use chrono::DateTime;
use serde::Serialize;

use crate::dashboard::metrics::{self, Severity, Tone};
use crate::models::{Build, BuildStatus, Project, TestResults, TestSuite};

/// Visual tone of a status badge.
pub fn status_tone(status: &BuildStatus) -> Tone {
    match status {
        BuildStatus::Success => Tone::Success,
        BuildStatus::Failure => Tone::Error,
        BuildStatus::Unstable => Tone::Warning,
        BuildStatus::InProgress => Tone::Primary,
        BuildStatus::Aborted | BuildStatus::NotBuilt => Tone::Muted,
        BuildStatus::Unknown(_) => Tone::Secondary,
    }
}

/// A percentage paired with its severity band, ready for a progress bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RatedMetric {
    pub percentage: i64,
    pub severity: Severity,
}

impl RatedMetric {
    /// Band an already-computed percentage.
    pub fn from_percentage(percentage: i64) -> Self {
        Self {
            percentage,
            severity: Severity::from_percentage(percentage),
        }
    }

    /// Band a covered/total pair.
    pub fn from_pair(covered: i64, total: i64) -> Self {
        Self::from_percentage(metrics::coverage_percentage(covered, total))
    }

    /// Band a 0.0–1.0 ratio.
    pub fn from_rate(rate: f64) -> Self {
        Self::from_percentage(metrics::rate_percentage(rate))
    }
}

/// Aggregate badge for a suite row.
///
/// Derived from the suite's own failure counter, so it stays correct no
/// matter how the case list is currently filtered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "failures", rename_all = "camelCase")]
pub enum SuiteBadge {
    AllPassed,
    Failed(i64),
}

impl SuiteBadge {
    /// Badge for one suite.
    pub fn for_suite(suite: &TestSuite) -> Self {
        if suite.failures > 0 {
            Self::Failed(suite.failures)
        } else {
            Self::AllPassed
        }
    }

    /// Badge text.
    pub fn label(&self) -> String {
        match self {
            Self::AllPassed => "All Passed".to_string(),
            Self::Failed(n) => format!("{} Failed", n),
        }
    }

    /// Badge tone.
    pub fn tone(&self) -> Tone {
        match self {
            Self::AllPassed => Tone::Success,
            Self::Failed(_) => Tone::Error,
        }
    }
}

/// Derived numbers for one build card.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildCardView {
    /// Coverage bar with its band.
    pub coverage: RatedMetric,

    /// Share of tests that passed, 0 when no tests ran.
    pub passed_percentage: i64,

    /// Share of tests that failed, 0 when no tests ran.
    pub failed_percentage: i64,

    /// Badge tone for the build status.
    pub status_tone: Tone,
}

impl BuildCardView {
    /// Derive the card numbers from a build's headline counters.
    pub fn from_build(build: &Build) -> Self {
        Self {
            coverage: RatedMetric::from_percentage(build.coverage_percentage),
            passed_percentage: metrics::coverage_percentage(build.tests_success, build.tests_total),
            failed_percentage: metrics::coverage_percentage(build.tests_failed, build.tests_total),
            status_tone: status_tone(&build.status),
        }
    }
}

/// Headline rollup of a test-results payload: the pass-rate card and the
/// coverage summary card.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TestOverview {
    pub total: i64,
    pub passed: i64,
    pub failures: i64,
    pub errors: i64,
    pub pass_rate: RatedMetric,

    pub line_coverage: RatedMetric,
    pub branch_coverage: RatedMetric,
    pub function_coverage: RatedMetric,
    pub overall_coverage: RatedMetric,
    pub files_analyzed: i64,
}

impl TestOverview {
    /// Derive the overview from one results payload.
    pub fn from_results(results: &TestResults) -> Self {
        let summary = &results.summary;
        let coverage = &results.coverage.metrics;

        Self {
            total: summary.tests,
            passed: summary.passed(),
            failures: summary.failures,
            errors: summary.errors,
            pass_rate: RatedMetric::from_percentage(summary.pass_rate()),
            line_coverage: RatedMetric::from_rate(coverage.line_rate),
            branch_coverage: RatedMetric::from_rate(coverage.branch_rate),
            function_coverage: RatedMetric::from_rate(coverage.function_rate),
            overall_coverage: RatedMetric::from_pair(coverage.covered_elements, coverage.elements),
            files_analyzed: coverage.files,
        }
    }
}

/// Entities ordered by their upstream update time.
pub trait Timestamped {
    /// ISO 8601 last-update timestamp.
    fn updated_at(&self) -> &str;
}

impl Timestamped for Build {
    fn updated_at(&self) -> &str {
        &self.updated_at
    }
}

impl Timestamped for Project {
    fn updated_at(&self) -> &str {
        &self.updated_at
    }
}

/// Sort newest first by update time. Unparseable timestamps sort last;
/// the sort is stable, so equal timestamps keep their input order.
pub fn sort_newest_first<T: Timestamped>(items: &mut [T]) {
    items.sort_by_key(|item| {
        let parsed = DateTime::parse_from_rfc3339(item.updated_at())
            .map(|dt| dt.timestamp_millis())
            .unwrap_or(i64::MIN);
        std::cmp::Reverse(parsed)
    });
}
