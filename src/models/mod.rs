//! Data models for the dashboard.
//!
//! These models mirror the pipeline API wire format (camelCase field names)
//! and double as the rows of the local SQLite snapshot cache. Cache queries
//! live next to the entity they read and write.

pub mod build;
pub mod coverage;
pub mod project;
pub mod test_results;

// Re-exports for convenient access
pub use build::{Build, BuildStatus};
pub use coverage::{CoverageCounters, CoverageData, CoverageFile, CoverageMetrics, CoveragePackage};
pub use project::{NewProject, Project};
pub use test_results::{
    TestCase, TestCaseOutcome, TestFailure, TestResults, TestSuite, TestSummary,
};
