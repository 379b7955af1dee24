//! Code coverage models.
//!
//! The coverage block of a test-results payload: aggregate metrics plus a
//! package → file tree. Field names follow the wire format, which mixes
//! lowercase concatenated names (`coveredstatements`) with camelCase rate
//! fields (`lineRate`).

use serde::{Deserialize, Serialize};

use crate::dashboard::metrics::{self, Severity};

/// Covered/total counter pairs for one node of the coverage tree.
///
/// Shared by package rollups and individual files.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverageCounters {
    /// Total statements.
    pub statements: i64,

    /// Statements exercised by tests.
    #[serde(rename = "coveredstatements")]
    pub covered_statements: i64,

    /// Total conditionals (branches).
    pub conditionals: i64,

    /// Conditionals exercised by tests.
    #[serde(rename = "coveredconditionals")]
    pub covered_conditionals: i64,

    /// Total methods.
    pub methods: i64,

    /// Methods exercised by tests.
    #[serde(rename = "coveredmethods")]
    pub covered_methods: i64,
}

impl CoverageCounters {
    /// Statement (line) coverage as a rounded percentage.
    pub fn statement_percentage(&self) -> i64 {
        metrics::coverage_percentage(self.covered_statements, self.statements)
    }

    /// Conditional (branch) coverage as a rounded percentage.
    pub fn conditional_percentage(&self) -> i64 {
        metrics::coverage_percentage(self.covered_conditionals, self.conditionals)
    }

    /// Method (function) coverage as a rounded percentage.
    pub fn method_percentage(&self) -> i64 {
        metrics::coverage_percentage(self.covered_methods, self.methods)
    }

    /// Severity band of the statement coverage.
    pub fn statement_severity(&self) -> Severity {
        Severity::from_percentage(self.statement_percentage())
    }
}

/// Aggregate metrics for the whole coverage run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CoverageMetrics {
    pub statements: i64,
    #[serde(rename = "coveredstatements")]
    pub covered_statements: i64,
    pub conditionals: i64,
    #[serde(rename = "coveredconditionals")]
    pub covered_conditionals: i64,
    pub methods: i64,
    #[serde(rename = "coveredmethods")]
    pub covered_methods: i64,

    /// Total coverable elements of any kind.
    pub elements: i64,

    /// Elements exercised by tests.
    #[serde(rename = "coveredelements")]
    pub covered_elements: i64,

    pub complexity: i64,
    pub loc: i64,
    pub ncloc: i64,

    /// Number of packages in the run.
    pub packages: i64,

    /// Number of files analyzed.
    pub files: i64,

    pub classes: i64,

    /// Line coverage as a 0.0–1.0 ratio.
    #[serde(rename = "lineRate")]
    pub line_rate: f64,

    /// Branch coverage as a 0.0–1.0 ratio.
    #[serde(rename = "branchRate")]
    pub branch_rate: f64,

    /// Function coverage as a 0.0–1.0 ratio.
    #[serde(rename = "functionRate")]
    pub function_rate: f64,
}

impl CoverageMetrics {
    /// Overall coverage across all element kinds, as a rounded percentage.
    /// An empty run (zero elements) reads as 0%.
    pub fn overall_percentage(&self) -> i64 {
        metrics::coverage_percentage(self.covered_elements, self.elements)
    }
}

/// One coverage run: aggregate metrics plus the package tree.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CoverageData {
    /// Opaque upstream timestamp (epoch milliseconds as a string).
    pub timestamp: String,

    /// Run label (e.g. "All files").
    pub name: String,

    /// Aggregate metrics.
    pub metrics: CoverageMetrics,

    /// Per-package rollups, in upstream order.
    pub packages: Vec<CoveragePackage>,
}

/// A package row of the coverage tree.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CoveragePackage {
    /// Dotted package name (e.g. "src.components.Button").
    pub name: String,

    /// Rollup counters for the package.
    pub metrics: CoverageCounters,

    /// Files in the package, in upstream order.
    pub files: Vec<CoverageFile>,
}

/// A file row beneath a package.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CoverageFile {
    /// File name (e.g. "Button.js").
    pub name: String,

    /// Full path (e.g. "/src/components/Button/Button.js").
    pub path: String,

    /// Counters for the file.
    pub metrics: CoverageCounters,
}
