//! Test result models.
//!
//! The per-build detail payload: a run summary, the suite → case tree and
//! one coverage block. Also holds the local blob cache for fetched payloads,
//! keyed by build id.

use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::db::pool::DbPool;
use crate::error::AppError;
use crate::models::coverage::CoverageData;

/// Full test results for one build.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TestResults {
    /// Run-level aggregates.
    pub summary: TestSummary,

    /// Test suites, in upstream order.
    pub testsuites: Vec<TestSuite>,

    /// Coverage block for the run.
    pub coverage: CoverageData,
}

/// Aggregates for a whole test run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TestSummary {
    /// Total test cases executed.
    pub tests: i64,

    /// Cases that failed an assertion.
    pub failures: i64,

    /// Cases that errored outside an assertion.
    pub errors: i64,

    /// Total elapsed time in seconds.
    pub time: f64,
}

impl TestSummary {
    /// Cases that neither failed nor errored.
    pub fn passed(&self) -> i64 {
        self.tests - self.failures - self.errors
    }

    /// Pass rate as a rounded percentage, 0 for an empty run.
    pub fn pass_rate(&self) -> i64 {
        crate::dashboard::metrics::test_pass_rate(self.tests, self.failures, self.errors)
    }
}

/// A named group of test cases with its own aggregates.
///
/// Suite-level `failures`/`errors` come from upstream and are authoritative;
/// they are not recomputed from the case list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TestSuite {
    pub name: String,
    pub tests: i64,
    pub failures: i64,
    pub errors: i64,

    /// Elapsed time in seconds.
    pub time: f64,

    /// Cases in the suite, in upstream order.
    pub testcases: Vec<TestCase>,
}

/// A single test execution.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TestCase {
    pub name: String,

    /// Qualified class/group name (e.g. "Button.Component").
    pub classname: String,

    /// Elapsed time in seconds.
    pub time: f64,

    /// Present iff the case did not pass.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<TestFailure>,
}

impl TestCase {
    /// Outcome of the case.
    ///
    /// The wire format signals failure through the optional `failure` object
    /// and has no case-level error marker, so this feed never yields
    /// [`TestCaseOutcome::Errored`]; errors are visible only in suite and
    /// summary aggregates.
    pub fn outcome(&self) -> TestCaseOutcome {
        match &self.failure {
            Some(_) => TestCaseOutcome::Failed,
            None => TestCaseOutcome::Passed,
        }
    }

    /// Whether the case passed.
    pub fn passed(&self) -> bool {
        self.failure.is_none()
    }
}

/// Failure details attached to a test case.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TestFailure {
    /// Short assertion message.
    pub message: String,

    /// Full failure output (stack trace etc.), if provided.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Tagged outcome of a test case.
///
/// `Errored` is distinct from `Failed` for feeds that mark errors at case
/// level; the current wire format does not, see [`TestCase::outcome`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestCaseOutcome {
    Passed,
    Failed,
    Errored,
}

/// Get the current Unix timestamp.
fn now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

/// Cache a fetched test-results payload for a build.
pub async fn upsert_cached_test_results(
    pool: &DbPool,
    build_id: &str,
    results: &TestResults,
) -> Result<(), AppError> {
    let payload = serde_json::to_string(results)?;

    sqlx::query(
        "INSERT OR REPLACE INTO test_results (build_id, payload, cached_at) VALUES (?, ?, ?)",
    )
    .bind(build_id)
    .bind(&payload)
    .bind(now())
    .execute(pool)
    .await?;

    Ok(())
}

/// Get the cached test results for a build, with the cache timestamp.
pub async fn get_cached_test_results(
    pool: &DbPool,
    build_id: &str,
) -> Result<Option<(TestResults, i64)>, AppError> {
    let row: Option<(String, i64)> = sqlx::query_as(
        "SELECT payload, cached_at FROM test_results WHERE build_id = ?",
    )
    .bind(build_id)
    .fetch_optional(pool)
    .await?;

    match row {
        Some((payload, cached_at)) => {
            let results: TestResults = serde_json::from_str(&payload)?;
            Ok(Some((results, cached_at)))
        }
        None => Ok(None),
    }
}

/// Delete cached test results for every build of a project.
pub async fn delete_test_results_for_project(
    pool: &DbPool,
    project_id: &str,
) -> Result<(), AppError> {
    sqlx::query(
        "DELETE FROM test_results WHERE build_id IN (SELECT id FROM builds WHERE project_id = ?)",
    )
    .bind(project_id)
    .execute(pool)
    .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_case_outcome_mapping() {
        let passed = TestCase {
            name: "renders correctly".to_string(),
            classname: "Button.Component".to_string(),
            time: 0.123,
            failure: None,
        };
        assert_eq!(passed.outcome(), TestCaseOutcome::Passed);
        assert!(passed.passed());

        let failed = TestCase {
            failure: Some(TestFailure {
                message: "Expected loading spinner to be visible".to_string(),
                details: Some("Expected element to be in document".to_string()),
            }),
            ..passed
        };
        assert_eq!(failed.outcome(), TestCaseOutcome::Failed);
        assert!(!failed.passed());
    }

    #[test]
    fn test_summary_pass_rate() {
        let summary = TestSummary {
            tests: 142,
            failures: 3,
            errors: 0,
            time: 8.452,
        };
        assert_eq!(summary.passed(), 139);
        assert_eq!(summary.pass_rate(), 98);
    }

    #[test]
    fn test_deserialize_case_without_failure() {
        let json = r#"{"name": "handles click events", "classname": "Button.Component", "time": 0.234}"#;
        let case: TestCase = serde_json::from_str(json).unwrap();
        assert!(case.failure.is_none());
    }

    #[test]
    fn test_serialize_omits_absent_failure() {
        let case = TestCase {
            name: "applies custom styles".to_string(),
            classname: "Button.Component".to_string(),
            time: 0.456,
            failure: None,
        };
        let json = serde_json::to_string(&case).unwrap();
        assert!(!json.contains("failure"));
    }

    async fn setup_test_db() -> DbPool {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        // Keep the dir alive by leaking it (for test purposes)
        std::mem::forget(dir);

        crate::db::initialize(&db_path).await.unwrap()
    }

    fn sample_results() -> TestResults {
        TestResults {
            summary: TestSummary {
                tests: 15,
                failures: 2,
                errors: 0,
                time: 4.1,
            },
            testsuites: vec![TestSuite {
                name: "Form Component".to_string(),
                tests: 15,
                failures: 2,
                errors: 0,
                time: 4.1,
                testcases: vec![TestCase {
                    name: "renders form fields".to_string(),
                    classname: "Form.Component".to_string(),
                    time: 0.234,
                    failure: None,
                }],
            }],
            coverage: CoverageData::default(),
        }
    }

    #[tokio::test]
    async fn test_blob_cache_roundtrip() {
        let pool = setup_test_db().await;
        let results = sample_results();

        upsert_cached_test_results(&pool, "build-001", &results)
            .await
            .unwrap();

        let (cached, cached_at) = get_cached_test_results(&pool, "build-001")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(cached, results);
        assert!(cached_at > 0);
    }

    #[tokio::test]
    async fn test_blob_cache_miss() {
        let pool = setup_test_db().await;
        let cached = get_cached_test_results(&pool, "build-404").await.unwrap();
        assert!(cached.is_none());
    }

    #[tokio::test]
    async fn test_blob_cache_replaces_on_upsert() {
        let pool = setup_test_db().await;
        let mut results = sample_results();

        upsert_cached_test_results(&pool, "build-001", &results)
            .await
            .unwrap();

        results.summary.failures = 0;
        upsert_cached_test_results(&pool, "build-001", &results)
            .await
            .unwrap();

        let (cached, _) = get_cached_test_results(&pool, "build-001")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(cached.summary.failures, 0);
    }
}
