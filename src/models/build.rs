//! Build model and status domain.

use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::db::pool::DbPool;
use crate::error::AppError;
use crate::models::test_results::{self, TestResults};

/// Status of a CI build.
///
/// The status domain is open: the known values get first-class variants and
/// anything else lands in `Unknown` with the raw string preserved, so new
/// upstream statuses degrade to a generic visual treatment instead of
/// failing to parse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum BuildStatus {
    Success,
    Failure,
    Unstable,
    Aborted,
    InProgress,
    NotBuilt,
    Unknown(String),
}

impl From<&str> for BuildStatus {
    fn from(s: &str) -> Self {
        match s.to_uppercase().as_str() {
            "SUCCESS" => Self::Success,
            "FAILURE" => Self::Failure,
            "UNSTABLE" => Self::Unstable,
            "ABORTED" => Self::Aborted,
            "IN_PROGRESS" => Self::InProgress,
            "NOT_BUILT" => Self::NotBuilt,
            _ => Self::Unknown(s.to_string()),
        }
    }
}

impl From<String> for BuildStatus {
    fn from(s: String) -> Self {
        Self::from(s.as_str())
    }
}

impl From<BuildStatus> for String {
    fn from(status: BuildStatus) -> Self {
        status.as_str().to_string()
    }
}

impl BuildStatus {
    /// The wire form of the status. `Unknown` keeps the original string.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Success => "SUCCESS",
            Self::Failure => "FAILURE",
            Self::Unstable => "UNSTABLE",
            Self::Aborted => "ABORTED",
            Self::InProgress => "IN_PROGRESS",
            Self::NotBuilt => "NOT_BUILT",
            Self::Unknown(raw) => raw,
        }
    }

    /// Human-readable badge label.
    pub fn label(&self) -> &str {
        match self {
            Self::Success => "Success",
            Self::Failure => "Failed",
            Self::Unstable => "Unstable",
            Self::Aborted => "Aborted",
            Self::InProgress => "In Progress",
            Self::NotBuilt => "Not Built",
            Self::Unknown(raw) => raw,
        }
    }

    /// Whether the build has reached a terminal state.
    pub fn is_finished(&self) -> bool {
        !matches!(self, Self::InProgress)
    }
}

impl std::fmt::Display for BuildStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One CI build with its headline counters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Build {
    /// Upstream build ID.
    pub id: String,

    /// Display name of the build.
    pub name: String,

    /// Owning project ID.
    pub project_id: String,

    /// Build status.
    pub status: BuildStatus,

    /// Code coverage, 0–100.
    pub coverage_percentage: i64,

    /// Total test count.
    pub tests_total: i64,

    /// Passed test count.
    pub tests_success: i64,

    /// Failed test count.
    pub tests_failed: i64,

    /// ISO 8601 creation timestamp.
    pub created_at: String,

    /// ISO 8601 last-update timestamp.
    pub updated_at: String,

    /// Full test results, when the listing embeds them.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub test_results: Option<TestResults>,
}

/// Get the current Unix timestamp.
fn now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

/// Replace the cached builds snapshot with a freshly fetched one.
///
/// A fetch is a full snapshot, so the previous rows are dropped wholesale;
/// embedded test results are folded into the per-build blob cache.
pub async fn replace_cached_builds(pool: &DbPool, builds: &[Build]) -> Result<(), AppError> {
    let cached_at = now();
    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM builds").execute(&mut *tx).await?;

    for build in builds {
        sqlx::query(
            r#"
            INSERT OR REPLACE INTO builds
                (id, name, project_id, status, coverage_percentage,
                 tests_total, tests_success, tests_failed, created_at, updated_at, cached_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&build.id)
        .bind(&build.name)
        .bind(&build.project_id)
        .bind(build.status.as_str())
        .bind(build.coverage_percentage)
        .bind(build.tests_total)
        .bind(build.tests_success)
        .bind(build.tests_failed)
        .bind(&build.created_at)
        .bind(&build.updated_at)
        .bind(cached_at)
        .execute(&mut *tx)
        .await?;

        if let Some(results) = &build.test_results {
            let payload = serde_json::to_string(results)?;
            sqlx::query(
                "INSERT OR REPLACE INTO test_results (build_id, payload, cached_at) VALUES (?, ?, ?)",
            )
            .bind(&build.id)
            .bind(&payload)
            .bind(cached_at)
            .execute(&mut *tx)
            .await?;
        }
    }

    tx.commit().await?;
    Ok(())
}

/// List cached builds, newest first by upstream update time.
pub async fn list_cached_builds(pool: &DbPool) -> Result<Vec<Build>, AppError> {
    let rows: Vec<(
        String,
        String,
        String,
        String,
        i64,
        i64,
        i64,
        i64,
        String,
        String,
    )> = sqlx::query_as(
        r#"
        SELECT id, name, project_id, status, coverage_percentage,
               tests_total, tests_success, tests_failed, created_at, updated_at
        FROM builds
        ORDER BY updated_at DESC
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(
            |(
                id,
                name,
                project_id,
                status,
                coverage_percentage,
                tests_total,
                tests_success,
                tests_failed,
                created_at,
                updated_at,
            )| Build {
                id,
                name,
                project_id,
                status: BuildStatus::from(status),
                coverage_percentage,
                tests_total,
                tests_success,
                tests_failed,
                created_at,
                updated_at,
                test_results: None,
            },
        )
        .collect())
}

/// Delete the cached builds of one project.
pub async fn delete_cached_builds_for_project(
    pool: &DbPool,
    project_id: &str,
) -> Result<(), AppError> {
    test_results::delete_test_results_for_project(pool, project_id).await?;

    sqlx::query("DELETE FROM builds WHERE project_id = ?")
        .bind(project_id)
        .execute(pool)
        .await?;

    Ok(())
}
