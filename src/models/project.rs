//! Project model for the projects listing.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::db::pool::DbPool;
use crate::error::AppError;

/// A CI project with its pipeline and job counters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    /// Upstream project ID.
    pub id: String,

    /// Project name.
    pub name: String,

    /// Free-form description.
    pub description: String,

    /// Number of pipelines configured for the project.
    pub pipelines_count: i64,

    /// Number of successful jobs.
    pub success_jobs_count: i64,

    /// Number of failed jobs.
    pub failed_jobs_count: i64,

    /// ISO 8601 creation timestamp.
    pub created_at: String,

    /// ISO 8601 last-update timestamp.
    pub updated_at: String,
}

impl Project {
    /// Total jobs across both outcome counters.
    pub fn total_jobs(&self) -> i64 {
        self.success_jobs_count + self.failed_jobs_count
    }
}

/// Fields for creating a new project.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProject {
    pub name: String,
    pub description: String,
}

/// Get the current Unix timestamp.
fn now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

/// Replace the cached projects snapshot with a freshly fetched one.
pub async fn replace_cached_projects(pool: &DbPool, projects: &[Project]) -> Result<(), AppError> {
    let cached_at = now();
    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM projects").execute(&mut *tx).await?;

    for project in projects {
        sqlx::query(
            r#"
            INSERT OR REPLACE INTO projects
                (id, name, description, pipelines_count, success_jobs_count,
                 failed_jobs_count, created_at, updated_at, cached_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&project.id)
        .bind(&project.name)
        .bind(&project.description)
        .bind(project.pipelines_count)
        .bind(project.success_jobs_count)
        .bind(project.failed_jobs_count)
        .bind(&project.created_at)
        .bind(&project.updated_at)
        .bind(cached_at)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(())
}

/// List cached projects, newest first by upstream update time.
pub async fn list_cached_projects(pool: &DbPool) -> Result<Vec<Project>, AppError> {
    let projects = sqlx::query_as::<_, Project>(
        r#"
        SELECT id, name, description, pipelines_count, success_jobs_count,
               failed_jobs_count, created_at, updated_at
        FROM projects
        ORDER BY updated_at DESC
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(projects)
}

/// Remove one project from the cached listing.
pub async fn delete_cached_project(pool: &DbPool, project_id: &str) -> Result<(), AppError> {
    sqlx::query("DELETE FROM projects WHERE id = ?")
        .bind(project_id)
        .execute(pool)
        .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn sample_project(id: &str, updated_at: &str) -> Project {
        Project {
            id: id.to_string(),
            name: format!("project {}", id),
            description: "Frontend pipeline".to_string(),
            pipelines_count: 3,
            success_jobs_count: 41,
            failed_jobs_count: 2,
            created_at: "2024-01-10T09:00:00Z".to_string(),
            updated_at: updated_at.to_string(),
        }
    }

    async fn setup_test_db() -> DbPool {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        std::mem::forget(dir);

        crate::db::initialize(&db_path).await.unwrap()
    }

    #[test]
    fn test_total_jobs() {
        let project = sample_project("p1", "2024-03-27T10:00:00Z");
        assert_eq!(project.total_jobs(), 43);
    }

    #[test]
    fn test_wire_field_names_are_camel_case() {
        let project = sample_project("p1", "2024-03-27T10:00:00Z");
        let json = serde_json::to_string(&project).unwrap();
        assert!(json.contains("\"pipelinesCount\":3"));
        assert!(json.contains("\"successJobsCount\":41"));
        assert!(json.contains("\"updatedAt\""));
    }

    #[tokio::test]
    async fn test_replace_and_list_orders_newest_first() {
        let pool = setup_test_db().await;

        replace_cached_projects(
            &pool,
            &[
                sample_project("p1", "2024-03-25T10:00:00Z"),
                sample_project("p2", "2024-03-27T10:00:00Z"),
            ],
        )
        .await
        .unwrap();

        let cached = list_cached_projects(&pool).await.unwrap();
        let ids: Vec<&str> = cached.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["p2", "p1"]);
    }

    #[tokio::test]
    async fn test_delete_invalidates_listing() {
        let pool = setup_test_db().await;

        replace_cached_projects(
            &pool,
            &[
                sample_project("p1", "2024-03-25T10:00:00Z"),
                sample_project("p2", "2024-03-27T10:00:00Z"),
            ],
        )
        .await
        .unwrap();

        delete_cached_project(&pool, "p2").await.unwrap();

        let cached = list_cached_projects(&pool).await.unwrap();
        assert_eq!(cached.len(), 1);
        assert_eq!(cached[0].id, "p1");
    }
}
