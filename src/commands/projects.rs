//! Project listing and lifecycle commands.

use crate::db::pool::DbPool;
use crate::error::AppError;
use crate::models::build;
use crate::models::project::{self, NewProject, Project};
use crate::services::pipeline_client::PipelineClient;

/// List the cached projects, newest first.
pub async fn list_projects(pool: &DbPool) -> Result<Vec<Project>, AppError> {
    project::list_cached_projects(pool).await
}

/// Create a project on the server.
///
/// The new project appears in the listing with the next refresh.
pub async fn create_project(
    client: &PipelineClient,
    new_project: NewProject,
) -> Result<(), AppError> {
    if new_project.name.trim().is_empty() {
        return Err(AppError::invalid_input_field(
            "Project name must not be empty",
            "name",
        ));
    }

    client.create_project(&new_project).await
}

/// Delete a project on the server and invalidate the local listing.
///
/// The cached rows are dropped only after the remote delete succeeds, so a
/// failed delete leaves the listing intact.
pub async fn delete_project(
    client: &PipelineClient,
    pool: &DbPool,
    project_id: &str,
) -> Result<(), AppError> {
    client.delete_project(project_id).await?;

    build::delete_cached_builds_for_project(pool, project_id).await?;
    project::delete_cached_project(pool, project_id).await?;

    Ok(())
}
