//! Build listing commands.

use crate::db::pool::DbPool;
use crate::error::AppError;
use crate::models::build::{self, Build};

/// List the cached builds, newest first.
///
/// Reads only the local snapshot; the background refresh keeps it current.
pub async fn list_builds(pool: &DbPool) -> Result<Vec<Build>, AppError> {
    build::list_cached_builds(pool).await
}
