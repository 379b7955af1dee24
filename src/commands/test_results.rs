//! Test-results commands.

use std::time::{SystemTime, UNIX_EPOCH};

use crate::db::pool::DbPool;
use crate::error::AppError;
use crate::models::test_results::{self, TestResults};
use crate::services::pipeline_client::PipelineClient;

/// How long a cached per-build payload is served without refetching.
const TEST_RESULTS_TTL_SECS: i64 = 300;

/// Get the current Unix timestamp.
fn now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

/// Get the test results for a build, read-through against the blob cache.
///
/// A fresh cached payload is returned directly. Otherwise the payload is
/// fetched and cached; if the fetch fails but a stale payload exists, the
/// stale payload is served instead of the error.
pub async fn get_test_results(
    pool: &DbPool,
    client: &PipelineClient,
    build_id: &str,
) -> Result<TestResults, AppError> {
    let cached = test_results::get_cached_test_results(pool, build_id).await?;

    if let Some((results, cached_at)) = &cached {
        if now() - cached_at < TEST_RESULTS_TTL_SECS {
            return Ok(results.clone());
        }
    }

    match client.get_test_results(build_id).await {
        Ok(results) => {
            test_results::upsert_cached_test_results(pool, build_id, &results).await?;
            Ok(results)
        }
        Err(err) => match cached {
            Some((stale, _)) => {
                log::warn!("serving stale test results for {}: {}", build_id, err);
                Ok(stale)
            }
            None => Err(err),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ApiConfig;
    use tempfile::tempdir;

    async fn setup_test_db() -> DbPool {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        std::mem::forget(dir);

        crate::db::initialize(&db_path).await.unwrap()
    }

    fn unreachable_client() -> PipelineClient {
        PipelineClient::new(ApiConfig {
            port: 59125,
            timeout_secs: 1,
            ..ApiConfig::default()
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_fresh_cache_hit_skips_network() {
        let pool = setup_test_db().await;
        let client = unreachable_client();

        let results = TestResults::default();
        test_results::upsert_cached_test_results(&pool, "build-001", &results)
            .await
            .unwrap();

        // The client is unreachable; only a cache hit can satisfy this.
        let fetched = get_test_results(&pool, &client, "build-001").await.unwrap();
        assert_eq!(fetched, results);
    }

    #[tokio::test]
    async fn test_cache_miss_propagates_fetch_error() {
        let pool = setup_test_db().await;
        let client = unreachable_client();

        let result = get_test_results(&pool, &client, "build-404").await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_stale_cache_served_when_fetch_fails() {
        let pool = setup_test_db().await;
        let client = unreachable_client();

        // Insert a payload whose cached_at is far in the past.
        let payload = serde_json::to_string(&TestResults::default()).unwrap();
        sqlx::query("INSERT INTO test_results (build_id, payload, cached_at) VALUES (?, ?, 0)")
            .bind("build-001")
            .bind(&payload)
            .execute(&pool)
            .await
            .unwrap();

        let fetched = get_test_results(&pool, &client, "build-001").await.unwrap();
        assert_eq!(fetched, TestResults::default());
    }
}
