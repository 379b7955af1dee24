//! Background refresh engine.
//!
//! Replaces the cached build and project snapshots on a fixed interval, the
//! way the frontend's query layer used to poll. A refresh is a full
//! snapshot replacement, so whichever fetch resolves last wins; per-table UI
//! state (search terms, expanded rows) lives elsewhere and is never touched.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::sync::{mpsc, RwLock};
use tokio::time::{self, MissedTickBehavior};

use crate::db::pool::DbPool;
use crate::error::AppError;
use crate::models::{build, project};
use crate::services::pipeline_client::PipelineClient;

/// Default refresh interval in seconds.
pub const DEFAULT_REFRESH_INTERVAL_SECS: u64 = 30;

/// Get the current Unix timestamp.
fn now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

/// Refresh engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshConfig {
    /// Seconds between automatic refreshes.
    pub interval_secs: u64,

    /// Whether automatic refreshes run at all. Manual triggers still work
    /// when disabled.
    pub enabled: bool,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            interval_secs: DEFAULT_REFRESH_INTERVAL_SECS,
            enabled: true,
        }
    }
}

/// Status of the refresh engine, for display in the frontend.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RefreshStatus {
    /// Whether a refresh is currently running.
    pub is_refreshing: bool,

    /// Last successful refresh timestamp.
    pub last_refresh_time: Option<i64>,

    /// Last refresh error message.
    pub last_error: Option<String>,

    /// Number of builds in the last snapshot.
    pub last_build_count: i64,

    /// Number of projects in the last snapshot.
    pub last_project_count: i64,
}

/// Commands that can be sent to the refresh engine.
#[derive(Debug)]
pub enum RefreshCommand {
    /// Run a refresh now.
    TriggerRefresh,

    /// Update the refresh configuration.
    UpdateConfig(RefreshConfig),

    /// Stop the engine.
    Stop,
}

/// Lightweight handle for controlling the background refresh engine.
///
/// Communicates with the background loop via an mpsc channel, avoiding lock
/// contention on the engine itself.
#[derive(Clone)]
pub struct RefreshHandle {
    command_tx: mpsc::Sender<RefreshCommand>,
    config: Arc<RwLock<RefreshConfig>>,
    status: Arc<RwLock<RefreshStatus>>,
}

impl RefreshHandle {
    /// Run a refresh now, ahead of the next scheduled tick.
    pub async fn trigger_refresh(&self) -> Result<(), AppError> {
        self.command_tx
            .send(RefreshCommand::TriggerRefresh)
            .await
            .map_err(|_| AppError::internal("Refresh engine not running"))
    }

    /// Update the refresh configuration.
    pub async fn update_config(&self, config: RefreshConfig) -> Result<(), AppError> {
        self.command_tx
            .send(RefreshCommand::UpdateConfig(config))
            .await
            .map_err(|_| AppError::internal("Refresh engine not running"))
    }

    /// Stop the engine.
    pub async fn stop(&self) -> Result<(), AppError> {
        self.command_tx
            .send(RefreshCommand::Stop)
            .await
            .map_err(|_| AppError::internal("Refresh engine not running"))
    }

    /// Get the current configuration.
    pub async fn get_config(&self) -> RefreshConfig {
        self.config.read().await.clone()
    }

    /// Get the current status.
    pub async fn status(&self) -> RefreshStatus {
        self.status.read().await.clone()
    }
}

/// Background refresh engine.
pub struct RefreshEngine {
    pool: DbPool,
    client: PipelineClient,
    config: Arc<RwLock<RefreshConfig>>,
    status: Arc<RwLock<RefreshStatus>>,
    command_rx: mpsc::Receiver<RefreshCommand>,
}

impl RefreshEngine {
    /// Start the engine on the current tokio runtime and return its handle.
    ///
    /// The first refresh runs immediately; subsequent ones follow the
    /// configured interval.
    pub fn start(pool: DbPool, client: PipelineClient, config: RefreshConfig) -> RefreshHandle {
        let (command_tx, command_rx) = mpsc::channel(16);
        let config = Arc::new(RwLock::new(config));
        let status = Arc::new(RwLock::new(RefreshStatus::default()));

        let engine = Self {
            pool,
            client,
            config: Arc::clone(&config),
            status: Arc::clone(&status),
            command_rx,
        };
        tokio::spawn(engine.run());

        RefreshHandle {
            command_tx,
            config,
            status,
        }
    }

    async fn run(mut self) {
        let mut interval = self.make_interval().await;

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    if self.config.read().await.enabled {
                        self.refresh_once().await;
                    }
                }
                command = self.command_rx.recv() => match command {
                    Some(RefreshCommand::TriggerRefresh) => self.refresh_once().await,
                    Some(RefreshCommand::UpdateConfig(new_config)) => {
                        *self.config.write().await = new_config;
                        interval = self.make_interval().await;
                    }
                    Some(RefreshCommand::Stop) | None => break,
                },
            }
        }

        log::info!("refresh engine stopped");
    }

    async fn make_interval(&self) -> time::Interval {
        let secs = self.config.read().await.interval_secs.max(1);
        let mut interval = time::interval(Duration::from_secs(secs));
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        interval
    }

    /// Run one refresh cycle and record the outcome.
    async fn refresh_once(&self) {
        self.status.write().await.is_refreshing = true;

        let result = self.fetch_and_store().await;

        let mut status = self.status.write().await;
        status.is_refreshing = false;
        match result {
            Ok((build_count, project_count)) => {
                status.last_refresh_time = Some(now());
                status.last_error = None;
                status.last_build_count = build_count;
                status.last_project_count = project_count;
                log::info!(
                    "refresh complete: {} builds, {} projects",
                    build_count,
                    project_count
                );
            }
            Err(err) => {
                status.last_error = Some(err.to_string());
                log::warn!("refresh failed: {}", err);
            }
        }
    }

    /// Fetch both collections and replace the cached snapshots.
    async fn fetch_and_store(&self) -> Result<(i64, i64), AppError> {
        let builds = self.client.list_builds().await?;
        build::replace_cached_builds(&self.pool, &builds).await?;

        let projects = self.client.list_projects().await?;
        project::replace_cached_projects(&self.pool, &projects).await?;

        Ok((builds.len() as i64, projects.len() as i64))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ApiConfig;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = RefreshConfig::default();
        assert_eq!(config.interval_secs, 30);
        assert!(config.enabled);
    }

    #[test]
    fn test_status_serializes_for_frontend() {
        let status = RefreshStatus {
            is_refreshing: false,
            last_refresh_time: Some(1_700_000_000),
            last_error: None,
            last_build_count: 10,
            last_project_count: 3,
        };
        let json = serde_json::to_string(&status).unwrap();
        assert!(json.contains("\"last_build_count\":10"));
    }

    async fn setup_engine() -> RefreshHandle {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("cache.db");
        std::mem::forget(dir);

        let pool = crate::db::initialize(&db_path).await.unwrap();
        // Point at a port nothing listens on; refreshes fail fast and the
        // failure is recorded, not raised.
        let client = PipelineClient::new(ApiConfig {
            port: 59123,
            timeout_secs: 1,
            ..ApiConfig::default()
        })
        .unwrap();

        RefreshEngine::start(
            pool,
            client,
            RefreshConfig {
                interval_secs: 3600,
                enabled: false,
            },
        )
    }

    #[tokio::test]
    async fn test_failed_refresh_records_error() {
        let handle = setup_engine().await;

        handle.trigger_refresh().await.unwrap();

        // Give the background task a moment to process the command.
        let mut error = None;
        for _ in 0..50 {
            tokio::time::sleep(Duration::from_millis(100)).await;
            let status = handle.status().await;
            if status.last_error.is_some() {
                error = status.last_error;
                break;
            }
        }
        assert!(error.is_some());
    }

    #[tokio::test]
    async fn test_stop_closes_command_channel() {
        let handle = setup_engine().await;

        handle.stop().await.unwrap();

        // Once the loop exits, further commands fail.
        let mut stopped = false;
        for _ in 0..50 {
            tokio::time::sleep(Duration::from_millis(100)).await;
            if handle.trigger_refresh().await.is_err() {
                stopped = true;
                break;
            }
        }
        assert!(stopped);
    }

    #[tokio::test]
    async fn test_update_config_roundtrip() {
        let handle = setup_engine().await;

        handle
            .update_config(RefreshConfig {
                interval_secs: 60,
                enabled: true,
            })
            .await
            .unwrap();

        let mut updated = false;
        for _ in 0..50 {
            tokio::time::sleep(Duration::from_millis(100)).await;
            if handle.get_config().await.interval_secs == 60 {
                updated = true;
                break;
            }
        }
        assert!(updated);
    }
}
