//! Data-plane services.
//!
//! The HTTP client for the pipeline API and the background engine that keeps
//! the local snapshot cache fresh. Both are independent of any UI framework.

pub mod pipeline_client;
pub mod refresh_engine;

pub use pipeline_client::PipelineClient;
pub use refresh_engine::{RefreshConfig, RefreshEngine, RefreshHandle, RefreshStatus};
