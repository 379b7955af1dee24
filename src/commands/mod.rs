//! The operations the presentation layer calls.
//!
//! Thin async functions composing the snapshot cache and the API client:
//! - `builds`: cached build listing
//! - `projects`: cached project listing plus create/delete
//! - `test_results`: read-through per-build test results

pub mod builds;
pub mod projects;
pub mod test_results;

pub use builds::list_builds;
pub use projects::{create_project, delete_project, list_projects};
pub use test_results::get_test_results;
