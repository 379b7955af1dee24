//! View-model layer: everything the frontend derives from a snapshot.
//!
//! All of it is pure and synchronous. Raw payloads flow one way: fetched
//! snapshot -> derivation functions -> rendered rows; the only mutable state
//! here is the per-table [`tree_filter::TreeFilter`], driven by UI events.

pub mod metrics;
pub mod query_state;
pub mod tree_filter;
pub mod view;

pub use metrics::{coverage_percentage, rate_percentage, test_pass_rate, Severity, Tone};
pub use query_state::QueryState;
pub use tree_filter::{TreeFilter, TreeLeaf, TreeNode};
pub use view::{
    sort_newest_first, status_tone, BuildCardView, RatedMetric, SuiteBadge, TestOverview,
};
