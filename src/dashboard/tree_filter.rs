//! Hierarchical filter-and-expand state for two-level result trees.
//!
//! Both detail tables render the same shape: a list of top-level nodes
//! (coverage packages, test suites) whose child rows (files, test cases) are
//! shown when the node is expanded. A single free-text search narrows both
//! levels at once: a parent stays visible when any of its children match,
//! while the expanded child list is pruned to the matching children only.
//!
//! Search and expansion are orthogonal axes: changing the search term never
//! touches expansion state, and a background data refresh resets neither.

use std::collections::{HashMap, HashSet};

use crate::models::{CoverageFile, CoveragePackage, TestCase, TestSuite};

/// A top-level row of a filterable tree.
pub trait TreeNode {
    type Child: TreeLeaf;

    /// Stable key for expansion state. Unique within one tree; collisions
    /// are reported by [`TreeFilter::visible_nodes`] as a data-quality
    /// problem.
    fn key(&self) -> &str;

    /// The node's own searchable text.
    fn primary_text(&self) -> &str;

    /// Child rows rendered beneath this node when expanded.
    fn children(&self) -> &[Self::Child];
}

/// A child row of a filterable tree.
pub trait TreeLeaf {
    /// Fields examined by the search filter.
    fn searchable_text(&self) -> Vec<&str>;
}

/// Case-insensitive substring match.
fn contains_term(haystack: &str, lowered_term: &str) -> bool {
    haystack.to_lowercase().contains(lowered_term)
}

/// Transient per-table UI state: one search term plus per-node expansion
/// flags. Keyed by node name, so filtering or reordering the data does not
/// corrupt the flags.
#[derive(Debug, Clone, Default)]
pub struct TreeFilter {
    search_term: String,
    expanded: HashMap<String, bool>,
}

impl TreeFilter {
    /// Fresh state: empty search, everything collapsed.
    pub fn new() -> Self {
        Self::default()
    }

    /// The current search term.
    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    /// Replace the search term. Expansion state is untouched.
    pub fn set_search_term(&mut self, term: impl Into<String>) {
        self.search_term = term.into();
    }

    /// Flip the expansion flag for a node key. An absent key counts as
    /// collapsed, so the first toggle expands. Keys that match no current
    /// node are accepted and simply never read.
    pub fn toggle_expanded(&mut self, key: &str) {
        let flag = self.expanded.entry(key.to_string()).or_insert(false);
        *flag = !*flag;
    }

    /// Whether a node is currently expanded.
    pub fn is_expanded(&self, key: &str) -> bool {
        self.expanded.get(key).copied().unwrap_or(false)
    }

    /// The top-level nodes to render, in input order.
    ///
    /// A node is visible when the search term is empty, when its own text
    /// contains the term, or when any child matches. An empty result is the
    /// "no results match" placeholder case; whether there was any data at
    /// all is a question for the fetch layer, not for this filter.
    pub fn visible_nodes<'a, N: TreeNode>(&self, nodes: &'a [N]) -> Vec<&'a N> {
        let mut seen_keys = HashSet::new();
        for node in nodes {
            if !seen_keys.insert(node.key()) {
                log::warn!("duplicate tree node key {:?}; expansion state will be shared", node.key());
            }
        }

        let term = self.search_term.to_lowercase();
        nodes
            .iter()
            .filter(|node| {
                term.is_empty()
                    || contains_term(node.primary_text(), &term)
                    || node.children().iter().any(|child| leaf_matches(child, &term))
            })
            .collect()
    }

    /// The child rows to render beneath one node, pruned to the children
    /// whose own fields match the term.
    ///
    /// Callers render this list only when the parent is expanded. Note the
    /// asymmetry with [`Self::visible_nodes`]: a parent kept visible by a
    /// single matching child expands to just that child, not to the full
    /// original list.
    pub fn visible_children<'a, N: TreeNode>(&self, node: &'a N) -> Vec<&'a N::Child> {
        let term = self.search_term.to_lowercase();
        node.children()
            .iter()
            .filter(|child| term.is_empty() || leaf_matches(*child, &term))
            .collect()
    }
}

fn leaf_matches<L: TreeLeaf>(leaf: &L, lowered_term: &str) -> bool {
    leaf.searchable_text()
        .iter()
        .any(|text| contains_term(text, lowered_term))
}

impl TreeNode for CoveragePackage {
    type Child = CoverageFile;

    fn key(&self) -> &str {
        &self.name
    }

    fn primary_text(&self) -> &str {
        &self.name
    }

    fn children(&self) -> &[CoverageFile] {
        &self.files
    }
}

impl TreeLeaf for CoverageFile {
    fn searchable_text(&self) -> Vec<&str> {
        vec![&self.name, &self.path]
    }
}

impl TreeNode for TestSuite {
    type Child = TestCase;

    fn key(&self) -> &str {
        &self.name
    }

    fn primary_text(&self) -> &str {
        &self.name
    }

    fn children(&self) -> &[TestCase] {
        &self.testcases
    }
}

impl TreeLeaf for TestCase {
    fn searchable_text(&self) -> Vec<&str> {
        let mut fields = vec![self.name.as_str(), self.classname.as_str()];
        if let Some(failure) = &self.failure {
            fields.push(failure.message.as_str());
        }
        fields
    }
}
