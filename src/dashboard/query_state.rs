//! Fetch lifecycle state for one data snapshot.
//!
//! The fetch layer delivers each query result as pending, resolved or
//! rejected; the view renders a loading placeholder, the data, or an error
//! card accordingly. Refreshes replace the resolved snapshot wholesale
//! (last write wins) and never touch the per-table filter state.

use serde::Serialize;

/// State of one fetched snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", content = "value", rename_all = "camelCase")]
pub enum QueryState<T> {
    /// Fetch in flight; render a loading placeholder.
    Pending,

    /// Snapshot available.
    Resolved(T),

    /// Fetch failed; carries an opaque upstream message.
    Rejected(String),
}

impl<T> QueryState<T> {
    /// Whether a fetch is in flight.
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }

    /// The resolved snapshot, if any.
    pub fn data(&self) -> Option<&T> {
        match self {
            Self::Resolved(data) => Some(data),
            _ => None,
        }
    }

    /// The rejection message, if any.
    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Rejected(message) => Some(message),
            _ => None,
        }
    }

    /// Complete the fetch with a snapshot. A newer resolution simply
    /// replaces an older one.
    pub fn resolve(&mut self, data: T) {
        *self = Self::Resolved(data);
    }

    /// Fail the fetch with an upstream message.
    pub fn reject(&mut self, message: impl Into<String>) {
        *self = Self::Rejected(message.into());
    }

    /// Re-enter the pending state for a retry.
    pub fn reload(&mut self) {
        *self = Self::Pending;
    }
}

impl<T> Default for QueryState<T> {
    fn default() -> Self {
        Self::Pending
    }
}

impl<T, E: std::fmt::Display> From<Result<T, E>> for QueryState<T> {
    fn from(result: Result<T, E>) -> Self {
        match result {
            Ok(data) => Self::Resolved(data),
            Err(err) => Self::Rejected(err.to_string()),
        }
    }
}
