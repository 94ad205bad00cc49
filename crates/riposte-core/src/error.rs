//! Error types for the combat search.

use std::time::Duration;

use thiserror::Error;

/// Result type alias using [`SearchError`].
pub type Result<T> = std::result::Result<T, SearchError>;

/// Errors produced by the search driver.
///
/// Only [`SearchError::TimeBudgetExceeded`] can occur while a search is
/// running. It is raised at the entry of a recursive call and unwinds the
/// whole search tree: no partially computed score is ever returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SearchError {
    /// The wall-clock budget ran out before the search completed.
    #[error("search exceeded its time budget: {elapsed:?} elapsed of {budget:?}")]
    TimeBudgetExceeded {
        /// Time spent when the budget check failed.
        elapsed: Duration,
        /// The configured budget.
        budget: Duration,
    },

    /// The search configuration cannot drive a search.
    #[error("invalid search configuration: {0}")]
    InvalidConfig(String),
}

impl SearchError {
    /// Returns true if this error is a time-budget expiry.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::TimeBudgetExceeded { .. })
    }
}
