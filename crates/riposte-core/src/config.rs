//! Search configuration.
//!
//! [`SearchConfig`] is fixed per [`AlphaBetaSearch`](crate::search::AlphaBetaSearch)
//! instance. It serializes with the time budget expressed in milliseconds so
//! it can live next to the rest of a bot's settings.
//!
//! # Example
//!
//! ```
//! use riposte_core::config::{SearchConfig, SearchPolicy};
//! use std::time::Duration;
//!
//! let config = SearchConfig::default()
//!     .with_depth_limit(6)
//!     .with_time_budget(Duration::from_millis(20))
//!     .with_policy(SearchPolicy::CLOSEST_ENEMY | SearchPolicy::WEAKEST_ENEMY);
//!
//! assert!(config.validate().is_ok());
//! assert!(!config.policy.contains(SearchPolicy::SINGLE_AGENT));
//! ```

use std::time::Duration;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SearchError};

bitflags! {
    /// Independent switches controlling move generation.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct SearchPolicy: u8 {
        /// At the decision ply, decide one unit's action in isolation.
        const SINGLE_AGENT     = 0b0000_0001;
        /// Propose attacking the closest enemy in range.
        const CLOSEST_ENEMY    = 0b0000_0010;
        /// Propose attacking the enemy in range with the least health.
        const WEAKEST_ENEMY    = 0b0000_0100;
        /// Propose attacking the enemy in range with the highest priority.
        const HIGHEST_PRIORITY = 0b0000_1000;
    }
}

impl SearchPolicy {
    /// The three targeting flags.
    pub const TARGETING: Self = Self::CLOSEST_ENEMY
        .union(Self::WEAKEST_ENEMY)
        .union(Self::HIGHEST_PRIORITY);

    /// Returns true if at least one targeting flag is set.
    #[must_use]
    pub const fn targets_anything(self) -> bool {
        self.intersects(Self::TARGETING)
    }
}

impl Default for SearchPolicy {
    fn default() -> Self {
        Self::TARGETING
    }
}

/// Serde support for a [`Duration`] stored as whole milliseconds.
pub mod duration_millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    /// Serialize a duration as milliseconds.
    pub fn serialize<S>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        u64::try_from(value.as_millis())
            .unwrap_or(u64::MAX)
            .serialize(serializer)
    }

    /// Deserialize a duration from milliseconds.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}

/// Configuration of the search driver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Wall-clock budget for one search.
    #[serde(with = "duration_millis", rename = "time_budget_ms")]
    pub time_budget: Duration,
    /// Maximum recursion depth, in plies.
    pub depth_limit: usize,
    /// Move generation switches.
    pub policy: SearchPolicy,
    /// Seed for joint-move sampling.
    pub seed: u64,
    /// Alpha-beta cutoffs. Disabling them gives exhaustive minimax.
    pub pruning: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            time_budget: Duration::from_millis(40),
            depth_limit: 4,
            policy: SearchPolicy::default(),
            seed: 0,
            pruning: true,
        }
    }
}

impl SearchConfig {
    /// Sets the wall-clock budget.
    #[must_use]
    pub fn with_time_budget(mut self, budget: Duration) -> Self {
        self.time_budget = budget;
        self
    }

    /// Sets the maximum depth.
    #[must_use]
    pub fn with_depth_limit(mut self, depth: usize) -> Self {
        self.depth_limit = depth;
        self
    }

    /// Sets the policy flags.
    #[must_use]
    pub fn with_policy(mut self, policy: SearchPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Sets the sampling seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Enables or disables alpha-beta cutoffs.
    #[must_use]
    pub fn with_pruning(mut self, pruning: bool) -> Self {
        self.pruning = pruning;
        self
    }

    /// Checks that the configuration can drive a search.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::InvalidConfig`] if the depth limit is zero or no
    /// targeting flag is set.
    pub fn validate(&self) -> Result<()> {
        if self.depth_limit == 0 {
            return Err(SearchError::InvalidConfig(
                "depth limit must be at least 1".to_string(),
            ));
        }
        if !self.policy.targets_anything() {
            return Err(SearchError::InvalidConfig(
                "at least one targeting flag must be enabled".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        let config = SearchConfig::default();
        assert!(config.validate().is_ok());
        assert!(config.pruning);
        assert_eq!(config.policy, SearchPolicy::TARGETING);
    }

    #[test]
    fn zero_depth_is_rejected() {
        let err = SearchConfig::default().with_depth_limit(0).validate().unwrap_err();
        assert!(matches!(err, SearchError::InvalidConfig(_)));
    }

    #[test]
    fn single_agent_alone_is_rejected() {
        let config = SearchConfig::default().with_policy(SearchPolicy::SINGLE_AGENT);
        assert!(config.validate().is_err());
    }

    #[test]
    fn json_uses_milliseconds() {
        let config = SearchConfig::default()
            .with_time_budget(Duration::from_millis(25))
            .with_policy(SearchPolicy::SINGLE_AGENT | SearchPolicy::CLOSEST_ENEMY)
            .with_seed(7);
        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(json["time_budget_ms"], 25);

        let back: SearchConfig = serde_json::from_value(json).unwrap();
        assert_eq!(back, config);
    }
}
