//! Duration-aware alpha-beta search.
//!
//! [`AlphaBetaSearch`] runs a depth- and time-bounded minimax search with
//! alpha-beta pruning over [`CombatState`]s. Turns are not alternating: at
//! every node the acting side is derived from unit readiness
//! ([`CombatState::turn_owner`]).
//!
//! # Recursion
//!
//! Each call:
//! 1. Fails with [`SearchError::TimeBudgetExceeded`] once the budget is spent
//! 2. Returns the evaluation at depth 0 or when a side is wiped out
//! 3. Resolves the acting side. A side without any candidate Move hands the
//!    ply to the other side; the node is a leaf only when neither can act
//! 4. When both sides are ready at once, also explores the branch where the
//!    skipped side answers in the same instant, and keeps the worse of the
//!    two outcomes for the acting side
//! 5. Recurses into a fresh child per candidate Move, tightening alpha
//!    (max side) or beta (min side) and cutting off once alpha > beta
//!
//! # Cancellation
//!
//! The budget is checked at the entry of every call and the error is
//! propagated with `?`. A timed-out search returns nothing: callers keep
//! their own fallback (see [`Planner`](crate::planner::Planner)).
//!
//! # Determinism
//!
//! Joint moves are sampled from a `ChaCha8Rng` seeded per node by hashing
//! the configured seed with the node's path in the tree. The moves generated
//! at a node therefore do not depend on which sibling subtrees were pruned,
//! and a pruned search explores the same tree as an exhaustive one.
//!
//! # Example
//!
//! ```
//! use riposte_core::config::{SearchConfig, SearchPolicy};
//! use riposte_core::search::AlphaBetaSearch;
//! use riposte_core::squad::Squad;
//! use riposte_core::unit::{UnitId, UnitSnapshot};
//! use glam::Vec2;
//! use std::time::Duration;
//!
//! let ours = Squad::new(vec![
//!     UnitSnapshot::new(UnitId::new(1), Vec2::ZERO).with_range(5.0),
//! ]);
//! let theirs = Squad::new(vec![
//!     UnitSnapshot::new(UnitId::new(2), Vec2::new(3.0, 0.0)).with_range(5.0),
//! ]);
//!
//! let config = SearchConfig::default()
//!     .with_depth_limit(3)
//!     .with_time_budget(Duration::from_secs(5))
//!     .with_policy(SearchPolicy::CLOSEST_ENEMY);
//! let mut search = AlphaBetaSearch::new(config);
//!
//! let value = search.search_squads(ours, theirs).unwrap();
//! assert!(value.best_move.is_some_and(|mv| mv.has_attack()));
//! ```

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::time::{Duration, Instant};

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::action::Move;
use crate::config::SearchConfig;
use crate::error::{Result, SearchError};
use crate::rules::{CombatRules, StandardRules};
use crate::squad::{Side, Squad};
use crate::state::CombatState;
use crate::unit::{Combatant, UnitSnapshot};

/// Lower bound the top-level call starts from.
pub const INITIAL_ALPHA: f32 = -10_000.0;

/// Upper bound the top-level call starts from.
pub const INITIAL_BETA: f32 = 10_000.0;

const ANSWER_BRANCH: u64 = u64::MAX;

/// A backed-up score with the Move that produced it.
///
/// Values returned by leaves carry no Move. Values that tightened a bound
/// carry the Move and the child state it led to.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchValue {
    /// Score from the max side's point of view.
    pub score: f32,
    /// The Move that achieved the score, if any.
    pub best_move: Option<Move>,
    /// The state the score was computed from.
    pub state: Option<CombatState>,
}

impl SearchValue {
    /// A bare bound with no Move or state.
    #[must_use]
    pub const fn bound(score: f32) -> Self {
        Self {
            score,
            best_move: None,
            state: None,
        }
    }

    fn leaf(state: &CombatState) -> Self {
        Self {
            score: state.evaluate(),
            best_move: None,
            state: Some(state.clone()),
        }
    }
}

/// Diagnostic counters for the last search.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchStats {
    /// Interior nodes fully evaluated.
    pub nodes_evaluated: u64,
    /// Plies abandoned by an alpha-beta cutoff.
    pub cutoffs: u64,
    /// Wall-clock time of the last search.
    pub elapsed: Duration,
}

/// Depth- and time-bounded alpha-beta search over combat states.
///
/// The controlled squad is always the max side.
#[derive(Debug)]
pub struct AlphaBetaSearch<R = StandardRules> {
    config: SearchConfig,
    rules: R,
    start: Instant,
    root_depth: usize,
    stats: SearchStats,
}

impl AlphaBetaSearch<StandardRules> {
    /// Creates a search using [`StandardRules`].
    #[must_use]
    pub fn new(config: SearchConfig) -> Self {
        Self::with_rules(config, StandardRules)
    }

    /// Creates a search using [`StandardRules`] after validating `config`.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::InvalidConfig`] if the configuration is unusable.
    pub fn try_new(config: SearchConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::new(config))
    }
}

impl<R: CombatRules> AlphaBetaSearch<R> {
    /// Creates a search consulting `rules` during move generation.
    #[must_use]
    pub fn with_rules(config: SearchConfig, rules: R) -> Self {
        Self {
            config,
            rules,
            start: Instant::now(),
            root_depth: 0,
            stats: SearchStats::default(),
        }
    }

    /// The configuration.
    #[must_use]
    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// The rules consulted during move generation.
    #[must_use]
    pub fn rules(&self) -> &R {
        &self.rules
    }

    /// Counters from the last search.
    #[must_use]
    pub fn stats(&self) -> SearchStats {
        self.stats
    }

    /// Searches for the best immediate action of `own` against `enemy`.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::TimeBudgetExceeded`] if the budget ran out.
    pub fn search<C: Combatant>(&mut self, own: &[C], enemy: &[C]) -> Result<SearchValue> {
        let own = Squad::new(own.iter().map(UnitSnapshot::from_combatant).collect());
        let enemy = Squad::new(enemy.iter().map(UnitSnapshot::from_combatant).collect());
        self.search_squads(own, enemy)
    }

    /// Searches from fresh squads at clock 0.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::TimeBudgetExceeded`] if the budget ran out.
    pub fn search_squads(&mut self, own: Squad, enemy: Squad) -> Result<SearchValue> {
        let state = CombatState::new(enemy, own, 0.0);
        self.search_state(&state, self.config.depth_limit)
    }

    /// Searches `state` to `depth`, with the budget starting now.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::TimeBudgetExceeded`] if the budget ran out.
    pub fn search_state(&mut self, state: &CombatState, depth: usize) -> Result<SearchValue> {
        self.search_state_since(state, depth, Instant::now())
    }

    /// Searches `state` to `depth`, with the budget counted from `started`.
    ///
    /// Lets a caller spend one budget across several searches.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::TimeBudgetExceeded`] if the budget ran out.
    pub fn search_state_since(
        &mut self,
        state: &CombatState,
        depth: usize,
        started: Instant,
    ) -> Result<SearchValue> {
        self.start = started;
        self.root_depth = depth;
        self.stats = SearchStats::default();

        let result = self.alpha_beta(state, depth, None, INITIAL_ALPHA, INITIAL_BETA, 0);
        self.stats.elapsed = self.start.elapsed();

        match &result {
            Ok(value) => tracing::debug!(
                depth,
                nodes = self.stats.nodes_evaluated,
                cutoffs = self.stats.cutoffs,
                elapsed_us = self.stats.elapsed.as_micros(),
                score = value.score,
                "search complete"
            ),
            Err(err) => tracing::debug!(
                depth,
                nodes = self.stats.nodes_evaluated,
                %err,
                "search abandoned"
            ),
        }
        result
    }

    fn check_time(&self) -> Result<()> {
        let elapsed = self.start.elapsed();
        if elapsed >= self.config.time_budget {
            return Err(SearchError::TimeBudgetExceeded {
                elapsed,
                budget: self.config.time_budget,
            });
        }
        Ok(())
    }

    /// One recursive step.
    ///
    /// `queued` is a move of the other side committed at this same instant;
    /// when present, the side opposite to it acts and both moves are applied
    /// together. `path` identifies the node for move sampling.
    fn alpha_beta(
        &mut self,
        state: &CombatState,
        depth: usize,
        queued: Option<&Move>,
        alpha: f32,
        beta: f32,
        path: u64,
    ) -> Result<SearchValue> {
        self.check_time()?;

        if depth == 0 || state.is_terminal() {
            return Ok(SearchValue::leaf(state));
        }

        let owner = queued.map_or_else(|| state.turn_owner(), |q| q.side().opponent());
        let ply_index = self.root_depth.saturating_sub(depth);
        let mut rng = ChaCha8Rng::seed_from_u64(node_seed(self.config.seed, path));
        let policy = self.config.policy;
        let mut acting = owner;
        let mut moves = state.generate_moves(owner, policy, ply_index, &self.rules, &mut rng);

        if moves.is_empty() {
            if let Some(q) = queued {
                // Nobody answers: the queued move plays out alone.
                let mut rest = state.child();
                rest.apply_move(q);
                return self.alpha_beta(&rest, depth - 1, None, alpha, beta, node_seed(path, 0));
            }

            // Readiness is capped at the clock, so an idle side can hold a
            // tie while the other side has a unit ready.
            acting = owner.opponent();
            moves = state.generate_moves(acting, policy, ply_index, &self.rules, &mut rng);
            if moves.is_empty() {
                self.stats.nodes_evaluated += 1;
                return Ok(SearchValue::leaf(state));
            }
            tracing::trace!(depth, from = %owner, to = %acting, "ply handed over");
        }

        let simultaneous = queued.is_none() && acting == owner && depth > 1 && state.both_ready();
        let mut alpha = SearchValue::bound(alpha);
        let mut beta = SearchValue::bound(beta);

        for (index, mv) in moves.into_iter().enumerate() {
            let child_path = node_seed(path, index as u64);
            let mut child = state.child();
            match queued {
                Some(q) => child.apply_simultaneous(q, &mv),
                None => child.apply_move(&mv),
            }

            let mut score = self
                .alpha_beta(&child, depth - 1, None, alpha.score, beta.score, child_path)?
                .score;

            if simultaneous {
                let answered = self
                    .alpha_beta(
                        state,
                        depth - 1,
                        Some(&mv),
                        alpha.score,
                        beta.score,
                        node_seed(child_path, ANSWER_BRANCH),
                    )?
                    .score;
                score = match acting {
                    Side::Max => score.min(answered),
                    Side::Min => score.max(answered),
                };
            }

            match acting {
                Side::Max if score > alpha.score => {
                    alpha = SearchValue {
                        score,
                        best_move: Some(mv),
                        state: Some(child),
                    };
                }
                Side::Min if score < beta.score => {
                    beta = SearchValue {
                        score,
                        best_move: Some(mv),
                        state: Some(child),
                    };
                }
                _ => {}
            }

            if self.config.pruning && alpha.score > beta.score {
                self.stats.cutoffs += 1;
                tracing::trace!(depth, %acting, alpha = alpha.score, beta = beta.score, "cutoff");
                break;
            }
        }

        self.stats.nodes_evaluated += 1;
        Ok(match acting {
            Side::Max => alpha,
            Side::Min => beta,
        })
    }
}

/// Mixes a seed with a child index into a new seed.
fn node_seed(seed: u64, index: u64) -> u64 {
    let mut hasher = DefaultHasher::new();
    seed.hash(&mut hasher);
    index.hash(&mut hasher);
    hasher.finish()
}
