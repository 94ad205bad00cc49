//! Caller-side planning around the search.
//!
//! A single search either completes within its budget or yields nothing. The
//! [`Planner`] turns that into something a bot can act on every frame:
//!
//! - **Iterative deepening**: depths `1..=depth_limit` are searched in turn
//!   under one shared budget; the deepest completed result wins
//! - **Last known good**: when not even depth 1 completes, or every option
//!   scores below the root window, the previously chosen Move is replayed,
//!   minus actions whose unit or target has died
//!
//! # Example
//!
//! ```
//! use riposte_core::config::SearchConfig;
//! use riposte_core::planner::{Decision, Planner};
//! use riposte_core::unit::{UnitId, UnitSnapshot};
//! use glam::Vec2;
//! use std::time::Duration;
//!
//! let mut planner = Planner::new(
//!     SearchConfig::default()
//!         .with_depth_limit(2)
//!         .with_time_budget(Duration::from_secs(5)),
//! );
//! let ours = [UnitSnapshot::new(UnitId::new(1), Vec2::ZERO).with_range(4.0)];
//! let theirs = [UnitSnapshot::new(UnitId::new(2), Vec2::new(2.0, 0.0)).with_range(4.0)];
//!
//! match planner.plan(&ours, &theirs) {
//!     Decision::Fresh { depth, .. } => assert_eq!(depth, 2),
//!     other => panic!("unexpected {other:?}"),
//! }
//! assert!(planner.last_good().is_some());
//! ```

use std::time::Instant;

use crate::action::Move;
use crate::config::SearchConfig;
use crate::rules::{CombatRules, StandardRules};
use crate::search::AlphaBetaSearch;
use crate::squad::{Side, Squad};
use crate::state::CombatState;
use crate::unit::{Combatant, UnitSnapshot};

/// What the bot should do this frame.
#[derive(Debug, Clone, PartialEq)]
pub enum Decision {
    /// A search completed.
    Fresh {
        /// The chosen Move for the controlled squad.
        best: Move,
        /// Its backed-up score.
        score: f32,
        /// Depth of the search that produced it.
        depth: usize,
    },
    /// No fresh Move; replay what is left of the last plan.
    Fallback(Move),
    /// Nothing to do.
    Idle,
}

impl Decision {
    /// The Move to execute, if any.
    #[must_use]
    pub fn best_move(&self) -> Option<&Move> {
        match self {
            Self::Fresh { best, .. } | Self::Fallback(best) => Some(best),
            Self::Idle => None,
        }
    }

    /// Returns true if the Move is a replay of an earlier plan.
    #[must_use]
    pub const fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback(_))
    }
}

/// Iterative deepening with a last-known-good fallback.
#[derive(Debug)]
pub struct Planner<R = StandardRules> {
    search: AlphaBetaSearch<R>,
    iterative: bool,
    last_good: Option<Move>,
}

impl Planner<StandardRules> {
    /// Creates a planner using [`StandardRules`].
    #[must_use]
    pub fn new(config: SearchConfig) -> Self {
        Self::with_search(AlphaBetaSearch::new(config))
    }
}

impl<R: CombatRules> Planner<R> {
    /// Wraps an existing search.
    #[must_use]
    pub fn with_search(search: AlphaBetaSearch<R>) -> Self {
        Self {
            search,
            iterative: true,
            last_good: None,
        }
    }

    /// Enables or disables iterative deepening. When disabled only the
    /// configured depth limit is searched.
    #[must_use]
    pub fn iterative(mut self, iterative: bool) -> Self {
        self.iterative = iterative;
        self
    }

    /// The underlying search.
    #[must_use]
    pub fn search(&self) -> &AlphaBetaSearch<R> {
        &self.search
    }

    /// The Move remembered from the last completed search.
    #[must_use]
    pub fn last_good(&self) -> Option<&Move> {
        self.last_good.as_ref()
    }

    /// Drops the remembered Move.
    pub fn forget(&mut self) {
        self.last_good = None;
    }

    /// Plans for `own` against `enemy`.
    pub fn plan<C: Combatant>(&mut self, own: &[C], enemy: &[C]) -> Decision {
        let own = Squad::new(own.iter().map(UnitSnapshot::from_combatant).collect());
        let enemy = Squad::new(enemy.iter().map(UnitSnapshot::from_combatant).collect());
        self.plan_state(&CombatState::new(enemy, own, 0.0))
    }

    /// Plans from an explicit state. The controlled squad is the max side.
    pub fn plan_state(&mut self, state: &CombatState) -> Decision {
        let started = Instant::now();
        let limit = self.search.config().depth_limit;
        let first = if self.iterative { 1 } else { limit };

        let mut searched = false;
        let mut completed: Option<(Move, f32, usize)> = None;
        for depth in first..=limit {
            match self.search.search_state_since(state, depth, started) {
                Ok(value) => {
                    searched = true;
                    if let Some(best) = value.best_move {
                        completed = Some((best, value.score, depth));
                    }
                }
                Err(err) => {
                    tracing::debug!(depth, %err, "deepening stopped");
                    break;
                }
            }
        }

        match completed {
            Some((best, score, depth)) => {
                tracing::info!(
                    depth,
                    score,
                    elapsed_us = started.elapsed().as_micros(),
                    "deepening complete"
                );
                self.last_good = Some(best.clone());
                Decision::Fresh { best, score, depth }
            }
            // No Move either because nobody can act, or because every option
            // scored below the root window (the squad is lost either way).
            None if searched && !self.can_act(state) => Decision::Idle,
            None => self.fall_back(state),
        }
    }

    fn can_act(&self, state: &CombatState) -> bool {
        let policy = self.search.config().policy;
        !state
            .candidate_actions(Side::Max, policy, self.search.rules())
            .is_empty()
    }

    fn fall_back(&self, state: &CombatState) -> Decision {
        let Some(previous) = &self.last_good else {
            tracing::warn!("no fresh move and nothing to fall back on");
            return Decision::Idle;
        };

        let ours = state.max_squad();
        let theirs = state.min_squad();
        let still_valid = previous
            .actions()
            .iter()
            .filter(|a| ours.get(a.unit).is_some_and(UnitSnapshot::is_alive))
            .filter(|a| {
                a.target
                    .map_or(true, |t| theirs.get(t).is_some_and(UnitSnapshot::is_alive))
            })
            .cloned()
            .collect();
        let replay = Move::new(Side::Max, still_valid);

        if replay.is_empty() {
            tracing::warn!("no fresh move and the last plan is stale");
            return Decision::Idle;
        }
        tracing::warn!(actions = replay.actions().len(), "no fresh move, replaying last plan");
        Decision::Fallback(replay)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SearchPolicy;
    use crate::unit::UnitId;
    use glam::Vec2;
    use std::time::Duration;

    fn unit(id: u64, x: f32) -> UnitSnapshot {
        UnitSnapshot::new(UnitId::new(id), Vec2::new(x, 0.0)).with_range(4.0)
    }

    fn config() -> SearchConfig {
        SearchConfig::default()
            .with_depth_limit(3)
            .with_time_budget(Duration::from_secs(10))
            .with_policy(SearchPolicy::CLOSEST_ENEMY)
    }

    #[test]
    fn fresh_decision_reaches_depth_limit() {
        let mut planner = Planner::new(config());
        let decision = planner.plan(&[unit(1, 0.0)], &[unit(2, 2.0)]);
        match decision {
            Decision::Fresh { best, depth, .. } => {
                assert_eq!(depth, 3);
                assert!(best.has_attack());
            }
            other => panic!("expected fresh decision, got {other:?}"),
        }
        assert!(planner.last_good().is_some());
    }

    #[test]
    fn non_iterative_searches_limit_only() {
        let mut planner = Planner::new(config()).iterative(false);
        let decision = planner.plan(&[unit(1, 0.0)], &[unit(2, 2.0)]);
        assert!(matches!(decision, Decision::Fresh { depth: 3, .. }));
    }

    #[test]
    fn timeout_without_memory_is_idle() {
        let mut planner = Planner::new(config().with_time_budget(Duration::ZERO));
        let decision = planner.plan(&[unit(1, 0.0)], &[unit(2, 2.0)]);
        assert_eq!(decision, Decision::Idle);
        assert!(decision.best_move().is_none());
    }

    #[test]
    fn timeout_replays_last_good_move() {
        let mut planner = Planner::new(config());
        let ours = [unit(1, 0.0)];
        let theirs = [unit(2, 2.0)];
        let first = planner.plan(&ours, &theirs);
        let remembered = first.best_move().cloned().unwrap();

        let mut starved = Planner::new(config().with_time_budget(Duration::ZERO));
        starved.last_good = Some(remembered.clone());
        let decision = starved.plan(&ours, &theirs);
        assert!(decision.is_fallback());
        assert_eq!(decision.best_move(), Some(&remembered));
    }

    #[test]
    fn fallback_drops_actions_on_dead_targets() {
        let mut planner = Planner::new(config());
        let ours = [unit(1, 0.0)];
        planner.plan(&ours, &[unit(2, 2.0)]);

        let mut starved = Planner::new(config().with_time_budget(Duration::ZERO));
        starved.last_good = planner.last_good().cloned();
        let dead = [unit(2, 2.0).with_health(0.0, 100.0)];
        assert_eq!(starved.plan(&ours, &dead), Decision::Idle);
    }

    #[test]
    fn lost_position_replays_last_good_move() {
        let ours = [UnitSnapshot::new(UnitId::new(1), Vec2::ZERO).with_health(10.0, 10.0)];
        let theirs = [UnitSnapshot::new(UnitId::new(2), Vec2::new(0.5, 0.0))
            .with_health(1000.0, 1000.0)
            .with_damage(20.0)];
        let config = config().with_depth_limit(2);

        // Every option ends with the squad wiped out, so the search finds no Move.
        let mut fresh = Planner::new(config.clone()).iterative(false);
        assert_eq!(fresh.plan(&ours, &theirs), Decision::Idle);

        let remembered = Move::new(
            Side::Max,
            vec![crate::action::Action::attack(UnitId::new(1), UnitId::new(2), Vec2::ZERO, 1.0)],
        );
        let mut planner = Planner::new(config).iterative(false);
        planner.last_good = Some(remembered.clone());
        let decision = planner.plan(&ours, &theirs);
        assert_eq!(decision, Decision::Fallback(remembered));
    }

    #[test]
    fn idle_when_nobody_can_act() {
        let mut planner = Planner::new(config());
        planner.last_good = Some(Move::new(
            Side::Max,
            vec![crate::action::Action::attack(UnitId::new(1), UnitId::new(2), Vec2::ZERO, 1.0)],
        ));
        let dead = [unit(2, 2.0).with_health(0.0, 100.0)];
        assert_eq!(planner.plan(&[unit(1, 0.0)], &dead), Decision::Idle);
    }

    #[test]
    fn forget_clears_memory() {
        let mut planner = Planner::new(config());
        planner.plan(&[unit(1, 0.0)], &[unit(2, 2.0)]);
        planner.forget();
        assert!(planner.last_good().is_none());
    }
}
