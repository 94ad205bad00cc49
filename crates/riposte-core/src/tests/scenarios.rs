//! Decisions on small hand-built battles.

use std::time::Duration;

use glam::Vec2;

use crate::action::{Action, ActionKind, Move};
use crate::config::SearchPolicy;
use crate::error::SearchError;
use crate::search::AlphaBetaSearch;
use crate::squad::Side;
use crate::state::WIPE_OUT_PENALTY;
use crate::unit::UnitId;

use super::helpers::{battle, generous, init_tracing, marine, unit_at, zealot};

// =============================================================================
// Positioning
// =============================================================================

#[test]
fn out_of_range_unit_advances_to_firing_distance() {
    init_tracing();
    let state = battle(vec![marine(1, 0.0, 0.0)], vec![zealot(2, 8.0, 0.0)]);
    let mut search = AlphaBetaSearch::new(generous(4, SearchPolicy::CLOSEST_ENEMY));

    let value = search.search_state(&state, 4).unwrap();
    let mv = value.best_move.unwrap();
    let action = &mv.actions()[0];
    assert_eq!(action.kind, ActionKind::MoveForward);
    assert!((action.destination.x - 3.0).abs() < 1e-4);
    assert!((action.completion - 3.0 / 2.25).abs() < 1e-4);
}

#[test]
fn ranged_unit_closes_on_distant_melee() {
    let ranged = unit_at(1, 0.0, 0.0).with_range(5.0);
    let melee = unit_at(2, 6.0, 0.0).with_damage(5.0);
    let state = battle(vec![ranged], vec![melee]);
    let mut search = AlphaBetaSearch::new(generous(4, SearchPolicy::CLOSEST_ENEMY));

    let mv = search.search_state(&state, 4).unwrap().best_move.unwrap();
    assert_eq!(mv.actions()[0].kind, ActionKind::MoveForward);
}

#[test]
fn trading_a_hit_beats_backing_off() {
    init_tracing();
    // The marine may shoot or kite; the zealot is already in reach either way.
    let state = battle(vec![marine(1, 0.0, 0.0)], vec![zealot(2, 0.8, 0.0)]);
    let policy = SearchPolicy::SINGLE_AGENT | SearchPolicy::CLOSEST_ENEMY;
    let mut search = AlphaBetaSearch::new(generous(2, policy));

    let value = search.search_state(&state, 2).unwrap();
    let mv = value.best_move.unwrap();
    assert_eq!(mv.actions().len(), 1);
    assert_eq!(mv.actions()[0].kind, ActionKind::Attack);
    assert!((value.score - 5.0).abs() < 1e-4);
}

// =============================================================================
// Focus fire and wipe-outs
// =============================================================================

#[test]
fn finishing_blow_scores_wipe_out() {
    init_tracing();
    let state = battle(
        vec![unit_at(1, 0.0, 0.0), unit_at(2, 0.0, 1.0)],
        vec![unit_at(9, 0.5, 0.5).with_health(15.0, 15.0)],
    );
    let mut search = AlphaBetaSearch::new(generous(1, SearchPolicy::TARGETING));

    let value = search.search_state(&state, 1).unwrap();
    assert!(value.score >= WIPE_OUT_PENALTY);

    let mv = value.best_move.unwrap();
    assert_eq!(mv.side(), Side::Max);
    assert_eq!(mv.actions().len(), 2);
    assert!(mv.actions().iter().all(|a| a.target == Some(UnitId::new(9))));
    assert!(value.state.unwrap().is_terminal());
}

#[test]
fn pair_attacks_rather_than_walking_away() {
    init_tracing();
    let ours = vec![
        unit_at(1, 0.0, 0.0).with_health(10.0, 10.0).with_range(3.0),
        unit_at(2, 0.0, 1.0).with_health(10.0, 10.0).with_range(3.0),
    ];
    let theirs = vec![unit_at(9, 1.0, 0.0)
        .with_health(10.0, 10.0)
        .with_damage(5.0)
        .with_range(3.0)];
    let state = battle(ours, theirs);
    let mut search = AlphaBetaSearch::new(generous(2, SearchPolicy::TARGETING));

    let value = search.search_state(&state, 2).unwrap();
    assert!(value.best_move.as_ref().is_some_and(Move::has_attack));

    // Both units step back instead, then the enemy gets its reply.
    let retreat = Move::new(
        Side::Max,
        vec![
            Action::movement(ActionKind::MoveBack, UnitId::new(1), Vec2::new(-1.0, 0.0), 1.0, 1.0),
            Action::movement(ActionKind::MoveBack, UnitId::new(2), Vec2::new(-1.0, 2.0), 1.41, 1.41),
        ],
    );
    let mut walked = state.child();
    walked.apply_move(&retreat);
    let alternative = AlphaBetaSearch::new(generous(1, SearchPolicy::TARGETING))
        .search_state(&walked, 1)
        .unwrap();
    assert!(value.score > alternative.score);
}

#[test]
fn single_agent_commits_one_unit_at_the_root() {
    init_tracing();
    let state = battle(
        vec![unit_at(1, 0.0, 0.0), unit_at(2, 0.0, 1.0)],
        vec![unit_at(9, 0.5, 0.5)],
    );
    let policy = SearchPolicy::SINGLE_AGENT | SearchPolicy::TARGETING;
    let mut search = AlphaBetaSearch::new(generous(2, policy));

    let mv = search.search_state(&state, 2).unwrap().best_move.unwrap();
    assert_eq!(mv.actions().len(), 1);
    assert_eq!(mv.actions()[0].unit, UnitId::new(1));
}

#[test]
fn already_acted_unit_yields_to_its_squad_mate() {
    let state = battle(
        vec![unit_at(1, 0.0, 0.0).acted(), unit_at(2, 0.0, 1.0)],
        vec![unit_at(9, 0.5, 0.5)],
    );
    let policy = SearchPolicy::SINGLE_AGENT | SearchPolicy::CLOSEST_ENEMY;
    let mut search = AlphaBetaSearch::new(generous(1, policy));

    let mv = search.search_state(&state, 1).unwrap().best_move.unwrap();
    assert_eq!(mv.actions()[0].unit, UnitId::new(2));
}

// =============================================================================
// Simultaneous plies
// =============================================================================

#[test]
fn same_instant_reply_lowers_the_root_score() {
    init_tracing();
    // Both ready at 0; the enemy fires twice as often.
    let ours = unit_at(1, 0.0, 0.0).with_range(3.0).with_cooldown(1.0);
    let theirs = unit_at(2, 1.0, 0.0).with_range(3.0).with_cooldown(0.5);
    let state = battle(vec![ours], vec![theirs]);
    assert!(state.both_ready());

    let mut search = AlphaBetaSearch::new(generous(3, SearchPolicy::CLOSEST_ENEMY));
    let value = search.search_state(&state, 3).unwrap();
    let mv = value.best_move.unwrap();
    assert_eq!(mv.actions()[0].target, Some(UnitId::new(2)));

    // Acting alone, the attack lets us fire again before their second shot.
    let mut alone = state.child();
    alone.apply_move(&mv);
    let unanswered = AlphaBetaSearch::new(generous(2, SearchPolicy::CLOSEST_ENEMY))
        .search_state(&alone, 2)
        .unwrap();
    assert!((unanswered.score - 10.0).abs() < 1e-4);

    // Answered in the same instant, their second shot lands first.
    assert!((value.score + 10.0).abs() < 1e-4);
    assert!(value.score < unanswered.score);
}

// =============================================================================
// Budget and determinism
// =============================================================================

#[test]
fn exhausted_budget_reports_timeout() {
    let state = battle(vec![marine(1, 0.0, 0.0)], vec![zealot(2, 3.0, 0.0)]);
    let config = generous(6, SearchPolicy::TARGETING).with_time_budget(Duration::ZERO);
    let mut search = AlphaBetaSearch::new(config);

    match search.search_state(&state, 6) {
        Err(SearchError::TimeBudgetExceeded { budget, .. }) => assert_eq!(budget, Duration::ZERO),
        other => panic!("expected a timeout, got {other:?}"),
    }
}

#[test]
fn same_seed_same_decision() {
    init_tracing();
    let ours = vec![marine(1, 0.0, 0.0), marine(2, 0.0, 2.0), zealot(3, 1.0, 1.0)];
    let theirs = vec![zealot(11, 3.0, 0.0), marine(12, 5.0, 2.0), marine(13, 6.0, 1.0)];
    let state = battle(ours, theirs);
    let config = generous(4, SearchPolicy::TARGETING).with_seed(42);

    let first = AlphaBetaSearch::new(config.clone())
        .search_state(&state, 4)
        .unwrap();
    let second = AlphaBetaSearch::new(config).search_state(&state, 4).unwrap();
    assert_eq!(first.score, second.score);
    assert_eq!(first.best_move, second.best_move);
}

#[test]
fn search_leaves_the_root_untouched() {
    let state = battle(vec![marine(1, 0.0, 0.0)], vec![zealot(2, 0.8, 0.0)]);
    let before = state.clone();
    AlphaBetaSearch::new(generous(4, SearchPolicy::TARGETING))
        .search_state(&state, 4)
        .unwrap();
    assert_eq!(state, before);
}
