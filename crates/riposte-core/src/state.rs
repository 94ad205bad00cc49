//! Combat state: one point in the simulated battle.
//!
//! A [`CombatState`] holds both squads and a logical clock. It answers the
//! three questions the search asks at every node:
//!
//! - **Who acts next?** [`CombatState::turn_owner`] derives the turn from unit
//!   readiness instead of alternating, so fast, low-cooldown units act more
//!   often than slow ones.
//! - **What can they do?** [`CombatState::generate_moves`] proposes attacks,
//!   advances and retreats, then assembles them into [`Move`]s.
//! - **How good is this?** [`CombatState::evaluate`] scores health lost on
//!   each side, with a large penalty for a wiped-out squad.
//!
//! # Branch isolation
//!
//! States are plain values. The search descends through [`CombatState::child`],
//! a deep copy, and only ever mutates the copy; a parent state is never
//! mutated once its children exist.
//!
//! # Example
//!
//! ```
//! use riposte_core::state::CombatState;
//! use riposte_core::squad::{Side, Squad};
//! use riposte_core::unit::{UnitId, UnitSnapshot};
//! use glam::Vec2;
//!
//! let ours = Squad::new(vec![UnitSnapshot::new(UnitId::new(1), Vec2::ZERO)]);
//! let theirs = Squad::new(vec![UnitSnapshot::new(UnitId::new(2), Vec2::new(0.5, 0.0))]);
//! let state = CombatState::new(theirs, ours, 0.0);
//!
//! assert_eq!(state.turn_owner(), Side::Max);
//! assert!(state.both_ready());
//! assert_eq!(state.evaluate(), 0.0);
//! ```

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::action::{Action, ActionKind, Move};
use crate::config::SearchPolicy;
use crate::rules::CombatRules;
use crate::squad::{Side, Squad};
use crate::unit::{UnitId, UnitSnapshot};

/// Score added to a side's health-lost tally when it has no living units.
pub const WIPE_OUT_PENALTY: f32 = 100_000.0;

/// Damage assumed for targets without a weapon when ranking priority.
pub const SUPPORT_UNIT_DAMAGE: f32 = 15.0;

const PRIORITY_BASE: f32 = 5.0;

/// Candidate actions per ready unit, in squad order.
pub type CandidateMap = Vec<(UnitId, Vec<Action>)>;

/// Priority of `target` for `attacker`.
///
/// `5 + damage / (health + shield) / distance`, where `damage` is the
/// target's per-hit damage, or [`SUPPORT_UNIT_DAMAGE`] for targets that deal
/// none. Close, fragile, dangerous targets rank highest.
#[must_use]
pub fn target_priority(attacker: &UnitSnapshot, target: &UnitSnapshot) -> f32 {
    let damage = if target.damage == 0.0 {
        SUPPORT_UNIT_DAMAGE
    } else {
        target.damage
    };
    let durability = (target.health + target.shield).max(f32::EPSILON);
    let distance = attacker.distance_to(target).max(f32::EPSILON);
    PRIORITY_BASE + damage / durability / distance
}

/// Both squads and the logical clock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombatState {
    min: Squad,
    max: Squad,
    clock: f32,
}

impl CombatState {
    /// Creates a state from the minimizing and maximizing squads.
    #[must_use]
    pub fn new(min: Squad, max: Squad, clock: f32) -> Self {
        Self { min, max, clock }
    }

    /// The earliest time at which the next ply may begin.
    #[must_use]
    pub const fn clock(&self) -> f32 {
        self.clock
    }

    /// The opponent's squad.
    #[must_use]
    pub const fn min_squad(&self) -> &Squad {
        &self.min
    }

    /// The controlled squad.
    #[must_use]
    pub const fn max_squad(&self) -> &Squad {
        &self.max
    }

    /// The squad of `side`.
    #[must_use]
    pub const fn squad(&self, side: Side) -> &Squad {
        match side {
            Side::Min => &self.min,
            Side::Max => &self.max,
        }
    }

    fn squad_mut(&mut self, side: Side) -> &mut Squad {
        match side {
            Side::Min => &mut self.min,
            Side::Max => &mut self.max,
        }
    }

    /// Returns true if either side has no living unit.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        !self.min.has_living() || !self.max.has_living()
    }

    /// Deep copy used when descending into a child ply.
    ///
    /// Every snapshot is copied; only unit identities are shared. Both squads
    /// of the copy are flagged as cloned.
    #[must_use]
    pub fn child(&self) -> Self {
        Self {
            min: self.min.deep_clone(),
            max: self.max.deep_clone(),
            clock: self.clock,
        }
    }

    /// Returns the same state with the two squads' roles swapped.
    #[must_use]
    pub fn swapped(&self) -> Self {
        Self {
            min: self.max.clone(),
            max: self.min.clone(),
            clock: self.clock,
        }
    }

    // -------------------------------------------------------------------------
    // Turn order
    // -------------------------------------------------------------------------

    fn side_ready_time(&self, squad: &Squad) -> f32 {
        squad
            .living()
            .map(|u| self.clock.min(u.ready_time()))
            .fold(f32::INFINITY, f32::min)
    }

    /// Ready times of the min and max sides.
    ///
    /// A side is ready at the earliest completion of its living units'
    /// previous actions (0 for units that never acted), capped by the clock.
    /// A side with no living unit is never ready.
    #[must_use]
    pub fn ready_times(&self) -> (f32, f32) {
        (
            self.side_ready_time(&self.min),
            self.side_ready_time(&self.max),
        )
    }

    /// The side that acts next. Ties go to the max side.
    #[must_use]
    pub fn turn_owner(&self) -> Side {
        let (min_time, max_time) = self.ready_times();
        if max_time <= min_time {
            Side::Max
        } else {
            Side::Min
        }
    }

    /// Returns true when both sides are ready at exactly the same time.
    #[must_use]
    #[allow(clippy::float_cmp)]
    pub fn both_ready(&self) -> bool {
        let (min_time, max_time) = self.ready_times();
        min_time == max_time
    }

    // -------------------------------------------------------------------------
    // Move generation
    // -------------------------------------------------------------------------

    /// Candidate actions for every living, ready unit of `side`.
    ///
    /// Units without any candidate are omitted.
    pub fn candidate_actions<R>(&self, side: Side, policy: SearchPolicy, rules: &R) -> CandidateMap
    where
        R: CombatRules + ?Sized,
    {
        let enemies = self.squad(side.opponent()).units();
        self.squad(side)
            .living()
            .filter(|unit| unit.is_ready(self.clock))
            .filter_map(|unit| {
                let mut actions = Vec::new();
                self.push_attacks(unit, enemies, policy, rules, &mut actions);
                if let Some(advance) = self.advance(unit, enemies, rules) {
                    actions.push(advance);
                }
                if let Some(retreat) = self.retreat(unit, enemies, rules) {
                    actions.push(retreat);
                }
                (!actions.is_empty()).then(|| (unit.id(), actions))
            })
            .collect()
    }

    fn push_attacks<R>(
        &self,
        unit: &UnitSnapshot,
        enemies: &[UnitSnapshot],
        policy: SearchPolicy,
        rules: &R,
        actions: &mut Vec<Action>,
    ) where
        R: CombatRules + ?Sized,
    {
        if !unit.weapon_ready(self.clock) || !rules.can_attack(unit, self.clock) {
            return;
        }
        let in_range: Vec<&UnitSnapshot> = enemies
            .iter()
            .filter(|e| e.is_alive() && unit.in_range(e))
            .collect();
        if in_range.is_empty() {
            return;
        }

        let mut targets: Vec<UnitId> = Vec::with_capacity(3);
        if policy.contains(SearchPolicy::CLOSEST_ENEMY) {
            if let Some(target) = in_range
                .iter()
                .min_by(|a, b| unit.distance_to(a).total_cmp(&unit.distance_to(b)))
            {
                targets.push(target.id());
            }
        }
        if policy.contains(SearchPolicy::WEAKEST_ENEMY) {
            // Ties go to the last enemy listed.
            if let Some(target) = in_range
                .iter()
                .rev()
                .min_by(|a, b| a.health.total_cmp(&b.health))
            {
                targets.push(target.id());
            }
        }
        if policy.contains(SearchPolicy::HIGHEST_PRIORITY) {
            // Ties go to the first enemy listed.
            if let Some(target) = in_range
                .iter()
                .rev()
                .max_by(|a, b| target_priority(unit, a).total_cmp(&target_priority(unit, b)))
            {
                targets.push(target.id());
            }
        }

        let completion = self.clock + unit.cooldown;
        for (i, target) in targets.iter().enumerate() {
            // Two policies agreeing on a target propose a single attack.
            if targets[..i].contains(target) {
                continue;
            }
            actions.push(Action::attack(unit.id(), *target, unit.position, completion));
        }
    }

    fn advance<R>(&self, unit: &UnitSnapshot, enemies: &[UnitSnapshot], rules: &R) -> Option<Action>
    where
        R: CombatRules + ?Sized,
    {
        if unit.speed <= 0.0
            || enemies.iter().any(|e| e.is_alive() && unit.in_range(e))
            || !rules.can_move_forward(unit, self.clock, enemies)
        {
            return None;
        }

        let (destination, distance) = enemies
            .iter()
            .filter(|e| e.is_alive())
            .map(|e| {
                let gap = unit.distance_to(e) - unit.range;
                let heading = (e.position - unit.position).normalize_or_zero();
                (unit.position + heading * gap, gap)
            })
            .min_by(|a, b| a.1.total_cmp(&b.1))?;

        Some(Action::movement(
            ActionKind::MoveForward,
            unit.id(),
            destination,
            distance,
            self.clock + distance / unit.speed,
        ))
    }

    fn retreat<R>(&self, unit: &UnitSnapshot, enemies: &[UnitSnapshot], rules: &R) -> Option<Action>
    where
        R: CombatRules + ?Sized,
    {
        if unit.speed <= 0.0 || !rules.should_move_back(unit, self.clock, enemies) {
            return None;
        }

        let nearest = enemies
            .iter()
            .filter(|e| e.is_alive())
            .min_by(|a, b| unit.distance_to(a).total_cmp(&unit.distance_to(b)))?;

        let destination: Vec2 = unit.position * 2.0 - nearest.position;
        let distance = unit.position.distance(destination);
        if distance <= 0.0 {
            return None;
        }

        Some(Action::movement(
            ActionKind::MoveBack,
            unit.id(),
            destination,
            distance,
            self.clock + distance / unit.speed,
        ))
    }

    /// Assembles the candidate Moves for `side`.
    ///
    /// With [`SearchPolicy::SINGLE_AGENT`] at `ply_index == 0`, one Move is
    /// produced per candidate of the first unit that has not acted yet (or the
    /// first unit with candidates, if all have acted).
    ///
    /// Otherwise up to `n` joint Moves are sampled, `n` being the largest
    /// candidate count of any unit; each picks one candidate per unit
    /// uniformly at random. Identical samples are kept once. This bounds the
    /// branching factor by the most prolific unit rather than by the product
    /// of all units' options.
    pub fn generate_moves<R, G>(
        &self,
        side: Side,
        policy: SearchPolicy,
        ply_index: usize,
        rules: &R,
        rng: &mut G,
    ) -> Vec<Move>
    where
        R: CombatRules + ?Sized,
        G: Rng + ?Sized,
    {
        let candidates = self.candidate_actions(side, policy, rules);

        if policy.contains(SearchPolicy::SINGLE_AGENT) && ply_index == 0 {
            let squad = self.squad(side);
            let chosen = candidates
                .iter()
                .find(|(id, _)| squad.get(*id).is_some_and(|u| !u.has_acted()))
                .or_else(|| candidates.first());
            return chosen
                .map(|(_, actions)| {
                    actions
                        .iter()
                        .map(|a| Move::new(side, vec![a.clone()]))
                        .collect()
                })
                .unwrap_or_default();
        }

        let samples = candidates
            .iter()
            .map(|(_, actions)| actions.len())
            .max()
            .unwrap_or(0);
        let mut moves: Vec<Move> = Vec::with_capacity(samples);
        for _ in 0..samples {
            let actions = candidates
                .iter()
                .map(|(_, actions)| actions[rng.gen_range(0..actions.len())].clone())
                .collect();
            let mv = Move::new(side, actions);
            if !moves.contains(&mv) {
                moves.push(mv);
            }
        }
        moves
    }

    // -------------------------------------------------------------------------
    // Move application
    // -------------------------------------------------------------------------

    fn apply_action(&mut self, side: Side, action: &Action) {
        let Some(actor) = self.squad(side).get(action.unit) else {
            return;
        };
        let damage = actor.damage;

        if action.kind == ActionKind::Attack {
            if let Some(target) = action
                .target
                .and_then(|id| self.squad_mut(side.opponent()).get_mut(id))
            {
                target.inflict_damage(damage);
            }
        }

        if let Some(actor) = self.squad_mut(side).get_mut(action.unit) {
            match action.kind {
                ActionKind::Attack => actor.set_attack_time(action.completion),
                ActionKind::MoveForward | ActionKind::MoveBack => {
                    actor.position = action.destination;
                    actor.set_move_time(action.completion);
                }
            }
            actor.commit(action.clone());
        }
    }

    /// Applies every action of `mv` and advances the clock to the earliest
    /// completion among them. An empty move leaves the clock unchanged.
    pub fn apply_move(&mut self, mv: &Move) {
        for action in mv.actions() {
            self.apply_action(mv.side(), action);
        }
        if let Some(time) = mv.earliest_completion() {
            self.clock = time;
        }
    }

    /// Applies two moves committed at the same instant.
    ///
    /// The clock advances to the earliest completion over both moves.
    pub fn apply_simultaneous(&mut self, first: &Move, second: &Move) {
        for action in first.actions() {
            self.apply_action(first.side(), action);
        }
        for action in second.actions() {
            self.apply_action(second.side(), action);
        }
        let earliest = [first.earliest_completion(), second.earliest_completion()]
            .into_iter()
            .flatten()
            .reduce(f32::min);
        if let Some(time) = earliest {
            self.clock = time;
        }
    }

    // -------------------------------------------------------------------------
    // Evaluation
    // -------------------------------------------------------------------------

    /// Health lost by the min side minus health lost by the max side.
    ///
    /// A side with no living unit adds [`WIPE_OUT_PENALTY`] to its own tally.
    /// Positive scores favor the max side.
    #[must_use]
    pub fn evaluate(&self) -> f32 {
        Self::damage_taken(&self.min) - Self::damage_taken(&self.max)
    }

    fn damage_taken(squad: &Squad) -> f32 {
        let lost = squad.health_lost();
        if squad.has_living() {
            lost
        } else {
            lost + WIPE_OUT_PENALTY
        }
    }
}
