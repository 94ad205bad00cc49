//! Unit snapshots: the per-combatant records the search mutates.
//!
//! This module provides:
//! - [`UnitId`]: Stable identity token for a live game unit
//! - [`Combatant`]: Read-only view of a live unit supplied by the caller
//! - [`UnitSnapshot`]: Value-semantics copy of a combatant's fighting state
//!
//! Snapshots are plain values. Cloning a snapshot yields a fully independent
//! record that shares only the [`UnitId`], so search branches never observe
//! each other's mutations.
//!
//! # Example
//!
//! ```
//! use riposte_core::unit::{UnitId, UnitSnapshot};
//! use glam::Vec2;
//!
//! let marine = UnitSnapshot::new(UnitId::new(7), Vec2::new(0.0, 0.0))
//!     .with_health(45.0, 45.0)
//!     .with_damage(6.0)
//!     .with_range(5.0);
//!
//! assert!(marine.is_alive());
//! assert_eq!(marine.health_lost(), 0.0);
//! ```

use std::fmt;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::action::Action;

/// Stable identity token for a live game unit.
///
/// `UnitId` is a newtype wrapper around `u64`. It is the only piece of a
/// snapshot shared between search branches, and it is `Copy`.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UnitId(u64);

impl UnitId {
    /// Creates a new `UnitId` from a raw `u64` value.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw `u64` value of this identifier.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UnitId({})", self.0)
    }
}

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for UnitId {
    fn from(id: u64) -> Self {
        Self::new(id)
    }
}

impl From<UnitId> for u64 {
    fn from(id: UnitId) -> Self {
        id.0
    }
}

/// Read access to a live combatant.
///
/// The surrounding bot implements this for whatever handle it keeps on game
/// units. The search copies these values once, into a [`UnitSnapshot`], and
/// never touches the live unit again.
pub trait Combatant {
    /// Stable identity token.
    fn id(&self) -> UnitId;
    /// Current world position.
    fn position(&self) -> Vec2;
    /// Current health.
    fn health(&self) -> f32;
    /// Maximum health.
    fn max_health(&self) -> f32;
    /// Current shield points.
    fn shield(&self) -> f32;
    /// Damage dealt per hit.
    fn damage(&self) -> f32;
    /// Attack range.
    fn range(&self) -> f32;
    /// Movement speed in distance per time unit.
    fn speed(&self) -> f32;
    /// Time between two attacks.
    fn cooldown(&self) -> f32;
}

/// Combat-relevant state of one unit at one point of the search.
///
/// # Invariants
///
/// - `health <= max_health`
/// - `damage`, `range`, `speed` and `cooldown` are non-negative
/// - A dead unit proposes no actions and is never targeted
///
/// The builder methods clamp their inputs to keep these invariants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitSnapshot {
    id: UnitId,
    /// World position.
    pub position: Vec2,
    /// Current health.
    pub health: f32,
    /// Maximum health.
    pub max_health: f32,
    /// Shield points (only used to rank targets).
    pub shield: f32,
    /// Damage dealt per hit.
    pub damage: f32,
    /// Attack range.
    pub range: f32,
    /// Movement speed.
    pub speed: f32,
    /// Time between two attacks.
    pub cooldown: f32,
    attack_time: f32,
    move_time: f32,
    previous_action: Option<Action>,
    dead: bool,
    has_acted: bool,
}

impl UnitSnapshot {
    /// Creates a snapshot with 100 health, 10 damage, range 1, speed 1 and
    /// cooldown 1.
    #[must_use]
    pub fn new(id: UnitId, position: Vec2) -> Self {
        Self {
            id,
            position,
            health: 100.0,
            max_health: 100.0,
            shield: 0.0,
            damage: 10.0,
            range: 1.0,
            speed: 1.0,
            cooldown: 1.0,
            attack_time: 0.0,
            move_time: 0.0,
            previous_action: None,
            dead: false,
            has_acted: false,
        }
    }

    /// Copies the fighting state of a live combatant.
    #[must_use]
    pub fn from_combatant<C: Combatant + ?Sized>(unit: &C) -> Self {
        Self::new(unit.id(), unit.position())
            .with_health(unit.health(), unit.max_health())
            .with_shield(unit.shield())
            .with_damage(unit.damage())
            .with_range(unit.range())
            .with_speed(unit.speed())
            .with_cooldown(unit.cooldown())
    }

    /// Sets current and maximum health. Current health is clamped to
    /// `0..=max`; a unit created with no health is dead.
    #[must_use]
    pub fn with_health(mut self, health: f32, max_health: f32) -> Self {
        self.max_health = max_health.max(0.0);
        self.health = health.clamp(0.0, self.max_health);
        self.dead = self.health <= 0.0;
        self
    }

    /// Sets shield points.
    #[must_use]
    pub fn with_shield(mut self, shield: f32) -> Self {
        self.shield = shield.max(0.0);
        self
    }

    /// Sets damage per hit.
    #[must_use]
    pub fn with_damage(mut self, damage: f32) -> Self {
        self.damage = damage.max(0.0);
        self
    }

    /// Sets attack range.
    #[must_use]
    pub fn with_range(mut self, range: f32) -> Self {
        self.range = range.max(0.0);
        self
    }

    /// Sets movement speed.
    #[must_use]
    pub fn with_speed(mut self, speed: f32) -> Self {
        self.speed = speed.max(0.0);
        self
    }

    /// Sets the time between attacks.
    #[must_use]
    pub fn with_cooldown(mut self, cooldown: f32) -> Self {
        self.cooldown = cooldown.max(0.0);
        self
    }

    /// Marks the unit as already having acted, so single-agent move
    /// generation skips it.
    #[must_use]
    pub fn acted(mut self) -> Self {
        self.has_acted = true;
        self
    }

    /// Returns the identity token.
    #[must_use]
    pub const fn id(&self) -> UnitId {
        self.id
    }

    /// Returns true if the unit has been killed.
    #[must_use]
    pub const fn is_dead(&self) -> bool {
        self.dead
    }

    /// Returns true if the unit is still fighting.
    #[must_use]
    pub const fn is_alive(&self) -> bool {
        !self.dead
    }

    /// Returns true if the unit acted in the current decision round.
    #[must_use]
    pub const fn has_acted(&self) -> bool {
        self.has_acted
    }

    /// Time at which the last attack finishes cooling down.
    #[must_use]
    pub const fn attack_time(&self) -> f32 {
        self.attack_time
    }

    /// Time at which the last movement finishes.
    #[must_use]
    pub const fn move_time(&self) -> f32 {
        self.move_time
    }

    /// The most recently committed action, if any.
    #[must_use]
    pub fn previous_action(&self) -> Option<&Action> {
        self.previous_action.as_ref()
    }

    /// Time at which the unit's previous action completes (0 if it never acted).
    #[must_use]
    pub fn ready_time(&self) -> f32 {
        self.previous_action.as_ref().map_or(0.0, |a| a.completion)
    }

    /// Returns true if the unit has finished its previous action by `time`.
    #[must_use]
    pub fn is_ready(&self, time: f32) -> bool {
        self.ready_time() <= time
    }

    /// Returns true if the weapon is off cooldown at `time`.
    #[must_use]
    pub fn weapon_ready(&self, time: f32) -> bool {
        self.attack_time <= time
    }

    /// Euclidean distance to another unit.
    #[must_use]
    pub fn distance_to(&self, other: &Self) -> f32 {
        self.position.distance(other.position)
    }

    /// Returns true if `other` is within this unit's attack range.
    #[must_use]
    pub fn in_range(&self, other: &Self) -> bool {
        self.distance_to(other) <= self.range
    }

    /// Health removed since the snapshot was taken at full health.
    #[must_use]
    pub fn health_lost(&self) -> f32 {
        self.max_health - self.health
    }

    /// Removes health, marking the unit dead when it reaches zero.
    pub fn inflict_damage(&mut self, amount: f32) {
        self.health -= amount;
        if self.health <= 0.0 {
            self.health = 0.0;
            self.dead = true;
        }
    }

    pub(crate) fn commit(&mut self, action: Action) {
        self.previous_action = Some(action);
        self.has_acted = true;
    }

    pub(crate) fn set_attack_time(&mut self, time: f32) {
        self.attack_time = time;
    }

    pub(crate) fn set_move_time(&mut self, time: f32) {
        self.move_time = time;
    }
}

// Lets callers that already hold snapshots feed them to the search directly.
impl Combatant for UnitSnapshot {
    fn id(&self) -> UnitId {
        self.id
    }

    fn position(&self) -> Vec2 {
        self.position
    }

    fn health(&self) -> f32 {
        self.health
    }

    fn max_health(&self) -> f32 {
        self.max_health
    }

    fn shield(&self) -> f32 {
        self.shield
    }

    fn damage(&self) -> f32 {
        self.damage
    }

    fn range(&self) -> f32 {
        self.range
    }

    fn speed(&self) -> f32 {
        self.speed
    }

    fn cooldown(&self) -> f32 {
        self.cooldown
    }
}
