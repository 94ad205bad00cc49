//! Behavioral predicates consulted during move generation.
//!
//! The search decides *which* action a unit should take; whether an action
//! is *permitted* depends on game-side state the snapshot does not carry
//! (orders in flight, engine cooldown quirks, leash ranges). The surrounding
//! bot supplies those answers through [`CombatRules`].
//!
//! [`StandardRules`] covers the common case from snapshot data alone.

use crate::unit::UnitSnapshot;

/// Predicates gating candidate actions.
///
/// Implementations must be pure: the same arguments must always produce the
/// same answer, or the search becomes non-deterministic.
///
/// # Example
///
/// ```
/// use riposte_core::rules::CombatRules;
/// use riposte_core::unit::UnitSnapshot;
///
/// /// Holds position: never advances, never retreats.
/// struct HoldGround;
///
/// impl CombatRules for HoldGround {
///     fn can_attack(&self, unit: &UnitSnapshot, time: f32) -> bool {
///         unit.weapon_ready(time)
///     }
///
///     fn can_move_forward(&self, _: &UnitSnapshot, _: f32, _: &[UnitSnapshot]) -> bool {
///         false
///     }
///
///     fn should_move_back(&self, _: &UnitSnapshot, _: f32, _: &[UnitSnapshot]) -> bool {
///         false
///     }
/// }
/// ```
pub trait CombatRules {
    /// Can `unit` start an attack at `time`?
    fn can_attack(&self, unit: &UnitSnapshot, time: f32) -> bool;

    /// Can `unit` advance toward `enemies` at `time`?
    fn can_move_forward(&self, unit: &UnitSnapshot, time: f32, enemies: &[UnitSnapshot]) -> bool;

    /// Should `unit` retreat from `enemies` at `time`?
    fn should_move_back(&self, unit: &UnitSnapshot, time: f32, enemies: &[UnitSnapshot]) -> bool;
}

/// Rules derived from snapshot data alone.
///
/// - Attack whenever the weapon is off cooldown
/// - Advance when the unit can move and no living enemy is in range
/// - Retreat (kite) when the unit can move and a living enemy with a shorter
///   range than its own has it within reach
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardRules;

impl CombatRules for StandardRules {
    fn can_attack(&self, unit: &UnitSnapshot, time: f32) -> bool {
        unit.is_alive() && unit.weapon_ready(time)
    }

    fn can_move_forward(&self, unit: &UnitSnapshot, _time: f32, enemies: &[UnitSnapshot]) -> bool {
        unit.is_alive()
            && unit.speed > 0.0
            && !enemies.iter().any(|e| e.is_alive() && unit.in_range(e))
    }

    fn should_move_back(&self, unit: &UnitSnapshot, _time: f32, enemies: &[UnitSnapshot]) -> bool {
        unit.is_alive()
            && unit.speed > 0.0
            && enemies
                .iter()
                .any(|e| e.is_alive() && e.range < unit.range && e.in_range(unit))
    }
}
