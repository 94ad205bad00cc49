//! Test helper functions for building squads and searches.

use std::time::Duration;

use glam::Vec2;

use crate::config::{SearchConfig, SearchPolicy};
use crate::squad::Squad;
use crate::state::CombatState;
use crate::unit::{UnitId, UnitSnapshot};

// =============================================================================
// Tracing
// =============================================================================

/// Routes `tracing` output through the test harness.
///
/// Safe to call from every test; only the first call installs a subscriber.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

// =============================================================================
// Unit Factories
// =============================================================================

/// A unit with default stats at `(x, y)`.
pub fn unit_at(id: u64, x: f32, y: f32) -> UnitSnapshot {
    UnitSnapshot::new(UnitId::new(id), Vec2::new(x, y))
}

/// A slow-firing ranged unit: range 5, damage 10, cooldown 1.5.
pub fn marine(id: u64, x: f32, y: f32) -> UnitSnapshot {
    unit_at(id, x, y)
        .with_health(45.0, 45.0)
        .with_range(5.0)
        .with_cooldown(1.5)
        .with_speed(2.25)
}

/// A fast melee unit: range 1, damage 5, cooldown 0.6.
pub fn zealot(id: u64, x: f32, y: f32) -> UnitSnapshot {
    unit_at(id, x, y)
        .with_health(100.0, 100.0)
        .with_damage(5.0)
        .with_range(1.0)
        .with_cooldown(0.6)
        .with_speed(2.75)
}

/// A state at clock 0 with `ours` as the max side.
pub fn battle(ours: Vec<UnitSnapshot>, theirs: Vec<UnitSnapshot>) -> CombatState {
    CombatState::new(Squad::new(theirs), Squad::new(ours), 0.0)
}

// =============================================================================
// Configurations
// =============================================================================

/// A configuration with a budget no test will exhaust.
pub fn generous(depth: usize, policy: SearchPolicy) -> SearchConfig {
    SearchConfig::default()
        .with_depth_limit(depth)
        .with_time_budget(Duration::from_secs(30))
        .with_policy(policy)
}
