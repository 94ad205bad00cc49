//! Squads and sides.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::unit::{UnitId, UnitSnapshot};

/// One of the two opposing sides.
///
/// The controlled squad is always the maximizing side; positive scores
/// favor it.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    /// The opponent, minimizing the score.
    Min,
    /// The controlled squad, maximizing the score.
    Max,
}

impl Side {
    /// Returns the opposing side.
    #[must_use]
    pub const fn opponent(self) -> Self {
        match self {
            Self::Min => Self::Max,
            Self::Max => Self::Min,
        }
    }

    /// Returns true for [`Side::Max`].
    #[must_use]
    pub const fn is_max(self) -> bool {
        matches!(self, Self::Max)
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Min => write!(f, "Min"),
            Self::Max => write!(f, "Max"),
        }
    }
}

/// Ordered collection of unit snapshots belonging to one side.
///
/// # Invariants
///
/// - No two snapshots share a [`UnitId`]
/// - Order is insertion order; it only matters for deterministic iteration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Squad {
    units: Vec<UnitSnapshot>,
    cloned: bool,
}

impl Squad {
    /// Creates a fresh squad from caller-provided snapshots.
    ///
    /// Later snapshots repeating an earlier identity are dropped.
    #[must_use]
    pub fn new(units: Vec<UnitSnapshot>) -> Self {
        let mut unique: Vec<UnitSnapshot> = Vec::with_capacity(units.len());
        for unit in units {
            if unique.iter().any(|u| u.id() == unit.id()) {
                tracing::warn!(unit = %unit.id(), "duplicate unit identity in squad, dropping");
                continue;
            }
            unique.push(unit);
        }
        Self {
            units: unique,
            cloned: false,
        }
    }

    /// Returns a deep copy flagged as cloned.
    #[must_use]
    pub fn deep_clone(&self) -> Self {
        Self {
            units: self.units.clone(),
            cloned: true,
        }
    }

    /// Returns true if this squad was produced by cloning another one.
    #[must_use]
    pub const fn is_cloned(&self) -> bool {
        self.cloned
    }

    /// All snapshots in insertion order, dead ones included.
    #[must_use]
    pub fn units(&self) -> &[UnitSnapshot] {
        &self.units
    }

    /// Iterates over the living snapshots.
    pub fn living(&self) -> impl Iterator<Item = &UnitSnapshot> + '_ {
        self.units.iter().filter(|u| u.is_alive())
    }

    /// Returns true if at least one unit is alive.
    #[must_use]
    pub fn has_living(&self) -> bool {
        self.units.iter().any(UnitSnapshot::is_alive)
    }

    /// Looks up a snapshot by identity.
    #[must_use]
    pub fn get(&self, id: UnitId) -> Option<&UnitSnapshot> {
        self.units.iter().find(|u| u.id() == id)
    }

    /// Looks up a mutable snapshot by identity.
    #[must_use]
    pub fn get_mut(&mut self, id: UnitId) -> Option<&mut UnitSnapshot> {
        self.units.iter_mut().find(|u| u.id() == id)
    }

    /// Number of snapshots, dead ones included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.units.len()
    }

    /// Returns true if the squad holds no snapshots at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Sum of health lost over every snapshot.
    #[must_use]
    pub fn health_lost(&self) -> f32 {
        self.units.iter().map(UnitSnapshot::health_lost).sum()
    }
}

impl FromIterator<UnitSnapshot> for Squad {
    fn from_iter<I: IntoIterator<Item = UnitSnapshot>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
