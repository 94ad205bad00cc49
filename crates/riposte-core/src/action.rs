//! Actions and moves.
//!
//! An [`Action`] is one unit's committed intent for a ply. A [`Move`] bundles
//! the actions one side commits in a single ply, at most one per unit.
//! Actions refer to units by [`UnitId`] rather than by reference, so the
//! same action can be applied to any clone of the state it was generated in.

use std::fmt;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::squad::Side;
use crate::unit::UnitId;

/// What an action does.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionKind {
    /// Hit a target within range.
    Attack,
    /// Close distance until the nearest enemy is in range.
    MoveForward,
    /// Step away from the nearest enemy.
    MoveBack,
}

impl ActionKind {
    /// Returns true for the two movement kinds.
    #[must_use]
    pub const fn is_movement(self) -> bool {
        matches!(self, Self::MoveForward | Self::MoveBack)
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Attack => write!(f, "Attack"),
            Self::MoveForward => write!(f, "MoveForward"),
            Self::MoveBack => write!(f, "MoveBack"),
        }
    }
}

/// One unit's committed intent.
///
/// # Invariants
///
/// - `target` is `Some` exactly for [`ActionKind::Attack`]
/// - `completion` is never earlier than the clock of the state that
///   generated the action
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    /// What the unit does.
    pub kind: ActionKind,
    /// The acting unit.
    pub unit: UnitId,
    /// Attack target.
    pub target: Option<UnitId>,
    /// Where the unit ends up (its own position for attacks).
    pub destination: Vec2,
    /// Distance travelled (zero for attacks).
    pub distance: f32,
    /// Logical time at which the action resolves.
    pub completion: f32,
}

impl Action {
    /// Creates an attack on `target` resolving at `completion`.
    #[must_use]
    pub fn attack(unit: UnitId, target: UnitId, position: Vec2, completion: f32) -> Self {
        Self {
            kind: ActionKind::Attack,
            unit,
            target: Some(target),
            destination: position,
            distance: 0.0,
            completion,
        }
    }

    /// Creates a movement of `kind` to `destination`.
    #[must_use]
    pub fn movement(
        kind: ActionKind,
        unit: UnitId,
        destination: Vec2,
        distance: f32,
        completion: f32,
    ) -> Self {
        debug_assert!(kind.is_movement());
        Self {
            kind,
            unit,
            target: None,
            destination,
            distance,
            completion,
        }
    }
}

/// The actions one side commits in one ply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Move {
    side: Side,
    actions: Vec<Action>,
}

impl Move {
    /// Creates a move for `side`.
    ///
    /// Actions after the first one for a given unit are dropped.
    #[must_use]
    pub fn new(side: Side, actions: Vec<Action>) -> Self {
        let mut unique: Vec<Action> = Vec::with_capacity(actions.len());
        for action in actions {
            if unique.iter().all(|a| a.unit != action.unit) {
                unique.push(action);
            }
        }
        Self {
            side,
            actions: unique,
        }
    }

    /// The side committing this move.
    #[must_use]
    pub const fn side(&self) -> Side {
        self.side
    }

    /// The committed actions in generation order.
    #[must_use]
    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    /// Returns true if the move commits no action.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// The action committed for `unit`, if any.
    #[must_use]
    pub fn action_for(&self, unit: UnitId) -> Option<&Action> {
        self.actions.iter().find(|a| a.unit == unit)
    }

    /// Returns true if any action is an attack.
    #[must_use]
    pub fn has_attack(&self) -> bool {
        self.actions.iter().any(|a| a.kind == ActionKind::Attack)
    }

    /// Earliest completion time among the actions.
    #[must_use]
    pub fn earliest_completion(&self) -> Option<f32> {
        self.actions.iter().map(|a| a.completion).reduce(f32::min)
    }
}
