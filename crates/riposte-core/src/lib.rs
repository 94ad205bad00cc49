//! # Riposte Core
//!
//! Duration-aware alpha-beta search for small-squad combat decisions.
//!
//! Given a snapshot of two opposing squads, the search simulates a few plies
//! of attack, advance and retreat decisions and returns the best immediate
//! Move for the controlled squad. Actions take time: a unit that just fired
//! waits out its cooldown, and a unit that moved waits until it arrives. Turn
//! order follows from those durations instead of strict alternation.
//!
//! ## Architecture
//!
//! - **Units and squads**: [`UnitSnapshot`] copies of live units, grouped in
//!   [`Squad`]s
//! - **Actions and moves**: per-unit [`Action`]s bundled into a side's [`Move`]
//! - **State**: [`CombatState`] answers who acts next, what they may do and
//!   how good a position is
//! - **Search**: [`AlphaBetaSearch`] walks the tree under a depth limit and a
//!   wall-clock budget
//! - **Planning**: [`Planner`] adds iterative deepening and a last-known-good
//!   fallback for callers that must act every frame
//!
//! ## Usage
//!
//! ```rust
//! use riposte_core::{AlphaBetaSearch, SearchConfig, UnitId, UnitSnapshot};
//! use glam::Vec2;
//! use std::time::Duration;
//!
//! let ours = [UnitSnapshot::new(UnitId::new(1), Vec2::ZERO).with_range(5.0)];
//! let theirs = [UnitSnapshot::new(UnitId::new(2), Vec2::new(4.0, 0.0)).with_range(5.0)];
//!
//! let mut search = AlphaBetaSearch::new(
//!     SearchConfig::default().with_time_budget(Duration::from_secs(1)),
//! );
//! match search.search(&ours, &theirs) {
//!     Ok(value) => println!("score {}: {:?}", value.score, value.best_move),
//!     Err(err) => println!("no decision: {err}"),
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod action;
pub mod config;
pub mod error;
pub mod planner;
pub mod rules;
pub mod search;
pub mod squad;
pub mod state;
pub mod unit;

pub use action::{Action, ActionKind, Move};
pub use config::{SearchConfig, SearchPolicy};
pub use error::{Result, SearchError};
pub use planner::{Decision, Planner};
pub use rules::{CombatRules, StandardRules};
pub use search::{AlphaBetaSearch, SearchStats, SearchValue};
pub use squad::{Side, Squad};
pub use state::CombatState;
pub use unit::{Combatant, UnitId, UnitSnapshot};

#[cfg(test)]
mod tests;
