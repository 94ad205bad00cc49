//! Scenario, property and pruning tests.
//!
//! These exercise the search end to end rather than one module at a time:
//! - **Scenarios**: small battles with a known right answer
//! - **Pruning**: cutoffs never change the root score
//! - **Properties**: state invariants under arbitrary squads
//!
//! # Test Structure
//!
//! - `scenarios.rs`: decisions on hand-built battles
//! - `pruning.rs`: pruned versus exhaustive search
//! - `properties.rs`: proptest suites over generated states
//! - `helpers.rs`: unit factories and tracing setup

mod helpers;
mod scenarios;

pub use helpers::*;
