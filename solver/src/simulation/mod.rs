//! Playing policies against simulated flippers.
//!
//! - [`strategy`]: the [`DecisionPolicy`] trait and fixed baselines
//! - [`flipper`]: fair and cheating flippers, fixed populations
//! - [`engine`]: single rounds and parallel batches

pub mod engine;
pub mod flipper;
pub mod strategy;

pub use engine::{play_round, simulate, RoundOutcome, SimulationResult};
pub use flipper::{Flipper, FlipperPopulation};
pub use strategy::{DecisionPolicy, Fixed};
