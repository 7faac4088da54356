//! Evolutionary lookup-table learner.
//!
//! An alternative to the exact table: agents are small `(heads, tails)`
//! action tables trained by simulated play, then compared with the exact
//! policy via [`agreement`].

pub mod evolution;
pub mod lookup;

pub use evolution::{agreement, EpochStats, Evolution, EvolutionReport, LearnerConfig};
pub use lookup::LookupPolicy;
