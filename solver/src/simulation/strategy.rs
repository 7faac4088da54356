//! The decision-surface abstraction shared by the exact table and the learner.

use crate::policy_table::PolicyTable;
use crate::types::Action;

/// Maps an observed (heads, tails) count to a decision.
pub trait DecisionPolicy: Send + Sync {
    fn name(&self) -> &str;
    fn decide(&self, heads: usize, tails: usize) -> Action;
}

impl DecisionPolicy for PolicyTable {
    fn name(&self) -> &str {
        "exact"
    }

    /// Counts outside the lattice are clamped onto its boundary, where the
    /// table never waits.
    fn decide(&self, heads: usize, tails: usize) -> Action {
        self.saturating_entry(heads, tails).action
    }
}

/// Always the same action. Useful as a baseline: `Fixed(Action::Pardon)` is
/// the "never look, always pardon" observer.
#[derive(Clone, Copy, Debug)]
pub struct Fixed(pub Action);

impl DecisionPolicy for Fixed {
    fn name(&self) -> &str {
        match self.0 {
            Action::Wait => "always-wait",
            Action::Pardon => "always-pardon",
            Action::Accuse => "always-accuse",
        }
    }

    fn decide(&self, _heads: usize, _tails: usize) -> Action {
        self.0
    }
}
