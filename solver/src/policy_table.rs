//! Backward induction over the (heads, tails) lattice.
//!
//! Rows are processed by strictly decreasing heads count `i = N..=0`, and each
//! row by strictly decreasing tails count. A state (i, j) reads only
//! (i+1, j) (one more head) and (i, j+1) (one more tail), both of which are
//! finalized earlier in that order.
//!
//! ```text
//! wait(i,j) = (1-pc)·[0.5·V(i+1,j) + 0.5·V(i,j+1)]
//!           +    pc ·[  b·V(i+1,j) + (1-b)·V(i,j+1)] − cost
//! ```
//!
//! The last cell of every row is a truncation limit and only chooses between
//! ACCUSE and PARDON. In square mode the whole final row (i = N) has no
//! successor row and is all boundary; in triangular mode that row is a single
//! cell.

use std::time::Instant;

use crate::constants::{FAIR_HEADS_PROBABILITY, OBSERVATION_COST};
use crate::terminal::BeliefCache;
use crate::types::{Action, GameParameters, PolicyEntry, TruncationMode};

/// Decision at an interior state, with ties resolved PARDON > ACCUSE > WAIT.
///
/// The comparator order is load-bearing: a plain argmax resolves exact ties
/// differently.
#[inline(always)]
pub fn interior_choice(accuse: f64, pardon: f64, wait: f64) -> PolicyEntry {
    if pardon >= accuse && pardon >= wait {
        PolicyEntry::new(Action::Pardon, pardon)
    } else if accuse > pardon && accuse >= wait {
        PolicyEntry::new(Action::Accuse, accuse)
    } else {
        PolicyEntry::new(Action::Wait, wait)
    }
}

/// Expected value of observing one more flip from (i, j).
#[inline(always)]
pub fn wait_value(posterior: f64, cheater_bias: f64, heads_next: f64, tails_next: f64) -> f64 {
    let fair = FAIR_HEADS_PROBABILITY * heads_next + (1.0 - FAIR_HEADS_PROBABILITY) * tails_next;
    let cheater = cheater_bias * heads_next + (1.0 - cheater_bias) * tails_next;
    (1.0 - posterior) * fair + posterior * cheater - OBSERVATION_COST
}

/// Per-action cell counts of a table.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ActionCounts {
    pub wait: usize,
    pub pardon: usize,
    pub accuse: usize,
}

impl ActionCounts {
    pub fn total(&self) -> usize {
        self.wait + self.pardon + self.accuse
    }
}

/// Optimal (action, expected value) for every state of a bounded lattice.
///
/// `rows[h][t]` is state (h heads, t tails). Row lengths follow
/// [`TruncationMode::row_len`] and never change after construction.
#[derive(Clone, Debug)]
pub struct PolicyTable {
    mode: TruncationMode,
    max_flips: usize,
    params: GameParameters,
    rows: Vec<Vec<PolicyEntry>>,
}

impl PolicyTable {
    /// Build the optimal table for `params`.
    ///
    /// A fresh [`BeliefCache`] is created for the call and dropped with it, so
    /// no memoized value can leak between parameter sets.
    pub fn build(max_flips: usize, mode: TruncationMode, params: &GameParameters) -> Self {
        let start = Instant::now();
        let mut cache = BeliefCache::new(*params, max_flips, mode);
        let rows = fill_rows(max_flips, mode, &mut cache);
        let table = Self {
            mode,
            max_flips,
            params: *params,
            rows,
        };
        log::debug!(
            "built {} table N={} ({} states, {} beliefs) in {:.2} ms",
            mode,
            max_flips,
            table.len(),
            cache.len(),
            start.elapsed().as_secs_f64() * 1000.0
        );
        table
    }

    #[inline(always)]
    pub fn mode(&self) -> TruncationMode {
        self.mode
    }

    #[inline(always)]
    pub fn max_flips(&self) -> usize {
        self.max_flips
    }

    pub fn params(&self) -> &GameParameters {
        &self.params
    }

    /// Entry for state (heads, tails), if it lies inside the lattice.
    #[inline]
    pub fn entry(&self, heads: usize, tails: usize) -> Option<&PolicyEntry> {
        self.rows.get(heads)?.get(tails)
    }

    /// The pre-observation game value: state (0, 0).
    pub fn root(&self) -> PolicyEntry {
        self.rows[0][0]
    }

    pub fn row(&self, heads: usize) -> &[PolicyEntry] {
        &self.rows[heads]
    }

    pub fn rows(&self) -> &[Vec<PolicyEntry>] {
        &self.rows
    }

    pub fn row_len(&self, heads: usize) -> usize {
        self.mode.row_len(self.max_flips, heads)
    }

    /// Whether (heads, tails) is a truncation limit, where WAIT is not allowed.
    pub fn is_boundary(&self, heads: usize, tails: usize) -> bool {
        match self.mode {
            TruncationMode::Triangular => heads + tails == self.max_flips,
            TruncationMode::Square => heads == self.max_flips || tails == self.max_flips,
        }
    }

    /// Total number of states.
    pub fn len(&self) -> usize {
        self.rows.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn action_counts(&self) -> ActionCounts {
        let mut counts = ActionCounts::default();
        for entry in self.rows.iter().flatten() {
            match entry.action {
                Action::Wait => counts.wait += 1,
                Action::Pardon => counts.pardon += 1,
                Action::Accuse => counts.accuse += 1,
            }
        }
        counts
    }

    /// Entry at the nearest in-lattice state: counts are clamped onto the boundary.
    pub fn saturating_entry(&self, heads: usize, tails: usize) -> PolicyEntry {
        let h = heads.min(self.max_flips);
        let t = tails.min(self.row_len(h) - 1);
        self.rows[h][t]
    }
}

/// Shorthand for [`PolicyTable::build`].
pub fn build_policy_table(
    max_flips: usize,
    mode: TruncationMode,
    params: &GameParameters,
) -> PolicyTable {
    PolicyTable::build(max_flips, mode, params)
}

fn fill_rows(
    max_flips: usize,
    mode: TruncationMode,
    cache: &mut BeliefCache,
) -> Vec<Vec<PolicyEntry>> {
    let bias = cache.params().cheater_bias();
    // Built from the last row up, then reversed into heads order.
    let mut built: Vec<Vec<PolicyEntry>> = Vec::with_capacity(max_flips + 1);

    for i in (0..=max_flips).rev() {
        let len = mode.row_len(max_flips, i);
        let last = len - 1;
        let mut row = vec![PolicyEntry::new(Action::Pardon, 0.0); len];

        row[last] = cache.boundary_entry(i, last);

        match built.last() {
            Some(next_row) => {
                for j in (0..last).rev() {
                    let b = cache.beliefs(i, j);
                    let wait = wait_value(
                        b.posterior,
                        bias,
                        next_row[j].expected_value,
                        row[j + 1].expected_value,
                    );
                    row[j] = interior_choice(b.accuse, b.pardon, wait);
                }
            }
            None => {
                // i == N: in square mode the row has no successors at all.
                for j in 0..last {
                    row[j] = cache.boundary_entry(i, j);
                }
            }
        }

        built.push(row);
    }

    built.reverse();
    built
}
