//! Payoff sweep: rebuild the policy table for every (win, lose) cell and keep
//! its root entry.
//!
//! Every cell builds its own [`PolicyTable`], which owns a fresh belief cache
//! for exactly that cell's parameters. Cells share nothing mutable, so the
//! parallel driver gives the same grid as the sequential one.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::{SolverConfig, SweepConfig};
use crate::error::Result;
use crate::policy_table::PolicyTable;
use crate::types::PolicyEntry;

/// Root entries indexed by `[win_amt][lose_amt]`. Row lengths vary with pruning.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SweepResult {
    rows: Vec<Vec<PolicyEntry>>,
}

impl SweepResult {
    pub fn from_rows(rows: Vec<Vec<PolicyEntry>>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[Vec<PolicyEntry>] {
        &self.rows
    }

    pub fn row(&self, win_amt: u32) -> Option<&[PolicyEntry]> {
        self.rows.get(win_amt as usize).map(Vec::as_slice)
    }

    pub fn get(&self, win_amt: u32, lose_amt: u32) -> Option<&PolicyEntry> {
        self.row(win_amt)?.get(lose_amt as usize)
    }

    /// Number of win-amount rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn cell_count(&self) -> usize {
        self.rows.iter().map(Vec::len).sum()
    }
}

/// Root entry of the table for one payoff cell.
pub fn evaluate_cell(solver: &SolverConfig, win_amt: u32, lose_amt: u32) -> Result<PolicyEntry> {
    let params = solver.game_parameters(win_amt as f64, lose_amt as f64)?;
    let root = PolicyTable::build(solver.max_flips, solver.mode, &params).root();
    log::debug!(
        "win={:>3} lose={:>3} -> ({}, {:.6})",
        win_amt,
        lose_amt,
        root.action.label(),
        root.expected_value
    );
    Ok(root)
}

/// Sweep all cells of `config` in parallel.
pub fn run_sweep(config: &SweepConfig) -> Result<SweepResult> {
    config.validate()?;
    let cells: Vec<(u32, u32)> = config.cells().collect();
    let total = cells.len();
    let report_every = (total / 20).max(1);
    let done = AtomicUsize::new(0);
    let start = Instant::now();

    log::info!(
        "sweeping {} cells (N={}, {}, rate={}, bias={})",
        total,
        config.solver.max_flips,
        config.solver.mode,
        config.solver.cheater_rate,
        config.solver.cheater_bias
    );

    let roots: Vec<PolicyEntry> = cells
        .par_iter()
        .map(|&(win, lose)| -> Result<PolicyEntry> {
            let root = evaluate_cell(&config.solver, win, lose)?;
            let finished = done.fetch_add(1, Ordering::Relaxed) + 1;
            if finished % report_every == 0 || finished == total {
                log::info!(
                    "{:>5}/{} cells ({:.0}%) | {:.1}s",
                    finished,
                    total,
                    finished as f64 / total as f64 * 100.0,
                    start.elapsed().as_secs_f64()
                );
            }
            Ok(root)
        })
        .collect::<Result<_>>()?;

    let result = group_rows(config, roots);
    log::info!(
        "sweep complete: {} cells in {:.2}s",
        result.cell_count(),
        start.elapsed().as_secs_f64()
    );
    Ok(result)
}

/// Sweep all cells of `config` on the calling thread.
pub fn run_sweep_sequential(config: &SweepConfig) -> Result<SweepResult> {
    config.validate()?;
    let roots = config
        .cells()
        .map(|(win, lose)| evaluate_cell(&config.solver, win, lose))
        .collect::<Result<Vec<_>>>()?;
    Ok(group_rows(config, roots))
}

/// Split row-major roots back into one row per win amount.
fn group_rows(config: &SweepConfig, roots: Vec<PolicyEntry>) -> SweepResult {
    let mut roots = roots.into_iter();
    let rows: Vec<Vec<PolicyEntry>> = (0..=config.max_win_amt)
        .map(|win| roots.by_ref().take(config.lose_limit(win) as usize + 1).collect())
        .collect();
    SweepResult::from_rows(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Action, TruncationMode};

    fn small_config() -> SweepConfig {
        SweepConfig {
            solver: SolverConfig {
                max_flips: 6,
                ..SolverConfig::default()
            },
            max_win_amt: 6,
            max_lose_amt: 15,
            ..SweepConfig::default()
        }
    }

    #[test]
    fn test_shape_follows_pruning() {
        let config = small_config();
        let result = run_sweep_sequential(&config).unwrap();
        assert_eq!(result.len(), 7);
        for win in 0..=6u32 {
            assert_eq!(
                result.row(win).unwrap().len() as u32,
                config.lose_limit(win) + 1,
                "win={win}"
            );
        }
        assert_eq!(result.cell_count(), config.cell_count());
    }

    #[test]
    fn test_zero_payoffs_pardon_at_zero() {
        let result = run_sweep_sequential(&small_config()).unwrap();
        let root = result.get(0, 0).unwrap();
        assert_eq!(root.action, Action::Pardon);
        assert_eq!(root.expected_value, 0.0);
    }

    #[test]
    fn test_cells_match_direct_build() {
        let config = small_config();
        let result = run_sweep_sequential(&config).unwrap();
        let params = config.solver.game_parameters(5.0, 12.0).unwrap();
        let direct = PolicyTable::build(6, TruncationMode::Square, &params).root();
        assert_eq!(*result.get(5, 12).unwrap(), direct);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let config = small_config();
        assert_eq!(
            run_sweep(&config).unwrap(),
            run_sweep_sequential(&config).unwrap()
        );
    }
}
