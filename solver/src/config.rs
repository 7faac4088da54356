//! Solver and sweep configuration.
//!
//! Defaults come from [`crate::constants`]. Configurations can be read from a
//! JSON file; every field is optional there and falls back to its default.
//! Binaries layer command-line flags on top.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::error::{CoinflipError, Result};
use crate::types::{GameParameters, TruncationMode};

/// Lattice bound above which posterior stability has not been checked.
const STABLE_MAX_FLIPS: usize = 1000;

/// Everything needed to build one policy table except the payoffs.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    pub max_flips: usize,
    pub mode: TruncationMode,
    pub cheater_rate: f64,
    pub cheater_bias: f64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            max_flips: DEFAULT_MAX_FLIPS,
            mode: TruncationMode::Square,
            cheater_rate: DEFAULT_CHEATER_RATE,
            cheater_bias: DEFAULT_CHEATER_BIAS,
        }
    }
}

impl SolverConfig {
    /// Validated parameters for one (win, lose) payoff pair.
    pub fn game_parameters(&self, win_amt: f64, lose_amt: f64) -> Result<GameParameters> {
        GameParameters::new(self.cheater_rate, self.cheater_bias, win_amt, lose_amt)
    }

    pub fn validate(&self) -> Result<()> {
        self.game_parameters(0.0, 0.0)?;
        if self.max_flips > STABLE_MAX_FLIPS {
            log::warn!(
                "max_flips={} exceeds {}; posterior underflow handling has not been verified this far",
                self.max_flips,
                STABLE_MAX_FLIPS
            );
        }
        Ok(())
    }
}

/// Payoff grid swept by [`crate::sweep`].
///
/// Cells are `win ∈ 0..=max_win_amt` and `lose ∈ 0..=min(max_lose_amt, ratio·win)`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SweepConfig {
    pub solver: SolverConfig,
    pub max_win_amt: u32,
    pub max_lose_amt: u32,
    pub lose_to_win_ratio: u32,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            solver: SolverConfig::default(),
            max_win_amt: MAX_WIN_AMT,
            max_lose_amt: MAX_LOSE_AMT,
            lose_to_win_ratio: LOSE_TO_WIN_RATIO,
        }
    }
}

impl SweepConfig {
    /// Read a configuration from JSON. Missing fields take their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| CoinflipError::io(path, e))?;
        let config: Self = serde_json::from_str(&text).map_err(|e| CoinflipError::json(path, e))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.solver.validate()?;
        if self.lose_to_win_ratio == 0 {
            return Err(CoinflipError::InvalidConfig(
                "lose_to_win_ratio must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Largest lose amount swept for `win_amt`.
    pub fn lose_limit(&self, win_amt: u32) -> u32 {
        self.max_lose_amt
            .min(win_amt.saturating_mul(self.lose_to_win_ratio))
    }

    /// All (win, lose) cells in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        (0..=self.max_win_amt)
            .flat_map(move |win| (0..=self.lose_limit(win)).map(move |lose| (win, lose)))
    }

    pub fn cell_count(&self) -> usize {
        (0..=self.max_win_amt)
            .map(|win| self.lose_limit(win) as usize + 1)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let c = SweepConfig::default();
        assert_eq!(c.solver.max_flips, 500);
        assert_eq!(c.solver.mode, TruncationMode::Square);
        assert_eq!(c.solver.cheater_rate, 0.5);
        assert_eq!(c.solver.cheater_bias, 0.75);
        assert_eq!(c.max_win_amt, 50);
        assert_eq!(c.max_lose_amt, 150);
    }

    #[test]
    fn test_pruning() {
        let c = SweepConfig::default();
        assert_eq!(c.lose_limit(0), 0);
        assert_eq!(c.lose_limit(10), 30);
        assert_eq!(c.lose_limit(50), 150);
        assert!(c.cells().filter(|&(w, _)| w == 10).all(|(_, l)| l <= 30));
        // Σ (3w + 1) for w = 0..=50
        assert_eq!(c.cell_count(), 3876);
        assert_eq!(c.cells().count(), c.cell_count());
    }

    #[test]
    fn test_lose_cap_binds_before_ratio() {
        let c = SweepConfig {
            max_lose_amt: 20,
            ..SweepConfig::default()
        };
        assert_eq!(c.lose_limit(10), 20);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let c: SweepConfig =
            serde_json::from_str(r#"{"max_win_amt": 4, "solver": {"mode": "triangular"}}"#)
                .unwrap();
        assert_eq!(c.max_win_amt, 4);
        assert_eq!(c.solver.mode, TruncationMode::Triangular);
        assert_eq!(c.solver.max_flips, DEFAULT_MAX_FLIPS);
        assert_eq!(c.max_lose_amt, MAX_LOSE_AMT);
    }

    #[test]
    fn test_validate_rejects_bad_prior() {
        let c = SweepConfig {
            solver: SolverConfig {
                cheater_rate: 1.0,
                ..SolverConfig::default()
            },
            ..SweepConfig::default()
        };
        assert!(c.validate().is_err());
    }
}
