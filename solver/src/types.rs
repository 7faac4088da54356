//! Core data structures: game parameters, actions, and policy entries.
//!
//! [`GameParameters`] is validated once at construction and then treated as
//! immutable for the lifetime of one evaluated table. Everything derived from
//! it (posterior and terminal-value caches, the policy table) is scoped to it.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{CoinflipError, Result};

/// Prior, cheater bias and payoffs for one evaluation of the game.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GameParameters {
    cheater_rate: f64,
    cheater_bias: f64,
    win_amt: f64,
    lose_amt: f64,
}

impl GameParameters {
    /// Validate and build a parameter set.
    ///
    /// `cheater_rate` and `cheater_bias` must lie in the open interval (0, 1);
    /// payoffs must be finite and non-negative.
    pub fn new(cheater_rate: f64, cheater_bias: f64, win_amt: f64, lose_amt: f64) -> Result<Self> {
        check_open_unit("cheater_rate", cheater_rate)?;
        check_open_unit("cheater_bias", cheater_bias)?;
        check_payoff("win_amt", win_amt)?;
        check_payoff("lose_amt", lose_amt)?;
        Ok(Self {
            cheater_rate,
            cheater_bias,
            win_amt,
            lose_amt,
        })
    }

    /// Same prior and bias, different payoffs. Used by the sweep driver.
    pub fn with_payoffs(&self, win_amt: f64, lose_amt: f64) -> Result<Self> {
        Self::new(self.cheater_rate, self.cheater_bias, win_amt, lose_amt)
    }

    #[inline(always)]
    pub fn cheater_rate(&self) -> f64 {
        self.cheater_rate
    }

    #[inline(always)]
    pub fn cheater_bias(&self) -> f64 {
        self.cheater_bias
    }

    #[inline(always)]
    pub fn win_amt(&self) -> f64 {
        self.win_amt
    }

    #[inline(always)]
    pub fn lose_amt(&self) -> f64 {
        self.lose_amt
    }
}

fn check_open_unit(name: &'static str, value: f64) -> Result<()> {
    if value > 0.0 && value < 1.0 {
        Ok(())
    } else {
        Err(CoinflipError::InvalidParameter {
            name,
            value,
            reason: "must lie strictly between 0 and 1",
        })
    }
}

fn check_payoff(name: &'static str, value: f64) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(CoinflipError::InvalidParameter {
            name,
            value,
            reason: "must be finite and non-negative",
        })
    }
}

/// Observer decision at a lattice state.
///
/// The discriminants match the learner's byte encoding (0 WAIT, 1 PARDON, 2 ACCUSE).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Action {
    Wait = 0,
    Pardon = 1,
    Accuse = 2,
}

impl Action {
    pub const ALL: [Action; 3] = [Action::Wait, Action::Pardon, Action::Accuse];

    /// Single-letter label used in the persisted sweep artifact.
    pub fn label(self) -> &'static str {
        match self {
            Action::Wait => "w",
            Action::Pardon => "p",
            Action::Accuse => "a",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "w" => Some(Action::Wait),
            "p" => Some(Action::Pardon),
            "a" => Some(Action::Accuse),
            _ => None,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Action::Wait => "WAIT",
            Action::Pardon => "PARDON",
            Action::Accuse => "ACCUSE",
        };
        f.write_str(name)
    }
}

/// Decision and expected payoff of one lattice state.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PolicyEntry {
    pub action: Action,
    pub expected_value: f64,
}

impl PolicyEntry {
    #[inline(always)]
    pub fn new(action: Action, expected_value: f64) -> Self {
        Self {
            action,
            expected_value,
        }
    }
}

/// How the (heads, tails) lattice is bounded.
///
/// - `Triangular`: fixed total-flip budget, `heads + tails <= N`.
/// - `Square`: independent caps, `heads <= N` and `tails <= N`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TruncationMode {
    Triangular,
    #[default]
    Square,
}

impl TruncationMode {
    /// Number of tails columns in heads row `heads` for bound `max_flips`.
    #[inline(always)]
    pub fn row_len(self, max_flips: usize, heads: usize) -> usize {
        match self {
            TruncationMode::Triangular => max_flips - heads + 1,
            TruncationMode::Square => max_flips + 1,
        }
    }
}

impl FromStr for TruncationMode {
    type Err = CoinflipError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "sq" | "square" => Ok(TruncationMode::Square),
            "tri" | "triangular" => Ok(TruncationMode::Triangular),
            _ => Err(CoinflipError::UnknownMode(s.to_string())),
        }
    }
}

impl fmt::Display for TruncationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TruncationMode::Triangular => f.write_str("triangular"),
            TruncationMode::Square => f.write_str("square"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_rate_outside_open_interval() {
        for rate in [0.0, 1.0, -0.1, 1.5, f64::NAN] {
            assert!(GameParameters::new(rate, 0.75, 15.0, 30.0).is_err(), "rate={rate}");
        }
    }

    #[test]
    fn test_rejects_bias_outside_open_interval() {
        for bias in [0.0, 1.0, 2.0] {
            assert!(GameParameters::new(0.5, bias, 15.0, 30.0).is_err(), "bias={bias}");
        }
    }

    #[test]
    fn test_rejects_negative_payoffs() {
        assert!(GameParameters::new(0.5, 0.75, -1.0, 30.0).is_err());
        assert!(GameParameters::new(0.5, 0.75, 15.0, f64::INFINITY).is_err());
    }

    #[test]
    fn test_with_payoffs_keeps_prior() {
        let p = GameParameters::new(0.3, 0.9, 15.0, 30.0).unwrap();
        let q = p.with_payoffs(1.0, 2.0).unwrap();
        assert_eq!(q.cheater_rate(), 0.3);
        assert_eq!(q.cheater_bias(), 0.9);
        assert_eq!(q.win_amt(), 1.0);
        assert_eq!(q.lose_amt(), 2.0);
    }

    #[test]
    fn test_action_labels() {
        for action in Action::ALL {
            assert_eq!(Action::from_label(action.label()), Some(action));
            assert_eq!(Action::ALL[action as usize], action);
        }
        assert_eq!(Action::from_label("x"), None);
    }

    #[test]
    fn test_mode_parsing() {
        assert_eq!("sq".parse::<TruncationMode>().unwrap(), TruncationMode::Square);
        assert_eq!("Triangular".parse::<TruncationMode>().unwrap(), TruncationMode::Triangular);
        assert!("hex".parse::<TruncationMode>().is_err());
    }

    #[test]
    fn test_row_len() {
        assert_eq!(TruncationMode::Triangular.row_len(5, 0), 6);
        assert_eq!(TruncationMode::Triangular.row_len(5, 5), 1);
        assert_eq!(TruncationMode::Square.row_len(5, 5), 6);
    }
}
