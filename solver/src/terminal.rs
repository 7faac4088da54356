//! Terminal value functions and the per-parameter belief cache.
//!
//! ```text
//! value_accuse = pc · win + (1 - pc) · (-lose)
//! value_pardon = pc · (-lose) + (1 - pc) · win
//! ```
//!
//! [`BeliefCache`] memoizes posterior and terminal values for one
//! [`GameParameters`]. It owns its parameters, so a cache can never be
//! consulted under a different prior or payoff: building a table for new
//! parameters means building a new cache.

use crate::likelihood::posterior_cheater;
use crate::types::{Action, GameParameters, PolicyEntry, TruncationMode};

/// Expected payoff of accusing a flipper who is a cheater with probability `pc`.
#[inline(always)]
pub fn accuse_value(pc: f64, params: &GameParameters) -> f64 {
    pc * params.win_amt() + (1.0 - pc) * (-params.lose_amt())
}

/// Expected payoff of pardoning a flipper who is a cheater with probability `pc`.
#[inline(always)]
pub fn pardon_value(pc: f64, params: &GameParameters) -> f64 {
    pc * (-params.lose_amt()) + (1.0 - pc) * params.win_amt()
}

/// Boundary decision: pardon unless accusing is strictly better.
#[inline(always)]
pub fn boundary_choice(accuse: f64, pardon: f64) -> PolicyEntry {
    if accuse > pardon {
        PolicyEntry::new(Action::Accuse, accuse)
    } else {
        PolicyEntry::new(Action::Pardon, pardon)
    }
}

/// Posterior and both terminal values of one state.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Beliefs {
    pub posterior: f64,
    pub accuse: f64,
    pub pardon: f64,
}

/// Memo of [`Beliefs`] over the states of one truncated lattice.
///
/// Rows are packed back to back using the mode's row lengths, so a
/// triangular lattice stores about half of what a square one does. States
/// outside the lattice are computed but not stored.
pub struct BeliefCache {
    params: GameParameters,
    /// `offsets[h]` is the slot of `(h, 0)`; `offsets[max_flips + 1]` is the size.
    offsets: Vec<usize>,
    memo: Vec<Option<Beliefs>>,
    misses: usize,
}

impl BeliefCache {
    pub fn new(params: GameParameters, max_flips: usize, mode: TruncationMode) -> Self {
        let mut offsets = Vec::with_capacity(max_flips + 2);
        let mut total = 0;
        offsets.push(total);
        for heads in 0..=max_flips {
            total += mode.row_len(max_flips, heads);
            offsets.push(total);
        }
        Self {
            params,
            offsets,
            memo: vec![None; total],
            misses: 0,
        }
    }

    /// Number of slots reserved for the lattice.
    pub fn capacity(&self) -> usize {
        self.memo.len()
    }

    #[inline(always)]
    fn slot(&self, heads: usize, tails: usize) -> Option<usize> {
        let start = *self.offsets.get(heads)?;
        let end = *self.offsets.get(heads + 1)?;
        (start + tails < end).then_some(start + tails)
    }

    pub fn params(&self) -> &GameParameters {
        &self.params
    }

    /// Posterior and terminal values at (heads, tails), computed on first use.
    pub fn beliefs(&mut self, heads: usize, tails: usize) -> Beliefs {
        let Some(idx) = self.slot(heads, tails) else {
            return self.compute(heads, tails);
        };
        if let Some(cached) = self.memo[idx] {
            return cached;
        }
        let fresh = self.compute(heads, tails);
        self.memo[idx] = Some(fresh);
        self.misses += 1;
        fresh
    }

    pub fn posterior(&mut self, heads: usize, tails: usize) -> f64 {
        self.beliefs(heads, tails).posterior
    }

    pub fn value_accuse(&mut self, heads: usize, tails: usize) -> f64 {
        self.beliefs(heads, tails).accuse
    }

    pub fn value_pardon(&mut self, heads: usize, tails: usize) -> f64 {
        self.beliefs(heads, tails).pardon
    }

    /// Accuse-vs-pardon decision used at truncation limits.
    pub fn boundary_entry(&mut self, heads: usize, tails: usize) -> PolicyEntry {
        let b = self.beliefs(heads, tails);
        boundary_choice(b.accuse, b.pardon)
    }

    /// Number of states computed and stored so far.
    pub fn len(&self) -> usize {
        self.misses
    }

    pub fn is_empty(&self) -> bool {
        self.misses == 0
    }

    fn compute(&self, heads: usize, tails: usize) -> Beliefs {
        let posterior = posterior_cheater(
            heads,
            tails,
            self.params.cheater_rate(),
            self.params.cheater_bias(),
        );
        Beliefs {
            posterior,
            accuse: accuse_value(posterior, &self.params),
            pardon: pardon_value(posterior, &self.params),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_even_odds_equal_payoffs_are_zero() {
        let p = GameParameters::new(0.5, 0.75, 20.0, 20.0).unwrap();
        assert_eq!(accuse_value(0.5, &p), 0.0);
        assert_eq!(pardon_value(0.5, &p), 0.0);
    }

    #[test]
    fn test_certain_beliefs() {
        let p = GameParameters::new(0.5, 0.75, 15.0, 30.0).unwrap();
        assert_eq!(accuse_value(1.0, &p), 15.0);
        assert_eq!(pardon_value(1.0, &p), -30.0);
        assert_eq!(accuse_value(0.0, &p), -30.0);
        assert_eq!(pardon_value(0.0, &p), 15.0);
    }

    #[test]
    fn test_boundary_tie_goes_to_pardon() {
        let e = boundary_choice(-7.5, -7.5);
        assert_eq!(e.action, Action::Pardon);
        assert_eq!(boundary_choice(1.0, 0.5).action, Action::Accuse);
    }

    #[test]
    fn test_cache_memoizes_in_lattice_only() {
        let p = GameParameters::new(0.5, 0.75, 15.0, 30.0).unwrap();
        let mut cache = BeliefCache::new(p, 3, TruncationMode::Square);
        assert!(cache.is_empty());
        let first = cache.beliefs(2, 1);
        let second = cache.beliefs(2, 1);
        assert_eq!(first, second);
        assert_eq!(cache.len(), 1);
        cache.beliefs(10, 10);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_triangular_cache_is_packed() {
        let p = GameParameters::new(0.5, 0.75, 15.0, 30.0).unwrap();
        let square = BeliefCache::new(p, 500, TruncationMode::Square);
        let mut tri = BeliefCache::new(p, 500, TruncationMode::Triangular);
        assert_eq!(square.capacity(), 501 * 501);
        assert_eq!(tri.capacity(), 501 * 502 / 2);

        // Last slot of each row, then the first state past the diagonal.
        tri.beliefs(0, 500);
        tri.beliefs(500, 0);
        tri.beliefs(250, 250);
        assert_eq!(tri.len(), 3);
        tri.beliefs(250, 251);
        tri.beliefs(501, 0);
        assert_eq!(tri.len(), 3);
        assert_eq!(tri.beliefs(3, 4), square_beliefs(&p, 3, 4));
    }

    fn square_beliefs(p: &GameParameters, heads: usize, tails: usize) -> Beliefs {
        BeliefCache::new(*p, 10, TruncationMode::Square).beliefs(heads, tails)
    }

    #[test]
    fn test_prior_at_origin() {
        let p = GameParameters::new(0.5, 0.75, 15.0, 30.0).unwrap();
        let mut cache = BeliefCache::new(p, 0, TruncationMode::Square);
        assert_eq!(cache.posterior(0, 0), 0.5);
        assert_eq!(cache.value_accuse(0, 0), -7.5);
        assert_eq!(cache.value_pardon(0, 0), -7.5);
        assert_eq!(cache.boundary_entry(0, 0).action, Action::Pardon);
    }
}
