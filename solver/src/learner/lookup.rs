//! Fixed-size lookup-table policy with saturating indices.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{CoinflipError, Result};
use crate::simulation::strategy::DecisionPolicy;
use crate::types::Action;

/// A `size × size` action table indexed by `[heads][tails]`.
///
/// Counts past the table edge read the edge cell. An edge cell that says
/// WAIT is turned into a verdict: PARDON when tails overflowed, otherwise
/// ACCUSE when heads overflowed. Cell `(0, 0)` is always WAIT.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupPolicy {
    size: usize,
    cells: Vec<Action>,
}

impl LookupPolicy {
    /// A table that waits everywhere; only the saturation rule ends a round.
    pub fn waiting(size: usize) -> Self {
        assert!(size > 0, "lookup table size must be positive");
        Self {
            size,
            cells: vec![Action::Wait; size * size],
        }
    }

    /// Uniformly random cells.
    pub fn random<R: Rng + ?Sized>(size: usize, rng: &mut R) -> Self {
        let mut policy = Self::waiting(size);
        for cell in policy.cells.iter_mut() {
            *cell = Action::ALL[rng.random_range(0..Action::ALL.len())];
        }
        policy.cells[0] = Action::Wait;
        policy
    }

    pub fn size(&self) -> usize {
        self.size
    }

    #[inline(always)]
    fn index(&self, heads: usize, tails: usize) -> usize {
        heads * self.size + tails
    }

    pub fn get(&self, heads: usize, tails: usize) -> Action {
        self.cells[self.index(heads, tails)]
    }

    /// Set an in-table cell. Writes to `(0, 0)` are ignored.
    pub fn set(&mut self, heads: usize, tails: usize, action: Action) {
        if (heads, tails) != (0, 0) {
            let idx = self.index(heads, tails);
            self.cells[idx] = action;
        }
    }

    /// Child of `a` and `b`, one independent draw per cell.
    ///
    /// With `r < mutation_rate` the cell is replaced by `ALL[⌊3r / mutation_rate⌋]`;
    /// otherwise it comes from `a` when `r < 0.5 + mutation_rate / 2` and from
    /// `b` otherwise.
    pub fn breed<R: Rng + ?Sized>(a: &Self, b: &Self, mutation_rate: f64, rng: &mut R) -> Self {
        assert_eq!(a.size, b.size, "parents must have the same table size");
        let cells = a
            .cells
            .iter()
            .zip(&b.cells)
            .map(|(&from_a, &from_b)| {
                let r: f64 = rng.random();
                if r < mutation_rate {
                    let idx = ((3.0 * r / mutation_rate) as usize).min(Action::ALL.len() - 1);
                    Action::ALL[idx]
                } else if r < 0.5 + mutation_rate / 2.0 {
                    from_a
                } else {
                    from_b
                }
            })
            .collect::<Vec<_>>();
        let mut child = Self { size: a.size, cells };
        child.cells[0] = Action::Wait;
        child
    }

    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|e| CoinflipError::io(path, e))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer(&mut writer, self).map_err(|e| CoinflipError::json(path, e))?;
        writer.flush().map_err(|e| CoinflipError::io(path, e))
    }

    pub fn load_json(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| CoinflipError::io(path, e))?;
        let policy: Self =
            serde_json::from_reader(BufReader::new(file)).map_err(|e| CoinflipError::json(path, e))?;
        if policy.size == 0 || policy.cells.len() != policy.size * policy.size {
            return Err(CoinflipError::InvalidConfig(format!(
                "{}: {} cells for table size {}",
                path.display(),
                policy.cells.len(),
                policy.size
            )));
        }
        Ok(policy)
    }
}

impl DecisionPolicy for LookupPolicy {
    fn name(&self) -> &str {
        "lookup"
    }

    #[inline(always)]
    fn decide(&self, heads: usize, tails: usize) -> Action {
        let edge = self.size - 1;
        match self.get(heads.min(edge), tails.min(edge)) {
            Action::Wait if tails > edge => Action::Pardon,
            Action::Wait if heads > edge => Action::Accuse,
            action => action,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    /// Clamp heads first, then tails, turning WAIT into a verdict at each step.
    fn recursive_decide(policy: &LookupPolicy, heads: usize, tails: usize) -> Action {
        let size = policy.size();
        if heads >= size {
            return match recursive_decide(policy, size - 1, tails) {
                Action::Wait => Action::Accuse,
                sub => sub,
            };
        }
        if tails >= size {
            return match recursive_decide(policy, heads, size - 1) {
                Action::Wait => Action::Pardon,
                sub => sub,
            };
        }
        policy.get(heads, tails)
    }

    #[test]
    fn test_saturation_matches_recursive_clamping() {
        let mut rng = SmallRng::seed_from_u64(11);
        for _ in 0..20 {
            let policy = LookupPolicy::random(4, &mut rng);
            for h in 0..9 {
                for t in 0..9 {
                    assert_eq!(policy.decide(h, t), recursive_decide(&policy, h, t), "({h}, {t})");
                }
            }
        }
    }

    #[test]
    fn test_waiting_policy_saturates() {
        let policy = LookupPolicy::waiting(3);
        assert_eq!(policy.decide(1, 1), Action::Wait);
        assert_eq!(policy.decide(3, 0), Action::Accuse);
        assert_eq!(policy.decide(0, 3), Action::Pardon);
        assert_eq!(policy.decide(5, 5), Action::Pardon);
    }

    #[test]
    fn test_origin_always_waits() {
        let mut rng = SmallRng::seed_from_u64(5);
        let a = LookupPolicy::random(10, &mut rng);
        let b = LookupPolicy::random(10, &mut rng);
        assert_eq!(a.get(0, 0), Action::Wait);
        let child = LookupPolicy::breed(&a, &b, 1.0, &mut rng);
        assert_eq!(child.get(0, 0), Action::Wait);

        let mut c = a.clone();
        c.set(0, 0, Action::Accuse);
        assert_eq!(c.get(0, 0), Action::Wait);
    }

    #[test]
    fn test_breed_without_mutation_copies_parents() {
        let mut rng = SmallRng::seed_from_u64(8);
        let a = LookupPolicy::random(6, &mut rng);
        let b = LookupPolicy::random(6, &mut rng);
        let child = LookupPolicy::breed(&a, &b, 0.0, &mut rng);
        for h in 0..6 {
            for t in 0..6 {
                let c = child.get(h, t);
                assert!(c == a.get(h, t) || c == b.get(h, t));
            }
        }
        assert_eq!(LookupPolicy::breed(&a, &a, 0.0, &mut rng), a);
    }

    #[test]
    fn test_json_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("policy.json");
        let mut rng = SmallRng::seed_from_u64(3);
        let policy = LookupPolicy::random(10, &mut rng);
        policy.save_json(&path).unwrap();
        assert_eq!(LookupPolicy::load_json(&path).unwrap(), policy);
    }
}
