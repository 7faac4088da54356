//! Memoized binomial coefficients C(n, k).
//!
//! Payoff-independent, so a single process-wide [`Binomials`] instance is
//! shared by every parameter set and every rayon worker. Population goes
//! through a `RwLock`: readers share, the first computation of a pair takes
//! the write lock once. Entries are never invalidated.

use std::collections::HashMap;
use std::sync::{OnceLock, PoisonError, RwLock};

static GLOBAL: OnceLock<Binomials> = OnceLock::new();

/// Memo of `(n, k) -> C(n, k)`. `None` records that the coefficient overflows `u128`.
#[derive(Default)]
pub struct Binomials {
    memo: RwLock<HashMap<(usize, usize), Option<u128>>>,
}

impl Binomials {
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide oracle.
    pub fn global() -> &'static Binomials {
        GLOBAL.get_or_init(Binomials::new)
    }

    /// C(n, k), or `None` if it does not fit in a `u128`.
    ///
    /// # Panics
    /// If `k > n`.
    pub fn checked_choose(&self, n: usize, k: usize) -> Option<u128> {
        assert!(k <= n, "choose({n}, {k}): k must not exceed n");
        if let Some(&cached) = self
            .memo
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&(n, k))
        {
            return cached;
        }
        let value = incremental_choose(n, k);
        self.memo
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert((n, k), value);
        value
    }

    /// C(n, k).
    ///
    /// # Panics
    /// If `k > n`, or if C(n, k) itself exceeds `u128::MAX` (first at n = 132
    /// near k = n/2).
    pub fn choose(&self, n: usize, k: usize) -> u128 {
        match self.checked_choose(n, k) {
            Some(value) => value,
            None => panic!("choose({n}, {k}) overflows u128"),
        }
    }

    /// Fill the memo for every `0 <= k <= n <= max_n` up front, so later
    /// lookups only ever take the read lock.
    pub fn precompute(&self, max_n: usize) {
        let mut memo = self.memo.write().unwrap_or_else(PoisonError::into_inner);
        for n in 0..=max_n {
            for k in 0..=n {
                memo.entry((n, k)).or_insert_with(|| incremental_choose(n, k));
            }
        }
    }

    /// Number of memoized pairs.
    pub fn len(&self) -> usize {
        self.memo.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// C(n, k) from the global oracle.
pub fn choose(n: usize, k: usize) -> u128 {
    Binomials::global().choose(n, k)
}

/// Running product `Π_{i=1..k} (n+1-i)/i`. After step `i` the accumulator
/// equals C(n, i).
///
/// With `g = gcd(C(n, i-1), i)`, `i / g` divides `n+1-i`, so both factors are
/// reduced before multiplying and the product is C(n, i) itself. Overflow is
/// therefore reported only when C(n, i) does not fit.
fn incremental_choose(n: usize, k: usize) -> Option<u128> {
    let k = k.min(n - k);
    let mut acc: u128 = 1;
    for i in 1..=k {
        let i = i as u128;
        let g = gcd(acc, i);
        let factor = (n as u128 + 1 - i) / (i / g);
        acc = (acc / g).checked_mul(factor)?;
    }
    Some(acc)
}

fn gcd(mut a: u128, mut b: u128) -> u128 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

/// ln C(n, k) as a running sum of logs. Used where the integer overflows.
///
/// # Panics
/// If `k > n`.
pub fn ln_choose(n: usize, k: usize) -> f64 {
    assert!(k <= n, "ln_choose({n}, {k}): k must not exceed n");
    let k = k.min(n - k);
    (1..=k)
        .map(|i| ((n + 1 - i) as f64).ln() - (i as f64).ln())
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_small_values() {
        let b = Binomials::new();
        assert_eq!(b.choose(5, 2), 10);
        assert_eq!(b.choose(0, 0), 1);
        assert_eq!(b.choose(10, 5), 252);
        assert_eq!(b.choose(52, 5), 2_598_960);
    }

    #[test]
    fn test_edges_and_symmetry() {
        let b = Binomials::new();
        for n in 0..60 {
            assert_eq!(b.choose(n, 0), 1);
            assert_eq!(b.choose(n, n), 1);
            for k in 0..=n {
                assert_eq!(b.choose(n, k), b.choose(n, n - k), "n={n} k={k}");
            }
        }
    }

    #[test]
    fn test_pascal_rule() {
        let b = Binomials::new();
        for n in 1..100 {
            for k in 1..n {
                assert_eq!(b.choose(n, k), b.choose(n - 1, k - 1) + b.choose(n - 1, k));
            }
        }
    }

    #[test]
    fn test_memoizes() {
        let b = Binomials::new();
        assert!(b.is_empty());
        b.choose(20, 7);
        b.choose(20, 7);
        assert_eq!(b.len(), 1);
        b.precompute(4);
        // 15 pairs for n <= 4, plus the (20, 7) entry
        assert_eq!(b.len(), 16);
    }

    #[test]
    fn test_overflow_is_reported() {
        let b = Binomials::new();
        assert!(b.checked_choose(1000, 500).is_none());
        assert!(b.checked_choose(1000, 3).is_some());
    }

    #[test]
    fn test_near_u128_limit() {
        let b = Binomials::new();
        assert_eq!(
            b.checked_choose(128, 64),
            Some(23_951_146_041_928_082_866_135_587_776_380_551_750)
        );
        assert_eq!(
            b.choose(130, 65),
            95_067_625_827_960_698_145_584_333_020_095_113_100
        );
        assert_eq!(b.choose(131, 65), b.choose(130, 64) + b.choose(130, 65));
        assert!(b.checked_choose(132, 66).is_none());
    }

    #[test]
    #[should_panic(expected = "k must not exceed n")]
    fn test_k_greater_than_n_panics() {
        Binomials::new().choose(3, 4);
    }

    #[test]
    fn test_ln_choose_matches_integer() {
        let b = Binomials::new();
        for (n, k) in [(10, 3), (40, 20), (100, 50)] {
            let exact = (b.choose(n, k) as f64).ln();
            assert!((ln_choose(n, k) - exact).abs() < 1e-9, "n={n} k={k}");
        }
    }
}
