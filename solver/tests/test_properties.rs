//! Property-based tests for the combinatorics, posterior and policy builder.

use proptest::prelude::*;

use coinflip::combinatorics::{choose, ln_choose};
use coinflip::likelihood::posterior_cheater;
use coinflip::terminal::{accuse_value, pardon_value};
use coinflip::types::{Action, GameParameters, TruncationMode};
use coinflip::PolicyTable;

fn unit_strategy() -> impl Strategy<Value = f64> {
    0.01..0.99f64
}

fn mode_strategy() -> impl Strategy<Value = TruncationMode> {
    prop_oneof![Just(TruncationMode::Square), Just(TruncationMode::Triangular)]
}

fn params_strategy() -> impl Strategy<Value = GameParameters> {
    (unit_strategy(), unit_strategy(), 0u32..=50, 0u32..=150).prop_map(|(r, b, w, l)| {
        GameParameters::new(r, b, w as f64, l as f64).expect("strategy yields valid parameters")
    })
}

proptest! {
    // 1. Edges of Pascal's triangle
    #[test]
    fn choose_edges(n in 0usize..120) {
        prop_assert_eq!(choose(n, 0), 1);
        prop_assert_eq!(choose(n, n), 1);
    }

    // 2. Symmetry
    #[test]
    fn choose_symmetric(n in 0usize..120, k in 0usize..120) {
        let k = k.min(n);
        prop_assert_eq!(choose(n, k), choose(n, n - k));
    }

    // 3. Pascal's rule
    #[test]
    fn choose_pascal(n in 2usize..120, k in 1usize..119) {
        let k = k.min(n - 1);
        prop_assert_eq!(choose(n, k), choose(n - 1, k - 1) + choose(n - 1, k));
    }

    // 4. Log-space agrees with exact values
    #[test]
    fn ln_choose_matches_exact(n in 0usize..100, k in 0usize..100) {
        let k = k.min(n);
        let exact = (choose(n, k) as f64).ln();
        prop_assert!((ln_choose(n, k) - exact).abs() < 1e-9 * exact.abs().max(1.0));
    }

    // 5. No evidence: posterior equals prior
    #[test]
    fn posterior_without_evidence_is_prior(r in unit_strategy(), b in unit_strategy()) {
        prop_assert!((posterior_cheater(0, 0, r, b) - r).abs() < 1e-12);
    }

    // 6. More heads never lowers suspicion of a heads-biased coin
    #[test]
    fn posterior_monotone_in_heads(
        r in unit_strategy(),
        b in 0.55..0.95f64,
        h in 0usize..200,
        t in 0usize..200,
    ) {
        let lo = posterior_cheater(h, t, r, b);
        let hi = posterior_cheater(h + 1, t, r, b);
        prop_assert!(hi >= lo - 1e-12, "P({h}+1,{t})={hi} < P({h},{t})={lo}");
        prop_assert!((0.0..=1.0).contains(&lo));
    }

    // 7. Even odds with symmetric payoffs: both verdicts are worth zero
    #[test]
    fn symmetric_payoffs_at_even_odds(amt in 0u32..200) {
        let params = GameParameters::new(0.5, 0.75, amt as f64, amt as f64).unwrap();
        prop_assert_eq!(accuse_value(0.5, &params), 0.0);
        prop_assert_eq!(pardon_value(0.5, &params), 0.0);
    }

    // 8. A zero-flip lattice has a single verdict, never WAIT
    #[test]
    fn zero_flips_never_wait(params in params_strategy(), mode in mode_strategy()) {
        let table = PolicyTable::build(0, mode, &params);
        prop_assert_eq!(table.len(), 1);
        prop_assert_ne!(table.root().action, Action::Wait);
    }

    // 9. Boundary cells never wait
    #[test]
    fn boundary_never_waits(params in params_strategy(), mode in mode_strategy(), n in 0usize..25) {
        let table = PolicyTable::build(n, mode, &params);
        for h in 0..=n {
            for t in 0..table.row_len(h) {
                if table.is_boundary(h, t) {
                    prop_assert_ne!(table.entry(h, t).unwrap().action, Action::Wait);
                }
            }
        }
    }

    // 10. Rebuilding gives bit-identical tables
    #[test]
    fn rebuild_is_bit_identical(params in params_strategy(), mode in mode_strategy(), n in 0usize..25) {
        let a = PolicyTable::build(n, mode, &params);
        let b = PolicyTable::build(n, mode, &params);
        for (ra, rb) in a.rows().iter().zip(b.rows()) {
            for (ea, eb) in ra.iter().zip(rb) {
                prop_assert_eq!(ea.action, eb.action);
                prop_assert_eq!(ea.expected_value.to_bits(), eb.expected_value.to_bits());
            }
        }
    }

    // 11. Waiting is never worse than the better verdict where it is chosen
    #[test]
    fn chosen_value_dominates_verdicts(params in params_strategy(), n in 1usize..20) {
        let table = PolicyTable::build(n, TruncationMode::Square, &params);
        for h in 0..=n {
            for t in 0..=n {
                let pc = posterior_cheater(h, t, params.cheater_rate(), params.cheater_bias());
                let best_verdict = accuse_value(pc, &params).max(pardon_value(pc, &params));
                let v = table.entry(h, t).unwrap().expected_value;
                prop_assert!(v >= best_verdict - 1e-9, "({h},{t}): {v} < {best_verdict}");
            }
        }
    }
}
