//! Likelihood of an observed (heads, tails) count under each hypothesis, and
//! the Bayesian posterior that the flipper is a cheater.
//!
//! ```text
//! joint_cheater(h,t) = r · C(h+t,h) · b^h · (1-b)^t
//! joint_fair(h,t)    = (1-r) · C(h+t,h) · 0.5^(h+t)
//! posterior(h,t)     = joint_cheater / (joint_cheater + joint_fair)
//! ```
//!
//! `C(h+t,h)` is common to both joints and is left out of [`posterior_cheater`]:
//! it grows combinatorially while the power terms shrink exponentially, and the
//! quotient is far better conditioned without it.

use crate::combinatorics::{ln_choose, Binomials};
use crate::constants::FAIR_HEADS_PROBABILITY;
use crate::types::GameParameters;

/// P(cheater ∧ observing h heads and t tails).
///
/// Falls back to log space when C(h+t, h) does not fit in a `u128`; the
/// result may underflow to 0 for long sequences.
pub fn joint_cheater(heads: usize, tails: usize, params: &GameParameters) -> f64 {
    let rate = params.cheater_rate();
    let bias = params.cheater_bias();
    match Binomials::global().checked_choose(heads + tails, heads) {
        Some(c) => rate * c as f64 * bias.powi(heads as i32) * (1.0 - bias).powi(tails as i32),
        None => (rate.ln()
            + ln_choose(heads + tails, heads)
            + heads as f64 * bias.ln()
            + tails as f64 * (1.0 - bias).ln())
        .exp(),
    }
}

/// P(fair ∧ observing h heads and t tails).
pub fn joint_fair(heads: usize, tails: usize, params: &GameParameters) -> f64 {
    let rate = params.cheater_rate();
    let n = heads + tails;
    match Binomials::global().checked_choose(n, heads) {
        Some(c) => (1.0 - rate) * c as f64 * FAIR_HEADS_PROBABILITY.powi(n as i32),
        None => ((1.0 - rate).ln() + ln_choose(n, heads) + n as f64 * FAIR_HEADS_PROBABILITY.ln())
            .exp(),
    }
}

/// P(cheater | h heads, t tails) for prior `cheater_rate` and cheater heads
/// probability `cheater_bias`.
///
/// When both unnormalized terms underflow to zero the posterior is taken from
/// the log-odds instead of returning NaN.
pub fn posterior_cheater(heads: usize, tails: usize, cheater_rate: f64, cheater_bias: f64) -> f64 {
    let pc = cheater_rate * cheater_bias.powi(heads as i32) * (1.0 - cheater_bias).powi(tails as i32);
    let pf = (1.0 - cheater_rate) * FAIR_HEADS_PROBABILITY.powi((heads + tails) as i32);
    let total = pc + pf;
    if total > 0.0 && total.is_finite() {
        return pc / total;
    }

    let log_pc = cheater_rate.ln()
        + heads as f64 * cheater_bias.ln()
        + tails as f64 * (1.0 - cheater_bias).ln();
    let log_pf = (1.0 - cheater_rate).ln() + (heads + tails) as f64 * FAIR_HEADS_PROBABILITY.ln();
    1.0 / (1.0 + (log_pf - log_pc).exp())
}
