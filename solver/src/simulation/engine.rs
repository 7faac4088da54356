//! Monte Carlo play of the detection game.
//!
//! A round draws a flipper from the prior, then asks the policy for a decision
//! after every observed count, starting from (0, 0). Each flip costs
//! [`OBSERVATION_COST`]; the round ends on ACCUSE or PARDON. For the exact
//! table the mean payoff converges to the root expected value.
//!
//! Rounds are split into chunks of [`SIMULATION_CHUNK`], each with its own
//! `SmallRng` seeded from `(seed, chunk)`, so results depend only on the seed
//! and not on the rayon thread count.

use std::time::{Duration, Instant};

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;

use crate::constants::{MAX_ROUND_FLIPS, OBSERVATION_COST, SIMULATION_CHUNK};
use crate::likelihood::posterior_cheater;
use crate::simulation::flipper::Flipper;
use crate::simulation::strategy::DecisionPolicy;
use crate::terminal::{accuse_value, boundary_choice, pardon_value};
use crate::types::{Action, GameParameters};

/// What happened in one round.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RoundOutcome {
    pub payoff: f64,
    pub flips: usize,
    pub action: Action,
    /// Accused a cheater or pardoned a fair flipper.
    pub correct: bool,
}

/// Aggregate of a batch of rounds.
#[derive(Clone, Debug)]
pub struct SimulationResult {
    pub rounds: usize,
    pub mean: f64,
    pub std_dev: f64,
    pub mean_flips: f64,
    /// Fraction of rounds with a correct verdict.
    pub accuracy: f64,
    pub elapsed: Duration,
}

/// SplitMix64 finalizer, used to spread `(seed, stream)` pairs over the u64 range.
#[inline(always)]
pub fn derive_seed(seed: u64, stream: u64) -> u64 {
    let mut z = seed ^ stream.wrapping_add(1).wrapping_mul(0x9e3779b97f4a7c15);
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58476d1ce4e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d049bb133111eb);
    z ^ (z >> 31)
}

/// Payoff of a verdict against a flipper of known type, before flip costs.
#[inline(always)]
pub fn verdict_payoff(action: Action, cheater: bool, params: &GameParameters) -> f64 {
    let pc = if cheater { 1.0 } else { 0.0 };
    match action {
        Action::Accuse => accuse_value(pc, params),
        Action::Pardon | Action::Wait => pardon_value(pc, params),
    }
}

/// Play one round against `flipper`.
///
/// A policy still waiting after [`MAX_ROUND_FLIPS`] flips is forced onto the
/// boundary rule at the posterior of the counts seen so far.
pub fn play_round<P, R>(
    policy: &P,
    flipper: &Flipper,
    params: &GameParameters,
    rng: &mut R,
) -> RoundOutcome
where
    P: DecisionPolicy + ?Sized,
    R: Rng + ?Sized,
{
    let (mut heads, mut tails) = (0usize, 0usize);
    let action = loop {
        match policy.decide(heads, tails) {
            Action::Wait if heads + tails < MAX_ROUND_FLIPS => {
                if flipper.flip(rng) {
                    heads += 1;
                } else {
                    tails += 1;
                }
            }
            Action::Wait => {
                let pc = posterior_cheater(heads, tails, params.cheater_rate(), params.cheater_bias());
                break boundary_choice(accuse_value(pc, params), pardon_value(pc, params)).action;
            }
            verdict => break verdict,
        }
    };

    let flips = heads + tails;
    RoundOutcome {
        payoff: verdict_payoff(action, flipper.cheater, params) - flips as f64 * OBSERVATION_COST,
        flips,
        action,
        correct: (action == Action::Accuse) == flipper.cheater,
    }
}

#[derive(Default)]
struct Accumulator {
    rounds: usize,
    sum: f64,
    sum_sq: f64,
    flips: usize,
    correct: usize,
}

impl Accumulator {
    fn push(&mut self, outcome: &RoundOutcome) {
        self.rounds += 1;
        self.sum += outcome.payoff;
        self.sum_sq += outcome.payoff * outcome.payoff;
        self.flips += outcome.flips;
        self.correct += outcome.correct as usize;
    }

    fn merge(mut self, other: Self) -> Self {
        self.rounds += other.rounds;
        self.sum += other.sum;
        self.sum_sq += other.sum_sq;
        self.flips += other.flips;
        self.correct += other.correct;
        self
    }
}

/// Play `rounds` independent rounds, flippers drawn from the prior.
pub fn simulate<P>(policy: &P, params: &GameParameters, rounds: usize, seed: u64) -> SimulationResult
where
    P: DecisionPolicy + ?Sized,
{
    let start = Instant::now();
    let chunks = rounds.div_ceil(SIMULATION_CHUNK);

    let acc = (0..chunks)
        .into_par_iter()
        .map(|chunk| {
            let mut rng = SmallRng::seed_from_u64(derive_seed(seed, chunk as u64));
            let n = SIMULATION_CHUNK.min(rounds - chunk * SIMULATION_CHUNK);
            let mut acc = Accumulator::default();
            for _ in 0..n {
                let flipper = Flipper::sample(params, &mut rng);
                acc.push(&play_round(policy, &flipper, params, &mut rng));
            }
            acc
        })
        .reduce(Accumulator::default, Accumulator::merge);

    let n = acc.rounds.max(1) as f64;
    let mean = acc.sum / n;
    let variance = (acc.sum_sq / n - mean * mean).max(0.0);
    let result = SimulationResult {
        rounds: acc.rounds,
        mean,
        std_dev: variance.sqrt(),
        mean_flips: acc.flips as f64 / n,
        accuracy: acc.correct as f64 / n,
        elapsed: start.elapsed(),
    };
    log::debug!(
        "simulated {} rounds of '{}' in {:.2?}: mean={:.4} sd={:.4}",
        result.rounds,
        policy.name(),
        result.elapsed,
        result.mean,
        result.std_dev
    );
    result
}
