//! Model constants and default configuration values.
//!
//! Maps the game description to concrete values:
//! - fair flipper heads probability = [`FAIR_HEADS_PROBABILITY`] = 0.5
//! - per-observation cost = [`OBSERVATION_COST`] = 1
//! - default lattice bound N = [`DEFAULT_MAX_FLIPS`] = 500
//! - default sweep grid: win ∈ [0, [`MAX_WIN_AMT`]], lose ∈ [0, [`MAX_LOSE_AMT`]],
//!   pruned to lose ≤ [`LOSE_TO_WIN_RATIO`] · win

/// Heads probability of an honest flipper.
pub const FAIR_HEADS_PROBABILITY: f64 = 0.5;

/// Payoff deducted for every flip observed before a terminal decision.
///
/// Unparameterized model constant: the wait recurrence subtracts it once per step.
pub const OBSERVATION_COST: f64 = 1.0;

/// Default lattice bound: the table covers heads (and tails) counts 0..=500.
pub const DEFAULT_MAX_FLIPS: usize = 500;

/// Default prior probability that a flipper is a cheater.
pub const DEFAULT_CHEATER_RATE: f64 = 0.5;

/// Default heads probability of a cheater.
pub const DEFAULT_CHEATER_BIAS: f64 = 0.75;

/// Payoffs used when a single table is built without explicit amounts.
pub const DEFAULT_WIN_AMT: f64 = 15.0;
pub const DEFAULT_LOSE_AMT: f64 = 30.0;

/// Inclusive upper bound of the swept win amount.
pub const MAX_WIN_AMT: u32 = 50;

/// Inclusive upper bound of the swept lose amount.
pub const MAX_LOSE_AMT: u32 = 150;

/// Sweep cells with `lose_amt > LOSE_TO_WIN_RATIO * win_amt` are skipped.
pub const LOSE_TO_WIN_RATIO: u32 = 3;

/// Default sweep artifact path (one line per win amount).
pub const SWEEP_TEXT_FILE: &str = "evs.txt";

/// Tables up to this bound are small enough to print in full.
pub const PRINTABLE_MAX_FLIPS: usize = 20;

/// Hard cap on observations in one simulated round.
///
/// Exact policies never wait at their boundary, so the cap only matters for
/// learned or hand-written policies that wait forever.
pub const MAX_ROUND_FLIPS: usize = 10_000;

/// Rounds per rayon work item in the Monte Carlo simulator.
pub const SIMULATION_CHUNK: usize = 4096;

/// Side length of the evolutionary learner's lookup table.
pub const LEARNER_TABLE_SIZE: usize = 10;

/// Default learner population size.
pub const LEARNER_POPULATION: usize = 1000;

/// Default number of flippers every agent is scored against per epoch.
pub const LEARNER_FLIPPERS: usize = 1000;

/// Default number of agents carried unchanged into the next epoch.
pub const LEARNER_ELITE: usize = 10;

/// Default number of training epochs.
pub const LEARNER_EPOCHS: usize = 1000;

/// Default per-cell mutation probability when breeding.
pub const LEARNER_MUTATION_RATE: f64 = 0.05;
