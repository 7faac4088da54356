//! # Coinflip: optimal cheater detection
//!
//! An observer watches a flipper toss a coin. The flipper is either fair or a
//! cheater whose coin lands heads with probability `cheater_bias`; the prior
//! probability of a cheater is `cheater_rate`. After each observed state
//! `(heads, tails)` the observer may WAIT (pay one unit and watch another
//! flip), ACCUSE, or PARDON. Correct verdicts earn `win_amt`, wrong ones cost
//! `lose_amt`.
//!
//! The crate computes the optimal policy exactly by **backward induction**
//! over the truncated `(heads, tails)` lattice.
//!
//! ## Algorithm overview
//!
//! | Step | Rust module | Description |
//! |------|-------------|-------------|
//! | Binomials | [`combinatorics`] | Memoized `C(n, k)`, exact in `u128` with a log-space fallback |
//! | Beliefs | [`likelihood`] | Joint likelihoods and the Bayesian posterior `P(cheater \| h, t)` |
//! | Verdicts | [`terminal`] | Expected value of ACCUSE and PARDON; per-parameter [`terminal::BeliefCache`] |
//! | Policy | [`policy_table`] | Rows from `max_flips` down to 0, boundary rule on the last cell of each row |
//! | Sweep | [`sweep`] | Root entry for every `(win_amt, lose_amt)` cell, in parallel |
//!
//! ## Lattice
//!
//! Row `h` holds states `(h, t)` for `t` in `0..row_len(h)`:
//! - [`TruncationMode::Triangular`]: `row_len(h) = max_flips - h + 1`, so `h + t ≤ max_flips`
//! - [`TruncationMode::Square`]: `row_len(h) = max_flips + 1`, and every state of row
//!   `max_flips` is a boundary
//!
//! At interior states
//!
//! ```text
//! wait = (1 - pc) · ½ (V(h+1, t) + V(h, t+1))
//!      + pc · (bias · V(h+1, t) + (1 - bias) · V(h, t+1)) - 1
//! ```
//!
//! and ties resolve PARDON, then ACCUSE, then WAIT.
//!
//! ## Around the solver
//!
//! - [`simulation`]: Monte Carlo play of any [`simulation::DecisionPolicy`]
//! - [`learner`]: evolutionary lookup-table policies trained by simulation
//! - [`storage`], [`display`]: sweep artifacts and text rendering
//! - [`config`], [`env_config`], [`error`]: configuration and errors

#![allow(clippy::needless_range_loop)]

pub mod combinatorics;
pub mod config;
pub mod constants;
pub mod display;
pub mod env_config;
pub mod error;
pub mod learner;
pub mod likelihood;
pub mod policy_table;
pub mod simulation;
pub mod storage;
pub mod sweep;
pub mod terminal;
pub mod types;

pub use config::{SolverConfig, SweepConfig};
pub use error::{CoinflipError, Result};
pub use policy_table::{build_policy_table, PolicyTable};
pub use sweep::{run_sweep, SweepResult};
pub use types::{Action, GameParameters, PolicyEntry, TruncationMode};
