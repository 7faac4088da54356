//! Elitist genetic training of [`LookupPolicy`] tables.
//!
//! One epoch:
//! 1. every agent plays every flipper of a fixed population once; its score is
//!    the summed payoff (flip costs included)
//! 2. agents are ranked by score, descending
//! 3. the top `elite` survive unchanged; the remaining slots are filled with
//!    children of elite pairs `(i, j), i < j`, taken in order and cycled until
//!    the population is full
//!
//! Scoring runs in parallel over agents. Each agent's RNG is seeded from
//! `(seed, epoch, agent)`, so a run is reproducible for a given seed.

use std::time::Instant;

use rand::rngs::SmallRng;
use rand::SeedableRng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::constants::{
    LEARNER_ELITE, LEARNER_EPOCHS, LEARNER_FLIPPERS, LEARNER_MUTATION_RATE, LEARNER_POPULATION,
    LEARNER_TABLE_SIZE,
};
use crate::error::{CoinflipError, Result};
use crate::learner::lookup::LookupPolicy;
use crate::policy_table::PolicyTable;
use crate::simulation::engine::{derive_seed, play_round};
use crate::simulation::flipper::FlipperPopulation;
use crate::types::GameParameters;

/// Stream tag separating breeding draws from scoring draws.
const BREED_STREAM: u64 = 0xb5ee_d000;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LearnerConfig {
    pub population: usize,
    pub flippers: usize,
    pub elite: usize,
    pub epochs: usize,
    pub mutation_rate: f64,
    pub table_size: usize,
    pub seed: u64,
}

impl Default for LearnerConfig {
    fn default() -> Self {
        Self {
            population: LEARNER_POPULATION,
            flippers: LEARNER_FLIPPERS,
            elite: LEARNER_ELITE,
            epochs: LEARNER_EPOCHS,
            mutation_rate: LEARNER_MUTATION_RATE,
            table_size: LEARNER_TABLE_SIZE,
            seed: 10,
        }
    }
}

impl LearnerConfig {
    pub fn validate(&self) -> Result<()> {
        if self.elite < 2 {
            return Err(CoinflipError::InvalidConfig(format!(
                "elite must be at least 2 to form a breeding pair, got {}",
                self.elite
            )));
        }
        if self.elite > self.population {
            return Err(CoinflipError::InvalidConfig(format!(
                "elite ({}) exceeds population ({})",
                self.elite, self.population
            )));
        }
        if self.flippers == 0 || self.table_size == 0 {
            return Err(CoinflipError::InvalidConfig(
                "flippers and table_size must be positive".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.mutation_rate) {
            return Err(CoinflipError::InvalidConfig(format!(
                "mutation_rate must lie in [0, 1], got {}",
                self.mutation_rate
            )));
        }
        Ok(())
    }
}

/// Scores of one finished epoch.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EpochStats {
    pub epoch: usize,
    pub best_score: f64,
    pub mean_score: f64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EvolutionReport {
    pub best: LookupPolicy,
    pub best_scores_per_epoch: Vec<f64>,
}

pub struct Evolution {
    config: LearnerConfig,
    params: GameParameters,
    flippers: FlipperPopulation,
    population: Vec<LookupPolicy>,
    epoch: usize,
}

impl Evolution {
    /// Random initial population.
    pub fn new(config: LearnerConfig, params: GameParameters) -> Result<Self> {
        config.validate()?;
        let mut rng = SmallRng::seed_from_u64(derive_seed(config.seed, BREED_STREAM));
        let population = (0..config.population)
            .map(|_| LookupPolicy::random(config.table_size, &mut rng))
            .collect();
        let flippers = FlipperPopulation::new(config.flippers, &params);
        log::info!(
            "learner: {} agents, {} flippers ({} cheaters), elite {}",
            config.population,
            flippers.len(),
            flippers.cheater_count(),
            config.elite
        );
        Ok(Self {
            config,
            params,
            flippers,
            population,
            epoch: 0,
        })
    }

    pub fn config(&self) -> &LearnerConfig {
        &self.config
    }

    pub fn population(&self) -> &[LookupPolicy] {
        &self.population
    }

    /// Highest-ranked agent of the last scored epoch (any agent before the first).
    pub fn best(&self) -> &LookupPolicy {
        &self.population[0]
    }

    /// Summed payoff of `agent` over every flipper, one round each.
    pub fn score(&self, agent: &LookupPolicy, rng_seed: u64) -> f64 {
        let mut rng = SmallRng::seed_from_u64(rng_seed);
        self.flippers
            .flippers()
            .iter()
            .map(|flipper| play_round(agent, flipper, &self.params, &mut rng).payoff)
            .sum()
    }

    /// Score, rank and refill once.
    pub fn step(&mut self) -> EpochStats {
        let epoch_seed = derive_seed(self.config.seed, self.epoch as u64);
        let scores: Vec<f64> = self
            .population
            .par_iter()
            .enumerate()
            .map(|(idx, agent)| self.score(agent, derive_seed(epoch_seed, idx as u64)))
            .collect();

        let mut ranked: Vec<(f64, LookupPolicy)> =
            scores.into_iter().zip(self.population.drain(..)).collect();
        ranked.sort_by(|a, b| b.0.total_cmp(&a.0));

        let stats = EpochStats {
            epoch: self.epoch,
            best_score: ranked[0].0,
            mean_score: ranked.iter().map(|(s, _)| s).sum::<f64>() / ranked.len() as f64,
        };

        self.population = ranked.into_iter().map(|(_, agent)| agent).collect();
        self.refill();
        self.epoch += 1;
        stats
    }

    fn refill(&mut self) {
        let elite = self.config.elite;
        let mut rng = SmallRng::seed_from_u64(derive_seed(
            self.config.seed ^ BREED_STREAM,
            self.epoch as u64,
        ));
        let pairs: Vec<(usize, usize)> = (0..elite)
            .flat_map(|i| (i + 1..elite).map(move |j| (i, j)))
            .collect();
        for (k, &(i, j)) in (elite..self.config.population).zip(pairs.iter().cycle()) {
            let child = LookupPolicy::breed(
                &self.population[i],
                &self.population[j],
                self.config.mutation_rate,
                &mut rng,
            );
            self.population[k] = child;
        }
    }

    /// Train for `config.epochs` epochs.
    pub fn run(mut self) -> EvolutionReport {
        let start = Instant::now();
        let mut best_scores_per_epoch = Vec::with_capacity(self.config.epochs);
        for _ in 0..self.config.epochs {
            let stats = self.step();
            log::info!(
                "epoch {:>4}/{} | best {:>9.1} | mean {:>9.1} | {:.1}s",
                stats.epoch + 1,
                self.config.epochs,
                stats.best_score,
                stats.mean_score,
                start.elapsed().as_secs_f64()
            );
            best_scores_per_epoch.push(stats.best_score);
        }
        EvolutionReport {
            best: self.population.swap_remove(0),
            best_scores_per_epoch,
        }
    }
}

/// Fraction of learner cells that also lie in the exact lattice and carry
/// the same action there. Zero when the two share no states.
pub fn agreement(policy: &LookupPolicy, table: &PolicyTable) -> f64 {
    let mut shared = 0usize;
    let mut matching = 0usize;
    for h in 0..policy.size() {
        for t in 0..policy.size() {
            if let Some(entry) = table.entry(h, t) {
                shared += 1;
                matching += (entry.action == policy.get(h, t)) as usize;
            }
        }
    }
    if shared == 0 {
        0.0
    } else {
        matching as f64 / shared as f64
    }
}
