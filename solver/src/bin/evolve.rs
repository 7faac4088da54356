//! coinflip-evolve: train a lookup-table policy by simulated play.
//!
//! Reports per-epoch best scores, how closely the winner matches the exact
//! policy, and writes the winner as JSON.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use coinflip::constants::*;
use coinflip::display::render_table;
use coinflip::env_config::{init_logging, init_rayon_threads};
use coinflip::learner::{agreement, Evolution, LearnerConfig};
use coinflip::simulation::simulate;
use coinflip::types::Action;
use coinflip::{GameParameters, PolicyTable, TruncationMode};

#[derive(Parser)]
#[command(name = "coinflip-evolve")]
#[command(version)]
#[command(about = "Evolve a lookup-table cheater detector")]
struct Cli {
    #[arg(long, default_value_t = LEARNER_POPULATION)]
    population: usize,

    /// Flippers each agent plays per epoch
    #[arg(long, default_value_t = LEARNER_FLIPPERS)]
    flippers: usize,

    /// Agents kept unchanged each epoch
    #[arg(long, default_value_t = LEARNER_ELITE)]
    elite: usize,

    #[arg(short, long, default_value_t = LEARNER_EPOCHS)]
    epochs: usize,

    #[arg(long, default_value_t = LEARNER_MUTATION_RATE)]
    mutation_rate: f64,

    #[arg(long, default_value_t = LEARNER_TABLE_SIZE)]
    table_size: usize,

    #[arg(long, default_value_t = 10)]
    seed: u64,

    #[arg(long, default_value_t = DEFAULT_CHEATER_RATE)]
    rate: f64,

    #[arg(long, default_value_t = DEFAULT_CHEATER_BIAS)]
    bias: f64,

    #[arg(long, default_value_t = DEFAULT_WIN_AMT)]
    win: f64,

    #[arg(long, default_value_t = DEFAULT_LOSE_AMT)]
    lose: f64,

    /// Where to write the best policy
    #[arg(short, long, default_value = "learned_policy.json")]
    output: PathBuf,

    /// Rounds used to evaluate the winner against the exact policy
    #[arg(long, default_value_t = 100_000)]
    eval_rounds: usize,

    #[arg(short, long)]
    threads: Option<usize>,
}

fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    init_rayon_threads(cli.threads);

    let params = GameParameters::new(cli.rate, cli.bias, cli.win, cli.lose)?;
    let config = LearnerConfig {
        population: cli.population,
        flippers: cli.flippers,
        elite: cli.elite,
        epochs: cli.epochs,
        mutation_rate: cli.mutation_rate,
        table_size: cli.table_size,
        seed: cli.seed,
    };

    let report = Evolution::new(config, params)?.run();
    for (epoch, score) in report.best_scores_per_epoch.iter().enumerate() {
        println!("epoch {:>4}: best {:.1}", epoch + 1, score);
    }

    let exact = PolicyTable::build(DEFAULT_MAX_FLIPS, TruncationMode::Square, &params);
    let learned = simulate(&report.best, &params, cli.eval_rounds, cli.seed);
    let optimal = simulate(&exact, &params, cli.eval_rounds, cli.seed);

    println!();
    let size = report.best.size();
    let rows: Vec<Vec<Action>> = (0..size)
        .map(|h| (0..size).map(|t| report.best.get(h, t)).collect())
        .collect();
    print!("{}", render_table(&rows));
    println!();
    println!(
        "agreement with exact policy: {:.1}%",
        agreement(&report.best, &exact) * 100.0
    );
    println!(
        "mean payoff per round: learned {:.4}, exact {:.4} (root {:.4})",
        learned.mean,
        optimal.mean,
        exact.root().expected_value
    );

    report
        .best
        .save_json(&cli.output)
        .with_context(|| format!("writing {}", cli.output.display()))?;
    println!("Wrote {}", cli.output.display());
    Ok(())
}
