//! coinflip-policy: build one exact policy table and report on it.
//!
//! Prints the root decision, how often each action appears, and (for small
//! lattices) the table itself. `--simulate N` also plays N Monte Carlo rounds
//! with the table to check its root value empirically.

use std::time::Instant;

use anyhow::Result;
use clap::Parser;

use coinflip::constants::*;
use coinflip::display::{render_decision_map, render_policy_table};
use coinflip::env_config::{init_logging, init_rayon_threads};
use coinflip::simulation::simulate;
use coinflip::{PolicyTable, SolverConfig, TruncationMode};

#[derive(Parser)]
#[command(name = "coinflip-policy")]
#[command(version)]
#[command(about = "Optimal WAIT/ACCUSE/PARDON policy for one parameter set")]
struct Cli {
    /// Lattice bound on flips
    #[arg(short = 'n', long, default_value_t = DEFAULT_MAX_FLIPS)]
    max_flips: usize,

    /// Truncation mode: square or triangular
    #[arg(short, long, default_value_t = TruncationMode::Square)]
    mode: TruncationMode,

    /// Prior probability that the flipper cheats
    #[arg(long, default_value_t = DEFAULT_CHEATER_RATE)]
    rate: f64,

    /// Heads probability of a cheating coin
    #[arg(long, default_value_t = DEFAULT_CHEATER_BIAS)]
    bias: f64,

    /// Reward for a correct verdict
    #[arg(long, default_value_t = DEFAULT_WIN_AMT)]
    win: f64,

    /// Penalty for a wrong verdict
    #[arg(long, default_value_t = DEFAULT_LOSE_AMT)]
    lose: f64,

    /// Print action letters only instead of (action, value) pairs
    #[arg(long)]
    actions_only: bool,

    /// Play this many simulated rounds with the table
    #[arg(long)]
    simulate: Option<usize>,

    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Worker threads (defaults to RAYON_NUM_THREADS or all cores)
    #[arg(short, long)]
    threads: Option<usize>,
}

fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    init_rayon_threads(cli.threads);

    let solver = SolverConfig {
        max_flips: cli.max_flips,
        mode: cli.mode,
        cheater_rate: cli.rate,
        cheater_bias: cli.bias,
    };
    solver.validate()?;
    let params = solver.game_parameters(cli.win, cli.lose)?;

    let start = Instant::now();
    let table = PolicyTable::build(solver.max_flips, solver.mode, &params);
    let elapsed = start.elapsed();

    let root = table.root();
    let counts = table.action_counts();
    println!(
        "N={} {} rate={} bias={} win={} lose={}",
        solver.max_flips, solver.mode, cli.rate, cli.bias, cli.win, cli.lose
    );
    println!("  states:  {} ({:.2?})", table.len(), elapsed);
    println!("  root:    {} {:.6}", root.action, root.expected_value);
    println!(
        "  actions: wait={} pardon={} accuse={}",
        counts.wait, counts.pardon, counts.accuse
    );

    if solver.max_flips <= PRINTABLE_MAX_FLIPS {
        println!();
        if cli.actions_only {
            print!("{}", render_decision_map(&table));
        } else {
            print!("{}", render_policy_table(&table));
        }
    }

    if let Some(rounds) = cli.simulate {
        let result = simulate(&table, &params, rounds, cli.seed);
        println!();
        println!(
            "  simulated {} rounds in {:.2?}: mean={:.4} (root {:.4}) sd={:.3} flips={:.2} accuracy={:.1}%",
            result.rounds,
            result.elapsed,
            result.mean,
            root.expected_value,
            result.std_dev,
            result.mean_flips,
            result.accuracy * 100.0
        );
    }
    Ok(())
}
