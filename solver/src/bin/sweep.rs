//! coinflip-sweep: root decision of the exact policy for every payoff pair.
//!
//! Sweeps `win ∈ 0..=max_win`, `lose ∈ 0..=min(max_lose, ratio·win)`. Each cell
//! builds its own table; cells run in parallel. The grid is written to
//! `evs.txt` (one line per win amount) and optionally as JSON.
//!
//! Settings resolve as: flags, then `--config` JSON, then built-in defaults.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;

use coinflip::constants::SWEEP_TEXT_FILE;
use coinflip::display::render_sweep;
use coinflip::env_config::{init_base_path, init_logging, init_rayon_threads};
use coinflip::storage::{save_sweep_outputs, SweepRecord};
use coinflip::{run_sweep, SweepConfig, TruncationMode};

#[derive(Parser)]
#[command(name = "coinflip-sweep")]
#[command(version)]
#[command(about = "Sweep the optimal root decision over a grid of payoffs")]
struct Cli {
    /// JSON sweep configuration; flags override its fields
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[arg(short = 'n', long)]
    max_flips: Option<usize>,

    #[arg(short, long)]
    mode: Option<TruncationMode>,

    #[arg(long)]
    rate: Option<f64>,

    #[arg(long)]
    bias: Option<f64>,

    #[arg(long)]
    max_win: Option<u32>,

    #[arg(long)]
    max_lose: Option<u32>,

    /// Largest lose/win ratio kept in the grid
    #[arg(long)]
    ratio: Option<u32>,

    /// Text output, one line per win amount
    #[arg(short, long, default_value = SWEEP_TEXT_FILE)]
    output: PathBuf,

    /// Also write the grid and its configuration as JSON
    #[arg(long)]
    json: Option<PathBuf>,

    /// Print the grid after sweeping
    #[arg(long)]
    show: bool,

    /// Worker threads (defaults to RAYON_NUM_THREADS or all cores)
    #[arg(short, long)]
    threads: Option<usize>,
}

impl Cli {
    fn resolve(&self) -> Result<SweepConfig> {
        let mut config = match &self.config {
            Some(path) => SweepConfig::from_json_file(path)
                .with_context(|| format!("loading sweep config {}", path.display()))?,
            None => SweepConfig::default(),
        };
        if let Some(n) = self.max_flips {
            config.solver.max_flips = n;
        }
        if let Some(mode) = self.mode {
            config.solver.mode = mode;
        }
        if let Some(rate) = self.rate {
            config.solver.cheater_rate = rate;
        }
        if let Some(bias) = self.bias {
            config.solver.cheater_bias = bias;
        }
        if let Some(w) = self.max_win {
            config.max_win_amt = w;
        }
        if let Some(l) = self.max_lose {
            config.max_lose_amt = l;
        }
        if let Some(r) = self.ratio {
            config.lose_to_win_ratio = r;
        }
        config.validate()?;
        Ok(config)
    }
}

fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    init_base_path()?;
    init_rayon_threads(cli.threads);

    let config = cli.resolve()?;
    println!(
        "Sweep: N={} {} rate={} bias={} | win 0..={} lose ≤ min({}, {}·win) | {} cells",
        config.solver.max_flips,
        config.solver.mode,
        config.solver.cheater_rate,
        config.solver.cheater_bias,
        config.max_win_amt,
        config.max_lose_amt,
        config.lose_to_win_ratio,
        config.cell_count()
    );

    let result = run_sweep(&config)?;

    if cli.show {
        print!("{}", render_sweep(&result));
    }

    let record = SweepRecord { config, result };
    let failures = save_sweep_outputs(&record, &cli.output, cli.json.as_deref());
    if !failures.is_empty() {
        bail!("{} of the sweep outputs could not be written", failures.len());
    }
    println!("Wrote {} rows to {}", record.result.len(), cli.output.display());
    if let Some(path) = &cli.json {
        println!("Wrote {}", path.display());
    }
    Ok(())
}
