//! Process environment shared by the `coinflip-*` binaries.
//!
//! - `COINFLIP_BASE_PATH`: working directory (default `"."`)
//! - `RAYON_NUM_THREADS`, falling back to `OMP_NUM_THREADS`: worker threads
//! - `RUST_LOG`: log filter (default `info`)

use std::path::PathBuf;

use crate::error::{CoinflipError, Result};

/// Install `env_logger`, defaulting to `info`. A second call is a no-op.
pub fn init_logging() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .try_init();
}

/// Change into `COINFLIP_BASE_PATH` and return it.
pub fn init_base_path() -> Result<PathBuf> {
    let base_path = PathBuf::from(std::env::var("COINFLIP_BASE_PATH").unwrap_or_else(|_| ".".into()));
    std::env::set_current_dir(&base_path).map_err(|e| CoinflipError::io(&base_path, e))?;
    if let Ok(cwd) = std::env::current_dir() {
        log::info!("working directory: {}", cwd.display());
    }
    Ok(base_path)
}

/// Thread count from the environment, or `None` to let rayon decide.
pub fn thread_count() -> Option<usize> {
    std::env::var("RAYON_NUM_THREADS")
        .or_else(|_| std::env::var("OMP_NUM_THREADS"))
        .ok()
        .and_then(|s| s.parse().ok())
        .filter(|&n| n > 0)
}

/// Size the global rayon pool. Tolerates an already-initialized pool.
/// Returns the number of threads actually in use.
pub fn init_rayon_threads(requested: Option<usize>) -> usize {
    if let Some(n) = requested.or_else(thread_count) {
        if rayon::ThreadPoolBuilder::new()
            .num_threads(n)
            .build_global()
            .is_err()
        {
            log::warn!("rayon pool already initialized; ignoring request for {n} threads");
        }
    }
    let threads = rayon::current_num_threads();
    log::info!("rayon threads: {threads}");
    threads
}
