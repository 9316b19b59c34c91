//! # Main — CLI Entry Point
//!
//! Parses the command line, initialises logging and hands off to
//! [`cli::run`]. The positional order is `THREADS ALGORITHM BOUND [OUTPUT]`.
//!
//! ## Options
//!
//! - `THREADS`: worker threads (1 = no partitioning).
//! - `ALGORITHM`: id 0-4 or a name such as `eratosthenes` or `trial-division`.
//! - `OUTPUT`: file to write; omitted or `-` writes to stdout.
//! - `--streaming`: write primes straight from the kernel (Eratosthenes and
//!   Sundaram only).
//! - `--count`: print only the prime count and the largest prime.
//! - `--summary-json`: print the run summary as JSON on stderr.
//! - `--progress-secs` / `FINDPRIMES_PROGRESS_SECS`: progress log interval
//!   (0 disables).
//!
//! ## Logging
//!
//! `LOG_FORMAT=json` switches to JSON lines; `RUST_LOG` sets the filter
//! (default `info`). Logs always go to stderr so stdout carries only primes.

mod cli;

use anyhow::Result;
use clap::Parser;
use findprimes::Algorithm;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[derive(Parser)]
#[command(name = "findprimes", about = "Enumerate every prime up to a bound")]
struct Cli {
    /// Number of worker threads (1 runs a single full-range sieve)
    threads: usize,

    /// Algorithm: 0 trial-division, 1 eratosthenes, 2 euler, 3 sundaram, 4 incremental
    algorithm: Algorithm,

    /// Upper bound (inclusive), at most 2147483647
    bound: u64,

    /// Output file ("-" or omitted for stdout)
    #[arg(conflicts_with = "count")]
    output: Option<PathBuf>,

    /// Stream primes straight from the sieve instead of collecting them first
    #[arg(long)]
    streaming: bool,

    /// Print only the number of primes and the largest one
    #[arg(long)]
    count: bool,

    /// Print the run summary as JSON on stderr
    #[arg(long)]
    summary_json: bool,

    /// Seconds between progress log lines (0 disables)
    #[arg(long, env = "FINDPRIMES_PROGRESS_SECS", default_value_t = 30)]
    progress_secs: u64,
}

fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    // LOG_FORMAT=json for log shippers, human-readable otherwise
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_default();
    if log_format == "json" {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .init();
    }

    let cli = Cli::parse();
    cli::run(&cli)
}
