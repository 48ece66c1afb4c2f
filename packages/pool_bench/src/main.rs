#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![cfg_attr(coverage_nightly, coverage(off))]

//! Binary entry point for the `pool_bench` tool.
//!
//! Without a subcommand, runs the benchmark and writes the report. The `worker` subcommand
//! turns the process into a process pool worker and is only meant to be started by the pools.

use std::io;
use std::num::NonZero;
use std::path::PathBuf;
use std::process::ExitCode;

use argh::FromArgs;
use pool_bench::{BenchmarkConfig, InputBatch, Result, WORKER_SUBCOMMAND, run, serve};
use tracing_subscriber::EnvFilter;

/// Compares serial, multithreaded and multiprocess execution of a CPU-bound batch and writes
/// the timings to an HTML report.
#[derive(FromArgs)]
struct Args {
    /// an integer to include in the input batch; repeat to build a custom batch
    #[argh(option, long = "number")]
    numbers: Vec<u64>,

    /// how many times to measure every strategy (default 5)
    #[argh(option)]
    trials: Option<NonZero<usize>>,

    /// where to write the report (default report.html)
    #[argh(option)]
    output: Option<PathBuf>,

    #[argh(subcommand)]
    command: Option<Subcommand>,
}

#[derive(FromArgs)]
#[argh(subcommand)]
enum Subcommand {
    Worker(WorkerArgs),
}

/// serve workload requests on stdin/stdout (started by the process pools)
#[derive(FromArgs)]
#[argh(subcommand, name = "worker")]
struct WorkerArgs {}

// Binary entry point - mutations would require subprocess testing which is impractical.
#[cfg_attr(test, mutants::skip)]
fn main() -> ExitCode {
    init_tracing();

    let args: Args = argh::from_env();

    let result = match args.command {
        Some(Subcommand::Worker(WorkerArgs {})) => run_worker(),
        None => run_benchmark(args),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing() {
    // stdout carries the worker protocol, so diagnostics always go to stderr.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(filter)
        .init();
}

fn run_worker() -> Result<()> {
    let served = serve(io::stdin().lock(), io::stdout().lock())?;

    tracing::trace!(served, subcommand = WORKER_SUBCOMMAND, "worker finished");

    Ok(())
}

fn run_benchmark(args: Args) -> Result<()> {
    let mut config = BenchmarkConfig::new();

    if !args.numbers.is_empty() {
        config = config.inputs(InputBatch::from_integers(args.numbers)?);
    }

    if let Some(trials) = args.trials {
        config = config.trials(trials);
    }

    if let Some(output) = args.output {
        config = config.output(output);
    }

    run(&config).map(|_| ())
}
