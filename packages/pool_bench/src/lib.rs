#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Compares the wall-clock cost of computing a batch of CPU-bound tasks under four execution
//! strategies and renders the results as an HTML report.
//!
//! The workload is [`compute()`], which sums `1..=n` one term at a time. The strategies are:
//!
//! * [`Strategy::Serial`] - every input in turn, on the calling thread;
//! * [`Strategy::FixedThreads`] - a [`ThreadPool`] of 4 threads;
//! * [`Strategy::FixedProcesses`] - a [`ProcessPool`] of 4 worker processes;
//! * [`Strategy::CpuProcesses`] - a [`ProcessPool`] with one worker per logical processor.
//!
//! Every strategy is run once per trial, in that order, for a number of trials. The
//! [`BenchmarkRun`] collects the timings, [`MedianRow`] summarizes them and [`Report`] renders
//! both together with the detected [`Environment`].
//!
//! # Pools
//!
//! Each pool is created immediately before it is measured and torn down before the next strategy
//! starts. The timing includes pool construction, all the work, and teardown.
//!
//! Worker processes are instances of the `pool_bench` binary started with the `worker`
//! subcommand (see [`WorkerCommand`]). They exchange one line of text per input and result with
//! the coordinator over their standard input and output, so the cost of crossing the process
//! boundary is part of what gets measured.
//!
//! # Failure
//!
//! Nothing is retried. The first error aborts the whole run and no report is written.
//!
//! # Example
//!
//! ```no_run
//! use pool_bench::{BenchmarkConfig, run};
//!
//! # fn main() -> pool_bench::Result<()> {
//! let summary = run(&BenchmarkConfig::default())?;
//! println!("Report written to {}", summary.output_path().display());
//! # Ok(())
//! # }
//! ```

mod batch;
mod config;
mod environment;
mod error;
mod median;
mod process_pool;
mod report;
mod runner;
mod strategy;
mod thread_pool;
mod trial;
mod wire;
mod worker;
mod workload;

use std::path::{Path, PathBuf};

pub use batch::*;
pub use config::*;
pub use environment::*;
pub use error::*;
pub use median::*;
pub use process_pool::*;
pub use report::*;
pub use runner::*;
pub use strategy::*;
pub use thread_pool::*;
pub use trial::*;
pub use worker::*;
pub use workload::*;

/// Everything a completed benchmark run produced.
#[derive(Clone, Debug)]
pub struct RunSummary {
    run: BenchmarkRun,
    medians: MedianRow,
    environment: Environment,
    output: PathBuf,
}

impl RunSummary {
    /// The timings of every trial.
    #[must_use]
    pub fn run(&self) -> &BenchmarkRun {
        &self.run
    }

    /// The per-strategy medians.
    #[must_use]
    pub fn medians(&self) -> &MedianRow {
        &self.medians
    }

    /// The environment the run was measured in.
    #[must_use]
    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    /// Where the report was written.
    #[must_use]
    pub fn output_path(&self) -> &Path {
        &self.output
    }
}

/// Runs the benchmark described by `config` and writes the report.
///
/// Progress is printed to stdout, ending with a confirmation of where the report was saved.
///
/// # Errors
///
/// Returns the first error from any strategy or from writing the report. Nothing is retried
/// and no report is written if a strategy fails.
pub fn run(config: &BenchmarkConfig) -> Result<RunSummary> {
    let worker = match config.worker_command() {
        Some(worker) => worker.clone(),
        None => WorkerCommand::current_exe()?,
    };

    let environment = Environment::detect();
    let context = Context::new(worker, environment.cpu_count());

    let run = run_trials(config.input_batch(), config.trial_count(), &context)?;
    let medians = MedianRow::from_run(&run);

    let output = config.output_path().to_path_buf();
    Report::new(&run, &medians, &environment).write_to(&output)?;

    println!("The report has been saved to {}", output.display());

    Ok(RunSummary {
        run,
        medians,
        environment,
        output,
    })
}
