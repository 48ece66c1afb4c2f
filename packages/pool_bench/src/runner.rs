use std::num::NonZero;
use std::time::{Duration, Instant};

use crate::{InputBatch, ProcessPool, Result, Strategy, ThreadPool, WorkerCommand, compute};

/// What the strategy runners need to know about the host and about how to start workers.
#[derive(Clone, Debug)]
pub struct Context {
    worker: WorkerCommand,
    cpu_count: NonZero<usize>,
}

impl Context {
    /// Creates a context that starts worker processes with `worker` and sizes the elastic
    /// process pool to `cpu_count` processes.
    #[must_use]
    pub fn new(worker: WorkerCommand, cpu_count: NonZero<usize>) -> Self {
        Self { worker, cpu_count }
    }

    /// How worker processes are started.
    #[must_use]
    pub fn worker(&self) -> &WorkerCommand {
        &self.worker
    }

    /// Width of the process pool used by [`Strategy::CpuProcesses`].
    #[must_use]
    pub fn cpu_count(&self) -> NonZero<usize> {
        self.cpu_count
    }
}

/// Executes the whole batch under `strategy` and returns the elapsed wall-clock time.
///
/// The measurement brackets pool construction, distribution of the inputs, collection of every
/// result and pool teardown. The caller is blocked until all of it has completed.
///
/// # Errors
///
/// Any failure to create, use or tear down a pool is returned as-is.
pub fn run_strategy(strategy: Strategy, batch: &InputBatch, context: &Context) -> Result<Duration> {
    measure(strategy, batch, context).map(|(elapsed, _)| elapsed)
}

/// Executes the whole batch under `strategy` and returns the computed sums, in batch order.
///
/// This is the same work as [`run_strategy()`], for callers that care about the values
/// rather than the timing.
///
/// # Errors
///
/// Any failure to create, use or tear down a pool is returned as-is.
pub fn evaluate_strategy(
    strategy: Strategy,
    batch: &InputBatch,
    context: &Context,
) -> Result<Vec<u128>> {
    measure(strategy, batch, context).map(|(_, results)| results)
}

fn measure(
    strategy: Strategy,
    batch: &InputBatch,
    context: &Context,
) -> Result<(Duration, Vec<u128>)> {
    let worker_count = strategy.worker_count(context.cpu_count);

    let start = Instant::now();

    let results = if strategy.is_multiprocess() {
        compute_multiprocess(batch, context.worker(), worker_count)?
    } else if worker_count.get() == 1 {
        compute_serial(batch)
    } else {
        compute_threaded(batch, worker_count)?
    };

    let elapsed = start.elapsed();

    tracing::debug!(
        %strategy,
        multiprocess = strategy.is_multiprocess(),
        worker_count = worker_count.get(),
        elapsed_secs = elapsed.as_secs_f64(),
        "strategy measured"
    );

    Ok((elapsed, results))
}

fn compute_serial(batch: &InputBatch) -> Vec<u128> {
    batch.iter().map(compute).collect()
}

fn compute_threaded(batch: &InputBatch, thread_count: NonZero<usize>) -> Result<Vec<u128>> {
    let mut pool = ThreadPool::new(thread_count)?;
    let results = pool.map(batch.iter(), compute);

    // Teardown is part of the measurement.
    drop(pool);

    Ok(results)
}

fn compute_multiprocess(
    batch: &InputBatch,
    worker: &WorkerCommand,
    process_count: NonZero<usize>,
) -> Result<Vec<u128>> {
    let mut pool = ProcessPool::new(worker, process_count)?;
    let results = pool.map(batch)?;
    pool.shutdown()?;

    Ok(results)
}
