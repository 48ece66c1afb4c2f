use std::num::NonZero;
use std::path::{Path, PathBuf};

use new_zealand::nz;

use crate::{DEFAULT_REPORT_PATH, InputBatch, WorkerCommand};

/// Number of trials in a run unless configured otherwise.
pub const DEFAULT_TRIALS: NonZero<usize> = nz!(5);

/// Everything that a benchmark run can be configured with.
///
/// The defaults reproduce the classic benchmark: the sixteen default inputs, five trials and a
/// `report.html` in the working directory, with worker processes started from the running
/// executable.
///
/// # Examples
///
/// ```
/// use new_zealand::nz;
/// use pool_bench::{BenchmarkConfig, InputBatch};
///
/// # fn main() -> pool_bench::Result<()> {
/// let config = BenchmarkConfig::new()
///     .inputs(InputBatch::from_integers([1, 2, 3])?)
///     .trials(nz!(1))
///     .output("quick.html");
///
/// assert_eq!(config.trial_count().get(), 1);
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct BenchmarkConfig {
    inputs: InputBatch,
    trials: NonZero<usize>,
    output: PathBuf,
    worker: Option<WorkerCommand>,
}

impl BenchmarkConfig {
    /// Creates a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inputs: InputBatch::default(),
            trials: DEFAULT_TRIALS,
            output: PathBuf::from(DEFAULT_REPORT_PATH),
            worker: None,
        }
    }

    /// Replaces the input batch.
    #[must_use]
    pub fn inputs(mut self, inputs: InputBatch) -> Self {
        self.inputs = inputs;
        self
    }

    /// Sets how many times every strategy is measured.
    #[must_use]
    pub fn trials(mut self, trials: NonZero<usize>) -> Self {
        self.trials = trials;
        self
    }

    /// Sets where the report is written. An existing file at this path is overwritten.
    #[must_use]
    pub fn output(mut self, output: impl Into<PathBuf>) -> Self {
        self.output = output.into();
        self
    }

    /// Sets how worker processes are started.
    ///
    /// By default, the running executable is started in worker mode, which only works if the
    /// running executable is the `pool_bench` binary.
    #[must_use]
    pub fn worker(mut self, worker: WorkerCommand) -> Self {
        self.worker = Some(worker);
        self
    }

    /// The configured input batch.
    #[must_use]
    pub fn input_batch(&self) -> &InputBatch {
        &self.inputs
    }

    /// The configured number of trials.
    #[must_use]
    pub fn trial_count(&self) -> NonZero<usize> {
        self.trials
    }

    /// The configured report path.
    #[must_use]
    pub fn output_path(&self) -> &Path {
        &self.output
    }

    /// The explicitly configured worker command, if any.
    #[must_use]
    pub fn worker_command(&self) -> Option<&WorkerCommand> {
        self.worker.as_ref()
    }
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        Self::new()
    }
}
