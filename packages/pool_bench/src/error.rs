use std::io;
use std::path::PathBuf;
use std::process::ExitStatus;

use thiserror::Error;

/// Errors that can abort a benchmark run.
///
/// None of these are recovered from. The first error encountered ends the run and no report
/// is produced.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// A worker thread for the thread pool could not be started.
    #[error("failed to spawn benchmark worker thread: {0}")]
    SpawnThread(#[source] io::Error),

    /// A worker process for the process pool could not be started.
    #[error("failed to spawn benchmark worker process '{}': {source}", program.display())]
    SpawnProcess {
        /// The program that was being started.
        program: PathBuf,

        /// The underlying operating system error.
        source: io::Error,
    },

    /// Reading from or writing to a worker process pipe failed.
    #[error("worker process I/O failed: {0}")]
    WorkerIo(#[from] io::Error),

    /// A worker process closed its output before answering every request sent to it.
    #[error("worker process closed its output before answering")]
    WorkerLost,

    /// A worker process exited with a failure status.
    #[error("worker process exited unsuccessfully: {status}")]
    WorkerExit {
        /// The exit status reported by the operating system.
        status: ExitStatus,
    },

    /// A line exchanged with a worker process did not match the expected format.
    #[error("malformed worker protocol line: '{line}'")]
    Protocol {
        /// The offending line, without its line terminator.
        line: String,
    },

    /// The report could not be written to its destination.
    #[error("failed to write report to '{}': {source}", path.display())]
    WriteReport {
        /// Where the report was being written.
        path: PathBuf,

        /// The underlying operating system error.
        source: io::Error,
    },

    /// The caller supplied input that cannot be benchmarked.
    #[error("invalid benchmark input: {0}")]
    InvalidInput(String),
}

/// A specialized `Result` type for benchmark operations, returning the crate's
/// [`Error`] type as the error value.
pub type Result<T> = std::result::Result<T, Error>;
