use std::env;
use std::ffi::OsString;
use std::io::{BufRead, BufReader, Write};
use std::num::NonZero;
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use std::sync::atomic::{self, AtomicBool, AtomicUsize};
use std::thread;

use crate::wire::{Request, decode_response, encode_request};
use crate::{Error, InputBatch, Result};

/// Argument that switches the `pool_bench` binary into worker mode.
pub const WORKER_SUBCOMMAND: &str = "worker";

/// The program, and its arguments, that starts one worker process.
///
/// The started process must speak the worker protocol on its standard input and output, which
/// is what [`serve()`][crate::serve] implements.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct WorkerCommand {
    program: PathBuf,
    args: Vec<OsString>,
}

impl WorkerCommand {
    /// Creates a command that starts `program` without arguments.
    #[must_use]
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// The worker mode of the currently running executable.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SpawnProcess`] if the path of the current executable cannot be
    /// determined.
    pub fn current_exe() -> Result<Self> {
        let program = env::current_exe().map_err(|source| Error::SpawnProcess {
            program: PathBuf::from("<current executable>"),
            source,
        })?;

        Ok(Self::new(program).arg(WORKER_SUBCOMMAND))
    }

    /// Appends an argument to pass to the worker program.
    #[must_use]
    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// The program that is started for every worker.
    #[must_use]
    pub fn program(&self) -> &Path {
        &self.program
    }

    fn spawn(&self) -> Result<Child> {
        Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|source| Error::SpawnProcess {
                program: self.program.clone(),
                source,
            })
    }
}

/// Bounded pool of worker processes, each with its own isolated memory.
///
/// Inputs are sent to the workers and results are sent back over pipes, so the cost of
/// marshaling data across the process boundary is part of what a measurement captures.
///
/// The pool is scoped to a single measurement: create it, call [`map()`][Self::map], then call
/// [`shutdown()`][Self::shutdown]. A pool that is dropped without being shut down kills and
/// reaps its workers.
#[derive(Debug)]
pub struct ProcessPool {
    workers: Vec<Worker>,
}

impl ProcessPool {
    /// Starts exactly `process_count` worker processes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SpawnProcess`] if any worker cannot be started. Workers that were
    /// already started are killed before the error is returned.
    pub fn new(command: &WorkerCommand, process_count: NonZero<usize>) -> Result<Self> {
        let workers = (0..process_count.get())
            .map(|_| Worker::spawn(command))
            .collect::<Result<Vec<_>>>()?;

        tracing::debug!(
            process_count = process_count.get(),
            program = %command.program().display(),
            "process pool started"
        );

        Ok(Self { workers })
    }

    /// Returns the number of worker processes in the pool.
    #[must_use]
    pub fn process_count(&self) -> NonZero<usize> {
        NonZero::new(self.workers.len()).expect("guarded by constructor - pool is never empty")
    }

    /// Computes the workload for every input in `batch`, blocking until all results are in.
    ///
    /// Each worker process is fed by its own coordinator thread, which pulls the next
    /// unclaimed input from a shared queue until the batch is exhausted. The returned results
    /// are positionally matched to the inputs.
    ///
    /// # Errors
    ///
    /// Any pipe failure, protocol violation or lost worker fails the whole batch. Remaining
    /// inputs are not handed out once a failure has been observed.
    pub fn map(&mut self, batch: &InputBatch) -> Result<Vec<u128>> {
        let inputs = batch.inputs();
        let next_index = AtomicUsize::new(0);
        let aborted = AtomicBool::new(false);

        let per_worker = thread::scope(|scope| {
            let next_index = &next_index;
            let aborted = &aborted;

            let handles = self
                .workers
                .iter_mut()
                .map(|worker| scope.spawn(move || worker.drain(inputs, next_index, aborted)))
                .collect::<Vec<_>>();

            handles
                .into_iter()
                .map(|handle| {
                    handle
                        .join()
                        .expect("coordinator thread panicked - this is a pool defect")
                })
                .collect::<Vec<_>>()
        });

        let mut results = vec![None; inputs.len()];

        for answered in per_worker {
            for (index, sum) in answered? {
                let slot = results
                    .get_mut(index)
                    .expect("index was taken from the batch so it must be in range");
                *slot = Some(sum);
            }
        }

        Ok(results
            .into_iter()
            .map(|sum| sum.expect("every index is claimed by exactly one worker"))
            .collect())
    }

    /// Closes the input of every worker and waits for all of them to exit.
    ///
    /// # Errors
    ///
    /// Returns [`Error::WorkerExit`] if any worker exits unsuccessfully, or
    /// [`Error::WorkerIo`] if waiting on a worker fails. Every worker is waited for even if
    /// an earlier one failed.
    pub fn shutdown(mut self) -> Result<()> {
        let mut outcome = Ok(());

        for worker in &mut self.workers {
            let result = worker.finish();

            if outcome.is_ok() {
                outcome = result;
            }
        }

        tracing::debug!(
            process_count = self.workers.len(),
            "process pool stopped"
        );

        outcome
    }
}

#[derive(Debug)]
struct Worker {
    child: Child,

    // `None` once the worker has been told to finish.
    stdin: Option<ChildStdin>,
    stdout: BufReader<ChildStdout>,
}

impl Worker {
    fn spawn(command: &WorkerCommand) -> Result<Self> {
        let mut child = command.spawn()?;

        let stdin = child.stdin.take().expect("stdin was configured as piped");
        let stdout = child.stdout.take().expect("stdout was configured as piped");

        Ok(Self {
            child,
            stdin: Some(stdin),
            stdout: BufReader::new(stdout),
        })
    }

    fn drain(
        &mut self,
        inputs: &[NonZero<u64>],
        next_index: &AtomicUsize,
        aborted: &AtomicBool,
    ) -> Result<Vec<(usize, u128)>> {
        let mut answered = Vec::new();

        while !aborted.load(atomic::Ordering::Relaxed) {
            let index = next_index.fetch_add(1, atomic::Ordering::Relaxed);

            let Some(n) = inputs.get(index) else {
                break;
            };

            match self.call(Request { index, n: n.get() }) {
                Ok(sum) => answered.push((index, sum)),
                Err(e) => {
                    aborted.store(true, atomic::Ordering::Relaxed);
                    return Err(e);
                }
            }
        }

        Ok(answered)
    }

    fn call(&mut self, request: Request) -> Result<u128> {
        let stdin = self
            .stdin
            .as_mut()
            .expect("type invariant - requests are only sent before finish()");

        stdin.write_all(encode_request(request).as_bytes())?;
        stdin.flush()?;

        let mut line = String::new();
        if self.stdout.read_line(&mut line)? == 0 {
            return Err(Error::WorkerLost);
        }

        let response = decode_response(&line)?;

        if response.index != request.index {
            return Err(Error::Protocol {
                line: line.trim_end().to_string(),
            });
        }

        Ok(response.sum)
    }

    fn finish(&mut self) -> Result<()> {
        // Closing stdin delivers end of file, which is the signal for the worker to exit.
        drop(self.stdin.take());

        let status = self.child.wait()?;

        if status.success() {
            Ok(())
        } else {
            Err(Error::WorkerExit { status })
        }
    }
}

impl Drop for Worker {
    #[cfg_attr(test, mutants::skip)] // Impractical to test that a process stops existing.
    fn drop(&mut self) {
        if self.stdin.is_none() {
            // Already finished and reaped.
            return;
        }

        drop(self.stdin.take());

        // The worker may be stuck mid-batch after an error, so it is not asked nicely.
        if let Err(e) = self.child.kill() {
            tracing::trace!(error = %e, "worker process already exited");
        }

        if let Err(e) = self.child.wait() {
            tracing::warn!(error = %e, "failed to reap worker process");
        }
    }
}
