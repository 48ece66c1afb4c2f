use std::num::NonZero;
use std::sync::{Arc, Mutex, PoisonError, mpsc};
use std::thread::{self, JoinHandle};

use crate::{Error, Result};

/// Bounded pool of worker threads that pull jobs from one shared task queue.
///
/// All workers share the address space of the calling process. The pool is scoped to a single
/// measurement: create it, call [`map()`][Self::map], then drop it.
///
/// # Lifecycle
///
/// Dropping the pool closes the task queue and waits for every worker thread to finish.
#[derive(Debug)]
pub struct ThreadPool {
    // Only `None` after drop has started.
    job_tx: Option<mpsc::Sender<Job>>,
    join_handles: Vec<JoinHandle<()>>,
    thread_count: NonZero<usize>,
}

type Job = Box<dyn FnOnce() + Send>;

impl ThreadPool {
    /// Starts a pool with exactly `thread_count` worker threads.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SpawnThread`] if the operating system refuses to create a thread.
    /// Workers that were already started shut down on their own because the queue closes.
    pub fn new(thread_count: NonZero<usize>) -> Result<Self> {
        let (job_tx, job_rx) = mpsc::channel::<Job>();
        let job_rx = Arc::new(Mutex::new(job_rx));

        let join_handles = (0..thread_count.get())
            .map(|index| {
                thread::Builder::new()
                    .name(format!("pool_bench-worker-{index}"))
                    .spawn({
                        let job_rx = Arc::clone(&job_rx);
                        move || worker_entrypoint(&job_rx)
                    })
                    .map_err(Error::SpawnThread)
            })
            .collect::<Result<Vec<_>>>()?;

        tracing::debug!(thread_count = thread_count.get(), "thread pool started");

        Ok(Self {
            job_tx: Some(job_tx),
            join_handles,
            thread_count,
        })
    }

    /// Returns the number of threads in the pool.
    #[must_use]
    pub fn thread_count(&self) -> NonZero<usize> {
        self.thread_count
    }

    /// Applies `f` to every input on the pool's threads, blocking until all results are in.
    ///
    /// Inputs may be computed in any order and on any worker, but the returned results are
    /// positionally matched to `inputs`.
    ///
    /// # Panics
    ///
    /// Panics if `f` panics on a worker thread.
    pub fn map<T, R, F>(&mut self, inputs: impl IntoIterator<Item = T>, f: F) -> Vec<R>
    where
        T: Send + 'static,
        R: Send + 'static,
        F: Fn(T) -> R + Send + Sync + 'static,
    {
        let job_tx = self
            .job_tx
            .as_ref()
            .expect("type invariant - queue is only closed during drop");

        let f = Arc::new(f);

        let result_rxs = inputs
            .into_iter()
            .map(|input| {
                let (result_tx, result_rx) = oneshot::channel::<R>();

                job_tx
                    .send(Box::new({
                        let f = Arc::clone(&f);

                        move || {
                            result_tx
                                .send(f(input))
                                .expect("receiver must still exist - map() waits for every result");
                        }
                    }))
                    .expect("worker threads must still exist - pool cannot operate without workers");

                result_rx
            })
            .collect::<Vec<_>>();

        result_rxs
            .into_iter()
            .map(|rx| {
                rx.recv()
                    .expect("worker thread failed to send result - did it panic?")
            })
            .collect()
    }
}

impl Drop for ThreadPool {
    #[cfg_attr(test, mutants::skip)] // Impractical to test that stuff stops happening.
    fn drop(&mut self) {
        // Workers exit once the queue is closed and drained.
        drop(self.job_tx.take());

        if thread::panicking() {
            // Joining may hang or hide the original panic, so leave the workers be.
            return;
        }

        for handle in self.join_handles.drain(..) {
            handle
                .join()
                .expect("worker thread panicked outside of a job - this is a pool defect");
        }

        tracing::debug!(thread_count = self.thread_count.get(), "thread pool stopped");
    }
}

#[cfg_attr(test, mutants::skip)] // Impractical to test that things do not happen when worker function is missing.
fn worker_entrypoint(job_rx: &Mutex<mpsc::Receiver<Job>>) {
    loop {
        // The lock is released before the job runs, so other workers can pick up the next job.
        let job = job_rx
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .recv();

        match job {
            Ok(job) => job(),
            Err(mpsc::RecvError) => return,
        }
    }
}
