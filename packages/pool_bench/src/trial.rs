use std::num::NonZero;
use std::time::Duration;

use crate::{Context, Error, InputBatch, Result, Strategy, run_strategy};

/// Timings of one trial: one sample, in seconds, for each strategy in [`Strategy::ALL`] order.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrialResult {
    samples: [f64; Strategy::COUNT],
}

impl TrialResult {
    /// Creates a trial result from samples in [`Strategy::ALL`] order.
    ///
    /// # Panics
    ///
    /// Panics in debug builds if any sample is negative or not finite.
    #[must_use]
    pub fn new(samples: [f64; Strategy::COUNT]) -> Self {
        debug_assert!(
            samples.iter().all(|s| s.is_finite() && *s >= 0.0),
            "timing samples must be finite and non-negative: {samples:?}"
        );

        Self { samples }
    }

    /// Creates a trial result from measured durations in [`Strategy::ALL`] order.
    #[must_use]
    pub fn from_durations(durations: [Duration; Strategy::COUNT]) -> Self {
        Self::new(durations.map(|d| d.as_secs_f64()))
    }

    /// The sample for one strategy, in seconds.
    #[must_use]
    pub fn get(&self, strategy: Strategy) -> f64 {
        *self
            .samples
            .get(strategy.index())
            .expect("strategy index is always below Strategy::COUNT")
    }

    /// All samples, in [`Strategy::ALL`] order.
    #[must_use]
    pub fn samples(&self) -> &[f64; Strategy::COUNT] {
        &self.samples
    }
}

/// Every trial of one benchmark run, in execution order. Never empty.
#[derive(Clone, Debug, PartialEq)]
pub struct BenchmarkRun {
    trials: Vec<TrialResult>,
}

impl BenchmarkRun {
    /// Wraps already measured trials.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if `trials` is empty.
    pub fn new(trials: Vec<TrialResult>) -> Result<Self> {
        if trials.is_empty() {
            return Err(Error::InvalidInput(
                "a benchmark run needs at least one trial".to_string(),
            ));
        }

        Ok(Self { trials })
    }

    /// The trials, in the order they were executed.
    #[must_use]
    pub fn trials(&self) -> &[TrialResult] {
        &self.trials
    }

    /// Number of trials in the run.
    #[must_use]
    pub fn len(&self) -> NonZero<usize> {
        NonZero::new(self.trials.len()).expect("guarded by constructor - a run is never empty")
    }

    /// All samples for one strategy, in trial order.
    #[must_use]
    pub fn column(&self, strategy: Strategy) -> Vec<f64> {
        self.trials.iter().map(|trial| trial.get(strategy)).collect()
    }
}

/// Runs every strategy once per trial, in fixed order, for `trials` trials.
///
/// Progress is printed to stdout as the run proceeds.
///
/// # Errors
///
/// The first strategy that fails aborts the whole run. Nothing is skipped or retried.
pub fn run_trials(
    batch: &InputBatch,
    trials: NonZero<usize>,
    context: &Context,
) -> Result<BenchmarkRun> {
    let trials = (1..=trials.get())
        .map(|number| {
            println!("Execution #{number}");
            run_trial(batch, context)
        })
        .collect::<Result<Vec<_>>>()?;

    BenchmarkRun::new(trials)
}

fn run_trial(batch: &InputBatch, context: &Context) -> Result<TrialResult> {
    let mut durations = [Duration::ZERO; Strategy::COUNT];

    for (strategy, slot) in Strategy::ALL.into_iter().zip(&mut durations) {
        println!("Running {strategy} benchmark...");

        let elapsed = run_strategy(strategy, batch, context)?;

        println!("DONE in {}s.", elapsed.as_secs_f64());

        *slot = elapsed;
    }

    Ok(TrialResult::from_durations(durations))
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
#[allow(clippy::float_cmp, reason = "samples built from exact inputs are exact")]
mod tests {
    use super::*;

    #[test]
    fn trial_result_accessors() {
        let trial = TrialResult::new([1.0, 2.0, 3.0, 4.0]);

        assert_eq!(trial.get(Strategy::Serial), 1.0);
        assert_eq!(trial.get(Strategy::CpuProcesses), 4.0);
        assert_eq!(trial.samples().len(), Strategy::COUNT);
    }

    #[test]
    fn from_durations_converts_to_seconds() {
        let trial = TrialResult::from_durations([
            Duration::from_millis(1_500),
            Duration::ZERO,
            Duration::from_secs(2),
            Duration::from_micros(250),
        ]);

        assert_eq!(trial.samples(), &[1.5, 0.0, 2.0, 0.000_25]);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic]
    fn negative_sample_is_rejected() {
        let _trial = TrialResult::new([1.0, -0.5, 0.0, 0.0]);
    }

    #[test]
    fn empty_run_is_rejected() {
        assert!(matches!(
            BenchmarkRun::new(Vec::new()),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn column_follows_trial_order() {
        let run = BenchmarkRun::new(vec![
            TrialResult::new([1.0, 10.0, 100.0, 1000.0]),
            TrialResult::new([2.0, 20.0, 200.0, 2000.0]),
        ])
        .unwrap();

        assert_eq!(run.len().get(), 2);
        assert_eq!(run.column(Strategy::FixedThreads), vec![10.0, 20.0]);
        assert_eq!(run.column(Strategy::FixedProcesses), vec![100.0, 200.0]);
    }
}
