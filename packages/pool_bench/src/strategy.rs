use std::num::NonZero;

use derive_more::Display;
use new_zealand::nz;

/// Width of the fixed-size thread and process pools.
pub const FIXED_WORKER_COUNT: NonZero<usize> = nz!(4);

/// One of the four ways the benchmark executes the input batch.
///
/// The variants are listed in report order, which is also the order in which every trial runs
/// them. The `Display` form is the label used in progress output.
#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq)]
#[expect(
    clippy::exhaustive_enums,
    reason = "the four strategies are the shape of every trial result"
)]
pub enum Strategy {
    /// Every input is computed in turn on the calling thread.
    #[display("1-threaded")]
    Serial,

    /// Inputs are distributed across a pool of [`FIXED_WORKER_COUNT`] threads.
    #[display("4-threaded")]
    FixedThreads,

    /// Inputs are distributed across a pool of [`FIXED_WORKER_COUNT`] worker processes.
    #[display("4 processes")]
    FixedProcesses,

    /// Inputs are distributed across one worker process per logical CPU.
    #[display("CPU-based multiprocessed")]
    CpuProcesses,
}

impl Strategy {
    /// Number of strategies, which is also the width of every trial result.
    pub const COUNT: usize = 4;

    /// All strategies, in report order.
    pub const ALL: [Self; Self::COUNT] = [
        Self::Serial,
        Self::FixedThreads,
        Self::FixedProcesses,
        Self::CpuProcesses,
    ];

    /// Position of this strategy in [`Strategy::ALL`] and in every trial result.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Serial => 0,
            Self::FixedThreads => 1,
            Self::FixedProcesses => 2,
            Self::CpuProcesses => 3,
        }
    }

    /// Column header used in the report tables.
    #[must_use]
    pub const fn column_header(self) -> &'static str {
        match self {
            Self::Serial => "1&nbsp;thread (s)",
            Self::FixedThreads => "4&nbsp;threads (s)",
            Self::FixedProcesses => "4&nbsp;processes (s)",
            Self::CpuProcesses => "processes based on number of CPUs (s)",
        }
    }

    /// How many workers execute the batch under this strategy, given the number of logical
    /// processors available to the process.
    #[must_use]
    pub const fn worker_count(self, cpu_count: NonZero<usize>) -> NonZero<usize> {
        match self {
            Self::Serial => nz!(1),
            Self::FixedThreads | Self::FixedProcesses => FIXED_WORKER_COUNT,
            Self::CpuProcesses => cpu_count,
        }
    }

    /// Whether the workers are separate processes rather than threads of this process.
    #[must_use]
    pub const fn is_multiprocess(self) -> bool {
        matches!(self, Self::FixedProcesses | Self::CpuProcesses)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn index_matches_all_order() {
        for (position, strategy) in Strategy::ALL.into_iter().enumerate() {
            assert_eq!(strategy.index(), position);
        }
    }

    #[test]
    fn worker_counts() {
        let cpus = nz!(12);

        assert_eq!(Strategy::Serial.worker_count(cpus).get(), 1);
        assert_eq!(Strategy::FixedThreads.worker_count(cpus).get(), 4);
        assert_eq!(Strategy::FixedProcesses.worker_count(cpus).get(), 4);
        assert_eq!(Strategy::CpuProcesses.worker_count(cpus).get(), 12);
    }

    #[test]
    fn labels() {
        assert_eq!(Strategy::Serial.to_string(), "1-threaded");
        assert_eq!(Strategy::FixedThreads.to_string(), "4-threaded");
        assert_eq!(Strategy::FixedProcesses.to_string(), "4 processes");
        assert_eq!(
            Strategy::CpuProcesses.to_string(),
            "CPU-based multiprocessed"
        );
    }

    #[test]
    fn multiprocess_flag() {
        assert!(!Strategy::Serial.is_multiprocess());
        assert!(!Strategy::FixedThreads.is_multiprocess());
        assert!(Strategy::FixedProcesses.is_multiprocess());
        assert!(Strategy::CpuProcesses.is_multiprocess());
    }
}
