use num_integer::Integer;

use crate::{BenchmarkRun, Strategy};

/// Median of `values`, or `None` if there are none.
///
/// For an odd number of values this is the middle value once sorted; for an even number it is
/// the mean of the two middle values. The input order does not matter.
///
/// # Examples
///
/// ```
/// use pool_bench::median;
///
/// assert_eq!(median(&[3.0, 1.0, 2.0]), Some(2.0));
/// assert_eq!(median(&[4.0, 1.0, 3.0, 2.0]), Some(2.5));
/// assert_eq!(median(&[]), None);
/// ```
#[must_use]
pub fn median(values: &[f64]) -> Option<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let (middle, remainder) = sorted.len().div_rem(&2);

    if remainder == 1 {
        return sorted.get(middle).copied();
    }

    let lower = *sorted.get(middle.checked_sub(1)?)?;
    let upper = *sorted.get(middle)?;

    Some(lower.midpoint(upper))
}

/// The median of every strategy column of a benchmark run, in [`Strategy::ALL`] order.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MedianRow {
    medians: [f64; Strategy::COUNT],
}

impl MedianRow {
    /// Computes each column's median independently.
    #[must_use]
    pub fn from_run(run: &BenchmarkRun) -> Self {
        Self {
            medians: Strategy::ALL.map(|strategy| {
                median(&run.column(strategy)).expect("a benchmark run is never empty")
            }),
        }
    }

    /// The median for one strategy, in seconds.
    #[must_use]
    pub fn get(&self, strategy: Strategy) -> f64 {
        *self
            .medians
            .get(strategy.index())
            .expect("strategy index is always below Strategy::COUNT")
    }

    /// All medians, in [`Strategy::ALL`] order.
    #[must_use]
    pub fn values(&self) -> &[f64; Strategy::COUNT] {
        &self.medians
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
#[allow(clippy::float_cmp, reason = "medians of exact inputs are exact")]
mod tests {
    use super::*;
    use crate::TrialResult;

    #[test]
    fn odd_length_takes_middle() {
        assert_eq!(median(&[3.0, 1.0, 2.0]), Some(2.0));
        assert_eq!(median(&[5.0]), Some(5.0));
    }

    #[test]
    fn even_length_averages_middle_pair() {
        assert_eq!(median(&[4.0, 1.0, 3.0, 2.0]), Some(2.5));
        assert_eq!(median(&[1.0, 2.0]), Some(1.5));
    }

    #[test]
    fn empty_has_no_median() {
        assert_eq!(median(&[]), None);
    }

    #[test]
    fn duplicates() {
        assert_eq!(median(&[2.0, 2.0, 2.0]), Some(2.0));
        assert_eq!(median(&[1.0, 7.0, 7.0, 1.0]), Some(4.0));
        assert_eq!(median(&[0.5, 0.5, 9.0]), Some(0.5));
    }

    #[test]
    fn order_independent() {
        let values = [0.9, 0.1, 0.5, 0.3, 0.7];
        let mut reversed = values;
        reversed.reverse();

        assert_eq!(median(&values), median(&reversed));
        assert_eq!(median(&values), Some(0.5));
    }

    #[test]
    fn does_not_reorder_input() {
        let values = [3.0, 1.0, 2.0];

        _ = median(&values);

        assert_eq!(values, [3.0, 1.0, 2.0]);
    }

    #[test]
    fn row_is_per_column() {
        let run = BenchmarkRun::new(vec![
            TrialResult::new([1.0, 9.0, 0.5, 4.0]),
            TrialResult::new([3.0, 8.0, 0.5, 1.0]),
            TrialResult::new([2.0, 7.0, 0.5, 3.0]),
            TrialResult::new([4.0, 6.0, 0.5, 2.0]),
        ])
        .unwrap();

        let row = MedianRow::from_run(&run);

        assert_eq!(row.values(), &[2.5, 7.5, 0.5, 2.5]);
        assert_eq!(row.get(Strategy::FixedThreads), 7.5);
    }

    #[test]
    fn single_trial_row_is_that_trial() {
        let trial = TrialResult::new([0.25, 0.125, 1.0, 2.0]);
        let run = BenchmarkRun::new(vec![trial]).unwrap();

        assert_eq!(MedianRow::from_run(&run).values(), trial.samples());
    }
}
