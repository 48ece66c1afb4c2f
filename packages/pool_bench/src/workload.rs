use std::hint::black_box;

/// Computes `1 + 2 + ... + n` by adding every integer in turn.
///
/// The sum is deliberately not computed in closed form: the point is to create CPU load that is
/// proportional to `n`. The accumulator is passed through [`black_box`] on every step so the
/// optimizer cannot fold the loop back into `n * (n + 1) / 2`.
///
/// The result is a `u128`, which holds the sum for every `u64` input.
///
/// # Examples
///
/// ```
/// assert_eq!(pool_bench::compute(4), 10);
/// ```
#[must_use]
pub fn compute(n: u64) -> u128 {
    let mut total: u128 = 0;

    for i in 1..=n {
        total = black_box(total.wrapping_add(u128::from(i)));
    }

    total
}
