use num_traits::{Float, FromPrimitive};

/// Returns `n` evenly spaced values over `[start, end]`.
///
/// The last value is exactly `end`, so symmetric ranges keep their
/// endpoints and center.
pub fn linspace<T>(start: T, end: T, n: usize) -> impl Iterator<Item = T>
where
    T: Float + FromPrimitive,
{
    let intervals = n.saturating_sub(1).max(1);
    let step = (end - start) / T::from_usize(intervals).unwrap_or_else(T::one);
    (0..n).map(move |i| {
        if n > 1 && i == n - 1 {
            end
        } else {
            start + T::from_usize(i).unwrap_or_else(T::zero) * step
        }
    })
}
