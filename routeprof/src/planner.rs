//! Station spacing.

use crate::coverage::Warning;
use log::warn;

/// How far to step between stations.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum StepPolicy {
    /// Always step by the minimum step.
    #[default]
    Fixed,

    /// Step by `factor` pixels of the source that produced the current
    /// sample, never less than the minimum step.
    Adaptive { factor: f64 },
}

/// Returns `floor(total_length_m / min_step_m) + 1`.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn expected_samples(total_length_m: f64, min_step_m: f64) -> usize {
    (total_length_m / min_step_m).floor() as usize + 1
}

/// Outcome of the sample-count governor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Governed {
    pub min_step_m: f64,
    pub warning: Option<Warning>,
}

/// Caps the expected sample count at `max_samples`.
///
/// With `auto_limit`, an over-cap `min_step_m` is raised to
/// `floor(total_length_m / max_samples) + 1`. Without it the step is
/// kept and a warning says the cap will be exceeded.
#[allow(clippy::cast_precision_loss)]
pub fn govern(total_length_m: f64, min_step_m: f64, max_samples: usize, auto_limit: bool) -> Governed {
    let expected = expected_samples(total_length_m, min_step_m);
    if expected <= max_samples {
        return Governed {
            min_step_m,
            warning: None,
        };
    }

    let warning = if auto_limit {
        let to_m = (total_length_m / max_samples as f64).floor() + 1.0;
        Warning::StepRaised {
            from_m: min_step_m,
            to_m,
            expected,
            max: max_samples,
        }
    } else {
        Warning::SampleCapExceeded {
            expected,
            max: max_samples,
        }
    };
    warn!("{warning}");

    Governed {
        min_step_m: match warning {
            Warning::StepRaised { to_m, .. } => to_m,
            _ => min_step_m,
        },
        warning: Some(warning),
    }
}

/// Picks the next station to sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepPlanner {
    policy: StepPolicy,
    min_step_m: f64,
}

impl StepPlanner {
    pub fn new(policy: StepPolicy, min_step_m: f64) -> Self {
        Self { policy, min_step_m }
    }

    pub fn min_step_m(&self) -> f64 {
        self.min_step_m
    }

    /// Returns the station after `station_m`, given the pixel size of
    /// the source that covered it.
    pub fn next(&self, station_m: f64, pixel_size_m: Option<f64>) -> f64 {
        let step = match self.policy {
            StepPolicy::Fixed => self.min_step_m,
            StepPolicy::Adaptive { factor } => pixel_size_m
                .filter(|px| px.is_finite() && *px > 0.0)
                .map_or(self.min_step_m, |px| self.min_step_m.max(factor * px)),
        };
        station_m + step.max(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::{expected_samples, govern, StepPlanner, StepPolicy};
    use crate::coverage::Warning;
    use approx::assert_relative_eq;

    #[test]
    fn test_governor_raises_step() {
        let governed = govern(1000.0, 1.0, 10, true);
        assert_relative_eq!(governed.min_step_m, 101.0);
        assert_eq!(
            governed.warning,
            Some(Warning::StepRaised {
                from_m: 1.0,
                to_m: 101.0,
                expected: 1001,
                max: 10
            })
        );
        assert_eq!(expected_samples(1000.0, governed.min_step_m), 10);
    }

    #[test]
    fn test_governor_bound_holds() {
        for length in [1.0, 9.5, 999.0, 1000.0, 12_345.6, 250_000.0] {
            for max in [1, 2, 3, 10, 77, 5_000] {
                for min_step in [0.5, 1.0, 3.0, 50.0] {
                    let governed = govern(length, min_step, max, true);
                    assert!(expected_samples(length, governed.min_step_m) <= max);
                    assert!(governed.min_step_m >= min_step);
                }
            }
        }
    }

    #[test]
    fn test_governor_without_auto_limit() {
        let governed = govern(1000.0, 1.0, 10, false);
        assert_relative_eq!(governed.min_step_m, 1.0);
        assert_eq!(
            governed.warning,
            Some(Warning::SampleCapExceeded {
                expected: 1001,
                max: 10
            })
        );

        assert_eq!(govern(1000.0, 100.0, 11, true).warning, None);
    }

    #[test]
    fn test_steps() {
        let fixed = StepPlanner::new(StepPolicy::Fixed, 25.0);
        assert_relative_eq!(fixed.next(100.0, Some(500.0)), 125.0);

        let adaptive = StepPlanner::new(StepPolicy::Adaptive { factor: 2.0 }, 25.0);
        assert_relative_eq!(adaptive.next(0.0, Some(30.0)), 60.0);
        assert_relative_eq!(adaptive.next(0.0, Some(5.0)), 25.0);
        assert_relative_eq!(adaptive.next(0.0, None), 25.0);
        assert_relative_eq!(adaptive.next(0.0, Some(f64::NAN)), 25.0);

        // Sub-unit steps are clamped.
        let tiny = StepPlanner::new(StepPolicy::Fixed, 0.01);
        assert_relative_eq!(tiny.next(10.0, None), 11.0);
    }
}
