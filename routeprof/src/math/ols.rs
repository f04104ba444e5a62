//! Ordinary least squares over `(x, y)` pairs.

/// Fitted line `y = intercept + slope * x`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Regression {
    pub slope: f64,
    pub intercept: f64,
}

impl Regression {
    /// Fits a line through `points`, ignoring non-finite pairs.
    ///
    /// Returns `None` when fewer than two finite pairs remain or when
    /// every `x` is the same.
    pub fn fit<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = (f64, f64)>,
    {
        let points: Vec<(f64, f64)> = points
            .into_iter()
            .filter(|(x, y)| x.is_finite() && y.is_finite())
            .collect();
        if points.len() < 2 {
            return None;
        }

        #[allow(clippy::cast_precision_loss)]
        let n = points.len() as f64;
        let x_mean = points.iter().map(|(x, _)| x).sum::<f64>() / n;
        let y_mean = points.iter().map(|(_, y)| y).sum::<f64>() / n;

        let (sxy, sxx) = points.iter().fold((0.0, 0.0), |(sxy, sxx), (x, y)| {
            let dx = x - x_mean;
            (sxy + dx * (y - y_mean), sxx + dx * dx)
        });
        if !(sxx > 0.0) {
            return None;
        }

        let slope = sxy / sxx;
        Some(Self {
            slope,
            intercept: y_mean - slope * x_mean,
        })
    }

    pub fn predict(&self, x: f64) -> f64 {
        self.intercept + self.slope * x
    }

    /// Slope as an angle, in degrees.
    pub fn slope_deg(&self) -> f64 {
        self.slope.atan2(1.0).to_degrees()
    }

    /// Slope as a percent grade.
    pub fn slope_pct(&self) -> f64 {
        100.0 * self.slope
    }
}

/// Returns the median of the finite values in `values`.
pub fn median<I>(values: I) -> Option<f64>
where
    I: IntoIterator<Item = f64>,
{
    let mut values: Vec<f64> = values.into_iter().filter(|v| v.is_finite()).collect();
    if values.is_empty() {
        return None;
    }
    values.sort_by(f64::total_cmp);
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        Some((values[mid - 1] + values[mid]) / 2.0)
    } else {
        Some(values[mid])
    }
}

#[cfg(test)]
mod tests {
    use super::{median, Regression};
    use approx::assert_relative_eq;

    #[test]
    fn test_recovers_linear_section() {
        let points = (-5..=5).map(|i| {
            let x = f64::from(i) * 20.0;
            (x, 2.0 + 0.05 * x)
        });
        let fit = Regression::fit(points).unwrap();
        assert_relative_eq!(fit.slope, 0.05, epsilon = 1e-9);
        assert_relative_eq!(fit.intercept, 2.0, epsilon = 1e-9);
        assert_relative_eq!(fit.slope_pct(), 5.0, epsilon = 1e-7);
        assert_relative_eq!(fit.slope_deg(), 0.05_f64.atan().to_degrees(), epsilon = 1e-9);
        assert_relative_eq!(fit.predict(100.0), 7.0, epsilon = 1e-9);
    }

    #[test]
    fn test_underdetermined() {
        assert_eq!(Regression::fit([]), None);
        assert_eq!(Regression::fit([(1.0, 4.0)]), None);
        assert_eq!(Regression::fit([(1.0, 4.0), (1.0, 9.0), (1.0, 2.0)]), None);
        assert_eq!(Regression::fit([(1.0, 4.0), (f64::NAN, 9.0)]), None);
        assert!(Regression::fit([(1.0, 4.0), (f64::NAN, 9.0), (2.0, 5.0)]).is_some());
    }

    #[test]
    fn test_median() {
        assert_eq!(median([]), None);
        assert_eq!(median([3.0, 1.0, 2.0]), Some(2.0));
        assert_eq!(median([4.0, 1.0, 3.0, 2.0]), Some(2.5));
        assert_eq!(median([f64::NAN, 7.0]), Some(7.0));
    }
}
