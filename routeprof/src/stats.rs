use crate::{slope::seabed_length, Profile};

/// Min, max and mean of the non-null entries of a series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stats {
    pub min: f64,
    pub max: f64,
    pub avg: f64,
}

impl Stats {
    #[allow(clippy::cast_precision_loss)]
    pub fn from_series(series: &[Option<f64>]) -> Option<Self> {
        let (count, sum, min, max) = series.iter().flatten().fold(
            (0_usize, 0.0, f64::INFINITY, f64::NEG_INFINITY),
            |(count, sum, min, max), v| (count + 1, sum + v, min.min(*v), max.max(*v)),
        );
        (count > 0).then(|| Self {
            min,
            max,
            avg: sum / count as f64,
        })
    }
}

/// Largest positive entry.
fn max_positive(series: &[Option<f64>]) -> Option<f64> {
    series.iter().flatten().copied().filter(|v| *v > 0.0).reduce(f64::max)
}

/// Most negative entry.
fn min_negative(series: &[Option<f64>]) -> Option<f64> {
    series.iter().flatten().copied().filter(|v| *v < 0.0).reduce(f64::min)
}

/// Aggregate figures for a [Profile].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProfileSummary {
    pub total_length_m: f64,
    pub valid: usize,
    pub missing: usize,

    pub value: Option<Stats>,
    pub along_slope_deg: Option<Stats>,
    pub side_slope_deg: Option<Stats>,

    pub slope_up_max_deg: Option<f64>,
    pub slope_down_min_deg: Option<f64>,
    pub side_starboard_max_deg: Option<f64>,
    pub side_port_min_deg: Option<f64>,

    /// Length following the surface between valid samples.
    pub seabed_length_m: f64,

    /// `seabed_length_m / total_length_m`.
    pub elongation: Option<f64>,
}

impl Profile {
    pub fn summary(&self) -> ProfileSummary {
        let seabed_length_m = seabed_length(&self.stations, &self.values);
        ProfileSummary {
            total_length_m: self.total_length_m,
            valid: self.coverage.valid,
            missing: self.coverage.missing,
            value: Stats::from_series(&self.values),
            along_slope_deg: Stats::from_series(&self.along_slope_deg),
            side_slope_deg: Stats::from_series(&self.side_slope_deg),
            slope_up_max_deg: max_positive(&self.along_slope_deg),
            slope_down_min_deg: min_negative(&self.along_slope_deg),
            side_starboard_max_deg: max_positive(&self.side_slope_deg),
            side_port_min_deg: min_negative(&self.side_slope_deg),
            seabed_length_m,
            elongation: (self.total_length_m > 0.0 && seabed_length_m > 0.0)
                .then(|| seabed_length_m / self.total_length_m),
        }
    }
}
