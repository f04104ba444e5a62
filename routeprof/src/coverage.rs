use std::fmt;

/// Advisory conditions raised while building a profile.
///
/// None of these prevent a profile from being returned.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Warning {
    /// No station found a value.
    NoCoverage,

    /// Some stations found no value; `ratio` is valid / total.
    PartialCoverage { ratio: f64 },

    /// The sample governor raised the minimum step.
    StepRaised {
        from_m: f64,
        to_m: f64,
        expected: usize,
        max: usize,
    },

    /// Auto-limiting is off and the expected sample count is over the
    /// cap.
    SampleCapExceeded { expected: usize, max: usize },

    /// The route does not overlap any field source.
    RouteOutsideField,
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoCoverage => write!(f, "no field coverage along the route"),
            Self::PartialCoverage { ratio } => {
                write!(f, "partial coverage: {:.1}% of stations have a value", ratio * 100.0)
            }
            Self::StepRaised {
                from_m,
                to_m,
                expected,
                max,
            } => write!(
                f,
                "{expected} samples expected, over the cap of {max}; min step raised from {from_m} m to {to_m} m"
            ),
            Self::SampleCapExceeded { expected, max } => {
                write!(f, "{expected} samples expected, over the cap of {max}")
            }
            Self::RouteOutsideField => write!(f, "route lies outside every field source"),
        }
    }
}

/// Valid and missing sample tallies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Coverage {
    pub valid: usize,
    pub missing: usize,
}

impl Coverage {
    pub fn record(&mut self, value: Option<f64>) {
        if value.is_some() {
            self.valid += 1;
        } else {
            self.missing += 1;
        }
    }

    pub fn total(&self) -> usize {
        self.valid + self.missing
    }

    /// Fraction of samples with a value, `0.0` when empty.
    #[allow(clippy::cast_precision_loss)]
    pub fn ratio(&self) -> f64 {
        match self.total() {
            0 => 0.0,
            total => self.valid as f64 / total as f64,
        }
    }

    pub fn warning(&self) -> Option<Warning> {
        if self.valid == 0 {
            Some(Warning::NoCoverage)
        } else if self.missing > 0 {
            Some(Warning::PartialCoverage {
                ratio: self.ratio(),
            })
        } else {
            None
        }
    }
}

/// Whether every requested stage ran to the end.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Completion {
    #[default]
    Complete,

    /// Side slopes stopped after `processed_stations`; the rest are
    /// `None`.
    Cancelled { processed_stations: usize },
}

impl Completion {
    pub fn is_complete(&self) -> bool {
        matches!(self, Self::Complete)
    }
}
