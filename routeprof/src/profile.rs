use crate::{
    coverage::{Completion, Coverage, Warning},
    cross_slope::{CancelToken, CrossSlopeEngine, SideSlope},
    measure::Measure,
    planner::{govern, StepPlanner, StepPolicy},
    route::{Route, StationModel},
    sampler::{ContourFieldSampler, ContourSource, FieldSampler, FieldValue, GridFieldSampler, GridSource, SourceId},
    slope::along_slopes,
    ProfileError,
};
use log::{debug, warn};

/// A final station closer than this to the route end is the end.
const END_TOLERANCE_M: f64 = 1e-6;

/// The field to profile.
pub enum FieldSource<'a> {
    /// One or more rasters, finest resolution preferred.
    Grid(Vec<&'a dyn GridSource>),

    /// Iso-value lines.
    Contours(&'a dyn ContourSource),
}

/// Sampling parameters for one profiling request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProfileConfig {
    /// Minimum (and fixed-policy) spacing between stations.
    pub min_step_m: f64,

    /// Cap on the expected sample count.
    pub max_samples: usize,

    /// Raise `min_step_m` when over `max_samples` instead of only
    /// warning.
    pub auto_limit: bool,

    pub policy: StepPolicy,

    /// Flip the sign of along-route slopes.
    pub invert: bool,

    /// Side-slope transect half width; `None` skips side slopes.
    pub side_slope_half_width_m: Option<f64>,

    /// Stations between progress reports and cancellation checks.
    pub progress_cadence: usize,

    /// Distance metric; by default chosen from the route.
    pub measure: Option<Measure>,
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self {
            min_step_m: 50.0,
            max_samples: 50_000,
            auto_limit: true,
            policy: StepPolicy::Fixed,
            invert: false,
            side_slope_half_width_m: Some(200.0),
            progress_cadence: 25,
            measure: None,
        }
    }
}

impl ProfileConfig {
    fn validate(&self) -> Result<(), ProfileError> {
        let positive = |name, value: f64| {
            if value.is_finite() && value > 0.0 {
                Ok(())
            } else {
                Err(ProfileError::InvalidParameter { name, value })
            }
        };
        positive("min_step_m", self.min_step_m)?;
        if self.max_samples == 0 {
            return Err(ProfileError::InvalidParameter {
                name: "max_samples",
                value: 0.0,
            });
        }
        if let StepPolicy::Adaptive { factor } = self.policy {
            positive("factor", factor)?;
        }
        if let Some(width) = self.side_slope_half_width_m {
            positive("side_slope_half_width_m", width)?;
        }
        Ok(())
    }
}

/// One station of a [Profile].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub station_m: f64,
    pub value: Option<f64>,
    pub source: Option<SourceId>,
}

/// Field values and slopes along a route.
///
/// Every per-station vector has one entry per station. `None` is the
/// only no-data marker.
#[derive(Debug, Clone, PartialEq)]
pub struct Profile {
    /// Route length in meters.
    pub total_length_m: f64,

    /// Effective minimum step after the sample governor.
    pub min_step_m: f64,

    /// Non-decreasing distances along the route, in meters.
    pub stations: Vec<f64>,
    pub values: Vec<Option<f64>>,
    pub sources: Vec<Option<SourceId>>,

    pub along_slope_deg: Vec<Option<f64>>,
    pub along_slope_pct: Vec<Option<f64>>,

    pub side_slope_deg: Vec<Option<f64>>,
    pub side_slope_pct: Vec<Option<f64>>,
    pub port_values: Vec<Option<f64>>,
    pub starboard_values: Vec<Option<f64>>,
    pub cross_span_m: Vec<Option<f64>>,

    pub coverage: Coverage,
    pub warnings: Vec<Warning>,
    pub completion: Completion,

    /// Stations whose side slope could not be fit.
    pub underdetermined: usize,
}

impl Profile {
    pub fn builder<'a>() -> ProfileBuilder<'a> {
        ProfileBuilder {
            route: None,
            config: ProfileConfig::default(),
            progress: None,
            cancel: None,
        }
    }

    pub fn len(&self) -> usize {
        self.stations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }

    pub fn samples(&self) -> impl Iterator<Item = Sample> + '_ {
        self.stations
            .iter()
            .zip(&self.values)
            .zip(&self.sources)
            .map(|((station_m, value), source)| Sample {
                station_m: *station_m,
                value: *value,
                source: *source,
            })
    }

    /// Stations measured back from the route end.
    pub fn reversed_stations(&self) -> Vec<f64> {
        self.stations.iter().map(|s| self.total_length_m - s).collect()
    }
}

pub struct ProfileBuilder<'a> {
    route: Option<&'a Route>,
    config: ProfileConfig,
    progress: Option<&'a mut dyn FnMut(usize, usize)>,
    cancel: Option<&'a CancelToken>,
}

impl<'a> ProfileBuilder<'a> {
    pub fn route(mut self, route: &'a Route) -> Self {
        self.route = Some(route);
        self
    }

    pub fn config(mut self, config: ProfileConfig) -> Self {
        self.config = config;
        self
    }

    pub fn min_step(mut self, meters: f64) -> Self {
        self.config.min_step_m = meters;
        self
    }

    pub fn max_samples(mut self, max: usize) -> Self {
        self.config.max_samples = max;
        self
    }

    pub fn auto_limit(mut self, auto_limit: bool) -> Self {
        self.config.auto_limit = auto_limit;
        self
    }

    /// Step by `factor` source pixels.
    pub fn adaptive(mut self, factor: f64) -> Self {
        self.config.policy = StepPolicy::Adaptive { factor };
        self
    }

    pub fn invert(mut self, invert: bool) -> Self {
        self.config.invert = invert;
        self
    }

    /// Transect half width in meters, or `None` to skip side slopes.
    pub fn side_slope(mut self, half_width_m: Option<f64>) -> Self {
        self.config.side_slope_half_width_m = half_width_m;
        self
    }

    pub fn measure(mut self, measure: Measure) -> Self {
        self.config.measure = Some(measure);
        self
    }

    pub fn progress(mut self, progress: &'a mut dyn FnMut(usize, usize)) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn cancel_token(mut self, token: &'a CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn build(self, source: &FieldSource<'_>) -> Result<Profile, ProfileError> {
        let route = self.route.ok_or(ProfileError::Builder("route"))?;
        build_profile_with(route, source, &self.config, self.progress, self.cancel)
    }
}

/// Profiles `source` along `route`.
pub fn build_profile(route: &Route, source: &FieldSource<'_>, config: &ProfileConfig) -> Result<Profile, ProfileError> {
    build_profile_with(route, source, config, None, None)
}

/// [build_profile] with side-slope progress reporting and
/// cancellation.
pub fn build_profile_with(
    route: &Route,
    source: &FieldSource<'_>,
    config: &ProfileConfig,
    progress: Option<&mut dyn FnMut(usize, usize)>,
    cancel: Option<&CancelToken>,
) -> Result<Profile, ProfileError> {
    config.validate()?;
    let no_source = match source {
        FieldSource::Grid(grids) => grids.is_empty(),
        FieldSource::Contours(contours) => contours.is_empty(),
    };
    if no_source {
        return Err(ProfileError::NoFieldSource);
    }

    let measure = config.measure.unwrap_or_else(|| Measure::for_geodetic(route.is_geodetic()));
    let model = StationModel::new(route, &measure)?;
    let sampler: Box<dyn FieldSampler + '_> = match source {
        FieldSource::Grid(grids) => Box::new(GridFieldSampler::new(grids)),
        FieldSource::Contours(contours) => Box::new(ContourFieldSampler::new(*contours, &model)),
    };

    let mut warnings = Vec::new();
    if let Some(bbox) = route.bounding_rect() {
        if !sampler.overlaps(bbox) {
            warn!("{}", Warning::RouteOutsideField);
            warnings.push(Warning::RouteOutsideField);
        }
    }

    let total_length_m = model.total_length_m();
    let governed = govern(total_length_m, config.min_step_m, config.max_samples, config.auto_limit);
    warnings.extend(governed.warning);
    let planner = StepPlanner::new(config.policy, governed.min_step_m);

    let (samples, sample_runtime) = {
        let now = std::time::Instant::now();
        let mut samples: Vec<(f64, FieldValue)> = Vec::new();
        let mut station_m = 0.0;
        while station_m <= total_length_m {
            let sample = sampler.sample_at(station_m, model.interpolate(station_m));
            samples.push((station_m, sample));
            station_m = planner.next(station_m, sample.source.and_then(|id| sampler.pixel_size_m(id)));
        }

        let last_m = samples.last().map_or(0.0, |(s, _)| *s);
        if total_length_m - last_m > END_TOLERANCE_M {
            // Under the cap, the route end replaces the last interior
            // station rather than adding one.
            if config.auto_limit && samples.len() >= config.max_samples {
                samples.pop();
            }
            let sample = sampler.sample_at(total_length_m, model.interpolate(total_length_m));
            samples.push((total_length_m, sample));
        }
        (samples, now.elapsed())
    };

    let stations: Vec<f64> = samples.iter().map(|(s, _)| *s).collect();
    let values: Vec<Option<f64>> = samples.iter().map(|(_, v)| v.value).collect();
    let sources: Vec<Option<SourceId>> = samples.iter().map(|(_, v)| v.source).collect();

    let mut coverage = Coverage::default();
    values.iter().for_each(|v| coverage.record(*v));
    if let Some(warning) = coverage.warning() {
        warn!("{warning}");
        warnings.push(warning);
    }

    let along = along_slopes(&stations, &values, config.invert);
    let side = match config.side_slope_half_width_m {
        Some(half_width_m) => {
            CrossSlopeEngine::new(&model, sampler.as_ref(), half_width_m, config.progress_cadence)
                .run(&stations, progress, cancel)
        }
        None => SideSlope::empty(stations.len()),
    };

    debug!(
        "profile; len: {}, length: {total_length_m:.1} m, step: {} m, valid: {}, sample_exec: {sample_runtime:?}",
        stations.len(),
        governed.min_step_m,
        coverage.valid,
    );

    Ok(Profile {
        total_length_m,
        min_step_m: governed.min_step_m,
        stations,
        values,
        sources,
        along_slope_deg: along.deg,
        along_slope_pct: along.pct,
        side_slope_deg: side.deg,
        side_slope_pct: side.pct,
        port_values: side.port,
        starboard_values: side.starboard,
        cross_span_m: side.span_m,
        coverage,
        warnings,
        completion: side.completion,
        underdetermined: side.underdetermined,
    })
}
