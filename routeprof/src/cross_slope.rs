//! Side slope: OLS over transects perpendicular to the route.

use crate::{
    coverage::Completion,
    math::{linspace, median, Regression},
    route::StationModel,
    sampler::{FieldSampler, Transect},
};
use geo::geometry::Coord;
use log::debug;
use std::{
    f64::consts::{FRAC_PI_2, PI},
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};

/// Bounds on the half-distance used to estimate the route tangent.
const TANGENT_DELTA_M: (f64, f64) = (5.0, 50.0);

/// Half widths at or above this use the dense transect.
const WIDE_TRANSECT_M: f64 = 500.0;

/// Cooperative cancellation flag, shareable across threads.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Per-station side slope, index-aligned with the profile stations.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SideSlope {
    pub deg: Vec<Option<f64>>,
    pub pct: Vec<Option<f64>>,
    pub port: Vec<Option<f64>>,
    pub starboard: Vec<Option<f64>>,

    /// Distance between the outermost observations used in each fit.
    pub span_m: Vec<Option<f64>>,

    /// Stations skipped for lack of a well-posed regression.
    pub underdetermined: usize,
    pub completion: Completion,
}

impl SideSlope {
    /// All-`None` side slope for `len` stations.
    pub fn empty(len: usize) -> Self {
        Self {
            deg: vec![None; len],
            pct: vec![None; len],
            port: vec![None; len],
            starboard: vec![None; len],
            span_m: vec![None; len],
            underdetermined: 0,
            completion: Completion::Complete,
        }
    }
}

pub struct CrossSlopeEngine<'a> {
    model: &'a StationModel<'a>,
    sampler: &'a dyn FieldSampler,
    half_width_m: f64,
    cadence: usize,
}

impl<'a> CrossSlopeEngine<'a> {
    pub fn new(
        model: &'a StationModel<'a>,
        sampler: &'a dyn FieldSampler,
        half_width_m: f64,
        cadence: usize,
    ) -> Self {
        Self {
            model,
            sampler,
            half_width_m,
            cadence: cadence.max(1),
        }
    }

    /// Number of cross-route samples per transect.
    pub fn transect_samples(&self) -> usize {
        if self.half_width_m >= WIDE_TRANSECT_M {
            21
        } else {
            11
        }
    }

    /// Returns the tangent half-distance for `stations`.
    pub fn tangent_delta_m(stations: &[f64]) -> f64 {
        let (lo, hi) = TANGENT_DELTA_M;
        median(stations.windows(2).map(|w| w[1] - w[0]))
            .map_or(lo, |spacing| (spacing / 2.0).clamp(lo, hi))
    }

    /// Returns the transect at `station_m`, or `None` where the route
    /// has no direction.
    pub fn transect_at(&self, station_m: f64, delta_m: f64) -> Option<Transect<'a>> {
        let model = self.model;
        let center = model.interpolate(station_m);
        let (behind, ahead) = model.tangent_points(station_m, delta_m);
        let (dx, dy) = (ahead.x - behind.x, ahead.y - behind.y);
        let len = dx.hypot(dy);
        if !(len > 0.0) {
            return None;
        }

        let offsets = linspace(-self.half_width_m, self.half_width_m, self.transect_samples());
        let points: Vec<(f64, Coord<f64>)> = if model.is_geodetic() {
            let measure = model.measure();
            let normal = measure.bearing(behind, ahead) + FRAC_PI_2;
            offsets
                .map(|offset| {
                    let point = if offset < 0.0 {
                        measure.project_point(center, -offset, normal + PI)
                    } else {
                        measure.project_point(center, offset, normal)
                    };
                    (offset, point)
                })
                .collect()
        } else {
            // Tangent rotated 90° clockwise.
            let normal = Coord {
                x: dy / len,
                y: -dx / len,
            };
            offsets
                .map(|offset| {
                    (
                        offset,
                        Coord {
                            x: center.x + offset * normal.x,
                            y: center.y + offset * normal.y,
                        },
                    )
                })
                .collect()
        };

        Some(Transect::new(
            station_m,
            center,
            self.half_width_m,
            points,
            model.measure(),
            model.is_geodetic(),
        ))
    }

    /// Fits a side slope at every station.
    ///
    /// `progress` receives `(processed, total)` and `cancel` is polled
    /// every `cadence` stations. On cancellation the remaining stations
    /// stay `None`.
    pub fn run(
        &self,
        stations: &[f64],
        mut progress: Option<&mut dyn FnMut(usize, usize)>,
        cancel: Option<&CancelToken>,
    ) -> SideSlope {
        let total = stations.len();
        let mut out = SideSlope::empty(total);
        let delta_m = Self::tangent_delta_m(stations);
        let now = std::time::Instant::now();

        for (idx, &station_m) in stations.iter().enumerate() {
            if idx % self.cadence == 0 {
                if let Some(progress) = progress.as_mut() {
                    progress(idx, total);
                }
                if cancel.map_or(false, CancelToken::is_cancelled) {
                    out.completion = Completion::Cancelled {
                        processed_stations: idx,
                    };
                    break;
                }
            }

            let Some(transect) = self.transect_at(station_m, delta_m) else {
                out.underdetermined += 1;
                continue;
            };
            let section = self.sampler.cross_section(&transect);
            let Some(fit) = Regression::fit(section.samples.iter().map(|s| (s.offset_m, s.value))) else {
                out.underdetermined += 1;
                continue;
            };

            let (min_t, max_t) = section
                .samples
                .iter()
                .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), s| {
                    (lo.min(s.offset_m), hi.max(s.offset_m))
                });
            out.deg[idx] = Some(fit.slope_deg());
            out.pct[idx] = Some(fit.slope_pct());
            out.port[idx] = Some(section.port.unwrap_or_else(|| fit.predict(-self.half_width_m)));
            out.starboard[idx] = Some(section.starboard.unwrap_or_else(|| fit.predict(self.half_width_m)));
            out.span_m[idx] = Some(max_t - min_t);
        }

        if out.completion.is_complete() {
            if let Some(progress) = progress.as_mut() {
                progress(total, total);
            }
        }

        debug!(
            "side slope; stations: {total}, underdetermined: {}, completion: {:?}, exec: {:?}",
            out.underdetermined,
            out.completion,
            now.elapsed()
        );
        out
    }
}
