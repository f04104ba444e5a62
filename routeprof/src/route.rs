//! Route geometry and its arc-length parameterization.

use crate::{measure::Metric, ProfileError};
use geo::{
    algorithm::BoundingRect,
    geometry::{Coord, LineString, Rect},
};
use log::debug;

/// An ordered, possibly multi-part polyline.
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    parts: Vec<LineString<f64>>,
    is_geodetic: bool,
}

impl Route {
    /// Returns a route over `parts` in the given order.
    ///
    /// Set `is_geodetic` when coordinates are longitude/latitude.
    pub fn new(parts: Vec<LineString<f64>>, is_geodetic: bool) -> Self {
        Self { parts, is_geodetic }
    }

    /// Returns a single-part planar route.
    pub fn planar(line: LineString<f64>) -> Self {
        Self::new(vec![line], false)
    }

    /// Returns a single-part geodetic route.
    pub fn geodetic(line: LineString<f64>) -> Self {
        Self::new(vec![line], true)
    }

    pub fn parts(&self) -> &[LineString<f64>] {
        &self.parts
    }

    pub fn is_geodetic(&self) -> bool {
        self.is_geodetic
    }

    pub fn first_point(&self) -> Option<Coord<f64>> {
        self.coords().next()
    }

    pub fn last_point(&self) -> Option<Coord<f64>> {
        self.parts.iter().rev().find_map(|part| part.0.last().copied())
    }

    /// Returns the bounding box of every vertex.
    pub fn bounding_rect(&self) -> Option<Rect<f64>> {
        self.parts
            .iter()
            .filter_map(|part| part.bounding_rect())
            .reduce(|a, b| {
                Rect::new(
                    Coord {
                        x: a.min().x.min(b.min().x),
                        y: a.min().y.min(b.min().y),
                    },
                    Coord {
                        x: a.max().x.max(b.max().x),
                        y: a.max().y.max(b.max().y),
                    },
                )
            })
    }

    fn coords(&self) -> impl Iterator<Item = Coord<f64>> + '_ {
        self.parts.iter().flat_map(|part| part.0.iter().copied())
    }
}

/// One non-degenerate piece of a stationed route.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub p1: Coord<f64>,
    pub p2: Coord<f64>,
    pub length_m: f64,
    pub cum_start_m: f64,
    pub cum_end_m: f64,
    /// Index of the route part this segment came from.
    pub part: usize,
}

/// Arc-length parameterization of a [Route].
///
/// Built once per profiling request; converts between stations
/// (meters along the route) and coordinates.
pub struct StationModel<'a> {
    measure: &'a dyn Metric,
    is_geodetic: bool,
    segments: Vec<Segment>,
    first: Coord<f64>,
    last: Coord<f64>,
    total_length_m: f64,
}

impl<'a> StationModel<'a> {
    pub fn new(route: &Route, measure: &'a dyn Metric) -> Result<Self, ProfileError> {
        let usable_points = route
            .coords()
            .filter(|c| c.x.is_finite() && c.y.is_finite())
            .count();
        let (Some(first), Some(last)) = (route.first_point(), route.last_point()) else {
            return Err(ProfileError::InvalidRoute { usable_points });
        };
        if usable_points < 2 {
            return Err(ProfileError::InvalidRoute { usable_points });
        }

        let mut segments = Vec::new();
        let mut cum_m = 0.0;
        for (part_idx, part) in route.parts.iter().enumerate() {
            for line in part.lines() {
                let length_m = measure.measure_line(line.start, line.end);
                // Also rejects NaN from non-finite vertices.
                if !(length_m > 0.0) {
                    continue;
                }
                segments.push(Segment {
                    p1: line.start,
                    p2: line.end,
                    length_m,
                    cum_start_m: cum_m,
                    cum_end_m: cum_m + length_m,
                    part: part_idx,
                });
                cum_m += length_m;
            }
        }

        let total_length_m = segments.last().map_or(0.0, |s| s.cum_end_m);
        if !(total_length_m > 0.0) {
            return Err(ProfileError::ZeroLengthRoute);
        }

        debug!(
            "stationed route; parts: {}, segments: {}, length: {total_length_m:.1} m",
            route.parts.len(),
            segments.len()
        );

        Ok(Self {
            measure,
            is_geodetic: route.is_geodetic,
            segments,
            first,
            last,
            total_length_m,
        })
    }

    pub fn total_length_m(&self) -> f64 {
        self.total_length_m
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn measure(&self) -> &'a dyn Metric {
        self.measure
    }

    pub fn is_geodetic(&self) -> bool {
        self.is_geodetic
    }

    /// Returns the coordinate at `station_m`, clamped to the route.
    pub fn interpolate(&self, station_m: f64) -> Coord<f64> {
        if !(station_m > 0.0) {
            return self.first;
        }
        if station_m >= self.total_length_m {
            return self.last;
        }
        lerp(&self.segments, station_m)
    }

    /// Returns the segments of the route part that owns `station_m`.
    ///
    /// A station on the joint between two parts belongs to the earlier
    /// one, as in [StationModel::interpolate].
    pub fn part_segments(&self, station_m: f64) -> &[Segment] {
        let part = self.segments[segment_index(&self.segments, station_m)].part;
        let start = self.segments.partition_point(|s| s.part < part);
        let end = self.segments.partition_point(|s| s.part <= part);
        &self.segments[start..end]
    }

    /// Returns the points at `station_m - delta_m` and `station_m +
    /// delta_m`, clamped to the part that owns `station_m` so they
    /// never reach across the gap to a neighboring part.
    pub fn tangent_points(&self, station_m: f64, delta_m: f64) -> (Coord<f64>, Coord<f64>) {
        let station_m = station_m.clamp(0.0, self.total_length_m);
        let part = self.part_segments(station_m);
        (lerp(part, station_m - delta_m), lerp(part, station_m + delta_m))
    }

    /// Returns the station of the route point nearest to `point`.
    ///
    /// Projection is planar in coordinate space and scans every
    /// segment; use [StationModel::project_all] for batches.
    pub fn project(&self, point: Coord<f64>) -> f64 {
        let mut best_dist_sq = f64::INFINITY;
        let mut best_station = 0.0;
        for seg in &self.segments {
            let dx = seg.p2.x - seg.p1.x;
            let dy = seg.p2.y - seg.p1.y;
            let seg_sq = dx * dx + dy * dy;
            if !(seg_sq > 0.0) {
                continue;
            }
            let t = (((point.x - seg.p1.x) * dx + (point.y - seg.p1.y) * dy) / seg_sq).clamp(0.0, 1.0);
            let proj_x = seg.p1.x + t * dx;
            let proj_y = seg.p1.y + t * dy;
            let dist_sq = (point.x - proj_x).powi(2) + (point.y - proj_y).powi(2);
            if dist_sq < best_dist_sq {
                best_dist_sq = dist_sq;
                best_station = seg.cum_start_m + t * seg.length_m;
            }
        }
        best_station
    }

    /// Projects every point in `points`, preserving order.
    pub fn project_all<I>(&self, points: I) -> Vec<f64>
    where
        I: IntoIterator<Item = Coord<f64>>,
    {
        points.into_iter().map(|p| self.project(p)).collect()
    }
}

/// Index of the segment owning `station_m`; `segments` is non-empty.
fn segment_index(segments: &[Segment], station_m: f64) -> usize {
    segments
        .partition_point(|s| s.cum_end_m < station_m)
        .min(segments.len() - 1)
}

/// Point at `station_m` along `segments`, clamped to their ends.
fn lerp(segments: &[Segment], station_m: f64) -> Coord<f64> {
    let seg = &segments[segment_index(segments, station_m)];
    let t = ((station_m - seg.cum_start_m) / seg.length_m).clamp(0.0, 1.0);
    Coord {
        x: seg.p1.x + t * (seg.p2.x - seg.p1.x),
        y: seg.p1.y + t * (seg.p2.y - seg.p1.y),
    }
}
