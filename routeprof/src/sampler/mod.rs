//! Field sources and the samplers that read them along a route.

mod contour;
mod grid;

pub use self::{
    contour::{ContourFieldSampler, ContourIndex, RouteHit},
    grid::GridFieldSampler,
};
use crate::measure::Metric;
use geo::{
    algorithm::BoundingRect,
    geometry::{Coord, LineString, Rect},
};

/// Position of a source in the caller's input list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SourceId(pub usize);

/// A sampled value and the source that produced it.
///
/// `value` is `None` when no source has coverage, never a sentinel.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FieldValue {
    pub value: Option<f64>,
    pub source: Option<SourceId>,
}

impl FieldValue {
    pub const MISSING: Self = Self {
        value: None,
        source: None,
    };

    pub fn new(value: f64, source: SourceId) -> Self {
        Self {
            value: Some(value),
            source: Some(source),
        }
    }
}

/// A regular grid of scalar samples.
pub trait GridSource {
    /// Returns the raw sample at `point`, in this source's own CRS.
    fn sample(&self, point: Coord<f64>) -> Option<f64>;

    /// Bounds in this source's own CRS.
    fn extent(&self) -> Rect<f64>;

    fn nodata_value(&self) -> Option<f64>;

    /// Ground size of one pixel in meters, if known.
    fn pixel_size_m(&self) -> Option<f64>;

    /// Converts a route coordinate into this source's CRS.
    fn to_source_crs(&self, point: Coord<f64>) -> Coord<f64> {
        point
    }
}

/// A spatially indexed set of iso-value lines.
pub trait ContourSource {
    /// Returns every contour whose bounds intersect `bbox`.
    fn candidates_intersecting(&self, bbox: Rect<f64>) -> Vec<(&LineString<f64>, f64)>;

    /// Returns `true` when there are no contours at all.
    fn is_empty(&self) -> bool;
}

/// One cross-route observation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CrossSample {
    /// Signed distance from the route in meters, starboard positive.
    pub offset_m: f64,
    pub value: f64,
}

/// Observations gathered along one [Transect].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CrossSection {
    pub samples: Vec<CrossSample>,

    /// Value measured at the port end of the transect.
    pub port: Option<f64>,

    /// Value measured at the starboard end of the transect.
    pub starboard: Option<f64>,
}

/// A line across the route at one station.
pub struct Transect<'a> {
    pub station_m: f64,
    pub center: Coord<f64>,
    pub half_width_m: f64,

    /// Sample points from port to starboard with their signed offsets.
    pub points: Vec<(f64, Coord<f64>)>,

    /// Port to starboard unit vector in coordinate space.
    normal: Coord<f64>,
    measure: &'a dyn Metric,
    geodetic: bool,
}

impl<'a> Transect<'a> {
    pub fn new(
        station_m: f64,
        center: Coord<f64>,
        half_width_m: f64,
        points: Vec<(f64, Coord<f64>)>,
        measure: &'a dyn Metric,
        geodetic: bool,
    ) -> Self {
        let normal = match (points.first(), points.last()) {
            (Some((_, port)), Some((_, starboard))) => {
                let dx = starboard.x - port.x;
                let dy = starboard.y - port.y;
                let len = dx.hypot(dy);
                if len > 0.0 {
                    Coord {
                        x: dx / len,
                        y: dy / len,
                    }
                } else {
                    Coord { x: 0.0, y: 0.0 }
                }
            }
            _ => Coord { x: 0.0, y: 0.0 },
        };
        Self {
            station_m,
            center,
            half_width_m,
            points,
            normal,
            measure,
            geodetic,
        }
    }

    pub fn port(&self) -> Option<Coord<f64>> {
        self.points.first().map(|(_, p)| *p)
    }

    pub fn starboard(&self) -> Option<Coord<f64>> {
        self.points.last().map(|(_, p)| *p)
    }

    /// The transect as a polyline, port to starboard.
    pub fn line(&self) -> LineString<f64> {
        self.points.iter().map(|(_, p)| *p).collect()
    }

    pub fn bounding_rect(&self) -> Option<Rect<f64>> {
        self.line().bounding_rect()
    }

    /// Returns the signed distance in meters from the center to
    /// `point`, positive to starboard.
    pub fn signed_offset(&self, point: Coord<f64>) -> f64 {
        let along = (point.x - self.center.x) * self.normal.x + (point.y - self.center.y) * self.normal.y;
        if self.geodetic {
            self.measure.measure_line(self.center, point).copysign(along)
        } else {
            along
        }
    }
}

/// Reads a scalar field along a stationed route.
pub trait FieldSampler {
    /// Returns the field at `point`, which lies at `station_m`.
    fn sample_at(&self, station_m: f64, point: Coord<f64>) -> FieldValue;

    /// Ground resolution of `source` in meters, if known.
    fn pixel_size_m(&self, _source: SourceId) -> Option<f64> {
        None
    }

    /// Collects cross-route observations along `transect`.
    fn cross_section(&self, transect: &Transect<'_>) -> CrossSection;

    /// Whether any source could cover `bbox` (route coordinates).
    fn overlaps(&self, _bbox: Rect<f64>) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::{Coord, Transect};
    use crate::measure::{DistanceMeasure, Measure};
    use approx::assert_relative_eq;

    #[test]
    fn test_signed_offset_planar() {
        // Heading north, so starboard is east.
        let points = vec![
            (-10.0, Coord { x: -10.0, y: 0.0 }),
            (0.0, Coord { x: 0.0, y: 0.0 }),
            (10.0, Coord { x: 10.0, y: 0.0 }),
        ];
        let transect = Transect::new(0.0, Coord { x: 0.0, y: 0.0 }, 10.0, points, &Measure::Planar, false);
        assert_relative_eq!(transect.signed_offset(Coord { x: 4.0, y: 0.0 }), 4.0);
        assert_relative_eq!(transect.signed_offset(Coord { x: -2.5, y: 0.0 }), -2.5);
        assert_eq!(transect.line().0.len(), 3);
    }

    #[test]
    fn test_signed_offset_geodetic() {
        let center = Coord { x: 10.0, y: 60.0 };
        let port = Coord { x: 9.99, y: 60.0 };
        let starboard = Coord { x: 10.01, y: 60.0 };
        let transect = Transect::new(
            0.0,
            center,
            500.0,
            vec![(-500.0, port), (500.0, starboard)],
            &Measure::Geodesic,
            true,
        );
        let east = Coord { x: 10.005, y: 60.0 };
        let expected = Measure::Geodesic.measure_line(center, east);
        assert_relative_eq!(transect.signed_offset(east), expected);
        assert_relative_eq!(
            transect.signed_offset(Coord { x: 9.995, y: 60.0 }),
            -Measure::Geodesic.measure_line(center, Coord { x: 9.995, y: 60.0 })
        );
    }
}
