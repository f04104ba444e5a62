//! Distances, bearings and offsets in planar or geodetic space.
//!
//! Geodesic math is delegated to [geo]'s Karney implementation on the
//! WGS84 ellipsoid; the haversine variant trades accuracy for speed.

use geo::{
    algorithm::{
        GeodesicBearing, GeodesicDestination, GeodesicDistance, HaversineBearing,
        HaversineDestination, HaversineDistance,
    },
    geometry::{Coord, LineString, Point},
};

/// Length and direction between points, in meters and radians.
pub trait DistanceMeasure {
    /// Returns the distance from `p1` to `p2` in meters.
    fn measure_line(&self, p1: Coord<f64>, p2: Coord<f64>) -> f64;

    /// Returns the length of `line` in meters.
    fn measure_length(&self, line: &LineString<f64>) -> f64 {
        line.lines()
            .map(|l| self.measure_line(l.start, l.end))
            .sum()
    }

    /// Returns the forward bearing from `p1` to `p2` in radians,
    /// clockwise from north (+y).
    fn bearing(&self, p1: Coord<f64>, p2: Coord<f64>) -> f64;
}

pub trait GeodesicProjector {
    /// Returns the point `distance_m` from `origin` along
    /// `bearing_rad` (clockwise from north).
    fn project_point(&self, origin: Coord<f64>, distance_m: f64, bearing_rad: f64) -> Coord<f64>;
}

/// Both halves of the distance interface.
pub trait Metric: DistanceMeasure + GeodesicProjector {}

impl<T: DistanceMeasure + GeodesicProjector + ?Sized> Metric for T {}

/// Built-in metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Measure {
    /// Cartesian coordinates already in meters.
    Planar,

    /// Longitude/latitude on the WGS84 ellipsoid.
    Geodesic,

    /// Longitude/latitude on a sphere of mean earth radius.
    Haversine,
}

impl Measure {
    /// Returns `Geodesic` for geodetic routes, else `Planar`.
    pub fn for_geodetic(is_geodetic: bool) -> Self {
        if is_geodetic {
            Self::Geodesic
        } else {
            Self::Planar
        }
    }
}

impl DistanceMeasure for Measure {
    fn measure_line(&self, p1: Coord<f64>, p2: Coord<f64>) -> f64 {
        match self {
            Self::Planar => (p2.x - p1.x).hypot(p2.y - p1.y),
            Self::Geodesic => Point::from(p1).geodesic_distance(&Point::from(p2)),
            Self::Haversine => Point::from(p1).haversine_distance(&Point::from(p2)),
        }
    }

    fn bearing(&self, p1: Coord<f64>, p2: Coord<f64>) -> f64 {
        match self {
            Self::Planar => (p2.x - p1.x).atan2(p2.y - p1.y),
            Self::Geodesic => Point::from(p1)
                .geodesic_bearing(Point::from(p2))
                .to_radians(),
            Self::Haversine => Point::from(p1)
                .haversine_bearing(Point::from(p2))
                .to_radians(),
        }
    }
}

impl GeodesicProjector for Measure {
    fn project_point(&self, origin: Coord<f64>, distance_m: f64, bearing_rad: f64) -> Coord<f64> {
        match self {
            Self::Planar => {
                let (sin, cos) = bearing_rad.sin_cos();
                Coord {
                    x: origin.x + distance_m * sin,
                    y: origin.y + distance_m * cos,
                }
            }
            Self::Geodesic => {
                Point::from(origin)
                    .geodesic_destination(bearing_rad.to_degrees(), distance_m)
                    .0
            }
            Self::Haversine => {
                Point::from(origin)
                    .haversine_destination(bearing_rad.to_degrees(), distance_m)
                    .0
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Coord, DistanceMeasure, GeodesicProjector, Measure};
    use approx::assert_relative_eq;
    use geo::line_string;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn test_planar() {
        let m = Measure::Planar;
        let a = Coord { x: 0.0, y: 0.0 };
        let b = Coord { x: 3.0, y: 4.0 };
        assert_relative_eq!(m.measure_line(a, b), 5.0);
        assert_relative_eq!(m.bearing(a, Coord { x: 10.0, y: 0.0 }), FRAC_PI_2);
        assert_relative_eq!(m.bearing(a, Coord { x: 0.0, y: 10.0 }), 0.0);

        let east = m.project_point(a, 7.0, FRAC_PI_2);
        assert_relative_eq!(east.x, 7.0);
        assert_relative_eq!(east.y, 0.0, epsilon = 1e-12);

        let line = line_string![(x: 0.0, y: 0.0), (x: 3.0, y: 4.0), (x: 3.0, y: 10.0)];
        assert_relative_eq!(m.measure_length(&line), 11.0);
    }

    #[test]
    fn test_geodesic_degree_of_latitude() {
        let m = Measure::Geodesic;
        let d = m.measure_line(Coord { x: 0.0, y: 0.0 }, Coord { x: 0.0, y: 1.0 });
        // One degree of latitude at the equator on WGS84.
        assert_relative_eq!(d, 110_574.388, epsilon = 0.5);
        assert_relative_eq!(
            m.bearing(Coord { x: 0.0, y: 0.0 }, Coord { x: 0.0, y: 1.0 }),
            0.0,
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_project_then_measure() {
        let origin = Coord { x: 3.5, y: 56.2 };
        for m in [Measure::Geodesic, Measure::Haversine] {
            let dest = m.project_point(origin, 1_250.0, FRAC_PI_2 / 3.0);
            assert_relative_eq!(m.measure_line(origin, dest), 1_250.0, epsilon = 1e-6);
            assert_relative_eq!(m.bearing(origin, dest), FRAC_PI_2 / 3.0, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_haversine_close_to_geodesic() {
        let a = Coord { x: -4.2, y: 50.1 };
        let b = Coord { x: -4.1, y: 50.15 };
        let geodesic = Measure::Geodesic.measure_line(a, b);
        let haversine = Measure::Haversine.measure_line(a, b);
        assert!((geodesic - haversine).abs() / geodesic < 0.005);
    }
}
