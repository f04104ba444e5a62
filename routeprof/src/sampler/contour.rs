//! Contour-line sampling.
//!
//! Along the route, values come from interpolating between the
//! stations where contours cross it. Across the route, every contour
//! crossing a transect becomes one observation.

use super::{ContourSource, CrossSample, CrossSection, FieldSampler, FieldValue, SourceId, Transect};
use crate::route::StationModel;
use geo::{
    algorithm::{
        line_intersection::{line_intersection, LineIntersection},
        BoundingRect,
    },
    geometry::{Coord, Line, LineString, Rect},
};
use log::debug;
use rstar::{RTree, RTreeObject, AABB};
use std::collections::HashSet;

/// Hits closer together than this, in meters, are the same crossing.
const DUPLICATE_HIT_M: f64 = 1e-6;

#[derive(Debug, Clone)]
struct ContourEntry {
    geometry: LineString<f64>,
    value: f64,
    envelope: AABB<[f64; 2]>,
}

impl RTreeObject for ContourEntry {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

fn to_aabb(rect: Rect<f64>) -> AABB<[f64; 2]> {
    AABB::from_corners([rect.min().x, rect.min().y], [rect.max().x, rect.max().y])
}

/// An R-tree of `(line, value)` contours.
pub struct ContourIndex {
    tree: RTree<ContourEntry>,
}

impl ContourIndex {
    /// Indexes `contours`, skipping empty lines and non-finite values.
    pub fn new<I>(contours: I) -> Self
    where
        I: IntoIterator<Item = (LineString<f64>, f64)>,
    {
        let entries: Vec<ContourEntry> = contours
            .into_iter()
            .filter(|(_, value)| value.is_finite())
            .filter_map(|(geometry, value)| {
                let envelope = to_aabb(geometry.bounding_rect()?);
                Some(ContourEntry {
                    geometry,
                    value,
                    envelope,
                })
            })
            .collect();
        debug!("contour index; entries: {}", entries.len());
        Self {
            tree: RTree::bulk_load(entries),
        }
    }

    /// Returns one index holding the contours of both.
    #[must_use]
    pub fn merge(self, other: Self) -> Self {
        let entries: Vec<ContourEntry> = self.tree.iter().chain(other.tree.iter()).cloned().collect();
        Self {
            tree: RTree::bulk_load(entries),
        }
    }

    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ContourSource for ContourIndex {
    fn candidates_intersecting(&self, bbox: Rect<f64>) -> Vec<(&LineString<f64>, f64)> {
        self.tree
            .locate_in_envelope_intersecting(&to_aabb(bbox))
            .map(|entry| (&entry.geometry, entry.value))
            .collect()
    }

    fn is_empty(&self) -> bool {
        ContourIndex::is_empty(self)
    }
}

/// Crossing points of `line` with every segment of `contour`.
fn line_crossings(line: Line<f64>, contour: &LineString<f64>, out: &mut Vec<Coord<f64>>) {
    for other in contour.lines() {
        match line_intersection(line, other) {
            Some(LineIntersection::SinglePoint { intersection, .. }) => out.push(intersection),
            Some(LineIntersection::Collinear { intersection }) => {
                out.push(intersection.start);
                if intersection.end != intersection.start {
                    out.push(intersection.end);
                }
            }
            None => {}
        }
    }
}

/// A contour crossing of the route.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RouteHit {
    pub station_m: f64,
    pub value: f64,
    pub point: Coord<f64>,
}

pub struct ContourFieldSampler<'a> {
    source: &'a dyn ContourSource,
    hits: Vec<RouteHit>,
}

impl<'a> ContourFieldSampler<'a> {
    /// Intersects every contour in `source` with the route of
    /// `stations`.
    pub fn new(source: &'a dyn ContourSource, stations: &StationModel<'_>) -> Self {
        let mut points = Vec::new();
        let mut values = Vec::new();
        for seg in stations.segments() {
            let line = Line::new(seg.p1, seg.p2);
            for (contour, value) in source.candidates_intersecting(Rect::new(seg.p1, seg.p2)) {
                if !value.is_finite() {
                    continue;
                }
                line_crossings(line, contour, &mut points);
                values.resize(points.len(), value);
            }
        }

        let mut hits: Vec<RouteHit> = stations
            .project_all(points.iter().copied())
            .into_iter()
            .zip(values)
            .zip(points)
            .map(|((station_m, value), point)| RouteHit {
                station_m,
                value,
                point,
            })
            .collect();
        hits.sort_by(|a, b| a.station_m.total_cmp(&b.station_m));

        let mut collapsed: Vec<RouteHit> = Vec::with_capacity(hits.len());
        for hit in hits {
            match collapsed.last_mut() {
                Some(last) if hit.station_m - last.station_m < DUPLICATE_HIT_M => *last = hit,
                _ => collapsed.push(hit),
            }
        }

        debug!("contour sampler; route hits: {}", collapsed.len());
        Self {
            source,
            hits: collapsed,
        }
    }

    /// Route crossings sorted by station.
    pub fn route_hits(&self) -> &[RouteHit] {
        &self.hits
    }

    fn value_at(&self, station_m: f64) -> Option<f64> {
        let idx = self.hits.partition_point(|hit| hit.station_m < station_m);
        if let Some(hit) = self.hits.get(idx) {
            if hit.station_m - station_m <= DUPLICATE_HIT_M {
                return Some(hit.value);
            }
        }
        if idx == 0 || idx == self.hits.len() {
            return None;
        }
        let (lo, hi) = (&self.hits[idx - 1], &self.hits[idx]);
        let t = (station_m - lo.station_m) / (hi.station_m - lo.station_m);
        Some(lo.value + t * (hi.value - lo.value))
    }
}

/// Keeps, per side of the route and per value, the observation
/// nearest the center. Observations exactly on the center are dropped.
///
/// Ties on distance prefer the port side, then the lower value. The
/// result is ordered port to starboard.
pub(crate) fn closest_per_side(mut hits: Vec<CrossSample>) -> Vec<CrossSample> {
    hits.retain(|hit| hit.offset_m != 0.0 && hit.offset_m.is_finite());
    hits.sort_by(|a, b| {
        a.offset_m
            .abs()
            .total_cmp(&b.offset_m.abs())
            .then(a.offset_m.total_cmp(&b.offset_m))
            .then(a.value.total_cmp(&b.value))
    });
    let mut seen = HashSet::new();
    // Adding zero folds -0.0 into 0.0.
    hits.retain(|hit| seen.insert((hit.offset_m > 0.0, (hit.value + 0.0).to_bits())));
    hits.sort_by(|a, b| a.offset_m.total_cmp(&b.offset_m));
    hits
}

impl<'a> FieldSampler for ContourFieldSampler<'a> {
    fn sample_at(&self, station_m: f64, _point: Coord<f64>) -> FieldValue {
        match self.value_at(station_m) {
            Some(value) => FieldValue::new(value, SourceId(0)),
            None => FieldValue::MISSING,
        }
    }

    fn cross_section(&self, transect: &Transect<'_>) -> CrossSection {
        let Some(bbox) = transect.bounding_rect() else {
            return CrossSection::default();
        };
        let line = transect.line();
        let mut samples = Vec::new();
        let mut points = Vec::new();
        for (contour, value) in self.source.candidates_intersecting(bbox) {
            if !value.is_finite() {
                continue;
            }
            points.clear();
            for piece in line.lines() {
                line_crossings(piece, contour, &mut points);
            }
            samples.extend(points.iter().map(|p| CrossSample {
                offset_m: transect.signed_offset(*p),
                value,
            }));
        }
        CrossSection {
            samples: closest_per_side(samples),
            port: None,
            starboard: None,
        }
    }

    fn overlaps(&self, bbox: Rect<f64>) -> bool {
        !self.source.candidates_intersecting(bbox).is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::{closest_per_side, ContourFieldSampler, ContourIndex, ContourSource, CrossSample};
    use crate::{
        measure::Measure,
        route::{Route, StationModel},
        sampler::{FieldSampler, FieldValue, SourceId, Transect},
    };
    use approx::assert_relative_eq;
    use geo::{
        geometry::{Coord, Rect},
        line_string,
    };

    /// North-south contours at x = 100, 300, 600 with values 10, 30, 20.
    fn index() -> ContourIndex {
        ContourIndex::new(vec![
            (line_string![(x: 100.0, y: -50.0), (x: 100.0, y: 50.0)], 10.0),
            (line_string![(x: 300.0, y: -50.0), (x: 300.0, y: 50.0)], 30.0),
            (line_string![(x: 600.0, y: -50.0), (x: 600.0, y: 50.0)], 20.0),
            (line_string![(x: 50.0, y: -50.0), (x: 50.0, y: 50.0)], f64::NAN),
        ])
    }

    #[test]
    fn test_index_queries() {
        let index = index();
        assert_eq!(index.len(), 3);
        let found = index.candidates_intersecting(Rect::new(Coord { x: 250.0, y: 0.0 }, Coord { x: 650.0, y: 1.0 }));
        let mut values: Vec<f64> = found.iter().map(|(_, v)| *v).collect();
        values.sort_by(f64::total_cmp);
        assert_eq!(values, vec![20.0, 30.0]);

        let extra = ContourIndex::new(vec![(line_string![(x: 0.0, y: 0.0), (x: 1.0, y: 1.0)], 5.0)]);
        assert_eq!(index.merge(extra).len(), 4);
    }

    #[test]
    fn test_route_hits_and_interpolation() {
        let index = index();
        let route = Route::planar(line_string![(x: 0.0, y: 0.0), (x: 400.0, y: 0.0), (x: 800.0, y: 0.0)]);
        let stations = StationModel::new(&route, &Measure::Planar).unwrap();
        let sampler = ContourFieldSampler::new(&index, &stations);

        let hits: Vec<(f64, f64)> = sampler.route_hits().iter().map(|h| (h.station_m, h.value)).collect();
        assert_eq!(hits, vec![(100.0, 10.0), (300.0, 30.0), (600.0, 20.0)]);

        let at = |s: f64| sampler.sample_at(s, stations.interpolate(s));
        assert_eq!(at(50.0), FieldValue::MISSING);
        assert_eq!(at(700.0), FieldValue::MISSING);
        assert_eq!(at(300.0), FieldValue::new(30.0, SourceId(0)));
        assert_relative_eq!(at(200.0).value.unwrap(), 20.0);
        assert_relative_eq!(at(450.0).value.unwrap(), 25.0);
        assert_eq!(at(600.0).value, Some(20.0));
    }

    #[test]
    fn test_shared_vertex_hit_collapses() {
        let index = ContourIndex::new(vec![(line_string![(x: 400.0, y: -50.0), (x: 400.0, y: 50.0)], 7.0)]);
        let route = Route::planar(line_string![(x: 0.0, y: 0.0), (x: 400.0, y: 0.0), (x: 800.0, y: 0.0)]);
        let stations = StationModel::new(&route, &Measure::Planar).unwrap();
        let sampler = ContourFieldSampler::new(&index, &stations);
        assert_eq!(sampler.route_hits().len(), 1);
        assert_relative_eq!(sampler.route_hits()[0].station_m, 400.0);
    }

    #[test]
    fn test_closest_per_side() {
        let hit = |offset_m, value| CrossSample { offset_m, value };
        let kept = closest_per_side(vec![
            hit(40.0, 5.0),
            hit(10.0, 5.0),
            hit(-30.0, 5.0),
            hit(-30.0, 6.0),
            hit(0.0, 9.0),
            hit(-80.0, 6.0),
            hit(25.0, -0.0),
            hit(60.0, 0.0),
        ]);
        assert_eq!(kept, vec![hit(-30.0, 5.0), hit(-30.0, 6.0), hit(10.0, 5.0), hit(25.0, -0.0)]);
    }

    #[test]
    fn test_cross_section() {
        // Contours parallel to a northbound route; values rise to starboard.
        let index = ContourIndex::new(vec![
            (line_string![(x: -100.0, y: -500.0), (x: -100.0, y: 500.0)], 8.0),
            (line_string![(x: 50.0, y: -500.0), (x: 50.0, y: 500.0)], 11.0),
            (line_string![(x: 150.0, y: -500.0), (x: 150.0, y: 500.0)], 13.0),
        ]);
        let route = Route::planar(line_string![(x: 0.0, y: -400.0), (x: 0.0, y: 400.0)]);
        let stations = StationModel::new(&route, &Measure::Planar).unwrap();
        let sampler = ContourFieldSampler::new(&index, &stations);
        let transect = Transect::new(
            400.0,
            Coord { x: 0.0, y: 0.0 },
            200.0,
            vec![(-200.0, Coord { x: -200.0, y: 0.0 }), (200.0, Coord { x: 200.0, y: 0.0 })],
            &Measure::Planar,
            false,
        );
        let section = sampler.cross_section(&transect);
        let offsets: Vec<f64> = section.samples.iter().map(|s| s.offset_m).collect();
        assert_eq!(offsets, vec![-100.0, 50.0, 150.0]);
        assert_eq!(section.port, None);
        assert!(sampler.route_hits().is_empty());
    }
}
