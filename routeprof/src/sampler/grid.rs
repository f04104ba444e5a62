use super::{CrossSample, CrossSection, FieldSampler, FieldValue, GridSource, SourceId, Transect};
use crate::measure::{DistanceMeasure, Measure};
use geo::{
    algorithm::Intersects,
    geometry::{Coord, Rect},
};
use log::debug;
use rastergrid::Raster;
use std::cmp::Ordering;

/// Samples one or more grids, finest resolution first.
pub struct GridFieldSampler<'a> {
    sources: Vec<(SourceId, &'a dyn GridSource)>,
}

impl<'a> GridFieldSampler<'a> {
    /// Returns a sampler over `sources`.
    ///
    /// Each source keeps its input position as its [SourceId].
    /// Sources of unknown resolution are tried last; ties keep input
    /// order.
    pub fn new(sources: &[&'a dyn GridSource]) -> Self {
        let mut sources: Vec<(SourceId, &'a dyn GridSource)> = sources
            .iter()
            .enumerate()
            .map(|(idx, src)| (SourceId(idx), *src))
            .collect();
        sources.sort_by(|(_, a), (_, b)| finer_first(a.pixel_size_m(), b.pixel_size_m()));
        debug!(
            "grid sampler; order: {:?}",
            sources.iter().map(|(id, _)| id.0).collect::<Vec<_>>()
        );
        Self { sources }
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Source ids in sampling order.
    pub fn order(&self) -> impl Iterator<Item = SourceId> + '_ {
        self.sources.iter().map(|(id, _)| *id)
    }

    fn sample_point(&self, point: Coord<f64>) -> FieldValue {
        for (id, src) in &self.sources {
            let native = src.to_source_crs(point);
            if !contains(&src.extent(), native) {
                continue;
            }
            let Some(value) = src.sample(native) else {
                continue;
            };
            if !value.is_finite() || src.nodata_value() == Some(value) {
                continue;
            }
            return FieldValue::new(value, *id);
        }
        FieldValue::MISSING
    }
}

fn finer_first(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.total_cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn contains(extent: &Rect<f64>, point: Coord<f64>) -> bool {
    let (min, max) = (extent.min(), extent.max());
    (min.x..=max.x).contains(&point.x) && (min.y..=max.y).contains(&point.y)
}

impl<'a> FieldSampler for GridFieldSampler<'a> {
    fn sample_at(&self, _station_m: f64, point: Coord<f64>) -> FieldValue {
        self.sample_point(point)
    }

    fn pixel_size_m(&self, source: SourceId) -> Option<f64> {
        self.sources
            .iter()
            .find(|(id, _)| *id == source)
            .and_then(|(_, src)| src.pixel_size_m())
    }

    fn cross_section(&self, transect: &Transect<'_>) -> CrossSection {
        let values: Vec<(f64, Option<f64>)> = transect
            .points
            .iter()
            .map(|(offset_m, point)| (*offset_m, self.sample_point(*point).value))
            .collect();
        CrossSection {
            port: values.first().and_then(|(_, v)| *v),
            starboard: values.last().and_then(|(_, v)| *v),
            samples: values
                .into_iter()
                .filter_map(|(offset_m, value)| value.map(|value| CrossSample { offset_m, value }))
                .collect(),
        }
    }

    fn overlaps(&self, bbox: Rect<f64>) -> bool {
        self.sources.iter().any(|(_, src)| {
            let a = src.to_source_crs(bbox.min());
            let b = src.to_source_crs(bbox.max());
            let c = src.to_source_crs(Coord {
                x: bbox.min().x,
                y: bbox.max().y,
            });
            let d = src.to_source_crs(Coord {
                x: bbox.max().x,
                y: bbox.min().y,
            });
            let native = Rect::new(
                Coord {
                    x: a.x.min(b.x).min(c.x).min(d.x),
                    y: a.y.min(b.y).min(c.y).min(d.y),
                },
                Coord {
                    x: a.x.max(b.x).max(c.x).max(d.x),
                    y: a.y.max(b.y).max(c.y).max(d.y),
                },
            );
            native.intersects(&src.extent())
        })
    }
}

impl GridSource for Raster {
    fn sample(&self, point: Coord<f64>) -> Option<f64> {
        self.get(point).map(f64::from)
    }

    fn extent(&self) -> Rect<f64> {
        Raster::extent(self)
    }

    /// Nodata at the `f32` precision samples are stored in.
    #[allow(clippy::cast_possible_truncation)]
    fn nodata_value(&self) -> Option<f64> {
        self.nodata().map(|nodata| f64::from(nodata as f32))
    }

    fn pixel_size_m(&self) -> Option<f64> {
        let (dx, dy) = self.cell_size();
        if !self.is_geographic() {
            return Some((dx * dy).sqrt());
        }
        let extent = Raster::extent(self);
        let center = extent.center();
        let width_m = Measure::Haversine.measure_line(center, Coord { x: center.x + dx, ..center });
        let height_m = Measure::Haversine.measure_line(center, Coord { y: center.y + dy, ..center });
        let size_m = (width_m * height_m).sqrt();
        (size_m > 0.0).then_some(size_m)
    }
}
