//! Route, raster and contour file loading.

use anyhow::{anyhow, bail, Context, Result};
use geo::{Geometry, GeometryCollection, LineString};
use geojson::{Feature, GeoJson};
use rastergrid::Raster;
use routeprof::{ContourIndex, Route};
use std::{fs::File, path::Path};

fn read_geojson(path: &Path) -> Result<GeoJson> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    GeoJson::from_reader(file).with_context(|| format!("parsing {}", path.display()))
}

/// Appends the line work of `geometry` to `out`.
fn collect_lines(geometry: Geometry<f64>, out: &mut Vec<LineString<f64>>) {
    match geometry {
        Geometry::LineString(line) => out.push(line),
        Geometry::MultiLineString(lines) => out.extend(lines),
        Geometry::Polygon(polygon) => {
            let (exterior, interiors) = polygon.into_inner();
            out.push(exterior);
            out.extend(interiors);
        }
        Geometry::MultiPolygon(polygons) => {
            for polygon in polygons {
                collect_lines(Geometry::Polygon(polygon), out);
            }
        }
        Geometry::GeometryCollection(collection) => {
            for geometry in collection {
                collect_lines(geometry, out);
            }
        }
        _ => {}
    }
}

fn route_from_geojson(geojson: &GeoJson, planar: bool) -> Result<Route> {
    let collection = GeometryCollection::<f64>::try_from(geojson)?;
    let mut parts = Vec::new();
    for geometry in collection {
        match geometry {
            line @ (Geometry::LineString(_) | Geometry::MultiLineString(_)) => {
                collect_lines(line, &mut parts);
            }
            _ => {}
        }
    }
    if parts.is_empty() {
        bail!("no LineString or MultiLineString in route");
    }
    Ok(Route::new(parts, !planar))
}

/// Loads the route at `path`.
pub fn load_route(path: &Path, planar: bool) -> Result<Route> {
    route_from_geojson(&read_geojson(path)?, planar)
        .with_context(|| format!("reading route {}", path.display()))
}

/// Loads a raster, picking the format from the file extension.
pub fn load_raster(path: &Path, memmap: bool, geographic: bool) -> Result<Raster> {
    let ext = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);
    let raster = match ext.as_deref() {
        Some("asc") => Raster::load_asc(path)?.with_geographic(geographic),
        Some("hgt") if memmap => Raster::memmap_hgt(path)?,
        Some("hgt") => Raster::load_hgt(path)?,
        _ => bail!("unsupported raster {}", path.display()),
    };
    Ok(raster)
}

fn feature_value(feature: &Feature, field: &str) -> Option<f64> {
    match feature.property(field)? {
        serde_json::Value::Number(num) => num.as_f64(),
        serde_json::Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}

fn contours_from_geojson(geojson: GeoJson, field: &str) -> Result<Vec<(LineString<f64>, f64)>> {
    let features = match geojson {
        GeoJson::FeatureCollection(collection) => collection.features,
        GeoJson::Feature(feature) => vec![feature],
        GeoJson::Geometry(_) => bail!("contours must be features with a '{field}' property"),
    };

    let mut contours = Vec::new();
    let mut skipped = 0_usize;
    for feature in features {
        let value = feature_value(&feature, field);
        let (Some(value), Some(geometry)) = (value, feature.geometry) else {
            skipped += 1;
            continue;
        };
        let mut lines = Vec::new();
        collect_lines(Geometry::<f64>::try_from(geometry.value)?, &mut lines);
        contours.extend(lines.into_iter().map(|line| (line, value)));
    }
    if skipped > 0 {
        log::warn!("skipped {skipped} contour features without geometry or a numeric '{field}'");
    }
    Ok(contours)
}

/// Loads and merges every `(path, value field)` contour set.
pub fn load_contours(paths: &[impl AsRef<Path>], fields: &[String]) -> Result<ContourIndex> {
    if paths.len() != fields.len() {
        bail!(
            "{} contour files but {} --value-field arguments",
            paths.len(),
            fields.len()
        );
    }
    let mut merged: Option<ContourIndex> = None;
    for (path, field) in paths.iter().zip(fields) {
        let index = ContourIndex::new(contours_from_geojson(read_geojson(path.as_ref())?, field)?);
        merged = Some(match merged {
            Some(prev) => prev.merge(index),
            None => index,
        });
    }
    merged.ok_or_else(|| anyhow!("no contour files"))
}
