//! Esri ASCII grids (`.asc`), the usual interchange format for
//! gridded MBES surfaces.

use crate::{Raster, RasterError, C};
use std::{fs, path::Path};

#[derive(Debug, Default)]
struct Header {
    ncols: Option<usize>,
    nrows: Option<usize>,
    xll: Option<(C, bool)>,
    yll: Option<(C, bool)>,
    cellsize: Option<(C, C)>,
    nodata: Option<f64>,
}

impl Raster {
    /// Returns an in-memory raster parsed from the Esri ASCII grid at
    /// `path`.
    ///
    /// Both `xllcorner`/`yllcorner` and `xllcenter`/`yllcenter`
    /// origins are understood, as is the non-square `dx`/`dy` cell
    /// size extension. Coordinates are assumed planar; see
    /// [Raster::with_geographic].
    pub fn load_asc<P: AsRef<Path>>(path: P) -> Result<Self, RasterError> {
        let text = fs::read_to_string(path)?;
        Self::parse_asc(&text)
    }

    fn parse_asc(text: &str) -> Result<Self, RasterError> {
        let mut header = Header::default();
        let mut tokens = text.split_whitespace().peekable();

        while let Some(key) = tokens.next_if(|tok| tok.starts_with(|c: char| c.is_ascii_alphabetic())) {
            let value = tokens
                .next()
                .ok_or_else(|| RasterError::AscHeader(format!("missing value for {key}")))?;
            let num = || {
                value
                    .parse::<C>()
                    .map_err(|_| RasterError::AscHeader(format!("{key} = {value}")))
            };
            let count = || {
                value
                    .parse::<usize>()
                    .map_err(|_| RasterError::AscHeader(format!("{key} = {value}")))
            };
            match key.to_ascii_lowercase().as_str() {
                "ncols" => header.ncols = Some(count()?),
                "nrows" => header.nrows = Some(count()?),
                "xllcorner" => header.xll = Some((num()?, false)),
                "xllcenter" => header.xll = Some((num()?, true)),
                "yllcorner" => header.yll = Some((num()?, false)),
                "yllcenter" => header.yll = Some((num()?, true)),
                "cellsize" => {
                    let size = num()?;
                    header.cellsize = Some((size, size));
                }
                "dx" => header.cellsize = Some((num()?, header.cellsize.map_or(0.0, |c| c.1))),
                "dy" => header.cellsize = Some((header.cellsize.map_or(0.0, |c| c.0), num()?)),
                "nodata_value" => header.nodata = Some(num()?),
                _ => return Err(RasterError::AscHeader(format!("unknown key {key}"))),
            }
        }

        let missing = |name: &str| RasterError::AscHeader(format!("missing {name}"));
        let cols = header.ncols.ok_or_else(|| missing("ncols"))?;
        let rows = header.nrows.ok_or_else(|| missing("nrows"))?;
        let (xll, x_is_center) = header.xll.ok_or_else(|| missing("xllcorner"))?;
        let (yll, y_is_center) = header.yll.ok_or_else(|| missing("yllcorner"))?;
        let cell_size @ (dx, dy) = header.cellsize.ok_or_else(|| missing("cellsize"))?;

        let samples = tokens
            .map(|tok| {
                tok.parse::<f32>()
                    .map_err(|_| RasterError::AscHeader(format!("bad sample {tok}")))
            })
            .collect::<Result<Vec<f32>, _>>()?;
        if samples.len() != cols * rows {
            return Err(RasterError::AscData {
                expected: cols * rows,
                found: samples.len(),
            });
        }

        let west = if x_is_center { xll - dx / 2.0 } else { xll };
        let south = if y_is_center { yll - dy / 2.0 } else { yll };
        #[allow(clippy::cast_precision_loss)]
        let north = south + rows as C * dy;

        Raster::new(west, north, cell_size, (cols, rows), samples, header.nodata)
    }
}

#[cfg(test)]
mod tests {
    use super::{Raster, RasterError};
    use geo::geometry::Coord;
    use std::io::Write;

    const CORNER_GRID: &str = "ncols 4
nrows 3
xllcorner 500000
yllcorner 6000000
cellsize 5
NODATA_value -9999
-10.0 -11.0 -12.0 -13.0
-20.0 -21.0 -9999 -23.0
-30.0 -31.0 -32.0 -33.0
";

    #[test]
    fn test_load_asc() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("surface.asc");
        std::fs::File::create(&path)
            .unwrap()
            .write_all(CORNER_GRID.as_bytes())
            .unwrap();

        let raster = Raster::load_asc(&path).unwrap();
        assert_eq!(raster.dimensions(), (4, 3));
        assert_eq!(raster.cell_size(), (5.0, 5.0));
        assert_eq!(raster.nodata(), Some(-9999.0));
        assert!(!raster.is_geographic());
        assert_eq!(raster.extent().min(), Coord { x: 500_000.0, y: 6_000_000.0 });
        assert_eq!(raster.extent().max(), Coord { x: 500_020.0, y: 6_000_015.0 });

        // First data row is the northmost.
        assert_eq!(raster.get(Coord { x: 500_001.0, y: 6_000_014.0 }), Some(-10.0));
        assert_eq!(raster.get(Coord { x: 500_019.0, y: 6_000_001.0 }), Some(-33.0));
        assert_eq!(raster.get(Coord { x: 500_012.0, y: 6_000_007.0 }), Some(-9999.0));
    }

    #[test]
    fn test_center_origin() {
        let raster = Raster::parse_asc(
            "NCOLS 2\nNROWS 1\nXLLCENTER 1.0\nYLLCENTER 1.0\nCELLSIZE 2.0\n7 8\n",
        )
        .unwrap();
        assert_eq!(raster.extent().min(), Coord { x: 0.0, y: 0.0 });
        assert_eq!(raster.nodata(), None);
        assert_eq!(raster.get(Coord { x: 3.5, y: 1.0 }), Some(8.0));
    }

    #[test]
    fn test_sample_count_mismatch() {
        let err = Raster::parse_asc(
            "ncols 2\nnrows 2\nxllcorner 0\nyllcorner 0\ncellsize 1\n1 2 3\n",
        )
        .unwrap_err();
        assert!(matches!(
            err,
            RasterError::AscData {
                expected: 4,
                found: 3
            }
        ));
    }

    #[test]
    fn test_missing_header() {
        let err = Raster::parse_asc("ncols 1\nnrows 1\ncellsize 1\n0\n").unwrap_err();
        assert!(matches!(err, RasterError::AscHeader(_)));
    }
}
